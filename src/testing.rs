//! Testing utilities for providers.
//!
//! [`ProviderTester`] drives a [`ProviderService`] the way the orchestrator
//! would, without any transport in between. [`MockCafeClient`] stands in for
//! the remote cafe API.
//!
//! # Example
//!
//! ```ignore
//! use cafe_provider::testing::{MockCafeClient, ProviderTester};
//! use cafe_provider::CafeProvider;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! #[tokio::test]
//! async fn test_create_cafe() {
//!     let client = Arc::new(MockCafeClient::starting_at(42));
//!     let tester = ProviderTester::new(CafeProvider::with_client(client));
//!
//!     let state = tester
//!         .lifecycle_create("hashicups_cafe", json!({"name": "Sample Cafe"}))
//!         .await
//!         .unwrap();
//!
//!     assert_eq!(state["id"], 42);
//! }
//! ```

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use serde_json::Value;

use crate::client::{Cafe, CafeAttributes, CafeClient, CafeId, ClientError};
use crate::error::{Operation, ProviderError};
use crate::schema::{Diagnostic, DiagnosticSeverity, ProviderSchema};
use crate::service::ProviderService;
use crate::types::{ImportedResource, PlanResult};

/// A test harness for provider implementations.
pub struct ProviderTester<P: ProviderService> {
    provider: P,
}

impl<P: ProviderService> ProviderTester<P> {
    /// Create a new tester for the given provider.
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Get a reference to the underlying provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    // Schema & Metadata

    /// Get the provider's schema.
    pub fn schema(&self) -> ProviderSchema {
        self.provider.schema()
    }

    /// Get the list of resource type names.
    pub fn resource_types(&self) -> Vec<String> {
        self.provider.metadata().resources
    }

    /// Get the list of data source type names.
    pub fn data_source_types(&self) -> Vec<String> {
        self.provider.metadata().data_sources
    }

    // Provider Lifecycle

    /// Validate provider configuration.
    pub async fn validate_provider_config(&self, config: Value) -> Result<(), TestError> {
        let diagnostics = self.provider.validate_provider_config(config).await?;
        check_diagnostics(diagnostics)
    }

    /// Configure the provider.
    ///
    /// Returns `Err` with the diagnostics if there are errors.
    pub async fn configure(&self, config: Value) -> Result<(), TestError> {
        let diagnostics = self.provider.configure(config).await?;
        check_diagnostics(diagnostics)
    }

    // Resource Operations

    /// Validate a resource configuration.
    pub async fn validate_resource_config(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<(), TestError> {
        let diagnostics = self
            .provider
            .validate_resource_config(resource_type, config)
            .await?;
        check_diagnostics(diagnostics)
    }

    /// Plan a resource creation (no prior state).
    pub async fn plan_create(
        &self,
        resource_type: &str,
        proposed_state: Value,
    ) -> Result<PlanResult, ProviderError> {
        self.provider
            .plan(resource_type, None, proposed_state.clone(), proposed_state)
            .await
    }

    /// Plan a resource update.
    pub async fn plan_update(
        &self,
        resource_type: &str,
        prior_state: Value,
        proposed_state: Value,
    ) -> Result<PlanResult, ProviderError> {
        self.provider
            .plan(
                resource_type,
                Some(prior_state),
                proposed_state.clone(),
                proposed_state,
            )
            .await
    }

    /// Plan a resource deletion.
    pub async fn plan_delete(
        &self,
        resource_type: &str,
        prior_state: Value,
    ) -> Result<PlanResult, ProviderError> {
        self.provider
            .plan(resource_type, Some(prior_state), Value::Null, Value::Null)
            .await
    }

    /// Create a new resource.
    pub async fn create(
        &self,
        resource_type: &str,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        self.provider.create(resource_type, planned_state).await
    }

    /// Read the current state of a resource.
    pub async fn read(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<Value, ProviderError> {
        self.provider.read(resource_type, current_state).await
    }

    /// Update an existing resource.
    pub async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        self.provider
            .update(resource_type, prior_state, planned_state)
            .await
    }

    /// Delete a resource.
    pub async fn delete(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<(), ProviderError> {
        self.provider.delete(resource_type, current_state).await
    }

    /// Import an existing resource.
    pub async fn import_resource(
        &self,
        resource_type: &str,
        id: &str,
    ) -> Result<Vec<ImportedResource>, ProviderError> {
        self.provider.import_resource(resource_type, id).await
    }

    // Data Source Operations

    /// Read data from a data source.
    pub async fn read_data_source(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Value, ProviderError> {
        self.provider
            .read_data_source(data_source_type, config)
            .await
    }

    // Lifecycle Helpers

    /// Run a full create lifecycle: plan → create → read.
    ///
    /// Returns the final state after read.
    pub async fn lifecycle_create(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<Value, ProviderError> {
        let plan_result = self.plan_create(resource_type, config).await?;

        let created_state = self
            .create(resource_type, plan_result.planned_state)
            .await?;

        self.read(resource_type, created_state).await
    }

    /// Run a full update lifecycle: plan → update → read.
    ///
    /// Returns the final state after read.
    pub async fn lifecycle_update(
        &self,
        resource_type: &str,
        prior_state: Value,
        proposed_state: Value,
    ) -> Result<Value, ProviderError> {
        let plan_result = self
            .plan_update(resource_type, prior_state.clone(), proposed_state)
            .await?;

        let updated_state = self
            .update(resource_type, prior_state, plan_result.planned_state)
            .await?;

        self.read(resource_type, updated_state).await
    }

    /// Run a full delete lifecycle: plan → delete.
    pub async fn lifecycle_delete(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<(), ProviderError> {
        let _ = self
            .plan_delete(resource_type, current_state.clone())
            .await?;

        self.delete(resource_type, current_state).await
    }

    /// Run a full CRUD lifecycle: create → read → update → read → delete.
    ///
    /// Returns the state after the update (before delete).
    pub async fn lifecycle_crud(
        &self,
        resource_type: &str,
        initial_config: Value,
        updated_config: Value,
    ) -> Result<Value, ProviderError> {
        let created_state = self.lifecycle_create(resource_type, initial_config).await?;

        let updated_state = self
            .lifecycle_update(resource_type, created_state, updated_config)
            .await?;

        self.lifecycle_delete(resource_type, updated_state.clone())
            .await?;

        Ok(updated_state)
    }
}

/// Error type for test operations that may fail with diagnostics.
#[derive(Debug)]
pub enum TestError {
    /// The operation failed with diagnostics.
    Diagnostics(Vec<Diagnostic>),
    /// The operation failed with a provider error.
    Provider(ProviderError),
}

impl std::fmt::Display for TestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TestError::Diagnostics(diags) => {
                writeln!(f, "Operation failed with {} diagnostic(s):", diags.len())?;
                for diag in diags {
                    write!(f, "  [{:?}] {}", diag.severity, diag.summary)?;
                    if let Some(detail) = &diag.detail {
                        write!(f, ": {}", detail)?;
                    }
                    if let Some(attr) = &diag.attribute {
                        write!(f, " (at {})", attr)?;
                    }
                    writeln!(f)?;
                }
                Ok(())
            },
            TestError::Provider(e) => write!(f, "Provider error: {}", e),
        }
    }
}

impl std::error::Error for TestError {}

impl From<ProviderError> for TestError {
    fn from(e: ProviderError) -> Self {
        TestError::Provider(e)
    }
}

fn check_diagnostics(diagnostics: Vec<Diagnostic>) -> Result<(), TestError> {
    let errors: Vec<_> = diagnostics
        .into_iter()
        .filter(|d| matches!(d.severity, DiagnosticSeverity::Error))
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(TestError::Diagnostics(errors))
    }
}

// Mock Client

#[derive(Debug, Default)]
struct MockState {
    cafes: BTreeMap<CafeId, CafeAttributes>,
    next_id: CafeId,
    failures: HashMap<&'static str, String>,
    calls: Vec<&'static str>,
}

/// In-memory stand-in for the cafe API.
///
/// Assigns sequential identifiers, can be told to fail specific operations,
/// and can mimic APIs whose update response carries only the identifier.
#[derive(Debug)]
pub struct MockCafeClient {
    state: Mutex<MockState>,
    partial_updates: bool,
}

impl Default for MockCafeClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCafeClient {
    /// Create an empty mock that assigns identifiers from 1.
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    /// Create an empty mock whose first assigned identifier is `first_id`.
    pub fn starting_at(first_id: CafeId) -> Self {
        Self {
            state: Mutex::new(MockState {
                next_id: first_id,
                ..Default::default()
            }),
            partial_updates: false,
        }
    }

    /// Make `update` answer with the identifier only.
    pub fn with_partial_updates(mut self) -> Self {
        self.partial_updates = true;
        self
    }

    /// Make every later call of `operation` fail with `message`.
    pub fn fail_on(&self, operation: Operation, message: impl Into<String>) {
        self.lock()
            .failures
            .insert(operation_key(operation), message.into());
    }

    /// Stop failing `operation`.
    pub fn clear_failure(&self, operation: Operation) {
        self.lock().failures.remove(operation_key(operation));
    }

    /// Insert a cafe directly, as if someone created it out of band.
    pub fn insert(&self, cafe: Cafe) {
        let mut state = self.lock();
        state.next_id = state.next_id.max(cafe.id + 1);
        state.cafes.insert(cafe.id, cafe.attributes);
    }

    /// Remove a cafe directly, as if someone deleted it out of band.
    pub fn remove(&self, id: CafeId) -> bool {
        self.lock().cafes.remove(&id).is_some()
    }

    /// Names of the operations called so far, in order.
    pub fn calls(&self) -> Vec<&'static str> {
        self.lock().calls.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn begin(&self, operation: Operation) -> Result<MutexGuard<'_, MockState>, ClientError> {
        let key = operation_key(operation);
        let mut state = self.lock();
        state.calls.push(key);
        if let Some(message) = state.failures.get(key).cloned() {
            return Err(ClientError::Rejected(message));
        }
        Ok(state)
    }
}

fn operation_key(operation: Operation) -> &'static str {
    match operation {
        Operation::Create => "create",
        Operation::Read => "get_by_id",
        Operation::Update => "update",
        Operation::Delete => "delete",
        Operation::List => "list_all",
    }
}

#[async_trait::async_trait]
impl CafeClient for MockCafeClient {
    async fn create(&self, cafe: &CafeAttributes) -> Result<Cafe, ClientError> {
        let mut state = self.begin(Operation::Create)?;
        let id = state.next_id;
        state.next_id += 1;
        state.cafes.insert(id, cafe.clone());
        Ok(Cafe::new(id, cafe.clone()))
    }

    async fn get_by_id(&self, id: CafeId) -> Result<Vec<Cafe>, ClientError> {
        let state = self.begin(Operation::Read)?;
        Ok(state
            .cafes
            .get(&id)
            .map(|attributes| vec![Cafe::new(id, attributes.clone())])
            .unwrap_or_default())
    }

    async fn list_all(&self) -> Result<Vec<Cafe>, ClientError> {
        let state = self.begin(Operation::List)?;
        Ok(state
            .cafes
            .iter()
            .map(|(id, attributes)| Cafe::new(*id, attributes.clone()))
            .collect())
    }

    async fn update(&self, id: CafeId, cafe: &Cafe) -> Result<Cafe, ClientError> {
        let mut state = self.begin(Operation::Update)?;
        let Some(existing) = state.cafes.get_mut(&id) else {
            return Err(ClientError::Status {
                status: 404,
                body: format!("cafe {} not found", id),
            });
        };
        *existing = cafe.attributes.clone();

        if self.partial_updates {
            Ok(Cafe {
                id,
                ..Default::default()
            })
        } else {
            Ok(Cafe::new(id, cafe.attributes.clone()))
        }
    }

    async fn delete(&self, id: CafeId) -> Result<(), ClientError> {
        let mut state = self.begin(Operation::Delete)?;
        match state.cafes.remove(&id) {
            Some(_) => Ok(()),
            None => Err(ClientError::Status {
                status: 404,
                body: format!("cafe {} not found", id),
            }),
        }
    }
}

// Assertion Helpers

/// Assert that a plan result indicates the resource will be created.
///
/// # Panics
///
/// Panics if the plan has no changes or requires replacement.
pub fn assert_plan_creates(plan: &PlanResult) {
    assert!(
        !plan.changes.is_empty(),
        "Expected plan to have changes for create, but got no changes"
    );
    assert!(
        !plan.requires_replace,
        "Expected plan to create, not replace"
    );
}

/// Assert that a plan result indicates no changes.
///
/// # Panics
///
/// Panics if the plan has any changes.
pub fn assert_plan_no_changes(plan: &PlanResult) {
    assert!(
        plan.changes.is_empty(),
        "Expected no changes, but got {} change(s): {:?}",
        plan.changes.len(),
        plan.changes.iter().map(|c| &c.path).collect::<Vec<_>>()
    );
}

/// Assert that a plan updates in place.
///
/// # Panics
///
/// Panics if the plan requires replacement.
pub fn assert_plan_updates_in_place(plan: &PlanResult) {
    assert!(
        !plan.requires_replace,
        "Expected plan to update in place, but it requires replacement"
    );
}

/// Assert that a plan has a change for a specific attribute path.
///
/// # Panics
///
/// Panics if the plan does not have a change for the given path.
pub fn assert_plan_changes_attribute(plan: &PlanResult, path: &str) {
    let has_change = plan.changes.iter().any(|c| c.path == path);
    assert!(
        has_change,
        "Expected plan to change attribute '{}', but it was not changed. Changed attributes: {:?}",
        path,
        plan.changes.iter().map(|c| &c.path).collect::<Vec<_>>()
    );
}

/// Assert that a plan does not have a change for a specific attribute path.
///
/// # Panics
///
/// Panics if the plan has a change for the given path.
pub fn assert_plan_does_not_change_attribute(plan: &PlanResult, path: &str) {
    let has_change = plan.changes.iter().any(|c| c.path == path);
    assert!(
        !has_change,
        "Expected plan to not change attribute '{}', but it was changed",
        path
    );
}

/// Assert that diagnostics contain no errors.
///
/// # Panics
///
/// Panics if there are any error diagnostics.
pub fn assert_no_errors(diagnostics: &[Diagnostic]) {
    let errors: Vec<_> = diagnostics.iter().filter(|d| d.is_error()).collect();

    assert!(
        errors.is_empty(),
        "Expected no errors, but got {} error(s): {:?}",
        errors.len(),
        errors.iter().map(|d| &d.summary).collect::<Vec<_>>()
    );
}

/// Assert that diagnostics contain an error with the given summary substring.
///
/// # Panics
///
/// Panics if no error diagnostic contains the given substring.
pub fn assert_error_contains(diagnostics: &[Diagnostic], substring: &str) {
    let has_matching_error = diagnostics
        .iter()
        .any(|d| d.is_error() && d.summary.contains(substring));

    assert!(
        has_matching_error,
        "Expected an error containing '{}', but no matching error found. Errors: {:?}",
        substring,
        diagnostics
            .iter()
            .filter(|d| d.is_error())
            .map(|d| &d.summary)
            .collect::<Vec<_>>()
    );
}
