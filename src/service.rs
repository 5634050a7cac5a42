//! The provider-level service trait.
//!
//! [`ProviderService`] is the surface the orchestrator drives: one value per
//! provider, dispatching by resource type name to the resources it serves.
//! [`CafeProvider`](crate::CafeProvider) is the implementation this crate
//! ships.
//!
//! ```ignore
//! use cafe_provider::{CafeProvider, ProviderService};
//! use serde_json::json;
//!
//! let provider = CafeProvider::new();
//! provider.configure(json!({"host": "http://localhost:19090"})).await?;
//! let state = provider
//!     .create("hashicups_cafe", json!({"name": "Corner"}))
//!     .await?;
//! ```

use serde_json::Value;

use crate::error::ProviderError;
use crate::schema::{Diagnostic, ProviderSchema};
use crate::types::{ImportedResource, PlanResult, ProviderMetadata};

/// Operations the orchestrator calls on a provider.
///
/// Every resource and data source operation names its target by type name.
/// An unrecognised name is an error, never a silent no-op.
#[async_trait::async_trait]
pub trait ProviderService: Send + Sync + 'static {
    /// The provider block schema plus every resource and data source schema.
    fn schema(&self) -> ProviderSchema;

    /// Resource and data source type names, derived from [`schema`](Self::schema).
    fn metadata(&self) -> ProviderMetadata {
        let schema = self.schema();
        ProviderMetadata {
            resources: schema.resources.keys().cloned().collect(),
            data_sources: schema.data_sources.keys().cloned().collect(),
        }
    }

    /// Check the provider block before [`configure`](Self::configure).
    async fn validate_provider_config(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError>;

    /// Build the API client from the provider block and hand it to every
    /// resource and data source.
    async fn configure(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError>;

    /// Release provider resources. Nothing is held beyond the client handle,
    /// which drops with the provider.
    async fn stop(&self) -> Result<(), ProviderError> {
        tracing::debug!("provider stopping");
        Ok(())
    }

    async fn validate_resource_config(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError>;

    /// Bring state written by an older schema version up to date.
    async fn upgrade_resource_state(
        &self,
        resource_type: &str,
        version: i64,
        state: Value,
    ) -> Result<Value, ProviderError>;

    async fn plan(
        &self,
        resource_type: &str,
        prior_state: Option<Value>,
        proposed_state: Value,
        config: Value,
    ) -> Result<PlanResult, ProviderError>;

    async fn create(&self, resource_type: &str, planned_state: Value) -> Result<Value, ProviderError>;

    /// Refresh state from the remote side. A vanished object is
    /// [`ProviderError::NotFound`].
    async fn read(&self, resource_type: &str, current_state: Value) -> Result<Value, ProviderError>;

    async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError>;

    async fn delete(&self, resource_type: &str, current_state: Value) -> Result<(), ProviderError>;

    /// Adopt an existing remote object by its identifier string.
    async fn import_resource(
        &self,
        resource_type: &str,
        id: &str,
    ) -> Result<Vec<ImportedResource>, ProviderError>;

    async fn validate_data_source_config(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError>;

    async fn read_data_source(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Value, ProviderError>;
}
