//! The cafe provider.
//!
//! [`CafeProvider`] implements [`ProviderService`] on top of the cafe
//! resource and the cafes data source. Configure builds (or reuses) the
//! client handle and hands it to both; every other call is dispatched by
//! type name.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::cafe::CafeResource;
use crate::cafes::CafesDataSource;
use crate::client::{HttpCafeClient, SharedClient};
use crate::config::{provider_config_schema, ProviderConfig};
use crate::error::ProviderError;
use crate::plan::plan_resource;
use crate::resource::{DataSource, ProviderData, Resource};
use crate::schema::{has_errors, Diagnostic, ProviderSchema};
use crate::service::ProviderService;
use crate::types::{ImportedResource, PlanResult};
use crate::validation::validate;

/// Type name prefix used unless overridden.
pub const DEFAULT_TYPE_NAME: &str = "hashicups";

/// Provider serving `<prefix>_cafe` and `<prefix>_cafes`.
pub struct CafeProvider {
    type_name: String,
    client: Option<SharedClient>,
    resources: Vec<Arc<dyn Resource>>,
    data_sources: Vec<Arc<dyn DataSource>>,
}

impl Default for CafeProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl CafeProvider {
    /// Create a provider that talks to the HTTP API once configured.
    pub fn new() -> Self {
        Self {
            type_name: DEFAULT_TYPE_NAME.to_string(),
            client: None,
            resources: vec![Arc::new(CafeResource::new())],
            data_sources: vec![Arc::new(CafesDataSource::new())],
        }
    }

    /// Create a provider bound to `client`.
    ///
    /// Configure still validates the provider block but keeps this client
    /// instead of building an HTTP one.
    pub fn with_client(client: SharedClient) -> Self {
        Self {
            type_name: DEFAULT_TYPE_NAME.to_string(),
            resources: vec![Arc::new(CafeResource::with_client(Arc::clone(&client)))],
            data_sources: vec![Arc::new(CafesDataSource::with_client(Arc::clone(&client)))],
            client: Some(client),
        }
    }

    /// Use `type_name` as the prefix for every resource and data source.
    pub fn with_type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = type_name.into();
        self
    }

    /// The provider's type name prefix.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    fn resource(&self, resource_type: &str) -> Result<&Arc<dyn Resource>, ProviderError> {
        self.resources
            .iter()
            .find(|r| r.type_name(&self.type_name) == resource_type)
            .ok_or_else(|| ProviderError::UnknownResource(resource_type.to_string()))
    }

    fn data_source(&self, data_source_type: &str) -> Result<&Arc<dyn DataSource>, ProviderError> {
        self.data_sources
            .iter()
            .find(|d| d.type_name(&self.type_name) == data_source_type)
            .ok_or_else(|| ProviderError::UnknownDataSource(data_source_type.to_string()))
    }

    /// Pass `provider_data` to every resource and data source.
    ///
    /// Returns one diagnostic per type that rejected it.
    pub fn configure_resources(&self, provider_data: Option<&ProviderData>) -> Vec<Diagnostic> {
        let resource_errors = self.resources.iter().map(|r| r.configure(provider_data));
        let data_source_errors = self.data_sources.iter().map(|d| d.configure(provider_data));

        resource_errors
            .chain(data_source_errors)
            .filter_map(Result::err)
            .map(|e| e.to_diagnostic())
            .collect()
    }

    async fn build_client(&self, config: &ProviderConfig) -> Result<SharedClient, Diagnostic> {
        if let Some(client) = &self.client {
            debug!("Using injected cafe client");
            return Ok(Arc::clone(client));
        }

        let credentials = config.credentials();
        if credentials.is_none() {
            warn!("No cafe API credentials configured, requests will be anonymous");
        }

        let client = HttpCafeClient::connect(config.host(), credentials.as_ref())
            .await
            .map_err(|e| {
                Diagnostic::error("Unable to Create Cafe API Client").with_detail(format!(
                    "An unexpected error occurred when creating the cafe API client: {}",
                    e
                ))
            })?;
        info!(
            host = %client.base_url(),
            authenticated = client.is_authenticated(),
            "Connected to cafe API"
        );
        Ok(Arc::new(client))
    }
}

#[async_trait::async_trait]
impl ProviderService for CafeProvider {
    fn schema(&self) -> ProviderSchema {
        let schema = ProviderSchema::new().with_provider_config(provider_config_schema());
        let schema = self.resources.iter().fold(schema, |schema, r| {
            schema.with_resource(r.type_name(&self.type_name), r.schema())
        });
        self.data_sources.iter().fold(schema, |schema, d| {
            schema.with_data_source(d.type_name(&self.type_name), d.schema())
        })
    }

    async fn validate_provider_config(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
        match ProviderConfig::from_value(config) {
            Ok(config) => Ok(config.validate()),
            Err(e) => Ok(vec![e.to_diagnostic()]),
        }
    }

    #[instrument(skip(self, config))]
    async fn configure(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
        let config = match ProviderConfig::from_value(config) {
            Ok(config) => config,
            Err(e) => return Ok(vec![e.to_diagnostic()]),
        };
        let diagnostics = config.validate();
        if has_errors(&diagnostics) {
            return Ok(diagnostics);
        }

        let client = match self.build_client(&config).await {
            Ok(client) => client,
            Err(diagnostic) => return Ok(vec![diagnostic]),
        };

        let data = ProviderData::new(client);
        let diagnostics = self.configure_resources(Some(&data));
        if diagnostics.is_empty() {
            info!("Cafe provider configured");
        }
        Ok(diagnostics)
    }

    async fn validate_resource_config(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        let resource = self.resource(resource_type)?;
        Ok(validate(&resource.schema(), &config))
    }

    async fn upgrade_resource_state(
        &self,
        resource_type: &str,
        version: i64,
        state: Value,
    ) -> Result<Value, ProviderError> {
        let current = self.resource(resource_type)?.schema().version;
        match u64::try_from(version) {
            Ok(v) if v <= current => Ok(state),
            _ => Err(ProviderError::Validation(format!(
                "cannot upgrade {} state from schema version {} (current version is {})",
                resource_type, version, current
            ))),
        }
    }

    #[instrument(skip(self, prior_state, proposed_state, _config))]
    async fn plan(
        &self,
        resource_type: &str,
        prior_state: Option<Value>,
        proposed_state: Value,
        _config: Value,
    ) -> Result<PlanResult, ProviderError> {
        let resource = self.resource(resource_type)?;
        plan_resource(&resource.schema(), prior_state.as_ref(), proposed_state)
    }

    #[instrument(skip(self, planned_state))]
    async fn create(&self, resource_type: &str, planned_state: Value) -> Result<Value, ProviderError> {
        self.resource(resource_type)?.create(planned_state).await
    }

    #[instrument(skip(self, current_state))]
    async fn read(&self, resource_type: &str, current_state: Value) -> Result<Value, ProviderError> {
        self.resource(resource_type)?.read(current_state).await
    }

    #[instrument(skip(self, prior_state, planned_state))]
    async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        self.resource(resource_type)?
            .update(prior_state, planned_state)
            .await
    }

    #[instrument(skip(self, current_state))]
    async fn delete(&self, resource_type: &str, current_state: Value) -> Result<(), ProviderError> {
        self.resource(resource_type)?.delete(current_state).await
    }

    #[instrument(skip(self))]
    async fn import_resource(
        &self,
        resource_type: &str,
        id: &str,
    ) -> Result<Vec<ImportedResource>, ProviderError> {
        let state = self.resource(resource_type)?.import(id).await?;
        Ok(vec![ImportedResource::new(resource_type, state)])
    }

    async fn validate_data_source_config(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        let data_source = self.data_source(data_source_type)?;
        Ok(validate(&data_source.schema(), &config))
    }

    #[instrument(skip(self, config))]
    async fn read_data_source(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Value, ProviderError> {
        self.data_source(data_source_type)?.read(config).await
    }
}
