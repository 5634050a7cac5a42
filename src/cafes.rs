//! The `<provider>_cafes` data source: every cafe the API knows about.

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use serde_json::{json, Value};
use tracing::{debug, instrument};

use crate::cafe::CafeResourceModel;
use crate::client::SharedClient;
use crate::error::{Operation, ProviderError};
use crate::resource::{DataSource, ProviderData};
use crate::schema::{Attribute, AttributeType, Schema};

/// Suffix appended to the provider prefix to form the data source type name.
pub const CAFES_TYPE_SUFFIX: &str = "_cafes";

/// Lists all cafes.
#[derive(Default)]
pub struct CafesDataSource {
    client: OnceLock<SharedClient>,
}

impl CafesDataSource {
    /// Create an unconfigured data source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a data source already bound to `client`.
    pub fn with_client(client: SharedClient) -> Self {
        Self {
            client: OnceLock::from(client),
        }
    }
}

fn cafe_object_type() -> AttributeType {
    let fields: BTreeMap<String, AttributeType> = [
        ("id", AttributeType::Int64),
        ("name", AttributeType::String),
        ("address", AttributeType::String),
        ("description", AttributeType::String),
        ("image", AttributeType::String),
    ]
    .into_iter()
    .map(|(name, ty)| (name.to_string(), ty))
    .collect();
    AttributeType::object(fields)
}

#[async_trait::async_trait]
impl DataSource for CafesDataSource {
    fn type_name(&self, provider_type_name: &str) -> String {
        format!("{}{}", provider_type_name, CAFES_TYPE_SUFFIX)
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("Fetches the list of cafes.")
            .with_attribute(
                "cafes",
                Attribute::computed(AttributeType::list(cafe_object_type()))
                    .with_description("All cafes known to the API."),
            )
    }

    fn configure(&self, provider_data: Option<&ProviderData>) -> Result<(), ProviderError> {
        let Some(data) = provider_data else {
            return Ok(());
        };
        let client = data.expect_type::<SharedClient>()?;
        if self.client.set(Arc::clone(client)).is_err() {
            debug!("Cafes data source already configured, keeping existing client");
        }
        Ok(())
    }

    #[instrument(skip(self, _config), name = "cafes.read")]
    async fn read(&self, _config: Value) -> Result<Value, ProviderError> {
        let client = self.client.get().ok_or_else(|| {
            ProviderError::Configuration(
                "the cafe client has not been configured; configure the provider first"
                    .to_string(),
            )
        })?;

        let cafes = client
            .list_all()
            .await
            .map_err(|e| ProviderError::remote(Operation::List, None, e))?;
        debug!(count = cafes.len(), "Listed cafes");

        let cafes: Vec<Value> = cafes
            .into_iter()
            .map(|cafe| CafeResourceModel::from(cafe).to_state())
            .collect();
        Ok(json!({ "cafes": cafes }))
    }
}
