//! The `<provider>_cafe` resource.
//!
//! Maps the declarative cafe model onto the remote cafe API. Every lifecycle
//! operation is a single request/response cycle against the shared
//! [`CafeClient`](crate::client::CafeClient); the resource keeps no state of
//! its own apart from the client handle.
//!
//! ```text
//! resource "hashicups_cafe" "example" {
//!   name        = "Sample Cafe"
//!   address     = "123 Coffee St"
//!   description = "A cozy place"
//!   image       = "http://example.com/image.jpg"
//! }
//! ```

use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::client::{Cafe, CafeAttributes, CafeId, ClientError, SharedClient};
use crate::error::{Operation, ProviderError};
use crate::resource::{ProviderData, Resource};
use crate::schema::{Attribute, PlanModifier, Schema};

/// Suffix appended to the provider prefix to form the resource type name.
pub const CAFE_TYPE_SUFFIX: &str = "_cafe";

/// State of one cafe as the orchestrator sees it.
///
/// `None` stands for a value that is unset or not yet known.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CafeResourceModel {
    /// Remote-assigned identifier. Absent until the cafe is created.
    #[serde(default)]
    pub id: Option<CafeId>,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Street address.
    #[serde(default)]
    pub address: Option<String>,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Image URL.
    #[serde(default)]
    pub image: Option<String>,
}

impl CafeResourceModel {
    /// Decode state or plan data.
    ///
    /// `id` goes through [`parse_id`], so a malformed identifier is reported
    /// as a conversion error rather than a generic decoding failure.
    pub fn from_state(state: Value) -> Result<Self, ProviderError> {
        let mut obj = match state {
            Value::Object(obj) => obj,
            Value::Null => return Ok(Self::default()),
            other => {
                return Err(ProviderError::Validation(format!(
                    "cafe state must be an object, got {}",
                    other
                )))
            },
        };

        let id = match obj.remove("id") {
            Some(value) => parse_id(&value)?,
            None => None,
        };
        let mut model: Self = serde_json::from_value(Value::Object(obj))?;
        model.id = id;
        Ok(model)
    }

    /// Encode as state. Every attribute is present; unknown ones are `null`.
    pub fn to_state(&self) -> Value {
        serde_json::json!({
            "id": self.id,
            "name": self.name,
            "address": self.address,
            "description": self.description,
            "image": self.image,
        })
    }

    /// The identifier, or a conversion error if there is none.
    pub fn require_id(&self) -> Result<CafeId, ProviderError> {
        self.id
            .ok_or_else(|| ProviderError::conversion("id", "state has no cafe identifier"))
    }

    /// The attributes to send to the API. Unset values are sent empty.
    pub fn attributes(&self) -> CafeAttributes {
        CafeAttributes {
            name: self.name.clone().unwrap_or_default(),
            address: self.address.clone().unwrap_or_default(),
            description: self.description.clone().unwrap_or_default(),
            image: self.image.clone().unwrap_or_default(),
        }
    }
}

impl From<Cafe> for CafeResourceModel {
    fn from(cafe: Cafe) -> Self {
        Self {
            id: Some(cafe.id),
            name: Some(cafe.attributes.name),
            address: Some(cafe.attributes.address),
            description: Some(cafe.attributes.description),
            image: Some(cafe.attributes.image),
        }
    }
}

/// Read an identifier from a state value.
///
/// Integers are taken as-is and decimal strings are parsed. `null` means the
/// identifier is not known yet. Anything else is a conversion error.
pub fn parse_id(value: &Value) -> Result<Option<CafeId>, ProviderError> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => n.as_i64().map(Some).ok_or_else(|| {
            ProviderError::conversion("id", format!("{} is not a valid cafe identifier", n))
        }),
        Value::String(s) => parse_id_str(s).map(Some),
        other => Err(ProviderError::conversion(
            "id",
            format!("expected an integer, got {}", other),
        )),
    }
}

/// Parse an identifier given as text, e.g. on import.
pub fn parse_id_str(s: &str) -> Result<CafeId, ProviderError> {
    s.trim().parse::<CafeId>().map_err(|e| {
        ProviderError::conversion("id", format!("{:?} is not a valid cafe identifier: {}", s, e))
    })
}

/// The schema shared by the cafe resource.
pub fn cafe_schema() -> Schema {
    Schema::v0()
        .with_description("Manages a cafe.")
        .with_attribute(
            "id",
            Attribute::computed_int64()
                .with_description("Identifier assigned by the cafe API.")
                .with_plan_modifier(PlanModifier::UseStateForUnknown),
        )
        .with_attribute(
            "name",
            Attribute::optional_computed_string().with_description("Name of the cafe."),
        )
        .with_attribute(
            "address",
            Attribute::optional_computed_string().with_description("Street address."),
        )
        .with_attribute(
            "description",
            Attribute::optional_computed_string().with_description("Description of the cafe."),
        )
        .with_attribute(
            "image",
            Attribute::optional_computed_string().with_description("URL of an image of the cafe."),
        )
}

/// The cafe resource.
///
/// Unconfigured until [`Resource::configure`] hands it a client; after that
/// the handle never changes.
#[derive(Default)]
pub struct CafeResource {
    client: OnceLock<SharedClient>,
}

impl CafeResource {
    /// Create an unconfigured resource.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a resource already bound to `client`.
    pub fn with_client(client: SharedClient) -> Self {
        Self {
            client: OnceLock::from(client),
        }
    }

    /// Whether a client has been configured.
    pub fn is_configured(&self) -> bool {
        self.client.get().is_some()
    }

    fn client(&self) -> Result<&SharedClient, ProviderError> {
        self.client.get().ok_or_else(|| {
            ProviderError::Configuration(
                "the cafe client has not been configured; configure the provider first"
                    .to_string(),
            )
        })
    }

    /// Create a cafe from a plan.
    #[instrument(skip(self, plan), name = "cafe.create")]
    pub async fn create_cafe(
        &self,
        plan: &CafeResourceModel,
    ) -> Result<CafeResourceModel, ProviderError> {
        let client = self.client()?;
        let cafe = client
            .create(&plan.attributes())
            .await
            .map_err(|e| ProviderError::remote(Operation::Create, None, e))?;
        if cafe.id <= 0 {
            return Err(ProviderError::remote(
                Operation::Create,
                None,
                ClientError::Rejected(format!(
                    "the API returned no usable identifier for the new cafe (got {})",
                    cafe.id
                )),
            ));
        }

        info!(cafe_id = cafe.id, "Created cafe");
        Ok(cafe.into())
    }

    /// Refresh a cafe's state from the API.
    #[instrument(skip(self, state), name = "cafe.read")]
    pub async fn read_cafe(
        &self,
        state: &CafeResourceModel,
    ) -> Result<CafeResourceModel, ProviderError> {
        let id = state.require_id()?;
        match self.fetch(id, Operation::Read).await? {
            Some(cafe) => {
                debug!(cafe_id = id, "Read cafe");
                Ok(cafe.into())
            },
            None => {
                info!(cafe_id = id, "Cafe no longer exists");
                Err(ProviderError::NotFound(format!("cafe ID {}", id)))
            },
        }
    }

    /// Push planned values to the API and return the values it now holds.
    ///
    /// The update response is not trusted to be complete; the result comes
    /// from a read issued right after it.
    #[instrument(skip(self, plan), name = "cafe.update")]
    pub async fn update_cafe(
        &self,
        plan: &CafeResourceModel,
    ) -> Result<CafeResourceModel, ProviderError> {
        let id = plan.require_id()?;
        let client = self.client()?;
        let request = Cafe::new(id, plan.attributes());
        client
            .update(id, &request)
            .await
            .map_err(|e| ProviderError::remote(Operation::Update, Some(id), e))?;

        let cafe = self.fetch(id, Operation::Read).await?.ok_or_else(|| {
            ProviderError::remote(
                Operation::Read,
                Some(id),
                ClientError::Rejected("the API returned no cafe after the update".to_string()),
            )
        })?;

        info!(cafe_id = id, "Updated cafe");
        Ok(cafe.into())
    }

    /// Delete a cafe.
    #[instrument(skip(self, state), name = "cafe.delete")]
    pub async fn delete_cafe(&self, state: &CafeResourceModel) -> Result<(), ProviderError> {
        let id = state.require_id()?;
        self.client()?
            .delete(id)
            .await
            .map_err(|e| ProviderError::remote(Operation::Delete, Some(id), e))?;

        info!(cafe_id = id, "Deleted cafe");
        Ok(())
    }

    async fn fetch(
        &self,
        id: CafeId,
        operation: Operation,
    ) -> Result<Option<Cafe>, ProviderError> {
        let cafes = self
            .client()?
            .get_by_id(id)
            .await
            .map_err(|e| ProviderError::remote(operation, Some(id), e))?;

        let returned = cafes.len();
        let cafe = cafes.into_iter().find(|c| c.id == id);
        if cafe.is_none() && returned > 0 {
            debug!(cafe_id = id, returned, "API returned only cafes with other identifiers");
        }
        Ok(cafe)
    }
}

#[async_trait::async_trait]
impl Resource for CafeResource {
    fn type_name(&self, provider_type_name: &str) -> String {
        format!("{}{}", provider_type_name, CAFE_TYPE_SUFFIX)
    }

    fn schema(&self) -> Schema {
        cafe_schema()
    }

    fn configure(&self, provider_data: Option<&ProviderData>) -> Result<(), ProviderError> {
        let Some(data) = provider_data else {
            return Ok(());
        };

        let client = data.expect_type::<SharedClient>()?;
        if self.client.set(Arc::clone(client)).is_err() {
            debug!("Cafe resource already configured, keeping existing client");
        }
        Ok(())
    }

    async fn create(&self, planned_state: Value) -> Result<Value, ProviderError> {
        let plan = CafeResourceModel::from_state(planned_state)?;
        Ok(self.create_cafe(&plan).await?.to_state())
    }

    async fn read(&self, current_state: Value) -> Result<Value, ProviderError> {
        let state = CafeResourceModel::from_state(current_state)?;
        Ok(self.read_cafe(&state).await?.to_state())
    }

    async fn update(
        &self,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        let mut plan = CafeResourceModel::from_state(planned_state)?;
        if plan.id.is_none() {
            plan.id = CafeResourceModel::from_state(prior_state)?.id;
        }
        Ok(self.update_cafe(&plan).await?.to_state())
    }

    async fn delete(&self, current_state: Value) -> Result<(), ProviderError> {
        let state = CafeResourceModel::from_state(current_state)?;
        self.delete_cafe(&state).await
    }

    #[instrument(skip(self), name = "cafe.import")]
    async fn import(&self, id: &str) -> Result<Value, ProviderError> {
        let state = CafeResourceModel {
            id: Some(parse_id_str(id)?),
            ..Default::default()
        };
        Ok(self.read_cafe(&state).await?.to_state())
    }
}
