//! Traits for individual resources and data sources.
//!
//! A provider serves one or more resource types. Each one implements
//! [`Resource`]: it names itself, describes its schema, receives the shared
//! client through [`Resource::configure`], and carries out the four lifecycle
//! operations. State crosses this boundary as `serde_json::Value`;
//! implementations convert it into their own typed model.

use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::ProviderError;
use crate::schema::Schema;

/// Whatever the provider hands its resources at configure time.
///
/// Type-erased so the provider can pass any handle. Resources downcast it to
/// the type they expect and report [`ProviderError::UnexpectedProviderData`]
/// when it is something else.
#[derive(Clone)]
pub struct ProviderData {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl ProviderData {
    /// Wrap a value.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            value: Arc::new(value),
            type_name: type_name::<T>(),
        }
    }

    /// Borrow the value as `T`, if that is what it holds.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    /// The name of the wrapped type.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Borrow the value as `T`, or fail naming both types.
    pub fn expect_type<T: Any>(&self) -> Result<&T, ProviderError> {
        self.downcast_ref::<T>()
            .ok_or(ProviderError::UnexpectedProviderData {
                expected: type_name::<T>(),
                actual: self.type_name,
            })
    }
}

impl fmt::Debug for ProviderData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderData")
            .field("type_name", &self.type_name)
            .finish()
    }
}

/// A managed resource type.
#[async_trait::async_trait]
pub trait Resource: Send + Sync + 'static {
    /// The full type name, given the provider's prefix.
    fn type_name(&self, provider_type_name: &str) -> String;

    /// The resource's schema. Must be the same on every call.
    fn schema(&self) -> Schema;

    /// Accept the provider's shared data.
    ///
    /// `None` means the provider is not configured yet; implementations
    /// must treat that as a no-op.
    fn configure(&self, provider_data: Option<&ProviderData>) -> Result<(), ProviderError>;

    /// Create the remote object and return the new state.
    async fn create(&self, planned_state: Value) -> Result<Value, ProviderError>;

    /// Refresh state from the remote object.
    ///
    /// Returns [`ProviderError::NotFound`] when the object is gone, so the
    /// orchestrator can drop it from state.
    async fn read(&self, current_state: Value) -> Result<Value, ProviderError>;

    /// Apply planned changes and return the new state.
    async fn update(
        &self,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError>;

    /// Delete the remote object.
    async fn delete(&self, current_state: Value) -> Result<(), ProviderError>;

    /// Build state for an existing remote object identified by `id`.
    async fn import(&self, id: &str) -> Result<Value, ProviderError> {
        Err(ProviderError::Unimplemented(format!(
            "import is not supported (id {})",
            id
        )))
    }
}

/// A read-only data source type.
#[async_trait::async_trait]
pub trait DataSource: Send + Sync + 'static {
    /// The full type name, given the provider's prefix.
    fn type_name(&self, provider_type_name: &str) -> String;

    /// The data source's schema.
    fn schema(&self) -> Schema;

    /// Accept the provider's shared data; `None` is a no-op.
    fn configure(&self, provider_data: Option<&ProviderData>) -> Result<(), ProviderError>;

    /// Read the data described by `config`.
    async fn read(&self, config: Value) -> Result<Value, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_data_downcast() {
        let data = ProviderData::new(42u32);
        assert_eq!(data.downcast_ref::<u32>(), Some(&42));
        assert!(data.downcast_ref::<String>().is_none());
        assert_eq!(data.type_name(), "u32");
    }

    #[test]
    fn test_provider_data_expect_type() {
        let data = ProviderData::new("handle".to_string());
        assert_eq!(data.expect_type::<String>().unwrap(), "handle");

        let err = data.expect_type::<u64>().unwrap_err();
        match err {
            ProviderError::UnexpectedProviderData { expected, actual } => {
                assert_eq!(expected, "u64");
                assert!(actual.ends_with("String"));
            },
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_provider_data_debug() {
        let data = ProviderData::new(1u8);
        assert_eq!(format!("{:?}", data), "ProviderData { type_name: \"u8\" }");
    }
}
