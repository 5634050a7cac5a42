//! Error types for the cafe provider.

use std::fmt;

use thiserror::Error;

use crate::client::{CafeId, ClientError};
use crate::schema::Diagnostic;

/// The remote operation a [`ProviderError::Remote`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Creating a cafe.
    Create,
    /// Reading a cafe by identifier.
    Read,
    /// Updating a cafe.
    Update,
    /// Deleting a cafe.
    Delete,
    /// Listing every cafe.
    List,
}

impl Operation {
    fn verb(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::List => "list",
        }
    }

    fn gerund(self) -> &'static str {
        match self {
            Self::Create => "creating",
            Self::Read => "reading",
            Self::Update => "updating",
            Self::Delete => "deleting",
            Self::List => "listing",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}

/// Errors that can occur while serving the provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The remote system has no cafe with the requested identifier.
    ///
    /// On read, the orchestrator drops the resource from managed state.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Configure received provider data of the wrong type.
    #[error("Expected {expected}, got: {actual}")]
    UnexpectedProviderData {
        /// The type the resource knows how to use.
        expected: &'static str,
        /// The type that was supplied.
        actual: &'static str,
    },

    /// The provider configuration is invalid, or a resource was used before configure.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A persisted attribute could not be turned into the remote format.
    #[error("Invalid value for '{attribute}': {message}")]
    Conversion {
        /// The attribute that failed to convert.
        attribute: String,
        /// Why it failed.
        message: String,
    },

    /// The remote client returned an error.
    #[error("Could not {operation} cafe: {source}")]
    Remote {
        /// Which operation failed.
        operation: Operation,
        /// The cafe involved, when known.
        id: Option<CafeId>,
        /// The client error.
        #[source]
        source: ClientError,
    },

    /// A validation error occurred.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The requested resource type is unknown.
    #[error("Unknown resource type: {0}")]
    UnknownResource(String),

    /// The requested data source type is unknown.
    #[error("Unknown data source type: {0}")]
    UnknownDataSource(String),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Operation not implemented.
    #[error("Unimplemented: {0}")]
    Unimplemented(String),
}

impl ProviderError {
    /// Wrap a client error raised by `operation`.
    pub fn remote(operation: Operation, id: Option<CafeId>, source: ClientError) -> Self {
        Self::Remote {
            operation,
            id,
            source,
        }
    }

    /// Build a conversion error for `attribute`.
    pub fn conversion(attribute: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Conversion {
            attribute: attribute.into(),
            message: message.into(),
        }
    }

    /// Whether this error means the remote cafe no longer exists.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Render this error as an operator-facing diagnostic.
    ///
    /// The summary classifies the failure; the detail carries the
    /// underlying error text.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            Self::NotFound(msg) => Diagnostic::error("Cafe not found").with_detail(msg.clone()),
            Self::UnexpectedProviderData { expected, actual } => {
                Diagnostic::error("Unexpected Resource Configure Type").with_detail(format!(
                    "Expected {}, got: {}. Please report this issue to the provider developers.",
                    expected, actual
                ))
            },
            Self::Configuration(msg) => {
                Diagnostic::error("Provider configuration error").with_detail(msg.clone())
            },
            Self::Conversion { attribute, message } => {
                Diagnostic::error(format!("Invalid cafe {}", attribute))
                    .with_detail(message.clone())
                    .with_attribute(attribute.clone())
            },
            Self::Remote {
                operation,
                id,
                source,
            } => {
                let detail = match id {
                    Some(id) => format!(
                        "Could not {} cafe ID {}: {}",
                        operation.verb(),
                        id,
                        source
                    ),
                    None => format!(
                        "Could not {} cafe, unexpected error: {}",
                        operation.verb(),
                        source
                    ),
                };
                Diagnostic::error(format!("Error {} cafe", operation.gerund())).with_detail(detail)
            },
            Self::Validation(msg) => Diagnostic::error("Validation error").with_detail(msg.clone()),
            Self::UnknownResource(msg) => {
                Diagnostic::error("Unknown resource type").with_detail(msg.clone())
            },
            Self::UnknownDataSource(name) => {
                Diagnostic::error("Unknown data source type").with_detail(name.clone())
            },
            Self::Serialization(err) => {
                Diagnostic::error("Serialization error").with_detail(err.to_string())
            },
            Self::Unimplemented(msg) => {
                Diagnostic::error("Unimplemented").with_detail(msg.clone())
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::DiagnosticSeverity;

    #[test]
    fn test_error_display() {
        let err = ProviderError::NotFound("cafe 42".to_string());
        assert_eq!(format!("{}", err), "Resource not found: cafe 42");

        let err = ProviderError::Validation("invalid input".to_string());
        assert_eq!(format!("{}", err), "Validation error: invalid input");

        let err = ProviderError::UnknownResource("hashicups_tea".to_string());
        assert_eq!(format!("{}", err), "Unknown resource type: hashicups_tea");

        let err = ProviderError::UnknownDataSource("hashicups_teas".to_string());
        assert_eq!(format!("{}", err), "Unknown data source type: hashicups_teas");

        let err = ProviderError::conversion("id", "not an integer");
        assert_eq!(format!("{}", err), "Invalid value for 'id': not an integer");
    }

    #[test]
    fn test_remote_error_diagnostic_without_id() {
        let err = ProviderError::remote(
            Operation::Create,
            None,
            ClientError::Rejected("connection refused".to_string()),
        );
        assert_eq!(err.to_string(), "Could not create cafe: connection refused");

        let diag = err.to_diagnostic();
        assert_eq!(diag.severity, DiagnosticSeverity::Error);
        assert_eq!(diag.summary, "Error creating cafe");
        assert_eq!(
            diag.detail.as_deref(),
            Some("Could not create cafe, unexpected error: connection refused")
        );
    }

    #[test]
    fn test_remote_error_diagnostic_with_id() {
        let err = ProviderError::remote(
            Operation::Update,
            Some(7),
            ClientError::Status {
                status: 400,
                body: "bad name".to_string(),
            },
        );
        let diag = err.to_diagnostic();
        assert_eq!(diag.summary, "Error updating cafe");
        assert_eq!(
            diag.detail.as_deref(),
            Some("Could not update cafe ID 7: status: 400, body: bad name")
        );
    }

    #[test]
    fn test_unexpected_provider_data_diagnostic() {
        let err = ProviderError::UnexpectedProviderData {
            expected: "Client",
            actual: "String",
        };
        let diag = err.to_diagnostic();
        assert_eq!(diag.summary, "Unexpected Resource Configure Type");
        let detail = diag.detail.unwrap();
        assert!(detail.contains("Expected Client"));
        assert!(detail.contains("got: String"));
    }

    #[test]
    fn test_conversion_diagnostic_names_attribute() {
        let diag = ProviderError::conversion("id", "expected an integer").to_diagnostic();
        assert_eq!(diag.summary, "Invalid cafe id");
        assert_eq!(diag.attribute.as_deref(), Some("id"));
    }

    #[test]
    fn test_is_not_found() {
        assert!(ProviderError::NotFound("x".to_string()).is_not_found());
        assert!(!ProviderError::Validation("x".to_string()).is_not_found());
    }
}
