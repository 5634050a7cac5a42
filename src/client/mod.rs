//! Remote cafe API contract.
//!
//! The provider never talks HTTP directly. Resource and data source
//! implementations only see the [`CafeClient`] trait, so any client that
//! honours the contract (the bundled [`HttpCafeClient`], the in-memory
//! [`MockCafeClient`](crate::testing::MockCafeClient), or an embedder's own)
//! can be injected at configure time.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod http;

pub use http::{Credentials, HttpCafeClient};

/// Identifier the remote API assigns to a cafe.
pub type CafeId = i64;

/// The client handle shared by every resource after configure.
pub type SharedClient = Arc<dyn CafeClient>;

/// User-settable attributes of a cafe, as sent to the remote API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CafeAttributes {
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Street address.
    #[serde(default)]
    pub address: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Image URL.
    #[serde(default)]
    pub image: String,
}

/// A cafe as returned by the remote API.
///
/// Every field defaults when the API omits it, which is how partial update
/// responses decode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cafe {
    /// Remote-assigned identifier.
    #[serde(default)]
    pub id: CafeId,
    /// The cafe's attributes.
    #[serde(flatten)]
    pub attributes: CafeAttributes,
}

impl Cafe {
    /// Create a cafe from an identifier and its attributes.
    pub fn new(id: CafeId, attributes: CafeAttributes) -> Self {
        Self { id, attributes }
    }
}

/// Errors returned by a [`CafeClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request could not be sent or the response could not be read.
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("status: {status}, body: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, verbatim.
        body: String,
    },

    /// The API answered with a body that does not match the expected shape.
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// The client rejected the call without reaching the API.
    #[error("{0}")]
    Rejected(String),
}

/// Operations the remote cafe API offers.
///
/// Implementations must be safe to call from many tasks at once: the same
/// handle is shared by every resource instance the orchestrator manages.
#[async_trait::async_trait]
pub trait CafeClient: Send + Sync + 'static {
    /// Create a cafe. The API assigns the identifier.
    async fn create(&self, cafe: &CafeAttributes) -> Result<Cafe, ClientError>;

    /// Fetch the cafes matching `id`. An empty result means no such cafe.
    async fn get_by_id(&self, id: CafeId) -> Result<Vec<Cafe>, ClientError>;

    /// Fetch every cafe.
    async fn list_all(&self) -> Result<Vec<Cafe>, ClientError>;

    /// Update a cafe. The response may only carry part of the entity.
    async fn update(&self, id: CafeId, cafe: &Cafe) -> Result<Cafe, ClientError>;

    /// Delete a cafe.
    async fn delete(&self, id: CafeId) -> Result<(), ClientError>;
}
