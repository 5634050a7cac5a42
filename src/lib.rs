//! Cafe Provider
//!
//! A declarative-infrastructure provider that manages cafes held by a
//! HashiCups-style HTTP API. It follows the resource model established by
//! [terraform-plugin-framework](https://github.com/hashicorp/terraform-plugin-framework):
//! the orchestrator owns plan and state, the provider maps each lifecycle call
//! onto one request against the remote API.
//!
//! # Overview
//!
//! The crate provides:
//!
//! - **ProviderService trait**: The surface the orchestrator drives
//! - **CafeProvider**: Serves the `hashicups_cafe` resource and the `hashicups_cafes` data source
//! - **Schema types**: Types for describing provider, resource, and data source schemas
//! - **Planning and validation**: Schema-driven plan computation and config checks
//! - **CafeClient trait**: The remote API contract, with an HTTP implementation
//! - **Error types**: A typed error taxonomy that renders to diagnostics
//! - **Logging**: Integration with `tracing` for structured logging
//!
//! # Quick Start
//!
//! ```ignore
//! use cafe_provider::{CafeProvider, ProviderService};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     cafe_provider::init_logging();
//!
//!     let provider = CafeProvider::new();
//!     let diagnostics = provider
//!         .configure(json!({"host": "http://localhost:19090"}))
//!         .await?;
//!     assert!(diagnostics.is_empty());
//!
//!     let plan = provider
//!         .plan("hashicups_cafe", None, json!({"name": "Sample Cafe"}), json!({}))
//!         .await?;
//!     let state = provider.create("hashicups_cafe", plan.planned_state).await?;
//!     tracing::info!(id = %state["id"], "created");
//!     Ok(())
//! }
//! ```
//!
//! # Lifecycle
//!
//! - **Schema / Metadata**: Type names and schemas for the provider block, resources and data sources
//! - **ValidateProviderConfig / Configure**: Check the provider block, connect, hand the client to every resource
//! - **ValidateResourceConfig / Plan**: Check resource config and compute planned state
//! - **Create/Read/Update/Delete**: CRUD operations for the cafe resource
//! - **ImportResource**: Brings an existing cafe under management by its identifier
//! - **ReadDataSource**: Lists every cafe

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cafe;
pub mod cafes;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod plan;
pub mod provider;
pub mod resource;
pub mod schema;
pub mod service;
pub mod testing;
pub mod types;
pub mod validation;

// Re-export main types at crate root
pub use cafe::{CafeResource, CafeResourceModel};
pub use cafes::CafesDataSource;
pub use client::{
    Cafe, CafeAttributes, CafeClient, CafeId, ClientError, Credentials, HttpCafeClient,
    SharedClient,
};
pub use config::ProviderConfig;
pub use error::{Operation, ProviderError};
pub use logging::{init_logging, init_logging_with_default, try_init_logging};
pub use provider::CafeProvider;
pub use resource::{DataSource, ProviderData, Resource};
pub use schema::ProviderSchema;
pub use service::ProviderService;
pub use types::{AttributeChange, ImportedResource, PlanResult, ProviderMetadata};
pub use validation::{is_valid, validate, validate_result};

// Re-export async_trait for convenience
pub use async_trait::async_trait;

// Re-export commonly used external types
pub use serde_json;
pub use tracing;
