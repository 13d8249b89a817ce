//! Connection plumbing for the document store backing the product services.
//!
//! # Features
//!
//! - `mongodb` (default) - MongoDB client construction, retrying connect and health probes
//! - `config` - `core_config::FromEnv` for [`mongodb::MongoConfig`]
//!
//! ```ignore
//! use database::mongodb::{MongoConfig, connect_from_config_with_retry};
//!
//! let config = MongoConfig::with_database("mongodb://localhost:27017", "product_management");
//! let client = connect_from_config_with_retry(&config, None).await?;
//! let db = client.database(config.database());
//! ```

pub mod common;

#[cfg(feature = "mongodb")]
pub mod mongodb;

pub use common::{DatabaseError, DatabaseResult};
