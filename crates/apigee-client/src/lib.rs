//! Apigee Management API Client
//!
//! A small client for the environment-scoped key-value map (KVM) entry
//! resource of the Apigee management API.
//!
//! # Example
//!
//! ```no_run
//! use apigee_client::{ApigeeClient, KvmEntry, KvmPath};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ApigeeClient::new(
//!     "https://apigee.googleapis.com".to_string(),
//!     "ya29.token".to_string(),
//!     Duration::from_secs(30),
//! )?;
//!
//! let path = KvmPath::new("acme", "test", "cfg");
//! if client.get_kvm_entry(&path, "flag").await?.is_none() {
//!     client.create_kvm_entry(&path, &KvmEntry::new("flag", "on")).await?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod models;
#[path = "trait.rs"]
pub mod apigee_trait;
#[cfg(feature = "test-util")]
pub mod mock;

pub use apigee_trait::ApigeeClientTrait;
pub use client::{ApigeeClient, DEFAULT_MGMT_URL};
pub use error::ApigeeError;
#[cfg(feature = "test-util")]
pub use mock::{KvmCall, KvmOperation, MockApigeeClient};
pub use models::*;
