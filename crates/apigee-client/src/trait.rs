//! ApigeeClient trait for mocking
//!
//! This trait abstracts the ApigeeClient so reconciliation logic can be
//! unit tested against an in-memory implementation.

use crate::error::ApigeeError;
use crate::models::{KvmEntry, KvmPath};

/// Trait for the KVM entry operations of the Apigee management API
///
/// All async methods must be `Send` to work with Tokio's work-stealing runtime.
#[async_trait::async_trait]
pub trait ApigeeClientTrait: Send + Sync {
    /// Get the base URL
    fn base_url(&self) -> &str;

    /// `Ok(None)` when the entry does not exist
    async fn get_kvm_entry(&self, path: &KvmPath, name: &str) -> Result<Option<KvmEntry>, ApigeeError>;
    async fn delete_kvm_entry(&self, path: &KvmPath, name: &str) -> Result<(), ApigeeError>;
    async fn create_kvm_entry(&self, path: &KvmPath, entry: &KvmEntry) -> Result<KvmEntry, ApigeeError>;
}
