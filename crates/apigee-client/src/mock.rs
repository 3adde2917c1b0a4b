//! Mock ApigeeClient for unit testing
//!
//! Stores entries in memory and records every call, so tests can assert on
//! exactly which mutating requests a piece of logic issued and in what order.
//! Any operation can be primed to fail once with a given HTTP status.

use crate::apigee_trait::ApigeeClientTrait;
use crate::error::ApigeeError;
use crate::models::{KvmEntry, KvmPath};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// The three entry operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KvmOperation {
    Get,
    Delete,
    Create,
}

impl KvmOperation {
    fn method(self) -> &'static str {
        match self {
            KvmOperation::Get => "GET",
            KvmOperation::Delete => "DELETE",
            KvmOperation::Create => "POST",
        }
    }
}

/// A call recorded by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KvmCall {
    pub operation: KvmOperation,
    pub path: KvmPath,
    pub name: String,
    /// Set for `Create` only
    pub value: Option<String>,
}

/// Mock ApigeeClient for testing
#[derive(Debug, Clone)]
pub struct MockApigeeClient {
    pub(crate) base_url: String,
    pub(crate) entries: Arc<Mutex<HashMap<(KvmPath, String), String>>>,
    pub(crate) calls: Arc<Mutex<Vec<KvmCall>>>,
    pub(crate) failures: Arc<Mutex<HashMap<KvmOperation, u16>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

impl MockApigeeClient {
    /// Create a new mock client
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            entries: Arc::new(Mutex::new(HashMap::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            failures: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Add an entry to the mock store (for test setup)
    pub fn add_entry(&self, path: &KvmPath, entry: KvmEntry) {
        lock(&self.entries).insert((path.clone(), entry.name), entry.value);
    }

    /// Current value of an entry, if present
    pub fn entry(&self, path: &KvmPath, name: &str) -> Option<KvmEntry> {
        lock(&self.entries)
            .get(&(path.clone(), name.to_string()))
            .map(|value| KvmEntry::new(name, value.clone()))
    }

    /// Make the next call of `operation` answer with `status`
    pub fn fail_next(&self, operation: KvmOperation, status: u16) {
        lock(&self.failures).insert(operation, status);
    }

    /// All calls made so far, in order
    pub fn calls(&self) -> Vec<KvmCall> {
        lock(&self.calls).clone()
    }

    /// Operations of all calls made so far, in order
    pub fn operations(&self) -> Vec<KvmOperation> {
        lock(&self.calls).iter().map(|c| c.operation).collect()
    }

    fn record(&self, operation: KvmOperation, path: &KvmPath, name: &str, value: Option<&str>) -> Result<(), ApigeeError> {
        lock(&self.calls).push(KvmCall {
            operation,
            path: path.clone(),
            name: name.to_string(),
            value: value.map(str::to_string),
        });

        match lock(&self.failures).remove(&operation) {
            Some(status) => Err(ApigeeError::UnexpectedStatus {
                method: operation.method(),
                url: format!("{}{}", self.base_url, path.entry_path(name)),
                status,
                body: String::new(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl ApigeeClientTrait for MockApigeeClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_kvm_entry(&self, path: &KvmPath, name: &str) -> Result<Option<KvmEntry>, ApigeeError> {
        self.record(KvmOperation::Get, path, name, None)?;
        Ok(self.entry(path, name))
    }

    async fn delete_kvm_entry(&self, path: &KvmPath, name: &str) -> Result<(), ApigeeError> {
        self.record(KvmOperation::Delete, path, name, None)?;
        let removed = lock(&self.entries).remove(&(path.clone(), name.to_string()));
        if removed.is_none() {
            return Err(ApigeeError::UnexpectedStatus {
                method: "DELETE",
                url: format!("{}{}", self.base_url, path.entry_path(name)),
                status: 404,
                body: String::new(),
            });
        }
        Ok(())
    }

    async fn create_kvm_entry(&self, path: &KvmPath, entry: &KvmEntry) -> Result<KvmEntry, ApigeeError> {
        self.record(KvmOperation::Create, path, &entry.name, Some(entry.value.as_str()))?;
        let mut entries = lock(&self.entries);
        let key = (path.clone(), entry.name.clone());
        if entries.contains_key(&key) {
            return Err(ApigeeError::UnexpectedStatus {
                method: "POST",
                url: format!("{}{}", self.base_url, path.entries_path()),
                status: 409,
                body: String::new(),
            });
        }
        entries.insert(key, entry.value.clone());
        Ok(entry.clone())
    }
}
