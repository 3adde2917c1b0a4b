//! Reconciliation logic for a single KVM entry.
//!
//! Makes the remote entry's value equal the desired one with the fewest
//! mutating calls:
//! 1. Query the entry by name (404 means absent, not failure)
//! 2. Same value: return it untouched
//! 3. Different value: delete it
//! 4. Absent or deleted: insert the desired entry
//!
//! The API has no atomic replace, so a crash between delete and insert leaves
//! the entry absent until the next run. Re-running is always safe.

use crate::error::{Step, UpsertError};
use apigee_client::{ApigeeClientTrait, KvmEntry, KvmPath};
use tracing::{debug, error, info};

/// Where the desired entry should end up, and what it should hold
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertTarget {
    pub path: KvmPath,
    pub entry: KvmEntry,
}

impl UpsertTarget {
    /// All five fields are required and must be non-empty.
    pub fn new(
        org: impl Into<String>,
        env: impl Into<String>,
        kvm: impl Into<String>,
        entry_name: impl Into<String>,
        entry_value: impl Into<String>,
    ) -> Result<Self, UpsertError> {
        let target = Self {
            path: KvmPath::new(org, env, kvm),
            entry: KvmEntry::new(entry_name, entry_value),
        };

        let fields = [
            ("org", &target.path.org),
            ("env", &target.path.env),
            ("kvm", &target.path.kvm),
            ("entryname", &target.entry.name),
            ("entryvalue", &target.entry.value),
        ];
        let empty: Vec<String> = fields
            .iter()
            .filter(|(_, value)| value.is_empty())
            .map(|(flag, _)| format!("--{flag}"))
            .collect();
        if !empty.is_empty() {
            return Err(UpsertError::InvalidConfig(format!(
                "empty arguments: {}",
                empty.join(", ")
            )));
        }

        Ok(target)
    }
}

/// Final state of an upsert
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// The entry already held the desired value; nothing was changed
    Unchanged(KvmEntry),
    /// The entry was absent and has been created
    Created(KvmEntry),
    /// The entry held another value and has been deleted and re-created
    Replaced { previous: KvmEntry, entry: KvmEntry },
}

impl UpsertOutcome {
    /// The entry as it now exists remotely
    pub fn entry(&self) -> &KvmEntry {
        match self {
            UpsertOutcome::Unchanged(entry)
            | UpsertOutcome::Created(entry)
            | UpsertOutcome::Replaced { entry, .. } => entry,
        }
    }

    pub fn into_entry(self) -> KvmEntry {
        match self {
            UpsertOutcome::Unchanged(entry)
            | UpsertOutcome::Created(entry)
            | UpsertOutcome::Replaced { entry, .. } => entry,
        }
    }

    /// Whether any mutating call was made
    pub fn changed(&self) -> bool {
        !matches!(self, UpsertOutcome::Unchanged(_))
    }
}

/// Reconciles one KVM entry against the management API.
pub struct KvmReconciler {
    client: Box<dyn ApigeeClientTrait>,
}

impl std::fmt::Debug for KvmReconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KvmReconciler")
            .field("base_url", &self.client.base_url())
            .finish()
    }
}

impl KvmReconciler {
    /// Creates a new reconciler around an authenticated client.
    pub fn new(client: Box<dyn ApigeeClientTrait>) -> Self {
        Self { client }
    }

    /// Upserts the target entry.
    ///
    /// Steps run strictly in sequence and every failure is terminal; nothing
    /// is retried.
    pub async fn upsert(&self, target: &UpsertTarget) -> Result<UpsertOutcome, UpsertError> {
        let UpsertTarget { path, entry } = target;
        info!("Reconciling KVM entry {} in {}", entry.name, path);

        let existing = self
            .client
            .get_kvm_entry(path, &entry.name)
            .await
            .map_err(|e| fail(Step::Query, e))?;

        let previous = match existing {
            Some(existing) if existing.value == entry.value => {
                info!("KVM entry {} already up-to-date in {}", entry.name, path);
                return Ok(UpsertOutcome::Unchanged(existing));
            }
            Some(existing) => {
                info!("KVM entry {} differs in {}, deleting before insert", entry.name, path);
                self.client
                    .delete_kvm_entry(path, &entry.name)
                    .await
                    .map_err(|e| fail(Step::Delete, e))?;
                debug!("Deleted KVM entry {} from {}", entry.name, path);
                Some(existing)
            }
            None => {
                info!("KVM entry {} absent from {}, inserting", entry.name, path);
                None
            }
        };

        let created = self
            .client
            .create_kvm_entry(path, entry)
            .await
            .map_err(|e| fail(Step::Insert, e))?;
        info!("Inserted KVM entry {} into {}", created.name, path);

        Ok(match previous {
            Some(previous) => UpsertOutcome::Replaced { previous, entry: created },
            None => UpsertOutcome::Created(created),
        })
    }
}

fn fail(step: Step, source: apigee_client::ApigeeError) -> UpsertError {
    let err = UpsertError::at(step, source);
    error!("Failed to {}: {}", step, err);
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use apigee_client::{KvmOperation, MockApigeeClient};

    fn target(value: &str) -> UpsertTarget {
        UpsertTarget::new("acme", "test", "cfg", "flag", value).unwrap()
    }

    fn reconciler(mock: &MockApigeeClient) -> KvmReconciler {
        KvmReconciler::new(Box::new(mock.clone()))
    }

    #[tokio::test]
    async fn test_upsert_same_value_is_noop() {
        let mock = MockApigeeClient::new("http://test-apigee");
        let target = target("on");
        mock.add_entry(&target.path, KvmEntry::new("flag", "on"));

        let outcome = reconciler(&mock).upsert(&target).await.unwrap();

        assert_eq!(outcome, UpsertOutcome::Unchanged(KvmEntry::new("flag", "on")));
        assert!(!outcome.changed());
        assert_eq!(mock.operations(), vec![KvmOperation::Get]);
    }

    #[tokio::test]
    async fn test_upsert_repeated_is_idempotent() {
        let mock = MockApigeeClient::new("http://test-apigee");
        let target = target("on");
        let reconciler = reconciler(&mock);

        let first = reconciler.upsert(&target).await.unwrap();
        let second = reconciler.upsert(&target).await.unwrap();

        assert!(matches!(first, UpsertOutcome::Created(_)));
        assert_eq!(second, UpsertOutcome::Unchanged(KvmEntry::new("flag", "on")));
        assert_eq!(
            mock.operations(),
            vec![KvmOperation::Get, KvmOperation::Create, KvmOperation::Get]
        );
    }

    #[tokio::test]
    async fn test_upsert_absent_creates() {
        let mock = MockApigeeClient::new("http://test-apigee");
        let target = target("on");

        let outcome = reconciler(&mock).upsert(&target).await.unwrap();

        assert_eq!(outcome, UpsertOutcome::Created(KvmEntry::new("flag", "on")));
        assert_eq!(mock.operations(), vec![KvmOperation::Get, KvmOperation::Create]);
        let create = &mock.calls()[1];
        assert_eq!(create.path, KvmPath::new("acme", "test", "cfg"));
        assert_eq!(create.name, "flag");
        assert_eq!(create.value.as_deref(), Some("on"));
        assert_eq!(mock.entry(&target.path, "flag"), Some(KvmEntry::new("flag", "on")));
    }

    #[tokio::test]
    async fn test_upsert_mismatch_deletes_then_inserts() {
        let mock = MockApigeeClient::new("http://test-apigee");
        let target = target("on");
        mock.add_entry(&target.path, KvmEntry::new("flag", "off"));

        let outcome = reconciler(&mock).upsert(&target).await.unwrap();

        assert_eq!(
            outcome,
            UpsertOutcome::Replaced {
                previous: KvmEntry::new("flag", "off"),
                entry: KvmEntry::new("flag", "on"),
            }
        );
        assert_eq!(outcome.entry().value, "on");
        assert_eq!(
            mock.operations(),
            vec![KvmOperation::Get, KvmOperation::Delete, KvmOperation::Create]
        );
        assert_eq!(mock.entry(&target.path, "flag"), Some(KvmEntry::new("flag", "on")));
    }

    #[tokio::test]
    async fn test_query_error_stops_before_mutation() {
        let mock = MockApigeeClient::new("http://test-apigee");
        let target = target("on");
        mock.add_entry(&target.path, KvmEntry::new("flag", "off"));
        mock.fail_next(KvmOperation::Get, 500);

        let err = reconciler(&mock).upsert(&target).await.unwrap_err();

        assert!(matches!(err, UpsertError::QueryFailed { status: 500 }));
        assert_eq!(err.status(), Some(500));
        assert_eq!(mock.operations(), vec![KvmOperation::Get]);
        assert_eq!(mock.entry(&target.path, "flag"), Some(KvmEntry::new("flag", "off")));
    }

    #[tokio::test]
    async fn test_delete_error_skips_insert() {
        let mock = MockApigeeClient::new("http://test-apigee");
        let target = target("on");
        mock.add_entry(&target.path, KvmEntry::new("flag", "off"));
        mock.fail_next(KvmOperation::Delete, 403);

        let err = reconciler(&mock).upsert(&target).await.unwrap_err();

        assert!(matches!(err, UpsertError::DeleteFailed { status: 403 }));
        assert_eq!(mock.operations(), vec![KvmOperation::Get, KvmOperation::Delete]);
    }

    #[tokio::test]
    async fn test_insert_error_carries_status() {
        let mock = MockApigeeClient::new("http://test-apigee");
        let target = target("on");
        mock.fail_next(KvmOperation::Create, 400);

        let err = reconciler(&mock).upsert(&target).await.unwrap_err();

        assert!(matches!(err, UpsertError::InsertFailed { status: 400 }));
        assert_eq!(mock.entry(&target.path, "flag"), None);
    }

    #[tokio::test]
    async fn test_rerun_after_interrupted_replace_recovers() {
        let mock = MockApigeeClient::new("http://test-apigee");
        let target = target("on");
        mock.add_entry(&target.path, KvmEntry::new("flag", "off"));
        mock.fail_next(KvmOperation::Create, 503);
        let reconciler = reconciler(&mock);

        assert!(reconciler.upsert(&target).await.is_err());
        assert_eq!(mock.entry(&target.path, "flag"), None);

        let outcome = reconciler.upsert(&target).await.unwrap();
        assert_eq!(outcome, UpsertOutcome::Created(KvmEntry::new("flag", "on")));
    }

    #[test]
    fn test_target_rejects_empty_fields() {
        let err = UpsertTarget::new("acme", "", "cfg", "flag", "").unwrap_err();
        match err {
            UpsertError::InvalidConfig(msg) => {
                assert_eq!(msg, "empty arguments: --env, --entryvalue");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
