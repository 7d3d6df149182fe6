//! Reconciler for comparing local definitions against remote records.
//!
//! This module implements the push/pull diffing brain: it resolves the
//! target set for an invocation, fetches the matching remote records in
//! one batched query, and produces one [`ChangeSet`] per local definition.

use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::platform::{FunctionDirectory, RemoteFunctionRecord};
use crate::project::ProjectReader;

use super::changeset::ChangeSet;

/// Reconciler over a project tree and a function directory.
pub struct Reconciler<'a, D: FunctionDirectory, P: ProjectReader> {
    /// Remote function directory.
    directory: &'a D,
    /// Local project reader.
    reader: &'a P,
}

/// Reconciliation result for a single function.
#[derive(Debug)]
pub struct ReconcileEntry {
    /// Function name.
    pub name: String,
    /// The computed change, or the per-function error that prevented it.
    pub change: Result<ChangeSet>,
}

/// Result of reconciling a full target set.
#[derive(Debug, Default)]
pub struct ReconcileReport {
    /// One entry per targeted function, in target order.
    pub entries: Vec<ReconcileEntry>,
}

impl<'a, D: FunctionDirectory, P: ProjectReader> Reconciler<'a, D, P> {
    /// Creates a new reconciler.
    #[must_use]
    pub const fn new(directory: &'a D, reader: &'a P) -> Self {
        Self { directory, reader }
    }

    /// Reconciles the requested functions against the platform.
    ///
    /// A failure to read one function's definition is recorded in that
    /// function's entry; it never aborts reconciliation of the others.
    ///
    /// # Errors
    ///
    /// Returns an error if target resolution or the batched remote query
    /// fails.
    pub async fn reconcile(&self, requested: &[String], all: bool) -> Result<ReconcileReport> {
        let targets = self.reader.resolve_targets(requested, all)?;
        info!("Reconciling {} function(s)", targets.len());

        let remote = self.directory.list_by_names(targets.clone()).await?;
        let by_name: HashMap<&str, &RemoteFunctionRecord> =
            remote.iter().map(|r| (r.name.as_str(), r)).collect();

        debug!("Fetched {} remote record(s)", remote.len());

        let mut entries = Vec::with_capacity(targets.len());

        for name in targets {
            let change = match self.reader.read_definition(&name) {
                Ok(local) => Ok(ChangeSet::compute(&local, by_name.get(name.as_str()).copied())),
                Err(e) => {
                    warn!("Failed to read definition for '{name}': {e}");
                    Err(e)
                }
            };

            entries.push(ReconcileEntry { name, change });
        }

        Ok(ReconcileReport { entries })
    }
}

impl ReconcileReport {
    /// Returns true if any function has an actionable change.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.entries
            .iter()
            .any(|e| matches!(&e.change, Ok(c) if !c.is_unchanged()))
    }

    /// Names of functions whose remote record already matches.
    #[must_use]
    pub fn unchanged_names(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| matches!(&e.change, Ok(c) if c.is_unchanged()))
            .map(|e| e.name.as_str())
            .collect()
    }

    /// The actionable changes, paired with their function names.
    #[must_use]
    pub fn changed(&self) -> Vec<(String, ChangeSet)> {
        self.entries
            .iter()
            .filter_map(|e| match &e.change {
                Ok(c) if !c.is_unchanged() => Some((e.name.clone(), c.clone())),
                _ => None,
            })
            .collect()
    }

    /// Per-function reconciliation failures as `(name, message)` pairs.
    #[must_use]
    pub fn failures(&self) -> Vec<(&str, String)> {
        self.entries
            .iter()
            .filter_map(|e| match &e.change {
                Err(err) => Some((e.name.as_str(), err.to_string())),
                Ok(_) => None,
            })
            .collect()
    }
}

impl std::fmt::Display for ReconcileReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let creates = self
            .entries
            .iter()
            .filter(|e| matches!(&e.change, Ok(ChangeSet::NewFunction(_))))
            .count();
        let updates = self
            .entries
            .iter()
            .filter(|e| matches!(&e.change, Ok(ChangeSet::UpdatedFunction { .. })))
            .count();
        let unchanged = self.unchanged_names().len();
        let failed = self.failures().len();

        write!(
            f,
            "{creates} to create, {updates} to update, {unchanged} unchanged, {failed} failed"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{
        FunctionManifest, FunctionState, MockFunctionDirectory, RemoteFunctionRecord,
    };
    use crate::project::{FsProjectReader, CONFIG_FILE};
    use mockall::predicate::eq;
    use std::path::Path;
    use tempfile::TempDir;
    use uuid::Uuid;

    fn write_function(root: &Path, name: &str, code: &str) {
        let folder = root.join(name);
        std::fs::create_dir_all(&folder).expect("Failed to create folder");
        std::fs::write(folder.join(CONFIG_FILE), format!("name: {name}\n"))
            .expect("Failed to write config");
        std::fs::write(folder.join("index.js"), code).expect("Failed to write code");
    }

    fn remote_record(name: &str, code: &str) -> RemoteFunctionRecord {
        RemoteFunctionRecord {
            uuid: Uuid::from_u128(42),
            name: name.to_string(),
            description: String::new(),
            event_id: None,
            skills: vec![],
            state: FunctionState::Productive,
            manifest: FunctionManifest {
                code: code.to_string(),
                environment: std::collections::BTreeMap::new(),
                version: 1,
            },
            deployed_at: None,
        }
    }

    #[tokio::test]
    async fn classifies_unchanged_updated_and_new() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        write_function(temp.path(), "a", "same");
        write_function(temp.path(), "b", "local version");
        write_function(temp.path(), "c", "brand new");

        let mut directory = MockFunctionDirectory::new();
        directory
            .expect_list_by_names()
            .with(eq(vec![
                String::from("a"),
                String::from("b"),
                String::from("c"),
            ]))
            .returning(|_| {
                Ok(vec![
                    remote_record("a", "same"),
                    remote_record("b", "remote version"),
                ])
            });

        let reader = FsProjectReader::new(temp.path());
        let reconciler = Reconciler::new(&directory, &reader);

        let report = reconciler
            .reconcile(&[], true)
            .await
            .expect("reconcile should succeed");

        assert_eq!(report.entries.len(), 3);
        assert!(matches!(
            report.entries[0].change,
            Ok(ChangeSet::Unchanged)
        ));
        assert!(matches!(
            report.entries[1].change,
            Ok(ChangeSet::UpdatedFunction { .. })
        ));
        assert!(matches!(
            report.entries[2].change,
            Ok(ChangeSet::NewFunction(_))
        ));
        assert_eq!(report.unchanged_names(), vec!["a"]);
        assert_eq!(report.changed().len(), 2);
    }

    #[tokio::test]
    async fn unchanged_tree_is_idempotent() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        write_function(temp.path(), "a", "same");
        write_function(temp.path(), "b", "also same");

        let mut directory = MockFunctionDirectory::new();
        directory.expect_list_by_names().returning(|_| {
            Ok(vec![
                remote_record("a", "same"),
                remote_record("b", "also same"),
            ])
        });

        let reader = FsProjectReader::new(temp.path());
        let reconciler = Reconciler::new(&directory, &reader);

        let report = reconciler
            .reconcile(&[], true)
            .await
            .expect("reconcile should succeed");

        assert!(!report.has_changes());
        assert!(report.changed().is_empty());
    }

    #[tokio::test]
    async fn unreadable_function_fails_alone() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        write_function(temp.path(), "good", "code");
        // A folder with a config that cannot be parsed.
        let broken = temp.path().join("broken");
        std::fs::create_dir_all(&broken).expect("Failed to create folder");
        std::fs::write(broken.join(CONFIG_FILE), ": not yaml :\n-")
            .expect("Failed to write config");

        let mut directory = MockFunctionDirectory::new();
        directory
            .expect_list_by_names()
            .returning(|_| Ok(vec![remote_record("good", "code")]));

        let reader = FsProjectReader::new(temp.path());
        let reconciler = Reconciler::new(&directory, &reader);

        let report = reconciler
            .reconcile(&[String::from("broken"), String::from("good")], false)
            .await
            .expect("reconcile should succeed");

        assert_eq!(report.entries.len(), 2);
        assert!(report.entries[0].change.is_err());
        assert!(matches!(
            report.entries[1].change,
            Ok(ChangeSet::Unchanged)
        ));

        let failures = report.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, "broken");
    }
}
