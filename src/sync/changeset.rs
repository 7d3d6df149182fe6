//! Change computation between local and remote function definitions.
//!
//! A [`ChangeSet`] is the pure result of comparing one local definition
//! against zero-or-one remote record. It never mutates remote state; the
//! orchestrator interprets it.

use tracing::debug;
use uuid::Uuid;

use crate::platform::{
    FunctionCreateBody, FunctionManifest, FunctionManifestPatch, FunctionMetaPatch, FunctionState,
    RemoteFunctionRecord, NEVER_DEPLOYED_VERSION,
};
use crate::project::LocalFunctionDefinition;

/// The change required to bring a remote function in line with a local
/// definition.
#[derive(Debug, Clone)]
pub enum ChangeSet {
    /// No remote record exists; the function must be created.
    NewFunction(FunctionCreateBody),
    /// A remote record exists and differs from the local definition.
    UpdatedFunction {
        /// Uuid of the remote record.
        uuid: Uuid,
        /// Metadata patch, carrying the new state label.
        meta: FunctionMetaPatch,
        /// Manifest patch, carrying only the changed fields.
        manifest: FunctionManifestPatch,
        /// Whether the code differs.
        code_changed: bool,
        /// Whether the environment differs.
        env_changed: bool,
    },
    /// The remote record already matches the local definition.
    Unchanged,
}

/// A change that passed the confirmation gate.
#[derive(Debug, Clone)]
pub struct ConfirmedOperation {
    /// Name of the function the change applies to.
    pub name: String,
    /// The approved change.
    pub change: ChangeSet,
}

impl ChangeSet {
    /// Computes the change for one local definition against its remote
    /// record, if any.
    #[must_use]
    pub fn compute(
        local: &LocalFunctionDefinition,
        remote: Option<&RemoteFunctionRecord>,
    ) -> Self {
        match remote {
            None => {
                debug!("Function '{}' has no remote record, creating", local.name);
                Self::NewFunction(FunctionCreateBody {
                    name: local.name.clone(),
                    description: local.description.clone(),
                    event_id: local.event_id.clone(),
                    state: FunctionState::Draft,
                    manifest: FunctionManifest {
                        code: local.code.clone(),
                        environment: local.environment.clone(),
                        version: NEVER_DEPLOYED_VERSION,
                    },
                })
            }
            Some(record) => Self::compute_update(local, record),
        }
    }

    /// Computes the update for a function that exists remotely.
    fn compute_update(local: &LocalFunctionDefinition, remote: &RemoteFunctionRecord) -> Self {
        let code_changed = local.code != remote.manifest.code;
        let env_changed = local.environment != remote.manifest.custom_environment();

        if !code_changed && !env_changed {
            debug!("Function '{}' is up to date", local.name);
            return Self::Unchanged;
        }

        debug!(
            "Function '{}' needs update (code: {code_changed}, env: {env_changed})",
            local.name
        );

        // A local change downgrades a productive function to pending
        // redeploy; a draft stays a draft.
        let state = match remote.state {
            FunctionState::Draft => FunctionState::Draft,
            FunctionState::Modified | FunctionState::Productive => FunctionState::Modified,
        };

        let meta = FunctionMetaPatch {
            description: (local.description != remote.description)
                .then(|| local.description.clone()),
            event_id: (local.event_id != remote.event_id)
                .then(|| local.event_id.clone())
                .flatten(),
            state: Some(state),
        };

        let manifest = FunctionManifestPatch {
            code: code_changed.then(|| local.code.clone()),
            environment: env_changed.then(|| local.environment.clone()),
            version: remote.manifest.version,
        };

        Self::UpdatedFunction {
            uuid: remote.uuid,
            meta,
            manifest,
            code_changed,
            env_changed,
        }
    }

    /// Returns true if this change requires no action.
    #[must_use]
    pub const fn is_unchanged(&self) -> bool {
        matches!(self, Self::Unchanged)
    }

    /// Short description of the changed fields, for confirmation prompts.
    #[must_use]
    pub fn summary(&self) -> String {
        match self {
            Self::NewFunction(_) => String::from("create"),
            Self::UpdatedFunction {
                code_changed,
                env_changed,
                ..
            } => {
                let mut fields = Vec::new();
                if *code_changed {
                    fields.push("code");
                }
                if *env_changed {
                    fields.push("environment");
                }
                format!("update: {}", fields.join(", "))
            }
            Self::Unchanged => String::from("unchanged"),
        }
    }
}

impl std::fmt::Display for ChangeSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::NewFunction(_) => "create",
            Self::UpdatedFunction { .. } => "update",
            Self::Unchanged => "unchanged",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{ENV_PLACEHOLDER_KEY, ENV_PLACEHOLDER_VALUE};
    use std::collections::BTreeMap;

    fn local(code: &str, env: &[(&str, &str)]) -> LocalFunctionDefinition {
        LocalFunctionDefinition {
            name: String::from("fn-a"),
            description: String::from("a function"),
            event_id: None,
            code: code.to_string(),
            environment: env
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        }
    }

    fn remote(
        code: &str,
        env: &[(&str, &str)],
        state: FunctionState,
        version: i64,
    ) -> RemoteFunctionRecord {
        RemoteFunctionRecord {
            uuid: Uuid::from_u128(7),
            name: String::from("fn-a"),
            description: String::from("a function"),
            event_id: None,
            skills: vec![],
            state,
            manifest: FunctionManifest {
                code: code.to_string(),
                environment: env
                    .iter()
                    .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                    .collect(),
                version,
            },
            deployed_at: None,
        }
    }

    #[test]
    fn absent_remote_yields_new_function_with_sentinel_version() {
        let change = ChangeSet::compute(&local("code", &[]), None);

        match change {
            ChangeSet::NewFunction(body) => {
                assert_eq!(body.state, FunctionState::Draft);
                assert_eq!(body.manifest.version, NEVER_DEPLOYED_VERSION);
                assert_eq!(body.manifest.code, "code");
            }
            other => panic!("expected NewFunction, got {other}"),
        }
    }

    #[test]
    fn identical_code_and_env_yields_unchanged() {
        let change = ChangeSet::compute(
            &local("same", &[("K", "V")]),
            Some(&remote("same", &[("K", "V")], FunctionState::Productive, 4)),
        );
        assert!(change.is_unchanged());
    }

    #[test]
    fn code_diff_is_exact_string_comparison() {
        let change = ChangeSet::compute(
            &local("code\n", &[]),
            Some(&remote("code", &[], FunctionState::Draft, 1)),
        );

        match change {
            ChangeSet::UpdatedFunction {
                code_changed,
                env_changed,
                manifest,
                ..
            } => {
                assert!(code_changed);
                assert!(!env_changed);
                assert_eq!(manifest.code.as_deref(), Some("code\n"));
                assert!(manifest.environment.is_none());
            }
            other => panic!("expected UpdatedFunction, got {other}"),
        }
    }

    #[test]
    fn placeholder_only_remote_env_never_triggers_env_change() {
        let change = ChangeSet::compute(
            &local("same", &[]),
            Some(&remote(
                "same",
                &[(ENV_PLACEHOLDER_KEY, ENV_PLACEHOLDER_VALUE)],
                FunctionState::Productive,
                2,
            )),
        );
        assert!(change.is_unchanged());
    }

    #[test]
    fn env_diff_submits_only_environment() {
        let change = ChangeSet::compute(
            &local("same", &[("K", "V")]),
            Some(&remote("same", &[], FunctionState::Productive, 2)),
        );

        match change {
            ChangeSet::UpdatedFunction {
                manifest,
                code_changed,
                env_changed,
                ..
            } => {
                assert!(!code_changed);
                assert!(env_changed);
                assert!(manifest.code.is_none());
                let mut expected = BTreeMap::new();
                expected.insert(String::from("K"), String::from("V"));
                assert_eq!(manifest.environment, Some(expected));
                assert_eq!(manifest.version, 2);
            }
            other => panic!("expected UpdatedFunction, got {other}"),
        }
    }

    #[test]
    fn draft_state_is_preserved_on_update() {
        let change = ChangeSet::compute(
            &local("new", &[]),
            Some(&remote("old", &[], FunctionState::Draft, 1)),
        );

        match change {
            ChangeSet::UpdatedFunction { meta, .. } => {
                assert_eq!(meta.state, Some(FunctionState::Draft));
            }
            other => panic!("expected UpdatedFunction, got {other}"),
        }
    }

    #[test]
    fn productive_state_is_downgraded_to_modified_on_update() {
        let change = ChangeSet::compute(
            &local("new", &[]),
            Some(&remote("old", &[], FunctionState::Productive, 5)),
        );

        match change {
            ChangeSet::UpdatedFunction { meta, manifest, .. } => {
                assert_eq!(meta.state, Some(FunctionState::Modified));
                assert_eq!(manifest.version, 5);
            }
            other => panic!("expected UpdatedFunction, got {other}"),
        }
    }

    #[test]
    fn meta_only_diff_does_not_force_an_update() {
        let mut record = remote("same", &[], FunctionState::Productive, 3);
        record.description = String::from("stale description");

        let change = ChangeSet::compute(&local("same", &[]), Some(&record));
        assert!(change.is_unchanged());
    }
}
