//! Local project access.
//!
//! This module provides read and write access to function folders on disk:
//! target resolution for a command invocation, definition loading, and
//! definition writing for pull operations.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{FuncliftError, ProjectError, Result};

use super::types::{FunctionConfig, LocalFunctionDefinition, CONFIG_FILE};

/// Read and write access to the local function tree.
pub trait ProjectReader: Send + Sync {
    /// Resolves the set of function names a command invocation targets.
    ///
    /// With explicit names, those names are the targets. With `all`, every
    /// function folder under the project root is a target. With neither,
    /// the target is the single function whose folder the caller is
    /// currently inside.
    fn resolve_targets(&self, requested: &[String], all: bool) -> Result<Vec<String>>;

    /// Reads the definition for the named function.
    fn read_definition(&self, name: &str) -> Result<LocalFunctionDefinition>;

    /// Writes a definition into the local tree, overwriting code and
    /// configuration for that function.
    fn write_definition(&self, name: &str, definition: &LocalFunctionDefinition) -> Result<()>;
}

/// Filesystem-backed project reader.
///
/// Function folders live directly under the project root, one folder per
/// function, named after the function.
#[derive(Debug)]
pub struct FsProjectReader {
    /// Project root containing the function folders.
    root: PathBuf,
}

impl FsProjectReader {
    /// Creates a reader over the given project root.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Discovers the project root for the current invocation.
    ///
    /// An explicit root always wins. Otherwise, when the current directory
    /// is itself a function folder, its parent is the root; failing that,
    /// the current directory is.
    ///
    /// # Errors
    ///
    /// Returns an error if the current directory cannot be determined.
    pub fn discover(explicit_root: Option<&Path>) -> Result<Self> {
        if let Some(root) = explicit_root {
            return Ok(Self::new(root));
        }

        let cwd = std::env::current_dir()?;

        if cwd.join(CONFIG_FILE).exists() {
            if let Some(parent) = cwd.parent() {
                debug!("Current directory is a function folder, using parent as root");
                return Ok(Self::new(parent));
            }
        }

        Ok(Self::new(cwd))
    }

    /// Returns the project root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Parses the configuration file of a function folder.
    fn load_config(name: &str, config_path: &Path) -> Result<FunctionConfig> {
        if !config_path.exists() {
            return Err(FuncliftError::Project(ProjectError::ConfigNotFound {
                path: config_path.to_path_buf(),
            }));
        }

        let content = std::fs::read_to_string(config_path)
            .map_err(|e| ProjectError::parse(name, format!("Failed to read file: {e}")))?;

        let config: FunctionConfig = serde_yaml::from_str(&content)
            .map_err(|e| ProjectError::parse(name, format!("YAML parse error: {e}")))?;

        Ok(config)
    }

    /// Reads the function name from the folder the caller is inside.
    fn current_function(&self) -> Result<String> {
        let cwd = std::env::current_dir()?;
        let config_path = cwd.join(CONFIG_FILE);

        if !config_path.exists() {
            return Err(FuncliftError::Project(ProjectError::NotInFunctionFolder {
                path: cwd,
            }));
        }

        let folder = cwd
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let config = Self::load_config(&folder, &config_path)?;

        debug!("Resolved current function folder to '{}'", config.name);
        Ok(config.name)
    }

    /// Scans the project root for function folders.
    fn all_functions(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();

        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_dir() && path.join(CONFIG_FILE).exists() {
                names.push(entry.file_name().to_string_lossy().to_string());
            }
        }

        if names.is_empty() {
            return Err(FuncliftError::Project(ProjectError::NoFunctionsFound {
                path: self.root.clone(),
            }));
        }

        names.sort_unstable();
        debug!("Found {} function folders", names.len());
        Ok(names)
    }
}

impl ProjectReader for FsProjectReader {
    fn resolve_targets(&self, requested: &[String], all: bool) -> Result<Vec<String>> {
        if all {
            return self.all_functions();
        }

        if requested.is_empty() {
            return Ok(vec![self.current_function()?]);
        }

        // Dedupe while preserving the order the caller gave.
        let mut seen = BTreeSet::new();
        Ok(requested
            .iter()
            .filter(|name| seen.insert((*name).clone()))
            .cloned()
            .collect())
    }

    fn read_definition(&self, name: &str) -> Result<LocalFunctionDefinition> {
        let folder = self.root.join(name);

        if !folder.is_dir() {
            return Err(FuncliftError::Project(ProjectError::FolderNotFound {
                path: folder,
            }));
        }

        let config = Self::load_config(name, &folder.join(CONFIG_FILE))?;

        let code_path = folder.join(config.entry_file());
        if !code_path.exists() {
            return Err(FuncliftError::Project(ProjectError::CodeFileNotFound {
                path: code_path,
            }));
        }

        let code = std::fs::read_to_string(&code_path)?;

        Ok(LocalFunctionDefinition::from_parts(config, code))
    }

    fn write_definition(&self, name: &str, definition: &LocalFunctionDefinition) -> Result<()> {
        let folder = self.root.join(name);
        std::fs::create_dir_all(&folder)?;

        let config_path = folder.join(CONFIG_FILE);

        // Preserve a custom entry file name across pulls.
        let entry = if config_path.exists() {
            Self::load_config(name, &config_path)?.entry
        } else {
            None
        };

        let config = FunctionConfig {
            name: definition.name.clone(),
            description: definition.description.clone(),
            event: definition.event_id.clone(),
            entry,
            env: definition.environment.clone(),
        };

        let yaml = serde_yaml::to_string(&config)
            .map_err(|e| ProjectError::parse(name, format!("YAML serialize error: {e}")))?;
        std::fs::write(&config_path, yaml)?;

        let code_path = folder.join(config.entry_file());
        std::fs::write(&code_path, &definition.code)?;

        info!("Wrote local definition for '{name}'");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn write_function(root: &Path, name: &str, code: &str) {
        let folder = root.join(name);
        std::fs::create_dir_all(&folder).expect("Failed to create folder");
        std::fs::write(
            folder.join(CONFIG_FILE),
            format!("name: {name}\ndescription: a test function\n"),
        )
        .expect("Failed to write config");
        std::fs::write(folder.join("index.js"), code).expect("Failed to write code");
    }

    #[test]
    fn read_definition_assembles_config_and_code() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        write_function(temp.path(), "greeter", "module.exports = () => 'hi';");

        let reader = FsProjectReader::new(temp.path());
        let def = reader
            .read_definition("greeter")
            .expect("definition should load");

        assert_eq!(def.name, "greeter");
        assert_eq!(def.code, "module.exports = () => 'hi';");
        assert!(def.environment.is_empty());
    }

    #[test]
    fn read_definition_fails_without_config() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        std::fs::create_dir_all(temp.path().join("empty")).expect("Failed to create folder");

        let reader = FsProjectReader::new(temp.path());
        let err = reader.read_definition("empty").expect_err("should fail");

        assert!(matches!(
            err,
            FuncliftError::Project(ProjectError::ConfigNotFound { .. })
        ));
    }

    #[test]
    fn resolve_all_scans_function_folders() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        write_function(temp.path(), "beta", "b");
        write_function(temp.path(), "alpha", "a");
        std::fs::create_dir_all(temp.path().join("not-a-function"))
            .expect("Failed to create folder");

        let reader = FsProjectReader::new(temp.path());
        let targets = reader.resolve_targets(&[], true).expect("should resolve");

        assert_eq!(targets, vec!["alpha", "beta"]);
    }

    #[test]
    fn resolve_requested_dedupes_preserving_order() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let reader = FsProjectReader::new(temp.path());

        let targets = reader
            .resolve_targets(
                &[
                    String::from("beta"),
                    String::from("alpha"),
                    String::from("beta"),
                ],
                false,
            )
            .expect("should resolve");

        assert_eq!(targets, vec!["beta", "alpha"]);
    }

    #[test]
    fn write_definition_roundtrips() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let reader = FsProjectReader::new(temp.path());

        let mut environment = BTreeMap::new();
        environment.insert(String::from("API_URL"), String::from("https://example.test"));

        let def = LocalFunctionDefinition {
            name: String::from("pulled"),
            description: String::from("pulled from the platform"),
            event_id: Some(String::from("order.created")),
            code: String::from("module.exports = () => {};"),
            environment,
        };

        reader
            .write_definition("pulled", &def)
            .expect("write should succeed");

        let loaded = reader
            .read_definition("pulled")
            .expect("definition should load");
        assert_eq!(loaded, def);
    }
}
