//! Command manifests.
//!
//! A manifest declares the commands a host registers, in YAML or JSON. Each
//! entry converts to a [`ListenerBuilder`]; executors are bound by the host,
//! usually by looking up the entry's `action` name.
//!
//! # Example YAML
//!
//! ```yaml
//! version: "1.0"
//! invoker:
//!   name: console
//!   auth_level: 100
//! commands:
//!   - name: tp
//!     description: Teleport to coordinates
//!     spec: "f|f|f"
//!     tags: [x, y, z]
//!     min_args: 3
//!     max_args: 3
//!     auth_level: 10
//!     action: echo
//!   - name: say
//!     spec: "g"
//!     action: echo
//! ```

use std::collections::HashSet;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ManifestError, Result};
use crate::{Invoker, ListenerBuilder};

/// One command entry in a [`CommandManifest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Compact type spec, e.g. `"i|f|s"`.
    #[serde(default)]
    pub spec: String,
    /// Per-slot argument names.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub min_args: usize,
    /// Defaults to the larger of the tag count and spec segment count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_args: Option<usize>,
    #[serde(default)]
    pub auth_level: u32,
    #[serde(default)]
    pub protected: bool,
    /// Deliver arguments keyed by tag instead of by position.
    #[serde(default)]
    pub associative: bool,
    #[serde(default)]
    pub suspended: bool,
    /// Name of the executor the host binds to this command.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

impl CommandConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            spec: String::new(),
            tags: Vec::new(),
            min_args: 0,
            max_args: None,
            auth_level: 0,
            protected: false,
            associative: false,
            suspended: false,
            action: None,
        }
    }

    /// Converts the entry into a builder with no hooks bound.
    pub fn to_builder(&self) -> ListenerBuilder {
        let mut builder = ListenerBuilder::new(self.name.clone())
            .spec(self.spec.clone())
            .tags(self.tags.iter().cloned())
            .auth_level(self.auth_level)
            .protected(self.protected)
            .associative(self.associative)
            .suspended(self.suspended);
        builder = match self.max_args {
            Some(max) => builder.args(self.min_args, max),
            None => builder.min_args(self.min_args),
        };
        if let Some(description) = &self.description {
            builder = builder.description(description.clone());
        }
        builder
    }
}

/// A set of command declarations plus the invoker used to run them.
///
/// # Examples
///
/// ```
/// use command_dispatch::CommandManifest;
///
/// let manifest = CommandManifest::from_yaml_str(
///     r#"
/// version: "1.0"
/// commands:
///   - name: tp
///     spec: "f|f|f"
///     tags: [x, y, z]
///     min_args: 3
/// "#,
/// )
/// .unwrap();
///
/// manifest.validate().unwrap();
/// let listener = manifest.commands[0].to_builder().build().unwrap();
/// assert_eq!(listener.usage(), "tp <x:float> <y:float> <z:float>");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandManifest {
    /// Manifest format version (e.g., `"1.0"`).
    pub version: String,
    #[serde(default = "Invoker::console")]
    pub invoker: Invoker,
    #[serde(default)]
    pub commands: Vec<CommandConfig>,
}

impl CommandManifest {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            invoker: Invoker::console(),
            commands: Vec::new(),
        }
    }

    /// Loads a manifest, as JSON when the extension is `.json` and as YAML
    /// otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::IoError`] if the file cannot be read, or a
    /// JSON/YAML error if parsing fails. The content is not validated.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(std::fs::File::open(path)?);
        let manifest = if is_json(path) {
            serde_json::from_reader(reader)?
        } else {
            serde_yaml::from_reader(reader)?
        };
        Ok(manifest)
    }

    /// Saves the manifest, choosing the format by extension as
    /// [`load`](Self::load) does.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::IoError`] if the file cannot be written, or a
    /// serialization error.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let writer = BufWriter::new(std::fs::File::create(path)?);
        if is_json(path) {
            serde_json::to_writer_pretty(writer, self)?;
        } else {
            serde_yaml::to_writer(writer, self)?;
        }
        Ok(())
    }

    /// Parses a YAML manifest from a string.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::YamlError`] on malformed input.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Checks the version, name uniqueness and each entry's definition.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.version.trim().is_empty() {
            return Err(ManifestError::EmptyVersion);
        }

        let mut seen = HashSet::new();
        for command in &self.commands {
            if !seen.insert(command.name.as_str()) {
                return Err(ManifestError::DuplicateCommand(command.name.clone()));
            }
            command
                .to_builder()
                .build()
                .map_err(|source| ManifestError::Definition {
                    command: command.name.clone(),
                    source,
                })?;
        }
        Ok(())
    }

    /// Looks up an entry by name.
    pub fn get(&self, name: &str) -> Option<&CommandConfig> {
        self.commands.iter().find(|command| command.name == name)
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ArgumentMode;
    use command_dispatch_core::{ArgBounds, DefinitionError};

    fn sample_yaml() -> &'static str {
        r#"
version: "1.0"
invoker:
  name: operator
  auth_level: 50
commands:
  - name: tp
    description: Teleport to coordinates
    spec: "f|f|f"
    tags: [x, y, z]
    min_args: 3
    max_args: 3
    auth_level: 10
    action: echo
  - name: set
    spec: "l|s"
    tags: [key, value]
    associative: true
  - name: shutdown
    protected: true
    suspended: true
"#
    }

    #[test]
    fn test_deserialize_complete() {
        let manifest = CommandManifest::from_yaml_str(sample_yaml()).unwrap();
        assert_eq!(manifest.version, "1.0");
        assert_eq!(manifest.invoker, Invoker::new("operator", 50));
        assert_eq!(manifest.commands.len(), 3);

        let tp = manifest.get("tp").unwrap();
        assert_eq!(tp.tags, vec!["x", "y", "z"]);
        assert_eq!(tp.max_args, Some(3));
        assert_eq!(tp.action.as_deref(), Some("echo"));
        assert!(manifest.get("shutdown").unwrap().protected);
    }

    #[test]
    fn test_deserialize_minimal() {
        let manifest = CommandManifest::from_yaml_str("version: \"1.0\"").unwrap();
        assert_eq!(manifest.invoker, Invoker::console());
        assert!(manifest.commands.is_empty());
        assert!(manifest.validate().is_ok());
    }

    #[test]
    fn test_to_builder_carries_flags() {
        let manifest = CommandManifest::from_yaml_str(sample_yaml()).unwrap();

        let set = manifest.get("set").unwrap().to_builder().build().unwrap();
        assert_eq!(set.mode(), ArgumentMode::Associative);
        assert_eq!(set.bounds(), ArgBounds { min: 0, max: 2 });

        let shutdown = manifest.get("shutdown").unwrap().to_builder().build().unwrap();
        assert!(shutdown.is_protected());
        assert!(shutdown.is_suspended());

        let tp = manifest.get("tp").unwrap().to_builder().build().unwrap();
        assert_eq!(tp.description(), Some("Teleport to coordinates"));
        assert_eq!(tp.auth_level(), 10);
    }

    #[test]
    fn test_validate_rejects_empty_version() {
        let manifest = CommandManifest::new("  ");
        assert!(matches!(manifest.validate(), Err(ManifestError::EmptyVersion)));
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let mut manifest = CommandManifest::new("1.0");
        manifest.commands.push(CommandConfig::new("tp"));
        manifest.commands.push(CommandConfig::new("tp"));
        assert!(matches!(
            manifest.validate(),
            Err(ManifestError::DuplicateCommand(name)) if name == "tp"
        ));
    }

    #[test]
    fn test_validate_reports_bad_definition() {
        let mut manifest = CommandManifest::new("1.0");
        let mut bad = CommandConfig::new("bad");
        bad.spec = "i|x".to_string();
        manifest.commands.push(bad);

        match manifest.validate() {
            Err(ManifestError::Definition { command, source }) => {
                assert_eq!(command, "bad");
                assert!(matches!(source, DefinitionError::Spec(_)));
            }
            other => panic!("expected definition error, got {other:?}"),
        }
    }

    #[test]
    fn test_load_save_roundtrip_yaml_and_json() {
        let dir = tempfile::tempdir().unwrap();
        let original = CommandManifest::from_yaml_str(sample_yaml()).unwrap();

        for file in ["commands.yml", "commands.json"] {
            let path = dir.path().join(file);
            original.save(&path).unwrap();
            let loaded = CommandManifest::load(&path).unwrap();
            assert_eq!(loaded, original, "{file}");
        }

        let json = std::fs::read_to_string(dir.path().join("commands.json")).unwrap();
        assert!(json.trim_start().starts_with('{'));
    }

    #[test]
    fn test_load_missing_file() {
        let err = CommandManifest::load("/nonexistent/commands.yml").unwrap_err();
        assert!(matches!(err, ManifestError::IoError(_)));
    }
}
