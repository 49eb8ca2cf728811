//! Target model supplied by the install orchestrator.
//!
//! These types describe *desired* state. The integrator reads them and never mutates them.

use crate::project::ProductKind;
use serde::{Deserialize, Serialize};

/// An aggregate target integrated into one or more native targets of a user project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrationTarget {
    /// Label used for support-file names, e.g. `Pods-App`.
    pub label: String,

    /// Basename of the linked product, e.g. `Pods_App`.
    pub product_basename: String,

    #[serde(default)]
    pub build_as_framework: bool,

    /// Extensions embed their frameworks through the host application instead of themselves.
    #[serde(default)]
    pub requires_host_target: bool,

    /// Names of the native targets in the user project this target is integrated into.
    #[serde(default)]
    pub user_target_names: Vec<String>,

    /// Build configuration name -> resource paths, in configuration order.
    #[serde(default)]
    pub resource_paths_by_config: Vec<ConfigPaths<String>>,

    /// Build configuration name -> framework paths, in configuration order.
    #[serde(default)]
    pub framework_paths_by_config: Vec<ConfigPaths<FrameworkPath>>,

    #[serde(default)]
    pub script_phases: Vec<ScriptPhaseDescriptor>,
}

/// Paths declared for a single build configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ConfigPaths<T> {
    pub config: String,

    #[serde(default)]
    pub paths: Vec<T>,
}

impl IntegrationTarget {
    pub fn product_kind(&self) -> ProductKind {
        if self.build_as_framework {
            ProductKind::Framework
        } else {
            ProductKind::StaticLibrary
        }
    }

    pub fn product_name(&self) -> String {
        self.product_kind().product_name(&self.product_basename)
    }

    /// Product name under the opposite product kind; stale after a product type switch.
    pub fn other_product_name(&self) -> String {
        self.product_kind()
            .other()
            .product_name(&self.product_basename)
    }

    pub fn includes_resources(&self) -> bool {
        self.resource_paths_by_config
            .iter()
            .any(|c| !c.paths.is_empty())
    }

    pub fn includes_frameworks(&self) -> bool {
        self.framework_paths_by_config
            .iter()
            .any(|c| !c.paths.is_empty())
    }

    pub fn support_files_dir_name(&self) -> &str {
        &self.label
    }

    pub fn copy_resources_script_path(&self) -> String {
        format!(
            "${{PODS_ROOT}}/Target Support Files/{0}/{0}-resources.sh",
            self.label
        )
    }

    pub fn embed_frameworks_script_path(&self) -> String {
        format!(
            "${{PODS_ROOT}}/Target Support Files/{0}/{0}-frameworks.sh",
            self.label
        )
    }

    pub fn check_manifest_lock_output_path(&self) -> String {
        format!(
            "$(DERIVED_FILE_DIR)/{}-checkManifestLockResult.txt",
            self.label
        )
    }
}

/// A framework to embed: the framework bundle plus an optional companion dSYM.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameworkPath {
    pub source_path: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dsym_path: Option<String>,
}

impl FrameworkPath {
    pub fn new(source_path: impl Into<String>) -> Self {
        Self {
            source_path: source_path.into(),
            dsym_path: None,
        }
    }

    pub fn with_dsym(source_path: impl Into<String>, dsym_path: impl Into<String>) -> Self {
        Self {
            source_path: source_path.into(),
            dsym_path: Some(dsym_path.into()),
        }
    }
}

/// Where a user script phase should sit relative to the compile or headers phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionPosition {
    BeforeCompile,
    AfterCompile,
    BeforeHeaders,
    AfterHeaders,
    #[default]
    Any,
}

/// A user-declared script phase. Optional fields are only applied when present, so manual
/// edits to fields the declaration leaves out survive re-integration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptPhaseDescriptor {
    pub name: String,
    pub script: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shell_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_files: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_files: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_file_lists: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_file_lists: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_env_vars_in_log: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub always_out_of_date: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependency_file: Option<String>,

    #[serde(default)]
    pub execution_position: ExecutionPosition,
}

impl ScriptPhaseDescriptor {
    pub fn new(name: impl Into<String>, script: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            script: script.into(),
            shell_path: None,
            input_files: None,
            output_files: None,
            input_file_lists: None,
            output_file_lists: None,
            show_env_vars_in_log: None,
            always_out_of_date: None,
            dependency_file: None,
            execution_position: ExecutionPosition::Any,
        }
    }

    pub fn at(mut self, position: ExecutionPosition) -> Self {
        self.execution_position = position;
        self
    }
}

/// A unit installed into the sandbox (one per pod-like dependency).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledUnit {
    pub name: String,

    /// Directory name under the sandbox's target support files root.
    pub support_files_dir_name: String,

    /// Directory name under the public/private header roots.
    pub headers_dir_name: String,

    #[serde(default)]
    pub has_public_headers: bool,

    #[serde(default)]
    pub has_private_headers: bool,
}

/// Everything installed in one run: aggregate targets plus the units they depend on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallSet {
    #[serde(default = "default_install_schema")]
    pub schema: String,

    #[serde(default)]
    pub aggregate_targets: Vec<IntegrationTarget>,

    #[serde(default)]
    pub units: Vec<InstalledUnit>,
}

fn default_install_schema() -> String {
    crate::schema::XCINTEGRATE_INSTALL_V1.to_string()
}

impl Default for InstallSet {
    fn default() -> Self {
        Self {
            schema: default_install_schema(),
            aggregate_targets: vec![],
            units: vec![],
        }
    }
}

impl InstallSet {
    pub fn aggregate_target(&self, label: &str) -> Option<&IntegrationTarget> {
        self.aggregate_targets.iter().find(|t| t.label == label)
    }
}
