//! Configuration file loading for xcintegrate.
//!
//! Discovers and loads `xcintegrate.toml` from the config directory (the project directory by
//! default). Command-line arguments take precedence over file settings.

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use serde::Deserialize;
use tracing::debug;

pub const CONFIG_FILE_NAME: &str = "xcintegrate.toml";

/// Top-level configuration from xcintegrate.toml.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct XcintegrateConfig {
    pub integration: IntegrationConfig,
    pub sandbox: SandboxConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IntegrationConfig {
    /// Aggregate target labels integrated when none are given on the command line.
    pub targets: Vec<String>,

    /// Emit input/output paths on generated script phases.
    pub input_output_paths: bool,
}

impl Default for IntegrationConfig {
    fn default() -> Self {
        Self {
            targets: Vec::new(),
            input_output_paths: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    pub root: Utf8PathBuf,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            root: Utf8PathBuf::from("Pods"),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory for report artifacts. Unset means no artifacts are written.
    pub dir: Option<Utf8PathBuf>,
}

/// Returns `None` if `dir` holds no config file.
pub fn discover_config(dir: &Utf8Path) -> Option<Utf8PathBuf> {
    let config_path = dir.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        debug!("found config file at {}", config_path);
        Some(config_path)
    } else {
        debug!("no config file found at {}", config_path);
        None
    }
}

pub fn load_config(path: &Utf8Path) -> anyhow::Result<XcintegrateConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config file {}", path))?;
    parse_config(&contents).with_context(|| format!("parse config file {}", path))
}

pub fn parse_config(contents: &str) -> anyhow::Result<XcintegrateConfig> {
    let config: XcintegrateConfig = toml::from_str(contents).context("invalid TOML")?;
    Ok(config)
}

pub fn load_or_default(dir: &Utf8Path) -> anyhow::Result<XcintegrateConfig> {
    match discover_config(dir) {
        Some(path) => load_config(&path),
        None => Ok(XcintegrateConfig::default()),
    }
}

/// Config file settings with command-line arguments applied on top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedConfig {
    pub targets: Vec<String>,
    pub input_output_paths: bool,
    pub sandbox_root: Utf8PathBuf,
    pub out_dir: Option<Utf8PathBuf>,
}

pub struct ConfigMerger {
    config: XcintegrateConfig,
}

impl ConfigMerger {
    pub fn new(config: XcintegrateConfig) -> Self {
        Self { config }
    }

    /// CLI targets replace the configured list rather than extending it.
    /// `--no-input-output-paths` can only switch path tracking off.
    pub fn merge_integrate_args(
        self,
        cli_targets: &[String],
        no_input_output_paths: bool,
        cli_out_dir: Option<Utf8PathBuf>,
    ) -> MergedConfig {
        let targets = if cli_targets.is_empty() {
            self.config.integration.targets
        } else {
            cli_targets.to_vec()
        };

        MergedConfig {
            targets,
            input_output_paths: self.config.integration.input_output_paths
                && !no_input_output_paths,
            sandbox_root: self.config.sandbox.root,
            out_dir: cli_out_dir.or(self.config.output.dir),
        }
    }

    pub fn merge_clean_args(
        self,
        cli_sandbox_root: Option<Utf8PathBuf>,
        cli_out_dir: Option<Utf8PathBuf>,
    ) -> MergedConfig {
        MergedConfig {
            targets: self.config.integration.targets,
            input_output_paths: self.config.integration.input_output_paths,
            sandbox_root: cli_sandbox_root.unwrap_or(self.config.sandbox.root),
            out_dir: cli_out_dir.or(self.config.output.dir),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_full_config() {
        let contents = r#"
[integration]
targets = ["Pods-App", "Pods-AppTests"]
input_output_paths = false

[sandbox]
root = "vendor/Pods"

[output]
dir = "artifacts/xcintegrate"
"#;

        let config = parse_config(contents).unwrap();
        assert_eq!(config.integration.targets, vec!["Pods-App", "Pods-AppTests"]);
        assert!(!config.integration.input_output_paths);
        assert_eq!(config.sandbox.root, Utf8PathBuf::from("vendor/Pods"));
        assert_eq!(
            config.output.dir,
            Some(Utf8PathBuf::from("artifacts/xcintegrate"))
        );
    }

    #[test]
    fn test_parse_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert!(config.integration.targets.is_empty());
        assert!(config.integration.input_output_paths);
        assert_eq!(config.sandbox.root, Utf8PathBuf::from("Pods"));
        assert!(config.output.dir.is_none());
    }

    #[test]
    fn test_parse_invalid_toml() {
        let err = parse_config("[integration\n").unwrap_err();
        assert!(err.to_string().contains("invalid TOML"));
    }

    #[test]
    fn test_merge_integrate_cli_targets_replace_config() {
        let config = parse_config("[integration]\ntargets = [\"Pods-App\"]\n").unwrap();
        let merged = ConfigMerger::new(config).merge_integrate_args(
            &["Pods-Widget".to_string()],
            false,
            None,
        );
        assert_eq!(merged.targets, vec!["Pods-Widget"]);
        assert!(merged.input_output_paths);
    }

    #[test]
    fn test_merge_integrate_config_targets_used_when_cli_empty() {
        let config = parse_config("[integration]\ntargets = [\"Pods-App\"]\n").unwrap();
        let merged = ConfigMerger::new(config).merge_integrate_args(&[], true, None);
        assert_eq!(merged.targets, vec!["Pods-App"]);
        assert!(!merged.input_output_paths);
    }

    #[test]
    fn test_merge_out_dir_cli_wins() {
        let config = parse_config("[output]\ndir = \"from-config\"\n").unwrap();
        let merged = ConfigMerger::new(config.clone()).merge_integrate_args(&[], false, None);
        assert_eq!(merged.out_dir, Some(Utf8PathBuf::from("from-config")));

        let merged = ConfigMerger::new(config)
            .merge_clean_args(None, Some(Utf8PathBuf::from("from-cli")));
        assert_eq!(merged.out_dir, Some(Utf8PathBuf::from("from-cli")));
    }

    #[test]
    fn test_merge_clean_sandbox_root() {
        let config = parse_config("[sandbox]\nroot = \"vendor/Pods\"\n").unwrap();
        let merged = ConfigMerger::new(config.clone()).merge_clean_args(None, None);
        assert_eq!(merged.sandbox_root, Utf8PathBuf::from("vendor/Pods"));

        let merged =
            ConfigMerger::new(config).merge_clean_args(Some(Utf8PathBuf::from("Other")), None);
        assert_eq!(merged.sandbox_root, Utf8PathBuf::from("Other"));
    }

    #[test]
    fn test_discover_config_some_and_none() {
        let temp = TempDir::new().unwrap();
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
        assert!(discover_config(&root).is_none());

        std::fs::write(root.join(CONFIG_FILE_NAME), "").unwrap();
        assert_eq!(discover_config(&root), Some(root.join(CONFIG_FILE_NAME)));
    }

    #[test]
    fn test_load_or_default_returns_default_when_missing() {
        let temp = TempDir::new().unwrap();
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
        let config = load_or_default(&root).unwrap();
        assert!(config.integration.input_output_paths);
    }
}
