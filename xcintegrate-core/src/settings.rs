//! Clap-free settings for the integrate and clean-sandbox pipelines.

use camino::Utf8PathBuf;
use xcintegrate_domain::IntegrationOptions;

/// Settings for the integrate pipeline.
#[derive(Debug, Clone)]
pub struct IntegrateSettings {
    /// Labels of the aggregate targets to integrate. Empty means all of them.
    pub labels: Vec<String>,

    /// Compute the result and its diff but leave the stored project untouched.
    pub dry_run: bool,

    pub options: IntegrationOptions,

    /// Where report artifacts go. `None` skips writing them.
    pub out_dir: Option<Utf8PathBuf>,
}

impl Default for IntegrateSettings {
    fn default() -> Self {
        Self {
            labels: Vec::new(),
            dry_run: false,
            options: IntegrationOptions::default(),
            out_dir: None,
        }
    }
}

/// Settings for the clean-sandbox pipeline.
#[derive(Debug, Clone)]
pub struct CleanSettings {
    pub sandbox_root: Utf8PathBuf,

    /// List stale directories without removing them.
    pub dry_run: bool,

    pub out_dir: Option<Utf8PathBuf>,
}

impl Default for CleanSettings {
    fn default() -> Self {
        Self {
            sandbox_root: Utf8PathBuf::from("Pods"),
            dry_run: false,
            out_dir: None,
        }
    }
}
