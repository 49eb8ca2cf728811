//! Port traits abstracting all I/O away from the pipeline.

use camino::Utf8Path;
use xcintegrate_types::project::Project;
use xcintegrate_types::target::InstallSet;

/// Persistent storage for the project graph.
pub trait ProjectStore {
    fn load_project(&self) -> anyhow::Result<Project>;
    fn save_project(&self, project: &Project) -> anyhow::Result<()>;
}

/// Source of the desired install state.
pub trait InstallSource {
    fn load_install_set(&self) -> anyhow::Result<InstallSet>;
}

/// File-system write operations.
pub trait WritePort {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()>;
    fn create_dir_all(&self, path: &Utf8Path) -> anyhow::Result<()>;
}
