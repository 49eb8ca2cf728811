//! Default filesystem-backed and in-memory port implementations.

use crate::ports::{InstallSource, ProjectStore, WritePort};
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use std::cell::RefCell;
use tracing::debug;
use xcintegrate_types::project::Project;
use xcintegrate_types::target::InstallSet;

/// Project snapshot stored as pretty-printed JSON.
#[derive(Debug, Clone)]
pub struct JsonProjectStore {
    pub path: Utf8PathBuf,
}

impl JsonProjectStore {
    pub fn new(path: Utf8PathBuf) -> Self {
        Self { path }
    }
}

impl ProjectStore for JsonProjectStore {
    fn load_project(&self) -> anyhow::Result<Project> {
        let contents =
            fs::read_to_string(&self.path).with_context(|| format!("read {}", self.path))?;
        serde_json::from_str(&contents).with_context(|| format!("parse project {}", self.path))
    }

    fn save_project(&self, project: &Project) -> anyhow::Result<()> {
        let mut json = serde_json::to_string_pretty(project).context("serialize project")?;
        json.push('\n');
        fs::write(&self.path, json).with_context(|| format!("write {}", self.path))?;
        debug!(path = %self.path, "saved project");
        Ok(())
    }
}

/// Install set read from a JSON file.
#[derive(Debug, Clone)]
pub struct JsonInstallSource {
    pub path: Utf8PathBuf,
}

impl JsonInstallSource {
    pub fn new(path: Utf8PathBuf) -> Self {
        Self { path }
    }
}

impl InstallSource for JsonInstallSource {
    fn load_install_set(&self) -> anyhow::Result<InstallSet> {
        let contents =
            fs::read_to_string(&self.path).with_context(|| format!("read {}", self.path))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("parse install set {}", self.path))
    }
}

/// In-memory project store for embedding and testing. Saves replace the held project.
#[derive(Debug)]
pub struct InMemoryProjectStore {
    project: RefCell<Project>,
    saves: RefCell<u32>,
}

impl InMemoryProjectStore {
    pub fn new(project: Project) -> Self {
        Self {
            project: RefCell::new(project),
            saves: RefCell::new(0),
        }
    }

    pub fn project(&self) -> Project {
        self.project.borrow().clone()
    }

    /// Number of times `save_project` was called.
    pub fn saves(&self) -> u32 {
        *self.saves.borrow()
    }
}

impl ProjectStore for InMemoryProjectStore {
    fn load_project(&self) -> anyhow::Result<Project> {
        Ok(self.project())
    }

    fn save_project(&self, project: &Project) -> anyhow::Result<()> {
        *self.project.borrow_mut() = project.clone();
        *self.saves.borrow_mut() += 1;
        Ok(())
    }
}

/// In-memory install source.
#[derive(Debug, Clone, Default)]
pub struct InMemoryInstallSource {
    install: InstallSet,
}

impl InMemoryInstallSource {
    pub fn new(install: InstallSet) -> Self {
        Self { install }
    }
}

impl InstallSource for InMemoryInstallSource {
    fn load_install_set(&self) -> anyhow::Result<InstallSet> {
        Ok(self.install.clone())
    }
}

/// Filesystem write operations.
#[derive(Debug, Clone, Default)]
pub struct FsWritePort;

impl WritePort for FsWritePort {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create parent dir for {}", path))?;
        }
        fs::write(path, contents).with_context(|| format!("write {}", path))
    }

    fn create_dir_all(&self, path: &Utf8Path) -> anyhow::Result<()> {
        fs::create_dir_all(path).with_context(|| format!("create_dir_all {}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use xcintegrate_types::project::{NativeTarget, SymbolType};

    fn temp_root() -> (TempDir, Utf8PathBuf) {
        let temp = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8");
        (temp, root)
    }

    #[test]
    fn json_project_store_round_trips_snapshot() {
        let (_temp, root) = temp_root();
        let store = JsonProjectStore::new(root.join("project.json"));
        let mut project = Project::new("App");
        project
            .targets
            .push(NativeTarget::new("App", SymbolType::Application));

        store.save_project(&project).expect("save");
        assert_eq!(store.load_project().expect("load"), project);
    }

    #[test]
    fn json_project_store_reports_parse_errors_with_path() {
        let (_temp, root) = temp_root();
        let path = root.join("project.json");
        std::fs::write(&path, "{ not json").expect("write");

        let err = JsonProjectStore::new(path.clone())
            .load_project()
            .expect_err("parse error");
        assert!(format!("{err:#}").contains(path.as_str()));
        assert!(err.chain().any(|c| c.is::<serde_json::Error>()));
    }

    #[test]
    fn json_install_source_defaults_missing_sections() {
        let (_temp, root) = temp_root();
        let path = root.join("install.json");
        std::fs::write(&path, "{}").expect("write");

        let install = JsonInstallSource::new(path).load_install_set().expect("load");
        assert!(install.aggregate_targets.is_empty());
        assert!(install.units.is_empty());
    }

    #[test]
    fn in_memory_store_counts_saves() {
        let store = InMemoryProjectStore::new(Project::new("App"));
        store.save_project(&Project::new("Other")).expect("save");
        assert_eq!(store.saves(), 1);
        assert_eq!(store.project().name, "Other");
    }

    #[test]
    fn fs_write_port_writes_and_creates_dirs() {
        let (_temp, root) = temp_root();
        let target = root.join("nested").join("file.txt");

        FsWritePort.write_file(&target, b"hello").expect("write");
        assert_eq!(std::fs::read_to_string(&target).expect("read"), "hello");

        let extra = root.join("extra");
        FsWritePort.create_dir_all(&extra).expect("mkdir");
        assert!(extra.exists());
    }
}
