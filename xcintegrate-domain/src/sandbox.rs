//! Garbage collection of generated sandbox directories.
//!
//! Each managed root (target support files, public headers, private headers) holds one child
//! directory per installed target or unit. After an install the children must equal the set the
//! install produced: anything else on disk is stale and removed recursively.

use crate::constants::{PRIVATE_HEADERS_DIR, PUBLIC_HEADERS_DIR, TARGET_SUPPORT_FILES_DIR};
use crate::events::EventSink;
use crate::reconcile::reconcile_by_key;
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use std::collections::BTreeSet;
use tracing::{debug, warn};
use xcintegrate_types::events::IntegrationEvent;
use xcintegrate_types::target::InstallSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sandbox {
    root: Utf8PathBuf,
}

impl Sandbox {
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub fn target_support_files_root(&self) -> Utf8PathBuf {
        self.root.join(TARGET_SUPPORT_FILES_DIR)
    }

    pub fn public_headers_root(&self) -> Utf8PathBuf {
        self.root.join(PUBLIC_HEADERS_DIR)
    }

    pub fn private_headers_root(&self) -> Utf8PathBuf {
        self.root.join(PRIVATE_HEADERS_DIR)
    }
}

/// Child directory names expected under one managed root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectorySet {
    pub root: Utf8PathBuf,
    pub names: BTreeSet<String>,
}

/// Directories an install produces: one support directory per aggregate target and per unit,
/// and one header directory per unit that declares headers of that visibility.
pub fn desired_sandbox_dirs(sandbox: &Sandbox, install: &InstallSet) -> Vec<DirectorySet> {
    let support = install
        .aggregate_targets
        .iter()
        .map(|t| t.support_files_dir_name().to_string())
        .chain(install.units.iter().map(|u| u.support_files_dir_name.clone()))
        .collect();
    let public = install
        .units
        .iter()
        .filter(|u| u.has_public_headers)
        .map(|u| u.headers_dir_name.clone())
        .collect();
    let private = install
        .units
        .iter()
        .filter(|u| u.has_private_headers)
        .map(|u| u.headers_dir_name.clone())
        .collect();

    vec![
        DirectorySet {
            root: sandbox.target_support_files_root(),
            names: support,
        },
        DirectorySet {
            root: sandbox.public_headers_root(),
            names: public,
        },
        DirectorySet {
            root: sandbox.private_headers_root(),
            names: private,
        },
    ]
}

/// Child directory names of `root`. A missing root has none.
fn existing_children(root: &Utf8Path) -> anyhow::Result<BTreeSet<String>> {
    if !root.is_dir() {
        debug!(%root, "sandbox root missing, nothing to clean");
        return Ok(BTreeSet::new());
    }

    let mut names = BTreeSet::new();
    for entry in fs::read_dir(root).with_context(|| format!("list {}", root))? {
        let entry = entry.with_context(|| format!("read entry in {}", root))?;
        let file_type = entry
            .file_type()
            .with_context(|| format!("stat {}", entry.path().display()))?;
        if !file_type.is_dir() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => {
                names.insert(name);
            }
            Err(raw) => warn!(%root, name = ?raw, "skipping non UTF-8 sandbox directory"),
        }
    }
    Ok(names)
}

/// Managed sandbox directories the install no longer produces, sorted.
pub fn stale_sandbox_dirs(
    sandbox: &Sandbox,
    install: &InstallSet,
) -> anyhow::Result<Vec<Utf8PathBuf>> {
    let mut stale = Vec::new();
    for set in desired_sandbox_dirs(sandbox, install) {
        let existing = existing_children(&set.root)?;
        let delta = reconcile_by_key(set.names, existing);
        stale.extend(delta.delete.into_iter().map(|name| set.root.join(name)));
    }
    stale.sort();
    Ok(stale)
}

/// Remove every managed sandbox directory the install no longer produces.
///
/// Returns the removed paths in sorted order. Running it again right away removes nothing.
pub fn clean_sandbox(
    sandbox: &Sandbox,
    install: &InstallSet,
    sink: &dyn EventSink,
) -> anyhow::Result<Vec<Utf8PathBuf>> {
    let stale = stale_sandbox_dirs(sandbox, install)?;
    for path in &stale {
        fs::remove_dir_all(path).with_context(|| format!("remove {}", path))?;
        sink.emit(IntegrationEvent::SandboxDirectoryRemoved {
            path: path.to_string(),
        });
    }
    Ok(stale)
}
