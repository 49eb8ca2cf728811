//! Fixed names and limits shared with the build tool and older integrations.

/// Prefix of every phase this crate owns.
pub const BUILD_PHASE_PREFIX: &str = "[CP] ";

/// Prefix of phases created from user-declared script phases.
pub const USER_BUILD_PHASE_PREFIX: &str = "[CP-User] ";

pub const CHECK_MANIFEST_PHASE_NAME: &str = "Check Pods Manifest.lock";
pub const EMBED_FRAMEWORK_PHASE_NAME: &str = "Embed Pods Frameworks";
pub const COPY_PODS_RESOURCES_PHASE_NAME: &str = "Copy Pods Resources";

/// Combined input + output path ceiling. The build tool exports every path as an environment
/// variable, and past this point the process environment overflows.
pub const MAX_INPUT_OUTPUT_PATHS: usize = 1000;

pub const PODFILE_LOCK_INPUT_PATH: &str = "${PODS_PODFILE_DIR_PATH}/Podfile.lock";
pub const MANIFEST_LOCK_INPUT_PATH: &str = "${PODS_ROOT}/Manifest.lock";

pub const RESOURCES_OUTPUT_DIR: &str = "${TARGET_BUILD_DIR}/${UNLOCALIZED_RESOURCES_FOLDER_PATH}";
pub const FRAMEWORKS_OUTPUT_DIR: &str = "${TARGET_BUILD_DIR}/${FRAMEWORKS_FOLDER_PATH}";
pub const DSYM_OUTPUT_DIR: &str = "${DWARF_DSYM_FOLDER_PATH}";

/// Sandbox layout.
pub const TARGET_SUPPORT_FILES_DIR: &str = "Target Support Files";
pub const PUBLIC_HEADERS_DIR: &str = "Headers/Public";
pub const PRIVATE_HEADERS_DIR: &str = "Headers/Private";

/// Prefix a logical phase name with the crate-owned prefix.
pub fn build_phase_name(logical: &str) -> String {
    format!("{BUILD_PHASE_PREFIX}{logical}")
}

/// Prefix a user script phase name.
pub fn user_build_phase_name(logical: &str) -> String {
    format!("{USER_BUILD_PHASE_PREFIX}{logical}")
}
