//! Input/output path computation for the embed-frameworks and copy-resources phases.

use crate::constants::{
    DSYM_OUTPUT_DIR, FRAMEWORKS_OUTPUT_DIR, MAX_INPUT_OUTPUT_PATHS, RESOURCES_OUTPUT_DIR,
};
use camino::Utf8Path;
use std::collections::HashSet;
use tracing::debug;
use xcintegrate_types::target::FrameworkPath;

/// Compiled extension for a resource extension (both with the leading dot).
pub fn output_extension_for_resource(ext: &str) -> &str {
    match ext {
        ".storyboard" => ".storyboardc",
        ".xib" => ".nib",
        ".framework" => ".framework",
        ".xcdatamodel" => ".mom",
        ".xcdatamodeld" => ".momd",
        ".xcmappingmodel" => ".cdm",
        ".xcassets" => ".car",
        other => other,
    }
}

/// Output path of a single resource once copied (and compiled) into the product.
pub fn resource_output_path(input: &str) -> String {
    let path = Utf8Path::new(input);
    let ext = path
        .extension()
        .map(|e| format!(".{e}"))
        .unwrap_or_default();
    // Asset catalogs compile into one aggregate file no matter what they are called.
    let stem = if ext == ".xcassets" {
        "Assets"
    } else {
        path.file_stem().unwrap_or(input)
    };
    format!(
        "{RESOURCES_OUTPUT_DIR}/{stem}{}",
        output_extension_for_resource(&ext)
    )
}

/// Output paths for a list of resource inputs, de-duplicated in first-seen order.
pub fn resource_output_paths<'a>(inputs: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    dedup_preserving_order(inputs.into_iter().map(resource_output_path))
}

/// Output paths for embedded frameworks and their dSYMs, de-duplicated in first-seen order.
pub fn framework_output_paths(frameworks: &[FrameworkPath]) -> Vec<String> {
    let paths = frameworks.iter().flat_map(|fw| {
        let framework = file_name(&fw.source_path).map(|n| format!("{FRAMEWORKS_OUTPUT_DIR}/{n}"));
        let dsym = fw
            .dsym_path
            .as_deref()
            .and_then(file_name)
            .map(|n| format!("{DSYM_OUTPUT_DIR}/{n}"));
        [framework, dsym]
    });
    dedup_preserving_order(paths.flatten())
}

/// Input paths for the embed-frameworks phase: the script itself, then every framework and
/// dSYM source path.
pub fn framework_input_paths(script_path: &str, frameworks: &[FrameworkPath]) -> Vec<String> {
    let sources = frameworks.iter().flat_map(|fw| {
        std::iter::once(fw.source_path.clone()).chain(fw.dsym_path.clone())
    });
    dedup_preserving_order(std::iter::once(script_path.to_string()).chain(sources))
}

/// Clear both lists when their combined length exceeds [`MAX_INPUT_OUTPUT_PATHS`].
///
/// Without paths the phase always runs, which costs incremental-build precision but keeps the
/// build from failing outright. Returns true when the lists were cleared.
pub fn enforce_path_limit(input_paths: &mut Vec<String>, output_paths: &mut Vec<String>) -> bool {
    let total = input_paths.len() + output_paths.len();
    if total <= MAX_INPUT_OUTPUT_PATHS {
        return false;
    }
    debug!(
        inputs = input_paths.len(),
        outputs = output_paths.len(),
        limit = MAX_INPUT_OUTPUT_PATHS,
        "input/output path limit exceeded, clearing both lists"
    );
    input_paths.clear();
    output_paths.clear();
    true
}

/// Drop empty entries and repeats, keeping the first occurrence of each path.
pub fn dedup_preserving_order(paths: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    paths
        .into_iter()
        .filter(|p| !p.is_empty())
        .filter(|p| seen.insert(p.clone()))
        .collect()
}

fn file_name(path: &str) -> Option<&str> {
    Utf8Path::new(path).file_name().filter(|n| !n.is_empty())
}
