//! Working-directory helpers for pipeline tests.
//!
//! Tests run the pipeline over a throwaway directory laid out like a real
//! working tree (`source-data/`, `output/`, `public/data/`).

use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

use crate::fixtures;

/// Default working-tree layout, relative to the tree root.
pub mod layout {
    pub const SOURCE_DIR: &str = "source-data";
    pub const INTERMEDIATE_DIR: &str = "output";
    pub const OUTPUT_DIR: &str = "public/data";

    pub const LAYER_METADATA: &str = "source-data/symphony_layer_metadata.json";
    pub const PARAMETER_MATCHES: &str = "source-data/symphony_p02_matches.json";
    pub const CATALOGUE: &str = "source-data/catalogue.json";
    pub const IMPROVEMENT_ANALYSIS: &str = "output/symphony_improvement_analysis.json";
    pub const PARAMETER_TABLE: &str = "output/p02_analysis.json";
    pub const LAYER_AVAILABILITY: &str = "output/symphony_data_availability_index.json";

    pub const MERGED_LAYERS: &str = "public/data/symphony_layers.json";
    pub const SUMMARY: &str = "public/data/summary_statistics.json";
    pub const PUBLISHED_PARAMETER_TABLE: &str = "public/data/p02_analysis.json";
    pub const PUBLISHED_CATALOGUE: &str = "public/data/catalogue.json";
}

/// Returns the workspace root directory.
pub fn workspace_root() -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    PathBuf::from(manifest_dir)
        .parent() // crates/
        .and_then(|p| p.parent()) // workspace root
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(manifest_dir))
}

/// Creates a temporary directory with a specific prefix.
pub fn temp_test_dir_with_prefix(prefix: &str) -> tempfile::TempDir {
    tempfile::Builder::new()
        .prefix(prefix)
        .tempdir()
        .expect("Failed to create temporary test directory")
}

/// Write a JSON document, creating parent directories.
pub fn write_json_file(path: &Path, value: &Value) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create fixture directory");
    }
    let body = serde_json::to_string_pretty(value).expect("Failed to serialize fixture");
    fs::write(path, body).expect("Failed to write fixture");
}

/// Read a JSON document written by the pipeline.
pub fn read_json_file(path: &Path) -> Value {
    let content = fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Invalid JSON in {}: {}", path.display(), e))
}

/// Write every fixture input into `root` using the default layout.
///
/// The layer availability document is not written; the pipeline computes it.
pub fn write_input_tree(root: &Path) {
    write_json_file(&root.join(layout::LAYER_METADATA), &fixtures::layer_metadata());
    write_json_file(&root.join(layout::PARAMETER_MATCHES), &fixtures::parameter_matches());
    write_json_file(&root.join(layout::CATALOGUE), &fixtures::catalogue());
    write_json_file(
        &root.join(layout::IMPROVEMENT_ANALYSIS),
        &fixtures::improvement_analysis(),
    );
    write_json_file(&root.join(layout::PARAMETER_TABLE), &fixtures::parameter_table());
}

/// A temporary working tree holding every fixture input.
pub fn input_tree() -> tempfile::TempDir {
    let dir = temp_test_dir_with_prefix("symphony_test_");
    write_input_tree(dir.path());
    dir
}
