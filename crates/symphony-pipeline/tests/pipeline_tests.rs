//! End-to-end tests of the pipeline over the fixture working tree.

use std::fs;

use serde_json::Value;
use symphony_common::{Difficulty, ImprovementPotential, MergedLayerRecord};
use symphony_pipeline::{
    CategoryFilter, InputRole, PipelineConfig, PipelineContext, PipelineError, SkipReason,
};
use test_utils::{
    assert_approx_eq, expected, input_tree, layers, layout, read_json_file, write_json_file,
};

fn context_for(root: &std::path::Path) -> PipelineContext {
    PipelineContext::new(PipelineConfig::default().rooted_at(root)).unwrap()
}

fn read_records(root: &std::path::Path) -> Vec<MergedLayerRecord> {
    let content = fs::read_to_string(root.join(layout::MERGED_LAYERS)).unwrap();
    serde_json::from_str(&content).unwrap()
}

// ============================================================================
// Availability stage
// ============================================================================

#[test]
fn test_availability_document_written_in_match_order() {
    let tree = input_tree();
    let run = context_for(tree.path()).compute_availability().unwrap();

    let written = read_json_file(&tree.path().join(layout::LAYER_AVAILABILITY));
    let layers_obj = written["layer_availability"].as_object().unwrap();
    let names: Vec<&str> = layers_obj.keys().map(String::as_str).collect();
    let expected_names: Vec<&str> = expected::AVAILABILITY.iter().map(|(n, _)| *n).collect();
    assert_eq!(names, expected_names);

    for (name, index) in expected::AVAILABILITY {
        let actual = layers_obj[name]["data_availability_index"].as_f64().unwrap();
        assert_approx_eq!(actual, index, 1e-9);
    }

    let stats = &run.document.metadata.overall_statistics;
    assert_approx_eq!(stats.mean, expected::OVERALL_MEAN, 1e-9);
    assert_eq!(stats.median, 40.0);
    assert_eq!(run.document.metadata.total_layers, 5);
    assert_eq!(run.document.metadata.total_parameters, 7);

    assert_eq!(
        run.report.missing_codes,
        vec![(layers::SHIPPING_NOISE.to_string(), "GONE".to_string())]
    );
    assert_eq!(run.report.unknown_indexes, 1);
    assert_eq!(run.report.layers_without_parameters, 1);
}

#[test]
fn test_parameter_details_keep_match_order() {
    let tree = input_tree();
    let run = context_for(tree.path()).compute_availability().unwrap();
    let porpoise = run.document.layer_availability.get(layers::PORPOISE).unwrap();
    let codes: Vec<&str> = porpoise.parameter_details.iter().map(|d| d.code.as_str()).collect();
    assert_eq!(codes, vec!["MAMM", "ACOU"]);
    assert_eq!(porpoise.parameter_details[1].availability_index, 0.0);
}

// ============================================================================
// Full run
// ============================================================================

#[test]
fn test_run_produces_one_record_per_valid_layer() {
    let tree = input_tree();
    let outcome = context_for(tree.path()).run().unwrap();

    let records = read_records(tree.path());
    let names: Vec<&str> = records.iter().filter_map(|r| r.name()).collect();
    assert_eq!(names, expected::FILTERED_LAYERS.to_vec());

    let report = &outcome.merge.report;
    assert_eq!(report.processed_count, 4);
    assert_eq!(report.skipped_count, 4);
    assert_eq!(report.skipped(SkipReason::SchemaRow), 1);
    assert_eq!(report.skipped(SkipReason::PlaceholderName), 1);
    assert_eq!(report.skipped(SkipReason::NameTooLong), 1);
    assert_eq!(report.skipped(SkipReason::CategoryExcluded), 1);
    assert_eq!(report.missing_improvement, 1);
    assert_eq!(report.missing_matches, 0);
    assert_eq!(report.missing_availability, 0);
    assert_eq!(report.unmapped_keys.get("Legacy ID"), Some(&1));

    assert_eq!(outcome.merge.published, 2);
    assert!(outcome.validation.all_valid);
}

#[test]
fn test_enriched_record_contents() {
    let tree = input_tree();
    context_for(tree.path()).run().unwrap();
    let records = read_records(tree.path());

    let porpoise = &records[0];
    assert_eq!(porpoise.improvement_potential, ImprovementPotential::Large);
    assert_eq!(porpoise.difficulty, Difficulty::High);
    assert!(!porpoise.satellite);
    assert!(!porpoise.digital_earth_sweden);
    assert_eq!(
        porpoise.improvement_reasoning.improvement_justification,
        "Sparse acoustic monitoring"
    );
    assert_eq!(porpoise.p02_parameters.len(), 2);
    assert_eq!(porpoise.data_availability_index, 40.0);
    assert_eq!(porpoise.parameter_count, 2);

    let trawling = &records[1];
    assert!(trawling.satellite);
    assert!(trawling.digital_earth_sweden);
    assert_eq!(
        trawling.improvement_reasoning.digital_earth_sweden_justification,
        "Sentinel-2 imagery shows trawl marks"
    );

    let noise = &records[3];
    assert_eq!(noise.data_availability_index, 15.0);
    assert_eq!(noise.parameter_details[1].label, "Retired parameter");
    assert_eq!(noise.improvement_reasoning.satellite_justification, "");
}

#[test]
fn test_layer_without_analysis_gets_defaults() {
    let tree = input_tree();
    context_for(tree.path()).run().unwrap();
    let records = read_records(tree.path());

    let eelgrass = records
        .iter()
        .find(|r| r.name() == Some(layers::EELGRASS))
        .unwrap();
    assert_eq!(eelgrass.improvement_potential, ImprovementPotential::Medium);
    assert_eq!(eelgrass.difficulty, Difficulty::Medium);
    assert!(!eelgrass.satellite);
    assert!(!eelgrass.digital_earth_sweden);
    assert_eq!(eelgrass.improvement_reasoning.improvement_justification, "");
    assert_eq!(eelgrass.improvement_reasoning.difficulty_justification, "");
    assert_eq!(eelgrass.improvement_reasoning.satellite_justification, "");
    assert_eq!(eelgrass.improvement_reasoning.digital_earth_sweden_justification, "");
    assert_eq!(eelgrass.data_availability_index, 0.0);
    assert_eq!(eelgrass.parameter_count, 0);
    assert!(eelgrass.parameter_details.is_empty());
}

#[test]
fn test_published_key_order() {
    let tree = input_tree();
    context_for(tree.path()).run().unwrap();

    let published = read_json_file(&tree.path().join(layout::MERGED_LAYERS));
    let first = published[0].as_object().unwrap();
    let keys: Vec<&str> = first.keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        vec![
            "name",
            "swedish_name",
            "symphony_theme",
            "symphony_category",
            "status",
            "summary",
            "summary_swedish",
            "improvement_potential",
            "difficulty",
            "satellite",
            "digital_earth_sweden",
            "improvement_reasoning",
            "p02_parameters",
            "data_availability_index",
            "parameter_count",
            "parameter_details",
        ]
    );
    assert_eq!(first["summary_swedish"], Value::from("Modellerad täthet av tumlare"));
}

#[test]
fn test_all_categories_strategy() {
    let tree = input_tree();
    let mut config = PipelineConfig::default().rooted_at(tree.path());
    config.merge.category_filter = CategoryFilter::All;
    let outcome = PipelineContext::new(config).unwrap().run().unwrap();

    let records = read_records(tree.path());
    let names: Vec<&str> = records.iter().filter_map(|r| r.name()).collect();
    assert_eq!(names, expected::ALL_LAYERS.to_vec());
    assert_eq!(outcome.merge.report.skipped_count, 3);
}

#[test]
fn test_summary_statistics() {
    let tree = input_tree();
    let outcome = context_for(tree.path()).run().unwrap();
    let summary = &outcome.merge.summary;

    assert_eq!(summary.total_layers, 4);
    assert_eq!(summary.improvement_potential.large, 1);
    assert_eq!(summary.improvement_potential.medium, 2);
    assert_eq!(summary.improvement_potential.small, 1);
    assert_eq!(summary.difficulty.medium, 2);
    assert_eq!(summary.satellite.yes, 1);
    assert_eq!(summary.satellite.no, 3);
    assert_eq!(summary.total_parameter_matches, 6);

    // Eelgrass (index 0) is left out of the availability statistics.
    let stats = summary.data_availability.unwrap();
    assert_approx_eq!(stats.mean, 43.333, 1e-9);
    assert_eq!(stats.min, 15.0);
    assert_eq!(stats.max, 75.0);

    let written = read_json_file(&tree.path().join(layout::SUMMARY));
    assert_eq!(written["satellite"]["true"], Value::from(1));
}

// ============================================================================
// Idempotence
// ============================================================================

#[test]
fn test_repeated_runs_are_byte_identical() {
    let tree = input_tree();
    let context = context_for(tree.path());

    context.run().unwrap();
    let first: Vec<Vec<u8>> = [layout::MERGED_LAYERS, layout::SUMMARY, layout::LAYER_AVAILABILITY]
        .iter()
        .map(|f| fs::read(tree.path().join(f)).unwrap())
        .collect();

    context.run().unwrap();
    let second: Vec<Vec<u8>> = [layout::MERGED_LAYERS, layout::SUMMARY, layout::LAYER_AVAILABILITY]
        .iter()
        .map(|f| fs::read(tree.path().join(f)).unwrap())
        .collect();

    assert_eq!(first, second);
}

#[test]
fn test_merge_from_disk_matches_in_memory_run() {
    let tree = input_tree();
    let context = context_for(tree.path());

    context.run().unwrap();
    let from_run = fs::read(tree.path().join(layout::MERGED_LAYERS)).unwrap();

    context.merge_from_disk().unwrap();
    let from_disk = fs::read(tree.path().join(layout::MERGED_LAYERS)).unwrap();

    assert_eq!(from_run, from_disk);
}

// ============================================================================
// Fatal inputs
// ============================================================================

#[test]
fn test_missing_parameter_matches_aborts() {
    let tree = input_tree();
    fs::remove_file(tree.path().join(layout::PARAMETER_MATCHES)).unwrap();

    let err = context_for(tree.path()).run().unwrap_err();
    assert!(matches!(
        err,
        PipelineError::MissingInput {
            role: InputRole::ParameterMatches,
            ..
        }
    ));
    assert!(!tree.path().join(layout::MERGED_LAYERS).exists());
}

#[test]
fn test_merge_without_availability_file_aborts() {
    let tree = input_tree();
    let err = context_for(tree.path()).merge_from_disk().unwrap_err();
    assert_eq!(err.input_role(), Some(InputRole::LayerAvailability));
}

#[test]
fn test_malformed_metadata_aborts() {
    let tree = input_tree();
    fs::write(tree.path().join(layout::LAYER_METADATA), "{\"Name\": ").unwrap();

    let err = context_for(tree.path()).run().unwrap_err();
    assert!(matches!(
        err,
        PipelineError::InvalidJson {
            role: InputRole::LayerMetadata,
            ..
        }
    ));
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn test_validate_before_run_reports_absent_artifacts() {
    let tree = input_tree();
    let summary = context_for(tree.path()).validate_outputs();
    assert!(!summary.all_valid);
    assert!(summary.per_file.iter().all(|s| !s.exists && !s.parses));
}

#[test]
fn test_missing_catalogue_fails_validation_only() {
    let tree = input_tree();
    fs::remove_file(tree.path().join(layout::CATALOGUE)).unwrap();

    let outcome = context_for(tree.path()).run().unwrap();
    assert_eq!(outcome.merge.published, 1);
    assert!(!outcome.validation.all_valid);
    assert_eq!(outcome.validation.failed_count(), 1);
    assert!(!tree.path().join(layout::PUBLISHED_CATALOGUE).exists());
    assert!(tree.path().join(layout::PUBLISHED_PARAMETER_TABLE).exists());
}

#[test]
fn test_removed_catalogue_source_clears_previous_copy() {
    let tree = input_tree();
    let context = context_for(tree.path());
    let first = context.run().unwrap();
    assert!(first.validation.all_valid);
    assert!(tree.path().join(layout::PUBLISHED_CATALOGUE).exists());

    fs::remove_file(tree.path().join(layout::CATALOGUE)).unwrap();
    let second = context.run().unwrap();
    assert_eq!(second.merge.published, 1);
    assert!(!second.validation.all_valid);
    assert_eq!(second.validation.failed_count(), 1);
    assert!(!tree.path().join(layout::PUBLISHED_CATALOGUE).exists());
}

#[test]
fn test_bad_reasoning_value_degrades_to_empty_text() {
    let tree = input_tree();
    let path = tree.path().join(layout::IMPROVEMENT_ANALYSIS);
    let mut analysis = read_json_file(&path);
    analysis["layer_analyses"][layers::PORPOISE]["reasoning"]["satellite_justification"] =
        Value::Null;
    analysis["layer_analyses"][layers::TRAWLING]["satellite"] = Value::from("yes");
    write_json_file(&path, &analysis);

    let outcome = context_for(tree.path()).run().unwrap();
    assert_eq!(outcome.merge.report.invalid_values, 1);
    assert!(outcome.validation.all_valid);

    let records = read_records(tree.path());
    assert_eq!(records[0].improvement_reasoning.satellite_justification, "");
    assert_eq!(
        records[0].improvement_reasoning.improvement_justification,
        "Sparse acoustic monitoring"
    );
    assert!(!records[1].satellite);
}

#[test]
fn test_validation_counts_records() {
    let tree = input_tree();
    let outcome = context_for(tree.path()).run().unwrap();
    let counts: Vec<(&str, Option<usize>)> = outcome
        .validation
        .per_file
        .iter()
        .map(|s| (s.label.as_str(), s.record_count))
        .collect();
    assert_eq!(
        counts,
        vec![
            ("merged layers", Some(4)),
            ("parameter availability table", Some(6)),
            ("layer availability", Some(2)),
            ("summary statistics", Some(6)),
            ("catalogue", Some(2)),
        ]
    );
}
