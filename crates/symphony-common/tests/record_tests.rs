//! Serialization tests for the published layer record.

use serde_json::{json, Map, Value};
use symphony_common::{
    Difficulty, ImprovementPotential, ImprovementReasoning, MergedLayerRecord, ParameterDetail,
    ParameterRef,
};

fn sample_record() -> MergedLayerRecord {
    let mut fields = Map::new();
    fields.insert("name".to_string(), json!("Harbour porpoise"));
    fields.insert("symphony_category".to_string(), json!("Ecosystem"));
    fields.insert("summary".to_string(), json!("Modelled density of Phocoena phocoena"));

    MergedLayerRecord {
        fields,
        improvement_potential: ImprovementPotential::Large,
        difficulty: Difficulty::High,
        satellite: false,
        digital_earth_sweden: true,
        improvement_reasoning: ImprovementReasoning {
            improvement_justification: "Sparse acoustic monitoring".to_string(),
            digital_earth_sweden_justification: "Sentinel-1 mosaics cover the coast".to_string(),
            ..Default::default()
        },
        p02_parameters: vec![ParameterRef::new("MAMM", "Marine mammal abundance")],
        data_availability_index: 42.5,
        parameter_count: 1,
        parameter_details: vec![ParameterDetail {
            code: "MAMM".to_string(),
            label: "Marine mammal abundance".to_string(),
            availability_index: 42.5,
        }],
    }
}

// ============================================================================
// Key order
// ============================================================================

#[test]
fn test_metadata_fields_precede_enrichment_fields() {
    let value = serde_json::to_value(sample_record()).unwrap();
    let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        vec![
            "name",
            "symphony_category",
            "summary",
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
}

#[test]
fn test_reasoning_always_has_all_justifications() {
    let value = serde_json::to_value(sample_record()).unwrap();
    assert_eq!(
        value["improvement_reasoning"],
        json!({
            "improvement_justification": "Sparse acoustic monitoring",
            "difficulty_justification": "",
            "satellite_justification": "",
            "digital_earth_sweden_justification": "Sentinel-1 mosaics cover the coast"
        })
    );
}

// ============================================================================
// Parsing published output
// ============================================================================

#[test]
fn test_parse_published_record() {
    let text = serde_json::to_string_pretty(&sample_record()).unwrap();
    let parsed: MergedLayerRecord = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed.name(), Some("Harbour porpoise"));
    assert_eq!(parsed.improvement_potential, ImprovementPotential::Large);
    assert_eq!(parsed.fields.len(), 3);
    assert_eq!(parsed.fields.get("summary"), Some(&Value::from("Modelled density of Phocoena phocoena")));
}

#[test]
fn test_enrichment_key_lookup() {
    assert!(MergedLayerRecord::is_enrichment_key("satellite"));
    assert!(MergedLayerRecord::is_enrichment_key("digital_earth_sweden"));
    assert!(MergedLayerRecord::is_enrichment_key("parameter_details"));
    assert!(!MergedLayerRecord::is_enrichment_key("summary"));
}
