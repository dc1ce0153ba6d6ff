//! Common test fixtures for Symphony pipeline tests.
//!
//! One small, consistent set of upstream documents. The expected results of
//! running the pipeline over it are listed in [`expected`].

use serde_json::{json, Value};

/// Layer names used across the fixtures.
pub mod layers {
    pub const PORPOISE: &str = "Harbour porpoise";
    pub const TRAWLING: &str = "Bottom trawling";
    pub const DEPTH: &str = "Depth";
    pub const EELGRASS: &str = "Eelgrass";
    pub const SHIPPING_NOISE: &str = "Shipping noise";

    /// A description pasted into the name column (over 100 characters).
    pub const OVERLONG: &str = "Modelled distribution of habitat forming benthic species along the \
        Swedish west coast, derived from survey data and habitat models";

    /// Header row repeated as data in the metadata sheet.
    pub const SCHEMA_ROW: &str = "The title of the data layer as presented in Symphony";
}

/// Known results for the fixture documents.
pub mod expected {
    use super::layers::*;

    /// Layer availability indexes, in parameter-match order.
    pub const AVAILABILITY: [(&str, f64); 5] = [
        (PORPOISE, 40.0),
        (TRAWLING, 75.0),
        (DEPTH, 95.5),
        (EELGRASS, 0.0),
        (SHIPPING_NOISE, 15.0),
    ];

    /// Mean of [`AVAILABILITY`].
    pub const OVERALL_MEAN: f64 = 45.1;

    /// Layers kept by the ecosystem/pressure filter, in metadata order.
    pub const FILTERED_LAYERS: [&str; 4] = [PORPOISE, TRAWLING, EELGRASS, SHIPPING_NOISE];

    /// Layers kept when every category is admitted, in metadata order.
    pub const ALL_LAYERS: [&str; 5] = [PORPOISE, TRAWLING, DEPTH, EELGRASS, SHIPPING_NOISE];

    /// Metadata rows in the fixture.
    pub const METADATA_ROWS: usize = 8;
}

/// Raw metadata sheet rows, original column names.
pub fn layer_metadata() -> Value {
    json!([
        {
            "Name": layers::SCHEMA_ROW,
            "SymphonyCategory": "The Symphony category (Ecosystem or Pressure)",
            "Summary": "A short description of the layer"
        },
        {
            "Name": layers::PORPOISE,
            "SwedishName": "Tumlare",
            "SymphonyTheme": "Marine mammals",
            "SymphonyCategory": "Ecosystem",
            "Status": "Completed",
            "Summary": "Modelled density of Phocoena phocoena",
            "Summary(Swedish)": "Modellerad täthet av tumlare"
        },
        {
            "Name": layers::TRAWLING,
            "SymphonyTheme": "Fishing",
            "SymphonyCategory": "Pressure",
            "DataFormat": "Raster",
            "Summary": "Swept area ratio from VMS data"
        },
        {
            "Name": layers::DEPTH,
            "SymphonyCategory": "Source data",
            "Summary": "Bathymetry"
        },
        {
            "Name": "N/A",
            "SymphonyCategory": "Ecosystem"
        },
        {
            "Name": layers::OVERLONG,
            "SymphonyCategory": "Ecosystem"
        },
        {
            "Name": layers::EELGRASS,
            "SymphonyTheme": "Habitats",
            "SymphonyCategory": "Ecosystem",
            "Summary": "Eelgrass meadows"
        },
        {
            "Name": layers::SHIPPING_NOISE,
            "SymphonyCategory": "Pressure",
            "Summary": "Continuous underwater noise from shipping",
            "Legacy ID": "P-17"
        }
    ])
}

/// Improvement analysis document. Eelgrass has no entry.
pub fn improvement_analysis() -> Value {
    json!({
        "metadata": {"model": "fixture"},
        "layer_analyses": {
            (layers::PORPOISE): {
                "improvement_potential": "large",
                "difficulty": "high",
                "satellite": false,
                "reasoning": {
                    "improvement_justification": "Sparse acoustic monitoring",
                    "difficulty_justification": "Requires dedicated surveys",
                    "satellite_justification": "Animals are not visible from space"
                }
            },
            (layers::TRAWLING): {
                "improvement_potential": "medium",
                "difficulty": "low",
                "satellite": true,
                "digital_earth_sweden": true,
                "reasoning": {
                    "improvement_justification": "VMS coverage is incomplete for small vessels",
                    "difficulty_justification": "AIS data is readily available",
                    "satellite_justification": "Satellite AIS fills coastal gaps",
                    "digital_earth_sweden_justification": "Sentinel-2 imagery shows trawl marks"
                }
            },
            (layers::DEPTH): {
                "improvement_potential": "small",
                "difficulty": "low",
                "satellite": false
            },
            (layers::SHIPPING_NOISE): {
                "improvement_potential": "small",
                "difficulty": "medium",
                "satellite": false,
                "reasoning": {
                    "improvement_justification": "Model already validated"
                }
            }
        }
    })
}

/// Parameter matches per layer. Shipping noise references a code missing
/// from the parameter table.
pub fn parameter_matches() -> Value {
    json!({
        (layers::PORPOISE): [
            {"code": "MAMM", "label": "Marine mammal abundance"},
            {"code": "ACOU", "label": "Acoustic detections"}
        ],
        (layers::TRAWLING): [
            {"code": "FISH", "label": "Fishing effort"},
            {"code": "TRWL", "label": "Trawl tracks"}
        ],
        (layers::DEPTH): [
            {"code": "BATH", "label": "Bathymetry"}
        ],
        (layers::EELGRASS): [],
        (layers::SHIPPING_NOISE): [
            {"code": "NOIS", "label": "Underwater noise"},
            {"code": "GONE", "label": "Retired parameter"}
        ]
    })
}

/// Parameter availability table. ACOU carries the unknown sentinel.
pub fn parameter_table() -> Value {
    json!({
        "MAMM": {
            "preferred_label": "Marine mammal abundance",
            "parameter_availability_index": 80.0,
            "horizontal_resolution_pct": 80.0,
            "spatial_coverage_pct": 80.0,
            "time_coverage_pct": 80.0,
            "up_to_date_pct": 80.0
        },
        "ACOU": {
            "preferred_label": "Acoustic detections",
            "parameter_availability_index": "unknown"
        },
        "FISH": {"preferred_label": "Fishing effort", "parameter_availability_index": 100.0},
        "TRWL": {"preferred_label": "Trawl tracks", "parameter_availability_index": 50.0},
        "BATH": {"preferred_label": "Bathymetry", "parameter_availability_index": 95.5},
        "NOIS": {"preferred_label": "Underwater noise", "parameter_availability_index": "30"}
    })
}

/// Dataset catalogue republished unchanged.
pub fn catalogue() -> Value {
    json!([
        {"id": "ds-001", "title": "Harbour porpoise density 2020", "keywords": ["mammals"]},
        {"id": "ds-002", "title": "VMS swept area ratio", "keywords": ["fishing"]}
    ])
}
