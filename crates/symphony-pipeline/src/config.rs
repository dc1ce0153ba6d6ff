//! Pipeline configuration: file layout, merge strategy and the static
//! field-mapping and default tables.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use symphony_common::{
    Difficulty, ImprovementPotential, ImprovementReasoning, LayerAvailability, LayerCategory,
    MergedLayerRecord,
};

use crate::error::{InputRole, PipelineError, Result};

/// Original metadata sheet column -> canonical output key.
pub const DEFAULT_KEY_MAPPING: &[(&str, &str)] = &[
    ("Name", "name"),
    ("SwedishName", "swedish_name"),
    ("SymphonyTheme", "symphony_theme"),
    ("SymphonyCategory", "symphony_category"),
    ("SymphonyDataType", "symphony_data_type"),
    ("DateCreated", "date_created"),
    ("Status", "status"),
    ("DataFormat", "data_format"),
    ("TemporalPeriod", "temporal_period"),
    ("ResourceType", "resource_type"),
    ("CoordinateReferenceSystem", "coordinate_reference_system"),
    ("Summary", "summary"),
    ("Summary(Swedish)", "summary_swedish"),
    ("Lineage", "lineage"),
    ("LimitationsforuseinSymphony", "limitations_for_use_in_symphony"),
    ("Recommendationsfordataimprovement", "recommendations_for_data_improvement"),
    ("Dataauthoringorganisation", "data_authoring_organisation"),
    ("Contactorganisation", "contact_organisation"),
    ("DataAuthorContact", "data_author_contact"),
    ("DataOwner", "data_owner"),
    ("DataOwnerContact", "data_owner_contact"),
    ("INSPIREtopiccategory", "inspire_topic_category"),
    ("INSPIREtheme", "inspire_theme"),
    ("GEMETkeywords", "gemet_keywords"),
    ("AccessUseRestrictions", "access_use_restrictions"),
    ("UseLimitations", "use_limitations"),
    ("OtherRestrictions", "other_restrictions"),
    ("MapAcknowledgement", "map_acknowledgement"),
    ("SecurityClassification", "security_classification"),
    ("Maintenance", "maintenance"),
    ("MetadataDate", "metadata_date"),
    ("MetadataOrganisation", "metadata_organisation"),
    ("MetadataContact", "metadata_contact"),
];

/// Values substituted when an enrichment lookup misses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnrichmentDefaults {
    pub improvement_potential: ImprovementPotential,
    pub difficulty: Difficulty,
    pub satellite: bool,
    pub digital_earth_sweden: bool,
    pub data_availability_index: f64,
    pub parameter_count: usize,
}

pub const ENRICHMENT_DEFAULTS: EnrichmentDefaults = EnrichmentDefaults {
    improvement_potential: ImprovementPotential::Medium,
    difficulty: Difficulty::Medium,
    satellite: false,
    digital_earth_sweden: false,
    data_availability_index: 0.0,
    parameter_count: 0,
};

impl EnrichmentDefaults {
    /// Reasoning with every justification empty.
    pub fn reasoning(&self) -> ImprovementReasoning {
        ImprovementReasoning::default()
    }

    pub fn availability(&self) -> LayerAvailability {
        LayerAvailability {
            data_availability_index: self.data_availability_index,
            parameter_count: self.parameter_count,
            parameter_details: Vec::new(),
        }
    }
}

/// Field renaming table used by the merge.
#[derive(Debug, Clone)]
pub struct KeyMapping {
    map: HashMap<String, String>,
}

impl KeyMapping {
    /// Built-in mapping with configured overrides applied on top.
    pub fn with_overrides(overrides: &BTreeMap<String, String>) -> Self {
        let mut map: HashMap<String, String> = DEFAULT_KEY_MAPPING
            .iter()
            .map(|(from, to)| (from.to_string(), to.to_string()))
            .collect();
        for (from, to) in overrides {
            map.insert(from.clone(), to.clone());
        }
        Self { map }
    }

    /// Canonical key for an original key, `None` if the key is unmapped.
    pub fn canonical(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl Default for KeyMapping {
    fn default() -> Self {
        Self::with_overrides(&BTreeMap::new())
    }
}

/// Which layer categories survive the merge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum CategoryFilter {
    /// Keep every category.
    All,
    /// Keep only the listed categories.
    AllowList { categories: Vec<LayerCategory> },
}

impl CategoryFilter {
    /// The strategy used for the published explorer: ecosystems and pressures.
    pub fn ecosystem_and_pressure() -> Self {
        CategoryFilter::AllowList {
            categories: vec![LayerCategory::Ecosystem, LayerCategory::Pressure],
        }
    }

    /// Whether a raw category label passes the filter.
    ///
    /// With an allow-list, a missing or unrecognized label never passes.
    pub fn admits(&self, raw_category: Option<&str>) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::AllowList { categories } => raw_category
                .and_then(|raw| raw.parse::<LayerCategory>().ok())
                .is_some_and(|category| categories.contains(&category)),
        }
    }
}

impl Default for CategoryFilter {
    fn default() -> Self {
        Self::ecosystem_and_pressure()
    }
}

/// Merge engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Original key holding the layer name.
    pub name_field: String,
    /// Original key holding the Symphony category.
    pub category_field: String,
    /// Longer names are treated as schema/header rows.
    pub max_name_length: usize,
    /// Names starting with one of these are schema/header rows.
    pub schema_row_prefixes: Vec<String>,
    /// Names that stand for "no layer".
    pub placeholder_names: Vec<String>,
    pub category_filter: CategoryFilter,
    /// Additional or replacement entries for the key mapping table.
    pub key_mapping: BTreeMap<String, String>,
    /// Log progress every N processed layers.
    pub progress_interval: usize,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            name_field: "Name".to_string(),
            category_field: "SymphonyCategory".to_string(),
            max_name_length: 100,
            schema_row_prefixes: vec!["The title of the data".to_string()],
            placeholder_names: vec!["".to_string(), "N/A".to_string()],
            category_filter: CategoryFilter::default(),
            key_mapping: BTreeMap::new(),
            progress_interval: 10,
        }
    }
}

/// Working directories of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Hand-maintained upstream inputs (metadata sheets, matches, catalogue).
    pub source_dir: PathBuf,
    /// Generated inputs and intermediate results.
    pub intermediate_dir: PathBuf,
    /// Published artifacts read by the UI.
    pub output_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("source-data"),
            intermediate_dir: PathBuf::from("output"),
            output_dir: PathBuf::from("public/data"),
        }
    }
}

/// File names inside the working directories.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilesConfig {
    pub layer_metadata: String,
    pub parameter_matches: String,
    pub improvement_analysis: String,
    pub parameter_table: String,
    pub layer_availability: String,
    /// Dataset catalogue republished as-is; `None` disables it.
    pub catalogue: Option<String>,
    pub merged_layers: String,
    pub summary: String,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            layer_metadata: "symphony_layer_metadata.json".to_string(),
            parameter_matches: "symphony_p02_matches.json".to_string(),
            improvement_analysis: "symphony_improvement_analysis.json".to_string(),
            parameter_table: "p02_analysis.json".to_string(),
            layer_availability: "symphony_data_availability_index.json".to_string(),
            catalogue: Some("catalogue.json".to_string()),
            merged_layers: "symphony_layers.json".to_string(),
            summary: "summary_statistics.json".to_string(),
        }
    }
}

/// Complete pipeline configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub paths: PathsConfig,
    pub files: FilesConfig,
    pub merge: MergeConfig,
}

impl PipelineConfig {
    /// Location of an upstream input.
    pub fn input_path(&self, role: InputRole) -> PathBuf {
        let (dir, name) = match role {
            InputRole::LayerMetadata => (&self.paths.source_dir, &self.files.layer_metadata),
            InputRole::ParameterMatches => (&self.paths.source_dir, &self.files.parameter_matches),
            InputRole::ImprovementAnalysis => {
                (&self.paths.intermediate_dir, &self.files.improvement_analysis)
            }
            InputRole::ParameterTable => (&self.paths.intermediate_dir, &self.files.parameter_table),
            InputRole::LayerAvailability => {
                (&self.paths.intermediate_dir, &self.files.layer_availability)
            }
        };
        dir.join(name)
    }

    pub fn catalogue_source(&self) -> Option<PathBuf> {
        self.files
            .catalogue
            .as_ref()
            .map(|name| self.paths.source_dir.join(name))
    }

    pub fn output_path(&self, name: &str) -> PathBuf {
        self.paths.output_dir.join(name)
    }

    pub fn merged_layers_path(&self) -> PathBuf {
        self.output_path(&self.files.merged_layers)
    }

    pub fn summary_path(&self) -> PathBuf {
        self.output_path(&self.files.summary)
    }

    /// Resolve relative directories against a base directory.
    pub fn rooted_at(mut self, base: &Path) -> Self {
        for dir in [
            &mut self.paths.source_dir,
            &mut self.paths.intermediate_dir,
            &mut self.paths.output_dir,
        ] {
            if dir.is_relative() {
                *dir = base.join(&*dir);
            }
        }
        self
    }

    /// Reject settings the merge cannot run with.
    pub fn validate(&self) -> Result<()> {
        let merge = &self.merge;
        if merge.name_field.trim().is_empty() {
            return Err(PipelineError::InvalidConfig("merge.name_field must not be empty".into()));
        }
        if merge.max_name_length == 0 {
            return Err(PipelineError::InvalidConfig("merge.max_name_length must be > 0".into()));
        }
        if merge.progress_interval == 0 {
            return Err(PipelineError::InvalidConfig("merge.progress_interval must be > 0".into()));
        }
        if let CategoryFilter::AllowList { categories } = &merge.category_filter {
            if categories.is_empty() {
                return Err(PipelineError::InvalidConfig(
                    "merge.category_filter allow_list needs at least one category".into(),
                ));
            }
        }
        if let Some((from, to)) = merge
            .key_mapping
            .iter()
            .find(|(_, to)| MergedLayerRecord::is_enrichment_key(to))
        {
            return Err(PipelineError::InvalidConfig(format!(
                "merge.key_mapping maps '{from}' onto enrichment key '{to}'"
            )));
        }
        let files = [
            &self.files.layer_metadata,
            &self.files.parameter_matches,
            &self.files.improvement_analysis,
            &self.files.parameter_table,
            &self.files.layer_availability,
            &self.files.merged_layers,
            &self.files.summary,
        ];
        if files.iter().any(|name| name.trim().is_empty()) {
            return Err(PipelineError::InvalidConfig("file names must not be empty".into()));
        }
        Ok(())
    }
}
