//! Common types shared by the Symphony layer merge pipeline and its tools.

pub mod availability;
pub mod error;
pub mod layer;
pub mod parameter;
pub mod record;
pub mod table;

pub use availability::{
    round3, AvailabilityDocument, AvailabilityMetadata, AvailabilityStatistics, LayerAvailability,
};
pub use error::{SymphonyError, SymphonyResult};
pub use layer::{
    Difficulty, ImprovementAnalysis, ImprovementAnalysisDocument, ImprovementPotential,
    ImprovementReasoning, LayerCategory,
};
pub use parameter::{ParameterAvailability, ParameterDetail, ParameterRef, SubIndexes};
pub use record::MergedLayerRecord;
pub use table::KeyedTable;
