pub mod api;
pub mod cli;
pub mod error;
pub mod extraction;
pub mod pipeline;
pub mod selection;
pub mod store;
pub mod temporal;
pub mod types;
pub mod vendor;

pub use api::{MetadataExtractor, ObjectRecord};
pub use cli::BatchReport;
pub use error::{RadnormError, Result};
pub use pipeline::{collect_dicom_files, run_batch, BatchSummary, PipelineConfig};
pub use selection::{
    select_representative, select_representatives, RepresentativeChoice, SelectionReason,
    SeriesSummary,
};
pub use store::{InsertOutcome, MemoryStore, SeriesStore};
pub use temporal::{RolloverPolicy, TemporalRecord};
pub use types::*;
pub use vendor::{ExtractorChain, VendorExtractor, VendorMetadata};
