//! Extraction of semi-structured HTML table documents into a document store,
//! with discrepancy tracking and batch validation.

mod config;
mod country;
mod creation;
mod discrepancy;
mod error;
mod fields;
mod html;
mod model;
mod options;
mod pipeline;
mod store;
mod validation;

pub use config::StoreConfig;
pub use country::{Country, search_fuzzy};
pub use creation::{find_date_token, parse_date_token};
pub use discrepancy::{Discrepancy, DiscrepancyFamily, DiscrepancyType};
pub use error::IngestError;
pub use model::{CellGrid, Finding, ParsedBody, TableDocument, ValidationStatus};
pub use options::{ExtractOptions, VALID_FILE_EXTENSIONS, ValidationOptions, parse_threshold_date};
pub use pipeline::{
    DocumentParser, IngestReport, ParsedFile, parse_file, parse_source, valid_files,
};
pub use store::{Collection, Document, Filter, Store};
pub use validation::DocumentValidator;
