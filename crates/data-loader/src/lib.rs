//! # Data Loader Crate
//!
//! This crate produces the interaction stream the recommender trains on.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (UserId, ItemId, InteractionRecord)
//! - **parser**: Parse delimited interaction files into records
//! - **source**: `DataSource` providers (synthetic dataset, file export)
//! - **aggregate**: Duplicate summing and dataset summaries
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::{DataSource, SourceKind};
//!
//! let kind = SourceKind::from_parts("file", Some("data/likes.csv".into()), ',')?;
//! let records = kind.open().load()?;
//! println!("Loaded {} interaction records", records.len());
//! ```

// Public modules
pub mod error;
pub mod types;
pub mod parser;
pub mod source;
pub mod aggregate;

// Re-export commonly used types for convenience
pub use error::{DataLoadError, Result};
pub use types::{
    // Type aliases
    UserId,
    ItemId,
    // Core types
    InteractionRecord,
    DatasetSummary,
};
pub use source::{DataSource, FileSource, SourceKind, SyntheticSource};
pub use aggregate::{aggregate, summarize};
