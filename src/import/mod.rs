//! Offer TSV import pipeline.
//!
//! 1. **Reading** (`tsv`) - Splits a file into a header and non-blank data rows
//! 2. **Parsing** (`parser`) - Turns one row into a typed [`OfferRecord`]
//! 3. **Resolution** (`resolver`) - Finds or creates the row's city and author
//! 4. **Writing** (`writer`) - Creates the offer with a coordinate snapshot
//! 5. **Coordination** (`coordinator`) - Runs the above per row and owns the
//!    store connection lifecycle
//!
//! A failing row is logged and counted as skipped; only an unreadable file, a
//! file without data rows, or an unreachable store abort the run.
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use six_cities::import::Importer;
//! use six_cities::store::PgStore;
//!
//! let store = PgStore::new(&database_url)?;
//! let mut importer = Importer::new(store);
//! let stats = importer.import_file(Path::new("offers.tsv")).await?;
//!
//! println!("{} imported, {} skipped", stats.imported, stats.skipped);
//! ```

pub mod coordinator;
pub mod error;
pub mod parser;
pub mod resolver;
pub mod stats;
pub mod tsv;
pub mod writer;

pub use coordinator::{ImportPhase, Importer};
pub use error::{ImportError, RowError};
pub use parser::{OfferRecord, SUPPORTED_CITIES, TSV_COLUMNS, parse_row};
pub use stats::{ImportStats, OfferSummary};
pub use tsv::TsvDocument;
