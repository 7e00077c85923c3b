//! tally-ingest: bank-statement normalization core.
//!
//! Format detection, vendor-specific CSV parsers, the shared normalizer,
//! and the directory batch runner. Everything here is synchronous and
//! stateless beyond a single batch accumulator.

pub mod batch;
pub mod detect;
pub mod normalize;
pub mod parsers;
pub mod schema;
pub mod table;

pub use batch::{BatchSummary, run_dir};
pub use detect::{ParserKind, parser_for_path};
pub use table::Table;
