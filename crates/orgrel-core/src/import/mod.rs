//! Bulk org-chart import
//!
//! Import runs in two phases. [`validate_rows`] checks every row for email format
//! problems and circular manager references without touching the store; only a
//! clean batch reaches [`ImportCommitter::commit`], which resolves members,
//! upserts profiles and swaps in the new manager edges in one step.

mod commit;
mod parse;
mod validate;

pub use commit::{ImportCommitter, ImportFailure, ImportOptions, ImportSummary};
pub use parse::{parse_csv, CsvError, ImportRow};
pub use validate::{is_valid_email, validate_rows, ImportError, ImportErrorType};
