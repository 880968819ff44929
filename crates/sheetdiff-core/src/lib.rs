//! Tabular diff engine.
//!
//! Compares an old and a new version of the same sheet either by sorted
//! position ([`AlignmentMode::SortAligned`]) or by identifier membership
//! ([`AlignmentMode::KeyMatched`]).
//!
//! [`AlignmentMode::SortAligned`]: sheetdiff_model::AlignmentMode::SortAligned
//! [`AlignmentMode::KeyMatched`]: sheetdiff_model::AlignmentMode::KeyMatched

pub mod align;
pub mod classify;
pub mod columns;
pub mod engine;
pub mod error;
pub mod filter;
pub mod normalize;

pub use align::{KeyMatch, RowPair, SortAlignment, SortFailure, align_sorted, match_keys};
pub use classify::{Classification, ClassifyContext, classify};
pub use columns::{comparable_columns, date_like_columns, union_columns};
pub use engine::{
    CancelFlag, ProgressObserver, RunOptions, SheetOutcome, WorkbookDiff, compare_workbooks,
    compare_workbooks_with, diff_sheet,
};
pub use error::{DiffError, SheetError, Side};
pub use filter::{DEFAULT_CANDIDATE_LIMIT, FilterCandidates, apply_value_filter, filter_candidates};
pub use normalize::{
    ComparableValue, ComparisonPath, DateParse, ValueComparison, compare_values, normalize,
    parse_date,
};
