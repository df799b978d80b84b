//! Full-refresh exports of the run history
//!
//! Both exporters rebuild their target from scratch on every call: the
//! CSV file is overwritten and the SQLite `runs` table is cleared before
//! reinsertion, so repeated exports never accumulate duplicates. An
//! empty history leaves the target untouched and reports zero rows.
//!
//! The four structured columns (`params`, `metrics`, `model_paths`,
//! `history`) are stored as JSON text in both formats; consumers decode
//! the cell to get the original structure back.

mod csv;
mod sqlite;

pub use self::csv::to_csv;
pub use self::sqlite::to_sqlite;
