//! # Bitacora: Append-Only Run-History Recorder
//!
//! Bitacora records one JSON line per training run into an append-only
//! history file: hyperparameters, evaluation metrics, optional per-epoch
//! history, and saved model paths. Reads tolerate partial or damaged
//! lines, a repair pass recovers what it can, and the history can be
//! exported to CSV or SQLite for analysis.
//!
//! ## Design Principles (Toyota Way Aligned)
//!
//! - **Jidoka**: reads stop at nothing; one damaged line never hides the
//!   rest of the history
//! - **Poka-Yoke safety**: record construction is total, so a weird value
//!   degrades to a string instead of losing the run
//! - **Genchi Genbutsu**: repair works on the real file, through a temp
//!   file and an atomic rename
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use bitacora::{RunLog, RunRecord};
//!
//! let log = RunLog::new("training_history.jsonl");
//!
//! let record = RunRecord::builder()
//!     .param("lr", 0.01)
//!     .param("optimizer", "adam")
//!     .metric("mae", 3.2)
//!     .metric("rmse", 4.1)
//!     .epoch_series("loss", &[1.9, 1.2, 0.8])
//!     .model_path("final", "models/run_0007.bin")
//!     .build();
//! log.append(&record)?;
//!
//! for run in log.load()? {
//!     println!("{} mae={:?}", run.timestamp(), run.metric("mae"));
//! }
//! # Ok::<(), bitacora::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod codec;
pub mod error;
pub mod export;
pub mod query;
pub mod record;
pub mod repair;
pub mod report;
pub mod store;

pub use error::{Error, Result};
pub use record::{RunRecord, RunRecordBuilder};
pub use repair::AuditReport;
pub use store::{RunLog, DEFAULT_EXPORT_PATH, DEFAULT_HISTORY_PATH};
