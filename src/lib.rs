//! # dimuon-skim
//!
//! `dimuon-skim` reduces columnar collision-event files to a flat table of opposite-sign
//! dimuon candidates. It reads the `Events` collection from a ROOT or Parquet source, keeps
//! muons which pass identification and kinematic acceptance cuts, pairs the events with
//! exactly two surviving muons of opposite charge, and emits one row per candidate with the
//! kinematics of both muons, the invariant mass of the pair, and the event's missing
//! transverse energy.
//!
//! The selection itself is a single vectorized [`polars`] pipeline over jagged (`List`-typed)
//! muon columns; four-momentum arithmetic is carried by the plain value types in
//! [`utils::vectors`].
//!
//! ```no_run
//! use dimuon_skim::{load_events, EventReadOptions};
//!
//! fn main() -> dimuon_skim::SkimResult<()> {
//!     let options = EventReadOptions::new().max_events(100_000);
//!     let candidates = load_events("~/data/Run2012BC_DoubleMuParked.root", &options)?;
//!     let table = candidates.collect()?;
//!     println!("{table}");
//!     Ok(())
//! }
//! ```
#![warn(clippy::perf, clippy::style)]

use thiserror::Error;

/// Methods for loading event sources and selecting dimuon candidates.
pub mod data;
/// Utility functions, histogram helpers, and four-vector types.
pub mod utils;

pub use crate::data::{load_events, select_dimuons, DimuonTable, EventReadOptions};
pub use crate::utils::vectors::{Vec3, Vec4};

pub type SkimResult<T> = Result<T, SkimError>;

/// The error type used by all `dimuon-skim` methods
#[derive(Error, Debug)]
pub enum SkimError {
    /// An alias for [`std::io::Error`].
    #[error("IO Error: {0}")]
    IOError(#[from] std::io::Error),
    /// An alias for [`polars::error::PolarsError`].
    #[error("Polars Error: {0}")]
    PolarsError(#[from] polars::error::PolarsError),
    /// An alias for [`shellexpand::LookupError`].
    #[error("Failed to expand path: {0}")]
    LookupError(#[from] shellexpand::LookupError<std::env::VarError>),
    /// An error which occurs when a required column or branch is absent from an event source.
    #[error("Missing column \"{name}\" in event source")]
    MissingColumn {
        /// Name of the absent column.
        name: String,
    },
    /// An error which occurs when a required column exists but holds a type the readers do not
    /// support.
    #[error("Column \"{name}\" has unsupported type \"{datatype}\"")]
    InvalidColumnType {
        /// Name of the offending column.
        name: String,
        /// The type reported by the source.
        datatype: String,
    },
    /// A custom fallback error for errors too complex or too infrequent to warrant their own
    /// error category.
    #[error("{0}")]
    Custom(String),
}
