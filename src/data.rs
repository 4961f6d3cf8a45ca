//! Event loading and opposite-sign dimuon selection.
//!
//! The selection is expressed as a single lazy [`polars`] pipeline over jagged (`List`-typed)
//! muon columns: attach a row index, explode the muon lists, drop muons failing the
//! identification and acceptance cuts, regroup per event, keep events with exactly two
//! surviving muons of opposite charge, and flatten the pair into `mu1_*`/`mu2_*` column
//! groups with the invariant mass of the summed four-momenta.

use std::path::Path;

use polars::prelude::*;

use crate::{
    utils::{vectorize_scalar, vectors::Vec4},
    SkimError, SkimResult,
};

/// Event-source I/O implementations and shared ingestion helpers.
pub mod io;

pub use io::{read_root, scan_parquet, write_parquet};

/// Name of the event collection read from ROOT sources.
pub const EVENTS_TREE: &str = "Events";

/// Minimum transverse momentum for a muon to enter a candidate pair (GeV).
pub const MIN_MUON_PT: f64 = 20.0;
/// Pseudorapidity acceptance window for candidate muons.
pub const MAX_MUON_ABS_ETA: f64 = 2.4;
/// Sentinel value marking an identification-passing muon.
pub const GOOD_MUON_ID: i32 = 1;

pub(crate) const N_MUON: &str = "nMuon";
pub(crate) const MUON_PT: &str = "Muon_pt";
pub(crate) const MUON_ETA: &str = "Muon_eta";
pub(crate) const MUON_CHARGE: &str = "Muon_charge";
pub(crate) const MUON_ID: &str = "Muon_isGlobal";
pub(crate) const MUON_PHI: &str = "Muon_phi";
pub(crate) const MUON_MASS: &str = "Muon_mass";
pub(crate) const MET_PT: &str = "MET_pt";

/// Branches required from any event source, in read order.
pub const REQUIRED_BRANCHES: [&str; 8] = [
    N_MUON,
    MUON_PT,
    MUON_ETA,
    MUON_CHARGE,
    MUON_ID,
    MUON_PHI,
    MUON_MASS,
    MET_PT,
];

/// Columns of the selected table, in output order.
pub const OUTPUT_COLUMNS: [&str; 10] = [
    "mu1_pt",
    "mu1_eta",
    "mu1_phi",
    "mu1_mass",
    "mu2_pt",
    "mu2_eta",
    "mu2_phi",
    "mu2_mass",
    "dimuon_mass",
    "met",
];

const EVENT_INDEX: &str = "event";
const N_GOOD: &str = "n_good";

/// Options for reading an event source.
///
/// # See Also
/// [`load_events`], [`read_root`], [`scan_parquet`]
#[derive(Debug, Clone, Default)]
pub struct EventReadOptions {
    /// Name of the tree to read when loading ROOT files; [`EVENTS_TREE`] when absent.
    pub tree: Option<String>,
    /// Upper bound on the number of events read; `None` reads all entries.
    pub max_events: Option<usize>,
    /// Return the deferred [`LazyFrame`] wrapper instead of collecting in memory.
    pub lazy: bool,
}

impl EventReadOptions {
    /// Create a new [`Default`] set of [`EventReadOptions`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the tree to read when opening ROOT files (defaults to "Events").
    pub fn tree<S: AsRef<str>>(mut self, name: S) -> Self {
        self.tree = Some(name.as_ref().to_string());
        self
    }

    /// Read only the first `n` events of the source.
    pub fn max_events(mut self, n: usize) -> Self {
        self.max_events = Some(n);
        self
    }

    /// Defer collection; [`load_events`] will return [`DimuonTable::Lazy`].
    pub fn lazy(mut self) -> Self {
        self.lazy = true;
        self
    }
}

/// A table of selected dimuon candidates.
///
/// The `Lazy` variant is a deferred single-partition handle over the same rows; it does not
/// introduce any parallel execution.
pub enum DimuonTable {
    /// Materialized candidate table.
    Table(DataFrame),
    /// Deferred handle; call [`DimuonTable::collect`] to materialize.
    Lazy(LazyFrame),
}

impl DimuonTable {
    /// Materialize the candidate table.
    pub fn collect(self) -> SkimResult<DataFrame> {
        match self {
            DimuonTable::Table(df) => Ok(df),
            DimuonTable::Lazy(lf) => Ok(lf.collect()?),
        }
    }

    /// View the candidate table as a lazy computation.
    pub fn lazy(self) -> LazyFrame {
        match self {
            DimuonTable::Table(df) => df.lazy(),
            DimuonTable::Lazy(lf) => lf,
        }
    }
}

// Out-of-bounds slots yield null rather than raising; groups that short are
// dropped by the multiplicity filter.
fn muon_slot(name: &str, slot: i64) -> Expr {
    col(name).list().get(lit(slot), true)
}

/// Reduce a frame of raw `Events` rows to the flat table of opposite-sign dimuon candidates.
///
/// The input must carry the [`REQUIRED_BRANCHES`] schema: jagged muon attributes as `List`
/// columns and `MET_pt` as a per-event scalar. One output row is produced per event with
/// exactly two identification-passing muons inside the kinematic acceptance and with opposite
/// charge; every output column is cast to `Float64`.
pub fn select_dimuons(events: LazyFrame) -> LazyFrame {
    let muon_lists = [MUON_PT, MUON_ETA, MUON_PHI, MUON_MASS, MUON_CHARGE, MUON_ID].map(col);
    let accepted = col(MUON_ID)
        .eq(lit(GOOD_MUON_ID))
        .and(col(MUON_PT).gt(lit(MIN_MUON_PT)))
        .and(col(MUON_ETA).abs().lt(lit(MAX_MUON_ABS_ETA)));
    let opposite_sign = muon_slot(MUON_CHARGE, 0).neq(muon_slot(MUON_CHARGE, 1));
    let pairs = events
        .with_row_index(EVENT_INDEX, None)
        .explode(muon_lists)
        .filter(accepted)
        .group_by_stable([col(EVENT_INDEX)])
        .agg([
            col(MUON_PT),
            col(MUON_ETA),
            col(MUON_PHI),
            col(MUON_MASS),
            col(MUON_CHARGE),
            // MET rides with the leading surviving muon's slot.
            col(MET_PT).first(),
            len().alias(N_GOOD),
        ])
        .filter(col(N_GOOD).eq(lit(2)))
        .filter(opposite_sign);
    let flattened = pairs.with_columns([
        muon_slot(MUON_PT, 0).alias("mu1_pt"),
        muon_slot(MUON_ETA, 0).alias("mu1_eta"),
        muon_slot(MUON_PHI, 0).alias("mu1_phi"),
        muon_slot(MUON_MASS, 0).alias("mu1_mass"),
        muon_slot(MUON_PT, 1).alias("mu2_pt"),
        muon_slot(MUON_ETA, 1).alias("mu2_eta"),
        muon_slot(MUON_PHI, 1).alias("mu2_phi"),
        muon_slot(MUON_MASS, 1).alias("mu2_mass"),
        col(MET_PT).alias("met"),
    ]);
    let with_mass = flattened.with_columns([vectorize_scalar(
        "dimuon_mass",
        [
            "mu1_pt", "mu1_eta", "mu1_phi", "mu1_mass", "mu2_pt", "mu2_eta", "mu2_phi",
            "mu2_mass",
        ]
        .map(|name| col(name).cast(DataType::Float64)),
        |&[pt1, eta1, phi1, m1, pt2, eta2, phi2, m2]| {
            let mu1 = Vec4::from_ptetaphim(pt1, eta1, phi1, m1);
            let mu2 = Vec4::from_ptetaphim(pt2, eta2, phi2, m2);
            (mu1 + mu2).mag()
        },
    )]);
    with_mass.select(OUTPUT_COLUMNS.map(|name| col(name).cast(DataType::Float64)))
}

/// Load an event source and select opposite-sign dimuon candidates.
///
/// Dispatches on the file extension: `.root` sources are read through the oxyroot backend,
/// `.parquet` sources through a native lazy scan. Missing branches, malformed files, and
/// unsupported extensions are errors; nothing is recovered silently.
pub fn load_events(file_path: &str, options: &EventReadOptions) -> SkimResult<DimuonTable> {
    let extension = Path::new(file_path)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let events = match extension.as_str() {
        "root" => read_root(file_path, options)?.lazy(),
        "parquet" => scan_parquet(file_path, options)?,
        other => {
            return Err(SkimError::Custom(format!(
                "Unsupported event source extension '{other}' for '{file_path}'"
            )))
        }
    };
    let selected = select_dimuons(events);
    if options.lazy {
        Ok(DimuonTable::Lazy(selected))
    } else {
        Ok(DimuonTable::Table(selected.collect()?))
    }
}
