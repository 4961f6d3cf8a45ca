//! Event-source I/O: ROOT ingestion, Parquet scanning, and skim output.

use std::{
    fs::File,
    path::{Path, PathBuf},
};

use indexmap::IndexMap;
use oxyroot::{Branch, RootFile, Slice};
use polars::prelude::*;
use tracing::debug;

use super::{
    EventReadOptions, EVENTS_TREE, MET_PT, MUON_CHARGE, MUON_ETA, MUON_ID, MUON_MASS, MUON_PHI,
    MUON_PT, N_MUON, REQUIRED_BRANCHES,
};
use crate::{SkimError, SkimResult};

fn canonicalize_source_path(file_path: &str) -> SkimResult<PathBuf> {
    Ok(Path::new(&*shellexpand::full(file_path)?).canonicalize()?)
}

fn expand_output_path(file_path: &str) -> SkimResult<PathBuf> {
    Ok(PathBuf::from(&*shellexpand::full(file_path)?))
}

/// Open a Parquet event source as a lazy frame restricted to the required branches.
///
/// The schema is checked eagerly so that a missing column fails here rather than at
/// collection time. Identification flags are normalized to `List(Int32)` so the selection's
/// sentinel check stays an equality even for boolean-typed sources.
pub fn scan_parquet(file_path: &str, options: &EventReadOptions) -> SkimResult<LazyFrame> {
    let path = canonicalize_source_path(file_path)?;
    let mut events = LazyFrame::scan_parquet(&path, ScanArgsParquet::default())?;
    let schema = events.collect_schema()?;
    for name in REQUIRED_BRANCHES {
        if !schema.contains(name) {
            return Err(SkimError::MissingColumn {
                name: name.to_string(),
            });
        }
    }
    debug!(path = %path.display(), columns = REQUIRED_BRANCHES.len(), "scanning Parquet event source");
    let mut events = events.select(REQUIRED_BRANCHES.map(col));
    if let Some(limit) = options.max_events {
        events = events.limit(limit as IdxSize);
    }
    Ok(events.with_columns([col(MUON_ID).cast(DataType::List(Box::new(DataType::Int32)))]))
}

/// Load the required branches of a ROOT event source into an in-memory frame.
///
/// The tree named by the options ([`EVENTS_TREE`] when absent) is read through the oxyroot
/// backend; jagged muon branches become `List` columns while `nMuon` and `MET_pt` stay
/// scalar. Only entries `[0, max_events)` are decoded.
pub fn read_root(file_path: &str, options: &EventReadOptions) -> SkimResult<DataFrame> {
    let path = canonicalize_source_path(file_path)?;
    let mut file = RootFile::open(&path).map_err(|err| {
        SkimError::Custom(format!(
            "Failed to open ROOT file '{}': {err}",
            path.display()
        ))
    })?;
    let tree_name = options.tree.as_deref().unwrap_or(EVENTS_TREE);
    let tree = file
        .get_tree(tree_name)
        .map_err(|err| map_root_error(&format!("Failed to open ROOT tree '{tree_name}'"), err))?;
    let lookup: BranchLookup<'_> = tree.branches().map(|branch| (branch.name(), branch)).collect();
    let max = options.max_events.unwrap_or(usize::MAX);

    let n_muon = read_scalar_u32(&lookup, N_MUON, max)?;
    let pt = read_jagged_f64(&lookup, MUON_PT, max)?;
    let eta = read_jagged_f64(&lookup, MUON_ETA, max)?;
    let charge = read_jagged_i32(&lookup, MUON_CHARGE, max)?;
    let id = read_jagged_i32(&lookup, MUON_ID, max)?;
    let phi = read_jagged_f64(&lookup, MUON_PHI, max)?;
    let mass = read_jagged_f64(&lookup, MUON_MASS, max)?;
    let met = read_scalar_f64(&lookup, MET_PT, max)?;

    debug!(path = %path.display(), tree = tree_name, events = met.len(), "read ROOT event source");

    Ok(DataFrame::new(vec![
        Series::new(N_MUON.into(), n_muon).into_column(),
        jagged_f64_column(MUON_PT, &pt),
        jagged_f64_column(MUON_ETA, &eta),
        jagged_i32_column(MUON_CHARGE, &charge),
        jagged_i32_column(MUON_ID, &id),
        jagged_f64_column(MUON_PHI, &phi),
        jagged_f64_column(MUON_MASS, &mass),
        Series::new(MET_PT.into(), met).into_column(),
    ])?)
}

/// Persist a selected table to a Parquet file.
pub fn write_parquet(df: &mut DataFrame, file_path: &str) -> SkimResult<()> {
    let path = expand_output_path(file_path)?;
    let file = File::create(&path)?;
    ParquetWriter::new(file).finish(df)?;
    Ok(())
}

type BranchLookup<'a> = IndexMap<&'a str, &'a Branch>;

fn lookup_branch<'a>(lookup: &BranchLookup<'a>, name: &str) -> SkimResult<&'a Branch> {
    lookup
        .get(name)
        .copied()
        .ok_or_else(|| SkimError::MissingColumn {
            name: name.to_string(),
        })
}

fn map_root_error<E: std::fmt::Display>(context: &str, err: E) -> SkimError {
    SkimError::Custom(format!("{context}: {err}"))
}

fn branch_read_error<E: std::fmt::Display>(name: &str, err: E) -> SkimError {
    map_root_error(&format!("Failed to read branch '{name}'"), err)
}

fn invalid_branch_type(name: &str, type_name: &str) -> SkimError {
    SkimError::InvalidColumnType {
        name: name.to_string(),
        datatype: type_name.to_string(),
    }
}

fn read_scalar_f64(lookup: &BranchLookup<'_>, name: &str, max: usize) -> SkimResult<Vec<f64>> {
    let branch = lookup_branch(lookup, name)?;
    let type_name = branch.item_type_name();
    let values = match type_name.to_ascii_lowercase().as_str() {
        "float" | "float_t" => branch
            .as_iter::<f32>()
            .map_err(|err| branch_read_error(name, err))?
            .take(max)
            .map(f64::from)
            .collect(),
        "double" | "double_t" => branch
            .as_iter::<f64>()
            .map_err(|err| branch_read_error(name, err))?
            .take(max)
            .collect(),
        _ => return Err(invalid_branch_type(name, &type_name)),
    };
    Ok(values)
}

fn read_scalar_u32(lookup: &BranchLookup<'_>, name: &str, max: usize) -> SkimResult<Vec<u32>> {
    let branch = lookup_branch(lookup, name)?;
    let type_name = branch.item_type_name();
    let values = match type_name.to_ascii_lowercase().as_str() {
        "uint32_t" | "unsigned int" => branch
            .as_iter::<u32>()
            .map_err(|err| branch_read_error(name, err))?
            .take(max)
            .collect(),
        "int32_t" | "int" => branch
            .as_iter::<i32>()
            .map_err(|err| branch_read_error(name, err))?
            .take(max)
            .map(|value| value as u32)
            .collect(),
        _ => return Err(invalid_branch_type(name, &type_name)),
    };
    Ok(values)
}

fn read_jagged_f64(lookup: &BranchLookup<'_>, name: &str, max: usize) -> SkimResult<Vec<Vec<f64>>> {
    let branch = lookup_branch(lookup, name)?;
    let type_name = branch.item_type_name();
    let rows = match type_name.to_ascii_lowercase().as_str() {
        "float[]" => branch
            .as_iter::<Slice<f32>>()
            .map_err(|err| branch_read_error(name, err))?
            .take(max)
            .map(|row| row.into_vec().into_iter().map(f64::from).collect())
            .collect(),
        "vector<float>" => branch
            .as_iter::<Vec<f32>>()
            .map_err(|err| branch_read_error(name, err))?
            .take(max)
            .map(|row| row.into_iter().map(f64::from).collect())
            .collect(),
        "double[]" => branch
            .as_iter::<Slice<f64>>()
            .map_err(|err| branch_read_error(name, err))?
            .take(max)
            .map(Slice::into_vec)
            .collect(),
        "vector<double>" => branch
            .as_iter::<Vec<f64>>()
            .map_err(|err| branch_read_error(name, err))?
            .take(max)
            .collect(),
        _ => return Err(invalid_branch_type(name, &type_name)),
    };
    Ok(rows)
}

fn read_jagged_i32(lookup: &BranchLookup<'_>, name: &str, max: usize) -> SkimResult<Vec<Vec<i32>>> {
    let branch = lookup_branch(lookup, name)?;
    let type_name = branch.item_type_name();
    let rows = match type_name.to_ascii_lowercase().as_str() {
        "int32_t[]" | "int[]" => branch
            .as_iter::<Slice<i32>>()
            .map_err(|err| branch_read_error(name, err))?
            .take(max)
            .map(Slice::into_vec)
            .collect(),
        "vector<int32_t>" | "vector<int>" => branch
            .as_iter::<Vec<i32>>()
            .map_err(|err| branch_read_error(name, err))?
            .take(max)
            .collect(),
        "bool[]" => branch
            .as_iter::<Slice<bool>>()
            .map_err(|err| branch_read_error(name, err))?
            .take(max)
            .map(|row| row.into_vec().into_iter().map(i32::from).collect())
            .collect(),
        "vector<bool>" => branch
            .as_iter::<Vec<bool>>()
            .map_err(|err| branch_read_error(name, err))?
            .take(max)
            .map(|row| row.into_iter().map(i32::from).collect())
            .collect(),
        _ => return Err(invalid_branch_type(name, &type_name)),
    };
    Ok(rows)
}

pub(crate) fn jagged_f64_column(name: &str, rows: &[Vec<f64>]) -> Column {
    let mut builder = ListPrimitiveChunkedBuilder::<Float64Type>::new(
        name.into(),
        rows.len(),
        rows.len() * 4,
        DataType::Float64,
    );
    for row in rows {
        builder.append_slice(row);
    }
    builder.finish().into_series().into_column()
}

pub(crate) fn jagged_i32_column(name: &str, rows: &[Vec<i32>]) -> Column {
    let mut builder = ListPrimitiveChunkedBuilder::<Int32Type>::new(
        name.into(),
        rows.len(),
        rows.len() * 4,
        DataType::Int32,
    );
    for row in rows {
        builder.append_slice(row);
    }
    builder.finish().into_series().into_column()
}
