use polars::prelude::*;

/// Four-vector value types with Lorentz-momentum semantics.
pub mod vectors;

/// Map a row-wise scalar kernel over `K` float columns, producing a new `Float64` column.
///
/// Inputs are materialized as `Float64` lanes and the kernel is applied per row (in parallel
/// when the `rayon` feature is enabled). Null entries are rejected with a compute error.
pub fn vectorize_scalar<F, const K: usize>(name: &str, inputs: [Expr; K], kernel: F) -> Expr
where
    F: Fn(&[f64; K]) -> f64 + Send + Sync + 'static,
{
    let label: PlSmallStr = name.into();
    let output_label = label.clone();
    map_multiple(
        move |columns: &mut [Column]| {
            let mut lanes: Vec<Vec<f64>> = Vec::with_capacity(K);
            for column in columns.iter() {
                let ca = column.as_materialized_series().f64()?;
                if ca.null_count() != 0 {
                    polars_bail!(ComputeError: "vectorize_scalar({}): nulls not supported", output_label);
                }
                lanes.push(ca.into_no_null_iter().collect());
            }
            let rows = lanes.first().map_or(0, Vec::len);
            #[cfg(feature = "rayon")]
            let values: Vec<f64> = {
                use rayon::prelude::*;
                (0..rows)
                    .into_par_iter()
                    .map(|row| kernel(&core::array::from_fn(|lane| lanes[lane][row])))
                    .collect()
            };
            #[cfg(not(feature = "rayon"))]
            let values: Vec<f64> = (0..rows)
                .map(|row| kernel(&core::array::from_fn(|lane| lanes[lane][row])))
                .collect();
            Ok(Some(
                Float64Chunked::from_vec(output_label.clone(), values)
                    .into_series()
                    .into_column(),
            ))
        },
        inputs,
        GetOutput::from_type(DataType::Float64),
    )
    .alias(label)
}

/// A helper method to get histogram edges from evenly-spaced `bins` over a given `range`
/// # See Also
/// [`histogram`]
pub fn get_bin_edges(bins: usize, range: (f64, f64)) -> Vec<f64> {
    let bin_width = (range.1 - range.0) / (bins as f64);
    (0..=bins)
        .map(|i| range.0 + (i as f64 * bin_width))
        .collect()
}

/// A simple struct which represents a binned spectrum
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// The number of entries in each bin
    pub counts: Vec<u64>,
    /// The edges of each bin (length is one greater than `counts`)
    pub bin_edges: Vec<f64>,
}

/// Bin `values` into evenly spaced `bins` over `range`.
///
/// Bins are half-open intervals `[lo, hi)`; entries outside the range are dropped.
pub fn histogram<T: AsRef<[f64]>>(values: T, bins: usize, range: (f64, f64)) -> Histogram {
    assert!(bins > 0, "Number of bins must be greater than zero!");
    assert!(
        range.1 > range.0,
        "The lower edge of the range must be smaller than the upper edge!"
    );
    let bin_width = (range.1 - range.0) / bins as f64;
    let mut counts = vec![0u64; bins];
    for &value in values.as_ref() {
        if value >= range.0 && value < range.1 {
            let bin_index = ((value - range.0) / bin_width).floor() as usize;
            counts[bin_index.min(bins - 1)] += 1;
        }
    }
    Histogram {
        counts,
        bin_edges: get_bin_edges(bins, range),
    }
}
