use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dimuon_skim::select_dimuons;
use polars::prelude::*;

fn synthetic_events(n_events: usize) -> DataFrame {
    let mut rng = fastrand::Rng::with_seed(0);
    let mut pt = ListPrimitiveChunkedBuilder::<Float64Type>::new(
        "Muon_pt".into(),
        n_events,
        n_events * 3,
        DataType::Float64,
    );
    let mut eta = ListPrimitiveChunkedBuilder::<Float64Type>::new(
        "Muon_eta".into(),
        n_events,
        n_events * 3,
        DataType::Float64,
    );
    let mut phi = ListPrimitiveChunkedBuilder::<Float64Type>::new(
        "Muon_phi".into(),
        n_events,
        n_events * 3,
        DataType::Float64,
    );
    let mut mass = ListPrimitiveChunkedBuilder::<Float64Type>::new(
        "Muon_mass".into(),
        n_events,
        n_events * 3,
        DataType::Float64,
    );
    let mut charge = ListPrimitiveChunkedBuilder::<Int32Type>::new(
        "Muon_charge".into(),
        n_events,
        n_events * 3,
        DataType::Int32,
    );
    let mut id = ListPrimitiveChunkedBuilder::<Int32Type>::new(
        "Muon_isGlobal".into(),
        n_events,
        n_events * 3,
        DataType::Int32,
    );
    let mut n_muon = Vec::with_capacity(n_events);
    let mut met = Vec::with_capacity(n_events);
    for _ in 0..n_events {
        let n = rng.usize(0..4);
        n_muon.push(n as u32);
        met.push(rng.f64() * 80.0);
        let mut row_pt = Vec::with_capacity(n);
        let mut row_eta = Vec::with_capacity(n);
        let mut row_phi = Vec::with_capacity(n);
        let mut row_mass = Vec::with_capacity(n);
        let mut row_charge = Vec::with_capacity(n);
        let mut row_id = Vec::with_capacity(n);
        for _ in 0..n {
            row_pt.push(5.0 + rng.f64() * 60.0);
            row_eta.push(rng.f64() * 5.0 - 2.5);
            row_phi.push(rng.f64() * std::f64::consts::TAU - std::f64::consts::PI);
            row_mass.push(0.1056583745);
            row_charge.push(if rng.bool() { 1 } else { -1 });
            row_id.push(i32::from(rng.u8(0..10) > 1));
        }
        pt.append_slice(&row_pt);
        eta.append_slice(&row_eta);
        phi.append_slice(&row_phi);
        mass.append_slice(&row_mass);
        charge.append_slice(&row_charge);
        id.append_slice(&row_id);
    }
    DataFrame::new(vec![
        Series::new("nMuon".into(), n_muon).into_column(),
        pt.finish().into_series().into_column(),
        eta.finish().into_series().into_column(),
        charge.finish().into_series().into_column(),
        id.finish().into_series().into_column(),
        phi.finish().into_series().into_column(),
        mass.finish().into_series().into_column(),
        Series::new("MET_pt".into(), met).into_column(),
    ])
    .unwrap()
}

fn selection_benchmark(c: &mut Criterion) {
    let events = synthetic_events(100_000);
    c.bench_function("select dimuons 100k", |b| {
        b.iter(|| {
            black_box(
                select_dimuons(events.clone().lazy())
                    .collect()
                    .unwrap(),
            );
        });
    });
}

criterion_group!(benches, selection_benchmark);
criterion_main!(benches);
