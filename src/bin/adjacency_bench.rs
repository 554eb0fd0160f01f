#[cfg(feature = "bench_adjacency")]
use ecotopo::algorithms::adjacency::{build_neighbors, AdjacencyOptions, CandidateStrategy};
#[cfg(feature = "bench_adjacency")]
use ecotopo::model::RawFeature;
#[cfg(feature = "bench_adjacency")]
use ecotopo::Engine;
#[cfg(feature = "bench_adjacency")]
use geo::{polygon, MultiPolygon};
#[cfg(feature = "bench_adjacency")]
use std::time::Instant;
#[cfg(feature = "bench_adjacency")]
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[cfg(not(feature = "bench_adjacency"))]
fn main() {
    panic!("adjacency_bench requires --features bench_adjacency");
}

// Leading digit escaped the way map exporters write it.
#[cfg(feature = "bench_adjacency")]
fn escaped_id(code: usize) -> String {
    let digits = code.to_string();
    let (head, tail) = digits.split_at(1);
    format!("_x3{head}_{tail}")
}

// Grid of unit cells with escaped ids, every 7th cell slightly self-crossing.
#[cfg(feature = "bench_adjacency")]
fn build_grid_layer(w: usize, h: usize) -> Vec<RawFeature> {
    let mut out = Vec::with_capacity(w * h);
    for j in 0..h {
        for i in 0..w {
            let (x, y) = (i as f64, j as f64);
            let code = j * w + i + 1;
            let poly = if code % 7 == 0 {
                polygon![(x: x, y: y), (x: x + 1.0, y: y + 1.0), (x: x + 1.0, y: y), (x: x, y: y + 1.0), (x: x, y: y)]
            } else {
                polygon![(x: x, y: y), (x: x + 1.0, y: y), (x: x + 1.0, y: y + 1.0), (x: x, y: y + 1.0), (x: x, y: y)]
            };
            out.push(RawFeature::new(escaped_id(code), MultiPolygon::new(vec![poly])));
        }
    }
    out
}

#[cfg(feature = "bench_adjacency")]
fn main() {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().collect();
    let mut w = 20usize;
    let mut h = 20usize;
    for a in &args[1..] {
        if let Some(val) = a.strip_prefix("--w=") {
            if let Ok(v) = val.parse() {
                w = v;
            }
        } else if let Some(val) = a.strip_prefix("--h=") {
            if let Ok(v) = val.parse() {
                h = v;
            }
        }
    }

    let layer = build_grid_layer(w, h);
    let engine = Engine::default();
    let t0 = Instant::now();
    let prepared = engine.prepare(&layer);
    let prepare_ms = t0.elapsed().as_secs_f64() * 1000.0;

    let mut timings = Vec::new();
    let mut results = Vec::new();
    for strategy in [CandidateStrategy::Exhaustive, CandidateStrategy::Indexed] {
        let opts = AdjacencyOptions { strategy, ..Default::default() };
        let t = Instant::now();
        results.push(build_neighbors(&prepared.features, &opts));
        timings.push(t.elapsed().as_secs_f64() * 1000.0);
    }
    assert_eq!(results[0], results[1], "strategies disagree");

    println!(
        "grid={}x{} features={} repaired={} prepare_ms={:.3} exhaustive_ms={:.3} indexed_ms={:.3}",
        w,
        h,
        prepared.features.len(),
        prepared.repaired,
        prepare_ms,
        timings[0],
        timings[1]
    );
}
