//! Iai-callgrind benchmarks for the stream engine.
//!
//! These benchmarks measure instruction counts for deterministic CI
//! regression detection. Unlike Criterion (wall-clock time), iai-callgrind
//! provides reproducible metrics independent of system load. Draws run with
//! the serial strategy so the counts stay thread-independent.
//!
//! # Requirements
//!
//! - Linux with Valgrind installed (`apt install valgrind`)
//! - iai-callgrind-runner (`cargo install iai-callgrind-runner`)
//!
//! # Usage
//!
//! ```bash
//! # Run benchmarks (Linux only)
//! cargo bench --bench sampler_iai
//!
//! # Compare with baseline
//! cargo bench --bench sampler_iai -- --save-baseline=main
//! cargo bench --bench sampler_iai -- --baseline=main
//! ```
//!
//! # Benchmark Coverage
//!
//! - Raw recurrence advancement
//! - Lane-table derivation (substream jumps)
//! - Uniform and normal draws through the engine
//! - Reseeding with allocated tables

use iai_callgrind::{library_benchmark, library_benchmark_group, main};
use mrg_core::SeedSpec;
use mrg_streams::{EngineConfig, MrgStreams, NormalSpec, Sample, StateTable, UniformSpec};
use std::hint::black_box;

fn serial_engine() -> MrgStreams {
    let config = EngineConfig::builder()
        .parallel_threshold(usize::MAX)
        .build()
        .unwrap();
    MrgStreams::with_config(42_u64, config).unwrap()
}

// =============================================================================
// Raw Generator Benchmarks
// =============================================================================

#[library_benchmark]
fn raw_single_step() -> f64 {
    let mut state = SeedSpec::Scalar(42).expand().unwrap();
    black_box(state.next_f64())
}

#[library_benchmark]
fn raw_batch_1k() -> f64 {
    let mut state = SeedSpec::Scalar(42).expand().unwrap();
    let mut sum = 0.0;
    for _ in 0..1_000 {
        sum += state.next_f64();
    }
    black_box(sum)
}

// =============================================================================
// Table Derivation Benchmarks
// =============================================================================

#[library_benchmark]
fn table_derive_60() -> StateTable {
    let root = SeedSpec::Scalar(42).expand().unwrap();
    black_box(StateTable::derive(root, 0, 60))
}

#[library_benchmark]
fn table_derive_1024() -> StateTable {
    let root = SeedSpec::Scalar(42).expand().unwrap();
    black_box(StateTable::derive(root, 0, 1_024))
}

// =============================================================================
// Engine Draw Benchmarks
// =============================================================================

#[library_benchmark]
fn engine_scalar_uniform() -> Sample {
    let mut engine = serial_engine();
    let var = engine.uniform(UniformSpec::default()).unwrap();
    black_box(engine.draw_uniform(&var, &[]).unwrap())
}

#[library_benchmark]
fn engine_uniform_10k() -> Sample {
    let mut engine = serial_engine();
    let var = engine
        .uniform(UniformSpec {
            size_hint: Some(10_000),
            ..UniformSpec::default()
        })
        .unwrap();
    black_box(engine.draw_uniform(&var, &[10_000]).unwrap())
}

#[library_benchmark]
fn engine_normal_10k() -> Sample {
    let mut engine = serial_engine();
    let var = engine
        .normal(NormalSpec {
            size_hint: Some(10_000),
            ..NormalSpec::default()
        })
        .unwrap();
    black_box(engine.draw_normal(&var, &[10_000]).unwrap())
}

// =============================================================================
// Reseed Benchmarks
// =============================================================================

#[library_benchmark]
fn engine_reseed_8_vars() -> MrgStreams {
    let mut engine = serial_engine();
    for _ in 0..8 {
        engine
            .uniform(UniformSpec {
                lanes: Some(60),
                ..UniformSpec::default()
            })
            .unwrap();
    }
    engine.reseed(Some(SeedSpec::Scalar(43))).unwrap();
    black_box(engine)
}

// =============================================================================
// Benchmark Groups
// =============================================================================

library_benchmark_group!(
    name = raw_benchmarks;
    benchmarks = raw_single_step, raw_batch_1k
);

library_benchmark_group!(
    name = table_benchmarks;
    benchmarks = table_derive_60, table_derive_1024
);

library_benchmark_group!(
    name = draw_benchmarks;
    benchmarks = engine_scalar_uniform, engine_uniform_10k, engine_normal_10k
);

library_benchmark_group!(
    name = reseed_benchmarks;
    benchmarks = engine_reseed_8_vars
);

main!(
    library_benchmark_groups = raw_benchmarks,
    table_benchmarks,
    draw_benchmarks,
    reseed_benchmarks
);
