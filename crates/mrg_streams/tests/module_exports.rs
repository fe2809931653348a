//! Integration tests for module exports.
//!
//! Verify that the public modules and types are correctly exported and
//! accessible via absolute paths, including the crate-root re-exports.

/// Test that the engine surface is accessible via the crate root.
#[test]
fn test_engine_exports() {
    use mrg_streams::{MrgStreams, StreamVar, UniformSpec};

    let mut engine = MrgStreams::from_seed(12_345).unwrap();
    let var = engine.uniform(UniformSpec::default()).unwrap();
    let sample = engine.draw_uniform(&var, &[4]).unwrap();
    assert_eq!(sample.len(), 4);
    assert_eq!(var.distribution(), "uniform");
}

/// Test that the distribution specs and handles are exported.
#[test]
fn test_distribution_exports() {
    use mrg_streams::{
        BinomialSpec, ChoiceSpec, DType, MrgStreams, MultinomialSpec, NormalSpec,
    };

    let mut engine = MrgStreams::from_seed(7).unwrap();
    let binomial = engine.binomial(BinomialSpec::default()).unwrap();
    let normal = engine
        .normal(NormalSpec {
            dtype: DType::F32,
            ..NormalSpec::default()
        })
        .unwrap();
    let multinomial = engine
        .multinomial(MultinomialSpec {
            pvals: vec![vec![0.5, 0.5]],
            n: 4,
            replace: true,
            lanes: None,
        })
        .unwrap();
    let choice = engine
        .choice(ChoiceSpec {
            population: 3,
            size: 2,
            p: None,
            replace: false,
            lanes: None,
        })
        .unwrap();

    assert_eq!(engine.n_variables(), 4);
    assert_eq!(binomial.p(), 0.5);
    assert_eq!(normal.dtype(), DType::F32);
    assert_eq!(multinomial.n(), 4);
    assert_eq!(choice.population(), 3);
}

/// Test that configuration types are exported with their constants.
#[test]
fn test_config_exports() {
    use mrg_streams::{
        ConfigError, EngineConfig, DEFAULT_LANES, DEFAULT_PARALLEL_THRESHOLD, MAX_AUTO_LANES,
    };

    let config = EngineConfig::builder()
        .parallel_threshold(DEFAULT_PARALLEL_THRESHOLD)
        .max_auto_lanes(MAX_AUTO_LANES)
        .default_lanes(DEFAULT_LANES)
        .build()
        .unwrap();
    assert_eq!(config, EngineConfig::default());

    let err: ConfigError = EngineConfig::builder().max_auto_lanes(0).build().unwrap_err();
    assert!(err.to_string().contains("lane count"));
}

/// Test that the error surface is exported and composes.
#[test]
fn test_error_exports() {
    use mrg_streams::{validate_shape, EngineError, MrgStreams, ShapeError};

    let shape_err: ShapeError = validate_shape(&[0]).unwrap_err();
    let engine_err = EngineError::from(shape_err);
    assert!(engine_err.to_string().starts_with("invalid size"));

    let seed_err = MrgStreams::from_seed(0_u64).unwrap_err();
    assert!(matches!(seed_err, EngineError::InvalidSeed(_)));
}

/// Test that the sampler and table layers are reachable directly.
#[test]
fn test_sampler_and_table_exports() {
    use mrg_core::SeedSpec;
    use mrg_streams::{guess_lanes, plan_draw, EngineConfig, StateTable};

    let root = SeedSpec::Scalar(42).expand().unwrap();
    let table = StateTable::derive(root, 0, 3);
    assert_eq!(table.len(), 3);
    assert_eq!(table.lanes()[2].coordinate(), (0, 2));

    let config = EngineConfig::default();
    let plan = plan_draw(table.len(), 30, None, &config);
    assert_eq!(plan.lanes_used, guess_lanes(30, config.max_auto_lanes()).min(3));
}

/// Test that the arithmetic core is accessible through its own crate.
#[test]
fn test_core_exports() {
    use mrg_core::{dot_modulo, jump_matrices, StateVector, M1, M2, NORM};

    assert_eq!(M1, 2_147_483_647);
    assert_eq!(M2, 2_147_462_579);
    assert_eq!(NORM, 2.0_f64.powi(-31));

    let mut state = StateVector::new([9; 6]).unwrap();
    let z = state.advance();
    assert!(z >= 1 && z <= M1);

    let jumps = jump_matrices();
    let mixed = dot_modulo(
        &jumps.a1_p72,
        &[1, 2, 3],
        M1,
        &jumps.a2_p72,
        &[4, 5, 6],
        M2,
    );
    assert_eq!(mixed.len(), 6);
}
