//! # mrg_streams: Parallel Stream Engine and Distribution Samplers
//!
//! ## Engine Role
//!
//! mrg_streams layers the stateful sampling engine over the exact
//! arithmetic of [`mrg_core`]:
//! - [`engine`]: [`MrgStreams`], covering stream-variable allocation,
//!   draws, reseeding and lane-table growth
//! - [`table`]: per-variable lane tables over the stream/substream
//!   hierarchy
//! - [`sampler`]: batched lane-major uniform drawing, serial or rayon
//! - [`dist`]: transformers from unit draws to uniform, Bernoulli,
//!   normal, multinomial and choice outputs
//! - [`shape`], [`dtype`], [`config`], [`error`]: request validation,
//!   output precisions, tuning knobs, error surface
//!
//! ## Reproducibility Contract
//!
//! Every sequence the engine produces is a pure function of the seed,
//! the allocation order, each variable's lane count and the draw
//! sequence. Thread scheduling never participates: parallel and serial
//! draws advance identical lane states and interleave identically.
//!
//! ## Usage Examples
//!
//! ```rust
//! use mrg_streams::{DType, MrgStreams, NormalSpec, UniformSpec};
//!
//! let mut engine = MrgStreams::from_seed(12_345_u64).expect("valid seed");
//!
//! let uniform = engine
//!     .uniform(UniformSpec {
//!         low: -1.0,
//!         high: 1.0,
//!         dtype: DType::F32,
//!         ..UniformSpec::default()
//!     })
//!     .expect("valid parameters");
//! let sample = engine.draw_uniform(&uniform, &[3, 4]).expect("valid shape");
//! assert_eq!(sample.shape(), &[3, 4]);
//! assert!(sample.as_f64().iter().all(|&v| v > -1.0 && v < 1.0));
//!
//! let normal = engine
//!     .normal(NormalSpec {
//!         avg: 100.0,
//!         std: 15.0,
//!         ..NormalSpec::default()
//!     })
//!     .expect("valid parameters");
//! let scores = engine.draw_normal(&normal, &[1_000]).expect("valid shape");
//! assert_eq!(scores.len(), 1_000);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Serialize/Deserialize for seeds, states, lane tables,
//!   dtypes and configs, the state-persistence half of an external
//!   executor contract

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod config;
pub mod dist;
pub mod dtype;
pub mod engine;
pub mod error;
pub mod sampler;
pub mod shape;
pub mod table;

pub use mrg_core::{SeedError, SeedSpec, StateVector};

pub use config::{
    ConfigError, EngineConfig, EngineConfigBuilder, DEFAULT_LANES, DEFAULT_PARALLEL_THRESHOLD,
    MAX_AUTO_LANES,
};
pub use dist::{DistParam, SamplingError, PVALS_TOLERANCE};
pub use dtype::{DType, Sample, SampleData, SampleFloat};
pub use engine::{
    BinomialSpec, BinomialVar, ChoiceSpec, ChoiceVar, MrgStreams, MultinomialSpec, MultinomialVar,
    NormalSpec, NormalVar, StreamVar, UniformSpec, UniformVar, VarId,
};
pub use error::EngineError;
pub use sampler::{guess_lanes, plan_draw, DrawPlan};
pub use shape::{validate_shape, ShapeError, MAX_ELEMENTS};
pub use table::{Lane, StateTable};
