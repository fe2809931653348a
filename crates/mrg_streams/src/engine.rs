//! The stream engine: variable allocation, draws, reseeding.
//!
//! `MrgStreams` is the stateful adapter over the pure layers below it.
//! It owns the root state, hands each allocated variable its own stream
//! (a lane table of consecutive substreams), and routes every draw
//! through the batched sampler and the matching distribution
//! transformer. All validation happens here, at the edge; the layers
//! below assume validated input.

use std::sync::atomic::{AtomicU64, Ordering};

use rand::rngs::OsRng;
use rand::Rng;
use tracing::{debug, trace};

use mrg_core::{advance_stream, SeedSpec, StateVector, M2};

use crate::config::{ConfigError, EngineConfig};
use crate::dist::{
    self, selectable_categories, validate_pvals, DistParam, SamplingError,
};
use crate::dtype::{DType, Sample, SampleData};
use crate::error::EngineError;
use crate::sampler::{self, guess_lanes, plan_draw};
use crate::shape::validate_shape;
use crate::table::StateTable;

static NEXT_ENGINE_ID: AtomicU64 = AtomicU64::new(0);

fn invalid_param(name: &'static str, value: impl Into<String>) -> EngineError {
    EngineError::Config(ConfigError::InvalidParameter {
        name,
        value: value.into(),
    })
}

fn entropy_scalar() -> u64 {
    // scalar seeds must be nonzero residues under both moduli
    OsRng.gen_range(1..M2 as u64)
}

/// Identity of one allocated stream variable within one engine.
///
/// Handles are only valid against the engine (or a clone of the engine)
/// that allocated them; using one elsewhere is a programming error and
/// panics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VarId {
    engine: u64,
    index: usize,
}

/// Common surface of allocated stream-variable handles.
pub trait StreamVar {
    /// The variable's identity within its engine.
    fn id(&self) -> VarId;

    /// Name of the variable's distribution, as used in error messages.
    fn distribution(&self) -> &'static str;

    /// Gradient of the draw with respect to `parameter`.
    ///
    /// Draws are step functions of their parameters almost everywhere,
    /// so no useful gradient exists; a silent zero would corrupt any
    /// optimisation consuming it. This always refuses.
    ///
    /// # Errors
    ///
    /// Always returns [`EngineError::NonDifferentiable`] naming the
    /// distribution and the parameter.
    fn gradient(&self, parameter: DistParam) -> Result<Sample, EngineError> {
        Err(EngineError::NonDifferentiable {
            distribution: self.distribution(),
            parameter,
        })
    }
}

/// Parameters for allocating a uniform stream variable.
#[derive(Clone, Debug)]
pub struct UniformSpec {
    /// Lower bound of the draw interval.
    pub low: f64,
    /// Upper bound of the draw interval.
    pub high: f64,
    /// Output precision.
    pub dtype: DType,
    /// Explicit lane count; `None` lets the engine choose.
    pub lanes: Option<usize>,
    /// Expected per-draw element count, used to size the lane table
    /// when `lanes` is `None`.
    pub size_hint: Option<usize>,
}

impl Default for UniformSpec {
    fn default() -> Self {
        Self {
            low: 0.0,
            high: 1.0,
            dtype: DType::default(),
            lanes: None,
            size_hint: None,
        }
    }
}

/// Parameters for allocating a Bernoulli stream variable.
#[derive(Clone, Debug)]
pub struct BinomialSpec {
    /// Success probability in `[0, 1]`.
    pub p: f64,
    /// Output precision.
    pub dtype: DType,
    /// Explicit lane count; `None` lets the engine choose.
    pub lanes: Option<usize>,
    /// Expected per-draw element count, used to size the lane table
    /// when `lanes` is `None`.
    pub size_hint: Option<usize>,
}

impl Default for BinomialSpec {
    fn default() -> Self {
        Self {
            p: 0.5,
            dtype: DType::default(),
            lanes: None,
            size_hint: None,
        }
    }
}

/// Parameters for allocating a normal stream variable.
#[derive(Clone, Debug)]
pub struct NormalSpec {
    /// Mean of the distribution.
    pub avg: f64,
    /// Standard deviation, nonnegative.
    pub std: f64,
    /// Output precision.
    pub dtype: DType,
    /// Explicit lane count; `None` lets the engine choose.
    pub lanes: Option<usize>,
    /// Expected per-draw element count, used to size the lane table
    /// when `lanes` is `None`.
    pub size_hint: Option<usize>,
}

impl Default for NormalSpec {
    fn default() -> Self {
        Self {
            avg: 0.0,
            std: 1.0,
            dtype: DType::default(),
            lanes: None,
            size_hint: None,
        }
    }
}

/// Parameters for allocating a multinomial stream variable.
///
/// Each draw performs `n` categorical experiments per probability row.
/// With replacement the output is per-row category counts; without, the
/// `n` distinct chosen category indices per row.
#[derive(Clone, Debug)]
pub struct MultinomialSpec {
    /// Probability rows; rectangular, each summing to one within
    /// [`PVALS_TOLERANCE`](crate::dist::PVALS_TOLERANCE).
    pub pvals: Vec<Vec<f64>>,
    /// Experiments per row.
    pub n: usize,
    /// Whether a category can be drawn more than once per row.
    pub replace: bool,
    /// Explicit lane count; `None` lets the engine choose from the
    /// fixed draw size.
    pub lanes: Option<usize>,
}

/// Parameters for allocating a choice stream variable.
///
/// Each draw selects `size` indices from the population `0..population`,
/// uniformly or weighted by `p`.
#[derive(Clone, Debug)]
pub struct ChoiceSpec {
    /// Number of selectable indices.
    pub population: usize,
    /// Indices selected per draw.
    pub size: usize,
    /// Selection weights, one per population index; `None` selects
    /// uniformly. Validated as a single pvals row.
    pub p: Option<Vec<f64>>,
    /// Whether an index can be selected more than once per draw.
    pub replace: bool,
    /// Explicit lane count; `None` lets the engine choose from the
    /// fixed draw size.
    pub lanes: Option<usize>,
}

/// Handle to an allocated uniform stream variable.
#[derive(Clone, Debug)]
pub struct UniformVar {
    id: VarId,
    low: f64,
    high: f64,
    dtype: DType,
}

impl UniformVar {
    /// Lower bound of the draw interval.
    #[inline]
    pub fn low(&self) -> f64 {
        self.low
    }

    /// Upper bound of the draw interval.
    #[inline]
    pub fn high(&self) -> f64 {
        self.high
    }

    /// Output precision.
    #[inline]
    pub fn dtype(&self) -> DType {
        self.dtype
    }
}

impl StreamVar for UniformVar {
    fn id(&self) -> VarId {
        self.id
    }

    fn distribution(&self) -> &'static str {
        "uniform"
    }
}

/// Handle to an allocated Bernoulli stream variable.
#[derive(Clone, Debug)]
pub struct BinomialVar {
    id: VarId,
    p: f64,
    dtype: DType,
}

impl BinomialVar {
    /// Success probability.
    #[inline]
    pub fn p(&self) -> f64 {
        self.p
    }

    /// Output precision.
    #[inline]
    pub fn dtype(&self) -> DType {
        self.dtype
    }
}

impl StreamVar for BinomialVar {
    fn id(&self) -> VarId {
        self.id
    }

    fn distribution(&self) -> &'static str {
        "binomial"
    }
}

/// Handle to an allocated normal stream variable.
#[derive(Clone, Debug)]
pub struct NormalVar {
    id: VarId,
    avg: f64,
    std: f64,
    dtype: DType,
}

impl NormalVar {
    /// Mean of the distribution.
    #[inline]
    pub fn avg(&self) -> f64 {
        self.avg
    }

    /// Standard deviation.
    #[inline]
    pub fn std(&self) -> f64 {
        self.std
    }

    /// Output precision.
    #[inline]
    pub fn dtype(&self) -> DType {
        self.dtype
    }
}

impl StreamVar for NormalVar {
    fn id(&self) -> VarId {
        self.id
    }

    fn distribution(&self) -> &'static str {
        "normal"
    }
}

/// Handle to an allocated multinomial stream variable.
#[derive(Clone, Debug)]
pub struct MultinomialVar {
    id: VarId,
    pvals: Vec<Vec<f64>>,
    n: usize,
    replace: bool,
}

impl MultinomialVar {
    /// Probability rows.
    #[inline]
    pub fn pvals(&self) -> &[Vec<f64>] {
        &self.pvals
    }

    /// Experiments per row.
    #[inline]
    pub fn n(&self) -> usize {
        self.n
    }

    /// Whether categories repeat within a row.
    #[inline]
    pub fn replace(&self) -> bool {
        self.replace
    }
}

impl StreamVar for MultinomialVar {
    fn id(&self) -> VarId {
        self.id
    }

    fn distribution(&self) -> &'static str {
        "multinomial"
    }
}

/// Handle to an allocated choice stream variable.
#[derive(Clone, Debug)]
pub struct ChoiceVar {
    id: VarId,
    population: usize,
    size: usize,
    weights: Option<Vec<f64>>,
    replace: bool,
}

impl ChoiceVar {
    /// Number of selectable indices.
    #[inline]
    pub fn population(&self) -> usize {
        self.population
    }

    /// Indices selected per draw.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Selection weights, if any.
    #[inline]
    pub fn weights(&self) -> Option<&[f64]> {
        self.weights.as_deref()
    }

    /// Whether indices repeat within a draw.
    #[inline]
    pub fn replace(&self) -> bool {
        self.replace
    }
}

impl StreamVar for ChoiceVar {
    fn id(&self) -> VarId {
        self.id
    }

    fn distribution(&self) -> &'static str {
        "choice"
    }
}

#[derive(Clone, Debug)]
struct VarTable {
    table: StateTable,
    /// Explicit per-draw lane count, `None` for the per-call heuristic.
    parallelism: Option<usize>,
}

/// Parallel stream engine over the combined recursive generator.
///
/// The engine owns a root state derived from its seed. Allocating a
/// variable carves out the next stream (2^134 steps wide) and subdivides
/// it into lanes (substreams, 2^72 steps apart); the root then moves to
/// the following stream, so variables never overlap no matter how many
/// draws each performs. Draws advance a prefix of the variable's lanes
/// in lock-step and interleave their outputs lane-major, which makes
/// every sequence reproducible from `(seed, allocation order, lane
/// count, draw sequence)` alone; thread scheduling cannot touch it.
///
/// # Examples
///
/// ```rust
/// use mrg_streams::{MrgStreams, UniformSpec};
///
/// let mut engine = MrgStreams::from_seed(12_345_u64).expect("valid seed");
/// let var = engine
///     .uniform(UniformSpec::default())
///     .expect("valid parameters");
/// let sample = engine.draw_uniform(&var, &[2, 3]).expect("valid shape");
///
/// assert_eq!(sample.shape(), &[2, 3]);
/// assert!(sample.as_f64().iter().all(|&u| u > 0.0 && u < 1.0));
/// ```
#[derive(Clone, Debug)]
pub struct MrgStreams {
    id: u64,
    seed: SeedSpec,
    root: StateVector,
    vars: Vec<VarTable>,
    config: EngineConfig,
}

impl MrgStreams {
    /// Creates an engine from a seed with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidSeed`] when the seed violates the
    /// residue rules.
    pub fn from_seed(seed: impl Into<SeedSpec>) -> Result<Self, EngineError> {
        Self::with_config(seed, EngineConfig::default())
    }

    /// Creates an engine from a seed and an explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidSeed`] when the seed violates the
    /// residue rules.
    pub fn with_config(
        seed: impl Into<SeedSpec>,
        config: EngineConfig,
    ) -> Result<Self, EngineError> {
        let seed = seed.into();
        let root = seed.expand()?;
        let id = NEXT_ENGINE_ID.fetch_add(1, Ordering::Relaxed);
        debug!(engine = id, seed = ?seed, "engine constructed");
        Ok(Self {
            id,
            seed,
            root,
            vars: Vec::new(),
            config,
        })
    }

    /// Creates an engine seeded from the operating system's entropy
    /// source.
    ///
    /// # Errors
    ///
    /// Propagates construction failures; the drawn scalar itself is
    /// always in range.
    pub fn from_entropy() -> Result<Self, EngineError> {
        Self::from_seed(entropy_scalar())
    }

    /// The seed the engine currently derives from.
    #[inline]
    pub fn seed(&self) -> SeedSpec {
        self.seed
    }

    /// The engine's tuning configuration.
    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Number of allocated stream variables.
    #[inline]
    pub fn n_variables(&self) -> usize {
        self.vars.len()
    }

    /// Current lane count of a variable's table.
    pub fn lanes(&self, var: &impl StreamVar) -> usize {
        self.var_table(var.id()).table.len()
    }

    /// Allocates a uniform stream variable.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Config`] for non-finite bounds or a zero
    /// lane count.
    pub fn uniform(&mut self, spec: UniformSpec) -> Result<UniformVar, EngineError> {
        if !spec.low.is_finite() {
            return Err(invalid_param("low", "must be finite"));
        }
        if !spec.high.is_finite() {
            return Err(invalid_param("high", "must be finite"));
        }
        let id = self.allocate(spec.lanes, spec.size_hint)?;
        Ok(UniformVar {
            id,
            low: spec.low,
            high: spec.high,
            dtype: spec.dtype,
        })
    }

    /// Allocates a Bernoulli stream variable.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Config`] when `p` is outside `[0, 1]` or
    /// the lane count is zero.
    pub fn binomial(&mut self, spec: BinomialSpec) -> Result<BinomialVar, EngineError> {
        if !spec.p.is_finite() || !(0.0..=1.0).contains(&spec.p) {
            return Err(invalid_param("p", "must lie in [0, 1]"));
        }
        let id = self.allocate(spec.lanes, spec.size_hint)?;
        Ok(BinomialVar {
            id,
            p: spec.p,
            dtype: spec.dtype,
        })
    }

    /// Allocates a normal stream variable.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Config`] for a non-finite mean, a negative
    /// or non-finite standard deviation, or a zero lane count.
    pub fn normal(&mut self, spec: NormalSpec) -> Result<NormalVar, EngineError> {
        if !spec.avg.is_finite() {
            return Err(invalid_param("avg", "must be finite"));
        }
        if !spec.std.is_finite() || spec.std < 0.0 {
            return Err(invalid_param("std", "must be finite and nonnegative"));
        }
        let id = self.allocate(spec.lanes, spec.size_hint)?;
        Ok(NormalVar {
            id,
            avg: spec.avg,
            std: spec.std,
            dtype: spec.dtype,
        })
    }

    /// Allocates a multinomial stream variable.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::SamplingRange`] for an invalid pvals
    /// matrix, or when a without-replacement `n` exceeds a row's nonzero
    /// categories; [`EngineError::Config`] for an empty matrix, `n` of
    /// zero, or a zero lane count.
    pub fn multinomial(&mut self, spec: MultinomialSpec) -> Result<MultinomialVar, EngineError> {
        if spec.pvals.is_empty() {
            return Err(invalid_param("pvals", "at least one probability row is required"));
        }
        if spec.n == 0 {
            return Err(invalid_param("n", "must be at least 1"));
        }
        validate_pvals(&spec.pvals)?;
        if !spec.replace {
            for row in &spec.pvals {
                let population = selectable_categories(row);
                if spec.n > population {
                    return Err(SamplingError::PopulationExceeded {
                        requested: spec.n,
                        population,
                    }
                    .into());
                }
            }
        }
        let hint = spec.pvals.len() * spec.n;
        let id = self.allocate(spec.lanes, Some(hint))?;
        Ok(MultinomialVar {
            id,
            pvals: spec.pvals,
            n: spec.n,
            replace: spec.replace,
        })
    }

    /// Allocates a choice stream variable.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::SamplingRange`] for invalid weights or a
    /// without-replacement `size` exceeding the selectable population;
    /// [`EngineError::Config`] for an empty population, a `size` of
    /// zero, a weight-count mismatch, or a zero lane count.
    pub fn choice(&mut self, spec: ChoiceSpec) -> Result<ChoiceVar, EngineError> {
        if spec.population == 0 {
            return Err(invalid_param("population", "must be at least 1"));
        }
        if spec.size == 0 {
            return Err(invalid_param("size", "must be at least 1"));
        }
        if let Some(weights) = &spec.p {
            if weights.len() != spec.population {
                return Err(invalid_param(
                    "p",
                    format!(
                        "expected {} weights, got {}",
                        spec.population,
                        weights.len()
                    ),
                ));
            }
            validate_pvals(std::slice::from_ref(weights))?;
        }
        if !spec.replace {
            let population = spec
                .p
                .as_deref()
                .map_or(spec.population, selectable_categories);
            if spec.size > population {
                return Err(SamplingError::PopulationExceeded {
                    requested: spec.size,
                    population,
                }
                .into());
            }
        }
        let id = self.allocate(spec.lanes, Some(spec.size))?;
        Ok(ChoiceVar {
            id,
            population: spec.population,
            size: spec.size,
            weights: spec.p,
            replace: spec.replace,
        })
    }

    /// Draws a sample of `shape` from a uniform variable.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidSize`] for a rejected shape.
    pub fn draw_uniform(
        &mut self,
        var: &UniformVar,
        shape: &[i64],
    ) -> Result<Sample, EngineError> {
        let (dims, total) = checked_shape(shape)?;
        let units = self.draw_units(var.id, total);
        let data = dist::uniform::transform(&units, var.low, var.high, var.dtype);
        Ok(Sample::new(dims, data))
    }

    /// Draws a sample of `shape` from a Bernoulli variable.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidSize`] for a rejected shape.
    pub fn draw_binomial(
        &mut self,
        var: &BinomialVar,
        shape: &[i64],
    ) -> Result<Sample, EngineError> {
        let (dims, total) = checked_shape(shape)?;
        let units = self.draw_units(var.id, total);
        let data = dist::binomial::transform(&units, var.p, var.dtype);
        Ok(Sample::new(dims, data))
    }

    /// Draws a sample of `shape` from a normal variable.
    ///
    /// Odd element counts consume one extra uniform: deviates are
    /// produced in cos/sin pairs and the dangling sine leg is discarded.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidSize`] for a rejected shape.
    pub fn draw_normal(
        &mut self,
        var: &NormalVar,
        shape: &[i64],
    ) -> Result<Sample, EngineError> {
        let (dims, total) = checked_shape(shape)?;
        let evened = total + total % 2;
        let units = self.draw_units(var.id, evened);
        let data = dist::normal::transform(&units, var.avg, var.std, total, var.dtype);
        Ok(Sample::new(dims, data))
    }

    /// Draws one multinomial sample: `n` experiments per probability
    /// row.
    ///
    /// With replacement the output is `rows x categories` counts; without
    /// replacement it is the `rows x n` chosen category indices.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidSize`] when `rows * n` overflows
    /// the element limit.
    pub fn draw_multinomial(&mut self, var: &MultinomialVar) -> Result<Sample, EngineError> {
        let rows = var.pvals.len();
        let total = validate_shape(&[rows as i64, var.n as i64])?;
        let units = self.draw_units(var.id, total);
        let (shape, data) = if var.replace {
            let n_categories = var.pvals.first().map_or(0, Vec::len);
            (
                vec![rows, n_categories],
                dist::multinomial::counts(&units, &var.pvals, var.n),
            )
        } else {
            (
                vec![rows, var.n],
                dist::multinomial::indices(&units, &var.pvals, var.n),
            )
        };
        Ok(Sample::new(shape, SampleData::I64(data)))
    }

    /// Draws one choice sample: `size` population indices.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidSize`] when `size` overflows the
    /// element limit.
    pub fn draw_choice(&mut self, var: &ChoiceVar) -> Result<Sample, EngineError> {
        let total = validate_shape(&[var.size as i64])?;
        let units = self.draw_units(var.id, total);
        let data = dist::choice::choose(&units, var.population, var.weights.as_deref(), var.replace);
        Ok(Sample::new(vec![var.size], SampleData::I64(data)))
    }

    /// Reseeds the engine, restoring every variable to its post-allocation
    /// state.
    ///
    /// Tables are re-derived in allocation order with their current lane
    /// counts, so the draw sequence after `reseed(Some(s))` matches a
    /// fresh engine seeded with `s` and allocated identically. `None`
    /// draws a fresh scalar seed from the operating system first. The
    /// seed is validated before any state is touched; a failed reseed
    /// leaves the engine unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidSeed`] when the seed violates the
    /// residue rules.
    pub fn reseed(&mut self, seed: Option<SeedSpec>) -> Result<(), EngineError> {
        let seed = seed.unwrap_or_else(|| SeedSpec::Scalar(entropy_scalar()));
        let mut root = seed.expand()?;
        debug!(engine = self.id, seed = ?seed, variables = self.vars.len(), "reseed");
        for (stream, var) in self.vars.iter_mut().enumerate() {
            var.table = StateTable::derive(root, stream as u64, var.table.len());
            root = advance_stream(&root);
        }
        self.seed = seed;
        self.root = root;
        Ok(())
    }

    /// Extends a variable's lane table by `additional` substreams.
    ///
    /// Existing lanes are untouched, so draws that fit the old lane
    /// count are unaffected; the new lanes continue the variable's
    /// substream enumeration exactly where the original derivation
    /// stopped.
    pub fn grow(&mut self, var: &impl StreamVar, additional: usize) {
        let id = var.id();
        self.check_handle(id);
        self.vars[id.index].table.grow(additional);
        debug!(engine = self.id, stream = id.index, additional, "lane table grown");
    }

    fn check_handle(&self, id: VarId) {
        assert_eq!(
            id.engine, self.id,
            "stream variable belongs to a different engine"
        );
    }

    fn var_table(&self, id: VarId) -> &VarTable {
        self.check_handle(id);
        &self.vars[id.index]
    }

    fn lane_count(
        &self,
        lanes: Option<usize>,
        size_hint: Option<usize>,
    ) -> Result<usize, EngineError> {
        match lanes {
            Some(0) => Err(EngineError::Config(ConfigError::InvalidLaneCount(0))),
            Some(n) => Ok(n),
            None => Ok(match size_hint {
                Some(total) if total > 0 => guess_lanes(total, self.config.max_auto_lanes()),
                _ => self.config.default_lanes(),
            }),
        }
    }

    fn allocate(
        &mut self,
        lanes: Option<usize>,
        size_hint: Option<usize>,
    ) -> Result<VarId, EngineError> {
        let n_lanes = self.lane_count(lanes, size_hint)?;
        let stream = self.vars.len() as u64;
        let table = StateTable::derive(self.root, stream, n_lanes);
        self.root = advance_stream(&self.root);
        self.vars.push(VarTable {
            table,
            parallelism: lanes,
        });
        debug!(engine = self.id, stream, lanes = n_lanes, "stream variable allocated");
        Ok(VarId {
            engine: self.id,
            index: stream as usize,
        })
    }

    fn draw_units(&mut self, id: VarId, total: usize) -> Vec<f64> {
        let var = self.var_table(id);
        let plan = plan_draw(var.table.len(), total, var.parallelism, &self.config);
        trace!(
            engine = self.id,
            stream = id.index,
            total,
            lanes = plan.lanes_used,
            parallel = total >= self.config.parallel_threshold() && plan.lanes_used > 1,
            "draw"
        );
        let (units, next) = sampler::draw_uniform(&var.table, total, var.parallelism, &self.config);
        self.vars[id.index].table = next;
        units
    }
}

fn checked_shape(shape: &[i64]) -> Result<(Vec<usize>, usize), EngineError> {
    let total = validate_shape(shape)?;
    Ok((shape.iter().map(|&dim| dim as usize).collect(), total))
}
