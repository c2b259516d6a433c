use std::f64::consts::PI;

use super::types::{ComparisonParameters, RunStatistics, StrategyComparison, StrategyOutcome};

const PERIODS_PER_YEAR: f64 = 12.0;
const SAMPLE_PATH_COUNT: usize = 3;

const DCA_STREAM: u64 = 0;
const LUMP_SUM_STREAM: u64 = 1;

/// Source of uniform draws in (0, 1). Simulations take this as a seam so
/// tests can script exact sequences.
pub trait UniformSource {
    fn next_uniform(&mut self) -> f64;
}

/// xorshift64* generator. Deterministic for a given seed, with a fixed
/// fallback state because the all-zero state would never leave zero.
pub struct Xorshift64 {
    state: u64,
}

impl Xorshift64 {
    pub fn new(seed: u64) -> Self {
        let state = if seed == 0 {
            0xA5A5_A5A5_A5A5_A5A5
        } else {
            seed
        };
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }
}

impl UniformSource for Xorshift64 {
    fn next_uniform(&mut self) -> f64 {
        const DENOM: f64 = (1_u64 << 53) as f64;
        let v = self.next_u64() >> 11;
        ((v as f64) + 0.5) / DENOM
    }
}

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

fn derive_seed(base_seed: u64, stream: u64, trial: u32) -> u64 {
    let mixed = base_seed ^ (stream << 32) ^ trial as u64;
    splitmix64(mixed)
}

/// Box-Muller transform, cosine branch only. The first draw is clamped away
/// from zero so the log stays finite.
pub fn standard_normal(source: &mut impl UniformSource) -> f64 {
    let u1 = source.next_uniform().max(1e-12);
    let u2 = source.next_uniform();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

#[derive(Debug, Clone, Copy)]
struct PeriodModel {
    mean: f64,
    volatility: f64,
    fee: f64,
}

impl PeriodModel {
    fn from_annual(params: &ComparisonParameters) -> Self {
        let annual_return = params.annual_return_percent / 100.0;
        let annual_volatility = params.annual_volatility_percent / 100.0;
        let annual_fee = params.annual_fee_percent / 100.0;
        Self {
            mean: (1.0 + annual_return).powf(1.0 / PERIODS_PER_YEAR) - 1.0,
            volatility: annual_volatility / PERIODS_PER_YEAR.sqrt(),
            fee: annual_fee / PERIODS_PER_YEAR,
        }
    }

    fn sample(&self, source: &mut impl UniformSource) -> f64 {
        self.mean + standard_normal(source) * self.volatility - self.fee
    }
}

fn run_trial(
    starting_value: f64,
    contribution: f64,
    period_count: u32,
    model: &PeriodModel,
    source: &mut impl UniformSource,
) -> Vec<f64> {
    let mut path = Vec::with_capacity(period_count as usize + 1);
    let mut value = starting_value;
    path.push(value);
    for _ in 0..period_count {
        value = value * (1.0 + model.sample(source)) + contribution;
        path.push(value);
    }
    path
}

fn summarize_sorted(sorted_values: &[f64]) -> RunStatistics {
    if sorted_values.is_empty() {
        return RunStatistics {
            average: 0.0,
            median: 0.0,
            min: 0.0,
            max: 0.0,
        };
    }
    let sum: f64 = sorted_values.iter().sum();
    RunStatistics {
        average: sum / sorted_values.len() as f64,
        median: sorted_values[sorted_values.len() / 2],
        min: sorted_values[0],
        max: sorted_values[sorted_values.len() - 1],
    }
}

/// Runs paired Monte Carlo trials of dollar-cost averaging against investing
/// the full lump sum upfront, over the same number of periods and return
/// model. Each strategy draws from its own seeded stream per trial, so a
/// rerun with the same seed reproduces the exact comparison.
///
/// When the planned periodic contributions would exceed the lump sum, the
/// per-period amount is scaled down so both strategies invest the same total.
pub fn compare_strategies(params: &ComparisonParameters) -> StrategyComparison {
    let total_planned = params.periodic_amount * params.period_count as f64;
    let contribution_adjusted = params.period_count > 0 && total_planned > params.lump_sum_amount;
    let effective_periodic_amount = if contribution_adjusted {
        params.lump_sum_amount / params.period_count as f64
    } else {
        params.periodic_amount
    };

    let model = PeriodModel::from_annual(params);
    let trial_count = params.trial_count as usize;

    let mut dca_end_values = Vec::with_capacity(trial_count);
    let mut lump_end_values = Vec::with_capacity(trial_count);
    let mut dca_paths = Vec::with_capacity(trial_count.min(SAMPLE_PATH_COUNT));
    let mut lump_paths = Vec::with_capacity(trial_count.min(SAMPLE_PATH_COUNT));

    for trial in 0..params.trial_count {
        let mut dca_source = Xorshift64::new(derive_seed(params.seed, DCA_STREAM, trial));
        let dca_path = run_trial(
            0.0,
            effective_periodic_amount,
            params.period_count,
            &model,
            &mut dca_source,
        );

        let mut lump_source = Xorshift64::new(derive_seed(params.seed, LUMP_SUM_STREAM, trial));
        let lump_path = run_trial(
            params.lump_sum_amount,
            0.0,
            params.period_count,
            &model,
            &mut lump_source,
        );

        dca_end_values.push(dca_path[dca_path.len() - 1]);
        lump_end_values.push(lump_path[lump_path.len() - 1]);
        if (trial as usize) < SAMPLE_PATH_COUNT {
            dca_paths.push(dca_path);
            lump_paths.push(lump_path);
        }
    }

    dca_end_values.sort_by(|a, b| a.total_cmp(b));
    lump_end_values.sort_by(|a, b| a.total_cmp(b));

    // Win rates pair the strategies by rank across the sorted outcomes, not
    // by the trial that produced them. Ties count for the lump sum.
    let dca_wins = dca_end_values
        .iter()
        .zip(lump_end_values.iter())
        .filter(|(dca, lump)| dca > lump)
        .count();
    let dca_win_probability_percent = if trial_count > 0 {
        dca_wins as f64 / trial_count as f64 * 100.0
    } else {
        0.0
    };
    let lump_sum_win_probability_percent = if trial_count > 0 {
        100.0 - dca_win_probability_percent
    } else {
        0.0
    };

    let dca_statistics = summarize_sorted(&dca_end_values);
    let lump_statistics = summarize_sorted(&lump_end_values);

    StrategyComparison {
        dca: StrategyOutcome {
            end_values: dca_end_values,
            sampled_paths: dca_paths,
            statistics: dca_statistics,
        },
        lump_sum: StrategyOutcome {
            end_values: lump_end_values,
            sampled_paths: lump_paths,
            statistics: lump_statistics,
        },
        dca_win_probability_percent,
        lump_sum_win_probability_percent,
        effective_periodic_amount,
        contribution_adjusted,
    }
}
