use super::types::{
    ActionKind, AssetInput, FiveYearProjection, RebalancingAction, RebalancingParameters,
    RebalancingPlan,
};

const PROJECTION_YEARS: usize = 5;
const ASSUMED_GAIN_FRACTION: f64 = 0.5;
const CAPITAL_GAINS_RATE: f64 = 0.15;

/// Rescales a weight list so it sums to 100. A list that sums to zero is
/// split evenly instead.
fn normalize_percents(raw: &[f64]) -> Vec<f64> {
    if raw.is_empty() {
        return Vec::new();
    }
    let total: f64 = raw.iter().sum();
    if total > 0.0 {
        raw.iter().map(|value| value / total * 100.0).collect()
    } else {
        vec![100.0 / raw.len() as f64; raw.len()]
    }
}

fn weighted_return_percent(percents: &[f64], assets: &[AssetInput]) -> f64 {
    percents
        .iter()
        .zip(assets.iter())
        .map(|(percent, asset)| percent / 100.0 * asset.expected_return_percent)
        .sum::<f64>()
}

fn project_growth(starting_value: f64, annual_return_percent: f64, annual_contribution: f64) -> Vec<f64> {
    let rate = annual_return_percent / 100.0;
    let mut values = Vec::with_capacity(PROJECTION_YEARS + 1);
    let mut value = starting_value;
    values.push(value);
    for _ in 0..PROJECTION_YEARS {
        value = value * (1.0 + rate) + annual_contribution;
        values.push(value);
    }
    values
}

/// Turns current and target weights into per-asset trade actions, an overall
/// drift figure, a rough capital-gains estimate for taxable accounts, and a
/// five-year growth projection of the rebalanced versus untouched mix.
///
/// Both weight lists are normalized to 100 before any comparison, so inputs
/// that do not quite add up still produce a consistent plan. The tax estimate
/// assumes half of every sale is realized gain taxed at 15%.
pub fn plan_rebalancing(params: &RebalancingParameters) -> RebalancingPlan {
    let current_raw: Vec<f64> = params.assets.iter().map(|a| a.current_percent).collect();
    let target_raw: Vec<f64> = params.assets.iter().map(|a| a.target_percent).collect();
    let current = normalize_percents(&current_raw);
    let target = normalize_percents(&target_raw);

    let mut actions = Vec::with_capacity(params.assets.len());
    let mut drift_total = 0.0;
    let mut sale_total = 0.0;

    for (index, asset) in params.assets.iter().enumerate() {
        let current_value = current[index] / 100.0 * params.portfolio_value;
        let target_value = target[index] / 100.0 * params.portfolio_value;
        let delta = target_value - current_value;
        let action = if delta > 0.0 {
            ActionKind::Buy
        } else if delta < 0.0 {
            ActionKind::Sell
        } else {
            ActionKind::Hold
        };
        if delta < 0.0 {
            sale_total += -delta;
        }
        drift_total += (current[index] - target[index]).abs();
        actions.push(RebalancingAction {
            asset_name: asset.name.clone(),
            current_value,
            target_value,
            delta,
            action,
        });
    }

    let estimated_tax_impact = if params.taxable {
        sale_total * ASSUMED_GAIN_FRACTION * CAPITAL_GAINS_RATE
    } else {
        0.0
    };

    let projection = FiveYearProjection {
        rebalanced: project_growth(
            params.portfolio_value,
            weighted_return_percent(&target, &params.assets),
            params.annual_contribution,
        ),
        current: project_growth(
            params.portfolio_value,
            weighted_return_percent(&current, &params.assets),
            params.annual_contribution,
        ),
    };

    RebalancingPlan {
        actions,
        drift_percent: drift_total / 2.0,
        estimated_tax_impact,
        projection,
    }
}
