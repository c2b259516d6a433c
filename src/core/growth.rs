use super::types::{
    FeeSummary, GrowthParameters, GrowthPoint, GrowthSeries, PlatformFee, PlatformOutcome,
};

/// Projects an investment forward period by period, tracking the fee-dragged
/// value next to a fee-free shadow series over the same contributions.
///
/// Contributions land at the end of each period, after growth is applied.
pub fn project(params: &GrowthParameters) -> GrowthSeries {
    let gross_rate = params.gross_return_percent / 100.0;
    let net_rate = (params.gross_return_percent - params.fee_drag_percent) / 100.0;

    let mut value_with_fees = params.initial_amount;
    let mut value_without_fees = params.initial_amount;

    let mut points = Vec::with_capacity(params.periods as usize + 1);
    points.push(GrowthPoint {
        period: 0,
        value_with_fees,
        value_without_fees,
        cumulative_contributions: params.initial_amount,
    });

    for period in 1..=params.periods {
        value_with_fees = value_with_fees * (1.0 + net_rate) + params.periodic_contribution;
        value_without_fees = value_without_fees * (1.0 + gross_rate) + params.periodic_contribution;
        points.push(GrowthPoint {
            period,
            value_with_fees,
            value_without_fees,
            cumulative_contributions: params.initial_amount
                + params.periodic_contribution * period as f64,
        });
    }

    GrowthSeries { points }
}

/// Reduces a projected series to its headline fee numbers, including the
/// share of gross growth lost to fees and the T-Rex score (100 minus that
/// share). When the fee-free projection produced no growth at all, the fee
/// impact is reported as zero rather than dividing by zero.
pub fn summarize(series: &GrowthSeries) -> FeeSummary {
    let Some(last) = series.points.last() else {
        return FeeSummary {
            final_value_with_fees: 0.0,
            final_value_without_fees: 0.0,
            total_contributions: 0.0,
            gross_growth: 0.0,
            total_fee_cost: 0.0,
            fee_impact_percent: 0.0,
            t_rex_score: 100.0,
        };
    };

    let total_contributions = last.cumulative_contributions;
    let gross_growth = last.value_without_fees - total_contributions;
    let total_fee_cost = last.value_without_fees - last.value_with_fees;
    let fee_impact_percent = if gross_growth > 0.0 {
        total_fee_cost / gross_growth * 100.0
    } else {
        0.0
    };

    FeeSummary {
        final_value_with_fees: last.value_with_fees,
        final_value_without_fees: last.value_without_fees,
        total_contributions,
        gross_growth,
        total_fee_cost,
        fee_impact_percent,
        t_rex_score: 100.0 - fee_impact_percent,
    }
}

/// Runs the same projection once per platform, varying only the fee drag, so
/// platforms can be ranked by what their charges cost over the full horizon.
pub fn compare_platforms(base: &GrowthParameters, platforms: &[PlatformFee]) -> Vec<PlatformOutcome> {
    platforms
        .iter()
        .map(|platform| {
            let candidate = GrowthParameters {
                fee_drag_percent: platform.annual_fee_percent,
                ..*base
            };
            let series = project(&candidate);
            PlatformOutcome {
                name: platform.name.clone(),
                annual_fee_percent: platform.annual_fee_percent,
                summary: summarize(&series),
            }
        })
        .collect()
}
