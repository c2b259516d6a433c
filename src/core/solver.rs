use super::retirement;
use super::types::{RetirementParameters, SolverConfig, SolverIteration, SolverResult};

/// Bisects the monthly contribution until the plan's funding ratio (average
/// retirement income over required income) reaches the target. The ratio is
/// monotone in the contribution, so the bracket [search_min, search_max] is
/// checked at both ends before narrowing.
pub fn solve_required_contribution(
    params: &RetirementParameters,
    config: SolverConfig,
) -> Result<SolverResult, String> {
    validate_config(params, config)?;

    let low_ratio = funding_ratio_at(params, config.search_min);
    let high_ratio = funding_ratio_at(params, config.search_max);

    let mut iterations = Vec::with_capacity(config.max_iterations as usize);
    let mut solved_value = None;
    let mut converged = false;
    let feasible;
    let message;

    if low_ratio + 1e-12 >= config.target_funding_ratio {
        solved_value = Some(config.search_min);
        converged = true;
        feasible = true;
        message = "Already meets target at lower contribution bound.".to_string();
    } else if high_ratio + 1e-12 < config.target_funding_ratio {
        feasible = false;
        message = "No feasible contribution found within the search bounds.".to_string();
    } else {
        let mut lo = config.search_min;
        let mut hi = config.search_max;
        let mut it = 0;
        while it < config.max_iterations {
            it += 1;
            let mid = (lo + hi) * 0.5;
            let ratio = funding_ratio_at(params, mid);
            iterations.push(SolverIteration {
                iteration: it,
                lower_bound: lo,
                upper_bound: hi,
                candidate_contribution: mid,
                funding_ratio: ratio,
            });

            if ratio + 1e-12 >= config.target_funding_ratio {
                hi = mid;
            } else {
                lo = mid;
            }

            if (hi - lo).abs() <= config.tolerance {
                converged = true;
                solved_value = Some(hi);
                break;
            }
        }
        if solved_value.is_none() {
            solved_value = Some(hi);
        }
        feasible = true;
        message = if converged {
            "Solved required monthly contribution.".to_string()
        } else {
            "Reached max iterations before tolerance was met; returning best estimate.".to_string()
        };
    }

    let achieved_funding_ratio = solved_value.map(|value| funding_ratio_at(params, value));

    Ok(SolverResult {
        target_funding_ratio: config.target_funding_ratio,
        search_min: config.search_min,
        search_max: config.search_max,
        tolerance: config.tolerance,
        max_iterations: config.max_iterations,
        solved_monthly_contribution: solved_value,
        achieved_funding_ratio,
        converged,
        feasible,
        message,
        iterations,
    })
}

fn funding_ratio_at(params: &RetirementParameters, monthly_contribution: f64) -> f64 {
    let mut candidate = *params;
    candidate.monthly_contribution = monthly_contribution.max(0.0);
    let plan = retirement::plan_retirement(&candidate);
    if plan.required_monthly_income <= 0.0 {
        return f64::INFINITY;
    }
    plan.average_monthly_withdrawal / plan.required_monthly_income
}

fn validate_config(params: &RetirementParameters, config: SolverConfig) -> Result<(), String> {
    if params.retirement_age <= params.current_age {
        return Err("retirement_age must be greater than current_age to solve for contributions".to_string());
    }
    if params.life_expectancy <= params.retirement_age {
        return Err("life_expectancy must be greater than retirement_age".to_string());
    }
    if params.current_annual_income <= 0.0 {
        return Err("current_annual_income must be > 0 to solve for contributions".to_string());
    }
    if params.income_replacement_percent <= 0.0 {
        return Err("income_replacement_percent must be > 0 to solve for contributions".to_string());
    }
    if !config.target_funding_ratio.is_finite() || config.target_funding_ratio <= 0.0 {
        return Err("target_funding_ratio must be > 0".to_string());
    }
    if !config.search_min.is_finite() || !config.search_max.is_finite() {
        return Err("search bounds must be finite".to_string());
    }
    if config.search_min < 0.0 {
        return Err("search_min must be >= 0".to_string());
    }
    if config.search_max <= config.search_min {
        return Err("search_max must be greater than search_min".to_string());
    }
    if !config.tolerance.is_finite() || config.tolerance <= 0.0 {
        return Err("tolerance must be > 0".to_string());
    }
    if config.max_iterations == 0 {
        return Err("max_iterations must be > 0".to_string());
    }
    Ok(())
}
