use super::types::{PlanPhase, RetirementParameters, RetirementPlan, RetirementYearPoint};

const BASE_WITHDRAWAL_RATE: f64 = 0.04;

/// Builds a year-by-year retirement plan in two phases.
///
/// Accumulation compounds the balance at the fee-adjusted pre-retirement
/// return and adds a year of contributions at each step. Distribution starts
/// from a 4% first-year withdrawal of the retirement balance, escalates it
/// with inflation, and caps every withdrawal at what the grown balance can
/// actually fund, so the balance never goes negative.
pub fn plan_retirement(params: &RetirementParameters) -> RetirementPlan {
    let accumulation_years = params.retirement_age.saturating_sub(params.current_age);
    let distribution_years = params.life_expectancy.saturating_sub(params.retirement_age);

    let accumulation_rate =
        (params.pre_retirement_return_percent - params.annual_fee_percent) / 100.0;
    let distribution_rate =
        (params.post_retirement_return_percent - params.annual_fee_percent) / 100.0;
    let inflation_rate = params.inflation_percent / 100.0;
    let annual_contribution = params.monthly_contribution * 12.0;

    let mut years = Vec::with_capacity((accumulation_years + distribution_years) as usize + 1);
    let mut balance = params.current_savings;
    years.push(RetirementYearPoint {
        age: params.current_age,
        phase: PlanPhase::Accumulation,
        balance,
        contribution: 0.0,
        withdrawal: 0.0,
    });

    for offset in 1..=accumulation_years {
        balance = balance * (1.0 + accumulation_rate) + annual_contribution;
        years.push(RetirementYearPoint {
            age: params.current_age + offset,
            phase: PlanPhase::Accumulation,
            balance,
            contribution: annual_contribution,
            withdrawal: 0.0,
        });
    }

    let balance_at_retirement = balance;
    let first_year_withdrawal = balance_at_retirement * BASE_WITHDRAWAL_RATE;
    let mut total_withdrawn = 0.0;

    for year in 1..=distribution_years {
        let scheduled = first_year_withdrawal * (1.0 + inflation_rate).powi(year as i32 - 1);
        let grown = balance * (1.0 + distribution_rate);
        let withdrawn = scheduled.min(grown).max(0.0);
        balance = (grown - withdrawn).max(0.0);
        total_withdrawn += withdrawn;
        years.push(RetirementYearPoint {
            age: params.retirement_age + year,
            phase: PlanPhase::Distribution,
            balance,
            contribution: 0.0,
            withdrawal: withdrawn,
        });
    }

    let required_monthly_income = params.current_annual_income
        * (params.income_replacement_percent / 100.0)
        * (1.0 + inflation_rate).powi(accumulation_years as i32)
        / 12.0;
    let average_monthly_withdrawal = if distribution_years > 0 {
        total_withdrawn / distribution_years as f64 / 12.0
    } else {
        0.0
    };
    let monthly_income_gap = (required_monthly_income - average_monthly_withdrawal).max(0.0);

    RetirementPlan {
        balance_at_retirement,
        ending_balance: balance,
        required_monthly_income,
        average_monthly_withdrawal,
        monthly_income_gap,
        on_track: average_monthly_withdrawal + 1e-9 >= required_monthly_income,
        years,
    }
}
