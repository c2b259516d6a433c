use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use clap::{ArgAction, Args};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::core::{
    AllocationParameters, AllocationResult, AssetInput, ComparisonParameters, FeeSummary,
    GrowthParameters, GrowthPoint, PlatformFee, PlatformOutcome, RebalancingParameters,
    RebalancingPlan, RetirementParameters, RetirementPlan, SolverConfig, SolverResult,
    StrategyComparison, compare_platforms, compare_strategies, optimize_allocation,
    plan_rebalancing, plan_retirement, project, solve_required_contribution, summarize,
};

const INDEX_HTML: &str = include_str!("../../web/index.html");
const STYLES_CSS: &str = include_str!("../../web/styles.css");
const APP_JS: &str = include_str!("../../web/app.js");

const MAX_GROWTH_PERIODS: u32 = 120;
const MAX_COMPARISON_PERIODS: u32 = 600;
const MAX_TRIALS: u32 = 10_000;
const MAX_REBALANCE_ASSETS: usize = 20;
const MAX_LIFE_EXPECTANCY: u32 = 120;

#[derive(Args, Debug)]
pub struct GrowthArgs {
    #[arg(long, default_value_t = 10_000.0)]
    initial_amount: f64,
    #[arg(
        long,
        default_value_t = 5_000.0,
        help = "Contribution added at the end of every period"
    )]
    periodic_contribution: f64,
    #[arg(
        long,
        default_value_t = 25,
        help = "Number of compounding periods (years)"
    )]
    periods: u32,
    #[arg(
        long,
        default_value_t = 7.0,
        help = "Expected annual return in percent, e.g. 7"
    )]
    gross_return: f64,
    #[arg(
        long,
        default_value_t = 2.0,
        help = "Annual fee drag in percent, e.g. 2"
    )]
    fee_drag: f64,
}

#[derive(Args, Debug)]
pub struct RetirementArgs {
    #[arg(long, default_value_t = 30)]
    current_age: u32,
    #[arg(long, default_value_t = 65)]
    retirement_age: u32,
    #[arg(long, default_value_t = 90, help = "Age to fund withdrawals through")]
    life_expectancy: u32,
    #[arg(long, default_value_t = 25_000.0)]
    current_savings: f64,
    #[arg(long, default_value_t = 500.0)]
    monthly_contribution: f64,
    #[arg(
        long,
        default_value_t = 7.0,
        help = "Expected annual return before retirement in percent"
    )]
    pre_retirement_return: f64,
    #[arg(
        long,
        default_value_t = 5.0,
        help = "Expected annual return after retirement in percent"
    )]
    post_retirement_return: f64,
    #[arg(long, default_value_t = 1.0, help = "Annual fee drag in percent")]
    annual_fee: f64,
    #[arg(
        long,
        default_value_t = 2.5,
        help = "Expected annual inflation in percent"
    )]
    inflation: f64,
    #[arg(long, default_value_t = 60_000.0)]
    current_annual_income: f64,
    #[arg(
        long,
        default_value_t = 80.0,
        help = "Retirement income target as percent of current income"
    )]
    income_replacement: f64,
}

#[derive(Args, Debug)]
pub struct CompareArgs {
    #[arg(
        long,
        default_value_t = 10_000.0,
        help = "Amount the lump-sum strategy invests up front"
    )]
    lump_sum: f64,
    #[arg(
        long,
        default_value_t = 500.0,
        help = "Amount the averaging strategy invests each month"
    )]
    periodic_amount: f64,
    #[arg(
        long,
        default_value_t = 12,
        help = "Number of monthly periods to simulate"
    )]
    periods: u32,
    #[arg(
        long,
        default_value_t = 7.0,
        help = "Expected annual return in percent"
    )]
    annual_return: f64,
    #[arg(
        long,
        default_value_t = 15.0,
        help = "Annual return volatility in percent"
    )]
    annual_volatility: f64,
    #[arg(long, default_value_t = 1.0, help = "Annual fee drag in percent")]
    annual_fee: f64,
    #[arg(long, default_value_t = 500)]
    trials: u32,
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

#[derive(Args, Debug)]
pub struct AllocateArgs {
    #[arg(
        long,
        default_value_t = 5,
        help = "Risk tolerance from 1 (conservative) to 10 (aggressive)"
    )]
    risk_tolerance: u32,
    #[arg(long, default_value_t = 35)]
    age: u32,
    #[arg(long, default_value_t = 20, help = "Investment horizon in years")]
    horizon_years: u32,
    #[arg(long, default_value_t = 10_000.0)]
    investment_amount: f64,
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    include_international: bool,
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    include_bonds: bool,
    #[arg(long, default_value_t = false, action = ArgAction::Set)]
    include_reit: bool,
    #[arg(long, default_value_t = false, action = ArgAction::Set)]
    include_commodities: bool,
    #[arg(long, default_value_t = false, action = ArgAction::Set)]
    include_alternatives: bool,
}

#[derive(Args, Debug)]
pub struct RebalanceArgs {
    #[arg(
        long = "asset",
        value_name = "NAME:CURRENT:TARGET:RETURN",
        help = "Holding spec with allocation percents and expected annual return; repeatable"
    )]
    assets: Vec<String>,
    #[arg(long, default_value_t = 100_000.0)]
    portfolio_value: f64,
    #[arg(
        long,
        default_value_t = 0.0,
        help = "Amount added to the portfolio every year"
    )]
    annual_contribution: f64,
    #[arg(long, help = "Estimate capital gains tax on the sells")]
    taxable: bool,
}

#[derive(Args, Debug)]
pub struct SolveArgs {
    #[command(flatten)]
    retirement: RetirementArgs,
    #[arg(
        long,
        default_value_t = 1.0,
        help = "Target ratio of sustainable to required monthly income"
    )]
    target_funding_ratio: f64,
    #[arg(
        long,
        default_value_t = 0.0,
        help = "Lower monthly contribution bound"
    )]
    search_min: f64,
    #[arg(
        long,
        default_value_t = 20_000.0,
        help = "Upper monthly contribution bound"
    )]
    search_max: f64,
    #[arg(
        long,
        default_value_t = 1.0,
        help = "Bracket width that counts as converged, in currency units"
    )]
    tolerance: f64,
    #[arg(long, default_value_t = 48)]
    max_iterations: u32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct GrowthPayload {
    initial_amount: Option<f64>,
    periodic_contribution: Option<f64>,
    periods: Option<u32>,
    gross_return: Option<f64>,
    fee_drag: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PlatformEntryPayload {
    name: Option<String>,
    annual_fee: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PlatformsPayload {
    #[serde(flatten)]
    growth: GrowthPayload,
    platforms: Option<Vec<PlatformEntryPayload>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RetirementPayload {
    current_age: Option<u32>,
    retirement_age: Option<u32>,
    life_expectancy: Option<u32>,
    current_savings: Option<f64>,
    monthly_contribution: Option<f64>,
    pre_retirement_return: Option<f64>,
    post_retirement_return: Option<f64>,
    annual_fee: Option<f64>,
    inflation: Option<f64>,
    current_annual_income: Option<f64>,
    income_replacement: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SolvePayload {
    #[serde(flatten)]
    retirement: RetirementPayload,
    target_funding_ratio: Option<f64>,
    search_min: Option<f64>,
    search_max: Option<f64>,
    tolerance: Option<f64>,
    max_iterations: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ComparePayload {
    lump_sum: Option<f64>,
    periodic_amount: Option<f64>,
    periods: Option<u32>,
    annual_return: Option<f64>,
    annual_volatility: Option<f64>,
    annual_fee: Option<f64>,
    trials: Option<u32>,
    seed: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct AllocationPayload {
    risk_tolerance: Option<u32>,
    age: Option<u32>,
    horizon_years: Option<u32>,
    investment_amount: Option<f64>,
    include_international: Option<bool>,
    include_bonds: Option<bool>,
    include_reit: Option<bool>,
    include_commodities: Option<bool>,
    include_alternatives: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RebalanceAssetPayload {
    name: Option<String>,
    current_percent: Option<f64>,
    target_percent: Option<f64>,
    expected_return: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RebalancePayload {
    assets: Option<Vec<RebalanceAssetPayload>>,
    portfolio_value: Option<f64>,
    taxable: Option<bool>,
    annual_contribution: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthResponse {
    points: Vec<GrowthPoint>,
    summary: FeeSummary,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformsResponse {
    platforms: Vec<PlatformOutcome>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn build_growth_parameters(args: &GrowthArgs) -> Result<GrowthParameters, String> {
    for (name, amount) in [
        ("--initial-amount", args.initial_amount),
        ("--periodic-contribution", args.periodic_contribution),
    ] {
        if !amount.is_finite() || amount < 0.0 {
            return Err(format!("{name} must be a finite amount >= 0"));
        }
    }

    if args.periods > MAX_GROWTH_PERIODS {
        return Err(format!("--periods must be <= {MAX_GROWTH_PERIODS}"));
    }

    if !(-100.0..=100.0).contains(&args.gross_return) {
        return Err("--gross-return must be between -100 and 100".to_string());
    }

    if !(0.0..=100.0).contains(&args.fee_drag) {
        return Err("--fee-drag must be between 0 and 100".to_string());
    }

    if args.gross_return - args.fee_drag < -100.0 {
        return Err("--gross-return minus --fee-drag must be >= -100".to_string());
    }

    Ok(GrowthParameters {
        initial_amount: args.initial_amount,
        periodic_contribution: args.periodic_contribution,
        periods: args.periods,
        gross_return_percent: args.gross_return,
        fee_drag_percent: args.fee_drag,
    })
}

fn build_retirement_parameters(args: &RetirementArgs) -> Result<RetirementParameters, String> {
    if args.retirement_age <= args.current_age {
        return Err("--retirement-age must be > --current-age".to_string());
    }

    if args.life_expectancy <= args.retirement_age {
        return Err("--life-expectancy must be > --retirement-age".to_string());
    }

    if args.life_expectancy > MAX_LIFE_EXPECTANCY {
        return Err(format!("--life-expectancy must be <= {MAX_LIFE_EXPECTANCY}"));
    }

    for (name, amount) in [
        ("--current-savings", args.current_savings),
        ("--monthly-contribution", args.monthly_contribution),
        ("--current-annual-income", args.current_annual_income),
    ] {
        if !amount.is_finite() || amount < 0.0 {
            return Err(format!("{name} must be a finite amount >= 0"));
        }
    }

    for (name, rate) in [
        ("--pre-retirement-return", args.pre_retirement_return),
        ("--post-retirement-return", args.post_retirement_return),
    ] {
        if !(-100.0..=100.0).contains(&rate) {
            return Err(format!("{name} must be between -100 and 100"));
        }
    }

    if !(0.0..=100.0).contains(&args.annual_fee) {
        return Err("--annual-fee must be between 0 and 100".to_string());
    }

    if args.pre_retirement_return - args.annual_fee < -100.0
        || args.post_retirement_return - args.annual_fee < -100.0
    {
        return Err("returns minus --annual-fee must be >= -100".to_string());
    }

    if !(0.0..=100.0).contains(&args.inflation) {
        return Err("--inflation must be between 0 and 100".to_string());
    }

    if !(0.0..=200.0).contains(&args.income_replacement) {
        return Err("--income-replacement must be between 0 and 200".to_string());
    }

    Ok(RetirementParameters {
        current_age: args.current_age,
        retirement_age: args.retirement_age,
        life_expectancy: args.life_expectancy,
        current_savings: args.current_savings,
        monthly_contribution: args.monthly_contribution,
        pre_retirement_return_percent: args.pre_retirement_return,
        post_retirement_return_percent: args.post_retirement_return,
        annual_fee_percent: args.annual_fee,
        inflation_percent: args.inflation,
        current_annual_income: args.current_annual_income,
        income_replacement_percent: args.income_replacement,
    })
}

fn build_comparison_parameters(args: &CompareArgs) -> Result<ComparisonParameters, String> {
    if !args.lump_sum.is_finite() || args.lump_sum <= 0.0 {
        return Err("--lump-sum must be a finite amount > 0".to_string());
    }

    if !args.periodic_amount.is_finite() || args.periodic_amount < 0.0 {
        return Err("--periodic-amount must be a finite amount >= 0".to_string());
    }

    if args.periods == 0 || args.periods > MAX_COMPARISON_PERIODS {
        return Err(format!(
            "--periods must be between 1 and {MAX_COMPARISON_PERIODS}"
        ));
    }

    if args.trials == 0 || args.trials > MAX_TRIALS {
        return Err(format!("--trials must be between 1 and {MAX_TRIALS}"));
    }

    if !(-99.0..=100.0).contains(&args.annual_return) {
        return Err("--annual-return must be between -99 and 100".to_string());
    }

    if !(0.0..=100.0).contains(&args.annual_volatility) {
        return Err("--annual-volatility must be between 0 and 100".to_string());
    }

    if !(0.0..=100.0).contains(&args.annual_fee) {
        return Err("--annual-fee must be between 0 and 100".to_string());
    }

    Ok(ComparisonParameters {
        lump_sum_amount: args.lump_sum,
        periodic_amount: args.periodic_amount,
        period_count: args.periods,
        annual_return_percent: args.annual_return,
        annual_volatility_percent: args.annual_volatility,
        annual_fee_percent: args.annual_fee,
        trial_count: args.trials,
        seed: args.seed,
    })
}

fn build_allocation_parameters(args: &AllocateArgs) -> Result<AllocationParameters, String> {
    if !(1..=10).contains(&args.risk_tolerance) {
        return Err("--risk-tolerance must be between 1 and 10".to_string());
    }

    if !(1..=120).contains(&args.age) {
        return Err("--age must be between 1 and 120".to_string());
    }

    if !(1..=60).contains(&args.horizon_years) {
        return Err("--horizon-years must be between 1 and 60".to_string());
    }

    if !args.investment_amount.is_finite() || args.investment_amount < 0.0 {
        return Err("--investment-amount must be a finite amount >= 0".to_string());
    }

    Ok(AllocationParameters {
        risk_tolerance: args.risk_tolerance,
        age: args.age,
        investment_horizon_years: args.horizon_years,
        investment_amount: args.investment_amount,
        include_international: args.include_international,
        include_bonds: args.include_bonds,
        include_reit: args.include_reit,
        include_commodities: args.include_commodities,
        include_alternatives: args.include_alternatives,
    })
}

fn build_rebalancing_parameters(
    assets: Vec<AssetInput>,
    portfolio_value: f64,
    taxable: bool,
    annual_contribution: f64,
) -> Result<RebalancingParameters, String> {
    if assets.is_empty() {
        return Err("at least one asset is required".to_string());
    }

    if assets.len() > MAX_REBALANCE_ASSETS {
        return Err(format!(
            "no more than {MAX_REBALANCE_ASSETS} assets are supported"
        ));
    }

    for asset in &assets {
        if asset.name.trim().is_empty() {
            return Err("asset names must not be empty".to_string());
        }
        for (what, percent) in [
            ("current", asset.current_percent),
            ("target", asset.target_percent),
        ] {
            if !percent.is_finite() || percent < 0.0 {
                return Err(format!(
                    "asset '{}' has an invalid {what} allocation",
                    asset.name
                ));
            }
        }
        if !(-100.0..=100.0).contains(&asset.expected_return_percent) {
            return Err(format!(
                "asset '{}' expected return must be between -100 and 100",
                asset.name
            ));
        }
    }

    if !portfolio_value.is_finite() || portfolio_value < 0.0 {
        return Err("--portfolio-value must be a finite amount >= 0".to_string());
    }

    if !annual_contribution.is_finite() || annual_contribution < 0.0 {
        return Err("--annual-contribution must be a finite amount >= 0".to_string());
    }

    Ok(RebalancingParameters {
        assets,
        portfolio_value,
        taxable,
        annual_contribution,
    })
}

fn build_solver_config(args: &SolveArgs) -> SolverConfig {
    SolverConfig {
        target_funding_ratio: args.target_funding_ratio,
        search_min: args.search_min,
        search_max: args.search_max,
        tolerance: args.tolerance,
        max_iterations: args.max_iterations,
    }
}

pub fn growth_response(args: &GrowthArgs) -> Result<GrowthResponse, String> {
    let params = build_growth_parameters(args)?;
    let series = project(&params);
    let summary = summarize(&series);
    Ok(GrowthResponse {
        points: series.points,
        summary,
    })
}

pub fn platforms_response(
    args: &GrowthArgs,
    platforms: &[PlatformFee],
) -> Result<PlatformsResponse, String> {
    let params = build_growth_parameters(args)?;

    if platforms.is_empty() {
        return Err("at least one platform is required".to_string());
    }
    for platform in platforms {
        if platform.name.trim().is_empty() {
            return Err("platform names must not be empty".to_string());
        }
        if !(0.0..=100.0).contains(&platform.annual_fee_percent) {
            return Err(format!(
                "platform '{}' fee must be between 0 and 100",
                platform.name
            ));
        }
    }

    Ok(PlatformsResponse {
        platforms: compare_platforms(&params, platforms),
    })
}

pub fn retirement_response(args: &RetirementArgs) -> Result<RetirementPlan, String> {
    let params = build_retirement_parameters(args)?;
    Ok(plan_retirement(&params))
}

pub fn compare_response(args: &CompareArgs) -> Result<StrategyComparison, String> {
    let params = build_comparison_parameters(args)?;
    Ok(compare_strategies(&params))
}

pub fn allocation_response(args: &AllocateArgs) -> Result<AllocationResult, String> {
    let params = build_allocation_parameters(args)?;
    Ok(optimize_allocation(&params))
}

pub fn rebalance_response(args: &RebalanceArgs) -> Result<RebalancingPlan, String> {
    let assets = if args.assets.is_empty() {
        default_assets()
    } else {
        let mut assets = Vec::with_capacity(args.assets.len());
        for spec in &args.assets {
            assets.push(parse_asset_spec(spec)?);
        }
        assets
    };

    let params = build_rebalancing_parameters(
        assets,
        args.portfolio_value,
        args.taxable,
        args.annual_contribution,
    )?;
    Ok(plan_rebalancing(&params))
}

pub fn solve_response(args: &SolveArgs) -> Result<SolverResult, String> {
    let params = build_retirement_parameters(&args.retirement)?;
    solve_required_contribution(&params, build_solver_config(args))
}

/// Parses `NAME:CURRENT:TARGET:RETURN`. The name may itself contain colons;
/// only the last three segments are read as numbers.
fn parse_asset_spec(spec: &str) -> Result<AssetInput, String> {
    let parts: Vec<&str> = spec.rsplitn(4, ':').collect();
    if parts.len() != 4 {
        return Err(format!(
            "invalid --asset spec '{spec}': expected NAME:CURRENT:TARGET:RETURN"
        ));
    }

    Ok(AssetInput {
        name: parts[3].trim().to_string(),
        current_percent: parse_spec_number(spec, parts[2])?,
        target_percent: parse_spec_number(spec, parts[1])?,
        expected_return_percent: parse_spec_number(spec, parts[0])?,
    })
}

fn parse_spec_number(spec: &str, raw: &str) -> Result<f64, String> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| format!("invalid --asset spec '{spec}': '{raw}' is not a number"))
}

fn default_growth_args() -> GrowthArgs {
    GrowthArgs {
        initial_amount: 10_000.0,
        periodic_contribution: 5_000.0,
        periods: 25,
        gross_return: 7.0,
        fee_drag: 2.0,
    }
}

fn default_retirement_args() -> RetirementArgs {
    RetirementArgs {
        current_age: 30,
        retirement_age: 65,
        life_expectancy: 90,
        current_savings: 25_000.0,
        monthly_contribution: 500.0,
        pre_retirement_return: 7.0,
        post_retirement_return: 5.0,
        annual_fee: 1.0,
        inflation: 2.5,
        current_annual_income: 60_000.0,
        income_replacement: 80.0,
    }
}

fn default_compare_args() -> CompareArgs {
    CompareArgs {
        lump_sum: 10_000.0,
        periodic_amount: 500.0,
        periods: 12,
        annual_return: 7.0,
        annual_volatility: 15.0,
        annual_fee: 1.0,
        trials: 500,
        seed: 42,
    }
}

fn default_allocate_args() -> AllocateArgs {
    AllocateArgs {
        risk_tolerance: 5,
        age: 35,
        horizon_years: 20,
        investment_amount: 10_000.0,
        include_international: true,
        include_bonds: true,
        include_reit: false,
        include_commodities: false,
        include_alternatives: false,
    }
}

fn default_rebalance_args() -> RebalanceArgs {
    RebalanceArgs {
        assets: Vec::new(),
        portfolio_value: 100_000.0,
        annual_contribution: 0.0,
        taxable: false,
    }
}

fn default_solve_args() -> SolveArgs {
    SolveArgs {
        retirement: default_retirement_args(),
        target_funding_ratio: 1.0,
        search_min: 0.0,
        search_max: 20_000.0,
        tolerance: 1.0,
        max_iterations: 48,
    }
}

fn default_assets() -> Vec<AssetInput> {
    vec![
        AssetInput {
            name: "US Stocks".to_string(),
            current_percent: 55.0,
            target_percent: 40.0,
            expected_return_percent: 10.0,
        },
        AssetInput {
            name: "International Stocks".to_string(),
            current_percent: 15.0,
            target_percent: 20.0,
            expected_return_percent: 8.5,
        },
        AssetInput {
            name: "Bonds".to_string(),
            current_percent: 25.0,
            target_percent: 30.0,
            expected_return_percent: 4.5,
        },
        AssetInput {
            name: "Cash".to_string(),
            current_percent: 5.0,
            target_percent: 10.0,
            expected_return_percent: 2.0,
        },
    ]
}

fn default_platforms() -> Vec<PlatformFee> {
    vec![
        PlatformFee {
            name: "Self-directed ETF".to_string(),
            annual_fee_percent: 0.25,
        },
        PlatformFee {
            name: "Robo advisor".to_string(),
            annual_fee_percent: 0.75,
        },
        PlatformFee {
            name: "Typical mutual fund".to_string(),
            annual_fee_percent: 2.0,
        },
    ]
}

fn growth_args_from_payload(payload: GrowthPayload) -> GrowthArgs {
    let mut args = default_growth_args();

    if let Some(v) = payload.initial_amount {
        args.initial_amount = v;
    }
    if let Some(v) = payload.periodic_contribution {
        args.periodic_contribution = v;
    }
    if let Some(v) = payload.periods {
        args.periods = v;
    }
    if let Some(v) = payload.gross_return {
        args.gross_return = v;
    }
    if let Some(v) = payload.fee_drag {
        args.fee_drag = v;
    }

    args
}

fn platforms_request_from_payload(payload: PlatformsPayload) -> (GrowthArgs, Vec<PlatformFee>) {
    let args = growth_args_from_payload(payload.growth);
    let platforms = match payload.platforms {
        Some(entries) if !entries.is_empty() => entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| PlatformFee {
                name: entry
                    .name
                    .unwrap_or_else(|| format!("Platform {}", index + 1)),
                annual_fee_percent: entry.annual_fee.unwrap_or(0.0),
            })
            .collect(),
        _ => default_platforms(),
    };
    (args, platforms)
}

fn retirement_args_from_payload(payload: RetirementPayload) -> RetirementArgs {
    let mut args = default_retirement_args();

    if let Some(v) = payload.current_age {
        args.current_age = v;
    }
    if let Some(v) = payload.retirement_age {
        args.retirement_age = v;
    }
    if let Some(v) = payload.life_expectancy {
        args.life_expectancy = v;
    }
    if let Some(v) = payload.current_savings {
        args.current_savings = v;
    }
    if let Some(v) = payload.monthly_contribution {
        args.monthly_contribution = v;
    }
    if let Some(v) = payload.pre_retirement_return {
        args.pre_retirement_return = v;
    }
    if let Some(v) = payload.post_retirement_return {
        args.post_retirement_return = v;
    }
    if let Some(v) = payload.annual_fee {
        args.annual_fee = v;
    }
    if let Some(v) = payload.inflation {
        args.inflation = v;
    }
    if let Some(v) = payload.current_annual_income {
        args.current_annual_income = v;
    }
    if let Some(v) = payload.income_replacement {
        args.income_replacement = v;
    }

    args
}

fn solve_args_from_payload(payload: SolvePayload) -> SolveArgs {
    let mut args = default_solve_args();
    args.retirement = retirement_args_from_payload(payload.retirement);

    if let Some(v) = payload.target_funding_ratio {
        args.target_funding_ratio = v;
    }
    if let Some(v) = payload.search_min {
        args.search_min = v;
    }
    if let Some(v) = payload.search_max {
        args.search_max = v;
    }
    if let Some(v) = payload.tolerance {
        args.tolerance = v;
    }
    if let Some(v) = payload.max_iterations {
        args.max_iterations = v;
    }

    args
}

fn compare_args_from_payload(payload: ComparePayload) -> CompareArgs {
    let mut args = default_compare_args();

    if let Some(v) = payload.lump_sum {
        args.lump_sum = v;
    }
    if let Some(v) = payload.periodic_amount {
        args.periodic_amount = v;
    }
    if let Some(v) = payload.periods {
        args.periods = v;
    }
    if let Some(v) = payload.annual_return {
        args.annual_return = v;
    }
    if let Some(v) = payload.annual_volatility {
        args.annual_volatility = v;
    }
    if let Some(v) = payload.annual_fee {
        args.annual_fee = v;
    }
    if let Some(v) = payload.trials {
        args.trials = v;
    }
    if let Some(v) = payload.seed {
        args.seed = v;
    }

    args
}

fn allocation_args_from_payload(payload: AllocationPayload) -> AllocateArgs {
    let mut args = default_allocate_args();

    if let Some(v) = payload.risk_tolerance {
        args.risk_tolerance = v;
    }
    if let Some(v) = payload.age {
        args.age = v;
    }
    if let Some(v) = payload.horizon_years {
        args.horizon_years = v;
    }
    if let Some(v) = payload.investment_amount {
        args.investment_amount = v;
    }
    if let Some(v) = payload.include_international {
        args.include_international = v;
    }
    if let Some(v) = payload.include_bonds {
        args.include_bonds = v;
    }
    if let Some(v) = payload.include_reit {
        args.include_reit = v;
    }
    if let Some(v) = payload.include_commodities {
        args.include_commodities = v;
    }
    if let Some(v) = payload.include_alternatives {
        args.include_alternatives = v;
    }

    args
}

fn rebalance_request_from_payload(
    payload: RebalancePayload,
) -> Result<RebalancingParameters, String> {
    let assets = match payload.assets {
        Some(entries) => entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| AssetInput {
                name: entry.name.unwrap_or_else(|| format!("Asset {}", index + 1)),
                current_percent: entry.current_percent.unwrap_or(0.0),
                target_percent: entry.target_percent.unwrap_or(0.0),
                expected_return_percent: entry.expected_return.unwrap_or(0.0),
            })
            .collect(),
        None => default_assets(),
    };

    let defaults = default_rebalance_args();
    build_rebalancing_parameters(
        assets,
        payload.portfolio_value.unwrap_or(defaults.portfolio_value),
        payload.taxable.unwrap_or(defaults.taxable),
        payload
            .annual_contribution
            .unwrap_or(defaults.annual_contribution),
    )
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/styles.css", get(styles_handler))
        .route("/app.js", get(app_js_handler))
        .route(
            "/api/growth",
            get(growth_get_handler).post(growth_post_handler),
        )
        .route("/api/growth/platforms", post(platforms_post_handler))
        .route(
            "/api/retirement",
            get(retirement_get_handler).post(retirement_post_handler),
        )
        .route(
            "/api/retirement/required-contribution",
            post(solve_post_handler),
        )
        .route(
            "/api/compare",
            get(compare_get_handler).post(compare_post_handler),
        )
        .route(
            "/api/allocation",
            get(allocation_get_handler).post(allocation_post_handler),
        )
        .route("/api/rebalance", post(rebalance_post_handler))
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("FourStar HTTP API listening on http://{addr}");
    tracing::info!("Local access: http://127.0.0.1:{port}/");

    axum::serve(listener, app).await
}

async fn index_handler() -> impl IntoResponse {
    with_cache_control(Html(INDEX_HTML))
}

async fn styles_handler() -> impl IntoResponse {
    with_cache_control((
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLES_CSS,
    ))
}

async fn app_js_handler() -> impl IntoResponse {
    with_cache_control((
        [(
            header::CONTENT_TYPE,
            "application/javascript; charset=utf-8",
        )],
        APP_JS,
    ))
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn growth_get_handler(Query(payload): Query<GrowthPayload>) -> Response {
    growth_handler_impl(payload).await
}

async fn growth_post_handler(Json(payload): Json<GrowthPayload>) -> Response {
    growth_handler_impl(payload).await
}

async fn growth_handler_impl(payload: GrowthPayload) -> Response {
    let args = growth_args_from_payload(payload);
    match growth_response(&args) {
        Ok(body) => json_response(StatusCode::OK, body),
        Err(msg) => error_response(StatusCode::BAD_REQUEST, &msg),
    }
}

async fn platforms_post_handler(Json(payload): Json<PlatformsPayload>) -> Response {
    let (args, platforms) = platforms_request_from_payload(payload);
    match platforms_response(&args, &platforms) {
        Ok(body) => json_response(StatusCode::OK, body),
        Err(msg) => error_response(StatusCode::BAD_REQUEST, &msg),
    }
}

async fn retirement_get_handler(Query(payload): Query<RetirementPayload>) -> Response {
    retirement_handler_impl(payload).await
}

async fn retirement_post_handler(Json(payload): Json<RetirementPayload>) -> Response {
    retirement_handler_impl(payload).await
}

async fn retirement_handler_impl(payload: RetirementPayload) -> Response {
    let args = retirement_args_from_payload(payload);
    match retirement_response(&args) {
        Ok(body) => json_response(StatusCode::OK, body),
        Err(msg) => error_response(StatusCode::BAD_REQUEST, &msg),
    }
}

async fn solve_post_handler(Json(payload): Json<SolvePayload>) -> Response {
    let args = solve_args_from_payload(payload);
    match solve_response(&args) {
        Ok(body) => json_response(StatusCode::OK, body),
        Err(msg) => error_response(StatusCode::BAD_REQUEST, &msg),
    }
}

async fn compare_get_handler(Query(payload): Query<ComparePayload>) -> Response {
    compare_handler_impl(payload).await
}

async fn compare_post_handler(Json(payload): Json<ComparePayload>) -> Response {
    compare_handler_impl(payload).await
}

async fn compare_handler_impl(payload: ComparePayload) -> Response {
    let args = compare_args_from_payload(payload);
    match compare_response(&args) {
        Ok(body) => json_response(StatusCode::OK, body),
        Err(msg) => error_response(StatusCode::BAD_REQUEST, &msg),
    }
}

async fn allocation_get_handler(Query(payload): Query<AllocationPayload>) -> Response {
    allocation_handler_impl(payload).await
}

async fn allocation_post_handler(Json(payload): Json<AllocationPayload>) -> Response {
    allocation_handler_impl(payload).await
}

async fn allocation_handler_impl(payload: AllocationPayload) -> Response {
    let args = allocation_args_from_payload(payload);
    match allocation_response(&args) {
        Ok(body) => json_response(StatusCode::OK, body),
        Err(msg) => error_response(StatusCode::BAD_REQUEST, &msg),
    }
}

async fn rebalance_post_handler(Json(payload): Json<RebalancePayload>) -> Response {
    match rebalance_request_from_payload(payload) {
        Ok(params) => json_response(StatusCode::OK, plan_rebalancing(&params)),
        Err(msg) => error_response(StatusCode::BAD_REQUEST, &msg),
    }
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    tracing::debug!("request rejected with {status}: {msg}");
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn growth_payload_parses_web_keys() {
        let payload = serde_json::from_str::<GrowthPayload>(
            r#"{
              "initialAmount": 20000,
              "periodicContribution": 1000,
              "periods": 10,
              "grossReturn": 8,
              "feeDrag": 1.5
            }"#,
        )
        .expect("payload should parse");
        let args = growth_args_from_payload(payload);
        let params = build_growth_parameters(&args).expect("valid parameters");

        assert_approx(params.initial_amount, 20_000.0);
        assert_approx(params.periodic_contribution, 1_000.0);
        assert_eq!(params.periods, 10);
        assert_approx(params.gross_return_percent, 8.0);
        assert_approx(params.fee_drag_percent, 1.5);
    }

    #[test]
    fn growth_payload_falls_back_to_defaults() {
        let payload = serde_json::from_str::<GrowthPayload>("{}").expect("payload should parse");
        let args = growth_args_from_payload(payload);

        assert_approx(args.initial_amount, 10_000.0);
        assert_approx(args.periodic_contribution, 5_000.0);
        assert_eq!(args.periods, 25);
        assert_approx(args.gross_return, 7.0);
        assert_approx(args.fee_drag, 2.0);
    }

    #[test]
    fn build_growth_parameters_rejects_negative_initial_amount() {
        let mut args = default_growth_args();
        args.initial_amount = -1.0;

        let err = build_growth_parameters(&args).expect_err("must reject negative amount");
        assert!(err.contains("--initial-amount"));
    }

    #[test]
    fn build_growth_parameters_rejects_too_many_periods() {
        let mut args = default_growth_args();
        args.periods = 121;

        let err = build_growth_parameters(&args).expect_err("must reject periods > 120");
        assert!(err.contains("--periods"));
    }

    #[test]
    fn build_growth_parameters_rejects_net_return_below_floor() {
        let mut args = default_growth_args();
        args.gross_return = -80.0;
        args.fee_drag = 30.0;

        let err = build_growth_parameters(&args).expect_err("must reject net return < -100");
        assert!(err.contains("--gross-return"));
    }

    #[test]
    fn growth_response_serialization_contains_expected_fields() {
        let response = growth_response(&default_growth_args()).expect("valid response");
        assert_eq!(response.points.len(), 26);

        let json = serde_json::to_string(&response).expect("response should serialize");
        assert!(json.contains("\"points\""));
        assert!(json.contains("\"summary\""));
        assert!(json.contains("\"valueWithFees\""));
        assert!(json.contains("\"cumulativeContributions\""));
        assert!(json.contains("\"tRexScore\""));
    }

    #[test]
    fn platforms_payload_parses_entries_and_names_missing_ones() {
        let payload = serde_json::from_str::<PlatformsPayload>(
            r#"{
              "initialAmount": 5000,
              "periods": 5,
              "platforms": [
                {"name": "Discount broker", "annualFee": 0.3},
                {"annualFee": 1.2}
              ]
            }"#,
        )
        .expect("payload should parse");
        let (args, platforms) = platforms_request_from_payload(payload);

        assert_approx(args.initial_amount, 5_000.0);
        assert_eq!(args.periods, 5);
        assert_eq!(platforms.len(), 2);
        assert_eq!(platforms[0].name, "Discount broker");
        assert_approx(platforms[0].annual_fee_percent, 0.3);
        assert_eq!(platforms[1].name, "Platform 2");
        assert_approx(platforms[1].annual_fee_percent, 1.2);
    }

    #[test]
    fn platforms_payload_defaults_to_built_in_lineup() {
        let payload = serde_json::from_str::<PlatformsPayload>("{}").expect("payload should parse");
        let (_, platforms) = platforms_request_from_payload(payload);

        assert_eq!(platforms.len(), 3);
        assert!(platforms.iter().any(|p| p.name == "Typical mutual fund"));
    }

    #[test]
    fn platforms_response_preserves_order_and_ranks_by_fee() {
        let args = default_growth_args();
        let platforms = vec![
            PlatformFee {
                name: "Cheap".to_string(),
                annual_fee_percent: 0.25,
            },
            PlatformFee {
                name: "Dear".to_string(),
                annual_fee_percent: 2.0,
            },
        ];

        let response = platforms_response(&args, &platforms).expect("valid response");
        assert_eq!(response.platforms[0].name, "Cheap");
        assert!(
            response.platforms[0].summary.final_value_with_fees
                > response.platforms[1].summary.final_value_with_fees
        );
    }

    #[test]
    fn platforms_response_rejects_out_of_range_fee() {
        let args = default_growth_args();
        let platforms = vec![PlatformFee {
            name: "Bad".to_string(),
            annual_fee_percent: 150.0,
        }];

        let err = platforms_response(&args, &platforms).expect_err("must reject fee > 100");
        assert!(err.contains("Bad"));
    }

    #[test]
    fn retirement_payload_parses_web_keys() {
        let payload = serde_json::from_str::<RetirementPayload>(
            r#"{
              "currentAge": 40,
              "retirementAge": 67,
              "lifeExpectancy": 92,
              "currentSavings": 100000,
              "monthlyContribution": 750,
              "preRetirementReturn": 6.5,
              "postRetirementReturn": 4.5,
              "annualFee": 0.8,
              "inflation": 2,
              "currentAnnualIncome": 90000,
              "incomeReplacement": 70
            }"#,
        )
        .expect("payload should parse");
        let args = retirement_args_from_payload(payload);
        let params = build_retirement_parameters(&args).expect("valid parameters");

        assert_eq!(params.current_age, 40);
        assert_eq!(params.retirement_age, 67);
        assert_eq!(params.life_expectancy, 92);
        assert_approx(params.current_savings, 100_000.0);
        assert_approx(params.monthly_contribution, 750.0);
        assert_approx(params.pre_retirement_return_percent, 6.5);
        assert_approx(params.post_retirement_return_percent, 4.5);
        assert_approx(params.annual_fee_percent, 0.8);
        assert_approx(params.inflation_percent, 2.0);
        assert_approx(params.current_annual_income, 90_000.0);
        assert_approx(params.income_replacement_percent, 70.0);
    }

    #[test]
    fn build_retirement_parameters_rejects_inverted_ages() {
        let mut args = default_retirement_args();
        args.current_age = 40;
        args.retirement_age = 30;

        let err = build_retirement_parameters(&args).expect_err("must reject inverted ages");
        assert!(err.contains("--retirement-age"));
    }

    #[test]
    fn build_retirement_parameters_rejects_life_expectancy_at_retirement() {
        let mut args = default_retirement_args();
        args.life_expectancy = args.retirement_age;

        let err = build_retirement_parameters(&args).expect_err("must reject empty distribution");
        assert!(err.contains("--life-expectancy"));
    }

    #[test]
    fn build_retirement_parameters_rejects_replacement_out_of_range() {
        let mut args = default_retirement_args();
        args.income_replacement = 250.0;

        let err = build_retirement_parameters(&args).expect_err("must reject replacement > 200");
        assert!(err.contains("--income-replacement"));
    }

    #[test]
    fn retirement_response_serialization_contains_expected_fields() {
        let plan = retirement_response(&default_retirement_args()).expect("valid response");
        let json = serde_json::to_string(&plan).expect("response should serialize");

        assert!(json.contains("\"balanceAtRetirement\""));
        assert!(json.contains("\"requiredMonthlyIncome\""));
        assert!(json.contains("\"monthlyIncomeGap\""));
        assert!(json.contains("\"onTrack\""));
        assert!(json.contains("\"years\""));
        assert!(json.contains("\"accumulation\""));
        assert!(json.contains("\"distribution\""));
    }

    #[test]
    fn compare_payload_parses_web_keys() {
        let payload = serde_json::from_str::<ComparePayload>(
            r#"{
              "lumpSum": 20000,
              "periodicAmount": 800,
              "periods": 24,
              "annualReturn": 6,
              "annualVolatility": 12,
              "annualFee": 0.5,
              "trials": 64,
              "seed": 7
            }"#,
        )
        .expect("payload should parse");
        let args = compare_args_from_payload(payload);
        let params = build_comparison_parameters(&args).expect("valid parameters");

        assert_approx(params.lump_sum_amount, 20_000.0);
        assert_approx(params.periodic_amount, 800.0);
        assert_eq!(params.period_count, 24);
        assert_approx(params.annual_return_percent, 6.0);
        assert_approx(params.annual_volatility_percent, 12.0);
        assert_approx(params.annual_fee_percent, 0.5);
        assert_eq!(params.trial_count, 64);
        assert_eq!(params.seed, 7);
    }

    #[test]
    fn build_comparison_parameters_rejects_zero_trials() {
        let mut args = default_compare_args();
        args.trials = 0;

        let err = build_comparison_parameters(&args).expect_err("must reject zero trials");
        assert!(err.contains("--trials"));
    }

    #[test]
    fn build_comparison_parameters_rejects_too_many_trials() {
        let mut args = default_compare_args();
        args.trials = 10_001;

        let err = build_comparison_parameters(&args).expect_err("must reject trials > 10000");
        assert!(err.contains("--trials"));
    }

    #[test]
    fn build_comparison_parameters_rejects_non_positive_lump_sum() {
        let mut args = default_compare_args();
        args.lump_sum = 0.0;

        let err = build_comparison_parameters(&args).expect_err("must reject zero lump sum");
        assert!(err.contains("--lump-sum"));
    }

    #[test]
    fn build_comparison_parameters_rejects_too_many_periods() {
        let mut args = default_compare_args();
        args.periods = 601;

        let err = build_comparison_parameters(&args).expect_err("must reject periods > 600");
        assert!(err.contains("--periods"));
    }

    #[test]
    fn compare_response_win_probabilities_sum_to_100() {
        let mut args = default_compare_args();
        args.trials = 64;

        let response = compare_response(&args).expect("valid response");
        assert_approx(
            response.dca_win_probability_percent + response.lump_sum_win_probability_percent,
            100.0,
        );
        assert_eq!(response.dca.end_values.len(), 64);
        assert_eq!(response.lump_sum.end_values.len(), 64);
    }

    #[test]
    fn compare_response_serialization_contains_expected_fields() {
        let mut args = default_compare_args();
        args.trials = 8;

        let response = compare_response(&args).expect("valid response");
        let json = serde_json::to_string(&response).expect("response should serialize");

        assert!(json.contains("\"dca\""));
        assert!(json.contains("\"lumpSum\""));
        assert!(json.contains("\"dcaWinProbabilityPercent\""));
        assert!(json.contains("\"sampledPaths\""));
        assert!(json.contains("\"statistics\""));
        assert!(json.contains("\"effectivePeriodicAmount\""));
        assert!(json.contains("\"contributionAdjusted\""));
    }

    #[test]
    fn allocation_payload_parses_web_keys_and_flags() {
        let payload = serde_json::from_str::<AllocationPayload>(
            r#"{
              "riskTolerance": 8,
              "age": 30,
              "horizonYears": 25,
              "investmentAmount": 50000,
              "includeBonds": false,
              "includeReit": true
            }"#,
        )
        .expect("payload should parse");
        let args = allocation_args_from_payload(payload);
        let params = build_allocation_parameters(&args).expect("valid parameters");

        assert_eq!(params.risk_tolerance, 8);
        assert_eq!(params.age, 30);
        assert_eq!(params.investment_horizon_years, 25);
        assert_approx(params.investment_amount, 50_000.0);
        assert!(params.include_international);
        assert!(!params.include_bonds);
        assert!(params.include_reit);
        assert!(!params.include_commodities);
    }

    #[test]
    fn build_allocation_parameters_rejects_risk_out_of_range() {
        for risk in [0, 11] {
            let mut args = default_allocate_args();
            args.risk_tolerance = risk;

            let err = build_allocation_parameters(&args).expect_err("must reject invalid risk");
            assert!(err.contains("--risk-tolerance"));
        }
    }

    #[test]
    fn build_allocation_parameters_rejects_zero_horizon() {
        let mut args = default_allocate_args();
        args.horizon_years = 0;

        let err = build_allocation_parameters(&args).expect_err("must reject zero horizon");
        assert!(err.contains("--horizon-years"));
    }

    #[test]
    fn allocation_response_percentages_sum_to_100() {
        let response = allocation_response(&default_allocate_args()).expect("valid response");
        let total: f64 = response.slices.iter().map(|slice| slice.percent).sum();
        assert!(
            (total - 100.0).abs() <= 0.1 + 1e-9,
            "percentages sum to {total}"
        );

        let json = serde_json::to_string(&response).expect("response should serialize");
        assert!(json.contains("\"assetClass\""));
        assert!(json.contains("\"domestic-stocks\""));
        assert!(json.contains("\"dollarAmount\""));
        assert!(json.contains("\"expectedReturnPercent\""));
        assert!(json.contains("\"riskPercent\""));
    }

    #[test]
    fn parse_asset_spec_reads_four_fields() {
        let asset = parse_asset_spec("US Stocks:55:40:10").expect("valid spec");

        assert_eq!(asset.name, "US Stocks");
        assert_approx(asset.current_percent, 55.0);
        assert_approx(asset.target_percent, 40.0);
        assert_approx(asset.expected_return_percent, 10.0);
    }

    #[test]
    fn parse_asset_spec_keeps_colons_in_the_name() {
        let asset = parse_asset_spec("Bonds: Core:30:40:4.5").expect("valid spec");

        assert_eq!(asset.name, "Bonds: Core");
        assert_approx(asset.current_percent, 30.0);
        assert_approx(asset.target_percent, 40.0);
        assert_approx(asset.expected_return_percent, 4.5);
    }

    #[test]
    fn parse_asset_spec_rejects_short_and_non_numeric_specs() {
        assert!(parse_asset_spec("OnlyName:1:2").is_err());
        assert!(parse_asset_spec("Stocks:abc:40:10").is_err());
    }

    #[test]
    fn rebalance_payload_parses_entries() {
        let payload = serde_json::from_str::<RebalancePayload>(
            r#"{
              "portfolioValue": 50000,
              "taxable": true,
              "annualContribution": 1200,
              "assets": [
                {"name": "Equity", "currentPercent": 70, "targetPercent": 60, "expectedReturn": 9},
                {"currentPercent": 30, "targetPercent": 40, "expectedReturn": 4}
              ]
            }"#,
        )
        .expect("payload should parse");
        let params = rebalance_request_from_payload(payload).expect("valid parameters");

        assert_approx(params.portfolio_value, 50_000.0);
        assert!(params.taxable);
        assert_approx(params.annual_contribution, 1_200.0);
        assert_eq!(params.assets.len(), 2);
        assert_eq!(params.assets[0].name, "Equity");
        assert_eq!(params.assets[1].name, "Asset 2");
        assert_approx(params.assets[1].target_percent, 40.0);
    }

    #[test]
    fn rebalance_payload_rejects_empty_asset_list() {
        let payload = serde_json::from_str::<RebalancePayload>(r#"{"assets": []}"#)
            .expect("payload should parse");

        let err = rebalance_request_from_payload(payload).expect_err("must reject empty list");
        assert!(err.contains("asset"));
    }

    #[test]
    fn rebalance_payload_defaults_assets_when_omitted() {
        let payload = serde_json::from_str::<RebalancePayload>("{}").expect("payload should parse");
        let params = rebalance_request_from_payload(payload).expect("valid parameters");

        assert_eq!(params.assets.len(), 4);
        assert_approx(params.portfolio_value, 100_000.0);
        assert!(!params.taxable);
    }

    #[test]
    fn rebalance_response_uses_default_assets_without_specs() {
        let plan = rebalance_response(&default_rebalance_args()).expect("valid response");

        assert_eq!(plan.actions.len(), 4);
        assert_approx(plan.drift_percent, 15.0);
    }

    #[test]
    fn rebalance_response_rejects_malformed_spec() {
        let mut args = default_rebalance_args();
        args.assets = vec!["broken".to_string()];

        let err = rebalance_response(&args).expect_err("must reject malformed spec");
        assert!(err.contains("--asset"));
    }

    #[test]
    fn build_rebalancing_parameters_rejects_too_many_assets() {
        let assets: Vec<AssetInput> = (0..21)
            .map(|i| AssetInput {
                name: format!("Asset {i}"),
                current_percent: 1.0,
                target_percent: 1.0,
                expected_return_percent: 5.0,
            })
            .collect();

        let err = build_rebalancing_parameters(assets, 1_000.0, false, 0.0)
            .expect_err("must reject > 20 assets");
        assert!(err.contains("20"));
    }

    #[test]
    fn build_rebalancing_parameters_rejects_blank_names() {
        let assets = vec![AssetInput {
            name: "   ".to_string(),
            current_percent: 50.0,
            target_percent: 50.0,
            expected_return_percent: 5.0,
        }];

        let err = build_rebalancing_parameters(assets, 1_000.0, false, 0.0)
            .expect_err("must reject blank names");
        assert!(err.contains("names"));
    }

    #[test]
    fn solve_payload_parses_flattened_retirement_keys() {
        let payload = serde_json::from_str::<SolvePayload>(
            r#"{
              "currentAge": 40,
              "retirementAge": 60,
              "lifeExpectancy": 85,
              "targetFundingRatio": 1.2,
              "searchMax": 5000,
              "maxIterations": 10
            }"#,
        )
        .expect("payload should parse");
        let args = solve_args_from_payload(payload);

        assert_eq!(args.retirement.current_age, 40);
        assert_eq!(args.retirement.retirement_age, 60);
        assert_eq!(args.retirement.life_expectancy, 85);
        assert_approx(args.target_funding_ratio, 1.2);
        assert_approx(args.search_max, 5_000.0);
        assert_eq!(args.max_iterations, 10);
        assert_approx(args.tolerance, 1.0);
    }

    #[test]
    fn solve_response_converges_with_default_inputs() {
        let result = solve_response(&default_solve_args()).expect("valid response");

        assert!(result.feasible);
        assert!(result.converged);
        let solved = result
            .solved_monthly_contribution
            .expect("solved contribution");
        assert!(solved > 0.0);
        let achieved = result.achieved_funding_ratio.expect("achieved ratio");
        assert!(achieved + 1e-9 >= 1.0);
    }

    #[test]
    fn solve_response_propagates_config_validation_errors() {
        let mut args = default_solve_args();
        args.max_iterations = 0;

        let err = solve_response(&args).expect_err("must reject zero iterations");
        assert!(err.contains("max_iterations"));
    }

    #[test]
    fn solve_response_rejects_invalid_retirement_inputs() {
        let mut args = default_solve_args();
        args.retirement.retirement_age = args.retirement.current_age;

        let err = solve_response(&args).expect_err("must reject equal ages");
        assert!(err.contains("--retirement-age"));
    }

    #[test]
    fn solver_result_serialization_contains_expected_fields() {
        let mut args = default_solve_args();
        args.max_iterations = 4;

        let result = solve_response(&args).expect("valid response");
        let json = serde_json::to_string(&result).expect("response should serialize");

        assert!(json.contains("\"targetFundingRatio\""));
        assert!(json.contains("\"solvedMonthlyContribution\""));
        assert!(json.contains("\"achievedFundingRatio\""));
        assert!(json.contains("\"iterations\""));
        assert!(json.contains("\"candidateContribution\""));
        assert!(json.contains("\"message\""));
    }
}
