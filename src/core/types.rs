use serde::Serialize;

#[derive(Debug, Clone, Copy)]
pub struct GrowthParameters {
    pub initial_amount: f64,
    pub periodic_contribution: f64,
    pub periods: u32,
    pub gross_return_percent: f64,
    pub fee_drag_percent: f64,
}

#[derive(Debug, Clone)]
pub struct PlatformFee {
    pub name: String,
    pub annual_fee_percent: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthPoint {
    pub period: u32,
    pub value_with_fees: f64,
    pub value_without_fees: f64,
    pub cumulative_contributions: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthSeries {
    pub points: Vec<GrowthPoint>,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeSummary {
    pub final_value_with_fees: f64,
    pub final_value_without_fees: f64,
    pub total_contributions: f64,
    pub gross_growth: f64,
    pub total_fee_cost: f64,
    pub fee_impact_percent: f64,
    pub t_rex_score: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformOutcome {
    pub name: String,
    pub annual_fee_percent: f64,
    pub summary: FeeSummary,
}

#[derive(Debug, Clone, Copy)]
pub struct RetirementParameters {
    pub current_age: u32,
    pub retirement_age: u32,
    pub life_expectancy: u32,
    pub current_savings: f64,
    pub monthly_contribution: f64,
    pub pre_retirement_return_percent: f64,
    pub post_retirement_return_percent: f64,
    pub annual_fee_percent: f64,
    pub inflation_percent: f64,
    pub current_annual_income: f64,
    pub income_replacement_percent: f64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanPhase {
    Accumulation,
    Distribution,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetirementYearPoint {
    pub age: u32,
    pub phase: PlanPhase,
    pub balance: f64,
    pub contribution: f64,
    pub withdrawal: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetirementPlan {
    pub balance_at_retirement: f64,
    pub ending_balance: f64,
    pub required_monthly_income: f64,
    pub average_monthly_withdrawal: f64,
    pub monthly_income_gap: f64,
    pub on_track: bool,
    pub years: Vec<RetirementYearPoint>,
}

#[derive(Debug, Clone, Copy)]
pub struct ComparisonParameters {
    pub lump_sum_amount: f64,
    pub periodic_amount: f64,
    pub period_count: u32,
    pub annual_return_percent: f64,
    pub annual_volatility_percent: f64,
    pub annual_fee_percent: f64,
    pub trial_count: u32,
    pub seed: u64,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStatistics {
    pub average: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyOutcome {
    pub end_values: Vec<f64>,
    pub sampled_paths: Vec<Vec<f64>>,
    pub statistics: RunStatistics,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyComparison {
    pub dca: StrategyOutcome,
    pub lump_sum: StrategyOutcome,
    pub dca_win_probability_percent: f64,
    pub lump_sum_win_probability_percent: f64,
    pub effective_periodic_amount: f64,
    pub contribution_adjusted: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct AllocationParameters {
    pub risk_tolerance: u32,
    pub age: u32,
    pub investment_horizon_years: u32,
    pub investment_amount: f64,
    pub include_international: bool,
    pub include_bonds: bool,
    pub include_reit: bool,
    pub include_commodities: bool,
    pub include_alternatives: bool,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssetClass {
    DomesticStocks,
    InternationalStocks,
    DomesticBonds,
    InternationalBonds,
    Reits,
    Commodities,
    Alternatives,
    Cash,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationSlice {
    pub asset_class: AssetClass,
    pub label: &'static str,
    pub percent: f64,
    pub dollar_amount: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationResult {
    pub slices: Vec<AllocationSlice>,
    pub expected_return_percent: f64,
    pub risk_percent: f64,
}

#[derive(Debug, Clone)]
pub struct AssetInput {
    pub name: String,
    pub current_percent: f64,
    pub target_percent: f64,
    pub expected_return_percent: f64,
}

#[derive(Debug, Clone)]
pub struct RebalancingParameters {
    pub assets: Vec<AssetInput>,
    pub portfolio_value: f64,
    pub taxable: bool,
    pub annual_contribution: f64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Buy,
    Sell,
    Hold,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RebalancingAction {
    pub asset_name: String,
    pub current_value: f64,
    pub target_value: f64,
    pub delta: f64,
    pub action: ActionKind,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FiveYearProjection {
    pub rebalanced: Vec<f64>,
    pub current: Vec<f64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RebalancingPlan {
    pub actions: Vec<RebalancingAction>,
    pub drift_percent: f64,
    pub estimated_tax_impact: f64,
    pub projection: FiveYearProjection,
}

#[derive(Debug, Clone, Copy)]
pub struct SolverConfig {
    pub target_funding_ratio: f64,
    pub search_min: f64,
    pub search_max: f64,
    pub tolerance: f64,
    pub max_iterations: u32,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolverIteration {
    pub iteration: u32,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub candidate_contribution: f64,
    pub funding_ratio: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolverResult {
    pub target_funding_ratio: f64,
    pub search_min: f64,
    pub search_max: f64,
    pub tolerance: f64,
    pub max_iterations: u32,
    pub solved_monthly_contribution: Option<f64>,
    pub achieved_funding_ratio: Option<f64>,
    pub converged: bool,
    pub feasible: bool,
    pub message: String,
    pub iterations: Vec<SolverIteration>,
}
