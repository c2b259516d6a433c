mod allocation;
mod growth;
mod montecarlo;
mod rebalance;
mod retirement;
mod solver;
mod types;

pub use allocation::optimize_allocation;
pub use growth::{compare_platforms, project, summarize};
pub use montecarlo::{UniformSource, Xorshift64, compare_strategies, standard_normal};
pub use rebalance::plan_rebalancing;
pub use retirement::plan_retirement;
pub use solver::solve_required_contribution;
pub use types::{
    ActionKind, AllocationParameters, AllocationResult, AllocationSlice, AssetClass, AssetInput,
    ComparisonParameters, FeeSummary, FiveYearProjection, GrowthParameters, GrowthPoint,
    GrowthSeries, PlanPhase, PlatformFee, PlatformOutcome, RebalancingAction,
    RebalancingParameters, RebalancingPlan, RetirementParameters, RetirementPlan,
    RetirementYearPoint, RunStatistics, SolverConfig, SolverIteration, SolverResult,
    StrategyComparison, StrategyOutcome,
};
