mod engine;
mod insights;
mod solver;
mod types;

pub use engine::{project, project_with_policy};
pub use insights::{FasterGoal, Insights, OptimizedPlan, PotentialInsight, derive_insights};
pub use solver::{
    GoalSolveConfig, GoalSolveIteration, GoalSolveResult, solve_required_contribution,
};
pub use types::{ProjectionInput, ProjectionResult, ScenarioPolicy, YearPoint};
