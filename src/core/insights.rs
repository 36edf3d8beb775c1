use serde::Serialize;

use super::engine::project_with_policy;
use super::solver::{GoalSolveConfig, solve_required_contribution};
use super::types::{ProjectionInput, ProjectionResult, ScenarioPolicy};

const OPTIMISM_TARGET_RATE: f64 = 0.08;
const OPTIMISM_UPSIDE_SHARE: f64 = 0.15;
const EMERGENCY_FUND_MONTHS: u32 = 6;

/// Display-only figures derived from a projection. Nothing here feeds back
/// into the simulated series.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Insights {
    pub headline: String,
    pub procrastination_tax: String,
    pub optimized_plan: Option<OptimizedPlan>,
    pub potential: PotentialInsight,
    pub faster_goal: Option<FasterGoal>,
}

/// What the run would look like with the optimization bonus folded into the
/// nominal return.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizedPlan {
    pub bonus_rate: f64,
    pub potential_return: f64,
    pub potential_final_balance: i64,
    pub additional_wealth: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum PotentialInsight {
    #[serde(rename_all = "camelCase")]
    OptimismUpside { target_rate: f64, additional: i64 },
    #[serde(rename_all = "camelCase")]
    HighGrowth { emergency_fund_months: u32 },
}

impl PotentialInsight {
    pub fn message(&self) -> String {
        match self {
            PotentialInsight::OptimismUpside {
                target_rate,
                additional,
            } => format!(
                "Increasing your market optimism to {}% adds another ${} to your future.",
                format_percent(*target_rate),
                group_thousands(*additional)
            ),
            PotentialInsight::HighGrowth {
                emergency_fund_months,
            } => format!(
                "You're on a high-growth path. Ensure you have {emergency_fund_months} months of \
                 emergency cash to stay resilient."
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FasterGoal {
    pub current_goal_year: u32,
    pub target_year: u32,
    pub required_monthly_contribution: f64,
    pub additional_monthly_contribution: f64,
}

pub fn derive_insights(
    input: ProjectionInput,
    policy: &ScenarioPolicy,
    result: &ProjectionResult,
) -> Insights {
    Insights {
        headline: format!(
            "Expected wealth after {} years is ${}, adjusted for {}% inflation.",
            input.years,
            group_thousands(result.final_balance),
            format_percent(input.inflation_rate)
        ),
        procrastination_tax: format!(
            "Waiting {} years deletes ${}",
            policy.delay_years,
            group_thousands(result.cost_of_delay)
        ),
        optimized_plan: input
            .optimization_enabled
            .then(|| optimized_plan(input, policy, result)),
        potential: potential_insight(input, result),
        faster_goal: faster_goal(input, policy, result),
    }
}

fn optimized_plan(
    input: ProjectionInput,
    policy: &ScenarioPolicy,
    result: &ProjectionResult,
) -> OptimizedPlan {
    let potential_return = input.annual_return + policy.optimization_bonus;
    let boosted = project_with_policy(
        ProjectionInput {
            annual_return: potential_return,
            ..input
        },
        policy,
    );
    OptimizedPlan {
        bonus_rate: policy.optimization_bonus,
        potential_return,
        potential_final_balance: boosted.final_balance,
        additional_wealth: boosted.final_balance - result.final_balance,
    }
}

fn potential_insight(input: ProjectionInput, result: &ProjectionResult) -> PotentialInsight {
    if input.annual_return < OPTIMISM_TARGET_RATE {
        PotentialInsight::OptimismUpside {
            target_rate: OPTIMISM_TARGET_RATE,
            additional: (result.final_balance as f64 * OPTIMISM_UPSIDE_SHARE).round() as i64,
        }
    } else {
        PotentialInsight::HighGrowth {
            emergency_fund_months: EMERGENCY_FUND_MONTHS,
        }
    }
}

fn faster_goal(
    input: ProjectionInput,
    policy: &ScenarioPolicy,
    result: &ProjectionResult,
) -> Option<FasterGoal> {
    let current_goal_year = result.goal_year?;
    if current_goal_year <= policy.faster_goal_years {
        return None;
    }
    let target_year = current_goal_year - policy.faster_goal_years;
    let config = GoalSolveConfig {
        target_year,
        search_min: input.monthly_contribution,
        search_max: input.monthly_contribution + policy.goal_amount.max(1.0),
        tolerance: 0.5,
        max_iterations: 64,
    };
    let solved = solve_required_contribution(input, policy, config).ok()?;
    let required = solved.solved_monthly_contribution?;
    Some(FasterGoal {
        current_goal_year,
        target_year,
        required_monthly_contribution: required,
        additional_monthly_contribution: required - input.monthly_contribution,
    })
}

/// Fraction to a percentage with at most two decimals, e.g. 0.025 -> "2.5".
fn format_percent(rate: f64) -> String {
    let pct = (rate * 10_000.0).round() / 100.0;
    format!("{pct}")
}

fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        grouped.push('-');
    }
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
