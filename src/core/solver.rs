use serde::Serialize;

use super::engine::project_with_policy;
use super::types::{ProjectionInput, ScenarioPolicy};
use crate::error::SandboxError;

#[derive(Debug, Clone, Copy)]
pub struct GoalSolveConfig {
    pub target_year: u32,
    pub search_min: f64,
    pub search_max: f64,
    pub tolerance: f64,
    pub max_iterations: u32,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalSolveIteration {
    pub iteration: u32,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub candidate_value: f64,
    pub goal_reached: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalSolveResult {
    pub target_year: u32,
    pub goal_amount: f64,
    pub search_min: f64,
    pub search_max: f64,
    pub tolerance: f64,
    pub max_iterations: u32,
    pub solved_monthly_contribution: Option<f64>,
    pub achieved_goal_year: Option<u32>,
    pub iterations: Vec<GoalSolveIteration>,
    pub converged: bool,
    pub feasible: bool,
    pub message: String,
}

/// Finds the smallest monthly contribution that reaches the policy goal at or
/// before `config.target_year`. Relies on the balance being non-decreasing in
/// the contribution, which holds while `1 + real_rate > 0`.
pub fn solve_required_contribution(
    input: ProjectionInput,
    policy: &ScenarioPolicy,
    config: GoalSolveConfig,
) -> Result<GoalSolveResult, SandboxError> {
    validate_config(input, config)?;

    let mut iterations = Vec::with_capacity(config.max_iterations as usize);
    let mut solved_value = None;
    let mut converged = false;
    let feasible;
    let message;

    if evaluate_candidate(input, policy, config, config.search_min).is_some() {
        solved_value = Some(config.search_min);
        converged = true;
        feasible = true;
        message = "Already reaches the goal at the lower contribution bound.".to_string();
    } else if evaluate_candidate(input, policy, config, config.search_max).is_none() {
        feasible = false;
        message = "No contribution within the search bounds reaches the goal in time.".to_string();
    } else {
        let mut lo = config.search_min;
        let mut hi = config.search_max;
        let mut it = 0;
        while it < config.max_iterations {
            it += 1;
            let mid = (lo + hi) * 0.5;
            let goal_reached = evaluate_candidate(input, policy, config, mid).is_some();
            iterations.push(GoalSolveIteration {
                iteration: it,
                lower_bound: lo,
                upper_bound: hi,
                candidate_value: mid,
                goal_reached,
            });

            if goal_reached {
                hi = mid;
            } else {
                lo = mid;
            }

            if (hi - lo).abs() <= config.tolerance {
                converged = true;
                break;
            }
        }
        solved_value = Some(hi);
        feasible = true;
        message = if converged {
            "Solved required monthly contribution.".to_string()
        } else {
            "Reached max iterations before tolerance was met; returning best estimate."
                .to_string()
        };
    }

    let achieved_goal_year =
        solved_value.and_then(|value| evaluate_candidate(input, policy, config, value));

    Ok(GoalSolveResult {
        target_year: config.target_year,
        goal_amount: policy.goal_amount,
        search_min: config.search_min,
        search_max: config.search_max,
        tolerance: config.tolerance,
        max_iterations: config.max_iterations,
        solved_monthly_contribution: solved_value,
        achieved_goal_year,
        iterations,
        converged,
        feasible,
        message,
    })
}

fn evaluate_candidate(
    base_input: ProjectionInput,
    policy: &ScenarioPolicy,
    config: GoalSolveConfig,
    monthly_contribution: f64,
) -> Option<u32> {
    let input = ProjectionInput {
        monthly_contribution: monthly_contribution.max(0.0),
        years: config.target_year,
        ..base_input
    };
    project_with_policy(input, policy).goal_year
}

fn validate_config(input: ProjectionInput, config: GoalSolveConfig) -> Result<(), SandboxError> {
    if config.target_year == 0 {
        return Err(SandboxError::Solver("target_year must be > 0".to_string()));
    }
    if !config.search_min.is_finite() || !config.search_max.is_finite() {
        return Err(SandboxError::Solver("search bounds must be finite".to_string()));
    }
    if config.search_min < 0.0 {
        return Err(SandboxError::Solver("search_min must be >= 0".to_string()));
    }
    if config.search_max <= config.search_min {
        return Err(SandboxError::Solver(
            "search_max must be greater than search_min".to_string(),
        ));
    }
    if !config.tolerance.is_finite() || config.tolerance <= 0.0 {
        return Err(SandboxError::Solver("tolerance must be > 0".to_string()));
    }
    if config.max_iterations == 0 {
        return Err(SandboxError::Solver("max_iterations must be > 0".to_string()));
    }
    if input.real_rate() <= -1.0 {
        return Err(SandboxError::Solver(
            "real rate must be > -100% for the search to be monotone".to_string(),
        ));
    }
    Ok(())
}
