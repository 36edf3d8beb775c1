use serde::{Deserialize, Serialize};

use crate::error::SandboxError;

/// Fully resolved parameters for one projection run. Rates are fractions.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ProjectionInput {
    pub initial_amount: f64,
    pub monthly_contribution: f64,
    pub years: u32,
    pub annual_return: f64,
    pub inflation_rate: f64,
    pub crash_enabled: bool,
    pub optimization_enabled: bool,
}

impl ProjectionInput {
    /// (1 + nominal) / (1 + inflation) - 1
    pub fn real_rate(&self) -> f64 {
        (1.0 + self.annual_return) / (1.0 + self.inflation_rate) - 1.0
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearPoint {
    pub year: u32,
    pub balance: i64,
    pub delayed_balance: i64,
    pub is_crash_year: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionResult {
    pub series: Vec<YearPoint>,
    pub final_balance: i64,
    pub delayed_final_balance: i64,
    pub cost_of_delay: i64,
    pub goal_year: Option<u32>,
    pub real_rate: f64,
}

impl ProjectionResult {
    pub fn crash_point(&self) -> Option<&YearPoint> {
        self.series.iter().find(|point| point.is_crash_year)
    }

    pub fn goal_point(&self) -> Option<&YearPoint> {
        self.goal_year.and_then(|year| self.series.get(year as usize))
    }
}

/// Fixed business constants of the sandbox. The projection loop reads them
/// from here so they can be overridden without touching the loop.
#[derive(Copy, Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScenarioPolicy {
    pub goal_amount: f64,
    pub crash_year: u32,
    /// Fraction of the balance kept after the crash.
    pub crash_multiplier: f64,
    pub delay_years: u32,
    pub optimization_bonus: f64,
    pub faster_goal_years: u32,
}

impl Default for ScenarioPolicy {
    fn default() -> Self {
        Self {
            goal_amount: 500_000.0,
            crash_year: 10,
            crash_multiplier: 0.70,
            delay_years: 5,
            optimization_bonus: 0.02,
            faster_goal_years: 2,
        }
    }
}

impl ScenarioPolicy {
    pub fn from_toml_str(raw: &str) -> Result<Self, SandboxError> {
        let policy: ScenarioPolicy = toml::from_str(raw)?;
        policy.validate()?;
        Ok(policy)
    }

    pub fn load(path: &std::path::Path) -> Result<Self, SandboxError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<(), SandboxError> {
        if !self.goal_amount.is_finite() || self.goal_amount < 0.0 {
            return Err(SandboxError::Policy(
                "goal_amount must be a finite value >= 0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.crash_multiplier) {
            return Err(SandboxError::Policy(
                "crash_multiplier must be between 0 and 1".to_string(),
            ));
        }
        if !self.optimization_bonus.is_finite() {
            return Err(SandboxError::Policy(
                "optimization_bonus must be finite".to_string(),
            ));
        }
        Ok(())
    }
}
