use super::types::{ProjectionInput, ProjectionResult, ScenarioPolicy, YearPoint};

pub fn project(input: ProjectionInput) -> ProjectionResult {
    project_with_policy(input, &ScenarioPolicy::default())
}

/// Year-by-year invest-now vs delayed projection.
///
/// The running balances keep full precision; only the values recorded in the
/// series are rounded. The crash is applied to the invest-now balance before
/// its year is recorded, and the delayed scenario neither grows nor receives
/// contributions until `policy.delay_years`.
pub fn project_with_policy(input: ProjectionInput, policy: &ScenarioPolicy) -> ProjectionResult {
    let real_rate = input.real_rate();
    let growth = 1.0 + real_rate;
    let annual_contribution = input.monthly_contribution * 12.0;

    let mut current = input.initial_amount;
    let mut delayed = input.initial_amount;
    let mut series = Vec::with_capacity(input.years as usize + 1);
    let mut final_balance = round_balance(current);
    let mut delayed_final_balance = round_balance(delayed);

    for year in 0..=input.years {
        let is_crash_year = input.crash_enabled && year == policy.crash_year;
        if is_crash_year {
            current *= policy.crash_multiplier;
        }

        let balance = round_balance(current);
        let delayed_balance = if year < policy.delay_years {
            round_balance(input.initial_amount)
        } else {
            round_balance(delayed)
        };

        series.push(YearPoint {
            year,
            balance,
            delayed_balance,
            is_crash_year,
        });
        final_balance = balance;
        delayed_final_balance = delayed_balance;

        current = (current + annual_contribution) * growth;
        if year >= policy.delay_years {
            delayed = (delayed + annual_contribution) * growth;
        }
    }

    let goal_year = first_year_reaching(&series, policy.goal_amount);

    ProjectionResult {
        series,
        final_balance,
        delayed_final_balance,
        cost_of_delay: final_balance - delayed_final_balance,
        goal_year,
        real_rate,
    }
}

fn round_balance(value: f64) -> i64 {
    value.round() as i64
}

fn first_year_reaching(series: &[YearPoint], goal_amount: f64) -> Option<u32> {
    series
        .iter()
        .find(|point| point.balance as f64 >= goal_amount)
        .map(|point| point.year)
}
