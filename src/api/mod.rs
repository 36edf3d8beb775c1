use axum::{
    Router,
    extract::{
        Json, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::Parser;
use clap::error::ErrorKind;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::core::{
    GoalSolveConfig, GoalSolveResult, Insights, ProjectionInput, ProjectionResult, ScenarioPolicy,
    derive_insights, project_with_policy, solve_required_contribution,
};
use crate::error::SandboxError;

/// Applied when a caller leaves the return rate out.
const DEFAULT_ANNUAL_RETURN: f64 = 0.05;
const MAX_YEARS: i64 = 1_000;
const SOLVE_TOLERANCE: f64 = 0.01;
const SOLVE_MAX_ITERATIONS: u32 = 64;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ProjectPayload {
    initial_amount: Option<f64>,
    monthly_contribution: Option<f64>,
    years: Option<i64>,
    annual_return: Option<f64>,
    inflation_rate: Option<f64>,
    crash_enabled: Option<bool>,
    optimization_enabled: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SolvePayload {
    #[serde(flatten)]
    projection: ProjectPayload,
    target_year: Option<u32>,
    search_max: Option<f64>,
}

#[derive(Parser, Debug)]
#[command(
    name = "wealth-sandbox",
    about = "What-if wealth projection: invest now vs. delay five years, with an optional crash year"
)]
struct Cli {
    #[arg(long, default_value_t = 10_000.0)]
    initial_amount: f64,
    #[arg(long, default_value_t = 500.0)]
    monthly_contribution: f64,
    #[arg(long, default_value_t = 20, allow_negative_numbers = true)]
    years: i64,
    #[arg(
        long,
        allow_negative_numbers = true,
        help = "Nominal annual return as a fraction, defaults to 0.05"
    )]
    annual_return: Option<f64>,
    #[arg(
        long,
        default_value_t = 0.02,
        allow_negative_numbers = true,
        help = "Annual inflation as a fraction"
    )]
    inflation_rate: f64,
    #[arg(long, help = "Apply the one-time market crash")]
    crash: bool,
    #[arg(long, help = "Show the optimized-plan insight")]
    optimize: bool,
    #[arg(long, help = "TOML file overriding goal, crash and delay constants")]
    policy: Option<PathBuf>,
    #[arg(long)]
    pretty: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectResponse {
    #[serde(flatten)]
    result: ProjectionResult,
    insights: Insights,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

fn build_input(cli: &Cli) -> Result<ProjectionInput, SandboxError> {
    for (name, amount) in [
        ("initialAmount", cli.initial_amount),
        ("monthlyContribution", cli.monthly_contribution),
    ] {
        if !amount.is_finite() || amount < 0.0 {
            return Err(SandboxError::Validation(format!(
                "{name} must be a finite value >= 0"
            )));
        }
    }
    if cli.years < 0 {
        return Err(SandboxError::Validation("years must be >= 0".to_string()));
    }
    if cli.years > MAX_YEARS {
        return Err(SandboxError::Validation(format!(
            "years must be <= {MAX_YEARS}"
        )));
    }

    let annual_return = cli.annual_return.unwrap_or(DEFAULT_ANNUAL_RETURN);
    for (name, rate) in [
        ("annualReturn", annual_return),
        ("inflationRate", cli.inflation_rate),
    ] {
        if !rate.is_finite() || rate <= -1.0 {
            return Err(SandboxError::Validation(format!(
                "{name} must be a finite fraction > -1"
            )));
        }
    }

    Ok(ProjectionInput {
        initial_amount: cli.initial_amount,
        monthly_contribution: cli.monthly_contribution,
        years: cli.years as u32,
        annual_return,
        inflation_rate: cli.inflation_rate,
        crash_enabled: cli.crash,
        optimization_enabled: cli.optimize,
    })
}

pub async fn run_http_server(port: u16, policy: ScenarioPolicy) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = router(policy);

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "wealth sandbox HTTP API listening");
    info!("Local access: http://127.0.0.1:{port}/api/project");
    axum::serve(listener, app).await
}

fn router(policy: ScenarioPolicy) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/api/project",
            get(project_get_handler).post(project_post_handler),
        )
        .route("/api/solve-contribution", post(solve_post_handler))
        .fallback(not_found_handler)
        .with_state(Arc::new(policy))
}

/// Parses projection flags, runs one projection and returns the JSON body the
/// HTTP API would send for the same parameters.
pub fn run_cli<I, T>(args: I) -> Result<String, SandboxError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            return Ok(e.to_string());
        }
        Err(e) => return Err(SandboxError::Validation(e.to_string().trim_end().to_string())),
    };
    let policy = match &cli.policy {
        Some(path) => ScenarioPolicy::load(path)?,
        None => ScenarioPolicy::default(),
    };
    let input = build_input(&cli)?;
    info!(years = input.years, crash = input.crash_enabled, "running projection");

    let response = build_project_response(input, &policy);
    let json = if cli.pretty {
        serde_json::to_string_pretty(&response)?
    } else {
        serde_json::to_string(&response)?
    };
    Ok(json)
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, HealthResponse { status: "ok" })
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn project_get_handler(
    State(policy): State<Arc<ScenarioPolicy>>,
    payload: Result<Query<ProjectPayload>, QueryRejection>,
) -> Response {
    match payload {
        Ok(Query(payload)) => project_handler_impl(&policy, payload).await,
        Err(rejection) => rejection_response(rejection.body_text()),
    }
}

async fn project_post_handler(
    State(policy): State<Arc<ScenarioPolicy>>,
    payload: Result<Json<ProjectPayload>, JsonRejection>,
) -> Response {
    match payload {
        Ok(Json(payload)) => project_handler_impl(&policy, payload).await,
        Err(rejection) => rejection_response(rejection.body_text()),
    }
}

async fn project_handler_impl(policy: &ScenarioPolicy, payload: ProjectPayload) -> Response {
    let input = match input_from_payload(payload) {
        Ok(input) => input,
        Err(err) => {
            warn!(%err, "rejected projection request");
            return error_response(StatusCode::BAD_REQUEST, &err.to_string());
        }
    };
    json_response(StatusCode::OK, build_project_response(input, policy))
}

async fn solve_post_handler(
    State(policy): State<Arc<ScenarioPolicy>>,
    payload: Result<Json<SolvePayload>, JsonRejection>,
) -> Response {
    let payload = match payload {
        Ok(Json(payload)) => payload,
        Err(rejection) => return rejection_response(rejection.body_text()),
    };
    match solve_from_payload(&policy, payload) {
        Ok(result) => json_response(StatusCode::OK, result),
        Err(err) => {
            warn!(%err, "rejected solve request");
            error_response(StatusCode::BAD_REQUEST, &err.to_string())
        }
    }
}

fn solve_from_payload(
    policy: &ScenarioPolicy,
    payload: SolvePayload,
) -> Result<GoalSolveResult, SandboxError> {
    let Some(target_year) = payload.target_year else {
        return Err(SandboxError::Validation("targetYear is required".to_string()));
    };
    if i64::from(target_year) > MAX_YEARS {
        return Err(SandboxError::Validation(format!(
            "targetYear must be <= {MAX_YEARS}"
        )));
    }
    let input = input_from_payload(payload.projection)?;
    let config = GoalSolveConfig {
        target_year,
        search_min: 0.0,
        search_max: payload.search_max.unwrap_or(policy.goal_amount.max(1.0)),
        tolerance: SOLVE_TOLERANCE,
        max_iterations: SOLVE_MAX_ITERATIONS,
    };
    debug!(target_year, search_max = config.search_max, "solving required contribution");
    solve_required_contribution(input, policy, config)
}

fn build_project_response(input: ProjectionInput, policy: &ScenarioPolicy) -> ProjectResponse {
    debug!(
        initial_amount = input.initial_amount,
        monthly_contribution = input.monthly_contribution,
        years = input.years,
        annual_return = input.annual_return,
        inflation_rate = input.inflation_rate,
        crash = input.crash_enabled,
        optimize = input.optimization_enabled,
        "projecting"
    );
    let result = project_with_policy(input, policy);
    let insights = derive_insights(input, policy, &result);
    ProjectResponse { result, insights }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn rejection_response(msg: String) -> Response {
    warn!(%msg, "rejected malformed request");
    error_response(StatusCode::BAD_REQUEST, &msg)
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn input_from_json(json: &str) -> Result<ProjectionInput, SandboxError> {
    let payload = serde_json::from_str::<ProjectPayload>(json)?;
    input_from_payload(payload)
}

fn input_from_payload(payload: ProjectPayload) -> Result<ProjectionInput, SandboxError> {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.initial_amount {
        cli.initial_amount = v;
    }
    if let Some(v) = payload.monthly_contribution {
        cli.monthly_contribution = v;
    }
    if let Some(v) = payload.years {
        cli.years = v;
    }
    if let Some(v) = payload.annual_return {
        cli.annual_return = Some(v);
    }
    if let Some(v) = payload.inflation_rate {
        cli.inflation_rate = v;
    }
    if let Some(v) = payload.crash_enabled {
        cli.crash = v;
    }
    if let Some(v) = payload.optimization_enabled {
        cli.optimize = v;
    }

    build_input(&cli)
}

fn default_cli_for_api() -> Cli {
    Cli {
        initial_amount: 10_000.0,
        monthly_contribution: 500.0,
        years: 20,
        annual_return: None,
        inflation_rate: 0.02,
        crash: false,
        optimize: false,
        policy: None,
        pretty: false,
    }
}
