pub mod api;
pub mod core;
pub mod error;
pub mod logging;

pub use crate::core::{ProjectionInput, ProjectionResult, ScenarioPolicy, YearPoint, project};
pub use error::SandboxError;
