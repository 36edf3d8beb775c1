use std::env;
use std::path::Path;

use tracing::error;
use wealth_sandbox::{ScenarioPolicy, api, logging};

#[tokio::main]
async fn main() {
    logging::init();

    let raw_args: Vec<String> = env::args().collect();
    if raw_args.get(1).map(|s| s.as_str()) == Some("serve") {
        let port = raw_args
            .get(2)
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(8080);
        let policy = match raw_args.get(3) {
            Some(path) => match ScenarioPolicy::load(Path::new(path)) {
                Ok(policy) => policy,
                Err(e) => {
                    error!("Failed to load policy {path}: {e}");
                    std::process::exit(1);
                }
            },
            None => ScenarioPolicy::default(),
        };
        if let Err(e) = api::run_http_server(port, policy).await {
            error!("Server error: {e}");
            std::process::exit(1);
        }
        return;
    }

    match api::run_cli(raw_args) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    }
}
