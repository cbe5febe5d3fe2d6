//! Reads one serverless function event (JSON) from stdin, runs it through the
//! app and prints the response envelope to stdout.

use artist_portfolio_api::{
    build_state, clock::SystemClock, config::Config, configure_cors, create_app,
    serverless::{handle_event, FunctionEvent},
};
use std::{io::Read, sync::Arc};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    if let Err(e) = invoke().await {
        eprintln!("serverless-invoke: {e}");
        std::process::exit(1);
    }
}

async fn invoke() -> Result<(), Box<dyn std::error::Error>> {
    let mut input = String::new();
    std::io::stdin().read_to_string(&mut input)?;
    let event: FunctionEvent = serde_json::from_str(&input)?;

    let config = Config::from_env()?;
    let state = build_state(&config, Arc::new(SystemClock)).await?;
    let app = create_app(
        state,
        configure_cors(config.allowed_origins.as_deref()),
        config.max_body_bytes,
    );

    let response = handle_event(app, event).await;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
