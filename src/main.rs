use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use gitcard::github::{GitHubClient, USER_AGENT};
use gitcard::server::{router, AppState};

#[derive(Parser, Debug)]
#[command(name = "gitcard", version, about = "GitHub profile infographic service")]
struct Args {
    /// Port to listen on
    #[arg(long, default_value_t = 3000)]
    port: u16,

    /// Address to bind
    #[arg(long, default_value = "0.0.0.0")]
    bind: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gitcard=info")),
        )
        .init();

    let args = Args::parse();

    let token = std::env::var("GITHUB_TOKEN").ok().filter(|t| !t.is_empty());
    if token.is_none() {
        tracing::warn!("GITHUB_TOKEN not set; contribution series will be zero-filled");
    }

    let http = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
    let github = GitHubClient::new(http.clone(), token);
    let state = Arc::new(AppState::new(github, http));

    let addr = format!("{}:{}", args.bind, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}
