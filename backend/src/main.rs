use anyhow::Context;
use backend::config::ServerArgs;
use backend::host::MatchHost;
use backend::layout::load_layout;
use backend::server;
use backend::stats::StatsSink;
use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = ServerArgs::parse();
    let config = args.host_config()?;
    let layout = load_layout(args.layout.as_deref(), args.board_radius, &config.rules)?;
    let stats = StatsSink::from_url(args.stats_url.as_deref());

    let listener = TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("failed to bind {}", args.bind))?;
    tracing::info!(
        "[BACKEND] Listening on {} (turn {}s, tick {}ms)",
        listener.local_addr()?,
        args.turn_secs,
        args.tick_ms
    );

    tokio::select! {
        result = server::serve(listener, MatchHost::new(config, layout, stats)) => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("[BACKEND] Shutting down");
            Ok(())
        }
    }
}
