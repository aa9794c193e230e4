use chrono::Utc;
use env_logger::Env;
use items_pod::cache_api;
use items_pod::command_line_interface::CliOptions;
use items_pod::database_api;
use items_pod::error::Result;
use items_pod::internal_api::ItemsApi;
use items_pod::warp_api;
use log::error;
use log::info;
use std::io::Write;
use std::net::SocketAddr;
use std::sync::Arc;
use structopt::StructOpt;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(Env::default().filter_or("RUST_LOG", "info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] - {}",
                Utc::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .init();

    let cli_options = CliOptions::from_args();
    if let Err(err) = run(cli_options).await {
        error!("{}", err);
        std::process::exit(1);
    }
}

async fn run(cli_options: CliOptions) -> Result<()> {
    // Backing services must be reachable before the first request is accepted.
    let store = database_api::connect_store(&cli_options).await?;
    let cache = cache_api::connect_cache(&cli_options).await?;
    let api = Arc::new(ItemsApi::new(
        store,
        cache,
        cli_options.cache_update_policy,
    ));

    let addr = SocketAddr::new(cli_options.host, cli_options.port);
    warp_api::run_server(api, addr, shutdown_signal()).await
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal, {}", err);
        return;
    }
    info!("Shutdown signal received");
}
