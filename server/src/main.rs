mod broadcaster;
mod chat_history;
mod game_service;
mod games;
mod server_config;
mod web_server;
mod ws_handler;

use std::path::PathBuf;

use clap::Parser;
use common::config::{ConfigManager, FileContentConfigProvider, YamlConfigSerializer};
use common::{log, logger};

use broadcaster::Broadcaster;
use game_service::GameService;
use games::tictactoe::Session;
use server_config::{DEFAULT_CONFIG_PATH, ServerConfig};
use web_server::{WebServerState, run_web_server};

type ServerConfigManager = ConfigManager<FileContentConfigProvider, ServerConfig, YamlConfigSerializer>;

#[derive(Parser)]
#[command(name = "tictactoe_server")]
struct Args {
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    #[arg(long)]
    use_log_prefix: bool,

    /// Overrides the listen address from the config file.
    #[arg(long)]
    listen: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let prefix = if args.use_log_prefix {
        Some("Server".to_string())
    } else {
        None
    };
    logger::init_logger(prefix);

    let config_manager = ServerConfigManager::from_yaml_file(&args.config);
    let config = config_manager.get_or_init_config()?;
    log!("Loaded config from {}", config_manager.source());

    let listen_address = args.listen.unwrap_or_else(|| config.listen_address.clone());

    let broadcaster = Broadcaster::new();
    let game_service = GameService::start(
        Session::new(config.session_settings()),
        broadcaster.clone(),
        config.bot.settings.clone(),
    );

    let state = WebServerState {
        game_service: game_service.clone(),
        broadcaster,
    };

    let shutdown_signal = async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log!("Failed to listen for Ctrl+C: {}", e);
            return;
        }

        log!("Shutdown signal received, notifying clients...");
        game_service.announce_shutdown().await;

        tokio::time::sleep(tokio::time::Duration::from_millis(200)).await;
    };

    run_web_server(
        state,
        &listen_address,
        PathBuf::from(&config.static_files_path),
        shutdown_signal,
    )
    .await?;

    log!("Server shut down gracefully");

    Ok(())
}
