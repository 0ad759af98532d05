mod common;
mod config;
mod network;
mod storage;
mod ui;

use std::time::Duration;

use clap::Parser;
use dotenvy::dotenv;
use network::ChatClient;
use tokio::sync::mpsc;
use ui::ChatApp;

use crate::config::{AppConfig, Overrides};
use crate::storage::SettingsStore;

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Parser)]
#[command(
    name = "rust_ws_chat",
    version,
    about = "Chat client with HTTP history and a live WebSocket feed"
)]
struct Cli {
    /// Path to JSON config file
    #[arg(long, default_value = config::DEFAULT_CONFIG_PATH, value_name = "FILE")]
    config: String,
    /// Base URL of the message store
    #[arg(long, env = "CHAT_HTTP_URL", value_name = "URL")]
    http_url: Option<String>,
    /// WebSocket endpoint of the live feed
    #[arg(long, env = "CHAT_WS_URL", value_name = "URL")]
    ws_url: Option<String>,
    /// SQLite file holding the local display name
    #[arg(long, value_name = "FILE")]
    database: Option<String>,
    /// Choose (and remember) a display name instead of the generated one
    #[arg(long)]
    name: Option<String>,
    /// Do not reconnect after the live connection drops
    #[arg(long)]
    no_reconnect: bool,
}

#[tokio::main]
async fn main() -> Result<(), eframe::Error> {
    dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();
    let app_config = config::load_config(&cli.config).apply(Overrides {
        http_url: cli.http_url,
        ws_url: cli.ws_url,
        database_path: cli.database,
        no_reconnect: cli.no_reconnect,
    });

    let username = resolve_username(&app_config, cli.name.as_deref());
    run_client(app_config, username).await
}

/// Falls back to a throwaway name if the settings store is unusable.
fn resolve_username(config: &AppConfig, chosen: Option<&str>) -> String {
    let resolved = storage::ensure_data_dir(&config.database_path)
        .map_err(|err| err.to_string())
        .and_then(|_| {
            let store =
                SettingsStore::with_path(&config.database_path).map_err(|err| err.to_string())?;
            let name = match chosen.filter(|name| !name.trim().is_empty()) {
                Some(name) => storage::set_display_name(&store, name),
                None => storage::resolve_display_name(&store),
            };
            name.map_err(|err| err.to_string())
        });

    match resolved {
        Ok(name) => name,
        Err(err) => {
            log::error!(
                "Settings store {} unavailable ({err}); using a session-only name",
                config.database_path
            );
            SettingsStore::in_memory()
                .and_then(|store| storage::resolve_display_name(&store))
                .unwrap_or_else(|_| "User".to_string())
        }
    }
}

async fn run_client(app_config: AppConfig, username: String) -> Result<(), eframe::Error> {
    // UI -> Network
    let (cmd_tx, cmd_rx) = mpsc::channel(100);
    // Network -> UI
    let (event_tx, event_rx) = mpsc::channel(100);

    let client = ChatClient::new(event_tx, cmd_rx, &app_config, username.clone());
    let network = tokio::spawn(client.run());

    let options = eframe::NativeOptions::default();
    let mut event_rx = Some(event_rx);

    log::info!(
        "Client started as {username} (history {}, live {})",
        app_config.http_url,
        app_config.ws_url
    );

    let result = eframe::run_native(
        "Rust WebSocket Chat",
        options,
        Box::new(move |cc| {
            let event_receiver = event_rx
                .take()
                .expect("ChatApp should only be initialized once");

            Ok(Box::new(ChatApp::new(
                cc,
                username.clone(),
                cmd_tx.clone(),
                event_receiver,
            )))
        }),
    );

    // The window is gone and with it the command sender; give the live
    // connection a moment to send its close frame.
    match tokio::time::timeout(SHUTDOWN_TIMEOUT, network).await {
        Ok(Ok(())) => {}
        Ok(Err(err)) => log::error!("Network task terminated: {err}"),
        Err(_) => log::warn!("Network task did not stop within {SHUTDOWN_TIMEOUT:?}"),
    }

    result
}
