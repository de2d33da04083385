use std::time::Duration;

use common::config::Validate;
use common::games::tictactoe::BotSettings;
use serde::{Deserialize, Serialize};

use crate::games::tictactoe::SessionSettings;

pub const DEFAULT_CONFIG_PATH: &str = "tictactoe_server.yaml";

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct BotConfig {
    pub display_name: String,
    #[serde(flatten)]
    pub settings: BotSettings,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            display_name: "AI".to_string(),
            settings: BotSettings::default(),
        }
    }
}

impl Validate for BotConfig {
    fn validate(&self) -> Result<(), String> {
        if self.display_name.trim().is_empty() {
            return Err("bot display name must not be empty".to_string());
        }
        self.settings.validate()
    }
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct ServerConfig {
    pub listen_address: String,
    pub static_files_path: String,
    pub auto_move_delay_ms: u64,
    pub auto_restart_delay_ms: u64,
    pub chat_history_limit: usize,
    #[serde(default)]
    pub bot: BotConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: "0.0.0.0:46219".to_string(),
            static_files_path: "public".to_string(),
            auto_move_delay_ms: 500,
            auto_restart_delay_ms: 3000,
            chat_history_limit: 100,
            bot: BotConfig::default(),
        }
    }
}

impl Validate for ServerConfig {
    fn validate(&self) -> Result<(), String> {
        if self.listen_address.parse::<std::net::SocketAddr>().is_err() {
            return Err(format!("Invalid listen address: {}", self.listen_address));
        }
        if self.static_files_path.is_empty() {
            return Err("static files path must not be empty".to_string());
        }
        if self.chat_history_limit == 0 {
            return Err("chat history limit must be at least 1".to_string());
        }
        if self.auto_restart_delay_ms > 60_000 {
            return Err(format!(
                "Restart delay must be at most 60000 ms, got {}",
                self.auto_restart_delay_ms
            ));
        }
        self.bot.validate()
    }
}

impl ServerConfig {
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            auto_move_delay: Duration::from_millis(self.auto_move_delay_ms),
            auto_restart_delay: Duration::from_millis(self.auto_restart_delay_ms),
            automated_name: self.bot.display_name.clone(),
            chat_history_limit: self.chat_history_limit,
        }
    }
}
