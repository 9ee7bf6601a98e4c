// Configuration management for the relaypost CLI
//
// Cross-platform config stored in:
// - macOS: ~/Library/Application Support/relaypost/config.json
// - Linux: ~/.config/relaypost/config.json
// - Windows: %APPDATA%\relaypost\config.json

use anyhow::{Context, Result};
use relaypost_core::relay::{RelayEndpoint, RelaySet, TimingPolicy};
use relaypost_core::TopicSet;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Relays every post is published to
    #[serde(default = "RelaySet::defaults")]
    pub relays: RelaySet,

    /// Hashtags attached to the next post
    #[serde(default = "TopicSet::defaults")]
    pub topics: TopicSet,

    /// Per-relay timing
    #[serde(default)]
    pub publish: PublishConfig,

    #[serde(skip)]
    path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishConfig {
    /// Connection timeout in milliseconds
    pub connect_timeout_ms: u64,

    /// Send/close timeout in milliseconds
    pub write_timeout_ms: u64,

    /// Grace period after sending, in milliseconds
    pub linger_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            relays: RelaySet::defaults(),
            topics: TopicSet::defaults(),
            publish: PublishConfig::default(),
            path: None,
        }
    }
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 5_000,
            write_timeout_ms: 5_000,
            linger_ms: 1_000,
        }
    }
}

impl PublishConfig {
    pub fn timing_policy(&self) -> TimingPolicy {
        TimingPolicy::from_millis(self.connect_timeout_ms, self.write_timeout_ms, self.linger_ms)
    }
}

impl Config {
    /// Get the config directory path (cross-platform)
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to determine config directory")?
            .join("relaypost");

        std::fs::create_dir_all(&config_dir)
            .context("Failed to create config directory")?;

        Ok(config_dir)
    }

    /// Get the data directory path (cross-platform)
    pub fn data_dir() -> Result<PathBuf> {
        let data_dir = dirs::data_local_dir()
            .context("Failed to determine data directory")?
            .join("relaypost");

        std::fs::create_dir_all(&data_dir)
            .context("Failed to create data directory")?;

        Ok(data_dir)
    }

    /// Where the logged-in secret key is kept
    pub fn key_file() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("secret_key"))
    }

    /// Get the config file path
    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Load config from the default location, creating it if missing
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file()?)
    }

    /// Load config from `path`, or create a default one there
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)
                .context("Failed to read config file")?;
            serde_json::from_str::<Config>(&contents)
                .context("Failed to parse config file")?
        } else {
            Config::default()
        };

        config.path = Some(path.to_path_buf());
        if !path.exists() {
            config.save()?;
        }
        Ok(config)
    }

    /// Save config to the file it was loaded from
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let contents = serde_json::to_string_pretty(self)
            .context("Failed to serialize config")?;
        std::fs::write(path, contents)
            .context("Failed to write config file")?;
        Ok(())
    }

    /// Add a relay. Returns `false` if it was already configured.
    pub fn add_relay(&mut self, address: &str) -> Result<bool> {
        let endpoint = RelayEndpoint::parse(address)?;
        let added = self.relays.add(endpoint);
        if added {
            self.save()?;
        }
        Ok(added)
    }

    /// Remove a relay. Returns `false` if it was not configured.
    pub fn remove_relay(&mut self, address: &str) -> Result<bool> {
        let removed = self.relays.remove(address);
        if removed {
            self.save()?;
        }
        Ok(removed)
    }

    /// Restore the default relay list
    pub fn reset_relays(&mut self) -> Result<()> {
        self.relays = RelaySet::defaults();
        self.save()
    }

    /// Add a topic. Returns `false` for blanks and duplicates.
    pub fn add_topic(&mut self, topic: &str) -> Result<bool> {
        let added = self.topics.add(topic);
        if added {
            self.save()?;
        }
        Ok(added)
    }

    /// Remove a topic. Returns `false` if it was not configured.
    pub fn remove_topic(&mut self, topic: &str) -> Result<bool> {
        let removed = self.topics.remove(topic);
        if removed {
            self.save()?;
        }
        Ok(removed)
    }

    /// Restore the default topics
    pub fn reset_topics(&mut self) -> Result<()> {
        self.topics.reset();
        self.save()
    }

    /// Set a config value
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "connect_timeout_ms" => {
                self.publish.connect_timeout_ms = value.parse()
                    .context("Invalid number")?;
            }
            "write_timeout_ms" => {
                self.publish.write_timeout_ms = value.parse()
                    .context("Invalid number")?;
            }
            "linger_ms" => {
                self.publish.linger_ms = value.parse()
                    .context("Invalid number")?;
            }
            _ => anyhow::bail!("Unknown config key: {}", key),
        }
        self.save()?;
        Ok(())
    }

    /// Get a config value
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "connect_timeout_ms" => Some(self.publish.connect_timeout_ms.to_string()),
            "write_timeout_ms" => Some(self.publish.write_timeout_ms.to_string()),
            "linger_ms" => Some(self.publish.linger_ms.to_string()),
            _ => None,
        }
    }

    /// List all config values
    pub fn list(&self) -> Vec<(String, String)> {
        vec![
            ("connect_timeout_ms".to_string(), format!("{}ms", self.publish.connect_timeout_ms)),
            ("write_timeout_ms".to_string(), format!("{}ms", self.publish.write_timeout_ms)),
            ("linger_ms".to_string(), format!("{}ms", self.publish.linger_ms)),
            ("relays".to_string(), self.relays.len().to_string()),
            ("topics".to_string(), self.topics.len().to_string()),
        ]
    }
}
