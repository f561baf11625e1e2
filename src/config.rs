// Copyright 2026 Daniel Pelikan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Configuration module.
//!
//! Handles loading and saving application settings, including the address
//! of the last dial device connected to.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::bluetooth::{
    SessionOptions, DEFAULT_CONNECT_TIMEOUT, DEFAULT_READ_BUFFER_SIZE, DEFAULT_RFCOMM_CHANNEL,
};
use crate::phone::DEFAULT_NUMBER_LENGTH;

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Bluetooth settings.
    pub bluetooth: BluetoothConfig,

    /// Serial session settings.
    pub session: SessionConfig,

    /// Dialling settings.
    pub phone: PhoneConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BluetoothConfig {
    /// Address of the last device connected to.
    pub device_address: Option<String>,

    /// RFCOMM channel the dial device listens on.
    pub rfcomm_channel: u8,

    /// Handshake timeout in seconds.
    pub connect_timeout_secs: u64,
}

impl Default for BluetoothConfig {
    fn default() -> Self {
        Self {
            device_address: None,
            rfcomm_channel: DEFAULT_RFCOMM_CHANNEL,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT.as_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Maximum bytes per read.
    pub read_buffer_size: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhoneConfig {
    /// Digits that make up a complete number.
    pub number_length: usize,
}

impl Default for PhoneConfig {
    fn default() -> Self {
        Self {
            number_length: DEFAULT_NUMBER_LENGTH,
        }
    }
}

impl Config {
    /// Default location of the configuration file.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("dialphone")
            .join("config.toml")
    }

    /// Load configuration from `path`, creating a default file if missing.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&content)?)
        } else {
            let config = Self::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Remember `address` as the device to reconnect to, saving to `path`.
    pub fn remember_device(&mut self, address: &str, path: &Path) -> Result<()> {
        if self.bluetooth.device_address.as_deref() == Some(address) {
            return Ok(());
        }
        self.bluetooth.device_address = Some(address.to_string());
        self.save_to(path)
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            read_buffer_size: self.session.read_buffer_size,
            connect_timeout: Duration::from_secs(self.bluetooth.connect_timeout_secs),
        }
    }
}
