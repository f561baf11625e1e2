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

//! DialPhone Desktop Application

use anyhow::Result;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dialphone::bluetooth::{RfcommConnector, SessionManager};
use dialphone::config::Config;
use dialphone::phone::{DialNumber, PhoneListener, PhoneService};
use dialphone::SessionState;

/// Assembles the dialled number and logs device events.
struct Dialer {
    number: Mutex<DialNumber>,
}

impl Dialer {
    fn new(number_length: usize) -> Self {
        Self {
            number: Mutex::new(DialNumber::new(number_length)),
        }
    }
}

impl PhoneListener for Dialer {
    fn on_dial(&self, digits: &str) {
        let mut number = self.number.lock();
        match number.push(digits) {
            Some(complete) => info!("Number complete: {} ({})", number.formatted(), complete),
            None => info!("Dialled {}: {}", digits, number.formatted()),
        }
    }

    fn on_hang_up(&self) {
        info!("Handset down");
        self.number.lock().clear();
    }

    fn on_pick_up(&self) {
        info!("Handset up");
    }

    fn on_error(&self, error: &str) {
        error!("Connection error: {}", error);
    }

    fn on_state_change(&self, state: SessionState) {
        info!("{}", state);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("dialphone=info".parse()?),
        )
        .init();

    info!("Starting DialPhone v{}...", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config_path = Config::default_path();
    let mut config = Config::load_from(&config_path)?;
    info!("Configuration loaded from {}", config_path.display());

    let connector = Arc::new(RfcommConnector::new(config.bluetooth.rfcomm_channel).await?);
    info!("Using RFCOMM channel {}", connector.channel());

    let address = match std::env::args().nth(1) {
        Some(address) => {
            config.remember_device(&address, &config_path)?;
            address
        }
        None => match config.bluetooth.device_address.clone() {
            Some(address) => address,
            None => {
                warn!("No dial device configured. Paired devices:");
                for device in connector.paired_devices().await? {
                    info!("  {}  {}", device.address, device.name);
                }
                info!("Usage: dialphone <ADDRESS>");
                return Ok(());
            }
        },
    };

    let session = SessionManager::with_runtime(
        connector,
        tokio::runtime::Handle::current(),
        config.session_options(),
    );
    let dialer = Arc::new(Dialer::new(config.phone.number_length));
    let phone = PhoneService::new(session, dialer);

    phone.start();
    phone.connect(&address);

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");

    phone.disconnect();
    info!("DialPhone stopped");
    Ok(())
}
