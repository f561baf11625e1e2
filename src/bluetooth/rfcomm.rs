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

//! Bluetooth RFCOMM connector (serial port profile).

use anyhow::Result;
use async_trait::async_trait;
use bluer::rfcomm::{SocketAddr, Stream};
use bluer::Address;
use tracing::{debug, info};
use uuid::Uuid;

use super::error::SessionError;
use super::transport::{Connector, DeviceAddress, Transport};

/// Standard SPP UUID.
pub const SPP_UUID: Uuid = Uuid::from_u128(0x00001101_0000_1000_8000_00805F9B34FB);

/// RFCOMM channel used when none is configured.
pub const DEFAULT_RFCOMM_CHANNEL: u8 = 1;

/// Parse a `AA:BB:CC:DD:EE:FF` Bluetooth address.
pub fn parse_address(address: &DeviceAddress) -> std::result::Result<Address, SessionError> {
    address
        .as_str()
        .parse::<Address>()
        .map_err(|_| SessionError::InvalidArgument(format!("'{}' is not a Bluetooth address", address)))
}

/// A paired Bluetooth device.
#[derive(Debug, Clone)]
pub struct PairedDevice {
    pub address: Address,
    pub name: String,
}

/// Opens RFCOMM streams to remote devices through the default adapter.
pub struct RfcommConnector {
    adapter: bluer::Adapter,
    channel: u8,
}

impl RfcommConnector {
    /// Open a BlueZ session and power on the default adapter.
    pub async fn new(channel: u8) -> Result<Self> {
        let session = bluer::Session::new().await?;
        let adapter = session.default_adapter().await?;
        info!("Using Bluetooth adapter: {}", adapter.name());

        if !adapter.is_powered().await? {
            info!("Powering on Bluetooth adapter...");
            adapter.set_powered(true).await?;
        }

        Ok(Self { adapter, channel })
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }

    /// Get paired devices.
    pub async fn paired_devices(&self) -> Result<Vec<PairedDevice>> {
        let mut devices = Vec::new();

        for addr in self.adapter.device_addresses().await? {
            let device = self.adapter.device(addr)?;
            if device.is_paired().await? {
                let name = device.alias().await.unwrap_or_else(|_| addr.to_string());
                devices.push(PairedDevice {
                    address: addr,
                    name,
                });
            }
        }

        Ok(devices)
    }

    /// Alias of `address`, or the address itself if BlueZ does not know it.
    async fn device_name(&self, address: Address) -> String {
        let alias = match self.adapter.device(address) {
            Ok(device) => device.alias().await.ok(),
            Err(e) => {
                debug!("No device entry for {}: {}", address, e);
                None
            }
        };
        alias.unwrap_or_else(|| address.to_string())
    }
}

#[async_trait]
impl Connector for RfcommConnector {
    fn validate(&self, address: &DeviceAddress) -> std::result::Result<(), SessionError> {
        parse_address(address).map(|_| ())
    }

    async fn open(&self, address: &DeviceAddress) -> std::result::Result<Transport, SessionError> {
        let addr = parse_address(address)?;
        debug!("Opening RFCOMM channel {} to {} (SPP {})", self.channel, addr, SPP_UUID);

        let stream = Stream::connect(SocketAddr::new(addr, self.channel))
            .await
            .map_err(|e| SessionError::Connect(e.to_string()))?;

        let name = self.device_name(addr).await;
        Ok(Transport::from_stream(name, stream))
    }
}
