// ── Panel options ──

use std::net::IpAddr;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use crate::topology::DeviceModel;

/// Default vendor protocol port.
pub const DEFAULT_PORT: u16 = 4370;

/// Default connection timeout, matching the vendor SDK's.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(4000);

/// Default realtime buffer capacity: the transaction-store ceiling of the
/// C3 line, so an unattended log can hold everything the device can.
pub const DEFAULT_EVENT_CAPACITY: usize = 100_000;

/// Wire protocol the panel is reached over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Protocol {
    #[default]
    Tcp,
    Udp,
}

impl Protocol {
    fn connstr_token(self) -> &'static str {
        match self {
            Protocol::Tcp => "TCP",
            Protocol::Udp => "UDP",
        }
    }
}

/// How to reach one panel. Consumed by the transport layer; this crate
/// only renders the vendor connection string from it.
#[derive(Debug, Clone)]
pub struct ConnectionOptions {
    pub protocol: Protocol,
    pub address: IpAddr,
    pub port: u16,
    pub timeout: Duration,
    /// Communication password, if the panel has one set.
    pub password: Option<SecretString>,
}

impl ConnectionOptions {
    pub fn new(address: IpAddr) -> Self {
        Self {
            protocol: Protocol::default(),
            address,
            port: DEFAULT_PORT,
            timeout: DEFAULT_TIMEOUT,
            password: None,
        }
    }

    /// Render the vendor connection string, e.g.
    /// `protocol=TCP,ipaddress=192.168.1.201,port=4370,timeout=4000,passwd=`.
    pub fn connstr(&self) -> String {
        format!(
            "protocol={},ipaddress={},port={},timeout={},passwd={}",
            self.protocol.connstr_token(),
            self.address,
            self.port,
            self.timeout.as_millis(),
            self.password
                .as_ref()
                .map(ExposeSecret::expose_secret)
                .unwrap_or_default(),
        )
    }
}

/// Runtime options for one [`Panel`](crate::Panel).
#[derive(Debug, Clone)]
pub struct PanelOptions {
    pub device_model: DeviceModel,
    /// Bound on the in-memory realtime event buffer.
    pub event_capacity: usize,
    /// Default spacing between refreshes inside `poll`.
    pub poll_interval: Duration,
    /// Default give-up deadline for `poll`.
    pub poll_timeout: Duration,
}

impl Default for PanelOptions {
    fn default() -> Self {
        Self {
            device_model: DeviceModel::Zk400,
            event_capacity: DEFAULT_EVENT_CAPACITY,
            poll_interval: Duration::from_secs(1),
            poll_timeout: Duration::from_secs(60),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connstr_rendering() {
        let mut options = ConnectionOptions::new("192.168.1.201".parse().expect("ip"));
        assert_eq!(
            options.connstr(),
            "protocol=TCP,ipaddress=192.168.1.201,port=4370,timeout=4000,passwd="
        );

        options.password = Some("secret".into());
        options.port = 4371;
        assert_eq!(
            options.connstr(),
            "protocol=TCP,ipaddress=192.168.1.201,port=4371,timeout=4000,passwd=secret"
        );
    }
}
