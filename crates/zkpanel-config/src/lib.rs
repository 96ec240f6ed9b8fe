//! Configuration loading and panel profiles for zkpanel tools.
//!
//! Profiles live in a `zkpanel.toml` (in the platform config directory by
//! default) and can be overridden through `ZKPANEL_*` environment
//! variables, with `__` separating nesting levels:
//!
//! ```toml
//! default_panel = "entrance"
//!
//! [panels.entrance]
//! address = "192.168.1.201"
//! password = "s3cret"
//! model = "zk400"
//! ```
//!
//! ```sh
//! ZKPANEL_PANELS__ENTRANCE__PORT=4371
//! ```

use std::collections::BTreeMap;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::Figment;
use figment::providers::{Env, Format, Toml};
use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;

use zkpanel_core::{ConnectionOptions, DeviceModel, PanelOptions, Protocol};

/// Configuration failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot load configuration: {0}")]
    Load(#[from] figment::Error),

    #[error("no panel profile named {0:?}")]
    UnknownProfile(String),

    #[error("no panel profiles configured")]
    NoProfiles,

    #[error("several panel profiles configured but no default_panel set")]
    NoDefault,
}

/// Root of the configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    /// Profile picked when the caller does not name one. Optional when
    /// only a single profile exists.
    #[serde(default)]
    pub default_panel: Option<String>,

    #[serde(default)]
    pub panels: BTreeMap<String, PanelProfile>,
}

/// One panel connection profile.
#[derive(Debug, Clone, Deserialize)]
pub struct PanelProfile {
    pub address: IpAddr,

    #[serde(default = "defaults::port")]
    pub port: u16,

    #[serde(default)]
    pub protocol: ProfileProtocol,

    #[serde(default = "defaults::timeout_ms")]
    pub timeout_ms: u64,

    /// Communication password, if the panel has one set.
    #[serde(default)]
    pub password: Option<SecretString>,

    #[serde(default = "defaults::model")]
    pub model: DeviceModel,

    #[serde(default = "defaults::event_capacity")]
    pub event_capacity: usize,

    #[serde(default = "defaults::poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default = "defaults::poll_timeout_ms")]
    pub poll_timeout_ms: u64,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileProtocol {
    #[default]
    Tcp,
    Udp,
}

mod defaults {
    use zkpanel_core::config;

    pub(super) fn port() -> u16 {
        config::DEFAULT_PORT
    }

    pub(super) fn timeout_ms() -> u64 {
        u64::try_from(config::DEFAULT_TIMEOUT.as_millis()).unwrap_or(4000)
    }

    pub(super) fn model() -> zkpanel_core::DeviceModel {
        zkpanel_core::DeviceModel::Zk400
    }

    pub(super) fn event_capacity() -> usize {
        config::DEFAULT_EVENT_CAPACITY
    }

    pub(super) fn poll_interval_ms() -> u64 {
        1000
    }

    pub(super) fn poll_timeout_ms() -> u64 {
        60_000
    }
}

impl PanelProfile {
    /// Connection options for the transport layer.
    pub fn connection(&self) -> ConnectionOptions {
        ConnectionOptions {
            protocol: match self.protocol {
                ProfileProtocol::Tcp => Protocol::Tcp,
                ProfileProtocol::Udp => Protocol::Udp,
            },
            address: self.address,
            port: self.port,
            timeout: Duration::from_millis(self.timeout_ms),
            password: self.password.clone(),
        }
    }

    /// Runtime options for [`zkpanel_core::Panel`].
    pub fn panel_options(&self) -> PanelOptions {
        PanelOptions {
            device_model: self.model,
            event_capacity: self.event_capacity,
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            poll_timeout: Duration::from_millis(self.poll_timeout_ms),
        }
    }
}

impl Settings {
    /// Load from the default file location plus environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(Self::figment(Self::default_path().as_deref()))
    }

    /// Load from an explicit file plus environment overrides.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        Self::from_figment(Self::figment(Some(path)))
    }

    /// The figment this crate reads: optional TOML file, then
    /// `ZKPANEL_*` environment variables (highest precedence).
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::new();
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed("ZKPANEL_").split("__"))
    }

    fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        Ok(figment.extract()?)
    }

    /// Platform config file location (`…/zkpanel/zkpanel.toml`), if a home
    /// directory exists.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "zkpanel")
            .map(|dirs| dirs.config_dir().join("zkpanel.toml"))
    }

    /// Resolve a profile: by name if given, else the configured default,
    /// else the only profile present.
    pub fn profile(&self, name: Option<&str>) -> Result<&PanelProfile, ConfigError> {
        if let Some(name) = name {
            return self
                .panels
                .get(name)
                .ok_or_else(|| ConfigError::UnknownProfile(name.to_owned()));
        }

        if let Some(default) = &self.default_panel {
            return self
                .panels
                .get(default)
                .ok_or_else(|| ConfigError::UnknownProfile(default.clone()));
        }

        let mut profiles = self.panels.values();
        match (profiles.next(), profiles.next()) {
            (None, _) => Err(ConfigError::NoProfiles),
            (Some(only), None) => Ok(only),
            (Some(_), Some(_)) => Err(ConfigError::NoDefault),
        }
    }
}
