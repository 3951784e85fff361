// src/config.rs
//! Service configuration.
//!
//! Values are layered, later sources winning:
//! 1. built-in defaults
//! 2. optional `config/default.{toml,json,yaml}`
//! 3. `DID_NFT__*` environment variables (e.g. `DID_NFT__SERVER__PORT=8080`,
//!    `DID_NFT__MINT__MODE=fixed`, `DID_NFT__MINT__VERIFIER_ADDRESS=0x...`)
//!
//! `main` loads `.env` through `dotenv` before reading the environment.

use crate::contracts::did_registry::{DeletePolicy, PublicKeyPolicy, RegistryConfig};
use crate::services::identity_ledger::MintMode;
use crate::utils::crypto::parse_address;
use config::builder::{ConfigBuilder, DefaultState};
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::net::SocketAddr;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MintModeSetting {
    Fixed,
    Did,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MintSettings {
    pub mode: MintModeSetting,
    /// Required when `mode` is `fixed`.
    pub verifier_address: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegistrySettings {
    pub delete_policy: DeletePolicy,
    /// Forced to `address` for DID-bound minting.
    pub public_key_policy: Option<PublicKeyPolicy>,
}

/// Complete service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub log_level: String,
    pub mint: MintSettings,
    pub registry: RegistrySettings,
}

impl Settings {
    /// Loads settings from defaults, the optional config file and the
    /// environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(
                Environment::with_prefix("DID_NFT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000_i64)?
            .set_default("log_level", "info")?
            .set_default("mint.mode", "did")?
            .set_default("registry.delete_policy", "explicit")
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| ConfigError::Message(format!("invalid server address: {}", e)))
    }

    /// Mint authority described by the settings.
    ///
    /// # Errors
    /// Fails if `mint.mode` is `fixed` and `mint.verifier_address` is missing
    /// or not a `0x`-prefixed 20-byte address.
    pub fn mint_mode(&self) -> Result<MintMode, ConfigError> {
        match self.mint.mode {
            MintModeSetting::Did => Ok(MintMode::DidBound),
            MintModeSetting::Fixed => {
                let raw = self.mint.verifier_address.as_deref().ok_or_else(|| {
                    ConfigError::Message("mint.verifier_address is required in fixed mode".into())
                })?;
                parse_address(raw).map(MintMode::Fixed).ok_or_else(|| {
                    ConfigError::Message(format!("mint.verifier_address {} is not an address", raw))
                })
            }
        }
    }

    /// Registry policies; DID-bound minting always requires address keys.
    pub fn registry_config(&self) -> RegistryConfig {
        let public_key_policy = match self.mint.mode {
            MintModeSetting::Did => PublicKeyPolicy::Address,
            MintModeSetting::Fixed => self.registry.public_key_policy.unwrap_or_default(),
        };
        RegistryConfig {
            delete_policy: self.registry.delete_policy,
            public_key_policy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings_with(overrides: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let mut builder = Settings::defaults()?;
        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }
        builder.build()?.try_deserialize()
    }

    #[test]
    fn test_defaults() {
        let settings = settings_with(&[]).unwrap();

        assert_eq!(settings.socket_addr().unwrap().to_string(), "127.0.0.1:3000");
        assert_eq!(settings.log_level, "info");
        assert_eq!(settings.mint_mode().unwrap(), MintMode::DidBound);
        assert_eq!(
            settings.registry_config(),
            RegistryConfig {
                delete_policy: DeletePolicy::Explicit,
                public_key_policy: PublicKeyPolicy::Address,
            }
        );
    }

    #[test]
    fn test_did_mode_forces_address_keys() {
        let settings = settings_with(&[("registry.public_key_policy", "opaque")]).unwrap();
        assert_eq!(settings.registry_config().public_key_policy, PublicKeyPolicy::Address);
    }

    #[test]
    fn test_fixed_mode_requires_verifier() {
        let settings = settings_with(&[("mint.mode", "fixed")]).unwrap();
        assert!(settings.mint_mode().is_err());

        let settings = settings_with(&[
            ("mint.mode", "fixed"),
            ("mint.verifier_address", "not-an-address"),
        ])
        .unwrap();
        assert!(settings.mint_mode().is_err());
    }

    #[test]
    fn test_fixed_mode_with_verifier() {
        let settings = settings_with(&[
            ("mint.mode", "fixed"),
            ("mint.verifier_address", "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"),
            ("registry.delete_policy", "legacy"),
        ])
        .unwrap();

        let expected = parse_address("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed").unwrap();
        assert_eq!(settings.mint_mode().unwrap(), MintMode::Fixed(expected));
        assert_eq!(
            settings.registry_config(),
            RegistryConfig {
                delete_policy: DeletePolicy::Legacy,
                public_key_policy: PublicKeyPolicy::Opaque,
            }
        );
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        assert!(settings_with(&[("mint.mode", "bogus")]).is_err());
    }
}
