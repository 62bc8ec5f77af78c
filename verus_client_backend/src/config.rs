//! Process-wide settings for native wallet requests.
//!
//! Settings are read once and passed by reference into each request; nothing here is
//! mutated while a request is in flight.

use serde::Deserialize;
use serde_json::Value;
use verus_protocol::constants::P2PKH_PREFIX;

use crate::filter::VisibilityFilter;

/// Settings for native-daemon coins.
///
/// Deserializes from the `general.native` section of the application configuration,
/// whose keys are camel-cased. Missing keys take their default values.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NativeConfig {
    /// Show change addresses whose balance is zero. Defaults to `false`.
    pub include_empty_change_addrs: bool,
    /// Show P2SH addresses. Defaults to `false`.
    pub include_p2sh_addrs: bool,
    /// The leading character of addresses that may be change. Defaults to `R`.
    pub change_address_prefix: char,
}

impl Default for NativeConfig {
    fn default() -> Self {
        NativeConfig {
            include_empty_change_addrs: false,
            include_p2sh_addrs: false,
            change_address_prefix: P2PKH_PREFIX,
        }
    }
}

impl NativeConfig {
    /// Parses the settings from a JSON document containing only the native section.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Extracts the settings from a full application configuration document.
    ///
    /// A document without a `general.native` section yields the defaults.
    pub fn from_app_config(app_config: &Value) -> Result<Self, serde_json::Error> {
        match app_config.pointer("/general/native") {
            Some(native) => NativeConfig::deserialize(native),
            None => Ok(NativeConfig::default()),
        }
    }

    /// The visibility rules applied to reconciled addresses.
    pub fn visibility(&self) -> VisibilityFilter {
        VisibilityFilter {
            include_empty_change_addrs: self.include_empty_change_addrs,
            include_p2sh_addrs: self.include_p2sh_addrs,
        }
    }
}

/// Which identities `listidentities` should report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IdentityQuery {
    /// Identities the wallet can spend from. Defaults to `true`.
    pub include_can_spend: bool,
    /// Identities the wallet can sign for. Defaults to `false`.
    pub include_can_sign: bool,
    /// Watch-only identities. Defaults to `false`.
    pub include_watch_only: bool,
}

impl Default for IdentityQuery {
    fn default() -> Self {
        IdentityQuery {
            include_can_spend: true,
            include_can_sign: false,
            include_watch_only: false,
        }
    }
}
