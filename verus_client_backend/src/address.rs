//! Helpers for validating and creating wallet addresses.

use serde::Deserialize;
use serde_json::Value;
use verus_protocol::constants::SHIELDED_PREFIX;

use crate::daemon::{methods, Daemon};
use crate::error::Error;
use crate::reply;

/// The fields of a validation reply that identify an address's key.
#[derive(Deserialize)]
struct KeyInfo {
    pubkey: Option<String>,
    #[serde(rename = "scriptPubKey")]
    script_pubkey: Option<String>,
}

fn validation_method(address: &str) -> &'static str {
    if address.starts_with(SHIELDED_PREFIX) {
        methods::Z_VALIDATE_ADDRESS
    } else {
        methods::VALIDATE_ADDRESS
    }
}

/// Asks the daemon to validate `address`, returning its reply unchanged.
///
/// Shielded addresses are validated with `z_validateaddress`, all others with
/// `validateaddress`.
pub async fn validate_address<D: Daemon>(
    daemon: &D,
    coin: &str,
    address: &str,
) -> Result<Value, Error<D::Error>> {
    let params = vec![Value::from(address)];
    reply::call(daemon, coin, validation_method(address), params).await
}

/// Asks the daemon to generate a new shielded or transparent address.
pub async fn new_address<D: Daemon>(
    daemon: &D,
    coin: &str,
    shielded: bool,
) -> Result<String, Error<D::Error>> {
    let method = if shielded {
        methods::Z_GET_NEW_ADDRESS
    } else {
        methods::GET_NEW_ADDRESS
    };
    let reply = reply::call(daemon, coin, method, vec![]).await?;
    Ok(reply::parse(method, reply)?)
}

/// Returns the public key of `address`, or its output script if the daemon does not
/// report a key.
///
/// Fails with [`Error::NoPublicKey`] if the validation reply contains neither.
pub async fn public_key<D: Daemon>(
    daemon: &D,
    coin: &str,
    address: &str,
) -> Result<String, Error<D::Error>> {
    let validation = validate_address(daemon, coin, address).await?;
    let info: KeyInfo = reply::parse(validation_method(address), validation)?;

    [info.pubkey, info.script_pubkey]
        .into_iter()
        .flatten()
        .find(|key| !key.is_empty())
        .ok_or_else(|| Error::NoPublicKey(address.to_owned()))
}
