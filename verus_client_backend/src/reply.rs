//! Typed views of daemon replies.
//!
//! Daemon replies arrive as untyped JSON. The functions here call a single daemon method
//! and deserialize its reply, failing with [`Error::MalformedReply`] when the reply does
//! not have the shape the method documents.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::trace;
use verus_protocol::value::Amount;

use crate::daemon::{methods, Daemon};
use crate::error::{Error, ReplyError};
use crate::wallet::Identity;

/// One `[address, balance, account?]` tuple of `listaddressgroupings`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(from = "GroupingTuple")]
pub struct GroupingEntry {
    pub address: String,
    pub balance: Amount,
    /// The account the address belongs to. Change addresses are reported without one.
    pub account: Option<String>,
}

/// The wire form of a [`GroupingEntry`]: a 2- or 3-element array.
#[derive(Deserialize)]
struct GroupingTuple(String, Amount, #[serde(default)] Option<String>);

impl From<GroupingTuple> for GroupingEntry {
    fn from(GroupingTuple(address, balance, account): GroupingTuple) -> Self {
        GroupingEntry {
            address,
            balance,
            account,
        }
    }
}

impl GroupingEntry {
    pub fn new(address: impl Into<String>, balance: Amount, account: Option<&str>) -> Self {
        GroupingEntry {
            address: address.into(),
            balance,
            account: account.map(str::to_owned),
        }
    }

    /// Returns `true` if the daemon reported an account field for this entry.
    pub fn has_account(&self) -> bool {
        self.account.is_some()
    }
}

/// A group of addresses that the daemon has seen used together.
pub type AddressGrouping = Vec<GroupingEntry>;

/// The reply of `z_gettotalbalance`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct TotalBalance {
    pub transparent: Amount,
    pub private: Amount,
    pub total: Amount,
}

/// The part of `getwalletinfo` this crate relies on.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct WalletInfo {
    pub txcount: u64,
}

/// One entry of `listidentities`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct IdentityEntry {
    pub identity: Identity,
    /// The remaining fields of the entry, such as `status` and `canspendfor`.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// Deserializes the reply of `method`.
pub fn parse<T: DeserializeOwned>(method: &'static str, reply: Value) -> Result<T, ReplyError> {
    serde_json::from_value(reply).map_err(|e| ReplyError::new(method, e.to_string()))
}

/// Calls `method` and returns the raw reply.
pub async fn call<D: Daemon>(
    daemon: &D,
    coin: &str,
    method: &'static str,
    params: Vec<Value>,
) -> Result<Value, Error<D::Error>> {
    trace!(coin, method, "Calling daemon");
    daemon
        .call(coin, method, params)
        .await
        .map_err(Error::Daemon)
}

/// Calls `method` and deserializes its reply.
async fn call_parsed<D: Daemon, T: DeserializeOwned>(
    daemon: &D,
    coin: &str,
    method: &'static str,
    params: Vec<Value>,
) -> Result<T, Error<D::Error>> {
    let reply = call(daemon, coin, method, params).await?;
    Ok(parse(method, reply)?)
}

/// Calls `listaddressgroupings`.
pub async fn list_address_groupings<D: Daemon>(
    daemon: &D,
    coin: &str,
) -> Result<Vec<AddressGrouping>, Error<D::Error>> {
    call_parsed(daemon, coin, methods::LIST_ADDRESS_GROUPINGS, vec![]).await
}

/// Calls `getaddressesbyaccount` for the default (`""`) account.
pub async fn addresses_by_account<D: Daemon>(
    daemon: &D,
    coin: &str,
) -> Result<Vec<String>, Error<D::Error>> {
    let params = vec![Value::from("")];
    call_parsed(daemon, coin, methods::GET_ADDRESSES_BY_ACCOUNT, params).await
}

/// Calls `z_listaddresses`.
pub async fn shielded_addresses<D: Daemon>(
    daemon: &D,
    coin: &str,
) -> Result<Vec<String>, Error<D::Error>> {
    call_parsed(daemon, coin, methods::Z_LIST_ADDRESSES, vec![]).await
}

/// Calls `z_gettotalbalance`.
pub async fn total_balance<D: Daemon>(
    daemon: &D,
    coin: &str,
) -> Result<TotalBalance, Error<D::Error>> {
    call_parsed(daemon, coin, methods::Z_GET_TOTAL_BALANCE, vec![]).await
}

/// Calls `getwalletinfo`.
pub async fn wallet_info<D: Daemon>(
    daemon: &D,
    coin: &str,
) -> Result<WalletInfo, Error<D::Error>> {
    call_parsed(daemon, coin, methods::GET_WALLET_INFO, vec![]).await
}

/// Calls `listidentities` with the given inclusion flags.
///
/// A `null` reply means the wallet holds no identities.
pub async fn list_identities<D: Daemon>(
    daemon: &D,
    coin: &str,
    include_can_spend: bool,
    include_can_sign: bool,
    include_watch_only: bool,
) -> Result<Vec<IdentityEntry>, Error<D::Error>> {
    let params = vec![
        Value::from(include_can_spend),
        Value::from(include_can_sign),
        Value::from(include_watch_only),
    ];
    let identities: Option<Vec<IdentityEntry>> =
        call_parsed(daemon, coin, methods::LIST_IDENTITIES, params).await?;
    Ok(identities.unwrap_or_default())
}
