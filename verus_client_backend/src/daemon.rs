//! Access to a running native daemon.
//!
//! Nothing in this crate talks to a daemon directly; every remote call goes through an
//! implementation of [`Daemon`] supplied by the caller. The handle is passed into each
//! operation, so one process can serve several coins (or several daemons) at once.

use std::error;

use serde_json::Value;
use verus_protocol::value::Amount;

/// Names of the daemon methods this crate calls.
pub mod methods {
    pub const LIST_ADDRESS_GROUPINGS: &str = "listaddressgroupings";
    pub const GET_ADDRESSES_BY_ACCOUNT: &str = "getaddressesbyaccount";
    pub const Z_GET_TOTAL_BALANCE: &str = "z_gettotalbalance";
    pub const GET_WALLET_INFO: &str = "getwalletinfo";
    pub const Z_LIST_ADDRESSES: &str = "z_listaddresses";
    pub const LIST_IDENTITIES: &str = "listidentities";
    pub const GET_IDENTITY: &str = "getidentity";
    pub const VALIDATE_ADDRESS: &str = "validateaddress";
    pub const Z_VALIDATE_ADDRESS: &str = "z_validateaddress";
    pub const GET_NEW_ADDRESS: &str = "getnewaddress";
    pub const Z_GET_NEW_ADDRESS: &str = "z_getnewaddress";
}

/// Hints passed along with every per-address balance query.
///
/// Balance queries may be answered from a cache keyed by the wallet's transaction count;
/// the cache is only trustworthy when the transaction count could be read for this
/// request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BalanceQuery {
    /// Whether a cached balance may be returned.
    pub use_cache: bool,
    /// The wallet's transaction count at the start of the request, if known.
    pub txcount: Option<u64>,
    /// The wallet's total balance at the start of the request.
    pub total_balance: Amount,
}

impl BalanceQuery {
    /// Builds the query hints from an optional wallet transaction count.
    ///
    /// The cache is enabled exactly when the transaction count is known.
    pub fn new(txcount: Option<u64>, total_balance: Amount) -> Self {
        BalanceQuery {
            use_cache: txcount.is_some(),
            txcount,
            total_balance,
        }
    }
}

/// A handle to a native daemon.
#[trait_variant::make(Send)]
pub trait Daemon: Sync {
    /// The error returned when a call cannot be completed or is rejected by the daemon.
    type Error: error::Error + Send + Sync + 'static;

    /// Invokes `method` with the given positional `params` on the daemon for `coin`,
    /// returning the parsed reply.
    async fn call(
        &self,
        coin: &str,
        method: &str,
        params: Vec<Value>,
    ) -> Result<Value, Self::Error>;

    /// Returns the confirmed balance held at `address`.
    ///
    /// This is the expensive per-address query that the
    /// [`BalanceAccountant`](crate::accountant::BalanceAccountant) exists to avoid.
    async fn address_balance(
        &self,
        coin: &str,
        address: &str,
        query: &BalanceQuery,
    ) -> Result<Amount, Self::Error>;
}
