//! Utilities for testing code that talks to a native daemon.

use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

use proptest::collection::vec;
use proptest::prelude::*;
use serde_json::Value;
use verus_protocol::value::{testing::arb_amount, Amount};

use crate::daemon::{BalanceQuery, Daemon};
use crate::reply::{AddressGrouping, GroupingEntry};

/// The error returned by [`MockDaemon`] for scripted failures and unscripted calls.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MockError(pub String);

impl fmt::Display for MockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for MockError {}

/// A call received by a [`MockDaemon`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MockCall {
    Rpc {
        coin: String,
        method: String,
        params: Vec<Value>,
    },
    Balance {
        coin: String,
        address: String,
        query: BalanceQuery,
    },
}

/// An in-memory daemon that answers from scripted replies and records every call.
///
/// Methods and addresses without a scripted answer fail, so tests notice calls they did
/// not expect.
#[derive(Debug, Default)]
pub struct MockDaemon {
    replies: HashMap<String, Result<Value, MockError>>,
    balances: HashMap<String, Result<Amount, MockError>>,
    calls: Mutex<Vec<MockCall>>,
}

impl MockDaemon {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the reply to `method`.
    pub fn with_reply(mut self, method: &str, reply: Value) -> Self {
        self.replies.insert(method.to_owned(), Ok(reply));
        self
    }

    /// Scripts `method` to fail with `message`.
    pub fn with_failure(mut self, method: &str, message: &str) -> Self {
        self.replies
            .insert(method.to_owned(), Err(MockError(message.to_owned())));
        self
    }

    /// Scripts the balance of `address`.
    pub fn with_balance(mut self, address: impl Into<String>, balance: Amount) -> Self {
        self.balances.insert(address.into(), Ok(balance));
        self
    }

    /// Scripts the balance lookup for `address` to fail with `message`.
    pub fn with_balance_failure(mut self, address: &str, message: &str) -> Self {
        self.balances
            .insert(address.to_owned(), Err(MockError(message.to_owned())));
        self
    }

    /// Returns every call received so far, in order.
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Returns the methods of the RPC calls received so far, in order.
    pub fn rpc_methods(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                MockCall::Rpc { method, .. } => Some(method),
                MockCall::Balance { .. } => None,
            })
            .collect()
    }

    /// Returns the addresses whose balances were looked up so far, in order.
    pub fn balance_lookups(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                MockCall::Balance { address, .. } => Some(address),
                MockCall::Rpc { .. } => None,
            })
            .collect()
    }

    /// Returns the query hints passed with each balance lookup so far, in order.
    pub fn balance_queries(&self) -> Vec<BalanceQuery> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                MockCall::Balance { query, .. } => Some(query),
                MockCall::Rpc { .. } => None,
            })
            .collect()
    }
}

impl Daemon for MockDaemon {
    type Error = MockError;

    async fn call(
        &self,
        coin: &str,
        method: &str,
        params: Vec<Value>,
    ) -> Result<Value, Self::Error> {
        self.calls.lock().unwrap().push(MockCall::Rpc {
            coin: coin.to_owned(),
            method: method.to_owned(),
            params,
        });
        self.replies
            .get(method)
            .cloned()
            .unwrap_or_else(|| Err(MockError(format!("no reply scripted for {}", method))))
    }

    async fn address_balance(
        &self,
        coin: &str,
        address: &str,
        query: &BalanceQuery,
    ) -> Result<Amount, Self::Error> {
        self.calls.lock().unwrap().push(MockCall::Balance {
            coin: coin.to_owned(),
            address: address.to_owned(),
            query: query.clone(),
        });
        self.balances
            .get(address)
            .cloned()
            .unwrap_or_else(|| Err(MockError(format!("no balance scripted for {}", address))))
    }
}

/// Drives a future to completion on a single-threaded runtime.
#[cfg(test)]
pub(crate) fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
        .block_on(future)
}

/// A small fixed pool of transparent addresses, so that generated groupings repeat
/// addresses across tuples and groups.
pub const GROUPING_ADDRESSES: [&str; 6] = [
    "RCdXBieidGuXmK8Tw2gBoXWxi16UgqyKc7",
    "RWKwahmqTBQ8LsEqfmQLWQwJWYAYuk2qFz",
    "RQEZxwuQgVWbVBsU2rp7CP2eTvDZnMkkAd",
    "bRVNGoycB4EGnPSYwW8bbGtLqiGngHJJ1p",
    "iJhCezBExJHvtyH3fGhNnt2NhU4Ztkf2yq",
    "RBMkjDrgv8T6qRJUeFBpzCXPG6mYXZuuqW",
];

prop_compose! {
    /// A grouping tuple drawn from [`GROUPING_ADDRESSES`], with or without an account.
    pub fn arb_grouping_entry()(
        address in proptest::sample::select(GROUPING_ADDRESSES.to_vec()),
        balance in arb_amount(),
        account in proptest::option::of(prop_oneof![Just(""), Just("savings")]),
    ) -> GroupingEntry {
        GroupingEntry::new(address, balance, account)
    }
}

/// A `listaddressgroupings` result with frequent duplicate addresses.
pub fn arb_groupings() -> impl Strategy<Value = Vec<AddressGrouping>> {
    vec(vec(arb_grouping_entry(), 0..5), 0..5)
}

/// Encodes groupings the way `listaddressgroupings` returns them.
pub fn groupings_to_json(groupings: &[AddressGrouping]) -> Value {
    Value::Array(
        groupings
            .iter()
            .map(|group| {
                Value::Array(
                    group
                        .iter()
                        .map(|entry| {
                            let mut tuple = vec![
                                Value::from(entry.address.clone()),
                                Value::from(entry.balance.to_string()),
                            ];
                            if let Some(account) = &entry.account {
                                tuple.push(Value::from(account.clone()));
                            }
                            Value::Array(tuple)
                        })
                        .collect(),
                )
            })
            .collect(),
    )
}
