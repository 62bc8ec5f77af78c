//! Structs representing the normalized wallet view returned to callers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use verus_protocol::{address::AddressTag, value::Amount};

/// The balances held at a single address.
///
/// `V` is the native balance type; it is `Option<Amount>` only where a balance lookup is
/// allowed to fail without failing the whole request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AddressBalances<V = Amount> {
    /// The confirmed balance in the chain's native currency.
    pub native: V,
    /// Balances of reserve currencies, keyed by currency symbol.
    pub reserve: BTreeMap<String, Amount>,
}

impl<V> AddressBalances<V> {
    /// Balances with only a native component.
    pub fn native(native: V) -> Self {
        AddressBalances {
            native,
            reserve: BTreeMap::new(),
        }
    }
}

/// A tagged wallet address together with its balances.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AddressRecord<V = Amount> {
    pub address: String,
    pub tag: AddressTag,
    pub balances: AddressBalances<V>,
}

impl<V> AddressRecord<V> {
    pub fn new(address: impl Into<String>, tag: AddressTag, native: V) -> Self {
        AddressRecord {
            address: address.into(),
            tag,
            balances: AddressBalances::native(native),
        }
    }
}

/// The result of [`resolve_addresses`](crate::reconcile::resolve_addresses).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AddressList {
    /// Transparent addresses (public, change, P2SH and identity tags).
    pub public: Vec<AddressRecord>,
    /// Sapling and Sprout addresses.
    pub private: Vec<AddressRecord>,
}

impl AddressList {
    /// Iterates over every address in the list, public addresses first.
    pub fn iter(&self) -> impl Iterator<Item = &AddressRecord> {
        self.public.iter().chain(self.private.iter())
    }
}

/// The transparent balance of an identity.
///
/// Only the confirmed balance is computed; the other fields are placeholders that are
/// always `None`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PublicBalance {
    pub confirmed: Amount,
    pub unconfirmed: Option<Amount>,
    pub immature: Option<Amount>,
}

/// The shielded balance of an identity; `None` when unavailable.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PrivateBalance {
    pub confirmed: Option<Amount>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NativeBalances {
    pub public: PublicBalance,
    pub private: PrivateBalance,
}

/// The combined balances of an identity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct IdentityBalances {
    pub native: NativeBalances,
    pub reserve: BTreeMap<String, Amount>,
}

/// The addresses linked to an identity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct IdentityAddresses {
    /// The identity's own transparent address, tagged [`AddressTag::Identity`].
    pub public: Vec<AddressRecord>,
    /// The identity's shielded address, if it has one, tagged [`AddressTag::Sapling`].
    pub private: Vec<AddressRecord<Option<Amount>>>,
}

/// The `identity` object of a daemon identity entry.
///
/// Only the addresses are read; every other field is kept as-is.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(rename = "identityaddress")]
    pub identity_address: String,
    #[serde(
        rename = "privateaddress",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub private_address: Option<String>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// A wallet identity as reported by the daemon, enriched with its balances.
///
/// The daemon's entry is kept as-is and serialized alongside the `balances` and
/// `addresses` fields added here.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct IdentityRecord {
    pub identity: Identity,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
    pub balances: IdentityBalances,
    pub addresses: IdentityAddresses,
}
