//! Classification of native-wallet address strings.

use core::fmt;

use crate::constants::{
    IDENTITY_PREFIX, P2SH_PREFIX, SAPLING_PREFIX, SHIELDED_PREFIX, SPROUT_PREFIX,
};
use crate::{PoolType, ShieldedProtocol};

/// The semantic kind of an address as presented to wallet users.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum AddressTag {
    /// A transparent address the wallet handed out.
    #[cfg_attr(feature = "serde", serde(rename = "public"))]
    Public,
    /// A transparent address that has only been observed receiving change.
    ///
    /// This tag is provisional: it is only ever assigned from grouping context, and is
    /// replaced by the prefix classification once the address is seen with an account.
    #[cfg_attr(feature = "serde", serde(rename = "change"))]
    Change,
    /// A transparent pay-to-script-hash address.
    #[cfg_attr(feature = "serde", serde(rename = "P2SH"))]
    P2sh,
    /// The transparent address of an identity.
    #[cfg_attr(feature = "serde", serde(rename = "identity"))]
    Identity,
    /// A Sapling payment address.
    #[cfg_attr(feature = "serde", serde(rename = "sapling"))]
    Sapling,
    /// A Sprout payment address.
    #[cfg_attr(feature = "serde", serde(rename = "sprout"))]
    Sprout,
}

impl AddressTag {
    /// Classifies an address by its prefix.
    ///
    /// | prefix | tag                       |
    /// |--------|---------------------------|
    /// | `zc`   | [`AddressTag::Sprout`]    |
    /// | `zs`   | [`AddressTag::Sapling`]   |
    /// | `i`    | [`AddressTag::Identity`]  |
    /// | `b`    | [`AddressTag::P2sh`]      |
    /// | other  | [`AddressTag::Public`]    |
    ///
    /// This never returns [`AddressTag::Change`]; see [`AddressTag::classify_grouped`].
    pub fn classify(address: &str) -> Self {
        if address.starts_with(SPROUT_PREFIX) {
            AddressTag::Sprout
        } else if address.starts_with(SAPLING_PREFIX) {
            AddressTag::Sapling
        } else if address.starts_with(SHIELDED_PREFIX) {
            // Unknown shielded encodings fall through to the transparent default.
            AddressTag::Public
        } else if address.starts_with(IDENTITY_PREFIX) {
            AddressTag::Identity
        } else if address.starts_with(P2SH_PREFIX) {
            AddressTag::P2sh
        } else {
            AddressTag::Public
        }
    }

    /// Classifies an address observed in the daemon's address groupings.
    ///
    /// An address that starts with `change_prefix` and was reported without an account is
    /// tagged [`AddressTag::Change`]; everything else is classified by
    /// [`AddressTag::classify`].
    pub fn classify_grouped(address: &str, change_prefix: char, has_account: bool) -> Self {
        if !has_account && address.starts_with(change_prefix) {
            AddressTag::Change
        } else {
            Self::classify(address)
        }
    }

    /// Returns the tag this one becomes once the address has been seen with an account.
    ///
    /// Only [`AddressTag::Change`] is provisional; every other tag is returned unchanged.
    pub fn promote(self, address: &str) -> Self {
        match self {
            AddressTag::Change => Self::classify(address),
            other => other,
        }
    }

    /// Returns the value pool that funds held at an address with this tag live in.
    pub fn pool_type(&self) -> PoolType {
        match self {
            AddressTag::Sprout => PoolType::Shielded(ShieldedProtocol::Sprout),
            AddressTag::Sapling => PoolType::Shielded(ShieldedProtocol::Sapling),
            AddressTag::Public | AddressTag::Change | AddressTag::P2sh | AddressTag::Identity => {
                PoolType::Transparent
            }
        }
    }

    /// Returns `true` for Sapling and Sprout addresses.
    pub fn is_shielded(&self) -> bool {
        self.pool_type().is_shielded()
    }

    /// The name used for this tag in wallet responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            AddressTag::Public => "public",
            AddressTag::Change => "change",
            AddressTag::P2sh => "P2SH",
            AddressTag::Identity => "identity",
            AddressTag::Sapling => "sapling",
            AddressTag::Sprout => "sprout",
        }
    }
}

impl fmt::Display for AddressTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(any(test, feature = "test-dependencies"))]
pub mod testing {
    use proptest::prelude::*;

    prop_compose! {
        /// A transparent P2PKH address string.
        pub fn arb_p2pkh_address()(body in "[1-9A-HJ-NP-Za-km-z]{33}") -> String {
            format!("R{}", body)
        }
    }

    /// An address string drawn from every prefix the classifier distinguishes.
    pub fn arb_address() -> impl Strategy<Value = String> {
        prop_oneof![
            arb_p2pkh_address(),
            "[1-9A-HJ-NP-Za-km-z]{33}".prop_map(|b| format!("b{}", b)),
            "[1-9A-HJ-NP-Za-km-z]{33}".prop_map(|b| format!("i{}", b)),
            "[02-9ac-hj-np-z]{76}".prop_map(|b| format!("zs1{}", b)),
            "[1-9A-HJ-NP-Za-km-z]{93}".prop_map(|b| format!("zc{}", b)),
        ]
    }
}
