//! *A crate for Verus native-wallet value types and address classification.*
//!
//! `verus_protocol` contains the types shared by everything that reasons about a native
//! wallet's funds: [`value::Amount`] for coin values reported by the daemon, the
//! [`PoolType`] a value lives in, and the [`address::AddressTag`] classification derived
//! from an address's prefix.
//!
#![cfg_attr(feature = "std", doc = "## Feature flags")]
#![cfg_attr(feature = "std", doc = document_features::document_features!())]
//!

#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
// Catch documentation errors caused by code changes.
#![deny(rustdoc::broken_intra_doc_links)]

use core::fmt;

pub mod address;
pub mod constants;
pub mod value;

/// A Verus shielded transfer protocol.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ShieldedProtocol {
    /// The Sprout protocol
    Sprout,
    /// The Sapling protocol
    Sapling,
}

/// A value pool tracked by a native wallet.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PoolType {
    /// The transparent value pool
    Transparent,
    /// A shielded value pool.
    Shielded(ShieldedProtocol),
}

impl PoolType {
    pub const TRANSPARENT: PoolType = PoolType::Transparent;
    pub const SPROUT: PoolType = PoolType::Shielded(ShieldedProtocol::Sprout);
    pub const SAPLING: PoolType = PoolType::Shielded(ShieldedProtocol::Sapling);

    /// Returns `true` for either of the shielded pools.
    pub fn is_shielded(&self) -> bool {
        matches!(self, PoolType::Shielded(_))
    }
}

impl fmt::Display for PoolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolType::Transparent => f.write_str("Transparent"),
            PoolType::Shielded(ShieldedProtocol::Sprout) => f.write_str("Sprout"),
            PoolType::Shielded(ShieldedProtocol::Sapling) => f.write_str("Sapling"),
        }
    }
}
