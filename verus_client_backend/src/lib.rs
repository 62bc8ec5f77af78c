//! *A crate for reconciling the wallet views of a Verus native daemon.*
//!
//! `verus_client_backend` turns the raw, partially overlapping wallet reports of a
//! full-node daemon (address groupings, account address lists, shielded totals, wallet
//! metadata, shielded address lists and identity lists) into a single normalized view:
//! a deduplicated set of addresses and identities, each tagged by type and each carrying
//! a confirmed balance.
//!
//! The daemon itself is an external collaborator, accessed through the [`daemon::Daemon`]
//! trait. The entry points are:
//!
//! - [`reconcile::resolve_addresses`], which merges the address groupings with the account
//!   and shielded address lists;
//! - [`identity::resolve_identities`] and [`identity::resolve_identity`], which attach
//!   balances to the wallet's identities;
//! - the helpers in [`address`] for validating and creating addresses.
//!
//! ## Feature flags
#![doc = document_features::document_features!()]
//!

#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
// Catch documentation errors caused by code changes.
#![deny(rustdoc::broken_intra_doc_links)]

pub mod accountant;
pub mod address;
pub mod config;
pub mod daemon;
pub mod error;
pub mod filter;
pub mod identity;
pub mod reconcile;
pub mod reply;
pub mod wallet;

#[cfg(any(test, feature = "test-dependencies"))]
pub mod testing;

pub use error::Error;
pub use verus_protocol::{address::AddressTag, value::Amount, PoolType, ShieldedProtocol};
