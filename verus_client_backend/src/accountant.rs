//! Bounding the number of per-address balance queries.
//!
//! Asking the daemon for the balance of a single address is expensive, while the wallet's
//! transparent and shielded totals are cheap to obtain once. A [`BalanceAccountant`]
//! tracks how much of each total has already been attributed to specific addresses and
//! skips the per-address query once a total is fully explained.
//!
//! This is a heuristic. If the totals are stale relative to the address lists they are
//! compared against, addresses processed after a running sum reaches its total are
//! reported with a zero balance even if they hold funds.

use tracing::trace;
use verus_protocol::{
    value::{Amount, BalanceError},
    PoolType,
};

use crate::daemon::{BalanceQuery, Daemon};
use crate::error::Error;

/// A running sum measured against an optional known total.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Tally {
    seen: Amount,
    total: Option<Amount>,
}

impl Tally {
    fn bounded(total: Amount) -> Self {
        Tally {
            seen: Amount::ZERO,
            total: Some(total),
        }
    }

    fn unbounded() -> Self {
        Tally {
            seen: Amount::ZERO,
            total: None,
        }
    }

    /// Returns `true` once everything the total accounts for has been seen.
    fn is_exhausted(&self) -> bool {
        self.total.is_some_and(|total| self.seen >= total)
    }

    fn record(&mut self, value: Amount) -> Result<(), BalanceError> {
        self.seen = (self.seen + value).ok_or(BalanceError::Overflow)?;
        Ok(())
    }
}

/// Per-request accounting of transparent and shielded balances.
///
/// An accountant is created for a single request and must not be reused: its running
/// sums describe the addresses of that request only. Lookups must be issued one at a time
/// in the order addresses were discovered, since whether address *i* is queried depends on
/// the balances found for the addresses before it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BalanceAccountant {
    transparent: Tally,
    shielded: Tally,
}

impl BalanceAccountant {
    /// An accountant that stops querying a pool once `transparent_total` or
    /// `shielded_total` has been attributed.
    pub fn new(transparent_total: Amount, shielded_total: Amount) -> Self {
        BalanceAccountant {
            transparent: Tally::bounded(transparent_total),
            shielded: Tally::bounded(shielded_total),
        }
    }

    /// An accountant that queries every address it is asked about.
    pub fn exhaustive() -> Self {
        BalanceAccountant {
            transparent: Tally::unbounded(),
            shielded: Tally::unbounded(),
        }
    }

    fn tally_mut(&mut self, pool: PoolType) -> &mut Tally {
        match pool {
            PoolType::Transparent => &mut self.transparent,
            PoolType::Shielded(_) => &mut self.shielded,
        }
    }

    /// Returns the amount attributed so far to addresses in `pool`'s group.
    pub fn seen(&self, pool: PoolType) -> Amount {
        match pool {
            PoolType::Transparent => self.transparent.seen,
            PoolType::Shielded(_) => self.shielded.seen,
        }
    }

    /// Returns `true` if a lookup for an address in `pool` would be skipped.
    pub fn is_exhausted(&self, pool: PoolType) -> bool {
        match pool {
            PoolType::Transparent => self.transparent.is_exhausted(),
            PoolType::Shielded(_) => self.shielded.is_exhausted(),
        }
    }

    /// Attributes a balance that was learned without a lookup.
    pub fn record(&mut self, pool: PoolType, value: Amount) -> Result<(), BalanceError> {
        self.tally_mut(pool).record(value)
    }

    /// Returns the balance of `address`, querying the daemon only if `pool`'s total has not
    /// yet been fully attributed.
    ///
    /// A queried balance is added to the running sum for `pool`. A skipped lookup returns
    /// zero. Daemon failures are returned as-is and leave the running sums untouched.
    pub async fn lookup<D: Daemon>(
        &mut self,
        daemon: &D,
        coin: &str,
        pool: PoolType,
        address: &str,
        query: &BalanceQuery,
    ) -> Result<Amount, Error<D::Error>> {
        if self.is_exhausted(pool) {
            trace!(address, %pool, "Total reached; skipping balance lookup");
            return Ok(Amount::ZERO);
        }

        let balance = daemon
            .address_balance(coin, address, query)
            .await
            .map_err(Error::Daemon)?;
        trace!(address, %pool, %balance, "Looked up address balance");

        self.record(pool, balance)?;
        Ok(balance)
    }
}
