//! Functions for reading the wallet's identities and attaching their balances.

use std::collections::BTreeMap;

use futures_util::try_join;
use serde_json::{Map, Value};
use tracing::{debug, warn};
use verus_protocol::{address::AddressTag, value::Amount};

use crate::accountant::BalanceAccountant;
use crate::config::IdentityQuery;
use crate::daemon::{methods, BalanceQuery, Daemon};
use crate::error::Error;
use crate::reply::{self, IdentityEntry};
use crate::wallet::{
    AddressRecord, Identity, IdentityAddresses, IdentityBalances, IdentityRecord,
    NativeBalances, PrivateBalance, PublicBalance,
};

/// Builds the record for one identity from its balances.
fn identity_record(
    identity: Identity,
    mut fields: Map<String, Value>,
    transparent_balance: Amount,
    shielded_balance: Option<Amount>,
) -> IdentityRecord {
    // These keys are replaced by the computed fields.
    fields.remove("balances");
    fields.remove("addresses");

    let transparent = AddressRecord::new(
        identity.identity_address.clone(),
        AddressTag::Identity,
        transparent_balance,
    );
    let shielded = identity
        .private_address
        .clone()
        .map(|address| AddressRecord::new(address, AddressTag::Sapling, shielded_balance));

    IdentityRecord {
        identity,
        fields,
        balances: IdentityBalances {
            native: NativeBalances {
                public: PublicBalance {
                    confirmed: transparent_balance,
                    unconfirmed: None,
                    immature: None,
                },
                private: PrivateBalance {
                    confirmed: shielded_balance,
                },
            },
            reserve: BTreeMap::new(),
        },
        addresses: IdentityAddresses {
            public: vec![transparent],
            private: shielded.into_iter().collect(),
        },
    }
}

/// Returns the wallet's identities selected by `query`, each with its balances.
///
/// The balance of every identity address is queried. A failure to read the transparent
/// balance of any identity fails the whole request; a failure to read a shielded balance
/// is logged and leaves that balance unset. If the wallet info cannot be read, balance
/// lookups are made without the cache.
#[tracing::instrument(skip(daemon))]
pub async fn resolve_identities<D: Daemon>(
    daemon: &D,
    coin: &str,
    query: &IdentityQuery,
) -> Result<Vec<IdentityRecord>, Error<D::Error>> {
    let (identities, totals) = try_join!(
        reply::list_identities(
            daemon,
            coin,
            query.include_can_spend,
            query.include_can_sign,
            query.include_watch_only,
        ),
        reply::total_balance(daemon, coin),
    )?;

    if identities.is_empty() {
        return Ok(vec![]);
    }

    let txcount = match reply::wallet_info(daemon, coin).await {
        Ok(info) => Some(info.txcount),
        Err(e) => {
            warn!("Not using address balance cache: {}", e);
            None
        }
    };
    let balance_query = BalanceQuery::new(txcount, totals.total);
    debug!(count = identities.len(), "Resolving identity balances");

    let mut accountant = BalanceAccountant::exhaustive();
    let mut records = Vec::with_capacity(identities.len());
    for IdentityEntry { identity, fields } in identities {
        let t_address = &identity.identity_address;
        let t_balance = accountant
            .lookup(
                daemon,
                coin,
                AddressTag::Identity.pool_type(),
                t_address,
                &balance_query,
            )
            .await?;

        let mut z_balance = None;
        if let Some(z_address) = &identity.private_address {
            let pool = AddressTag::Sapling.pool_type();
            match accountant
                .lookup(daemon, coin, pool, z_address, &balance_query)
                .await
            {
                Ok(balance) => z_balance = Some(balance),
                Err(e) => {
                    warn!(identity = %t_address, "Failed to read shielded balance: {}", e);
                }
            }
        }

        records.push(identity_record(identity, fields, t_balance, z_balance));
    }

    Ok(records)
}

/// Looks up a single identity by name or address.
///
/// Returns the daemon's reply unchanged, or `None` if the daemon reports no such identity
/// with a `null` reply.
#[tracing::instrument(skip(daemon))]
pub async fn resolve_identity<D: Daemon>(
    daemon: &D,
    coin: &str,
    name: &str,
) -> Result<Option<Value>, Error<D::Error>> {
    match reply::call(daemon, coin, methods::GET_IDENTITY, vec![Value::from(name)]).await? {
        Value::Null => Ok(None),
        identity => Ok(Some(identity)),
    }
}
