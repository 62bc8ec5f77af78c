//! Reconciling the daemon's address reports into a single address list.
//!
//! The daemon describes the wallet's addresses in several overlapping ways:
//!
//! - `listaddressgroupings` reports transparent addresses with their balances, grouped by
//!   common ownership. An address may appear in several groups, and change addresses are
//!   reported without an account.
//! - `getaddressesbyaccount` lists the addresses of the default account, including ones
//!   that have never been used and so do not appear in any grouping.
//! - `z_listaddresses` lists the wallet's shielded addresses.
//!
//! [`GroupingTable::fold`] merges the groupings into one record per address, and
//! [`resolve_addresses`] combines that table with the address lists, looking up balances
//! for the remaining addresses through a [`BalanceAccountant`].

use std::collections::{HashMap, HashSet};

use futures_util::join;
use tracing::{debug, warn};
use verus_protocol::{
    address::AddressTag,
    value::{Amount, BalanceError},
    PoolType,
};

use crate::accountant::BalanceAccountant;
use crate::config::NativeConfig;
use crate::daemon::{BalanceQuery, Daemon};
use crate::error::Error;
use crate::reply::{self, AddressGrouping, GroupingEntry};
use crate::wallet::{AddressList, AddressRecord};

/// The deduplicated contents of `listaddressgroupings`.
///
/// Records are kept in the order their addresses were first seen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupingTable {
    records: Vec<AddressRecord>,
    first_seen_balance: Amount,
}

/// Accumulator for [`GroupingTable::fold`].
#[derive(Default)]
struct Fold {
    records: Vec<AddressRecord>,
    index: HashMap<String, usize>,
    first_seen_balance: Amount,
}

impl Fold {
    fn step(mut self, entry: &GroupingEntry, change_prefix: char) -> Result<Self, BalanceError> {
        match self.index.get(&entry.address) {
            None => {
                let tag = AddressTag::classify_grouped(
                    &entry.address,
                    change_prefix,
                    entry.has_account(),
                );
                self.first_seen_balance =
                    (self.first_seen_balance + entry.balance).ok_or(BalanceError::Overflow)?;
                self.index.insert(entry.address.clone(), self.records.len());
                self.records
                    .push(AddressRecord::new(entry.address.clone(), tag, entry.balance));
            }
            Some(&i) => {
                let record = &mut self.records[i];
                record.balances.native =
                    (record.balances.native + entry.balance).ok_or(BalanceError::Overflow)?;
                if entry.has_account() {
                    record.tag = record.tag.promote(&entry.address);
                }
            }
        }
        Ok(self)
    }
}

impl GroupingTable {
    /// Merges grouping tuples into one record per address.
    ///
    /// The first tuple for an address decides its initial tag: an address starting with
    /// `change_prefix` and reported without an account is [`AddressTag::Change`], anything
    /// else is classified by prefix. Later tuples for the same address add their balance to
    /// the record, and a tuple that carries an account promotes a `Change` tag to the
    /// prefix classification. Tags other than `Change` are never revised.
    pub fn fold<'a>(
        groupings: impl IntoIterator<Item = &'a AddressGrouping>,
        change_prefix: char,
    ) -> Result<Self, BalanceError> {
        let fold = groupings
            .into_iter()
            .flatten()
            .try_fold(Fold::default(), |acc, entry| acc.step(entry, change_prefix))?;

        Ok(GroupingTable {
            records: fold.records,
            first_seen_balance: fold.first_seen_balance,
        })
    }

    /// The merged records, in first-seen order.
    pub fn records(&self) -> &[AddressRecord] {
        &self.records
    }

    /// The sum of the balances reported by the first tuple of each address.
    ///
    /// This is the amount of the transparent total that the groupings are taken to
    /// explain before any per-address lookup is made.
    pub fn first_seen_balance(&self) -> Amount {
        self.first_seen_balance
    }

    /// Consumes the table, returning its records.
    pub fn into_records(self) -> Vec<AddressRecord> {
        self.records
    }
}

/// Returns every address in the wallet, tagged and with its confirmed balance.
///
/// The groupings, default-account addresses, wallet totals and wallet info (and, if
/// `include_private` is set, the shielded address list) are requested together. Grouped
/// addresses take their balances from the groupings and are filtered by
/// [`NativeConfig::visibility`]. The remaining addresses, shielded ones first, have their
/// balances looked up one at a time until the wallet totals are explained; P2SH addresses
/// among them are dropped unless P2SH addresses are enabled.
///
/// If the wallet info cannot be read, balance lookups are made without the cache. Any
/// other failure fails the whole request.
#[tracing::instrument(skip(daemon, config))]
pub async fn resolve_addresses<D: Daemon>(
    daemon: &D,
    coin: &str,
    include_private: bool,
    config: &NativeConfig,
) -> Result<AddressList, Error<D::Error>> {
    let (groupings, account_addresses, totals, wallet_info, shielded_addresses) = join!(
        reply::list_address_groupings(daemon, coin),
        reply::addresses_by_account(daemon, coin),
        reply::total_balance(daemon, coin),
        reply::wallet_info(daemon, coin),
        async {
            if include_private {
                reply::shielded_addresses(daemon, coin).await
            } else {
                Ok(vec![])
            }
        },
    );
    let groupings = groupings?;
    let account_addresses = account_addresses?;
    let totals = totals?;
    let shielded_addresses = shielded_addresses?;

    let txcount = match wallet_info {
        Ok(info) => Some(info.txcount),
        Err(e) => {
            warn!("Not using address balance cache: {}", e);
            None
        }
    };
    let query = BalanceQuery::new(txcount, totals.total);

    let table = GroupingTable::fold(&groupings, config.change_address_prefix)?;
    debug!(
        grouped = table.records().len(),
        listed = account_addresses.len() + shielded_addresses.len(),
        "Reconciling addresses"
    );

    let mut accountant = BalanceAccountant::new(totals.transparent, totals.private);
    accountant.record(PoolType::Transparent, table.first_seen_balance())?;

    let mut seen: HashSet<String> = table
        .records()
        .iter()
        .map(|r| r.address.clone())
        .collect();
    let visibility = config.visibility();
    let mut result = AddressList {
        public: visibility.apply(table.into_records()),
        private: vec![],
    };

    for address in shielded_addresses.into_iter().chain(account_addresses) {
        if !seen.insert(address.clone()) {
            continue;
        }

        let tag = AddressTag::classify(&address);
        let balance = accountant
            .lookup(daemon, coin, tag.pool_type(), &address, &query)
            .await?;

        if !visibility.admits_tag(tag) {
            continue;
        }
        let record = AddressRecord::new(address, tag, balance);
        if tag.is_shielded() {
            result.private.push(record);
        } else {
            result.public.push(record);
        }
    }

    debug!(
        public = result.public.len(),
        private = result.private.len(),
        "Reconciled addresses"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};

    use assert_matches::assert_matches;
    use proptest::prelude::*;
    use serde_json::json;
    use verus_protocol::{address::AddressTag, value::Amount};

    use super::{resolve_addresses, GroupingTable};
    use crate::{
        config::NativeConfig,
        daemon::methods,
        error::Error,
        reply::GroupingEntry,
        testing::{arb_groupings, block_on, groupings_to_json, MockDaemon},
        wallet::AddressList,
    };

    fn entry(address: &str, balance: i64, account: Option<&str>) -> GroupingEntry {
        GroupingEntry::new(address, Amount::from_coins(balance), account)
    }

    fn daemon_with(groupings: serde_json::Value, totals: (&str, &str)) -> MockDaemon {
        MockDaemon::new()
            .with_reply(methods::LIST_ADDRESS_GROUPINGS, groupings)
            .with_reply(methods::GET_ADDRESSES_BY_ACCOUNT, json!([]))
            .with_reply(
                methods::Z_GET_TOTAL_BALANCE,
                json!({"transparent": totals.0, "private": totals.1, "total": totals.0}),
            )
            .with_reply(methods::GET_WALLET_INFO, json!({"txcount": 7}))
            .with_reply(methods::Z_LIST_ADDRESSES, json!([]))
    }

    fn find<'a>(list: &'a AddressList, address: &str) -> Option<&'a crate::wallet::AddressRecord> {
        list.iter().find(|r| r.address == address)
    }

    #[test]
    fn fold_merges_duplicates() {
        let groupings = vec![
            vec![entry("R1", 1, Some("")), entry("R2", 2, None)],
            vec![entry("R1", 3, Some("")), entry("b3", 4, None)],
        ];
        let table = GroupingTable::fold(&groupings, 'R').unwrap();

        assert_eq!(table.records().len(), 3);
        assert_eq!(table.records()[0].balances.native, Amount::from_coins(4));
        assert_eq!(table.records()[0].tag, AddressTag::Public);
        assert_eq!(table.records()[1].tag, AddressTag::Change);
        // Only the change prefix marks change; a P2SH address without an account is P2SH.
        assert_eq!(table.records()[2].tag, AddressTag::P2sh);
        assert_eq!(table.first_seen_balance(), Amount::from_coins(7));
    }

    #[test]
    fn change_is_promoted_by_a_later_account() {
        let groupings = vec![vec![entry("R1", 1, None)], vec![entry("R1", 2, Some("acct"))]];
        let table = GroupingTable::fold(&groupings, 'R').unwrap();
        assert_eq!(table.records()[0].tag, AddressTag::Public);
        assert_eq!(table.records()[0].balances.native, Amount::from_coins(3));
    }

    #[test]
    fn promotion_is_one_way() {
        let groupings = vec![vec![entry("R1", 1, Some("acct"))], vec![entry("R1", 2, None)]];
        let table = GroupingTable::fold(&groupings, 'R').unwrap();
        assert_eq!(table.records()[0].tag, AddressTag::Public);
    }

    #[test]
    fn change_prefix_is_configurable() {
        let groupings = vec![vec![entry("R1", 1, None), entry("V1", 1, None)]];
        let table = GroupingTable::fold(&groupings, 'V').unwrap();
        assert_eq!(table.records()[0].tag, AddressTag::Public);
        assert_eq!(table.records()[1].tag, AddressTag::Change);
    }

    #[test]
    fn empty_change_is_filtered() {
        let daemon = daemon_with(json!([[["R1", 5, "acct"]], [["R2", 0]]]), ("5", "0"));

        let res = block_on(resolve_addresses(&daemon, "VRSC", false, &NativeConfig::default()))
            .unwrap();
        assert_eq!(res.public.len(), 1);
        assert_eq!(res.public[0].address, "R1");
        assert_eq!(res.public[0].tag, AddressTag::Public);
        assert_eq!(res.public[0].balances.native, Amount::from_coins(5));
        assert!(res.private.is_empty());

        let config = NativeConfig {
            include_empty_change_addrs: true,
            ..NativeConfig::default()
        };
        let res = block_on(resolve_addresses(&daemon, "VRSC", false, &config)).unwrap();
        assert_matches!(find(&res, "R2"), Some(r) if r.tag == AddressTag::Change);

        // The shielded list was never requested.
        assert!(!daemon
            .rpc_methods()
            .iter()
            .any(|m| m == methods::Z_LIST_ADDRESSES));
    }

    #[test]
    fn listed_addresses_are_looked_up_until_totals_are_explained() {
        let daemon = daemon_with(json!([[["R1", 5, ""]]]), ("8", "2"))
            .with_reply(
                methods::GET_ADDRESSES_BY_ACCOUNT,
                json!(["R1", "R2", "R3", "bP2sh", "R4"]),
            )
            .with_reply(methods::Z_LIST_ADDRESSES, json!(["zs1a", "zs1b", "zcOld"]))
            .with_balance("zs1a", Amount::from_coins(2))
            .with_balance("R2", Amount::from_coins(1))
            .with_balance("R3", Amount::ZERO)
            .with_balance("bP2sh", Amount::from_coins(2));

        let res = block_on(resolve_addresses(&daemon, "VRSC", true, &NativeConfig::default()))
            .unwrap();

        // R1 comes from the groupings and is never looked up. zs1a explains the shielded
        // total, and R2, R3 and bP2sh explain the rest of the transparent total.
        assert_eq!(daemon.balance_lookups(), vec!["zs1a", "R2", "R3", "bP2sh"]);

        let private: Vec<_> = res.private.iter().map(|r| r.address.as_str()).collect();
        assert_eq!(private, vec!["zs1a", "zs1b", "zcOld"]);
        assert_eq!(find(&res, "zcOld").unwrap().tag, AddressTag::Sprout);
        assert!(find(&res, "zs1b").unwrap().balances.native.is_zero());

        let public: Vec<_> = res.public.iter().map(|r| r.address.as_str()).collect();
        assert_eq!(public, vec!["R1", "R2", "R3", "R4"]);
        assert_eq!(find(&res, "R2").unwrap().balances.native, Amount::from_coins(1));
        assert!(find(&res, "R4").unwrap().balances.native.is_zero());

        let queries = daemon.balance_queries();
        assert!(queries.iter().all(|q| q.use_cache && q.txcount == Some(7)));
        assert!(queries.iter().all(|q| q.total_balance == Amount::from_coins(8)));
    }

    #[test]
    fn p2sh_addresses_from_lists_follow_the_setting() {
        let daemon = daemon_with(json!([]), ("1", "0"))
            .with_reply(methods::GET_ADDRESSES_BY_ACCOUNT, json!(["bP2sh"]))
            .with_balance("bP2sh", Amount::from_coins(1));

        let hidden = block_on(resolve_addresses(&daemon, "VRSC", false, &NativeConfig::default()))
            .unwrap();
        assert!(hidden.public.is_empty());

        let config = NativeConfig {
            include_p2sh_addrs: true,
            ..NativeConfig::default()
        };
        let shown = block_on(resolve_addresses(&daemon, "VRSC", false, &config)).unwrap();
        assert_eq!(shown.public[0].tag, AddressTag::P2sh);
        assert_eq!(shown.public[0].balances.native, Amount::from_coins(1));
    }

    #[test]
    fn duplicate_listed_addresses_are_reported_once() {
        let daemon = daemon_with(json!([]), ("0", "0"))
            .with_reply(methods::GET_ADDRESSES_BY_ACCOUNT, json!(["R1", "R1"]));

        let res = block_on(resolve_addresses(&daemon, "VRSC", false, &NativeConfig::default()))
            .unwrap();
        assert_eq!(res.public.len(), 1);
    }

    #[test]
    fn wallet_info_failure_disables_the_cache() {
        let daemon = daemon_with(json!([]), ("1", "0"))
            .with_failure(methods::GET_WALLET_INFO, "wallet busy")
            .with_reply(methods::GET_ADDRESSES_BY_ACCOUNT, json!(["R1"]))
            .with_balance("R1", Amount::from_coins(1));

        let res = block_on(resolve_addresses(&daemon, "VRSC", false, &NativeConfig::default()))
            .unwrap();
        assert_eq!(res.public.len(), 1);
        assert!(!daemon.balance_queries()[0].use_cache);
        assert_eq!(daemon.balance_queries()[0].txcount, None);
    }

    #[test]
    fn failures_are_fatal() {
        let daemon = daemon_with(json!([]), ("1", "0"))
            .with_failure(methods::GET_ADDRESSES_BY_ACCOUNT, "loading block index");
        assert_matches!(
            block_on(resolve_addresses(&daemon, "VRSC", false, &NativeConfig::default())),
            Err(Error::Daemon(e)) if e.0 == "loading block index"
        );

        let daemon = daemon_with(json!([]), ("1", "0"))
            .with_reply(methods::GET_ADDRESSES_BY_ACCOUNT, json!(["R1", "R2"]))
            .with_balance_failure("R1", "rescan required");
        assert_matches!(
            block_on(resolve_addresses(&daemon, "VRSC", false, &NativeConfig::default())),
            Err(Error::Daemon(_))
        );

        let daemon = daemon_with(json!([["R1"]]), ("1", "0"));
        assert_matches!(
            block_on(resolve_addresses(&daemon, "VRSC", false, &NativeConfig::default())),
            Err(Error::MalformedReply(e)) if e.method == methods::LIST_ADDRESS_GROUPINGS
        );
    }

    proptest! {
        #[test]
        fn fold_invariants(groupings in arb_groupings()) {
            let table = GroupingTable::fold(&groupings, 'R').unwrap();

            // One record per address.
            let unique: HashSet<_> = table.records().iter().map(|r| &r.address).collect();
            prop_assert_eq!(unique.len(), table.records().len());

            // Each record's balance is the sum over all of its tuples.
            let mut sums: HashMap<&str, Amount> = HashMap::new();
            for e in groupings.iter().flatten() {
                let sum = sums.entry(e.address.as_str()).or_insert(Amount::ZERO);
                *sum = (*sum + e.balance).unwrap();
            }
            for record in table.records() {
                prop_assert_eq!(record.balances.native, sums[record.address.as_str()]);
            }

            // A change tag survives only if no tuple for the address carried an account.
            for record in table.records() {
                let any_account = groupings
                    .iter()
                    .flatten()
                    .any(|e| e.address == record.address && e.has_account());
                if any_account {
                    prop_assert_ne!(record.tag, AddressTag::Change);
                }
                if record.tag != AddressTag::Change {
                    prop_assert_eq!(record.tag, AddressTag::classify(&record.address));
                }
            }

            // Folding is deterministic.
            prop_assert_eq!(GroupingTable::fold(&groupings, 'R').unwrap(), table);
        }

        #[test]
        fn resolving_is_idempotent(groupings in arb_groupings()) {
            let daemon = daemon_with(groupings_to_json(&groupings), ("0", "0"));
            let config = NativeConfig::default();

            let first = block_on(resolve_addresses(&daemon, "VRSC", true, &config)).unwrap();
            let second = block_on(resolve_addresses(&daemon, "VRSC", true, &config)).unwrap();
            prop_assert_eq!(
                serde_json::to_string(&first).unwrap(),
                serde_json::to_string(&second).unwrap()
            );

            let unique: HashSet<_> = first.iter().map(|r| &r.address).collect();
            prop_assert_eq!(unique.len(), first.public.len() + first.private.len());
        }
    }
}
