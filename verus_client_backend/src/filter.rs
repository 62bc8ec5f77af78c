//! Visibility rules for reconciled addresses.

use verus_protocol::address::AddressTag;

use crate::wallet::AddressRecord;

/// User-configurable rules deciding which grouped addresses are shown.
///
/// Change addresses are hidden once empty, and P2SH addresses are hidden entirely, unless
/// the corresponding flag is set. All other addresses are always shown.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VisibilityFilter {
    pub include_empty_change_addrs: bool,
    pub include_p2sh_addrs: bool,
}

impl VisibilityFilter {
    /// Returns `true` if addresses with `tag` may be shown regardless of their balance.
    ///
    /// This is the only rule applied to addresses that do not come from the groupings.
    pub fn admits_tag(&self, tag: AddressTag) -> bool {
        tag != AddressTag::P2sh || self.include_p2sh_addrs
    }

    /// Returns `true` if `record` should be shown.
    pub fn retains(&self, record: &AddressRecord) -> bool {
        match record.tag {
            AddressTag::Change => {
                !record.balances.native.is_zero() || self.include_empty_change_addrs
            }
            AddressTag::P2sh => self.include_p2sh_addrs,
            _ => true,
        }
    }

    /// Removes the records that should not be shown, preserving order.
    pub fn apply(&self, records: Vec<AddressRecord>) -> Vec<AddressRecord> {
        records.into_iter().filter(|r| self.retains(r)).collect()
    }
}
