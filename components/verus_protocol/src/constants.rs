//! Address prefix constants for the Verus main network.

/// The leading character of a Base58Check-encoded transparent P2PKH address.
///
/// Wallet change is always paid to a fresh P2PKH address, so this is also the prefix that
/// marks an address as a change candidate in the daemon's address groupings.
pub const P2PKH_PREFIX: char = 'R';

/// The leading character of a Base58Check-encoded transparent P2SH address.
pub const P2SH_PREFIX: char = 'b';

/// The leading character of an identity address.
pub const IDENTITY_PREFIX: char = 'i';

/// The leading two characters of a Sprout payment address.
pub const SPROUT_PREFIX: &str = "zc";

/// The leading two characters of a Bech32-encoded Sapling payment address.
pub const SAPLING_PREFIX: &str = "zs";

/// The leading character shared by all shielded payment addresses.
pub const SHIELDED_PREFIX: char = 'z';
