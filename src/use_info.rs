//! `(asset, network)` pairs, with a canonical default used to elide the
//! value from the wire form (spec §3.2/§4.4).

/// Which cryptocurrency a key is meant for.
///
/// Values mirror [SLIP-44](https://github.com/satoshilabs/slips/blob/master/slip-0044.md).
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
#[non_exhaustive]
pub enum Asset {
    /// Bitcoin.
    Btc,
    /// Ethereum.
    Eth,
    /// An asset not enumerated here.
    Other(u32),
}

impl Asset {
    const fn slip44(self) -> u32 {
        match self {
            Asset::Btc => 0x00,
            Asset::Eth => 0x3c,
            Asset::Other(n) => n,
        }
    }
}

impl From<u32> for Asset {
    fn from(n: u32) -> Self {
        match n {
            0x00 => Asset::Btc,
            0x3c => Asset::Eth,
            n => Asset::Other(n),
        }
    }
}

impl From<Asset> for u32 {
    fn from(asset: Asset) -> Self {
        asset.slip44()
    }
}

/// Mainnet or testnet.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
#[non_exhaustive]
pub enum Network {
    /// Production network.
    Mainnet,
    /// Test network.
    Testnet,
}

impl Network {
    /// Is this the mainnet variant?
    pub fn is_mainnet(self) -> bool {
        matches!(self, Network::Mainnet)
    }

    /// The `crypto-coininfo` network discriminant: `0` for mainnet (which
    /// is shared across currencies), `1` for testnet.
    pub const fn wire_value(self) -> u64 {
        match self {
            Network::Mainnet => 0,
            Network::Testnet => 1,
        }
    }

    /// Recover a [`Network`] from its wire discriminant.
    pub const fn from_wire_value(v: u64) -> Self {
        match v {
            0 => Network::Mainnet,
            _ => Network::Testnet,
        }
    }
}

/// How a key is meant to be used: which asset, on which network.
///
/// The default is `(Btc, Mainnet)`; a `UseInfo` equal to the default is
/// elided from the CBOR wire form (spec §4.4, key `5`).
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct UseInfo {
    /// The asset this key is for.
    pub asset: Asset,
    /// The network this key is for.
    pub network: Network,
}

impl UseInfo {
    /// Construct a `UseInfo`.
    pub const fn new(asset: Asset, network: Network) -> Self {
        Self { asset, network }
    }

    /// `true` iff this is the default `(Btc, Mainnet)` value.
    pub fn is_default(self) -> bool {
        self == Self::default()
    }
}

impl Default for UseInfo {
    fn default() -> Self {
        Self::new(Asset::Btc, Network::Mainnet)
    }
}
