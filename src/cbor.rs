//! Tagged-CBOR codec for [`DerivationPath`], [`UseInfo`], and [`HDKey`]
//! (spec §4.1/§4.4), plus single-part UR string transport under the
//! `ur-transport` feature.
//!
//! Encoding/decoding is hand-written against `minicbor`'s `Encode`/`Decode`
//! traits rather than derived, matching the map-key layout the reference
//! UR registry implementation in this retrieval pack uses.

use crate::child_number::{ChildIndex, DerivationStep};
use crate::derivation_path::{DerivationPath, PathOrigin};
use crate::hd_key::HDKey;
use crate::key_type::KeyType;
use crate::use_info::{Asset, Network, UseInfo};
use minicbor::data::{Tag, Type};
use minicbor::encode::Write;
use minicbor::{Decode, Decoder, Encode, Encoder};

/// Registered tag for a tagged-CBOR `HDKey`.
pub const TAG_HDKEY: Tag = Tag::Unassigned(40303);
/// Registered tag for a tagged-CBOR `DerivationPath`.
pub const TAG_DERIVATION_PATH: Tag = Tag::Unassigned(40304);
/// Registered tag for a tagged-CBOR `UseInfo` (`crypto-coininfo`).
pub const TAG_USE_INFO: Tag = Tag::Unassigned(40305);
/// Registered tag for a tagged-CBOR `AccountOutputDescriptorBundle`.
pub const TAG_ACCOUNT: Tag = Tag::Unassigned(40308);

/// UR type label for a tagged `HDKey`.
pub const UR_TYPE_HDKEY: &str = "crypto-hdkey";
/// UR type label for a tagged `AccountOutputDescriptorBundle`.
pub const UR_TYPE_ACCOUNT: &str = "crypto-account";

fn msg(s: &'static str) -> minicbor::decode::Error {
    minicbor::decode::Error::message(s)
}

fn expect_tag(d: &mut Decoder<'_>, want: Tag, what: &'static str) -> Result<(), minicbor::decode::Error> {
    let got = d.tag()?;
    if got != want {
        return Err(msg(what));
    }
    Ok(())
}

fn map_len(d: &mut Decoder<'_>) -> Result<u64, minicbor::decode::Error> {
    d.map()?.ok_or_else(|| msg("indefinite-length maps are not supported"))
}

fn array_len(d: &mut Decoder<'_>) -> Result<u64, minicbor::decode::Error> {
    d.array()?.ok_or_else(|| msg("indefinite-length arrays are not supported"))
}

impl<C> Encode<C> for UseInfo {
    fn encode<W: Write>(
        &self,
        e: &mut Encoder<W>,
        _ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        e.tag(TAG_USE_INFO)?;

        let has_asset = self.asset != Asset::Btc;
        let has_network = !self.network.is_mainnet();
        e.map(has_asset as u64 + has_network as u64)?;

        if has_asset {
            e.u8(1)?.u32(self.asset.into())?;
        }
        if has_network {
            e.u8(2)?.u64(self.network.wire_value())?;
        }

        Ok(())
    }
}

impl<'b, C> Decode<'b, C> for UseInfo {
    fn decode(d: &mut Decoder<'b>, _ctx: &mut C) -> Result<Self, minicbor::decode::Error> {
        expect_tag(d, TAG_USE_INFO, "expected a use-info tag")?;

        let mut asset = Asset::Btc;
        let mut network = Network::Mainnet;

        for _ in 0..map_len(d)? {
            match d.u32()? {
                1 => asset = Asset::from(d.u32()?),
                2 => network = Network::from_wire_value(d.u64()?),
                _ => return Err(msg("unknown use-info map key")),
            }
        }

        Ok(UseInfo::new(asset, network))
    }
}

impl<C> Encode<C> for DerivationPath {
    fn encode<W: Write>(
        &self,
        e: &mut Encoder<W>,
        _ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        e.tag(TAG_DERIVATION_PATH)?;

        let has_origin = self.origin_fingerprint().is_some();
        let has_depth = self.depth().is_some();
        e.map(1 + has_origin as u64 + has_depth as u64)?;

        e.u8(1)?;
        e.array(self.steps().len() as u64 * 2)?;
        for step in self.steps() {
            match step.index() {
                ChildIndex::Index(v) => {
                    e.u32(v)?;
                }
                ChildIndex::Wildcard => {
                    e.array(0)?;
                }
            }
            e.bool(step.is_hardened())?;
        }

        if let Some(fp) = self.origin_fingerprint() {
            e.u8(2)?.u32(fp)?;
        }
        if let Some(depth) = self.depth() {
            e.u8(3)?.u32(depth)?;
        }

        Ok(())
    }
}

impl<'b, C> Decode<'b, C> for DerivationPath {
    fn decode(d: &mut Decoder<'b>, _ctx: &mut C) -> Result<Self, minicbor::decode::Error> {
        expect_tag(d, TAG_DERIVATION_PATH, "expected a derivation-path tag")?;

        let mut steps = alloc::vec::Vec::new();
        let mut origin_fingerprint = None;
        let mut depth = None;

        for _ in 0..map_len(d)? {
            match d.u32()? {
                1 => {
                    let n = array_len(d)?;
                    if n % 2 != 0 {
                        return Err(msg("derivation-path step array must have even length"));
                    }
                    for _ in 0..(n / 2) {
                        let index = if d.datatype()? == Type::Array {
                            array_len(d)?;
                            ChildIndex::Wildcard
                        } else {
                            ChildIndex::Index(d.u32()?)
                        };
                        let hardened = d.bool()?;
                        steps.push(DerivationStep::from_parts(index, hardened));
                    }
                }
                2 => origin_fingerprint = Some(d.u32()?),
                3 => depth = Some(d.u32()?),
                _ => return Err(msg("unknown derivation-path map key")),
            }
        }

        DerivationPath::new(steps, origin_fingerprint.map(PathOrigin::Fingerprint), depth)
            .map_err(|_| msg("invalid derivation path"))
    }
}

impl<C> Encode<C> for HDKey {
    fn encode<W: Write>(
        &self,
        e: &mut Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        e.tag(TAG_HDKEY)?;

        let n = 1 // key-data, always present
            + self.is_master() as u64
            + self.is_private() as u64
            + self.chain_code().is_some() as u64
            + (!self.use_info().is_default()) as u64
            + (!self.parent().is_empty()) as u64
            + (!self.children().is_empty()) as u64
            + self.parent_fingerprint().is_some() as u64;

        e.map(n)?;

        if self.is_master() {
            e.u8(1)?.bool(true)?;
        }
        if self.is_private() {
            e.u8(2)?.bool(true)?;
        }
        e.u8(3)?.bytes(self.key_data())?;
        if let Some(chain_code) = self.chain_code() {
            e.u8(4)?.bytes(chain_code)?;
        }
        if !self.use_info().is_default() {
            e.u8(5)?;
            self.use_info().encode(e, ctx)?;
        }
        if !self.parent().is_empty() {
            e.u8(6)?;
            self.parent().encode(e, ctx)?;
        }
        if !self.children().is_empty() {
            e.u8(7)?;
            self.children().encode(e, ctx)?;
        }
        if let Some(fp) = self.parent_fingerprint() {
            e.u8(8)?.u32(fp)?;
        }

        Ok(())
    }
}

impl<'b, C> Decode<'b, C> for HDKey {
    fn decode(d: &mut Decoder<'b>, ctx: &mut C) -> Result<Self, minicbor::decode::Error> {
        expect_tag(d, TAG_HDKEY, "expected an hd-key tag")?;

        let mut is_master = false;
        let mut is_private = None;
        let mut key_data: Option<[u8; 33]> = None;
        let mut chain_code: Option<[u8; 32]> = None;
        let mut use_info = UseInfo::default();
        let mut parent = DerivationPath::empty();
        let mut children = DerivationPath::empty();
        let mut parent_fingerprint = None;

        for _ in 0..map_len(d)? {
            match d.u32()? {
                1 => is_master = d.bool()?,
                2 => is_private = Some(d.bool()?),
                3 => {
                    key_data = Some(
                        d.bytes()?
                            .try_into()
                            .map_err(|_| msg("key-data must be exactly 33 bytes"))?,
                    );
                }
                4 => {
                    chain_code = Some(
                        d.bytes()?
                            .try_into()
                            .map_err(|_| msg("chain-code must be exactly 32 bytes"))?,
                    );
                }
                5 => use_info = UseInfo::decode(d, ctx)?,
                6 => parent = DerivationPath::decode(d, ctx)?,
                7 => children = DerivationPath::decode(d, ctx)?,
                8 => {
                    let fp = d.u32()?;
                    if fp == 0 {
                        return Err(msg("parent-fingerprint must be nonzero"));
                    }
                    parent_fingerprint = Some(fp);
                }
                _ => return Err(msg("unknown hd-key map key")),
            }
        }

        let is_private = is_private.unwrap_or(is_master);
        if is_master && !is_private {
            return Err(msg("is-master is set but is-private is not"));
        }

        let key_data = key_data.ok_or_else(|| msg("key-data is required"))?;

        Ok(HDKey::from_parts(
            is_master,
            if is_private {
                KeyType::Private
            } else {
                KeyType::Public
            },
            key_data,
            chain_code,
            use_info,
            parent,
            children,
            parent_fingerprint,
        ))
    }
}

impl<C, D: Encode<C>> Encode<C> for crate::account::AccountOutputDescriptorBundle<D> {
    fn encode<W: Write>(
        &self,
        e: &mut Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        e.tag(TAG_ACCOUNT)?;
        e.map(2)?;
        e.u8(1)?.u32(self.master_key_fingerprint())?;
        e.u8(2)?;
        e.array(self.descriptors().len() as u64)?;
        for descriptor in self.descriptors() {
            descriptor.encode(e, ctx)?;
        }
        Ok(())
    }
}

#[cfg(feature = "ur-transport")]
mod ur_transport {
    use super::*;
    use crate::Result;
    use alloc::string::String;
    use alloc::vec::Vec;

    fn encode_cbor<T: Encode<()>>(value: &T) -> Result<Vec<u8>> {
        minicbor::to_vec(value).map_err(|_| crate::Error::InvalidFormat)
    }

    /// Encode an [`HDKey`] as a single-part `ur:crypto-hdkey/...` string.
    pub fn hdkey_to_ur_string(key: &HDKey) -> Result<String> {
        let cbor = encode_cbor(key)?;
        ur::encode(&cbor, super::UR_TYPE_HDKEY).map_err(|_| crate::Error::InvalidFormat)
    }

    /// Decode a single-part `ur:crypto-hdkey/...` string into an [`HDKey`].
    pub fn hdkey_from_ur_string(ur_string: &str) -> Result<HDKey> {
        let (ur_type, cbor) = ur::decode(ur_string).map_err(|_| crate::Error::InvalidFormat)?;
        if ur_type != super::UR_TYPE_HDKEY {
            return Err(crate::Error::InvalidFormat);
        }
        minicbor::decode(&cbor).map_err(Into::into)
    }

    /// Encode an [`crate::account::AccountOutputDescriptorBundle`] as a
    /// single-part `ur:crypto-account/...` string. There is no matching
    /// `_from_ur_string`: output-descriptor parsing is out of scope, so
    /// this direction is write-only.
    pub fn account_to_ur_string<D: Encode<()>>(
        bundle: &crate::account::AccountOutputDescriptorBundle<D>,
    ) -> Result<String> {
        let cbor = encode_cbor(bundle)?;
        ur::encode(&cbor, super::UR_TYPE_ACCOUNT).map_err(|_| crate::Error::InvalidFormat)
    }
}

#[cfg(feature = "ur-transport")]
pub use ur_transport::{account_to_ur_string, hdkey_from_ur_string, hdkey_to_ur_string};
