//! The crypto-kernel boundary (spec §6.3): an [`ExtKey`] record plus a
//! [`CryptoKernel`] trait that performs the actual elliptic-curve
//! arithmetic and Base58Check framing. [`HDKey`](crate::HDKey) is written
//! entirely against this trait; [`Secp256k1Kernel`] is the default
//! implementation backed by `k256`.

use crate::use_info::Network;
use crate::version::Version;
use crate::{Error, Result};
use hmac::{Hmac, Mac};
use ripemd::Ripemd160;
use sha2::{Digest, Sha256, Sha512};
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

type HmacSha512 = Hmac<Sha512>;

/// Size in bytes of a chain code, a raw private scalar, and one half of an
/// HMAC-SHA512 output.
const KEY_SIZE: usize = 32;

/// HMAC key used to derive the master key from a seed (BIP32).
const MASTER_KEY_DOMAIN: &[u8] = b"Bitcoin seed";

/// Hardened child indices have this bit set.
const HARDENED_FLAG: u32 = 1 << 31;

/// A decoded or freshly derived extended key, independent of wire format.
/// This is the record the crypto kernel operates on; [`HDKey`](crate::HDKey)
/// is reconstituted into one whenever it needs the kernel's services
/// (fingerprinting, serialization, derivation).
///
/// `priv_key` is all-zero for a public-only key. `parent160` mirrors
/// libwally's `wally_ext_key` layout: only the leading four bytes are ever
/// populated (from the 4-byte parent fingerprint); the rest is padding.
#[derive(Clone)]
pub struct ExtKey {
    pub depth: u8,
    pub child_num: u32,
    pub chain_code: [u8; 32],
    pub priv_key: [u8; 33],
    pub pub_key: [u8; 33],
    pub parent160: [u8; 20],
    pub version: Version,
}

impl ExtKey {
    /// Is there private key material present?
    pub fn is_private(&self) -> bool {
        self.priv_key.ct_ne(&[0u8; 33]).into()
    }

    /// Is this a master (depth-0) key?
    pub fn is_master(&self) -> bool {
        self.depth == 0
    }

    /// The network implied by this key's version bytes.
    pub fn network(&self) -> Network {
        self.version.network().unwrap_or(Network::Mainnet)
    }
}

impl Drop for ExtKey {
    fn drop(&mut self) {
        self.priv_key.zeroize();
        self.chain_code.zeroize();
    }
}

/// Abstracts the elliptic-curve arithmetic and Base58Check framing behind
/// [`ExtKey`] so that [`HDKey`](crate::HDKey) never touches curve types
/// directly (spec §6.3).
pub trait CryptoKernel {
    /// `masterKeyFromSeed`: derive the master [`ExtKey`] from seed entropy
    /// (BIP32 "master key generation").
    fn master_key_from_seed(seed: &[u8], network: Network) -> Result<ExtKey>;

    /// `parseBase58`: parse a Base58Check-encoded extended key.
    fn parse_base58(s: &str) -> Result<ExtKey>;

    /// `serializeBase58`: render an [`ExtKey`] to its Base58Check string
    /// form. `is_private` selects which version/key-material half is
    /// written; callers must already have checked private serialization
    /// is possible.
    fn serialize_base58(key: &ExtKey, is_private: bool) -> Result<alloc::string::String>;

    /// `deriveChild` (CKDpriv/CKDpub): derive the child with the given
    /// packed (hardened bit included) child number. `want_private`
    /// disambiguates CKDpriv-from-public-parent, which is never possible
    /// and always fails.
    fn derive_child(key: &ExtKey, child_num: u32, want_private: bool) -> Result<ExtKey>;

    /// `publicFromPrivate`: the compressed SEC1 public key for a private
    /// `ExtKey`.
    fn public_from_private(key: &ExtKey) -> Result<[u8; 33]>;

    /// `HASH160(data) = RIPEMD160(SHA256(data))`.
    fn hash160(data: &[u8]) -> [u8; 20] {
        let sha = Sha256::digest(data);
        Ripemd160::digest(sha).into()
    }

    /// `fingerprint(ExtKey) = first-4(hash160(pubKey))`.
    fn fingerprint(key: &ExtKey) -> [u8; 4] {
        let digest = Self::hash160(&key.pub_key);
        [digest[0], digest[1], digest[2], digest[3]]
    }
}

/// The default [`CryptoKernel`]: secp256k1 via `k256`, HMAC-SHA512 for
/// child-key derivation, `bs58` for Base58Check.
#[cfg(feature = "secp256k1")]
#[derive(Debug, Clone, Copy)]
pub struct Secp256k1Kernel;

#[cfg(feature = "secp256k1")]
impl CryptoKernel for Secp256k1Kernel {
    fn master_key_from_seed(seed: &[u8], network: Network) -> Result<ExtKey> {
        if seed.len() < 16 || seed.len() > 64 {
            return Err(Error::InvalidSeed);
        }

        let mut hmac = HmacSha512::new_from_slice(MASTER_KEY_DOMAIN).map_err(|_| Error::Crypto)?;
        hmac.update(seed);
        let result = hmac.finalize().into_bytes();
        let (secret, chain_code) = result.split_at(KEY_SIZE);

        let secret_key = k256::SecretKey::from_slice(secret).map_err(|_| Error::InvalidSeed)?;
        let pub_key = encode_pub(&secret_key.public_key());

        Ok(ExtKey {
            depth: 0,
            child_num: 0,
            chain_code: chain_code.try_into()?,
            priv_key: encode_priv(&secret_key),
            pub_key,
            parent160: [0; 20],
            version: Version::for_key(true, network),
        })
    }

    fn parse_base58(s: &str) -> Result<ExtKey> {
        let mut buf = [0u8; 78 + 4];
        let decoded_len = bs58::decode(s)
            .with_check(None)
            .into(&mut buf)
            .map_err(|_| Error::InvalidBase58)?;

        if decoded_len != 78 {
            return Err(Error::InvalidBase58);
        }

        let version = Version::from(u32::from_be_bytes(buf[0..4].try_into()?));
        let depth = buf[4];
        let mut parent160 = [0u8; 20];
        parent160[..4].copy_from_slice(&buf[5..9]);
        let child_num = u32::from_be_bytes(buf[9..13].try_into()?);
        let chain_code: [u8; 32] = buf[13..45].try_into()?;
        let material = &buf[45..78];

        let (priv_key, pub_key) = if version.is_private() {
            if material[0] != 0 {
                return Err(Error::InvalidBase58);
            }
            let secret_key =
                k256::SecretKey::from_slice(&material[1..]).map_err(|_| Error::Crypto)?;
            let pub_key = encode_pub(&secret_key.public_key());
            (encode_priv(&secret_key), pub_key)
        } else {
            let pub_key: [u8; 33] = material.try_into()?;
            k256::PublicKey::from_sec1_bytes(&pub_key).map_err(|_| Error::Crypto)?;
            ([0u8; 33], pub_key)
        };

        Ok(ExtKey {
            depth,
            child_num,
            chain_code,
            priv_key,
            pub_key,
            parent160,
            version,
        })
    }

    fn serialize_base58(key: &ExtKey, is_private: bool) -> Result<alloc::string::String> {
        if is_private && !key.is_private() {
            return Err(Error::CannotDerivePrivateFromPublic);
        }

        let version = Version::for_key(is_private, key.network());
        let mut buf = [0u8; 78];
        buf[0..4].copy_from_slice(&u32::from(version).to_be_bytes());
        buf[4] = key.depth;
        buf[5..9].copy_from_slice(&key.parent160[..4]);
        buf[9..13].copy_from_slice(&key.child_num.to_be_bytes());
        buf[13..45].copy_from_slice(&key.chain_code);
        if is_private {
            buf[45..78].copy_from_slice(&key.priv_key);
        } else {
            buf[45..78].copy_from_slice(&key.pub_key);
        }

        Ok(bs58::encode(buf).with_check().into_string())
    }

    fn derive_child(key: &ExtKey, child_num: u32, want_private: bool) -> Result<ExtKey> {
        let hardened = child_num & HARDENED_FLAG != 0;

        if (hardened || want_private) && !key.is_private() {
            return Err(if hardened {
                Error::CannotDeriveHardenedFromPublic
            } else {
                Error::CannotDerivePrivateFromPublic
            });
        }

        let depth = key.depth.checked_add(1).ok_or(Error::Depth)?;

        let mut hmac = HmacSha512::new_from_slice(&key.chain_code).map_err(|_| Error::Crypto)?;
        if hardened {
            hmac.update(&[0]);
            hmac.update(&key.priv_key[1..]);
        } else {
            hmac.update(&key.pub_key);
        }
        hmac.update(&child_num.to_be_bytes());

        let result = hmac.finalize().into_bytes();
        let (il, chain_code) = result.split_at(KEY_SIZE);
        let chain_code: [u8; 32] = chain_code.try_into()?;

        let il_scalar =
            Option::<k256::NonZeroScalar>::from(k256::NonZeroScalar::from_repr(il.into()))
                .ok_or(Error::UnknownDerivationError)?;

        let (priv_key, pub_key) = if key.is_private() {
            let parent_secret =
                k256::SecretKey::from_slice(&key.priv_key[1..]).map_err(|_| Error::Crypto)?;
            let child_scalar = parent_secret.to_nonzero_scalar().as_ref() + il_scalar.as_ref();
            let child_nz = Option::<k256::NonZeroScalar>::from(k256::NonZeroScalar::new(
                child_scalar,
            ))
            .ok_or(Error::UnknownDerivationError)?;
            let child_secret = k256::SecretKey::from(child_nz);
            let pub_key = encode_pub(&child_secret.public_key());
            (encode_priv(&child_secret), pub_key)
        } else {
            use k256::elliptic_curve::{group::prime::PrimeCurveAffine, sec1::ToEncodedPoint};

            let parent_point =
                k256::PublicKey::from_sec1_bytes(&key.pub_key).map_err(|_| Error::Crypto)?;
            let child_point =
                parent_point.to_projective() + (k256::AffinePoint::generator() * *il_scalar);
            let child_pub = k256::PublicKey::from_affine(child_point.into())
                .map_err(|_| Error::UnknownDerivationError)?;
            let bytes: [u8; 33] = child_pub
                .to_encoded_point(true)
                .as_bytes()
                .try_into()
                .map_err(|_| Error::Crypto)?;
            ([0u8; 33], bytes)
        };

        let mut parent160 = [0u8; 20];
        parent160[..4].copy_from_slice(&Self::fingerprint(key));

        Ok(ExtKey {
            depth,
            child_num,
            chain_code,
            priv_key,
            pub_key,
            parent160,
            version: key.version,
        })
    }

    fn public_from_private(key: &ExtKey) -> Result<[u8; 33]> {
        if !key.is_private() {
            return Ok(key.pub_key);
        }

        let secret_key = k256::SecretKey::from_slice(&key.priv_key[1..]).map_err(|_| Error::Crypto)?;
        Ok(encode_pub(&secret_key.public_key()))
    }
}

#[cfg(feature = "secp256k1")]
fn encode_priv(secret_key: &k256::SecretKey) -> [u8; 33] {
    let mut bytes = [0u8; 33];
    bytes[1..].copy_from_slice(&secret_key.to_bytes());
    bytes
}

#[cfg(feature = "secp256k1")]
fn encode_pub(public_key: &k256::PublicKey) -> [u8; 33] {
    use k256::elliptic_curve::sec1::ToEncodedPoint;
    let mut bytes = [0u8; 33];
    bytes.copy_from_slice(public_key.to_encoded_point(true).as_bytes());
    bytes
}

/// The kernel selected by this build's Cargo features.
#[cfg(feature = "secp256k1")]
pub type DefaultKernel = Secp256k1Kernel;
