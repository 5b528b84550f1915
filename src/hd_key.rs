//! The central entity of this crate: a value-typed, immutable BIP32
//! extended key with full construction/derivation provenance.

use crate::child_number::DerivationStep;
use crate::derivation_path::{DerivationPath, PathOrigin};
use crate::kernel::{CryptoKernel, ExtKey};
use crate::key_type::KeyType;
use crate::use_info::{Asset, UseInfo};
use crate::{Error, Result};
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use subtle::{Choice, ConstantTimeEq};

#[cfg(feature = "secp256k1")]
use crate::kernel::DefaultKernel;

/// A BIP32 extended key together with the provenance needed to describe how
/// it was reached and how its descendants are meant to be derived.
///
/// `HDKey` is immutable: every constructor and every derivation operation
/// returns a new value. There is no in-place mutation.
#[derive(Clone)]
pub struct HDKey {
    is_master: bool,
    key_type: KeyType,
    key_data: [u8; 33],
    chain_code: Option<[u8; 32]>,
    use_info: UseInfo,
    parent: DerivationPath,
    children: DerivationPath,
    parent_fingerprint: Option<u32>,
}

impl ConstantTimeEq for HDKey {
    fn ct_eq(&self, other: &Self) -> Choice {
        let chain_code_eq = match (self.chain_code, other.chain_code) {
            (Some(a), Some(b)) => a.ct_eq(&b),
            (None, None) => Choice::from(1),
            _ => Choice::from(0),
        };

        self.key_data.ct_eq(&other.key_data)
            & chain_code_eq
            & Choice::from((self.is_master == other.is_master) as u8)
            & Choice::from((self.key_type == other.key_type) as u8)
            & Choice::from((self.use_info == other.use_info) as u8)
            & Choice::from((self.parent == other.parent) as u8)
            & Choice::from((self.children == other.children) as u8)
            & Choice::from((self.parent_fingerprint == other.parent_fingerprint) as u8)
    }
}

/// NOTE: uses [`ConstantTimeEq`] internally for the key-material comparison.
impl PartialEq for HDKey {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for HDKey {}

impl core::fmt::Debug for HDKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HDKey")
            .field("is_master", &self.is_master)
            .field("key_type", &self.key_type)
            .field("key_data", &"...")
            .field("chain_code", &self.chain_code.map(|_| "..."))
            .field("use_info", &self.use_info)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("parent_fingerprint", &self.parent_fingerprint)
            .finish()
    }
}

#[cfg(feature = "secp256k1")]
impl HDKey {
    /// Build the master key from BIP39 (or any other) seed entropy.
    ///
    /// The crate itself never produces seeds — this is a deliberate
    /// non-goal — callers supply whatever byte string their seed/mnemonic
    /// scheme produces.
    pub fn from_seed(seed: &[u8], use_info: Option<UseInfo>) -> Result<Self> {
        let use_info = use_info.unwrap_or_default();
        let ext = DefaultKernel::master_key_from_seed(seed, use_info.network)?;
        let origin_fingerprint = u32::from_be_bytes(DefaultKernel::fingerprint(&ext));

        Ok(Self {
            is_master: true,
            key_type: KeyType::Private,
            key_data: ext.priv_key,
            chain_code: Some(ext.chain_code),
            use_info,
            parent: DerivationPath::new(
                Vec::new(),
                Some(PathOrigin::Fingerprint(origin_fingerprint)),
                Some(0),
            )?,
            children: DerivationPath::empty(),
            parent_fingerprint: None,
        })
    }

    /// Parse a Base58Check-encoded extended key (`xprv...`/`xpub...`).
    ///
    /// `parent`, when supplied, is authoritative over the one-step path
    /// this constructor would otherwise synthesize from the key's own
    /// `childNumber`/`depth` (spec's open-question resolution: the
    /// caller-supplied path wins).
    pub fn from_base58(
        s: &str,
        use_info: Option<UseInfo>,
        parent: Option<DerivationPath>,
        children: Option<DerivationPath>,
        override_origin_fingerprint: Option<u32>,
    ) -> Result<Self> {
        let ext = DefaultKernel::parse_base58(s)?;
        Self::from_parsed(ext, use_info, parent, children, override_origin_fingerprint)
    }

    /// Build from raw extended-key material already obtained from the
    /// crypto kernel (e.g. after a caller-driven round-trip through
    /// another representation). The chain code is always present.
    pub fn from_extended_key(
        ext: &ExtKey,
        use_info: Option<UseInfo>,
        parent: Option<DerivationPath>,
        children: Option<DerivationPath>,
    ) -> Result<Self> {
        Self::from_parsed(ext.clone(), use_info, parent, children, None)
    }

    fn from_parsed(
        ext: ExtKey,
        use_info: Option<UseInfo>,
        parent: Option<DerivationPath>,
        children: Option<DerivationPath>,
        override_origin_fingerprint: Option<u32>,
    ) -> Result<Self> {
        let use_info = use_info.unwrap_or_else(|| UseInfo::new(Asset::Btc, ext.network()));
        let is_master = parent
            .as_ref()
            .map(DerivationPath::is_master)
            .unwrap_or(ext.depth == 0);

        let parent = match parent {
            Some(p) => p,
            None => {
                let kernel_fp = u32::from_be_bytes(DefaultKernel::fingerprint(&ext));
                let origin_fp = override_origin_fingerprint.unwrap_or(kernel_fp);
                let steps = if ext.child_num == 0 {
                    Vec::new()
                } else {
                    let mut v = Vec::with_capacity(1);
                    v.push(DerivationStep::from_raw(ext.child_num)?);
                    v
                };
                DerivationPath::new(
                    steps,
                    Some(PathOrigin::Fingerprint(origin_fp)),
                    Some(ext.depth as u32),
                )?
            }
        };

        let parent_fingerprint = if is_master {
            None
        } else {
            let mut fp = [0u8; 4];
            fp.copy_from_slice(&ext.parent160[..4]);
            Some(u32::from_be_bytes(fp))
        };

        Ok(Self {
            is_master,
            key_type: if ext.is_private() {
                KeyType::Private
            } else {
                KeyType::Public
            },
            key_data: if ext.is_private() {
                ext.priv_key
            } else {
                ext.pub_key
            },
            chain_code: Some(ext.chain_code),
            use_info,
            parent,
            children: children.unwrap_or_default(),
            parent_fingerprint,
        })
    }

    /// Project this key to a different [`KeyType`], optionally overriding
    /// whether the result is derivable (i.e. carries a chain code) and its
    /// provenance paths.
    pub fn project_key_type(
        &self,
        derived_key_type: Option<KeyType>,
        is_derivable: bool,
        parent: Option<DerivationPath>,
        children: Option<DerivationPath>,
    ) -> Result<Self> {
        let derived_key_type = derived_key_type.unwrap_or(self.key_type);

        if derived_key_type.is_private() && !self.is_private() {
            return Err(Error::CannotDerivePrivateFromPublic);
        }

        let key_data = if derived_key_type == self.key_type {
            self.key_data
        } else {
            let ext = self.to_extended_key()?;
            DefaultKernel::public_from_private(&ext)?
        };

        Ok(Self {
            is_master: self.is_master && derived_key_type.is_private(),
            key_type: derived_key_type,
            key_data,
            chain_code: if is_derivable { self.chain_code } else { None },
            use_info: self.use_info,
            parent: parent.unwrap_or_else(|| self.parent.clone()),
            children: children.unwrap_or_else(|| self.children.clone()),
            parent_fingerprint: self.parent_fingerprint,
        })
    }

    /// Derive one concrete child step. `wildcard_child_num` resolves
    /// `child_derivation` if it is a wildcard.
    pub fn derive_one_step(
        &self,
        derived_key_type: Option<KeyType>,
        child_derivation: DerivationStep,
        wildcard_child_num: Option<u32>,
    ) -> Result<Self> {
        let derived_key_type = derived_key_type.unwrap_or(self.key_type);

        if derived_key_type.is_private() && !self.is_private() {
            return Err(Error::CannotDerivePrivateFromPublic);
        }

        if !self.is_derivable() {
            return Err(Error::CannotDeriveFromNonDerivable);
        }

        if child_derivation.is_hardened() && !self.is_private() {
            return Err(Error::CannotDeriveHardenedFromPublic);
        }

        let raw = child_derivation
            .raw_value(wildcard_child_num)
            .ok_or(Error::CannotDeriveInspecificStep)?;

        let ext = self.to_extended_key()?;
        let parent_fp = DefaultKernel::fingerprint(&ext);
        let child_ext = DefaultKernel::derive_child(&ext, raw, derived_key_type.is_private())?;

        Ok(Self {
            is_master: false,
            key_type: derived_key_type,
            key_data: if derived_key_type.is_private() {
                child_ext.priv_key
            } else {
                child_ext.pub_key
            },
            chain_code: Some(child_ext.chain_code),
            use_info: self.use_info,
            parent: self.parent.pushed(child_derivation),
            children: DerivationPath::empty(),
            parent_fingerprint: Some(u32::from_be_bytes(parent_fp)),
        })
    }

    /// Derive along a multi-step path, optionally rebasing it against this
    /// key's own provenance, optionally promoting a public parent to
    /// private via `private_key_provider` when a hardened step demands it,
    /// and finally projecting the result to `derived_key_type`.
    ///
    /// A zero-step path is legal and acts as an identity-plus-retyping.
    pub fn derive_path(
        &self,
        derived_key_type: Option<KeyType>,
        child_derivation_path: &DerivationPath,
        is_derivable: bool,
        wildcard_child_num: Option<u32>,
        private_key_provider: Option<&dyn Fn(&HDKey) -> Option<HDKey>>,
        children: Option<DerivationPath>,
    ) -> Result<Self> {
        let path = if child_derivation_path.origin().is_some() {
            let drop_n = self.parent.effective_depth() as usize;
            child_derivation_path
                .drop_first(drop_n)
                .ok_or(Error::InvalidDepth)?
        } else {
            child_derivation_path.clone()
        };

        let mut current = self.clone();

        if !current.is_private() && path.is_hardened() {
            let provider = private_key_provider.ok_or(Error::CannotDeriveHardenedFromPublic)?;
            let private_parent =
                provider(&current).ok_or(Error::CannotDeriveHardenedFromPublic)?;
            if !private_parent.is_private() {
                return Err(Error::CannotDeriveHardenedFromPublic);
            }
            current = private_parent;
        }

        for step in path.steps() {
            current = current.derive_one_step(None, *step, wildcard_child_num)?;
        }

        current.project_key_type(derived_key_type, is_derivable, None, children)
    }

    /// Reconstitute the kernel-level [`ExtKey`] from this value (the
    /// `wallyExtKey` of the design note).
    pub fn to_extended_key(&self) -> Result<ExtKey> {
        let depth: u8 = self
            .parent
            .effective_depth()
            .try_into()
            .map_err(|_| Error::Depth)?;

        let child_num = self
            .parent
            .steps()
            .last()
            .and_then(|step| step.raw_value(None))
            .unwrap_or(0);

        let mut parent160 = [0u8; 20];
        if let Some(fp) = self.parent_fingerprint {
            parent160[..4].copy_from_slice(&fp.to_be_bytes());
        }

        let chain_code = self.chain_code.unwrap_or([0u8; 32]);
        let version = crate::version::Version::for_key(self.is_private(), self.use_info.network);

        let (priv_key, pub_key) = match self.key_type {
            KeyType::Private => {
                let probe = ExtKey {
                    depth,
                    child_num,
                    chain_code,
                    priv_key: self.key_data,
                    pub_key: [0u8; 33],
                    parent160,
                    version,
                };
                (self.key_data, DefaultKernel::public_from_private(&probe)?)
            }
            KeyType::Public => ([0u8; 33], self.key_data),
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

    /// Compressed SEC1 public key, deriving it from the private scalar
    /// when this key is private.
    pub fn ec_public_key(&self) -> [u8; 33] {
        if self.key_type.is_private() {
            self.to_extended_key()
                .and_then(|ext| DefaultKernel::public_from_private(&ext))
                .unwrap_or(self.key_data)
        } else {
            self.key_data
        }
    }

    /// The 32-byte private scalar, or `None` if this key is public-only.
    pub fn ec_private_key(&self) -> Option<[u8; 32]> {
        if self.key_type.is_private() {
            let mut scalar = [0u8; 32];
            scalar.copy_from_slice(&self.key_data[1..]);
            Some(scalar)
        } else {
            None
        }
    }

    /// The public projection of this key. Infallible: public keys have no
    /// private material to lose, and a private key's public key always
    /// exists.
    pub fn public(&self) -> Self {
        let key_data = self.ec_public_key();

        Self {
            is_master: false,
            key_type: KeyType::Public,
            key_data,
            chain_code: self.chain_code,
            use_info: self.use_info,
            parent: self.parent.clone(),
            children: self.children.clone(),
            parent_fingerprint: self.parent_fingerprint,
        }
    }

    /// The 4-byte fingerprint of this key, computed via the kernel over
    /// the reconstituted extended key.
    pub fn key_fingerprint_data(&self) -> Result<[u8; 4]> {
        let ext = self.to_extended_key()?;
        Ok(DefaultKernel::fingerprint(&ext))
    }

    /// The fingerprint of this key as a big-endian `u32`.
    pub fn key_fingerprint(&self) -> Result<u32> {
        Ok(u32::from_be_bytes(self.key_fingerprint_data()?))
    }

    /// Base58Check form preferring the private serialization, falling
    /// back to public, falling back to the literal string `"invalid"` if
    /// even that fails (only possible for a malformed value).
    pub fn base58(&self) -> String {
        self.base58_private()
            .or_else(|| self.base58_public())
            .unwrap_or_else(|| "invalid".to_string())
    }

    /// Private Base58Check serialization, or `None` if this key has no
    /// private material.
    pub fn base58_private(&self) -> Option<String> {
        if !self.is_private() {
            return None;
        }
        let ext = self.to_extended_key().ok()?;
        DefaultKernel::serialize_base58(&ext, true).ok()
    }

    /// Public Base58Check serialization.
    pub fn base58_public(&self) -> Option<String> {
        let ext = self.to_extended_key().ok()?;
        DefaultKernel::serialize_base58(&ext, false).ok()
    }

    /// Render `[parent/]base58[/children]`, eliding empty path segments.
    pub fn description(&self, with_parent: bool, with_children: bool) -> String {
        let mut out = String::new();

        if with_parent && !self.parent.is_empty() {
            out.push_str(&self.parent.format());
            out.push('/');
        }

        out.push_str(&self.base58());

        if with_children && !self.children.is_empty() {
            out.push('/');
            out.push_str(&self.children.format());
        }

        out
    }

    /// `description(true, true)`.
    pub fn full_description(&self) -> String {
        self.description(true, true)
    }
}

impl HDKey {
    /// Build an `HDKey` directly from already-validated parts, bypassing
    /// the kernel-backed constructors. Used by the CBOR decoder, which
    /// reads these fields straight off the wire.
    pub(crate) fn from_parts(
        is_master: bool,
        key_type: KeyType,
        key_data: [u8; 33],
        chain_code: Option<[u8; 32]>,
        use_info: UseInfo,
        parent: DerivationPath,
        children: DerivationPath,
        parent_fingerprint: Option<u32>,
    ) -> Self {
        Self {
            is_master,
            key_type,
            key_data,
            chain_code,
            use_info,
            parent,
            children,
            parent_fingerprint,
        }
    }

    /// Is this a private key?
    pub fn is_private(&self) -> bool {
        self.key_type.is_private()
    }

    /// Does this key carry a chain code (i.e. can it derive children)?
    pub fn is_derivable(&self) -> bool {
        self.chain_code.is_some()
    }

    /// Does the `children` template need a wildcard substitution before
    /// it can be derived?
    pub fn requires_wildcard_child_num(&self) -> bool {
        self.children.has_wildcard()
    }

    /// `true` iff this is the master key derived directly from seed
    /// entropy.
    pub fn is_master(&self) -> bool {
        self.is_master
    }

    /// Whether this holds private or public key material.
    pub fn key_type(&self) -> KeyType {
        self.key_type
    }

    /// The raw 33-byte key material (`0x00‖scalar` for private keys, a
    /// SEC1-compressed point for public keys).
    pub fn key_data(&self) -> &[u8; 33] {
        &self.key_data
    }

    /// The 32-byte chain code, or `None` if this key is not derivable.
    pub fn chain_code(&self) -> Option<&[u8; 32]> {
        self.chain_code.as_ref()
    }

    /// This key's `(asset, network)` pair.
    pub fn use_info(&self) -> UseInfo {
        self.use_info
    }

    /// This key's provenance path from its origin source.
    pub fn parent(&self) -> &DerivationPath {
        &self.parent
    }

    /// The template path of this key's intended descendants.
    pub fn children(&self) -> &DerivationPath {
        &self.children
    }

    /// The fingerprint of this key's immediate parent, or `None` for a
    /// master key.
    pub fn parent_fingerprint(&self) -> Option<u32> {
        self.parent_fingerprint
    }

    /// The origin fingerprint propagated from `parent`, not recomputed.
    pub fn origin_fingerprint(&self) -> Option<u32> {
        self.parent.origin_fingerprint()
    }

    /// The canonical CBOR-encoded `[keyData, chainCode-or-null, asset,
    /// network]` sequence used as the input to an external content hash.
    /// Depends only on key material, chain code, asset, and network — not
    /// on provenance (spec §4.5).
    pub fn identity_digest_source(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        let mut encoder = minicbor::Encoder::new(&mut buf);

        encoder
            .bytes(&self.key_data)
            .expect("encoding into a Vec<u8> cannot fail");

        match self.chain_code {
            Some(chain_code) => {
                encoder
                    .bytes(&chain_code)
                    .expect("encoding into a Vec<u8> cannot fail");
            }
            None => {
                encoder
                    .null()
                    .expect("encoding into a Vec<u8> cannot fail");
            }
        }

        encoder
            .u32(u32::from(self.use_info.asset))
            .expect("encoding into a Vec<u8> cannot fail");
        encoder
            .u64(self.use_info.network.wire_value())
            .expect("encoding into a Vec<u8> cannot fail");

        buf
    }
}

#[cfg(all(test, feature = "secp256k1"))]
mod tests {
    use super::*;
    use hex_literal::hex;

    fn seed() -> [u8; 16] {
        hex!("000102030405060708090a0b0c0d0e0f")
    }

    #[test]
    fn from_seed_produces_private_master() {
        let master = HDKey::from_seed(&seed(), None).unwrap();
        assert!(master.is_master());
        assert!(master.is_private());
        assert_eq!(master.parent().effective_depth(), 0);
        assert_eq!(
            master.base58(),
            "xprv9s21ZrQH143K3QTDL4LXw2F7HEK3wJUD2nW2nRk4stbPy6cq3jPP\
             qjiChkVvvNKmPGJxWUtg6LnF5kejMRNNU3TGtRBeJgk33yuGBxrMPHi"
        );
    }

    #[test]
    fn base58_round_trip_preserves_fingerprint() {
        let master = HDKey::from_seed(&seed(), None).unwrap();
        let reparsed = HDKey::from_base58(&master.base58(), None, None, None, None).unwrap();
        assert_eq!(reparsed.key_data(), master.key_data());
        assert_eq!(reparsed.chain_code(), master.chain_code());
        assert_eq!(
            reparsed.key_fingerprint().unwrap(),
            master.key_fingerprint().unwrap()
        );
    }

    #[test]
    fn path_derivation_tracks_provenance() {
        let master = HDKey::from_seed(&seed(), None).unwrap();
        let path: DerivationPath = "48'/0'/0'/2'".parse().unwrap();
        let derived = master
            .derive_path(None, &path, true, None, None, None)
            .unwrap();

        assert_eq!(derived.parent().effective_depth(), 4);
        assert_eq!(derived.parent().steps().len(), 4);
        assert_eq!(
            derived.parent().origin_fingerprint(),
            Some(master.key_fingerprint().unwrap())
        );
    }

    #[test]
    fn public_only_rejects_hardened_without_provider() {
        let master = HDKey::from_seed(&seed(), None).unwrap();
        let path: DerivationPath = "48'/0'/0'/2'".parse().unwrap();
        let derived = master
            .derive_path(None, &path, true, None, None, None)
            .unwrap();
        let pub_only = derived.public();

        let ok = pub_only
            .derive_path(None, &"0/0".parse().unwrap(), true, None, None, None)
            .unwrap();
        assert!(!ok.is_private());

        let err = pub_only.derive_path(None, &"0'".parse().unwrap(), true, None, None, None);
        assert_eq!(err.unwrap_err(), Error::CannotDeriveHardenedFromPublic);
    }

    #[test]
    fn wildcard_child_requires_substitution() {
        let master = HDKey::from_seed(&seed(), None).unwrap();
        let template: DerivationPath = "0/*".parse().unwrap();

        let err = master.derive_path(None, &template, true, None, None, None);
        assert_eq!(err.unwrap_err(), Error::CannotDeriveInspecificStep);

        let via_wildcard = master
            .derive_path(None, &template, true, Some(7), None, None)
            .unwrap();
        let direct = master
            .derive_path(None, &"0/7".parse().unwrap(), true, None, None, None)
            .unwrap();
        assert_eq!(via_wildcard.key_data(), direct.key_data());
    }

    #[test]
    fn identity_digest_source_ignores_provenance() {
        let master = HDKey::from_seed(&seed(), None).unwrap();
        let path: DerivationPath = "0'".parse().unwrap();
        let derived = master
            .derive_path(None, &path, true, None, None, None)
            .unwrap();

        let with_parent = derived.clone();
        let reparented = HDKey {
            parent: DerivationPath::empty(),
            parent_fingerprint: None,
            ..derived
        };

        assert_eq!(
            with_parent.identity_digest_source(),
            reparented.identity_digest_source()
        );
    }

    #[test]
    fn derivation_composition_law() {
        let master = HDKey::from_seed(&seed(), None).unwrap();
        let p1: DerivationPath = "0'".parse().unwrap();
        let p2: DerivationPath = "1".parse().unwrap();
        let combined: DerivationPath = "0'/1".parse().unwrap();

        let step_by_step = master
            .derive_path(None, &p1, true, None, None, None)
            .unwrap()
            .derive_path(None, &p2, true, None, None, None)
            .unwrap();
        let direct = master
            .derive_path(None, &combined, true, None, None, None)
            .unwrap();

        assert_eq!(step_by_step.key_data(), direct.key_data());
        assert_eq!(step_by_step.chain_code(), direct.chain_code());
    }
}
