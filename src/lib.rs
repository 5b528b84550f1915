#![no_std]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code, clippy::unwrap_used)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

//! A hierarchical-deterministic (BIP32) extended-key core: derivation,
//! provenance-preserving derivation paths, and a tagged-CBOR codec for
//! transporting extended keys and account descriptor bundles as uniform
//! resources.
//!
//! ## Backends
//! The crypto arithmetic behind [`HDKey`] sits behind the [`CryptoKernel`]
//! trait. The only implementation shipped today is [`Secp256k1Kernel`],
//! backed by the pure-Rust `k256` crate, gated under the `secp256k1`
//! feature (enabled by default).
//!
//! ## Limitations and further work
//! - No BIP39/mnemonic support: [`HDKey::from_seed`] takes arbitrary seed
//!   bytes from whatever mnemonic implementation the caller chooses.
//! - No output-descriptor string parsing: [`AccountOutputDescriptorBundle`]
//!   takes an injected [`DescriptorFactory`] instead.
//!
//! # Usage
//!
//! ```
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! # #[cfg(feature = "secp256k1")]
//! # {
//! use hdkey::HDKey;
//!
//! let seed = [0x5du8; 32];
//! let master = HDKey::from_seed(&seed, None)?;
//! assert!(master.is_master());
//!
//! let child = master.derive_path(None, &"44'/0'/0'".parse()?, true, None, None, None)?;
//! assert_eq!(child.parent().effective_depth(), 3);
//!
//! let child_xpub = child.public();
//! assert!(!child_xpub.is_private());
//! # }
//! # Ok(())
//! # }
//! ```
//!
//! [bip32]: https://github.com/bitcoin/bips/blob/master/bip-0032.mediawiki

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

mod child_number;
mod error;
mod key_type;
mod use_info;
mod version;

#[cfg(feature = "alloc")]
mod account;
#[cfg(feature = "alloc")]
mod cbor;
#[cfg(feature = "alloc")]
mod derivation_path;
#[cfg(feature = "alloc")]
mod hd_key;
#[cfg(feature = "alloc")]
mod kernel;

pub use crate::{
    child_number::{ChildIndex, DerivationStep, CHILD_INDEX_LIMIT},
    error::{Error, Result},
    key_type::KeyType,
    use_info::{Asset, Network, UseInfo},
    version::Version,
};

#[cfg(feature = "alloc")]
pub use crate::{
    account::{AccountOutputDescriptorBundle, DescriptorFactory, OutputType},
    derivation_path::{DerivationPath, PathOrigin},
    hd_key::HDKey,
    kernel::{CryptoKernel, ExtKey},
};

#[cfg(feature = "alloc")]
pub use crate::cbor::{TAG_ACCOUNT, TAG_DERIVATION_PATH, TAG_HDKEY, TAG_USE_INFO};

#[cfg(feature = "ur-transport")]
#[cfg_attr(docsrs, doc(cfg(feature = "ur-transport")))]
pub use crate::cbor::{account_to_ur_string, hdkey_from_ur_string, hdkey_to_ur_string};

#[cfg(feature = "secp256k1")]
#[cfg_attr(docsrs, doc(cfg(feature = "secp256k1")))]
pub use {crate::kernel::Secp256k1Kernel, k256 as secp256k1};
