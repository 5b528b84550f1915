//! Account-level output-descriptor bundles (spec.md §3.3/§4.6).
//!
//! This crate never parses or renders output-descriptor strings (that is
//! explicit non-goal territory, rust-miniscript's job). Instead
//! [`AccountOutputDescriptorBundle`] is generic over an opaque descriptor
//! type `D` produced by an injected [`DescriptorFactory`], mirroring the
//! `private_key_provider` injection pattern [`crate::HDKey::derive_path`]
//! already uses for hardened derivation from public parents.

use crate::hd_key::HDKey;
use crate::use_info::Network;
use crate::{Error, Result};
use alloc::collections::BTreeMap;
use alloc::vec::Vec;

/// Which kind of scriptPubKey an output descriptor targets.
///
/// Not exhaustive: this crate does not attempt to enumerate every output
/// type a caller's descriptor factory might support.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[non_exhaustive]
pub enum OutputType {
    /// Legacy pay-to-pubkey-hash.
    P2pkh,
    /// Pay-to-script-hash.
    P2sh,
    /// Native SegWit pay-to-witness-pubkey-hash.
    P2wpkh,
    /// SegWit-wrapped-in-P2SH pay-to-witness-script-hash.
    P2wshP2sh,
    /// Native SegWit pay-to-witness-script-hash.
    P2wsh,
    /// Taproot pay-to-taproot.
    P2tr,
}

/// Produces an opaque, already-CBOR-encodable output descriptor for one
/// `(master_key, network, account, output_type)` combination.
///
/// Implementations live entirely on the caller's side (e.g. backed by
/// `rust-miniscript`); this crate only calls through the trait.
pub trait DescriptorFactory<D> {
    /// Build the descriptor for `output_type` under the given account.
    /// Fails if the underlying descriptor construction fails for any
    /// reason the implementation considers fatal.
    fn account_descriptor(
        &self,
        master_key: &HDKey,
        network: Network,
        account: u32,
        output_type: OutputType,
    ) -> Result<D>;
}

/// A bundle of output descriptors for every requested [`OutputType`] under
/// one BIP32 account, keyed by the account's master key fingerprint.
///
/// Construction fails if `master_key.is_master()` is false, or if the
/// descriptor factory fails for any requested output type — matching
/// spec.md §4.6's all-or-nothing contract.
#[derive(Debug, Clone)]
pub struct AccountOutputDescriptorBundle<D> {
    master_key_fingerprint: u32,
    network: Network,
    account: u32,
    descriptors: Vec<D>,
    descriptors_by_output_type: BTreeMap<OutputType, D>,
}

impl<D: Clone> AccountOutputDescriptorBundle<D> {
    /// Build a bundle by delegating to `factory` once per entry in
    /// `output_types`, in order.
    pub fn new(
        master_key: &HDKey,
        network: Network,
        account: u32,
        output_types: &[OutputType],
        factory: &dyn DescriptorFactory<D>,
    ) -> Result<Self> {
        if !master_key.is_master() {
            return Err(Error::NotMasterKey);
        }

        let mut descriptors = Vec::with_capacity(output_types.len());
        let mut descriptors_by_output_type = BTreeMap::new();

        for &output_type in output_types {
            let descriptor =
                factory.account_descriptor(master_key, network, account, output_type)?;
            descriptors.push(descriptor.clone());
            descriptors_by_output_type.insert(output_type, descriptor);
        }

        Ok(Self {
            master_key_fingerprint: master_key.key_fingerprint()?,
            network,
            account,
            descriptors,
            descriptors_by_output_type,
        })
    }

    /// The fingerprint of the master key this bundle was derived from.
    pub fn master_key_fingerprint(&self) -> u32 {
        self.master_key_fingerprint
    }

    /// The network these descriptors target.
    pub fn network(&self) -> Network {
        self.network
    }

    /// The BIP32 account index.
    pub fn account(&self) -> u32 {
        self.account
    }

    /// Descriptors in request order.
    pub fn descriptors(&self) -> &[D] {
        &self.descriptors
    }

    /// Descriptors keyed by output type.
    pub fn descriptors_by_output_type(&self) -> &BTreeMap<OutputType, D> {
        &self.descriptors_by_output_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq)]
    struct StubDescriptor(OutputType, u32);

    struct StubFactory;

    impl DescriptorFactory<StubDescriptor> for StubFactory {
        fn account_descriptor(
            &self,
            _master_key: &HDKey,
            _network: Network,
            account: u32,
            output_type: OutputType,
        ) -> Result<StubDescriptor> {
            Ok(StubDescriptor(output_type, account))
        }
    }

    struct FailingFactory;

    impl DescriptorFactory<StubDescriptor> for FailingFactory {
        fn account_descriptor(
            &self,
            _master_key: &HDKey,
            _network: Network,
            _account: u32,
            _output_type: OutputType,
        ) -> Result<StubDescriptor> {
            Err(Error::UnknownDerivationError)
        }
    }

    #[cfg(feature = "secp256k1")]
    #[test]
    fn bundle_collects_descriptors_by_output_type() {
        use hex_literal::hex;

        let master = HDKey::from_seed(&hex!("000102030405060708090a0b0c0d0e0f"), None).unwrap();
        let bundle = AccountOutputDescriptorBundle::new(
            &master,
            Network::Mainnet,
            0,
            &[OutputType::P2wpkh, OutputType::P2tr],
            &StubFactory,
        )
        .unwrap();

        assert_eq!(bundle.descriptors().len(), 2);
        assert_eq!(
            bundle.descriptors_by_output_type().get(&OutputType::P2tr),
            Some(&StubDescriptor(OutputType::P2tr, 0))
        );
        assert_eq!(bundle.master_key_fingerprint(), master.key_fingerprint().unwrap());
    }

    #[cfg(feature = "secp256k1")]
    #[test]
    fn bundle_rejects_non_master_key() {
        use hex_literal::hex;

        let master = HDKey::from_seed(&hex!("000102030405060708090a0b0c0d0e0f"), None).unwrap();
        let child = master
            .derive_path(None, &"0'".parse().unwrap(), true, None, None, None)
            .unwrap();

        let err = AccountOutputDescriptorBundle::new(
            &child,
            Network::Mainnet,
            0,
            &[OutputType::P2wpkh],
            &StubFactory,
        );
        assert_eq!(err.unwrap_err(), Error::NotMasterKey);
    }

    #[cfg(feature = "secp256k1")]
    #[test]
    fn bundle_propagates_factory_failure() {
        use hex_literal::hex;

        let master = HDKey::from_seed(&hex!("000102030405060708090a0b0c0d0e0f"), None).unwrap();
        let err = AccountOutputDescriptorBundle::new(
            &master,
            Network::Mainnet,
            0,
            &[OutputType::P2wpkh],
            &FailingFactory,
        );
        assert_eq!(err.unwrap_err(), Error::UnknownDerivationError);
    }
}
