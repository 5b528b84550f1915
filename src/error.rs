//! Error type.

use core::fmt::{self, Display};

/// Result type.
pub type Result<T> = core::result::Result<T, Error>;

/// Error type.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// The crypto-kernel rejected the seed entropy.
    InvalidSeed,

    /// Base58 parse or checksum failure.
    InvalidBase58,

    /// Caller asked for a private key derived from a public key.
    CannotDerivePrivateFromPublic,

    /// A hardened step was requested of a public key with no
    /// private-key provider available.
    CannotDeriveHardenedFromPublic,

    /// The parent key has no chain code, so it cannot be used to derive
    /// children.
    CannotDeriveFromNonDerivable,

    /// A wildcard step was left unresolved.
    CannotDeriveInspecificStep,

    /// Rebasing a path prefix against a parent would underflow.
    InvalidDepth,

    /// The crypto-kernel failed for an otherwise valid input.
    UnknownDerivationError,

    /// CBOR schema violation on decode.
    InvalidFormat,

    /// Child number out of range or otherwise malformed.
    ChildNumber,

    /// Maximum derivation depth exceeded.
    Depth,

    /// Decoding error not covered by a more specific variant.
    Decode,

    /// Cryptographic error surfaced by the kernel backend.
    Crypto,

    /// An output-descriptor bundle was built from a non-master key.
    NotMasterKey,
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidSeed => f.write_str("crypto-kernel rejected seed entropy"),
            Error::InvalidBase58 => f.write_str("base58 parse or checksum error"),
            Error::CannotDerivePrivateFromPublic => {
                f.write_str("cannot derive a private key from a public key")
            }
            Error::CannotDeriveHardenedFromPublic => f.write_str(
                "cannot derive a hardened child from a public key without a private-key provider",
            ),
            Error::CannotDeriveFromNonDerivable => {
                f.write_str("parent key has no chain code and is not derivable")
            }
            Error::CannotDeriveInspecificStep => {
                f.write_str("wildcard derivation step has no substitution")
            }
            Error::InvalidDepth => f.write_str("path rebase would underflow depth"),
            Error::UnknownDerivationError => f.write_str("crypto-kernel derivation failed"),
            Error::InvalidFormat => f.write_str("invalid tagged-CBOR format"),
            Error::ChildNumber => f.write_str("invalid child number"),
            Error::Depth => f.write_str("maximum derivation depth exceeded"),
            Error::Decode => f.write_str("decoding error"),
            Error::Crypto => f.write_str("cryptographic error"),
            Error::NotMasterKey => f.write_str("output-descriptor bundle requires a master key"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

impl From<bs58::decode::Error> for Error {
    fn from(_: bs58::decode::Error) -> Error {
        Error::InvalidBase58
    }
}

impl From<bs58::encode::Error> for Error {
    fn from(_: bs58::encode::Error) -> Error {
        Error::InvalidBase58
    }
}

impl From<core::array::TryFromSliceError> for Error {
    fn from(_: core::array::TryFromSliceError) -> Error {
        Error::Decode
    }
}

impl From<hmac::digest::InvalidLength> for Error {
    fn from(_: hmac::digest::InvalidLength) -> Error {
        Error::Crypto
    }
}

#[cfg(feature = "secp256k1")]
impl From<k256::elliptic_curve::Error> for Error {
    fn from(_: k256::elliptic_curve::Error) -> Error {
        Error::Crypto
    }
}

#[cfg(feature = "secp256k1")]
impl From<k256::ecdsa::Error> for Error {
    fn from(_: k256::ecdsa::Error) -> Error {
        Error::Crypto
    }
}

impl From<minicbor::decode::Error> for Error {
    fn from(_: minicbor::decode::Error) -> Error {
        Error::InvalidFormat
    }
}
