//! Child indices and derivation steps.

use crate::{Error, Result};
use core::fmt;
use core::str::FromStr;

/// Hardened child keys use indices 2^31 through 2^32-1.
const HARDENED_FLAG: u32 = 1 << 31;

/// Upper bound (exclusive) of a non-hardened child index.
pub const CHILD_INDEX_LIMIT: u32 = HARDENED_FLAG;

/// A single BIP32 child index, before the hardened bit is folded in.
///
/// Unlike the packed 32-bit `childNumber` used on the wire, `ChildIndex`
/// keeps the hardened flag out-of-band (see [`DerivationStep`]) and adds a
/// `Wildcard` variant for derivation-path templates (spec §3.1).
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ChildIndex {
    /// A concrete index in `0..2^31`.
    Index(u32),
    /// A template placeholder (`*`) that must be resolved before use.
    Wildcard,
}

impl ChildIndex {
    /// Construct a [`ChildIndex::Index`], rejecting values outside
    /// `0..2^31`.
    pub fn new(value: u32) -> Result<Self> {
        if value >= CHILD_INDEX_LIMIT {
            return Err(Error::ChildNumber);
        }

        Ok(ChildIndex::Index(value))
    }

    /// Does this index carry a wildcard?
    pub fn is_wildcard(&self) -> bool {
        matches!(self, ChildIndex::Wildcard)
    }
}

impl fmt::Display for ChildIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChildIndex::Index(v) => write!(f, "{v}"),
            ChildIndex::Wildcard => f.write_str("*"),
        }
    }
}

/// One step of a [`crate::DerivationPath`]: a child index paired with its
/// hardened flag.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct DerivationStep {
    index: ChildIndex,
    hardened: bool,
}

impl DerivationStep {
    /// A concrete, non-hardened step.
    pub fn normal(value: u32) -> Result<Self> {
        Ok(Self {
            index: ChildIndex::new(value)?,
            hardened: false,
        })
    }

    /// A concrete, hardened step.
    pub fn hardened(value: u32) -> Result<Self> {
        Ok(Self {
            index: ChildIndex::new(value)?,
            hardened: true,
        })
    }

    /// A wildcard template step.
    pub fn wildcard(hardened: bool) -> Self {
        Self {
            index: ChildIndex::Wildcard,
            hardened,
        }
    }

    /// The index component of this step.
    pub fn index(&self) -> ChildIndex {
        self.index
    }

    /// Is this step hardened?
    pub fn is_hardened(&self) -> bool {
        self.hardened
    }

    /// Is this step a wildcard awaiting substitution?
    pub fn is_wildcard(&self) -> bool {
        self.index.is_wildcard()
    }

    /// Split a packed BIP32 child number (as read off the wire) back into a
    /// concrete, non-wildcard step.
    pub fn from_raw(raw: u32) -> Result<Self> {
        let hardened = raw & HARDENED_FLAG != 0;
        let value = raw & !HARDENED_FLAG;

        if hardened {
            DerivationStep::hardened(value)
        } else {
            DerivationStep::normal(value)
        }
    }

    /// Build a step from an already-split index/hardened pair, as produced
    /// by decoding a wire-format derivation path (spec §4.3).
    pub(crate) fn from_parts(index: ChildIndex, hardened: bool) -> Self {
        Self { index, hardened }
    }

    /// The packed BIP32 child number for this step, substituting
    /// `wildcard_child_num` for a wildcard index. Returns `None` if the
    /// step is a wildcard and no substitution was supplied.
    pub fn raw_value(&self, wildcard_child_num: Option<u32>) -> Option<u32> {
        let value = match self.index {
            ChildIndex::Index(v) => v,
            ChildIndex::Wildcard => wildcard_child_num?,
        };

        Some(if self.hardened { value | HARDENED_FLAG } else { value })
    }
}

impl fmt::Display for DerivationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index)?;
        if self.hardened {
            f.write_str("'")?;
        }
        Ok(())
    }
}

impl FromStr for DerivationStep {
    type Err = Error;

    fn from_str(step: &str) -> Result<Self> {
        let (step, hardened) = match step.strip_suffix('\'').or_else(|| step.strip_suffix('h')) {
            Some(s) => (s, true),
            None => (step, false),
        };

        if step == "*" {
            return Ok(DerivationStep::wildcard(hardened));
        }

        let value = step.parse::<u32>().map_err(|_| Error::ChildNumber)?;

        if hardened {
            DerivationStep::hardened(value)
        } else {
            DerivationStep::normal(value)
        }
    }
}

/// Pack a raw BIP32 child number (as carried on the wire) into bytes.
pub fn child_number_to_bytes(raw: u32) -> [u8; 4] {
    raw.to_be_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hardened_and_normal_steps() {
        let hardened: DerivationStep = "0'".parse().unwrap();
        assert!(hardened.is_hardened());
        assert_eq!(hardened.raw_value(None), Some(0 | HARDENED_FLAG));

        let normal: DerivationStep = "44".parse().unwrap();
        assert!(!normal.is_hardened());
        assert_eq!(normal.raw_value(None), Some(44));
    }

    #[test]
    fn rejects_out_of_range_index() {
        assert_eq!(ChildIndex::new(CHILD_INDEX_LIMIT), Err(Error::ChildNumber));
    }

    #[test]
    fn wildcard_requires_substitution() {
        let step = DerivationStep::wildcard(false);
        assert!(step.is_wildcard());
        assert_eq!(step.raw_value(None), None);
        assert_eq!(step.raw_value(Some(7)), Some(7));
    }

    #[test]
    fn from_raw_splits_hardened_bit() {
        let step = DerivationStep::from_raw(0 | HARDENED_FLAG).unwrap();
        assert!(step.is_hardened());
        assert_eq!(step.raw_value(None), Some(HARDENED_FLAG));
    }

    #[test]
    fn wildcard_parses_from_str() {
        let step: DerivationStep = "*'".parse().unwrap();
        assert!(step.is_wildcard());
        assert!(step.is_hardened());
    }
}
