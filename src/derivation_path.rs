//! Derivation paths: provenance (origin + depth) plus an ordered sequence
//! of [`DerivationStep`]s.

use crate::{DerivationStep, Error, Result};
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;

/// Where a [`DerivationPath`] is rooted.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum PathOrigin {
    /// Rooted at the key with this fingerprint.
    Fingerprint(u32),
    /// Rooted at a symbolically named source (e.g. an external signer).
    Named(String),
}

impl fmt::Display for PathOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathOrigin::Fingerprint(fp) => write!(f, "{fp:08x}"),
            PathOrigin::Named(name) => write!(f, "@{name}"),
        }
    }
}

/// Ordered sequence of [`DerivationStep`]s bundled with an optional origin
/// and an optional explicit depth (spec §3.1).
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct DerivationPath {
    steps: Vec<DerivationStep>,
    origin: Option<PathOrigin>,
    depth: Option<u32>,
}

impl DerivationPath {
    /// Construct a path from its parts, validating `depth >= steps.len()`.
    pub fn new(
        steps: Vec<DerivationStep>,
        origin: Option<PathOrigin>,
        depth: Option<u32>,
    ) -> Result<Self> {
        if let Some(depth) = depth {
            if (depth as usize) < steps.len() {
                return Err(Error::InvalidDepth);
            }
        }

        Ok(Self {
            steps,
            origin,
            depth,
        })
    }

    /// The empty path with no origin and no explicit depth.
    pub fn empty() -> Self {
        Self::default()
    }

    /// This path's steps.
    pub fn steps(&self) -> &[DerivationStep] {
        &self.steps
    }

    /// This path's origin, if any.
    pub fn origin(&self) -> Option<&PathOrigin> {
        self.origin.as_ref()
    }

    /// This path's explicit depth, if any.
    pub fn depth(&self) -> Option<u32> {
        self.depth
    }

    /// Is this path empty of steps, with no origin that isn't a
    /// fingerprint?
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty() && self.origin.is_none() && self.depth.is_none()
    }

    /// `true` iff there are no steps and the origin (if any) is not a
    /// named source.
    pub fn is_master(&self) -> bool {
        self.steps.is_empty() && !matches!(self.origin, Some(PathOrigin::Named(_)))
    }

    /// Does any step in this path use hardened derivation?
    pub fn is_hardened(&self) -> bool {
        self.steps.iter().any(DerivationStep::is_hardened)
    }

    /// Does any step in this path carry a wildcard awaiting substitution?
    pub fn has_wildcard(&self) -> bool {
        self.steps.iter().any(DerivationStep::is_wildcard)
    }

    /// The effective depth: the explicit `depth` if set, else the number
    /// of steps.
    pub fn effective_depth(&self) -> u32 {
        self.depth.unwrap_or(self.steps.len() as u32)
    }

    /// The origin fingerprint, if `origin = Fingerprint(_)`.
    pub fn origin_fingerprint(&self) -> Option<u32> {
        match self.origin {
            Some(PathOrigin::Fingerprint(fp)) => Some(fp),
            _ => None,
        }
    }

    /// Append one step, returning the extended path. The origin and depth
    /// are carried over unchanged; an explicit depth (if present) is
    /// incremented by one.
    pub fn pushed(&self, step: DerivationStep) -> Self {
        let mut steps = self.steps.clone();
        steps.push(step);

        Self {
            steps,
            origin: self.origin.clone(),
            depth: self.depth.map(|d| d + 1),
        }
    }

    /// Concatenate two paths. The origin and explicit depth of `self` are
    /// kept; `other`'s origin/depth are ignored (composition is meant for
    /// two concrete, unrooted step sequences — see spec §8.1's
    /// "derivation composition" law).
    pub fn append(&self, other: &DerivationPath) -> Self {
        let mut steps = self.steps.clone();
        steps.extend(other.steps.iter().copied());

        Self {
            steps,
            origin: self.origin.clone(),
            depth: self.depth.map(|d| d + other.steps.len() as u32),
        }
    }

    /// Drop the first `n` steps, clearing the origin. Returns `None` if
    /// there are fewer than `n` steps.
    pub fn drop_first(&self, n: usize) -> Option<Self> {
        if self.steps.len() < n {
            return None;
        }

        Some(Self {
            steps: self.steps[n..].to_vec(),
            origin: None,
            depth: self.depth.map(|d| d.saturating_sub(n as u32)),
        })
    }

    /// Render this path in its canonical textual form.
    pub fn format(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;

        if let Some(origin) = &self.origin {
            write!(f, "{origin}")?;
            first = false;
        }

        for step in &self.steps {
            if !first {
                f.write_str("/")?;
            } else if self.origin.is_some() {
                f.write_str("/")?;
            }
            write!(f, "{step}")?;
            first = false;
        }

        Ok(())
    }
}

impl FromStr for DerivationPath {
    type Err = Error;

    /// Parse `[origin/]step('/'step)*`. `origin` is either eight hex
    /// digits (a fingerprint) or `@name`.
    fn from_str(s: &str) -> Result<DerivationPath> {
        if s.is_empty() {
            return Ok(DerivationPath::empty());
        }

        let mut parts = s.split('/').peekable();
        let mut origin = None;

        if let Some(&first) = parts.peek() {
            if let Some(name) = first.strip_prefix('@') {
                origin = Some(PathOrigin::Named(name.to_string()));
                parts.next();
            } else if first.len() == 8 && first.chars().all(|c| c.is_ascii_hexdigit()) {
                let fp = u32::from_str_radix(first, 16).map_err(|_| Error::Decode)?;
                origin = Some(PathOrigin::Fingerprint(fp));
                parts.next();
            }
        }

        let steps = parts
            .filter(|p| !p.is_empty())
            .map(str::parse)
            .collect::<Result<Vec<_>>>()?;

        DerivationPath::new(steps, origin, None)
    }
}
