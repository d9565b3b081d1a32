//! The two-axis qualifier lattice and the effective-qualifier rule.
//!
//! Per axis an access resolves to `Safe` when either the binding or the
//! referenced value declares so (pessimistic OR), unless an explicit
//! token at that single access forces the other reading. A forced pair
//! sits between the two: it models a binding that inherited a caller's
//! effective qualifier and is consulted before the OR, after overrides.

use mox_ast::{Qualifier, Safety};
use std::fmt;

/// One of the two orthogonal qualifier axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Constness,
    Atomicity,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Constness => write!(f, "constness"),
            Axis::Atomicity => write!(f, "atomicity"),
        }
    }
}

/// Concrete effective pair of one access or call context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EffectivePair {
    pub constness: Safety,
    pub atomicity: Safety,
}

impl EffectivePair {
    pub fn all_unsafe() -> Self {
        Self {
            constness: Safety::Unsafe,
            atomicity: Safety::Unsafe,
        }
    }

    pub fn axis(&self, axis: Axis) -> Safety {
        match axis {
            Axis::Constness => self.constness,
            Axis::Atomicity => self.atomicity,
        }
    }
}

/// Resolve one axis of one access.
///
/// Precedence: explicit per-access override token, then a forced
/// binding-level qualifier (parameter pass-through, escape hatch), then
/// `Safe` if either the binding annotation or the value flag says so.
pub fn effective_axis(
    binding: Qualifier,
    value_flag: bool,
    forced: Option<Safety>,
    override_token: Option<Safety>,
) -> Safety {
    if let Some(tok) = override_token {
        return tok;
    }
    if let Some(forced) = forced {
        return forced;
    }
    if binding.is_safe() || value_flag {
        Safety::Safe
    } else {
        Safety::Unsafe
    }
}
