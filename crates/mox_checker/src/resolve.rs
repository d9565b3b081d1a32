//! Overload resolution among a method's qualifier variants.
//!
//! The two axes resolve independently and compose orthogonally. The only
//! sanctioned automatic fallbacks are directional: a mutable-context
//! call may silently use a const-only body, and a volatile-context call
//! may silently use an atomic body. The reverse directions always fail.

use crate::lattice::EffectivePair;
use crate::registry::VariantInfo;
use crate::CheckError;
use mox_ast::{Safety, Span, VariantTag};

/// Outcome of resolving one call site.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// Index into the method's variant list.
    pub variant: usize,
    pub const_fallback: bool,
    pub atomic_fallback: bool,
    /// Qualifier context forwarded into the variant body: fixed by a
    /// SafeOnly/UnsafeOnly tag, forwarded from the caller for Both.
    pub context: EffectivePair,
}

/// Per-axis preference of a variant tag under a required qualifier.
/// `None` marks the variant unusable on that axis; lower is better.
/// Score 2 is the silent fallback (safe body from an unsafe context).
fn axis_score(tag: VariantTag, required: Safety) -> Option<u8> {
    match required {
        Safety::Safe => match tag {
            VariantTag::SafeOnly => Some(0),
            VariantTag::Both => Some(1),
            VariantTag::UnsafeOnly => None,
        },
        Safety::Unsafe => match tag {
            VariantTag::UnsafeOnly => Some(0),
            VariantTag::Both => Some(1),
            VariantTag::SafeOnly => Some(2),
        },
    }
}

fn body_context(tag: VariantTag, required: Safety) -> Safety {
    match tag {
        VariantTag::SafeOnly => Safety::Safe,
        VariantTag::UnsafeOnly => Safety::Unsafe,
        VariantTag::Both => required,
    }
}

pub fn resolve_variant(
    method: &str,
    variants: &[VariantInfo],
    required: EffectivePair,
    span: &Span,
) -> Result<Resolution, CheckError> {
    // Constness axis first: if no variant is usable there at all, the
    // failure names that axis regardless of atomicity.
    let const_usable: Vec<(usize, u8)> = variants
        .iter()
        .enumerate()
        .filter_map(|(index, info)| {
            axis_score(info.constness, required.constness).map(|score| (index, score))
        })
        .collect();
    if const_usable.is_empty() {
        return Err(CheckError::NoConstVariant {
            method: method.to_string(),
            required: required.constness,
            span: span.clone(),
        });
    }

    let mut best: Option<(usize, u8, u8)> = None;
    for (index, const_score) in const_usable {
        let Some(atomic_score) = axis_score(variants[index].atomicity, required.atomicity) else {
            continue;
        };
        let candidate = (index, const_score, atomic_score);
        let better = match best {
            None => true,
            Some((_, bc, ba)) => {
                let (total, best_total) = (const_score + atomic_score, bc + ba);
                total < best_total || (total == best_total && const_score < bc)
            }
        };
        if better {
            best = Some(candidate);
        }
    }

    let Some((variant, const_score, atomic_score)) = best else {
        return Err(CheckError::NoAtomicVariant {
            method: method.to_string(),
            required: required.atomicity,
            span: span.clone(),
        });
    };

    let info = &variants[variant];
    Ok(Resolution {
        variant,
        const_fallback: const_score == 2,
        atomic_fallback: atomic_score == 2,
        context: EffectivePair {
            constness: body_context(info.constness, required.constness),
            atomicity: body_context(info.atomicity, required.atomicity),
        },
    })
}
