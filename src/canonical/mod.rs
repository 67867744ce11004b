//! Canonicalizer
//!
//! Rewrites deprecated configuration shapes into their canonical form so the
//! validators only ever see one shape. Each rule is triggered by the presence
//! of the deprecated key; a rule that finds both shapes populated where that
//! is ambiguous fails with [`ValidationError::ConflictingConfig`].

pub mod cf;
pub mod plans;
pub mod quotas;
pub mod stemcells;

use crate::error::ValidationError;
use crate::render::RenderContext;
use tracing::trace;

/// A single rewrite rule
pub type Canonicalizer = fn(&mut RenderContext) -> Result<(), ValidationError>;

/// Name of the link through which errands see the broker's properties
pub const BROKER_LINK: &str = "broker";

/// Apply `canonicalizers` in order, stopping at the first error
///
/// # Errors
///
/// Returns the first [`ValidationError`] raised by a rule.
#[inline]
pub fn canonicalize(
    canonicalizers: &[Canonicalizer],
    context: &mut RenderContext,
) -> Result<(), ValidationError> {
    for (index, canonicalizer) in canonicalizers.iter().enumerate() {
        trace!("Applying canonicalizer {}/{}", index + 1, canonicalizers.len());
        canonicalizer(context)?;
    }
    Ok(())
}
