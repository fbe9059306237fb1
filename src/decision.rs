//! Update decision policy
//!
//! Compares the registry's published digest against the running instance's image
//! identity. An unknown digest on either side always means "proceed": a missing
//! local container is the first-time start case, and a registry response we could
//! not fully parse must never be mistaken for "no update needed".

/// Outcome of comparing remote and local image identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Pull the new image and replace the running instance.
    Proceed,
    /// Digests match; nothing to do.
    Skip,
}

/// Decide whether the update should run.
///
/// Skips only when both digests are known, non-empty, exactly equal (no digest
/// algorithm normalization) and the operator did not force the update.
pub fn decide(remote: Option<&str>, local: Option<&str>, force: bool) -> Decision {
    if force {
        return Decision::Proceed;
    }
    match (remote, local) {
        (Some(r), Some(l)) if !r.is_empty() && r == l => Decision::Skip,
        _ => Decision::Proceed,
    }
}
