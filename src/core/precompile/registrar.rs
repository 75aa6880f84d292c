#![allow(clippy::result_large_err)]

use crate::core::error::AppError;
use crate::core::pipeline::{BuildTarget, RegistrationLedger};
use crate::core::precompile::factory::TransformDescriptor;
use tracing::debug;

/// Outcome of a registration attempt. Duplicate attempts are no-ops, never
/// errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// The descriptor was appended to the target's pipeline.
    Inserted,
    /// A cooperating provider already declared the capability registered for
    /// this build; the target's pipeline was not inspected.
    SkippedLedger,
    /// The target's pipeline already carried the identity tag.
    SkippedExisting,
}

/// Insert `descriptor` into the target's pipeline exactly once per build.
///
/// The ledger is consulted first so two packages offering equivalent
/// capability cooperate without double insertion; only then is the target's
/// own list scanned for the identity tag.
pub fn register(
    target: &mut dyn BuildTarget,
    descriptor: TransformDescriptor,
    ledger: &mut RegistrationLedger,
) -> Result<Registration, AppError> {
    if ledger.is_registered(target.id()) {
        debug!(
            target_id = %target.id(),
            "precompile capability already registered by a cooperating provider"
        );
        return Ok(Registration::SkippedLedger);
    }

    let target_id = target.id().clone();
    let identity = descriptor.identity;
    let pipeline = target.pipeline_mut()?;

    if pipeline.contains_identity(identity) {
        debug!(target_id = %target_id, "transform already present in pipeline");
        ledger.mark_registered(&target_id);
        return Ok(Registration::SkippedExisting);
    }

    pipeline.append(descriptor);
    ledger.mark_registered(&target_id);
    debug!(target_id = %target_id, "registered inline precompile transform");
    Ok(Registration::Inserted)
}
