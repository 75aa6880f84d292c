#![allow(clippy::result_large_err)]

use crate::core::error::AppError;
use crate::core::precompile::extension::{AstExtension, WorkerSpec};
use crate::core::types::ErrorCategory;

/// True iff every registered extension can be dispatched into an
/// out-of-process worker. One extension without a worker spec forces the
/// whole set onto the sequential path.
pub fn can_parallelize(extensions: &[AstExtension]) -> bool {
    extensions.iter().all(|ext| ext.parallel.is_some())
}

/// Worker specs for every extension, in registration order. Callers must
/// check `can_parallelize` first; an extension without a spec is a contract
/// violation here, never a silent partial result.
pub fn collect_worker_specs(extensions: &[AstExtension]) -> Result<Vec<WorkerSpec>, AppError> {
    extensions
        .iter()
        .map(|ext| {
            ext.parallel.clone().ok_or_else(|| {
                AppError::new(
                    ErrorCategory::PreconditionError,
                    format!(
                        "collect_worker_specs called while extension `{}` lacks a worker spec; check can_parallelize first",
                        ext.name
                    ),
                )
                .with_code("PRE-CAP-001")
            })
        })
        .collect()
}
