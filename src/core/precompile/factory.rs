#![allow(clippy::result_large_err)]

use crate::core::error::{AppError, DiagnosticsSink};
use crate::core::precompile::cache_key::{compose_cache_key, derive_extension_fragments};
use crate::core::precompile::capability;
use crate::core::precompile::extension::{
    AstExtension, TemplateAst, TemplateAstTransform, WorkerSpec,
};
use crate::core::types::ErrorCategory;
use serde_json::json;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Identity marker distinguishing this subsystem's pipeline entry from other
/// transforms registered against the same build target.
pub const TRANSFORM_IDENTITY: &str = "stencil-inline-precompile";

/// Loader entry point shipped with this addon, resolved against the addon
/// root; the worker pool requires it to rebuild the precompiler in-process.
pub const WORKER_ENTRY_FILE: &str = "worker/precompile_entry";

/// Entry function the worker loader exposes.
pub const WORKER_BUILD_METHOD: &str = "build";

/// Composite transform closing over the template compiler and the ordered
/// extension transform instances. Extensions are applied in registration
/// order, each consuming the prior's output.
#[derive(Clone)]
pub struct SequentialTransform {
    template_compiler: PathBuf,
    transforms: Vec<Arc<dyn TemplateAstTransform>>,
}

impl SequentialTransform {
    pub fn new(template_compiler: PathBuf, transforms: Vec<Arc<dyn TemplateAstTransform>>) -> Self {
        SequentialTransform {
            template_compiler,
            transforms,
        }
    }

    pub fn template_compiler(&self) -> &Path {
        &self.template_compiler
    }

    pub fn transform_names(&self) -> Vec<&str> {
        self.transforms.iter().map(|t| t.name()).collect()
    }

    pub fn apply(&self, ast: TemplateAst) -> Result<TemplateAst, AppError> {
        let mut current = ast;
        for transform in &self.transforms {
            current = transform.apply(current)?;
        }
        Ok(current)
    }
}

impl fmt::Debug for SequentialTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequentialTransform")
            .field("template_compiler", &self.template_compiler)
            .field("transforms", &self.transform_names())
            .finish()
    }
}

/// How the host pipeline should execute the precompile step.
#[derive(Debug, Clone)]
pub enum ExecutionStrategy {
    /// Handoff to the host's worker pool; this subsystem neither spawns nor
    /// synchronizes with the workers.
    Parallel {
        dispatch: WorkerSpec,
        base_dir: PathBuf,
    },
    Sequential { transform: SequentialTransform },
}

/// The unit inserted into the host pipeline's transform list. Created once
/// per build-graph construction, immutable afterward.
#[derive(Debug, Clone)]
pub struct TransformDescriptor {
    pub identity: &'static str,
    pub cache_key: String,
    pub strategy: ExecutionStrategy,
}

impl TransformDescriptor {
    pub fn is_parallel(&self) -> bool {
        matches!(self.strategy, ExecutionStrategy::Parallel { .. })
    }
}

/// Decides the execution strategy once per build and assembles the
/// descriptor for it.
pub struct TransformFactory {
    addon_root: PathBuf,
}

impl TransformFactory {
    /// `addon_root` is the directory this addon ships from; the worker loader
    /// entry point and the parallel descriptor's base dir resolve against it.
    pub fn new(addon_root: PathBuf) -> Self {
        TransformFactory { addon_root }
    }

    pub fn build(
        &self,
        extensions: &[AstExtension],
        template_compiler: &Path,
        diagnostics: &dyn DiagnosticsSink,
    ) -> Result<TransformDescriptor, AppError> {
        let derived = derive_extension_fragments(extensions, diagnostics)?;

        if capability::can_parallelize(extensions) {
            debug!("dispatching template precompilation through the parallel worker API");
            let worker_config = capability::collect_worker_specs(extensions)?;
            let dispatch = WorkerSpec::new(
                self.addon_root.join(WORKER_ENTRY_FILE),
                WORKER_BUILD_METHOD,
                json!({
                    "template_compiler_path": template_compiler,
                    "worker_config": worker_config,
                }),
            );
            // The dispatch bundle is not part of the fragments; folding its
            // serialized form into `extra` still invalidates the cache when
            // the worker wiring changes.
            let serialized = serde_json::to_string(&dispatch).map_err(|err| {
                AppError::new(
                    ErrorCategory::SerializationError,
                    format!("failed to serialize worker dispatch bundle: {}", err),
                )
            })?;
            let cache_key = compose_cache_key(template_compiler, &derived.fragments, &serialized)?;
            Ok(TransformDescriptor {
                identity: TRANSFORM_IDENTITY,
                cache_key,
                strategy: ExecutionStrategy::Parallel {
                    dispatch,
                    base_dir: self.addon_root.clone(),
                },
            })
        } else {
            debug!("template precompilation falling back to sequential in-process execution");
            let blocking: Vec<&str> = extensions
                .iter()
                .filter(|ext| ext.parallel.is_none())
                .map(|ext| ext.name.as_str())
                .collect();
            diagnostics.write_line(&format!(
                "parallel template precompilation prevented by these extensions: {}",
                blocking.join(", ")
            ));
            let cache_key = compose_cache_key(template_compiler, &derived.fragments, "")?;
            Ok(TransformDescriptor {
                identity: TRANSFORM_IDENTITY,
                cache_key,
                strategy: ExecutionStrategy::Sequential {
                    transform: SequentialTransform::new(
                        template_compiler.to_path_buf(),
                        derived.transforms,
                    ),
                },
            })
        }
    }
}
