#![allow(clippy::result_large_err)]

use crate::core::error::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Parsed template tree handed between AST extensions.
pub type TemplateAst = serde_json::Value;

/// Pure transform applied to the parsed template tree before final
/// compilation.
pub trait TemplateAstTransform: Send + Sync {
    fn name(&self) -> &str;
    fn apply(&self, ast: TemplateAst) -> Result<TemplateAst, AppError>;
}

/// Transform that returns its input unchanged.
pub struct PassthroughTransform;

impl TemplateAstTransform for PassthroughTransform {
    fn name(&self) -> &str {
        "passthrough"
    }

    fn apply(&self, ast: TemplateAst) -> Result<TemplateAst, AppError> {
        Ok(ast)
    }
}

/// Stable directory an extension derives its cache fragment from.
pub trait BaseDirResolver: Send + Sync {
    fn base_dir(&self) -> PathBuf;
}

/// Resolver backed by a fixed directory.
pub struct FixedBaseDir(pub PathBuf);

impl BaseDirResolver for FixedBaseDir {
    fn base_dir(&self) -> PathBuf {
        self.0.clone()
    }
}

impl<F> BaseDirResolver for F
where
    F: Fn() -> PathBuf + Send + Sync,
{
    fn base_dir(&self) -> PathBuf {
        self()
    }
}

/// How an extension proves cache-safety. Decided once at ingestion; an
/// extension that cannot prove it must never share a stable cache key.
#[derive(Clone)]
pub enum CacheStrategy {
    Cacheable { base_dir: Arc<dyn BaseDirResolver> },
    Uncacheable,
}

impl fmt::Debug for CacheStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheStrategy::Cacheable { base_dir } => f
                .debug_struct("Cacheable")
                .field("base_dir", &base_dir.base_dir())
                .finish(),
            CacheStrategy::Uncacheable => write!(f, "Uncacheable"),
        }
    }
}

/// Serializable instructions for reconstructing and invoking an extension's
/// transform inside a separate worker process. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerSpec {
    pub require_file: PathBuf,
    pub build_method: String,
    pub params: serde_json::Value,
}

impl WorkerSpec {
    pub fn new<T: Into<String>>(
        require_file: PathBuf,
        build_method: T,
        params: serde_json::Value,
    ) -> Self {
        WorkerSpec {
            require_file,
            build_method: build_method.into(),
            params,
        }
    }
}

/// One cooperating, independently-versioned AST extension registered against
/// the precompile hook. Read-only to this subsystem; ordering among
/// extensions is significant and preserved from the registry.
#[derive(Clone)]
pub struct AstExtension {
    pub name: String,
    pub transform: Arc<dyn TemplateAstTransform>,
    pub parallel: Option<WorkerSpec>,
    pub cache: CacheStrategy,
}

impl AstExtension {
    /// Ingest an extension with no worker spec and no caching strategy.
    pub fn new<T: Into<String>>(name: T, transform: Arc<dyn TemplateAstTransform>) -> Self {
        AstExtension {
            name: name.into(),
            transform,
            parallel: None,
            cache: CacheStrategy::Uncacheable,
        }
    }

    pub fn with_worker_spec(mut self, spec: WorkerSpec) -> Self {
        self.parallel = Some(spec);
        self
    }

    pub fn with_base_dir<R>(mut self, resolver: R) -> Self
    where
        R: BaseDirResolver + 'static,
    {
        self.cache = CacheStrategy::Cacheable {
            base_dir: Arc::new(resolver),
        };
        self
    }
}

impl fmt::Debug for AstExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AstExtension")
            .field("name", &self.name)
            .field("parallel", &self.parallel)
            .field("cache", &self.cache)
            .finish()
    }
}
