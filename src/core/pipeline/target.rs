#![allow(clippy::result_large_err)]

//! Build-target boundary: the ordered transform list owned by a build-graph
//! node, and the per-build ledger recording which targets already carry the
//! precompile capability.

use crate::core::error::AppError;
use crate::core::precompile::factory::TransformDescriptor;
use crate::core::types::{ErrorCategory, TargetId};
use std::collections::HashMap;

/// Whether the capability has been inserted into a target's pipeline.
/// An explicit value, never a callable; written at most once per build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegistrationState {
    #[default]
    Unregistered,
    Registered,
}

/// Per-build registration state keyed by build-target identity. Shared by
/// every cooperating package that might attempt registration; build-graph
/// construction is single-threaded, so no locking.
#[derive(Debug, Default)]
pub struct RegistrationLedger {
    entries: HashMap<TargetId, RegistrationState>,
}

impl RegistrationLedger {
    pub fn new() -> Self {
        RegistrationLedger::default()
    }

    pub fn state(&self, target: &TargetId) -> RegistrationState {
        self.entries.get(target).copied().unwrap_or_default()
    }

    pub fn is_registered(&self, target: &TargetId) -> bool {
        self.state(target) == RegistrationState::Registered
    }

    pub fn mark_registered(&mut self, target: &TargetId) {
        self.entries
            .insert(target.clone(), RegistrationState::Registered);
    }
}

/// Ordered, appendable transform list with identity-tag lookup.
#[derive(Debug, Default)]
pub struct TransformPipeline {
    entries: Vec<TransformDescriptor>,
}

impl TransformPipeline {
    pub fn new() -> Self {
        TransformPipeline::default()
    }

    pub fn entries(&self) -> &[TransformDescriptor] {
        &self.entries
    }

    pub fn contains_identity(&self, identity: &str) -> bool {
        self.entries.iter().any(|entry| entry.identity == identity)
    }

    pub fn append(&mut self, descriptor: TransformDescriptor) {
        self.entries.push(descriptor);
    }
}

/// A node in the host build graph that owns a transform pipeline.
pub trait BuildTarget {
    fn id(&self) -> &TargetId;

    /// The target's pipeline, or a fatal configuration error when the node
    /// does not expose the expected insertion contract.
    fn pipeline_mut(&mut self) -> Result<&mut TransformPipeline, AppError>;

    fn pipeline(&self) -> Option<&TransformPipeline>;
}

/// Build target backed by an in-process pipeline. Embedders adapt their own
/// graph nodes to `BuildTarget`; this implementation serves hosts without a
/// native node type, and tests.
pub struct InMemoryTarget {
    id: TargetId,
    pipeline: Option<TransformPipeline>,
}

impl InMemoryTarget {
    pub fn new<T: Into<TargetId>>(id: T) -> Self {
        InMemoryTarget {
            id: id.into(),
            pipeline: Some(TransformPipeline::new()),
        }
    }

    /// A node without a transform pipeline; registration against it is a
    /// fatal configuration error.
    pub fn detached<T: Into<TargetId>>(id: T) -> Self {
        InMemoryTarget {
            id: id.into(),
            pipeline: None,
        }
    }
}

impl BuildTarget for InMemoryTarget {
    fn id(&self) -> &TargetId {
        &self.id
    }

    fn pipeline_mut(&mut self) -> Result<&mut TransformPipeline, AppError> {
        let id = self.id.clone();
        self.pipeline.as_mut().ok_or_else(|| {
            AppError::new(
                ErrorCategory::ConfigurationError,
                format!(
                    "build target `{}` does not expose an appendable transform pipeline",
                    id
                ),
            )
            .with_code("PRE-REG-001")
        })
    }

    fn pipeline(&self) -> Option<&TransformPipeline> {
        self.pipeline.as_ref()
    }
}
