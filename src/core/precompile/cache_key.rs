#![allow(clippy::result_large_err)]

use crate::core::error::{AppError, DiagnosticsSink};
use crate::core::fingerprint::{compute_sha256_hex, fingerprint_dir, fingerprint_file};
use crate::core::precompile::extension::{AstExtension, CacheStrategy, TemplateAstTransform};
use chrono::Utc;
use std::path::Path;
use std::sync::Arc;

/// Separator folded into the composed key; fragment order is part of the key
/// because extension application order affects generated output.
pub const FRAGMENT_SEPARATOR: &str = "|";

/// Ordered cache contributions of the registered extensions, paired with
/// their transform instances in the same order.
pub struct ExtensionFragments {
    pub fragments: Vec<String>,
    pub transforms: Vec<Arc<dyn TemplateAstTransform>>,
}

impl std::fmt::Debug for ExtensionFragments {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtensionFragments")
            .field("fragments", &self.fragments)
            .field("transforms", &self.transforms.len())
            .finish()
    }
}

/// Derive one cache fragment per extension, mirroring registration order.
///
/// Cacheable extensions contribute a content fingerprint of their base
/// directory. An extension without a caching strategy gets a fresh
/// invalidation fragment and a deprecation naming it; caching stays disabled
/// for that extension's contribution only.
pub fn derive_extension_fragments(
    extensions: &[AstExtension],
    diagnostics: &dyn DiagnosticsSink,
) -> Result<ExtensionFragments, AppError> {
    let mut fragments = Vec::with_capacity(extensions.len());
    let mut transforms = Vec::with_capacity(extensions.len());

    for ext in extensions {
        transforms.push(Arc::clone(&ext.transform));
        match &ext.cache {
            CacheStrategy::Cacheable { base_dir } => {
                let dir = base_dir.base_dir();
                let fragment = fingerprint_dir(&dir)
                    .map_err(|err| AppError::from(err).with_code("PRE-KEY-002"))?;
                fragments.push(fragment);
            }
            CacheStrategy::Uncacheable => {
                diagnostics.write_deprecation(&format!(
                    "stencil is opting out of caching due to an AST extension that does not provide a caching strategy: `{}`",
                    ext.name
                ));
                fragments.push(invalidation_fragment());
            }
        }
    }

    Ok(ExtensionFragments {
        fragments,
        transforms,
    })
}

/// Compose the final cache key from the template compiler's content
/// fingerprint, the ordered fragments, and `extra`.
///
/// Deterministic given identical arguments; changes whenever the compiler
/// content, any fragment, the fragment order, or `extra` changes. `extra`
/// lets callers fold in additional structural state (a serialized worker
/// dispatch bundle) without touching fragment derivation.
pub fn compose_cache_key(
    template_compiler: &Path,
    fragments: &[String],
    extra: &str,
) -> Result<String, AppError> {
    let compiler_fingerprint = fingerprint_file(template_compiler)
        .map_err(|err| AppError::from(err).with_code("PRE-KEY-001"))?;

    let mut key_input = compiler_fingerprint;
    for fragment in fragments {
        key_input.push_str(FRAGMENT_SEPARATOR);
        key_input.push_str(fragment);
    }
    key_input.push_str(FRAGMENT_SEPARATOR);
    key_input.push_str(extra);

    Ok(compute_sha256_hex(key_input.as_bytes()))
}

/// Fragment that can never be reused between two derivation calls, so a
/// cache-unsafe extension always forces invalidation.
fn invalidation_fragment() -> String {
    format!(
        "{}{}{}",
        Utc::now().timestamp_millis(),
        FRAGMENT_SEPARATOR,
        rand::random::<u64>()
    )
}
