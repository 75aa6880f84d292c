use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use stencil::core::error::BufferSink;
use stencil::core::precompile::cache_key::{compose_cache_key, derive_extension_fragments};
use stencil::core::precompile::extension::{AstExtension, FixedBaseDir, PassthroughTransform};
use tempfile::TempDir;

fn cacheable_extension(name: &str, base_dir: PathBuf) -> AstExtension {
    AstExtension::new(name, Arc::new(PassthroughTransform)).with_base_dir(FixedBaseDir(base_dir))
}

fn uncacheable_extension(name: &str) -> AstExtension {
    AstExtension::new(name, Arc::new(PassthroughTransform))
}

fn write_compiler(dir: &TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("stencil-compiler.wasm");
    fs::write(&path, content).unwrap();
    path
}

fn extension_dir(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (name, content) in files {
        fs::write(dir.path().join(name), content).unwrap();
    }
    dir
}

#[test]
fn f1_compose_is_deterministic() {
    let workspace = TempDir::new().unwrap();
    let compiler = write_compiler(&workspace, "compiler v1");
    let fragments = vec!["frag-a".to_string(), "frag-b".to_string()];

    let first = compose_cache_key(&compiler, &fragments, "extra").unwrap();
    let second = compose_cache_key(&compiler, &fragments, "extra").unwrap();
    assert_eq!(first, second);
}

#[test]
fn f2_compose_changes_with_compiler_content() {
    let workspace = TempDir::new().unwrap();
    let compiler = write_compiler(&workspace, "compiler v1");
    let fragments = vec!["frag-a".to_string()];

    let before = compose_cache_key(&compiler, &fragments, "").unwrap();
    fs::write(&compiler, "compiler v2").unwrap();
    let after = compose_cache_key(&compiler, &fragments, "").unwrap();
    assert_ne!(before, after);
}

#[test]
fn f3_compose_is_order_sensitive() {
    let workspace = TempDir::new().unwrap();
    let compiler = write_compiler(&workspace, "compiler v1");

    let forward = vec!["frag-a".to_string(), "frag-b".to_string()];
    let reversed = vec!["frag-b".to_string(), "frag-a".to_string()];
    assert_ne!(
        compose_cache_key(&compiler, &forward, "").unwrap(),
        compose_cache_key(&compiler, &reversed, "").unwrap()
    );
}

#[test]
fn f4_compose_tracks_single_fragment_changes() {
    let workspace = TempDir::new().unwrap();
    let compiler = write_compiler(&workspace, "compiler v1");

    let original = vec!["frag-a".to_string(), "frag-b".to_string()];
    let changed = vec!["frag-a".to_string(), "frag-c".to_string()];
    assert_ne!(
        compose_cache_key(&compiler, &original, "").unwrap(),
        compose_cache_key(&compiler, &changed, "").unwrap()
    );
}

#[test]
fn f5_compose_tracks_extra() {
    let workspace = TempDir::new().unwrap();
    let compiler = write_compiler(&workspace, "compiler v1");
    let fragments = vec!["frag-a".to_string()];

    assert_ne!(
        compose_cache_key(&compiler, &fragments, "").unwrap(),
        compose_cache_key(&compiler, &fragments, "{\"worker\":true}").unwrap()
    );
}

#[test]
fn f6_missing_compiler_is_fatal() {
    let workspace = TempDir::new().unwrap();
    let missing = workspace.path().join("nope.wasm");

    let err = compose_cache_key(&missing, &[], "").unwrap_err();
    assert_eq!(err.code, "PRE-KEY-001");
}

#[test]
fn f7_cacheable_fragments_are_stable_across_derivations() {
    let ext_dir = extension_dir(&[("lib.rs", "fn ext() {}")]);
    let extensions = vec![cacheable_extension("inline-helpers", ext_dir.path().into())];
    let sink = BufferSink::new();

    let first = derive_extension_fragments(&extensions, &sink).unwrap();
    let second = derive_extension_fragments(&extensions, &sink).unwrap();
    assert_eq!(first.fragments, second.fragments);
    assert!(sink.deprecations().is_empty());
}

#[test]
fn f8_fallback_fragments_are_never_reused() {
    let extensions = vec![uncacheable_extension("legacy-rewriter")];
    let sink = BufferSink::new();

    let first = derive_extension_fragments(&extensions, &sink).unwrap();
    let second = derive_extension_fragments(&extensions, &sink).unwrap();
    assert_ne!(first.fragments[0], second.fragments[0]);
}

#[test]
fn f9_fallback_emits_deprecation_naming_the_extension() {
    let extensions = vec![uncacheable_extension("legacy-rewriter")];
    let sink = BufferSink::new();

    derive_extension_fragments(&extensions, &sink).unwrap();
    let deprecations = sink.deprecations();
    assert_eq!(deprecations.len(), 1);
    assert!(deprecations[0].contains("`legacy-rewriter`"));
    assert!(deprecations[0].contains("caching strategy"));
}

#[test]
fn f10_fragments_mirror_registration_order_without_dedup() {
    let shared_dir = extension_dir(&[("lib.rs", "fn shared() {}")]);
    let extensions = vec![
        cacheable_extension("first", shared_dir.path().into()),
        cacheable_extension("second", shared_dir.path().into()),
    ];
    let sink = BufferSink::new();

    let derived = derive_extension_fragments(&extensions, &sink).unwrap();
    assert_eq!(derived.fragments.len(), 2);
    assert_eq!(derived.fragments[0], derived.fragments[1]);
    assert_eq!(derived.transforms.len(), 2);
}

#[test]
fn f11_unreadable_base_dir_is_fatal() {
    let ext_dir = TempDir::new().unwrap();
    let missing = ext_dir.path().join("gone");
    let extensions = vec![cacheable_extension("inline-helpers", missing)];
    let sink = BufferSink::new();

    let err = derive_extension_fragments(&extensions, &sink).unwrap_err();
    assert_eq!(err.code, "PRE-KEY-002");
}

#[test]
fn f12_same_inputs_same_key_across_full_derivations() {
    let ext_a = extension_dir(&[("a.rs", "a")]);
    let ext_b = extension_dir(&[("b.rs", "b")]);
    let workspace = TempDir::new().unwrap();
    let compiler = write_compiler(&workspace, "compiler v1");
    let extensions = vec![
        cacheable_extension("a", ext_a.path().into()),
        cacheable_extension("b", ext_b.path().into()),
    ];
    let sink = BufferSink::new();

    let first = derive_extension_fragments(&extensions, &sink).unwrap();
    let second = derive_extension_fragments(&extensions, &sink).unwrap();
    assert_eq!(
        compose_cache_key(&compiler, &first.fragments, "").unwrap(),
        compose_cache_key(&compiler, &second.fragments, "").unwrap()
    );
}
