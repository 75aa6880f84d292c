use serde_json::json;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use stencil::core::error::{AppError, BufferSink};
use stencil::core::precompile::extension::{
    AstExtension, FixedBaseDir, TemplateAst, TemplateAstTransform, WorkerSpec,
};
use stencil::core::precompile::factory::{
    ExecutionStrategy, TransformFactory, TRANSFORM_IDENTITY, WORKER_BUILD_METHOD,
};
use tempfile::TempDir;

/// Appends its own name to a JSON array so application order is observable.
struct MarkerTransform {
    name: String,
}

impl MarkerTransform {
    fn new(name: &str) -> Arc<Self> {
        Arc::new(MarkerTransform {
            name: name.to_string(),
        })
    }
}

impl TemplateAstTransform for MarkerTransform {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, ast: TemplateAst) -> Result<TemplateAst, AppError> {
        let mut entries = ast.as_array().cloned().unwrap_or_default();
        entries.push(json!(self.name));
        Ok(json!(entries))
    }
}

fn worker_spec(marker: &str) -> WorkerSpec {
    WorkerSpec::new(
        format!("extensions/{}/worker", marker).into(),
        "build",
        json!({ "marker": marker }),
    )
}

struct Fixture {
    _workspace: TempDir,
    compiler: PathBuf,
    addon_root: PathBuf,
}

fn fixture() -> Fixture {
    let workspace = TempDir::new().unwrap();
    let compiler = workspace.path().join("stencil-compiler.wasm");
    fs::write(&compiler, "compiler v1").unwrap();
    let addon_root = workspace.path().join("addons").join("stencil");
    fs::create_dir_all(&addon_root).unwrap();
    Fixture {
        compiler,
        addon_root,
        _workspace: workspace,
    }
}

fn cacheable(name: &str, spec: Option<WorkerSpec>, dir: &TempDir) -> AstExtension {
    let ext = AstExtension::new(name, MarkerTransform::new(name))
        .with_base_dir(FixedBaseDir(dir.path().to_path_buf()));
    match spec {
        Some(spec) => ext.with_worker_spec(spec),
        None => ext,
    }
}

fn extension_dir(name: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("lib.rs"), format!("// {}", name)).unwrap();
    dir
}

#[test]
fn f1_all_parallelizable_yields_parallel_descriptor() {
    let fx = fixture();
    let dir_a = extension_dir("a");
    let dir_b = extension_dir("b");
    let x = worker_spec("x");
    let y = worker_spec("y");
    let extensions = vec![
        cacheable("a", Some(x.clone()), &dir_a),
        cacheable("b", Some(y.clone()), &dir_b),
    ];
    let sink = BufferSink::new();

    let factory = TransformFactory::new(fx.addon_root.clone());
    let descriptor = factory.build(&extensions, &fx.compiler, &sink).unwrap();

    assert_eq!(descriptor.identity, TRANSFORM_IDENTITY);
    assert!(descriptor.is_parallel());
    match descriptor.strategy {
        ExecutionStrategy::Parallel { dispatch, base_dir } => {
            assert!(dispatch.require_file.starts_with(&fx.addon_root));
            assert_eq!(dispatch.build_method, WORKER_BUILD_METHOD);
            assert_eq!(base_dir, fx.addon_root);

            let worker_config = dispatch.params.get("worker_config").unwrap();
            let expected = serde_json::to_value(vec![x, y]).unwrap();
            assert_eq!(worker_config, &expected);
        }
        ExecutionStrategy::Sequential { .. } => panic!("expected parallel strategy"),
    }
}

#[test]
fn f2_single_blocking_extension_forces_sequential() {
    let fx = fixture();
    let dir_a = extension_dir("a");
    let dir_b = extension_dir("b");
    let extensions = vec![
        cacheable("a", Some(worker_spec("x")), &dir_a),
        cacheable("b", None, &dir_b),
    ];
    let sink = BufferSink::new();

    let factory = TransformFactory::new(fx.addon_root.clone());
    let descriptor = factory.build(&extensions, &fx.compiler, &sink).unwrap();

    assert!(!descriptor.is_parallel());
    let lines = sink.lines();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].ends_with(": b"), "blocking list should name only b: {}", lines[0]);
}

#[test]
fn f3_sequential_composite_applies_in_registration_order() {
    let fx = fixture();
    let dir_a = extension_dir("a");
    let dir_b = extension_dir("b");
    let extensions = vec![
        cacheable("first", None, &dir_a),
        cacheable("second", None, &dir_b),
    ];
    let sink = BufferSink::new();

    let factory = TransformFactory::new(fx.addon_root.clone());
    let descriptor = factory.build(&extensions, &fx.compiler, &sink).unwrap();

    match descriptor.strategy {
        ExecutionStrategy::Sequential { transform } => {
            assert_eq!(transform.template_compiler(), fx.compiler.as_path());
            assert_eq!(transform.transform_names(), vec!["first", "second"]);
            let result = transform.apply(json!([])).unwrap();
            assert_eq!(result, json!(["first", "second"]));
        }
        ExecutionStrategy::Parallel { .. } => panic!("expected sequential strategy"),
    }
}

#[test]
fn f4_cache_key_is_stable_when_every_extension_is_cacheable() {
    let fx = fixture();
    let dir_a = extension_dir("a");
    let dir_b = extension_dir("b");
    let extensions = vec![
        cacheable("a", Some(worker_spec("x")), &dir_a),
        cacheable("b", Some(worker_spec("y")), &dir_b),
    ];
    let sink = BufferSink::new();
    let factory = TransformFactory::new(fx.addon_root.clone());

    let first = factory.build(&extensions, &fx.compiler, &sink).unwrap();
    let second = factory.build(&extensions, &fx.compiler, &sink).unwrap();
    assert_eq!(first.cache_key, second.cache_key);
}

#[test]
fn f5_uncacheable_extension_invalidates_every_build() {
    let fx = fixture();
    let dir_a = extension_dir("a");
    let extensions = vec![
        cacheable("a", Some(worker_spec("x")), &dir_a),
        AstExtension::new("legacy", MarkerTransform::new("legacy"))
            .with_worker_spec(worker_spec("y")),
    ];
    let sink = BufferSink::new();
    let factory = TransformFactory::new(fx.addon_root.clone());

    let first = factory.build(&extensions, &fx.compiler, &sink).unwrap();
    let second = factory.build(&extensions, &fx.compiler, &sink).unwrap();
    assert_ne!(first.cache_key, second.cache_key);
}

#[test]
fn f6_compiler_content_feeds_the_key() {
    let fx = fixture();
    let dir_a = extension_dir("a");
    let extensions = vec![cacheable("a", Some(worker_spec("x")), &dir_a)];
    let sink = BufferSink::new();
    let factory = TransformFactory::new(fx.addon_root.clone());

    let before = factory.build(&extensions, &fx.compiler, &sink).unwrap();
    fs::write(&fx.compiler, "compiler v2").unwrap();
    let after = factory.build(&extensions, &fx.compiler, &sink).unwrap();
    assert_ne!(before.cache_key, after.cache_key);
}
