//! Corpus runs against a mocked schema source

use mockall::mock;
use provider_doc_lint_checker::{
    Diagnostic, DiagnosticKind, FixHook, FixSummary, LintRun, Linter, TIMEOUTS_PATH,
};
use provider_doc_lint_common::{LintConfig, LintError, Result, TimeoutOp};
use provider_doc_lint_schema::{
    DescriptionSource, ResourceDescription, ResourceSchema, SchemaExtractor, SchemaSource,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

const REDIS_DOC: &str = include_str!("fixtures/redis_cache.html.markdown");
const REDIS_SCHEMA: &str = include_str!("fixtures/azurerm_redis_cache.yaml");

mock! {
    pub Source {}

    impl SchemaSource for Source {
        fn resource_types(&self) -> Vec<String>;
        fn resource_schema(&self, resource_type: &str) -> Result<ResourceSchema>;
    }
}

fn schema_from(yaml: &str) -> Result<ResourceSchema> {
    SchemaExtractor::extract(&ResourceDescription::parse(yaml)?)
}

fn docs_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("redis_cache.html.markdown"), REDIS_DOC).unwrap();
    dir
}

fn mock_source() -> MockSource {
    let mut source = MockSource::new();
    source.expect_resource_types().returning(|| {
        vec![
            "azurerm_redis_cache".to_string(),
            "azurerm_missing_thing".to_string(),
            "azurerm_legacy_thing".to_string(),
            "azurerm_broken".to_string(),
        ]
    });
    source
        .expect_resource_schema()
        .returning(|resource_type| match resource_type {
            "azurerm_redis_cache" => schema_from(REDIS_SCHEMA),
            "azurerm_missing_thing" => {
                schema_from("resource: azurerm_missing_thing\nfields:\n  name: { required: true }\n")
            }
            "azurerm_legacy_thing" => schema_from("resource: azurerm_legacy_thing\ndeprecated: true\n"),
            other => Err(LintError::Schema(format!("{other}: no schema"))),
        });
    source
}

fn report<'a>(run: &'a LintRun, resource_type: &str) -> &'a provider_doc_lint_checker::ResourceReport {
    run.reports
        .iter()
        .find(|r| r.resource_type == resource_type)
        .unwrap()
}

#[test]
fn test_corpus_run() {
    let docs = docs_dir();
    let run = Linter::new(LintConfig::default())
        .workers(2)
        .run(&mock_source(), docs.path());

    let types: Vec<_> = run.reports.iter().map(|r| r.resource_type.as_str()).collect();
    assert_eq!(
        types,
        vec![
            "azurerm_broken",
            "azurerm_legacy_thing",
            "azurerm_missing_thing",
            "azurerm_redis_cache"
        ]
    );

    let redis = report(&run, "azurerm_redis_cache");
    assert_eq!(
        redis.path.as_deref(),
        Some(docs.path().join("redis_cache.html.markdown").as_path())
    );
    let found: Vec<_> = redis
        .diagnostics
        .iter()
        .map(|d| (d.kind.name(), d.path.as_str(), d.line))
        .collect();
    assert_eq!(
        found,
        vec![
            ("default", "minimum_tls_version", Some(37)),
            ("timeout", "timeouts.delete", Some(87)),
            ("missing_in_doc", "subnet_id", None),
        ]
    );
    assert_eq!(
        redis.diagnostics[1].kind,
        DiagnosticKind::Timeout {
            op: TimeoutOp::Delete,
            expected_seconds: 3600,
            actual_seconds: Some(5400),
        }
    );

    let missing = report(&run, "azurerm_missing_thing");
    assert_eq!(missing.diagnostics.len(), 1);
    assert_eq!(missing.diagnostics[0].kind, DiagnosticKind::NoDocument);
    assert!(!missing.diagnostics[0].skip);

    let legacy = report(&run, "azurerm_legacy_thing");
    assert_eq!(legacy.diagnostics[0].kind, DiagnosticKind::NoDocument);
    assert!(legacy.diagnostics[0].skip);

    let broken = report(&run, "azurerm_broken");
    assert!(broken.error.as_deref().unwrap().contains("no schema"));
    assert!(broken.diagnostics.is_empty());

    assert_eq!(run.failure_count(), 4);
    assert_eq!(run.error_count(), 1);
    assert!(run.has_failures());
}

#[test]
fn test_worker_count_does_not_change_results() {
    let docs = docs_dir();
    let single = Linter::new(LintConfig::default())
        .workers(1)
        .run(&mock_source(), docs.path());
    let many = Linter::new(LintConfig::default())
        .workers(8)
        .run(&mock_source(), docs.path());

    let flatten = |run: &LintRun| -> Vec<Diagnostic> {
        run.reports
            .iter()
            .flat_map(|r| r.diagnostics.clone())
            .collect()
    };
    assert_eq!(flatten(&single), flatten(&many));
}

#[test]
fn test_config_filters() {
    let docs = docs_dir();
    let config = LintConfig::from_yaml(
        r#"
version: 1
include: [azurerm_redis_cache, azurerm_missing_thing]
exclude: [azurerm_missing_thing, all.subnet_id]
suppress:
  - key: azurerm_redis_cache.minimum_tls_version
"#,
    )
    .unwrap();

    let mut source = MockSource::new();
    source.expect_resource_types().returning(|| {
        vec![
            "azurerm_redis_cache".to_string(),
            "azurerm_missing_thing".to_string(),
            "azurerm_other".to_string(),
        ]
    });
    source
        .expect_resource_schema()
        .withf(|resource_type| resource_type == "azurerm_redis_cache")
        .times(1)
        .returning(|_| schema_from(REDIS_SCHEMA));

    let run = Linter::new(config).run(&source, docs.path());
    assert_eq!(run.reports.len(), 1);

    let kinds: Vec<_> = run.reports[0]
        .diagnostics
        .iter()
        .map(|d| (d.kind.name(), d.skip))
        .collect();
    assert_eq!(kinds, vec![("default", true), ("timeout", false)]);
    assert_eq!(run.failure_count(), 1);
}

#[test]
fn test_deprecated_resource_from_config() {
    let docs = tempfile::tempdir().unwrap();
    let config = LintConfig::from_yaml("version: 1\ndeprecated_resources: [azurerm_missing_thing]\n").unwrap();

    let mut source = MockSource::new();
    source
        .expect_resource_types()
        .returning(|| vec!["azurerm_missing_thing".to_string()]);
    source
        .expect_resource_schema()
        .returning(|_| schema_from("resource: azurerm_missing_thing\n"));

    let run = Linter::new(config).run(&source, docs.path());
    assert!(run.reports[0].diagnostics[0].skip);
    assert!(!run.has_failures());
}

/// Records what the engine hands to the fixer
#[derive(Default)]
struct RecordingHook {
    calls: Mutex<Vec<(PathBuf, usize)>>,
}

impl FixHook for RecordingHook {
    fn fix(&self, path: &Path, diagnostics: &[Diagnostic]) -> Result<FixSummary> {
        self.calls
            .lock()
            .unwrap()
            .push((path.to_path_buf(), diagnostics.len()));
        Ok(FixSummary {
            applied: diagnostics.iter().filter(|d| d.kind.is_fixable()).count(),
            unfixable: diagnostics.iter().filter(|d| !d.kind.is_fixable()).count(),
        })
    }
}

#[test]
fn test_fix_hook_runs_per_document() {
    let docs = docs_dir();
    let hook = RecordingHook::default();
    let run = Linter::new(LintConfig::default()).fix(&mock_source(), docs.path(), &hook);

    let calls = hook.calls.lock().unwrap();
    assert_eq!(
        *calls,
        vec![(docs.path().join("redis_cache.html.markdown"), 3)]
    );

    let redis = report(&run, "azurerm_redis_cache");
    assert_eq!(
        redis.fix,
        Some(FixSummary {
            applied: 2,
            unfixable: 1
        })
    );
    assert_eq!(run.applied_count(), 2);
    assert_eq!(run.unfixable_count(), 1);
}

#[test]
fn test_description_directory_source() {
    let docs = docs_dir();
    let schemas = tempfile::tempdir().unwrap();
    fs::write(schemas.path().join("azurerm_redis_cache.yaml"), REDIS_SCHEMA).unwrap();

    let source = DescriptionSource::load(schemas.path()).unwrap();
    let run = Linter::new(LintConfig::default()).run(&source, docs.path());

    assert_eq!(run.reports.len(), 1);
    assert_eq!(run.counts_by_kind().get("timeout"), Some(&1));
    assert!(run.reports[0]
        .diagnostics
        .iter()
        .all(|d| d.path != format!("{TIMEOUTS_PATH}.create")));
}
