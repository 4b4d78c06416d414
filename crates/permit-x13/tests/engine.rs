//! Subprocess protocol tests against shell scripts standing in for the engine.
#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use chrono::NaiveDate;
use permit_model::{Component, NamedSeries, OrderTriple};
use permit_x13::{Adjuster, AdjustmentOptions, EngineConfig, X13Engine, X13Error};
use tempfile::TempDir;

// Scripts are written and executed under one lock so no concurrent fork can
// hold a script open for writing while it is being executed.
static ENGINE_LOCK: Mutex<()> = Mutex::new(());

const SUCCESS_SCRIPT: &str = r#"#!/bin/sh
test -f "$1.spc" || exit 3
out="$2"
: > "$out.err"
printf 'Final automatic model choice : (0 1 1)(0 1 1)\nMean is not significant\n' > "$out.out"
for table in d10 d11 d12 d13; do
    printf 'date\tseries.%s\n------\t------\n200101\t+0.100000000000000E+03\n200102\t+0.000000000000000E+00\n200103\t+0.120500000000000E+03\n' "$table" > "$out.$table"
done
echo "engine done"
"#;

const ERROR_TEXT: &str = " ERROR: Series data contain too few observations to fit the model.\n";

fn write_engine(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("fake-x13");
    fs::write(&path, body).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn series() -> NamedSeries {
    NamedSeries {
        name: "use6_동수_주거용".to_string(),
        domain: "use6".to_string(),
        key: vec!["동수".to_string(), "주거용".to_string()],
        index: (1..=3)
            .map(|month| NaiveDate::from_ymd_opt(2001, month, 1).unwrap())
            .collect(),
        values: vec![Some(100.0), None, Some(120.5)],
    }
}

fn engine(binary: PathBuf, scratch: &Path) -> X13Engine {
    X13Engine::new(
        EngineConfig::new(binary)
            .with_work_dir(scratch)
            .with_timeout(Duration::from_secs(30)),
        AdjustmentOptions::default(),
    )
}

fn is_empty_dir(dir: &Path) -> bool {
    fs::read_dir(dir).unwrap().next().is_none()
}

#[test]
fn successful_run_is_parsed_and_cleaned_up() {
    let _guard = ENGINE_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let bin = TempDir::new().unwrap();
    let scratch = TempDir::new().unwrap();
    let engine = engine(write_engine(bin.path(), SUCCESS_SCRIPT), scratch.path());

    let decomposition = engine.adjust(&series()).unwrap();

    assert_eq!(decomposition.name, "use6_동수_주거용");
    assert_eq!(decomposition.observed.values, vec![100.0, 0.0, 120.5]);
    assert_eq!(decomposition.seasonally_adjusted.values, vec![100.0, 0.0, 120.5]);
    assert_eq!(
        decomposition.component(Component::Irregular).index,
        decomposition.observed.index
    );
    assert_eq!(decomposition.model.order, OrderTriple::new(0, 1, 1));
    assert_eq!(decomposition.model.seasonal_order, OrderTriple::new(0, 1, 1));
    assert!(!decomposition.model.include_mean);
    assert!(decomposition.stdout.contains("engine done"));
    assert!(decomposition.spec.contains("title=\"use6_dongsu_jugeoyong\""));
    assert!(is_empty_dir(scratch.path()));
}

#[test]
fn error_file_is_surfaced_verbatim() {
    let _guard = ENGINE_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let bin = TempDir::new().unwrap();
    let scratch = TempDir::new().unwrap();
    let script = format!("#!/bin/sh\nprintf '{}' > \"$2.err\"\n", ERROR_TEXT.replace('\n', "\\n"));
    let engine = engine(write_engine(bin.path(), &script), scratch.path());

    match engine.adjust(&series()).unwrap_err() {
        X13Error::Engine(text) => assert_eq!(text, ERROR_TEXT),
        other => panic!("unexpected error: {other}"),
    }
    assert!(is_empty_dir(scratch.path()));
}

#[test]
fn err_preamble_alone_does_not_fail() {
    let _guard = ENGINE_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let bin = TempDir::new().unwrap();
    let scratch = TempDir::new().unwrap();
    let script = SUCCESS_SCRIPT.replace(
        ": > \"$out.err\"",
        "printf '  Errors and warnings for the X-13ARIMA-SEATS run of %s.spc:\\n\\n' \"$1\" > \"$out.err\"",
    );
    assert_ne!(script, SUCCESS_SCRIPT);
    let engine = engine(write_engine(bin.path(), &script), scratch.path());

    let decomposition = engine.adjust(&series()).unwrap();

    assert_eq!(decomposition.seasonally_adjusted.values, vec![100.0, 0.0, 120.5]);
    assert!(is_empty_dir(scratch.path()));
}

#[test]
fn err_preamble_with_diagnostics_is_surfaced_verbatim() {
    let _guard = ENGINE_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let bin = TempDir::new().unwrap();
    let scratch = TempDir::new().unwrap();
    let script = SUCCESS_SCRIPT.replace(
        ": > \"$out.err\"",
        "printf '  Errors and warnings for the run of series.spc:\\n ERROR: Series is too short.\\n' > \"$out.err\"",
    );
    let engine = engine(write_engine(bin.path(), &script), scratch.path());

    match engine.adjust(&series()).unwrap_err() {
        X13Error::Engine(text) => assert_eq!(
            text,
            "  Errors and warnings for the run of series.spc:\n ERROR: Series is too short.\n"
        ),
        other => panic!("unexpected error: {other}"),
    }
    assert!(is_empty_dir(scratch.path()));
}

#[test]
fn failed_exit_without_diagnostics() {
    let _guard = ENGINE_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let bin = TempDir::new().unwrap();
    let scratch = TempDir::new().unwrap();
    let engine = engine(
        write_engine(bin.path(), "#!/bin/sh\necho boom >&2\nexit 3\n"),
        scratch.path(),
    );

    match engine.adjust(&series()).unwrap_err() {
        X13Error::EngineExit { stderr, .. } => assert_eq!(stderr.trim(), "boom"),
        other => panic!("unexpected error: {other}"),
    }
    assert!(is_empty_dir(scratch.path()));
}

#[test]
fn missing_component_is_reported() {
    let _guard = ENGINE_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let bin = TempDir::new().unwrap();
    let scratch = TempDir::new().unwrap();
    let script = SUCCESS_SCRIPT.replace("d10 d11 d12 d13", "d10 d11 d12");
    let engine = engine(write_engine(bin.path(), &script), scratch.path());

    let err = engine.adjust(&series()).unwrap_err();
    assert!(matches!(err, X13Error::MissingArtifact { .. }), "{err}");
    assert!(is_empty_dir(scratch.path()));
}

#[test]
fn slow_engine_is_killed() {
    let _guard = ENGINE_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let bin = TempDir::new().unwrap();
    let scratch = TempDir::new().unwrap();
    let binary = write_engine(bin.path(), "#!/bin/sh\nexec sleep 10\n");
    let engine = X13Engine::new(
        EngineConfig::new(binary)
            .with_work_dir(scratch.path())
            .with_timeout(Duration::from_millis(200)),
        AdjustmentOptions::default(),
    );

    assert!(matches!(
        engine.adjust(&series()),
        Err(X13Error::Timeout(_))
    ));
    assert!(is_empty_dir(scratch.path()));
}

#[test]
fn missing_binary_fails_to_spawn() {
    let scratch = TempDir::new().unwrap();
    let engine = engine(PathBuf::from("/nonexistent/x13as"), scratch.path());
    assert!(matches!(
        engine.adjust(&series()),
        Err(X13Error::Spawn { .. })
    ));
    assert!(is_empty_dir(scratch.path()));
}
