//! Behaviour-driven tests for a full plugin pass over script plugins.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use rhai::Engine;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tempfile::TempDir;

use crate::error::PluginError;
use crate::runner::{PluginRunner, RunnerConfig};
use crate::script::ScriptLoader;

use super::{Journal, journal_entries, thrown_value};

// ---------------------------------------------------------------------------
// Test world
// ---------------------------------------------------------------------------

#[derive(Default)]
struct TestWorld {
    temp: Option<TempDir>,
    plugin_dir: PathBuf,
    journal: Journal,
    output: Vec<u8>,
    result: Option<Result<(), PluginError>>,
}

#[fixture]
fn world() -> TestWorld {
    TestWorld::default()
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn unquote(text: &str) -> &str {
    text.trim_matches('"')
}

fn write_file(world: &TestWorld, file: &str, source: &str) {
    fs::write(world.plugin_dir.join(unquote(file)), source).expect("write plugin file");
}

fn recording_engine(journal: &Journal) -> Engine {
    let mut engine = Engine::new();
    let shared = Arc::clone(journal);
    engine.register_fn("record", move |entry: &str| {
        shared.lock().expect("journal lock").push(entry.to_owned());
    });
    engine
}

fn output_lines(world: &TestWorld) -> Vec<String> {
    String::from_utf8_lossy(&world.output)
        .lines()
        .map(str::to_owned)
        .collect()
}

fn captured_error(world: &TestWorld) -> &PluginError {
    world
        .result
        .as_ref()
        .expect("no result captured")
        .as_ref()
        .expect_err("expected failure but the pass succeeded")
}

// ---------------------------------------------------------------------------
// Given steps
// ---------------------------------------------------------------------------

#[given("a plugin directory")]
fn given_plugin_directory(world: &mut TestWorld) {
    let temp = TempDir::new().expect("create plugin dir");
    world.plugin_dir = temp.path().to_path_buf();
    world.temp = Some(temp);
}

#[given("a missing plugin directory")]
fn given_missing_directory(world: &mut TestWorld) {
    let temp = TempDir::new().expect("create temp dir");
    world.plugin_dir = temp.path().join("plugins");
    world.temp = Some(temp);
}

#[given("a recording plugin {file}")]
fn given_recording_plugin(world: &mut TestWorld, file: String) {
    let stem = unquote(&file).trim_end_matches(".plug").to_owned();
    write_file(
        world,
        &file,
        &format!("fn on_build() {{ record(\"{stem}\"); }}\n"),
    );
}

#[given("a text file {file}")]
fn given_text_file(world: &mut TestWorld, file: String) {
    let stem = unquote(&file).trim_end_matches(".txt").to_owned();
    write_file(world, &file, &format!("record(\"{stem}\");\n"));
}

#[given("a plugin {file} without a build hook")]
fn given_plugin_without_hook(world: &mut TestWorld, file: String) {
    let stem = unquote(&file).trim_end_matches(".plug").to_owned();
    write_file(
        world,
        &file,
        &format!("record(\"{stem}-loaded\");\nfn on_deploy() {{ record(\"deploy\"); }}\n"),
    );
}

#[given("a plugin {file} whose build hook throws {value}")]
fn given_throwing_plugin(world: &mut TestWorld, file: String, value: String) {
    let thrown = unquote(&value).to_owned();
    write_file(
        world,
        &file,
        &format!("fn on_build() {{ throw \"{thrown}\"; }}\n"),
    );
}

// ---------------------------------------------------------------------------
// When steps
// ---------------------------------------------------------------------------

#[when("the plugin pass runs")]
fn when_pass_runs(world: &mut TestWorld) {
    let loader = ScriptLoader::with_engine(recording_engine(&world.journal));
    let runner = PluginRunner::new(RunnerConfig::new(world.plugin_dir.clone(), ".plug"), loader);
    let mut output = Vec::new();
    world.result = Some(runner.run_plugins(&mut output));
    world.output = output;
}

// ---------------------------------------------------------------------------
// Then steps
// ---------------------------------------------------------------------------

#[then("the pass succeeds")]
fn then_pass_succeeds(world: &mut TestWorld) {
    let result = world.result.as_ref().expect("no result captured");
    assert!(result.is_ok(), "expected success, got: {result:?}");
}

#[then("the log holds {first} and {second} in any order")]
fn then_log_holds(world: &mut TestWorld, first: String, second: String) {
    let mut entries = journal_entries(&world.journal);
    entries.sort();
    let mut expected = vec![unquote(&first).to_owned(), unquote(&second).to_owned()];
    expected.sort();
    assert_eq!(entries, expected);
}

#[then("nothing was recorded for {entry}")]
fn then_nothing_recorded(world: &mut TestWorld, entry: String) {
    let unexpected = unquote(&entry);
    assert!(
        !journal_entries(&world.journal)
            .iter()
            .any(|recorded| recorded == unexpected),
        "'{unexpected}' should never have been loaded"
    );
}

#[then("the log is exactly {entry}")]
fn then_log_is_exactly(world: &mut TestWorld, entry: String) {
    assert_eq!(journal_entries(&world.journal), [unquote(&entry)]);
}

#[then("the log is empty")]
fn then_log_is_empty(world: &mut TestWorld) {
    assert!(journal_entries(&world.journal).is_empty());
}

#[then("the start and completion lines are printed")]
fn then_status_lines_printed(world: &mut TestWorld) {
    assert_eq!(
        output_lines(world),
        ["Running plugins (build)...", "Plugins executed."]
    );
}

#[then("the completion line is not printed")]
fn then_completion_missing(world: &mut TestWorld) {
    assert!(
        !output_lines(world).iter().any(|line| line == "Plugins executed."),
        "completion line printed after a failure"
    );
}

#[then("the pass fails with a directory access error")]
fn then_directory_error(world: &mut TestWorld) {
    let err = captured_error(world);
    assert!(
        matches!(err, PluginError::DirectoryAccess { .. }),
        "expected DirectoryAccess, got: {err}"
    );
}

#[then("the pass fails with the thrown value {value} from {plugin}")]
fn then_thrown_value(world: &mut TestWorld, value: String, plugin: String) {
    match captured_error(world) {
        PluginError::ScriptHook { name, source, .. } => {
            assert_eq!(name, unquote(&plugin));
            assert_eq!(thrown_value(source).as_deref(), Some(unquote(&value)));
        }
        other => panic!("expected ScriptHook, got: {other}"),
    }
}

// ---------------------------------------------------------------------------
// Scenario registration
// ---------------------------------------------------------------------------

#[scenario(
    path = "tests/features/plugin_pass.feature",
    name = "Plugins with build hooks run and other files are ignored"
)]
fn hooked_plugins_run(world: TestWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/plugin_pass.feature",
    name = "A plugin without a build hook is only loaded"
)]
fn hookless_plugin_is_loaded(world: TestWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/plugin_pass.feature",
    name = "A missing plugin directory fails the pass"
)]
fn missing_directory_fails(world: TestWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/plugin_pass.feature",
    name = "A failing build hook reaches the caller unchanged"
)]
fn failing_hook_propagates(world: TestWorld) {
    drop(world);
}
