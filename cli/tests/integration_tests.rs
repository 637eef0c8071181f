use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

/// Helper to create a temp directory that is cleaned up on drop.
struct TempDir {
    path: PathBuf,
}

impl TempDir {
    fn new(name: &str) -> Self {
        let path = std::env::temp_dir().join(format!("cmd_dispatch_cli_test_{name}_{}", std::process::id()));
        let _ = fs::remove_dir_all(&path);
        fs::create_dir_all(&path).expect("failed to create temp dir");
        Self { path }
    }

    fn join(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

fn bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_cmd-dispatch"))
}

fn run(args: &[&str]) -> Output {
    bin().args(args).output().expect("failed to run cmd-dispatch")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// Manifest with a guarded `tp` and an unbound `noop`.
fn write_manifest(dir: &TempDir) -> PathBuf {
    let yaml = r#"version: "1.0"
invoker:
  name: player
  auth_level: 5
commands:
  - name: tp
    description: Teleport to coordinates
    spec: "f|f|f"
    tags: [x, y, z]
    min_args: 3
    auth_level: 10
    action: echo
  - name: say
    spec: "g"
    action: echo
  - name: noop
"#;
    let path = dir.join("commands.yml");
    fs::write(&path, yaml).expect("failed to write manifest");
    path
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

#[test]
fn run_builtin_commands() {
    let output = run(&["run", "-e", "echo hello   world", "-e", "sum 1 2.5 3", "-e", "exec echo nested"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "hello   world\n6.5\nnested\n");
}

#[test]
fn run_reports_error_kinds_and_exit_status() {
    let output = run(&["run", "-e", "nope", "-e", "sum", "-e", "abort", "-e", "echo still runs"]);
    assert_eq!(output.status.code(), Some(1));

    let err = stderr(&output);
    assert!(err.contains("error[UNKNOWN_COMMAND]"), "{err}");
    assert!(err.contains("error[INCOMPLETE_ARGS]"), "{err}");
    assert!(err.contains("error[EXECUTION_ABORTED]"), "{err}");
    assert_eq!(stdout(&output), "still runs\n");
}

#[test]
fn run_fail_fast_stops_at_first_error() {
    let output = run(&["run", "--fail-fast", "-e", "fail broken", "-e", "echo unreachable"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("error[EXECUTION_FAILED]"));
    assert!(stdout(&output).is_empty());
}

#[test]
fn run_reads_script_from_stdin() {
    let mut child = bin()
        .arg("run")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn cmd-dispatch");

    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(b"# greeting\necho one\n\necho two\n")
        .expect("failed to write script");

    let output = child.wait_with_output().expect("failed to wait for cmd-dispatch");
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "one\ntwo\n");
}

#[test]
fn run_with_manifest_enforces_auth_level() {
    let dir = TempDir::new("auth");
    let manifest = write_manifest(&dir);
    let manifest = manifest.to_str().unwrap();

    let output = run(&["run", "--manifest", manifest, "-e", "tp 1 2 3"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("error[INSUFFICIENT_AUTH]"));

    let output = run(&["run", "--manifest", manifest, "--level", "10", "-e", "tp 1 2 3"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "1 2 3\n");

    let output = run(&["run", "--manifest", manifest, "-e", "noop"]);
    assert!(stderr(&output).contains("error[MISSING_EXECUTER]"));
}

// ---------------------------------------------------------------------------
// usage
// ---------------------------------------------------------------------------

#[test]
fn usage_lists_signatures() {
    let dir = TempDir::new("usage");
    let manifest = write_manifest(&dir);

    let output = run(&["usage", "--manifest", manifest.to_str().unwrap(), "tp", "say"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(
        stdout(&output),
        "tp <x:float> <y:float> <z:float>\n    Teleport to coordinates\nsay <arg0*:...>\n"
    );
}

#[test]
fn usage_json_output() {
    let output = run(&["usage", "--json", "sum"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let entries: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(entries[0]["name"], "sum");
    assert_eq!(entries[0]["description"], "Add up to eight numbers");
    assert!(entries[0]["usage"].as_str().unwrap().starts_with("sum <arg0:float> <arg1*:float>"));
}

#[test]
fn usage_unknown_command_fails() {
    let output = run(&["usage", "teleport"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("unknown command 'teleport'"));
}

// ---------------------------------------------------------------------------
// check
// ---------------------------------------------------------------------------

#[test]
fn check_accepts_valid_manifest() {
    let dir = TempDir::new("check_ok");
    let manifest = write_manifest(&dir);

    let output = run(&["check", manifest.to_str().unwrap()]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("3 command(s)"));
}

#[test]
fn check_rejects_bad_spec_and_unknown_action() {
    let dir = TempDir::new("check_bad");

    let bad_spec = dir.join("bad_spec.yml");
    fs::write(&bad_spec, "version: \"1.0\"\ncommands:\n  - name: tp\n    spec: \"f|q\"\n").unwrap();
    let output = run(&["check", bad_spec.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("invalid definition for 'tp'"));

    let bad_action = dir.join("bad_action.json");
    fs::write(
        &bad_action,
        r#"{"version": "1.0", "commands": [{"name": "tp", "action": "warp"}]}"#,
    )
    .unwrap();
    let output = run(&["check", bad_action.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("unknown action 'warp'"));
}
