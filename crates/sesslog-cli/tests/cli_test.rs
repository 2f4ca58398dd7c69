use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

struct TestWorld {
    temp: TempDir,
}

impl TestWorld {
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("claude")).unwrap();
        fs::create_dir_all(temp.path().join("codex")).unwrap();
        Self { temp }
    }

    fn write_claude_session(&self, project_dir: &str, name: &str, lines: &[&str]) {
        let dir = self.temp.path().join("claude").join(project_dir);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(format!("{}.jsonl", name)), lines.join("\n")).unwrap();
    }

    fn write_codex_session(&self, name: &str, lines: &[&str]) {
        let dir = self.temp.path().join("codex").join("2026").join("01").join("14");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(format!("{}.jsonl", name)), lines.join("\n")).unwrap();
    }

    fn db_path(&self) -> std::path::PathBuf {
        self.temp.path().join("index.db")
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("sesslog").unwrap();
        cmd.env("HOME", self.temp.path())
            .env("SESSLOG_CLAUDE_DIR", self.temp.path().join("claude"))
            .env("SESSLOG_CODEX_DIR", self.temp.path().join("codex"))
            .env("SESSLOG_DB", self.db_path())
            .env("SESSLOG_CONFIG", self.temp.path().join("no-config.toml"));
        cmd
    }
}

fn seed_sessions(world: &TestWorld) {
    world.write_claude_session(
        "-home-x-demo",
        "claude-1",
        &[
            r#"{"type":"user","timestamp":"2026-01-10T09:00:00Z","message":{"content":"refactor the payment module"}}"#,
            r#"{"type":"assistant","timestamp":"2026-01-10T09:01:00Z","message":{"model":"test-model","content":[{"type":"text","text":"starting with the invoice path"}]}}"#,
        ],
    );
    world.write_codex_session(
        "rollout-abc",
        &[
            r#"{"type":"session_meta","timestamp":"2026-01-14T12:00:00Z","payload":{"id":"cx-9","cwd":"/home/x/other"}}"#,
            r#"{"type":"message","role":"user","content":"tune the cache eviction","timestamp":"2026-01-14T12:01:00Z"}"#,
        ],
    );
}

#[test]
fn list_streams_sessions_without_an_index() {
    let world = TestWorld::new();
    seed_sessions(&world);

    world
        .cmd()
        .args(["list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("refactor the payment module"))
        .stdout(predicate::str::contains("tune the cache eviction"))
        .stdout(predicate::str::contains("claude -r claude-1"))
        .stdout(predicate::str::contains("codex --resume cx-9"));
}

#[test]
fn list_search_filters_sessions() {
    let world = TestWorld::new();
    seed_sessions(&world);

    world
        .cmd()
        .args(["list", "--search", "payment"])
        .assert()
        .success()
        .stdout(predicate::str::contains("refactor the payment module"))
        .stdout(predicate::str::contains("tune the cache eviction").not());
}

#[test]
fn list_search_matches_assistant_text() {
    let world = TestWorld::new();
    seed_sessions(&world);

    world
        .cmd()
        .args(["list", "--search", "invoice"])
        .assert()
        .success()
        .stdout(predicate::str::contains("refactor the payment module"));
}

#[test]
fn index_build_reports_counts_and_is_incremental() {
    let world = TestWorld::new();
    seed_sessions(&world);

    world
        .cmd()
        .args(["index", "build"])
        .assert()
        .success()
        .stdout(predicate::str::contains("scanned: 2"))
        .stdout(predicate::str::contains("indexed: 2"))
        .stdout(predicate::str::contains("removed: 0"));

    // unchanged filesystem: everything is skipped the second time
    world
        .cmd()
        .args(["index", "build"])
        .assert()
        .success()
        .stdout(predicate::str::contains("indexed: 0"))
        .stdout(predicate::str::contains("skipped: 2"));
}

#[test]
fn list_from_index_matches_streaming_results() {
    let world = TestWorld::new();
    seed_sessions(&world);

    world.cmd().args(["index", "build"]).assert().success();

    world
        .cmd()
        .args(["list", "--use-index", "--search", "eviction"])
        .assert()
        .success()
        .stdout(predicate::str::contains("tune the cache eviction"))
        .stdout(predicate::str::contains("refactor the payment module").not());
}

#[test]
fn list_from_missing_index_is_empty_not_an_error() {
    let world = TestWorld::new();
    seed_sessions(&world);

    world
        .cmd()
        .args(["list", "--use-index"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0 sessions"));
}

#[test]
fn tool_scope_restricts_results() {
    let world = TestWorld::new();
    seed_sessions(&world);

    world
        .cmd()
        .args(["list", "--tool", "codex"])
        .assert()
        .success()
        .stdout(predicate::str::contains("tune the cache eviction"))
        .stdout(predicate::str::contains("refactor the payment module").not());
}

#[test]
fn invalid_since_is_rejected_at_the_boundary() {
    let world = TestWorld::new();
    seed_sessions(&world);

    world
        .cmd()
        .args(["list", "--since", "not-a-date"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--since"));
}

#[test]
fn date_filter_selects_by_start_day() {
    let world = TestWorld::new();
    seed_sessions(&world);

    world
        .cmd()
        .args(["list", "--since", "2026-01-14"])
        .assert()
        .success()
        .stdout(predicate::str::contains("tune the cache eviction"))
        .stdout(predicate::str::contains("refactor the payment module").not());
}

#[test]
fn json_output_is_machine_readable() {
    let world = TestWorld::new();
    seed_sessions(&world);

    let output = world
        .cmd()
        .args(["list", "--json", "--search", "payment"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let parsed: serde_json::Value = serde_json::from_slice(&output).unwrap();
    let sessions = parsed.as_array().unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0]["tool"], "claude");
    assert_eq!(sessions[0]["session_id"], "claude-1");
    assert_eq!(sessions[0]["resume_command"], "claude -r claude-1");
    assert!(sessions[0]["first_message"]
        .as_str()
        .unwrap()
        .contains("payment"));
}

#[test]
fn removed_sessions_disappear_after_rebuild() {
    let world = TestWorld::new();
    seed_sessions(&world);
    world.cmd().args(["index", "build"]).assert().success();

    let doomed = world
        .temp
        .path()
        .join("codex/2026/01/14/rollout-abc.jsonl");
    fs::remove_file(&doomed).unwrap();

    world
        .cmd()
        .args(["index", "build"])
        .assert()
        .success()
        .stdout(predicate::str::contains("removed: 1"));

    world
        .cmd()
        .args(["list", "--use-index", "--search", "eviction"])
        .assert()
        .success()
        .stdout(predicate::str::contains("tune the cache eviction").not());
}

#[test]
fn detail_flag_shows_file_paths() {
    let world = TestWorld::new();
    seed_sessions(&world);

    world
        .cmd()
        .args(["list", "--detail", "--tool", "claude"])
        .assert()
        .success()
        .stdout(predicate::str::contains("claude-1.jsonl"));
}
