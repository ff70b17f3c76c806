use std::path::PathBuf;
use std::process::{Command, Output};

fn rollout(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_rollout"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("failed to launch rollout")
}

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data").join(name)
}

#[test]
fn scripted_rollout_reports_successes() {
    let out = rollout(&["--task", "button-press", "--episodes", "2", "--seed", "3"]);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("task=button-press"), "{stdout}");
    assert!(stdout.contains("episodes=2"), "{stdout}");
    assert!(stdout.contains("success_rate=1.000"), "{stdout}");
}

#[test]
fn random_policy_runs_every_task() {
    for task in ["button-press", "coffee-button", "peg-unplug-side"] {
        let out = rollout(&["--task", task, "--episodes", "1", "--policy", "random", "--random-init", "true"]);
        assert!(out.status.success(), "{task}: {}", String::from_utf8_lossy(&out.stderr));
        assert!(String::from_utf8_lossy(&out.stdout).contains(&format!("task={task}")));
    }
}

#[test]
fn config_file_overrides_the_task() {
    let config = fixture("short_button_press.json");
    let out = rollout(&["--config", config.to_str().unwrap(), "--episodes", "1", "--log-every", "10"]);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert!(String::from_utf8_lossy(&out.stdout).contains("episodes=1"));
}

#[test]
fn unknown_task_fails() {
    let out = rollout(&["--task", "window-open"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("unknown task"));
}

#[test]
fn missing_config_file_fails() {
    let out = rollout(&["--config", "/nonexistent/task.json"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("reading"));
}
