//! Integration tests for the liftlog binary.
//!
//! These tests verify end-to-end behavior including:
//! - Training and exercise management
//! - Simple/circuit linking and unlinking
//! - Session logging and history
//! - CSV export and stats

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Helper to create a test data directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Helper to get the CLI pointed at a throwaway data and config directory
fn cli(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("liftlog"));
    cmd.env("XDG_CONFIG_HOME", dir.join("config"))
        .env_remove("RUST_LOG")
        .arg("--data-dir")
        .arg(dir.join("data"));
    cmd
}

/// Run a command with `--json` and parse its output
fn run_json(dir: &Path, args: &[&str]) -> Value {
    let output = cli(dir)
        .args(args)
        .arg("--json")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    serde_json::from_slice(&output).expect("stdout is not JSON")
}

fn new_training(dir: &Path, name: &str) -> String {
    run_json(dir, &["training", "new", "--name", name])["id"].to_string()
}

/// Add a simple exercise, returning (link id, exercise id)
fn add_exercise(dir: &Path, training: &str, name: &str, schema: &str) -> (String, String) {
    let created = run_json(
        dir,
        &[
            "exercise", "add", "--training", training, "--name", name, "--schema", schema,
        ],
    );
    (
        created["link"]["id"].to_string(),
        created["exercise"]["id"].to_string(),
    )
}

fn show_full(dir: &Path, training: &str) -> Value {
    run_json(dir, &["training", "show", training, "--full"])
}

#[test]
fn test_cli_help() {
    Command::new(assert_cmd::cargo::cargo_bin!("liftlog"))
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Strength training log with simple and circuit exercises",
        ));
}

#[test]
fn test_first_write_creates_store() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();

    cli(dir)
        .args(["training", "new", "--name", "Push day"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created training 1 (Push day)"));

    assert!(dir.join("data/store.json").exists());
}

#[test]
fn test_training_show_lists_simple_exercises() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();

    let training = new_training(dir, "Push day");
    add_exercise(dir, &training, "Bench press", "3,10,60");
    add_exercise(dir, &training, "Dips", "2,12,60-1,8,90");

    let shown = run_json(dir, &["training", "show", &training]);
    let slots = shown["exercises"].as_array().unwrap();
    assert_eq!(slots.len(), 2);
    assert_eq!(slots[0]["type"], "simple");

    let bench = &slots[0]["exercises_list"][0];
    assert_eq!(bench["name"], "Bench press");
    assert_eq!(bench["set"], 3);
    assert_eq!(bench["reps"], 10);
    assert_eq!(bench["rest"], 60);

    let dips = &slots[1]["exercises_list"][0];
    assert_eq!(dips["set"], 2);
    assert_eq!(dips["reps"], "12, 8");
    assert_eq!(dips["rest"], "60, 90");
}

#[test]
fn test_muscle_target_comes_from_catalog() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();

    let training = new_training(dir, "Push day");
    let created = run_json(
        dir,
        &[
            "exercise", "add", "--training", &training, "--name", "Bench press", "--schema",
            "3,10,60",
        ],
    );
    assert_eq!(created["exercise"]["muscle_target"], "chest, triceps");

    let created = run_json(
        dir,
        &[
            "exercise", "add", "--training", &training, "--name", "Bench press", "--schema",
            "3,10,60", "--muscle", "chest",
        ],
    );
    assert_eq!(created["exercise"]["muscle_target"], "chest");
}

#[test]
fn test_link_builds_circuit() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();

    let training = new_training(dir, "Legs");
    let (link, squat) = add_exercise(dir, &training, "Squat", "3,10,90");

    let linked = run_json(
        dir,
        &[
            "exercise", "link", "--training", &training, "--first", &squat, "--name", "Lunge",
            "--schema", "3,12,60",
        ],
    );
    assert_eq!(linked["link"]["id"].to_string(), link);
    let lunge = linked["exercise"]["id"].to_string();
    assert_eq!(
        linked["link"]["member_ids"].as_str().unwrap(),
        format!("{},{}", squat, lunge)
    );

    let shown = show_full(dir, &training);
    let slots = shown["exercises"].as_array().unwrap();
    assert_eq!(slots.len(), 1);
    assert_eq!(slots[0]["type"], "circuit");

    let members = slots[0]["exercises_list"].as_array().unwrap();
    assert_eq!(members.len(), 2);
    assert_eq!(members[0]["name"], "Squat");
    assert_eq!(members[0]["rest"], 0);
    assert_eq!(members[0]["schema"][0]["rest"], 0);
    assert_eq!(members[1]["name"], "Lunge");
    assert_eq!(members[1]["rest"], 60);
}

#[test]
fn test_link_from_unknown_exercise_fails() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();

    let training = new_training(dir, "Legs");
    cli(dir)
        .args([
            "exercise", "link", "--training", &training, "--first", "999", "--name", "Lunge",
            "--schema", "3,12,60",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown member"));
}

#[test]
fn test_delete_from_circuit_demotes_to_simple() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();

    let training = new_training(dir, "Legs");
    let (_, squat) = add_exercise(dir, &training, "Squat", "3,10,90");
    let linked = run_json(
        dir,
        &[
            "exercise", "link", "--training", &training, "--first", &squat, "--name", "Lunge",
            "--schema", "3,12,60",
        ],
    );
    let lunge = linked["exercise"]["id"].to_string();

    cli(dir)
        .args(["exercise", "delete", "--training", &training, &lunge])
        .assert()
        .success();

    let shown = show_full(dir, &training);
    let slot = &shown["exercises"][0];
    assert_eq!(slot["type"], "simple");
    assert_eq!(slot["exercises_list"]["name"], "Squat");
    assert_eq!(slot["exercises_list"]["type"], "simple");

    cli(dir)
        .args(["exercise", "show", &lunge])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_delete_last_exercise_removes_link() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();

    let training = new_training(dir, "Arms");
    let (_, curl) = add_exercise(dir, &training, "Curl", "3,12,45");
    let (keep_link, _) = add_exercise(dir, &training, "Pushdown", "3,12,45");

    let deleted = run_json(dir, &["exercise", "delete", "--training", &training, &curl]);
    assert!(deleted.is_null());

    let shown = run_json(dir, &["training", "show", &training]);
    assert_eq!(shown["link_ids"].as_str().unwrap(), keep_link);
    assert_eq!(shown["exercises"].as_array().unwrap().len(), 1);
}

#[test]
fn test_log_session_shows_in_history() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();

    let training = new_training(dir, "Legs");
    let (_, squat) = add_exercise(dir, &training, "Squat", "2,5,180");

    cli(dir)
        .args([
            "log", &squat, "--date", "2024-01-01", "--set", "1,5,100,180", "--set",
            "2,5,102.5,180",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged 2 sets of Squat on 2024-01-01"));

    let shown = run_json(dir, &["exercise", "show", &squat]);
    assert_eq!(shown["finished"], true);
    let history = shown["performances"].as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["date"], "2024-01-01");
    assert_eq!(history[0]["stats"][1]["weight"], 102.5);
    assert_eq!(history[0]["stats"][1]["set"], 2);
}

#[test]
fn test_log_without_date_uses_today() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();

    let training = new_training(dir, "Legs");
    let (_, squat) = add_exercise(dir, &training, "Squat", "1,5,180");

    let logged = run_json(dir, &["log", &squat, "--set", "1,5,100,180"]);
    let date = logged["date"].as_str().unwrap();
    assert_eq!(date.len(), 10);
    assert_eq!(date.matches('-').count(), 2);
}

#[test]
fn test_log_rejects_malformed_set() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();

    let training = new_training(dir, "Legs");
    let (_, squat) = add_exercise(dir, &training, "Squat", "1,5,180");

    cli(dir)
        .args(["log", &squat, "--set", "1,5,100"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected 4"));

    let shown = run_json(dir, &["exercise", "show", &squat]);
    assert!(shown["performances"].as_array().unwrap().is_empty());
}

#[test]
fn test_add_rejects_malformed_schema() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();

    let training = new_training(dir, "Legs");
    cli(dir)
        .args([
            "exercise", "add", "--training", &training, "--name", "Squat", "--schema", "3,10",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Malformed schema"));
}

#[test]
fn test_edit_keeps_unspecified_fields() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();

    let training = new_training(dir, "Legs");
    let (_, squat) = add_exercise(dir, &training, "Squat", "3,10,90");

    let edited = run_json(dir, &["exercise", "edit", &squat, "--schema", "5,5,180"]);
    assert_eq!(edited["name"], "Squat");
    assert_eq!(edited["schema"], "5,5,180");
    assert_eq!(edited["muscle_target"], "quadriceps, glutes");
}

#[test]
fn test_next_walks_training_and_finishes_it() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();

    let training = new_training(dir, "Full body");
    let (first, _) = add_exercise(dir, &training, "Squat", "3,5,180");
    let (second, _) = add_exercise(dir, &training, "Bench press", "3,5,180");

    let step = run_json(dir, &["next", "--training", &training, &first]);
    assert_eq!(step["next"]["id"].to_string(), second);

    let step = run_json(dir, &["next", "--training", &training, &second]);
    assert!(step["next"].is_null());

    let shown = run_json(dir, &["training", "show", &training]);
    assert_eq!(shown["finished"], true);

    cli(dir)
        .args(["next", "--training", &training, "999"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid transition"));
}

#[test]
fn test_export_writes_csv() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();

    let training = new_training(dir, "Legs");
    let (_, squat) = add_exercise(dir, &training, "Squat", "2,5,180");
    cli(dir)
        .args([
            "log", &squat, "--date", "2024-03-01", "--set", "1,5,100,180", "--set",
            "2,5,100,180",
        ])
        .assert()
        .success();

    let csv_path = dir.join("legs.csv");
    cli(dir)
        .args(["export", "--training", &training, "--out"])
        .arg(&csv_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 2 sets"));

    let csv_content = fs::read_to_string(&csv_path).expect("Failed to read CSV");
    let lines: Vec<_> = csv_content.lines().collect();
    assert_eq!(lines[0], "exercise_id,exercise,date,set,reps,weight,rest");
    assert_eq!(lines.len(), 3);
    assert!(lines[1].contains("Squat,2024-03-01,1,5,100"));
}

#[test]
fn test_export_to_stdout() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();

    let training = new_training(dir, "Legs");
    cli(dir)
        .args(["export", "--training", &training])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("exercise_id,exercise,date"));
}

#[test]
fn test_stats_by_muscle() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();

    let training = new_training(dir, "Push day");
    add_exercise(dir, &training, "Bench press", "3,10,60");
    add_exercise(dir, &training, "Overhead press", "3,8,90");

    let muscles = run_json(dir, &["stats"]);
    assert_eq!(
        muscles,
        serde_json::json!(["Chest", "Triceps", "Shoulders"])
    );

    let triceps = run_json(dir, &["stats", "triceps"]);
    assert_eq!(triceps.as_array().unwrap().len(), 2);
}

#[test]
fn test_catalog_lists_builtin_exercises() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();

    cli(dir)
        .arg("catalog")
        .assert()
        .success()
        .stdout(predicate::str::contains("Deadlift"));
}

#[test]
fn test_program_tracks_its_trainings() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();

    let program = run_json(dir, &["program", "new", "--name", "5x5", "--weeks", "12"]);
    let program_id = program["id"].to_string();
    assert_eq!(program["duration"], 12);

    let training = run_json(
        dir,
        &["training", "new", "--name", "Day A", "--program", &program_id],
    );
    assert_eq!(training["program_id"].to_string(), program_id);

    cli(dir)
        .args(["training", "new", "--name", "Day B", "--program", "999"])
        .assert()
        .failure();
}

#[test]
fn test_delete_training_removes_everything() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();

    let training = new_training(dir, "Legs");
    let (_, squat) = add_exercise(dir, &training, "Squat", "3,10,90");

    cli(dir)
        .args(["training", "delete", &training])
        .assert()
        .success();

    cli(dir)
        .args(["training", "show", &training])
        .assert()
        .failure();
    cli(dir)
        .args(["exercise", "show", &squat])
        .assert()
        .failure();

    let trainings = run_json(dir, &["training", "list"]);
    assert!(trainings.as_array().unwrap().is_empty());
}

#[test]
fn test_program_list_show_delete() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();

    let program_id = run_json(dir, &["program", "new", "--name", "5x5"])["id"].to_string();
    let day_a = run_json(
        dir,
        &["training", "new", "--name", "Day A", "--program", &program_id],
    )["id"]
        .to_string();
    run_json(
        dir,
        &["training", "new", "--name", "Day B", "--program", &program_id],
    );
    add_exercise(dir, &day_a, "Squat", "5,5,180");
    let loose = new_training(dir, "Mobility");

    let programs = run_json(dir, &["program", "list"]);
    assert_eq!(programs.as_array().unwrap().len(), 1);
    assert_eq!(programs[0]["name"], "5x5");

    let detail = run_json(dir, &["program", "show", &program_id]);
    assert_eq!(detail["name"], "5x5");
    let names: Vec<_> = detail["trainings"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Day A", "Day B"]);

    cli(dir)
        .args(["program", "show", &program_id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Day B"));

    cli(dir)
        .args(["program", "delete", &program_id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted program"));

    cli(dir)
        .args(["program", "show", &program_id])
        .assert()
        .failure();
    assert!(run_json(dir, &["program", "list"]).as_array().unwrap().is_empty());

    let trainings = run_json(dir, &["training", "list"]);
    let trainings = trainings.as_array().unwrap();
    assert_eq!(trainings.len(), 1);
    assert_eq!(trainings[0]["id"].to_string(), loose);
}
