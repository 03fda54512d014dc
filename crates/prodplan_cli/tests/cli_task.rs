use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_path(file_name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("prodplan-{nanos}-{file_name}"))
}

fn write_store(path: &Path) {
    let content = serde_json::json!({
        "schema_version": 2,
        "projects": [{ "id": "p-1", "name": "Kitchen Jansen" }],
        "phases": [
            {
                "id": "ph-cut",
                "project_id": "p-1",
                "name": "Cutting",
                "start_date": "2024-06-01",
                "end_date": "2024-06-30",
                "progress": 100
            },
            {
                "id": "ph-edge",
                "project_id": "p-1",
                "name": "Edgebanding",
                "start_date": "2024-06-01",
                "end_date": "2024-06-30",
                "progress": 40
            }
        ],
        "limit_phases": [
            { "id": "lim-1", "standard_task_id": "std-assembly", "phase_name": "Edgebanding" }
        ],
        "tasks": [
            {
                "id": "t-assembly",
                "title": "Assemble carcasses",
                "phase_id": "ph-cut",
                "standard_task_id": "std-assembly",
                "workstation": "Assembly",
                "status": "in_progress",
                "priority": "medium"
            },
            {
                "id": "t-saw-low",
                "title": "Cut plinths",
                "phase_id": "ph-cut",
                "workstation": "Saw",
                "status": "todo",
                "priority": "low"
            },
            {
                "id": "t-saw-urgent",
                "title": "Cut worktop",
                "phase_id": "ph-cut",
                "workstation": "saw",
                "status": "in_progress",
                "priority": "urgent"
            },
            {
                "id": "t-saw-done",
                "title": "Cut doors",
                "phase_id": "ph-cut",
                "workstation": "Saw",
                "status": "completed",
                "priority": "high"
            }
        ],
        "employees": [
            { "id": "emp-1", "name": "Ines", "role": "operator" }
        ],
        "workstations": [
            { "id": "ws-saw", "name": "Saw" },
            { "id": "ws-assembly", "name": "Assembly" }
        ],
        "employee_workstations": [
            { "employee_id": "emp-1", "workstation_id": "ws-saw" }
        ]
    });
    std::fs::write(path, serde_json::to_string_pretty(&content).unwrap()).unwrap();
}

fn run(store_path: &Path, args: &[&str]) -> Output {
    let exe = env!("CARGO_BIN_EXE_prodplan_cli");
    Command::new(exe)
        .args(args)
        .env("PRODPLAN_STORE_PATH", store_path)
        .env("PRODPLAN_CONFIG_PATH", temp_path("missing-config.json"))
        .output()
        .expect("failed to run prodplan_cli")
}

fn stored_task(store_path: &Path, id: &str) -> serde_json::Value {
    let stored: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(store_path).unwrap()).unwrap();
    stored["tasks"]
        .as_array()
        .unwrap()
        .iter()
        .find(|task| task["id"] == id)
        .cloned()
        .expect("task present")
}

#[test]
fn todo_with_incomplete_limit_phase_is_held() {
    let store_path = temp_path("cli-task-hold.json");
    write_store(&store_path);

    let output = run(&store_path, &["task", "status", "t-assembly", "todo"]);
    let task = stored_task(&store_path, "t-assembly");
    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("held"));
    assert_eq!(task["status"], "hold");
    assert!(task["status_changed_at"].is_string());
}

#[test]
fn completing_requires_acting_employee() {
    let store_path = temp_path("cli-task-complete-missing.json");
    write_store(&store_path);

    let output = run(&store_path, &["task", "status", "t-saw-low", "completed"]);
    let task = stored_task(&store_path, "t-saw-low");
    std::fs::remove_file(&store_path).ok();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: validation_error"));
    assert_eq!(task["status"], "todo");
}

#[test]
fn completing_records_completion_fields() {
    let store_path = temp_path("cli-task-complete.json");
    write_store(&store_path);

    let output = run(
        &store_path,
        &["task", "status", "t-saw-low", "done", "--by", "emp-1", "--json"],
    );
    let task = stored_task(&store_path, "t-saw-low");
    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    let payload: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(payload["downgraded"], false);
    assert_eq!(payload["task"]["status"], "completed");
    assert_eq!(task["status"], "completed");
    assert_eq!(task["completed_by"], "emp-1");
    assert_eq!(task["completed_at"], task["status_changed_at"]);
}

#[test]
fn hold_cannot_be_requested_directly() {
    let store_path = temp_path("cli-task-hold-request.json");
    write_store(&store_path);

    let output = run(&store_path, &["task", "status", "t-saw-low", "hold"]);
    std::fs::remove_file(&store_path).ok();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: validation_error"));
}

#[test]
fn mine_lists_open_tasks_by_priority() {
    let store_path = temp_path("cli-task-mine.json");
    write_store(&store_path);

    let output = run(&store_path, &["task", "mine", "emp-1", "--json"]);
    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    let tasks: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let ids: Vec<&str> = tasks
        .as_array()
        .unwrap()
        .iter()
        .map(|task| task["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["t-saw-urgent", "t-saw-low"]);
}

#[test]
fn unknown_task_is_not_found() {
    let store_path = temp_path("cli-task-missing.json");
    write_store(&store_path);

    let output = run(&store_path, &["task", "show", "t-nope"]);
    std::fs::remove_file(&store_path).ok();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: not_found"));
}

#[test]
fn deps_reports_blocking_phases() {
    let store_path = temp_path("cli-deps.json");
    write_store(&store_path);

    let output = run(&store_path, &["deps", "std-assembly", "p-1", "--json"]);
    let free = run(&store_path, &["deps", "std-other", "p-1"]);
    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    let payload: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(payload["satisfied"], false);
    assert_eq!(payload["blocking"], serde_json::json!(["Edgebanding"]));

    assert!(free.status.success());
    assert!(String::from_utf8_lossy(&free.stdout).contains("satisfied"));
}

#[test]
fn workstations_lists_linked_stations() {
    let store_path = temp_path("cli-workstations.json");
    write_store(&store_path);

    let output = run(&store_path, &["workstations", "emp-1", "--json"]);
    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    let stations: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(stations, serde_json::json!([{ "id": "ws-saw", "name": "Saw" }]));
}

#[test]
fn consecutive_status_changes_keep_the_store_readable() {
    let store_path = temp_path("cli-task-twice.json");
    write_store(&store_path);

    let started = run(&store_path, &["task", "status", "t-saw-low", "in_progress"]);
    let finished = run(
        &store_path,
        &["task", "status", "t-saw-low", "completed", "--by", "emp-1"],
    );
    let pool = run(&store_path, &["team", "unassigned", "--json"]);
    let task = stored_task(&store_path, "t-saw-low");
    std::fs::remove_file(&store_path).ok();

    assert!(started.status.success());
    assert!(
        finished.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&finished.stderr)
    );
    assert!(pool.status.success());
    assert_eq!(task["status"], "completed");
    assert_eq!(task["completed_by"], "emp-1");
}
