use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_studentd");
    let mut child = Command::new(exe)
        .env_remove("STUDENTD_WORKSPACE")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn studentd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response for {}", method);
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

#[test]
fn router_dispatch_smoke_covers_handler_families() {
    let workspace = temp_dir("studentd-router-smoke");
    let restored = temp_dir("studentd-router-smoke-restored");
    let bundle_out = workspace.join("smoke-backup.studentd.zip");

    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let calls = [
        ("1", "health", json!({})),
        ("2", "workspace.select", json!({ "path": workspace.to_string_lossy() })),
        ("3", "form.set", json!({ "name": "Smoke", "regNumber": "S1" })),
        ("4", "form.get", json!({})),
        (
            "5",
            "students.add",
            json!({ "mathMarks": "86", "javaMarks": "86", "phpMarks": "86" }),
        ),
        ("6", "students.list", json!({})),
        (
            "7",
            "backup.exportWorkspace",
            json!({ "outPath": bundle_out.to_string_lossy() }),
        ),
        (
            "8",
            "backup.importWorkspace",
            json!({
                "inPath": bundle_out.to_string_lossy(),
                "workspacePath": restored.to_string_lossy()
            }),
        ),
        ("9", "students.list", json!({})),
    ];

    let mut responses = Vec::new();
    for (id, method, params) in calls {
        let value = request(&mut stdin, &mut reader, id, method, params);
        assert_eq!(
            value.get("ok").and_then(|v| v.as_bool()),
            Some(true),
            "{} failed: {}",
            method,
            value
        );
        responses.push(value);
    }

    let imported = &responses[7]["result"];
    assert_eq!(imported["bundleFormatDetected"], "studentd-workspace-v1");
    assert_eq!(imported["rowCount"], 1);
    assert_eq!(
        imported["workspacePath"].as_str(),
        Some(restored.to_string_lossy().as_ref())
    );

    let rows = responses[8]["result"]["rows"]
        .as_array()
        .cloned()
        .unwrap_or_default();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["regNumber"], "S1");
    assert_eq!(rows[0]["highlighted"], true);

    let exit = request(&mut stdin, &mut reader, "10", "app.exit", json!({}));
    assert_eq!(exit["ok"], true);
    let status = child.wait().expect("wait for exit");
    assert!(status.success());

    let _ = std::fs::remove_dir_all(workspace);
    let _ = std::fs::remove_dir_all(restored);
}
