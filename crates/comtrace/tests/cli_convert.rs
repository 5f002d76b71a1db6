#![cfg(feature = "cli")]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn unique_temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "comtrace-cli-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

fn block(time: &str, first: &str, marker: &str, second: &str, bytes: &[u8]) -> String {
    let mut text = format!(
        "{time} {first}{marker}{second}: MSG_LINE_DATA {{[{}]:",
        bytes.len()
    );
    for row in bytes.chunks(16) {
        let hex = row
            .iter()
            .map(|b| format!("{b:02X}"))
            .collect::<Vec<_>>()
            .join(" ");
        text.push_str(&format!("\n  {hex:<47}{:<22}", "."));
    }
    text.push_str("\n}\n");
    text
}

fn comtrace(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_comtrace"))
        .args(args)
        .env_remove("COMTRACE_LOG")
        .output()
        .expect("comtrace should run")
}

fn pattern(dir: &Path) -> String {
    format!("{}/*.log", dir.display())
}

#[test]
fn frames_mode_writes_sorted_csv() {
    let dir = unique_temp_dir("frames");
    let mut text = block(
        "2016/05/01 10:00:00.000",
        "A",
        "-(trace)->",
        "B",
        &[0xFF, 0x02, 0x06, 0x03],
    );
    text.push_str(&block(
        "2016/05/01 10:00:00.500",
        "A",
        "-(trace)->",
        "B",
        &[0xFF, 0x02, 0x01, 0x00, 0xAA, 0xBB, 0x03],
    ));
    std::fs::write(dir.join("trace.log"), text).unwrap();
    let out_path = dir.join("out.csv");

    let output = comtrace(&[
        &pattern(&dir),
        out_path.to_str().unwrap(),
        "--format",
        "json",
    ]);
    assert_eq!(output.status.code(), Some(0), "{output:?}");

    let csv = std::fs::read_to_string(&out_path).unwrap();
    assert_eq!(
        csv,
        "start_time,end_time,source,dest,raw\r\n\
         2016-05-01 10:00:00.000000,2016-05-01 10:00:00.000000,A,B,FF 02 06 03\r\n\
         2016-05-01 10:00:00.500000,2016-05-01 10:00:00.500000,A,B,FF 02 01 00 AA BB 03\r\n"
    );

    let summary: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("summary should be json");
    assert_eq!(summary["mode"], "frames");
    assert_eq!(summary["files"], 1);
    assert_eq!(summary["records"], 2);
    assert_eq!(summary["links"][0]["frames"], 2);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn no_matching_files_prints_usage_and_writes_nothing() {
    let dir = unique_temp_dir("no-match");
    let out_path = dir.join("out.csv");

    let output = comtrace(&[&pattern(&dir), out_path.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(64));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "USAGE: comtrace <logfile(s)> <outfile>"
    );
    assert!(!out_path.exists());

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn wrong_argument_count_prints_usage() {
    let output = comtrace(&["only-one-arg"]);
    assert_eq!(output.status.code(), Some(64));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "USAGE: comtrace <logfile(s)> <outfile>"
    );
}

#[test]
fn bad_tolerance_is_reported_on_stderr() {
    let dir = unique_temp_dir("bad-tolerance");
    let out_path = dir.join("out.csv");

    let output = comtrace(&[
        &pattern(&dir),
        out_path.to_str().unwrap(),
        "--tolerance",
        "soon",
    ]);
    assert_eq!(output.status.code(), Some(64));
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid duration value: soon"));
    assert!(!out_path.exists());

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn malformed_file_is_reported_and_others_still_written() {
    let dir = unique_temp_dir("malformed");
    std::fs::write(
        dir.join("a.log"),
        block("2016/05/01 10:00:00.000", "A", "-(trace)->", "B", &[0xFF, 0x06]),
    )
    .unwrap();
    std::fs::write(
        dir.join("b.log"),
        block("2016/05/01 10:00:01.000", "A", "-(trace)-", "B", &[0xFF, 0x15]),
    )
    .unwrap();
    let out_path = dir.join("out.csv");

    let output = comtrace(&[
        &pattern(&dir),
        out_path.to_str().unwrap(),
        "--format",
        "json",
        "--no-header",
    ]);
    assert_eq!(output.status.code(), Some(60), "{output:?}");

    let csv = std::fs::read_to_string(&out_path).unwrap();
    assert_eq!(
        csv,
        "2016-05-01 10:00:00.000000,2016-05-01 10:00:00.000000,A,B,FF 06\r\n"
    );

    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["aborted"].as_array().map(Vec::len), Some(1));
    assert!(summary["aborted"][0]["path"]
        .as_str()
        .is_some_and(|path| path.ends_with("b.log")));
    assert!(String::from_utf8_lossy(&output.stderr).contains("capture aborted"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn traffic_mode_merges_bursts() {
    let dir = unique_temp_dir("traffic");
    let mut text = block("2016/05/01 10:00:00.000", "A", "-(trace)->", "B", &[0xFF, 0x02]);
    text.push_str(&block(
        "2016/05/01 10:00:00.200",
        "A",
        "-(trace)->",
        "B",
        &[0x06, 0x03],
    ));
    text.push_str(&block(
        "2016/05/01 10:00:00.300",
        "B",
        "-(trace)->",
        "A",
        &[0xFF, 0x06],
    ));
    std::fs::write(dir.join("trace.log"), text).unwrap();
    let out_path = dir.join("traffic.csv");

    let output = comtrace(&[
        &pattern(&dir),
        out_path.to_str().unwrap(),
        "--mode",
        "traffic",
        "--tolerance",
        "500ms",
        "--format",
        "json",
    ]);
    assert_eq!(output.status.code(), Some(0), "{output:?}");

    let csv = std::fs::read_to_string(&out_path).unwrap();
    assert_eq!(
        csv,
        "time,source,dest,length,raw\r\n\
         2016-05-01 10:00:00.000000,A,B,4,FF 02 06 03\r\n\
         2016-05-01 10:00:00.300000,B,A,2,FF 06\r\n"
    );

    let _ = std::fs::remove_dir_all(&dir);
}
