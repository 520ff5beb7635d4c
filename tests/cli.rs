use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// A fresh per-process scratch directory for one test.
fn scratch(test: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("sedbot-{test}-{}", std::process::id()));
    if dir.exists() {
        fs::remove_dir_all(&dir).unwrap();
    }
    fs::create_dir_all(&dir).unwrap();
    dir
}

/// Write `contents` to `name` inside `dir` and return the full path.
fn put(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn sedbot_replays_transcript_file() {
    let dir = scratch("transcript");
    let file = put(
        &dir,
        "chat.log",
        "<Rockj> o_O\n\
         <Rockj> Du er en superhelt\n\
         <fictive> s/superhelt/idiot/\n\
         <Rockj> s/superhelt/idiot/\n\
         <Rockj> s/o_O/:-)/\n",
    );

    let bin = env!("CARGO_BIN_EXE_sedbot");
    let out = Command::new(bin).arg(&file).output().unwrap();
    assert!(out.status.success());

    let stdout = String::from_utf8(out.stdout).unwrap();
    assert_eq!(stdout, "<Rockj> Du er en idiot\n<Rockj> :-)\n");
}

#[test]
fn sedbot_reads_stdin_and_skips_unprefixed_lines() {
    let bin = env!("CARGO_BIN_EXE_sedbot");
    let mut child = Command::new(bin)
        .arg("-")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    {
        let stdin = child.stdin.as_mut().unwrap();
        stdin
            .write_all(b"* melwil waves\r\n<melwil> her er en enkel to test\r\n\r\n<melwil> s/en/'$1'/v\r\n<melwil> s/(en)/'$1'/\r\n")
            .unwrap();
    }

    let out = child.wait_with_output().unwrap();
    assert!(out.status.success());

    let stdout = String::from_utf8(out.stdout).unwrap();
    assert_eq!(
        stdout,
        "No group 1. Define the matching group.\n<melwil> her er 'en' enkel to test\n"
    );
}

#[test]
fn sedbot_honors_config_file() {
    let dir = scratch("config");
    let config = put(&dir, "sedbot.toml", "history_capacity = 1\n");
    let file = put(
        &dir,
        "chat.log",
        "<melwil> first message\n<melwil> second message\n<melwil> s/first/1st/v\n",
    );

    let bin = env!("CARGO_BIN_EXE_sedbot");
    let out = Command::new(bin)
        .arg("--config")
        .arg(&config)
        .arg(&file)
        .output()
        .unwrap();
    assert!(out.status.success());

    // With one retained message the command only sees itself.
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert_eq!(stdout, "Found no match to your search.\n");
}

#[test]
fn sedbot_rejects_invalid_config() {
    let dir = scratch("bad_config");
    let config = put(&dir, "sedbot.toml", "max_output_length = 0\n");

    let bin = env!("CARGO_BIN_EXE_sedbot");
    let out = Command::new(bin)
        .arg("--config")
        .arg(&config)
        .arg(dir.join("missing.log"))
        .output()
        .unwrap();
    assert!(!out.status.success());
    let stderr = String::from_utf8(out.stderr).unwrap();
    assert!(stderr.contains("max_output_length"));
}

#[test]
fn sedbot_fails_on_missing_transcript() {
    let dir = scratch("missing");
    let bin = env!("CARGO_BIN_EXE_sedbot");
    let out = Command::new(bin).arg(dir.join("nope.log")).output().unwrap();
    assert!(!out.status.success());
}

#[test]
fn sedbot_troll_needs_meta_rewrite() {
    let dir = scratch("troll");
    let log = "<KinkyPinkie> Rockj: det funker ikke\n<Rockj> troll/funker ikke/fungerer/\n";
    let file = put(&dir, "chat.log", log);
    let config = put(&dir, "sedbot.toml", "[meta_rewrite]\nenabled = true\n");
    let bin = env!("CARGO_BIN_EXE_sedbot");

    let out = Command::new(bin).arg(&file).output().unwrap();
    assert!(out.status.success());
    assert_eq!(String::from_utf8(out.stdout).unwrap(), "");

    let out = Command::new(bin).arg("--config").arg(&config).arg(&file).output().unwrap();
    assert!(out.status.success());
    assert_eq!(
        String::from_utf8(out.stdout).unwrap(),
        "<KinkyPinkie> Rockj: det fungerer\n"
    );
}
