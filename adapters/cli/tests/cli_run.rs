use std::{
    fs,
    path::Path,
    process::{Command, Output},
};

use tempfile::TempDir;

fn alien_invasion(args: &[&str]) -> Output {
    alien_invasion_logging(args, "warn")
}

fn alien_invasion_logging(args: &[&str], filter: &str) -> Output {
    Command::new(env!("CARGO_BIN_EXE_alien-invasion"))
        .args(args)
        .env("RUST_LOG", filter)
        .output()
        .expect("failed to invoke alien-invasion binary")
}

/// Log output with terminal colour sequences removed.
fn plain_stderr(output: &Output) -> String {
    let raw = String::from_utf8_lossy(&output.stderr);
    let mut plain = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c == '\u{1b}' {
            for code in chars.by_ref() {
                if code.is_ascii_alphabetic() {
                    break;
                }
            }
        } else {
            plain.push(c);
        }
    }
    plain
}

fn write_map(dir: &TempDir, contents: &str) -> String {
    let path = dir.path().join("map.txt");
    fs::write(&path, contents).expect("write map file");
    path_arg(&path)
}

fn path_arg(path: &Path) -> String {
    path.to_str().expect("utf-8 temp path").to_owned()
}

#[test]
fn two_city_world_is_reported_destroyed() {
    let dir = TempDir::new().expect("temp dir");
    let map = write_map(&dir, "Foo north=Bar\nBar south=Foo\n");

    let output = alien_invasion(&["run", &map, "4", "--seed", "3"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "run failed: {output:?}");
    assert!(stdout.contains("has been destroyed due to an alien conflict between Alien#"));
    assert!(stdout.contains("totally destroyed"));
}

#[test]
fn surviving_cities_are_printed_as_a_map() {
    let dir = TempDir::new().expect("temp dir");
    let map = write_map(&dir, "Foo north=Bar west=Jamaica south=Peru\n");

    let output = alien_invasion(&["run", &map, "2", "--seed", "11"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "run failed: {output:?}");
    assert!(stdout.contains("Some cities survived"));
    assert!(stdout.contains("Foo north=Bar south=Peru west=Jamaica"));
}

#[test]
fn config_file_supplies_seed_and_move_limit() {
    let dir = TempDir::new().expect("temp dir");
    let map = write_map(&dir, "Foo north=Bar\nBar south=Foo\n");
    let config = dir.path().join("invasion.toml");
    fs::write(&config, "seed = 5\nmove_limit = 3\n").expect("write config");

    let output = alien_invasion_logging(
        &["run", &map, "1", "--config", &path_arg(&config)],
        "info",
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = plain_stderr(&output);

    assert!(output.status.success(), "run failed: {output:?}");
    assert!(stdout.contains("Some cities survived"));
    // A lone alien on a loop moves every round, so only the limit ends the run.
    assert!(stderr.contains("seed=5"), "{stderr}");
    assert!(stderr.contains("move_limit=3"), "{stderr}");
    assert!(stderr.contains("rounds=3"), "{stderr}");
}

#[test]
fn move_limit_flag_overrides_config_file() {
    let dir = TempDir::new().expect("temp dir");
    let map = write_map(&dir, "Foo north=Bar\nBar south=Foo\n");
    let config = dir.path().join("invasion.toml");
    fs::write(&config, "seed = 5\nmove_limit = 3\n").expect("write config");

    let output = alien_invasion_logging(
        &[
            "run",
            &map,
            "1",
            "--config",
            &path_arg(&config),
            "--move-limit",
            "7",
        ],
        "info",
    );
    let stderr = plain_stderr(&output);

    assert!(output.status.success(), "run failed: {output:?}");
    assert!(stderr.contains("rounds=7"), "{stderr}");
}

#[test]
fn zero_aliens_are_refused() {
    let dir = TempDir::new().expect("temp dir");
    let map = write_map(&dir, "Foo north=Bar\n");

    let output = alien_invasion(&["run", &map, "0"]);
    assert!(!output.status.success());
}

#[test]
fn missing_map_file_fails() {
    let dir = TempDir::new().expect("temp dir");
    let missing = path_arg(&dir.path().join("absent.txt"));

    let output = alien_invasion(&["run", &missing, "3"]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("failed to open map file"));
}

#[test]
fn generated_map_feeds_a_run() {
    let generated = alien_invasion(&["generate", "30", "--seed", "8"]);
    assert!(generated.status.success(), "generate failed: {generated:?}");
    let text = String::from_utf8(generated.stdout).expect("utf-8 map");
    assert!(text.lines().count() >= 30);

    let dir = TempDir::new().expect("temp dir");
    let map = write_map(&dir, &text);
    let output = alien_invasion(&["run", &map, "10", "--seed", "1", "--move-limit", "50"]);
    assert!(output.status.success(), "run failed: {output:?}");
}
