use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

const LEAPSEC_DAT: &str = "\
leapsec.dat excerpt
 2015 JUL  1 =JD 2457204.5  TAI-UTC=  36.0       S + (MJD - 41317.) X 0.0      S
 2017 JAN  1 =JD 2457754.5  TAI-UTC=  37.0       S + (MJD - 41317.) X 0.0      S
";

/// An `almanac` command isolated from the user's config and environment.
fn almanac(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("almanac").unwrap();
    cmd.env("HOME", home)
        .env_remove("XDG_CONFIG_HOME")
        .env_remove("TZ")
        .env_remove("RUST_LOG")
        .args(["--timezone", "Europe/Stockholm"]);
    cmd
}

fn stdout_json(cmd: &mut Command) -> Value {
    let output = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).unwrap()
}

#[test]
fn holidays_across_new_year() {
    let home = TempDir::new().unwrap();
    let json = stdout_json(
        almanac(home.path()).args(["--now", "2024-12-28T08:00:00Z", "holidays"]),
    );
    let first = &json[0];
    assert_eq!(first["label"], "Nyårsdagen");
    assert_eq!(first["date"], "2025-01-01");
    assert_eq!(first["days_until"], 4);
}

#[test]
fn window_flag_limits_results() {
    let home = TempDir::new().unwrap();
    let json = stdout_json(almanac(home.path()).args([
        "--now",
        "2024-12-28T08:00:00Z",
        "holidays",
        "--days",
        "5",
    ]));
    assert_eq!(json.as_array().unwrap().len(), 1);
}

#[test]
fn personal_events_from_config() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("almanac.toml");
    fs::write(
        &config,
        "[[event]]\nlabel = \"Release\"\ndate = \"2025-01-02\"\n\n[[event]]\nlabel = \"Birthday\"\ndate = \"06-01\"\n",
    )
    .unwrap();

    let json = stdout_json(almanac(home.path()).args([
        "--config",
        config.to_str().unwrap(),
        "--now",
        "2024-12-28T08:00:00Z",
        "events",
    ]));
    let labels: Vec<_> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["label"].as_str().unwrap().to_string())
        .collect();
    assert!(labels.contains(&"Release".to_string()), "{labels:?}");
    assert!(!labels.contains(&"Birthday".to_string()));
}

#[test]
fn default_config_is_read_from_home() {
    let home = TempDir::new().unwrap();
    let dir = home.path().join(".config").join("almanac");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("almanac.toml"), "window_days = 0\n").unwrap();

    almanac(home.path())
        .args(["--now", "2024-12-28T08:00:00Z", "holidays"])
        .assert()
        .success()
        .stdout(predicate::str::diff("[]\n"));
}

#[test]
fn summer_time_after_spring_forward() {
    let home = TempDir::new().unwrap();
    let json = stdout_json(
        almanac(home.path()).args(["--now", "2024-03-31T10:00:00Z", "summer-time"]),
    );
    assert_eq!(json["in_effect"], true);
    assert_eq!(json["date"], "2024-03-31");

    let json = stdout_json(almanac(home.path()).args([
        "--now",
        "2024-03-31T10:00:00Z",
        "summer-time",
        "--day-offset",
        "-1",
    ]));
    assert_eq!(json["in_effect"], false);
}

#[test]
fn summer_time_rejects_bad_time() {
    let home = TempDir::new().unwrap();
    almanac(home.path())
        .args(["summer-time", "--time", "25:61"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid time of day"));
}

#[test]
fn out_of_range_day_offset_is_rejected() {
    let home = TempDir::new().unwrap();
    for command in [
        vec!["summer-time"],
        vec!["solar", "--latitude", "59", "--longitude", "18"],
    ] {
        almanac(home.path())
            .args(["--now", "2024-07-01T10:00:00Z"])
            .args(&command)
            .args(["--day-offset", "9223372036854775807"])
            .assert()
            .failure()
            .code(2)
            .stderr(predicate::str::contains("--day-offset"));
    }

    let json = stdout_json(almanac(home.path()).args([
        "--now",
        "2024-07-01T10:00:00Z",
        "summer-time",
        "--day-offset",
        "-36500",
    ]));
    assert!(json["date"].as_str().unwrap().starts_with("1924-"));
}

#[test]
fn leap_seconds_from_table() {
    let home = TempDir::new().unwrap();
    let table = home.path().join("leapsec.dat");
    fs::write(&table, LEAPSEC_DAT).unwrap();

    let json = stdout_json(almanac(home.path()).args([
        "--now",
        "2016-12-25T12:00:00Z",
        "leap-seconds",
        "--table",
        table.to_str().unwrap(),
    ]));
    assert_eq!(json[0]["label"], "Leap seconds: 00:59:60 (local time)");
    assert_eq!(json[0]["days_until"], 7);

    let json = stdout_json(almanac(home.path()).args([
        "leap-seconds",
        "--all",
        "--utc",
        "--table",
        table.to_str().unwrap(),
    ]));
    assert_eq!(json[0]["utc"], "2016-12-31 23:59");
    assert_eq!(json[0]["slot"], "primary");
    assert_eq!(json[0]["text"], "23:59:60 (UTC)");
}

#[test]
fn leap_seconds_without_table_is_not_an_error() {
    let home = TempDir::new().unwrap();
    almanac(home.path())
        .arg("leap-seconds")
        .assert()
        .success()
        .stdout(predicate::str::diff("null\n"))
        .stderr(predicate::str::contains("no leap-second table configured"));
}

#[test]
fn solar_times_at_midsummer() {
    let home = TempDir::new().unwrap();
    let json = stdout_json(almanac(home.path()).args([
        "--now",
        "2024-06-21T08:00:00Z",
        "solar",
        "--latitude",
        "59.33",
        "--longitude",
        "18.07",
    ]));
    assert_eq!(json["date"], "2024-06-21");
    assert_eq!(json["times"]["astronomical_dawn"], Value::Null);
    assert!(json["times"]["sunrise"]
        .as_str()
        .unwrap()
        .starts_with("2024-06-21 03:"));
    assert_eq!(json["season"], "summer");
}

#[test]
fn solar_location_from_geolocation_file() {
    let home = TempDir::new().unwrap();
    let dir = home.path().join(".config");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("geolocation"), "59.33 18.07\n").unwrap();

    let json = stdout_json(almanac(home.path()).args(["--now", "2024-06-21T08:00:00Z", "lengths"]));
    assert_eq!(json["astronomical_night"], "00:00");
    assert!(json["day"].as_str().unwrap().starts_with("18:"), "{json}");
}

#[test]
fn golden_and_blue_hours() {
    let home = TempDir::new().unwrap();
    let args = [
        "--now",
        "2024-03-20T08:00:00Z",
        "hours",
        "--latitude",
        "59.33",
        "--longitude",
        "18.07",
    ];
    let golden = stdout_json(almanac(home.path()).args(args));
    assert_eq!(golden["band"], "golden");
    assert!(golden["morning"]["start"].is_string());
    assert!(golden["evening"]["end"].is_string());

    let blue = stdout_json(almanac(home.path()).args(args).args(["--band", "blue"]));
    assert_eq!(blue["band"], "blue");
    assert!(blue["morning"]["end"].as_str() <= golden["morning"]["start"].as_str());
}

#[test]
fn summary_includes_available_sections() {
    let home = TempDir::new().unwrap();
    let table = home.path().join("leapsec.dat");
    fs::write(&table, LEAPSEC_DAT).unwrap();
    let config = home.path().join("almanac.toml");
    fs::write(
        &config,
        format!(
            "leap_second_table = {:?}\n\n[location]\nlatitude = 59.33\nlongitude = 18.07\n",
            table.to_str().unwrap()
        ),
    )
    .unwrap();

    let json = stdout_json(almanac(home.path()).args([
        "--config",
        config.to_str().unwrap(),
        "--now",
        "2024-10-26T10:00:00Z",
        "summary",
    ]));
    for key in [
        "holidays",
        "events",
        "leap_seconds",
        "summer_time",
        "solar",
        "golden_hour",
        "lengths",
    ] {
        assert!(json.get(key).is_some(), "missing {key}: {json}");
    }
    assert_eq!(json["summer_time"]["clock_change_tomorrow"], true);
}

#[test]
fn summary_skips_solar_without_location() {
    let home = TempDir::new().unwrap();
    let output = almanac(home.path())
        .args(["--now", "2024-10-26T10:00:00Z", "summary"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json: Value = serde_json::from_slice(&output).unwrap();
    assert!(json.get("holidays").is_some());
    // Only absent when neither config nor a geolocation file gives a location.
    if !Path::new("/etc/geolocation").exists() {
        assert!(json.get("solar").is_none());
    }
}

#[test]
fn invalid_timezone_fails() {
    let home = TempDir::new().unwrap();
    Command::cargo_bin("almanac")
        .unwrap()
        .env("HOME", home.path())
        .args(["--timezone", "Mars/Olympus", "holidays"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error: invalid --timezone"))
        .stderr(predicate::str::contains("Invalid timezone"));
}

#[test]
fn unknown_config_field_fails() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("almanac.toml");
    fs::write(&config, "windows_days = 3\n").unwrap();
    almanac(home.path())
        .args(["--config", config.to_str().unwrap(), "holidays"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse TOML config"));
}
