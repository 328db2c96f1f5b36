//! Scenario files: layering, validation, discovery and dumping.

mod common;

use std::path::Path;

use figment::Jail;
use posefuse_sim::prelude::*;

fn load(path: &str) -> Result<ScenarioConfig> {
    load_scenario(Path::new(path))
}

fn make_dirs(jail: &Jail, relative: &str) -> figment::Result<()> {
    std::fs::create_dir_all(jail.directory().join(relative)).map_err(|e| e.to_string())?;
    Ok(())
}

#[test]
fn test_partial_file_keeps_defaults() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "short.toml",
            r#"
            [simulation]
            duration_seconds = 2.0

            [motion]
            type = "Constant"
            accel = 0.5
            yaw_rate = 0.1
            "#,
        )?;
        let scenario = load("short.toml").map_err(|e| e.to_string())?;
        assert_eq!(scenario.simulation.name, "short");
        assert_eq!(scenario.simulation.duration_seconds, 2.0);
        assert_eq!(scenario.imu, ImuConfig::default());
        assert_eq!(scenario.core, PoseFusionConfig::default());
        assert_eq!(
            scenario.motion,
            MotionProfile::Constant {
                accel: 0.5,
                yaw_rate: 0.1
            }
        );
        Ok(())
    });
}

#[test]
fn test_environment_overrides_file() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "s.toml",
            r#"
            [core.fusion]
            slam_enabled = false
            "#,
        )?;
        jail.set_env("POSEFUSE_CORE__FUSION__SLAM_ENABLED", "true");
        jail.set_env("POSEFUSE_SIMULATION__SEED", "99");
        let scenario = load("s.toml").map_err(|e| e.to_string())?;
        assert!(scenario.core.fusion.slam_enabled);
        assert_eq!(scenario.simulation.seed, 99);
        Ok(())
    });
}

#[test]
fn test_unknown_field_is_rejected() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "typo.toml",
            r#"
            [core.slam]
            range_nosie = 0.2
            "#,
        )?;
        assert!(matches!(load("typo.toml"), Err(SimError::Figment(_))));
        Ok(())
    });
}

#[test]
fn test_invalid_values_are_rejected() {
    Jail::expect_with(|jail| {
        jail.create_file("bad.toml", "[imu]\nrate_hz = 0.0\n")?;
        match load("bad.toml") {
            Err(SimError::InvalidScenario { field, .. }) => assert_eq!(field, "imu.rate_hz"),
            other => panic!("unexpected result: {:?}", other),
        }

        jail.create_file("bad_core.toml", "[core.visual]\nmin_visual_weight = 0.9\n")?;
        assert!(matches!(load("bad_core.toml"), Err(SimError::Core(_))));
        Ok(())
    });
}

#[test]
fn test_missing_file_is_an_io_error() {
    assert!(matches!(
        load("does/not/exist.toml"),
        Err(SimError::Io { .. })
    ));
}

#[test]
fn test_discovery_walks_subdirectories() {
    Jail::expect_with(|jail| {
        make_dirs(jail, "set/nested")?;
        jail.create_file("set/b.toml", "")?;
        jail.create_file("set/a.toml", "")?;
        jail.create_file("set/notes.txt", "not a scenario")?;
        jail.create_file("set/nested/c.toml", "")?;
        let found = discover_scenarios(Path::new("set")).map_err(|e| e.to_string())?;
        let names: Vec<String> = found
            .iter()
            .map(|p| p.to_string_lossy().replace(std::path::MAIN_SEPARATOR, "/"))
            .collect();
        assert_eq!(names, ["set/a.toml", "set/b.toml", "set/nested/c.toml"]);
        Ok(())
    });
}

#[test]
fn test_directory_without_scenarios() {
    Jail::expect_with(|jail| {
        make_dirs(jail, "empty")?;
        jail.create_file("empty/readme.txt", "")?;
        assert!(matches!(
            discover_scenarios(Path::new("empty")),
            Err(SimError::NoScenarios(_))
        ));
        Ok(())
    });
}

#[test]
fn test_dumped_scenario_loads_back() {
    Jail::expect_with(|jail| {
        let mut scenario = common::quiet_scenario(common::forward(0.2, 0.05), 3.0);
        scenario.core.fusion.slam_enabled = true;
        let text = to_toml(&scenario).map_err(|e| e.to_string())?;
        jail.create_file("test.toml", &text)?;
        let reloaded = load("test.toml").map_err(|e| e.to_string())?;
        assert_eq!(reloaded, scenario);
        Ok(())
    });
}

#[test]
fn test_seed_flag_overrides_every_scenario() {
    Jail::expect_with(|jail| {
        make_dirs(jail, "runs")?;
        jail.create_file("runs/one.toml", "[simulation]\nseed = 1\n")?;
        jail.create_file("runs/two.toml", "[simulation]\nseed = 2\n")?;
        let cli = <Cli as clap::Parser>::parse_from(["posefuse", "--scenario-dir", "runs", "--seed", "5"]);
        let scenarios = posefuse_sim::resolve_scenarios(&cli).map_err(|e| e.to_string())?;
        assert_eq!(scenarios.len(), 2);
        for s in &scenarios {
            assert_eq!(s.simulation.seed, 5);
            assert_eq!(s.core.fusion.landmark_sensor.seed, 5);
        }
        Ok(())
    });
}

#[test]
fn test_shipped_scenarios_are_valid() {
    let paths = discover_scenarios(&common::shipped_scenarios_dir()).unwrap();
    assert!(paths.len() >= 3);
    for path in paths {
        load_scenario(&path).unwrap_or_else(|e| panic!("{:?}: {}", path, e));
    }
}
