use std::io::Write;

use super::*;

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.logging.level = Some("info".to_string());
    raw.database.url = Some("postgres://file".to_string());

    let overrides = GlobalOverrides {
        log_level: Some("debug".to_string()),
        database_url: Some("postgres://cli".to_string()),
        ..Default::default()
    };

    raw.apply_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
    assert_eq!(settings.database.url.as_deref(), Some("postgres://cli"));
}

#[test]
fn defaults_are_applied() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");

    assert_eq!(settings.store.collection_root, DEFAULT_COLLECTION_ROOT);
    assert_eq!(settings.listing.page_limit, 100);
    assert_eq!(settings.cache.capacity, 1024);
    assert!(settings.cache.enable_level_cache);
    assert!(settings.cache.enable_response_cache);
    assert_eq!(settings.database.max_connections.get(), 8);
    assert!(settings.database.url.is_none());
    assert!(matches!(settings.logging.format, LogFormat::Compact));
}

#[test]
fn cli_json_logging_enforces_format() {
    let mut raw = RawSettings::default();
    let overrides = GlobalOverrides {
        log_json: Some(true),
        ..Default::default()
    };

    raw.apply_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert!(matches!(settings.logging.format, LogFormat::Json));
}

#[test]
fn blank_database_url_is_ignored() {
    let mut raw = RawSettings::default();
    raw.database.url = Some("   ".to_string());

    let settings = Settings::from_raw(raw).expect("valid settings");
    assert!(settings.database.url.is_none());
}

#[test]
fn page_limit_above_maximum_is_rejected() {
    let mut raw = RawSettings::default();
    raw.listing.page_limit = Some(101);

    let err = Settings::from_raw(raw).expect_err("limit too large");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "listing.page_limit",
            ..
        }
    ));
}

#[test]
fn zero_cache_capacity_is_rejected() {
    let mut raw = RawSettings::default();
    raw.cache.capacity = 0;

    let err = Settings::from_raw(raw).expect_err("zero capacity");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "cache.capacity",
            ..
        }
    ));
}

#[test]
fn empty_collection_root_is_rejected() {
    let mut raw = RawSettings::default();
    raw.store.collection_root = Some(String::new());

    assert!(Settings::from_raw(raw).is_err());
}

#[test]
fn invalid_log_level_is_rejected() {
    let mut raw = RawSettings::default();
    raw.logging.level = Some("loud".to_string());

    let err = Settings::from_raw(raw).expect_err("bad level");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "logging.level",
            ..
        }
    ));
}

#[test]
fn config_file_sections_are_read() {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("temp file");
    writeln!(
        file,
        r#"
[cache]
enable_response_cache = false
capacity = 16

[store]
collection_root = "Staging"

[listing]
page_limit = 25
"#
    )
    .expect("write config");

    let args = CliArgs::parse_from([
        "levelkeep",
        "--config-file",
        file.path().to_str().expect("utf-8 path"),
        "list",
    ]);
    let settings = load(&args).expect("valid settings");

    assert!(settings.cache.enable_level_cache);
    assert!(!settings.cache.enable_response_cache);
    assert_eq!(settings.cache.capacity, 16);
    assert_eq!(settings.store.collection_root, "Staging");
    assert_eq!(settings.listing.page_limit, 25);
}

#[test]
fn parse_put_arguments() {
    let args = CliArgs::parse_from([
        "levelkeep",
        "put",
        "level-1",
        "payload.json",
    ]);

    match args.command {
        Command::Put(put) => {
            assert_eq!(put.id, "level-1");
            assert!(!put.reads_stdin());
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn put_reads_stdin_by_default() {
    let args = CliArgs::parse_from(["levelkeep", "put", "level-1"]);
    match args.command {
        Command::Put(put) => assert!(put.reads_stdin()),
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn parse_global_overrides_after_subcommand() {
    let args = CliArgs::parse_from([
        "levelkeep",
        "get",
        "a",
        "--database-url",
        "postgres://localhost/levels",
        "--log-json",
        "true",
        "--page-limit",
        "10",
    ]);

    assert!(matches!(args.command, Command::Get(ref get) if get.id == "a"));
    assert_eq!(
        args.overrides.database_url.as_deref(),
        Some("postgres://localhost/levels")
    );
    assert_eq!(args.overrides.log_json, Some(true));
    assert_eq!(args.overrides.page_limit, Some(10));
}

#[test]
fn parse_migrate_and_delete() {
    let migrate = CliArgs::parse_from(["levelkeep", "migrate"]);
    assert!(matches!(migrate.command, Command::Migrate));

    let delete = CliArgs::parse_from(["levelkeep", "delete", "gone"]);
    assert!(matches!(delete.command, Command::Delete(ref args) if args.id == "gone"));
}

#[test]
fn ephemeral_is_a_batch_option() {
    let args = CliArgs::parse_from(["levelkeep", "batch", "--ephemeral"]);
    assert!(matches!(args.command, Command::Batch(ref batch) if batch.ephemeral));

    let args = CliArgs::parse_from(["levelkeep", "batch"]);
    assert!(matches!(args.command, Command::Batch(ref batch) if !batch.ephemeral));

    assert!(CliArgs::try_parse_from(["levelkeep", "--ephemeral", "get", "a"]).is_err());
    assert!(CliArgs::try_parse_from(["levelkeep", "get", "a", "--ephemeral"]).is_err());
}
