use expense_config::{Config, ConfigError, ConfigManager};
use expense_domain::{CategoryRule, Contact};
use tempfile::tempdir;

#[test]
fn missing_file_loads_defaults() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).expect("manager");
    assert_eq!(manager.load().expect("load"), Config::default());
    assert!(manager.backups_dir().exists());
}

#[test]
fn config_manager_persists_and_loads_config() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::new(dir.path().join("config.json"), dir.path().join("backups"));

    let cfg = Config {
        contacts: vec![Contact::new("Ana", 42)],
        audio_replies: true,
        categories: Some(vec![CategoryRule::new("pets", ["ração", "veterinário"])]),
        ..Config::default()
    };
    manager.save(&cfg).expect("save config");
    let loaded = manager.load().expect("load config");

    assert_eq!(loaded, cfg);
    assert!(!dir.path().join("config.json.tmp").exists());
}

#[test]
fn partial_files_fall_back_to_defaults() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{ "time_zone": "America/Manaus", "scheduler_enabled": false }"#)
        .expect("write");
    let manager = ConfigManager::new(path, dir.path().join("backups"));
    let loaded = manager.load().expect("load");
    assert_eq!(loaded.time_zone, "America/Manaus");
    assert!(!loaded.scheduler_enabled);
    assert_eq!(loaded.currency_symbol, "R$");
    assert_eq!(loaded.chart_category_limit, 6);
}

#[test]
fn obsolete_keys_are_ignored() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{ "locale": "pt-BR", "currency_symbol": "US$" }"#).expect("write");
    let manager = ConfigManager::new(path, dir.path().join("backups"));
    let loaded = manager.load().expect("load");
    assert_eq!(loaded.currency_symbol, "US$");
    assert_eq!(loaded.time_zone, "America/Sao_Paulo");
}

#[test]
fn invalid_json_is_a_serde_error() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("config.json");
    std::fs::write(&path, "not json").expect("write");
    let manager = ConfigManager::new(path, dir.path().join("backups"));
    assert!(matches!(manager.load(), Err(ConfigError::Serde(_))));
}

#[test]
fn backups_are_listed_and_restored() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).expect("manager");

    let original = Config::default();
    manager.save(&original).expect("save");
    let name = manager
        .backup(&original, Some("before zone change"))
        .expect("backup");
    assert!(name.starts_with("config_"));
    assert!(name.ends_with("_before-zone-change.json"));

    let changed = Config {
        time_zone: "Europe/Lisbon".into(),
        ..Config::default()
    };
    manager.save(&changed).expect("save changed");

    assert_eq!(manager.list_backups().expect("list"), vec![name.clone()]);
    let restored = manager.restore(&name).expect("restore");
    assert_eq!(restored.time_zone, "America/Sao_Paulo");
    assert_eq!(manager.load().expect("reload").time_zone, "America/Sao_Paulo");
}

#[test]
fn restoring_unknown_backup_fails() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).expect("manager");
    assert!(matches!(
        manager.restore("config_19700101_0000.json"),
        Err(ConfigError::BackupNotFound(_))
    ));
}
