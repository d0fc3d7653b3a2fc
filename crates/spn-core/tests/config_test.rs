//! Tests for the configuration system.

use std::sync::Mutex;

use spn_core::config::SpnConfig;
use spn_core::errors::ConfigError;
use spn_core::InferenceMode;

/// Global mutex to serialize tests that modify environment variables.
static ENV_MUTEX: Mutex<()> = Mutex::new(());

fn clear_spn_env_vars() {
    for key in [
        "SPN_LEARNING_CLUSTER_COUNT",
        "SPN_LEARNING_SIGNIFICANCE",
        "SPN_TRAINING_LEARNING_RATE",
        "SPN_TRAINING_L2",
        "SPN_TRAINING_BATCH_SIZE",
        "SPN_TRAINING_MODE",
        "SPN_INFERENCE_STORE",
    ] {
        std::env::remove_var(key);
    }
}

#[test]
fn empty_toml_yields_compiled_defaults() {
    let config = SpnConfig::from_toml("").unwrap();

    assert_eq!(config.learning.effective_cluster_count(), 2);
    assert_eq!(config.learning.effective_significance(), 0.05);
    assert_eq!(config.learning.effective_kmeans_max_iterations(), 100);

    assert_eq!(config.training.effective_learning_rate(), 0.1);
    assert_eq!(config.training.effective_l2(), 0.0);
    assert_eq!(config.training.effective_batch_size(), 1);
    assert_eq!(config.training.effective_mode(), InferenceMode::Soft);

    assert!(config.inference.effective_store());
    assert_eq!(config.observability.effective_log_level(), "info");
}

#[test]
fn partial_toml_overrides_only_named_fields() {
    let toml = r#"
[learning]
significance = 0.01

[training]
batch_size = 8
mode = "hard"
"#;
    let config = SpnConfig::from_toml(toml).unwrap();
    assert_eq!(config.learning.effective_significance(), 0.01);
    assert_eq!(config.learning.effective_cluster_count(), 2);
    assert_eq!(config.training.effective_batch_size(), 8);
    assert_eq!(config.training.effective_mode(), InferenceMode::Hard);
    assert_eq!(config.training.effective_learning_rate(), 0.1);
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let err = SpnConfig::from_toml("[learning\ncluster_count = ").unwrap_err();
    assert!(matches!(err, ConfigError::ParseError { .. }));
}

#[test]
fn validation_rejects_out_of_range_values() {
    let bad = [
        "[learning]\nsignificance = 1.5",
        "[learning]\ncluster_count = 1",
        "[training]\nlearning_rate = 0.0",
        "[training]\nl2 = -1.0",
        "[training]\nbatch_size = 0",
    ];
    for toml in bad {
        let config = SpnConfig::from_toml(toml).unwrap();
        let err = SpnConfig::validate(&config).unwrap_err();
        assert!(
            matches!(err, ConfigError::ValidationFailed { .. }),
            "expected validation failure for {toml:?}"
        );
    }
}

#[test]
fn load_layers_file_then_env() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_spn_env_vars();

    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("spn.toml");
    std::fs::write(
        &path,
        r#"
[learning]
cluster_count = 3

[training]
learning_rate = 0.5
"#,
    )
    .unwrap();

    std::env::set_var("SPN_TRAINING_LEARNING_RATE", "0.25");
    std::env::set_var("SPN_INFERENCE_STORE", "false");

    let config = SpnConfig::load(Some(&path)).unwrap();
    assert_eq!(config.learning.effective_cluster_count(), 3);
    assert_eq!(config.training.effective_learning_rate(), 0.25);
    assert!(!config.inference.effective_store());

    clear_spn_env_vars();
}

#[test]
fn load_missing_file_reports_path() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_spn_env_vars();

    let err = SpnConfig::load(Some(std::path::Path::new("/nonexistent/spn.toml"))).unwrap_err();
    match err {
        ConfigError::FileNotFound { path } => assert!(path.contains("spn.toml")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn serde_roundtrip_preserves_values() {
    let mut config = SpnConfig::default();
    config.training.l2 = Some(0.01);
    config.training.mode = Some(InferenceMode::Hard);
    let toml_str = toml::to_string(&config).unwrap();
    let back = SpnConfig::from_toml(&toml_str).unwrap();
    assert_eq!(back.training.effective_l2(), 0.01);
    assert_eq!(back.training.effective_mode(), InferenceMode::Hard);
}
