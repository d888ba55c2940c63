use copyrnn::config::{CopyRnnConfig, ScoreMode};
use std::fs;
use std::path::PathBuf;

fn write_temp(name: &str, content: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!("copyrnn-config-{}-{}", std::process::id(), name));
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn loads_a_toml_config() {
    let path = write_temp(
        "model.toml",
        r#"
vocab_size = 50000
embed_size = 128
src_hidden_size = 100
target_hidden_size = 100
max_src_len = 1500
max_oov_count = 100
dropout = 0.25
score_mode = "general"
pad_id = 0
"#,
    );
    let cfg = CopyRnnConfig::from_path(path.to_str().unwrap()).unwrap();
    fs::remove_file(&path).unwrap();
    assert_eq!(cfg.vocab_size, 50000);
    assert_eq!(cfg.embed_size, 128);
    assert_eq!(cfg.src_hidden_size, 100);
    assert_eq!(cfg.target_hidden_size, 100);
    assert_eq!(cfg.max_src_len, 1500);
    assert_eq!(cfg.max_oov_count, 100);
    assert!((cfg.dropout - 0.25).abs() < 1e-6);
    assert_eq!(cfg.score_mode, ScoreMode::General);
    assert_eq!(cfg.pad_id, 0);
    assert_eq!(cfg.extended_vocab_size(), 50100);
    assert!(cfg.validate().is_ok());
}

#[test]
fn loads_a_json_config_and_applies_field_defaults() {
    let path = write_temp(
        "model.json",
        r#"{
  "vocab_size": 5,
  "embed_size": 4,
  "src_hidden_size": 4,
  "target_hidden_size": 4,
  "max_src_len": 4,
  "max_oov_count": 2
}"#,
    );
    let cfg = CopyRnnConfig::from_path(path.to_str().unwrap()).unwrap();
    fs::remove_file(&path).unwrap();
    assert_eq!(cfg.vocab_size, 5);
    assert_eq!(cfg.dropout, 0.0);
    assert_eq!(cfg.score_mode, ScoreMode::General);
    assert_eq!(cfg.pad_id, 0);
}

#[test]
fn malformed_or_missing_files_yield_none() {
    let toml = write_temp("broken.toml", "vocab_size = \"not a number\"");
    let json = write_temp("broken.json", "{ \"vocab_size\": ");
    let mode = write_temp("mode.toml", "vocab_size = 5\nscore_mode = \"dot\"");
    assert!(CopyRnnConfig::from_path(toml.to_str().unwrap()).is_none());
    assert!(CopyRnnConfig::from_path(json.to_str().unwrap()).is_none());
    assert!(CopyRnnConfig::from_path(mode.to_str().unwrap()).is_none());
    fs::remove_file(&toml).unwrap();
    fs::remove_file(&json).unwrap();
    fs::remove_file(&mode).unwrap();
    assert!(CopyRnnConfig::from_path("/nonexistent/copyrnn.toml").is_none());
}
