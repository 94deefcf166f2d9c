/*!
 * Unit tests for configuration loading and validation
 */

use anyhow::Result;
use vidscribe::app_config::{Config, LogLevel};

use crate::common;

#[test]
fn test_fromFile_withFullJson_shouldLoadAllSections() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let config_path = common::create_test_file(
        temp_dir.path(),
        "conf.json",
        r#"{
            "source_language": "English",
            "target_language": "French",
            "translation": {
                "openai_api_key": "sk-one;sk-two",
                "model": "gpt-4o",
                "max_batch_size": 50,
                "margin": 2,
                "bilingual": true
            },
            "merge": { "threshold_ms": 5000, "max_length": 80 },
            "log_level": "debug"
        }"#,
    )?;

    let config = Config::from_file(&config_path)?;
    assert_eq!(config.source_language, "English");
    assert_eq!(config.target_language, "French");
    assert_eq!(config.translation.openai_api_key, "sk-one;sk-two");
    assert_eq!(config.translation.max_batch_size, 50);
    assert_eq!(config.translation.margin, 2);
    assert!(config.translation.bilingual);
    assert_eq!(config.merge.threshold_ms, 5_000);
    assert_eq!(config.merge.max_length, 80);
    assert_eq!(config.log_level, LogLevel::Debug);
    Ok(())
}

#[test]
fn test_fromFile_withInvalidBatchConfig_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let config_path = common::create_test_file(
        temp_dir.path(),
        "conf.json",
        r#"{
            "source_language": "English",
            "target_language": "French",
            "translation": { "max_batch_size": 6, "margin": 3 }
        }"#,
    )?;

    assert!(Config::from_file(&config_path).is_err());
    Ok(())
}

#[test]
fn test_fromFile_withMissingFile_shouldFail() {
    assert!(Config::from_file("/nonexistent/conf.json").is_err());
}

#[test]
fn test_saveToFile_thenLoad_shouldRoundTrip() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let config_path = temp_dir.path().join("conf.json");

    let mut config = Config::default();
    config.translation.deepseek_api_key = "ds-key".to_string();
    config.save_to_file(&config_path)?;

    let loaded = Config::from_file(&config_path)?;
    assert_eq!(loaded.source_language, config.source_language);
    assert_eq!(loaded.translation.deepseek_api_key, "ds-key");
    assert_eq!(loaded.translation.model, config.translation.model);
    Ok(())
}
