use assert_matches::assert_matches;
use camino::Utf8PathBuf;

use tenx_samples::config::{ConfigLoader, ConfigOverrides, DEFAULT_DATA_DIR};
use tenx_samples::error::SampleError;

fn write_config(content: &str) -> (tempfile::TempDir, String) {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("tenx-samples.json");
    std::fs::write(&path, content).unwrap();
    let path = path.to_str().unwrap().to_string();
    (temp, path)
}

#[test]
fn load_config_file() {
    let (_temp, path) = write_config(
        r#"{"name_field_titles": "donor,condition", "sample_fields": "donor", "data_dir": "in"}"#,
    );

    let resolved = ConfigLoader::resolve(Some(&path)).unwrap();
    assert_eq!(resolved.options.name_field_titles.to_string(), "donor,condition");
    assert_eq!(resolved.options.sample_fields, Some(vec!["donor".to_string()]));
    assert_eq!(resolved.data_dir, Utf8PathBuf::from("in"));
}

#[test]
fn overrides_take_precedence() {
    let (_temp, path) = write_config(r#"{"name_field_titles": "donor,condition"}"#);
    let overrides = ConfigOverrides {
        name_fields: Some("donor,condition,replicate".to_string()),
        sample_fields: Some("donor,condition".to_string()),
        data_dir: Some(Utf8PathBuf::from("elsewhere")),
    };

    let resolved = ConfigLoader::resolve_with_overrides(Some(&path), overrides).unwrap();
    assert_eq!(resolved.options.name_field_titles.len(), 3);
    assert_eq!(
        resolved.options.sample_fields,
        Some(vec!["donor".to_string(), "condition".to_string()])
    );
    assert_eq!(resolved.data_dir, Utf8PathBuf::from("elsewhere"));
}

#[test]
fn name_fields_without_config_file() {
    let overrides = ConfigOverrides {
        name_fields: Some("donor,condition".to_string()),
        sample_fields: Some("donor".to_string()),
        ..ConfigOverrides::default()
    };

    let resolved = ConfigLoader::resolve_with_overrides(None, overrides).unwrap();
    assert_eq!(resolved.options.name_field_titles.to_string(), "donor,condition");
    assert_eq!(resolved.options.sample_fields, Some(vec!["donor".to_string()]));
    assert_eq!(resolved.data_dir, Utf8PathBuf::from(DEFAULT_DATA_DIR));
}

#[test]
fn explicit_config_path_must_exist() {
    let temp = tempfile::tempdir().unwrap();
    let missing = temp.path().join("absent.json");
    let overrides = ConfigOverrides {
        name_fields: Some("donor".to_string()),
        ..ConfigOverrides::default()
    };

    let err = ConfigLoader::resolve_with_overrides(missing.to_str(), overrides).unwrap_err();
    assert_matches!(err, SampleError::ConfigRead(_));
}

#[test]
fn malformed_json() {
    let (_temp, path) = write_config("{ not json");
    let err = ConfigLoader::resolve(Some(&path)).unwrap_err();
    assert_matches!(err, SampleError::ConfigParse(_));
}

#[test]
fn reserved_column_title() {
    let (_temp, path) = write_config(r#"{"name_field_titles": ["donor", "sample_id"]}"#);
    let err = ConfigLoader::resolve(Some(&path)).unwrap_err();
    assert_matches!(err, SampleError::InvalidConfig(_));
}
