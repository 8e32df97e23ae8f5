use std::fs;

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::NameFieldTitles;
use crate::error::SampleError;

pub const DEFAULT_CONFIG_FILE: &str = "tenx-samples.json";
pub const DEFAULT_DATA_DIR: &str = "data.dir";

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    pub name_field_titles: FieldList,
    #[serde(default)]
    pub sample_fields: Option<FieldList>,
    #[serde(default)]
    pub data_dir: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum FieldList {
    Shorthand(String),
    Detailed(Vec<String>),
}

impl FieldList {
    pub fn into_fields(self) -> Vec<String> {
        match self {
            FieldList::Shorthand(value) => split_fields(&value),
            FieldList::Detailed(values) => values
                .into_iter()
                .map(|value| value.trim().to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableOptions {
    pub name_field_titles: NameFieldTitles,
    pub sample_fields: Option<Vec<String>>,
}

impl TableOptions {
    pub fn new(
        name_field_titles: NameFieldTitles,
        sample_fields: Option<Vec<String>>,
    ) -> Result<Self, SampleError> {
        let sample_fields = sample_fields.filter(|fields| !fields.is_empty());
        if let Some(fields) = &sample_fields {
            for field in fields {
                if field.is_empty() {
                    return Err(SampleError::InvalidConfig(
                        "sample_fields contains an empty field".to_string(),
                    ));
                }
                if name_field_titles.position(field).is_none() {
                    return Err(SampleError::UnknownSampleField(field.clone()));
                }
            }
        }
        Ok(Self {
            name_field_titles,
            sample_fields,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub options: TableOptions,
    pub data_dir: Utf8PathBuf,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub name_fields: Option<String>,
    pub sample_fields: Option<String>,
    pub data_dir: Option<Utf8PathBuf>,
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn resolve(path: Option<&str>) -> Result<ResolvedConfig, SampleError> {
        Self::resolve_with_overrides(path, ConfigOverrides::default())
    }

    pub fn resolve_with_overrides(
        path: Option<&str>,
        overrides: ConfigOverrides,
    ) -> Result<ResolvedConfig, SampleError> {
        let config_path = match path {
            Some(path) => Utf8PathBuf::from(path),
            None => Utf8PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        let file_config = if path.is_none() && !config_path.as_std_path().exists() {
            None
        } else {
            debug!(path = %config_path, "reading config");
            let content = fs::read_to_string(&config_path)
                .map_err(|_| SampleError::ConfigRead(config_path.clone()))?;
            let config: Config = serde_json::from_str(&content)
                .map_err(|err| SampleError::ConfigParse(err.to_string()))?;
            Some(config)
        };

        let config = match (file_config, overrides.name_fields.clone()) {
            (Some(mut config), name_fields) => {
                if let Some(name_fields) = name_fields {
                    config.name_field_titles = FieldList::Shorthand(name_fields);
                }
                config
            }
            (None, Some(name_fields)) => Config {
                name_field_titles: FieldList::Shorthand(name_fields),
                sample_fields: None,
                data_dir: None,
            },
            (None, None) => return Err(SampleError::MissingConfig),
        };

        let mut resolved = Self::resolve_config(config)?;
        if let Some(sample_fields) = overrides.sample_fields {
            resolved.options = TableOptions::new(
                resolved.options.name_field_titles,
                Some(split_fields(&sample_fields)),
            )?;
        }
        if let Some(data_dir) = overrides.data_dir {
            resolved.data_dir = data_dir;
        }
        Ok(resolved)
    }

    pub fn resolve_config(config: Config) -> Result<ResolvedConfig, SampleError> {
        let titles = NameFieldTitles::new(config.name_field_titles.into_fields())?;
        let sample_fields = config.sample_fields.map(FieldList::into_fields);
        let options = TableOptions::new(titles, sample_fields)?;
        let data_dir = config
            .data_dir
            .map(Utf8PathBuf::from)
            .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_DATA_DIR));

        Ok(ResolvedConfig { options, data_dir })
    }
}

fn split_fields(value: &str) -> Vec<String> {
    if value.trim().is_empty() {
        return Vec::new();
    }
    value
        .split(',')
        .map(|field| field.trim().to_string())
        .collect()
}
