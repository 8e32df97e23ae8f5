use std::fmt;
use std::str::FromStr;

use crate::error::SampleError;

pub const MANIFEST_EXTENSION: &str = "sample";
pub const MANIFEST_PATTERN: &str = "<name_fields>.<ncells>.<batch>.sample";
pub const RESERVED_TOKEN: &str = "sample_id";

pub const NCELLS_COLUMN: &str = "ncells";
pub const BATCH_COLUMN: &str = "batch";
pub const FILE_COLUMN: &str = "file";
pub const LIBRARY_ID_COLUMN: &str = "library_id";
pub const SAMPLE_ID_COLUMN: &str = "sample_id";
pub const MOLECULE_H5_COLUMN: &str = "molecule_h5";
pub const AGG_ID_COLUMN: &str = "agg_id";

pub const FIXED_COLUMNS: [&str; 7] = [
    NCELLS_COLUMN,
    BATCH_COLUMN,
    FILE_COLUMN,
    LIBRARY_ID_COLUMN,
    SAMPLE_ID_COLUMN,
    MOLECULE_H5_COLUMN,
    AGG_ID_COLUMN,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameFieldTitles(Vec<String>);

impl NameFieldTitles {
    pub fn new(titles: Vec<String>) -> Result<Self, SampleError> {
        let titles = titles
            .into_iter()
            .map(|title| title.trim().to_string())
            .collect::<Vec<_>>();
        if titles.is_empty() {
            return Err(SampleError::InvalidConfig(
                "name_field_titles must list at least one title".to_string(),
            ));
        }
        for (idx, title) in titles.iter().enumerate() {
            if title.is_empty() {
                return Err(SampleError::InvalidConfig(
                    "name_field_titles contains an empty title".to_string(),
                ));
            }
            if FIXED_COLUMNS.contains(&title.as_str()) {
                return Err(SampleError::InvalidConfig(format!(
                    "name field title {title} collides with a sample table column"
                )));
            }
            if titles[..idx].contains(title) {
                return Err(SampleError::InvalidConfig(format!(
                    "name field title {title} is listed twice"
                )));
            }
        }
        Ok(Self(titles))
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn position(&self, title: &str) -> Option<usize> {
        self.0.iter().position(|t| t == title)
    }
}

impl fmt::Display for NameFieldTitles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(","))
    }
}

impl FromStr for NameFieldTitles {
    type Err = SampleError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::new(value.split(',').map(str::to_string).collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestName {
    pub sample_name: String,
    pub name_fields: Vec<String>,
    pub ncells: u32,
    pub batch: String,
}

impl ManifestName {
    pub fn parse(basename: &str, titles: &NameFieldTitles) -> Result<Self, SampleError> {
        let sections = basename.split('.').collect::<Vec<_>>();
        let [sample_name, ncells, batch, extension] = sections.as_slice() else {
            return Err(malformed(basename));
        };
        if *extension != MANIFEST_EXTENSION {
            return Err(malformed(basename));
        }

        if sample_name.contains(RESERVED_TOKEN) {
            return Err(SampleError::ReservedName(sample_name.to_string()));
        }

        let name_fields = sample_name
            .split('_')
            .map(str::to_string)
            .collect::<Vec<_>>();
        if name_fields.len() != titles.len() {
            return Err(SampleError::FieldCountMismatch {
                sample_name: sample_name.to_string(),
                found: name_fields.len(),
                expected: titles.len(),
                titles: titles.to_string(),
            });
        }
        if let Some(idx) = name_fields.iter().position(|field| field.is_empty()) {
            return Err(SampleError::EmptyNameField {
                basename: basename.to_string(),
                title: titles.as_slice()[idx].clone(),
            });
        }

        Ok(Self {
            sample_name: sample_name.to_string(),
            name_fields,
            ncells: parse_ncells(basename, ncells)?,
            batch: batch.to_string(),
        })
    }

    pub fn field<'a>(&'a self, titles: &NameFieldTitles, title: &str) -> Option<&'a str> {
        titles
            .position(title)
            .and_then(|idx| self.name_fields.get(idx))
            .map(String::as_str)
    }
}

pub(crate) fn parse_ncells(basename: &str, value: &str) -> Result<u32, SampleError> {
    let invalid = || SampleError::InvalidCellCount {
        basename: basename.to_string(),
        value: value.to_string(),
    };
    if value.is_empty() || !value.chars().all(|ch| ch.is_ascii_digit()) {
        return Err(invalid());
    }
    match value.parse::<u32>() {
        Ok(0) | Err(_) => Err(invalid()),
        Ok(ncells) => Ok(ncells),
    }
}

fn malformed(basename: &str) -> SampleError {
    SampleError::MalformedManifestName {
        basename: basename.to_string(),
        expected: MANIFEST_PATTERN.to_string(),
    }
}
