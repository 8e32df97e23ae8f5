use std::fs;
use std::io::{BufRead, BufReader, Read};

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use tracing::debug;

use crate::domain::{MANIFEST_EXTENSION, ManifestName, NameFieldTitles};
use crate::error::SampleError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub path: Utf8PathBuf,
    pub name: ManifestName,
    pub runs: Vec<String>,
}

impl Manifest {
    pub fn load(path: &Utf8Path, titles: &NameFieldTitles) -> Result<Self, SampleError> {
        let basename = path
            .file_name()
            .ok_or_else(|| SampleError::Filesystem(format!("not a file path: {path}")))?;
        let name = ManifestName::parse(basename, titles)?;

        let file = fs::File::open(path.as_std_path())
            .map_err(|err| SampleError::Filesystem(format!("open manifest {path}: {err}")))?;
        let runs = read_run_paths(file)
            .map_err(|err| SampleError::Filesystem(format!("read manifest {path}: {err}")))?;
        if runs.is_empty() {
            return Err(SampleError::EmptyManifest(path.to_path_buf()));
        }
        debug!(manifest = %path, runs = runs.len(), "parsed manifest");

        Ok(Self {
            path: path.to_path_buf(),
            name,
            runs,
        })
    }

    pub fn library_id(&self) -> &str {
        &self.name.sample_name
    }

    pub fn run_inputs(&self) -> RunInputs {
        RunInputs::new(self.library_id(), self.name.ncells, &self.runs)
    }
}

pub fn discover_manifests(dir: &Utf8Path) -> Result<Vec<Utf8PathBuf>, SampleError> {
    let entries = fs::read_dir(dir.as_std_path())
        .map_err(|err| SampleError::Filesystem(format!("read directory {dir}: {err}")))?;

    let mut manifests = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| SampleError::Filesystem(err.to_string()))?;
        let path = Utf8PathBuf::from_path_buf(entry.path()).map_err(|path| {
            SampleError::Filesystem(format!("non UTF-8 path: {}", path.display()))
        })?;
        let hidden = path.file_name().is_some_and(|name| name.starts_with('.'));
        if !hidden && path.extension() == Some(MANIFEST_EXTENSION) && path.as_std_path().is_file()
        {
            manifests.push(path);
        }
    }

    if manifests.is_empty() {
        return Err(SampleError::NoInput(dir.to_path_buf()));
    }
    manifests.sort();
    debug!(dir = %dir, count = manifests.len(), "discovered manifests");
    Ok(manifests)
}

pub fn read_run_paths<R: Read>(reader: R) -> std::io::Result<Vec<String>> {
    let mut runs = Vec::new();
    for line in BufReader::new(reader).lines() {
        let line = line?;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            runs.push(trimmed.to_string());
        }
    }
    Ok(runs)
}

/// Inputs handed to `cellranger count` for one library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunInputs {
    pub id: String,
    pub expect_cells: u32,
    pub fastqs: Vec<String>,
    pub samples: Vec<String>,
}

impl RunInputs {
    pub fn new(library_id: &str, expect_cells: u32, runs: &[String]) -> Self {
        let samples = runs
            .iter()
            .map(|run| {
                Utf8Path::new(run.trim_end_matches('/'))
                    .file_name()
                    .unwrap_or(run.as_str())
                    .to_string()
            })
            .collect();
        Self {
            id: format!("{library_id}-count"),
            expect_cells,
            fastqs: runs.to_vec(),
            samples,
        }
    }

    pub fn fastqs_arg(&self) -> String {
        self.fastqs.join(",")
    }

    pub fn samples_arg(&self) -> String {
        self.samples.join(",")
    }

    pub fn to_args(&self) -> Vec<String> {
        vec![
            "count".to_string(),
            "--id".to_string(),
            self.id.clone(),
            "--fastqs".to_string(),
            self.fastqs_arg(),
            "--sample".to_string(),
            self.samples_arg(),
            "--expect-cells".to_string(),
            self.expect_cells.to_string(),
        ]
    }
}
