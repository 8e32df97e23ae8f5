use std::fs;
use std::time::{Duration, Instant};

use camino::Utf8Path;
use serde::Serialize;
use tracing::info;

use crate::config::ResolvedConfig;
use crate::error::SampleError;
use crate::fs_util::write_atomic;
use crate::manifest::{Manifest, RunInputs, discover_manifests};
use crate::table::{SampleTable, ensure_unique_names};

pub const DEFAULT_TABLE_FILE: &str = "sample.information.txt";
pub const DEFAULT_AGGR_FILE: &str = "aggr.specification.csv";

#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    pub data_dir: String,
    pub samples: Vec<CheckItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckItem {
    pub library_id: String,
    pub ncells: u32,
    pub batch: String,
    pub runs: usize,
    pub file: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableResult {
    pub path: String,
    pub rows: usize,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AggrResult {
    pub table: String,
    pub path: String,
    pub libraries: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SampleIdsResult {
    pub table: String,
    pub sample_ids: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub message: String,
    pub elapsed: Option<Duration>,
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

pub struct LogSink;

impl ProgressSink for LogSink {
    fn event(&self, event: ProgressEvent) {
        match event.elapsed {
            Some(elapsed) => {
                let elapsed_ms = elapsed.as_millis() as u64;
                info!(elapsed_ms, "{}", event.message);
            }
            None => info!("{}", event.message),
        }
    }
}

#[derive(Debug, Clone)]
pub struct App {
    config: ResolvedConfig,
}

impl App {
    pub fn new(config: ResolvedConfig) -> Self {
        Self { config }
    }

    pub fn load_manifests(&self, sink: &dyn ProgressSink) -> Result<Vec<Manifest>, SampleError> {
        let data_dir = &self.config.data_dir;
        sink.event(ProgressEvent {
            message: format!("phase=Discover; scanning {data_dir}"),
            elapsed: None,
        });
        let paths = discover_manifests(data_dir)?;
        let titles = &self.config.options.name_field_titles;
        paths
            .iter()
            .map(|path| Manifest::load(path, titles))
            .collect()
    }

    /// Validation only: no table is built and nothing is written.
    pub fn check(&self, sink: &dyn ProgressSink) -> Result<CheckResult, SampleError> {
        let started = Instant::now();
        let manifests = self.load_manifests(sink)?;
        ensure_unique_names(&manifests)?;
        sink.event(ProgressEvent {
            message: format!("phase=Check; {} manifests valid", manifests.len()),
            elapsed: Some(started.elapsed()),
        });

        Ok(CheckResult {
            data_dir: self.config.data_dir.to_string(),
            samples: manifests
                .iter()
                .map(|manifest| CheckItem {
                    library_id: manifest.library_id().to_string(),
                    ncells: manifest.name.ncells,
                    batch: manifest.name.batch.clone(),
                    runs: manifest.runs.len(),
                    file: manifest.path.to_string(),
                })
                .collect(),
        })
    }

    pub fn sample_table(&self, sink: &dyn ProgressSink) -> Result<SampleTable, SampleError> {
        let manifests = self.load_manifests(sink)?;
        SampleTable::build(&manifests, &self.config.options)
    }

    pub fn write_table(
        &self,
        out: &Utf8Path,
        sink: &dyn ProgressSink,
    ) -> Result<TableResult, SampleError> {
        let started = Instant::now();
        let table = self.sample_table(sink)?;
        write_atomic(out, |writer| table.write_tsv(writer))?;
        sink.event(ProgressEvent {
            message: format!("phase=Write; {} samples -> {out}", table.len()),
            elapsed: Some(started.elapsed()),
        });

        Ok(TableResult {
            path: out.to_string(),
            rows: table.len(),
            columns: table.headers(),
        })
    }

    pub fn run_inputs(&self, manifest: &Utf8Path) -> Result<RunInputs, SampleError> {
        let manifest = Manifest::load(manifest, &self.config.options.name_field_titles)?;
        Ok(manifest.run_inputs())
    }

    pub fn read_table(table: &Utf8Path) -> Result<SampleTable, SampleError> {
        let file = fs::File::open(table.as_std_path())
            .map_err(|err| SampleError::Filesystem(format!("open table {table}: {err}")))?;
        SampleTable::read_tsv(file)
    }

    pub fn write_aggr(
        table: &Utf8Path,
        out: &Utf8Path,
        sink: &dyn ProgressSink,
    ) -> Result<AggrResult, SampleError> {
        let sample_table = Self::read_table(table)?;
        write_atomic(out, |writer| sample_table.write_aggr_csv(writer))?;
        sink.event(ProgressEvent {
            message: format!("phase=Aggr; {} libraries -> {out}", sample_table.len()),
            elapsed: None,
        });

        Ok(AggrResult {
            table: table.to_string(),
            path: out.to_string(),
            libraries: sample_table.len(),
        })
    }

    pub fn sample_ids(table: &Utf8Path) -> Result<SampleIdsResult, SampleError> {
        let sample_table = Self::read_table(table)?;
        Ok(SampleIdsResult {
            table: table.to_string(),
            sample_ids: sample_table
                .sample_ids()
                .into_iter()
                .map(str::to_string)
                .collect(),
        })
    }
}
