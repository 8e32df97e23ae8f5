use std::io::{self, Write};

use serde::Serialize;

use crate::app::{
    AggrResult, CheckResult, ProgressEvent, ProgressSink, SampleIdsResult, TableResult,
};
use crate::manifest::RunInputs;

#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    Text,
    Json,
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

impl ProgressSink for JsonOutput {
    fn event(&self, _event: ProgressEvent) {}
}

pub struct TextOutput;

impl TextOutput {
    pub fn print_check(result: &CheckResult) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        writeln!(
            stdout,
            "{} sample manifests valid in {}",
            result.samples.len(),
            result.data_dir
        )?;
        for item in &result.samples {
            writeln!(
                stdout,
                "  {}\tncells={}\tbatch={}\truns={}",
                item.library_id, item.ncells, item.batch, item.runs
            )?;
        }
        Ok(())
    }

    pub fn print_table(result: &TableResult) -> io::Result<()> {
        println!("wrote {} samples to {}", result.rows, result.path);
        Ok(())
    }

    pub fn print_aggr(result: &AggrResult) -> io::Result<()> {
        println!("wrote {} libraries to {}", result.libraries, result.path);
        Ok(())
    }

    pub fn print_runs(inputs: &RunInputs) -> io::Result<()> {
        println!("cellranger {}", inputs.to_args().join(" "));
        Ok(())
    }

    pub fn print_sample_ids(result: &SampleIdsResult) -> io::Result<()> {
        println!("{}", result.sample_ids.join(","));
        Ok(())
    }
}
