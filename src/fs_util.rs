use std::fs;
use std::io::{BufWriter, Write};

use camino::Utf8Path;

use crate::error::SampleError;

pub fn write_atomic<F>(path: &Utf8Path, write: F) -> Result<(), SampleError>
where
    F: FnOnce(&mut dyn Write) -> Result<(), SampleError>,
{
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    fs::create_dir_all(parent.as_std_path())
        .map_err(|err| SampleError::Filesystem(err.to_string()))?;

    let temp = tempfile::Builder::new()
        .prefix(".tenx-samples")
        .tempfile_in(parent.as_std_path())
        .map_err(|err| SampleError::Filesystem(err.to_string()))?;
    {
        let mut writer = BufWriter::new(temp.as_file());
        write(&mut writer)?;
        writer
            .flush()
            .map_err(|err| SampleError::Filesystem(err.to_string()))?;
    }
    temp.persist(path.as_std_path())
        .map_err(|err| SampleError::Filesystem(format!("persist {path}: {}", err.error)))?;
    Ok(())
}
