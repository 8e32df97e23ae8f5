use std::collections::{HashMap, HashSet};
use std::io::{Read, Write};

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;

use crate::config::TableOptions;
use crate::domain::{
    AGG_ID_COLUMN, FIXED_COLUMNS, LIBRARY_ID_COLUMN, MOLECULE_H5_COLUMN, NCELLS_COLUMN,
    NameFieldTitles, parse_ncells,
};
use crate::error::SampleError;
use crate::manifest::Manifest;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleRecord {
    pub name_fields: Vec<String>,
    pub ncells: u32,
    pub batch: String,
    pub file: Utf8PathBuf,
    pub library_id: String,
    pub sample_id: String,
    pub molecule_h5: String,
    pub agg_id: u32,
}

impl SampleRecord {
    fn to_row(&self) -> Vec<String> {
        let mut row = self.name_fields.clone();
        row.extend([
            self.ncells.to_string(),
            self.batch.clone(),
            self.file.to_string(),
            self.library_id.clone(),
            self.sample_id.clone(),
            self.molecule_h5.clone(),
            self.agg_id.to_string(),
        ]);
        row
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggrRow<'a> {
    pub library_id: &'a str,
    pub molecule_h5: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleTable {
    titles: NameFieldTitles,
    records: Vec<SampleRecord>,
}

impl SampleTable {
    pub fn build(manifests: &[Manifest], options: &TableOptions) -> Result<Self, SampleError> {
        ensure_unique_names(manifests)?;

        let titles = &options.name_field_titles;
        let mut records = Vec::with_capacity(manifests.len());
        for (idx, manifest) in manifests.iter().enumerate() {
            let library_id = manifest.library_id().to_string();
            let sample_id = match &options.sample_fields {
                None => library_id.clone(),
                Some(fields) => fields
                    .iter()
                    .map(|field| {
                        manifest
                            .name
                            .field(titles, field)
                            .ok_or_else(|| SampleError::UnknownSampleField(field.clone()))
                    })
                    .collect::<Result<Vec<_>, SampleError>>()?
                    .join("_"),
            };
            records.push(SampleRecord {
                name_fields: manifest.name.name_fields.clone(),
                ncells: manifest.name.ncells,
                batch: manifest.name.batch.clone(),
                file: manifest.path.clone(),
                molecule_h5: molecule_h5_path(&library_id),
                library_id,
                sample_id,
                agg_id: (idx + 1) as u32,
            });
        }

        Ok(Self {
            titles: titles.clone(),
            records,
        })
    }

    pub fn records(&self) -> &[SampleRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn headers(&self) -> Vec<String> {
        let mut headers = self.titles.as_slice().to_vec();
        headers.extend(FIXED_COLUMNS.iter().map(|column| column.to_string()));
        headers
    }

    pub fn sample_ids(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .map(|record| record.sample_id.as_str())
            .filter(|id| seen.insert(*id))
            .collect()
    }

    pub fn aggr_rows(&self) -> Vec<AggrRow<'_>> {
        self.records
            .iter()
            .map(|record| AggrRow {
                library_id: &record.library_id,
                molecule_h5: &record.molecule_h5,
            })
            .collect()
    }

    pub fn write_tsv<W: Write>(&self, writer: W) -> Result<(), SampleError> {
        let mut wtr = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .from_writer(writer);
        wtr.write_record(self.headers()).map_err(table_io)?;
        for record in &self.records {
            wtr.write_record(record.to_row()).map_err(table_io)?;
        }
        wtr.flush()
            .map_err(|err| SampleError::Filesystem(err.to_string()))
    }

    pub fn read_tsv<R: Read>(reader: R) -> Result<Self, SampleError> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .from_reader(reader);
        let headers = rdr.headers().map_err(table_format)?.clone();

        let ncells_idx = headers
            .iter()
            .position(|header| header == NCELLS_COLUMN)
            .ok_or_else(|| SampleError::TableFormat(format!("missing {NCELLS_COLUMN} column")))?;
        let fixed = headers.iter().skip(ncells_idx).collect::<Vec<_>>();
        if fixed != FIXED_COLUMNS {
            return Err(SampleError::TableFormat(format!(
                "expected columns {} after the name fields, found {}",
                FIXED_COLUMNS.join(","),
                fixed.join(",")
            )));
        }
        let titles = NameFieldTitles::new(
            headers
                .iter()
                .take(ncells_idx)
                .map(str::to_string)
                .collect(),
        )
        .map_err(|err| SampleError::TableFormat(err.to_string()))?;

        let mut records = Vec::new();
        for row in rdr.records() {
            let row = row.map_err(table_format)?;
            let cell = |idx: usize| row.get(idx).unwrap_or_default().to_string();
            let library_id = cell(ncells_idx + 3);
            let agg_id = cell(ncells_idx + 6);
            records.push(SampleRecord {
                name_fields: (0..ncells_idx).map(cell).collect(),
                ncells: parse_ncells(&library_id, &cell(ncells_idx))?,
                batch: cell(ncells_idx + 1),
                file: Utf8PathBuf::from(cell(ncells_idx + 2)),
                sample_id: cell(ncells_idx + 4),
                molecule_h5: cell(ncells_idx + 5),
                agg_id: agg_id.parse().map_err(|_| {
                    SampleError::TableFormat(format!(
                        "invalid {AGG_ID_COLUMN} {agg_id:?} for {library_id}"
                    ))
                })?,
                library_id,
            });
        }

        Ok(Self { titles, records })
    }

    /// `library_id,molecule_h5` csv for `cellranger aggr`.
    pub fn write_aggr_csv<W: Write>(&self, writer: W) -> Result<(), SampleError> {
        let mut wtr = csv::Writer::from_writer(writer);
        for row in self.aggr_rows() {
            wtr.serialize(row).map_err(table_io)?;
        }
        if self.records.is_empty() {
            wtr.write_record([LIBRARY_ID_COLUMN, MOLECULE_H5_COLUMN])
                .map_err(table_io)?;
        }
        wtr.flush()
            .map_err(|err| SampleError::Filesystem(err.to_string()))
    }
}

pub fn molecule_h5_path(library_id: &str) -> String {
    format!("{library_id}-count/outs/molecule_info.h5")
}

pub fn ensure_unique_names(manifests: &[Manifest]) -> Result<(), SampleError> {
    let mut seen: HashMap<&str, &Utf8Path> = HashMap::new();
    for manifest in manifests {
        if let Some(first) = seen.insert(manifest.library_id(), &manifest.path) {
            return Err(SampleError::DuplicateSampleName {
                sample_name: manifest.library_id().to_string(),
                first: first.to_path_buf(),
                second: manifest.path.clone(),
            });
        }
    }
    Ok(())
}

fn table_io(err: csv::Error) -> SampleError {
    SampleError::Filesystem(err.to_string())
}

fn table_format(err: csv::Error) -> SampleError {
    SampleError::TableFormat(err.to_string())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::domain::ManifestName;

    fn options(sample_fields: Option<&str>) -> TableOptions {
        TableOptions::new(
            "donor,condition,replicate".parse().unwrap(),
            sample_fields.map(|fields| fields.split(',').map(str::to_string).collect()),
        )
        .unwrap()
    }

    fn manifest(basename: &str, opts: &TableOptions) -> Manifest {
        Manifest {
            path: Utf8PathBuf::from("data.dir").join(basename),
            name: ManifestName::parse(basename, &opts.name_field_titles).unwrap(),
            runs: vec!["/data/runA".to_string()],
        }
    }

    #[test]
    fn sample_id_from_configured_fields() {
        let opts = options(Some("donor,condition"));
        let manifests = vec![
            manifest("d1_stim_R1.1000.1.sample", &opts),
            manifest("d1_stim_R2.1000.2.sample", &opts),
            manifest("d2_ctrl_R1.1500.1.sample", &opts),
        ];

        let table = SampleTable::build(&manifests, &opts).unwrap();
        let ids = table
            .records()
            .iter()
            .map(|record| record.sample_id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(ids, vec!["d1_stim", "d1_stim", "d2_ctrl"]);
        assert_eq!(table.sample_ids(), vec!["d1_stim", "d2_ctrl"]);
    }

    #[test]
    fn sample_id_field_order_follows_config() {
        let opts = options(Some("replicate,donor"));
        let manifests = vec![manifest("d1_stim_R1.1000.1.sample", &opts)];
        let table = SampleTable::build(&manifests, &opts).unwrap();
        assert_eq!(table.records()[0].sample_id, "R1_d1");
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let opts = options(None);
        let manifests = vec![
            manifest("d1_stim_R1.1000.1.sample", &opts),
            manifest("d1_stim_R1.2000.2.sample", &opts),
        ];
        let err = SampleTable::build(&manifests, &opts).unwrap_err();
        assert_matches!(
            err,
            SampleError::DuplicateSampleName { sample_name, .. } if sample_name == "d1_stim_R1"
        );
    }

    #[test]
    fn read_rejects_missing_fixed_columns() {
        let text = "donor\tncells\tbatch\n d1\t100\t1\n";
        let err = SampleTable::read_tsv(text.as_bytes()).unwrap_err();
        assert_matches!(err, SampleError::TableFormat(_));
    }

    #[test]
    fn aggr_csv_lists_molecule_files() {
        let opts = options(None);
        let manifests = vec![
            manifest("d1_stim_R1.1000.1.sample", &opts),
            manifest("d2_ctrl_R1.1500.1.sample", &opts),
        ];
        let table = SampleTable::build(&manifests, &opts).unwrap();

        let mut buf = Vec::new();
        table.write_aggr_csv(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "library_id,molecule_h5\n\
             d1_stim_R1,d1_stim_R1-count/outs/molecule_info.h5\n\
             d2_ctrl_R1,d2_ctrl_R1-count/outs/molecule_info.h5\n"
        );
    }
}
