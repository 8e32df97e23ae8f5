use camino::Utf8PathBuf;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum SampleError {
    #[error("no sample manifests (*.sample) found in {0}")]
    #[diagnostic(help("add one <name_fields>.<ncells>.<batch>.sample file per library"))]
    NoInput(Utf8PathBuf),

    #[error("{basename} does not have the expected number of dot-separated sections")]
    #[diagnostic(help("expected format is {expected}, e.g. donor1_stim_R1.2000.1.sample"))]
    MalformedManifestName { basename: String, expected: String },

    #[error("{sample_name} has {found} name fields, expected {expected} ({titles})")]
    #[diagnostic(help("name fields must be separated with underscores"))]
    FieldCountMismatch {
        sample_name: String,
        found: usize,
        expected: usize,
        titles: String,
    },

    #[error("{basename} has an empty {title} name field")]
    EmptyNameField { basename: String, title: String },

    #[error("sample name {0} contains the reserved token \"sample_id\"")]
    ReservedName(String),

    #[error("sample name {sample_name} is produced by both {first} and {second}")]
    DuplicateSampleName {
        sample_name: String,
        first: Utf8PathBuf,
        second: Utf8PathBuf,
    },

    #[error("manifest {0} does not list any run paths")]
    EmptyManifest(Utf8PathBuf),

    #[error("invalid expected cell count {value:?} in {basename}")]
    #[diagnostic(help("ncells must be a positive integer"))]
    InvalidCellCount { basename: String, value: String },

    #[error("missing config file tenx-samples.json in current directory")]
    #[diagnostic(help("pass --config or --name-fields"))]
    MissingConfig,

    #[error("failed to read config file at {0}")]
    ConfigRead(Utf8PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("sample field {0} is not one of the name field titles")]
    UnknownSampleField(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),

    #[error("malformed sample table: {0}")]
    TableFormat(String),
}

impl SampleError {
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            SampleError::NoInput(_)
                | SampleError::MalformedManifestName { .. }
                | SampleError::FieldCountMismatch { .. }
                | SampleError::EmptyNameField { .. }
                | SampleError::ReservedName(_)
                | SampleError::DuplicateSampleName { .. }
                | SampleError::EmptyManifest(_)
                | SampleError::InvalidCellCount { .. }
        )
    }

    pub fn is_config(&self) -> bool {
        matches!(
            self,
            SampleError::MissingConfig
                | SampleError::ConfigRead(_)
                | SampleError::ConfigParse(_)
                | SampleError::InvalidConfig(_)
                | SampleError::UnknownSampleField(_)
        )
    }
}
