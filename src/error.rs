use thiserror::Error;

pub type PlanillaResult<T> = Result<T, PlanillaError>;

#[derive(Error, Debug)]
pub enum PlanillaError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Spreadsheet read error: {0}")]
    Excel(String),

    #[error("Spreadsheet write error: {0}")]
    Export(String),

    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Community not found: {0}")]
    UnresolvedCommunity(String),

    #[error("Template sheet not found: {0}")]
    MissingSheet(String),

    #[error("Unknown form variant: {0}")]
    UnknownVariant(String),

    #[error("Invalid cell address: {0}")]
    InvalidCell(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("PDF conversion failed: {0}")]
    Conversion(String),
}

impl PlanillaError {
    /// Columns named by a `MissingColumns` error, empty for every other kind.
    pub fn missing_columns(&self) -> &[String] {
        match self {
            PlanillaError::MissingColumns(columns) => columns,
            _ => &[],
        }
    }
}
