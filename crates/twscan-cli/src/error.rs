use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Catalog(#[from] twscan_core::CatalogError),

    #[error(transparent)]
    Validation(#[from] twscan_core::ValidationError),

    #[error("command error: {0}")]
    Command(String),

    #[error(transparent)]
    Report(#[from] twscan_core::ReportError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Catalog(_) => 1,
            Self::Validation(_) | Self::Command(_) => 2,
            Self::Report(_) | Self::Io(_) => 10,
        }
    }
}
