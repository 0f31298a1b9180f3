use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unable to process file. {error:?}")]
    IoError {
        #[from]
        error: std::io::Error,
    },
    #[error("No destination named '{name}' was found. Known destinations: {known}")]
    DestinationNotFound { name: String, known: String },
    #[error("More than one destination is configured, pick one with --destination. Known destinations: {known}")]
    AmbiguousDestination { known: String },
    #[error(
        "No destination is configured. Add a BugReportDestination to a .bug-report directory, or set BUG_REPORT_RELAY_URL or BUG_REPORT_GITHUB_TOKEN"
    )]
    NoDestination,
}
