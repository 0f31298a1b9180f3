use std::error::Error as StdError;
use thiserror::Error;

pub type BoxError = Box<dyn StdError + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum TransportFailure {
    #[strum(serialize = "timed out")]
    Timeout,
    #[strum(serialize = "could not connect")]
    Connect,
    #[strum(serialize = "was cancelled")]
    Cancelled,
    #[strum(serialize = "failed")]
    Other,
}

/// How far a failed submission got.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Refused locally, nothing went over the network.
    NotSent,
    /// A request was attempted but the network gave out.
    Failed,
    /// The backend answered and said no.
    Rejected,
}

#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("Bug report destination is not configured correctly. {0}")]
    Configuration(String),
    #[error("Unable to encode bug report. {0}")]
    Encoding(String),
    #[error("Request {kind}. {source}")]
    Transport {
        kind: TransportFailure,
        #[source]
        source: BoxError,
    },
    #[error("Backend responded with status {status}")]
    HttpStatus { status: u16, body: String },
}

impl SubmitError {
    pub fn delivery(&self) -> Delivery {
        match self {
            SubmitError::Configuration(_) | SubmitError::Encoding(_) => Delivery::NotSent,
            SubmitError::Transport { .. } => Delivery::Failed,
            SubmitError::HttpStatus { .. } => Delivery::Rejected,
        }
    }

    pub(crate) fn transport(kind: TransportFailure, source: impl Into<BoxError>) -> Self {
        SubmitError::Transport {
            kind,
            source: source.into(),
        }
    }

    /// Wrap an error from an HTTP stack that doesn't say what went wrong in a structured way.
    pub(crate) fn from_transport_chain(source: impl Into<BoxError>) -> Self {
        let source = source.into();
        let kind = classify_chain(source.as_ref());
        SubmitError::Transport { kind, source }
    }
}

pub(crate) fn classify_chain(error: &(dyn StdError + 'static)) -> TransportFailure {
    let mut current = Some(error);
    while let Some(err) = current {
        if let Some(io) = err.downcast_ref::<std::io::Error>() {
            match io.kind() {
                std::io::ErrorKind::TimedOut => return TransportFailure::Timeout,
                std::io::ErrorKind::ConnectionRefused
                | std::io::ErrorKind::ConnectionReset
                | std::io::ErrorKind::ConnectionAborted
                | std::io::ErrorKind::NotConnected
                | std::io::ErrorKind::AddrNotAvailable => return TransportFailure::Connect,
                _ => {}
            }
        }
        let message = err.to_string().to_lowercase();
        if message.contains("timed out") || message.contains("timeout") {
            return TransportFailure::Timeout;
        }
        if message.contains("connect") || message.contains("dns") {
            return TransportFailure::Connect;
        }
        current = err.source();
    }

    TransportFailure::Other
}
