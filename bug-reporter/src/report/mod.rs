mod cli;
mod error;

pub mod prelude {
    pub use super::cli::{SubmitArgs, submit_root};
    pub use super::error::ConfigError;
}
