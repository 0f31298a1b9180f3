use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

mod destination;

pub mod prelude {
    pub use super::V1AlphaApiVersion;
    pub use super::destination::*;
}

#[derive(Serialize, Deserialize, Debug, strum::Display, Clone, PartialEq, JsonSchema)]
pub enum V1AlphaApiVersion {
    /// Current version
    #[serde(rename = "bug-reporter.dev/v1alpha")]
    #[strum(serialize = "bug-reporter.dev/v1alpha")]
    V1Alpha,
}
