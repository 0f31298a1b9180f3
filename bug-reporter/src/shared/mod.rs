use colored::Colorize;

use crate::models::HelpMetadata;
use std::cmp::max;
use std::path::Path;
use tracing::info;

mod config_load;
mod destination;
mod logging;

pub const RUN_ID_ENV_VAR: &str = "BUG_REPORT_RUN_ID";

pub mod prelude {
    pub use super::config_load::{
        CONFIG_DIR_NAME, ConfigOptions, ConfigOverrides, FoundConfig, build_config_path,
    };
    pub use super::destination::{Destination, DestinationBackend, ENV_DESTINATION_NAME};
    pub use super::logging::{
        LOG_DIR, LoggingOpts, LoggingProgress, submission_spinner,
    };
    pub use super::print_details;
    pub use super::RUN_ID_ENV_VAR;
}

pub fn print_details<T>(working_dir: &Path, config: &[&T])
where
    T: HelpMetadata,
{
    let max_name_length = config
        .iter()
        .map(|x| x.full_name().len())
        .max()
        .unwrap_or(20);
    let max_name_length = max(max_name_length, 20) + 2;

    info!(target: "user", "  {:max_name_length$}{:60}{}", "Name".white().bold(), "Description".white().bold(), "Path".white().bold());
    for resource in config {
        let mut description = resource.description().to_string();
        if description.chars().count() > 55 {
            description = format!("{}...", description.chars().take(55).collect::<String>());
        }

        let mut loc = resource.metadata().file_path();
        let diff_path = pathdiff::diff_paths(&loc, working_dir);
        if let Some(diff) = diff_path {
            loc = diff.display().to_string();
        } else if loc.len() > 35 {
            loc = format!("...{}", loc.split_off(loc.len() - 35));
        }

        info!(target: "user", "- {:max_name_length$}{:60}{}", resource.full_name(), description, loc);
    }
}

#[cfg(test)]
pub(crate) fn parse_destinations_from_string(
    file_path: &Path,
    input: &str,
) -> anyhow::Result<Vec<prelude::Destination>> {
    use serde_yaml::Deserializer;

    let mut destinations = Vec::new();
    for doc in Deserializer::from_str(input) {
        if let Some(parsed_model) = config_load::parse_model(doc, file_path) {
            destinations.push(parsed_model.try_into()?)
        }
    }

    Ok(destinations)
}
