use crate::models::HelpMetadata;
use crate::models::prelude::ModelRoot;
use crate::report::prelude::ConfigError;
use crate::shared::RUN_ID_ENV_VAR;
use crate::shared::destination::Destination;
use crate::submit::prelude::{BugReportBuilder, DestinationConfig};
use anyhow::{Result, anyhow};
use clap::{ArgGroup, Parser};
use colored::*;
use directories::{BaseDirs, UserDirs};
use itertools::Itertools;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_yaml::{Deserializer, Value};

use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, warn};

pub const CONFIG_DIR_NAME: &str = ".bug-report";

#[derive(Parser, Debug)]
#[clap(group = ArgGroup::new("config"))]
pub struct ConfigOptions {
    /// Add a paths to search for configuration. By default, `bug-report` will search up
    /// for `.bug-report` directories and attempt to load `.yml` and `.yaml` files for config.
    /// If the config directory is somewhere else, specifying this option will _add_
    /// the paths/files to the loaded config.
    #[clap(long, env = "BUG_REPORT_CONFIG_DIR", global(true))]
    extra_config: Vec<String>,

    /// When set, default config files will not be loaded and only specified config will be loaded.
    #[arg(
        long,
        env = "BUG_REPORT_DISABLE_DEFAULT_CONFIG",
        default_value = "false",
        global(true)
    )]
    disable_default_config: bool,

    /// Override the working directory
    #[arg(long, short = 'C', global(true))]
    working_dir: Option<String>,

    /// When outputting logs, or other files, the run-id is the unique value that will define where these go.
    /// In the case that the run-id is re-used, the old values will be overwritten.
    #[arg(long, global(true), env = RUN_ID_ENV_VAR)]
    run_id: Option<String>,

    /// Token used to call the GitHub API directly. Relays don't need one.
    #[arg(long, global(true), env = "BUG_REPORT_GITHUB_TOKEN", hide_env_values = true)]
    github_token: Option<String>,

    /// Override the repository owner of the selected destination.
    #[arg(long, global(true), env = "BUG_REPORT_GITHUB_OWNER")]
    owner: Option<String>,

    /// Override the repository name of the selected destination.
    #[arg(long, global(true), env = "BUG_REPORT_GITHUB_REPO")]
    repo: Option<String>,

    /// Relay used when no destination is configured.
    #[arg(long, global(true), env = "BUG_REPORT_RELAY_URL")]
    relay_url: Option<String>,
}

impl ConfigOptions {
    pub fn generate_run_id() -> String {
        let id = nanoid::nanoid!(4, &nanoid::alphabet::SAFE);
        let now = chrono::Local::now();
        let current_time = now.format("%Y%m%d");
        format!("{}-{}", current_time, id)
    }

    pub fn get_run_id(&self) -> String {
        self.run_id.clone().unwrap_or_else(Self::generate_run_id)
    }

    pub async fn load_config(&self) -> Result<FoundConfig> {
        let current_dir = std::env::current_dir();
        let working_dir = match (current_dir, &self.working_dir) {
            (Ok(cwd), None) => cwd,
            (_, Some(dir)) => PathBuf::from(&dir),
            _ => {
                error!(target: "user", "Unable to get a working dir");
                return Err(anyhow!("Unable to get a working dir"));
            }
        };

        let config_path = self.find_config_paths(&working_dir)?;
        let found_config = FoundConfig::new(self, working_dir, config_path).await;

        debug!("Loaded config {:?}", found_config);

        Ok(found_config)
    }

    fn find_config_paths(&self, working_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
        let mut config_paths = Vec::new();

        if !self.disable_default_config {
            for config_dir in build_config_path(working_dir)? {
                debug!("Checking if {} exists", config_dir.display().to_string());
                if config_dir.exists() {
                    config_paths.push(config_dir)
                }
            }
        }

        for extra_config in &self.extra_config {
            let config_dir = Path::new(&extra_config);
            debug!("Checking if {} exists", config_dir.display().to_string());
            if config_dir.exists() {
                config_paths.push(config_dir.to_path_buf())
            }
        }

        Ok(config_paths)
    }

    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            github_token: non_blank(&self.github_token).map(SecretString::from),
            owner: non_blank(&self.owner),
            repo: non_blank(&self.repo),
            relay_url: non_blank(&self.relay_url),
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Values from flags and the environment that apply on top of the loaded destinations.
#[derive(Debug, Default)]
pub struct ConfigOverrides {
    pub github_token: Option<SecretString>,
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub relay_url: Option<String>,
}

#[derive(Debug)]
pub struct FoundConfig {
    pub working_dir: PathBuf,
    pub raw_config: Vec<ModelRoot<Value>>,
    pub destinations: BTreeMap<String, Destination>,
    pub config_path: Vec<PathBuf>,
    pub run_id: String,
    pub overrides: ConfigOverrides,
}

impl FoundConfig {
    pub async fn new(
        config_options: &ConfigOptions,
        working_dir: PathBuf,
        config_path: Vec<PathBuf>,
    ) -> Self {
        let mut raw_config = load_all_config(&config_path).await;
        raw_config.sort_by_key(|x| x.full_name());

        let mut this = Self {
            working_dir,
            raw_config: raw_config.clone(),
            destinations: BTreeMap::new(),
            config_path,
            run_id: config_options.get_run_id(),
            overrides: config_options.overrides(),
        };

        for raw_config in raw_config {
            match Destination::try_from(raw_config) {
                Ok(destination) => insert_if_absent(&mut this.destinations, destination),
                Err(e) => debug!("Skipping resource. {}", e),
            }
        }

        this.add_env_destination();
        this
    }

    /// Without any configured destination, fall back to one assembled from the environment. It
    /// is only created when there is a way to reach a tracker, a relay url or a token.
    fn add_env_destination(&mut self) {
        if !self.destinations.is_empty() {
            return;
        }

        if self.overrides.relay_url.is_none() && self.overrides.github_token.is_none() {
            return;
        }

        let destination = Destination::from_env(
            self.overrides.owner.as_deref(),
            self.overrides.repo.as_deref(),
            self.overrides.relay_url.as_deref(),
        );
        debug!("Using destination from the environment {:?}", destination);
        self.destinations
            .insert(destination.name().to_string(), destination);
    }

    /// Pick the destination to submit to. Without a name, a single configured destination is
    /// used.
    pub fn select_destination(&self, name: Option<&str>) -> Result<&Destination, ConfigError> {
        match name {
            Some(name) => {
                self.destinations
                    .get(name)
                    .ok_or_else(|| ConfigError::DestinationNotFound {
                        name: name.to_string(),
                        known: self.known_destinations(),
                    })
            }
            None => match self.destinations.len() {
                0 => Err(ConfigError::NoDestination),
                1 => self
                    .destinations
                    .values()
                    .next()
                    .ok_or(ConfigError::NoDestination),
                _ => Err(ConfigError::AmbiguousDestination {
                    known: self.known_destinations(),
                }),
            },
        }
    }

    fn known_destinations(&self) -> String {
        if self.destinations.is_empty() {
            "none".to_string()
        } else {
            self.destinations.keys().join(", ")
        }
    }

    /// Submitter config for `destination`, with the GitHub token attached when one is known.
    pub fn destination_config(&self, destination: &Destination) -> DestinationConfig {
        let config = destination.destination_config();
        match &self.overrides.github_token {
            Some(token) => config.with_token(token.expose_secret()),
            None => config,
        }
    }

    /// A report builder preloaded with the destination's repository, labels and assignees.
    /// `--owner` and `--repo` win over the destination values.
    pub fn report_builder(&self, destination: &Destination) -> BugReportBuilder {
        let mut builder = BugReportBuilder::default();
        builder
            .owner(
                self.overrides
                    .owner
                    .clone()
                    .unwrap_or_else(|| destination.owner.clone()),
            )
            .repo(
                self.overrides
                    .repo
                    .clone()
                    .unwrap_or_else(|| destination.repo.clone()),
            )
            .labels(destination.labels.clone())
            .assignees(destination.assignees.clone());

        builder
    }
}

fn insert_if_absent<T: HelpMetadata>(map: &mut BTreeMap<String, T>, entry: T) {
    let name = entry.name().to_string();
    if map.contains_key(&name) {
        warn!(target: "user", "Duplicate {} found, dropping {} in {}", entry.full_name().to_string().bold(), entry.name().bold(), entry.metadata().file_path());
    } else {
        map.insert(name.to_string(), entry);
    }
}

async fn load_all_config(paths: &Vec<PathBuf>) -> Vec<ModelRoot<Value>> {
    let mut loaded_values = Vec::new();

    for file_path in expand_to_files(paths) {
        let file_contents = match fs::read_to_string(&file_path) {
            Err(e) => {
                warn!(target: "user", "Unable to read file {} because {}", file_path.display().to_string(), e);
                continue;
            }
            Ok(content) => content,
        };
        for doc in Deserializer::from_str(&file_contents) {
            if let Some(parsed_model) = parse_model(doc, &file_path) {
                loaded_values.push(parsed_model)
            }
        }
    }

    loaded_values
}

pub(crate) fn parse_model(doc: Deserializer, file_path: &Path) -> Option<ModelRoot<Value>> {
    let value = match Value::deserialize(doc) {
        Ok(value) => value,
        Err(e) => {
            warn!(target: "user", "Unable to load document from {} because {}", file_path.display(), e);
            return None;
        }
    };

    match serde_yaml::from_value::<ModelRoot<Value>>(value) {
        Ok(mut value) => {
            value.metadata.file_path = Some(file_path.display().to_string());
            Some(value)
        }
        Err(e) => {
            warn!(target: "user", "Unable to parse model from {} because {}", file_path.display(), e);
            None
        }
    }
}

fn expand_to_files(paths: &Vec<PathBuf>) -> Vec<PathBuf> {
    let mut config_files = Vec::new();
    for path in paths {
        let expanded_paths = expand_path(path).unwrap_or_else(|e| {
            warn!(target: "user", "Unable to access filesystem because {}", e);
            Vec::new()
        });
        config_files.extend(expanded_paths);
    }

    config_files
}

fn expand_path(path: &Path) -> Result<Vec<PathBuf>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    if path.is_dir() {
        let mut files = Vec::new();
        for dir_entry in fs::read_dir(path)?.flatten() {
            if !dir_entry.path().is_file() {
                continue;
            }

            let file_path = dir_entry.path();
            let extension = file_path.extension();
            if extension == Some(OsStr::new("yaml")) || extension == Some(OsStr::new("yml")) {
                debug!(target: "user", "Found file {:?}", file_path);
                files.push(file_path);
            }
        }
        files.sort();

        return Ok(files);
    }

    warn!("Unknown file type {}", path.display().to_string());
    Ok(Vec::new())
}

/// Every `.bug-report` directory that may hold config, closest to `working_dir` first.
pub fn build_config_path(working_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let mut config_path = Vec::new();

    let working_dir = fs::canonicalize(working_dir)?;
    for search_dir in working_dir.ancestors() {
        config_path.push(search_dir.join(CONFIG_DIR_NAME))
    }

    if let Some(user_dirs) = UserDirs::new() {
        config_path.push(user_dirs.home_dir().join(CONFIG_DIR_NAME));
    }

    if let Some(base_dirs) = BaseDirs::new() {
        config_path.push(base_dirs.config_dir().join(CONFIG_DIR_NAME));
    }

    Ok(config_path)
}
