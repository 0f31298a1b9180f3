use anyhow::Context;
use clap::{ArgGroup, Parser, ValueEnum};
use indicatif::ProgressStyle;
use std::fs::File;
use std::io::IsTerminal;

use tracing::Level;
use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_indicatif::IndicatifLayer;
use tracing_indicatif::filter::{IndicatifFilter, hide_indicatif_span_fields};
use tracing_subscriber::fmt::format::DefaultFields;
use tracing_subscriber::{
    Registry,
    fmt::format::{Format, PrettyFields},
    layer::SubscriberExt,
};
use tracing_subscriber::{filter::filter_fn, prelude::*};

pub const LOG_DIR: &str = "/tmp/bug-report";

/// Spinner shown while a bug report is in flight. Submissions have no position to report.
pub fn submission_spinner() -> ProgressStyle {
    ProgressStyle::with_template(
        "{span_child_prefix} {spinner:.green} {wide_msg} [{elapsed_precise}]",
    )
    .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

#[derive(Parser, Debug)]
#[clap(group = ArgGroup::new("logging"))]
pub struct LoggingOpts {
    /// A level of verbosity, and can be used multiple times
    #[arg(short, long, action = clap::ArgAction::Count, global(true))]
    pub verbose: u8,

    #[arg(
        long,
        global(true),
        default_value = "auto",
        env = "BUG_REPORT_OUTPUT_PROGRESS"
    )]
    /// Set the progress output. Use plain to disable the spinner.
    pub progress: LoggingProgress,
}

#[derive(ValueEnum, Debug, Copy, Clone, PartialEq)]
pub enum LoggingProgress {
    /// Determine output format based on execution context
    Auto,
    /// Standard output, no spinner, progress is printed as lines.
    Plain,
    /// Use a spinner
    Tty,
}

impl LoggingProgress {
    fn is_tty(&self) -> bool {
        match self {
            LoggingProgress::Auto => std::io::stdout().is_terminal(),
            LoggingProgress::Plain => false,
            LoggingProgress::Tty => true,
        }
    }
}

/// Console routing by event target:
///
/// - `user` honours the verbosity flags.
/// - `always` is printed no matter what.
/// - `progress` is printed only when there is no spinner to show it.
///
/// Everything else only goes to the log file.
fn shows_on_console(
    target: &str,
    level: &Level,
    level_filter: LevelFilter,
    is_tty_output: bool,
) -> bool {
    match target {
        "user" => level_filter >= *level,
        "always" => true,
        "progress" => !is_tty_output,
        _ => false,
    }
}

fn log_file_name(run_id: &str, prefix: &str) -> String {
    format!("{}/bug-report-{}-{}.log", LOG_DIR, prefix, run_id)
}

fn log_file_writer(run_id: &str, prefix: &str) -> anyhow::Result<(NonBlocking, WorkerGuard, String)> {
    let file_name = log_file_name(run_id, prefix);
    std::fs::create_dir_all(LOG_DIR)
        .with_context(|| format!("Unable to create log dir {}", LOG_DIR))?;
    let log_file = File::create(&file_name)
        .with_context(|| format!("Unable to create log file {}", file_name))?;

    let (writer, guard) = tracing_appender::non_blocking(strip_ansi_escapes::Writer::new(log_file));
    Ok((writer, guard, file_name))
}

impl LoggingOpts {
    pub fn to_level_filter(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::INFO,
            1 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }

    /// Install the global subscriber. Returns the guard that flushes the log file on drop, and
    /// the path of that file.
    pub fn configure_logging(
        &self,
        run_id: &str,
        prefix: &str,
    ) -> anyhow::Result<(WorkerGuard, String)> {
        let (file_writer, guard, file_name) = log_file_writer(run_id, prefix)?;
        let file_output = tracing_subscriber::fmt::layer()
            .event_format(Format::default().pretty())
            .with_ansi(false)
            .with_writer(file_writer);

        let indicatif_layer = IndicatifLayer::new()
            .with_span_field_formatter(hide_indicatif_span_fields(DefaultFields::new()))
            .with_progress_style(submission_spinner());

        let is_tty_output = self.progress.is_tty();
        let level_filter = self.to_level_filter();
        let console_output = tracing_subscriber::fmt::layer()
            .event_format(
                Format::default()
                    .with_target(false)
                    .without_time()
                    .compact(),
            )
            .with_writer(indicatif_layer.get_stdout_writer())
            .fmt_fields(PrettyFields::new())
            .with_filter(filter_fn(move |metadata| {
                shows_on_console(metadata.target(), metadata.level(), level_filter, is_tty_output)
            }));

        let spinner_layer =
            is_tty_output.then(|| indicatif_layer.with_filter(IndicatifFilter::new(false)));

        let subscriber = Registry::default()
            .with(console_output)
            .with(spinner_layer)
            .with(file_output);

        tracing::subscriber::set_global_default(subscriber)
            .context("Setting default subscriber failed")?;

        Ok((guard, file_name))
    }
}
