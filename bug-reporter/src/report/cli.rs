use crate::models::HelpMetadata;
use crate::shared::prelude::FoundConfig;
use crate::submit::prelude::{Delivery, IssueSubmitter, SubmitError, SubmitReceipt};
use anyhow::{Result, anyhow};
use clap::Args;
use inquire::InquireError;
use tracing::{error, info, warn};

#[derive(Debug, Args)]
pub struct SubmitArgs {
    /// Title of the issue. Prompted for when not set.
    #[arg(long, short = 't')]
    title: Option<String>,

    /// Longer description of the problem. Prompted for when not set.
    #[arg(long, short = 'd')]
    description: Option<String>,

    /// Name of the destination to submit to, required when more than one is configured.
    #[arg(long)]
    destination: Option<String>,

    /// Assign the issue to a user, can be used multiple times.
    #[arg(long = "assignee")]
    assignees: Vec<String>,

    /// Extra label for the issue, can be used multiple times. `bug` is always added.
    #[arg(long = "label")]
    labels: Vec<String>,
}

pub async fn submit_root(found_config: &FoundConfig, args: &SubmitArgs) -> Result<i32> {
    let destination = match found_config.select_destination(args.destination.as_deref()) {
        Ok(destination) => destination,
        Err(e) => {
            error!(target: "user", "{}", e);
            return Ok(2);
        }
    };

    let title = match &args.title {
        Some(title) => title.clone(),
        None => prompt_title()?,
    };
    let description = match &args.description {
        Some(description) => description.clone(),
        None => prompt_description()?,
    };

    let mut builder = found_config.report_builder(destination);
    builder.title(title).body(description);
    for assignee in &args.assignees {
        builder.assignee(assignee.as_str());
    }
    for label in &args.labels {
        builder.label(label.as_str());
    }
    let report = builder.bug_label().build()?;

    let config = found_config.destination_config(destination);
    let submitter = match IssueSubmitter::new(&config) {
        Ok(submitter) => submitter,
        Err(e) => {
            error!(target: "user", "Unable to submit bug report to {}. {}", destination.name(), e);
            return Ok(1);
        }
    };

    info!(target: "progress", "Submitting bug report to {}", destination.name());
    match submitter.spawn(report).await {
        Ok(receipt) => {
            report_success(&receipt);
            Ok(0)
        }
        Err(e) => {
            error!(target: "user", "Unable to submit bug report to {}. {}", destination.name(), e);
            match &e {
                SubmitError::HttpStatus { body, .. } if !body.trim().is_empty() => {
                    warn!(target: "user", "Response from {}: {}", destination.name(), body.trim());
                }
                _ if e.delivery() == Delivery::Failed => {
                    warn!(target: "user", "The report may or may not have reached the tracker, check before submitting again");
                }
                _ => {}
            }
            Ok(1)
        }
    }
}

fn report_success(receipt: &SubmitReceipt) {
    match &receipt.issue_url {
        Some(url) => info!(target: "always", "Bug report created at {}", url),
        None => {
            info!(target: "always", "Bug report was accepted by the {}", receipt.backend)
        }
    }
}

fn prompt_title() -> Result<String> {
    tracing_indicatif::suspend_tracing_indicatif(|| {
        inquire::Text::new("Bug report title:")
            .with_help_message("A short summary of the problem")
            .prompt()
    })
    .map_err(|e| match e {
        InquireError::NotTTY => {
            anyhow!("A title is required, pass --title when the input device is not a TTY")
        }
        e => anyhow!("Unable to read a title. {}", e),
    })
}

fn prompt_description() -> Result<String> {
    let answer = tracing_indicatif::suspend_tracing_indicatif(|| {
        inquire::Editor::new("Bug report description:")
            .with_help_message("What happened, and what you expected to happen")
            .prompt()
    });

    match answer {
        Ok(description) => Ok(description),
        Err(InquireError::NotTTY) => {
            warn!(target: "user", "Prompting user, but input device is not a TTY. Submitting without a description.");
            Ok(String::new())
        }
        Err(e) => Err(anyhow!("Unable to read a description. {}", e)),
    }
}
