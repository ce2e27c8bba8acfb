use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use crate::client::{AccountClient, ProjectClient};
use crate::config::ProvisionConfig;
use crate::provision::{failure_message, provision, BuildEnv};
use crate::schema::ChangedFiles;

/// CLI for cms-provision: ensure the CMS side of a static-site build exists.
#[derive(Parser)]
#[clap(
    name = "cms-provision",
    version,
    about = "Provision a headless CMS project, content pattern and API keys for a static-site build"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ensure the project, schema and API keys exist, then publish connection details
    Ensure {
        /// IANA timezone assigned to the project if it is created in this run
        #[clap(long)]
        timezone: Option<String>,

        /// A file the build system reports as modified in this build (repeatable);
        /// gates the schema push
        #[clap(long = "modified", value_name = "PATH")]
        modified: Vec<PathBuf>,

        /// File to append KEY=value pairs to; printed to stdout when omitted
        #[clap(long, value_name = "FILE")]
        env_file: Option<PathBuf>,
    },
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Ensure {
            timezone,
            modified,
            env_file,
        } => {
            // Configuration problems must fail the build before any network
            // call is attempted.
            let mut config = ProvisionConfig::from_env()?;
            if let Some(timezone) = timezone {
                config.timezone = timezone;
            }
            let changed = ChangedFiles::new(modified);

            let account = AccountClient::new(&config);
            println!("Provisioning starting...");
            match provision(&config, &changed, &account, |id| {
                ProjectClient::new(&config, id)
            })
            .await
            {
                Ok(env) => {
                    publish(&env, env_file.as_deref())?;
                    println!("Provisioning complete.");
                    Ok(())
                }
                Err(e) => Err(anyhow::Error::msg(failure_message(&config, &e))),
            }
        }
    }
}

/// Publishes the connection details into the build-environment mapping:
/// appended to `env_file` when given, printed to stdout otherwise.
fn publish(env: &BuildEnv, env_file: Option<&Path>) -> Result<()> {
    match env_file {
        Some(path) => {
            let mut file = OpenOptions::new().create(true).append(true).open(path)?;
            for line in env.lines() {
                writeln!(file, "{line}")?;
            }
            info!(env_file = %path.display(), "Published build environment");
        }
        None => {
            for line in env.lines() {
                println!("{line}");
            }
        }
    }
    Ok(())
}
