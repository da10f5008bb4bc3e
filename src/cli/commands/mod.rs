//! CLI command implementations
//!
//! Each command is implemented in its own submodule.

pub mod build;
pub mod cdb;
pub mod init;

use anyhow::Result;
use clap::Subcommand;

use crate::core::triple::TargetTriple;
use crate::error::EnvironmentError;

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the project into a standalone executable
    Build {
        /// Target triple (defaults to the host)
        #[arg(short, long)]
        target: Option<String>,
    },

    /// Initialize a new yaje project
    Init {
        /// Overwrite an existing manifest
        #[arg(short, long)]
        force: bool,
    },

    /// Generate a compile_commands.json for native modules
    Cdb {
        /// Target triple (defaults to the host)
        #[arg(short, long)]
        target: Option<String>,

        /// Output path (defaults to ./compile_commands.json)
        #[arg(short, long)]
        output: Option<String>,
    },
}

impl Commands {
    /// Execute the command
    pub async fn run(self) -> Result<()> {
        let current_dir = std::env::current_dir()?;
        match self {
            Self::Build { target } => {
                let target = resolve_target(target)?;
                build::execute(&current_dir, &target).await
            }
            Self::Init { force } => init::execute(&current_dir, force).await,
            Self::Cdb { target, output } => {
                let target = resolve_target(target)?;
                cdb::execute(&current_dir, &target, output).await
            }
        }
    }
}

/// Parse an explicit target triple, or fall back to the host
fn resolve_target(value: Option<String>) -> Result<TargetTriple> {
    match value {
        Some(value) => TargetTriple::parse(&value)
            .ok_or_else(|| EnvironmentError::UnparseableTriple { value }.into()),
        None => Ok(TargetTriple::host()),
    }
}
