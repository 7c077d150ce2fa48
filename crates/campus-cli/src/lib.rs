pub mod commands;

mod clierror;
pub use clierror::*;

use std::net::IpAddr;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(version, about = "Content backend for the university website", long_about = None)]
pub struct Cli {
    #[arg(long = "log-level", default_value = "INFO", global = true)]
    pub loglevel: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Starts the HTTP API.
    Serve {
        /// Address to listen on. Overrides the configuration.
        #[clap(short = 'I', long)]
        interface: Option<IpAddr>,

        /// Port to listen on. Overrides `PORT` and the configuration.
        #[clap(short = 'P', long)]
        port: Option<u16>,
    },
    /// Inserts demo faculties, programs and news into empty collections.
    Seed {
        /// Run the emptiness checks without inserting anything.
        #[arg(long, default_value = "false")]
        no_samples: bool,
    },
    /// Writes a configuration template to `configuration/config.yml`.
    Init,
}
