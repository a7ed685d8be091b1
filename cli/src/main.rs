//! Port Knocker CLI - Send port knocking sequences
//!
//! A command-line tool for knocking ports from a (possibly encrypted)
//! configuration file or inline targets, and for encrypting and decrypting
//! configuration files.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "port-knocker")]
#[command(author, version, about = "Send TCP/UDP port knocking sequences")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to the configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the encryption key file (default: $PORT_KNOCKER_KEY)
    #[arg(short, long, global = true)]
    key: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Wait for each connection to be established; abort on the first failure
    #[arg(short, long, global = true)]
    wait_connection: bool,

    /// Inline targets: [proto]:[host]:[port];[proto]:[host]:[port]
    #[arg(short, long, global = true)]
    targets: Option<String>,

    /// Delay between inline knocks
    #[arg(short, long, global = true, default_value = "1s")]
    delay: String,

    /// Print the run report as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt a configuration file
    #[command(alias = "enc")]
    Encrypt {
        /// Input file (default: --config)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output encrypted file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Decrypt an encrypted configuration file into plain YAML
    #[command(alias = "dec")]
    Decrypt {
        /// Input encrypted file (default: --config)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output YAML file
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Some(Commands::Encrypt { input, output }) => {
            let input = commands::input_path(input, cli.config)?;
            commands::encrypt::run(&input, &output, cli.key).await?;
        }
        Some(Commands::Decrypt { input, output }) => {
            let input = commands::input_path(input, cli.config)?;
            commands::decrypt::run(&input, &output, cli.key).await?;
        }
        None => {
            let args = commands::knock::KnockArgs {
                config: cli.config,
                key: cli.key,
                targets: cli.targets,
                delay: cli.delay,
                wait_connection: cli.wait_connection,
                json: cli.json,
            };
            commands::knock::run(args).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_reach_subcommands() {
        let cli = Cli::parse_from([
            "port-knocker",
            "encrypt",
            "-c",
            "knock.yaml",
            "-k",
            "knock.key",
            "-o",
            "knock.enc",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("knock.yaml")));
        assert_eq!(cli.key, Some(PathBuf::from("knock.key")));
        assert!(matches!(
            cli.command,
            Some(Commands::Encrypt { input: None, ref output }) if output == &PathBuf::from("knock.enc")
        ));
    }

    #[test]
    fn test_knock_flags() {
        let cli = Cli::parse_from(["port-knocker", "-t", "tcp:10.0.0.1:80", "-w"]);
        assert!(cli.command.is_none());
        assert!(cli.wait_connection);
        assert_eq!(cli.delay, "1s");
        assert_eq!(cli.targets.as_deref(), Some("tcp:10.0.0.1:80"));
    }
}
