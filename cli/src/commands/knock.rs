//! Knock command - run a knock sequence.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use knocker_core::{parse_inline_targets, KeySource, KnockReport, PortKnocker};

/// Flags relevant to a knock run.
pub struct KnockArgs {
    pub config: Option<PathBuf>,
    pub key: Option<PathBuf>,
    pub targets: Option<String>,
    pub delay: String,
    pub wait_connection: bool,
    pub json: bool,
}

pub async fn run(args: KnockArgs) -> Result<()> {
    let knocker = PortKnocker::new();

    let report = match (args.config, args.targets) {
        (Some(_), Some(_)) => {
            bail!("--config and --targets cannot be used together")
        }
        (None, None) => {
            bail!("either a configuration file (-c) or inline targets (-t) is required")
        }
        (None, Some(targets)) => {
            let config = parse_inline_targets(&targets, &args.delay)
                .context("Failed to parse inline targets")?;
            knocker.execute_config(&config, args.wait_connection).await?
        }
        (Some(path), None) => {
            let key_source = KeySource::from_key_file(args.key);
            knocker
                .execute(&path, key_source, args.wait_connection)
                .await
                .with_context(|| format!("Knocking from {} failed", path.display()))?
        }
    };

    print_report(&report, args.json)
}

fn print_report(report: &KnockReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!("Port knocking completed: {}", report);
    Ok(())
}
