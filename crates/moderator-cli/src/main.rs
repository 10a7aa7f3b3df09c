mod bootstrap_helpers;
mod cli_args;
mod moderation_run;

use anyhow::{bail, Result};
use clap::Parser;
use moderator_runtime::EnvInputProvider;

use crate::bootstrap_helpers::init_tracing;
use crate::cli_args::Cli;
use crate::moderation_run::{render_failure_annotations, run_cli_with_inputs};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let report = run_cli_with_inputs(&cli, &EnvInputProvider).await?;
    let annotations = render_failure_annotations(&report);
    if annotations.is_empty() {
        return Ok(());
    }
    for annotation in &annotations {
        println!("{annotation}");
    }
    bail!("{} moderation check(s) failed", annotations.len());
}
