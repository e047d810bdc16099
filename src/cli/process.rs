//! One-shot file processing from the command line.

use anyhow::{bail, Result};
use tracing::info;

use crate::app::build_orchestrator;
use crate::config::Config;
use crate::presenter::{self, ViewState};
use crate::share::{self, ClipboardService, SHARE_CAP};

use super::ProcessArgs;

pub async fn handle_process_command(args: ProcessArgs) -> Result<()> {
    if !args.file.exists() {
        bail!("audio file not found: {}", args.file.display());
    }

    let config = Config::load()?;
    let orchestrator = build_orchestrator(&config)?;

    info!(
        "Processing {:?} ({})",
        args.file,
        args.analysis.as_str()
    );

    let result = orchestrator
        .process(Some(&args.file), None, args.analysis)
        .await;

    let report = presenter::render(&result);

    println!("{}", report.headline);
    if !report.transcript.is_empty() {
        println!("\n--- Transcript ---\n{}", report.transcript);
    }
    if !report.speaker_overview.is_empty() {
        println!("\n--- Speakers ---\n{}", report.speaker_overview);
    }
    if !report.analysis.is_empty() {
        println!("\n--- {} ---\n{}", result.kind.label(), report.analysis);
    }

    if report.share_enabled {
        let analysis_text = result.analysis_text.as_deref().unwrap_or_default();
        let now = chrono::Local::now();

        if args.copy {
            let payload = share::format_share(analysis_text, result.kind.label(), now);
            ClipboardService::new().copy(&payload).await?;
            println!("\nReport copied to clipboard.");
        }

        if args.share {
            let payload =
                share::format_share_capped(analysis_text, result.kind.label(), now, SHARE_CAP);
            share::open_share_target(&payload)?;
        }
    }

    if report.state == ViewState::Error {
        bail!("processing failed: {}", report.headline);
    }

    Ok(())
}
