use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::analysis::AnalysisKind;

mod process;

pub use process::handle_process_command;

#[derive(Parser)]
#[command(
    name = "meetscribe",
    about = "Meeting recorder with live transcription and LLM analysis",
    version
)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Subcommand)]
pub enum CliCommand {
    /// Analyze a pre-recorded audio file without the service
    Process(ProcessArgs),
    /// Print version information
    Version,
}

#[derive(Args)]
pub struct ProcessArgs {
    /// Path to the audio file (wav, mp3, m4a, ogg, flac, webm)
    pub file: PathBuf,

    /// Which analysis to run on the transcript
    #[arg(long, value_enum, default_value = "summary")]
    pub analysis: AnalysisKind,

    /// Copy the report to the clipboard when done
    #[arg(long)]
    pub copy: bool,

    /// Open the share target with the (length-capped) report
    #[arg(long)]
    pub share: bool,
}
