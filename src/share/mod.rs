//! Share and export of finished analyses.
//!
//! Two formatting rules: an uncapped payload for clipboard copy and a
//! hard-capped one for outbound channels that enforce message-size
//! limits. Both are pure functions of their input. Clipboard writes fall
//! back to the system clipboard CLIs when no native backend is usable.

use anyhow::{anyhow, Context, Result};
use arboard::Clipboard;
use chrono::{DateTime, Local};
use std::io::Write;
use std::process::{Command, Stdio};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use which::which;

/// Hard character cap for outbound share channels.
pub const SHARE_CAP: usize = 800;

const TRUNCATION_MARKER: &str = "…";

/// Uncapped share payload: label, timestamp, analysis body.
pub fn format_share(analysis_text: &str, kind_label: &str, timestamp: DateTime<Local>) -> String {
    format!(
        "{} ({})\n\n{}",
        kind_label,
        timestamp.format("%Y-%m-%d %H:%M"),
        analysis_text.trim()
    )
}

/// Length-capped variant for share targets with message-size limits.
/// Identical to the uncapped payload when it fits; otherwise cut to
/// exactly `cap` characters ending in a truncation marker. Byte-identical
/// across calls for the same input.
pub fn format_share_capped(
    analysis_text: &str,
    kind_label: &str,
    timestamp: DateTime<Local>,
    cap: usize,
) -> String {
    let full = format_share(analysis_text, kind_label, timestamp);
    let char_count = full.chars().count();
    if char_count <= cap {
        return full;
    }

    let marker_chars = TRUNCATION_MARKER.chars().count();
    let keep = cap.saturating_sub(marker_chars);
    let mut truncated: String = full.chars().take(keep).collect();
    truncated.push_str(TRUNCATION_MARKER);
    truncated
}

/// Share URL for the LINE messaging app, used where no native share
/// surface exists.
pub fn share_url(payload: &str) -> String {
    format!(
        "https://line.me/R/share?text={}",
        urlencoding::encode(payload)
    )
}

/// Open the share target in the user's default handler.
pub fn open_share_target(payload: &str) -> Result<()> {
    let url = share_url(payload);
    info!("Opening share target ({} chars)", payload.chars().count());
    open::that(url).context("Failed to open share URL")
}

/// Clipboard writer with a CLI-tool fallback chain.
#[derive(Clone)]
pub struct ClipboardService {
    inner: Arc<Mutex<Option<Clipboard>>>,
}

impl ClipboardService {
    pub fn new() -> Self {
        let clipboard = match Clipboard::new() {
            Ok(cb) => Some(cb),
            Err(err) => {
                warn!(
                    "System clipboard backend unavailable ({}); falling back to CLI tools",
                    err
                );
                None
            }
        };

        Self {
            inner: Arc::new(Mutex::new(clipboard)),
        }
    }

    pub async fn copy(&self, text: &str) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }

        info!("Copying {} chars to clipboard", text.len());

        let mut used_native = false;
        {
            let mut guard = self.inner.lock().await;
            if let Some(clipboard) = guard.as_mut() {
                match clipboard.set_text(text) {
                    Ok(_) => used_native = true,
                    Err(err) => {
                        warn!(
                            "Native clipboard backend failed ({}), disabling until restart",
                            err
                        );
                        *guard = None;
                    }
                }
            }
        }

        if !used_native {
            copy_with_system_backends(text)?;
        }

        Ok(())
    }
}

impl Default for ClipboardService {
    fn default() -> Self {
        Self::new()
    }
}

struct ClipboardBackend {
    name: &'static str,
    copy_cmd: &'static str,
    copy_args: &'static [&'static str],
}

const CLIPBOARD_BACKENDS: &[ClipboardBackend] = &[
    ClipboardBackend {
        name: "wl-copy",
        copy_cmd: "wl-copy",
        copy_args: &[],
    },
    ClipboardBackend {
        name: "xclip",
        copy_cmd: "xclip",
        copy_args: &["-selection", "clipboard"],
    },
    ClipboardBackend {
        name: "xsel",
        copy_cmd: "xsel",
        copy_args: &["--clipboard", "--input"],
    },
];

fn copy_with_system_backends(text: &str) -> Result<()> {
    for backend in CLIPBOARD_BACKENDS {
        if which(backend.copy_cmd).is_err() {
            continue;
        }

        let mut cmd = Command::new(backend.copy_cmd);
        cmd.args(backend.copy_args).stdin(Stdio::piped());

        if let Ok(mut child) = cmd.spawn() {
            if let Some(stdin) = child.stdin.as_mut() {
                if stdin.write_all(text.as_bytes()).is_err() {
                    continue;
                }
            }

            if let Ok(status) = child.wait() {
                if status.success() {
                    debug!("Text copied to clipboard with {}", backend.name);
                    return Ok(());
                }
            }
        }
    }

    Err(anyhow!(
        "No clipboard tool (wl-copy/xclip/xsel) available for fallback"
    ))
}
