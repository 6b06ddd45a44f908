//! Spinner output while waiting for asynchronous operations
//!
//! Wraps the core [`Poller`] with an indicatif spinner per polled id. The
//! spinner draws on stderr and stays hidden when stderr is not a terminal.

use std::sync::Mutex;
use std::time::Duration;

use cloudctl_core::{PollConfig, Poller, ProgressEvent};
use indicatif::{ProgressBar, ProgressStyle};

/// Poller that renders progress events as spinners
pub fn progress_poller(config: PollConfig) -> Poller {
    let current: Mutex<Option<ProgressBar>> = Mutex::new(None);

    Poller::new(config).with_progress(Box::new(move |event| {
        let Ok(mut current) = current.lock() else {
            return;
        };
        match event {
            ProgressEvent::Started { id } => {
                let pb = spinner();
                pb.set_message(format!("Waiting for {}", id));
                *current = Some(pb);
            }
            ProgressEvent::Polling { id, status, .. } => {
                if let Some(pb) = current.as_ref() {
                    pb.set_message(format!("{}: {}", id, format_state(&status)));
                }
            }
            ProgressEvent::Completed { id, elapsed } => {
                if let Some(pb) = current.take() {
                    pb.finish_with_message(format!(
                        "{}: {} after {}s",
                        id,
                        format_state("DONE"),
                        elapsed.as_secs()
                    ));
                }
            }
            ProgressEvent::Failed { id, error } => {
                if let Some(pb) = current.take() {
                    pb.finish_with_message(format!("{} failed: {}", id, error));
                }
            }
        }
    }))
}

fn spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) =
        ProgressStyle::default_spinner().template("{spinner:.green} {msg} [{elapsed_precise}]")
    {
        pb.set_style(style);
    }
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

/// Format a status for display with status icons
fn format_state(state: &str) -> String {
    match state {
        "DONE" | "AVAILABLE" => format!("\u{2713} {}", state), // checkmark
        "FAILED" => format!("\u{2717} {}", state),            // x mark
        "QUEUED" | "RUNNING" | "BUSY" | "EXISTS" => format!("\u{21bb} {}", state), // arrow circle
        _ => state.to_string(),
    }
}
