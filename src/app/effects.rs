use std::io;
use std::process::{Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};

use tracing::{debug, info, warn};

use crate::app::model::ToastLevel;
use crate::app::{App, Message, Model};
use crate::article::HistoryAction;
use crate::worker::Worker;

impl App {
    /// Perform side effects that `update` only records.
    pub(super) fn handle_message_side_effects(model: &mut Model, worker: &Worker, msg: &Message) {
        if let Message::HistoryView = msg {
            Self::view_selected_article(model);
        }
        Self::dispatch_jobs(model, worker);
    }

    /// Hand queued jobs to the worker.
    pub(super) fn dispatch_jobs(model: &mut Model, worker: &Worker) {
        for job in model.take_jobs() {
            if !worker.submit(job) {
                warn!("worker is gone, job dropped");
                model.show_toast(ToastLevel::Error, "Background worker stopped");
                break;
            }
        }
    }

    fn view_selected_article(model: &mut Model) {
        let url = model
            .selected_history_entry()
            .filter(|entry| entry.has_action(HistoryAction::View))
            .and_then(|entry| entry.external_url.clone());
        let Some(url) = url else {
            return;
        };
        match open_external_link(&url) {
            Ok(()) => {
                info!(%url, "opened article");
                model.show_toast(ToastLevel::Info, format!("Opened {url}"));
            }
            Err(err) => model.show_toast(ToastLevel::Error, format!("Open failed: {err}")),
        }
    }
}

fn open_external_link(url: &str) -> io::Result<()> {
    #[cfg(target_os = "macos")]
    let mut command = Command::new("open");
    #[cfg(target_os = "windows")]
    let mut command = {
        let mut command = Command::new("cmd");
        command.args(["/C", "start", ""]);
        command
    };
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    let mut command = Command::new("xdg-open");

    // The TUI owns the terminal; keep the opener quiet.
    command
        .arg(url)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    spawn_reaped(&mut command).map(drop)
}

/// Spawn `command` and wait for it on a detached thread so it never lingers
/// as a zombie.
fn spawn_reaped(command: &mut Command) -> io::Result<JoinHandle<io::Result<ExitStatus>>> {
    let mut child = command.spawn()?;
    thread::Builder::new()
        .name("quillpost-opener".to_string())
        .spawn(move || {
            let status = child.wait();
            debug!(?status, "opener exited");
            status
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn test_spawned_opener_is_waited_for() {
        let reaper = spawn_reaped(&mut Command::new("true")).unwrap();
        let status = reaper.join().unwrap().unwrap();
        assert!(status.success());
    }

    #[test]
    fn test_missing_opener_reports_spawn_error() {
        let result = spawn_reaped(&mut Command::new("quillpost-no-such-opener"));
        assert!(result.is_err());
    }
}
