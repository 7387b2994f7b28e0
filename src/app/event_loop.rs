use std::io::stdout;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
};
use crossterm::execute;
use ratatui::DefaultTerminal;
use tracing::{debug, info};

use crate::app::{App, Message, Model, update};
use crate::worker::Worker;

pub(super) struct ResizeDebouncer {
    delay_ms: u64,
    pending: Option<(u16, u16, u64)>,
}

impl ResizeDebouncer {
    pub(super) const fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            pending: None,
        }
    }

    pub(super) const fn queue(&mut self, width: u16, height: u16, now_ms: u64) {
        self.pending = Some((width, height, now_ms));
    }

    pub(super) fn take_ready(&mut self, now_ms: u64) -> Option<(u16, u16)> {
        let (width, height, queued_at) = self.pending?;
        if now_ms.saturating_sub(queued_at) >= self.delay_ms {
            self.pending = None;
            Some((width, height))
        } else {
            None
        }
    }

    pub(super) const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

impl App {
    /// Run the main event loop.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be initialized, the worker
    /// thread cannot be spawned, or drawing fails.
    pub fn run(self) -> Result<()> {
        let worker = Worker::spawn(self.api).context("Failed to start background worker")?;

        let mut terminal = ratatui::try_init()
            .context("Failed to initialize terminal; quillpost requires an interactive terminal")?;
        let size = terminal.size()?;
        execute!(stdout(), EnableMouseCapture, EnableBracketedPaste)?;

        let mut model = Model::new((size.width, size.height), self.min_pane_width)
            .with_export_dir(self.export_dir)
            .with_light_theme(self.light_theme);
        model = update(model, Message::RefreshApiStatus);
        if let Some(path) = self.initial_file {
            model = update(model, Message::DropPath(path.display().to_string()));
        }
        info!(width = size.width, height = size.height, "editor started");

        let result = Self::event_loop(&mut terminal, &mut model, &worker);

        let _ = execute!(stdout(), DisableBracketedPaste, DisableMouseCapture);
        ratatui::restore();
        // A request still in flight is abandoned rather than waited on.
        drop(worker);

        result
    }

    fn event_loop(
        terminal: &mut DefaultTerminal,
        model: &mut Model,
        worker: &Worker,
    ) -> Result<()> {
        let start = Instant::now();
        let mut resize_debouncer = ResizeDebouncer::new(100);
        let mut needs_render = true;
        let mut outstanding: usize = 0;

        loop {
            let now_ms = elapsed_ms(start);
            if model.next_deadline().is_some_and(|due| due <= now_ms) {
                needs_render = true;
            }
            *model = update(std::mem::take(model), Message::Tick(now_ms));
            outstanding += Self::dispatch_counted(model, worker);

            if let Some((width, height)) = resize_debouncer.take_ready(now_ms) {
                debug!(width, height, "applying resize");
                *model = update(std::mem::take(model), Message::Resize(width, height));
                needs_render = true;
            }

            while let Some(completion) = worker.try_recv() {
                outstanding = outstanding.saturating_sub(1);
                let msg = Message::Completed(completion);
                *model = update(std::mem::take(model), msg);
                outstanding += Self::dispatch_counted(model, worker);
                needs_render = true;
            }

            let poll_ms = if needs_render {
                0
            } else if resize_debouncer.is_pending() {
                10
            } else {
                let idle = if outstanding > 0 { 30 } else { 250 };
                model
                    .next_deadline()
                    .map_or(idle, |due| due.saturating_sub(now_ms).clamp(1, idle))
            };
            if event::poll(Duration::from_millis(poll_ms))? {
                // Refresh timestamp after poll wait so debouncers use accurate times.
                let event_ms = elapsed_ms(start);
                if let Some(msg) =
                    Self::handle_event(&event::read()?, model, event_ms, &mut resize_debouncer)
                {
                    outstanding += Self::process(model, worker, msg);
                    needs_render = true;
                }

                // Coalesce key repeat bursts into a single render.
                while event::poll(Duration::from_millis(0))? {
                    let drain_ms = elapsed_ms(start);
                    if let Some(msg) =
                        Self::handle_event(&event::read()?, model, drain_ms, &mut resize_debouncer)
                    {
                        outstanding += Self::process(model, worker, msg);
                        needs_render = true;
                    }
                }
            }

            if needs_render {
                terminal.draw(|frame| crate::ui::render(model, frame))?;
                needs_render = false;
            }

            if model.should_quit {
                break;
            }
        }
        Ok(())
    }

    /// Apply one input message and its side effects; returns jobs submitted.
    fn process(model: &mut Model, worker: &Worker, msg: Message) -> usize {
        let side_msg = msg.clone();
        *model = update(std::mem::take(model), msg);
        let queued = model.queued_jobs();
        Self::handle_message_side_effects(model, worker, &side_msg);
        queued
    }

    fn dispatch_counted(model: &mut Model, worker: &Worker) -> usize {
        let queued = model.queued_jobs();
        Self::dispatch_jobs(model, worker);
        queued
    }
}
