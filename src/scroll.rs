//! Keeping the preview pane roughly aligned with the editor.
//!
//! The preview position follows the editor cursor more than the editor's own
//! scroll offset: the cursor carries 80% of the weight and the scroll fraction
//! the remaining 20%. Small corrections are skipped so the preview does not
//! jitter while typing.

/// Weight of the cursor's relative line position.
pub const CURSOR_WEIGHT: f64 = 0.8;
/// Weight of the editor's relative scroll offset.
pub const SCROLL_WEIGHT: f64 = 0.2;
/// Corrections of this many rows or fewer are ignored.
pub const SYNC_THRESHOLD: f64 = 5.0;

/// Delay between a preview re-render and the following sync.
pub const SYNC_DELAY_MS: u64 = 50;

/// Relative position (0..=1) the preview should show.
///
/// `scroll_height` is the scrollable content height and `client_height` the
/// visible height, both in rows.
///
/// # Example
///
/// ```
/// use quillpost::scroll::scroll_ratio;
///
/// assert_eq!(scroll_ratio(0, 1, 0.0, 10.0, 10.0), 0.0);
/// assert!((scroll_ratio(2, 5, 5.0, 20.0, 10.0) - 0.5).abs() < 1e-9);
/// ```
#[allow(clippy::cast_precision_loss)]
pub fn scroll_ratio(
    cursor_line: usize,
    total_lines: usize,
    scroll_top: f64,
    scroll_height: f64,
    client_height: f64,
) -> f64 {
    if total_lines <= 1 {
        return 0.0;
    }
    let line_ratio = cursor_line as f64 / (total_lines - 1) as f64;
    let span = scroll_height - client_height;
    let span = if span > 0.0 { span } else { 1.0 };
    let scroll_fraction = scroll_top / span;
    CURSOR_WEIGHT
        .mul_add(line_ratio, SCROLL_WEIGHT * scroll_fraction)
        .clamp(0.0, 1.0)
}

/// Preview scroll offset corresponding to `ratio`.
pub fn preview_target(ratio: f64, preview_scroll_height: f64, preview_client_height: f64) -> f64 {
    ratio * (preview_scroll_height - preview_client_height).max(0.0)
}

/// Whether moving from `current` to `target` is worth doing.
pub fn exceeds_threshold(target: f64, current: f64) -> bool {
    (target - current).abs() > SYNC_THRESHOLD
}

/// A time-based scroll animation toward a target row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SmoothScroll {
    from: usize,
    to: usize,
    started_ms: u64,
    duration_ms: u64,
}

impl SmoothScroll {
    /// Begin animating from `from` to `to` at `now_ms`.
    pub fn start(from: usize, to: usize, now_ms: u64) -> Self {
        Self {
            from,
            to,
            started_ms: now_ms,
            duration_ms: duration_for_distance(from.abs_diff(to)),
        }
    }

    pub const fn target(&self) -> usize {
        self.to
    }

    pub const fn is_done(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.started_ms) >= self.duration_ms
    }

    /// Row to show at `now_ms`.
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn position(&self, now_ms: u64) -> usize {
        if self.is_done(now_ms) {
            return self.to;
        }
        let elapsed = now_ms.saturating_sub(self.started_ms) as f64;
        let t = ease_out_cubic(elapsed / self.duration_ms as f64);
        let from = self.from as f64;
        let to = self.to as f64;
        (from + (to - from) * t).round().max(0.0) as usize
    }
}

fn ease_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

const fn duration_for_distance(rows: usize) -> u64 {
    if rows <= 3 {
        120
    } else if rows <= 20 {
        200
    } else {
        300
    }
}
