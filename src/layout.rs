//! Editor | handle | preview split with a draggable handle.
//!
//! Widths are in terminal columns. Both panes keep at least `min_width`
//! columns unless the container cannot hold two minimum panes, in which
//! case the space is shared evenly.

/// Default minimum width of each pane.
pub const DEFAULT_MIN_WIDTH: u16 = 20;
/// Width of the resize handle.
pub const HANDLE_WIDTH: u16 = 1;

/// Column widths of one split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Split {
    pub editor: u16,
    pub handle: u16,
    pub preview: u16,
}

/// Split `container` columns giving the editor `desired` columns if allowed.
pub fn split(container: u16, desired: u16, min_width: u16, handle: u16) -> Split {
    let handle = handle.min(container);
    let usable = container - handle;
    if container < min_width.saturating_mul(2).saturating_add(handle) {
        let editor = usable / 2;
        return Split {
            editor,
            handle,
            preview: usable - editor,
        };
    }
    let max_editor = container - min_width - handle;
    let mut editor = desired.clamp(min_width, max_editor);
    let preview = container - editor - handle;
    if preview < min_width {
        editor = max_editor;
    }
    Split {
        editor,
        handle,
        preview: container - editor - handle,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Drag {
    start_x: u16,
    start_width: u16,
}

/// Live layout state for the two panes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaneLayout {
    container: u16,
    editor: u16,
    min_width: u16,
    handle: u16,
    drag: Option<Drag>,
}

impl Default for PaneLayout {
    fn default() -> Self {
        Self::new(0, DEFAULT_MIN_WIDTH)
    }
}

impl PaneLayout {
    /// An even split of `container` columns.
    pub fn new(container: u16, min_width: u16) -> Self {
        let mut layout = Self {
            container,
            editor: 0,
            min_width,
            handle: HANDLE_WIDTH,
            drag: None,
        };
        layout.editor = layout.clamped(container.saturating_sub(HANDLE_WIDTH) / 2).editor;
        layout
    }

    fn clamped(&self, desired: u16) -> Split {
        split(self.container, desired, self.min_width, self.handle)
    }

    pub fn split(&self) -> Split {
        self.clamped(self.editor)
    }

    pub const fn container(&self) -> u16 {
        self.container
    }

    pub const fn min_width(&self) -> u16 {
        self.min_width
    }

    pub const fn is_resizing(&self) -> bool {
        self.drag.is_some()
    }

    /// Whether column `x` (relative to the container) is on the handle.
    pub fn handle_contains(&self, x: u16) -> bool {
        let split = self.split();
        x >= split.editor && x < split.editor + split.handle
    }

    /// Start a drag if `x` is on the handle.
    pub fn begin_drag(&mut self, x: u16) -> bool {
        if !self.handle_contains(x) {
            return false;
        }
        self.drag = Some(Drag {
            start_x: x,
            start_width: self.split().editor,
        });
        true
    }

    /// Follow the pointer to column `x`; ignored when not dragging.
    pub fn drag_to(&mut self, x: u16) {
        let Some(drag) = self.drag else {
            return;
        };
        let dx = i32::from(x) - i32::from(drag.start_x);
        let desired = (i32::from(drag.start_width) + dx).clamp(0, i32::from(u16::MAX));
        let desired = u16::try_from(desired).unwrap_or(u16::MAX);
        self.editor = self.clamped(desired).editor;
    }

    pub const fn end_drag(&mut self) {
        self.drag = None;
    }

    /// Adapt to a new container width, keeping the editor's share.
    pub fn resize(&mut self, container: u16) {
        if container == self.container {
            return;
        }
        let share = if self.container == 0 {
            container.saturating_sub(self.handle) / 2
        } else {
            let scaled = u32::from(self.editor) * u32::from(container) / u32::from(self.container);
            u16::try_from(scaled).unwrap_or(u16::MAX)
        };
        self.container = container;
        self.editor = self.clamped(share).editor;
    }
}
