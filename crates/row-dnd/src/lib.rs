//! Row DragDrop Utilities
//!
//! Headless drag-and-drop for linear row lists using raw pointer events.
//! Uses a movement threshold to distinguish click from drag, and row
//! geometry to classify a drop as "on the row" or "between rows".
//!
//! No UI framework involved: callers feed pointer coordinates and row
//! rectangles in, and read transitions out, so the whole lifecycle is
//! testable without a real pointer device.

/// Movement threshold in pixels to start dragging
const DRAG_THRESHOLD_PX: i32 = 5;

/// Fraction of a row's height treated as the "on the row" band
const ON_ROW_BAND: f64 = 0.5;

/// Axis-aligned rectangle in pointer coordinates
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }
}

/// Where a drop lands relative to the hovered row
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropBand {
    /// Upper edge: insert before the hovered row
    Above,
    /// Middle 50% of the row: become a child of it
    OnRow,
    /// Lower edge: insert after the hovered row
    Below,
}

/// Classify a drop from the dragged rect's vertical center against the
/// hovered row's rect. Strictly inside the middle band means "on the row";
/// otherwise the nearer edge wins.
pub fn classify_drop(dragged: &Rect, over: &Rect) -> DropBand {
    let center = dragged.center_y();
    let band = over.height * ON_ROW_BAND;
    let band_top = over.y + (over.height - band) / 2.0;
    let band_bottom = band_top + band;
    if center > band_top && center < band_bottom {
        DropBand::OnRow
    } else if center <= band_top {
        DropBand::Above
    } else {
        DropBand::Below
    }
}

/// Drag lifecycle phases
#[derive(Clone, Debug, PartialEq, Eq)]
enum Phase<Id> {
    Idle,
    /// Pressed but not yet moved past the threshold (still a click)
    Pending { id: Id, x: i32, y: i32 },
    Dragging { id: Id, over: Option<Id> },
}

/// Outcome of releasing the pointer
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Release<Id> {
    /// Never crossed the drag threshold; the press was a click
    Click(Id),
    /// Drag ended over a row
    Drop { active: Id, over: Id },
    /// Drag ended with no target under the pointer
    NoTarget(Id),
    /// Nothing was pressed
    Idle,
}

/// Drag lifecycle state machine: `Idle -> Pending -> Dragging -> Idle`.
///
/// One press at a time; a second press while active is ignored. `cancel`
/// aborts from any phase without producing a drop.
#[derive(Clone, Debug)]
pub struct DragState<Id: Clone + PartialEq> {
    phase: Phase<Id>,
}

impl<Id: Clone + PartialEq> Default for DragState<Id> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Id: Clone + PartialEq> DragState<Id> {
    pub fn new() -> Self {
        Self { phase: Phase::Idle }
    }

    /// Pointer pressed on a row; records a pending drag with start position
    pub fn press(&mut self, id: Id, x: i32, y: i32) {
        if matches!(self.phase, Phase::Idle) {
            self.phase = Phase::Pending { id, x, y };
        }
    }

    /// Pointer moved; promotes a pending press to a drag once it travels
    /// past the threshold. Returns the active id when a drag starts.
    pub fn motion(&mut self, x: i32, y: i32) -> Option<Id> {
        if let Phase::Pending { id, x: sx, y: sy } = &self.phase {
            let dx = (x - sx).abs();
            let dy = (y - sy).abs();
            if dx > DRAG_THRESHOLD_PX || dy > DRAG_THRESHOLD_PX {
                let id = id.clone();
                self.phase = Phase::Dragging { id: id.clone(), over: None };
                return Some(id);
            }
        }
        None
    }

    /// Pointer entered a row. Self-hover is not a target.
    pub fn hover(&mut self, target: Id) {
        if let Phase::Dragging { id, over } = &mut self.phase {
            if *id != target {
                *over = Some(target);
            }
        }
    }

    /// Pointer left the hovered row
    pub fn leave(&mut self) {
        if let Phase::Dragging { over, .. } = &mut self.phase {
            *over = None;
        }
    }

    /// Pointer released; resolves the whole gesture and returns to idle
    pub fn release(&mut self) -> Release<Id> {
        let phase = std::mem::replace(&mut self.phase, Phase::Idle);
        match phase {
            Phase::Idle => Release::Idle,
            Phase::Pending { id, .. } => Release::Click(id),
            Phase::Dragging { id, over: Some(over) } => Release::Drop { active: id, over },
            Phase::Dragging { id, over: None } => Release::NoTarget(id),
        }
    }

    /// Abort without a drop, from any phase
    pub fn cancel(&mut self) {
        self.phase = Phase::Idle;
    }

    pub fn active(&self) -> Option<&Id> {
        match &self.phase {
            Phase::Dragging { id, .. } => Some(id),
            _ => None,
        }
    }

    pub fn over(&self) -> Option<&Id> {
        match &self.phase {
            Phase::Dragging { over, .. } => over.as_ref(),
            _ => None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, Phase::Dragging { .. })
    }
}
