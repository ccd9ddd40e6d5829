//! Input model: mouse buttons, persistent UI flags, and the gesture state machine.
//!
//! `InputState` is the active gesture tracked between pointer-down and
//! pointer-up. It carries everything needed to recompute the result from the
//! gesture's starting snapshot on each move, so deltas never accumulate drift.
//!
//! The `Controller` only reads the layer store. Every change it wants is
//! returned as an [`Action`] for the owner of the store to apply.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::consts::CROP_MAX_PAIR_PCT;
use crate::doc::{Crop, CropSide, LayerId, LayerStore};
use crate::engine::Action;
use crate::geom::{Point, Size};
use crate::hit::{Hit, HitPart};

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
    /// Back, forward and any other auxiliary button.
    Other(i16),
}

impl Button {
    /// Map a DOM `MouseEvent.button` code.
    #[must_use]
    pub fn from_dom(code: i16) -> Self {
        match code {
            0 => Self::Primary,
            1 => Self::Middle,
            2 => Self::Secondary,
            other => Self::Other(other),
        }
    }
}

/// Persistent UI state visible to the renderer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UiState {
    /// The selected image layer is in crop-edit mode.
    pub crop_mode: bool,
}

/// Identifier of one gesture, from pointer-down to release.
pub type SessionId = u64;

/// Internal state for the gesture state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    Idle,
    /// A layer is being moved.
    Dragging {
        session: SessionId,
        id: LayerId,
        /// Canvas-space pointer position at pointer-down.
        start_pointer: Point,
        /// Layer position at pointer-down.
        start_position: Point,
        /// Last position emitted.
        current: Point,
    },
    /// One edge of an image layer's crop is being dragged.
    Cropping {
        session: SessionId,
        id: LayerId,
        side: CropSide,
        start_pointer: Point,
        /// Crop at pointer-down.
        start_crop: Crop,
        /// Rendered box at pointer-down. Not re-measured during the gesture.
        bounds: Size,
        /// Last crop emitted.
        current: Crop,
    },
}

impl Default for InputState {
    fn default() -> Self {
        Self::Idle
    }
}

impl InputState {
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// The session of the active gesture, if any.
    #[must_use]
    pub fn session(&self) -> Option<SessionId> {
        match self {
            Self::Idle => None,
            Self::Dragging { session, .. } | Self::Cropping { session, .. } => Some(*session),
        }
    }

    /// The layer the active gesture targets, if any.
    #[must_use]
    pub fn layer(&self) -> Option<LayerId> {
        match self {
            Self::Idle => None,
            Self::Dragging { id, .. } | Self::Cropping { id, .. } => Some(*id),
        }
    }
}

/// Drives [`InputState`] from pointer events.
#[derive(Debug, Default)]
pub struct Controller {
    state: InputState,
    last_session: SessionId,
}

impl Controller {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> &InputState {
        &self.state
    }

    /// The layer currently being dragged, if any.
    #[must_use]
    pub fn dragging(&self) -> Option<LayerId> {
        match self.state {
            InputState::Dragging { id, .. } => Some(id),
            _ => None,
        }
    }

    /// Handle a pointer-down at canvas point `pt`.
    ///
    /// `hit` is the layer part under the pointer, or `None` for empty canvas.
    /// A gesture still active from a previous pointer-down is released first,
    /// without emitting.
    pub fn pointer_down(
        &mut self,
        doc: &LayerStore,
        ui: UiState,
        hit: Option<Hit>,
        pt: Point,
        button: Button,
    ) -> Vec<Action> {
        if button != Button::Primary {
            return Vec::new();
        }
        if let Some(session) = self.state.session() {
            tracing::debug!(session, "stale gesture released");
            self.state = InputState::Idle;
        }

        let Some(hit) = hit else {
            let mut actions = Vec::new();
            if doc.selected().is_some() {
                actions.push(Action::SelectionChanged { id: None });
            }
            actions.push(Action::EmptyCanvasClicked);
            tracing::debug!("empty canvas clicked");
            return actions;
        };

        match hit.part {
            HitPart::Body => self.begin_drag(doc, ui, hit.layer_id, pt),
            HitPart::CropHandle(side) => self.begin_crop(doc, ui, hit, side, pt),
        }
    }

    /// Handle a pointer-move. Emits the recomputed position or crop.
    pub fn pointer_move(&mut self, doc: &LayerStore, pt: Point) -> Vec<Action> {
        if !self.target_alive(doc) {
            return Vec::new();
        }
        match &mut self.state {
            InputState::Idle => Vec::new(),
            InputState::Dragging { id, start_pointer, start_position, current, .. } => {
                *current = drag_position(*start_position, *start_pointer, pt);
                vec![Action::PositionChanged { id: *id, position: *current }]
            }
            InputState::Cropping { id, side, start_pointer, start_crop, bounds, current, .. } => {
                *current = crop_for_drag(*start_crop, *side, *bounds, pt - *start_pointer);
                vec![Action::CropChanged { id: *id, crop: *current }]
            }
        }
    }

    /// Handle a pointer-up: commit the final value and return to idle.
    pub fn pointer_up(&mut self, doc: &LayerStore, pt: Point) -> Vec<Action> {
        let actions = self.pointer_move(doc, pt);
        self.end("pointer up");
        actions
    }

    /// The pointer left the canvas. Ends a drag with its last position; crop
    /// gestures continue since their listeners live on the document.
    pub fn pointer_leave(&mut self, doc: &LayerStore) -> Vec<Action> {
        let InputState::Dragging { id, current, .. } = self.state else {
            return Vec::new();
        };
        if !self.target_alive(doc) {
            return Vec::new();
        }
        self.end("pointer left canvas");
        vec![Action::PositionChanged { id, position: current }]
    }

    /// Abandon the active gesture without emitting. Returns whether one was active.
    pub fn cancel(&mut self) -> bool {
        let active = !self.state.is_idle();
        self.end("cancelled");
        active
    }

    fn begin_drag(&mut self, doc: &LayerStore, ui: UiState, id: LayerId, pt: Point) -> Vec<Action> {
        let layer = match doc.get(&id) {
            Ok(layer) => layer,
            Err(err) => {
                tracing::warn!(%err, "pointer down on unknown layer ignored");
                return Vec::new();
            }
        };
        let was_selected = doc.is_selected(&id);
        let mut actions = Vec::new();
        if !was_selected {
            actions.push(Action::SelectionChanged { id: Some(id) });
        }
        // Body presses on the layer being cropped must not move it.
        if was_selected && ui.crop_mode {
            return actions;
        }
        let session = self.next_session();
        let start_position = layer.position();
        self.state =
            InputState::Dragging { session, id, start_pointer: pt, start_position, current: start_position };
        tracing::debug!(session, %id, "drag started");
        actions
    }

    fn begin_crop(&mut self, doc: &LayerStore, ui: UiState, hit: Hit, side: CropSide, pt: Point) -> Vec<Action> {
        let id = hit.layer_id;
        if !ui.crop_mode || !doc.is_selected(&id) {
            tracing::debug!(%id, "crop handle ignored outside crop mode");
            return Vec::new();
        }
        if !hit.bounds.is_measurable() {
            let Size { width, height } = hit.bounds;
            tracing::warn!(%id, width, height, "crop rejected: layer has no size");
            return Vec::new();
        }
        let start_crop = match doc.get_image(&id) {
            Ok(img) => img.style.crop,
            Err(err) => {
                tracing::warn!(%err, "crop rejected");
                return Vec::new();
            }
        };
        let session = self.next_session();
        self.state = InputState::Cropping {
            session,
            id,
            side,
            start_pointer: pt,
            start_crop,
            bounds: hit.bounds,
            current: start_crop,
        };
        tracing::debug!(session, %id, side = side.as_str(), "crop started");
        Vec::new()
    }

    /// Abort to idle when the gesture's layer has been deleted.
    fn target_alive(&mut self, doc: &LayerStore) -> bool {
        match self.state.layer() {
            Some(id) if !doc.contains(&id) => {
                tracing::warn!(%id, "layer removed mid-gesture; aborting");
                self.state = InputState::Idle;
                false
            }
            _ => true,
        }
    }

    fn end(&mut self, reason: &'static str) {
        if let Some(session) = self.state.session() {
            tracing::debug!(session, reason, "gesture ended");
        }
        self.state = InputState::Idle;
    }

    fn next_session(&mut self) -> SessionId {
        self.last_session += 1;
        self.last_session
    }
}

/// Layer position for a drag: start position plus total pointer travel.
#[must_use]
pub fn drag_position(start_position: Point, start_pointer: Point, pt: Point) -> Point {
    start_position + (pt - start_pointer)
}

/// Crop after dragging `side`'s handle by `delta` pixels.
///
/// The delta on the side's axis becomes a percentage of `bounds`. Top and left
/// grow with positive delta; bottom and right shrink. The result is at least 0
/// and never lets the side plus its opposite exceed the pair maximum. Other
/// sides are untouched.
#[must_use]
pub fn crop_for_drag(start: Crop, side: CropSide, bounds: Size, delta: Point) -> Crop {
    let (delta_px, extent) = if side.is_horizontal() { (delta.x, bounds.width) } else { (delta.y, bounds.height) };
    let delta_pct = if extent > 0.0 { delta_px / extent * 100.0 } else { 0.0 };
    let raw = match side {
        CropSide::Top | CropSide::Left => start.side(side) + delta_pct,
        CropSide::Bottom | CropSide::Right => start.side(side) - delta_pct,
    };
    let cap = (CROP_MAX_PAIR_PCT - start.side(side.opposite())).max(0.0);
    start.with_side(side, raw.max(0.0).min(cap))
}
