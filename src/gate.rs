//! Render gate: decides per layer whether its visual subtree must be redrawn.
//!
//! A layer is skipped only when every render-relevant input is unchanged.
//! Styles are compared by record identity (`Rc::ptr_eq`), never field by
//! field, so the layer store must build a new record on every style change.

#[cfg(test)]
#[path = "gate_test.rs"]
mod gate_test;

use std::collections::HashMap;
use std::rc::Rc;

use crate::doc::{ImageLayer, ImageStyle, LayerId, TextLayer, TextStyle};
use crate::geom::Point;

/// Render inputs of an image layer.
#[derive(Debug, Clone)]
pub struct ImageGateKey {
    pub id: LayerId,
    pub position: Point,
    pub style: Rc<ImageStyle>,
    pub selected: bool,
    pub dragging: bool,
    /// The crop overlay is visible.
    pub cropping: bool,
}

impl ImageGateKey {
    #[must_use]
    pub fn new(layer: &ImageLayer, selected: bool, dragging: bool, cropping: bool) -> Self {
        Self { id: layer.id, position: layer.position, style: Rc::clone(&layer.style), selected, dragging, cropping }
    }

    fn same_inputs(&self, other: &Self) -> bool {
        self.id == other.id
            && self.position == other.position
            && Rc::ptr_eq(&self.style, &other.style)
            && self.selected == other.selected
            && self.dragging == other.dragging
            && self.cropping == other.cropping
    }
}

/// Render inputs of a text layer.
#[derive(Debug, Clone)]
pub struct TextGateKey {
    pub id: LayerId,
    pub position: Point,
    pub style: Rc<TextStyle>,
    pub content: String,
    pub selected: bool,
    pub dragging: bool,
}

impl TextGateKey {
    #[must_use]
    pub fn new(layer: &TextLayer, selected: bool, dragging: bool) -> Self {
        Self {
            id: layer.id,
            position: layer.position,
            style: Rc::clone(&layer.style),
            content: layer.content.clone(),
            selected,
            dragging,
        }
    }

    fn same_inputs(&self, other: &Self) -> bool {
        self.id == other.id
            && self.position == other.position
            && Rc::ptr_eq(&self.style, &other.style)
            && self.content == other.content
            && self.selected == other.selected
            && self.dragging == other.dragging
    }
}

/// Render inputs of either layer kind.
#[derive(Debug, Clone)]
pub enum GateKey {
    Image(ImageGateKey),
    Text(TextGateKey),
}

impl GateKey {
    #[must_use]
    pub fn id(&self) -> LayerId {
        match self {
            Self::Image(k) => k.id,
            Self::Text(k) => k.id,
        }
    }
}

impl From<ImageGateKey> for GateKey {
    fn from(key: ImageGateKey) -> Self {
        Self::Image(key)
    }
}

impl From<TextGateKey> for GateKey {
    fn from(key: TextGateKey) -> Self {
        Self::Text(key)
    }
}

/// Outcome of a gate evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Skip,
    Redraw,
}

/// `true` iff `next` has exactly the same render inputs as `prev`.
///
/// Keys of different kinds never match.
#[must_use]
pub fn should_skip(prev: &GateKey, next: &GateKey) -> bool {
    match (prev, next) {
        (GateKey::Image(a), GateKey::Image(b)) => a.same_inputs(b),
        (GateKey::Text(a), GateKey::Text(b)) => a.same_inputs(b),
        _ => false,
    }
}

/// Per-layer memo of the inputs used for the last paint.
#[derive(Debug, Default)]
pub struct RenderGate {
    prev: HashMap<LayerId, GateKey>,
}

impl RenderGate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare `next` against the stored key for the same id, then store it.
    ///
    /// A layer seen for the first time always redraws.
    pub fn evaluate(&mut self, next: GateKey) -> Decision {
        let id = next.id();
        let decision = match self.prev.get(&id) {
            Some(prev) if should_skip(prev, &next) => Decision::Skip,
            _ => Decision::Redraw,
        };
        tracing::trace!(%id, ?decision, "render gate");
        self.prev.insert(id, next);
        decision
    }

    /// Forget every layer not in `live`. Returns the forgotten ids.
    pub fn retain(&mut self, live: &[LayerId]) -> Vec<LayerId> {
        let mut removed: Vec<LayerId> = self.prev.keys().filter(|id| !live.contains(id)).copied().collect();
        removed.sort_unstable();
        for id in &removed {
            self.prev.remove(id);
        }
        removed
    }

    /// Force the next evaluation of every layer to redraw.
    pub fn invalidate_all(&mut self) {
        self.prev.clear();
    }

    /// Number of layers currently memoized.
    #[must_use]
    pub fn len(&self) -> usize {
        self.prev.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prev.is_empty()
    }
}
