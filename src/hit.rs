#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::doc::{CropSide, LayerId};
use crate::geom::Size;

/// DOM attribute carrying a layer's id on its root element.
pub const ATTR_LAYER_ID: &str = "data-layer-id";
/// DOM attribute carrying a crop handle's side.
pub const ATTR_CROP_SIDE: &str = "data-crop-side";

/// Which part of a layer was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Body,
    CropHandle(CropSide),
}

/// Result of a hit test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub layer_id: LayerId,
    pub part: HitPart,
    /// Rendered box of the layer at the moment of the hit.
    pub bounds: Size,
}

impl Hit {
    #[must_use]
    pub fn body(layer_id: LayerId, bounds: Size) -> Self {
        Self { layer_id, part: HitPart::Body, bounds }
    }

    #[must_use]
    pub fn crop_handle(layer_id: LayerId, side: CropSide, bounds: Size) -> Self {
        Self { layer_id, part: HitPart::CropHandle(side), bounds }
    }

    /// Resolve a hit from the attributes found on the event target's ancestry.
    ///
    /// Returns `None` when no layer id is present or it does not parse, which
    /// callers treat as a click on empty canvas. An unknown side falls back to
    /// a body hit.
    #[must_use]
    pub fn from_attrs(layer_id: Option<&str>, crop_side: Option<&str>, bounds: Size) -> Option<Self> {
        let Ok(layer_id) = LayerId::parse_str(layer_id?.trim()) else {
            return None;
        };
        let part = crop_side.and_then(CropSide::parse).map_or(HitPart::Body, HitPart::CropHandle);
        Some(Self { layer_id, part, bounds })
    }
}
