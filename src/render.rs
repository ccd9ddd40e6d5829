//! Scene construction: turns the layer store into an ordered paint list.
//!
//! `render` does not touch the DOM. It produces a [`Scene`] describing what
//! to draw (background, empty-state prompt, image layers, then text layers)
//! and which layers the gate allowed to be skipped. `dom` applies it.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::rc::Rc;

use crate::compose::{self, Appearance, Composed, pct, px};
use crate::config::CanvasConfig;
use crate::consts::{CROP_HANDLE_PX, TEXT_LINE_HEIGHT};
use crate::doc::{Crop, CropSide, ImageLayer, LayerId, LayerStore, TextLayer, TextStyle};
use crate::gate::{Decision, ImageGateKey, RenderGate, TextGateKey};
use crate::geom::{Point, Size};
use crate::input::UiState;

/// Label shown on the empty-state affordance.
pub const EMPTY_STATE_PROMPT: &str = "Click to Upload";
/// Label shown inside the crop overlay.
pub const CROP_HINT: &str = "Drag edges to crop";
/// Corner radius of the canvas itself.
pub const CANVAS_RADIUS_PX: f64 = 8.0;
/// Fractal-noise texture used for the grain overlay.
pub const NOISE_TEXTURE: &str = "url(\"data:image/svg+xml,%3Csvg viewBox='0 0 200 200' xmlns='http://www.w3.org/2000/svg'%3E%3Cfilter id='noiseFilter'%3E%3CfeTurbulence type='fractalNoise' baseFrequency='1.5' numOctaves='4' seed='15' stitchTiles='stitch'/%3E%3CfeColorMatrix type='saturate' values='0'/%3E%3CfeComponentTransfer%3E%3CfeFuncA type='discrete' tableValues='1 1'/%3E%3C/feComponentTransfer%3E%3C/filter%3E%3Crect width='100%25' height='100%25' filter='url(%23noiseFilter)'/%3E%3C/svg%3E\")";

/// Selection ring and handle color.
const ACCENT: &str = "var(--primary, #3b82f6)";

/// A CSS property/value pair.
pub type Decl = (&'static str, String);

// ── Z order ─────────────────────────────────────────────────────

/// Stacking tier. Ordering of variants is the stacking order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ZTier {
    ImageIdle,
    ImageSelected,
    Text,
    TextSelected,
    Cropping,
}

impl ZTier {
    #[must_use]
    pub fn z_index(self) -> i32 {
        match self {
            Self::ImageIdle => 10,
            Self::ImageSelected => 20,
            Self::Text => 30,
            Self::TextSelected => 40,
            Self::Cropping => 50,
        }
    }

    #[must_use]
    pub fn for_image(selected: bool, cropping: bool) -> Self {
        match (selected, cropping) {
            (true, true) => Self::Cropping,
            (true, false) => Self::ImageSelected,
            _ => Self::ImageIdle,
        }
    }

    #[must_use]
    pub fn for_text(selected: bool) -> Self {
        if selected { Self::TextSelected } else { Self::Text }
    }
}

// ── Nodes ───────────────────────────────────────────────────────

/// Crop-editing overlay drawn over a selected image.
#[derive(Debug, Clone, PartialEq)]
pub struct CropOverlay {
    /// Dashed guide, inset by the current crop.
    pub guide: Crop,
    /// Handles, one per side, on the edges of the layer box.
    pub handles: [CropSide; 4],
    pub hint: &'static str,
}

impl CropOverlay {
    fn new(crop: Crop) -> Self {
        Self { guide: crop, handles: CropSide::ALL, hint: CROP_HINT }
    }

    /// Declarations positioning the dashed guide inside the layer box.
    #[must_use]
    pub fn guide_decls(&self) -> Vec<Decl> {
        vec![
            ("position", "absolute".to_string()),
            ("top", pct(self.guide.top)),
            ("right", pct(self.guide.right)),
            ("bottom", pct(self.guide.bottom)),
            ("left", pct(self.guide.left)),
            ("border", format!("4px dashed {ACCENT}")),
            ("pointer-events", "none".to_string()),
        ]
    }

    /// Declarations for one edge handle. Handles sit on the layer box edges.
    #[must_use]
    pub fn handle_decls(side: CropSide) -> Vec<Decl> {
        let thickness = px(CROP_HANDLE_PX);
        let mut out = vec![
            ("position", "absolute".to_string()),
            ("background", ACCENT.to_string()),
            ("pointer-events", "auto".to_string()),
        ];
        if side.is_horizontal() {
            out.extend([
                (side.as_str(), "0".to_string()),
                ("top", "0".to_string()),
                ("bottom", "0".to_string()),
                ("width", thickness),
                ("cursor", "ew-resize".to_string()),
            ]);
        } else {
            out.extend([
                (side.as_str(), "0".to_string()),
                ("left", "0".to_string()),
                ("right", "0".to_string()),
                ("height", thickness),
                ("cursor", "ns-resize".to_string()),
            ]);
        }
        out
    }

    /// Declarations for the hint label.
    #[must_use]
    pub fn hint_decls() -> Vec<Decl> {
        vec![
            ("position", "absolute".to_string()),
            ("top", "-32px".to_string()),
            ("left", "50%".to_string()),
            ("transform", "translateX(-50%)".to_string()),
            ("padding", "4px 8px".to_string()),
            ("border-radius", "4px".to_string()),
            ("background", "rgba(0, 0, 0, 0.75)".to_string()),
            ("color", "#ffffff".to_string()),
            ("font-size", "10px".to_string()),
            ("white-space", "nowrap".to_string()),
            ("pointer-events", "none".to_string()),
        ]
    }
}

/// Everything needed to paint one image layer.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageNode {
    pub id: LayerId,
    pub src: String,
    pub position: Point,
    pub z: ZTier,
    pub selected: bool,
    pub composed: Composed,
    pub appearance: Appearance,
    pub crop_overlay: Option<CropOverlay>,
}

impl ImageNode {
    fn new(layer: &ImageLayer, selected: bool, dragging: bool, cropping: bool) -> Self {
        Self {
            id: layer.id,
            src: layer.src.clone(),
            position: layer.position,
            z: ZTier::for_image(selected, cropping),
            selected,
            composed: compose::compose(&layer.style, selected, dragging),
            appearance: compose::appearance(&layer.style, selected),
            crop_overlay: cropping.then(|| CropOverlay::new(layer.style.crop)),
        }
    }

    /// Inline style of the layer's root element.
    #[must_use]
    pub fn decls(&self) -> Vec<Decl> {
        let a = &self.appearance;
        let c = &self.composed;
        let mut out = vec![
            ("position", "absolute".to_string()),
            ("left", px(self.position.x)),
            ("top", px(self.position.y)),
            ("z-index", self.z.z_index().to_string()),
            ("transform", c.transform.to_string()),
            ("transform-style", "preserve-3d".to_string()),
            ("transition", format!("transform {}ms linear", c.transition_ms)),
            ("opacity", a.opacity.to_string()),
            ("filter", a.filter.clone()),
            ("border-radius", px(a.border_radius)),
            ("box-shadow", a.box_shadow.clone().unwrap_or_else(|| "none".to_string())),
            ("backface-visibility", if a.backface_visible { "visible" } else { "hidden" }.to_string()),
            ("clip-path", c.clip.css().unwrap_or_else(|| "none".to_string())),
            ("will-change", if c.will_change { "transform" } else { "auto" }.to_string()),
            ("cursor", "move".to_string()),
        ];
        if self.selected && self.crop_overlay.is_none() {
            out.push(("outline", format!("2px solid {ACCENT}")));
        }
        out
    }

    /// What the layer's child elements are built from.
    #[must_use]
    pub fn content(&self) -> ImageContent {
        ImageContent {
            src: self.src.clone(),
            border_radius: self.appearance.border_radius,
            noise_opacity: self.appearance.noise_opacity,
            crop_overlay: self.crop_overlay.clone(),
        }
    }

    /// Inline style of the grain overlay, when noise is enabled.
    #[must_use]
    pub fn noise_decls(&self) -> Option<Vec<Decl>> {
        self.appearance.noise_opacity.map(|opacity| {
            vec![
                ("position", "absolute".to_string()),
                ("inset", "0".to_string()),
                ("pointer-events", "none".to_string()),
                ("border-radius", "inherit".to_string()),
                ("mix-blend-mode", "overlay".to_string()),
                ("opacity", opacity.to_string()),
                ("background-image", NOISE_TEXTURE.to_string()),
                ("background-repeat", "repeat".to_string()),
            ]
        })
    }
}

/// Inputs of an image layer's children (image, crop overlay, grain).
///
/// Moves and transform changes only touch the root element; the children are
/// rebuilt when this changes.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageContent {
    pub src: String,
    pub border_radius: f64,
    pub noise_opacity: Option<f64>,
    pub crop_overlay: Option<CropOverlay>,
}

/// Everything needed to paint one text layer.
#[derive(Debug, Clone, PartialEq)]
pub struct TextNode {
    pub id: LayerId,
    pub content: String,
    pub position: Point,
    pub z: ZTier,
    pub selected: bool,
    pub style: Rc<TextStyle>,
}

impl TextNode {
    fn new(layer: &TextLayer, selected: bool) -> Self {
        Self {
            id: layer.id,
            content: layer.content.clone(),
            position: layer.position,
            z: ZTier::for_text(selected),
            selected,
            style: Rc::clone(&layer.style),
        }
    }

    /// Inline style of the text element.
    #[must_use]
    pub fn decls(&self) -> Vec<Decl> {
        let s = &self.style;
        let background = if s.show_background { s.background_color.clone() } else { "transparent".to_string() };
        let mut out = vec![
            ("position", "absolute".to_string()),
            ("left", px(self.position.x)),
            ("top", px(self.position.y)),
            ("z-index", self.z.z_index().to_string()),
            ("font-size", px(s.font_size)),
            ("font-family", s.font_family.clone()),
            ("font-weight", s.font_weight.clone()),
            ("color", s.color.clone()),
            ("text-shadow", s.text_shadow.clone()),
            ("background-color", background),
            ("border-radius", px(s.border_radius)),
            ("padding", px(s.padding)),
            ("text-align", s.text_align.as_str().to_string()),
            ("line-height", TEXT_LINE_HEIGHT.to_string()),
            ("white-space", "pre".to_string()),
            ("user-select", "none".to_string()),
            ("cursor", "move".to_string()),
        ];
        if self.selected {
            out.push(("outline", format!("2px solid {ACCENT}")));
        }
        out
    }
}

/// What to do with one layer this frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    /// Inputs unchanged since the last paint; leave the element alone.
    Skip,
    Image(ImageNode),
    Text(TextNode),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneItem {
    pub id: LayerId,
    pub z: ZTier,
    pub paint: Paint,
}

/// One frame's paint list.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub size: Size,
    pub background: String,
    /// Prompt for the empty-state affordance, present when there are no images.
    pub empty_state: Option<&'static str>,
    /// Image layers in insertion order, then text layers in insertion order.
    pub items: Vec<SceneItem>,
    /// Layers painted in an earlier frame that no longer exist. The surface
    /// drops every element not in `items`, so this is informational.
    pub removed: Vec<LayerId>,
}

impl Scene {
    /// Inline style of the canvas element.
    #[must_use]
    pub fn canvas_decls(&self) -> Vec<Decl> {
        vec![
            ("position", "relative".to_string()),
            ("overflow", "hidden".to_string()),
            ("width", px(self.size.width)),
            ("height", px(self.size.height)),
            ("background", self.background.clone()),
            ("border-radius", px(CANVAS_RADIUS_PX)),
            ("user-select", "none".to_string()),
        ]
    }

    /// Inline style of the empty-state affordance.
    #[must_use]
    pub fn empty_state_decls() -> Vec<Decl> {
        vec![
            ("position", "absolute".to_string()),
            ("left", "50%".to_string()),
            ("top", "50%".to_string()),
            ("transform", "translate(-50%, -50%)".to_string()),
            ("width", "256px".to_string()),
            ("height", "160px".to_string()),
            ("display", "flex".to_string()),
            ("align-items", "center".to_string()),
            ("justify-content", "center".to_string()),
            ("border", "2px dashed #a3a3a3".to_string()),
            ("border-radius", "8px".to_string()),
            ("color", "#a3a3a3".to_string()),
            ("font-size", "12px".to_string()),
            ("cursor", "pointer".to_string()),
            ("z-index", ZTier::ImageIdle.z_index().to_string()),
        ]
    }

    /// Ids of items that must be repainted this frame.
    pub fn redrawn(&self) -> impl Iterator<Item = LayerId> + '_ {
        self.items.iter().filter(|item| item.paint != Paint::Skip).map(|item| item.id)
    }
}

/// Build the scene for the current store, consulting `gate` for every layer.
///
/// `dragging` is the layer currently being moved, if any.
pub fn render(
    doc: &LayerStore,
    ui: UiState,
    dragging: Option<LayerId>,
    canvas: &CanvasConfig,
    gate: &mut RenderGate,
) -> Scene {
    let mut items = Vec::with_capacity(doc.len());

    for layer in doc.images() {
        let selected = doc.is_selected(&layer.id);
        let is_dragging = dragging == Some(layer.id);
        let cropping = selected && ui.crop_mode;
        let key = ImageGateKey::new(layer, selected, is_dragging, cropping);
        let z = ZTier::for_image(selected, cropping);
        let paint = match gate.evaluate(key.into()) {
            Decision::Skip => Paint::Skip,
            Decision::Redraw => Paint::Image(ImageNode::new(layer, selected, is_dragging, cropping)),
        };
        items.push(SceneItem { id: layer.id, z, paint });
    }

    for layer in doc.texts() {
        let selected = doc.is_selected(&layer.id);
        let is_dragging = dragging == Some(layer.id);
        let key = TextGateKey::new(layer, selected, is_dragging);
        let z = ZTier::for_text(selected);
        let paint = match gate.evaluate(key.into()) {
            Decision::Skip => Paint::Skip,
            Decision::Redraw => Paint::Text(TextNode::new(layer, selected)),
        };
        items.push(SceneItem { id: layer.id, z, paint });
    }

    let live: Vec<LayerId> = doc.ids().collect();
    let removed = gate.retain(&live);

    Scene {
        size: canvas.size(),
        background: canvas.background.clone(),
        empty_state: (!doc.has_images()).then_some(EMPTY_STATE_PROMPT),
        items,
        removed,
    }
}
