//! Document model: layers, their style records, and the ordered layer store.
//!
//! This module defines what is on the canvas: image and text layers
//! ([`Layer`]), their visual style ([`ImageStyle`], [`TextStyle`]), the crop
//! insets ([`Crop`]) and the store that owns the ordered layer sequence and the
//! selection pointer ([`LayerStore`]).
//!
//! Style records are held behind [`Rc`] and are never edited in place. Every
//! update builds a fresh record, clamps it to the model invariants, and swaps
//! the pointer. The render gate relies on this: an unchanged `Rc` means an
//! unchanged style.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::consts::{CROP_MAX_PAIR_PCT, DEFAULT_MAX_SCALE, FONT_SIZE_MAX, FONT_SIZE_MIN, SCALE_NEUTRAL};
use crate::geom::Point;

/// Unique identifier for a layer.
pub type LayerId = Uuid;

/// Errors returned by [`LayerStore`] lookups and updates.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocError {
    /// No layer with this id exists (it may have been deleted concurrently).
    #[error("layer {0} not found")]
    NotFound(LayerId),
    /// The layer exists but is of the other kind.
    #[error("layer {id} is not an {expected} layer")]
    KindMismatch { id: LayerId, expected: LayerKind },
    /// A layer with this id is already in the store.
    #[error("layer {0} already exists")]
    Duplicate(LayerId),
}

/// The kind of a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    Image,
    Text,
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Image => f.write_str("image"),
            Self::Text => f.write_str("text"),
        }
    }
}

// =============================================================
// Crop
// =============================================================

/// One edge of a layer's box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CropSide {
    Top,
    Right,
    Bottom,
    Left,
}

impl CropSide {
    /// All four sides in CSS inset order.
    pub const ALL: [CropSide; 4] = [CropSide::Top, CropSide::Right, CropSide::Bottom, CropSide::Left];

    /// The side facing this one across the box.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Top => Self::Bottom,
            Self::Right => Self::Left,
            Self::Bottom => Self::Top,
            Self::Left => Self::Right,
        }
    }

    /// Whether this side moves along the horizontal axis (left/right).
    #[must_use]
    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }

    /// Lowercase name, as used in DOM data attributes.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Right => "right",
            Self::Bottom => "bottom",
            Self::Left => "left",
        }
    }

    /// Parse a lowercase side name.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "top" => Some(Self::Top),
            "right" => Some(Self::Right),
            "bottom" => Some(Self::Bottom),
            "left" => Some(Self::Left),
            _ => None,
        }
    }
}

/// Crop insets, each a percentage (0–100) of the layer's own rendered box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Crop {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Crop {
    /// No cropping on any side.
    pub const NONE: Crop = Crop { top: 0.0, right: 0.0, bottom: 0.0, left: 0.0 };

    #[must_use]
    pub fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self { top, right, bottom, left }
    }

    /// Whether any side is cropped.
    #[must_use]
    pub fn is_cropped(&self) -> bool {
        self.top > 0.0 || self.right > 0.0 || self.bottom > 0.0 || self.left > 0.0
    }

    #[must_use]
    pub fn side(&self, side: CropSide) -> f64 {
        match side {
            CropSide::Top => self.top,
            CropSide::Right => self.right,
            CropSide::Bottom => self.bottom,
            CropSide::Left => self.left,
        }
    }

    /// Copy of this crop with one side replaced (no clamping).
    #[must_use]
    pub fn with_side(mut self, side: CropSide, value: f64) -> Self {
        match side {
            CropSide::Top => self.top = value,
            CropSide::Right => self.right = value,
            CropSide::Bottom => self.bottom = value,
            CropSide::Left => self.left = value,
        }
        self
    }

    /// Whether the crop satisfies the model invariants: every side within
    /// `0..=100` and each opposing pair summing to at most 90 (up to float
    /// rounding of the complementary subtraction).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        let in_range = |v: f64| (0.0..=100.0).contains(&v);
        in_range(self.top)
            && in_range(self.right)
            && in_range(self.bottom)
            && in_range(self.left)
            && self.top + self.bottom <= CROP_MAX_PAIR_PCT + CROP_EPSILON
            && self.left + self.right <= CROP_MAX_PAIR_PCT + CROP_EPSILON
    }

    /// Clamp to the model invariants.
    ///
    /// Each side is first clamped to `0..=100` (non-finite values become 0).
    /// An opposing pair whose sum exceeds 90 is scaled down proportionally so
    /// it sums to exactly 90. A crop that is already valid comes back unchanged.
    #[must_use]
    pub fn clamped(self) -> Self {
        let side = |v: f64| clamp_finite(v, 0.0, 100.0, 0.0);
        let (top, bottom) = clamp_pair(side(self.top), side(self.bottom));
        let (left, right) = clamp_pair(side(self.left), side(self.right));
        Self { top, right, bottom, left }
    }
}

const CROP_EPSILON: f64 = 1e-9;

fn clamp_pair(a: f64, b: f64) -> (f64, f64) {
    let sum = a + b;
    if sum <= CROP_MAX_PAIR_PCT {
        return (a, b);
    }
    let factor = CROP_MAX_PAIR_PCT / sum;
    let a = a * factor;
    let b = (b * factor).min(CROP_MAX_PAIR_PCT - a);
    (a, b)
}

/// Clamp `v` into `lo..=hi`, mapping non-finite input to `neutral`.
fn clamp_finite(v: f64, lo: f64, hi: f64, neutral: f64) -> f64 {
    if v.is_finite() { v.clamp(lo, hi) } else { neutral }
}

// =============================================================
// Clip path
// =============================================================

/// An explicit clip shape. When present it overrides [`Crop`] entirely.
///
/// Serialized as a plain string: `"none"` or a CSS shape expression such as
/// `"circle(50%)"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ClipPath {
    #[default]
    None,
    Shape(String),
}

impl ClipPath {
    #[must_use]
    pub fn shape(expr: impl Into<String>) -> Self {
        Self::from(expr.into())
    }

    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

impl From<String> for ClipPath {
    fn from(raw: String) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed == "none" {
            Self::None
        } else {
            Self::Shape(trimmed.to_string())
        }
    }
}

impl From<ClipPath> for String {
    fn from(clip: ClipPath) -> Self {
        match clip {
            ClipPath::None => "none".to_string(),
            ClipPath::Shape(expr) => expr,
        }
    }
}

// =============================================================
// Image style
// =============================================================

/// Visual style of an image layer.
///
/// Absent fields deserialize to their neutral value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImageStyle {
    /// Uniform scale in percent; 100 is unscaled.
    pub scale: f64,
    /// Rotation about Z in degrees.
    pub rotate: f64,
    /// Rotation about X in degrees.
    pub rotate_x: f64,
    /// Rotation about Y in degrees.
    pub rotate_y: f64,
    pub flip_x: bool,
    pub flip_y: bool,
    /// Corner radius in pixels.
    pub border_radius: f64,
    /// Box-shadow preset, or `"none"`.
    pub shadow: String,
    /// Opacity in percent.
    pub opacity: f64,
    /// Gaussian blur radius in pixels.
    pub blur: f64,
    /// Film-grain overlay intensity in percent.
    pub noise: f64,
    pub crop: Crop,
    pub clip_path: ClipPath,
}

impl Default for ImageStyle {
    fn default() -> Self {
        Self {
            scale: SCALE_NEUTRAL,
            rotate: 0.0,
            rotate_x: 0.0,
            rotate_y: 0.0,
            flip_x: false,
            flip_y: false,
            border_radius: 0.0,
            shadow: "none".to_string(),
            opacity: 100.0,
            blur: 0.0,
            noise: 0.0,
            crop: Crop::NONE,
            clip_path: ClipPath::None,
        }
    }
}

impl ImageStyle {
    /// Whether X or Y rotation is present.
    #[must_use]
    pub fn has_3d_rotation(&self) -> bool {
        self.rotate_x != 0.0 || self.rotate_y != 0.0
    }

    #[must_use]
    pub fn has_shadow(&self) -> bool {
        let shadow = self.shadow.trim();
        !shadow.is_empty() && shadow != "none"
    }

    /// Clamp every numeric field to its valid range; `max_scale` bounds `scale`.
    #[must_use]
    pub fn clamped(self, max_scale: f64) -> Self {
        Self {
            scale: clamp_finite(self.scale, 0.0, max_scale, SCALE_NEUTRAL),
            rotate: finite_or_zero(self.rotate),
            rotate_x: finite_or_zero(self.rotate_x),
            rotate_y: finite_or_zero(self.rotate_y),
            border_radius: clamp_finite(self.border_radius, 0.0, f64::MAX, 0.0),
            opacity: clamp_finite(self.opacity, 0.0, 100.0, 100.0),
            blur: clamp_finite(self.blur, 0.0, f64::MAX, 0.0),
            noise: clamp_finite(self.noise, 0.0, 100.0, 0.0),
            crop: self.crop.clamped(),
            ..self
        }
    }
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() { v } else { 0.0 }
}

// =============================================================
// Text style
// =============================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

impl TextAlign {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

/// Visual style of a text layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextStyle {
    /// Font size in pixels.
    pub font_size: f64,
    pub font_family: String,
    /// CSS font weight (`"bold"`, `"700"`, ...).
    pub font_weight: String,
    pub color: String,
    /// CSS text-shadow value, or `"none"`.
    pub text_shadow: String,
    pub background_color: String,
    /// Whether `background_color` is painted behind the text.
    pub show_background: bool,
    pub border_radius: f64,
    pub padding: f64,
    pub text_align: TextAlign,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_size: 24.0,
            font_family: "Arial".to_string(),
            font_weight: "bold".to_string(),
            color: "#ffffff".to_string(),
            text_shadow: "2px 2px 4px rgba(0,0,0,0.8)".to_string(),
            background_color: "#000000".to_string(),
            show_background: false,
            border_radius: 0.0,
            padding: 0.0,
            text_align: TextAlign::Center,
        }
    }
}

impl TextStyle {
    /// Clamp numeric fields: font size to 12–72, radius and padding to ≥ 0.
    #[must_use]
    pub fn clamped(self) -> Self {
        Self {
            font_size: clamp_finite(self.font_size, FONT_SIZE_MIN, FONT_SIZE_MAX, 24.0),
            border_radius: clamp_finite(self.border_radius, 0.0, f64::MAX, 0.0),
            padding: clamp_finite(self.padding, 0.0, f64::MAX, 0.0),
            ..self
        }
    }
}

// =============================================================
// Layers
// =============================================================

/// A positioned image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageLayer {
    pub id: LayerId,
    /// Top-left corner in canvas pixels.
    #[serde(default)]
    pub position: Point,
    /// Opaque image reference (URL or data URL).
    pub src: String,
    #[serde(default)]
    pub style: Rc<ImageStyle>,
}

impl ImageLayer {
    /// A new image layer at the origin with a fresh id and the default style.
    #[must_use]
    pub fn new(src: impl Into<String>) -> Self {
        Self { id: Uuid::new_v4(), position: Point::default(), src: src.into(), style: Rc::default() }
    }

    #[must_use]
    pub fn at(mut self, position: Point) -> Self {
        self.position = position;
        self
    }

    #[must_use]
    pub fn with_style(mut self, style: ImageStyle) -> Self {
        self.style = Rc::new(style);
        self
    }
}

/// A positioned block of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLayer {
    pub id: LayerId,
    #[serde(default)]
    pub position: Point,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub style: Rc<TextStyle>,
}

impl TextLayer {
    /// A new text layer at the origin with a fresh id and the default style.
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self { id: Uuid::new_v4(), position: Point::default(), content: content.into(), style: Rc::default() }
    }

    #[must_use]
    pub fn at(mut self, position: Point) -> Self {
        self.position = position;
        self
    }

    #[must_use]
    pub fn with_style(mut self, style: TextStyle) -> Self {
        self.style = Rc::new(style);
        self
    }
}

/// A layer on the canvas, tagged by kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Layer {
    Image(ImageLayer),
    Text(TextLayer),
}

impl Layer {
    #[must_use]
    pub fn id(&self) -> LayerId {
        match self {
            Self::Image(img) => img.id,
            Self::Text(txt) => txt.id,
        }
    }

    #[must_use]
    pub fn kind(&self) -> LayerKind {
        match self {
            Self::Image(_) => LayerKind::Image,
            Self::Text(_) => LayerKind::Text,
        }
    }

    #[must_use]
    pub fn position(&self) -> Point {
        match self {
            Self::Image(img) => img.position,
            Self::Text(txt) => txt.position,
        }
    }

    #[must_use]
    pub fn as_image(&self) -> Option<&ImageLayer> {
        match self {
            Self::Image(img) => Some(img),
            Self::Text(_) => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&TextLayer> {
        match self {
            Self::Text(txt) => Some(txt),
            Self::Image(_) => None,
        }
    }

    fn position_mut(&mut self) -> &mut Point {
        match self {
            Self::Image(img) => &mut img.position,
            Self::Text(txt) => &mut txt.position,
        }
    }
}

impl From<ImageLayer> for Layer {
    fn from(img: ImageLayer) -> Self {
        Self::Image(img)
    }
}

impl From<TextLayer> for Layer {
    fn from(txt: TextLayer) -> Self {
        Self::Text(txt)
    }
}

// =============================================================
// Store
// =============================================================

/// Ordered sequence of layers plus the selection pointer.
///
/// Insertion order is the paint order within each kind. Lookups and updates
/// referencing a missing id fail with [`DocError::NotFound`].
#[derive(Debug, Clone)]
pub struct LayerStore {
    layers: Vec<Layer>,
    selected: Option<LayerId>,
    max_scale: f64,
}

impl LayerStore {
    /// Create an empty store using the default scale limit.
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_scale(DEFAULT_MAX_SCALE)
    }

    /// Create an empty store that clamps `ImageStyle::scale` to `max_scale`.
    ///
    /// A limit that is not finite or is below 1 falls back to the default.
    #[must_use]
    pub fn with_max_scale(max_scale: f64) -> Self {
        let max_scale = if max_scale.is_finite() && max_scale >= 1.0 { max_scale } else { DEFAULT_MAX_SCALE };
        Self { layers: Vec::new(), selected: None, max_scale }
    }

    #[must_use]
    pub fn max_scale(&self) -> f64 {
        self.max_scale
    }

    /// Append a layer. Its style is clamped on the way in.
    ///
    /// # Errors
    ///
    /// Returns [`DocError::Duplicate`] if the id is already present.
    pub fn push(&mut self, layer: impl Into<Layer>) -> Result<LayerId, DocError> {
        let mut layer = layer.into();
        let id = layer.id();
        if self.index_of(&id).is_some() {
            return Err(DocError::Duplicate(id));
        }
        match &mut layer {
            Layer::Image(img) => {
                img.style = Rc::new(clamp_image_style(&id, (*img.style).clone(), self.max_scale));
            }
            Layer::Text(txt) => {
                txt.style = Rc::new(clamp_text_style(&id, (*txt.style).clone()));
            }
        }
        self.layers.push(layer);
        tracing::debug!(%id, "layer added");
        Ok(id)
    }

    /// Look up a layer by id.
    ///
    /// # Errors
    ///
    /// Returns [`DocError::NotFound`] if no layer has this id.
    pub fn get(&self, id: &LayerId) -> Result<&Layer, DocError> {
        self.layers.iter().find(|l| l.id() == *id).ok_or(DocError::NotFound(*id))
    }

    /// Look up an image layer by id.
    ///
    /// # Errors
    ///
    /// [`DocError::NotFound`] if absent, [`DocError::KindMismatch`] for a text layer.
    pub fn get_image(&self, id: &LayerId) -> Result<&ImageLayer, DocError> {
        self.get(id)?
            .as_image()
            .ok_or(DocError::KindMismatch { id: *id, expected: LayerKind::Image })
    }

    /// Look up a text layer by id.
    ///
    /// # Errors
    ///
    /// [`DocError::NotFound`] if absent, [`DocError::KindMismatch`] for an image layer.
    pub fn get_text(&self, id: &LayerId) -> Result<&TextLayer, DocError> {
        self.get(id)?
            .as_text()
            .ok_or(DocError::KindMismatch { id: *id, expected: LayerKind::Text })
    }

    /// Replace an image layer's style wholesale, clamping it first.
    ///
    /// Returns the newly stored record.
    ///
    /// # Errors
    ///
    /// [`DocError::NotFound`] or [`DocError::KindMismatch`].
    pub fn replace_image_style(&mut self, id: &LayerId, style: ImageStyle) -> Result<Rc<ImageStyle>, DocError> {
        let max_scale = self.max_scale;
        let img = self.image_mut(id)?;
        let style = Rc::new(clamp_image_style(id, style, max_scale));
        img.style = Rc::clone(&style);
        Ok(style)
    }

    /// Replace a text layer's style wholesale, clamping it first.
    ///
    /// # Errors
    ///
    /// [`DocError::NotFound`] or [`DocError::KindMismatch`].
    pub fn replace_text_style(&mut self, id: &LayerId, style: TextStyle) -> Result<Rc<TextStyle>, DocError> {
        let txt = self.text_mut(id)?;
        let style = Rc::new(clamp_text_style(id, style));
        txt.style = Rc::clone(&style);
        Ok(style)
    }

    /// Replace only the crop of an image layer. A new style record is built.
    ///
    /// # Errors
    ///
    /// [`DocError::NotFound`] or [`DocError::KindMismatch`].
    pub fn set_crop(&mut self, id: &LayerId, crop: Crop) -> Result<Rc<ImageStyle>, DocError> {
        let current = self.get_image(id)?;
        let next = ImageStyle { crop, ..(*current.style).clone() };
        self.replace_image_style(id, next)
    }

    /// Move a layer.
    ///
    /// # Errors
    ///
    /// [`DocError::NotFound`] if no layer has this id.
    pub fn set_position(&mut self, id: &LayerId, position: Point) -> Result<(), DocError> {
        let layer = self.layer_mut(id)?;
        *layer.position_mut() = position;
        Ok(())
    }

    /// Replace a text layer's content.
    ///
    /// # Errors
    ///
    /// [`DocError::NotFound`] or [`DocError::KindMismatch`].
    pub fn set_content(&mut self, id: &LayerId, content: impl Into<String>) -> Result<(), DocError> {
        let txt = self.text_mut(id)?;
        txt.content = content.into();
        Ok(())
    }

    /// Remove a layer, clearing the selection if it pointed at it.
    ///
    /// # Errors
    ///
    /// [`DocError::NotFound`] if no layer has this id.
    pub fn remove(&mut self, id: &LayerId) -> Result<Layer, DocError> {
        let idx = self.index_of(id).ok_or(DocError::NotFound(*id))?;
        if self.selected == Some(*id) {
            self.selected = None;
        }
        tracing::debug!(%id, "layer removed");
        Ok(self.layers.remove(idx))
    }

    /// Point the selection at a layer, or clear it with `None`.
    ///
    /// # Errors
    ///
    /// [`DocError::NotFound`] if `id` does not name a layer; the selection is
    /// left unchanged.
    pub fn select(&mut self, id: Option<LayerId>) -> Result<(), DocError> {
        if let Some(id) = id {
            self.get(&id)?;
        }
        self.selected = id;
        Ok(())
    }

    /// The selected layer id, if any.
    #[must_use]
    pub fn selected(&self) -> Option<LayerId> {
        self.selected
    }

    #[must_use]
    pub fn is_selected(&self, id: &LayerId) -> bool {
        self.selected.as_ref() == Some(id)
    }

    /// All layers in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter()
    }

    /// Layer ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = LayerId> + '_ {
        self.layers.iter().map(Layer::id)
    }

    /// Image layers in insertion order.
    pub fn images(&self) -> impl Iterator<Item = &ImageLayer> {
        self.layers.iter().filter_map(Layer::as_image)
    }

    /// Text layers in insertion order.
    pub fn texts(&self) -> impl Iterator<Item = &TextLayer> {
        self.layers.iter().filter_map(Layer::as_text)
    }

    #[must_use]
    pub fn has_images(&self) -> bool {
        self.images().next().is_some()
    }

    #[must_use]
    pub fn contains(&self, id: &LayerId) -> bool {
        self.index_of(id).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    fn index_of(&self, id: &LayerId) -> Option<usize> {
        self.layers.iter().position(|l| l.id() == *id)
    }

    fn layer_mut(&mut self, id: &LayerId) -> Result<&mut Layer, DocError> {
        self.layers.iter_mut().find(|l| l.id() == *id).ok_or(DocError::NotFound(*id))
    }

    fn image_mut(&mut self, id: &LayerId) -> Result<&mut ImageLayer, DocError> {
        match self.layer_mut(id)? {
            Layer::Image(img) => Ok(img),
            Layer::Text(_) => Err(DocError::KindMismatch { id: *id, expected: LayerKind::Image }),
        }
    }

    fn text_mut(&mut self, id: &LayerId) -> Result<&mut TextLayer, DocError> {
        match self.layer_mut(id)? {
            Layer::Text(txt) => Ok(txt),
            Layer::Image(_) => Err(DocError::KindMismatch { id: *id, expected: LayerKind::Text }),
        }
    }
}

impl Default for LayerStore {
    fn default() -> Self {
        Self::new()
    }
}

fn clamp_image_style(id: &LayerId, style: ImageStyle, max_scale: f64) -> ImageStyle {
    let clamped = style.clone().clamped(max_scale);
    if clamped != style {
        tracing::warn!(%id, "image style clamped to valid range");
    }
    clamped
}

fn clamp_text_style(id: &LayerId, style: TextStyle) -> TextStyle {
    let clamped = style.clone().clamped();
    if clamped != style {
        tracing::warn!(%id, "text style clamped to valid range");
    }
    clamped
}
