//! Transform compositor: turns an image layer's style into a composed 3D
//! transform, a clip region, and the remaining visual appearance.
//!
//! Everything here is a pure function of its inputs. Identical inputs always
//! produce identical output, which is what lets the render gate skip layers
//! whose inputs did not change.
//!
//! The transform is an ordered list of operations. Order matters because 3D
//! rotations do not commute; [`compose`] always emits them as:
//!
//! 1. perspective
//! 2. rotateX, rotateY, rotateZ
//! 3. uniform scale
//! 4. flip (scaleX, scaleY)
//! 5. depth translation (the selection "lift")

#[cfg(test)]
#[path = "compose_test.rs"]
mod compose_test;

use std::fmt;
use std::ops::Mul;

use crate::consts::{
    LIFT_IDLE_PX, LIFT_SELECTED_PX, PERSPECTIVE_3D_PX, PERSPECTIVE_FLAT_PX, SCALE_NEUTRAL, SELECTED_BRIGHTNESS,
    TRANSITION_IDLE_MS,
};
use crate::doc::{ClipPath, Crop, ImageStyle};

/// A single transform function.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransformOp {
    /// Perspective distance in pixels.
    Perspective(f64),
    /// Rotation about X in degrees.
    RotateX(f64),
    /// Rotation about Y in degrees.
    RotateY(f64),
    /// Rotation about Z in degrees.
    RotateZ(f64),
    Scale3d(f64, f64, f64),
    ScaleX(f64),
    ScaleY(f64),
    /// Translation along Z in pixels.
    TranslateZ(f64),
}

impl TransformOp {
    /// The 4×4 matrix for this operation.
    #[must_use]
    pub fn matrix(self) -> Matrix3d {
        match self {
            Self::Perspective(d) => Matrix3d::perspective(d),
            Self::RotateX(deg) => Matrix3d::rotation_x(deg.to_radians()),
            Self::RotateY(deg) => Matrix3d::rotation_y(deg.to_radians()),
            Self::RotateZ(deg) => Matrix3d::rotation_z(deg.to_radians()),
            Self::Scale3d(x, y, z) => Matrix3d::scale(x, y, z),
            Self::ScaleX(x) => Matrix3d::scale(x, 1.0, 1.0),
            Self::ScaleY(y) => Matrix3d::scale(1.0, y, 1.0),
            Self::TranslateZ(z) => Matrix3d::translation(0.0, 0.0, z),
        }
    }
}

impl fmt::Display for TransformOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Perspective(d) => write!(f, "perspective({}px)", Num(d)),
            Self::RotateX(deg) => write!(f, "rotateX({}deg)", Num(deg)),
            Self::RotateY(deg) => write!(f, "rotateY({}deg)", Num(deg)),
            Self::RotateZ(deg) => write!(f, "rotateZ({}deg)", Num(deg)),
            Self::Scale3d(x, y, z) => write!(f, "scale3d({}, {}, {})", Num(x), Num(y), Num(z)),
            Self::ScaleX(x) => write!(f, "scaleX({})", Num(x)),
            Self::ScaleY(y) => write!(f, "scaleY({})", Num(y)),
            Self::TranslateZ(z) => write!(f, "translateZ({}px)", Num(z)),
        }
    }
}

/// An ordered transform list. Displays as a CSS `transform` value.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformDescriptor {
    ops: Vec<TransformOp>,
}

impl TransformDescriptor {
    #[must_use]
    pub fn ops(&self) -> &[TransformOp] {
        &self.ops
    }

    /// The composed matrix, applying operations left to right as CSS does.
    #[must_use]
    pub fn matrix(&self) -> Matrix3d {
        self.ops.iter().fold(Matrix3d::IDENTITY, |acc, op| acc * op.matrix())
    }
}

impl fmt::Display for TransformDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, op) in self.ops.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{op}")?;
        }
        Ok(())
    }
}

/// The visible-shape constraint applied to a layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Clip {
    /// No clipping.
    None,
    /// Inset by the crop percentages (top/right/bottom/left).
    Inset(Crop),
    /// An explicit CSS shape, passed through verbatim.
    Shape(String),
}

impl Clip {
    /// CSS `clip-path` value, or `None` when unclipped.
    #[must_use]
    pub fn css(&self) -> Option<String> {
        match self {
            Self::None => None,
            Self::Inset(c) => Some(format!(
                "inset({}% {}% {}% {}%)",
                Num(c.top),
                Num(c.right),
                Num(c.bottom),
                Num(c.left)
            )),
            Self::Shape(expr) => Some(expr.clone()),
        }
    }
}

/// Output of [`compose`].
#[derive(Debug, Clone, PartialEq)]
pub struct Composed {
    pub transform: TransformDescriptor,
    pub clip: Clip,
    /// Whether the host should promote the layer (`will-change: transform`).
    pub will_change: bool,
    /// Transform transition duration in milliseconds; zero while dragging.
    pub transition_ms: u32,
}

/// Compose the transform and clip for an image layer.
#[must_use]
pub fn compose(style: &ImageStyle, selected: bool, dragging: bool) -> Composed {
    let perspective = if style.has_3d_rotation() { PERSPECTIVE_3D_PX } else { PERSPECTIVE_FLAT_PX };
    let s = style.scale / SCALE_NEUTRAL;
    let ops = vec![
        TransformOp::Perspective(perspective),
        TransformOp::RotateX(style.rotate_x),
        TransformOp::RotateY(style.rotate_y),
        TransformOp::RotateZ(style.rotate),
        TransformOp::Scale3d(s, s, 1.0),
        TransformOp::ScaleX(if style.flip_x { -1.0 } else { 1.0 }),
        TransformOp::ScaleY(if style.flip_y { -1.0 } else { 1.0 }),
        TransformOp::TranslateZ(if selected { LIFT_SELECTED_PX } else { LIFT_IDLE_PX }),
    ];
    Composed {
        transform: TransformDescriptor { ops },
        clip: clip_for(style),
        will_change: selected || dragging,
        transition_ms: if dragging { 0 } else { TRANSITION_IDLE_MS },
    }
}

/// Clip region for a style: an explicit shape wins, then a non-empty crop.
#[must_use]
pub fn clip_for(style: &ImageStyle) -> Clip {
    match &style.clip_path {
        ClipPath::Shape(expr) => Clip::Shape(expr.clone()),
        ClipPath::None if style.crop.is_cropped() => Clip::Inset(style.crop),
        ClipPath::None => Clip::None,
    }
}

/// Non-transform visual properties of an image layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Appearance {
    /// Opacity as a 0–1 fraction.
    pub opacity: f64,
    /// CSS `filter` value.
    pub filter: String,
    /// CSS `box-shadow`, or `None` for no shadow.
    pub box_shadow: Option<String>,
    pub border_radius: f64,
    /// Opacity of the grain overlay, when noise is enabled.
    pub noise_opacity: Option<f64>,
    /// Back faces stay visible while the layer is rotated in 3D.
    pub backface_visible: bool,
}

/// Derive the non-transform appearance of an image layer.
#[must_use]
pub fn appearance(style: &ImageStyle, selected: bool) -> Appearance {
    let mut filter = format!("blur({}px)", Num(style.blur));
    if selected {
        filter.push_str(&format!(" brightness({SELECTED_BRIGHTNESS})"));
    }
    Appearance {
        opacity: style.opacity / 100.0,
        filter,
        box_shadow: style.has_shadow().then(|| style.shadow.trim().to_string()),
        border_radius: style.border_radius,
        noise_opacity: (style.noise > 0.0).then(|| style.noise / 100.0),
        backface_visible: style.has_3d_rotation(),
    }
}

// =============================================================
// Matrix
// =============================================================

/// Column-major 4×4 matrix. `cols[c][r]` is row `r` of column `c`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix3d {
    pub cols: [[f64; 4]; 4],
}

impl Matrix3d {
    pub const IDENTITY: Self = Self {
        cols: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    #[must_use]
    pub fn translation(x: f64, y: f64, z: f64) -> Self {
        let mut m = Self::IDENTITY;
        m.cols[3] = [x, y, z, 1.0];
        m
    }

    #[must_use]
    pub fn scale(x: f64, y: f64, z: f64) -> Self {
        let mut m = Self::IDENTITY;
        m.cols[0][0] = x;
        m.cols[1][1] = y;
        m.cols[2][2] = z;
        m
    }

    #[must_use]
    pub fn rotation_x(radians: f64) -> Self {
        let (s, c) = radians.sin_cos();
        let mut m = Self::IDENTITY;
        m.cols[1] = [0.0, c, s, 0.0];
        m.cols[2] = [0.0, -s, c, 0.0];
        m
    }

    #[must_use]
    pub fn rotation_y(radians: f64) -> Self {
        let (s, c) = radians.sin_cos();
        let mut m = Self::IDENTITY;
        m.cols[0] = [c, 0.0, -s, 0.0];
        m.cols[2] = [s, 0.0, c, 0.0];
        m
    }

    #[must_use]
    pub fn rotation_z(radians: f64) -> Self {
        let (s, c) = radians.sin_cos();
        let mut m = Self::IDENTITY;
        m.cols[0] = [c, s, 0.0, 0.0];
        m.cols[1] = [-s, c, 0.0, 0.0];
        m
    }

    /// CSS `perspective(d)`: `w' = w - z / d`. A non-positive distance is the identity.
    #[must_use]
    pub fn perspective(distance: f64) -> Self {
        let mut m = Self::IDENTITY;
        if distance > 0.0 {
            m.cols[2][3] = -1.0 / distance;
        }
        m
    }

    /// Transform a point and divide by `w`.
    #[must_use]
    pub fn project(&self, p: [f64; 3]) -> [f64; 3] {
        let v = [p[0], p[1], p[2], 1.0];
        let mut out = [0.0; 4];
        for (r, slot) in out.iter_mut().enumerate() {
            *slot = (0..4).map(|c| self.cols[c][r] * v[c]).sum();
        }
        let w = if out[3] == 0.0 { 1.0 } else { out[3] };
        [out[0] / w, out[1] / w, out[2] / w]
    }
}

impl Mul for Matrix3d {
    type Output = Matrix3d;

    fn mul(self, rhs: Matrix3d) -> Matrix3d {
        let mut cols = [[0.0; 4]; 4];
        for (c, col) in cols.iter_mut().enumerate() {
            for (r, cell) in col.iter_mut().enumerate() {
                *cell = (0..4).map(|k| self.cols[k][r] * rhs.cols[c][k]).sum();
            }
        }
        Matrix3d { cols }
    }
}

/// CSS number formatting: shortest round-trip form, no negative zero.
struct Num(f64);

impl fmt::Display for Num {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0.0 { f.write_str("0") } else { write!(f, "{}", self.0) }
    }
}

/// Format a CSS length in pixels.
pub(crate) fn px(v: f64) -> String {
    format!("{}px", Num(v))
}

/// Format a CSS percentage.
pub(crate) fn pct(v: f64) -> String {
    format!("{}%", Num(v))
}
