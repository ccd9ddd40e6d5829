//! DOM element management and event wiring.
//!
//! The only module that talks to `web_sys`. [`DomSurface`] applies a
//! [`Scene`] to positioned `<div>` elements; the listener guards attach
//! closures to event targets and detach them when dropped.

use std::collections::{HashMap, HashSet};

use wasm_bindgen::JsCast as _;
use wasm_bindgen::JsValue;
use wasm_bindgen::closure::Closure;
use web_sys::{Document, Element, EventTarget, HtmlElement, MouseEvent};

use crate::compose::px;
use crate::doc::LayerId;
use crate::geom::{Point, Size};
use crate::hit::{ATTR_CROP_SIDE, ATTR_LAYER_ID, Hit};
use crate::input::SessionId;
use crate::render::{CropOverlay, Decl, ImageContent, ImageNode, Paint, Scene, TextNode};

// =============================================================
// Surface
// =============================================================

/// Maps scenes to live DOM elements under a container.
pub struct DomSurface {
    document: Document,
    canvas: HtmlElement,
    empty_state: Option<HtmlElement>,
    nodes: HashMap<LayerId, Mounted>,
}

/// A layer's root element and what its children were last built from.
struct Mounted {
    el: HtmlElement,
    /// `None` until an image's children are built; always `None` for text.
    content: Option<ImageContent>,
}

impl std::fmt::Debug for DomSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DomSurface")
            .field("nodes", &self.nodes.len())
            .field("empty_state", &self.empty_state.is_some())
            .finish_non_exhaustive()
    }
}

impl DomSurface {
    /// Create the canvas element inside `container`.
    ///
    /// # Errors
    ///
    /// Fails if the container is detached from a document or the element
    /// cannot be created.
    pub fn new(container: HtmlElement) -> Result<Self, JsValue> {
        let document = container
            .owner_document()
            .ok_or_else(|| JsValue::from_str("container has no owner document"))?;
        let canvas = create(&document, "div")?;
        container.append_child(&canvas)?;
        Ok(Self { document, canvas, empty_state: None, nodes: HashMap::new() })
    }

    #[must_use]
    pub fn canvas(&self) -> &HtmlElement {
        &self.canvas
    }

    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Pointer position relative to the canvas' top-left corner.
    #[must_use]
    pub fn canvas_point(&self, event: &MouseEvent) -> Point {
        let rect = self.canvas.get_bounding_client_rect();
        Point::new(f64::from(event.client_x()) - rect.left(), f64::from(event.client_y()) - rect.top())
    }

    /// Apply a scene. Skipped items are left untouched; elements of layers
    /// missing from the scene are removed.
    ///
    /// # Errors
    ///
    /// Propagates the first DOM exception. The surface may then be partially
    /// painted; the caller should force a full redraw.
    pub fn paint(&mut self, scene: &Scene) -> Result<(), JsValue> {
        replace_decls(&self.canvas, &scene.canvas_decls())?;
        self.sync_empty_state(scene.empty_state)?;

        let live: HashSet<LayerId> = scene.items.iter().map(|item| item.id).collect();
        self.nodes.retain(|id, mounted| {
            let keep = live.contains(id);
            if !keep {
                mounted.el.remove();
            }
            keep
        });

        for item in &scene.items {
            match &item.paint {
                Paint::Skip => {}
                Paint::Image(node) => {
                    let document = self.document.clone();
                    let mounted = self.mounted(node.id)?;
                    paint_image(&document, mounted, node)?;
                }
                Paint::Text(node) => {
                    let mounted = self.mounted(node.id)?;
                    paint_text(&mounted.el, node)?;
                }
            }
        }
        Ok(())
    }

    /// Drop what image children were built from, so the next paint of each
    /// image rebuilds them.
    pub fn forget_content(&mut self) {
        for mounted in self.nodes.values_mut() {
            mounted.content = None;
        }
    }

    fn sync_empty_state(&mut self, prompt: Option<&str>) -> Result<(), JsValue> {
        match (prompt, self.empty_state.take()) {
            (Some(_), Some(el)) => self.empty_state = Some(el),
            (Some(prompt), None) => {
                let el = create(&self.document, "div")?;
                replace_decls(&el, &Scene::empty_state_decls())?;
                el.set_text_content(Some(prompt));
                self.canvas.append_child(&el)?;
                self.empty_state = Some(el);
            }
            (None, Some(el)) => el.remove(),
            (None, None) => {}
        }
        Ok(())
    }

    fn mounted(&mut self, id: LayerId) -> Result<&mut Mounted, JsValue> {
        if !self.nodes.contains_key(&id) {
            let el = create(&self.document, "div")?;
            el.set_attribute(ATTR_LAYER_ID, &id.to_string())?;
            self.canvas.append_child(&el)?;
            self.nodes.insert(id, Mounted { el, content: None });
        }
        self.nodes.get_mut(&id).ok_or_else(|| JsValue::from_str("layer element missing"))
    }
}

/// Restyle the root in place; rebuild the children only when their inputs
/// changed.
fn paint_image(document: &Document, mounted: &mut Mounted, node: &ImageNode) -> Result<(), JsValue> {
    replace_decls(&mounted.el, &node.decls())?;
    let content = node.content();
    if mounted.content.as_ref() == Some(&content) {
        return Ok(());
    }
    mounted.content = None;
    build_image_children(document, &mounted.el, node)?;
    mounted.content = Some(content);
    Ok(())
}

fn build_image_children(document: &Document, el: &HtmlElement, node: &ImageNode) -> Result<(), JsValue> {
    el.set_inner_html("");

    if let Some(overlay) = &node.crop_overlay {
        paint_crop_overlay(document, el, overlay)?;
    }

    if let Some(decls) = node.noise_decls() {
        let noise = create(document, "div")?;
        replace_decls(&noise, &decls)?;
        el.append_child(&noise)?;
    }

    let img = create(document, "img")?;
    img.set_attribute("src", &node.src)?;
    img.set_attribute("alt", "Layer")?;
    img.set_attribute("draggable", "false")?;
    replace_decls(
        &img,
        &[
            ("display", "block".to_string()),
            ("pointer-events", "none".to_string()),
            ("max-width", "none".to_string()),
            ("max-height", "none".to_string()),
            ("border-radius", px(node.appearance.border_radius)),
        ],
    )?;
    el.append_child(&img)?;
    Ok(())
}

fn paint_crop_overlay(document: &Document, el: &HtmlElement, overlay: &CropOverlay) -> Result<(), JsValue> {
    let guide = create(document, "div")?;
    replace_decls(&guide, &overlay.guide_decls())?;
    el.append_child(&guide)?;

    for side in overlay.handles {
        let handle = create(document, "div")?;
        handle.set_attribute(ATTR_CROP_SIDE, side.as_str())?;
        replace_decls(&handle, &CropOverlay::handle_decls(side))?;
        el.append_child(&handle)?;
    }

    let hint = create(document, "div")?;
    hint.set_text_content(Some(overlay.hint));
    replace_decls(&hint, &CropOverlay::hint_decls())?;
    el.append_child(&hint)?;
    Ok(())
}

fn paint_text(el: &HtmlElement, node: &TextNode) -> Result<(), JsValue> {
    el.set_text_content(Some(&node.content));
    replace_decls(el, &node.decls())
}

fn create(document: &Document, tag: &str) -> Result<HtmlElement, JsValue> {
    document.create_element(tag)?.dyn_into::<HtmlElement>().map_err(JsValue::from)
}

/// Clear the element's inline style and apply `decls`.
fn replace_decls(el: &HtmlElement, decls: &[Decl]) -> Result<(), JsValue> {
    let style = el.style();
    style.set_css_text("");
    for (name, value) in decls {
        style.set_property(name, value)?;
    }
    Ok(())
}

// =============================================================
// Hit resolution
// =============================================================

/// Resolve what the event landed on from the target's data attributes.
///
/// `Ok(None)` means empty canvas.
///
/// # Errors
///
/// Propagates a failing `closest()` selector query.
pub fn resolve_hit(event: &MouseEvent) -> Result<Option<Hit>, JsValue> {
    let Some(target) = event.target() else {
        return Ok(None);
    };
    let Ok(el) = target.dyn_into::<Element>() else {
        return Ok(None);
    };
    let Some(layer_el) = el.closest(&format!("[{ATTR_LAYER_ID}]"))? else {
        return Ok(None);
    };
    let side = el.closest(&format!("[{ATTR_CROP_SIDE}]"))?.and_then(|h| h.get_attribute(ATTR_CROP_SIDE));
    let rect = layer_el.get_bounding_client_rect();
    let bounds = Size::new(rect.width(), rect.height());
    Ok(Hit::from_attrs(layer_el.get_attribute(ATTR_LAYER_ID).as_deref(), side.as_deref(), bounds))
}

// =============================================================
// Listeners
// =============================================================

type MouseClosure = Closure<dyn FnMut(MouseEvent)>;

/// One closure registered on one target for one event type.
///
/// Detached on drop.
struct Listener {
    target: EventTarget,
    kind: &'static str,
    closure: MouseClosure,
    attached: bool,
}

impl Listener {
    fn attach(target: &EventTarget, kind: &'static str, f: impl FnMut(MouseEvent) + 'static) -> Result<Self, JsValue> {
        let closure = Closure::wrap(Box::new(f) as Box<dyn FnMut(MouseEvent)>);
        target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())?;
        Ok(Self { target: target.clone(), kind, closure, attached: true })
    }

    fn detach(&mut self) {
        if !self.attached {
            return;
        }
        self.attached = false;
        let callback = self.closure.as_ref().unchecked_ref();
        if let Err(err) = self.target.remove_event_listener_with_callback(self.kind, callback) {
            tracing::warn!(?err, kind = self.kind, "failed to remove listener");
        }
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        self.detach();
    }
}

/// Canvas-level `mousedown` and `mouseleave` listeners, held for the
/// engine's lifetime.
pub struct PointerListeners {
    _down: Listener,
    _leave: Listener,
}

impl PointerListeners {
    /// # Errors
    ///
    /// Fails if either listener cannot be registered.
    pub fn attach(
        target: &EventTarget,
        on_down: impl FnMut(MouseEvent) + 'static,
        on_leave: impl FnMut(MouseEvent) + 'static,
    ) -> Result<Self, JsValue> {
        let down = Listener::attach(target, "mousedown", on_down)?;
        let leave = Listener::attach(target, "mouseleave", on_leave)?;
        Ok(Self { _down: down, _leave: leave })
    }
}

/// Document-level `mousemove`/`mouseup` listeners for one gesture.
///
/// Attached on pointer-down so the gesture keeps tracking after the pointer
/// leaves the layer. [`detach`](Self::detach) on every exit path; dropping the
/// guard detaches too.
pub struct GestureListeners {
    session: SessionId,
    on_move: Listener,
    on_up: Listener,
}

impl GestureListeners {
    /// # Errors
    ///
    /// Fails if either listener cannot be registered. A listener registered
    /// before the failure is removed again.
    pub fn attach(
        target: &EventTarget,
        session: SessionId,
        on_move: impl FnMut(MouseEvent) + 'static,
        on_up: impl FnMut(MouseEvent) + 'static,
    ) -> Result<Self, JsValue> {
        let on_move = Listener::attach(target, "mousemove", on_move)?;
        let on_up = Listener::attach(target, "mouseup", on_up)?;
        tracing::debug!(session, "gesture listeners attached");
        Ok(Self { session, on_move, on_up })
    }

    #[must_use]
    pub fn session(&self) -> SessionId {
        self.session
    }

    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.on_move.attached || self.on_up.attached
    }

    /// Remove both listeners from the document. The closures stay alive until
    /// the guard is dropped, so this is safe to call from inside them.
    pub fn detach(&mut self) {
        if self.is_attached() {
            tracing::debug!(session = self.session, "gesture listeners detached");
        }
        self.on_move.detach();
        self.on_up.detach();
    }
}
