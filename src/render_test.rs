use super::*;
use crate::doc::{ImageStyle, TextLayer};

fn decl<'a>(decls: &'a [Decl], name: &str) -> Option<&'a str> {
    decls.iter().find(|(n, _)| *n == name).map(|(_, v)| v.as_str())
}

fn image_node(scene: &Scene, id: LayerId) -> &ImageNode {
    match scene.items.iter().find(|item| item.id == id).map(|item| &item.paint) {
        Some(Paint::Image(node)) => node,
        other => panic!("expected image paint for {id}, got {other:?}"),
    }
}

fn text_node(scene: &Scene, id: LayerId) -> &TextNode {
    match scene.items.iter().find(|item| item.id == id).map(|item| &item.paint) {
        Some(Paint::Text(node)) => node,
        other => panic!("expected text paint for {id}, got {other:?}"),
    }
}

fn draw(doc: &LayerStore, ui: UiState, gate: &mut RenderGate) -> Scene {
    render(doc, ui, None, &CanvasConfig::default(), gate)
}

// =============================================================
// Z order
// =============================================================

#[test]
fn z_tiers_stack_in_order() {
    let tiers = [ZTier::ImageIdle, ZTier::ImageSelected, ZTier::Text, ZTier::TextSelected, ZTier::Cropping];
    for pair in tiers.windows(2) {
        assert!(pair[0] < pair[1]);
        assert!(pair[0].z_index() < pair[1].z_index());
    }
}

#[test]
fn z_tier_selection() {
    assert_eq!(ZTier::for_image(false, false), ZTier::ImageIdle);
    assert_eq!(ZTier::for_image(true, false), ZTier::ImageSelected);
    assert_eq!(ZTier::for_image(true, true), ZTier::Cropping);
    assert_eq!(ZTier::for_text(false), ZTier::Text);
    assert_eq!(ZTier::for_text(true), ZTier::TextSelected);
}

#[test]
fn selected_image_stays_below_text() {
    assert!(ZTier::ImageSelected < ZTier::Text);
    assert!(ZTier::Cropping > ZTier::TextSelected);
}

// =============================================================
// Scene shape
// =============================================================

#[test]
fn empty_store_shows_prompt() {
    let doc = LayerStore::new();
    let scene = draw(&doc, UiState::default(), &mut RenderGate::new());
    assert_eq!(scene.empty_state, Some(EMPTY_STATE_PROMPT));
    assert!(scene.items.is_empty());
    assert_eq!(scene.size, Size::new(800.0, 600.0));
}

#[test]
fn text_only_store_still_shows_prompt() {
    let mut doc = LayerStore::new();
    doc.push(TextLayer::new("hi")).unwrap();
    let scene = draw(&doc, UiState::default(), &mut RenderGate::new());
    assert_eq!(scene.empty_state, Some(EMPTY_STATE_PROMPT));
    assert_eq!(scene.items.len(), 1);
}

#[test]
fn images_come_before_texts() {
    let mut doc = LayerStore::new();
    let t1 = doc.push(TextLayer::new("first")).unwrap();
    let i1 = doc.push(ImageLayer::new("a.png")).unwrap();
    let t2 = doc.push(TextLayer::new("second")).unwrap();
    let i2 = doc.push(ImageLayer::new("b.png")).unwrap();
    let scene = draw(&doc, UiState::default(), &mut RenderGate::new());
    let order: Vec<LayerId> = scene.items.iter().map(|item| item.id).collect();
    assert_eq!(order, vec![i1, i2, t1, t2]);
    assert_eq!(scene.empty_state, None);
}

#[test]
fn background_comes_from_config() {
    let doc = LayerStore::new();
    let canvas = CanvasConfig { width: 400.0, height: 300.0, background: "linear-gradient(red, blue)".to_string() };
    let scene = render(&doc, UiState::default(), None, &canvas, &mut RenderGate::new());
    let decls = scene.canvas_decls();
    assert_eq!(decl(&decls, "background"), Some("linear-gradient(red, blue)"));
    assert_eq!(decl(&decls, "width"), Some("400px"));
    assert_eq!(decl(&decls, "border-radius"), Some("8px"));
}

// =============================================================
// Image nodes
// =============================================================

#[test]
fn idle_image_decls() {
    let mut doc = LayerStore::new();
    let id = doc.push(ImageLayer::new("a.png").at(Point::new(12.0, 34.0))).unwrap();
    let scene = draw(&doc, UiState::default(), &mut RenderGate::new());
    let node = image_node(&scene, id);
    assert_eq!(node.src, "a.png");
    assert!(node.crop_overlay.is_none());
    let decls = node.decls();
    assert_eq!(decl(&decls, "left"), Some("12px"));
    assert_eq!(decl(&decls, "top"), Some("34px"));
    assert_eq!(decl(&decls, "z-index"), Some("10"));
    assert_eq!(decl(&decls, "clip-path"), Some("none"));
    assert_eq!(decl(&decls, "transition"), Some("transform 100ms linear"));
    assert_eq!(decl(&decls, "box-shadow"), Some("none"));
    assert_eq!(decl(&decls, "outline"), None);
    assert!(decl(&decls, "transform").is_some_and(|t| t.starts_with("perspective(1500px)")));
}

#[test]
fn selected_image_gets_outline_and_lift() {
    let mut doc = LayerStore::new();
    let id = doc.push(ImageLayer::new("a.png")).unwrap();
    doc.select(Some(id)).unwrap();
    let scene = draw(&doc, UiState::default(), &mut RenderGate::new());
    let decls = image_node(&scene, id).decls();
    assert!(decl(&decls, "outline").is_some());
    assert_eq!(decl(&decls, "z-index"), Some("20"));
    assert!(decl(&decls, "transform").is_some_and(|t| t.ends_with("translateZ(20px)")));
    assert!(decl(&decls, "filter").is_some_and(|f| f.contains("brightness(1.03)")));
}

#[test]
fn crop_overlay_only_in_crop_mode_on_selection() {
    let mut doc = LayerStore::new();
    let id = doc.push(ImageLayer::new("a.png")).unwrap();
    let other = doc.push(ImageLayer::new("b.png")).unwrap();
    doc.select(Some(id)).unwrap();
    doc.set_crop(&id, Crop::new(10.0, 0.0, 0.0, 0.0)).unwrap();

    let scene = draw(&doc, UiState { crop_mode: false }, &mut RenderGate::new());
    assert!(image_node(&scene, id).crop_overlay.is_none());

    let scene = draw(&doc, UiState { crop_mode: true }, &mut RenderGate::new());
    let node = image_node(&scene, id);
    let overlay = node.crop_overlay.as_ref().unwrap();
    assert_eq!(overlay.guide, Crop::new(10.0, 0.0, 0.0, 0.0));
    assert_eq!(overlay.handles, CropSide::ALL);
    assert_eq!(overlay.hint, CROP_HINT);
    assert_eq!(node.z, ZTier::Cropping);
    assert!(image_node(&scene, other).crop_overlay.is_none());
    // The guide replaces the selection outline.
    assert_eq!(decl(&node.decls(), "outline"), None);
}

#[test]
fn cropped_image_clips_with_inset() {
    let mut doc = LayerStore::new();
    let id = doc.push(ImageLayer::new("a.png")).unwrap();
    doc.set_crop(&id, Crop::new(10.0, 0.0, 0.0, 0.0)).unwrap();
    let scene = draw(&doc, UiState::default(), &mut RenderGate::new());
    let decls = image_node(&scene, id).decls();
    assert_eq!(decl(&decls, "clip-path"), Some("inset(10% 0% 0% 0%)"));
}

#[test]
fn crop_guide_and_handles_decls() {
    let overlay = CropOverlay::new(Crop::new(5.0, 10.0, 15.0, 20.0));
    let guide = overlay.guide_decls();
    assert_eq!(decl(&guide, "top"), Some("5%"));
    assert_eq!(decl(&guide, "right"), Some("10%"));
    assert_eq!(decl(&guide, "bottom"), Some("15%"));
    assert_eq!(decl(&guide, "left"), Some("20%"));
    assert!(decl(&guide, "border").is_some_and(|b| b.starts_with("4px dashed")));

    let top = CropOverlay::handle_decls(CropSide::Top);
    assert_eq!(decl(&top, "cursor"), Some("ns-resize"));
    assert_eq!(decl(&top, "height"), Some("6px"));
    assert_eq!(decl(&top, "top"), Some("0"));
    let left = CropOverlay::handle_decls(CropSide::Left);
    assert_eq!(decl(&left, "cursor"), Some("ew-resize"));
    assert_eq!(decl(&left, "width"), Some("6px"));

    assert_eq!(decl(&CropOverlay::hint_decls(), "font-size"), Some("10px"));
}

#[test]
fn noise_overlay_follows_style() {
    let mut doc = LayerStore::new();
    let plain = doc.push(ImageLayer::new("a.png")).unwrap();
    let grain = ImageStyle { noise: 40.0, ..ImageStyle::default() };
    let grainy = doc.push(ImageLayer::new("b.png").with_style(grain)).unwrap();
    let scene = draw(&doc, UiState::default(), &mut RenderGate::new());
    assert!(image_node(&scene, plain).noise_decls().is_none());
    let noise = image_node(&scene, grainy).noise_decls().unwrap();
    assert_eq!(decl(&noise, "opacity"), Some("0.4"));
    assert_eq!(decl(&noise, "mix-blend-mode"), Some("overlay"));
}

#[test]
fn shadow_and_3d_rotation_reach_decls() {
    let mut doc = LayerStore::new();
    let style = ImageStyle { rotate_y: 30.0, shadow: "0 4px 8px black".to_string(), ..ImageStyle::default() };
    let id = doc.push(ImageLayer::new("a.png").with_style(style)).unwrap();
    let scene = draw(&doc, UiState::default(), &mut RenderGate::new());
    let decls = image_node(&scene, id).decls();
    assert_eq!(decl(&decls, "box-shadow"), Some("0 4px 8px black"));
    assert_eq!(decl(&decls, "backface-visibility"), Some("visible"));
    assert!(decl(&decls, "transform").is_some_and(|t| t.starts_with("perspective(2000px)")));
}

#[test]
fn image_content_ignores_moves_and_selection() {
    let mut doc = LayerStore::new();
    let id = doc.push(ImageLayer::new("a.png")).unwrap();
    let before = image_node(&draw(&doc, UiState::default(), &mut RenderGate::new()), id).content();

    doc.set_position(&id, Point::new(50.0, -20.0)).unwrap();
    doc.select(Some(id)).unwrap();
    let after = image_node(&draw(&doc, UiState::default(), &mut RenderGate::new()), id).content();
    assert_eq!(before, after);
}

#[test]
fn image_content_tracks_overlay_noise_and_src() {
    let mut doc = LayerStore::new();
    let id = doc.push(ImageLayer::new("a.png")).unwrap();
    let other = doc.push(ImageLayer::new("b.png")).unwrap();
    doc.select(Some(id)).unwrap();
    let scene = draw(&doc, UiState::default(), &mut RenderGate::new());
    let base = image_node(&scene, id).content();
    assert_ne!(base, image_node(&scene, other).content());

    let cropping = image_node(&draw(&doc, UiState { crop_mode: true }, &mut RenderGate::new()), id).content();
    assert!(cropping.crop_overlay.is_some());
    assert_ne!(base, cropping);

    doc.replace_image_style(&id, ImageStyle { noise: 25.0, ..ImageStyle::default() }).unwrap();
    let grainy = image_node(&draw(&doc, UiState::default(), &mut RenderGate::new()), id).content();
    assert_eq!(grainy.noise_opacity, Some(0.25));
    assert_ne!(base, grainy);
}

#[test]
fn dragged_image_hints_will_change() {
    let mut doc = LayerStore::new();
    let id = doc.push(ImageLayer::new("a.png")).unwrap();
    let scene = render(&doc, UiState::default(), Some(id), &CanvasConfig::default(), &mut RenderGate::new());
    let decls = image_node(&scene, id).decls();
    assert_eq!(decl(&decls, "will-change"), Some("transform"));
    assert_eq!(decl(&decls, "transition"), Some("transform 0ms linear"));
}

// =============================================================
// Text nodes
// =============================================================

#[test]
fn text_background_transparent_unless_shown() {
    let mut doc = LayerStore::new();
    let hidden = doc.push(TextLayer::new("a")).unwrap();
    let shown_style =
        TextStyle { show_background: true, background_color: "#112233".to_string(), ..TextStyle::default() };
    let shown = doc.push(TextLayer::new("b").with_style(shown_style)).unwrap();
    let scene = draw(&doc, UiState::default(), &mut RenderGate::new());
    assert_eq!(decl(&text_node(&scene, hidden).decls(), "background-color"), Some("transparent"));
    assert_eq!(decl(&text_node(&scene, shown).decls(), "background-color"), Some("#112233"));
}

#[test]
fn text_decls_carry_typography() {
    let mut doc = LayerStore::new();
    let style = TextStyle { font_size: 32.0, text_align: crate::doc::TextAlign::Left, ..TextStyle::default() };
    let id = doc.push(TextLayer::new("hello\nworld").with_style(style).at(Point::new(5.0, 6.0))).unwrap();
    doc.select(Some(id)).unwrap();
    let scene = draw(&doc, UiState::default(), &mut RenderGate::new());
    let node = text_node(&scene, id);
    assert_eq!(node.content, "hello\nworld");
    let decls = node.decls();
    assert_eq!(decl(&decls, "font-size"), Some("32px"));
    assert_eq!(decl(&decls, "text-align"), Some("left"));
    assert_eq!(decl(&decls, "line-height"), Some("1.2"));
    assert_eq!(decl(&decls, "z-index"), Some("40"));
    assert!(decl(&decls, "outline").is_some());
}

// =============================================================
// Gate integration
// =============================================================

#[test]
fn second_render_skips_unchanged_layers() {
    let mut doc = LayerStore::new();
    let img = doc.push(ImageLayer::new("a.png")).unwrap();
    let txt = doc.push(TextLayer::new("t")).unwrap();
    let mut gate = RenderGate::new();

    let first = draw(&doc, UiState::default(), &mut gate);
    assert_eq!(first.redrawn().collect::<Vec<_>>(), vec![img, txt]);

    let second = draw(&doc, UiState::default(), &mut gate);
    assert_eq!(second.redrawn().count(), 0);
    assert!(second.items.iter().all(|item| item.paint == Paint::Skip));
    // Skipped items still carry their stacking tier.
    assert_eq!(second.items[0].z, ZTier::ImageIdle);
}

#[test]
fn moving_one_layer_redraws_only_it() {
    let mut doc = LayerStore::new();
    let a = doc.push(ImageLayer::new("a.png")).unwrap();
    doc.push(ImageLayer::new("b.png")).unwrap();
    let mut gate = RenderGate::new();
    draw(&doc, UiState::default(), &mut gate);

    doc.set_position(&a, Point::new(50.0, 50.0)).unwrap();
    let scene = draw(&doc, UiState::default(), &mut gate);
    assert_eq!(scene.redrawn().collect::<Vec<_>>(), vec![a]);
}

#[test]
fn entering_crop_mode_redraws_selected_image() {
    let mut doc = LayerStore::new();
    let id = doc.push(ImageLayer::new("a.png")).unwrap();
    doc.select(Some(id)).unwrap();
    let mut gate = RenderGate::new();
    draw(&doc, UiState::default(), &mut gate);
    let scene = draw(&doc, UiState { crop_mode: true }, &mut gate);
    assert_eq!(scene.redrawn().collect::<Vec<_>>(), vec![id]);
}

#[test]
fn removed_layers_are_reported_once() {
    let mut doc = LayerStore::new();
    let a = doc.push(ImageLayer::new("a.png")).unwrap();
    let b = doc.push(TextLayer::new("b")).unwrap();
    let mut gate = RenderGate::new();
    draw(&doc, UiState::default(), &mut gate);

    doc.remove(&a).unwrap();
    let scene = draw(&doc, UiState::default(), &mut gate);
    assert_eq!(scene.removed, vec![a]);
    assert_eq!(scene.items.len(), 1);
    assert_eq!(scene.items[0].id, b);

    let scene = draw(&doc, UiState::default(), &mut gate);
    assert!(scene.removed.is_empty());
}
