//! End-to-end behavior through the public API: compositing, gestures driven
//! through `EngineCore`, and render-gate decisions.
#![allow(clippy::float_cmp)]

use stage::compose::{self, Clip};
use stage::doc::{ClipPath, Crop, CropSide, ImageLayer, ImageStyle, LayerId, TextLayer};
use stage::engine::{Action, EngineCore};
use stage::gate::{Decision, ImageGateKey, RenderGate};
use stage::geom::{Point, Size};
use stage::hit::Hit;
use stage::input::Button;
use stage::render::{Paint, ZTier};

const BOUNDS: Size = Size { width: 400.0, height: 200.0 };

fn press(core: &mut EngineCore, hit: Option<Hit>, pt: Point) -> Vec<Action> {
    core.on_pointer_down(hit, pt, Button::Primary)
}

fn crop_of(core: &EngineCore, id: &LayerId) -> Crop {
    match core.doc.get_image(id) {
        Ok(img) => img.style.crop,
        Err(err) => panic!("image {id} missing: {err}"),
    }
}

// =============================================================
// Clip scenarios
// =============================================================

#[test]
fn uncropped_unshaped_image_has_no_clip() {
    let style = ImageStyle { crop: Crop::NONE, clip_path: ClipPath::None, ..ImageStyle::default() };
    let composed = compose::compose(&style, false, false);
    assert_eq!(composed.clip, Clip::None);
    assert_eq!(composed.clip.css(), None);
}

#[test]
fn top_crop_becomes_inset() {
    let style = ImageStyle { crop: Crop::new(10.0, 0.0, 0.0, 0.0), ..ImageStyle::default() };
    let composed = compose::compose(&style, false, false);
    assert_eq!(composed.clip.css().as_deref(), Some("inset(10% 0% 0% 0%)"));
}

#[test]
fn shape_overrides_crop() {
    let style = ImageStyle {
        crop: Crop::new(10.0, 0.0, 0.0, 0.0),
        clip_path: ClipPath::shape("circle(50%)"),
        ..ImageStyle::default()
    };
    let composed = compose::compose(&style, false, false);
    assert_eq!(composed.clip.css().as_deref(), Some("circle(50%)"));
}

#[test]
fn compose_is_deterministic() {
    let style = ImageStyle {
        scale: 150.0,
        rotate: 12.0,
        rotate_x: -8.0,
        flip_y: true,
        crop: Crop::new(5.0, 5.0, 5.0, 5.0),
        ..ImageStyle::default()
    };
    for (selected, dragging) in [(false, false), (true, false), (true, true)] {
        let a = compose::compose(&style, selected, dragging);
        let b = compose::compose(&style.clone(), selected, dragging);
        assert_eq!(a, b);
        assert_eq!(a.transform.to_string(), b.transform.to_string());
    }
}

// =============================================================
// Crop gestures
// =============================================================

#[test]
fn top_handle_clamped_against_bottom() {
    let mut core = EngineCore::new();
    let style = ImageStyle { crop: Crop::new(0.0, 0.0, 85.0, 0.0), ..ImageStyle::default() };
    let id = core.add_layer(ImageLayer::new("a.png").with_style(style)).unwrap();
    core.select(Some(id)).unwrap();
    assert!(core.set_crop_mode(true));

    // 190px on a 200px-tall box would put top at 95%.
    press(&mut core, Some(Hit::crop_handle(id, CropSide::Top, BOUNDS)), Point::new(0.0, 0.0));
    core.on_pointer_up(Point::new(0.0, 190.0));

    let crop = crop_of(&core, &id);
    assert_eq!(crop.top, 5.0);
    assert_eq!(crop.bottom, 85.0);
}

#[test]
fn crop_stays_valid_through_any_edit_sequence() {
    let mut core = EngineCore::new();
    let id = core.add_layer(ImageLayer::new("a.png")).unwrap();
    core.select(Some(id)).unwrap();
    core.set_crop_mode(true);

    let strokes = [
        (CropSide::Top, Point::new(0.0, 150.0)),
        (CropSide::Bottom, Point::new(0.0, -300.0)),
        (CropSide::Left, Point::new(380.0, 0.0)),
        (CropSide::Right, Point::new(-500.0, 0.0)),
        (CropSide::Top, Point::new(0.0, -90.0)),
        (CropSide::Bottom, Point::new(0.0, 40.0)),
        (CropSide::Left, Point::new(-1000.0, 0.0)),
    ];
    for (side, end) in strokes {
        press(&mut core, Some(Hit::crop_handle(id, side, BOUNDS)), Point::new(0.0, 0.0));
        for step in 1..=10 {
            let t = f64::from(step) / 10.0;
            core.on_pointer_move(Point::new(end.x * t, end.y * t));
            let crop = crop_of(&core, &id);
            assert!(crop.is_valid(), "{side:?} step {step}: {crop:?}");
        }
        core.on_pointer_up(end);
        assert!(crop_of(&core, &id).is_valid());
    }

    // Style-panel writes are clamped on the way in too.
    let wild = ImageStyle { crop: Crop::new(80.0, 70.0, 60.0, -5.0), ..ImageStyle::default() };
    core.set_image_style(&id, wild).unwrap();
    assert!(crop_of(&core, &id).is_valid());
}

// =============================================================
// Drag gestures
// =============================================================

#[test]
fn drag_ends_at_start_plus_summed_deltas() {
    let mut core = EngineCore::new();
    let start = Point::new(40.0, -20.0);
    let id = core.add_layer(TextLayer::new("caption").at(start)).unwrap();

    let deltas = [Point::new(3.0, 4.0), Point::new(-1.5, 0.5), Point::new(10.0, -7.0), Point::new(0.25, 0.25)];
    let mut pointer = Point::new(500.0, 500.0);
    press(&mut core, Some(Hit::body(id, BOUNDS)), pointer);
    for delta in deltas {
        pointer = pointer + delta;
        core.on_pointer_move(pointer);
    }
    core.on_pointer_up(pointer);

    let sum = deltas.iter().fold(Point::default(), |acc, d| acc + *d);
    let position = core.layer(&id).map(|layer| layer.position()).unwrap();
    assert_eq!(position, start + sum);
}

// =============================================================
// Selection and empty canvas
// =============================================================

#[test]
fn selection_lifts_z_tier_and_empty_click_clears() {
    let mut core = EngineCore::new();
    let id = core.add_layer(TextLayer::new("only text")).unwrap();

    let actions = press(&mut core, Some(Hit::body(id, BOUNDS)), Point::new(1.0, 1.0));
    assert_eq!(actions, vec![Action::SelectionChanged { id: Some(id) }]);
    core.on_pointer_up(Point::new(1.0, 1.0));
    let scene = core.render();
    assert_eq!(scene.items[0].z, ZTier::TextSelected);
    assert!(scene.empty_state.is_some());

    let actions = press(&mut core, None, Point::new(300.0, 300.0));
    assert_eq!(actions, vec![Action::SelectionChanged { id: None }, Action::EmptyCanvasClicked]);
    assert_eq!(core.selection(), None);
    assert_eq!(core.render().items[0].z, ZTier::Text);
}

// =============================================================
// Render gate
// =============================================================

#[test]
fn gate_changes_are_isolated_per_layer() {
    let a = ImageLayer::new("a.png");
    let b = ImageLayer::new("b.png");
    let mut gate = RenderGate::new();
    for layer in [&a, &b] {
        assert_eq!(gate.evaluate(ImageGateKey::new(layer, false, false, false).into()), Decision::Redraw);
    }
    for layer in [&a, &b] {
        assert_eq!(gate.evaluate(ImageGateKey::new(layer, false, false, false).into()), Decision::Skip);
    }

    let moved = a.clone().at(Point::new(9.0, 9.0));
    assert_eq!(gate.evaluate(ImageGateKey::new(&moved, false, false, false).into()), Decision::Redraw);
    assert_eq!(gate.evaluate(ImageGateKey::new(&b, false, false, false).into()), Decision::Skip);

    assert_eq!(gate.evaluate(ImageGateKey::new(&b, true, false, false).into()), Decision::Redraw);
    assert_eq!(gate.evaluate(ImageGateKey::new(&moved, false, false, false).into()), Decision::Skip);
}

#[test]
fn style_update_redraws_only_that_layer() {
    let mut core = EngineCore::new();
    let a = core.add_layer(ImageLayer::new("a.png")).unwrap();
    let b = core.add_layer(ImageLayer::new("b.png")).unwrap();
    core.render();

    core.set_image_style(&b, ImageStyle { blur: 3.0, ..ImageStyle::default() }).unwrap();
    let scene = core.render();
    let paints: Vec<(LayerId, bool)> =
        scene.items.iter().map(|item| (item.id, matches!(item.paint, Paint::Skip))).collect();
    assert_eq!(paints, vec![(a, true), (b, false)]);
}
