use super::*;
use crate::effects::blur::GaussianBlur;
use crate::foundation::units::Coord;
use crate::paint::color::Color;
use crate::path::shapes::Rectangle;
use crate::scene::defs::ClipDef;

// Covers the enclosing pixel box of every path completely.
struct BoxRasterizer;

impl Rasterizer for BoxRasterizer {
    fn rasterize(&mut self, path: &kurbo::BezPath, _rule: FillRule, clip: IRect) -> Option<Coverage> {
        if path.elements().is_empty() {
            return None;
        }
        let r = IRect::enclosing(path.bounding_box()).intersect(clip);
        if r.is_empty() {
            return None;
        }
        Some(Coverage {
            bounds: r,
            alpha: vec![255; r.width() as usize * r.height() as usize],
        })
    }
}

#[derive(Debug)]
struct Span {
    x: u32,
    y: u32,
    len: usize,
}

struct Recording {
    canvas: Canvas,
    spans: Vec<Span>,
}

impl Recording {
    fn new(w: u32, h: u32) -> Self {
        Self {
            canvas: Canvas::new(w, h).unwrap(),
            spans: Vec::new(),
        }
    }
}

impl Surface for Recording {
    fn width(&self) -> u32 {
        self.canvas.width()
    }

    fn height(&self) -> u32 {
        self.canvas.height()
    }

    fn blend_span(&mut self, x: u32, y: u32, colors: &[Rgba8Premul], coverage: &[u8]) {
        self.spans.push(Span { x, y, len: colors.len() });
        self.canvas.blend_span(x, y, colors, coverage);
    }
}

fn renderer() -> Renderer {
    Renderer::with_rasterizer(RenderOpts::default(), Box::new(BoxRasterizer))
}

fn rect(x: f64, y: f64, w: f64, h: f64) -> Geometry {
    Geometry::Rectangle(Rectangle {
        x: Coord::Px(x),
        y: Coord::Px(y),
        width: Coord::Px(w),
        height: Coord::Px(h),
        ..Rectangle::default()
    })
}

const RED: Rgba8Premul = Rgba8Premul { r: 255, g: 0, b: 0, a: 255 };
const BLUE: Rgba8Premul = Rgba8Premul { r: 0, g: 0, b: 255, a: 255 };

#[test]
fn solid_fill_covers_the_shape_only() {
    let mut scene = Scene::new(10.0, 10.0).unwrap();
    let r = scene.add_child(scene.root(), rect(2.0, 2.0, 4.0, 4.0)).unwrap();
    scene.set_fill(r, "red").unwrap();

    let mut out = Recording::new(10, 10);
    let stats = renderer().draw(&mut scene, &mut out).unwrap();
    assert_eq!(stats.fills, 1);
    assert_eq!(out.spans.len(), 4);
    assert!(out.spans.iter().all(|s| s.x == 2 && s.len == 4 && (2..6).contains(&s.y)));
    assert_eq!(out.canvas.pixel(3, 3), RED);
    assert_eq!(out.canvas.pixel(0, 0), Rgba8Premul::transparent());
}

#[test]
fn siblings_draw_in_order_and_later_ones_win() {
    let mut scene = Scene::new(8.0, 8.0).unwrap();
    let root = scene.root();
    let a = scene.add_child(root, rect(0.0, 0.0, 6.0, 6.0)).unwrap();
    let b = scene.add_child(root, rect(2.0, 2.0, 6.0, 6.0)).unwrap();
    scene.set_fill(a, "red").unwrap();
    scene.set_fill(b, "blue").unwrap();

    let mut out = Recording::new(8, 8);
    renderer().draw(&mut scene, &mut out).unwrap();
    assert_eq!(out.spans[0].x, 0);
    assert_eq!(out.spans.last().map(|s| s.x), Some(2));
    assert_eq!(out.canvas.pixel(1, 1), RED);
    assert_eq!(out.canvas.pixel(3, 3), BLUE);
}

#[test]
fn hidden_nodes_skip_their_subtree_and_visible_children_inherit() {
    let mut scene = Scene::new(8.0, 8.0).unwrap();
    let root = scene.root();
    let g = scene.add_child(root, Geometry::Group).unwrap();
    let child = scene.add_child(g, rect(0.0, 0.0, 4.0, 4.0)).unwrap();
    scene.set_visibility(child, Visibility::Visible).unwrap();
    scene.set_visibility(g, Visibility::Hidden).unwrap();

    let mut out = Recording::new(8, 8);
    renderer().draw(&mut scene, &mut out).unwrap();
    assert!(out.spans.is_empty());

    scene.set_visibility(g, Visibility::Inherit).unwrap();
    let mut out = Recording::new(8, 8);
    renderer().draw(&mut scene, &mut out).unwrap();
    assert_eq!(out.spans.len(), 4);
}

#[test]
fn opacity_multiplies_down_the_tree() {
    let mut scene = Scene::new(4.0, 4.0).unwrap();
    let g = scene.add_child(scene.root(), Geometry::Group).unwrap();
    scene.set_opacity(g, 0.5).unwrap();
    let r = scene.add_child(g, rect(0.0, 0.0, 4.0, 4.0)).unwrap();
    scene.set_opacity(r, 0.5).unwrap();
    scene.set_fill(r, "red").unwrap();

    let mut out = Recording::new(4, 4);
    renderer().draw(&mut scene, &mut out).unwrap();
    let px = out.canvas.pixel(1, 1);
    assert!((63..=64).contains(&px.a), "alpha {}", px.a);
    assert_eq!(px.r, px.a);
}

#[test]
fn missing_paint_definitions_skip_only_that_fill() {
    let mut scene = Scene::new(8.0, 8.0).unwrap();
    let root = scene.root();
    let a = scene.add_child(root, rect(0.0, 0.0, 4.0, 4.0)).unwrap();
    scene.set_fill(a, "url(#nothing)").unwrap();
    let b = scene.add_child(root, rect(4.0, 4.0, 4.0, 4.0)).unwrap();
    scene.set_fill(b, "blue").unwrap();

    let mut out = Recording::new(8, 8);
    let stats = renderer().draw(&mut scene, &mut out).unwrap();
    assert_eq!(stats.fills, 1);
    assert_eq!(stats.skipped, 1);
    assert_eq!(out.canvas.pixel(1, 1), Rgba8Premul::transparent());
    assert_eq!(out.canvas.pixel(5, 5), BLUE);
}

#[test]
fn viewport_box_narrows_the_device_clip() {
    let mut scene = Scene::new(10.0, 10.0).unwrap();
    let vp = scene
        .add_child(scene.root(), Geometry::Viewport(Viewport::sized(5.0, 5.0)))
        .unwrap();
    scene.add_child(vp, rect(0.0, 0.0, 10.0, 10.0)).unwrap();

    let mut out = Recording::new(10, 10);
    renderer().draw(&mut scene, &mut out).unwrap();
    assert!(!out.spans.is_empty());
    assert!(out.spans.iter().all(|s| s.y < 5 && s.x as usize + s.len <= 5));

    scene
        .set_geometry(
            vp,
            Geometry::Viewport(Viewport {
                overflow: Overflow::Visible,
                ..Viewport::sized(5.0, 5.0)
            }),
        )
        .unwrap();
    let mut out = Recording::new(10, 10);
    renderer().draw(&mut scene, &mut out).unwrap();
    assert_eq!(out.spans.len(), 10);
}

#[test]
fn empty_viewports_are_skipped() {
    let mut scene = Scene::new(10.0, 10.0).unwrap();
    let vp = scene
        .add_child(scene.root(), Geometry::Viewport(Viewport::sized(0.0, 5.0)))
        .unwrap();
    scene.add_child(vp, rect(0.0, 0.0, 10.0, 10.0)).unwrap();
    let mut out = Recording::new(10, 10);
    renderer().draw(&mut scene, &mut out).unwrap();
    assert!(out.spans.is_empty());
}

#[test]
fn rotated_viewports_clip_with_a_mask() {
    let mut scene = Scene::new(20.0, 20.0).unwrap();
    let vp = scene
        .add_child(scene.root(), Geometry::Viewport(Viewport::sized(5.0, 5.0)))
        .unwrap();
    scene.set_transform(vp, "rotate(45, 2.5, 2.5)").unwrap();
    scene.add_child(vp, rect(0.0, 0.0, 20.0, 20.0)).unwrap();

    let mut out = Recording::new(20, 20);
    let stats = renderer().draw(&mut scene, &mut out).unwrap();
    assert_eq!(stats.clip_masks, 1);
    assert!(out.spans.iter().all(|s| s.y < 7 && s.x as usize + s.len <= 7));
}

#[test]
fn nesting_limit_skips_deep_subtrees() {
    let mut scene = Scene::new(4.0, 4.0).unwrap();
    let mut parent = scene.root();
    for _ in 0..3 {
        parent = scene.add_child(parent, Geometry::Group).unwrap();
    }
    scene.add_child(parent, rect(0.0, 0.0, 4.0, 4.0)).unwrap();

    let mut r = Renderer::with_rasterizer(RenderOpts::default().with_max_depth(3), Box::new(BoxRasterizer));
    let mut out = Recording::new(4, 4);
    let stats = r.draw(&mut scene, &mut out).unwrap();
    assert!(out.spans.is_empty());
    assert_eq!(stats.skipped, 1);
}

#[test]
fn clip_definitions_mask_the_consumer_and_nest() {
    let mut scene = Scene::new(10.0, 10.0).unwrap();
    let content = scene.create_detached(Geometry::Group).unwrap();
    scene.add_child(content, rect(0.0, 0.0, 3.0, 3.0)).unwrap();
    scene.defs_mut().add_clip("corner", ClipDef::new(content)).unwrap();

    let r = scene.add_child(scene.root(), rect(0.0, 0.0, 10.0, 10.0)).unwrap();
    scene.set_clip(r, Some("corner")).unwrap();
    scene.set_fill(r, "red").unwrap();

    let mut out = Recording::new(10, 10);
    let stats = renderer().draw(&mut scene, &mut out).unwrap();
    assert_eq!(stats.clip_masks, 1);
    assert_eq!(out.canvas.pixel(1, 1), RED);
    assert_eq!(out.canvas.pixel(5, 5), Rgba8Premul::transparent());

    let inner = scene.add_child(r, rect(0.0, 0.0, 10.0, 10.0)).unwrap();
    scene.set_fill(inner, "blue").unwrap();
    let wide = scene.create_detached(Geometry::Group).unwrap();
    scene.add_child(wide, rect(2.0, 2.0, 8.0, 8.0)).unwrap();
    scene.defs_mut().add_clip("wide", ClipDef::new(wide)).unwrap();
    scene.set_clip(inner, Some("wide")).unwrap();

    let mut out = Recording::new(10, 10);
    renderer().draw(&mut scene, &mut out).unwrap();
    assert_eq!(out.canvas.pixel(2, 2), BLUE);
    assert_eq!(out.canvas.pixel(1, 1), RED);
    assert_eq!(out.canvas.pixel(5, 5), Rgba8Premul::transparent());
}

#[test]
fn bounding_box_clips_follow_the_consumer_bounds() {
    let mut scene = Scene::new(10.0, 10.0).unwrap();
    let content = scene.create_detached(Geometry::Group).unwrap();
    scene.add_child(content, rect(0.0, 0.0, 0.5, 1.0)).unwrap();
    scene
        .defs_mut()
        .add_clip("left", ClipDef { units: Units::BoundingBox, content })
        .unwrap();
    let r = scene.add_child(scene.root(), rect(2.0, 2.0, 4.0, 4.0)).unwrap();
    scene.set_clip(r, Some("left")).unwrap();

    let mut out = Recording::new(10, 10);
    renderer().draw(&mut scene, &mut out).unwrap();
    assert!(out.spans.iter().all(|s| s.x == 2 && s.len == 2));
}

#[test]
fn foreign_nodes_are_skipped_without_error() {
    let mut scene = Scene::new(4.0, 4.0).unwrap();
    scene
        .add_child(scene.root(), Geometry::Foreign { kind: "text".into() })
        .unwrap();
    let mut out = Recording::new(4, 4);
    let stats = renderer().draw(&mut scene, &mut out).unwrap();
    assert_eq!(stats.skipped, 1);
    assert!(out.spans.is_empty());
}

#[test]
fn strokes_use_the_outline() {
    let mut scene = Scene::new(12.0, 12.0).unwrap();
    let r = scene.add_child(scene.root(), rect(4.0, 4.0, 4.0, 4.0)).unwrap();
    scene.set_fill(r, "none").unwrap();
    scene.set_stroke(r, "blue").unwrap();
    scene.set_stroke_width(r, 2.0).unwrap();

    let mut out = Recording::new(12, 12);
    let stats = renderer().draw(&mut scene, &mut out).unwrap();
    assert_eq!((stats.fills, stats.strokes), (0, 1));
    assert_eq!(out.canvas.pixel(3, 3), BLUE);
    assert_eq!(out.canvas.pixel(0, 0), Rgba8Premul::transparent());
}

#[test]
fn isolated_layers_return_to_the_pool() {
    let mut scene = Scene::new(6.0, 6.0).unwrap();
    let g = scene.add_child(scene.root(), Geometry::Group).unwrap();
    scene.set_isolated(g, true).unwrap();
    let r = scene.add_child(g, rect(1.0, 1.0, 2.0, 2.0)).unwrap();
    scene.set_fill(r, "red").unwrap();

    let mut renderer = renderer();
    let mut out = Recording::new(6, 6);
    let stats = renderer.draw(&mut scene, &mut out).unwrap();
    assert_eq!(stats.layers, 1);
    assert_eq!(out.canvas.pixel(1, 1), RED);
    assert_eq!(out.canvas.pixel(4, 4), Rgba8Premul::transparent());
    assert_eq!(renderer.pool_stats().retained_surfaces, 1);

    renderer.draw(&mut scene, &mut Recording::new(6, 6)).unwrap();
    assert_eq!(renderer.pool_stats().alloc_surfaces, 1);
}

#[test]
fn filters_process_the_rendered_subtree() {
    let mut scene = Scene::new(12.0, 12.0).unwrap();
    scene
        .defs_mut()
        .add_filter("soft", Arc::new(GaussianBlur::new(2, 1.0).unwrap()))
        .unwrap();
    let r = scene.add_child(scene.root(), rect(4.0, 4.0, 4.0, 4.0)).unwrap();
    scene.set_fill(r, "red").unwrap();
    scene.set_filter(r, Some("soft")).unwrap();

    let mut out = Recording::new(12, 12);
    let stats = renderer().draw(&mut scene, &mut out).unwrap();
    assert_eq!(stats.layers, 1);
    assert!(out.canvas.pixel(3, 5).a > 0);
    assert!(out.canvas.pixel(5, 5).a < 255 || out.canvas.pixel(4, 4).a < 255);
}

#[test]
fn patterns_tile_their_content() {
    let mut scene = Scene::new(8.0, 8.0).unwrap();
    let content = scene.create_detached(Geometry::Group).unwrap();
    let dot = scene.add_child(content, rect(0.0, 0.0, 2.0, 2.0)).unwrap();
    scene.set_fill(dot, "black").unwrap();
    let pattern = Pattern {
        units: Units::UserSpace,
        width: Coord::Px(4.0),
        height: Coord::Px(4.0),
        content: Some(content),
        ..Pattern::default()
    };
    scene.defs_mut().add_pattern("dots", pattern).unwrap();
    let r = scene.add_child(scene.root(), rect(0.0, 0.0, 8.0, 8.0)).unwrap();
    scene.set_fill(r, "url(#dots)").unwrap();

    let mut renderer = renderer();
    let mut out = Recording::new(8, 8);
    let stats = renderer.draw(&mut scene, &mut out).unwrap();
    assert_eq!(stats.pattern_tiles, 1);
    let black = Color::rgb(0, 0, 0).premul();
    assert_eq!(out.canvas.pixel(1, 1), black);
    assert_eq!(out.canvas.pixel(5, 5), black);
    assert_eq!(out.canvas.pixel(3, 3), Rgba8Premul::transparent());
    assert_eq!(renderer.pool_stats().retained_surfaces, 1);
}

#[test]
fn self_referencing_patterns_stop_at_the_nesting_limit() {
    let mut scene = Scene::new(8.0, 8.0).unwrap();
    let content = scene.create_detached(Geometry::Group).unwrap();
    let inner = scene.add_child(content, rect(0.0, 0.0, 4.0, 4.0)).unwrap();
    scene.set_fill(inner, "url(#loop)").unwrap();
    let pattern = Pattern {
        units: Units::UserSpace,
        width: Coord::Px(4.0),
        height: Coord::Px(4.0),
        content: Some(content),
        ..Pattern::default()
    };
    scene.defs_mut().add_pattern("loop", pattern).unwrap();
    let r = scene.add_child(scene.root(), rect(0.0, 0.0, 8.0, 8.0)).unwrap();
    scene.set_fill(r, "url(#loop)").unwrap();

    let mut r = Renderer::with_rasterizer(RenderOpts::default().with_max_depth(16), Box::new(BoxRasterizer));
    let stats = r.draw(&mut scene, &mut Recording::new(8, 8)).unwrap();
    assert!(stats.skipped >= 1);
    assert!(stats.pattern_tiles < 16);
}

#[test]
fn zero_sized_surfaces_are_rejected() {
    struct Empty;
    impl Surface for Empty {
        fn width(&self) -> u32 {
            0
        }
        fn height(&self) -> u32 {
            0
        }
        fn blend_span(&mut self, _: u32, _: u32, _: &[Rgba8Premul], _: &[u8]) {}
    }
    let mut scene = Scene::new(4.0, 4.0).unwrap();
    assert!(renderer().draw(&mut scene, &mut Empty).is_err());
}
