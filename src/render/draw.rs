//! Scene traversal and draw orchestration.
//!
//! One pass walks the page tree depth first. Every node inherits a [`DrawState`] from its
//! parent, narrows it (opacity, line style, clip) and hands the narrowed copy to its
//! children; dropping the copy on the way back up restores the parent's state on every exit
//! path. Geometry flows scene path → device path → [`Rasterizer`] coverage → clip mask →
//! span generator → [`Surface::blend_span`].

use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use kurbo::Shape;

use crate::effects::filter::FilterEffect;
use crate::foundation::core::{Affine, IRect, Rect, Rgba8Premul};
use crate::foundation::error::{SceneError, SceneResult};
use crate::paint::bitmap::Bitmap;
use crate::paint::color::Paint;
use crate::paint::gradient::Units;
use crate::paint::pattern::Pattern;
use crate::paint::sample::{Filter, ImageSpan, SampleMethod};
use crate::paint::span::{PaintContext, SolidSpan, SpanGenerator};
use crate::paint::texture_stroke::TextureStrokeSpan;
use crate::render::clip::{ClipMask, DEFAULT_CLIP_CEILING};
use crate::render::raster::{Coverage, Rasterizer, VelloRasterizer};
use crate::render::stroke::{InnerJoin, LineCap, LineJoin, StrokeStyle};
use crate::render::surface::{Canvas, FillRule, Surface};
use crate::render::surface_pool::{SurfacePool, SurfacePoolOpts, SurfacePoolStats};
use crate::scene::defs::Definition;
use crate::scene::node::{Geometry, Node, NodeId, Overflow, Style, Viewport, Visibility};
use crate::scene::tree::Scene;
use crate::transform::affine::{affine_scale, is_axis_aligned};

/// Renderer configuration.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderOpts {
    /// Deepest nesting drawn; deeper subtrees are skipped with a warning.
    pub max_depth: u32,
    /// Largest clip mask or pattern tile side, in pixels.
    pub clip_ceiling: u32,
    /// Gamma applied to coverage.
    pub gamma: f64,
    /// Resampling used by images and patterns that do not choose one.
    pub sample_method: SampleMethod,
    /// Scratch surface pool limits.
    pub pool: SurfacePoolOpts,
    /// Flattening tolerance in device pixels.
    pub tolerance: f64,
}

impl Default for RenderOpts {
    fn default() -> Self {
        Self {
            max_depth: 256,
            clip_ceiling: DEFAULT_CLIP_CEILING,
            gamma: 1.0,
            sample_method: SampleMethod::Auto,
            pool: SurfacePoolOpts::default(),
            tolerance: 0.1,
        }
    }
}

impl RenderOpts {
    /// Set the nesting limit.
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the clip mask ceiling.
    pub fn with_clip_ceiling(mut self, ceiling: u32) -> Self {
        self.clip_ceiling = ceiling.max(1);
        self
    }

    /// Set the coverage gamma.
    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma;
        self
    }

    /// Set the default sampling method.
    pub fn with_sample_method(mut self, method: SampleMethod) -> Self {
        self.sample_method = method;
        self
    }

    /// Set the pool limits.
    pub fn with_pool(mut self, pool: SurfacePoolOpts) -> Self {
        self.pool = pool;
        self
    }

    /// Set the flattening tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }
}

/// Counters for one draw pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DrawStats {
    /// Nodes entered.
    pub nodes_visited: u64,
    /// Fills composited.
    pub fills: u64,
    /// Strokes composited.
    pub strokes: u64,
    /// Nodes or subtrees skipped because of errors, limits or unsupported content.
    pub skipped: u64,
    /// Clip masks rasterized.
    pub clip_masks: u64,
    /// Offscreen layers used for filters and isolation.
    pub layers: u64,
    /// Pattern tiles rendered.
    pub pattern_tiles: u64,
}

// Inherited per-node state; cloned on the way down, dropped on the way up.
#[derive(Clone, Debug)]
struct DrawState {
    visible: bool,
    opacity: f64,
    join: LineJoin,
    inner_join: InnerJoin,
    cap: LineCap,
    clip: Option<Rc<ClipMask>>,
    device_clip: IRect,
    base: Affine,
    depth: u32,
}

impl DrawState {
    fn root(width: u32, height: u32, base: Affine) -> Self {
        let w = i32::try_from(width).unwrap_or(i32::MAX);
        let h = i32::try_from(height).unwrap_or(i32::MAX);
        Self {
            visible: true,
            opacity: 1.0,
            join: LineJoin::default(),
            inner_join: InnerJoin::default(),
            cap: LineCap::default(),
            clip: None,
            device_clip: IRect::new(0, 0, w, h),
            base,
            depth: 0,
        }
    }

    fn push_clip(&mut self, mut mask: ClipMask) {
        if let Some(outer) = &self.clip {
            mask.intersect(outer);
        }
        self.device_clip = self.device_clip.intersect(mask.bounds());
        self.clip = Some(Rc::new(mask));
    }
}

// A span generator plus the pooled tile it samples, returned to the pool after blending.
struct PaintSource {
    span: Box<dyn SpanGenerator>,
    tile: Option<Arc<Bitmap>>,
}

impl PaintSource {
    fn new(span: impl SpanGenerator + 'static) -> Self {
        Self {
            span: Box::new(span),
            tile: None,
        }
    }
}

/// Draws scenes onto surfaces.
pub struct Renderer {
    opts: RenderOpts,
    rasterizer: Box<dyn Rasterizer>,
    pool: SurfacePool,
    stats: DrawStats,
}

impl fmt::Debug for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Renderer")
            .field("opts", &self.opts)
            .field("pool", &self.pool.stats())
            .finish_non_exhaustive()
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(RenderOpts::default())
    }
}

fn rect_path(r: Rect) -> kurbo::BezPath {
    r.to_path(0.1)
}

impl Renderer {
    /// Renderer using the `vello_cpu` rasterizer.
    pub fn new(opts: RenderOpts) -> Self {
        let rasterizer = Box::new(VelloRasterizer::new(opts.gamma));
        Self::with_rasterizer(opts, rasterizer)
    }

    /// Renderer using a custom rasterizer.
    pub fn with_rasterizer(opts: RenderOpts, rasterizer: Box<dyn Rasterizer>) -> Self {
        let pool = SurfacePool::new(opts.pool);
        Self {
            opts,
            rasterizer,
            pool,
            stats: DrawStats::default(),
        }
    }

    /// Configuration.
    pub fn opts(&self) -> &RenderOpts {
        &self.opts
    }

    /// Scratch pool counters.
    pub fn pool_stats(&self) -> SurfacePoolStats {
        self.pool.stats()
    }

    /// Draw the page tree onto `surface`. Problems inside the tree are logged and skip the
    /// affected node or subtree; an error is returned only when the pass cannot start.
    #[tracing::instrument(skip_all, fields(width = surface.width(), height = surface.height()))]
    pub fn draw(&mut self, scene: &mut Scene, surface: &mut dyn Surface) -> SceneResult<DrawStats> {
        self.stats = DrawStats::default();
        let (w, h) = (surface.width(), surface.height());
        if w == 0 || h == 0 {
            return Err(SceneError::render("surface has no pixels"));
        }
        let state = DrawState::root(w, h, Affine::IDENTITY);
        let root = scene.root();
        self.draw_node(scene, root, &state, surface)?;
        tracing::debug!(stats = ?self.stats, "draw finished");
        Ok(self.stats)
    }

    /// Draw onto a new page-sized [`Canvas`] cleared to the scene background.
    pub fn render(&mut self, scene: &mut Scene) -> SceneResult<Canvas> {
        let page = scene.page_size();
        let mut canvas = Canvas::new(page.width.ceil() as u32, page.height.ceil() as u32)?;
        if let Some(bg) = scene.background() {
            canvas.clear(bg.premul());
        }
        self.draw(scene, &mut canvas)?;
        Ok(canvas)
    }

    fn draw_node(
        &mut self,
        scene: &mut Scene,
        id: NodeId,
        state: &DrawState,
        surface: &mut dyn Surface,
    ) -> SceneResult<()> {
        if state.depth >= self.opts.max_depth {
            tracing::warn!(node = %id, depth = state.depth, "nesting limit reached; subtree skipped");
            self.stats.skipped += 1;
            return Ok(());
        }
        let Some(node) = scene.node(id) else {
            return Err(SceneError::resource(format!("node {id} does not exist")));
        };
        if let Geometry::Foreign { kind } = node.geometry() {
            tracing::warn!(node = %id, kind = %kind, "non-vector node skipped");
            self.stats.skipped += 1;
            return Ok(());
        }
        tracing::trace!(node = %id, kind = node.geometry().kind(), depth = state.depth, "visit");
        let style = node.style().clone();
        self.stats.nodes_visited += 1;

        scene.ensure_base(id);

        let visible = match style.visibility {
            Visibility::Visible => true,
            Visibility::Hidden => false,
            Visibility::Inherit => state.visible,
        };
        if !visible {
            return Ok(());
        }

        let mut st = state.clone();
        st.visible = true;
        st.depth += 1;
        st.opacity *= style.opacity;
        if let Some(join) = style.line_join {
            st.join = join;
        }
        if let Some(inner) = style.inner_join {
            st.inner_join = inner;
        }
        if let Some(cap) = style.line_cap {
            st.cap = cap;
        }
        if st.opacity <= 0.0 {
            return Ok(());
        }

        if let Some(name) = style.filter.as_deref() {
            match scene.defs().filter(name) {
                Some(effect) => return self.draw_layer(scene, id, &style, st, surface, Some(effect)),
                None => tracing::warn!(node = %id, filter = name, "filter not found; drawing unfiltered"),
            }
        }
        if style.isolated {
            return self.draw_layer(scene, id, &style, st, surface, None);
        }
        self.draw_contents(scene, id, &style, st, surface)
    }

    // Render the node into a pooled layer, optionally filter it, and composite it back. The
    // layer returns to the pool whatever happens below.
    fn draw_layer(
        &mut self,
        scene: &mut Scene,
        id: NodeId,
        style: &Style,
        st: DrawState,
        surface: &mut dyn Surface,
        effect: Option<Arc<dyn FilterEffect>>,
    ) -> SceneResult<()> {
        let bitmap = self.pool.borrow(surface.width(), surface.height())?;
        self.stats.layers += 1;
        let mut layer = Canvas::from_bitmap(bitmap);
        let drawn = self
            .draw_contents(scene, id, style, st, &mut layer)
            .and_then(|()| match &effect {
                Some(e) => {
                    tracing::debug!(node = %id, effect = e.name(), "applying filter");
                    e.apply(layer.bitmap_mut())
                }
                None => Ok(()),
            });
        if drawn.is_ok() {
            composite_layer(surface, layer.bitmap());
        }
        self.pool.release(layer.into_bitmap());
        drawn
    }

    fn draw_contents(
        &mut self,
        scene: &mut Scene,
        id: NodeId,
        style: &Style,
        mut st: DrawState,
        surface: &mut dyn Surface,
    ) -> SceneResult<()> {
        let (drawable, viewport) = match scene.node(id).map(Node::geometry) {
            Some(Geometry::Viewport(vp)) => (false, Some(vp.clone())),
            Some(g) => (g.is_drawable(), None),
            None => return Ok(()),
        };

        if let Some(vp) = viewport
            && !self.enter_viewport(scene, id, &vp, &mut st)
        {
            tracing::debug!(node = %id, "viewport clip is empty; subtree skipped");
            return Ok(());
        }

        if let Some(name) = style.clip.as_deref() {
            self.push_clip(scene, id, name, &mut st);
            if st.device_clip.is_empty() {
                return Ok(());
            }
        }

        if drawable {
            self.fill(scene, id, style, &st, surface);
            self.stroke(scene, id, style, &st, surface);
        }

        let children: Vec<NodeId> = scene.children(id).collect();
        for child in children {
            if let Err(e) = self.draw_node(scene, child, &st, surface) {
                tracing::warn!(node = %child, error = %e, "subtree aborted");
                self.stats.skipped += 1;
            }
        }
        Ok(())
    }

    // Narrow the device clip to the viewport box. Returns false when nothing remains.
    fn enter_viewport(
        &mut self,
        scene: &mut Scene,
        id: NodeId,
        vp: &Viewport,
        st: &mut DrawState,
    ) -> bool {
        let target = vp.target(scene.view_of(id));
        if !(target.width() > 0.0 && target.height() > 0.0) {
            return false;
        }
        if vp.overflow == Overflow::Visible {
            return true;
        }
        let device = st.base * scene.accumulated(id);
        if is_axis_aligned(device) {
            let r = IRect::enclosing(device.transform_rect_bbox(target));
            st.device_clip = st.device_clip.intersect(r);
        } else {
            let outline = device * rect_path(target);
            let mask = ClipMask::build(
                &[],
                Some(&outline),
                self.rasterizer.as_mut(),
                self.opts.clip_ceiling,
            );
            self.stats.clip_masks += 1;
            st.push_clip(mask);
        }
        !st.device_clip.is_empty()
    }

    fn push_clip(&mut self, scene: &mut Scene, consumer: NodeId, name: &str, st: &mut DrawState) {
        let Some(def) = scene.defs().clip(name) else {
            tracing::warn!(node = %consumer, clip = name, "clip not found; drawing unclipped");
            return;
        };
        if scene.node(def.content).is_none() {
            tracing::warn!(node = %consumer, clip = name, "clip content was removed; drawing unclipped");
            return;
        }
        let units_map = match def.units {
            Units::UserSpace => Affine::IDENTITY,
            Units::BoundingBox => match scene.local_bounds(consumer) {
                Some(b) => {
                    Affine::translate((b.x0, b.y0)) * Affine::scale_non_uniform(b.width(), b.height())
                }
                None => {
                    tracing::warn!(node = %consumer, clip = name, "bounding-box clip on a node without bounds; ignored");
                    return;
                }
            },
        };
        let xf = st.base * scene.accumulated(consumer) * units_map;

        let mut paths = Vec::new();
        for n in scene.descendants(def.content) {
            let Some(node) = scene.node(n) else { continue };
            if !node.geometry().is_drawable() || node.style().visibility == Visibility::Hidden {
                continue;
            }
            let rule = node.style().fill_rule;
            if let Some(p) = scene.final_path(n) {
                paths.push((xf * p.clone(), rule));
            }
        }

        let mask = ClipMask::build(&paths, None, self.rasterizer.as_mut(), self.opts.clip_ceiling);
        self.stats.clip_masks += 1;
        st.push_clip(mask);
    }

    fn coverage(&mut self, path: &kurbo::BezPath, rule: FillRule, st: &DrawState) -> Option<Coverage> {
        let mut cov = self.rasterizer.rasterize(path, rule, st.device_clip)?;
        if let Some(mask) = &st.clip {
            mask.apply(&mut cov);
        }
        Some(cov)
    }

    fn fill(&mut self, scene: &mut Scene, id: NodeId, style: &Style, st: &DrawState, surface: &mut dyn Surface) {
        if !style.fill.is_visible() || style.fill_opacity <= 0.0 {
            return;
        }
        let Some(base) = scene.base_path(id).cloned() else {
            return;
        };
        let device_xf = st.base * scene.accumulated(id);
        let Some(cov) = self.coverage(&(device_xf * base.clone()), style.fill_rule, st) else {
            return;
        };
        let ctx = PaintContext {
            path: &base,
            bounds: scene.local_bounds(id).unwrap_or(Rect::ZERO),
            view: scene.view_of(id),
            transform: device_xf,
            opacity: st.opacity * style.fill_opacity,
        };
        let Some(source) = self.paint_source(scene, id, &style.fill, &ctx, st) else {
            self.stats.skipped += 1;
            return;
        };
        self.stats.fills += 1;
        self.blend(surface, &cov, source);
    }

    fn stroke(&mut self, scene: &mut Scene, id: NodeId, style: &Style, st: &DrawState, surface: &mut dyn Surface) {
        if !style.stroke.is_visible() || style.stroke_width <= 0.0 || style.stroke_opacity <= 0.0 {
            return;
        }
        let Some(base) = scene.base_path(id).cloned() else {
            return;
        };
        let device_xf = st.base * scene.accumulated(id);
        let line = StrokeStyle {
            width: style.stroke_width,
            join: st.join,
            inner_join: st.inner_join,
            cap: st.cap,
            miter_limit: style.miter_limit,
            dashes: style.dashes.clone(),
            dash_offset: style.dash_offset,
        };
        let tolerance = self.opts.tolerance / affine_scale(device_xf).max(1e-6);
        let outline = device_xf * line.outline(&base, tolerance);
        let Some(cov) = self.coverage(&outline, FillRule::NonZero, st) else {
            return;
        };
        let opacity = st.opacity * style.stroke_opacity;

        let texture = match &style.stroke {
            Paint::Url(name) => match scene.defs().get(name) {
                Some(Definition::Image(img)) => Some(Arc::clone(&img.bitmap)),
                _ => None,
            },
            _ => None,
        };
        let source = match texture {
            Some(bitmap) => {
                TextureStrokeSpan::new(bitmap, &base, device_xf, style.stroke_width, opacity)
                    .map(PaintSource::new)
            }
            None => {
                let ctx = PaintContext {
                    path: &base,
                    bounds: scene.local_bounds(id).unwrap_or(Rect::ZERO),
                    view: scene.view_of(id),
                    transform: device_xf,
                    opacity,
                };
                self.paint_source(scene, id, &style.stroke, &ctx, st)
            }
        };
        let Some(source) = source else {
            self.stats.skipped += 1;
            return;
        };
        self.stats.strokes += 1;
        self.blend(surface, &cov, source);
    }

    fn paint_source(
        &mut self,
        scene: &mut Scene,
        id: NodeId,
        paint: &Paint,
        ctx: &PaintContext<'_>,
        st: &DrawState,
    ) -> Option<PaintSource> {
        match paint {
            Paint::None => None,
            Paint::Color(c) => Some(PaintSource::new(SolidSpan::new(
                c.with_opacity(ctx.opacity).premul(),
            ))),
            Paint::Url(name) => match scene.defs().get(name).cloned() {
                Some(Definition::Gradient(g)) => g.span(ctx).map(PaintSource::new),
                Some(Definition::Image(img)) => {
                    Some(PaintSource::new(img.span(ctx, self.opts.sample_method)))
                }
                Some(Definition::Pattern(p)) => self.pattern_source(scene, id, &p, ctx, st),
                Some(other) => {
                    tracing::warn!(node = %id, reference = %name, kind = other.kind(), "definition cannot be used as paint");
                    None
                }
                None => {
                    tracing::warn!(node = %id, reference = %name, "paint definition not found; skipped");
                    None
                }
            },
        }
    }

    // Render the pattern content into a pooled tile and sample it with the pattern's spread.
    fn pattern_source(
        &mut self,
        scene: &mut Scene,
        id: NodeId,
        pattern: &Pattern,
        ctx: &PaintContext<'_>,
        st: &DrawState,
    ) -> Option<PaintSource> {
        let Some(content) = pattern.content.filter(|c| scene.node(*c).is_some()) else {
            tracing::warn!(node = %id, "pattern has no content; skipped");
            return None;
        };
        let Some(plan) = pattern.plan(ctx, self.opts.clip_ceiling) else {
            tracing::debug!(node = %id, "pattern tile is empty");
            return None;
        };
        let bitmap = match self.pool.borrow(plan.width, plan.height) {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!(node = %id, error = %e, "pattern tile allocation failed");
                return None;
            }
        };

        let mut tile = Canvas::from_bitmap(bitmap);
        let mut tile_state = DrawState::root(plan.width, plan.height, plan.content);
        tile_state.depth = st.depth + 1;
        self.stats.pattern_tiles += 1;
        if let Err(e) = self.draw_node(scene, content, &tile_state, &mut tile) {
            tracing::warn!(node = %id, error = %e, "pattern content failed to draw");
        }

        let tile = Arc::new(tile.into_bitmap());
        let filter = Filter::resolve(pattern.sample, plan.image_to_device, false);
        let span = ImageSpan::new(
            Arc::clone(&tile),
            plan.image_to_device,
            pattern.spread,
            filter,
            ctx.opacity,
        );
        Some(PaintSource {
            span: Box::new(span),
            tile: Some(tile),
        })
    }

    fn blend(&mut self, surface: &mut dyn Surface, cov: &Coverage, source: PaintSource) {
        let PaintSource { mut span, tile } = source;
        let b = cov.bounds;
        let mut colors = vec![Rgba8Premul::transparent(); b.width() as usize];
        for y in b.y0..b.y1 {
            let Ok(row_y) = u32::try_from(y) else { continue };
            let row = cov.row(y);
            let mut x = 0usize;
            while x < row.len() {
                if row[x] == 0 {
                    x += 1;
                    continue;
                }
                let start = x;
                while x < row.len() && row[x] != 0 {
                    x += 1;
                }
                let px = b.x0 + start as i32;
                let Ok(col) = u32::try_from(px) else { continue };
                let out = &mut colors[..x - start];
                span.generate(px, y, out);
                surface.blend_span(col, row_y, out, &row[start..x]);
            }
        }
        drop(span);
        if let Some(tile) = tile
            && let Ok(bitmap) = Arc::try_unwrap(tile)
        {
            self.pool.release(bitmap);
        }
    }
}

fn composite_layer(surface: &mut dyn Surface, layer: &Bitmap) {
    let w = layer.width().min(surface.width()) as usize;
    let h = layer.height().min(surface.height());
    let full = vec![255u8; w];
    let stride = layer.width() as usize;
    for y in 0..h {
        let start = y as usize * stride;
        let row = &layer.pixels()[start..start + w];
        let mut x = 0usize;
        while x < w {
            if row[x].a == 0 {
                x += 1;
                continue;
            }
            let run = x;
            while x < w && row[x].a != 0 {
                x += 1;
            }
            surface.blend_span(run as u32, y, &row[run..x], &full[..x - run]);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/draw.rs"]
mod tests;
