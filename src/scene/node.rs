//! Scene nodes: geometry descriptors, styles and cached derived paths.

use crate::foundation::core::{Affine, BezPath, Rect};
use crate::foundation::error::{SceneError, SceneResult};
use crate::foundation::units::{Coord, ViewSize};
use crate::paint::color::{Color, Paint};
use crate::path::command::{PathCommand, commands_to_path};
use crate::path::parametric::{MAX_SHAPE_VERTICES, Spiral, Supershape, Wave};
use crate::path::shapes::{Ellipse, GenContext, Generated, Polygon, Rectangle};
use crate::render::stroke::{InnerJoin, LineCap, LineJoin};
use crate::render::surface::FillRule;
use crate::transform::affine::Transform;
use crate::viewport::aspect::{AspectRatio, ViewBox};

/// Stable handle of a node in a [`crate::Scene`].
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Arena slot.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Node visibility.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Drawn.
    Visible,
    /// Skipped along with the whole subtree.
    Hidden,
    /// Same as the parent.
    #[default]
    Inherit,
}

/// Whether a viewport clips its content to its box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Overflow {
    /// Content outside the box is clipped.
    #[default]
    Hidden,
    /// Content may draw outside the box.
    Visible,
}

/// A nested coordinate system: a target box in the parent's space, optionally showing a
/// view box fitted with an aspect ratio.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Viewport {
    /// Box left.
    pub x: Coord,
    /// Box top.
    pub y: Coord,
    /// Box width.
    pub width: Coord,
    /// Box height.
    pub height: Coord,
    /// Source area shown in the box.
    pub view_box: Option<ViewBox>,
    /// How the view box is fitted.
    pub aspect: AspectRatio,
    /// Clipping to the box.
    pub overflow: Overflow,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            x: Coord::Px(0.0),
            y: Coord::Px(0.0),
            width: Coord::Rel(1.0),
            height: Coord::Rel(1.0),
            view_box: None,
            aspect: AspectRatio::default(),
            overflow: Overflow::Hidden,
        }
    }
}

impl Viewport {
    /// Viewport of a fixed size at the origin.
    pub fn sized(width: f64, height: f64) -> Self {
        Self {
            width: Coord::Px(width),
            height: Coord::Px(height),
            ..Self::default()
        }
    }

    /// Target box in the parent's coordinate space.
    pub fn target(&self, view: ViewSize) -> Rect {
        let x = self.x.resolve(view.width);
        let y = self.y.resolve(view.height);
        Rect::new(
            x,
            y,
            x + self.width.resolve(view.width),
            y + self.height.resolve(view.height),
        )
    }

    /// Size that children's relative coordinates resolve against.
    pub fn content_view(&self, view: ViewSize) -> ViewSize {
        match self.view_box {
            Some(vb) if vb.width > 0.0 && vb.height > 0.0 => ViewSize::new(vb.width, vb.height),
            _ => {
                let t = self.target(view);
                ViewSize::new(t.width(), t.height())
            }
        }
    }

    /// Children's space to the parent's space.
    pub fn content_map(&self, view: ViewSize) -> Affine {
        let t = self.target(view);
        match self.view_box {
            Some(vb) if vb.width > 0.0 && vb.height > 0.0 => self
                .aspect
                .map(t.width(), t.height(), vb.width, vb.height)
                .to_affine(vb.x, vb.y, t.x0, t.y0),
            _ => Affine::translate((t.x0, t.y0)),
        }
    }
}

/// What a node draws.
#[derive(Clone, Debug, PartialEq)]
pub enum Geometry {
    /// No geometry of its own; a container.
    Group,
    /// Path commands.
    Path(Vec<PathCommand>),
    /// Ellipse.
    Ellipse(Ellipse),
    /// Rectangle, optionally rounded.
    Rectangle(Rectangle),
    /// Polygon, polyline or line.
    Polygon(Polygon),
    /// Archimedean spiral.
    Spiral(Spiral),
    /// Superformula shape.
    Supershape(Supershape),
    /// Sine wave.
    Wave(Wave),
    /// Nested viewport.
    Viewport(Viewport),
    /// Outline supplied by an external path source such as a glyph shaper.
    Outline(BezPath),
    /// An object that is not a vector; traversal skips it.
    Foreign {
        /// Kind reported in logs.
        kind: String,
    },
}

impl Geometry {
    /// True for geometry that produces a fillable path.
    pub fn is_drawable(&self) -> bool {
        !matches!(
            self,
            Geometry::Group | Geometry::Viewport(_) | Geometry::Foreign { .. }
        )
    }

    /// Short kind name for logs.
    pub fn kind(&self) -> &str {
        match self {
            Geometry::Group => "group",
            Geometry::Path(_) => "path",
            Geometry::Ellipse(_) => "ellipse",
            Geometry::Rectangle(_) => "rectangle",
            Geometry::Polygon(_) => "polygon",
            Geometry::Spiral(_) => "spiral",
            Geometry::Supershape(_) => "supershape",
            Geometry::Wave(_) => "wave",
            Geometry::Viewport(_) => "viewport",
            Geometry::Outline(_) => "outline",
            Geometry::Foreign { kind } => kind,
        }
    }

    pub(crate) fn validate(&self) -> SceneResult<()> {
        match self {
            Geometry::Polygon(p) if p.points.len() < 2 => {
                Err(SceneError::validation("polygon needs at least 2 points"))
            }
            Geometry::Rectangle(r) => {
                let mut check = r.clone();
                check.set_corner_radii(r.rx, r.ry)
            }
            Geometry::Ellipse(e) if e.vertices > 0 && e.vertices < 3 => {
                Err(SceneError::validation("ellipse needs at least 3 vertices"))
            }
            Geometry::Ellipse(e) if e.vertices >= MAX_SHAPE_VERTICES => Err(
                SceneError::validation(format!(
                    "ellipse vertices {} must be below {MAX_SHAPE_VERTICES}",
                    e.vertices
                )),
            ),
            Geometry::Supershape(s) if !(3..MAX_SHAPE_VERTICES).contains(&s.vertices) => Err(
                SceneError::validation(format!(
                    "supershape vertices {} must be in [3, {MAX_SHAPE_VERTICES})",
                    s.vertices
                )),
            ),
            _ => Ok(()),
        }
    }

    /// Base path in object space. `None` for geometry that has no path of its own.
    pub fn generate(&self, ctx: &GenContext) -> Option<Generated> {
        match self {
            Geometry::Group | Geometry::Foreign { .. } => None,
            Geometry::Path(cmds) => Some(Generated::path(commands_to_path(cmds))),
            Geometry::Ellipse(e) => Some(e.generate(ctx)),
            Geometry::Rectangle(r) => Some(r.generate(ctx)),
            Geometry::Polygon(p) => Some(p.generate(ctx)),
            Geometry::Spiral(s) => Some(s.generate(ctx)),
            Geometry::Supershape(s) => Some(s.generate(ctx)),
            Geometry::Wave(w) => Some(w.generate(ctx)),
            Geometry::Viewport(v) => {
                let t = v.target(ctx.view);
                let mut path = BezPath::new();
                path.move_to((t.x0, t.y0));
                path.line_to((t.x1, t.y0));
                path.line_to((t.x1, t.y1));
                path.line_to((t.x0, t.y1));
                path.close_path();
                Some(Generated {
                    path,
                    bounds: Some(t),
                })
            }
            Geometry::Outline(p) => Some(Generated::path(p.clone())),
        }
    }
}

/// Paint and line attributes of a node.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Style {
    /// Interior paint.
    pub fill: Paint,
    /// Outline paint.
    pub stroke: Paint,
    /// Node opacity, multiplied into descendants.
    pub opacity: f64,
    /// Extra opacity for the fill.
    pub fill_opacity: f64,
    /// Extra opacity for the stroke.
    pub stroke_opacity: f64,
    /// Stroke width in object units.
    pub stroke_width: f64,
    /// `None` inherits.
    pub line_join: Option<LineJoin>,
    /// `None` inherits.
    pub inner_join: Option<InnerJoin>,
    /// `None` inherits.
    pub line_cap: Option<LineCap>,
    /// Miter limit, at least 1.
    pub miter_limit: f64,
    /// Dash array; empty for solid lines.
    pub dashes: Vec<f64>,
    /// Dash phase.
    pub dash_offset: f64,
    /// Interior rule.
    pub fill_rule: FillRule,
    /// Visibility.
    pub visibility: Visibility,
    /// Name of a clip definition.
    pub clip: Option<String>,
    /// Name of a filter definition.
    pub filter: Option<String>,
    /// Name of a transition definition morphing the base path.
    pub transition: Option<String>,
    /// Render the subtree into its own layer before compositing.
    pub isolated: bool,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            fill: Paint::Color(Color::rgb(0, 0, 0)),
            stroke: Paint::None,
            opacity: 1.0,
            fill_opacity: 1.0,
            stroke_opacity: 1.0,
            stroke_width: 1.0,
            line_join: None,
            inner_join: None,
            line_cap: None,
            miter_limit: 4.0,
            dashes: Vec::new(),
            dash_offset: 0.0,
            fill_rule: FillRule::NonZero,
            visibility: Visibility::Inherit,
            clip: None,
            filter: None,
            transition: None,
            isolated: false,
        }
    }
}

fn check_unit(what: &str, v: f64) -> SceneResult<()> {
    if (0.0..=1.0).contains(&v) {
        Ok(())
    } else {
        Err(SceneError::validation(format!("{what} {v} outside [0, 1]")))
    }
}

impl Style {
    /// Reject out-of-range values.
    pub fn validate(&self) -> SceneResult<()> {
        check_unit("opacity", self.opacity)?;
        check_unit("fill opacity", self.fill_opacity)?;
        check_unit("stroke opacity", self.stroke_opacity)?;
        if !self.stroke_width.is_finite() || self.stroke_width < 0.0 {
            return Err(SceneError::validation(format!(
                "stroke width {} must be >= 0",
                self.stroke_width
            )));
        }
        if !self.miter_limit.is_finite() || self.miter_limit < 1.0 {
            return Err(SceneError::validation(format!(
                "miter limit {} must be >= 1",
                self.miter_limit
            )));
        }
        if self.dashes.iter().any(|d| !d.is_finite() || *d < 0.0) {
            return Err(SceneError::validation("dash lengths must be >= 0"));
        }
        if !self.dash_offset.is_finite() {
            return Err(SceneError::validation("dash offset must be finite"));
        }
        for name in [&self.clip, &self.filter, &self.transition].into_iter().flatten() {
            if name.is_empty() {
                return Err(SceneError::validation("empty definition reference"));
            }
        }
        Ok(())
    }
}

/// Stale derived data of a node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DirtyFlags(u8);

impl DirtyFlags {
    /// Base path must be regenerated.
    pub const BASE_PATH: Self = Self(1);
    /// Final (transformed) path must be recomputed.
    pub const FINAL_PATH: Self = Self(2);
    /// Accumulated transform must be recomputed.
    pub const TRANSFORM: Self = Self(4);
    /// Everything stale.
    pub const ALL: Self = Self(7);

    /// True if any bit of `other` is set.
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Set the bits of `other`.
    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    /// Clear the bits of `other`.
    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }

    /// True if nothing is stale.
    pub fn is_clean(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for DirtyFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// One element of the scene tree.
#[derive(Clone, Debug)]
pub struct Node {
    pub(crate) geometry: Geometry,
    pub(crate) transforms: Vec<Transform>,
    pub(crate) style: Style,
    pub(crate) name: Option<String>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) first_child: Option<NodeId>,
    pub(crate) last_child: Option<NodeId>,
    pub(crate) next_sibling: Option<NodeId>,
    pub(crate) prev_sibling: Option<NodeId>,
    pub(crate) dirty: DirtyFlags,
    pub(crate) base: Option<Generated>,
    pub(crate) base_scale: f64,
    pub(crate) accumulated: Affine,
    pub(crate) final_path: Option<BezPath>,
}

impl Node {
    pub(crate) fn new(geometry: Geometry) -> Self {
        Self {
            geometry,
            transforms: Vec::new(),
            style: Style::default(),
            name: None,
            parent: None,
            first_child: None,
            last_child: None,
            next_sibling: None,
            prev_sibling: None,
            dirty: DirtyFlags::ALL,
            base: None,
            base_scale: 1.0,
            accumulated: Affine::IDENTITY,
            final_path: None,
        }
    }

    /// Geometry descriptor.
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Own transforms, first applied first.
    pub fn transforms(&self) -> &[Transform] {
        &self.transforms
    }

    /// Style.
    pub fn style(&self) -> &Style {
        &self.style
    }

    /// Optional name.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Parent, `None` for roots.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Stale derived data.
    pub fn dirty(&self) -> DirtyFlags {
        self.dirty
    }
}
