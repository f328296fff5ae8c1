//! JSON scene documents.
//!
//! ```json
//! {
//!   "width": 200, "height": 100, "background": "#ffffff",
//!   "defs": {
//!     "sky": { "type": "gradient", "kind": "linear", "stops": [
//!       { "offset": 0, "color": "#3060ff" }, { "offset": 1, "color": "white" } ] }
//!   },
//!   "children": [
//!     { "type": "rectangle", "width": "100%", "height": "100%", "fill": "url(#sky)" },
//!     { "type": "ellipse", "cx": 100, "cy": 50, "rx": 30, "ry": 20,
//!       "fill": "none", "stroke": "black", "stroke_width": 2, "transform": "rotate(15, 100, 50)" }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;

use crate::effects::blur::GaussianBlur;
use crate::foundation::core::Point;
use crate::foundation::error::{SceneError, SceneResult};
use crate::foundation::units::Coord;
use crate::paint::bitmap::Bitmap;
use crate::paint::color::Color;
use crate::paint::gradient::{Gradient, Units};
use crate::paint::image_fill::ImageFill;
use crate::paint::pattern::Pattern;
use crate::paint::sample::{ImageSpread, SampleMethod};
use crate::path::command::parse_path;
use crate::path::parametric::{Spiral, Supershape, Wave};
use crate::path::shapes::{Ellipse, Polygon, Rectangle, parse_points};
use crate::scene::defs::ClipDef;
use crate::scene::node::{Geometry, NodeId, Style, Viewport};
use crate::scene::tree::Scene;
use crate::transform::affine::Transform;
use crate::transform::transition::Transition;
use crate::viewport::aspect::AspectRatio;

#[derive(Debug, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct SceneDoc {
    width: f64,
    height: f64,
    #[serde(default)]
    background: Option<Color>,
    #[serde(default)]
    defs: BTreeMap<String, DefDoc>,
    #[serde(default)]
    children: Vec<NodeDoc>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum DefDoc {
    Gradient(Gradient),
    Image(ImageDoc),
    Pattern(PatternDoc),
    Clip(ClipDoc),
    Transition(TransitionDoc),
    GaussianBlur(BlurDoc),
}

#[derive(Debug, serde::Deserialize)]
struct ImageDoc {
    src: PathBuf,
    #[serde(default)]
    aspect: AspectRatio,
    #[serde(default)]
    spread: ImageSpread,
    #[serde(default)]
    sample: Option<SampleMethod>,
}

#[derive(Debug, serde::Deserialize)]
struct PatternDoc {
    #[serde(flatten)]
    pattern: Pattern,
    #[serde(default)]
    children: Vec<NodeDoc>,
}

#[derive(Debug, serde::Deserialize)]
struct ClipDoc {
    #[serde(default)]
    units: Option<Units>,
    #[serde(default)]
    children: Vec<NodeDoc>,
}

#[derive(Debug, serde::Deserialize)]
struct TransitionDoc {
    stops: Vec<TransitionStopDoc>,
}

#[derive(Debug, serde::Deserialize)]
struct TransitionStopDoc {
    offset: f64,
    transform: String,
}

#[derive(Debug, serde::Deserialize)]
struct BlurDoc {
    std_deviation: f32,
    #[serde(default)]
    radius: Option<u32>,
}

#[derive(Debug, serde::Deserialize)]
struct NodeDoc {
    #[serde(flatten)]
    shape: ShapeDoc,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    transform: Option<TransformDoc>,
    #[serde(flatten)]
    style: Style,
    #[serde(default)]
    children: Vec<NodeDoc>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(untagged)]
enum TransformDoc {
    Text(String),
    List(Vec<Transform>),
}

#[derive(Debug, serde::Deserialize)]
#[serde(untagged)]
enum PointsDoc {
    Text(String),
    Pairs(Vec<[f64; 2]>),
}

impl PointsDoc {
    fn points(&self) -> SceneResult<Vec<Point>> {
        match self {
            PointsDoc::Text(s) => parse_points(s),
            PointsDoc::Pairs(p) => Ok(p.iter().map(|[x, y]| Point::new(*x, *y)).collect()),
        }
    }
}

fn yes() -> bool {
    true
}

#[derive(Debug, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ShapeDoc {
    Group,
    Path {
        d: String,
    },
    Ellipse(Ellipse),
    Circle {
        #[serde(default)]
        cx: Coord,
        #[serde(default)]
        cy: Coord,
        r: Coord,
        #[serde(default)]
        vertices: u32,
    },
    #[serde(alias = "rect")]
    Rectangle(Rectangle),
    Polygon {
        points: PointsDoc,
        #[serde(default = "yes")]
        closed: bool,
    },
    Polyline {
        points: PointsDoc,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
    },
    Spiral(Spiral),
    Supershape(Supershape),
    Wave(Wave),
    Viewport(Viewport),
    #[serde(other)]
    Unsupported,
}

impl ShapeDoc {
    fn into_geometry(self) -> SceneResult<Geometry> {
        Ok(match self {
            ShapeDoc::Group => Geometry::Group,
            ShapeDoc::Path { d } => Geometry::Path(parse_path(&d)?),
            ShapeDoc::Ellipse(e) => Geometry::Ellipse(e),
            ShapeDoc::Circle { cx, cy, r, vertices } => Geometry::Ellipse(Ellipse {
                cx,
                cy,
                rx: r,
                ry: r,
                vertices,
            }),
            ShapeDoc::Rectangle(r) => Geometry::Rectangle(r),
            ShapeDoc::Polygon { points, closed } => {
                Geometry::Polygon(Polygon::new(points.points()?, closed)?)
            }
            ShapeDoc::Polyline { points } => Geometry::Polygon(Polygon::new(points.points()?, false)?),
            ShapeDoc::Line { x1, y1, x2, y2 } => {
                Geometry::Polygon(Polygon::line(Point::new(x1, y1), Point::new(x2, y2)))
            }
            ShapeDoc::Spiral(s) => Geometry::Spiral(s),
            ShapeDoc::Supershape(s) => Geometry::Supershape(s),
            ShapeDoc::Wave(w) => Geometry::Wave(w),
            ShapeDoc::Viewport(v) => Geometry::Viewport(v),
            ShapeDoc::Unsupported => Geometry::Foreign {
                kind: "unsupported".to_owned(),
            },
        })
    }
}

/// Accept `name`, `#name` or `url(#name)`.
fn reference_name(text: String) -> String {
    let t = text.trim();
    let t = t
        .strip_prefix("url(")
        .and_then(|s| s.strip_suffix(')'))
        .unwrap_or(t)
        .trim();
    t.strip_prefix('#').unwrap_or(t).to_owned()
}

struct Builder<'a> {
    scene: Scene,
    base_dir: Option<&'a Path>,
}

impl Builder<'_> {
    fn node(&mut self, parent: Option<NodeId>, doc: NodeDoc) -> SceneResult<NodeId> {
        let geometry = doc.shape.into_geometry()?;
        let id = match parent {
            Some(p) => self.scene.add_child(p, geometry)?,
            None => self.scene.create_detached(geometry)?,
        };
        match doc.transform {
            Some(TransformDoc::Text(s)) => self.scene.set_transform(id, &s)?,
            Some(TransformDoc::List(list)) => self.scene.set_transforms(id, list)?,
            None => {}
        }
        let mut style = doc.style;
        style.clip = style.clip.map(reference_name);
        style.filter = style.filter.map(reference_name);
        style.transition = style.transition.map(reference_name);
        self.scene.set_style(id, style)?;
        self.scene.set_name(id, doc.name.as_deref())?;
        for child in doc.children {
            self.node(Some(id), child)?;
        }
        Ok(id)
    }

    fn content(&mut self, children: Vec<NodeDoc>) -> SceneResult<NodeId> {
        let root = self.scene.create_detached(Geometry::Group)?;
        for child in children {
            self.node(Some(root), child)?;
        }
        Ok(root)
    }

    fn def(&mut self, name: &str, doc: DefDoc) -> SceneResult<()> {
        match doc {
            DefDoc::Gradient(g) => self.scene.defs_mut().add_gradient(name, g),
            DefDoc::Image(img) => {
                let path = match self.base_dir {
                    Some(dir) if img.src.is_relative() => dir.join(&img.src),
                    _ => img.src.clone(),
                };
                let bitmap = Bitmap::open(&path)?;
                let fill = ImageFill {
                    aspect: img.aspect,
                    spread: img.spread,
                    sample: img.sample,
                    ..ImageFill::new(Arc::new(bitmap))
                };
                self.scene.defs_mut().add_image(name, fill)
            }
            DefDoc::Pattern(p) => {
                let mut pattern = p.pattern;
                pattern.content = Some(self.content(p.children)?);
                self.scene.defs_mut().add_pattern(name, pattern)
            }
            DefDoc::Clip(c) => {
                let clip = ClipDef {
                    units: c.units.unwrap_or(Units::UserSpace),
                    content: self.content(c.children)?,
                };
                self.scene.defs_mut().add_clip(name, clip)
            }
            DefDoc::Transition(t) => {
                let transition =
                    Transition::parse(t.stops.iter().map(|s| (s.offset, s.transform.as_str())))?;
                self.scene.defs_mut().add_transition(name, transition)
            }
            DefDoc::GaussianBlur(b) => {
                let blur = match b.radius {
                    Some(r) => GaussianBlur::new(r, b.std_deviation)?,
                    None => GaussianBlur::from_std_deviation(b.std_deviation)?,
                };
                self.scene.defs_mut().add_filter(name, Arc::new(blur))
            }
        }
    }
}

impl Scene {
    /// Build a scene from a JSON document. Relative image paths resolve against the current
    /// directory.
    pub fn from_json(text: &str) -> SceneResult<Self> {
        Self::from_json_in(text, None)
    }

    /// Load a JSON scene file. Relative image paths resolve against the file's directory.
    pub fn load(path: impl AsRef<Path>) -> SceneResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read scene '{}'", path.display()))?;
        Self::from_json_in(&text, path.parent())
    }

    fn from_json_in(text: &str, base_dir: Option<&Path>) -> SceneResult<Self> {
        let doc: SceneDoc =
            serde_json::from_str(text).map_err(|e| SceneError::serde(e.to_string()))?;
        let mut scene = Scene::new(doc.width, doc.height)?;
        scene.set_background(doc.background);

        let mut b = Builder { scene, base_dir };
        for (name, def) in doc.defs {
            b.def(&name, def)
                .map_err(|e| SceneError::validation(format!("definition '{name}': {e}")))?;
        }
        let root = b.scene.root();
        for child in doc.children {
            b.node(Some(root), child)?;
        }
        tracing::debug!(nodes = b.scene.len(), defs = b.scene.defs().len(), "scene loaded");
        Ok(b.scene)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/doc.rs"]
mod tests;
