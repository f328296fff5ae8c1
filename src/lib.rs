#![forbid(unsafe_code)]
#![warn(missing_docs)]
//! Retained vector scene graph rendered on the CPU.
//!
//! A [`Scene`] owns a tree of nodes (groups, shapes, paths and nested viewports) plus a table
//! of named [`Defs`] (gradients, images, patterns, clips, transitions and filters). A
//! [`Renderer`] walks the page tree and composites every node onto a [`Surface`].
//!
//! ```no_run
//! use vecscene::{Renderer, Scene};
//!
//! let mut scene = Scene::load("scene.json")?;
//! let canvas = Renderer::default().render(&mut scene)?;
//! canvas.save_png("scene.png")?;
//! # Ok::<(), anyhow::Error>(())
//! ```

mod effects;
mod foundation;
mod paint;
mod path;
mod render;
mod scene;
mod transform;
mod viewport;

pub use effects::blur::GaussianBlur;
pub use effects::filter::FilterEffect;
pub use foundation::core::{IRect, Rgba8Premul};
pub use foundation::error::{SceneError, SceneResult};
pub use foundation::units::{Coord, ViewSize};
pub use paint::bitmap::Bitmap;
pub use paint::color::{Color, Paint};
pub use paint::gradient::{Gradient, GradientKind, GradientStop, SpreadMethod, Units};
pub use paint::image_fill::ImageFill;
pub use paint::pattern::Pattern;
pub use paint::sample::{ImageSpread, SampleMethod};
pub use paint::span::{PaintContext, SolidSpan, SpanGenerator};
pub use path::command::{PathCommand, parse_path};
pub use path::parametric::{Spiral, Supershape, Wave, WaveClose};
pub use path::shapes::{Ellipse, Polygon, Rectangle};
pub use render::clip::ClipMask;
pub use render::draw::{DrawStats, RenderOpts, Renderer};
pub use render::raster::{Coverage, Rasterizer, VelloRasterizer};
pub use render::stroke::{InnerJoin, LineCap, LineJoin, StrokeStyle};
pub use render::surface::{Canvas, FillRule, Surface};
pub use render::surface_pool::{SurfacePoolOpts, SurfacePoolStats};
pub use scene::defs::{ClipDef, Definition, Defs};
pub use scene::node::{
    DirtyFlags, Geometry, Node, NodeId, Overflow, Style, Viewport, Visibility,
};
pub use scene::tree::{Children, Scene};
pub use transform::affine::{Transform, compose, parse_transform_list};
pub use transform::transition::{Transition, TransitionStop};
pub use viewport::aspect::{Align, AspectRatio, Fit, ViewBox};
