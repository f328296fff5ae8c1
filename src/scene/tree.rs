//! The scene arena: structure, validated mutation, dirty tracking and derived geometry.

use crate::foundation::core::{Affine, BezPath, Rect};
use crate::foundation::error::{SceneError, SceneResult};
use crate::foundation::units::ViewSize;
use crate::paint::color::{Color, Paint};
use crate::path::bounds::{bounds, union};
use crate::path::command::parse_path;
use crate::path::shapes::GenContext;
use crate::render::stroke::{InnerJoin, LineCap, LineJoin};
use crate::render::surface::FillRule;
use crate::scene::defs::Defs;
use crate::scene::node::{DirtyFlags, Geometry, Node, NodeId, Style, Viewport, Visibility};
use crate::transform::affine::{Transform, affine_scale, compose, parse_transform_list};

/// A tree of vector nodes rooted at a page-sized viewport, plus the definitions its nodes
/// reference.
///
/// Nodes live in an arena addressed by [`NodeId`]. Removed slots are never reused, so a
/// stale id resolves to nothing instead of aliasing a newer node. Detached roots (pattern
/// and clip content) share the arena but are not reachable from [`Scene::root`].
#[derive(Clone, Debug)]
pub struct Scene {
    nodes: Vec<Option<Node>>,
    root: NodeId,
    page: ViewSize,
    background: Option<Color>,
    defs: Defs,
}

/// Iterator over a node's children in sibling order.
#[derive(Clone, Debug)]
pub struct Children<'a> {
    scene: &'a Scene,
    next: Option<NodeId>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.next?;
        self.next = self.scene.node(id).and_then(|n| n.next_sibling);
        Some(id)
    }
}

fn check_page(width: f64, height: f64) -> SceneResult<()> {
    if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
        return Err(SceneError::validation(format!(
            "page size {width}x{height} must be positive"
        )));
    }
    Ok(())
}

impl Scene {
    /// Empty scene whose root viewport covers a `width` x `height` page.
    pub fn new(width: f64, height: f64) -> SceneResult<Self> {
        check_page(width, height)?;
        let root = Node::new(Geometry::Viewport(Viewport::sized(width, height)));
        Ok(Self {
            nodes: vec![Some(root)],
            root: NodeId(0),
            page: ViewSize::new(width, height),
            background: None,
            defs: Defs::default(),
        })
    }

    /// Root viewport.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Page size.
    pub fn page_size(&self) -> ViewSize {
        self.page
    }

    /// Resize the page and the root viewport.
    pub fn set_page_size(&mut self, width: f64, height: f64) -> SceneResult<()> {
        check_page(width, height)?;
        self.page = ViewSize::new(width, height);
        let root = self.root;
        if let Geometry::Viewport(vp) = &mut self.node_mut(root)?.geometry {
            vp.width = width.into();
            vp.height = height.into();
        }
        for node in self.nodes.iter_mut().flatten() {
            node.dirty.insert(DirtyFlags::ALL);
        }
        Ok(())
    }

    /// Color the page is cleared to before drawing.
    pub fn background(&self) -> Option<Color> {
        self.background
    }

    /// Set the page background.
    pub fn set_background(&mut self, color: Option<Color>) {
        self.background = color;
    }

    /// Number of live nodes, detached roots included.
    pub fn len(&self) -> usize {
        self.nodes.iter().flatten().count()
    }

    /// True when only the root exists.
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }

    /// Look up a node.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index()).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: NodeId) -> SceneResult<&mut Node> {
        self.nodes
            .get_mut(id.index())
            .and_then(Option::as_mut)
            .ok_or_else(|| SceneError::validation(format!("unknown node {id}")))
    }

    fn alloc(&mut self, geometry: Geometry) -> SceneResult<NodeId> {
        geometry.validate()?;
        let index = u32::try_from(self.nodes.len())
            .map_err(|_| SceneError::resource("scene node limit reached"))?;
        self.nodes.push(Some(Node::new(geometry)));
        Ok(NodeId(index))
    }

    /// Append a new node as the last child of `parent`.
    pub fn add_child(&mut self, parent: NodeId, geometry: Geometry) -> SceneResult<NodeId> {
        self.node_mut(parent)?;
        let id = self.alloc(geometry)?;
        let prev = {
            let p = self.node_mut(parent)?;
            let prev = p.last_child;
            p.last_child = Some(id);
            if p.first_child.is_none() {
                p.first_child = Some(id);
            }
            prev
        };
        if let Some(prev) = prev {
            self.node_mut(prev)?.next_sibling = Some(id);
        }
        let node = self.node_mut(id)?;
        node.parent = Some(parent);
        node.prev_sibling = prev;
        Ok(id)
    }

    /// Create a root that is not part of the page tree, for pattern and clip content.
    pub fn create_detached(&mut self, geometry: Geometry) -> SceneResult<NodeId> {
        self.alloc(geometry)
    }

    /// Detach `id` from its parent and free its whole subtree.
    pub fn remove(&mut self, id: NodeId) -> SceneResult<()> {
        if id == self.root {
            return Err(SceneError::validation("the root viewport cannot be removed"));
        }
        let (parent, prev, next) = {
            let n = self.node_mut(id)?;
            (n.parent, n.prev_sibling, n.next_sibling)
        };
        if let Some(prev) = prev {
            self.node_mut(prev)?.next_sibling = next;
        }
        if let Some(next) = next {
            self.node_mut(next)?.prev_sibling = prev;
        }
        if let Some(parent) = parent {
            let p = self.node_mut(parent)?;
            if p.first_child == Some(id) {
                p.first_child = next;
            }
            if p.last_child == Some(id) {
                p.last_child = prev;
            }
        }
        let doomed = self.descendants(id);
        tracing::debug!(node = %id, count = doomed.len(), "removing subtree");
        for d in doomed {
            if let Some(slot) = self.nodes.get_mut(d.index()) {
                *slot = None;
            }
        }
        Ok(())
    }

    /// Children of `id` in sibling order.
    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            scene: self,
            next: self.node(id).and_then(|n| n.first_child),
        }
    }

    /// Parent of `id`.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.parent)
    }

    /// `id` and all its descendants in pre-order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            if self.node(cur).is_none() {
                continue;
            }
            out.push(cur);
            let kids: Vec<NodeId> = self.children(cur).collect();
            stack.extend(kids.into_iter().rev());
        }
        out
    }

    /// First node in the page tree with the given name.
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .find(|id| self.node(*id).and_then(Node::name) == Some(name))
    }

    fn mark_subtree(&mut self, id: NodeId, flags: DirtyFlags) {
        for d in self.descendants(id) {
            if let Some(Some(n)) = self.nodes.get_mut(d.index()) {
                n.dirty.insert(flags);
            }
        }
    }

    /// Replace a node's geometry. Viewport changes also invalidate everything below, since
    /// descendants resolve coordinates against the viewport.
    pub fn set_geometry(&mut self, id: NodeId, geometry: Geometry) -> SceneResult<()> {
        geometry.validate()?;
        let is_viewport = matches!(geometry, Geometry::Viewport(_));
        let node = self.node_mut(id)?;
        let was_viewport = matches!(node.geometry, Geometry::Viewport(_));
        node.geometry = geometry;
        node.dirty.insert(DirtyFlags::BASE_PATH | DirtyFlags::FINAL_PATH);
        if is_viewport || was_viewport {
            self.mark_subtree(id, DirtyFlags::ALL);
        }
        Ok(())
    }

    /// Replace the geometry with parsed path commands.
    pub fn set_path(&mut self, id: NodeId, data: &str) -> SceneResult<()> {
        let cmds = parse_path(data)?;
        self.set_geometry(id, Geometry::Path(cmds))
    }

    /// Replace a node's transform list.
    pub fn set_transforms(&mut self, id: NodeId, transforms: Vec<Transform>) -> SceneResult<()> {
        if !compose(&transforms).is_finite() {
            return Err(SceneError::validation("transform list is not finite"));
        }
        self.node_mut(id)?.transforms = transforms;
        self.mark_subtree(id, DirtyFlags::TRANSFORM | DirtyFlags::FINAL_PATH);
        Ok(())
    }

    /// Replace a node's transform list from a transform string.
    pub fn set_transform(&mut self, id: NodeId, text: &str) -> SceneResult<()> {
        let list = parse_transform_list(text)?;
        self.set_transforms(id, list)
    }

    /// Replace the whole style after validating it.
    pub fn set_style(&mut self, id: NodeId, style: Style) -> SceneResult<()> {
        style.validate()?;
        let node = self.node_mut(id)?;
        if node.style.transition != style.transition {
            node.dirty.insert(DirtyFlags::BASE_PATH);
        }
        node.style = style;
        Ok(())
    }

    /// Edit a copy of the style and commit it if it validates.
    pub fn update_style(&mut self, id: NodeId, edit: impl FnOnce(&mut Style)) -> SceneResult<()> {
        let mut style = self.node_mut(id)?.style.clone();
        edit(&mut style);
        self.set_style(id, style)
    }

    /// Set the fill from a paint string.
    pub fn set_fill(&mut self, id: NodeId, paint: &str) -> SceneResult<()> {
        let paint = Paint::parse(paint)?;
        self.update_style(id, |s| s.fill = paint)
    }

    /// Set the stroke from a paint string.
    pub fn set_stroke(&mut self, id: NodeId, paint: &str) -> SceneResult<()> {
        let paint = Paint::parse(paint)?;
        self.update_style(id, |s| s.stroke = paint)
    }

    /// Set the opacity, in `[0, 1]`.
    pub fn set_opacity(&mut self, id: NodeId, opacity: f64) -> SceneResult<()> {
        self.update_style(id, |s| s.opacity = opacity)
    }

    /// Set the stroke width, at least 0.
    pub fn set_stroke_width(&mut self, id: NodeId, width: f64) -> SceneResult<()> {
        self.update_style(id, |s| s.stroke_width = width)
    }

    /// Set the visibility.
    pub fn set_visibility(&mut self, id: NodeId, visibility: Visibility) -> SceneResult<()> {
        self.update_style(id, |s| s.visibility = visibility)
    }

    /// Reference a clip definition, or clear it.
    pub fn set_clip(&mut self, id: NodeId, name: Option<&str>) -> SceneResult<()> {
        let name = name.map(str::to_owned);
        self.update_style(id, |s| s.clip = name)
    }

    /// Reference a filter definition, or clear it.
    pub fn set_filter(&mut self, id: NodeId, name: Option<&str>) -> SceneResult<()> {
        let name = name.map(str::to_owned);
        self.update_style(id, |s| s.filter = name)
    }

    /// Reference a transition definition, or clear it.
    pub fn set_transition(&mut self, id: NodeId, name: Option<&str>) -> SceneResult<()> {
        let name = name.map(str::to_owned);
        self.update_style(id, |s| s.transition = name)
    }

    /// Set the dash array and offset.
    pub fn set_dashes(&mut self, id: NodeId, dashes: Vec<f64>, offset: f64) -> SceneResult<()> {
        self.update_style(id, |s| {
            s.dashes = dashes;
            s.dash_offset = offset;
        })
    }

    /// Set the miter limit, at least 1.
    pub fn set_miter_limit(&mut self, id: NodeId, limit: f64) -> SceneResult<()> {
        self.update_style(id, |s| s.miter_limit = limit)
    }

    /// Set or inherit the line join.
    pub fn set_line_join(&mut self, id: NodeId, join: Option<LineJoin>) -> SceneResult<()> {
        self.update_style(id, |s| s.line_join = join)
    }

    /// Set or inherit the inner join.
    pub fn set_inner_join(&mut self, id: NodeId, join: Option<InnerJoin>) -> SceneResult<()> {
        self.update_style(id, |s| s.inner_join = join)
    }

    /// Set or inherit the line cap.
    pub fn set_line_cap(&mut self, id: NodeId, cap: Option<LineCap>) -> SceneResult<()> {
        self.update_style(id, |s| s.line_cap = cap)
    }

    /// Set the fill rule.
    pub fn set_fill_rule(&mut self, id: NodeId, rule: FillRule) -> SceneResult<()> {
        self.update_style(id, |s| s.fill_rule = rule)
    }

    /// Request an isolated layer for the subtree.
    pub fn set_isolated(&mut self, id: NodeId, isolated: bool) -> SceneResult<()> {
        self.update_style(id, |s| s.isolated = isolated)
    }

    /// Name a node.
    pub fn set_name(&mut self, id: NodeId, name: Option<&str>) -> SceneResult<()> {
        self.node_mut(id)?.name = name.map(str::to_owned);
        Ok(())
    }

    /// Definitions.
    pub fn defs(&self) -> &Defs {
        &self.defs
    }

    /// Mutable definitions. Nodes morphed by a transition regenerate their base paths, since
    /// the transition they name may change.
    pub fn defs_mut(&mut self) -> &mut Defs {
        for node in self.nodes.iter_mut().flatten() {
            if node.style.transition.is_some() {
                node.dirty.insert(DirtyFlags::BASE_PATH);
            }
        }
        &mut self.defs
    }

    /// View that `id`'s relative coordinates resolve against: the content view of the nearest
    /// ancestor viewport, or the page.
    pub fn view_of(&self, id: NodeId) -> ViewSize {
        let mut cur = self.parent(id);
        while let Some(p) = cur {
            if let Some(Geometry::Viewport(vp)) = self.node(p).map(Node::geometry) {
                return vp.content_view(self.view_of(p));
            }
            cur = self.parent(p);
        }
        self.page
    }

    /// Object space of `id` to scene space: its own transforms followed by every ancestor's.
    pub fn accumulated(&mut self, id: NodeId) -> Affine {
        let Some(node) = self.node(id) else {
            return Affine::IDENTITY;
        };
        if !node.dirty.contains(DirtyFlags::TRANSFORM) {
            return node.accumulated;
        }
        let own = compose(&node.transforms);
        let parent = node.parent;
        let acc = match parent {
            Some(p) => self.content_transform(p) * own,
            None => own,
        };
        if let Some(Some(n)) = self.nodes.get_mut(id.index()) {
            n.accumulated = acc;
            n.dirty.remove(DirtyFlags::TRANSFORM);
        }
        acc
    }

    /// Space of `id`'s children to scene space. Differs from [`Scene::accumulated`] for
    /// viewports, whose view box mapping applies before their own transforms.
    pub fn content_transform(&mut self, id: NodeId) -> Affine {
        let acc = self.accumulated(id);
        match self.node(id).map(Node::geometry) {
            Some(Geometry::Viewport(vp)) => acc * vp.content_map(self.view_of(id)),
            _ => acc,
        }
    }

    /// Regenerate the base path if it is stale or the node's scale changed.
    pub(crate) fn ensure_base(&mut self, id: NodeId) {
        let scale = affine_scale(self.accumulated(id)).max(1e-6);
        let view = self.view_of(id);
        let Some(node) = self.node(id) else {
            return;
        };
        let rescaled = (node.base_scale - scale).abs() > 1e-9 * scale.max(1.0);
        if !node.dirty.contains(DirtyFlags::BASE_PATH) && !rescaled {
            return;
        }

        let mut generated = node.geometry.generate(&GenContext { view, scale });
        if let (Some(g), Some(name)) = (generated.as_mut(), node.style.transition.as_deref()) {
            match self.defs.transition(name) {
                Some(t) => {
                    g.path = t.morph_path(&g.path);
                    g.bounds = None;
                }
                None => {
                    tracing::warn!(node = %id, transition = name, "transition not found; path left unmorphed");
                }
            }
        }
        tracing::trace!(node = %id, kind = node.geometry.kind(), "base path regenerated");

        if let Some(Some(n)) = self.nodes.get_mut(id.index()) {
            n.base = generated;
            n.base_scale = scale;
            n.dirty.remove(DirtyFlags::BASE_PATH);
            n.dirty.insert(DirtyFlags::FINAL_PATH);
        }
    }

    /// Object-space path of `id`, `None` for nodes without geometry.
    pub fn base_path(&mut self, id: NodeId) -> Option<&BezPath> {
        self.ensure_base(id);
        self.node(id)?.base.as_ref().map(|g| &g.path)
    }

    /// Untransformed bounds of `id`'s base path.
    pub fn local_bounds(&mut self, id: NodeId) -> Option<Rect> {
        self.ensure_base(id);
        let g = self.node(id)?.base.as_ref()?;
        g.bounds.or_else(|| bounds(&g.path, Affine::IDENTITY))
    }

    /// Base path under the accumulated transform, cached until invalidated.
    pub fn final_path(&mut self, id: NodeId) -> Option<&BezPath> {
        self.ensure_base(id);
        let acc = self.accumulated(id);
        let node = self.nodes.get_mut(id.index())?.as_mut()?;
        if node.dirty.contains(DirtyFlags::FINAL_PATH) || node.final_path.is_none() {
            node.final_path = node.base.as_ref().map(|g| acc * g.path.clone());
            node.dirty.remove(DirtyFlags::FINAL_PATH);
        }
        node.final_path.as_ref()
    }

    /// Scene-space bounds of `id` and its descendants.
    pub fn bounds(&mut self, id: NodeId) -> Option<Rect> {
        let mut out = None;
        for d in self.descendants(id) {
            let own = self.final_path(d).and_then(|p| bounds(p, Affine::IDENTITY));
            out = union(out, own);
        }
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/tree.rs"]
mod tests;
