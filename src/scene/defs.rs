//! Named, shareable definitions referenced from node styles.

use std::collections::HashMap;
use std::sync::Arc;

use crate::effects::filter::FilterEffect;
use crate::foundation::error::{SceneError, SceneResult};
use crate::paint::gradient::{Gradient, Units};
use crate::paint::image_fill::ImageFill;
use crate::paint::pattern::Pattern;
use crate::scene::node::NodeId;
use crate::transform::transition::Transition;

/// A clip path: the union of the filled paths of a detached subtree.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClipDef {
    /// User space follows the consumer's transform; bounding-box units additionally map the
    /// unit square onto the consumer's bounds.
    pub units: Units,
    /// Detached root of the clip content.
    pub content: NodeId,
}

impl ClipDef {
    /// User-space clip over `content`.
    pub fn new(content: NodeId) -> Self {
        Self {
            units: Units::UserSpace,
            content,
        }
    }
}

/// One registered definition.
#[derive(Clone, Debug)]
pub enum Definition {
    /// Gradient paint.
    Gradient(Gradient),
    /// Bitmap paint.
    Image(ImageFill),
    /// Tiled sub-scene paint.
    Pattern(Pattern),
    /// Clip path.
    Clip(ClipDef),
    /// Transform morph applied to base paths.
    Transition(Transition),
    /// Post-processing of a rendered subtree.
    Filter(Arc<dyn FilterEffect>),
}

impl Definition {
    /// Kind name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Definition::Gradient(_) => "gradient",
            Definition::Image(_) => "image",
            Definition::Pattern(_) => "pattern",
            Definition::Clip(_) => "clip",
            Definition::Transition(_) => "transition",
            Definition::Filter(_) => "filter",
        }
    }
}

/// Definition table keyed by name.
#[derive(Clone, Debug, Default)]
pub struct Defs {
    items: HashMap<String, Definition>,
}

impl Defs {
    fn insert(&mut self, name: &str, def: Definition) -> SceneResult<()> {
        if name.is_empty() {
            return Err(SceneError::validation("definition name must not be empty"));
        }
        tracing::debug!(name, kind = def.kind(), "registering definition");
        self.items.insert(name.to_owned(), def);
        Ok(())
    }

    /// Register a gradient; its stops are validated first.
    pub fn add_gradient(&mut self, name: &str, gradient: Gradient) -> SceneResult<()> {
        gradient.validate()?;
        self.insert(name, Definition::Gradient(gradient))
    }

    /// Register an image paint.
    pub fn add_image(&mut self, name: &str, image: ImageFill) -> SceneResult<()> {
        self.insert(name, Definition::Image(image))
    }

    /// Register a pattern; it must have content.
    pub fn add_pattern(&mut self, name: &str, pattern: Pattern) -> SceneResult<()> {
        if pattern.content.is_none() {
            return Err(SceneError::validation(format!("pattern '{name}' has no content")));
        }
        self.insert(name, Definition::Pattern(pattern))
    }

    /// Register a clip path.
    pub fn add_clip(&mut self, name: &str, clip: ClipDef) -> SceneResult<()> {
        self.insert(name, Definition::Clip(clip))
    }

    /// Register a transition.
    pub fn add_transition(&mut self, name: &str, transition: Transition) -> SceneResult<()> {
        self.insert(name, Definition::Transition(transition))
    }

    /// Register a filter effect.
    pub fn add_filter(&mut self, name: &str, filter: Arc<dyn FilterEffect>) -> SceneResult<()> {
        self.insert(name, Definition::Filter(filter))
    }

    /// Remove a definition, returning it.
    pub fn remove(&mut self, name: &str) -> Option<Definition> {
        self.items.remove(name)
    }

    /// Look up any definition.
    pub fn get(&self, name: &str) -> Option<&Definition> {
        self.items.get(name)
    }

    /// Look up a clip.
    pub fn clip(&self, name: &str) -> Option<ClipDef> {
        match self.items.get(name) {
            Some(Definition::Clip(c)) => Some(*c),
            _ => None,
        }
    }

    /// Look up a transition.
    pub fn transition(&self, name: &str) -> Option<&Transition> {
        match self.items.get(name) {
            Some(Definition::Transition(t)) => Some(t),
            _ => None,
        }
    }

    /// Look up a filter.
    pub fn filter(&self, name: &str) -> Option<Arc<dyn FilterEffect>> {
        match self.items.get(name) {
            Some(Definition::Filter(f)) => Some(Arc::clone(f)),
            _ => None,
        }
    }

    /// Number of definitions.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
