//! Filter effect contract.

use std::fmt::Debug;

use crate::foundation::error::SceneResult;
use crate::paint::bitmap::Bitmap;

/// Post-processing applied to a node's rendered subtree before it is composited.
///
/// The bitmap holds the isolated rendering of the filtered node at device resolution,
/// premultiplied, on a transparent background.
pub trait FilterEffect: Debug + Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Process `bitmap` in place.
    fn apply(&self, bitmap: &mut Bitmap) -> SceneResult<()>;
}
