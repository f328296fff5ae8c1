pub(crate) mod bitmap;
pub(crate) mod color;
pub(crate) mod contour;
pub(crate) mod gradient;
pub(crate) mod image_fill;
pub(crate) mod pattern;
pub(crate) mod sample;
pub(crate) mod span;
pub(crate) mod texture_stroke;
