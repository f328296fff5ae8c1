pub(crate) mod clip;
pub(crate) mod composite;
pub(crate) mod draw;
pub(crate) mod raster;
pub(crate) mod stroke;
pub(crate) mod surface;
pub(crate) mod surface_pool;
