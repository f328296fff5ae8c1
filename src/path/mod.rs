pub(crate) mod bounds;
pub(crate) mod command;
pub(crate) mod parametric;
pub(crate) mod shapes;
