pub(crate) mod defs;
pub(crate) mod doc;
pub(crate) mod node;
pub(crate) mod tree;
