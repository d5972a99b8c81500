// Application layer: the operations a host invokes against one tree.

pub mod imports;
pub mod inject;
pub mod remove;
pub mod scope;
