// Infrastructure: reference host adapters for the engine.

pub mod fixture;
pub mod workspace;
