//! External artifacts consumed by the server

pub mod artifacts;

pub use artifacts::ArtifactLoader;
