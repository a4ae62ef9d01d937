pub mod config;
pub mod error;
pub mod gltf_loader;

pub use config::*;
pub use error::*;
pub use gltf_loader::*;
