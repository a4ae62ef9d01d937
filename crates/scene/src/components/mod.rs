pub mod kind;
pub mod light;
pub mod mesh;
pub mod transform;

pub use kind::*;
pub use light::*;
pub use mesh::*;
pub use transform::*;
