pub mod components;
pub mod edges;
pub mod node;
pub mod rooms;
pub mod world;

pub use node::NodeId;
pub use rooms::*;
pub use world::*;
