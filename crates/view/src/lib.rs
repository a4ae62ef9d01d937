pub mod bootstrap;
pub mod camera;
pub mod controls;
pub mod fit;
pub mod resize;
pub mod store;
pub mod switch;

pub use bootstrap::*;
pub use camera::*;
pub use controls::*;
pub use fit::*;
pub use resize::*;
pub use store::*;
pub use switch::*;
