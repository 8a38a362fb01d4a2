pub mod action;
pub mod dispatch;
pub mod render;

pub use action::*;
pub use dispatch::*;
pub use render::*;
