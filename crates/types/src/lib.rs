pub mod color;
pub mod geometry;
pub mod ids;

pub use color::Color;
pub use geometry::{Matrix, Millipoints, Rect, Sides};
pub use ids::{AnchorId, ResourceName};
