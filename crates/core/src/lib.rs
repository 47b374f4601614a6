#![forbid(unsafe_code)]

pub mod cloud;
pub mod color;
pub mod point;

pub use cloud::{Colors, Normals, PointCloud};
pub use color::Rgb;
pub use point::PointXYZ;
