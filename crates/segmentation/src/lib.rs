#![forbid(unsafe_code)]

pub mod classify;
pub mod cylinder;
pub mod model;
pub mod plane;
pub mod ransac;
pub mod sphere;

pub use classify::{classify, Classification};
pub use cylinder::{ransac_cylinder, ransac_cylinder_seeded, CylinderModel};
pub use model::{PointData, ShapeModel};
pub use plane::{ransac_plane, ransac_plane_seeded, PlaneModel};
pub use ransac::{ransac_fit, ransac_fit_seeded, FitError, RansacFit};
pub use sphere::{ransac_sphere, ransac_sphere_seeded, SphereModel};
