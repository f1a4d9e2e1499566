pub mod surface;

pub use surface::{Cone, Cylinder, Development, Plane};
