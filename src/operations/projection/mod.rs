//! Development of faces into the plane.
//!
//! [`ProjectFace`] maps a single face into its own 2D frame (plane basis,
//! cylinder unrolling or cone sector). [`UnfoldGroup`] then joins the faces
//! of a group edge to edge into one flat piece.

mod frame;
mod project_face;
mod unfold_group;

pub use frame::FaceFrame;
pub use project_face::{FaceOutcome, ProjectFace, ProjectedFace};
pub use unfold_group::{FlatFace, FlatGroup, UnfoldGroup};
