pub mod adjacency;
pub mod creation;
pub mod grouping;
pub mod layout;
pub mod projection;
pub mod simplify;
pub mod unfold;

pub use adjacency::{are_adjacent, AdjacencyGraph, BuildAdjacency, Hinge};
pub use grouping::{FaceGroup, GroupFaces};
pub use layout::{Layout, LayoutPages, Page, PlacedFace, PlacedGroup};
pub use projection::{
    FaceFrame, FaceOutcome, FlatFace, FlatGroup, ProjectFace, ProjectedFace, UnfoldGroup,
};
pub use simplify::{simplify, SimplifyGroup, SimplifyLoop};
pub use unfold::{Unfold, UnfoldOutput, UnfoldStats};
