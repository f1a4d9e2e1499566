//! Unfolding core for papercraft templates.
//!
//! Takes the faces and edges of a solid's boundary, finds which faces share
//! an edge, groups them, develops each group into the plane, simplifies the
//! outlines and packs the pieces onto printable pages.
//!
//! ```no_run
//! use papercut::operations::creation::MakeBox;
//! use papercut::operations::Unfold;
//! use papercut::{FaceStore, Point3, UnfoldConfig};
//!
//! # fn main() -> papercut::Result<()> {
//! let mut store = FaceStore::new();
//! MakeBox::new(Point3::origin(), Point3::new(40.0, 30.0, 20.0)).execute(&mut store)?;
//! let output = Unfold::new(UnfoldConfig::default()).execute(&store)?;
//! println!("{} pages", output.stats.pages);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod geometry;
pub mod math;
pub mod operations;
pub mod topology;

pub use config::{Orientation, PageFormat, PageSetup, UnfoldConfig};
pub use error::{PapercutError, Result};
pub use math::{Point2, Point3, Vector2, Vector3};
pub use topology::{FaceData, FaceId, FaceStatus, FaceStore, SkipReason, SurfaceKind};
