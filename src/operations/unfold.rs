//! The full unfolding pipeline: classify, connect, group, flatten,
//! simplify and lay out.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use slotmap::SecondaryMap;
use tracing::{info, instrument};

use crate::config::UnfoldConfig;
use crate::error::Result;
use crate::topology::{FaceId, FaceStatus, FaceStore};

use super::adjacency::BuildAdjacency;
use super::grouping::GroupFaces;
use super::layout::{LayoutPages, Page};
use super::projection::{FaceOutcome, FlatGroup, ProjectFace, ProjectedFace, UnfoldGroup};
use super::simplify::SimplifyGroup;

/// Summary figures reported with every unfolding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnfoldStats {
    pub total_faces: usize,
    pub unfoldable_faces: usize,
    pub skipped_faces: usize,
    pub groups: usize,
    pub pages: usize,
    pub requested_scale: f64,
    /// Scale used on the pages; lower than requested when pieces were
    /// shrunk to fit.
    pub effective_scale: f64,
}

/// Result of [`Unfold`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnfoldOutput {
    pub pages: Vec<Page>,
    pub stats: UnfoldStats,
    /// Classification of every input face, in store order.
    pub statuses: Vec<(FaceId, FaceStatus)>,
}

/// Turns the faces of a store into laid-out papercraft pages.
///
/// Degenerate and non-developable faces are skipped and reported in
/// [`UnfoldOutput::statuses`]; they never fail the request.
pub struct Unfold {
    config: UnfoldConfig,
}

impl Unfold {
    /// Creates a new `Unfold` operation.
    #[must_use]
    pub fn new(config: UnfoldConfig) -> Self {
        Self { config }
    }

    /// Executes the pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`](crate::error::ConfigError) for an invalid
    /// configuration, before any geometry is touched, and
    /// [`UnfoldError`](crate::error::UnfoldError) if a group breaks an
    /// internal invariant.
    #[instrument(skip_all, fields(faces = store.face_count(), net = self.config.net_mode))]
    pub fn execute(&self, store: &FaceStore) -> Result<UnfoldOutput> {
        let config = &self.config;
        config.validate()?;
        let tol = config.adjacency_tolerance;

        let ids = store.face_ids();
        let outcomes: Vec<FaceOutcome> = ids
            .par_iter()
            .map(|id| ProjectFace::new(*id).with_tolerance(tol).execute(store))
            .collect::<Result<_>>()?;

        let statuses: Vec<(FaceId, FaceStatus)> = ids
            .iter()
            .zip(&outcomes)
            .map(|(id, outcome)| (*id, outcome.status()))
            .collect();
        let unfoldable_faces = statuses.iter().filter(|(_, s)| s.is_unfoldable()).count();
        let mut projected: SecondaryMap<FaceId, ProjectedFace> = SecondaryMap::new();
        let mut unfoldable = Vec::with_capacity(unfoldable_faces);
        for outcome in outcomes {
            if let FaceOutcome::Unfoldable(face) = outcome {
                unfoldable.push(face.face);
                projected.insert(face.face, face);
            }
        }

        let mut stats = UnfoldStats {
            total_faces: ids.len(),
            unfoldable_faces,
            skipped_faces: ids.len() - unfoldable_faces,
            requested_scale: config.page.scale,
            effective_scale: config.page.scale,
            ..UnfoldStats::default()
        };

        let graph = BuildAdjacency::new(unfoldable, tol).execute(store)?;
        let groups = GroupFaces::new(
            config.max_group_size,
            config.enable_grouping,
            config.net_mode,
        )
        .with_coplanar_angle(config.coplanar_angle_deg)
        .execute(store, &graph)?;

        let flat: Vec<FlatGroup> = groups
            .par_iter()
            .enumerate()
            .map(|(i, group)| -> Result<FlatGroup> {
                let mut piece = UnfoldGroup::new(group, i)
                    .with_tolerance(tol)
                    .execute(&projected, &graph)?;
                SimplifyGroup::new(config.simplify_tolerance).execute(&mut piece)?;
                Ok(piece)
            })
            .collect::<Result<_>>()?;

        let layout = LayoutPages::new(&config.page).execute(&flat);
        stats.groups = flat.len();
        stats.pages = layout.pages.len();
        if !flat.is_empty() {
            stats.effective_scale = layout.effective_scale;
        }

        info!(
            faces = stats.total_faces,
            skipped = stats.skipped_faces,
            groups = stats.groups,
            pages = stats.pages,
            "unfold complete"
        );
        Ok(UnfoldOutput {
            pages: layout.pages,
            stats,
            statuses,
        })
    }
}
