//! Shelf packing of unfolded pieces onto printable pages.

mod page;

pub use page::{Page, PlacedFace, PlacedGroup};

use rayon::prelude::*;
use tracing::{info, instrument, warn};

use crate::config::PageSetup;
use crate::math::polygon_2d::Bounds2;
use crate::math::{Point2, Vector2};

use super::projection::FlatGroup;

/// Slack allowed when checking whether a piece fits.
const FIT_EPSILON: f64 = 1e-9;

/// Pages produced by [`LayoutPages`].
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub pages: Vec<Page>,
    /// Scale actually applied, at most the requested one.
    pub effective_scale: f64,
}

/// Packs unfolded groups onto pages with a next-fit shelf strategy.
///
/// Pieces are scaled to millimetres, sorted by bounding-box area (largest
/// first, ties by group index) and placed left to right on the current
/// shelf. A piece that overruns the shelf opens a new shelf below it, and
/// one that overruns the page opens a new page.
pub struct LayoutPages<'a> {
    setup: &'a PageSetup,
}

struct Item {
    group: usize,
    bounds: Bounds2,
    width: f64,
    height: f64,
}

impl<'a> LayoutPages<'a> {
    /// Creates a new `LayoutPages` operation.
    #[must_use]
    pub fn new(setup: &'a PageSetup) -> Self {
        Self { setup }
    }

    /// Executes the layout. An empty group list yields no pages.
    #[instrument(skip_all, fields(groups = groups.len()))]
    pub fn execute(&self, groups: &[FlatGroup]) -> Layout {
        let bounds: Vec<Bounds2> = groups.par_iter().map(FlatGroup::bounds).collect();
        let scale = self.effective_scale(&bounds);

        let mut items: Vec<Item> = bounds
            .into_iter()
            .enumerate()
            .map(|(group, b)| Item {
                group,
                bounds: b,
                width: b.width() * scale,
                height: b.height() * scale,
            })
            .collect();
        items.sort_by(|a, b| {
            (b.width * b.height)
                .total_cmp(&(a.width * a.height))
                .then(a.group.cmp(&b.group))
        });

        let (page_w, page_h) = self.setup.page_size();
        let (avail_w, avail_h) = self.setup.printable_size();
        let margin = Vector2::new(self.setup.margin, self.setup.margin);
        let spacing = self.setup.spacing;

        let mut pages: Vec<Page> = Vec::new();
        let (mut x, mut y, mut shelf) = (0.0_f64, 0.0_f64, 0.0_f64);
        let mut page_full = false;

        for item in items {
            let oversize =
                item.width > avail_w + FIT_EPSILON || item.height > avail_h + FIT_EPSILON;
            if x > 0.0 && x + item.width > avail_w + FIT_EPSILON {
                y += shelf + spacing;
                x = 0.0;
                shelf = 0.0;
            }
            let starts_page = pages.is_empty()
                || page_full
                || (oversize && (x > 0.0 || y > 0.0))
                || y + item.height > avail_h + FIT_EPSILON;
            if starts_page {
                pages.push(Page {
                    index: pages.len(),
                    format: self.setup.format,
                    orientation: self.setup.orientation,
                    width: page_w,
                    height: page_h,
                    groups: Vec::new(),
                });
                (x, y, shelf) = (0.0, 0.0, 0.0);
                page_full = false;
            }
            if oversize {
                warn!(
                    group = item.group,
                    width = item.width,
                    height = item.height,
                    "piece larger than the printable area, placed alone"
                );
                page_full = true;
            }

            let page_index = pages.len() - 1;
            let placed = place_group(
                &groups[item.group],
                &item,
                scale,
                page_index,
                margin + Vector2::new(x, y),
            );
            pages[page_index].groups.push(placed);
            x += item.width + spacing;
            shelf = shelf.max(item.height);
        }

        info!(pages = pages.len(), scale, "layout complete");
        Layout {
            pages,
            effective_scale: scale,
        }
    }

    /// The requested scale, reduced when `fit_to_page` is set and a piece
    /// would not fit the printable area.
    fn effective_scale(&self, bounds: &[Bounds2]) -> f64 {
        let requested = self.setup.scale;
        if !self.setup.fit_to_page {
            return requested;
        }
        let (avail_w, avail_h) = self.setup.printable_size();
        let overflow = bounds
            .iter()
            .map(|b| (b.width() * requested / avail_w).max(b.height() * requested / avail_h))
            .fold(0.0_f64, f64::max);
        if overflow > 1.0 {
            let scale = requested / overflow;
            warn!(requested, scale, "scale reduced to fit the largest piece");
            scale
        } else {
            requested
        }
    }
}

fn place_group(
    group: &FlatGroup,
    item: &Item,
    scale: f64,
    page: usize,
    offset: Vector2,
) -> PlacedGroup {
    let origin = item.bounds.min;
    let faces = group
        .faces
        .iter()
        .map(|f| PlacedFace {
            face: f.face,
            loops: f
                .loops
                .iter()
                .map(|lp| {
                    lp.iter()
                        .map(|p| Point2::from((p - origin) * scale))
                        .collect()
                })
                .collect(),
        })
        .collect();
    PlacedGroup {
        group: item.group,
        page,
        offset,
        width: item.width,
        height: item.height,
        faces,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::{Orientation, PageFormat};
    use crate::geometry::Plane;
    use crate::math::{Isometry2, Point3, Vector3};
    use crate::operations::projection::{FaceFrame, FlatFace};
    use crate::topology::FaceId;

    fn rect(w: f64, h: f64) -> FlatGroup {
        let frame = FaceFrame::Plane(Plane::from_normal(Point3::origin(), Vector3::z()).unwrap());
        FlatGroup {
            faces: vec![FlatFace {
                face: FaceId::default(),
                frame,
                placement: Isometry2::identity(),
                loops: vec![vec![
                    Point2::new(-3.0, 7.0),
                    Point2::new(w - 3.0, 7.0),
                    Point2::new(w - 3.0, h + 7.0),
                    Point2::new(-3.0, h + 7.0),
                ]],
            }],
            root: FaceId::default(),
        }
    }

    fn setup() -> PageSetup {
        PageSetup::default()
    }

    fn assert_inside_and_disjoint(layout: &Layout, setup: &PageSetup) {
        let (w, h) = setup.page_size();
        for page in &layout.pages {
            for (i, a) in page.groups.iter().enumerate() {
                let b = a.bounds();
                assert!(b.min.x >= setup.margin - 1e-9 && b.min.y >= setup.margin - 1e-9);
                assert!(b.max.x <= w - setup.margin + 1e-9);
                assert!(b.max.y <= h - setup.margin + 1e-9);
                for other in &page.groups[i + 1..] {
                    assert!(!b.overlaps(&other.bounds()));
                }
            }
        }
    }

    #[test]
    fn empty_input_gives_no_pages() {
        let layout = LayoutPages::new(&setup()).execute(&[]);
        assert!(layout.pages.is_empty());
        assert!((layout.effective_scale - 1.0).abs() < 1e-12);
    }

    #[test]
    fn pieces_share_a_shelf_then_wrap() {
        let s = setup();
        let groups = vec![rect(120.0, 50.0), rect(120.0, 50.0)];
        let layout = LayoutPages::new(&s).execute(&groups);
        assert_eq!(layout.pages.len(), 1);
        let placed = &layout.pages[0].groups;
        assert_eq!(placed[0].offset, Vector2::new(10.0, 10.0));
        // 120 + 5 + 120 > 190: the second piece opens a shelf below.
        assert_eq!(placed[1].offset, Vector2::new(10.0, 65.0));

        let small = vec![rect(60.0, 40.0), rect(60.0, 40.0)];
        let layout = LayoutPages::new(&s).execute(&small);
        let placed = &layout.pages[0].groups;
        assert_eq!(placed[1].offset, Vector2::new(75.0, 10.0));
    }

    #[test]
    fn full_page_opens_a_new_one() {
        let s = setup();
        let groups = vec![rect(150.0, 150.0), rect(150.0, 150.0), rect(150.0, 150.0)];
        let layout = LayoutPages::new(&s).execute(&groups);
        assert_eq!(layout.pages.len(), 3);
        for (i, page) in layout.pages.iter().enumerate() {
            assert_eq!(page.index, i);
            assert_eq!(page.groups.len(), 1);
            assert_eq!(page.groups[0].page, i);
        }
        assert_inside_and_disjoint(&layout, &s);
    }

    #[test]
    fn larger_pieces_are_placed_first() {
        let groups = vec![rect(10.0, 10.0), rect(50.0, 50.0), rect(30.0, 30.0)];
        let layout = LayoutPages::new(&setup()).execute(&groups);
        let order: Vec<usize> = layout.pages[0].groups.iter().map(|g| g.group).collect();
        assert_eq!(order, vec![1, 2, 0]);
    }

    #[test]
    fn landscape_swaps_page_dimensions() {
        let s = PageSetup {
            orientation: Orientation::Landscape,
            ..setup()
        };
        let layout = LayoutPages::new(&s).execute(&[rect(250.0, 20.0)]);
        let page = &layout.pages[0];
        assert!((page.width - 297.0).abs() < 1e-12);
        assert!((page.height - 210.0).abs() < 1e-12);
        assert!((layout.effective_scale - 1.0).abs() < 1e-12);
    }

    #[test]
    fn scale_converts_model_units() {
        let s = PageSetup {
            scale: 2.0,
            format: PageFormat::A3,
            ..setup()
        };
        let layout = LayoutPages::new(&s).execute(&[rect(10.0, 5.0)]);
        let g = &layout.pages[0].groups[0];
        assert!((g.width - 20.0).abs() < 1e-12);
        assert!((g.height - 10.0).abs() < 1e-12);
        let outer = &g.faces[0].loops[0];
        assert_eq!(outer[0], Point2::new(0.0, 0.0));
        assert_eq!(outer[2], Point2::new(20.0, 10.0));
    }

    #[test]
    fn fit_to_page_shrinks_oversize_pieces() {
        let s = setup();
        let layout = LayoutPages::new(&s).execute(&[rect(1000.0, 10.0), rect(10.0, 10.0)]);
        assert!((layout.effective_scale - 0.19).abs() < 1e-12);
        assert_eq!(layout.pages.len(), 1);
        assert_inside_and_disjoint(&layout, &s);
    }

    #[test]
    fn oversize_piece_without_fit_gets_its_own_page() {
        let s = PageSetup {
            fit_to_page: false,
            ..setup()
        };
        let groups = vec![rect(10.0, 10.0), rect(1000.0, 10.0), rect(10.0, 10.0)];
        let layout = LayoutPages::new(&s).execute(&groups);
        assert_eq!(layout.pages.len(), 2);
        assert_eq!(layout.pages[0].groups.len(), 1);
        assert_eq!(layout.pages[0].groups[0].group, 1);
        assert_eq!(layout.pages[1].groups.len(), 2);
    }

    #[test]
    fn layout_is_deterministic() {
        let groups: Vec<FlatGroup> = (1..30)
            .map(|i| rect(f64::from(i * 7 % 90 + 5), f64::from(i * 13 % 70 + 5)))
            .collect();
        let s = setup();
        let a = LayoutPages::new(&s).execute(&groups);
        let b = LayoutPages::new(&s).execute(&groups);
        assert_eq!(a, b);
        assert_inside_and_disjoint(&a, &s);
    }
}
