//! Unfolds a box and a capped cylinder and prints where every piece landed.
//!
//! ```text
//! cargo run --example unfold_box                 # coplanar clusters
//! cargo run --example unfold_box -- net          # hinge-connected nets
//! cargo run --example unfold_box -- net a3 landscape
//! ```
//!
//! Logging defaults to WARN, with INFO for papercut. Override with RUST_LOG.

use papercut::operations::creation::{MakeBox, MakeCylinder};
use papercut::operations::Unfold;
use papercut::{FaceStore, Point3, UnfoldConfig, Vector3};

fn main() -> papercut::Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
        .add_directive("papercut=info".parse().unwrap_or_default());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let net_mode = args.first().is_some_and(|a| a == "net");
    let format = args.get(1).map_or("a4", String::as_str);
    let orientation = args.get(2).map_or("portrait", String::as_str);

    let mut config = UnfoldConfig::default().with_page_names(format, orientation)?;
    config.net_mode = net_mode;

    let mut store = FaceStore::new();
    MakeBox::new(Point3::origin(), Point3::new(60.0, 40.0, 30.0)).execute(&mut store)?;
    MakeCylinder::new(
        Point3::new(150.0, 0.0, 0.0),
        15.0,
        Vector3::z(),
        50.0,
        48,
    )
    .execute(&mut store)?;

    let output = Unfold::new(config).execute(&store)?;

    let stats = &output.stats;
    println!(
        "{} faces ({} skipped), {} groups, {} pages, scale {:.3} (requested {:.3})",
        stats.total_faces,
        stats.skipped_faces,
        stats.groups,
        stats.pages,
        stats.effective_scale,
        stats.requested_scale,
    );
    for page in &output.pages {
        println!(
            "page {} ({} {:?}, {:.1} x {:.1} mm)",
            page.index, page.format, page.orientation, page.width, page.height
        );
        for piece in &page.groups {
            let points: usize = piece
                .faces
                .iter()
                .flat_map(|f| &f.loops)
                .map(Vec::len)
                .sum();
            println!(
                "  group {:>2}: {} faces at ({:.1}, {:.1}), {:.1} x {:.1} mm, {} points",
                piece.group,
                piece.faces.len(),
                piece.offset.x,
                piece.offset.y,
                piece.width,
                piece.height,
                points,
            );
        }
    }
    Ok(())
}
