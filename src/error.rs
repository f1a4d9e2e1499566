use thiserror::Error;

/// Top-level error type for the papercut unfolding core.
#[derive(Debug, Error)]
pub enum PapercutError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Unfold(#[from] UnfoldError),
}

/// Rejected request configuration. Raised before any geometry work.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("unknown page format: {0}")]
    UnknownPageFormat(String),

    #[error("unknown page orientation: {0}")]
    UnknownOrientation(String),

    #[error("{name} must be a finite value greater than zero, got {value}")]
    NotPositive { name: &'static str, value: f64 },

    #[error("{name} must be a finite, non-negative value, got {value}")]
    Negative { name: &'static str, value: f64 },

    #[error("max group size must be at least 1")]
    ZeroGroupSize,

    #[error("page margin {margin} leaves no printable area on a {width} x {height} page")]
    NoPrintableArea { margin: f64, width: f64, height: f64 },
}

/// Errors related to geometric computations.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("zero-length vector")]
    ZeroVector,
}

/// Errors related to the face store.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("entity not found: {0}")]
    EntityNotFound(String),
}

/// Internal invariant violations inside the unfolding pipeline.
#[derive(Debug, Error)]
pub enum UnfoldError {
    #[error("loop of face {face} has {points} points after simplification")]
    CollapsedLoop { face: String, points: usize },

    #[error("group {group} has no projected faces")]
    EmptyGroup { group: usize },

    #[error("face {face} of group {group} was never projected")]
    MissingProjection { group: usize, face: String },
}

/// Convenience type alias for results using [`PapercutError`].
pub type Result<T> = std::result::Result<T, PapercutError>;
