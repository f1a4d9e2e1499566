use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Fixed paper sizes the layout engine can fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PageFormat {
    /// ISO A4, 210 x 297 mm.
    #[default]
    A4,
    /// ISO A3, 297 x 420 mm.
    A3,
    /// US Letter, 8.5 x 11 in.
    Letter,
}

impl PageFormat {
    /// Portrait `(width, height)` in millimetres.
    #[must_use]
    pub fn size_mm(self) -> (f64, f64) {
        match self {
            Self::A4 => (210.0, 297.0),
            Self::A3 => (297.0, 420.0),
            Self::Letter => (215.9, 279.4),
        }
    }
}

impl FromStr for PageFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a4" => Ok(Self::A4),
            "a3" => Ok(Self::A3),
            "letter" => Ok(Self::Letter),
            _ => Err(ConfigError::UnknownPageFormat(s.to_string())),
        }
    }
}

impl fmt::Display for PageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::A4 => "A4",
            Self::A3 => "A3",
            Self::Letter => "Letter",
        };
        f.write_str(name)
    }
}

/// Page orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

impl FromStr for Orientation {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "portrait" => Ok(Self::Portrait),
            "landscape" => Ok(Self::Landscape),
            _ => Err(ConfigError::UnknownOrientation(s.to_string())),
        }
    }
}

/// Physical page settings for the layout stage. Lengths are millimetres.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageSetup {
    pub format: PageFormat,
    pub orientation: Orientation,
    /// Model units to millimetres.
    pub scale: f64,
    /// Blank border kept on every side of the page.
    pub margin: f64,
    /// Gap between neighbouring pieces.
    pub spacing: f64,
    /// Shrink the scale so the largest piece fits on one page.
    pub fit_to_page: bool,
}

impl Default for PageSetup {
    fn default() -> Self {
        Self {
            format: PageFormat::A4,
            orientation: Orientation::Portrait,
            scale: 1.0,
            margin: 10.0,
            spacing: 5.0,
            fit_to_page: true,
        }
    }
}

impl PageSetup {
    /// Page `(width, height)` after applying the orientation.
    #[must_use]
    pub fn page_size(&self) -> (f64, f64) {
        let (w, h) = self.format.size_mm();
        match self.orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        }
    }

    /// `(width, height)` available inside the margins.
    #[must_use]
    pub fn printable_size(&self) -> (f64, f64) {
        let (w, h) = self.page_size();
        (w - 2.0 * self.margin, h - 2.0 * self.margin)
    }
}

/// Parameters of one unfold request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnfoldConfig {
    /// Upper bound on faces per group.
    pub max_group_size: usize,
    /// When `false` every face becomes its own group.
    pub enable_grouping: bool,
    /// Build hinge-connected nets instead of coplanar clusters.
    pub net_mode: bool,
    /// Boundary simplification tolerance in model units.
    pub simplify_tolerance: f64,
    /// Distance under which two boundary vertices are the same point.
    pub adjacency_tolerance: f64,
    /// Largest angle between normals for a coplanar merge, in degrees.
    pub coplanar_angle_deg: f64,
    pub page: PageSetup,
}

impl Default for UnfoldConfig {
    fn default() -> Self {
        Self {
            max_group_size: 20,
            enable_grouping: true,
            net_mode: false,
            simplify_tolerance: 0.1,
            adjacency_tolerance: 1e-6,
            coplanar_angle_deg: 18.0,
            page: PageSetup::default(),
        }
    }
}

impl UnfoldConfig {
    /// Sets the page format and orientation from their names.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown format or orientation name.
    pub fn with_page_names(mut self, format: &str, orientation: &str) -> Result<Self, ConfigError> {
        self.page.format = format.parse()?;
        self.page.orientation = orientation.parse()?;
        Ok(self)
    }

    /// Checks every numeric setting.
    ///
    /// # Errors
    ///
    /// Returns the first invalid setting found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_group_size == 0 {
            return Err(ConfigError::ZeroGroupSize);
        }
        positive("scale", self.page.scale)?;
        positive("adjacency tolerance", self.adjacency_tolerance)?;
        non_negative("simplify tolerance", self.simplify_tolerance)?;
        non_negative("coplanar angle", self.coplanar_angle_deg)?;
        non_negative("margin", self.page.margin)?;
        non_negative("spacing", self.page.spacing)?;

        let (width, height) = self.page.page_size();
        let (pw, ph) = self.page.printable_size();
        if pw <= 0.0 || ph <= 0.0 {
            return Err(ConfigError::NoPrintableArea {
                margin: self.page.margin,
                width,
                height,
            });
        }
        Ok(())
    }
}

fn positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { name, value })
    }
}

fn non_negative(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { name, value })
    }
}
