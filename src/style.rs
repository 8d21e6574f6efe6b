//! Fixed chart palettes.
//!
//! Every renderer colors series by position from the same two palettes, so
//! "Серия 3" is the same yellow in the line chart, the bar chart, and the
//! saved payload. Line and bar series use the opaque palette; pie and
//! doughnut slices use the translucent one with opaque borders.

use plotters::style::RGBAColor;

/// RGBA color with the fractional alpha CSS uses.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// CSS `rgba()` notation, e.g. `rgba(255, 99, 132, 0.7)`.
    pub fn css(&self) -> String {
        format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }

    /// The same color at full opacity (slice borders).
    pub fn opaque(self) -> Self {
        Self { a: 1.0, ..self }
    }

    pub fn to_plotters(self) -> RGBAColor {
        RGBAColor(self.r, self.g, self.b, self.a)
    }
}

/// Palette for line and bar series, cycled by series position.
pub const SERIES_PALETTE: [Rgba; 6] = [
    Rgba::new(255, 99, 132, 1.0),
    Rgba::new(54, 162, 235, 1.0),
    Rgba::new(255, 206, 86, 1.0),
    Rgba::new(75, 192, 192, 1.0),
    Rgba::new(153, 102, 255, 1.0),
    Rgba::new(255, 159, 64, 1.0),
];

/// Palette for pie and doughnut slices, cycled by slice position.
pub const SLICE_PALETTE: [Rgba; 7] = [
    Rgba::new(255, 99, 132, 0.7),
    Rgba::new(54, 162, 235, 0.7),
    Rgba::new(255, 206, 86, 0.7),
    Rgba::new(75, 192, 192, 0.7),
    Rgba::new(153, 102, 255, 0.7),
    Rgba::new(255, 159, 64, 0.7),
    Rgba::new(199, 199, 199, 0.7),
];

/// Color for the `idx`-th line or bar series.
#[inline]
pub fn series_color(idx: usize) -> Rgba {
    SERIES_PALETTE[idx % SERIES_PALETTE.len()]
}

/// Color for the `idx`-th pie or doughnut slice.
#[inline]
pub fn slice_color(idx: usize) -> Rgba {
    SLICE_PALETTE[idx % SLICE_PALETTE.len()]
}
