//! Fixed colour palette indexed by binning-function output.

use serde::Serialize;

use crate::types::ColorHex;

/// Palette colours ordered from lightest (bin 0) to darkest (last bin).
pub const MAP_COLORS: [ColorHex; 11] = [
    "#D7EAF9", "#C3DDF1", "#B0D0E9", "#9DC3E1", "#8AB6D9", "#77A9D1", "#639CC9", "#508FC1",
    "#3D82B9", "#2A75B1", "#1769AA",
];

/// Ordered palette that a `BinningFunction` output indexes into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Palette {
    colors: &'static [ColorHex],
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colors: &MAP_COLORS,
        }
    }
}

impl Palette {
    /// Number of colours (and bins) in the palette.
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Returns `true` when the palette holds no colours.
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Colour for bin `index`; indices past the end clamp to the darkest colour.
    pub fn color(&self, index: usize) -> ColorHex {
        let last = self.colors.len().saturating_sub(1);
        self.colors[index.min(last)]
    }

    /// All colours, lightest first.
    pub fn colors(&self) -> &'static [ColorHex] {
        self.colors
    }

    /// `(lightest, darkest)` pair for drawing a legend gradient.
    pub fn gradient(&self) -> (ColorHex, ColorHex) {
        (self.color(0), self.color(self.colors.len()))
    }
}
