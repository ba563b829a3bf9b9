//! Layout geometry and iteration limits.

/// Tuning knobs for the layout engine. All lengths are in world units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    /// Nominal node width; one depth column spans this plus `horizontal_gap`.
    pub node_width: f64,
    /// Minimum node height; text may grow a node past it.
    pub node_height: f64,
    /// Horizontal gap between depth columns.
    pub horizontal_gap: f64,
    /// Vertical gap left below a node when stacking or bumping.
    pub vertical_gap: f64,
    /// Margin within which two boxes count as colliding.
    pub min_vertical_gap: f64,
    /// Cap on the downward scan for a free vertical slot.
    pub placement_max_iterations: usize,
    /// Cap on full overlap-resolution sweeps.
    pub resolve_max_iterations: usize,
}

impl LayoutConfig {
    /// Center-to-center span of one depth column. Also the x tolerance
    /// within which two nodes count as sharing a column.
    #[must_use]
    pub fn column_width(&self) -> f64 {
        self.node_width + self.horizontal_gap
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 250.0,
            node_height: 40.0,
            horizontal_gap: 30.0,
            vertical_gap: 4.0,
            min_vertical_gap: 4.0,
            placement_max_iterations: 100,
            resolve_max_iterations: 50,
        }
    }
}
