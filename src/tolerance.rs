/// Distances used when merging and snapping geometry.
///
/// All three are radii; comparisons square them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tolerances {
    /// Two points closer than this are the same vertex.
    pub coincidence: f64,
    /// A raw endpoint closer than this to an existing vertex is moved onto
    /// it.
    pub vertex_snap: f64,
    /// A raw endpoint closer than this to an existing segment (and not
    /// snapped to a vertex) is moved onto its perpendicular foot.
    pub edge_snap: f64,
}

impl Tolerances {
    pub const DEFAULT_COINCIDENCE: f64 = 0.005;

    /// Snapping radii suited to a pixel canvas driven by a mouse.
    pub fn canvas() -> Self {
        Self {
            vertex_snap: 12.0,
            edge_snap: 12.0,
            ..Self::default()
        }
    }

    pub fn with_snap(self, radius: f64) -> Self {
        Self {
            vertex_snap: radius,
            edge_snap: radius,
            ..self
        }
    }
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            coincidence: Self::DEFAULT_COINCIDENCE,
            vertex_snap: 0.5,
            edge_snap: 0.5,
        }
    }
}
