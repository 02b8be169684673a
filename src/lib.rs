//! Interactive construction of straight-line figures and enumeration of
//! every triangle they contain.
//!
//! A [`Figure`] is edited by inserting segments, which are snapped, split at
//! crossings and merged with collinear neighbours as they go in. Locking the
//! figure through a [`Workspace`] starts a background solver that grows the
//! segments into maximal lines and reports each triangle it finds.

pub mod debug;
pub mod extend;
pub mod figure;
pub mod geometry;
pub mod insert;
pub mod persist;
pub mod point;
pub mod segment;
pub mod solver;
pub mod tolerance;
pub mod triangles;
pub mod vertex;
pub mod workspace;

pub use figure::{Anchor, Figure, FigureErr};
pub use insert::{insert_segment, Insertion};
pub use point::Point;
pub use solver::SolverEvent;
pub use tolerance::Tolerances;
pub use triangles::{Triangle, TriangleSet};
pub use workspace::Workspace;
