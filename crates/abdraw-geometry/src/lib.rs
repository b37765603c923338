//! Geometry kernel for abDraw.
//!
//! Pure, stateless math shared by the shape model and the editing session:
//! points and boxes, distance and hit tests, segment intersection,
//! orthogonal path expansion and grid quantization.

mod bounds;
mod grid;
mod measure;
mod ortho;
mod point;

pub use bounds::Bounds;
pub use grid::snap_to_grid;
pub use measure::{
    distance_point_to_segment, distance_to_polyline, nearest_point_on_ellipse,
    nearest_point_on_polyline, nearest_point_on_segment, point_in_ellipse, point_in_polygon,
    segment_intersection, segment_intersects_bounds,
};
pub use ortho::{ALIGN_EPSILON, Routing, orthogonal_path, segment_count};
pub use point::Point;
