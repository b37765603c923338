//! Core types for abDraw: shapes, the document, connection points and the
//! persisted schema.

pub mod document;
pub mod error;
pub mod handles;
pub mod schema;
pub mod shapes;
pub mod snap;

pub use document::{
    DEFAULT_GRID_SPACING, Document, GridKind, GridSettings, MAX_GRID_SPACING, MIN_GRID_SPACING,
    ShapeId,
};
pub use error::{DocumentError, EmptyShapeId, LoadError};
pub use handles::{Corner, Handle, HandleKind, MIN_CIRCLE_RADIUS};
pub use schema::{DocumentRecord, FORMAT_VERSION, from_json, to_json};
pub use shapes::{
    Color, Connection, Endpoint, Font, Label, Shape, ShapeKind, ShapeType, Style, is_square,
};
pub use snap::{SnapIndex, SnapPoint, default_snap_radius};
