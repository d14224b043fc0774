//! # isometric-tools
//!
//! Maps flat 2D vector shapes onto the faces of an isometric projection.
//!
//! ## Features
//!
//! - **Plane transforms**: scale by cos 30°, skew by ±30° and rotate so a
//!   flat drawing lies on the left, right, top-left or top-right face
//! - **Shared origin**: every shape in a selection, however deeply grouped,
//!   is transformed about one origin so composites stay aligned
//! - **SVG front-end**: read a document, transform elements by id, write it back
//!
//! ## Example
//!
//! ```rust,ignore
//! use isometric_tools::{PlaneOptions, PlaneType, SvgDocument};
//!
//! let content = std::fs::read_to_string("box.svg").unwrap();
//! let mut doc = SvgDocument::parse(&content).unwrap();
//! doc.make_plane(&["front".to_string()], PlaneType::Left, &PlaneOptions::default());
//! std::fs::write("box-iso.svg", doc.to_svg()).unwrap();
//! ```

pub mod bounds;
pub mod error;
pub mod flatten;
pub mod plane;
pub mod svg;
pub mod transform;
pub mod types;

// Re-export commonly used items
pub use bounds::{Bounds, combined_bounds};
pub use error::{IsometricError, Result};
pub use flatten::{flatten, flatten_mut};
pub use plane::{
    PlaneOptions, apply_plane, apply_plane_by_name, apply_scale, apply_skew_y,
    duplicate_and_make_plane, make_plane_leaf, rotate_leaf,
};
pub use svg::{SvgDocument, parse_svg};
pub use transform::{
    Axis, COS_30, COS_30_INV, PlaneType, make_plane, scale_axis, scale_points, skew_x, skew_y,
};
pub use types::{
    Drawable, Geometry, Group, Label, Leaf, LeafMut, Line, Point, Shape, Size, XForm,
};
