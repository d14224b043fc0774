//! SVG host: reads a document into drawables, runs the plane engine over a
//! selection of it and writes it back out.
//!
//! Selections are made by the id of top-level elements. An empty id list
//! selects the whole document.

pub mod parser;
pub mod path;
pub mod writer;

use log::{debug, warn};

pub use parser::{parse_svg, parse_transform};
pub use path::{generate_path_data, parse_path_data};
pub use writer::document_to_svg;

use crate::error::Result;
use crate::flatten::flatten;
use crate::plane::{PlaneOptions, apply_plane, apply_scale, apply_skew_y, duplicate_and_make_plane};
use crate::transform::{Axis, PlaneType};
use crate::types::Drawable;

/// Parsed SVG document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SvgDocument {
    /// Root `<svg>` attributes, minus the size and viewBox which are recomputed on output
    pub attributes: Vec<(String, String)>,
    pub drawables: Vec<Drawable>,
}

impl SvgDocument {
    pub fn parse(xml: &str) -> Result<Self> {
        parse_svg(xml)
    }

    pub fn to_svg(&self) -> String {
        document_to_svg(self)
    }

    fn warn_unmatched(&self, ids: &[String]) {
        for id in ids {
            if !self.drawables.iter().any(|d| d.id() == Some(id.as_str())) {
                warn!("no top-level element with id '{id}'");
            }
        }
    }

    fn selected(ids: &[String], drawable: &Drawable) -> bool {
        ids.is_empty() || drawable.id().is_some_and(|id| ids.iter().any(|s| s == id))
    }

    /// Top-level drawables matching `ids`, in document order
    pub fn selection(&self, ids: &[String]) -> Vec<&Drawable> {
        self.warn_unmatched(ids);
        self.drawables
            .iter()
            .filter(|d| Self::selected(ids, d))
            .collect()
    }

    pub fn selection_mut(&mut self, ids: &[String]) -> Vec<&mut Drawable> {
        self.warn_unmatched(ids);
        self.drawables
            .iter_mut()
            .filter(|d| Self::selected(ids, d))
            .collect()
    }

    /// Map the selection onto `plane`. Returns the number of leaves transformed.
    ///
    /// With `options.duplicate` the originals stay as they are and transformed
    /// copies, ids suffixed with `-copy`, are appended to the document.
    pub fn make_plane(&mut self, ids: &[String], plane: PlaneType, options: &PlaneOptions) -> usize {
        if !options.duplicate {
            return apply_plane(self.selection_mut(ids), plane, options.zero_offset);
        }

        let mut copies = duplicate_and_make_plane(self.selection(ids), plane, options.zero_offset);
        let count = flatten(&copies).len();
        for copy in &mut copies {
            copy.suffix_ids("-copy");
        }
        debug!("appending {} duplicated drawables", copies.len());
        self.drawables.extend(copies);
        count
    }

    pub fn skew_y(&mut self, ids: &[String], angle_deg: f64, zero_offset: Option<f64>) -> usize {
        apply_skew_y(self.selection_mut(ids), angle_deg, zero_offset)
    }

    pub fn scale(&mut self, ids: &[String], axis: Axis, factor: f64) -> usize {
        apply_scale(self.selection_mut(ids), axis, factor)
    }
}
