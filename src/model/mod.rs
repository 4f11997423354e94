//! Document model types for reading-order reconstruction.
//!
//! The model covers both ends of the pipeline: the raw per-page geometry
//! handed over by a layout extractor ([`DocumentInput`]) and the ordered
//! page tree the layout engine produces ([`Document`]).

mod document;
mod fragment;
mod geometry;
mod media;
mod page;
mod paragraph;
mod table;

pub use document::{
    font_weight_hints, CellInput, Document, DocumentInput, FragmentInput, MediaInput, PageInput,
    RunInput, TableInput,
};
pub use fragment::{Fragment, ScriptKind, TextRun, TextStyle};
pub use geometry::BBox;
pub use media::{MediaItem, MediaKind, ReadingPosition};
pub use page::{Block, Page};
pub use paragraph::Paragraph;
pub use table::{Table, TableCell, TableItem, TableRow};
