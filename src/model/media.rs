//! Media items and reading positions.

use serde::{Deserialize, Serialize};

use super::BBox;

/// Kind of a media item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Raster image
    #[default]
    Image,
    /// Figure region (image plus drawn annotations)
    Figure,
    /// Vector drawing
    Vector,
}

/// Where a media or table item sits in the reading order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReadingPosition {
    /// Reading block the item belongs to
    pub block: u32,

    /// Intra-block sort key (an anchor baseline plus a small epsilon)
    pub key: f32,

    /// Column id inherited from the anchor fragment
    pub column: u32,

    /// Intake index of the anchor fragment, when there is one
    pub anchor: Option<usize>,

    /// True when the anchor is a matching caption
    pub caption_anchored: bool,
}

impl ReadingPosition {
    /// Position at the top of a page, used when nothing precedes the item.
    pub fn page_start(epsilon: f32) -> Self {
        Self {
            block: 1,
            key: epsilon,
            column: 0,
            anchor: None,
            caption_anchored: false,
        }
    }
}

/// A positioned image, figure or drawing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaItem {
    /// Media identifier (resource name from the extractor)
    pub id: String,

    /// Media kind
    pub kind: MediaKind,

    /// Bounding box in page space
    pub bbox: BBox,

    /// Reading position once placed
    pub position: Option<ReadingPosition>,

    /// Element index of the linked caption paragraph
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<usize>,
}

impl MediaItem {
    /// Create a media item.
    pub fn new(id: impl Into<String>, kind: MediaKind, bbox: BBox) -> Self {
        Self {
            id: id.into(),
            kind,
            bbox,
            position: None,
            caption: None,
        }
    }
}
