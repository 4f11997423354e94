//! Reading-order reconstruction.

mod assign;
mod columns;
mod cross_page;
mod diagnostics;
mod engine;
mod hyphen;
mod inline;
mod intake;
mod lines;
mod normalize;
mod options;
mod paragraphs;
mod placement;
mod reference;
mod script;
mod sequence;
mod vocabulary;

pub use assign::{assign_columns, column_for};
pub use columns::{column_gap_threshold, detect_columns, ColumnLayout};
pub use cross_page::{continues_onto, merge_across_pages};
pub use diagnostics::Diagnostics;
pub use engine::{LayoutEngine, PageLayout, ProgressEvent};
pub use hyphen::{dehyphenate, is_hyphen_continuation, HyphenJoin};
pub use inline::merge_inline;
pub use intake::{intake_page, IntakePage, RunningArtifacts};
pub use lines::{assign_norm_baselines, group_lines, typical_line_height};
pub use normalize::TextNormalizer;
pub use options::{ErrorMode, LayoutOptions, PageSelection, TextNormalization, Thresholds};
pub use paragraphs::{group_paragraphs, paragraph_per_fragment};
pub use placement::{interleave, link_captions, place_items, split_blocks};
pub use reference::{is_reference_page, trailing_number_ratio};
pub use script::{detect_scripts, merge_scripts, ScriptMatch};
pub use sequence::{assign_reading_blocks, Regime};
pub use vocabulary::Vocabulary;
