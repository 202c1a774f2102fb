//! Main content extraction module.
//!
//! # Module Structure
//!
//! - `tags`: Tag constants, catalogs, and helper functions
//! - `state`: Per-run extraction state (output tree, accepted tags, dedup cache)
//! - `handlers`: Element handlers rebuilding output elements from cleaned input
//! - `pipeline`: Content-area search, handler dispatch and wild-text recovery
//! - `comments`: Comment section extraction
//! - `fallback`: Baseline and smart-baseline extraction on the pristine tree

pub mod comments;
pub mod fallback;
pub mod handlers;
pub mod pipeline;
pub mod state;
pub mod tags;

pub use comments::{extract_comments, remove_comment_sections};
pub use fallback::{baseline, smart_baseline};
pub use pipeline::{extract_content, recover_wild_text};
pub use state::ExtractionState;
