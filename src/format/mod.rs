//! Format Module
//!
//! Decides how much of each API result to show inline and renders results,
//! previews, cache handles, and failures as descriptive text.

mod formatter;
mod guidance;
mod preview;

pub use formatter::ResponseFormatter;
pub use guidance::next_steps;
pub use preview::{truncate_preview, DEFAULT_PREVIEW_LIMIT};
