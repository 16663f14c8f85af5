//! Re-brand Canvas LMS course content by remapping institutional colors.
//!
//! [`registry::PaletteRegistry`] holds the known palettes, and
//! [`rewrite::Rewriter`] classifies and swaps every `#rrggbb` token in a body
//! of HTML. [`pipeline::course`] drives both over a whole course.

pub mod auth;
pub mod cli;
pub mod color;
pub mod config;
pub mod content;
pub mod pipeline;
pub mod preview;
pub mod registry;
pub mod rewrite;
