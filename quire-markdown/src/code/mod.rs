//! Code block features, line decoration and rendering.

pub mod features;
pub mod icons;
pub mod lines;
pub mod render;

pub use features::{
  CodeBlockFeatures,
  DiffKind,
  InfoString,
  LineNumbers,
  extract_code_blocks,
  parse_highlight_spec,
  parse_info,
};
pub use icons::{
  IconResolution,
  IconSource,
  detect_icon,
  icon_for_language,
  icon_html,
  parse_manual_icon,
};
pub use lines::{LineDecorations, parse_lines, wrap_lines};
pub use render::render_code_block;
