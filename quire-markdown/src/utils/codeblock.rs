//! Code fence detection for raw Markdown.
//!
//! Every preprocessor that recognizes custom syntax uses this module to leave
//! example syntax shown inside fenced code blocks untouched. Only one fence is
//! tracked at a time: a fence inside another fence's body is plain text.

/// State tracking for code fence detection in markdown.
///
/// This tracks whether we're currently inside a fenced code block and
/// maintains the fence character and count for proper closing detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FenceTracker {
  in_code_block:    bool,
  code_fence_char:  Option<char>,
  code_fence_count: usize,
}

impl FenceTracker {
  /// Create a new fence tracker.
  #[must_use]
  pub const fn new() -> Self {
    Self {
      in_code_block:    false,
      code_fence_char:  None,
      code_fence_count: 0,
    }
  }

  /// Check if currently inside a code block.
  #[must_use]
  pub const fn in_code_block(&self) -> bool {
    self.in_code_block
  }

  /// Process a line and update fence state.
  ///
  /// Returns the updated state after processing the line. Call this for each
  /// line to maintain accurate fence tracking. The fence line itself counts as
  /// part of the block: after an opening line `in_code_block()` is `true`, and
  /// after the closing line it is `false` again.
  #[must_use]
  pub fn process_line(&self, line: &str) -> Self {
    let trimmed = line.trim_start();

    let Some((fence_char, fence_count)) = fence_marker(trimmed) else {
      return *self;
    };

    if !self.in_code_block {
      return Self {
        in_code_block:    true,
        code_fence_char:  Some(fence_char),
        code_fence_count: fence_count,
      };
    }

    // A closing fence carries nothing but fence characters.
    let rest = &trimmed[fence_count * fence_char.len_utf8()..];
    if self.code_fence_char == Some(fence_char)
      && fence_count >= self.code_fence_count
      && rest.trim().is_empty()
    {
      return Self::new();
    }

    *self
  }
}

/// Return the fence character and its run length if `trimmed` starts a fence.
fn fence_marker(trimmed: &str) -> Option<(char, usize)> {
  let fence_char = trimmed.chars().next()?;
  if fence_char != '`' && fence_char != '~' {
    return None;
  }
  let count = trimmed.chars().take_while(|&c| c == fence_char).count();
  (count >= 3).then_some((fence_char, count))
}

/// A fenced code block located in raw Markdown.
///
/// All offsets are byte offsets into the scanned text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fence<'a> {
  /// Start of the opening fence line.
  pub start:            usize,
  /// End of the opening fence line, including its newline.
  pub start_marker_end: usize,
  /// Start of the closing fence line.
  pub end_marker_start: usize,
  /// End of the closing fence line, including its newline if present.
  pub end:              usize,
  /// Fence character (backtick or tilde).
  pub fence_char:       char,
  /// Number of fence characters in the opening marker.
  pub fence_len:        usize,
  /// Everything after the opening fence characters, trimmed.
  pub info:             &'a str,
  /// The first word of the info string, if any.
  pub language:         Option<&'a str>,
  /// Text between the opening and closing fence lines.
  pub body:             &'a str,
}

/// Iterate over `text` line by line, yielding `(offset, line)` pairs where the
/// line includes its trailing newline.
pub(crate) fn lines_with_offsets(
  text: &str,
) -> impl Iterator<Item = (usize, &str)> {
  text.split_inclusive('\n').scan(0, |offset, line| {
    let start = *offset;
    *offset += line.len();
    Some((start, line))
  })
}

/// Locate every closed fenced code block in `text`, in document order.
///
/// A fence that is never closed is not reported.
#[must_use]
pub fn fences(text: &str) -> Vec<Fence<'_>> {
  let mut found = Vec::new();
  let mut open: Option<(usize, usize, char, usize, &str)> = None;

  for (offset, line) in lines_with_offsets(text) {
    let trimmed = line.trim_start();
    let Some((fence_char, count)) = fence_marker(trimmed) else {
      continue;
    };

    match open {
      None => {
        let info = trimmed[count * fence_char.len_utf8()..].trim();
        open = Some((offset, offset + line.len(), fence_char, count, info));
      },
      Some((start, start_marker_end, open_char, open_count, info)) => {
        let rest = &trimmed[count * fence_char.len_utf8()..];
        if fence_char == open_char
          && count >= open_count
          && rest.trim().is_empty()
        {
          found.push(Fence {
            start,
            start_marker_end,
            end_marker_start: offset,
            end: offset + line.len(),
            fence_char,
            fence_len: open_count,
            info,
            language: info.split_whitespace().next(),
            body: &text[start_marker_end..offset],
          });
          open = None;
        }
      },
    }
  }

  found
}

/// Check whether the byte `position` of `text` falls inside a fenced code
/// block, fence lines included.
///
/// An unclosed fence extends to the end of the text.
#[must_use]
pub fn is_inside_fence(text: &str, position: usize) -> bool {
  let mut tracker = FenceTracker::new();

  for (offset, line) in lines_with_offsets(text) {
    let was_inside = tracker.in_code_block();
    tracker = tracker.process_line(line);
    if position < offset + line.len() {
      return was_inside || tracker.in_code_block();
    }
  }

  false
}
