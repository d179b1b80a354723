pub mod codeblock;
pub mod html;
pub mod ranges;

use std::collections::HashMap;

use regex::Regex;

/// Slugify a string for use as an anchor ID.
/// Converts to lowercase, replaces non-alphanumeric characters with dashes,
/// collapses repeated dashes and trims leading/trailing dashes.
#[must_use]
pub fn slugify(text: &str) -> String {
  let lowered = text
    .to_lowercase()
    .replace(|c: char| !c.is_alphanumeric() && c != '-' && c != '_', "-");

  let mut slug = String::with_capacity(lowered.len());
  for ch in lowered.chars() {
    if ch == '-' && slug.ends_with('-') {
      continue;
    }
    slug.push(ch);
  }
  slug.trim_matches('-').to_string()
}

/// Tracks slugs already handed out in one document so that repeated headings
/// get distinct ids (`intro`, `intro-1`, `intro-2`, ...).
#[derive(Debug, Default)]
pub struct SlugAllocator {
  seen: HashMap<String, usize>,
}

impl SlugAllocator {
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  /// Mark an id as taken without generating anything.
  pub fn reserve(&mut self, id: &str) {
    self.seen.entry(id.to_string()).or_insert(0);
  }

  /// Slugify `text` and make the result unique within this allocator.
  pub fn allocate(&mut self, text: &str) -> String {
    let base = match slugify(text) {
      slug if slug.is_empty() => "section".to_string(),
      slug => slug,
    };

    if !self.seen.contains_key(&base) {
      self.seen.insert(base.clone(), 0);
      return base;
    }

    let mut count = self.seen.get(&base).copied().unwrap_or_default();
    loop {
      count += 1;
      let candidate = format!("{base}-{count}");
      if !self.seen.contains_key(&candidate) {
        self.seen.insert(base, count);
        self.seen.insert(candidate.clone(), 0);
        return candidate;
      }
    }
  }
}

/// Capitalize the first letter of a string.
#[must_use]
pub fn capitalize_first(s: &str) -> String {
  let mut chars = s.chars();
  chars.next().map_or_else(String::new, |c| {
    c.to_uppercase().collect::<String>() + chars.as_str()
  })
}

/// Compile a regex, logging and falling back to a never-matching pattern if
/// the pattern is invalid.
#[must_use]
pub fn compile_regex(pattern: &str) -> Regex {
  Regex::new(pattern).unwrap_or_else(|e| {
    log::error!(
      "Failed to compile regex {pattern:?}: {e}\n Falling back to never \
       matching regex."
    );
    never_matching_regex()
  })
}

/// Create a regex that never matches anything.
///
/// This is used as a fallback pattern when a regex fails to compile.
/// It will never match any input, which is safer than using a trivial regex
/// like `^$` which would match empty strings.
///
/// # Panics
///
/// Panics if the fallback regex pattern `r"^\b$"` fails to compile, which
/// should never happen.
#[must_use]
pub fn never_matching_regex() -> Regex {
  // Use a pattern that will never match anything because it asserts something
  // impossible - this pattern is guaranteed to be valid
  Regex::new(r"[^\s\S]").unwrap_or_else(|_| {
    #[allow(
      clippy::unwrap_used,
      reason = "This pattern is guaranteed to be valid"
    )]
    Regex::new(r"^\b$").unwrap()
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_slugify() {
    assert_eq!(slugify("Getting Started"), "getting-started");
    assert_eq!(slugify("  What's new?  "), "what-s-new");
    assert_eq!(slugify("a -- b"), "a-b");
  }

  #[test]
  fn test_slug_allocator_deduplicates() {
    let mut slugs = SlugAllocator::new();
    assert_eq!(slugs.allocate("Usage"), "usage");
    assert_eq!(slugs.allocate("Usage"), "usage-1");
    assert_eq!(slugs.allocate("Usage"), "usage-2");
    assert_eq!(slugs.allocate("!!!"), "section");
  }

  #[test]
  fn test_slug_allocator_respects_reserved() {
    let mut slugs = SlugAllocator::new();
    slugs.reserve("usage-1");
    assert_eq!(slugs.allocate("Usage"), "usage");
    assert_eq!(slugs.allocate("Usage"), "usage-2");
  }

  #[test]
  fn test_capitalize_first() {
    assert_eq!(capitalize_first("note"), "Note");
    assert_eq!(capitalize_first(""), "");
  }

  #[test]
  fn test_never_matching_regex() {
    let re = never_matching_regex();
    assert!(!re.is_match(""));
    assert!(!re.is_match("anything"));
  }
}
