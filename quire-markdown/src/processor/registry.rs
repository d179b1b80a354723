//! The ordered chain of pre/post processors.

use crate::context::ProcessingContext;

/// Priority of a processor that does not declare one: after every built-in.
pub const DEFAULT_PRIORITY: i32 = i32::MAX;

/// A transform unit in the processing chain.
///
/// `preprocess` runs on raw Markdown before conversion, `postprocess` on the
/// converted HTML of the whole page. Both default to the identity. Anything a
/// processor needs to carry from one phase to the other goes through the
/// [`ProcessingContext`].
pub trait Processor: Send + Sync {
  /// Short name used in logs.
  fn name(&self) -> &'static str;

  /// Lower runs earlier.
  fn priority(&self) -> i32 {
    DEFAULT_PRIORITY
  }

  fn preprocess(&self, content: &str, _ctx: &mut ProcessingContext<'_>) -> String {
    content.to_string()
  }

  fn postprocess(&self, html: &str, _ctx: &mut ProcessingContext<'_>) -> String {
    html.to_string()
  }
}

/// Processors ordered by ascending priority, ties in registration order.
#[derive(Default)]
pub struct ProcessorRegistry {
  processors: Vec<Box<dyn Processor>>,
}

impl std::fmt::Debug for ProcessorRegistry {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_list()
      .entries(self.processors.iter().map(|p| (p.priority(), p.name())))
      .finish()
  }
}

impl ProcessorRegistry {
  /// An empty registry.
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  /// A registry holding every built-in component processor.
  #[must_use]
  pub fn with_builtins() -> Self {
    use crate::components::{
      BadgeProcessor,
      CalloutProcessor,
      CardsProcessor,
      CodeBlockExtractor,
      CodeGroupProcessor,
      DetailsProcessor,
      HeadingProcessor,
      IconProcessor,
      SnippetProcessor,
      StepsProcessor,
      TabsProcessor,
    };

    let mut registry = Self::new();
    registry.register(SnippetProcessor);
    registry.register(CodeBlockExtractor);
    registry.register(CodeGroupProcessor);
    registry.register(TabsProcessor);
    registry.register(StepsProcessor);
    registry.register(CardsProcessor);
    registry.register(DetailsProcessor);
    registry.register(CalloutProcessor);
    registry.register(HeadingProcessor);
    registry.register(BadgeProcessor);
    registry.register(IconProcessor);
    registry
  }

  /// Insert a processor after every processor with the same or a lower
  /// priority.
  pub fn register<P: Processor + 'static>(&mut self, processor: P) {
    self.register_boxed(Box::new(processor));
  }

  /// Like [`Self::register`] for an already boxed processor.
  pub fn register_boxed(&mut self, processor: Box<dyn Processor>) {
    let priority = processor.priority();
    let index = self
      .processors
      .partition_point(|existing| existing.priority() <= priority);
    log::trace!(
      "Registering processor '{}' at priority {priority}",
      processor.name()
    );
    self.processors.insert(index, processor);
  }

  /// Remove every processor, built-ins included.
  pub fn reset(&mut self) {
    self.processors.clear();
  }

  #[must_use]
  pub fn len(&self) -> usize {
    self.processors.len()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.processors.is_empty()
  }

  /// Processor names in execution order.
  #[must_use]
  pub fn names(&self) -> Vec<&'static str> {
    self.processors.iter().map(|p| p.name()).collect()
  }

  /// Feed `content` through every preprocessor in order.
  #[must_use]
  pub fn run_preprocessors(
    &self,
    content: &str,
    ctx: &mut ProcessingContext<'_>,
  ) -> String {
    self.processors.iter().fold(content.to_string(), |acc, processor| {
      log::trace!("Preprocessing with '{}'", processor.name());
      processor.preprocess(&acc, ctx)
    })
  }

  /// Feed `html` through every postprocessor in order.
  #[must_use]
  pub fn run_postprocessors(
    &self,
    html: &str,
    ctx: &mut ProcessingContext<'_>,
  ) -> String {
    self.processors.iter().fold(html.to_string(), |acc, processor| {
      log::trace!("Postprocessing with '{}'", processor.name());
      processor.postprocess(&acc, ctx)
    })
  }
}
