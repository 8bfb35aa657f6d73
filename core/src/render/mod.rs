//! Renderer Dispatch: one attributed run in, one inline description out
//!
//! Dispatch is an exhaustive match over [`TextAttributes`]. Base text is
//! always rendered by the core; every other inline tag is delegated to an
//! [`InlineRenderer`] plug-in looked up by tag name. A tag without a plug-in
//! is a fatal [`EditorError::UnknownAttributeTag`]: it means the renderer set
//! and the model's attribute vocabulary are out of sync, which no amount of
//! retrying fixes.
//!
//! Rendering is pure. Each run yields exactly one text-bearing leaf, so the
//! offset arithmetic of the mapper holds for plug-ins too.

mod elements;

pub use elements::{InlineCodeRenderer, LinkRenderer};

use crate::error::{EditorError, Result};
use crate::model::{AttributedRun, TextAttributes, TextStyle};
use std::collections::{BTreeMap, HashMap};

/// Description of a rendered run
///
/// `element` names an optional wrapper (e.g. `code`, `a`) around the single
/// text leaf. `text` is the leaf content and always equals the run text.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenderedInline {
    pub element: Option<String>,
    pub props: BTreeMap<String, String>,
    pub style: TextStyle,
    pub text: String,
}

impl RenderedInline {
    /// Bare text leaf with the given style
    pub fn text(text: impl Into<String>, style: TextStyle) -> Self {
        Self {
            text: text.into(),
            style,
            ..Self::default()
        }
    }

    /// Text leaf wrapped in an element
    pub fn element(tag: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            element: Some(tag.into()),
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }
}

/// Plug-in renderer for one inline tag
pub trait InlineRenderer {
    /// Tag this renderer handles, as returned by [`TextAttributes::tag`]
    fn tag(&self) -> &str;

    fn render(&self, run: &AttributedRun) -> RenderedInline;
}

/// Registered inline renderers, keyed by tag
#[derive(Default)]
pub struct RendererRegistry {
    plugins: HashMap<String, Box<dyn InlineRenderer>>,
}

impl RendererRegistry {
    /// Registry that renders base text only
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the stock `inline-code` and `link` renderers
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(InlineCodeRenderer));
        registry.register(Box::new(LinkRenderer));
        registry
    }

    /// Register a plug-in, replacing any previous one for the same tag
    pub fn register(&mut self, renderer: Box<dyn InlineRenderer>) {
        self.plugins.insert(renderer.tag().to_string(), renderer);
    }

    pub fn supports(&self, tag: &str) -> bool {
        tag == "base" || self.plugins.contains_key(tag)
    }

    /// Render one run
    pub fn render(&self, run: &AttributedRun) -> Result<RenderedInline> {
        match &run.attributes {
            TextAttributes::Base(style) => Ok(RenderedInline::text(run.text.clone(), *style)),
            TextAttributes::LineBreak => Err(EditorError::UnrenderableRun("line-break")),
            TextAttributes::InlineCode
            | TextAttributes::Link { .. }
            | TextAttributes::Custom { .. } => {
                let tag = run.attributes.tag();
                match self.plugins.get(tag) {
                    Some(renderer) => Ok(renderer.render(run)),
                    None => Err(EditorError::UnknownAttributeTag(tag.to_string())),
                }
            }
        }
    }
}

impl std::fmt::Debug for RendererRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut tags: Vec<&String> = self.plugins.keys().collect();
        tags.sort();
        f.debug_struct("RendererRegistry").field("plugins", &tags).finish()
    }
}
