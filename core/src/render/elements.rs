//! Stock inline renderers

use super::{InlineRenderer, RenderedInline};
use crate::model::{AttributedRun, TextAttributes};

/// Renders `inline-code` runs as `<code>`
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineCodeRenderer;

impl InlineRenderer for InlineCodeRenderer {
    fn tag(&self) -> &str {
        "inline-code"
    }

    fn render(&self, run: &AttributedRun) -> RenderedInline {
        RenderedInline::element("code", run.text.clone())
    }
}

/// Renders `link` runs as `<a href>` opening in a new context
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkRenderer;

impl InlineRenderer for LinkRenderer {
    fn tag(&self) -> &str {
        "link"
    }

    fn render(&self, run: &AttributedRun) -> RenderedInline {
        let href = match &run.attributes {
            TextAttributes::Link { href } => href.as_str(),
            _ => "",
        };
        RenderedInline::element("a", run.text.clone())
            .with_prop("href", href)
            .with_prop("rel", "noopener noreferrer")
            .with_prop("target", "_blank")
    }
}
