//! Attribute vocabulary for attributed runs
//!
//! Every run carries exactly one [`TextAttributes`] value. The JSON form is
//! internally tagged by `type`, matching the delta interchange format:
//!
//! ```json
//! { "type": "base", "bold": true }
//! { "type": "line-break" }
//! { "type": "link", "href": "https://example.com" }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Inline style flags of a base run
///
/// `None` means the key is not set. Merging treats `Some(false)` as an
/// explicit un-set, so a merged style never stores `Some(false)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TextStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub underline: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strikethrough: Option<bool>,
}

impl TextStyle {
    pub fn bold() -> Self {
        Self {
            bold: Some(true),
            ..Self::default()
        }
    }

    pub fn italic() -> Self {
        Self {
            italic: Some(true),
            ..Self::default()
        }
    }

    pub fn underline() -> Self {
        Self {
            underline: Some(true),
            ..Self::default()
        }
    }

    pub fn strikethrough() -> Self {
        Self {
            strikethrough: Some(true),
            ..Self::default()
        }
    }

    /// Apply only the keys present in `patch`
    pub fn merged(&self, patch: &TextStyle) -> TextStyle {
        fn pick(current: Option<bool>, patch: Option<bool>) -> Option<bool> {
            match patch {
                Some(true) => Some(true),
                Some(false) => None,
                None => current,
            }
        }

        TextStyle {
            bold: pick(self.bold, patch.bold),
            italic: pick(self.italic, patch.italic),
            underline: pick(self.underline, patch.underline),
            strikethrough: pick(self.strikethrough, patch.strikethrough),
        }
    }

    pub fn is_plain(&self) -> bool {
        *self == TextStyle::default()
    }
}

/// Attribute tag of a run
///
/// `Base` and `LineBreak` are the core vocabulary. The remaining variants are
/// rendered by plug-ins registered in a
/// [`RendererRegistry`](crate::render::RendererRegistry); a run whose tag has no
/// plug-in fails to render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum TextAttributes {
    Base(TextStyle),
    LineBreak,
    InlineCode,
    Link {
        href: String,
    },
    /// Extension tag with a free-form attribute bag
    Custom {
        name: String,
        #[serde(default)]
        data: BTreeMap<String, serde_json::Value>,
    },
}

impl TextAttributes {
    /// Unstyled base text
    pub fn base() -> Self {
        TextAttributes::Base(TextStyle::default())
    }

    pub fn styled(style: TextStyle) -> Self {
        TextAttributes::Base(style)
    }

    pub fn link(href: impl Into<String>) -> Self {
        TextAttributes::Link { href: href.into() }
    }

    pub fn custom(name: impl Into<String>) -> Self {
        TextAttributes::Custom {
            name: name.into(),
            data: BTreeMap::new(),
        }
    }

    /// Tag name used for renderer lookup
    pub fn tag(&self) -> &str {
        match self {
            TextAttributes::Base(_) => "base",
            TextAttributes::LineBreak => "line-break",
            TextAttributes::InlineCode => "inline-code",
            TextAttributes::Link { .. } => "link",
            TextAttributes::Custom { name, .. } => name,
        }
    }

    pub fn is_line_break(&self) -> bool {
        matches!(self, TextAttributes::LineBreak)
    }

    /// Style flags, if this tag carries any
    pub fn style(&self) -> Option<&TextStyle> {
        match self {
            TextAttributes::Base(style) => Some(style),
            _ => None,
        }
    }

    /// Merge `patch` into these attributes, touching only the keys it sets
    ///
    /// Same-tag patches merge key by key. A patch with a different tag
    /// replaces the tag and its attributes.
    pub fn merged(&self, patch: &TextAttributes) -> TextAttributes {
        match (self, patch) {
            (TextAttributes::Base(current), TextAttributes::Base(style)) => {
                TextAttributes::Base(current.merged(style))
            }
            (
                TextAttributes::Custom { name, data },
                TextAttributes::Custom {
                    name: patch_name,
                    data: patch_data,
                },
            ) if name == patch_name => {
                let mut data = data.clone();
                for (key, value) in patch_data {
                    if value.is_null() {
                        data.remove(key);
                    } else {
                        data.insert(key.clone(), value.clone());
                    }
                }
                TextAttributes::Custom {
                    name: name.clone(),
                    data,
                }
            }
            (_, patch) => patch.clone(),
        }
    }
}

impl Default for TextAttributes {
    fn default() -> Self {
        Self::base()
    }
}
