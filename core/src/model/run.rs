//! AttributedRun: a contiguous span of text sharing one attribute tag

use super::attributes::TextAttributes;
use serde::{Deserialize, Serialize};

/// Placeholder text rendered into an otherwise empty line
pub const ZERO_WIDTH_SPACE: &str = "\u{200B}";

/// Length of a string in UTF-16 code units
///
/// All flat indices in this crate are measured in these units.
pub fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}

/// One run of the model's ordered run sequence
///
/// Serializes in the delta form `{ "insert": ..., "attributes": { ... } }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributedRun {
    #[serde(rename = "insert")]
    pub text: String,
    #[serde(default)]
    pub attributes: TextAttributes,
}

impl AttributedRun {
    pub fn new(text: impl Into<String>, attributes: TextAttributes) -> Self {
        Self {
            text: text.into(),
            attributes,
        }
    }

    /// Unstyled base run
    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, TextAttributes::base())
    }

    pub fn line_break() -> Self {
        Self::new("\n", TextAttributes::LineBreak)
    }

    /// Zero-width run standing in for the content of an empty line
    pub fn sentinel() -> Self {
        Self::plain(ZERO_WIDTH_SPACE)
    }

    /// Length in UTF-16 code units
    pub fn len(&self) -> usize {
        utf16_len(&self.text)
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn is_line_break(&self) -> bool {
        self.attributes.is_line_break()
    }
}

/// Total flat length of a run sequence
pub fn delta_len(runs: &[AttributedRun]) -> usize {
    runs.iter().map(AttributedRun::len).sum()
}

/// Flatten a run sequence to plain text
pub fn delta_to_string(runs: &[AttributedRun]) -> String {
    runs.iter().map(|run| run.text.as_str()).collect()
}

/// Attributes of the run containing the code unit at `index`
pub fn attributes_at(runs: &[AttributedRun], index: usize) -> Option<&TextAttributes> {
    let mut start = 0;
    for run in runs {
        let end = start + run.len();
        if index < end {
            return Some(&run.attributes);
        }
        start = end;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TextStyle;
    use serde_json::json;

    #[test]
    fn test_utf16_len() {
        assert_eq!(utf16_len("abc"), 3);
        assert_eq!(utf16_len("🧐"), 2);
        assert_eq!(utf16_len("你好"), 2);
        assert_eq!(AttributedRun::sentinel().len(), 1);
    }

    #[test]
    fn test_attributes_at() {
        let runs = vec![
            AttributedRun::new("ab", TextAttributes::styled(TextStyle::bold())),
            AttributedRun::line_break(),
            AttributedRun::plain("cd"),
        ];
        assert_eq!(
            attributes_at(&runs, 1),
            Some(&TextAttributes::styled(TextStyle::bold()))
        );
        assert_eq!(attributes_at(&runs, 2), Some(&TextAttributes::LineBreak));
        assert_eq!(attributes_at(&runs, 3), Some(&TextAttributes::base()));
        assert_eq!(attributes_at(&runs, 5), None);
        assert_eq!(delta_len(&runs), 5);
        assert_eq!(delta_to_string(&runs), "ab\ncd");
    }

    #[test]
    fn test_delta_json() {
        let run: AttributedRun =
            serde_json::from_value(json!({ "insert": "hi", "attributes": { "type": "inline-code" } }))
                .unwrap();
        assert_eq!(run, AttributedRun::new("hi", TextAttributes::InlineCode));

        let plain: AttributedRun = serde_json::from_value(json!({ "insert": "x" })).unwrap();
        assert_eq!(plain.attributes, TextAttributes::base());
    }
}
