//! Character attribute sets carried by format spans

use serde::{Deserialize, Serialize};

/// Character-level formatting applied to a range of text.
///
/// Every field is optional; `None` means "not set on this span". An empty
/// set is equivalent to plain text and never stored in a span.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributeSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub underline: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strikethrough: Option<bool>,
    /// Font family name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    /// Font size in points
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f32>,
    /// Text color (CSS color string)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Named character style reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style_name: Option<String>,
}

/// Identifies one attribute of an [`AttributeSet`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AttributeKey {
    Bold,
    Italic,
    Underline,
    Strikethrough,
    FontFamily,
    FontSize,
    Color,
    StyleName,
}

impl AttributeKey {
    /// All attribute keys, in declaration order
    pub const ALL: [AttributeKey; 8] = [
        AttributeKey::Bold,
        AttributeKey::Italic,
        AttributeKey::Underline,
        AttributeKey::Strikethrough,
        AttributeKey::FontFamily,
        AttributeKey::FontSize,
        AttributeKey::Color,
        AttributeKey::StyleName,
    ];
}

impl AttributeSet {
    /// Create an empty attribute set
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bold() -> Self {
        Self {
            bold: Some(true),
            ..Default::default()
        }
    }

    pub fn italic() -> Self {
        Self {
            italic: Some(true),
            ..Default::default()
        }
    }

    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = Some(bold);
        self
    }

    pub fn with_italic(mut self, italic: bool) -> Self {
        self.italic = Some(italic);
        self
    }

    pub fn with_underline(mut self, underline: bool) -> Self {
        self.underline = Some(underline);
        self
    }

    pub fn with_font(mut self, family: impl Into<String>, size: f32) -> Self {
        self.font_family = Some(family.into());
        self.font_size = Some(size);
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_style_name(mut self, name: impl Into<String>) -> Self {
        self.style_name = Some(name.into());
        self
    }

    /// Check whether no attribute is set
    pub fn is_empty(&self) -> bool {
        AttributeKey::ALL.iter().all(|key| !self.has(*key))
    }

    /// Check whether a single attribute is set
    pub fn has(&self, key: AttributeKey) -> bool {
        match key {
            AttributeKey::Bold => self.bold.is_some(),
            AttributeKey::Italic => self.italic.is_some(),
            AttributeKey::Underline => self.underline.is_some(),
            AttributeKey::Strikethrough => self.strikethrough.is_some(),
            AttributeKey::FontFamily => self.font_family.is_some(),
            AttributeKey::FontSize => self.font_size.is_some(),
            AttributeKey::Color => self.color.is_some(),
            AttributeKey::StyleName => self.style_name.is_some(),
        }
    }

    /// Merge another set on top of this one.
    /// Attributes set in `overlay` win over attributes in `self`.
    pub fn merge(&self, overlay: &AttributeSet) -> AttributeSet {
        AttributeSet {
            bold: overlay.bold.or(self.bold),
            italic: overlay.italic.or(self.italic),
            underline: overlay.underline.or(self.underline),
            strikethrough: overlay.strikethrough.or(self.strikethrough),
            font_family: overlay.font_family.clone().or_else(|| self.font_family.clone()),
            font_size: overlay.font_size.or(self.font_size),
            color: overlay.color.clone().or_else(|| self.color.clone()),
            style_name: overlay.style_name.clone().or_else(|| self.style_name.clone()),
        }
    }

    /// Return a copy with the given attributes cleared
    pub fn without(&self, keys: &[AttributeKey]) -> AttributeSet {
        let mut result = self.clone();
        for key in keys {
            match key {
                AttributeKey::Bold => result.bold = None,
                AttributeKey::Italic => result.italic = None,
                AttributeKey::Underline => result.underline = None,
                AttributeKey::Strikethrough => result.strikethrough = None,
                AttributeKey::FontFamily => result.font_family = None,
                AttributeKey::FontSize => result.font_size = None,
                AttributeKey::Color => result.color = None,
                AttributeKey::StyleName => result.style_name = None,
            }
        }
        result
    }
}
