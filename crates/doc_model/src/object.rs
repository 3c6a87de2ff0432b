//! Embedded objects (image-like attachments) placed inline in document content
//!
//! An embedded object occupies exactly one placeholder codepoint
//! ([`OBJECT_REPLACEMENT_CHAR`]) in the text buffer. Its display properties
//! belong to the instance: objects copy their initial values from an
//! [`ObjectStyleTemplate`] at creation and never read the template again.

use crate::{FileId, ObjectId};
use serde::{Deserialize, Deserializer, Serialize};

/// Placeholder codepoint standing in for an embedded object in the text buffer
pub const OBJECT_REPLACEMENT_CHAR: char = '\u{FFFC}';

/// Smallest allowed display scale
pub const MIN_SCALE: f32 = 0.1;

/// Largest allowed display scale
pub const MAX_SCALE: f32 = 2.0;

/// Clamp a display scale into `[MIN_SCALE, MAX_SCALE]`.
/// NaN falls back to the natural size.
pub fn clamp_scale(scale: f32) -> f32 {
    if scale.is_nan() {
        1.0
    } else {
        scale.clamp(MIN_SCALE, MAX_SCALE)
    }
}

fn deserialize_scale<'de, D>(deserializer: D) -> std::result::Result<f32, D::Error>
where
    D: Deserializer<'de>,
{
    f32::deserialize(deserializer).map(clamp_scale)
}

/// Horizontal placement of an embedded object
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectAlignment {
    Left,
    Center,
    Right,
    /// Treated as a character in text flow
    #[default]
    Inline,
}

impl ObjectAlignment {
    /// Whether the object must sit in its own paragraph
    pub fn needs_isolation(&self) -> bool {
        matches!(self, ObjectAlignment::Center | ObjectAlignment::Right)
    }
}

/// Caption shown below an embedded object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Caption {
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style_name: Option<String>,
}

impl Caption {
    /// An enabled caption with text
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            enabled: true,
            text: Some(text.into()),
            style_name: None,
        }
    }
}

/// The mutable display properties of an embedded object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectProperties {
    #[serde(deserialize_with = "deserialize_scale")]
    scale: f32,
    pub alignment: ObjectAlignment,
    pub caption: Caption,
}

impl ObjectProperties {
    pub fn new(scale: f32, alignment: ObjectAlignment, caption: Caption) -> Self {
        Self {
            scale: clamp_scale(scale),
            alignment,
            caption,
        }
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Set the scale, clamped into the allowed range
    pub fn set_scale(&mut self, scale: f32) {
        self.scale = clamp_scale(scale);
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.set_scale(scale);
        self
    }

    pub fn with_alignment(mut self, alignment: ObjectAlignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn with_caption(mut self, caption: Caption) -> Self {
        self.caption = caption;
        self
    }
}

impl Default for ObjectProperties {
    fn default() -> Self {
        Self {
            scale: 1.0,
            alignment: ObjectAlignment::Inline,
            caption: Caption::default(),
        }
    }
}

/// A named set of initial properties for newly placed objects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectStyleTemplate {
    pub name: String,
    pub properties: ObjectProperties,
}

impl ObjectStyleTemplate {
    pub fn new(name: impl Into<String>, properties: ObjectProperties) -> Self {
        Self {
            name: name.into(),
            properties,
        }
    }
}

impl Default for ObjectStyleTemplate {
    fn default() -> Self {
        Self::new("Default", ObjectProperties::default())
    }
}

/// An embedded object record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddedObject {
    id: ObjectId,
    /// Raw object bytes (e.g. encoded image data)
    #[serde(with = "crate::base64_bytes")]
    payload: Vec<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_filename: Option<String>,
    properties: ObjectProperties,
    /// Name of the template the object was created from
    pub owner_style_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_file_id: Option<FileId>,
}

impl EmbeddedObject {
    /// Create an object with default properties
    pub fn new(payload: Vec<u8>) -> Self {
        Self::from_template(&ObjectStyleTemplate::default(), payload)
    }

    /// Create an object whose initial properties are copied from a template
    pub fn from_template(template: &ObjectStyleTemplate, payload: Vec<u8>) -> Self {
        Self {
            id: ObjectId::new(),
            payload,
            original_filename: None,
            properties: template.properties.clone(),
            owner_style_name: template.name.clone(),
            owner_file_id: None,
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.original_filename = Some(filename.into());
        self
    }

    pub fn with_owner_file(mut self, file_id: FileId) -> Self {
        self.owner_file_id = Some(file_id);
        self
    }

    pub fn with_properties(mut self, properties: ObjectProperties) -> Self {
        self.set_properties(properties);
        self
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn properties(&self) -> &ObjectProperties {
        &self.properties
    }

    /// Replace all mutable display properties
    pub fn set_properties(&mut self, properties: ObjectProperties) {
        self.properties = ObjectProperties::new(
            properties.scale,
            properties.alignment,
            properties.caption,
        );
    }

    pub fn scale(&self) -> f32 {
        self.properties.scale()
    }

    /// Set the display scale, clamped into `[MIN_SCALE, MAX_SCALE]`
    pub fn set_scale(&mut self, scale: f32) {
        self.properties.set_scale(scale);
    }

    pub fn alignment(&self) -> ObjectAlignment {
        self.properties.alignment
    }

    pub fn set_alignment(&mut self, alignment: ObjectAlignment) {
        self.properties.alignment = alignment;
    }

    pub fn caption(&self) -> &Caption {
        &self.properties.caption
    }

    pub fn set_caption(&mut self, caption: Caption) {
        self.properties.caption = caption;
    }
}
