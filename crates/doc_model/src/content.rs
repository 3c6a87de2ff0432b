//! Styled document content: a text buffer with format spans and placed objects
//!
//! All positions are codepoint offsets into the text buffer. Content is kept
//! in a canonical form (sorted, merged, non-empty spans; sorted objects) after
//! every mutation, so two contents that look the same compare equal.

use crate::{
    AttributeKey, AttributeSet, DocModelError, EmbeddedObject, ObjectId, Result,
    OBJECT_REPLACEMENT_CHAR,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A half-open range of codepoint offsets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    /// Create a range; the endpoints are ordered if given backwards
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start: start.min(end),
            end: start.max(end),
        }
    }

    /// An empty range at `position`
    pub fn collapsed(position: usize) -> Self {
        Self {
            start: position,
            end: position,
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, position: usize) -> bool {
        position >= self.start && position < self.end
    }

    /// Check if `other` lies entirely inside this range
    pub fn covers(&self, other: &TextRange) -> bool {
        other.start >= self.start && other.end <= self.end
    }

    /// The overlapping part of two ranges, if any
    pub fn intersect(&self, other: &TextRange) -> Option<TextRange> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start < end).then_some(TextRange { start, end })
    }

    fn shifted_left(&self, by: usize) -> TextRange {
        TextRange {
            start: self.start - by,
            end: self.end - by,
        }
    }

    fn shifted_right(&self, by: usize) -> TextRange {
        TextRange {
            start: self.start + by,
            end: self.end + by,
        }
    }
}

impl From<std::ops::Range<usize>> for TextRange {
    fn from(range: std::ops::Range<usize>) -> Self {
        TextRange::new(range.start, range.end)
    }
}

/// Attributes applied to a range of text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatSpan {
    pub range: TextRange,
    pub attributes: AttributeSet,
}

impl FormatSpan {
    pub fn new(range: impl Into<TextRange>, attributes: AttributeSet) -> Self {
        Self {
            range: range.into(),
            attributes,
        }
    }
}

/// An embedded object and the offset of its placeholder codepoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedObject {
    pub offset: usize,
    pub object: EmbeddedObject,
}

/// Styled text with embedded objects
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentContent {
    text: String,
    #[serde(default)]
    spans: Vec<FormatSpan>,
    #[serde(default)]
    objects: Vec<PlacedObject>,
}

/// Convert a codepoint offset into a byte offset
fn byte_offset(text: &str, position: usize) -> usize {
    text.char_indices()
        .nth(position)
        .map(|(index, _)| index)
        .unwrap_or(text.len())
}

impl DocumentContent {
    /// Create empty content
    pub fn new() -> Self {
        Self::default()
    }

    /// Create unstyled content. Stray placeholder codepoints are dropped
    /// since they would have no object behind them.
    pub fn plain(text: impl Into<String>) -> Self {
        let text: String = text.into();
        Self {
            text: text.chars().filter(|c| *c != OBJECT_REPLACEMENT_CHAR).collect(),
            spans: Vec::new(),
            objects: Vec::new(),
        }
    }

    /// Create content with one set of attributes over all of its text
    pub fn styled(text: impl Into<String>, attributes: AttributeSet) -> Self {
        let mut content = Self::new();
        content.push_str(&text.into(), &attributes);
        content
    }

    /// Content consisting of a single embedded object
    pub fn from_object(object: EmbeddedObject) -> Self {
        Self {
            text: OBJECT_REPLACEMENT_CHAR.to_string(),
            spans: Vec::new(),
            objects: vec![PlacedObject { offset: 0, object }],
        }
    }

    /// Assemble content from raw parts, validating every invariant
    pub fn from_parts(
        text: impl Into<String>,
        spans: Vec<FormatSpan>,
        objects: Vec<PlacedObject>,
    ) -> Result<Self> {
        Self {
            text: text.into(),
            spans,
            objects,
        }
        .into_canonical()
    }

    /// Sort, validate and normalize content built outside this module
    pub(crate) fn into_canonical(mut self) -> Result<Self> {
        self.spans.sort_by_key(|span| span.range.start);
        self.objects.sort_by_key(|placed| placed.offset);
        self.validate()?;
        self.normalize();
        Ok(self)
    }

    /// Builder-style append of styled text
    pub fn with_text(mut self, text: &str, attributes: AttributeSet) -> Self {
        self.push_str(text, &attributes);
        self
    }

    /// Builder-style append of an embedded object
    pub fn with_object(mut self, object: EmbeddedObject) -> Self {
        self.push_object(object);
        self
    }

    /// Append styled text at the end of the buffer
    pub fn push_str(&mut self, text: &str, attributes: &AttributeSet) {
        self.append(&Self::plain(text).restyled(attributes));
    }

    /// Append an embedded object at the end of the buffer
    pub fn push_object(&mut self, object: EmbeddedObject) {
        self.append(&Self::from_object(object));
    }

    /// Append another content, shifting its spans and objects
    pub fn append(&mut self, other: &DocumentContent) {
        let offset = self.len();
        self.text.push_str(&other.text);
        self.spans.extend(other.spans.iter().map(|span| FormatSpan {
            range: span.range.shifted_right(offset),
            attributes: span.attributes.clone(),
        }));
        self.objects.extend(other.objects.iter().map(|placed| PlacedObject {
            offset: placed.offset + offset,
            object: placed.object.clone(),
        }));
        self.normalize();
    }

    fn restyled(mut self, attributes: &AttributeSet) -> Self {
        self.spans.clear();
        let len = self.len();
        if len > 0 && !attributes.is_empty() {
            self.spans.push(FormatSpan::new(0..len, attributes.clone()));
        }
        self
    }

    /// The raw buffer, including object placeholders
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The text with object placeholders removed
    pub fn plain_text(&self) -> String {
        self.text
            .chars()
            .filter(|c| *c != OBJECT_REPLACEMENT_CHAR)
            .collect()
    }

    pub fn spans(&self) -> &[FormatSpan] {
        &self.spans
    }

    pub fn objects(&self) -> &[PlacedObject] {
        &self.objects
    }

    /// Length of the buffer in codepoints
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// The codepoint at `position`
    pub fn char_at(&self, position: usize) -> Option<char> {
        self.text.chars().nth(position)
    }

    /// The attributes in effect at `position` (empty for plain text)
    pub fn attributes_at(&self, position: usize) -> AttributeSet {
        self.spans
            .iter()
            .find(|span| span.range.contains(position))
            .map(|span| span.attributes.clone())
            .unwrap_or_default()
    }

    pub fn object(&self, id: ObjectId) -> Option<&EmbeddedObject> {
        self.objects
            .iter()
            .find(|placed| placed.object.id() == id)
            .map(|placed| &placed.object)
    }

    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut EmbeddedObject> {
        self.objects
            .iter_mut()
            .find(|placed| placed.object.id() == id)
            .map(|placed| &mut placed.object)
    }

    /// Offset of an object's placeholder
    pub fn object_offset(&self, id: ObjectId) -> Option<usize> {
        self.objects
            .iter()
            .find(|placed| placed.object.id() == id)
            .map(|placed| placed.offset)
    }

    /// The object whose placeholder sits at `offset`
    pub fn object_at(&self, offset: usize) -> Option<&EmbeddedObject> {
        self.objects
            .iter()
            .find(|placed| placed.offset == offset)
            .map(|placed| &placed.object)
    }

    fn check_range(&self, range: TextRange) -> Result<()> {
        let len = self.len();
        if range.start > range.end || range.end > len {
            return Err(DocModelError::RangeOutOfBounds {
                start: range.start,
                end: range.end,
                len,
            });
        }
        Ok(())
    }

    /// Copy out a range as standalone content with rebased offsets
    pub fn slice(&self, range: impl Into<TextRange>) -> Result<DocumentContent> {
        let range = range.into();
        self.check_range(range)?;

        let start_byte = byte_offset(&self.text, range.start);
        let end_byte = byte_offset(&self.text, range.end);

        let spans = self
            .spans
            .iter()
            .filter_map(|span| {
                span.range.intersect(&range).map(|overlap| FormatSpan {
                    range: overlap.shifted_left(range.start),
                    attributes: span.attributes.clone(),
                })
            })
            .collect();

        let objects = self
            .objects
            .iter()
            .filter(|placed| range.contains(placed.offset))
            .map(|placed| PlacedObject {
                offset: placed.offset - range.start,
                object: placed.object.clone(),
            })
            .collect();

        let mut slice = DocumentContent {
            text: self.text[start_byte..end_byte].to_string(),
            spans,
            objects,
        };
        slice.normalize();
        Ok(slice)
    }

    /// Replace a range with other content. Objects inside the range are
    /// removed along with their placeholders.
    pub fn splice(&mut self, range: impl Into<TextRange>, replacement: &DocumentContent) -> Result<()> {
        let range = range.into();
        self.check_range(range)?;

        let mut result = self.slice(0..range.start)?;
        result.append(replacement);
        result.append(&self.slice(range.end..self.len())?);
        *self = result;
        Ok(())
    }

    /// Insert content at a position
    pub fn insert(&mut self, position: usize, fragment: &DocumentContent) -> Result<()> {
        self.splice(TextRange::collapsed(position), fragment)
    }

    /// Remove a range, returning what was removed
    pub fn remove(&mut self, range: impl Into<TextRange>) -> Result<DocumentContent> {
        let range = range.into();
        let removed = self.slice(range)?;
        self.splice(range, &DocumentContent::new())?;
        Ok(removed)
    }

    /// Layer attributes over a range
    pub fn apply_attributes(&mut self, range: impl Into<TextRange>, overlay: &AttributeSet) -> Result<()> {
        self.transform_attributes(range.into(), |attributes| attributes.merge(overlay))
    }

    /// Clear attributes over a range
    pub fn remove_attributes(&mut self, range: impl Into<TextRange>, keys: &[AttributeKey]) -> Result<()> {
        self.transform_attributes(range.into(), |attributes| attributes.without(keys))
    }

    fn transform_attributes<F>(&mut self, range: TextRange, transform: F) -> Result<()>
    where
        F: Fn(&AttributeSet) -> AttributeSet,
    {
        self.check_range(range)?;

        // Attributes are constant between consecutive boundaries
        let mut boundaries = vec![0, self.len(), range.start, range.end];
        for span in &self.spans {
            boundaries.push(span.range.start);
            boundaries.push(span.range.end);
        }
        boundaries.sort_unstable();
        boundaries.dedup();

        let mut spans = Vec::new();
        for pair in boundaries.windows(2) {
            let segment = TextRange::new(pair[0], pair[1]);
            if segment.is_empty() {
                continue;
            }
            let current = self.attributes_at(segment.start);
            let attributes = if range.covers(&segment) {
                transform(&current)
            } else {
                current
            };
            spans.push(FormatSpan::new(segment, attributes));
        }

        self.spans = spans;
        self.normalize();
        Ok(())
    }

    /// Restore canonical form: drop empty spans, merge equal neighbours,
    /// order objects by offset
    fn normalize(&mut self) {
        self.spans
            .retain(|span| !span.range.is_empty() && !span.attributes.is_empty());
        self.spans.sort_by_key(|span| span.range.start);

        let mut merged: Vec<FormatSpan> = Vec::with_capacity(self.spans.len());
        for span in self.spans.drain(..) {
            if let Some(last) = merged.last_mut() {
                if last.range.end == span.range.start && last.attributes == span.attributes {
                    last.range.end = span.range.end;
                    continue;
                }
            }
            merged.push(span);
        }
        self.spans = merged;

        self.objects.sort_by_key(|placed| placed.offset);
    }

    /// Check every structural invariant of the content
    pub fn validate(&self) -> Result<()> {
        let len = self.len();

        let mut previous_end = 0;
        for span in &self.spans {
            if span.range.start > span.range.end || span.range.end > len {
                return Err(DocModelError::InvalidContent(format!(
                    "span {}..{} outside buffer of length {}",
                    span.range.start, span.range.end, len
                )));
            }
            if span.range.start < previous_end {
                return Err(DocModelError::InvalidContent(format!(
                    "span {}..{} overlaps its predecessor",
                    span.range.start, span.range.end
                )));
            }
            previous_end = span.range.end;
        }

        let mut seen = HashSet::new();
        let mut claimed = HashSet::new();
        let placeholders: Vec<usize> = self
            .text
            .chars()
            .enumerate()
            .filter(|(_, c)| *c == OBJECT_REPLACEMENT_CHAR)
            .map(|(index, _)| index)
            .collect();

        for placed in &self.objects {
            if !seen.insert(placed.object.id()) {
                return Err(DocModelError::InvalidContent(format!(
                    "object {} placed twice",
                    placed.object.id()
                )));
            }
            if placeholders.binary_search(&placed.offset).is_err() {
                return Err(DocModelError::InvalidContent(format!(
                    "object {} at offset {} has no placeholder",
                    placed.object.id(),
                    placed.offset
                )));
            }
            if !claimed.insert(placed.offset) {
                return Err(DocModelError::InvalidContent(format!(
                    "two objects share the placeholder at offset {}",
                    placed.offset
                )));
            }
        }

        if placeholders.len() != self.objects.len() {
            return Err(DocModelError::InvalidContent(format!(
                "{} placeholders for {} objects",
                placeholders.len(),
                self.objects.len()
            )));
        }

        Ok(())
    }
}
