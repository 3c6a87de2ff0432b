//! Embedded object commands for inserting and updating objects

use crate::command::{check_position, run_end};
use crate::{ContentEdit, EditError, Result};
use doc_model::{DocumentContent, EmbeddedObject, ObjectId, ObjectProperties};

/// Insert an embedded object at a position.
///
/// Centered and right-aligned objects sit in their own paragraph, so the
/// command also inserts a newline before and/or after the placeholder when
/// the neighbouring characters are not already line breaks. Which newlines
/// were needed is decided once, against the content the command was built
/// from, and stored with the command.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertEmbeddedObject {
    pub position: usize,
    pub object: EmbeddedObject,
    pub leading_newline: bool,
    pub trailing_newline: bool,
}

impl InsertEmbeddedObject {
    /// Build the command for inserting `object` into `content` at `position`
    pub fn at(content: &DocumentContent, position: usize, object: EmbeddedObject) -> Result<Self> {
        check_position(position, content)?;

        let (leading_newline, trailing_newline) = if object.alignment().needs_isolation() {
            let leading = position > 0 && content.char_at(position - 1) != Some('\n');
            let trailing = position < content.len() && content.char_at(position) != Some('\n');
            (leading, trailing)
        } else {
            (false, false)
        };

        Ok(Self {
            position,
            object,
            leading_newline,
            trailing_newline,
        })
    }

    pub fn object_id(&self) -> ObjectId {
        self.object.id()
    }

    /// Number of codepoints the insertion adds
    pub fn inserted_len(&self) -> usize {
        1 + usize::from(self.leading_newline) + usize::from(self.trailing_newline)
    }

    /// Offset of the object's placeholder once inserted
    pub fn placeholder_offset(&self) -> usize {
        self.position.saturating_add(usize::from(self.leading_newline))
    }

    fn fragment(&self) -> DocumentContent {
        let mut fragment = DocumentContent::new();
        if self.leading_newline {
            fragment.append(&DocumentContent::plain("\n"));
        }
        fragment.push_object(self.object.clone());
        if self.trailing_newline {
            fragment.append(&DocumentContent::plain("\n"));
        }
        fragment
    }
}

impl ContentEdit for InsertEmbeddedObject {
    fn apply(&self, mut content: DocumentContent) -> Result<DocumentContent> {
        check_position(self.position, &content)?;
        if content.object(self.object.id()).is_some() {
            return Err(EditError::Inconsistent(format!(
                "object {} is already placed",
                self.object.id()
            )));
        }
        content.insert(self.position, &self.fragment())?;
        Ok(content)
    }

    fn revert(&self, mut content: DocumentContent) -> Result<DocumentContent> {
        let end = run_end(self.position, self.inserted_len(), &content)?;

        let placed = content.object_offset(self.object.id());
        if placed != Some(self.placeholder_offset()) {
            return Err(match placed {
                None => EditError::ObjectNotFound(self.object.id()),
                Some(offset) => EditError::Inconsistent(format!(
                    "object {} moved from {} to {}",
                    self.object.id(),
                    self.placeholder_offset(),
                    offset
                )),
            });
        }

        content.remove(self.position..end)?;
        Ok(content)
    }

    fn display_name(&self) -> &'static str {
        "Insert Object"
    }
}

/// Change an embedded object's display properties
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateEmbeddedObject {
    pub object_id: ObjectId,
    pub before_props: ObjectProperties,
    pub after_props: ObjectProperties,
    pub before: DocumentContent,
    pub after: DocumentContent,
}

impl UpdateEmbeddedObject {
    /// Snapshot `content` and compute the state with `properties` applied
    pub fn capture(content: &DocumentContent, object_id: ObjectId, properties: ObjectProperties) -> Result<Self> {
        let before_props = content
            .object(object_id)
            .ok_or(EditError::ObjectNotFound(object_id))?
            .properties()
            .clone();

        let mut after = content.clone();
        let object = after
            .object_mut(object_id)
            .ok_or(EditError::ObjectNotFound(object_id))?;
        object.set_properties(properties);
        let after_props = object.properties().clone();

        Ok(Self {
            object_id,
            before_props,
            after_props,
            before: content.clone(),
            after,
        })
    }

    fn settle(&self, snapshot: &DocumentContent, properties: &ObjectProperties) -> Result<DocumentContent> {
        let mut content = snapshot.clone();
        content
            .object_mut(self.object_id)
            .ok_or(EditError::ObjectNotFound(self.object_id))?
            .set_properties(properties.clone());
        Ok(content)
    }
}

impl ContentEdit for UpdateEmbeddedObject {
    fn apply(&self, _content: DocumentContent) -> Result<DocumentContent> {
        self.settle(&self.after, &self.after_props)
    }

    fn revert(&self, _content: DocumentContent) -> Result<DocumentContent> {
        self.settle(&self.before, &self.before_props)
    }

    fn display_name(&self) -> &'static str {
        "Format Object"
    }
}
