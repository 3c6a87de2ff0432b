//! Command serialization
//!
//! Each command becomes a tagged [`CommandRecord`]. Styled content inside a
//! payload is stored as the document codec's bytes (base64) next to a plain
//! text shadow. The target file is never written; it is supplied again when
//! a record is loaded.

use crate::{Result, StoreError};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use doc_model::{
    BinaryContentCodec, ContentCodec, DocumentContent, EmbeddedObject, FileId, ObjectId, ObjectProperties,
    TextRange,
};
use edit_engine::{
    ApplyFormat, Command, CommandKind, CommandTag, DeleteText, FormatSnapshots, InsertEmbeddedObject,
    InsertText, RemoveFormat, ReplaceText, UpdateEmbeddedObject,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The persisted form of one command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandRecord {
    pub id: Uuid,
    /// ISO 8601 timestamp
    pub timestamp: DateTime<Utc>,
    pub label: String,
    /// Variant tag, e.g. `insertText`
    pub kind: String,
    pub payload: serde_json::Value,
}

/// Styled content as stored inside a payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EncodedContent {
    /// Plain-text shadow for search and diagnostics
    text: String,
    /// Base64 of the codec bytes
    content: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InsertTextPayload {
    position: usize,
    inserted_text: EncodedContent,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeleteTextPayload {
    start_position: usize,
    end_position: usize,
    deleted_text: EncodedContent,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReplaceTextPayload {
    start_position: usize,
    end_position: usize,
    old_text: EncodedContent,
    new_text: EncodedContent,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FormatPayload {
    range: TextRange,
    before_snapshot: EncodedContent,
    after_snapshot: EncodedContent,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InsertObjectPayload {
    position: usize,
    object_payload: EmbeddedObject,
    #[serde(default)]
    leading_newline: bool,
    #[serde(default)]
    trailing_newline: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateObjectPayload {
    object_id: ObjectId,
    before_props: ObjectProperties,
    after_props: ObjectProperties,
    before_snapshot: EncodedContent,
    after_snapshot: EncodedContent,
}

/// Converts commands to and from [`CommandRecord`]s
#[derive(Debug, Clone, Default)]
pub struct CommandSerializer<C: ContentCodec = BinaryContentCodec> {
    codec: C,
}

impl CommandSerializer<BinaryContentCodec> {
    /// Create a serializer using the default content codec
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: ContentCodec> CommandSerializer<C> {
    pub fn with_codec(codec: C) -> Self {
        Self { codec }
    }

    /// Serialize a command into its tagged record
    pub fn serialize(&self, command: &Command) -> Result<CommandRecord> {
        let payload = match command.kind() {
            CommandKind::InsertText(edit) => to_value(InsertTextPayload {
                position: edit.position,
                inserted_text: self.encode(&edit.inserted)?,
            })?,
            CommandKind::DeleteText(edit) => to_value(DeleteTextPayload {
                start_position: edit.start,
                end_position: edit.end,
                deleted_text: self.encode(&edit.deleted)?,
            })?,
            CommandKind::ReplaceText(edit) => to_value(ReplaceTextPayload {
                start_position: edit.start,
                end_position: edit.end,
                old_text: self.encode(&edit.old)?,
                new_text: self.encode(&edit.new)?,
            })?,
            CommandKind::ApplyFormat(edit) => to_value(self.format_payload(edit.snapshots())?)?,
            CommandKind::RemoveFormat(edit) => to_value(self.format_payload(edit.snapshots())?)?,
            CommandKind::InsertObject(edit) => to_value(InsertObjectPayload {
                position: edit.position,
                object_payload: edit.object.clone(),
                leading_newline: edit.leading_newline,
                trailing_newline: edit.trailing_newline,
            })?,
            CommandKind::UpdateObject(edit) => to_value(UpdateObjectPayload {
                object_id: edit.object_id,
                before_props: edit.before_props.clone(),
                after_props: edit.after_props.clone(),
                before_snapshot: self.encode(&edit.before)?,
                after_snapshot: self.encode(&edit.after)?,
            })?,
        };

        Ok(CommandRecord {
            id: command.id(),
            timestamp: command.timestamp(),
            label: command.label().to_string(),
            kind: command.tag().as_str().to_string(),
            payload,
        })
    }

    /// Rebuild a command from its record, bound to `target`
    pub fn deserialize(&self, record: &CommandRecord, target: FileId) -> Result<Command> {
        let tag = CommandTag::parse(&record.kind).ok_or_else(|| StoreError::UnsupportedVariant {
            kind: record.kind.clone(),
        })?;

        let kind = match tag {
            CommandTag::InsertText => {
                let payload: InsertTextPayload = from_value(&record.payload)?;
                CommandKind::InsertText(InsertText::new(payload.position, self.decode(&payload.inserted_text)?))
            }
            CommandTag::DeleteText => {
                let payload: DeleteTextPayload = from_value(&record.payload)?;
                let deleted = self.decode(&payload.deleted_text)?;
                check_range_len("deleted", payload.start_position, payload.end_position, &deleted)?;
                CommandKind::DeleteText(DeleteText {
                    start: payload.start_position,
                    end: payload.end_position,
                    deleted,
                })
            }
            CommandTag::ReplaceText => {
                let payload: ReplaceTextPayload = from_value(&record.payload)?;
                let old = self.decode(&payload.old_text)?;
                check_range_len("replaced", payload.start_position, payload.end_position, &old)?;
                CommandKind::ReplaceText(ReplaceText {
                    start: payload.start_position,
                    end: payload.end_position,
                    old,
                    new: self.decode(&payload.new_text)?,
                })
            }
            CommandTag::ApplyFormat => {
                let snapshots = self.format_snapshots(from_value(&record.payload)?)?;
                CommandKind::ApplyFormat(ApplyFormat(snapshots))
            }
            CommandTag::RemoveFormat => {
                let snapshots = self.format_snapshots(from_value(&record.payload)?)?;
                CommandKind::RemoveFormat(RemoveFormat(snapshots))
            }
            CommandTag::InsertObject => {
                let payload: InsertObjectPayload = from_value(&record.payload)?;
                CommandKind::InsertObject(InsertEmbeddedObject {
                    position: payload.position,
                    object: payload.object_payload,
                    leading_newline: payload.leading_newline,
                    trailing_newline: payload.trailing_newline,
                })
            }
            CommandTag::UpdateObject => {
                let payload: UpdateObjectPayload = from_value(&record.payload)?;
                CommandKind::UpdateObject(UpdateEmbeddedObject {
                    object_id: payload.object_id,
                    before_props: payload.before_props,
                    after_props: payload.after_props,
                    before: self.decode(&payload.before_snapshot)?,
                    after: self.decode(&payload.after_snapshot)?,
                })
            }
        };

        Ok(Command::from_parts(record.id, record.timestamp, record.label.clone(), target, kind))
    }

    fn encode(&self, content: &DocumentContent) -> Result<EncodedContent> {
        Ok(EncodedContent {
            text: content.text().to_string(),
            content: STANDARD.encode(self.codec.encode(content)?),
        })
    }

    fn decode(&self, encoded: &EncodedContent) -> Result<DocumentContent> {
        let bytes = STANDARD
            .decode(&encoded.content)
            .map_err(|e| StoreError::SerializationCorrupt(format!("invalid base64: {}", e)))?;
        self.codec
            .decode(&bytes, &encoded.text)
            .map_err(|e| StoreError::SerializationCorrupt(e.to_string()))
    }

    fn format_payload(&self, snapshots: &FormatSnapshots) -> Result<FormatPayload> {
        Ok(FormatPayload {
            range: snapshots.range,
            before_snapshot: self.encode(&snapshots.before)?,
            after_snapshot: self.encode(&snapshots.after)?,
        })
    }

    fn format_snapshots(&self, payload: FormatPayload) -> Result<FormatSnapshots> {
        Ok(FormatSnapshots {
            range: payload.range,
            before: self.decode(&payload.before_snapshot)?,
            after: self.decode(&payload.after_snapshot)?,
        })
    }
}

fn check_range_len(what: &str, start: usize, end: usize, fragment: &DocumentContent) -> Result<()> {
    if end.checked_sub(start) != Some(fragment.len()) {
        return Err(StoreError::SerializationCorrupt(format!(
            "{} range {}..{} does not match {} codepoints",
            what,
            start,
            end,
            fragment.len()
        )));
    }
    Ok(())
}

fn to_value<T: Serialize>(payload: T) -> Result<serde_json::Value> {
    Ok(serde_json::to_value(payload)?)
}

fn from_value<T: DeserializeOwned>(payload: &serde_json::Value) -> Result<T> {
    T::deserialize(payload).map_err(|e| StoreError::SerializationCorrupt(e.to_string()))
}
