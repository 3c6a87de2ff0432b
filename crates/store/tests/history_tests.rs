//! Integration tests for command history
//!
//! These run edits through a command stack against a document registry,
//! then persist and restore the history the way an editor session would.

use doc_model::{
    AttributeSet, DocModelError, DocumentContent, DocumentRegistry, EmbeddedObject, FileId, ObjectAlignment,
    ObjectProperties, VersionStore,
};
use edit_engine::{
    ApplyFormat, Command, CommandStack, DeleteText, EditError, InsertEmbeddedObject, InsertText, StackConfig,
};
use store::{
    capture, restore, CommandRecord, CommandSerializer, HistoryFile, HistorySettings, HistorySide, PersistedHistory,
    StoreError,
};
use tempfile::TempDir;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn open(text: &str) -> (DocumentRegistry, FileId) {
    let mut registry = DocumentRegistry::new();
    let file = registry.open("Document", DocumentContent::plain(text)).unwrap();
    (registry, file)
}

fn content_of(registry: &DocumentRegistry, file: FileId) -> DocumentContent {
    registry.current_content(file).unwrap()
}

#[test]
fn scenario_a_insert_undo_redo() {
    init_tracing();
    let (mut registry, file) = open("Hello");
    let mut stack = CommandStack::new();

    stack.execute(&mut registry, Command::new(file, "Typing", InsertText::plain(5, " World")));
    assert_eq!(content_of(&registry, file).text(), "Hello World");

    stack.undo(&mut registry);
    assert_eq!(content_of(&registry, file).text(), "Hello");

    stack.redo(&mut registry);
    assert_eq!(content_of(&registry, file).text(), "Hello World");
}

#[test]
fn scenario_b_undo_restores_exact_styling() {
    init_tracing();
    let mut registry = DocumentRegistry::new();
    let before = DocumentContent::styled("Hello", AttributeSet::bold());
    let file = registry.open("Styled", before.clone()).unwrap();
    let after = before
        .clone()
        .with_text(" ", AttributeSet::new())
        .with_text("World", AttributeSet::bold().with_italic(true));

    let mut stack = CommandStack::new();
    let format = ApplyFormat::from_snapshots(6..11, before.clone(), after.clone());
    stack.execute(&mut registry, Command::new(file, "Bold Italic", format));
    assert_eq!(content_of(&registry, file), after);

    // Survives persistence as well
    let serializer = CommandSerializer::new();
    let history = capture(&stack, &serializer).unwrap();
    let mut stack = restore(&history, file, StackConfig::default(), &serializer).unwrap().stack;

    stack.undo(&mut registry);
    let restored = content_of(&registry, file);
    assert_eq!(restored, before);
    assert_ne!(restored, DocumentContent::plain("Hello World"));
    assert_eq!(restored.attributes_at(0).bold, Some(true));
}

#[test]
fn scenario_c_centered_object_round_trip() {
    init_tracing();
    let (mut registry, file) = open("0123456789");
    let original = content_of(&registry, file);
    let mut stack = CommandStack::new();

    let object = EmbeddedObject::new(vec![0x89, 0x50, 0x4E, 0x47])
        .with_filename("figure.png")
        .with_owner_file(file)
        .with_properties(ObjectProperties::default().with_alignment(ObjectAlignment::Center));
    let insert = InsertEmbeddedObject::at(&original, 3, object).unwrap();
    let expected_len = 10 + insert.inserted_len();

    assert!(stack.execute(&mut registry, Command::new(file, "Insert Picture", insert)));
    let edited = content_of(&registry, file);
    assert!(edited.len() > 10 && edited.len() <= 13);
    assert_eq!(edited.len(), expected_len);

    stack.undo(&mut registry);
    let restored = content_of(&registry, file);
    assert_eq!(restored.len(), 10);
    assert_eq!(restored, original);
}

#[test]
fn scenario_d_programmatic_removal_keeps_redo() {
    init_tracing();
    let (mut registry, file) = open("Intro\n");
    let mut stack = CommandStack::new();

    let object = EmbeddedObject::new(vec![1, 2, 3]);
    let id = object.id();
    let insert = InsertEmbeddedObject::at(&content_of(&registry, file), 6, object).unwrap();
    stack.execute(&mut registry, Command::new(file, "Insert Object", insert));
    stack.execute(&mut registry, Command::new(file, "Typing", InsertText::plain(0, "> ")));
    stack.undo(&mut registry);

    let could_redo = stack.can_redo();
    let undo_depth = stack.undo_commands().len();

    let removed = stack.with_programmatic_mutation(|scope| {
        scope.edit(&mut registry, file, |content| {
            let offset = content.object_offset(id).ok_or(DocModelError::ObjectNotFound(id))?;
            content.remove(offset..offset + 1).map(|_| ())
        })
    });

    assert!(removed);
    assert!(content_of(&registry, file).object(id).is_none());
    assert_eq!(stack.can_redo(), could_redo);
    assert_eq!(stack.undo_commands().len(), undo_depth);
}

#[test]
fn scenario_e_unknown_kind_is_skipped() {
    init_tracing();
    let (mut registry, file) = open("");
    let mut stack = CommandStack::new();
    for (i, word) in ["one", "two", "three", "four"].iter().enumerate() {
        let position = content_of(&registry, file).len();
        let text = if i == 0 { word.to_string() } else { format!(" {}", word) };
        stack.execute(&mut registry, Command::new(file, format!("Type {}", word), InsertText::plain(position, text)));
    }

    let serializer = CommandSerializer::new();
    let mut history = capture(&stack, &serializer).unwrap();
    let future = CommandRecord {
        kind: "futureVariant".to_string(),
        label: "From the future".to_string(),
        id: uuid::Uuid::new_v4(),
        ..history.undo[0].clone()
    };
    history.undo.insert(2, future);

    let loaded = restore(&history, file, StackConfig::default(), &serializer).unwrap();

    let labels: Vec<_> = loaded.stack.undo_commands().iter().map(|c| c.label()).collect();
    assert_eq!(labels, vec!["Type one", "Type two", "Type three", "Type four"]);

    assert_eq!(loaded.failures.len(), 1);
    let failure = &loaded.failures[0];
    assert_eq!(failure.side, HistorySide::Undo);
    assert_eq!(failure.index, 2);
    assert!(matches!(&failure.error, StoreError::UnsupportedVariant { kind } if kind == "futureVariant"));

    let mut stack = loaded.stack;
    while stack.undo(&mut registry) {}
    assert!(content_of(&registry, file).is_empty());
}

#[test]
fn restored_record_with_overflowing_position_is_a_no_op() {
    init_tracing();
    let (mut registry, file) = open("abc");
    let mut stack = CommandStack::new();
    stack.execute(&mut registry, Command::new(file, "Typing", InsertText::plain(3, "d")));

    let serializer = CommandSerializer::new();
    let mut history = capture(&stack, &serializer).unwrap();
    history.undo[0].payload["position"] = serde_json::json!(u64::MAX);

    let mut stack = restore(&history, file, StackConfig::default(), &serializer).unwrap().stack;
    assert!(stack.undo(&mut registry));
    assert_eq!(content_of(&registry, file).text(), "abcd");

    let diagnostics = stack.take_diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert!(matches!(diagnostics[0].error, EditError::OutOfRangePosition { .. }));
}

#[tokio::test]
async fn history_survives_reopening_the_document() {
    init_tracing();
    let temp_dir = TempDir::new().unwrap();
    let settings = HistorySettings::default();
    let history_file = HistoryFile::for_document(temp_dir.path().join("letter.rtd"), &settings);
    let serializer = CommandSerializer::new();

    let (mut registry, file) = open("Dear team,");
    {
        let mut stack = CommandStack::with_config(settings.stack.clone());
        stack.execute(&mut registry, Command::new(file, "Typing", InsertText::plain(10, "\nThanks")));
        let content = content_of(&registry, file);
        let bold = ApplyFormat::over_range(&content, 0..4, &AttributeSet::bold()).unwrap();
        stack.execute(&mut registry, Command::new(file, "Bold", bold));
        let content = content_of(&registry, file);
        let delete = DeleteText::capture(&content, 4..10).unwrap();
        stack.execute(&mut registry, Command::new(file, "Delete", delete));
        stack.undo(&mut registry);

        history_file.save_stack(&stack, &serializer).await.unwrap();
    }
    assert!(history_file.path().ends_with("letter.rtd.history"));

    let loaded = history_file
        .load_stack(file, &settings, &serializer)
        .await
        .unwrap()
        .unwrap();
    assert!(loaded.is_complete());
    let mut stack = loaded.stack;
    assert_eq!(stack.undo_label(), Some("Bold"));
    assert_eq!(stack.redo_label(), Some("Delete"));

    stack.redo(&mut registry);
    assert_eq!(content_of(&registry, file).text(), "Dear\nThanks");

    while stack.undo(&mut registry) {}
    assert_eq!(content_of(&registry, file), DocumentContent::plain("Dear team,"));
    assert!(stack.take_diagnostics().is_empty());
}

#[test]
fn persisted_history_is_tagged_json() {
    let (mut registry, file) = open("abc");
    let mut stack = CommandStack::new();
    stack.execute(&mut registry, Command::new(file, "Typing", InsertText::plain(3, "d")));

    let history = capture(&stack, &CommandSerializer::new()).unwrap();
    let json = serde_json::to_value(&history).unwrap();

    assert_eq!(json["header"]["magic"], "RTC-HISTORY");
    assert_eq!(json["undo"][0]["kind"], "insertText");
    assert_eq!(json["undo"][0]["payload"]["insertedText"]["text"], "d");

    let parsed: PersistedHistory = serde_json::from_value(json).unwrap();
    assert_eq!(parsed, history);
}
