//! Document version store
//!
//! Commands reach a document only through [`VersionStore`], addressing it by
//! [`FileId`]. The registry owns the files; a handle whose file has been
//! closed resolves to [`DocModelError::FileNotFound`].

use crate::{BinaryContentCodec, ContentCodec, DocModelError, DocumentContent, FileId, Result, VersionedFile};
use std::collections::HashMap;
use std::sync::Arc;

/// The three operations commands may perform on a target document
pub trait VersionStore {
    /// Content of the file's current version
    fn current_content(&self, file: FileId) -> Result<DocumentContent>;

    /// Replace the content of the file's current version
    fn set_current_content(&mut self, file: FileId, content: DocumentContent) -> Result<()>;

    /// Stamp the file as modified
    fn touch_modified(&mut self, file: FileId) -> Result<()>;
}

/// Owns the open files of a session
pub struct DocumentRegistry {
    files: HashMap<FileId, VersionedFile>,
    codec: Arc<dyn ContentCodec>,
}

impl DocumentRegistry {
    /// Create a registry using the default content codec
    pub fn new() -> Self {
        Self::with_codec(Arc::new(BinaryContentCodec))
    }

    pub fn with_codec(codec: Arc<dyn ContentCodec>) -> Self {
        Self {
            files: HashMap::new(),
            codec,
        }
    }

    pub fn codec(&self) -> Arc<dyn ContentCodec> {
        Arc::clone(&self.codec)
    }

    /// Create a new file holding `content` and return its handle
    pub fn open(&mut self, name: impl Into<String>, content: DocumentContent) -> Result<FileId> {
        let file = VersionedFile::new(name, content, self.codec())?;
        Ok(self.insert(file))
    }

    /// Take ownership of an existing file
    pub fn insert(&mut self, file: VersionedFile) -> FileId {
        let id = file.id();
        self.files.insert(id, file);
        id
    }

    /// Close a file. Outstanding handles to it become stale.
    pub fn close(&mut self, id: FileId) -> Option<VersionedFile> {
        let closed = self.files.remove(&id);
        if closed.is_some() {
            tracing::debug!("Closed file {}", id);
        }
        closed
    }

    pub fn get(&self, id: FileId) -> Option<&VersionedFile> {
        self.files.get(&id)
    }

    pub fn get_mut(&mut self, id: FileId) -> Option<&mut VersionedFile> {
        self.files.get_mut(&id)
    }

    pub fn contains(&self, id: FileId) -> bool {
        self.files.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    fn resolve_mut(&mut self, id: FileId) -> Result<&mut VersionedFile> {
        self.files.get_mut(&id).ok_or(DocModelError::FileNotFound(id))
    }
}

impl Default for DocumentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl VersionStore for DocumentRegistry {
    fn current_content(&self, file: FileId) -> Result<DocumentContent> {
        self.files
            .get(&file)
            .ok_or(DocModelError::FileNotFound(file))?
            .current_content()
    }

    fn set_current_content(&mut self, file: FileId, content: DocumentContent) -> Result<()> {
        self.resolve_mut(file)?.set_current_content(content)
    }

    fn touch_modified(&mut self, file: FileId) -> Result<()> {
        self.resolve_mut(file)?.touch_modified();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AttributeSet;

    #[test]
    fn test_open_and_read_content() {
        let mut registry = DocumentRegistry::new();
        let content = DocumentContent::styled("Hello", AttributeSet::bold());
        let id = registry.open("Hello.doc", content.clone()).unwrap();

        assert!(registry.contains(id));
        assert_eq!(registry.current_content(id).unwrap(), content);
    }

    #[test]
    fn test_set_content_and_touch() {
        let mut registry = DocumentRegistry::new();
        let id = registry.open("Doc", DocumentContent::plain("a")).unwrap();
        let before = registry.get(id).unwrap().modified();

        registry.set_current_content(id, DocumentContent::plain("b")).unwrap();
        registry.touch_modified(id).unwrap();

        assert_eq!(registry.current_content(id).unwrap().text(), "b");
        assert!(registry.get(id).unwrap().modified() >= before);
    }

    #[test]
    fn test_closed_handle_is_stale() {
        let mut registry = DocumentRegistry::new();
        let id = registry.open("Doc", DocumentContent::plain("a")).unwrap();
        assert!(registry.close(id).is_some());

        assert!(matches!(registry.current_content(id), Err(DocModelError::FileNotFound(_))));
        assert!(matches!(
            registry.set_current_content(id, DocumentContent::new()),
            Err(DocModelError::FileNotFound(_))
        ));
        assert!(registry.touch_modified(id).is_err());
    }
}
