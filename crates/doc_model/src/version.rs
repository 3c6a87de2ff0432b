//! Versioned files
//!
//! A file owns an ordered collection of versions and a pointer to the current
//! one. Versions are stored sorted ascending by `version_number` and the
//! current index always refers to that same order; nothing in this module
//! ever indexes by insertion order.

use crate::{ContentCodec, DocModelError, DocumentContent, FileId, Result};
use chrono::{DateTime, Utc};
use std::sync::{Arc, OnceLock};

/// One snapshot of a file's content
#[derive(Debug, Clone)]
pub struct Version {
    version_number: u64,
    created: DateTime<Utc>,
    /// Encoded content, the persisted form
    encoded: Vec<u8>,
    /// Plain-text shadow of the encoded content
    plain_text: String,
    /// Decoded content, filled on first read
    decoded: OnceLock<DocumentContent>,
}

impl Version {
    /// Encode content into a new version
    pub fn new(version_number: u64, content: DocumentContent, codec: &dyn ContentCodec) -> Result<Self> {
        let encoded = codec.encode(&content)?;
        Ok(Self {
            version_number,
            created: Utc::now(),
            encoded,
            plain_text: content.text().to_string(),
            decoded: OnceLock::from(content),
        })
    }

    /// Rebuild a version from its persisted form; decoding is deferred
    pub fn from_encoded(
        version_number: u64,
        created: DateTime<Utc>,
        encoded: Vec<u8>,
        plain_text: impl Into<String>,
    ) -> Self {
        Self {
            version_number,
            created,
            encoded,
            plain_text: plain_text.into(),
            decoded: OnceLock::new(),
        }
    }

    pub fn version_number(&self) -> u64 {
        self.version_number
    }

    pub fn created(&self) -> DateTime<Utc> {
        self.created
    }

    pub fn encoded(&self) -> &[u8] {
        &self.encoded
    }

    pub fn plain_text(&self) -> &str {
        &self.plain_text
    }

    /// Decoded content, cached after the first successful decode
    pub fn content(&self, codec: &dyn ContentCodec) -> Result<&DocumentContent> {
        if let Some(content) = self.decoded.get() {
            return Ok(content);
        }
        let content = codec.decode(&self.encoded, &self.plain_text)?;
        Ok(self.decoded.get_or_init(|| content))
    }

    fn replace_content(&mut self, content: DocumentContent, codec: &dyn ContentCodec) -> Result<()> {
        self.encoded = codec.encode(&content)?;
        self.plain_text = content.text().to_string();
        self.decoded = OnceLock::from(content);
        Ok(())
    }
}

/// A document file with its version history
#[derive(Clone)]
pub struct VersionedFile {
    id: FileId,
    name: String,
    /// Sorted ascending by version number
    versions: Vec<Version>,
    current_version_index: usize,
    modified: DateTime<Utc>,
    codec: Arc<dyn ContentCodec>,
}

impl std::fmt::Debug for VersionedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VersionedFile")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("versions", &self.versions.len())
            .field("current_version_index", &self.current_version_index)
            .field("modified", &self.modified)
            .finish()
    }
}

impl VersionedFile {
    /// Create a file whose first version holds `content`
    pub fn new(name: impl Into<String>, content: DocumentContent, codec: Arc<dyn ContentCodec>) -> Result<Self> {
        let first = Version::new(1, content, codec.as_ref())?;
        Ok(Self {
            id: FileId::new(),
            name: name.into(),
            versions: vec![first],
            current_version_index: 0,
            modified: Utc::now(),
            codec,
        })
    }

    /// Rebuild a file from versions in arbitrary storage order.
    /// The versions are sorted before the current one is looked up.
    pub fn from_versions(
        id: FileId,
        name: impl Into<String>,
        mut versions: Vec<Version>,
        current_version_number: u64,
        codec: Arc<dyn ContentCodec>,
    ) -> Result<Self> {
        versions.sort_by_key(|version| version.version_number);
        if let Some(pair) = versions
            .windows(2)
            .find(|pair| pair[0].version_number == pair[1].version_number)
        {
            return Err(DocModelError::DuplicateVersion(pair[0].version_number));
        }

        let current_version_index = versions
            .binary_search_by_key(&current_version_number, |version| version.version_number)
            .map_err(|_| DocModelError::VersionNotFound(current_version_number))?;

        Ok(Self {
            id,
            name: name.into(),
            versions,
            current_version_index,
            modified: Utc::now(),
            codec,
        })
    }

    pub fn id(&self) -> FileId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn modified(&self) -> DateTime<Utc> {
        self.modified
    }

    pub fn codec(&self) -> &dyn ContentCodec {
        self.codec.as_ref()
    }

    /// All versions, ascending by version number
    pub fn versions(&self) -> &[Version] {
        &self.versions
    }

    pub fn version_count(&self) -> usize {
        self.versions.len()
    }

    /// Index of the current version within [`Self::versions`]
    pub fn current_version_index(&self) -> usize {
        self.current_version_index
    }

    pub fn current_version(&self) -> &Version {
        &self.versions[self.current_version_index]
    }

    pub fn version(&self, version_number: u64) -> Option<&Version> {
        self.index_of(version_number).map(|index| &self.versions[index])
    }

    fn index_of(&self, version_number: u64) -> Option<usize> {
        self.versions
            .binary_search_by_key(&version_number, |version| version.version_number)
            .ok()
    }

    /// Decoded content of the current version
    pub fn current_content(&self) -> Result<DocumentContent> {
        self.current_version().content(self.codec.as_ref()).cloned()
    }

    /// Replace the current version's content. Only the latest version is
    /// editable; older ones are frozen once a newer version exists.
    pub fn set_current_content(&mut self, content: DocumentContent) -> Result<()> {
        let index = self.current_version_index;
        if index + 1 < self.versions.len() {
            return Err(DocModelError::SupersededVersion(self.versions[index].version_number));
        }
        self.versions[index].replace_content(content, self.codec.as_ref())
    }

    /// Stamp the file as modified now
    pub fn touch_modified(&mut self) {
        self.modified = Utc::now();
    }

    /// Append a new version numbered after the latest one and make it current
    pub fn create_version(&mut self, content: DocumentContent) -> Result<u64> {
        let next = self
            .versions
            .last()
            .map(|version| version.version_number + 1)
            .unwrap_or(1);
        self.versions.push(Version::new(next, content, self.codec.as_ref())?);
        self.current_version_index = self.versions.len() - 1;
        self.touch_modified();
        Ok(next)
    }

    /// Insert a version at its sorted position. The current version stays
    /// the same version, even if its index shifts.
    pub fn insert_version(&mut self, version: Version) -> Result<()> {
        let at = match self
            .versions
            .binary_search_by_key(&version.version_number, |existing| existing.version_number)
        {
            Ok(_) => return Err(DocModelError::DuplicateVersion(version.version_number)),
            Err(at) => at,
        };

        self.versions.insert(at, version);
        if at <= self.current_version_index {
            self.current_version_index += 1;
        }
        Ok(())
    }

    /// Make the version with `version_number` current
    pub fn select_version(&mut self, version_number: u64) -> Result<()> {
        let index = self
            .index_of(version_number)
            .ok_or(DocModelError::VersionNotFound(version_number))?;
        self.current_version_index = index;
        Ok(())
    }

    /// Step to the next older version. Returns false at the oldest.
    pub fn go_back(&mut self) -> bool {
        if self.current_version_index == 0 {
            return false;
        }
        self.current_version_index -= 1;
        true
    }

    /// Step to the next newer version. Returns false at the newest.
    pub fn go_forward(&mut self) -> bool {
        if self.current_version_index + 1 >= self.versions.len() {
            return false;
        }
        self.current_version_index += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BinaryContentCodec;
    use proptest::prelude::*;

    fn codec() -> Arc<dyn ContentCodec> {
        Arc::new(BinaryContentCodec)
    }

    fn version(number: u64) -> Version {
        Version::new(number, DocumentContent::plain(format!("v{}", number)), &BinaryContentCodec).unwrap()
    }

    fn assert_consistent(file: &VersionedFile) {
        assert!(file.current_version_index() < file.version_count());
        assert!(file
            .versions()
            .windows(2)
            .all(|pair| pair[0].version_number() < pair[1].version_number()));
    }

    #[test]
    fn test_create_version_becomes_current() {
        let mut file = VersionedFile::new("Notes", DocumentContent::plain("one"), codec()).unwrap();
        let number = file.create_version(DocumentContent::plain("two")).unwrap();

        assert_eq!(number, 2);
        assert_eq!(file.current_version_index(), 1);
        assert_eq!(file.current_content().unwrap().text(), "two");
    }

    #[test]
    fn test_from_versions_sorts_before_indexing() {
        let file = VersionedFile::from_versions(
            FileId::new(),
            "Draft",
            vec![version(7), version(2), version(5)],
            5,
            codec(),
        )
        .unwrap();

        assert_eq!(file.current_version_index(), 1);
        assert_eq!(file.current_version().version_number(), 5);
        assert_eq!(file.current_content().unwrap().text(), "v5");
    }

    #[test]
    fn test_from_versions_rejects_duplicates() {
        let result = VersionedFile::from_versions(FileId::new(), "Draft", vec![version(3), version(3)], 3, codec());
        assert!(matches!(result, Err(DocModelError::DuplicateVersion(3))));
    }

    #[test]
    fn test_insert_version_keeps_current_version() {
        let mut file =
            VersionedFile::from_versions(FileId::new(), "Draft", vec![version(4), version(8)], 8, codec()).unwrap();

        file.insert_version(version(1)).unwrap();
        assert_eq!(file.current_version().version_number(), 8);
        assert_eq!(file.current_version_index(), 2);

        assert!(file.insert_version(version(4)).is_err());
    }

    #[test]
    fn test_navigation_stops_at_ends() {
        let mut file = VersionedFile::new("Notes", DocumentContent::plain("one"), codec()).unwrap();
        file.create_version(DocumentContent::plain("two")).unwrap();

        assert!(!file.go_forward());
        assert!(file.go_back());
        assert!(!file.go_back());
        assert_eq!(file.current_content().unwrap().text(), "one");
    }

    #[test]
    fn test_set_current_content_only_touches_current_version() {
        let mut file = VersionedFile::new("Notes", DocumentContent::plain("one"), codec()).unwrap();
        file.create_version(DocumentContent::plain("two")).unwrap();
        file.set_current_content(DocumentContent::plain("two, edited")).unwrap();

        assert_eq!(file.current_version().plain_text(), "two, edited");
        assert_eq!(file.version(1).unwrap().plain_text(), "one");
    }

    #[test]
    fn test_superseded_version_is_read_only() {
        let mut file = VersionedFile::new("Notes", DocumentContent::plain("v1"), codec()).unwrap();
        file.create_version(DocumentContent::plain("v2")).unwrap();
        assert!(file.go_back());

        let result = file.set_current_content(DocumentContent::plain("v1!"));
        assert!(matches!(result, Err(DocModelError::SupersededVersion(1))));
        assert_eq!(file.current_content().unwrap().text(), "v1");

        assert!(file.go_forward());
        file.set_current_content(DocumentContent::plain("v2!")).unwrap();
        assert_eq!(file.current_content().unwrap().text(), "v2!");
    }

    #[test]
    fn test_lazy_decode_from_encoded() {
        let content = DocumentContent::plain("stored");
        let bytes = BinaryContentCodec.encode(&content).unwrap();
        let version = Version::from_encoded(1, Utc::now(), bytes, "stored");

        assert_eq!(version.content(&BinaryContentCodec).unwrap(), &content);
    }

    #[derive(Debug, Clone)]
    enum NavOp {
        Create,
        Insert(u64),
        Back,
        Forward,
        Select(u64),
    }

    fn nav_op() -> impl Strategy<Value = NavOp> {
        prop_oneof![
            Just(NavOp::Create),
            (1u64..200).prop_map(NavOp::Insert),
            Just(NavOp::Back),
            Just(NavOp::Forward),
            (1u64..200).prop_map(NavOp::Select),
        ]
    }

    proptest! {
        #[test]
        fn prop_current_index_tracks_sorted_order(ops in proptest::collection::vec(nav_op(), 1..40)) {
            let mut file = VersionedFile::new("Prop", DocumentContent::plain("v1"), codec()).unwrap();

            for op in ops {
                let before = file.current_version().version_number();
                match op {
                    NavOp::Create => {
                        file.create_version(DocumentContent::plain("new")).unwrap();
                    }
                    NavOp::Insert(number) => {
                        if file.insert_version(version(number)).is_ok() {
                            prop_assert_eq!(file.current_version().version_number(), before);
                        }
                    }
                    NavOp::Back => {
                        file.go_back();
                    }
                    NavOp::Forward => {
                        file.go_forward();
                    }
                    NavOp::Select(number) => {
                        let _ = file.select_version(number);
                    }
                }

                assert_consistent(&file);
                let mut numbers: Vec<u64> = file.versions().iter().map(|v| v.version_number()).collect();
                numbers.sort_unstable();
                prop_assert_eq!(
                    file.current_version().version_number(),
                    numbers[file.current_version_index()]
                );
            }
        }
    }
}
