use std::collections::HashMap;

/// An open document: its text, LSP version, and the URI it was opened
/// under.
#[derive(Debug, Clone)]
pub struct Document {
    uri: String,
    text: String,
    version: i32,
}

impl Document {
    #[must_use]
    pub fn new(uri: impl Into<String>, text: impl Into<String>, version: i32) -> Self {
        Self { uri: uri.into(), text: text.into(), version }
    }

    #[must_use]
    pub fn uri(&self) -> &str {
        &self.uri
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn version(&self) -> i32 {
        self.version
    }

    /// The filename portion of the URI, used to match file-pattern
    /// catalog globs.
    #[must_use]
    pub fn filename(&self) -> &str {
        self.uri.rsplit(['/', '\\']).next().unwrap_or(&self.uri)
    }
}

/// The set of currently-open documents, keyed by URI. Mutated only by
/// `did_open`/`did_change`/`did_close` handlers.
#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: HashMap<String, Document>,
}

impl DocumentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, uri: impl Into<String>, text: impl Into<String>, version: i32) {
        let uri = uri.into();
        self.documents.insert(uri.clone(), Document::new(uri, text, version));
    }

    pub fn change(&mut self, uri: &str, text: impl Into<String>, version: i32) {
        if let Some(doc) = self.documents.get_mut(uri) {
            doc.text = text.into();
            doc.version = version;
        }
    }

    pub fn close(&mut self, uri: &str) {
        self.documents.remove(uri);
    }

    #[must_use]
    pub fn get(&self, uri: &str) -> Option<&Document> {
        self.documents.get(uri)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
