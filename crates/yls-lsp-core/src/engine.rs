use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{RwLock, Semaphore};

use yls_catalog::{CatalogError, Resolver};
use yls_validate::{extract_kind_api_version, extract_schema_modeline, validate_file, ValidationError};
use yls_yaml::{split_documents, Position};

use crate::code_action::{external_docs_action, ExternalDocsAction};
use crate::completion::{completion_at, CompletionItem};
use crate::document::DocumentStore;
use crate::hover::{hover_at, HoverResult};

/// Bound on concurrent request dispatch, mirroring the teacher's own
/// `FD_CONCURRENCY_LIMIT` pattern for capping concurrent async work; the
/// spec's own suggested value for the LSP's worker pool is 4.
pub const DISPATCH_CONCURRENCY_LIMIT: usize = 4;

/// Ties the document store to the schema resolver and answers every LSP
/// request the core supports. Read-only over the resolver once built;
/// document mutation is funnelled through a single `RwLock`, giving
/// per-URI update ordering for free.
pub struct Engine {
    resolver: Arc<Resolver>,
    documents: Arc<RwLock<DocumentStore>>,
    dispatch: Arc<Semaphore>,
}

impl Engine {
    #[must_use]
    pub fn new(resolver: Arc<Resolver>) -> Self {
        Self::with_concurrency(resolver, DISPATCH_CONCURRENCY_LIMIT)
    }

    #[must_use]
    pub fn with_concurrency(resolver: Arc<Resolver>, max_concurrent: usize) -> Self {
        Self {
            resolver,
            documents: Arc::new(RwLock::new(DocumentStore::new())),
            dispatch: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    pub async fn did_open(&self, uri: &str, text: &str, version: i32) {
        self.documents.write().await.open(uri, text, version);
    }

    pub async fn did_change(&self, uri: &str, text: &str, version: i32) {
        self.documents.write().await.change(uri, text, version);
    }

    pub async fn did_close(&self, uri: &str) {
        self.documents.write().await.close(uri);
    }

    async fn document_text(&self, uri: &str) -> Option<String> {
        self.documents.read().await.get(uri).map(|d| d.text().to_string())
    }

    async fn filename(&self, uri: &str) -> Option<String> {
        self.documents.read().await.get(uri).map(|d| d.filename().to_string())
    }

    /// Run validation for the document currently stored at `uri`, resolving
    /// a schema per embedded document (a multi-document file may carry
    /// distinct `kind`/`apiVersion` pairs) before handing off to the
    /// synchronous, I/O-free validator.
    ///
    /// # Errors
    ///
    /// Returns an error only if a catalog fetch performed while resolving a
    /// schema fails; a document with no resolvable schema is not an error
    /// (it surfaces as a `no_schema_found` warning from the validator).
    pub async fn diagnostics(&self, uri: &str) -> Result<Vec<ValidationError>, CatalogError> {
        let _permit = self.dispatch.acquire().await.expect("dispatch semaphore closed");
        let Some(text) = self.document_text(uri).await else {
            return Ok(Vec::new());
        };

        let mut schemas: HashMap<(String, String), Value> = HashMap::new();
        for doc in split_documents(&text) {
            let Some((kind, api_version)) = extract_kind_api_version(doc.text) else {
                continue;
            };
            if schemas.contains_key(&(kind.clone(), api_version.clone())) {
                continue;
            }
            if let Some(schema) = self.resolve_kind_api_version(&kind, &api_version).await? {
                schemas.insert((kind, api_version), schema);
            }
        }

        Ok(validate_file(&text, |kind, api_version| {
            schemas.get(&(kind.to_string(), api_version.to_string())).cloned()
        }))
    }

    async fn resolve_kind_api_version(&self, kind: &str, api_version: &str) -> Result<Option<Value>, CatalogError> {
        let Some(url) = self.resolver.schema_url_for_kind_apiversion(kind, api_version).await else {
            return Ok(None);
        };
        Ok(Some(self.resolver.schema_bytes(&url).await?))
    }

    /// Resolve the schema that applies to the whole document at `uri`: an
    /// explicit `# yaml-language-server: $schema=` modeline first, then the
    /// `kind`/`apiVersion` of its first document, otherwise a
    /// filename-pattern match. Used by hover, completion, and code actions,
    /// which (unlike validation) answer against a single schema per
    /// request rather than per embedded document.
    async fn primary_schema(&self, uri: &str, text: &str) -> Result<Option<(Value, String)>, CatalogError> {
        let Some(doc) = split_documents(text).into_iter().next() else {
            return Ok(None);
        };

        if let Some(url) = extract_schema_modeline(doc.text) {
            let schema = self.resolver.schema_bytes(&url).await?;
            return Ok(Some((schema, url)));
        }

        if let Some((kind, api_version)) = extract_kind_api_version(doc.text)
            && let Some(url) = self.resolver.schema_url_for_kind_apiversion(&kind, &api_version).await
        {
            let schema = self.resolver.schema_bytes(&url).await?;
            return Ok(Some((schema, url)));
        }

        let Some(filename) = self.filename(uri).await else {
            return Ok(None);
        };
        let Some(url) = self.resolver.schema_url_for_filename(&filename).await else {
            return Ok(None);
        };
        let schema = self.resolver.schema_bytes(&url).await?;
        Ok(Some((schema, url)))
    }

    /// # Errors
    ///
    /// Returns an error if resolving the document's schema requires a
    /// catalog fetch that fails.
    pub async fn hover(&self, uri: &str, pos: Position) -> Result<Option<HoverResult>, CatalogError> {
        let _permit = self.dispatch.acquire().await.expect("dispatch semaphore closed");
        let Some(text) = self.document_text(uri).await else {
            return Ok(None);
        };
        let Some((schema, _url)) = self.primary_schema(uri, &text).await? else {
            return Ok(None);
        };
        Ok(hover_at(&text, &schema, pos))
    }

    /// # Errors
    ///
    /// Returns an error if resolving the document's schema requires a
    /// catalog fetch that fails.
    pub async fn completion(&self, uri: &str, pos: Position) -> Result<Vec<CompletionItem>, CatalogError> {
        let _permit = self.dispatch.acquire().await.expect("dispatch semaphore closed");
        let Some(text) = self.document_text(uri).await else {
            return Ok(Vec::new());
        };
        let Some((schema, _url)) = self.primary_schema(uri, &text).await? else {
            return Ok(Vec::new());
        };
        Ok(completion_at(&text, &schema, pos))
    }

    /// # Errors
    ///
    /// Returns an error if resolving the document's schema requires a
    /// catalog fetch that fails.
    pub async fn code_action(&self, uri: &str) -> Result<Option<ExternalDocsAction>, CatalogError> {
        let _permit = self.dispatch.acquire().await.expect("dispatch semaphore closed");
        let Some(text) = self.document_text(uri).await else {
            return Ok(None);
        };
        let url = self.primary_schema(uri, &text).await?.map(|(_, url)| url);
        Ok(external_docs_action(url.as_deref()))
    }

    /// Rebuild the schema catalogs, discarding the memoised schema bytes.
    ///
    /// # Errors
    ///
    /// Returns an error (leaving the previous catalogs in place) if any
    /// catalog fetch fails during the rebuild.
    pub async fn refresh(&self) -> Result<(), CatalogError> {
        self.resolver.refresh().await
    }
}
