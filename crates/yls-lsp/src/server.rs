//! LSP server implementation using tower-lsp.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tower_lsp::jsonrpc::{Error as RpcError, Result as RpcResult};
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer, LspService, Server};

use yls_catalog::{CatalogConfig, CatalogError, Resolver};
use yls_fetch::{DiskCache, Fetcher};
use yls_lsp_core::Engine;

use crate::capabilities::{server_capabilities, OPEN_COMMAND};
use crate::convert;

/// Schema-cache options accepted by [`run_server`], mirroring the CLI's own
/// cache flags so the server and the one-shot commands fetch and cache
/// schemas the same way.
#[derive(Debug, Clone, Default)]
pub struct ServerOptions {
    pub cache_dir: Option<PathBuf>,
    pub schema_cache_ttl: Option<Duration>,
    pub force_schema_fetch: bool,
}

fn internal_error(message: impl std::fmt::Display) -> RpcError {
    RpcError::invalid_params(message.to_string())
}

/// The yamlls language server.
///
/// Documents are tracked from `initialize` onward, but the schema resolver
/// -- and so the [`Engine`] that answers every document-aware request -- is
/// only built once `initialized` fires, since building it means fetching
/// the Kubernetes and CRD catalogs over the network. Requests that arrive
/// before that completes answer with their empty/`None` result rather than
/// erroring, since a client is free to send them the instant `initialize`
/// returns.
pub struct YamlLanguageServer {
    client: Client,
    options: ServerOptions,
    root: RwLock<Option<PathBuf>>,
    engine: RwLock<Option<Arc<Engine>>>,
}

impl YamlLanguageServer {
    fn new(client: Client, options: ServerOptions) -> Self {
        Self { client, options, root: RwLock::new(None), engine: RwLock::new(None) }
    }

    async fn engine(&self) -> Option<Arc<Engine>> {
        self.engine.read().await.clone()
    }

    async fn build_engine(&self, root: Option<PathBuf>) -> Result<Engine, CatalogError> {
        let config = match &root {
            Some(dir) => yls_config::load_from_dir(dir).unwrap_or_else(|error| {
                tracing::warn!(%error, "ignoring invalid workspace config");
                yls_config::Config::default()
            }),
            None => yls_config::Config::default(),
        };

        let mut builder = DiskCache::builder().force_fetch(self.options.force_schema_fetch);
        if let Some(dir) = &self.options.cache_dir {
            builder = builder.cache_dir(dir.clone());
        }
        if let Some(ttl) = self.options.schema_cache_ttl {
            builder = builder.ttl(ttl);
        }
        let fetcher: Arc<dyn Fetcher> = Arc::new(builder.build());

        let catalog_config = yls_config::apply_overrides(&CatalogConfig::default(), &config);
        let resolver = Resolver::build(fetcher, catalog_config).await?;
        Ok(Engine::new(Arc::new(resolver)))
    }

    async fn publish_diagnostics(&self, uri: Url) {
        let Some(engine) = self.engine().await else {
            return;
        };
        match engine.diagnostics(uri.as_str()).await {
            Ok(errors) => {
                let diagnostics = errors.iter().map(convert::validation_error_to_diagnostic).collect();
                self.client.publish_diagnostics(uri, diagnostics, None).await;
            }
            Err(error) => {
                self.client.log_message(MessageType::ERROR, format!("resolving schema failed: {error}")).await;
            }
        }
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for YamlLanguageServer {
    async fn initialize(&self, params: InitializeParams) -> RpcResult<InitializeResult> {
        let root = params
            .root_uri
            .as_ref()
            .and_then(|uri| uri.to_file_path().ok())
            .or_else(|| params.workspace_folders.as_ref().and_then(|folders| folders.first()).and_then(|f| f.uri.to_file_path().ok()));
        *self.root.write().await = root;

        Ok(InitializeResult {
            capabilities: server_capabilities(),
            server_info: Some(ServerInfo { name: "yamlls".to_string(), version: Some(env!("CARGO_PKG_VERSION").to_string()) }),
        })
    }

    async fn initialized(&self, _params: InitializedParams) {
        let root = self.root.read().await.clone();
        match self.build_engine(root).await {
            Ok(engine) => {
                *self.engine.write().await = Some(Arc::new(engine));
                self.client.log_message(MessageType::INFO, "yamlls schema catalogs ready").await;
            }
            Err(error) => {
                self.client.log_message(MessageType::ERROR, format!("failed to build schema catalogs: {error}")).await;
            }
        }
    }

    async fn shutdown(&self) -> RpcResult<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri.clone();
        let Some(engine) = self.engine().await else {
            tracing::warn!(uri = %uri, "dropping didOpen received before the schema catalogs finished loading");
            return;
        };
        engine.did_open(uri.as_str(), &params.text_document.text, params.text_document.version).await;
        self.publish_diagnostics(uri).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri.clone();
        let Some(engine) = self.engine().await else {
            tracing::warn!(uri = %uri, "dropping didChange received before the schema catalogs finished loading");
            return;
        };
        // Full document sync: only the last content change carries the text.
        if let Some(change) = params.content_changes.into_iter().next_back() {
            engine.did_change(uri.as_str(), &change.text, params.text_document.version).await;
            self.publish_diagnostics(uri).await;
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        if let Some(engine) = self.engine().await {
            engine.did_close(uri.as_str()).await;
        }
        self.client.publish_diagnostics(uri, Vec::new(), None).await;
    }

    async fn hover(&self, params: HoverParams) -> RpcResult<Option<Hover>> {
        let Some(engine) = self.engine().await else {
            return Ok(None);
        };
        let uri = params.text_document_position_params.text_document.uri;
        let pos = convert::position_to_core(params.text_document_position_params.position);
        let hover = engine.hover(uri.as_str(), pos).await.map_err(internal_error)?;
        Ok(hover.map(convert::hover_to_lsp))
    }

    async fn completion(&self, params: CompletionParams) -> RpcResult<Option<CompletionResponse>> {
        let Some(engine) = self.engine().await else {
            return Ok(None);
        };
        let uri = params.text_document_position.text_document.uri;
        let pos = convert::position_to_core(params.text_document_position.position);
        let items = engine.completion(uri.as_str(), pos).await.map_err(internal_error)?;
        if items.is_empty() {
            return Ok(None);
        }
        Ok(Some(CompletionResponse::Array(items.into_iter().map(convert::completion_item_to_lsp).collect())))
    }

    async fn code_action(&self, params: CodeActionParams) -> RpcResult<Option<CodeActionResponse>> {
        let Some(engine) = self.engine().await else {
            return Ok(None);
        };
        let uri = params.text_document.uri;
        let action = engine.code_action(uri.as_str()).await.map_err(internal_error)?;
        Ok(action.map(|a| vec![convert::external_docs_to_code_action(a)]))
    }

    async fn execute_command(&self, params: ExecuteCommandParams) -> RpcResult<Option<serde_json::Value>> {
        if params.command != OPEN_COMMAND {
            return Ok(None);
        }
        let Some(serde_json::Value::String(url)) = params.arguments.into_iter().next() else {
            return Err(RpcError::invalid_params("expected a single URL string argument"));
        };
        let uri = Url::parse(&url).map_err(internal_error)?;
        let _ = self
            .client
            .show_document(ShowDocumentParams { uri, external: Some(true), take_focus: Some(true), selection: None })
            .await;
        Ok(None)
    }
}

/// Run the LSP server over stdio.
pub async fn run_server(options: ServerOptions) {
    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(move |client| YamlLanguageServer::new(client, options));
    Server::new(stdin, stdout, socket).serve(service).await;
}
