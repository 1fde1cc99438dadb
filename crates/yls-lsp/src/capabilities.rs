//! LSP capability negotiation.

use tower_lsp::lsp_types::{
    CodeActionProviderCapability, CompletionOptions, ExecuteCommandOptions,
    HoverProviderCapability, OneOf, ServerCapabilities, TextDocumentSyncCapability,
    TextDocumentSyncKind, TextDocumentSyncOptions,
};

/// The command name advertised for `workspace/executeCommand`, invoked by
/// the "Open external documentation" code action.
pub const OPEN_COMMAND: &str = "Open";

/// Get the server capabilities to report to the client.
pub fn server_capabilities() -> ServerCapabilities {
    ServerCapabilities {
        text_document_sync: Some(TextDocumentSyncCapability::Options(TextDocumentSyncOptions {
            open_close: Some(true),
            change: Some(TextDocumentSyncKind::FULL),
            will_save: None,
            will_save_wait_until: None,
            save: None,
        })),

        hover_provider: Some(HoverProviderCapability::Simple(true)),

        completion_provider: Some(CompletionOptions {
            trigger_characters: Some(vec![":".to_string()]),
            ..Default::default()
        }),

        code_action_provider: Some(CodeActionProviderCapability::Simple(true)),

        execute_command_provider: Some(ExecuteCommandOptions {
            commands: vec![OPEN_COMMAND.to_string()],
            ..Default::default()
        }),

        document_symbol_provider: None,
        definition_provider: Some(OneOf::Left(false)),
        ..Default::default()
    }
}
