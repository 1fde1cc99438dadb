//! Conversions between `yamlls`'s own coordinate/result types and
//! `tower_lsp::lsp_types`. Kept as free functions at this one boundary so
//! the core crate never has to know anything about the wire protocol.

use tower_lsp::lsp_types::{self, Diagnostic, DiagnosticSeverity};

use yls_lsp_core::{CompletionItem, ExternalDocsAction, HoverResult};
use yls_validate::{Severity, ValidationError};
use yls_yaml::{Position, Range};

pub fn position_to_core(pos: lsp_types::Position) -> Position {
    Position::new(pos.line, pos.character)
}

pub fn position_to_lsp(pos: Position) -> lsp_types::Position {
    lsp_types::Position::new(pos.line, pos.character)
}

pub fn range_to_lsp(range: Range) -> lsp_types::Range {
    lsp_types::Range::new(position_to_lsp(range.start), position_to_lsp(range.end))
}

pub fn severity_to_lsp(severity: Severity) -> DiagnosticSeverity {
    match severity {
        Severity::Error => DiagnosticSeverity::ERROR,
        Severity::Warning => DiagnosticSeverity::WARNING,
    }
}

pub fn validation_error_to_diagnostic(error: &ValidationError) -> Diagnostic {
    Diagnostic {
        range: range_to_lsp(error.range),
        severity: Some(severity_to_lsp(error.severity)),
        code: Some(lsp_types::NumberOrString::String(error.kind.clone())),
        code_description: None,
        source: Some("yamlls".to_string()),
        message: error.message.clone(),
        related_information: None,
        tags: None,
        data: None,
    }
}

pub fn hover_to_lsp(hover: HoverResult) -> lsp_types::Hover {
    lsp_types::Hover {
        contents: lsp_types::HoverContents::Markup(lsp_types::MarkupContent {
            kind: lsp_types::MarkupKind::Markdown,
            value: hover.markdown,
        }),
        range: Some(range_to_lsp(hover.range)),
    }
}

pub fn completion_item_to_lsp(item: CompletionItem) -> lsp_types::CompletionItem {
    lsp_types::CompletionItem {
        label: item.label,
        kind: Some(lsp_types::CompletionItemKind::PROPERTY),
        detail: item.detail,
        ..Default::default()
    }
}

/// Build the `workspace/executeCommand` command that backs the
/// "open external documentation" code action, carrying the resolved schema
/// URL as its sole argument.
pub fn external_docs_to_code_action(action: ExternalDocsAction) -> lsp_types::CodeActionOrCommand {
    lsp_types::CodeActionOrCommand::CodeAction(lsp_types::CodeAction {
        title: action.title,
        kind: Some(lsp_types::CodeActionKind::EMPTY),
        diagnostics: None,
        edit: None,
        command: Some(lsp_types::Command {
            title: "Open external documentation".to_string(),
            command: crate::capabilities::OPEN_COMMAND.to_string(),
            arguments: Some(vec![serde_json::Value::String(action.url)]),
        }),
        is_preferred: None,
        disabled: None,
        data: None,
    })
}
