/// The one code action this server offers: open the resolved schema's
/// published documentation externally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalDocsAction {
    pub title: String,
    pub url: String,
}

/// Build the "open external documentation" code action for a resolved
/// schema URL, if one was found for the current document.
#[must_use]
pub fn external_docs_action(schema_url: Option<&str>) -> Option<ExternalDocsAction> {
    let url = schema_url?;
    Some(ExternalDocsAction { title: "Open external documentation".to_string(), url: url.to_string() })
}
