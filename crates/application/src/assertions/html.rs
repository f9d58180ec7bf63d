//! CSS selector lookups over HTML bodies.

use scraper::{Html, Selector};
use thiserror::Error;

/// The selector could not be parsed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid CSS selector {selector}: {message}")]
pub struct SelectorError {
    /// Selector as written.
    pub selector: String,
    /// Parser message.
    pub message: String,
}

/// Returns the trimmed text of every element matching `selector`, in document order.
///
/// HTML parsing is lenient, so any body yields a document.
///
/// # Errors
///
/// Returns a [`SelectorError`] when the selector is malformed.
pub fn select_texts(body: &str, selector: &str) -> Result<Vec<String>, SelectorError> {
    let parsed = Selector::parse(selector).map_err(|e| SelectorError {
        selector: selector.to_string(),
        message: e.to_string(),
    })?;

    let document = Html::parse_document(body);
    Ok(document
        .select(&parsed)
        .map(|element| element.text().collect::<String>().trim().to_string())
        .collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PAGE: &str = r#"<html><body>
        <h1 class="title">  Welcome </h1>
        <ul><li>one</li><li> two </li></ul>
    </body></html>"#;

    #[test]
    fn test_select_texts() {
        assert_eq!(select_texts(PAGE, "h1.title").unwrap(), vec!["Welcome"]);
        assert_eq!(select_texts(PAGE, "li").unwrap(), vec!["one", "two"]);
        assert!(select_texts(PAGE, "table").unwrap().is_empty());
    }

    #[test]
    fn test_invalid_selector() {
        let err = select_texts(PAGE, "[[").unwrap_err();
        assert_eq!(err.selector, "[[");
    }
}
