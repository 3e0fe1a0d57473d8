//! The register-independent search query.

use serde::{Deserialize, Serialize};

/// Default number of results per page.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// A paginated register search.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    /// Free text, usually a charity name. `None` lists the register.
    pub text: Option<String>,
    /// Page number (1-indexed). Defaults to 1.
    pub page: u32,
    /// Results per page. Registers with a fixed page size ignore this.
    pub page_size: u32,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            text: None,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl SearchQuery {
    /// A first-page query for the given text.
    pub fn text(text: impl Into<String>) -> Self {
        Self::default().with_text(text)
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Sets the page number. Page 0 is treated as page 1.
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    /// Sets the page size. A size of 0 is treated as the default.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = if page_size == 0 {
            DEFAULT_PAGE_SIZE
        } else {
            page_size
        };
        self
    }

    /// The search text with surrounding whitespace removed, if any is left.
    pub fn trimmed_text(&self) -> Option<&str> {
        self.text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let q = SearchQuery::default();
        assert_eq!(q.page, 1);
        assert_eq!(q.page_size, DEFAULT_PAGE_SIZE);
        assert!(q.text.is_none());
    }

    #[test]
    fn builders_clamp_zero() {
        let q = SearchQuery::text("x").with_page(0).with_page_size(0);
        assert_eq!(q.page, 1);
        assert_eq!(q.page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn blank_text_is_no_text() {
        assert_eq!(SearchQuery::text("   ").trimmed_text(), None);
        assert_eq!(SearchQuery::text(" oxfam ").trimmed_text(), Some("oxfam"));
    }
}
