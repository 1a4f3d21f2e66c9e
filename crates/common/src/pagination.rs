//! Pagination parameters shared by listing actions and HTTP query strings.

use serde::Deserialize;

/// 1-based page index plus page size, as sent by list screens.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
}

impl Pagination {
    pub const MAX_PER_PAGE: u32 = 100;

    /// Clamp to sane bounds and return `(zero_based_page, per_page)`.
    pub fn normalize(self) -> (u64, u64) {
        let page = self.page.max(1);
        let per_page = self.per_page.clamp(1, Self::MAX_PER_PAGE);
        ((page - 1) as u64, per_page as u64)
    }

    /// Normalized 1-based page, for echoing back in responses.
    pub fn page_number(self) -> u32 {
        self.page.max(1)
    }
}

impl Default for Pagination {
    fn default() -> Self { Self { page: 1, per_page: 20 } }
}
