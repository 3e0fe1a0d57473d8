use serde::{Deserialize, Serialize};

/// One page of results from a register search.
///
/// `total_pages` is derived from `total` and `page_size` whenever the
/// register reports a true total. Registers that only report a page count
/// produce an estimated `total` (`total_is_estimate` is then `true`).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
    pub total_is_estimate: bool,
}

impl<T> SearchResult<T> {
    /// A page backed by a true total item count.
    pub fn new(items: Vec<T>, total: u64, page: u32, page_size: u32) -> Self {
        Self {
            items,
            total,
            page,
            page_size,
            total_pages: pages_for(total, page_size),
            total_is_estimate: false,
        }
    }

    /// A page from a source that only reports its page count. The total is
    /// approximated as `total_pages * page_size`.
    pub fn estimated(items: Vec<T>, total_pages: u32, page: u32, page_size: u32) -> Self {
        Self {
            items,
            total: u64::from(total_pages) * u64::from(page_size),
            page,
            page_size,
            total_pages,
            total_is_estimate: true,
        }
    }

    /// An empty page that keeps the requested page number.
    pub fn empty(page: u32, page_size: u32) -> Self {
        Self::new(Vec::new(), 0, page, page_size)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

fn pages_for(total: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    let pages = total.div_ceil(u64::from(page_size));
    u32::try_from(pages).unwrap_or(u32::MAX)
}
