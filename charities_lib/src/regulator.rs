//! The operations every regulator client offers.

use async_trait::async_trait;
use charities_api::types::{Charity, FinancialYear, OtherRegulator, Regulator, SearchResult, Trustee};
use charities_api::{AuthProvider, Error, RequestCore, SearchQuery, TransportResponse};
use serde_json::Value;

use crate::normalize::is_placeholder;

/// A client for one charity register.
///
/// All three registers expose the same six operations. Where a register has
/// no equivalent endpoint the operation returns an empty result of the right
/// shape and logs a warning; it never fails for that reason.
#[async_trait]
pub trait CharityRegulator: Send + Sync {
    fn regulator(&self) -> Regulator;

    /// One page of charities matching the query.
    async fn search(&self, query: &SearchQuery) -> Result<SearchResult<Charity>, Error>;

    /// A single charity, or `None` if the register has no such record.
    ///
    /// Accepts the identifier with or without its canonical prefix.
    async fn get_charity(&self, id: &str) -> Result<Option<Charity>, Error>;

    /// First page of charities whose name matches `name`.
    async fn search_by_name(&self, name: &str) -> Result<SearchResult<Charity>, Error> {
        self.search(&SearchQuery::text(name)).await
    }

    async fn get_trustees(&self, id: &str) -> Result<Vec<Trustee>, Error>;

    async fn get_financial_history(&self, id: &str) -> Result<Vec<FinancialYear>, Error>;

    async fn get_other_regulators(&self, id: &str) -> Result<Vec<OtherRegulator>, Error>;

    /// Drops every cached response held by this client.
    fn clear_cache(&self);
}

/// Logs that `method` has no upstream equivalent on `regulator`.
pub(crate) fn unsupported(regulator: Regulator, method: &str) {
    tracing::warn!(
        regulator = %regulator,
        method,
        "{} does not support {}; returning an empty result",
        regulator,
        method
    );
}

/// Empty list for an unsupported list operation.
pub(crate) fn unsupported_list<T>(regulator: Regulator, method: &str) -> Vec<T> {
    unsupported(regulator, method);
    Vec::new()
}

/// Empty page, keeping the requested page number, for an unsupported search.
pub(crate) fn unsupported_page<T>(
    regulator: Regulator,
    method: &str,
    query: &SearchQuery,
) -> SearchResult<T> {
    unsupported(regulator, method);
    SearchResult::empty(query.page, query.page_size)
}

/// Recovers a single-entity lookup: 404 becomes `None`, anything else propagates.
pub(crate) fn none_if_not_found<T>(result: Result<T, Error>) -> Result<Option<T>, Error> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(Error::NotFound { resource }) => {
            tracing::debug!("{} not found", resource);
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

/// Rows of a list response. A blank body, placeholder or 404 means no rows;
/// a lone object is a single row.
pub(crate) fn json_rows<A: AuthProvider>(
    core: &RequestCore<A>,
    resp: Option<TransportResponse>,
) -> Result<Vec<Value>, Error> {
    let Some(resp) = resp else {
        return Ok(Vec::new());
    };
    if resp.is_blank() {
        return Ok(Vec::new());
    }
    Ok(match core.expect_json(resp)? {
        Value::Array(items) => items.into_iter().filter(|v| !is_placeholder(v)).collect(),
        value if is_placeholder(&value) => Vec::new(),
        value => vec![value],
    })
}

/// The record in a single-entity response, or `None` for a blank or
/// placeholder body. Registers that wrap the record in an array are unwrapped.
pub(crate) fn json_record<A: AuthProvider>(
    core: &RequestCore<A>,
    resp: Option<TransportResponse>,
) -> Result<Option<Value>, Error> {
    Ok(json_rows(core, resp)?.into_iter().next())
}

/// Slices an in-memory result list into the requested page.
pub(crate) fn paginate<T>(items: Vec<T>, query: &SearchQuery) -> SearchResult<T> {
    let total = items.len() as u64;
    let page = query.page.max(1);
    let size = query.page_size.max(1);
    let start = (page as usize - 1).saturating_mul(size as usize);
    let page_items: Vec<T> = items.into_iter().skip(start).take(size as usize).collect();
    SearchResult::new(page_items, total, page, size)
}
