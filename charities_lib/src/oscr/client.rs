//! Office of the Scottish Charity Regulator client.

use async_trait::async_trait;
use charities_api::types::{Charity, FinancialYear, OtherRegulator, Regulator, SearchResult, Trustee};
use charities_api::{
    AuthProvider, ClientConfig, ConfigError, Error, HeaderMap, HeaderValue, QueryParams,
    RequestCore, RequestOptions, SearchQuery,
};
use serde_json::Value;

use super::transform;
use crate::normalize::{count, is_placeholder};
use crate::regulator::{
    json_record, json_rows, none_if_not_found, unsupported_list, CharityRegulator,
};
use crate::validation::{oscr_number, sanitize_search_text};

/// Production base URL of the OSCR API.
pub const DEFAULT_BASE_URL: &str = "https://oscrapi.azurewebsites.net/api";

/// Azure Functions key header.
const AUTH_HEADER: &str = "x-functions-key";

/// OSCR pages are fixed at this size regardless of what is asked for.
pub const OSCR_PAGE_SIZE: u32 = 100;

struct OscrAuth {
    key: HeaderValue,
}

impl AuthProvider for OscrAuth {
    fn regulator(&self) -> Regulator {
        Regulator::Oscr
    }

    fn default_base_url(&self) -> &'static str {
        DEFAULT_BASE_URL
    }

    fn auth_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTH_HEADER, self.key.clone());
        headers
    }
}

/// Client for the Scottish register. Requires a functions key.
///
/// Charity records are enriched with the latest annual return, so a
/// `get_charity` miss costs two upstream calls.
pub struct OscrClient {
    core: RequestCore<OscrAuth>,
}

impl OscrClient {
    pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
        let regulator = Regulator::Oscr;
        let key = config
            .credential()
            .ok_or(ConfigError::MissingCredential { regulator })?;
        let mut key =
            HeaderValue::from_str(key).map_err(|_| ConfigError::InvalidCredential { regulator })?;
        key.set_sensitive(true);
        Ok(Self {
            core: RequestCore::new(OscrAuth { key }, &config)?,
        })
    }

    /// The un-enriched charity object, or `None` when the register has none.
    async fn charity_record(&self, number: &str) -> Result<Option<Value>, Error> {
        let opts =
            RequestOptions::new().with_query(QueryParams::new().with("charitynumber", number));
        let resp = none_if_not_found(self.core.get("/all_charities/charity", opts).await)?;
        json_record(&self.core, resp)
    }

    /// Annual returns for an OSCR record id, latest year first. A 404 means
    /// the charity has filed none.
    async fn annual_returns(&self, record_id: &str) -> Result<Vec<FinancialYear>, Error> {
        let params = QueryParams::new().with("charityid", record_id);
        let key = self.core.cache_key("annualReturns", &params);
        self.core
            .cached(&key, || async {
                let opts = RequestOptions::new().with_query(params.clone());
                let resp = none_if_not_found(self.core.get("/annualreturns", opts).await)?;
                let mut years: Vec<FinancialYear> = json_rows(&self.core, resp)?
                    .iter()
                    .filter_map(transform::financial_year)
                    .collect();
                years.sort_by(|a, b| b.year_end.cmp(&a.year_end));
                Ok(years)
            })
            .await
    }

    async fn enriched(&self, raw: Value) -> Result<Option<Charity>, Error> {
        let record_id = transform::record_id(&raw);
        let Some(charity) = transform::charity(raw) else {
            return Ok(None);
        };
        let Some(record_id) = record_id else {
            tracing::debug!("OSCR record {} has no id; skipping enrichment", charity.id);
            return Ok(Some(charity));
        };
        let years = self.annual_returns(&record_id).await?;
        Ok(Some(transform::enrich(charity, &years)))
    }
}

#[async_trait]
impl CharityRegulator for OscrClient {
    fn regulator(&self) -> Regulator {
        Regulator::Oscr
    }

    /// OSCR only reports a page count, so the total is an estimate of
    /// `totalPages * 100`. The requested page size is ignored.
    async fn search(&self, query: &SearchQuery) -> Result<SearchResult<Charity>, Error> {
        let text = query.trimmed_text().and_then(sanitize_search_text);
        let page = query.page.max(1);
        let params = QueryParams::new()
            .with("page", page)
            .with("charityname", text);
        let key = self.core.cache_key("search", &params);
        self.core
            .cached(&key, || async {
                let opts = RequestOptions::new().with_query(params.clone());
                let resp = none_if_not_found(self.core.get("/all_charities", opts).await)?;
                let Some(resp) = resp else {
                    return Ok(SearchResult::empty(page, OSCR_PAGE_SIZE));
                };
                if resp.is_blank() {
                    return Ok(SearchResult::empty(page, OSCR_PAGE_SIZE));
                }
                let body = self.core.expect_json(resp)?;
                if is_placeholder(&body) {
                    return Ok(SearchResult::empty(page, OSCR_PAGE_SIZE));
                }
                let current = count(&body, "currentPage").unwrap_or(page);
                let total_pages = count(&body, "totalPages").unwrap_or(0);
                let items: Vec<Charity> = match body.get("data") {
                    Some(Value::Array(rows)) => {
                        rows.iter().cloned().filter_map(transform::charity).collect()
                    }
                    _ => Vec::new(),
                };
                Ok(SearchResult::estimated(
                    items,
                    total_pages,
                    current,
                    OSCR_PAGE_SIZE,
                ))
            })
            .await
    }

    async fn get_charity(&self, id: &str) -> Result<Option<Charity>, Error> {
        let Some(number) = oscr_number(id) else {
            tracing::debug!("Ignoring OSCR identifier that is not a register number: {:?}", id);
            return Ok(None);
        };
        let key = self
            .core
            .cache_key("getCharity", &QueryParams::new().with("id", &number));
        self.core
            .cached(&key, || async {
                match self.charity_record(&number).await? {
                    Some(raw) => self.enriched(raw).await,
                    None => Ok(None),
                }
            })
            .await
    }

    async fn get_trustees(&self, _id: &str) -> Result<Vec<Trustee>, Error> {
        Ok(unsupported_list(Regulator::Oscr, "get_trustees"))
    }

    /// Annual returns, latest first. Looks the charity up first to learn
    /// its internal record id.
    async fn get_financial_history(&self, id: &str) -> Result<Vec<FinancialYear>, Error> {
        let Some(number) = oscr_number(id) else {
            tracing::debug!("Ignoring OSCR identifier that is not a register number: {:?}", id);
            return Ok(Vec::new());
        };
        let Some(raw) = self.charity_record(&number).await? else {
            return Ok(Vec::new());
        };
        match transform::record_id(&raw) {
            Some(record_id) => self.annual_returns(&record_id).await,
            None => Ok(Vec::new()),
        }
    }

    async fn get_other_regulators(&self, _id: &str) -> Result<Vec<OtherRegulator>, Error> {
        Ok(unsupported_list(Regulator::Oscr, "get_other_regulators"))
    }

    fn clear_cache(&self) {
        self.core.clear_cache();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction_requires_a_key() {
        let result = OscrClient::new(ClientConfig::default());
        assert!(matches!(
            result,
            Err(ConfigError::MissingCredential {
                regulator: Regulator::Oscr
            })
        ));
    }

    #[test]
    fn construction_with_key() {
        let client = OscrClient::new(ClientConfig::new().with_credential("key")).unwrap();
        assert_eq!(client.regulator(), Regulator::Oscr);
    }
}
