//! Charity Commission for Northern Ireland client.

use async_trait::async_trait;
use charities_api::types::{Charity, FinancialYear, OtherRegulator, Regulator, SearchResult, Trustee};
use charities_api::{
    AuthProvider, ClientConfig, ConfigError, Error, HeaderMap, QueryParams, RequestBody,
    RequestCore, RequestOptions, SearchQuery,
};
use serde_json::{json, Value};

use super::transform;
use crate::normalize::{count, is_placeholder};
use crate::regulator::{
    json_record, json_rows, none_if_not_found, unsupported_list, CharityRegulator,
};
use crate::validation::{ccni_number, sanitize_search_text};

/// Production base URL of the CCNI register API.
pub const DEFAULT_BASE_URL: &str =
    "https://www.charitycommissionni.org.uk/umbraco/api/charityApi";

struct CcniAuth;

impl AuthProvider for CcniAuth {
    fn regulator(&self) -> Regulator {
        Regulator::Ccni
    }

    fn default_base_url(&self) -> &'static str {
        DEFAULT_BASE_URL
    }

    fn auth_headers(&self) -> HeaderMap {
        HeaderMap::new()
    }
}

/// Client for the Northern Ireland register. The API is open; any
/// configured credential is ignored.
pub struct CcniClient {
    core: RequestCore<CcniAuth>,
}

impl CcniClient {
    pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            core: RequestCore::new(CcniAuth, &config)?,
        })
    }

    fn regid(number: &str) -> RequestOptions {
        RequestOptions::new().with_query(QueryParams::new().with("regid", number))
    }
}

#[async_trait]
impl CharityRegulator for CcniClient {
    fn regulator(&self) -> Regulator {
        Regulator::Ccni
    }

    /// Server-side paging with a true total.
    async fn search(&self, query: &SearchQuery) -> Result<SearchResult<Charity>, Error> {
        let text = query
            .trimmed_text()
            .and_then(sanitize_search_text)
            .unwrap_or_default();
        let page = query.page.max(1);
        let page_size = query.page_size.max(1);
        let params = QueryParams::new()
            .with("searchText", &text)
            .with("pageNumber", page)
            .with("pageSize", page_size);
        let key = self.core.cache_key("search", &params);
        self.core
            .cached(&key, || async {
                let body = json!({
                    "searchText": text,
                    "pageNumber": page,
                    "pageSize": page_size,
                });
                let resp = none_if_not_found(
                    self.core
                        .post("/search", RequestBody::from(body), RequestOptions::new())
                        .await,
                )?;
                let Some(resp) = resp.filter(|r| !r.is_blank()) else {
                    return Ok(SearchResult::empty(page, page_size));
                };
                let body = self.core.expect_json(resp)?;
                if is_placeholder(&body) {
                    return Ok(SearchResult::empty(page, page_size));
                }
                let items: Vec<Charity> = match body.get("charities") {
                    Some(Value::Array(rows)) => {
                        rows.iter().cloned().filter_map(transform::charity).collect()
                    }
                    _ => Vec::new(),
                };
                let total = count(&body, "totalCount")
                    .map(u64::from)
                    .unwrap_or(items.len() as u64);
                Ok(SearchResult::new(
                    items,
                    total,
                    count(&body, "pageNumber").unwrap_or(page),
                    count(&body, "pageSize").filter(|s| *s > 0).unwrap_or(page_size),
                ))
            })
            .await
    }

    async fn get_charity(&self, id: &str) -> Result<Option<Charity>, Error> {
        let Some(number) = ccni_number(id) else {
            tracing::debug!("Ignoring CCNI identifier that is not a register number: {:?}", id);
            return Ok(None);
        };
        let key = self
            .core
            .cache_key("getCharity", &QueryParams::new().with("id", &number));
        self.core
            .cached(&key, || async {
                let resp = none_if_not_found(
                    self.core
                        .get("/getCharityDetails", Self::regid(&number))
                        .await,
                )?;
                Ok(json_record(&self.core, resp)?.and_then(transform::charity))
            })
            .await
    }

    async fn get_trustees(&self, id: &str) -> Result<Vec<Trustee>, Error> {
        let Some(number) = ccni_number(id) else {
            tracing::debug!("Ignoring CCNI identifier that is not a register number: {:?}", id);
            return Ok(Vec::new());
        };
        let key = self
            .core
            .cache_key("getTrustees", &QueryParams::new().with("id", &number));
        self.core
            .cached(&key, || async {
                let resp = none_if_not_found(
                    self.core.get("/getTrustees", Self::regid(&number)).await,
                )?;
                let rows = json_rows(&self.core, resp)?;
                Ok(rows.iter().filter_map(transform::trustee).collect())
            })
            .await
    }

    async fn get_financial_history(&self, _id: &str) -> Result<Vec<FinancialYear>, Error> {
        Ok(unsupported_list(Regulator::Ccni, "get_financial_history"))
    }

    async fn get_other_regulators(&self, _id: &str) -> Result<Vec<OtherRegulator>, Error> {
        Ok(unsupported_list(Regulator::Ccni, "get_other_regulators"))
    }

    fn clear_cache(&self) {
        self.core.clear_cache();
    }
}
