//! Charity Commission for England and Wales register client.

use async_trait::async_trait;
use charities_api::types::{Charity, FinancialYear, OtherRegulator, Regulator, SearchResult, Trustee};
use charities_api::{
    AuthProvider, ClientConfig, ConfigError, Error, HeaderMap, HeaderValue, QueryParams,
    RequestCore, RequestOptions, SearchQuery,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::transform;
use crate::regulator::{
    json_record, json_rows, none_if_not_found, paginate, unsupported_page, CharityRegulator,
};
use crate::validation::{ccew_number, sanitize_search_text};

/// Production base URL of the CCEW register API.
pub const DEFAULT_BASE_URL: &str = "https://api.charitycommission.gov.uk/register/api";

/// Azure API Management subscription header.
const AUTH_HEADER: &str = "ocp-apim-subscription-key";

/// Group suffix of the main charity (linked charities use 1, 2, ...).
const MAIN_CHARITY_SUFFIX: u32 = 0;

struct CcewAuth {
    key: HeaderValue,
}

impl AuthProvider for CcewAuth {
    fn regulator(&self) -> Regulator {
        Regulator::Ccew
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

/// Client for the CCEW register. Requires a subscription key.
pub struct CcewClient {
    core: RequestCore<CcewAuth>,
}

impl CcewClient {
    /// Fails with [`ConfigError::MissingCredential`] when no key is configured.
    pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
        let regulator = Regulator::Ccew;
        let key = config
            .credential()
            .ok_or(ConfigError::MissingCredential { regulator })?;
        let mut key =
            HeaderValue::from_str(key).map_err(|_| ConfigError::InvalidCredential { regulator })?;
        key.set_sensitive(true);
        Ok(Self {
            core: RequestCore::new(CcewAuth { key }, &config)?,
        })
    }

    fn path(endpoint: &str, number: &str) -> String {
        format!("/{}/{}/{}", endpoint, number, MAIN_CHARITY_SUFFIX)
    }

    /// Fetches and maps a per-charity list endpoint. Unknown charities yield
    /// an empty list.
    async fn list<T, F>(
        &self,
        operation: &str,
        endpoint: &str,
        id: &str,
        map: F,
    ) -> Result<Vec<T>, Error>
    where
        T: Serialize + DeserializeOwned + Send,
        F: Fn(&Value) -> Option<T> + Send + Sync,
    {
        let Some(number) = ccew_number(id) else {
            tracing::debug!("Ignoring CCEW identifier that is not a register number: {:?}", id);
            return Ok(Vec::new());
        };
        let key = self
            .core
            .cache_key(operation, &QueryParams::new().with("id", &number));
        self.core
            .cached(&key, || async {
                let resp = none_if_not_found(
                    self.core
                        .get(&Self::path(endpoint, &number), RequestOptions::new())
                        .await,
                )?;
                let rows = json_rows(&self.core, resp)?;
                Ok(rows.iter().filter_map(&map).collect())
            })
            .await
    }

    /// All main-charity matches for a name, in register order.
    async fn search_all(&self, text: &str) -> Result<Vec<Charity>, Error> {
        let key = self
            .core
            .cache_key("searchCharityName", &QueryParams::new().with("name", text));
        self.core
            .cached(&key, || async {
                let path = format!("/searchCharityName/{}", urlencoding::encode(text));
                let resp = none_if_not_found(self.core.get(&path, RequestOptions::new()).await)?;
                let rows = json_rows(&self.core, resp)?;
                Ok(rows.into_iter().filter_map(transform::search_row).collect())
            })
            .await
    }
}

#[async_trait]
impl CharityRegulator for CcewClient {
    fn regulator(&self) -> Regulator {
        Regulator::Ccew
    }

    /// CCEW only searches by name; a query without text cannot be served.
    /// Results are paged locally, so the total is exact.
    async fn search(&self, query: &SearchQuery) -> Result<SearchResult<Charity>, Error> {
        let Some(text) = query.trimmed_text().and_then(sanitize_search_text) else {
            return Ok(unsupported_page(Regulator::Ccew, "search without text", query));
        };
        let all = self.search_all(&text).await?;
        Ok(paginate(all, query))
    }

    async fn get_charity(&self, id: &str) -> Result<Option<Charity>, Error> {
        let Some(number) = ccew_number(id) else {
            tracing::debug!("Ignoring CCEW identifier that is not a register number: {:?}", id);
            return Ok(None);
        };
        let key = self
            .core
            .cache_key("getCharity", &QueryParams::new().with("id", &number));
        self.core
            .cached(&key, || async {
                let resp = none_if_not_found(
                    self.core
                        .get(&Self::path("allcharitydetailsV2", &number), RequestOptions::new())
                        .await,
                )?;
                Ok(json_record(&self.core, resp)?.and_then(transform::charity))
            })
            .await
    }

    async fn get_trustees(&self, id: &str) -> Result<Vec<Trustee>, Error> {
        self.list("getTrustees", "charitytrusteeinformationV2", id, transform::trustee)
            .await
    }

    /// Most recent year first.
    async fn get_financial_history(&self, id: &str) -> Result<Vec<FinancialYear>, Error> {
        let mut years = self
            .list("getFinancialHistory", "charityfinancialhistory", id, |raw| {
                Some(transform::financial_year(raw))
            })
            .await?;
        years.sort_by(|a, b| b.year_end.cmp(&a.year_end));
        Ok(years)
    }

    async fn get_other_regulators(&self, id: &str) -> Result<Vec<OtherRegulator>, Error> {
        self.list(
            "getOtherRegulators",
            "charityotherregulators",
            id,
            transform::other_regulator,
        )
        .await
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
        let result = CcewClient::new(ClientConfig::default());
        assert!(matches!(
            result,
            Err(ConfigError::MissingCredential {
                regulator: Regulator::Ccew
            })
        ));
        let result = CcewClient::new(ClientConfig::new().with_credential("  "));
        assert!(matches!(result, Err(ConfigError::MissingCredential { .. })));
    }

    #[test]
    fn construction_rejects_unsendable_keys() {
        let result = CcewClient::new(ClientConfig::new().with_credential("bad\nkey"));
        assert!(matches!(result, Err(ConfigError::InvalidCredential { .. })));
    }

    #[test]
    fn construction_with_key() {
        let client = CcewClient::new(ClientConfig::new().with_credential("key")).unwrap();
        assert_eq!(client.regulator(), Regulator::Ccew);
    }

    #[test]
    fn paths_use_main_charity_suffix() {
        assert_eq!(
            CcewClient::path("allcharitydetailsV2", "202918"),
            "/allcharitydetailsV2/202918/0"
        );
    }
}
