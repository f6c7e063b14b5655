// Product lookup helper. Splits item ids into ItemLookup requests of at most
// ten ids each and flattens the returned items into one list.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::api::{Params, ProductAdvertisingApi};
use crate::cart::AmazonCart;
use crate::config::ClientConfig;
use crate::error::{ApiError, ClientError};
use crate::xml_response::Item;

pub const DEFAULT_RESPONSE_GROUP: &str = "ItemAttributes,OfferFull,Offers,Images,Large";

// Set per request by `Amazon::lookup`; never taken from `LookupOptions::extra`.
const RESERVED_PARAMS: [&str; 2] = ["ItemId", "Operation"];

/// Ordered list of item identifiers.
///
/// A single string is split on commas, so `"A,B"` and `["A", "B"]` are the
/// same list. Blank entries are dropped.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ItemIds(Vec<String>);

impl ItemIds {
    pub fn parse(ids: &str) -> Self {
        ids.split(',').map(str::to_string).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }

    /// Comma-joined chunks of at most `size` ids, in order.
    pub fn batches(&self, size: usize) -> Vec<String> {
        self.0
            .chunks(size.max(1))
            .map(|chunk| chunk.join(","))
            .collect()
    }
}

impl FromIterator<String> for ItemIds {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        ItemIds(
            iter.into_iter()
                .map(|id| id.trim().to_string())
                .filter(|id| !id.is_empty())
                .collect(),
        )
    }
}

impl From<&str> for ItemIds {
    fn from(ids: &str) -> Self {
        ItemIds::parse(ids)
    }
}

impl From<String> for ItemIds {
    fn from(ids: String) -> Self {
        ItemIds::parse(&ids)
    }
}

impl From<Vec<String>> for ItemIds {
    fn from(ids: Vec<String>) -> Self {
        ids.into_iter().collect()
    }
}

impl From<Vec<&str>> for ItemIds {
    fn from(ids: Vec<&str>) -> Self {
        ids.into_iter().map(str::to_string).collect()
    }
}

impl From<&[&str]> for ItemIds {
    fn from(ids: &[&str]) -> Self {
        ids.iter().map(|id| id.to_string()).collect()
    }
}

impl From<&[String]> for ItemIds {
    fn from(ids: &[String]) -> Self {
        ids.iter().cloned().collect()
    }
}

impl<const N: usize> From<[&str; N]> for ItemIds {
    fn from(ids: [&str; N]) -> Self {
        ids.into_iter().map(str::to_string).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdType {
    #[default]
    Asin,
    Sku,
    Upc,
    Ean,
    Isbn,
}

impl IdType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdType::Asin => "ASIN",
            IdType::Sku => "SKU",
            IdType::Upc => "UPC",
            IdType::Ean => "EAN",
            IdType::Isbn => "ISBN",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LookupOptions {
    /// Defaults to [`DEFAULT_RESPONSE_GROUP`].
    pub response_group: Option<String>,
    pub id_type: Option<IdType>,
    pub search_index: Option<String>,
    pub condition: Option<String>,
    /// Passed through unchanged, e.g. `("MerchantId", "Amazon")`.
    pub extra: Params,
}

impl LookupOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn response_group(mut self, group: impl Into<String>) -> Self {
        self.response_group = Some(group.into());
        self
    }

    pub fn id_type(mut self, id_type: IdType) -> Self {
        self.id_type = Some(id_type);
        self
    }

    pub fn search_index(mut self, index: impl Into<String>) -> Self {
        self.search_index = Some(index.into());
        self
    }

    pub fn condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.push((key.into(), value.into()));
        self
    }

    fn to_params(&self) -> Result<Params, ApiError> {
        let mut params = vec![(
            "ResponseGroup".to_string(),
            self.response_group
                .clone()
                .unwrap_or_else(|| DEFAULT_RESPONSE_GROUP.to_string()),
        )];

        if let Some(id_type) = self.id_type {
            // every id type except ASIN needs a search index
            if id_type != IdType::Asin && self.search_index.is_none() {
                return Err(ApiError::InvalidArgument(format!(
                    "IdType {} requires a SearchIndex",
                    id_type.as_str()
                )));
            }
            params.push(("IdType".to_string(), id_type.as_str().to_string()));
        }
        if let Some(index) = &self.search_index {
            params.push(("SearchIndex".to_string(), index.clone()));
        }
        if let Some(condition) = &self.condition {
            params.push(("Condition".to_string(), condition.clone()));
        }
        if let Some((key, _)) = self
            .extra
            .iter()
            .find(|(key, _)| RESERVED_PARAMS.contains(&key.as_str()))
        {
            return Err(ApiError::InvalidArgument(format!(
                "{} cannot be passed as an extra lookup parameter",
                key
            )));
        }
        params.extend(self.extra.iter().cloned());

        Ok(params)
    }
}

pub struct Amazon {
    api: Arc<ProductAdvertisingApi>,
}

impl Amazon {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        Ok(Self::with_api(Arc::new(ProductAdvertisingApi::new(config)?)))
    }

    pub fn from_env() -> Result<Self, ClientError> {
        Self::new(ClientConfig::from_env()?)
    }

    pub fn with_api(api: Arc<ProductAdvertisingApi>) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &Arc<ProductAdvertisingApi> {
        &self.api
    }

    /// An empty cart sharing this client's credentials.
    pub fn cart(&self) -> AmazonCart {
        AmazonCart::new(self.api.clone())
    }

    /// Look up every id, one request per batch of `item_lookup_max` ids.
    ///
    /// Items come back in response order. A batch whose response has no
    /// `Items` contributes nothing; ids the service rejects in-band are
    /// logged and skipped. Transport and service failures abort the lookup.
    pub async fn lookup(
        &self,
        item_ids: impl Into<ItemIds>,
        options: &LookupOptions,
    ) -> Result<Vec<Item>, ApiError> {
        let ids = item_ids.into();
        let base_params = options.to_params()?;
        let batch_size = self.api.config().item_lookup_max;

        let mut items = Vec::with_capacity(ids.len());
        for (index, batch) in ids.batches(batch_size).into_iter().enumerate() {
            let mut params = Vec::with_capacity(base_params.len() + 1);
            params.push(("ItemId".to_string(), batch));
            params.extend(base_params.iter().cloned());

            let response = self.api.item_lookup(params).await?;
            if let Some(found) = &response.items {
                for error in found.request.errors() {
                    warn!(
                        batch = index,
                        code = %error.code,
                        detail = %error.message,
                        "lookup request error"
                    );
                }
            }

            let batch_items = response.into_items();
            debug!(batch = index, count = batch_items.len(), "lookup batch complete");
            items.extend(batch_items);
        }

        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock_api;
    use crate::transport::HttpResponse;
    use crate::xml_response::samples::{LOOKUP_XML, SIGNATURE_ERROR_XML};
    use test_case::test_case;

    fn asins(count: usize) -> Vec<String> {
        (0..count).map(|i| format!("B{:09}", i)).collect()
    }

    #[test_case("B00008OE6I", vec!["B00008OE6I"]; "single id")]
    #[test_case("A,B,C", vec!["A", "B", "C"]; "comma joined")]
    #[test_case(" A , B ,", vec!["A", "B"]; "padding and trailing comma")]
    #[test_case("", vec![]; "empty")]
    fn test_parse_item_ids(input: &str, expected: Vec<&str>) {
        assert_eq!(ItemIds::from(input).into_vec(), expected);
    }

    #[test]
    fn test_item_ids_from_lists() {
        assert_eq!(ItemIds::from(vec!["A", "B"]).len(), 2);
        assert_eq!(ItemIds::from(["A", " ", "C"]).into_vec(), vec!["A", "C"]);
        assert_eq!(ItemIds::from(asins(3)).len(), 3);
        let slice: &[&str] = &["X"];
        assert_eq!(ItemIds::from(slice).as_slice(), ["X".to_string()]);
    }

    #[test_case(0, 10, 0; "no ids")]
    #[test_case(1, 10, 1; "one id")]
    #[test_case(10, 10, 1; "exactly one batch")]
    #[test_case(11, 10, 2; "one over")]
    #[test_case(25, 10, 3; "partial last batch")]
    #[test_case(5, 0, 5; "zero size treated as one")]
    fn test_batches(count: usize, size: usize, expected_batches: usize) {
        let ids = ItemIds::from(asins(count));
        let batches = ids.batches(size);
        assert_eq!(batches.len(), expected_batches);

        // batching keeps every id in order
        let rejoined: Vec<String> = batches
            .iter()
            .flat_map(|batch| batch.split(',').map(str::to_string))
            .collect();
        assert_eq!(rejoined, asins(count));
    }

    #[test]
    fn test_options_params() {
        let params = LookupOptions::new()
            .id_type(IdType::Isbn)
            .search_index("Books")
            .condition("New")
            .param("MerchantId", "Amazon")
            .to_params()
            .unwrap();

        assert_eq!(
            params,
            vec![
                ("ResponseGroup".to_string(), DEFAULT_RESPONSE_GROUP.to_string()),
                ("IdType".to_string(), "ISBN".to_string()),
                ("SearchIndex".to_string(), "Books".to_string()),
                ("Condition".to_string(), "New".to_string()),
                ("MerchantId".to_string(), "Amazon".to_string()),
            ]
        );
    }

    #[test]
    fn test_non_asin_id_type_needs_search_index() {
        let result = LookupOptions::new().id_type(IdType::Upc).to_params();
        assert!(matches!(result, Err(ApiError::InvalidArgument(_))));
        assert!(LookupOptions::new().id_type(IdType::Asin).to_params().is_ok());
    }

    #[test_case("ItemId" ; "item id")]
    #[test_case("Operation" ; "operation")]
    fn test_extra_params_cannot_override_request_keys(key: &str) {
        let result = LookupOptions::new().param(key, "X").to_params();
        assert!(matches!(result, Err(ApiError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_lookup_keeps_batch_ids_with_extra_params() {
        let (mock, api) = mock_api();
        let amazon = Amazon::with_api(Arc::new(api));

        let overriding = LookupOptions::new().param("ItemId", "X");
        let result = amazon.lookup(asins(12), &overriding).await;
        assert!(matches!(result, Err(ApiError::InvalidArgument(_))));
        assert_eq!(mock.request_count(), 0);

        let options = LookupOptions::new().param("MerchantId", "Amazon");
        amazon.lookup(asins(12), &options).await.unwrap();
        assert_eq!(mock.request_count(), 2);
        assert_eq!(mock.request_params(0)["ItemId"], asins(12)[..10].join(","));
        assert_eq!(mock.request_params(1)["ItemId"], asins(12)[10..].join(","));
        assert_eq!(mock.request_params(1)["Operation"], "ItemLookup");
        assert_eq!(mock.request_params(1)["MerchantId"], "Amazon");
    }

    #[tokio::test]
    async fn test_lookup_batches_requests() {
        let (mock, api) = mock_api();
        let amazon = Amazon::with_api(Arc::new(api));

        let items = amazon.lookup(asins(25), &LookupOptions::new()).await.unwrap();
        assert!(items.is_empty());
        assert_eq!(mock.request_count(), 3);

        let ids = asins(25);
        assert_eq!(mock.request_params(0)["ItemId"], ids[0..10].join(","));
        assert_eq!(mock.request_params(1)["ItemId"], ids[10..20].join(","));
        assert_eq!(mock.request_params(2)["ItemId"], ids[20..25].join(","));
        for i in 0..3 {
            let params = mock.request_params(i);
            assert_eq!(params["Operation"], "ItemLookup");
            assert_eq!(params["ResponseGroup"], DEFAULT_RESPONSE_GROUP);
        }
    }

    #[tokio::test]
    async fn test_lookup_flattens_items() {
        let (mock, api) = mock_api();
        mock.push_body(LOOKUP_XML);
        mock.push_body(LOOKUP_XML);
        let amazon = Amazon::with_api(Arc::new(api));

        let items = amazon
            .lookup(asins(12), &LookupOptions::new().response_group("Small"))
            .await
            .unwrap();

        // two items per response, in response order
        let found: Vec<&str> = items.iter().map(|item| item.asin.as_str()).collect();
        assert_eq!(
            found,
            vec!["B00008OE6I", "0679722769", "B00008OE6I", "0679722769"]
        );
        assert_eq!(mock.request_params(0)["ResponseGroup"], "Small");
    }

    #[tokio::test]
    async fn test_lookup_comma_string() {
        let (mock, api) = mock_api();
        mock.push_body(LOOKUP_XML);
        let amazon = Amazon::with_api(Arc::new(api));

        let items = amazon
            .lookup("B00008OE6I,0679722769,BADASIN000", &LookupOptions::new())
            .await
            .unwrap();

        // the rejected id is skipped, the valid ones still come back
        assert_eq!(items.len(), 2);
        assert_eq!(mock.request_count(), 1);
        assert_eq!(
            mock.request_params(0)["ItemId"],
            "B00008OE6I,0679722769,BADASIN000"
        );
    }

    #[tokio::test]
    async fn test_lookup_empty_ids_sends_nothing() {
        let (mock, api) = mock_api();
        let amazon = Amazon::with_api(Arc::new(api));

        let items = amazon.lookup("", &LookupOptions::new()).await.unwrap();
        assert!(items.is_empty());
        assert_eq!(mock.request_count(), 0);
    }

    #[tokio::test]
    async fn test_lookup_response_without_items() {
        let (mock, api) = mock_api();
        mock.push_body("<ItemLookupResponse><OperationRequest/></ItemLookupResponse>");
        let amazon = Amazon::with_api(Arc::new(api));

        let items = amazon.lookup("B00008OE6I", &LookupOptions::new()).await.unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_lookup_stops_on_service_error() {
        let (mock, api) = mock_api();
        mock.push_body(LOOKUP_XML);
        mock.push_response(HttpResponse {
            status: 403,
            body: SIGNATURE_ERROR_XML.to_string(),
        });
        let amazon = Amazon::with_api(Arc::new(api));

        let result = amazon.lookup(asins(30), &LookupOptions::new()).await;
        assert!(matches!(result, Err(ApiError::ServiceError { .. })));
        assert_eq!(mock.request_count(), 2);
    }

    #[tokio::test]
    async fn test_lookup_rejects_bad_options_before_sending() {
        let (mock, api) = mock_api();
        let amazon = Amazon::with_api(Arc::new(api));

        let options = LookupOptions::new().id_type(IdType::Ean);
        let result = amazon.lookup("5012345678900", &options).await;
        assert!(matches!(result, Err(ApiError::InvalidArgument(_))));
        assert_eq!(mock.request_count(), 0);
    }

    #[test]
    fn test_cart_shares_api() {
        let (_mock, api) = mock_api();
        let amazon = Amazon::with_api(Arc::new(api));
        let cart = amazon.cart();
        assert!(!cart.is_created());
        assert!(Arc::ptr_eq(cart.api(), amazon.api()));
    }
}
