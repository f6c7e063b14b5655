// Low-level Product Advertising API client: signs requests, sends them through a
// Transport and maps the XML documents into records.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{ApiError, ClientError};
use crate::signing::RequestSigner;
use crate::transport::{HttpTransport, Transport};
use crate::xml_response::{
    parse_cart, parse_error, parse_item_lookup, CartResponse, ItemLookupResponse,
};

/// Request parameters in insertion order. They are sorted when signed.
pub type Params = Vec<(String, String)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ItemLookup,
    CartCreate,
    CartAdd,
    CartGet,
    CartModify,
    CartClear,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::ItemLookup => "ItemLookup",
            Operation::CartCreate => "CartCreate",
            Operation::CartAdd => "CartAdd",
            Operation::CartGet => "CartGet",
            Operation::CartModify => "CartModify",
            Operation::CartClear => "CartClear",
        }
    }
}

pub struct ProductAdvertisingApi {
    config: ClientConfig,
    signer: RequestSigner,
    transport: Arc<dyn Transport>,
}

impl ProductAdvertisingApi {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let transport = HttpTransport::new(config.timeout_ms)?;
        Self::with_transport(config, Arc::new(transport))
    }

    pub fn with_transport(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, ClientError> {
        config.validate()?;
        let signer = RequestSigner::new(&config)?;
        Ok(Self {
            config,
            signer,
            transport,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Send one signed request and return the body of a 2xx response.
    pub async fn call(&self, operation: Operation, params: Params) -> Result<String, ApiError> {
        let mut all = Vec::with_capacity(params.len() + 1);
        all.push(("Operation".to_string(), operation.as_str().to_string()));
        all.extend(params);

        let url = self.signer.signed_url(&all, Utc::now());
        debug!(operation = operation.as_str(), "sending request");
        let response = self.transport.get(&url).await?;

        if response.is_success() {
            return Ok(response.body);
        }

        match parse_error(&response.body) {
            Some(document) => {
                warn!(
                    operation = operation.as_str(),
                    status = response.status,
                    code = %document.error.code,
                    request_id = %document.request_id,
                    "service returned an error"
                );
                Err(ApiError::ServiceError {
                    status_code: response.status,
                    code: document.error.code,
                    message: document.error.message,
                })
            }
            None => Err(ApiError::ApiResponseError {
                status_code: response.status,
                message: response.body,
            }),
        }
    }

    pub async fn item_lookup(&self, params: Params) -> Result<ItemLookupResponse, ApiError> {
        let body = self.call(Operation::ItemLookup, params).await?;
        parse_item_lookup(&body)
    }

    pub async fn cart_create(&self, params: Params) -> Result<CartResponse, ApiError> {
        self.cart_call(Operation::CartCreate, params).await
    }

    pub async fn cart_add(&self, params: Params) -> Result<CartResponse, ApiError> {
        self.cart_call(Operation::CartAdd, params).await
    }

    pub async fn cart_get(&self, params: Params) -> Result<CartResponse, ApiError> {
        self.cart_call(Operation::CartGet, params).await
    }

    pub async fn cart_modify(&self, params: Params) -> Result<CartResponse, ApiError> {
        self.cart_call(Operation::CartModify, params).await
    }

    pub async fn cart_clear(&self, params: Params) -> Result<CartResponse, ApiError> {
        self.cart_call(Operation::CartClear, params).await
    }

    async fn cart_call(&self, operation: Operation, params: Params) -> Result<CartResponse, ApiError> {
        let body = self.call(operation, params).await?;
        parse_cart(&body)
    }
}

// Client wired to a fresh mock transport, shared by the helper tests
#[cfg(test)]
pub(crate) fn mock_api() -> (
    Arc<crate::transport::mock_server::MockTransport>,
    ProductAdvertisingApi,
) {
    let mock = Arc::new(crate::transport::mock_server::MockTransport::new());
    let config = ClientConfig::new("mytag-20", "AKID", "secret");
    let api = ProductAdvertisingApi::with_transport(config, mock.clone())
        .expect("valid test config");
    (mock, api)
}
