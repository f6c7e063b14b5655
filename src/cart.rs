// Remote shopping cart helper.
//
// An AmazonCart mirrors one cart held by the service, identified by its CartId
// and HMAC. Every operation sends one request and replaces the local copy of the
// cart contents with what the service returned.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::api::{Params, ProductAdvertisingApi};
use crate::error::{ApiError, CartError};
use crate::lookup::ItemIds;
use crate::xml_response::{CartItem, CartResponse};

/// Local copy of a remote cart. Can be stored and later passed to
/// [`AmazonCart::from_state`]; carts stay alive for about 30 days.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CartState {
    pub cart_id: Option<String>,
    pub hmac: Option<String>,
    pub purchase_url: Option<String>,
    pub items: Vec<CartItem>,
    pub saved_for_later: Vec<CartItem>,
    pub subtotal: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartItemKey {
    Asin(String),
    OfferListingId(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItemRequest {
    pub key: CartItemKey,
    pub quantity: u32,
}

impl CartItemRequest {
    pub fn asin(asin: impl Into<String>, quantity: u32) -> Self {
        Self {
            key: CartItemKey::Asin(asin.into()),
            quantity,
        }
    }

    pub fn offer_listing(offer_listing_id: impl Into<String>, quantity: u32) -> Self {
        Self {
            key: CartItemKey::OfferListingId(offer_listing_id.into()),
            quantity,
        }
    }
}

/// Quantities for [`AmazonCart::add`]: one value for every id, or one per id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Quantity {
    Each(u32),
    PerItem(Vec<u32>),
}

impl Default for Quantity {
    fn default() -> Self {
        Quantity::Each(1)
    }
}

impl From<u32> for Quantity {
    fn from(quantity: u32) -> Self {
        Quantity::Each(quantity)
    }
}

impl From<Vec<u32>> for Quantity {
    fn from(quantities: Vec<u32>) -> Self {
        Quantity::PerItem(quantities)
    }
}

impl From<&[u32]> for Quantity {
    fn from(quantities: &[u32]) -> Self {
        Quantity::PerItem(quantities.to_vec())
    }
}

impl Quantity {
    fn expand(&self, count: usize) -> Result<Vec<u32>, ApiError> {
        match self {
            Quantity::Each(quantity) => Ok(vec![*quantity; count]),
            Quantity::PerItem(quantities) if quantities.len() == count => Ok(quantities.clone()),
            Quantity::PerItem(quantities) => Err(ApiError::InvalidArgument(format!(
                "got {} quantities for {} items",
                quantities.len(),
                count
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartAction {
    SaveForLater,
    MoveToCart,
}

impl CartAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            CartAction::SaveForLater => "SaveForLater",
            CartAction::MoveToCart => "MoveToCart",
        }
    }
}

/// One change to a line already in the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartModification {
    pub cart_item_id: String,
    pub quantity: Option<u32>,
    pub action: Option<CartAction>,
}

impl CartModification {
    /// Set the quantity; 0 removes the line.
    pub fn quantity(cart_item_id: impl Into<String>, quantity: u32) -> Self {
        Self {
            cart_item_id: cart_item_id.into(),
            quantity: Some(quantity),
            action: None,
        }
    }

    pub fn save_for_later(cart_item_id: impl Into<String>) -> Self {
        Self {
            cart_item_id: cart_item_id.into(),
            quantity: None,
            action: Some(CartAction::SaveForLater),
        }
    }

    pub fn move_to_cart(cart_item_id: impl Into<String>) -> Self {
        Self {
            cart_item_id: cart_item_id.into(),
            quantity: None,
            action: Some(CartAction::MoveToCart),
        }
    }
}

pub struct AmazonCart {
    api: Arc<ProductAdvertisingApi>,
    state: CartState,
}

impl AmazonCart {
    /// Empty cart; nothing exists remotely until `create` or `add`.
    pub fn new(api: Arc<ProductAdvertisingApi>) -> Self {
        Self::from_state(api, CartState::default())
    }

    pub fn from_state(api: Arc<ProductAdvertisingApi>, state: CartState) -> Self {
        Self { api, state }
    }

    /// Create a remote cart holding one item; `None` means a quantity of 1.
    pub async fn with_item(
        api: Arc<ProductAdvertisingApi>,
        asin: impl Into<String>,
        quantity: Option<u32>,
    ) -> Result<Self, ApiError> {
        let mut cart = Self::new(api);
        cart.create(&[CartItemRequest::asin(asin, quantity.unwrap_or(1))])
            .await?;
        Ok(cart)
    }

    /// Fetch an existing remote cart.
    pub async fn get(
        api: Arc<ProductAdvertisingApi>,
        cart_id: &str,
        hmac: &str,
        cart_item_id: Option<&str>,
    ) -> Result<Self, ApiError> {
        let mut params = identity_params(cart_id, hmac);
        if let Some(cart_item_id) = cart_item_id {
            params.push(("CartItemId".to_string(), cart_item_id.to_string()));
        }

        let response = api.cart_get(params).await?;
        let mut cart = Self::from_state(
            api,
            CartState {
                cart_id: Some(cart_id.to_string()),
                hmac: Some(hmac.to_string()),
                ..Default::default()
            },
        );
        cart.state = merge_response(cart.state, &response)?;
        Ok(cart)
    }

    pub fn api(&self) -> &Arc<ProductAdvertisingApi> {
        &self.api
    }

    pub fn state(&self) -> &CartState {
        &self.state
    }

    pub fn into_state(self) -> CartState {
        self.state
    }

    pub fn is_created(&self) -> bool {
        self.state.cart_id.is_some()
    }

    pub fn cart_id(&self) -> Option<&str> {
        self.state.cart_id.as_deref()
    }

    pub fn hmac(&self) -> Option<&str> {
        self.state.hmac.as_deref()
    }

    pub fn purchase_url(&self) -> Option<&str> {
        self.state.purchase_url.as_deref()
    }

    pub fn items(&self) -> &[CartItem] {
        &self.state.items
    }

    pub fn saved_for_later(&self) -> &[CartItem] {
        &self.state.saved_for_later
    }

    pub fn subtotal(&self) -> f64 {
        self.state.subtotal
    }

    /// CartCreate: start a new remote cart with `items`, replacing any
    /// identity this cart had before.
    pub async fn create(&mut self, items: &[CartItemRequest]) -> Result<CartResponse, ApiError> {
        if items.is_empty() {
            return Err(ApiError::InvalidArgument(
                "a cart must be created with at least one item".to_string(),
            ));
        }

        let response = self.api.cart_create(item_params(items)).await?;
        self.state = merge_response(CartState::default(), &response)?;
        Ok(response)
    }

    /// Add ASINs to the cart, creating it first when needed.
    ///
    /// `item_ids` may be a list or a comma-joined string. A single quantity
    /// applies to every id; a list must match the ids one to one.
    pub async fn add(
        &mut self,
        item_ids: impl Into<ItemIds>,
        quantity: Quantity,
    ) -> Result<CartResponse, ApiError> {
        let ids = item_ids.into();
        if ids.is_empty() {
            return Err(ApiError::InvalidArgument(
                "Include your ASIN/OfferListingId in the item ids".to_string(),
            ));
        }

        let quantities = quantity.expand(ids.len())?;
        let requests: Vec<CartItemRequest> = ids
            .into_vec()
            .into_iter()
            .zip(quantities)
            .map(|(asin, quantity)| CartItemRequest::asin(asin, quantity))
            .collect();

        self.add_items(&requests).await
    }

    pub async fn add_items(&mut self, items: &[CartItemRequest]) -> Result<CartResponse, ApiError> {
        if items.is_empty() {
            return Err(ApiError::InvalidArgument(
                "Include your ASIN/OfferListingId in the item ids".to_string(),
            ));
        }
        if !self.is_created() {
            return self.create(items).await;
        }

        let (cart_id, hmac) = self.identity()?;
        let mut params = identity_params(&cart_id, &hmac);
        params.extend(item_params(items));

        let response = self.api.cart_add(params).await?;
        self.apply(&response)?;
        Ok(response)
    }

    /// CartModify: change quantities or move lines between the cart and
    /// "saved for later". Cannot add new items.
    pub async fn modify(
        &mut self,
        changes: &[CartModification],
    ) -> Result<CartResponse, ApiError> {
        let (cart_id, hmac) = self.identity()?;
        if changes.is_empty() {
            return Err(ApiError::InvalidArgument("no cart modifications given".to_string()));
        }

        let mut params = identity_params(&cart_id, &hmac);
        for (index, change) in changes.iter().enumerate() {
            if change.quantity.is_none() && change.action.is_none() {
                return Err(ApiError::InvalidArgument(format!(
                    "modification of {} has neither a quantity nor an action",
                    change.cart_item_id
                )));
            }

            let prefix = format!("Item.{}", index + 1);
            params.push((format!("{}.CartItemId", prefix), change.cart_item_id.clone()));
            if let Some(quantity) = change.quantity {
                params.push((format!("{}.Quantity", prefix), quantity.to_string()));
            }
            if let Some(action) = change.action {
                params.push((format!("{}.Action", prefix), action.as_str().to_string()));
            }
        }

        let response = self.api.cart_modify(params).await?;
        self.apply(&response)?;
        Ok(response)
    }

    pub async fn remove(&mut self, cart_item_id: &str) -> Result<CartResponse, ApiError> {
        self.modify(&[CartModification::quantity(cart_item_id, 0)])
            .await
    }

    /// CartClear: empty the remote cart. The cart itself stays valid.
    pub async fn clear(&mut self) -> Result<CartResponse, ApiError> {
        let (cart_id, hmac) = self.identity()?;
        let response = self.api.cart_clear(identity_params(&cart_id, &hmac)).await?;
        self.apply(&response)?;
        Ok(response)
    }

    /// CartGet for this cart, refreshing the local copy.
    pub async fn refresh(&mut self) -> Result<CartResponse, ApiError> {
        let (cart_id, hmac) = self.identity()?;
        let response = self.api.cart_get(identity_params(&cart_id, &hmac)).await?;
        self.apply(&response)?;
        Ok(response)
    }

    fn identity(&self) -> Result<(String, String), ApiError> {
        match (&self.state.cart_id, &self.state.hmac) {
            (Some(cart_id), Some(hmac)) => Ok((cart_id.clone(), hmac.clone())),
            _ => Err(CartError::NotCreated.into()),
        }
    }

    fn apply(&mut self, response: &CartResponse) -> Result<(), ApiError> {
        self.state = merge_response(self.state.clone(), response)?;
        Ok(())
    }
}

/// Fold a cart response into `state`. Nothing is kept when the response
/// carries no usable cart.
fn merge_response(mut state: CartState, response: &CartResponse) -> Result<CartState, ApiError> {
    let cart = &response.cart;
    let errors = cart.request.errors();

    if cart.cart_id.is_empty() {
        return Err(match errors.first() {
            Some(error) => ApiError::RequestError {
                code: error.code.clone(),
                message: error.message.clone(),
            },
            None => CartError::MissingCartId.into(),
        });
    }
    for error in errors {
        warn!(
            cart_id = %cart.cart_id,
            code = %error.code,
            detail = %error.message,
            "cart request error"
        );
    }

    state.cart_id = Some(cart.cart_id.clone());
    if !cart.hmac.is_empty() {
        state.hmac = Some(cart.hmac.clone());
    }
    if !cart.purchase_url.is_empty() {
        state.purchase_url = Some(cart.purchase_url.clone());
    }
    state.items = cart.cart_items.items.clone();
    state.saved_for_later = cart.saved_for_later_items.items.clone();
    state.subtotal = cart.subtotal();

    if tracing::enabled!(tracing::Level::DEBUG) {
        match serde_json::to_string(cart) {
            Ok(json) => debug!(cart = %json, "cart updated"),
            Err(e) => debug!(error = %e, "cart updated, JSON rendering failed"),
        }
    }
    Ok(state)
}

fn identity_params(cart_id: &str, hmac: &str) -> Params {
    vec![
        ("CartId".to_string(), cart_id.to_string()),
        ("HMAC".to_string(), hmac.to_string()),
    ]
}

fn item_params(items: &[CartItemRequest]) -> Params {
    let mut params = Vec::with_capacity(items.len() * 2);
    for (index, item) in items.iter().enumerate() {
        let prefix = format!("Item.{}", index + 1);
        match &item.key {
            CartItemKey::Asin(asin) => params.push((format!("{}.ASIN", prefix), asin.clone())),
            CartItemKey::OfferListingId(id) => {
                params.push((format!("{}.OfferListingId", prefix), id.clone()))
            }
        }
        params.push((format!("{}.Quantity", prefix), item.quantity.to_string()));
    }
    params
}
