// Serde records for the XML documents returned by the Product Advertising API.
//
// Every field defaults when the element is missing, and repeated elements land
// in a Vec whether they appear zero, one or many times.

use quick_xml::de::from_str;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct OperationRequest {
    pub request_id: String,
    pub request_processing_time: String,
}

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct RequestInfo {
    pub is_valid: String,
    pub errors: Errors,
}

impl RequestInfo {
    pub fn is_valid(&self) -> bool {
        self.is_valid.eq_ignore_ascii_case("true")
    }

    pub fn errors(&self) -> &[ErrorDetail] {
        &self.errors.errors
    }
}

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct Errors {
    #[serde(rename = "Error")]
    pub errors: Vec<ErrorDetail>,
}

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

// Document sent with non-2xx statuses, e.g. <ItemLookupErrorResponse>
#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct ErrorResponse {
    pub error: ErrorDetail,
    #[serde(rename = "RequestID")]
    pub request_id: String,
}

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct Price {
    pub amount: String,
    pub currency_code: String,
    pub formatted_price: String,
}

impl Price {
    /// Amount in the smallest currency unit, 0 when missing or malformed.
    pub fn cents(&self) -> i64 {
        self.amount.trim().parse().unwrap_or(0)
    }

    pub fn value(&self) -> f64 {
        self.cents() as f64 / 100.0
    }
}

// ---------------------------------------------------------------------------
// ItemLookup
// ---------------------------------------------------------------------------

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct ItemLookupResponse {
    pub operation_request: OperationRequest,
    pub items: Option<Items>,
}

impl ItemLookupResponse {
    /// Items of the response; a document without `Items` yields none.
    pub fn into_items(self) -> Vec<Item> {
        self.items.map(|items| items.items).unwrap_or_default()
    }
}

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct Items {
    pub request: RequestInfo,
    pub total_results: String,
    pub total_pages: String,
    #[serde(rename = "Item")]
    pub items: Vec<Item>,
}

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct Item {
    #[serde(rename = "ASIN")]
    pub asin: String,
    #[serde(rename = "ParentASIN")]
    pub parent_asin: String,
    #[serde(rename = "DetailPageURL")]
    pub detail_page_url: String,
    pub sales_rank: String,
    pub small_image: Option<Image>,
    pub medium_image: Option<Image>,
    pub large_image: Option<Image>,
    pub item_attributes: ItemAttributes,
    pub offer_summary: OfferSummary,
    pub offers: Offers,
}

impl Item {
    pub fn title(&self) -> &str {
        &self.item_attributes.title
    }

    pub fn sales_rank(&self) -> Option<u64> {
        self.sales_rank.trim().parse().ok()
    }

    /// Largest image available.
    pub fn image_url(&self) -> Option<&str> {
        self.large_image
            .as_ref()
            .or(self.medium_image.as_ref())
            .or(self.small_image.as_ref())
            .map(|image| image.url.as_str())
    }

    /// Listing ids usable in cart requests instead of the ASIN.
    pub fn offer_listing_ids(&self) -> Vec<&str> {
        self.offers
            .offers
            .iter()
            .map(|offer| offer.offer_listing.offer_listing_id.as_str())
            .filter(|id| !id.is_empty())
            .collect()
    }
}

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct Image {
    #[serde(rename = "URL")]
    pub url: String,
    pub height: Dimension,
    pub width: Dimension,
}

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default)]
pub struct Dimension {
    #[serde(rename = "@Units")]
    pub units: String,
    #[serde(rename = "$text")]
    pub value: String,
}

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct ItemAttributes {
    pub author: Vec<String>,
    pub binding: String,
    pub brand: String,
    #[serde(rename = "EAN")]
    pub ean: String,
    pub feature: Vec<String>,
    pub label: String,
    pub list_price: Option<Price>,
    pub manufacturer: String,
    pub model: String,
    #[serde(rename = "MPN")]
    pub mpn: String,
    pub product_group: String,
    pub product_type_name: String,
    pub publisher: String,
    pub title: String,
    #[serde(rename = "UPC")]
    pub upc: String,
}

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct OfferSummary {
    pub lowest_new_price: Option<Price>,
    pub lowest_used_price: Option<Price>,
    pub total_new: String,
    pub total_used: String,
}

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct Offers {
    pub total_offers: String,
    pub total_offer_pages: String,
    pub more_offers_url: String,
    #[serde(rename = "Offer")]
    pub offers: Vec<Offer>,
}

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct Offer {
    pub merchant: Merchant,
    pub offer_attributes: OfferAttributes,
    pub offer_listing: OfferListing,
}

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct Merchant {
    pub name: String,
}

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct OfferAttributes {
    pub condition: String,
}

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct OfferListing {
    pub offer_listing_id: String,
    pub price: Option<Price>,
    pub sale_price: Option<Price>,
    pub availability: String,
    pub is_eligible_for_prime: String,
}

// ---------------------------------------------------------------------------
// Cart operations (CartCreate, CartAdd, CartGet, CartModify, CartClear)
// ---------------------------------------------------------------------------

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct CartResponse {
    pub operation_request: OperationRequest,
    pub cart: CartDocument,
}

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct CartDocument {
    pub request: RequestInfo,
    pub cart_id: String,
    #[serde(rename = "HMAC")]
    pub hmac: String,
    #[serde(rename = "URLEncodedHMAC")]
    pub url_encoded_hmac: String,
    #[serde(rename = "PurchaseURL")]
    pub purchase_url: String,
    pub sub_total: Option<Price>,
    pub cart_items: CartItems,
    pub saved_for_later_items: SavedForLaterItems,
}

impl CartDocument {
    /// `SubTotal/Amount` converted from cents, 0.0 when absent.
    pub fn subtotal(&self) -> f64 {
        self.sub_total.as_ref().map(Price::value).unwrap_or(0.0)
    }
}

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct CartItems {
    pub sub_total: Option<Price>,
    #[serde(rename = "CartItem")]
    pub items: Vec<CartItem>,
}

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct SavedForLaterItems {
    pub sub_total: Option<Price>,
    #[serde(rename = "SavedForLaterItem")]
    pub items: Vec<CartItem>,
}

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct CartItem {
    pub cart_item_id: String,
    #[serde(rename = "ASIN")]
    pub asin: String,
    pub seller_nickname: String,
    pub quantity: String,
    pub title: String,
    pub product_group: String,
    pub price: Option<Price>,
    pub item_total: Option<Price>,
}

impl CartItem {
    pub fn quantity(&self) -> u32 {
        self.quantity.trim().parse().unwrap_or(0)
    }
}

pub fn parse_item_lookup(xml: &str) -> Result<ItemLookupResponse, ApiError> {
    from_str(xml).map_err(|e| ApiError::XmlParseError(e.to_string()))
}

pub fn parse_cart(xml: &str) -> Result<CartResponse, ApiError> {
    from_str(xml).map_err(|e| ApiError::XmlParseError(e.to_string()))
}

/// Parse an error document; `None` when the body is not one.
pub fn parse_error(xml: &str) -> Option<ErrorResponse> {
    from_str::<ErrorResponse>(xml)
        .ok()
        .filter(|response| !response.error.code.is_empty())
}

#[cfg(test)]
pub(crate) mod samples {
    pub const LOOKUP_XML: &str = r#"<?xml version="1.0" ?>
<ItemLookupResponse xmlns="http://webservices.amazon.com/AWSECommerceService/2013-08-01">
  <OperationRequest>
    <RequestId>6d6a3d1f-5b3d-4e4a-8c8e-0c3f0d3f4b11</RequestId>
    <RequestProcessingTime>0.0421</RequestProcessingTime>
  </OperationRequest>
  <Items>
    <Request>
      <IsValid>True</IsValid>
      <ItemLookupRequest>
        <IdType>ASIN</IdType>
        <ItemId>B00008OE6I</ItemId>
        <ItemId>0679722769</ItemId>
        <ItemId>BADASIN000</ItemId>
      </ItemLookupRequest>
      <Errors>
        <Error>
          <Code>AWS.InvalidParameterValue</Code>
          <Message>BADASIN000 is not a valid value for ItemId.</Message>
        </Error>
      </Errors>
    </Request>
    <Item>
      <ASIN>B00008OE6I</ASIN>
      <DetailPageURL>https://www.amazon.com/dp/B00008OE6I</DetailPageURL>
      <SalesRank>1523</SalesRank>
      <SmallImage>
        <URL>https://images.example.com/B00008OE6I._SL75_.jpg</URL>
        <Height Units="pixels">75</Height>
        <Width Units="pixels">75</Width>
      </SmallImage>
      <LargeImage>
        <URL>https://images.example.com/B00008OE6I.jpg</URL>
        <Height Units="pixels">500</Height>
        <Width Units="pixels">500</Width>
      </LargeImage>
      <ItemAttributes>
        <Brand>Kensington</Brand>
        <Feature>Portable power adapter</Feature>
        <ListPrice>
          <Amount>2999</Amount>
          <CurrencyCode>USD</CurrencyCode>
          <FormattedPrice>$29.99</FormattedPrice>
        </ListPrice>
        <ProductGroup>CE</ProductGroup>
        <Title>Kensington Travel Adapter</Title>
      </ItemAttributes>
      <OfferSummary>
        <LowestNewPrice>
          <Amount>2599</Amount>
          <CurrencyCode>USD</CurrencyCode>
          <FormattedPrice>$25.99</FormattedPrice>
        </LowestNewPrice>
        <TotalNew>12</TotalNew>
        <TotalUsed>0</TotalUsed>
      </OfferSummary>
      <Offers>
        <TotalOffers>1</TotalOffers>
        <TotalOfferPages>1</TotalOfferPages>
        <Offer>
          <Merchant><Name>Amazon.com</Name></Merchant>
          <OfferAttributes><Condition>New</Condition></OfferAttributes>
          <OfferListing>
            <OfferListingId>abc%2Boffer%3D%3D</OfferListingId>
            <Price>
              <Amount>2599</Amount>
              <CurrencyCode>USD</CurrencyCode>
              <FormattedPrice>$25.99</FormattedPrice>
            </Price>
            <Availability>Usually ships in 24 hours</Availability>
            <IsEligibleForPrime>1</IsEligibleForPrime>
          </OfferListing>
        </Offer>
      </Offers>
    </Item>
    <Item>
      <ASIN>0679722769</ASIN>
      <DetailPageURL>https://www.amazon.com/dp/0679722769</DetailPageURL>
      <ItemAttributes>
        <Author>James Joyce</Author>
        <Binding>Paperback</Binding>
        <Feature>Vintage International edition</Feature>
        <Feature>Corrected text</Feature>
        <ProductGroup>Book</ProductGroup>
        <Publisher>Vintage</Publisher>
        <Title>Ulysses</Title>
      </ItemAttributes>
    </Item>
  </Items>
</ItemLookupResponse>"#;

    pub const CART_CREATE_XML: &str = r#"<?xml version="1.0" ?>
<CartCreateResponse xmlns="http://webservices.amazon.com/AWSECommerceService/2013-08-01">
  <OperationRequest>
    <RequestId>0f3e5a4c-1111-2222-3333-444455556666</RequestId>
  </OperationRequest>
  <Cart>
    <Request>
      <IsValid>True</IsValid>
    </Request>
    <CartId>182-1234567-7654321</CartId>
    <HMAC>Tq4m1a+bXy/Zk2NtS9bq7w=</HMAC>
    <URLEncodedHMAC>Tq4m1a%2BbXy%2FZk2NtS9bq7w%3D</URLEncodedHMAC>
    <PurchaseURL>https://www.amazon.com/gp/cart/aws-merge.html?cart-id=182-1234567-7654321</PurchaseURL>
    <SubTotal>
      <Amount>5198</Amount>
      <CurrencyCode>USD</CurrencyCode>
      <FormattedPrice>$51.98</FormattedPrice>
    </SubTotal>
    <CartItems>
      <SubTotal>
        <Amount>5198</Amount>
        <CurrencyCode>USD</CurrencyCode>
        <FormattedPrice>$51.98</FormattedPrice>
      </SubTotal>
      <CartItem>
        <CartItemId>U3G241HVLLB8N6</CartItemId>
        <ASIN>B00008OE6I</ASIN>
        <SellerNickname>Amazon.com</SellerNickname>
        <Quantity>2</Quantity>
        <Title>Kensington Travel Adapter</Title>
        <ProductGroup>CE</ProductGroup>
        <Price>
          <Amount>2599</Amount>
          <CurrencyCode>USD</CurrencyCode>
          <FormattedPrice>$25.99</FormattedPrice>
        </Price>
        <ItemTotal>
          <Amount>5198</Amount>
          <CurrencyCode>USD</CurrencyCode>
          <FormattedPrice>$51.98</FormattedPrice>
        </ItemTotal>
      </CartItem>
    </CartItems>
  </Cart>
</CartCreateResponse>"#;

    pub const CART_TWO_ITEMS_XML: &str = r#"<?xml version="1.0" ?>
<CartAddResponse xmlns="http://webservices.amazon.com/AWSECommerceService/2013-08-01">
  <Cart>
    <Request><IsValid>True</IsValid></Request>
    <CartId>182-1234567-7654321</CartId>
    <HMAC>Tq4m1a+bXy/Zk2NtS9bq7w=</HMAC>
    <URLEncodedHMAC>Tq4m1a%2BbXy%2FZk2NtS9bq7w%3D</URLEncodedHMAC>
    <PurchaseURL>https://www.amazon.com/gp/cart/aws-merge.html?cart-id=182-1234567-7654321</PurchaseURL>
    <SubTotal>
      <Amount>6697</Amount>
      <CurrencyCode>USD</CurrencyCode>
      <FormattedPrice>$66.97</FormattedPrice>
    </SubTotal>
    <CartItems>
      <CartItem>
        <CartItemId>U3G241HVLLB8N6</CartItemId>
        <ASIN>B00008OE6I</ASIN>
        <Quantity>2</Quantity>
        <Title>Kensington Travel Adapter</Title>
      </CartItem>
      <CartItem>
        <CartItemId>U1YCPA8Y9ZJ2QK</CartItemId>
        <ASIN>0679722769</ASIN>
        <Quantity>1</Quantity>
        <Title>Ulysses</Title>
      </CartItem>
    </CartItems>
    <SavedForLaterItems>
      <SavedForLaterItem>
        <CartItemId>U8C0W4B2M1Q7ZZ</CartItemId>
        <ASIN>B000000001</ASIN>
        <Quantity>1</Quantity>
        <Title>Saved thing</Title>
      </SavedForLaterItem>
    </SavedForLaterItems>
  </Cart>
</CartAddResponse>"#;

    pub const CART_CLEARED_XML: &str = r#"<?xml version="1.0" ?>
<CartClearResponse>
  <Cart>
    <Request><IsValid>True</IsValid></Request>
    <CartId>182-1234567-7654321</CartId>
    <HMAC>Tq4m1a+bXy/Zk2NtS9bq7w=</HMAC>
    <URLEncodedHMAC>Tq4m1a%2BbXy%2FZk2NtS9bq7w%3D</URLEncodedHMAC>
    <PurchaseURL>https://www.amazon.com/gp/cart/aws-merge.html?cart-id=182-1234567-7654321</PurchaseURL>
  </Cart>
</CartClearResponse>"#;

    pub const CART_INVALID_ITEM_XML: &str = r#"<?xml version="1.0" ?>
<CartCreateResponse>
  <Cart>
    <Request>
      <IsValid>True</IsValid>
      <Errors>
        <Error>
          <Code>AWS.ECommerceService.ItemNotEligibleForCart</Code>
          <Message>Item BADASIN000 is not eligible to be added to the cart.</Message>
        </Error>
      </Errors>
    </Request>
  </Cart>
</CartCreateResponse>"#;

    pub const SIGNATURE_ERROR_XML: &str = r#"<?xml version="1.0"?>
<ItemLookupErrorResponse xmlns="http://ecs.amazonaws.com/doc/2013-08-01/">
  <Error>
    <Code>SignatureDoesNotMatch</Code>
    <Message>The request signature we calculated does not match the signature you provided.</Message>
  </Error>
  <RequestID>a1b2c3d4-0000-1111-2222-333344445555</RequestID>
</ItemLookupErrorResponse>"#;
}
