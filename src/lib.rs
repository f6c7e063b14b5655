// Client library for the Product Advertising API: product lookups and remote carts

pub mod api;
pub mod cart;
pub mod config;
pub mod error;
pub mod lookup;
pub mod signing;
pub mod transport;
pub mod xml_response;

// Re-export key types for convenience
pub use api::{Operation, Params, ProductAdvertisingApi};
pub use cart::{
    AmazonCart, CartAction, CartItemKey, CartItemRequest, CartModification, CartState, Quantity,
};
pub use config::{ClientConfig, Region};
pub use error::{ApiError, CartError, ClientError};
pub use lookup::{Amazon, IdType, ItemIds, LookupOptions, DEFAULT_RESPONSE_GROUP};
pub use transport::{HttpResponse, HttpTransport, Transport};
pub use xml_response::{
    CartItem, CartResponse, Item, ItemAttributes, ItemLookupResponse, Offer, Price,
};
