use serde::{Deserialize, Serialize};

use crate::errors::GigzError;

pub mod category;
pub mod client;
pub mod gig;
pub mod order;
pub mod session;
pub mod storage;
pub mod store;
pub mod token;
pub mod user;

/// Token pair returned by `POST /users/login` and `POST /users/refresh-token`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    /// Short-lived bearer credential. Only ever held in memory.
    pub access_token: String,
    /// Long-lived credential, persisted through a `TokenStorage`.
    pub refresh_token: String,
}

/// Login payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Category object. `gigs` is populated by the server and is not kept in sync with the gig store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub gigs: Vec<Gig>,
}

/// Gig object, owned by the seller that created it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Gig {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub seller_id: String,
    pub title: String,
    /// ID of the category the gig is listed under.
    pub category: String,
    pub cover_image: String,
    #[serde(default)]
    pub images: Vec<String>,
    pub description: String,
    pub service_title: String,
    pub short_description: String,
    /// Delivery time in days.
    pub delivery_time: u32,
    #[serde(default)]
    pub revision_number: u32,
    #[serde(default)]
    pub features: Vec<String>,
    pub price: f64,
}

/// Payload for creating a gig.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGig {
    pub seller_id: String,
    pub title: String,
    pub category: String,
    pub cover_image: String,
    #[serde(default)]
    pub images: Vec<String>,
    pub description: String,
    pub service_title: String,
    pub short_description: String,
    pub delivery_time: u32,
    #[serde(default)]
    pub revision_number: u32,
    #[serde(default)]
    pub features: Vec<String>,
    pub price: f64,
}

impl NewGig {
    /// Checks the payload before it is sent.
    pub fn validate(&self) -> Result<(), GigzError> {
        if self.title.trim().is_empty() {
            return Err(GigzError::ValidationError("title must not be empty".into()));
        }
        validate_delivery_time(self.delivery_time)?;
        validate_price(self.price)
    }
}

/// Partial update for a gig. `None` fields are left untouched server-side.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GigPatch {
    pub seller_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_time: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

impl GigPatch {
    pub fn new(seller_id: impl Into<String>) -> Self {
        Self {
            seller_id: seller_id.into(),
            ..Self::default()
        }
    }

    /// Checks the fields that are set.
    pub fn validate(&self) -> Result<(), GigzError> {
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Err(GigzError::ValidationError("title must not be empty".into()));
            }
        }
        if let Some(days) = self.delivery_time {
            validate_delivery_time(days)?;
        }
        if let Some(price) = self.price {
            validate_price(price)?;
        }
        Ok(())
    }
}

fn validate_delivery_time(days: u32) -> Result<(), GigzError> {
    if days < 1 {
        return Err(GigzError::ValidationError(
            "delivery time must be at least one day".into(),
        ));
    }
    Ok(())
}

fn validate_price(price: f64) -> Result<(), GigzError> {
    if !price.is_finite() || price < 0.0 {
        return Err(GigzError::ValidationError(
            "price must be a non-negative number".into(),
        ));
    }
    Ok(())
}

/// Status of an order. Transitions are decided by the server.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

/// Order object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(alias = "_id")]
    pub id: String,
    pub gig_id: String,
    pub buyer_id: String,
    pub seller_id: String,
    pub price: f64,
    pub status: OrderStatus,
    /// ISO 8601 timestamp, as sent by the server.
    pub created_at: String,
    pub updated_at: String,
}

/// Payload for placing an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub gig_id: String,
    pub buyer_id: String,
    pub seller_id: String,
    pub price: f64,
}
