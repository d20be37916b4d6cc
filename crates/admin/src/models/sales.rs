//! Quotes, delivery pricing and orders.

use oakline_core::{LocationCostId, OrderId, Price, QuoteId, UserId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::resources::{Resource, ResourceKind};

/// A custom-work quote request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub id: QuoteId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Resource for Quote {
    type Id = QuoteId;
    const KIND: ResourceKind = ResourceKind::Quotes;
}

/// Delivery cost for one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationCost {
    pub id: LocationCostId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<Price>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Resource for LocationCost {
    type Id = LocationCostId;
    const KIND: ResourceKind = ResourceKind::LocationCosts;
}

/// A storefront order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<Price>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Resource for Order {
    type Id = OrderId;
    const KIND: ResourceKind = ResourceKind::Orders;
}
