use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Undefined,
    ValidButNotDelivered,
    Delivered,
    Invalid,
}

/// Why an order was rejected, or `NoError` for a valid one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderValidationCode {
    #[default]
    Undefined,
    NoError,
    CardNumberInvalid,
    ExpiryDateInvalid,
    CvvInvalid,
    TotalIncorrect,
    PizzaNotDefined,
    MaxPizzaCountExceeded,
    PizzaFromMultipleRestaurants,
    RestaurantClosed,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pizza {
    pub name: String,
    pub price_in_pence: u32,
}

impl Pizza {
    pub fn new(name: impl Into<String>, price_in_pence: u32) -> Self {
        Self {
            name: name.into(),
            price_in_pence,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditCardInformation {
    pub credit_card_number: String,
    /// Expiry as `MM/YY`
    pub credit_card_expiry: String,
    pub cvv: String,
}

/// A customer order as served by the REST API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_no: String,
    pub order_date: NaiveDate,
    #[serde(default)]
    pub order_status: OrderStatus,
    #[serde(default)]
    pub order_validation_code: OrderValidationCode,
    pub price_total_in_pence: u32,
    pub pizzas_in_order: Vec<Pizza>,
    pub credit_card_information: CreditCardInformation,
}

impl Order {
    pub fn set_outcome(&mut self, status: OrderStatus, code: OrderValidationCode) {
        self.order_status = status;
        self.order_validation_code = code;
    }

    pub fn is_valid_but_not_delivered(&self) -> bool {
        self.order_status == OrderStatus::ValidButNotDelivered
            && self.order_validation_code == OrderValidationCode::NoError
    }
}
