pub mod order;
pub mod restaurant;

pub use order::{CreditCardInformation, Order, OrderStatus, OrderValidationCode, Pizza};
pub use restaurant::{Restaurant, find_restaurant_for};
