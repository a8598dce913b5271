//! Order validation.
//!
//! Checks run in a fixed order and the first failure decides the validation
//! code. Dates are taken from the order itself, so results do not depend on
//! when the program runs.

use chrono::{Datelike, NaiveDate};
use std::collections::HashSet;

use crate::config::constants::{MAX_PIZZAS_PER_ORDER, ORDER_CHARGE_IN_PENCE};
use crate::domain::{CreditCardInformation, Order, OrderStatus, OrderValidationCode, Restaurant};

/// Validate `order` against the known restaurants and record the outcome on it.
///
/// Returns the validation code that was set.
pub fn validate_order(order: &mut Order, restaurants: &[Restaurant]) -> OrderValidationCode {
    let code = check_order(order, restaurants);
    let status = if code == OrderValidationCode::NoError {
        OrderStatus::ValidButNotDelivered
    } else {
        OrderStatus::Invalid
    };
    order.set_outcome(status, code);
    code
}

fn check_order(order: &Order, restaurants: &[Restaurant]) -> OrderValidationCode {
    let pizzas = &order.pizzas_in_order;

    if pizzas.len() > MAX_PIZZAS_PER_ORDER {
        return OrderValidationCode::MaxPizzaCountExceeded;
    }
    if pizzas.is_empty() {
        return OrderValidationCode::Undefined;
    }

    if !pizzas
        .iter()
        .all(|pizza| restaurants.iter().any(|r| r.serves(pizza)))
    {
        return OrderValidationCode::PizzaNotDefined;
    }

    let pizza_total = pizzas
        .iter()
        .try_fold(0u32, |sum, p| sum.checked_add(p.price_in_pence))
        .and_then(|sum| sum.checked_add(ORDER_CHARGE_IN_PENCE));
    if pizza_total != Some(order.price_total_in_pence) {
        return OrderValidationCode::TotalIncorrect;
    }

    // Restaurants are visited in list order; a closed one is reported before
    // a second origin is.
    let weekday = order.order_date.weekday();
    let mut origins: HashSet<&str> = HashSet::new();
    for restaurant in restaurants {
        if !pizzas.iter().any(|pizza| restaurant.serves(pizza)) {
            continue;
        }
        if !restaurant.is_open_on(weekday) {
            return OrderValidationCode::RestaurantClosed;
        }
        origins.insert(restaurant.name.as_str());
        if origins.len() > 1 {
            return OrderValidationCode::PizzaFromMultipleRestaurants;
        }
    }

    check_card(&order.credit_card_information, order.order_date)
}

fn check_card(card: &CreditCardInformation, order_date: NaiveDate) -> OrderValidationCode {
    if !is_digits(&card.credit_card_number, 16) {
        return OrderValidationCode::CardNumberInvalid;
    }
    if !is_digits(&card.cvv, 3) {
        return OrderValidationCode::CvvInvalid;
    }
    match card_expiry(&card.credit_card_expiry) {
        Some(last_valid_day) if last_valid_day >= order_date => OrderValidationCode::NoError,
        _ => OrderValidationCode::ExpiryDateInvalid,
    }
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_digit())
}

/// Last day a card with expiry `MM/YY` is valid, or `None` if malformed.
fn card_expiry(expiry: &str) -> Option<NaiveDate> {
    let (month, year) = expiry.split_once('/')?;
    if month.len() != 2 || year.len() != 2 {
        return None;
    }
    let month: u32 = month.parse().ok()?;
    let year: i32 = year.parse::<i32>().ok()? + 2000;

    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    // Reject bad months before rolling over.
    NaiveDate::from_ymd_opt(year, month, 1)?;
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
}
