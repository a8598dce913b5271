use chrono::Weekday;
use serde::{Deserialize, Deserializer, de};

use super::{Order, Pizza};
use crate::geometry::Coordinate;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    pub name: String,
    pub location: Coordinate,
    #[serde(deserialize_with = "deserialize_weekdays")]
    pub opening_days: Vec<Weekday>,
    pub menu: Vec<Pizza>,
}

impl Restaurant {
    pub fn serves(&self, pizza: &Pizza) -> bool {
        self.menu.contains(pizza)
    }

    pub fn is_open_on(&self, day: Weekday) -> bool {
        self.opening_days.contains(&day)
    }
}

/// Find the restaurant an order is collected from: the first restaurant whose
/// menu has the order's first pizza.
pub fn find_restaurant_for<'a>(
    order: &Order,
    restaurants: &'a [Restaurant],
) -> Option<&'a Restaurant> {
    let first = order.pizzas_in_order.first()?;
    restaurants.iter().find(|r| r.serves(first))
}

fn parse_weekday(day: &str) -> Option<Weekday> {
    match day.to_ascii_uppercase().as_str() {
        "MONDAY" => Some(Weekday::Mon),
        "TUESDAY" => Some(Weekday::Tue),
        "WEDNESDAY" => Some(Weekday::Wed),
        "THURSDAY" => Some(Weekday::Thu),
        "FRIDAY" => Some(Weekday::Fri),
        "SATURDAY" => Some(Weekday::Sat),
        "SUNDAY" => Some(Weekday::Sun),
        _ => None,
    }
}

fn deserialize_weekdays<'de, D>(deserializer: D) -> Result<Vec<Weekday>, D::Error>
where
    D: Deserializer<'de>,
{
    let days: Vec<String> = Vec::deserialize(deserializer)?;
    days.iter()
        .map(|d| {
            parse_weekday(d).ok_or_else(|| de::Error::custom(format!("unknown weekday: {}", d)))
        })
        .collect()
}
