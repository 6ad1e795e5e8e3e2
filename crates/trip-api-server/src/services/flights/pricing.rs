//! Live-search response shapes and cheapest-price extraction

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(default)]
    pub session_token: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub content: SearchContent,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchContent {
    #[serde(default)]
    pub results: SearchResults,
    #[serde(default)]
    pub sorting_options: SortingOptions,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct SearchResults {
    #[serde(default)]
    pub itineraries: BTreeMap<String, Itinerary>,
    #[serde(default)]
    pub agents: BTreeMap<String, Value>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct SortingOptions {
    #[serde(default)]
    pub cheapest: Vec<RankedItinerary>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedItinerary {
    pub itinerary_id: String,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Itinerary {
    #[serde(default)]
    pub pricing_options: Vec<PricingOption>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PricingOption {
    pub price: Price,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Price {
    #[serde(default, deserialize_with = "amount_from_string_or_number")]
    pub amount: Option<f64>,
    #[serde(default)]
    pub unit: PriceUnit,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum PriceUnit {
    #[serde(rename = "PRICE_UNIT_MILLI")]
    Milli,
    #[serde(rename = "PRICE_UNIT_CENTI")]
    Centi,
    #[serde(rename = "PRICE_UNIT_WHOLE")]
    Whole,
    #[default]
    #[serde(other)]
    Unspecified,
}

impl Price {
    /// Amount in whole currency units
    pub fn normalized(&self) -> Option<f64> {
        let amount = self.amount?;
        Some(match self.unit {
            PriceUnit::Milli => amount / 1000.0,
            PriceUnit::Centi => amount / 100.0,
            PriceUnit::Whole | PriceUnit::Unspecified => amount,
        })
    }
}

fn amount_from_string_or_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let amount = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    // "NaN" and "inf" parse as f64 but are not prices
    Ok(amount.filter(|v| v.is_finite()))
}

impl Itinerary {
    pub fn min_price(&self) -> Option<f64> {
        self.pricing_options
            .iter()
            .filter_map(|option| option.price.normalized())
            .fold(None, |best: Option<f64>, price| match best {
                Some(current) if current <= price => Some(current),
                _ => Some(price),
            })
    }
}

impl SearchResponse {
    /// Agents appear once at least one partner has priced the search
    pub fn has_agents(&self) -> bool {
        !self.content.results.agents.is_empty()
    }

    /// Lowest normalized price and the itinerary it belongs to.
    ///
    /// Uses the provider's cheapest ranking when it names a known itinerary,
    /// otherwise scans every itinerary.
    pub fn cheapest(&self) -> Option<(String, f64)> {
        let itineraries = &self.content.results.itineraries;

        let ranked = self
            .content
            .sorting_options
            .cheapest
            .first()
            .and_then(|ranked| {
                itineraries
                    .get(&ranked.itinerary_id)
                    .and_then(Itinerary::min_price)
                    .map(|price| (ranked.itinerary_id.clone(), price))
            });

        ranked.or_else(|| {
            itineraries
                .iter()
                .filter_map(|(id, itinerary)| itinerary.min_price().map(|price| (id.clone(), price)))
                .fold(None, |best: Option<(String, f64)>, candidate| match best {
                    Some(current) if current.1 <= candidate.1 => Some(current),
                    _ => Some(candidate),
                })
        })
    }
}
