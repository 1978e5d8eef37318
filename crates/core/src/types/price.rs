//! Price and offer-price arithmetic using decimal amounts.
//!
//! Every sellable thing (product, combo, cart line) carries a list price and an
//! optional offer price. The offer only counts when it is strictly lower than
//! the list price; otherwise the list price is what the customer pays.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A list price with an optional offer price.
///
/// Amounts are in the store currency's standard unit (rupees, dollars), not in
/// minor units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pricing {
    /// Regular list price.
    pub price: Decimal,
    /// Discounted price, if an offer is configured.
    pub offer_price: Option<Decimal>,
}

impl Pricing {
    /// Create a new pricing pair.
    #[must_use]
    pub const fn new(price: Decimal, offer_price: Option<Decimal>) -> Self {
        Self { price, offer_price }
    }

    /// Create a pricing pair without an offer.
    #[must_use]
    pub const fn list(price: Decimal) -> Self {
        Self {
            price,
            offer_price: None,
        }
    }

    /// Whether the offer price is present and below the list price.
    #[must_use]
    pub fn has_offer(&self) -> bool {
        self.offer_price.is_some_and(|offer| offer < self.price)
    }

    /// The price the customer actually pays per unit.
    #[must_use]
    pub fn effective(&self) -> Decimal {
        match self.offer_price {
            Some(offer) if offer < self.price => offer,
            _ => self.price,
        }
    }

    /// Amount saved per unit when the offer applies.
    #[must_use]
    pub fn savings(&self) -> Decimal {
        self.price - self.effective()
    }

    /// Discount as a whole percentage of the list price.
    ///
    /// Computed as `round((price - offer) / price * 100)` with halves rounded
    /// away from zero. Returns `None` when there is no applicable offer or the
    /// list price is zero.
    #[must_use]
    pub fn discount_percent(&self) -> Option<u32> {
        if !self.has_offer() || self.price <= Decimal::ZERO {
            return None;
        }

        let percent = (self.savings() / self.price * Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);

        percent.to_u32()
    }

    /// Multiply by a quantity, returning `(list total, paid total)`.
    #[must_use]
    pub fn totals_for(&self, quantity: u32) -> (Decimal, Decimal) {
        let qty = Decimal::from(quantity);
        (self.price * qty, self.effective() * qty)
    }

    /// Build the display representation sent to clients.
    #[must_use]
    pub fn display(&self) -> PriceDisplay {
        PriceDisplay::from(*self)
    }
}

/// Client-facing price block.
///
/// `offer_price` and `discount_percent` are only populated when the offer is
/// lower than the list price, so clients can render a strike-through without
/// re-implementing the comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceDisplay {
    /// List price.
    pub price: Decimal,
    /// Offer price, present only when it beats the list price.
    pub offer_price: Option<Decimal>,
    /// Price the customer pays.
    pub effective_price: Decimal,
    /// Whole-number discount percentage.
    pub discount_percent: Option<u32>,
}

impl From<Pricing> for PriceDisplay {
    fn from(pricing: Pricing) -> Self {
        let has_offer = pricing.has_offer();
        Self {
            price: pricing.price,
            offer_price: if has_offer { pricing.offer_price } else { None },
            effective_price: pricing.effective(),
            discount_percent: pricing.discount_percent(),
        }
    }
}
