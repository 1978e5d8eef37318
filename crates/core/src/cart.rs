//! Shopping cart lines and login-time reconciliation.
//!
//! A cart is an ordered list of lines, each keyed by the product or combo it
//! refers to. Two carts exist for a shopper: the one held in their browsing
//! session (possibly anonymous) and the one persisted against their customer
//! record. When they log in the two are merged with [`Cart::merge`].
//!
//! ## Invariants
//!
//! - At most one line per [`LineItem`]
//! - Every line has a quantity of at least 1
//!
//! All mutating methods preserve both invariants.

use serde::{Deserialize, Serialize};

use crate::types::{ComboId, ProductId};

/// What a cart line refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum LineItem {
    /// A single product.
    Product(ProductId),
    /// A bundle of products sold at a combo price.
    Combo(ComboId),
}

/// A single cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// The product or combo.
    pub item: LineItem,
    /// Number of units (always >= 1 inside a [`Cart`]).
    pub quantity: u32,
}

/// Available stock for a line item.
///
/// `None` means the item is unknown or no longer sellable; such lines are
/// dropped whenever the cart is clamped.
pub trait StockLookup {
    /// Units currently available for `item`.
    fn available(&self, item: LineItem) -> Option<u32>;
}

impl<F> StockLookup for F
where
    F: Fn(LineItem) -> Option<u32>,
{
    fn available(&self, item: LineItem) -> Option<u32> {
        self(item)
    }
}

/// An ordered collection of unique cart lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<CartLine>", into = "Vec<CartLine>")]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// The cart's lines in display order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.lines
            .iter()
            .fold(0u32, |acc, line| acc.saturating_add(line.quantity))
    }

    /// Quantity of `item` in the cart, zero if absent.
    #[must_use]
    pub fn quantity_of(&self, item: LineItem) -> u32 {
        self.lines
            .iter()
            .find(|line| line.item == item)
            .map_or(0, |line| line.quantity)
    }

    /// Add `quantity` units of `item`, appending a new line if needed.
    ///
    /// Adding zero is a no-op.
    pub fn add(&mut self, item: LineItem, quantity: u32) {
        if quantity == 0 {
            return;
        }

        if let Some(line) = self.lines.iter_mut().find(|line| line.item == item) {
            line.quantity = line.quantity.saturating_add(quantity);
        } else {
            self.lines.push(CartLine { item, quantity });
        }
    }

    /// Set the quantity of `item`. Zero removes the line.
    pub fn set_quantity(&mut self, item: LineItem, quantity: u32) {
        if quantity == 0 {
            self.remove(item);
            return;
        }

        if let Some(line) = self.lines.iter_mut().find(|line| line.item == item) {
            line.quantity = quantity;
        } else {
            self.lines.push(CartLine { item, quantity });
        }
    }

    /// Remove the line for `item`. Returns whether a line was removed.
    pub fn remove(&mut self, item: LineItem) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| line.item != item);
        self.lines.len() != before
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Clamp every line to the stock reported by `stock`.
    ///
    /// Lines for unknown or sold-out items are dropped. Returns the items whose
    /// quantity changed (including dropped ones) so callers can tell the
    /// shopper.
    pub fn clamp_to_stock(&mut self, stock: &impl StockLookup) -> Vec<LineItem> {
        let mut adjusted = Vec::new();

        self.lines.retain_mut(|line| {
            let available = stock.available(line.item).unwrap_or(0);
            if line.quantity > available {
                adjusted.push(line.item);
                line.quantity = available;
            }
            line.quantity > 0
        });

        adjusted
    }

    /// Merge a session cart with a server-persisted cart.
    ///
    /// The result has exactly one line per item. Quantities of items present
    /// in both carts are summed, and every line is then clamped to the stock
    /// reported by `stock`. Server lines come first in their original order,
    /// followed by lines only the session cart had.
    #[must_use]
    pub fn merge(local: &Self, server: &Self, stock: &impl StockLookup) -> Self {
        let mut merged = Self::new();

        for line in server.lines.iter().chain(local.lines.iter()) {
            merged.add(line.item, line.quantity);
        }

        merged.clamp_to_stock(stock);
        merged
    }
}

impl From<Vec<CartLine>> for Cart {
    /// Build a cart from raw lines, folding duplicates and dropping zero
    /// quantities so that untrusted input (session or database JSON) always
    /// yields a valid cart.
    fn from(lines: Vec<CartLine>) -> Self {
        let mut cart = Self::new();
        for line in lines {
            cart.add(line.item, line.quantity);
        }
        cart
    }
}

impl From<Cart> for Vec<CartLine> {
    fn from(cart: Cart) -> Self {
        cart.lines
    }
}

impl FromIterator<CartLine> for Cart {
    fn from_iter<I: IntoIterator<Item = CartLine>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}
