//! Shopping cart state.
//!
//! The browser owns the cart (it lives in local storage as a
//! `productId → quantity` map) and submits it as a list of lines at checkout.
//! [`Cart`] applies the same rules on both sides of that boundary: one entry
//! per product, positive quantities, and a per-line cap.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::ProductId;

/// Largest quantity a single cart line may hold.
pub const MAX_LINE_QUANTITY: u32 = 99;

/// A submitted cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// A normalised cart keyed by product.
///
/// Serializes as the `productId → quantity` map; deserializing normalises
/// the map like [`Cart::from_lines`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<ProductId, u32>",
    into = "BTreeMap<ProductId, u32>"
)]
pub struct Cart {
    lines: BTreeMap<ProductId, u32>,
}

impl From<BTreeMap<ProductId, u32>> for Cart {
    fn from(lines: BTreeMap<ProductId, u32>) -> Self {
        Self::from_lines(
            lines
                .into_iter()
                .map(|(product_id, quantity)| CartLine {
                    product_id,
                    quantity,
                }),
        )
    }
}

impl From<Cart> for BTreeMap<ProductId, u32> {
    fn from(cart: Cart) -> Self {
        cart.lines
    }
}

impl Cart {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a cart from submitted lines.
    ///
    /// Lines for the same product are summed, zero quantities are dropped,
    /// and every line is capped at [`MAX_LINE_QUANTITY`].
    #[must_use]
    pub fn from_lines(lines: impl IntoIterator<Item = CartLine>) -> Self {
        let mut cart = Self::new();
        for line in lines {
            cart.add(line.product_id, line.quantity);
        }
        cart
    }

    /// Add `quantity` of a product. Adding zero is a no-op.
    pub fn add(&mut self, product_id: ProductId, quantity: u32) {
        if quantity == 0 {
            return;
        }
        let entry = self.lines.entry(product_id).or_insert(0);
        *entry = entry.saturating_add(quantity).min(MAX_LINE_QUANTITY);
    }

    /// Replace a product's quantity; zero removes the line.
    pub fn set_quantity(&mut self, product_id: ProductId, quantity: u32) {
        if quantity == 0 {
            self.lines.remove(&product_id);
        } else {
            self.lines
                .insert(product_id, quantity.min(MAX_LINE_QUANTITY));
        }
    }

    /// Remove a product. Returns whether it was present.
    pub fn remove(&mut self, product_id: ProductId) -> bool {
        self.lines.remove(&product_id).is_some()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    #[must_use]
    pub fn quantity_of(&self, product_id: ProductId) -> u32 {
        self.lines.get(&product_id).copied().unwrap_or(0)
    }

    /// Lines in product-id order.
    pub fn lines(&self) -> impl Iterator<Item = CartLine> + '_ {
        self.lines
            .iter()
            .map(|(&product_id, &quantity)| CartLine {
                product_id,
                quantity,
            })
    }

    #[must_use]
    pub fn product_ids(&self) -> Vec<ProductId> {
        self.lines.keys().copied().collect()
    }

    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.lines.values().sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }
}
