//! Cart aggregation
//!
//! Resolves cart lines against live products and computes totals. Lines whose
//! product no longer exists are kept in the resolved view (with no product)
//! but contribute nothing to the totals.

use std::collections::HashMap;

use serde::Serialize;
use uuid::Uuid;

use crate::core::cart::Cart;
use crate::core::product::Product;

/// A cart line with its product looked up
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedLine {
    pub product_id: Uuid,
    /// `None` when the product has been deleted since it was added
    pub product: Option<Product>,
    pub quantity: u32,
}

impl ResolvedLine {
    pub fn subtotal(&self) -> f64 {
        self.product
            .as_ref()
            .map_or(0.0, |p| p.price * f64::from(self.quantity))
    }
}

/// Derived cart totals
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    /// Rounded to cents
    pub total: f64,
    /// `total` with exactly two decimals
    pub formatted_total: String,
    pub item_count: u64,
    /// Lines whose product resolved
    pub line_count: usize,
    /// True iff the cart has any line, resolvable or not
    pub has_products: bool,
}

/// Pair every line with its product from `catalog`
pub fn resolve_lines(cart: &Cart, catalog: &HashMap<Uuid, Product>) -> Vec<ResolvedLine> {
    cart.products
        .iter()
        .map(|line| ResolvedLine {
            product_id: line.product,
            product: catalog.get(&line.product).cloned(),
            quantity: line.quantity,
        })
        .collect()
}

/// Aggregate resolved lines into totals
pub fn summarize(lines: &[ResolvedLine]) -> CartSummary {
    let mut total = 0.0;
    let mut item_count = 0u64;
    let mut line_count = 0;

    for line in lines.iter().filter(|l| l.product.is_some()) {
        total += line.subtotal();
        item_count += u64::from(line.quantity);
        line_count += 1;
    }

    let total = round_cents(total);
    CartSummary {
        total,
        formatted_total: format!("{:.2}", total),
        item_count,
        line_count,
        has_products: !lines.is_empty(),
    }
}

fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
