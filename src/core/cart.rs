//! Carts and their line items
//!
//! A cart holds at most one line per product. All mutation goes through the
//! methods here so the invariant cannot be broken by a caller pushing directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A `(product, quantity)` pair inside a cart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub product: Uuid,
    pub quantity: u32,
}

/// A shopping cart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    pub id: Uuid,
    #[serde(default)]
    pub products: Vec<LineItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    /// Create an empty cart
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            products: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn line(&self, product: &Uuid) -> Option<&LineItem> {
        self.products.iter().find(|l| &l.product == product)
    }

    /// Add `quantity` units, incrementing an existing line instead of duplicating it
    pub fn add(&mut self, product: Uuid, quantity: u32) {
        match self.products.iter_mut().find(|l| l.product == product) {
            Some(line) => line.quantity = line.quantity.saturating_add(quantity),
            None => self.products.push(LineItem { product, quantity }),
        }
        self.touch();
    }

    /// Drop the line for `product`; returns whether a line was removed
    pub fn remove(&mut self, product: &Uuid) -> bool {
        let before = self.products.len();
        self.products.retain(|l| &l.product != product);
        self.touch();
        self.products.len() < before
    }

    /// Overwrite the quantity of an existing line; returns false when absent
    pub fn set_quantity(&mut self, product: &Uuid, quantity: u32) -> bool {
        let Some(line) = self.products.iter_mut().find(|l| &l.product == product) else {
            return false;
        };
        line.quantity = quantity;
        self.touch();
        true
    }

    /// Replace every line. Repeated products are merged in first-seen order.
    pub fn replace(&mut self, lines: impl IntoIterator<Item = LineItem>) {
        self.products.clear();
        for line in lines {
            self.add(line.product, line.quantity);
        }
        self.touch();
    }

    pub fn clear(&mut self) {
        self.products.clear();
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Default for Cart {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_increments_existing_line() {
        let mut cart = Cart::new();
        let shoe = Uuid::new_v4();
        cart.add(shoe, 1);
        cart.add(shoe, 2);
        assert_eq!(cart.products.len(), 1);
        assert_eq!(cart.line(&shoe).unwrap().quantity, 3);
    }

    #[test]
    fn test_remove_and_set_quantity() {
        let mut cart = Cart::new();
        let shoe = Uuid::new_v4();
        let sock = Uuid::new_v4();
        cart.add(shoe, 1);
        cart.add(sock, 5);

        assert!(cart.set_quantity(&sock, 2));
        assert_eq!(cart.line(&sock).unwrap().quantity, 2);
        assert!(!cart.set_quantity(&Uuid::new_v4(), 2));

        assert!(cart.remove(&shoe));
        assert!(!cart.remove(&shoe));
        assert_eq!(cart.products, vec![LineItem { product: sock, quantity: 2 }]);
    }

    #[test]
    fn test_replace_merges_duplicates() {
        let mut cart = Cart::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        cart.add(Uuid::new_v4(), 9);

        cart.replace(vec![
            LineItem { product: a, quantity: 1 },
            LineItem { product: b, quantity: 2 },
            LineItem { product: a, quantity: 4 },
        ]);

        assert_eq!(
            cart.products,
            vec![
                LineItem { product: a, quantity: 5 },
                LineItem { product: b, quantity: 2 },
            ]
        );
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new();
        cart.add(Uuid::new_v4(), 1);
        cart.clear();
        assert!(cart.products.is_empty());
    }
}
