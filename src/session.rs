use crate::catalog::Catalog;
use crate::discount::{total_after_discount, Discount, DiscountQuote};

/// One cart row. `product_id` stays `None` until the cashier picks a product;
/// an unbound row still carries a quantity.
#[derive(Clone, Debug, PartialEq)]
pub struct LineItem {
    pub id: u64,
    pub product_id: Option<u32>,
    pub quantity: u32,
}

/// Catalog-resolved view of a row, for rendering and transaction snapshots.
#[derive(Clone, Debug, PartialEq)]
pub struct LineView {
    pub line_id: u64,
    pub product_id: Option<u32>,
    pub product_name: Option<String>,
    pub quantity: u32,
    pub unit_price: f64,
    pub line_total: f64,
}

pub fn slot_id(slot: u8) -> String {
    format!("customer-{slot}")
}

/// A single customer's cart.
///
/// Totals are derived state: every mutation funnels through `recompute`, and
/// nothing else writes them. Line ids are monotonically increasing per
/// session and never reused, even across removals.
#[derive(Clone, Debug)]
pub struct CartSession {
    pub id: String,
    pub slot: u8,
    custom_name: Option<String>,
    lines: Vec<LineItem>,
    discount: Discount,
    next_line_id: u64,
    subtotal: f64,
    quote: DiscountQuote,
    total: f64,
    item_count: u32,
}

impl CartSession {
    /// A fresh session for a slot, with the initial empty row already added.
    pub fn new(slot: u8) -> Self {
        let mut session = Self::bare(slot, None, Discount::None, 0);
        session.add_line();
        session
    }

    /// A session shell without the initial row; the restore path replays
    /// persisted rows into it so line ids continue from the saved counter.
    pub(crate) fn bare(
        slot: u8,
        custom_name: Option<String>,
        discount: Discount,
        next_line_id: u64,
    ) -> Self {
        Self {
            id: slot_id(slot),
            slot,
            custom_name,
            lines: Vec::new(),
            discount,
            next_line_id,
            subtotal: 0.0,
            quote: DiscountQuote::none(),
            total: 0.0,
            item_count: 0,
        }
    }

    pub fn display_name(&self) -> String {
        self.custom_name
            .clone()
            .unwrap_or_else(|| format!("Customer {}", self.slot))
    }

    pub fn custom_name(&self) -> Option<&str> {
        self.custom_name.as_deref()
    }

    /// Empty input reverts to the default "Customer {slot}" name.
    pub fn set_custom_name(&mut self, name: &str) {
        let trimmed = name.trim();
        self.custom_name = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
    }

    pub fn lines(&self) -> &[LineItem] {
        &self.lines
    }

    pub fn line(&self, line_id: u64) -> Option<&LineItem> {
        self.lines.iter().find(|l| l.id == line_id)
    }

    pub fn discount(&self) -> Discount {
        self.discount
    }

    pub fn subtotal(&self) -> f64 {
        self.subtotal
    }

    pub fn quote(&self) -> &DiscountQuote {
        &self.quote
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn item_count(&self) -> u32 {
        self.item_count
    }

    /// Last line id handed out; persisted so ids survive a reload.
    pub fn line_counter(&self) -> u64 {
        self.next_line_id
    }

    /// True when any row has a product bound, regardless of quantity. Such a
    /// session cannot be closed.
    pub fn has_bound_product(&self) -> bool {
        self.lines.iter().any(|l| l.product_id.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Appends an unbound row with quantity 1 and returns its id.
    pub fn add_line(&mut self) -> u64 {
        self.next_line_id += 1;
        self.lines.push(LineItem {
            id: self.next_line_id,
            product_id: None,
            quantity: 1,
        });
        self.next_line_id
    }

    /// Binds a catalog entry to a row and resets its quantity to 1.
    /// Returns false when the row no longer exists.
    pub fn set_line_product(&mut self, line_id: u64, product_id: u32, catalog: &Catalog) -> bool {
        let Some(line) = self.lines.iter_mut().find(|l| l.id == line_id) else {
            return false;
        };
        line.product_id = Some(product_id);
        line.quantity = 1;
        self.recompute(catalog);
        true
    }

    /// Unbinds the product from a row, back to the "select a product" state.
    pub fn clear_line_product(&mut self, line_id: u64, catalog: &Catalog) -> bool {
        let Some(line) = self.lines.iter_mut().find(|l| l.id == line_id) else {
            return false;
        };
        line.product_id = None;
        self.recompute(catalog);
        true
    }

    pub fn set_line_quantity(&mut self, line_id: u64, quantity: u32, catalog: &Catalog) -> bool {
        let Some(line) = self.lines.iter_mut().find(|l| l.id == line_id) else {
            return false;
        };
        line.quantity = quantity;
        self.recompute(catalog);
        true
    }

    pub fn remove_line(&mut self, line_id: u64, catalog: &Catalog) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.id != line_id);
        let removed = self.lines.len() != before;
        if removed {
            self.recompute(catalog);
        }
        removed
    }

    pub fn set_discount(&mut self, discount: Discount, catalog: &Catalog) {
        self.discount = discount;
        self.recompute(catalog);
    }

    /// Clears rows and discount back to defaults after a completed
    /// transaction. Keeps the slot, the custom name and the line counter,
    /// and re-adds the initial empty row.
    pub fn reset(&mut self, catalog: &Catalog) {
        self.lines.clear();
        self.discount = Discount::None;
        self.add_line();
        self.recompute(catalog);
    }

    /// Recomputes subtotal, item count, discount quote and total from the
    /// row model. Idempotent: unchanged inputs produce identical results.
    ///
    /// The item count sums quantities across all rows, bound or not; only
    /// bound rows contribute to the subtotal.
    pub fn recompute(&mut self, catalog: &Catalog) {
        let mut subtotal = 0.0;
        let mut item_count = 0u32;
        for line in &self.lines {
            if let Some(product_id) = line.product_id {
                subtotal += catalog.price(product_id) * line.quantity as f64;
            }
            item_count += line.quantity;
        }
        self.subtotal = subtotal;
        self.item_count = item_count;
        self.quote = self.discount.quote(subtotal, item_count);
        self.total = total_after_discount(subtotal, &self.quote);
    }

    pub fn line_views(&self, catalog: &Catalog) -> Vec<LineView> {
        self.lines
            .iter()
            .map(|line| {
                let product = line.product_id.and_then(|id| catalog.get(id));
                let unit_price = product.map(|p| p.price).unwrap_or(0.0);
                LineView {
                    line_id: line.id,
                    product_id: line.product_id,
                    product_name: product.map(|p| p.name.clone()),
                    quantity: line.quantity,
                    unit_price,
                    line_total: unit_price * line.quantity as f64,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::builtin()
    }

    #[test]
    fn test_new_session_has_initial_row() {
        let session = CartSession::new(1);
        assert_eq!(session.id, "customer-1");
        assert_eq!(session.display_name(), "Customer 1");
        assert_eq!(session.lines().len(), 1);
        assert_eq!(session.lines()[0].quantity, 1);
        assert!(session.lines()[0].product_id.is_none());
        assert!(!session.has_bound_product());
    }

    #[test]
    fn test_line_ids_are_never_reused() {
        let catalog = catalog();
        let mut session = CartSession::new(1);
        let first = session.lines()[0].id;
        let second = session.add_line();
        assert_eq!((first, second), (1, 2));

        assert!(session.remove_line(second, &catalog));
        let third = session.add_line();
        assert_eq!(third, 3);
    }

    #[test]
    fn test_scenario_twelve_rice_volume() {
        let catalog = catalog();
        let mut session = CartSession::new(1);
        let line = session.lines()[0].id;

        session.set_line_product(line, 1, &catalog);
        session.set_line_quantity(line, 12, &catalog);
        assert_eq!(session.subtotal(), 9600.0);
        assert_eq!(session.item_count(), 12);

        session.set_discount(Discount::Volume, &catalog);
        assert_eq!(session.quote().amount, 480.0);
        assert_eq!(session.total(), 9120.0);
    }

    #[test]
    fn test_binding_resets_quantity_to_one() {
        let catalog = catalog();
        let mut session = CartSession::new(1);
        let line = session.lines()[0].id;

        session.set_line_quantity(line, 7, &catalog);
        session.set_line_product(line, 2, &catalog);
        assert_eq!(session.lines()[0].quantity, 1);
        assert_eq!(session.subtotal(), 600.0);
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let catalog = catalog();
        let mut session = CartSession::new(1);
        let line = session.lines()[0].id;
        session.set_line_product(line, 9, &catalog);
        session.set_line_quantity(line, 3, &catalog);
        session.set_discount(Discount::Custom(10.0), &catalog);

        let before = (session.subtotal(), session.total(), session.quote().clone());
        session.recompute(&catalog);
        session.recompute(&catalog);
        assert_eq!(
            before,
            (session.subtotal(), session.total(), session.quote().clone())
        );
    }

    #[test]
    fn test_zero_quantity_row_blocks_close_but_counts_nothing() {
        let catalog = catalog();
        let mut session = CartSession::new(1);
        let line = session.lines()[0].id;
        session.set_line_product(line, 1, &catalog);
        session.set_line_quantity(line, 0, &catalog);

        assert_eq!(session.subtotal(), 0.0);
        assert_eq!(session.item_count(), 0);
        // A bound product blocks close regardless of quantity.
        assert!(session.has_bound_product());
    }

    #[test]
    fn test_reset_keeps_name_and_counter() {
        let catalog = catalog();
        let mut session = CartSession::new(3);
        session.set_custom_name("Ada");
        let line = session.lines()[0].id;
        session.set_line_product(line, 4, &catalog);
        session.set_discount(Discount::Bulk, &catalog);
        let counter = session.line_counter();

        session.reset(&catalog);
        assert_eq!(session.display_name(), "Ada");
        assert_eq!(session.discount(), Discount::None);
        assert_eq!(session.subtotal(), 0.0);
        assert_eq!(session.lines().len(), 1);
        assert!(session.line_counter() > counter);
    }

    #[test]
    fn test_set_custom_name_empty_reverts_to_default() {
        let mut session = CartSession::new(2);
        session.set_custom_name("Bisi");
        assert_eq!(session.display_name(), "Bisi");
        session.set_custom_name("   ");
        assert_eq!(session.display_name(), "Customer 2");
    }

    #[test]
    fn test_line_views_resolve_catalog() {
        let catalog = catalog();
        let mut session = CartSession::new(1);
        let line = session.lines()[0].id;
        session.set_line_product(line, 10, &catalog);
        session.set_line_quantity(line, 2, &catalog);
        session.add_line();

        let views = session.line_views(&catalog);
        assert_eq!(views.len(), 2);
        assert_eq!(views[0].product_name.as_deref(), Some("Fish (1kg)"));
        assert_eq!(views[0].unit_price, 1000.0);
        assert_eq!(views[0].line_total, 2000.0);
        assert_eq!(views[1].product_name, None);
        assert_eq!(views[1].line_total, 0.0);
    }

    #[test]
    fn test_ops_on_missing_line_are_rejected() {
        let catalog = catalog();
        let mut session = CartSession::new(1);
        assert!(!session.set_line_product(42, 1, &catalog));
        assert!(!session.set_line_quantity(42, 5, &catalog));
        assert!(!session.remove_line(42, &catalog));
    }
}
