use chrono::{DateTime, Local, SecondsFormat, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use unicode_width::UnicodeWidthStr;

use crate::catalog::Catalog;
use crate::discount::DiscountQuote;
use crate::error::PosError;
use crate::session::CartSession;
use crate::util::format_naira;

pub const RECEIPT_WIDTH: usize = 34;

/// Denormalized cart row inside a transaction record. Prices are carried as
/// already-formatted strings; the record is a display snapshot, not a ledger.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransactionItem {
    pub product_id: u32,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: String,
    pub total: String,
}

/// Immutable snapshot of one session handed to the checkout flow.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    pub customer_id: String,
    pub customer_name: String,
    pub items: Vec<TransactionItem>,
    pub subtotal: String,
    pub discount: DiscountQuote,
    pub total: String,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cashier: Option<String>,
}

/// Snapshots a session into a transaction record.
///
/// Fails on a cart with no rows, or with rows but no bound product. Unbound
/// rows are dropped from the snapshot. The session itself is left untouched;
/// it is only cleared once a completion signal comes back.
pub fn emit(session: &CartSession, catalog: &Catalog) -> Result<TransactionRecord, PosError> {
    if session.is_empty() {
        return Err(PosError::EmptyCart);
    }
    if !session.has_bound_product() {
        return Err(PosError::NoProductSelected);
    }

    let items = session
        .line_views(catalog)
        .into_iter()
        .filter_map(|view| {
            let product_id = view.product_id?;
            Some(TransactionItem {
                product_id,
                product_name: view.product_name.unwrap_or_default(),
                quantity: view.quantity,
                unit_price: format_naira(view.unit_price),
                total: format_naira(view.line_total),
            })
        })
        .collect();

    Ok(TransactionRecord {
        customer_id: session.id.clone(),
        customer_name: session.display_name(),
        items,
        subtotal: format_naira(session.subtotal()),
        discount: session.quote().clone(),
        total: format_naira(session.total()),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        cashier: None,
    })
}

/// Receipt numbers look like `INV-20250920-1432017`: date, wall-clock time
/// and a 3-digit random suffix.
pub fn receipt_number(now: DateTime<Local>) -> String {
    let suffix: u32 = rand::thread_rng().gen_range(0..1000);
    format!(
        "INV-{}-{}{:03}",
        now.format("%Y%m%d"),
        now.format("%H%M"),
        suffix
    )
}

/// Formats an ISO-8601 timestamp as `DD/MM/YYYY HH:MM` in local time.
/// Unparseable input is passed through unchanged.
pub fn format_receipt_date(iso: &str) -> String {
    match DateTime::parse_from_rfc3339(iso) {
        Ok(dt) => dt
            .with_timezone(&Local)
            .format("%d/%m/%Y %H:%M")
            .to_string(),
        Err(_) => iso.to_string(),
    }
}

/// Display name for the receipt header: custom names are shown with the slot
/// alongside ("Ada (Customer 2)"), default names as "Customer 2".
pub fn customer_display_name(record: &TransactionRecord) -> String {
    let number = record.customer_id.split('-').nth(1).unwrap_or("");
    if !record.customer_name.is_empty() && !record.customer_name.starts_with("Customer ") {
        format!("{} (Customer {})", record.customer_name, number)
    } else {
        format!("Customer {number}")
    }
}

/// Sum of item quantities across the record.
pub fn total_units(record: &TransactionRecord) -> u32 {
    record.items.iter().map(|i| i.quantity).sum()
}

/// Sanity check before completing a transaction: rows present, totals and
/// timestamp set, and every row fully populated with a positive quantity.
pub fn validate(record: &TransactionRecord) -> bool {
    if record.items.is_empty() {
        return false;
    }
    if record.subtotal.is_empty() || record.total.is_empty() || record.timestamp.is_empty() {
        return false;
    }
    record.items.iter().all(|item| {
        !item.product_name.is_empty()
            && item.quantity > 0
            && !item.unit_price.is_empty()
            && !item.total.is_empty()
    })
}

fn pad_line(left: &str, right: &str) -> String {
    let used = left.width() + right.width();
    let fill = RECEIPT_WIDTH.saturating_sub(used).max(1);
    format!("{left}{}{right}", " ".repeat(fill))
}

fn center_line(text: &str) -> String {
    let fill = RECEIPT_WIDTH.saturating_sub(text.width()) / 2;
    format!("{}{text}", " ".repeat(fill))
}

/// Renders the thermal-style plain-text receipt.
pub fn render_receipt_text(record: &TransactionRecord, receipt_no: &str, cashier: &str) -> String {
    let rule = "-".repeat(RECEIPT_WIDTH);
    let mut out = String::new();
    out.push_str(&center_line("RETAIL POS DEMO"));
    out.push('\n');
    out.push_str(&center_line("Lagos, Nigeria"));
    out.push('\n');
    out.push_str(&rule);
    out.push('\n');
    out.push_str(&format!("Receipt:  {receipt_no}\n"));
    out.push_str(&format!(
        "Date:     {}\n",
        format_receipt_date(&record.timestamp)
    ));
    out.push_str(&format!("Customer: {}\n", customer_display_name(record)));
    out.push_str(&format!("Cashier:  {cashier}\n"));
    out.push_str(&rule);
    out.push('\n');
    for item in &record.items {
        out.push_str(&item.product_name);
        out.push('\n');
        out.push_str(&pad_line(
            &format!("  {} x {}", item.quantity, item.unit_price),
            &item.total,
        ));
        out.push('\n');
    }
    out.push_str(&rule);
    out.push('\n');
    out.push_str(&pad_line("Subtotal", &record.subtotal));
    out.push('\n');
    if record.discount.applies() {
        out.push_str(&pad_line(
            &record.discount.label,
            &format!("-{}", format_naira(record.discount.amount)),
        ));
        out.push('\n');
    }
    out.push_str(&pad_line("TOTAL", &record.total));
    out.push('\n');
    out.push_str(&rule);
    out.push('\n');
    out.push_str(&center_line("Thank you for your patronage!"));
    out.push('\n');
    out
}

/// Writes the receipt under the receipts directory, named by receipt number.
pub fn write_receipt_file(
    dir: &Path,
    record: &TransactionRecord,
    receipt_no: &str,
    cashier: &str,
) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{receipt_no}.txt"));
    fs::write(&path, render_receipt_text(record, receipt_no, cashier))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discount::Discount;
    use assert_matches::assert_matches;

    fn session_with_items() -> (CartSession, Catalog) {
        let catalog = Catalog::builtin();
        let mut session = CartSession::new(2);
        let line = session.lines()[0].id;
        session.set_line_product(line, 1, &catalog);
        session.set_line_quantity(line, 12, &catalog);
        session.set_discount(Discount::Volume, &catalog);
        (session, catalog)
    }

    #[test]
    fn test_emit_empty_cart() {
        let catalog = Catalog::builtin();
        let mut session = CartSession::new(1);
        let line = session.lines()[0].id;
        session.remove_line(line, &catalog);
        assert_matches!(emit(&session, &catalog), Err(PosError::EmptyCart));
    }

    #[test]
    fn test_emit_requires_a_bound_product() {
        let catalog = Catalog::builtin();
        let session = CartSession::new(1);
        assert_matches!(emit(&session, &catalog), Err(PosError::NoProductSelected));
    }

    #[test]
    fn test_emit_snapshots_the_session() {
        let (session, catalog) = session_with_items();
        let record = emit(&session, &catalog).unwrap();

        assert_eq!(record.customer_id, "customer-2");
        assert_eq!(record.customer_name, "Customer 2");
        assert_eq!(record.items.len(), 1);
        assert_eq!(record.items[0].product_name, "Rice (1kg)");
        assert_eq!(record.items[0].unit_price, "₦800.00");
        assert_eq!(record.items[0].total, "₦9600.00");
        assert_eq!(record.subtotal, "₦9600.00");
        assert_eq!(record.discount.amount, 480.0);
        assert_eq!(record.total, "₦9120.00");
        assert_eq!(total_units(&record), 12);
        assert!(validate(&record));

        // Emission does not clear the cart.
        assert!(session.has_bound_product());
    }

    #[test]
    fn test_emit_drops_unbound_rows() {
        let (mut session, catalog) = session_with_items();
        session.add_line();
        let record = emit(&session, &catalog).unwrap();
        assert_eq!(record.items.len(), 1);
    }

    #[test]
    fn test_receipt_number_shape() {
        let now = Local::now();
        let number = receipt_number(now);
        let date_part = now.format("%Y%m%d").to_string();
        assert!(number.starts_with(&format!("INV-{date_part}-")));
        // INV- + 8 date digits + dash + 4 time digits + 3 random digits
        assert_eq!(number.len(), 4 + 8 + 1 + 7);
    }

    #[test]
    fn test_customer_display_name() {
        let (mut session, catalog) = session_with_items();
        let record = emit(&session, &catalog).unwrap();
        assert_eq!(customer_display_name(&record), "Customer 2");

        session.set_custom_name("Ada");
        let record = emit(&session, &catalog).unwrap();
        assert_eq!(customer_display_name(&record), "Ada (Customer 2)");
    }

    #[test]
    fn test_validate_rejects_zero_quantity() {
        let (session, catalog) = session_with_items();
        let mut record = emit(&session, &catalog).unwrap();
        record.items[0].quantity = 0;
        assert!(!validate(&record));
    }

    #[test]
    fn test_receipt_text_contains_discount_row_only_when_applied() {
        let (mut session, catalog) = session_with_items();
        let record = emit(&session, &catalog).unwrap();
        let text = render_receipt_text(&record, "INV-20250920-1432017", "John Doe");
        assert!(text.contains("Volume discount (10+ items)"));
        assert!(text.contains("-₦480.00"));

        session.set_discount(Discount::None, &catalog);
        let record = emit(&session, &catalog).unwrap();
        let text = render_receipt_text(&record, "INV-20250920-1432017", "John Doe");
        assert!(!text.contains("-₦"));
        assert!(text.contains("TOTAL"));
    }

    #[test]
    fn test_record_json_roundtrip() {
        let (session, catalog) = session_with_items();
        let record = emit(&session, &catalog).unwrap();
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"customerId\":\"customer-2\""));
        let back: TransactionRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, back);
    }
}
