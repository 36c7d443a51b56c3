use itertools::Itertools;
use serde::Deserialize;
use serde_json::from_str;
use std::io;

use crate::assets::asset_str;
use crate::util::format_naira_grouped;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "UPPERCASE")]
pub enum StockStatus {
    Critical,
    Low,
    Normal,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Performance {
    Excellent,
    Good,
    Average,
    Poor,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub name: String,
    pub current: u32,
    pub threshold: u32,
    pub status: StockStatus,
    pub reorder_qty: u32,
    pub unit_cost: f64,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSales {
    pub name: String,
    pub units_sold: u32,
    pub revenue: f64,
    pub performance: Performance,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffSales {
    pub name: String,
    pub transactions: u32,
    pub total_sales: f64,
    pub performance: Performance,
}

#[derive(Deserialize)]
struct InventoryFile {
    items: Vec<InventoryItem>,
}

#[derive(Deserialize)]
struct PerformanceFile {
    products: Vec<ProductSales>,
    staff: Vec<StaffSales>,
}

/// Reference datasets behind the reports dashboard. Read-only: the dashboard
/// renders and summarizes, it never writes back.
#[derive(Clone, Debug)]
pub struct ReportsData {
    pub inventory: Vec<InventoryItem>,
    pub product_sales: Vec<ProductSales>,
    pub staff_sales: Vec<StaffSales>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SalesSummary {
    pub total_sales: f64,
    pub total_transactions: u32,
    pub avg_transaction: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlertKind {
    Critical,
    Warning,
    Info,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Alert {
    pub kind: AlertKind,
    pub title: String,
    pub description: String,
    pub action: String,
}

impl ReportsData {
    pub fn seeded() -> Self {
        let inventory: InventoryFile =
            from_str(asset_str("inventory.json")).expect("unable to deserialize inventory seed");
        let performance: PerformanceFile = from_str(asset_str("sales_performance.json"))
            .expect("unable to deserialize sales performance seed");
        Self {
            inventory: inventory.items,
            product_sales: performance.products,
            staff_sales: performance.staff,
        }
    }

    pub fn critical_items(&self) -> Vec<&InventoryItem> {
        self.inventory
            .iter()
            .filter(|i| i.status == StockStatus::Critical)
            .collect()
    }

    pub fn low_items(&self) -> Vec<&InventoryItem> {
        self.inventory
            .iter()
            .filter(|i| i.status == StockStatus::Low)
            .collect()
    }

    pub fn out_of_stock_count(&self) -> usize {
        self.inventory.iter().filter(|i| i.current == 0).count()
    }

    pub fn poor_performers(&self) -> Vec<&ProductSales> {
        self.product_sales
            .iter()
            .filter(|p| p.performance == Performance::Poor)
            .collect()
    }

    /// Items flagged for reorder (a non-zero recommended quantity).
    pub fn reorder_items(&self) -> Vec<&InventoryItem> {
        self.inventory.iter().filter(|i| i.reorder_qty > 0).collect()
    }

    pub fn estimated_reorder_cost(&self) -> f64 {
        self.reorder_items()
            .iter()
            .map(|i| i.reorder_qty as f64 * i.unit_cost)
            .sum()
    }

    /// Best sellers first, capped at `n` rows.
    pub fn top_product_sales(&self, n: usize) -> Vec<&ProductSales> {
        self.product_sales
            .iter()
            .sorted_by_key(|p| std::cmp::Reverse(p.units_sold))
            .take(n)
            .collect()
    }

    pub fn sales_summary(&self) -> SalesSummary {
        let total_sales: f64 = self.product_sales.iter().map(|p| p.revenue).sum();
        let total_transactions: u32 = self.staff_sales.iter().map(|s| s.transactions).sum();
        let avg_transaction = if total_transactions > 0 {
            total_sales / total_transactions as f64
        } else {
            0.0
        };
        SalesSummary {
            total_sales,
            total_transactions,
            avg_transaction,
        }
    }

    pub fn top_performer(&self) -> Option<&StaffSales> {
        self.staff_sales
            .iter()
            .max_by(|a, b| a.total_sales.total_cmp(&b.total_sales))
    }
}

/// Stock- and performance-driven alerts. Empty means all systems normal.
pub fn generate_alerts(data: &ReportsData) -> Vec<Alert> {
    let mut alerts = Vec::new();

    let critical = data.critical_items();
    if !critical.is_empty() {
        alerts.push(Alert {
            kind: AlertKind::Critical,
            title: "Critical Stock Alert".to_string(),
            description: format!(
                "{} items are critically low or out of stock: {}",
                critical.len(),
                critical.iter().map(|i| i.name.as_str()).join(", ")
            ),
            action: "Reorder Now".to_string(),
        });
    }

    let low = data.low_items();
    if !low.is_empty() {
        alerts.push(Alert {
            kind: AlertKind::Warning,
            title: "Low Stock Warning".to_string(),
            description: format!(
                "{} items are running low: {}",
                low.len(),
                low.iter().map(|i| i.name.as_str()).join(", ")
            ),
            action: "Review Stock".to_string(),
        });
    }

    let poor = data.poor_performers();
    if !poor.is_empty() {
        alerts.push(Alert {
            kind: AlertKind::Info,
            title: "Performance Alert".to_string(),
            description: format!(
                "{} products showing poor sales performance this week",
                poor.len()
            ),
            action: "Analyze".to_string(),
        });
    }

    alerts
}

/// Action column of the inventory table.
pub fn inventory_action(status: StockStatus) -> &'static str {
    match status {
        StockStatus::Critical => "URGENT REORDER",
        StockStatus::Low => "Schedule Reorder",
        StockStatus::Normal => "Monitor",
    }
}

/// Priority column of the reorder table.
pub fn reorder_priority(status: StockStatus) -> &'static str {
    match status {
        StockStatus::Critical => "HIGH",
        _ => "MEDIUM",
    }
}

/// "John Doe" shortens to "John D." for the top-performer tile.
pub fn short_name(full_name: &str) -> String {
    let mut parts = full_name.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some(first), Some(last)) => {
            let initial = last.chars().next().map(|c| c.to_string()).unwrap_or_default();
            format!("{first} {initial}.")
        }
        (Some(first), None) => first.to_string(),
        _ => String::new(),
    }
}

pub fn export_inventory_csv<W: io::Write>(data: &ReportsData, writer: W) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["Product", "Current Stock", "Status", "Action Required"])?;
    for item in &data.inventory {
        wtr.write_record(vec![
            item.name.clone(),
            item.current.to_string(),
            item.status.to_string(),
            inventory_action(item.status).to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn export_sales_csv<W: io::Write>(data: &ReportsData, writer: W) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["Product", "Units Sold", "Revenue", "Performance"])?;
    for product in &data.product_sales {
        wtr.write_record(vec![
            product.name.clone(),
            product.units_sold.to_string(),
            format_naira_grouped(product.revenue),
            product.performance.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn export_staff_csv<W: io::Write>(data: &ReportsData, writer: W) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["Cashier", "Transactions", "Total Sales", "Performance"])?;
    for staff in &data.staff_sales {
        wtr.write_record(vec![
            staff.name.clone(),
            staff.transactions.to_string(),
            format_naira_grouped(staff.total_sales),
            staff.performance.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}
