use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Row, Table, Widget},
};

use crate::reports::{
    generate_alerts, inventory_action, reorder_priority, short_name, AlertKind, StockStatus,
};
use crate::util::format_naira_grouped;
use crate::App;

pub fn render(app: &App, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),
            Constraint::Length(3),
            Constraint::Min(6),
            Constraint::Min(6),
        ])
        .split(area);

    render_alerts(app, chunks[0], buf);
    render_summary(app, chunks[1], buf);

    let upper = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[2]);
    render_inventory(app, upper[0], buf);
    render_sales(app, upper[1], buf);

    let lower = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[3]);
    render_reorder(app, lower[0], buf);
    render_staff_performance(app, lower[1], buf);
}

fn alert_color(kind: AlertKind) -> Color {
    match kind {
        AlertKind::Critical => Color::Red,
        AlertKind::Warning => Color::Yellow,
        AlertKind::Info => Color::Cyan,
    }
}

fn status_color(status: StockStatus) -> Color {
    match status {
        StockStatus::Critical => Color::Red,
        StockStatus::Low => Color::Yellow,
        StockStatus::Normal => Color::Green,
    }
}

fn render_alerts(app: &App, area: Rect, buf: &mut Buffer) {
    let alerts = generate_alerts(&app.reports);
    let lines: Vec<Line> = if alerts.is_empty() {
        vec![Line::from(Span::styled(
            "All Systems Normal - No critical issues detected. Business operations running smoothly.",
            Style::default().fg(Color::Green),
        ))]
    } else {
        alerts
            .iter()
            .map(|alert| {
                Line::from(vec![
                    Span::styled(
                        format!("{}: ", alert.title),
                        Style::default()
                            .fg(alert_color(alert.kind))
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(alert.description.clone()),
                    Span::styled(
                        format!("  [{}]", alert.action),
                        Style::default().add_modifier(Modifier::DIM),
                    ),
                ])
            })
            .collect()
    };

    Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Alerts"))
        .render(area, buf);
}

fn render_summary(app: &App, area: Rect, buf: &mut Buffer) {
    let summary = app.reports.sales_summary();
    let top = app
        .reports
        .top_performer()
        .map(|s| short_name(&s.name))
        .unwrap_or_default();
    let live = &app.history_summary;

    let line = Line::from(format!(
        "This Week: {} sales \u{2022} {} transactions \u{2022} avg {} \u{2022} top performer {}   |   Till: {} receipts, {}",
        format_naira_grouped(summary.total_sales),
        summary.total_transactions,
        format_naira_grouped(summary.avg_transaction),
        top,
        live.transactions,
        format_naira_grouped(live.revenue),
    ));

    Paragraph::new(line)
        .block(Block::default().borders(Borders::ALL).title("Summary"))
        .render(area, buf);
}

fn render_inventory(app: &App, area: Rect, buf: &mut Buffer) {
    let rows = app.reports.inventory.iter().map(|item| {
        Row::new(vec![
            Span::raw(item.name.clone()),
            Span::raw(item.current.to_string()),
            Span::styled(
                item.status.to_string(),
                Style::default().fg(status_color(item.status)),
            ),
            Span::raw(inventory_action(item.status)),
        ])
    });

    Table::new(
        rows,
        [
            Constraint::Min(16),
            Constraint::Length(6),
            Constraint::Length(10),
            Constraint::Min(16),
        ],
    )
    .header(
        Row::new(["Product", "Stock", "Status", "Action"])
            .style(Style::default().add_modifier(Modifier::BOLD)),
    )
    .block(
        Block::default().borders(Borders::ALL).title(format!(
            "Inventory ({} low, {} out of stock)",
            app.reports.low_items().len(),
            app.reports.out_of_stock_count()
        )),
    )
    .render(area, buf);
}

fn render_sales(app: &App, area: Rect, buf: &mut Buffer) {
    let rows = app.reports.top_product_sales(6).into_iter().map(|product| {
        Row::new(vec![
            product.name.clone(),
            product.units_sold.to_string(),
            format_naira_grouped(product.revenue),
            product.performance.to_string(),
        ])
    });

    Table::new(
        rows,
        [
            Constraint::Min(16),
            Constraint::Length(6),
            Constraint::Length(10),
            Constraint::Length(10),
        ],
    )
    .header(
        Row::new(["Product", "Units", "Revenue", "Rating"])
            .style(Style::default().add_modifier(Modifier::BOLD)),
    )
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title("Top Selling Products"),
    )
    .render(area, buf);
}

fn render_reorder(app: &App, area: Rect, buf: &mut Buffer) {
    let rows = app.reports.reorder_items().into_iter().map(|item| {
        Row::new(vec![
            item.name.clone(),
            item.current.to_string(),
            item.reorder_qty.to_string(),
            reorder_priority(item.status).to_string(),
        ])
    });

    Table::new(
        rows,
        [
            Constraint::Min(16),
            Constraint::Length(8),
            Constraint::Length(8),
            Constraint::Length(8),
        ],
    )
    .header(
        Row::new(["Product", "Current", "Reorder", "Priority"])
            .style(Style::default().add_modifier(Modifier::BOLD)),
    )
    .block(Block::default().borders(Borders::ALL).title(format!(
        "Reorder Recommendations (est. {})",
        format_naira_grouped(app.reports.estimated_reorder_cost())
    )))
    .render(area, buf);
}

fn render_staff_performance(app: &App, area: Rect, buf: &mut Buffer) {
    let rows = app.reports.staff_sales.iter().map(|staff| {
        Row::new(vec![
            staff.name.clone(),
            staff.transactions.to_string(),
            format_naira_grouped(staff.total_sales),
            staff.performance.to_string(),
        ])
    });

    Table::new(
        rows,
        [
            Constraint::Min(14),
            Constraint::Length(8),
            Constraint::Length(10),
            Constraint::Length(10),
        ],
    )
    .header(
        Row::new(["Cashier", "Sales", "Total", "Rating"])
            .style(Style::default().add_modifier(Modifier::BOLD)),
    )
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title("Staff Performance"),
    )
    .render(area, buf);
}
