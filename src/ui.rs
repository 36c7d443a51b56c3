pub mod receipt;
pub mod reports;
pub mod sales;
pub mod staff;

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::{App, SalesInput, Screen};

const HORIZONTAL_MARGIN: u16 = 1;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .constraints([Constraint::Min(0), Constraint::Length(2)])
            .split(area);

        match self.screen {
            Screen::Sales => sales::render(self, chunks[0], buf),
            Screen::Receipt => receipt::render(self, chunks[0], buf),
            Screen::Reports => reports::render(self, chunks[0], buf),
            Screen::Staff => staff::render(self, chunks[0], buf),
        }
        render_footer(self, chunks[1], buf);
    }
}

fn input_hint(app: &App) -> Option<String> {
    if app.screen == Screen::Sales {
        match &app.sales.input {
            SalesInput::Normal => None,
            SalesInput::EditQuantity(buffer) => {
                Some(format!("quantity: {buffer}_ (enter to apply, esc to cancel)"))
            }
            SalesInput::EditName(buffer) => {
                Some(format!("customer name: {buffer}_ (empty reverts to default)"))
            }
            SalesInput::EditCustomPercent(buffer) => {
                Some(format!("custom discount %: {buffer}_ (0-50)"))
            }
        }
    } else if app.screen == Screen::Receipt {
        app.receipt
            .as_ref()
            .and_then(|v| v.cashier_edit.as_ref())
            .map(|buffer| format!("cashier: {buffer}_ (enter to apply, esc to cancel)"))
    } else if app.screen == Screen::Staff {
        app.staff_view
            .search_input
            .as_ref()
            .map(|buffer| format!("search: {buffer}_ (enter to filter, esc to clear)"))
    } else {
        None
    }
}

fn render_footer(app: &App, area: Rect, buf: &mut Buffer) {
    let status_line = match &app.status {
        Some(status) => Line::from(Span::styled(
            status.clone(),
            Style::default().fg(Color::Yellow),
        )),
        None => Line::from(""),
    };

    let help = input_hint(app).unwrap_or_else(|| match app.screen {
        Screen::Sales => {
            "tab customer | n new | x close | a/r row | \u{2190}\u{2192} product | +/- q qty | \
             c name | 0 v b p u discount | enter checkout | F2 reports | F3 staff | esc quit"
                .to_string()
        }
        Screen::Receipt => "p print & complete | c cancel | e cashier | esc back".to_string(),
        Screen::Reports => "e export csv | r refresh | F3 staff | esc back".to_string(),
        Screen::Staff => {
            "tab focus | / search | a approve | x reject | d toggle active | 1-4 role | \
             e export | F2 reports | esc back"
                .to_string()
        }
    });

    let lines = vec![
        status_line,
        Line::from(Span::styled(help, Style::default().add_modifier(Modifier::DIM))),
    ];
    Paragraph::new(lines).render(area, buf);
}
