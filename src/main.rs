pub mod app_dirs;
pub mod assets;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod discount;
pub mod error;
pub mod history;
pub mod registry;
pub mod reports;
pub mod runtime;
pub mod session;
pub mod staff;
pub mod store;
pub mod ui;
pub mod util;

use crate::{
    app_dirs::AppDirs,
    catalog::Catalog,
    checkout::TransactionRecord,
    config::{Config, ConfigStore, FileConfigStore},
    discount::Discount,
    error::PosError,
    history::{HistoryDb, HistorySummary},
    registry::SessionRegistry,
    reports::ReportsData,
    runtime::{CrosstermEventSource, FixedTicker, PosEvent, Runner},
    staff::{StaffDirectory, StaffRole},
    store::{CompletionSignal, PosStore},
};
use chrono::Local;
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use log::warn;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    fs,
    io::{self, stdin},
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

const TICK_RATE_MS: u64 = 250;

/// terminal point-of-sale with multi-customer carts and receipts
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal point-of-sale demo: juggle up to five customer carts with tiered discounts, print receipts, browse the staff directory, and keep an eye on the business reports."
)]
pub struct Cli {
    /// directory for session state, receipts and history (defaults to the user state dir)
    #[clap(short = 'd', long)]
    data_dir: Option<PathBuf>,

    /// cashier name shown on receipts
    #[clap(short = 'c', long)]
    cashier: Option<String>,

    /// seconds between backstop saves of the session state
    #[clap(long)]
    save_interval: Option<u64>,

    /// write the report tables as CSV files into the data directory and exit
    #[clap(long)]
    export_reports: bool,
}

impl Cli {
    fn state_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .or_else(AppDirs::state_dir)
            .unwrap_or_else(|| PathBuf::from(".till"))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    Sales,
    Receipt,
    Reports,
    Staff,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum SalesInput {
    #[default]
    Normal,
    EditQuantity(String),
    EditName(String),
    EditCustomPercent(String),
}

#[derive(Debug, Default)]
pub struct SalesView {
    pub selected_row: usize,
    pub input: SalesInput,
}

#[derive(Debug)]
pub struct ReceiptView {
    pub record: TransactionRecord,
    pub receipt_number: String,
    pub cashier_edit: Option<String>,
}

#[derive(Debug, Default)]
pub struct StaffView {
    pub selected: usize,
    pub pending_selected: usize,
    pub focus_pending: bool,
    pub search_input: Option<String>,
    pub filter: String,
}

pub struct App {
    pub registry: SessionRegistry,
    pub store: PosStore,
    pub staff: StaffDirectory,
    pub reports: ReportsData,
    pub history: Option<HistoryDb>,
    pub history_summary: HistorySummary,
    pub screen: Screen,
    pub sales: SalesView,
    pub receipt: Option<ReceiptView>,
    pub staff_view: StaffView,
    pub status: Option<String>,
    pub cashier: String,
    state_dir: PathBuf,
    save_interval: Duration,
    refresh_interval: Duration,
    last_save: Instant,
    last_refresh: Instant,
}

impl App {
    pub fn new(cli: Cli) -> Self {
        let config = FileConfigStore::new().load();
        Self::with_config(cli, config)
    }

    fn with_config(cli: Cli, config: Config) -> Self {
        let state_dir = cli.state_dir();
        if let Err(err) = fs::create_dir_all(&state_dir) {
            warn!("could not create state dir {}: {err}", state_dir.display());
        }
        let store = PosStore::with_dir(state_dir.join("store"));
        let registry = SessionRegistry::load_or_bootstrap(
            Catalog::builtin(),
            PosStore::with_dir(state_dir.join("store")),
        );
        let history = match HistoryDb::open(state_dir.join("history.db")) {
            Ok(db) => Some(db),
            Err(err) => {
                warn!("sales history unavailable: {err}");
                None
            }
        };

        let cashier = cli
            .cashier
            .or_else(|| store.cashier())
            .unwrap_or(config.cashier);
        let save_interval =
            Duration::from_secs(cli.save_interval.unwrap_or(config.save_interval_secs).max(1));

        let mut app = Self {
            registry,
            store,
            staff: StaffDirectory::seeded(),
            reports: ReportsData::seeded(),
            history,
            history_summary: HistorySummary::default(),
            screen: Screen::Sales,
            sales: SalesView::default(),
            receipt: None,
            staff_view: StaffView::default(),
            status: None,
            cashier,
            state_dir,
            save_interval,
            refresh_interval: Duration::from_secs(config.reports_refresh_secs.max(1)),
            last_save: Instant::now(),
            last_refresh: Instant::now(),
        };

        // A completion signal left over from a previous run resets exactly
        // that customer's slot; a cancellation is consumed without clearing.
        if let Some(signal) = app.store.take_completed() {
            if app.registry.apply_completion(&signal) {
                app.set_status(format!(
                    "Receipt printed successfully for {}! Slot is ready for the next transaction.",
                    signal.customer_name
                ));
            }
        }
        app.store.take_cancelled();
        app.refresh_history();
        app
    }

    fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
    }

    fn report_err(&mut self, err: PosError) {
        self.status = Some(err.to_string());
    }

    fn active_id(&self) -> Option<String> {
        self.registry.active_id().map(str::to_string)
    }

    fn active_row_count(&self) -> usize {
        self.registry
            .active()
            .map(|s| s.lines().len())
            .unwrap_or(0)
    }

    fn clamp_selected_row(&mut self) {
        let rows = self.active_row_count();
        if rows == 0 {
            self.sales.selected_row = 0;
        } else if self.sales.selected_row >= rows {
            self.sales.selected_row = rows - 1;
        }
    }

    fn selected_line_id(&self) -> Option<u64> {
        self.registry
            .active()
            .and_then(|s| s.lines().get(self.sales.selected_row))
            .map(|l| l.id)
    }

    fn active_custom_name(&self) -> String {
        self.registry
            .active()
            .and_then(|s| s.custom_name())
            .unwrap_or_default()
            .to_string()
    }

    fn new_customer(&mut self) {
        match self.registry.create_session() {
            Ok(_) => {
                self.sales = SalesView::default();
                self.status = None;
            }
            Err(err) => self.report_err(err),
        }
    }

    fn close_active_customer(&mut self) {
        let Some(id) = self.active_id() else { return };
        match self.registry.close_session(&id) {
            Ok(()) => {
                self.sales = SalesView::default();
                self.status = None;
            }
            Err(err) => self.report_err(err),
        }
    }

    fn shift_customer(&mut self, delta: i32) {
        let sessions = self.registry.sessions();
        if sessions.is_empty() {
            return;
        }
        let current = self
            .active_id()
            .and_then(|id| sessions.iter().position(|s| s.id == id))
            .unwrap_or(0);
        let count = sessions.len() as i32;
        let next = (current as i32 + delta).rem_euclid(count) as usize;
        let id = sessions[next].id.clone();
        if let Err(err) = self.registry.switch_active(&id) {
            self.report_err(err);
        }
        self.sales = SalesView::default();
    }

    fn add_row(&mut self) {
        let Some(id) = self.active_id() else { return };
        match self.registry.add_line(&id) {
            Ok(_) => {
                self.sales.selected_row = self.active_row_count().saturating_sub(1);
            }
            Err(err) => self.report_err(err),
        }
    }

    fn remove_row(&mut self) {
        let Some(id) = self.active_id() else { return };
        let Some(line_id) = self.selected_line_id() else {
            return;
        };
        if let Err(err) = self.registry.remove_line(&id, line_id) {
            self.report_err(err);
        }
        self.clamp_selected_row();
    }

    /// Left/right walks the catalog on the selected row; stepping left of the
    /// first product unbinds the row again.
    fn cycle_product(&mut self, delta: i32) {
        let Some(id) = self.active_id() else { return };
        let Some(line_id) = self.selected_line_id() else {
            return;
        };
        let catalog = self.registry.catalog().clone();
        let current = self
            .registry
            .get(&id)
            .and_then(|s| s.line(line_id))
            .and_then(|l| l.product_id);

        let products = catalog.products();
        let next = match current {
            None => {
                if delta >= 0 {
                    products.first().map(|p| p.id)
                } else {
                    None
                }
            }
            Some(pid) => {
                let position = catalog.position(pid).unwrap_or(0) as i32 + delta;
                if position < 0 {
                    None
                } else {
                    let clamped = (position as usize).min(products.len().saturating_sub(1));
                    products.get(clamped).map(|p| p.id)
                }
            }
        };

        let result = match next {
            Some(pid) => self.registry.set_line_product(&id, line_id, pid),
            None => self.registry.clear_line_product(&id, line_id),
        };
        if let Err(err) = result {
            self.report_err(err);
        }
    }

    fn bump_quantity(&mut self, delta: i64) {
        let Some(id) = self.active_id() else { return };
        let Some(line_id) = self.selected_line_id() else {
            return;
        };
        let current = self
            .registry
            .get(&id)
            .and_then(|s| s.line(line_id))
            .map(|l| l.quantity)
            .unwrap_or(0);
        let quantity = (current as i64 + delta).max(0) as u32;
        if let Err(err) = self.registry.set_line_quantity(&id, line_id, quantity) {
            self.report_err(err);
        }
    }

    fn commit_quantity(&mut self, buffer: &str) {
        let Some(id) = self.active_id() else { return };
        let Some(line_id) = self.selected_line_id() else {
            return;
        };
        let quantity = util::parse_quantity(buffer);
        if let Err(err) = self.registry.set_line_quantity(&id, line_id, quantity) {
            self.report_err(err);
        }
    }

    fn commit_name(&mut self, buffer: &str) {
        let Some(id) = self.active_id() else { return };
        if let Err(err) = self.registry.set_customer_name(&id, buffer) {
            self.report_err(err);
        }
    }

    fn set_discount_kind(&mut self, discount: Discount) {
        let Some(id) = self.active_id() else { return };
        if let Err(err) = self.registry.set_discount(&id, discount) {
            self.report_err(err);
        }
    }

    fn commit_custom_percent(&mut self, buffer: &str) {
        let percent = buffer.trim().parse::<f64>().unwrap_or(0.0);
        self.set_discount_kind(Discount::Custom(percent));
    }

    fn proceed_to_checkout(&mut self) {
        let Some(id) = self.active_id() else { return };
        match self.registry.emit(&id) {
            Ok(record) => {
                self.receipt = Some(ReceiptView {
                    record,
                    receipt_number: checkout::receipt_number(Local::now()),
                    cashier_edit: None,
                });
                self.screen = Screen::Receipt;
                self.status = None;
            }
            Err(err) => self.report_err(err),
        }
    }

    /// "Prints" the receipt: records history, writes the receipt file, and
    /// signals completion so the customer's slot gets reset.
    fn complete_transaction(&mut self, action: &str) {
        let Some(view) = self.receipt.take() else {
            return;
        };
        if !checkout::validate(&view.record) {
            self.set_status("Invalid receipt data. Please return to sales and try again.");
            self.receipt = Some(view);
            return;
        }

        if let Some(db) = &mut self.history {
            if let Err(err) = db.record(&view.record, &view.receipt_number, &self.cashier) {
                warn!("could not record transaction in history: {err}");
            }
        }
        match checkout::write_receipt_file(
            &self.state_dir.join("receipts"),
            &view.record,
            &view.receipt_number,
            &self.cashier,
        ) {
            Ok(path) => log::info!("receipt written to {}", path.display()),
            Err(err) => warn!("could not write receipt file: {err}"),
        }

        self.store
            .put_completed(&CompletionSignal::completed(&view.record, action));
        self.store.clear_transaction();

        // Back on the sales screen the pending signal is consumed, the same
        // round trip the two pages make through the shared store.
        if let Some(signal) = self.store.take_completed() {
            self.registry.apply_completion(&signal);
            let number = signal.customer_id.split('-').nth(1).unwrap_or("");
            self.set_status(format!(
                "Receipt printed successfully for {}! Customer {} is ready for the next transaction.",
                signal.customer_name, number
            ));
        }
        self.refresh_history();
        self.screen = Screen::Sales;
        self.sales = SalesView::default();
    }

    /// Returns to sales without completing; the cart stays intact.
    fn cancel_transaction(&mut self, action: &str) {
        if let Some(view) = self.receipt.take() {
            self.store
                .put_cancelled(&CompletionSignal::cancelled(&view.record, action));
            self.store.clear_transaction();
            self.store.take_cancelled();
            self.set_status(format!(
                "Transaction cancelled for {}. The cart is unchanged.",
                view.record.customer_name
            ));
        }
        self.screen = Screen::Sales;
        self.sales = SalesView::default();
    }

    fn commit_cashier(&mut self, name: &str) {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            self.set_status("Please enter a cashier name");
            return;
        }
        self.cashier = trimmed.to_string();
        self.store.set_cashier(trimmed);
        if let Some(view) = &mut self.receipt {
            view.record.cashier = Some(trimmed.to_string());
            self.store.put_transaction(&view.record);
        }
        self.set_status("Cashier updated");
    }

    fn refresh_history(&mut self) {
        if let Some(db) = &self.history {
            match db.summary() {
                Ok(summary) => self.history_summary = summary,
                Err(err) => warn!("could not summarize history: {err}"),
            }
        }
    }

    fn export_reports(&mut self) {
        let dir = self.state_dir.join("reports");
        match export_report_files(&dir, &self.reports) {
            Ok(files) => self.set_status(format!(
                "Exported {} report files to {}",
                files.len(),
                dir.display()
            )),
            Err(err) => self.set_status(format!("Report export failed: {err}")),
        }
    }

    fn export_staff(&mut self) {
        let dir = self.state_dir.join("reports");
        let name = format!("staff_data_{}.csv", Local::now().format("%Y-%m-%d"));
        let result = fs::create_dir_all(&dir)
            .map_err(csv::Error::from)
            .and_then(|_| {
                let file = fs::File::create(dir.join(&name))?;
                self.staff.export_csv(file)
            });
        match result {
            Ok(()) => self.set_status(format!("Staff data exported to {}", dir.join(name).display())),
            Err(err) => self.set_status(format!("Staff export failed: {err}")),
        }
    }

    /// Periodic work: the persistence backstop and the reports auto-refresh.
    fn on_tick(&mut self) {
        if self.last_save.elapsed() >= self.save_interval {
            self.registry.persist();
            self.last_save = Instant::now();
        }
        if self.last_refresh.elapsed() >= self.refresh_interval {
            self.refresh_history();
            self.last_refresh = Instant::now();
        }
    }
}

/// Writes the three report tables as CSV files, returning the paths.
fn export_report_files(dir: &Path, data: &ReportsData) -> Result<Vec<PathBuf>, Box<dyn Error>> {
    fs::create_dir_all(dir)?;
    let mut written = Vec::new();

    let path = dir.join("inventory_status.csv");
    reports::export_inventory_csv(data, fs::File::create(&path)?)?;
    written.push(path);

    let path = dir.join("sales_performance.csv");
    reports::export_sales_csv(data, fs::File::create(&path)?)?;
    written.push(path);

    let path = dir.join("staff_performance.csv");
    reports::export_staff_csv(data, fs::File::create(&path)?)?;
    written.push(path);

    Ok(written)
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let cli = Cli::parse();

    if cli.export_reports {
        let dir = cli.state_dir().join("reports");
        let files = export_report_files(&dir, &ReportsData::seeded())?;
        for file in &files {
            println!("{}", file.display());
        }
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(cli);
    start_tui(&mut terminal, &mut app)?;

    // Teardown save, same as the per-mutation and backstop writes.
    app.registry.persist();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    Ok(())
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );

    terminal.draw(|f| ui(app, f))?;

    loop {
        match runner.step() {
            PosEvent::Tick => {
                app.on_tick();
            }
            PosEvent::Resize => {}
            PosEvent::Key(key) => {
                if handle_key(app, key) {
                    break;
                }
            }
        }
        terminal.draw(|f| ui(app, f))?;
    }

    Ok(())
}

fn ui(app: &App, f: &mut Frame) {
    f.render_widget(app, f.area());
}

/// Returns true when the app should quit.
fn handle_key(app: &mut App, key: KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }
    match app.screen {
        Screen::Sales => handle_sales_key(app, key),
        Screen::Receipt => handle_receipt_key(app, key),
        Screen::Reports => handle_reports_key(app, key),
        Screen::Staff => handle_staff_key(app, key),
    }
}

fn handle_sales_key(app: &mut App, key: KeyEvent) -> bool {
    match app.sales.input.clone() {
        SalesInput::EditQuantity(mut buffer) => {
            match key.code {
                KeyCode::Char(c) if c.is_ascii_digit() => {
                    buffer.push(c);
                    app.sales.input = SalesInput::EditQuantity(buffer);
                }
                KeyCode::Backspace => {
                    buffer.pop();
                    app.sales.input = SalesInput::EditQuantity(buffer);
                }
                KeyCode::Enter => {
                    app.commit_quantity(&buffer);
                    app.sales.input = SalesInput::Normal;
                }
                KeyCode::Esc => app.sales.input = SalesInput::Normal,
                _ => {}
            }
            false
        }
        SalesInput::EditName(mut buffer) => {
            match key.code {
                KeyCode::Char(c) => {
                    buffer.push(c);
                    app.sales.input = SalesInput::EditName(buffer);
                }
                KeyCode::Backspace => {
                    buffer.pop();
                    app.sales.input = SalesInput::EditName(buffer);
                }
                KeyCode::Enter => {
                    app.commit_name(&buffer);
                    app.sales.input = SalesInput::Normal;
                }
                KeyCode::Esc => app.sales.input = SalesInput::Normal,
                _ => {}
            }
            false
        }
        SalesInput::EditCustomPercent(mut buffer) => {
            match key.code {
                KeyCode::Char(c) if c.is_ascii_digit() || c == '.' => {
                    buffer.push(c);
                    app.sales.input = SalesInput::EditCustomPercent(buffer);
                }
                KeyCode::Backspace => {
                    buffer.pop();
                    app.sales.input = SalesInput::EditCustomPercent(buffer);
                }
                KeyCode::Enter => {
                    app.commit_custom_percent(&buffer);
                    app.sales.input = SalesInput::Normal;
                }
                KeyCode::Esc => app.sales.input = SalesInput::Normal,
                _ => {}
            }
            false
        }
        SalesInput::Normal => {
            match key.code {
                KeyCode::Esc => return true,
                KeyCode::F(2) => {
                    app.refresh_history();
                    app.screen = Screen::Reports;
                }
                KeyCode::F(3) => app.screen = Screen::Staff,
                KeyCode::Tab => app.shift_customer(1),
                KeyCode::BackTab => app.shift_customer(-1),
                KeyCode::Up => app.sales.selected_row = app.sales.selected_row.saturating_sub(1),
                KeyCode::Down => {
                    app.sales.selected_row += 1;
                    app.clamp_selected_row();
                }
                KeyCode::Left => app.cycle_product(-1),
                KeyCode::Right => app.cycle_product(1),
                KeyCode::Enter => app.proceed_to_checkout(),
                KeyCode::Char(c) => match c {
                    'n' => app.new_customer(),
                    'x' => app.close_active_customer(),
                    'a' => app.add_row(),
                    'r' => app.remove_row(),
                    '+' | '=' => app.bump_quantity(1),
                    '-' => app.bump_quantity(-1),
                    'q' => app.sales.input = SalesInput::EditQuantity(String::new()),
                    'c' => app.sales.input = SalesInput::EditName(app.active_custom_name()),
                    'u' => app.sales.input = SalesInput::EditCustomPercent(String::new()),
                    '0' => app.set_discount_kind(Discount::None),
                    'v' => app.set_discount_kind(Discount::Volume),
                    'b' => app.set_discount_kind(Discount::Bulk),
                    'p' => app.set_discount_kind(Discount::Premium),
                    _ => {}
                },
                _ => {}
            }
            false
        }
    }
}

fn handle_receipt_key(app: &mut App, key: KeyEvent) -> bool {
    let editing = app
        .receipt
        .as_ref()
        .map(|v| v.cashier_edit.is_some())
        .unwrap_or(false);

    if editing {
        let Some(view) = &mut app.receipt else {
            return false;
        };
        let Some(buffer) = &mut view.cashier_edit else {
            return false;
        };
        match key.code {
            KeyCode::Char(c) => buffer.push(c),
            KeyCode::Backspace => {
                buffer.pop();
            }
            KeyCode::Enter => {
                let name = buffer.clone();
                view.cashier_edit = None;
                app.commit_cashier(&name);
            }
            KeyCode::Esc => view.cashier_edit = None,
            _ => {}
        }
        return false;
    }

    match key.code {
        KeyCode::Char('p') | KeyCode::Enter => app.complete_transaction("print_complete"),
        KeyCode::Char('c') => app.cancel_transaction("cancel_return"),
        KeyCode::Char('e') => {
            let cashier = app.cashier.clone();
            if let Some(view) = &mut app.receipt {
                view.cashier_edit = Some(cashier);
            }
        }
        KeyCode::Esc => app.cancel_transaction("page_exit"),
        _ => {}
    }
    false
}

fn handle_reports_key(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Esc | KeyCode::F(1) => app.screen = Screen::Sales,
        KeyCode::F(3) => app.screen = Screen::Staff,
        KeyCode::Char('e') => app.export_reports(),
        KeyCode::Char('r') => {
            app.refresh_history();
            app.set_status("Reports refreshed");
        }
        _ => {}
    }
    false
}

fn handle_staff_key(app: &mut App, key: KeyEvent) -> bool {
    if let Some(mut buffer) = app.staff_view.search_input.clone() {
        match key.code {
            KeyCode::Char(c) => {
                buffer.push(c);
                app.staff_view.search_input = Some(buffer);
            }
            KeyCode::Backspace => {
                buffer.pop();
                app.staff_view.search_input = Some(buffer);
            }
            KeyCode::Enter => {
                app.staff_view.filter = buffer;
                app.staff_view.search_input = None;
                app.staff_view.selected = 0;
            }
            KeyCode::Esc => {
                app.staff_view.search_input = None;
                app.staff_view.filter.clear();
                app.staff_view.selected = 0;
            }
            _ => {}
        }
        return false;
    }

    let roster_len = if app.staff_view.filter.is_empty() {
        app.staff.roster().len()
    } else {
        app.staff.search(&app.staff_view.filter).len()
    };
    let pending_len = app.staff.pending().len();

    match key.code {
        KeyCode::Esc | KeyCode::F(1) => app.screen = Screen::Sales,
        KeyCode::F(2) => {
            app.refresh_history();
            app.screen = Screen::Reports;
        }
        KeyCode::Tab => app.staff_view.focus_pending = !app.staff_view.focus_pending,
        KeyCode::Up => {
            if app.staff_view.focus_pending {
                app.staff_view.pending_selected = app.staff_view.pending_selected.saturating_sub(1);
            } else {
                app.staff_view.selected = app.staff_view.selected.saturating_sub(1);
            }
        }
        KeyCode::Down => {
            if app.staff_view.focus_pending {
                app.staff_view.pending_selected =
                    (app.staff_view.pending_selected + 1).min(pending_len.saturating_sub(1));
            } else {
                app.staff_view.selected =
                    (app.staff_view.selected + 1).min(roster_len.saturating_sub(1));
            }
        }
        KeyCode::Char('/') => app.staff_view.search_input = Some(app.staff_view.filter.clone()),
        KeyCode::Char('e') => app.export_staff(),
        KeyCode::Char('a') if app.staff_view.focus_pending => {
            if let Some(id) = app
                .staff
                .pending()
                .get(app.staff_view.pending_selected)
                .map(|a| a.id)
            {
                if let Some(name) = app.staff.approve(id) {
                    app.set_status(format!(
                        "{name} has been approved and added to active staff!"
                    ));
                }
                app.staff_view.pending_selected = 0;
            }
        }
        KeyCode::Char('x') if app.staff_view.focus_pending => {
            if let Some(id) = app
                .staff
                .pending()
                .get(app.staff_view.pending_selected)
                .map(|a| a.id)
            {
                if let Some(name) = app.staff.reject(id) {
                    app.set_status(format!("{name}'s application has been rejected."));
                }
                app.staff_view.pending_selected = 0;
            }
        }
        KeyCode::Char('d') if !app.staff_view.focus_pending => {
            if let Some(member) = selected_roster_member(app) {
                let (id, name, active) = member;
                let done = if active {
                    app.staff.deactivate(id)
                } else {
                    app.staff.activate(id)
                };
                if done {
                    let verb = if active { "deactivated" } else { "activated" };
                    app.set_status(format!("{name} has been {verb}!"));
                }
            }
        }
        KeyCode::Char(c @ '1'..='4') if !app.staff_view.focus_pending => {
            let role = match c {
                '1' => StaffRole::Cashier,
                '2' => StaffRole::Warehouse,
                '3' => StaffRole::Manager,
                _ => StaffRole::Admin,
            };
            if let Some((id, name, _)) = selected_roster_member(app) {
                if app.staff.change_role(id, role) {
                    app.set_status(format!("{name}'s role has been updated to {role}!"));
                }
            }
        }
        _ => {}
    }
    false
}

fn selected_roster_member(app: &App) -> Option<(u32, String, bool)> {
    let members = if app.staff_view.filter.is_empty() {
        app.staff.roster().iter().collect::<Vec<_>>()
    } else {
        app.staff.search(&app.staff_view.filter)
    };
    members.get(app.staff_view.selected).map(|m| {
        (
            m.id,
            m.full_name.clone(),
            m.status == crate::staff::StaffStatus::Active,
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn app_in(dir: &Path) -> App {
        let cli = Cli::parse_from([
            "till",
            "-d",
            dir.to_str().unwrap(),
            "--cashier",
            "Mary Johnson",
        ]);
        App::with_config(cli, Config::default())
    }

    #[test]
    fn test_app_starts_with_one_session() {
        let dir = tempdir().unwrap();
        let app = app_in(dir.path());
        assert_eq!(app.registry.len(), 1);
        assert_eq!(app.screen, Screen::Sales);
        assert_eq!(app.cashier, "Mary Johnson");
    }

    #[test]
    fn test_checkout_flow_resets_the_slot() {
        let dir = tempdir().unwrap();
        let mut app = app_in(dir.path());

        // Bind a product and walk through checkout.
        app.cycle_product(1);
        app.commit_quantity("12");
        app.set_discount_kind(Discount::Volume);
        app.proceed_to_checkout();
        assert_eq!(app.screen, Screen::Receipt);
        let record = app.receipt.as_ref().unwrap().record.clone();
        assert_eq!(record.total, "₦9120.00");

        app.complete_transaction("print_complete");
        assert_eq!(app.screen, Screen::Sales);
        let session = app.registry.get("customer-1").unwrap();
        assert!(!session.has_bound_product());
        assert_eq!(app.history_summary.transactions, 1);
        assert!(dir.path().join("receipts").exists());
    }

    #[test]
    fn test_cancel_keeps_the_cart() {
        let dir = tempdir().unwrap();
        let mut app = app_in(dir.path());
        app.cycle_product(1);
        app.proceed_to_checkout();
        app.cancel_transaction("cancel_return");
        assert_eq!(app.screen, Screen::Sales);
        assert!(app.registry.get("customer-1").unwrap().has_bound_product());
        assert_eq!(app.history_summary.transactions, 0);
    }

    #[test]
    fn test_checkout_on_empty_cart_reports_error() {
        let dir = tempdir().unwrap();
        let mut app = app_in(dir.path());
        app.proceed_to_checkout();
        assert_eq!(app.screen, Screen::Sales);
        assert_eq!(
            app.status.as_deref(),
            Some("Please select at least one product before proceeding to checkout.")
        );
    }

    #[test]
    fn test_sixth_customer_is_refused() {
        let dir = tempdir().unwrap();
        let mut app = app_in(dir.path());
        for _ in 0..4 {
            app.new_customer();
        }
        assert!(app.registry.is_full());
        app.new_customer();
        assert_eq!(
            app.status.as_deref(),
            Some("Maximum of 5 customers allowed. Complete a transaction to add more.")
        );
    }
}
