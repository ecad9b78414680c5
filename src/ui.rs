use anyhow::Result;
use chrono::NaiveDate;
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use honey_books::{
    format_rupiah, format_signed_for_report, BalanceSheet, Books, IncomeStatement, LedgerAccount,
    LedgerFilter, Period, TrialBalance,
};
use log::error;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    NeracaSaldo,
    BukuBesar,
    LabaRugi,
    PosisiKeuangan,
}

impl Page {
    pub const ALL: [Page; 4] = [Page::NeracaSaldo, Page::BukuBesar, Page::LabaRugi, Page::PosisiKeuangan];

    pub fn next(&self) -> Self {
        match self {
            Page::NeracaSaldo => Page::BukuBesar,
            Page::BukuBesar => Page::LabaRugi,
            Page::LabaRugi => Page::PosisiKeuangan,
            Page::PosisiKeuangan => Page::NeracaSaldo,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Page::NeracaSaldo => Page::PosisiKeuangan,
            Page::BukuBesar => Page::NeracaSaldo,
            Page::LabaRugi => Page::BukuBesar,
            Page::PosisiKeuangan => Page::LabaRugi,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::NeracaSaldo => "Neraca Saldo",
            Page::BukuBesar => "Buku Besar",
            Page::LabaRugi => "Laba Rugi",
            Page::PosisiKeuangan => "Posisi Keuangan",
        }
    }
}

/// One rendered table line: cells plus how to paint them
struct ReportRow {
    cells: Vec<String>,
    kind: RowKind,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum RowKind {
    Heading,
    Item,
    Total,
}

impl ReportRow {
    fn new(kind: RowKind, cells: Vec<String>) -> Self {
        ReportRow { cells, kind }
    }
}

pub struct App<'a> {
    books: &'a Books,
    today: NaiveDate,
    pub period: Period,
    pub current_page: Page,
    pub state: TableState,
    trial_balance: TrialBalance,
    ledger: Vec<LedgerAccount>,
    income: IncomeStatement,
    balance: BalanceSheet,
    message: Option<String>,
}

impl<'a> App<'a> {
    pub fn new(books: &'a Books, period: Period, today: NaiveDate) -> honey_books::Result<Self> {
        let trial_balance = books.trial_balance(period, today)?;
        let mut app = App {
            books,
            today,
            period,
            current_page: Page::NeracaSaldo,
            state: TableState::default(),
            ledger: books.general_ledger(&LedgerFilter::for_period(period))?,
            income: IncomeStatement::from_trial_balance(&trial_balance),
            balance: BalanceSheet::from_trial_balance(&trial_balance),
            trial_balance,
            message: None,
        };
        app.reset_selection();
        Ok(app)
    }

    /// Re-read the books for the current period
    pub fn reload(&mut self) {
        let loaded = self.books.trial_balance(self.period, self.today).and_then(|tb| {
            let ledger = self.books.general_ledger(&LedgerFilter::for_period(self.period))?;
            Ok((tb, ledger))
        });

        match loaded {
            Ok((tb, ledger)) => {
                self.income = IncomeStatement::from_trial_balance(&tb);
                self.balance = BalanceSheet::from_trial_balance(&tb);
                self.trial_balance = tb;
                self.ledger = ledger;
                self.message = None;
            }
            Err(e) => {
                error!("Failed to load books for {}: {}", self.period, e);
                self.message = Some(format!("Gagal memuat data: {}", e));
            }
        }
        self.reset_selection();
    }

    pub fn next_period(&mut self) {
        self.period = self.period.next();
        self.reload();
    }

    pub fn previous_period(&mut self) {
        self.period = self.period.previous();
        self.reload();
    }

    pub fn next_page(&mut self) {
        self.current_page = self.current_page.next();
        self.reset_selection();
    }

    pub fn previous_page(&mut self) {
        self.current_page = self.current_page.previous();
        self.reset_selection();
    }

    fn reset_selection(&mut self) {
        let selected = if self.row_count() > 0 { Some(0) } else { None };
        self.state.select(selected);
    }

    fn row_count(&self) -> usize {
        self.rows().len()
    }

    pub fn next(&mut self) {
        let len = self.row_count();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i < len - 1 => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.row_count();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    pub fn page_down(&mut self) {
        let len = self.row_count();
        if len == 0 {
            return;
        }
        let i = self.state.selected().map_or(0, |i| (i + 20).min(len - 1));
        self.state.select(Some(i));
    }

    pub fn page_up(&mut self) {
        if self.row_count() == 0 {
            return;
        }
        let i = self.state.selected().map_or(0, |i| i.saturating_sub(20));
        self.state.select(Some(i));
    }

    // ========================================================================
    // PAGE CONTENTS
    // ========================================================================

    fn rows(&self) -> Vec<ReportRow> {
        match self.current_page {
            Page::NeracaSaldo => self.trial_balance_rows(),
            Page::BukuBesar => self.ledger_rows(),
            Page::LabaRugi => self.income_rows(),
            Page::PosisiKeuangan => self.balance_rows(),
        }
    }

    fn trial_balance_rows(&self) -> Vec<ReportRow> {
        let tb = &self.trial_balance;
        if tb.is_empty() {
            return Vec::new();
        }
        let mut rows: Vec<ReportRow> = tb
            .sorted_by_code()
            .into_iter()
            .map(|l| {
                ReportRow::new(
                    RowKind::Item,
                    vec![
                        l.code,
                        truncate(&l.name, 40),
                        l.side.as_str().to_string(),
                        format_rupiah(l.debit),
                        format_rupiah(l.credit),
                    ],
                )
            })
            .collect();
        rows.push(ReportRow::new(
            RowKind::Total,
            vec![
                "Total".to_string(),
                String::new(),
                String::new(),
                format_rupiah(tb.total_debit()),
                format_rupiah(tb.total_credit()),
            ],
        ));
        rows
    }

    fn ledger_rows(&self) -> Vec<ReportRow> {
        let mut rows = Vec::new();
        for account in &self.ledger {
            if account.postings.is_empty() {
                continue;
            }
            rows.push(ReportRow::new(
                RowKind::Heading,
                vec![account.code.clone(), truncate(&account.name, 40), String::new(), String::new(), String::new()],
            ));
            for p in &account.postings {
                rows.push(ReportRow::new(
                    RowKind::Item,
                    vec![
                        p.date.map(|d| d.to_string()).unwrap_or_default(),
                        truncate(&p.memo, 40),
                        format_rupiah(p.debit),
                        format_rupiah(p.credit),
                        format_rupiah(p.balance),
                    ],
                ));
            }
        }
        rows
    }

    fn income_rows(&self) -> Vec<ReportRow> {
        let is = &self.income;
        if is.is_empty() {
            return Vec::new();
        }

        let mut rows = Vec::new();
        let sections = [
            ("Pendapatan", &is.revenues, is.totals.revenue),
            ("Retur Penjualan", &is.sales_returns, is.totals.sales_returns),
            ("Harga Pokok Penjualan", &is.cogs, is.totals.cogs),
            ("Beban", &is.expenses, is.totals.expenses),
        ];
        for (title, lines, total) in sections {
            rows.push(ReportRow::new(RowKind::Heading, vec![title.to_string(), String::new()]));
            for line in lines {
                rows.push(ReportRow::new(
                    RowKind::Item,
                    vec![format!("  {}", truncate(&line.name, 44)), format_rupiah(line.amount)],
                ));
            }
            rows.push(ReportRow::new(RowKind::Total, vec![format!("Total {}", title), format_rupiah(total)]));
        }
        for (label, amount) in [
            ("Penjualan Bersih", is.net_sales),
            ("Laba Kotor", is.gross_profit),
            ("Laba Bersih", is.net_profit),
        ] {
            rows.push(ReportRow::new(RowKind::Total, vec![label.to_string(), format_rupiah(amount)]));
        }
        rows
    }

    fn balance_rows(&self) -> Vec<ReportRow> {
        if self.trial_balance.is_empty() {
            return Vec::new();
        }

        let mut rows = Vec::new();
        for group in &self.balance.groups {
            rows.push(ReportRow::new(RowKind::Heading, vec![group.name.clone(), String::new()]));
            for category in &group.categories {
                for sub in &category.subcategories {
                    rows.push(ReportRow::new(RowKind::Item, vec![format!("  {}", sub.name), String::new()]));
                    for item in &sub.items {
                        rows.push(ReportRow::new(
                            RowKind::Item,
                            vec![format!("    {}", truncate(&item.name, 40)), format_signed_for_report(item.amount)],
                        ));
                    }
                }
            }
            rows.push(ReportRow::new(
                RowKind::Total,
                vec![format!("Total {}", group.name), format_signed_for_report(group.total)],
            ));
        }
        rows
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Tab => {
                    if key.modifiers.contains(KeyModifiers::SHIFT) {
                        app.previous_page();
                    } else {
                        app.next_page();
                    }
                }
                KeyCode::BackTab => app.previous_page(),
                KeyCode::Char(']') => app.next_period(),
                KeyCode::Char('[') => app.previous_period(),
                KeyCode::Char('r') => app.reload(),
                KeyCode::Down | KeyCode::Char('j') => app.next(),
                KeyCode::Up | KeyCode::Char('k') => app.previous(),
                KeyCode::PageDown => app.page_down(),
                KeyCode::PageUp => app.page_up(),
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Min(0),    // Report
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);
    render_report(f, chunks[1], app);
    render_status_bar(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let mut tab_spans = vec![];
    for (i, page) in Page::ALL.iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }

        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        tab_spans.push(Span::styled(page.title().to_string(), style));
    }

    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Periode: {}", app.period),
        Style::default().fg(Color::White),
    ));

    let header = Paragraph::new(vec![Line::from(tab_spans)])
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    f.render_widget(header, area);
}

fn render_report(f: &mut Frame, area: Rect, app: &mut App) {
    let (columns, widths): (&[&str], Vec<Constraint>) = match app.current_page {
        Page::NeracaSaldo => (
            &["No Akun", "Nama Akun", "Saldo", "Debit", "Kredit"][..],
            vec![
                Constraint::Length(10),
                Constraint::Length(42),
                Constraint::Length(8),
                Constraint::Length(20),
                Constraint::Length(20),
            ],
        ),
        Page::BukuBesar => (
            &["Tanggal", "Keterangan", "Debit", "Kredit", "Saldo"][..],
            vec![
                Constraint::Length(12),
                Constraint::Length(42),
                Constraint::Length(18),
                Constraint::Length(18),
                Constraint::Length(18),
            ],
        ),
        Page::LabaRugi | Page::PosisiKeuangan => (
            &["Keterangan", "Jumlah"][..],
            vec![Constraint::Length(50), Constraint::Length(22)],
        ),
    };

    let header_cells = columns.iter().map(|h| {
        Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    });
    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let report_rows = app.rows();
    let title = if report_rows.is_empty() {
        format!(" {} - tidak ada data untuk {} ", app.current_page.title(), app.period)
    } else {
        format!(" {} - {} ", app.current_page.title(), app.period)
    };

    let rows = report_rows.into_iter().map(|r| {
        let style = match r.kind {
            RowKind::Heading => Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            RowKind::Total => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            RowKind::Item => Style::default(),
        };
        Row::new(r.cells.into_iter().map(Cell::from)).style(style).height(1)
    });

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(title),
        )
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let selected = app.state.selected().map(|i| i + 1).unwrap_or(0);
    let total = app.row_count();

    let mut status_spans = vec![Span::styled(
        format!(" Row: {}/{} ", selected, total),
        Style::default().fg(Color::Cyan),
    )];

    if let Some(message) = &app.message {
        status_spans.push(Span::raw(" | "));
        status_spans.push(Span::styled(message.clone(), Style::default().fg(Color::Red)));
    }

    status_spans.push(Span::raw(" | "));
    status_spans.push(Span::styled("Tab", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Page | "));
    status_spans.push(Span::styled("[/]", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Bulan | "));
    status_spans.push(Span::styled("↑/↓", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Nav | "));
    status_spans.push(Span::styled("r", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Reload | "));
    status_spans.push(Span::styled("q", Style::default().fg(Color::Red)));
    status_spans.push(Span::raw(" Quit"));

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_cycle() {
        let mut page = Page::NeracaSaldo;
        for _ in 0..Page::ALL.len() {
            page = page.next();
        }
        assert_eq!(page, Page::NeracaSaldo);
        assert_eq!(Page::NeracaSaldo.previous(), Page::PosisiKeuangan);
    }

    #[test]
    fn test_truncate_multibyte() {
        assert_eq!(truncate("Kas", 10), "Kas");
        assert_eq!(truncate("Beban telepon, air, dan listrik", 10), "Beban t...");
        assert_eq!(truncate("→→→→→", 4), "→...");
    }
}
