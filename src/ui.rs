// 🖥️ Terminal view - Datos / Pendientes tables side by side as tabs

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use offsets_pendientes::export::{DATOS_HEADERS, PENDIENTES_HEADERS};
use offsets_pendientes::OffsetReport;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::io;

const PAGE_JUMP: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Datos,
    Pendientes,
}

impl Page {
    pub fn toggle(&self) -> Self {
        match self {
            Page::Datos => Page::Pendientes,
            Page::Pendientes => Page::Datos,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Datos => "Datos",
            Page::Pendientes => "Pendientes",
        }
    }
}

pub struct App {
    pub report: OffsetReport,
    pub source_name: String,
    pub current_page: Page,
    pub datos_state: TableState,
    pub pendientes_state: TableState,
}

impl App {
    pub fn new(report: OffsetReport, source_name: String) -> Self {
        let mut datos_state = TableState::default();
        if !report.rows.is_empty() {
            datos_state.select(Some(0));
        }

        let mut pendientes_state = TableState::default();
        if !report.pending.is_empty() {
            pendientes_state.select(Some(0));
        }

        Self {
            report,
            source_name,
            current_page: Page::Pendientes,
            datos_state,
            pendientes_state,
        }
    }

    fn current(&mut self) -> (&mut TableState, usize) {
        match self.current_page {
            Page::Datos => (&mut self.datos_state, self.report.rows.len()),
            Page::Pendientes => (&mut self.pendientes_state, self.report.pending.len()),
        }
    }

    pub fn toggle_page(&mut self) {
        self.current_page = self.current_page.toggle();
    }

    pub fn next(&mut self) {
        let (state, len) = self.current();
        if len == 0 {
            return;
        }
        let i = match state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let (state, len) = self.current();
        if len == 0 {
            return;
        }
        let i = match state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        state.select(Some(i));
    }

    pub fn page_down(&mut self) {
        let (state, len) = self.current();
        if len == 0 {
            return;
        }
        let i = state.selected().map_or(0, |i| (i + PAGE_JUMP).min(len - 1));
        state.select(Some(i));
    }

    pub fn page_up(&mut self) {
        let (state, len) = self.current();
        if len == 0 {
            return;
        }
        let i = state.selected().map_or(0, |i| i.saturating_sub(PAGE_JUMP));
        state.select(Some(i));
    }

    pub fn first(&mut self) {
        let (state, len) = self.current();
        if len > 0 {
            state.select(Some(0));
        }
    }

    pub fn last(&mut self) {
        let (state, len) = self.current();
        if len > 0 {
            state.select(Some(len - 1));
        }
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res?;
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return Ok(()),
                KeyCode::Tab | KeyCode::BackTab => app.toggle_page(),
                KeyCode::Down | KeyCode::Char('j') => app.next(),
                KeyCode::Up | KeyCode::Char('k') => app.previous(),
                KeyCode::PageDown => app.page_down(),
                KeyCode::PageUp => app.page_up(),
                KeyCode::Home => app.first(),
                KeyCode::End => app.last(),
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tabs + totals
            Constraint::Min(0),    // Table
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);
    match app.current_page {
        Page::Datos => render_datos(f, chunks[1], app),
        Page::Pendientes => render_pendientes(f, chunks[1], app),
    }
    render_status_bar(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![];
    for (i, page) in [Page::Datos, Page::Pendientes].iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(" │ "));
        }
        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(page.title(), style));
    }

    spans.push(Span::raw("  |  "));
    spans.push(Span::styled(
        format!("Registros: {}", app.report.row_count()),
        Style::default().fg(Color::White),
    ));
    spans.push(Span::raw("  |  "));
    spans.push(Span::styled(
        format!("Entities: {}", app.report.entity_count()),
        Style::default().fg(Color::White),
    ));
    spans.push(Span::raw("  |  "));
    spans.push(Span::styled(
        format!("Pendiente total: {:.4}", app.report.total_pending()),
        Style::default().fg(Color::Red),
    ));

    let header = Paragraph::new(vec![Line::from(spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(format!(" {} ", app.source_name)),
    );

    f.render_widget(header, area);
}

fn header_row(headers: &[&str]) -> Row<'static> {
    let cells = headers.iter().map(|h| {
        Cell::from(h.to_string()).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    });
    Row::new(cells).style(Style::default().bg(Color::DarkGray)).height(1)
}

fn styled_table<'a>(rows: Vec<Row<'a>>, widths: [Constraint; 7], header: Row<'a>, title: &'a str) -> Table<'a> {
    Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(title),
        )
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("→ ")
}

fn render_datos(f: &mut Frame, area: Rect, app: &mut App) {
    let rows: Vec<Row> = app
        .report
        .rows
        .rows()
        .iter()
        .map(|row| {
            let rec = &row.record;
            // filas sin timestamp válido: ordenadas al final de su entity
            let date_style = if row.datetime.is_some() {
                Style::default()
            } else {
                Style::default().fg(Color::Magenta)
            };
            Row::new(vec![
                Cell::from(rec.date.clone()).style(date_style),
                Cell::from(rec.time.clone()).style(date_style),
                Cell::from(rec.entity.clone()),
                Cell::from(rec.characteristic.clone()),
                Cell::from(format!("{}", rec.old_value)),
                Cell::from(format!("{}", rec.new_value)),
                Cell::from(rec.user.clone()),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(12),
        Constraint::Length(13),
        Constraint::Length(20),
        Constraint::Length(16),
        Constraint::Length(12),
        Constraint::Length(12),
        Constraint::Length(16),
    ];

    let table = styled_table(rows, widths, header_row(&DATOS_HEADERS), " 📄 Datos del PDF ");
    f.render_stateful_widget(table, area, &mut app.datos_state);
}

fn render_pendientes(f: &mut Frame, area: Rect, app: &mut App) {
    let rows: Vec<Row> = app
        .report
        .pending
        .iter()
        .map(|p| {
            let color = if p.is_resolved() { Color::Green } else { Color::Red };
            Row::new(vec![
                Cell::from(p.entity.clone()),
                Cell::from(p.characteristic_final.clone()),
                Cell::from(p.date_final.clone()),
                Cell::from(p.time_final.clone()),
                Cell::from(format!("{}", p.old_initial)),
                Cell::from(format!("{}", p.new_final)),
                Cell::from(format!("{:.4}", p.difference_pending)).style(Style::default().fg(color)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(20),
        Constraint::Length(16),
        Constraint::Length(12),
        Constraint::Length(13),
        Constraint::Length(12),
        Constraint::Length(12),
        Constraint::Length(22),
    ];

    let table = styled_table(
        rows,
        widths,
        header_row(&PENDIENTES_HEADERS),
        " ❗ Offsets Pendientes de Regresar ",
    );
    f.render_stateful_widget(table, area, &mut app.pendientes_state);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let (state, total) = match app.current_page {
        Page::Datos => (&app.datos_state, app.report.rows.len()),
        Page::Pendientes => (&app.pendientes_state, app.report.pending.len()),
    };
    let selected = state.selected().map(|i| i + 1).unwrap_or(0);

    let status_spans = vec![
        Span::styled(format!(" Row: {}/{} ", selected, total), Style::default().fg(Color::Cyan)),
        Span::raw(" | "),
        Span::styled("Tab", Style::default().fg(Color::Yellow)),
        Span::raw(" Datos/Pendientes | "),
        Span::styled("↑/↓", Style::default().fg(Color::Yellow)),
        Span::raw(" Nav | "),
        Span::styled("PgUp/PgDn", Style::default().fg(Color::Yellow)),
        Span::raw(" Fast | "),
        Span::styled("q", Style::default().fg(Color::Red)),
        Span::raw(" Quit"),
    ];

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}
