//! Ratatui-based terminal dashboard.
//!
//! The left pane lists every country with its latest average change (the map
//! view); selecting one charts its trend on the right. `f` toggles the
//! forecast overlay, `s`/`e` edit the date window, `/` looks up a country by name.

use std::io;
use std::time::Duration;

use chrono::NaiveDate;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};

use crate::app::pipeline::{Dashboard, TrendView};
use crate::domain::Rgb;
use crate::error::AppError;
use crate::trend::TrendRequest;

mod plotters_chart;

use plotters_chart::{ChartData, TrendPlottersChart};

const X_TITLE: &str = "Date";
const Y_TITLE: &str = "Mobility % Change From Baseline";

/// Start the TUI on an already loaded dashboard.
pub fn run(dashboard: Dashboard) -> Result<(), AppError> {
    let mut app = App::new(dashboard)?;

    let _guard = TerminalGuard::new()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::runtime(format!("Failed to initialize terminal: {e}")))?;

    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode()
            .map_err(|e| AppError::runtime(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::runtime(format!(
                "Failed to enter alternate screen: {e}"
            )));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

/// Which text field is being typed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Input {
    Start,
    End,
    Country,
}

struct App {
    dashboard: Dashboard,
    countries: Vec<String>,
    selected: usize,
    request: TrendRequest,
    editing: Option<Input>,
    input: String,
    status: String,
    view: Option<TrendView>,
    chart: Option<ChartData>,
}

impl App {
    fn new(dashboard: Dashboard) -> Result<Self, AppError> {
        let countries: Vec<String> = dashboard
            .data()
            .countries
            .iter()
            .map(str::to_string)
            .collect();
        let request = dashboard.initial_request(false)?;
        let selected = countries
            .iter()
            .position(|c| *c == request.country)
            .unwrap_or(0);

        let mut app = Self {
            dashboard,
            countries,
            selected,
            request,
            editing: None,
            input: String::new(),
            status: String::new(),
            view: None,
            chart: None,
        };
        app.refresh();
        Ok(app)
    }

    fn event_loop<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
    ) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::runtime(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::runtime(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::runtime(format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the app should exit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        if let Some(field) = self.editing {
            self.handle_edit(field, code);
            return false;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up => self.select(self.selected.saturating_sub(1)),
            KeyCode::Down => self.select(self.selected + 1),
            KeyCode::PageUp => self.select(self.selected.saturating_sub(10)),
            KeyCode::PageDown => self.select(self.selected + 10),
            KeyCode::Char('f') => self.toggle_forecast(),
            KeyCode::Char('r') => {
                self.reset_window();
                self.refresh();
            }
            KeyCode::Char('s') => self.begin_edit(Input::Start, self.request.start.to_string()),
            KeyCode::Char('e') => self.begin_edit(Input::End, self.request.end.to_string()),
            KeyCode::Char('/') => self.begin_edit(Input::Country, String::new()),
            _ => {}
        }
        false
    }

    fn handle_edit(&mut self, field: Input, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.editing = None;
                self.status = "Edit canceled.".to_string();
            }
            KeyCode::Enter => {
                self.editing = None;
                let input = std::mem::take(&mut self.input);
                self.apply_input(field, input.trim());
            }
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Char(c) => {
                let accepted = match field {
                    Input::Start | Input::End => c.is_ascii_digit() || c == '-',
                    Input::Country => !c.is_control(),
                };
                if accepted {
                    self.input.push(c);
                }
            }
            _ => {}
        }
    }

    fn begin_edit(&mut self, field: Input, initial: String) {
        self.editing = Some(field);
        self.input = initial;
        self.status = match field {
            Input::Start | Input::End => "Editing date (YYYY-MM-DD). Enter to apply, Esc to cancel.",
            Input::Country => "Type a country name. Enter to apply, Esc to cancel.",
        }
        .to_string();
    }

    fn apply_input(&mut self, field: Input, input: &str) {
        match field {
            Input::Country => {
                if input.is_empty() {
                    return;
                }
                self.request.country = input.to_string();
                self.refresh();
            }
            Input::Start | Input::End => {
                let date = match NaiveDate::parse_from_str(input, "%Y-%m-%d") {
                    Ok(date) => date,
                    Err(e) => {
                        self.status = format!("Invalid date '{input}': {e}");
                        return;
                    }
                };
                match self.dashboard.bounds(self.request.include_forecast) {
                    Ok(bounds) if date < bounds.min || date > bounds.max => {
                        self.status =
                            format!("{date} is outside {} .. {}", bounds.min, bounds.max);
                        return;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        self.status = e.to_string();
                        return;
                    }
                }
                if field == Input::Start {
                    self.request.start = date;
                } else {
                    self.request.end = date;
                }
                self.refresh();
            }
        }
    }

    fn select(&mut self, index: usize) {
        if self.countries.is_empty() {
            return;
        }
        self.selected = index.min(self.countries.len() - 1);
        self.request.country = self.countries[self.selected].clone();
        self.refresh();
    }

    /// Flip the overlay; the window snaps to the new selectable range.
    fn toggle_forecast(&mut self) {
        self.request.include_forecast = !self.request.include_forecast;
        self.reset_window();
        self.refresh();
    }

    fn reset_window(&mut self) {
        match self.dashboard.bounds(self.request.include_forecast) {
            Ok(bounds) => {
                self.request.start = bounds.min;
                self.request.end = bounds.max;
            }
            Err(e) => self.status = e.to_string(),
        }
    }

    fn refresh(&mut self) {
        match self.dashboard.trend(&self.request) {
            Ok(view) => {
                self.status = match &view.notice {
                    Some(notice) => notice.clone(),
                    None => format!(
                        "{}: {} points ({})",
                        view.chart.country,
                        view.chart.point_count(),
                        crate::report::case_label(view.chart.case)
                    ),
                };
                self.request.country = view.chart.country.clone();
                if let Some(i) = self.countries.iter().position(|c| *c == view.chart.country) {
                    self.selected = i;
                }
                self.chart = ChartData::from_trend(&view.chart);
                self.view = Some(view);
            }
            Err(e) => {
                self.status = e.to_string();
                self.view = None;
                self.chart = None;
            }
        }
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let country = self
            .view
            .as_ref()
            .map(|v| v.chart.country.as_str())
            .unwrap_or("-");
        let forecast = if self.request.include_forecast {
            "on"
        } else {
            "off"
        };

        let mut lines = vec![Line::from(vec![
            Span::styled("mobility", Style::default().fg(Color::Cyan)),
            Span::raw(" | Apple Mobility Trends"),
        ])];
        lines.push(Line::from(Span::styled(
            format!(
                "country: {country} | window: {} .. {} | forecast: {forecast}",
                self.request.start, self.request.end
            ),
            Style::default().fg(Color::Gray),
        )));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(34), Constraint::Min(0)])
            .split(area);

        self.draw_countries(frame, chunks[0]);
        self.draw_chart(frame, chunks[1]);
    }

    fn draw_countries(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let summary = self.dashboard.summary();
        let title = summary
            .map(|s| s.title())
            .unwrap_or_else(|| "Countries".to_string());

        let items: Vec<ListItem> = self
            .countries
            .iter()
            .map(|country| {
                let row = summary.and_then(|s| s.get(country));
                let value = row
                    .and_then(|r| r.change_pct)
                    .map(|v| format!("{v:>8.2}"))
                    .unwrap_or_else(|| format!("{:>8}", "-"));
                let style = row
                    .and_then(|r| r.color)
                    .map(|c| Style::default().fg(term_color(c)))
                    .unwrap_or_default();
                ListItem::new(Line::from(vec![
                    Span::raw(format!("{:<20} ", crate::report::truncate(country, 20))),
                    Span::styled(value, style),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(Block::default().title(title).borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        state.select(Some(self.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let title = self
            .view
            .as_ref()
            .map(|v| v.chart.country.clone())
            .unwrap_or_else(|| "Trend".to_string());
        let block = Block::default().title(title).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(data) = &self.chart else {
            let msg = Paragraph::new("No data in the selected window.")
                .style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return;
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(inner);

        let (chart_rect, insets) = chart_layout(chunks[0]);
        let widget = TrendPlottersChart {
            data,
            x_label: X_TITLE,
            y_label: Y_TITLE,
        };
        frame.render_widget(widget, chart_rect);
        if let Some(insets) = insets {
            draw_axis_ticks(frame, chunks[0], chart_rect, insets, data);
        }

        if let Some(view) = &self.view {
            let mut spans = Vec::new();
            for (mode, color) in view.chart.legend() {
                spans.push(Span::styled("── ", Style::default().fg(term_color(color))));
                spans.push(Span::raw(format!("{mode}  ")));
            }
            if self.chart.as_ref().is_some_and(|c| c.series.iter().any(|s| s.dashed)) {
                spans.push(Span::styled(
                    "- - forecast",
                    Style::default().fg(Color::Gray),
                ));
            }
            frame.render_widget(Paragraph::new(Line::from(spans)), chunks[1]);
        }
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let (help, status_style) = if let Some(field) = self.editing {
            let label = match field {
                Input::Start => "start",
                Input::End => "end",
                Input::Country => "country",
            };
            (
                format!("{label}: {}_", self.input),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )
        } else {
            (
                "↑/↓ country  / find  f forecast  s start  e end  r reset  q quit".to_string(),
                Style::default().fg(Color::Yellow),
            )
        };
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, status_style),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn term_color(c: Rgb) -> Color {
    Color::Rgb(c.0, c.1, c.2)
}

#[derive(Debug, Clone, Copy)]
struct AxisInsets {
    left: u16,
    right: u16,
    top: u16,
    bottom: u16,
}

fn chart_layout(inner: Rect) -> (Rect, Option<AxisInsets>) {
    let insets = AxisInsets {
        left: 6,
        right: 2,
        top: 1,
        bottom: 2,
    };

    if inner.width <= insets.left + insets.right + 10
        || inner.height <= insets.top + insets.bottom + 5
    {
        return (inner, None);
    }

    let rect = Rect {
        x: inner.x + insets.left,
        y: inner.y + insets.top,
        width: inner.width - insets.left - insets.right,
        height: inner.height - insets.top - insets.bottom,
    };

    (rect, Some(insets))
}

fn draw_axis_ticks(
    frame: &mut ratatui::Frame<'_>,
    inner: Rect,
    chart: Rect,
    insets: AxisInsets,
    data: &ChartData,
) {
    // Dates are 10 columns wide; fewer ticks on narrow charts.
    let x_ticks = if chart.width >= 60 { 5usize } else { 3 };
    let y_ticks = 5usize;
    let style = Style::default().fg(Color::Gray);
    let [x0, x1] = data.x_bounds;
    let [y0, y1] = data.y_bounds;

    for i in 0..x_ticks {
        let u = i as f64 / (x_ticks as f64 - 1.0);
        let label = data.date_at(x0 + u * (x1 - x0)).to_string();
        let label_len = label.len() as u16;
        let x = chart.x + ((chart.width - 1) as f64 * u).round() as u16;
        let start = x
            .saturating_sub(label_len / 2)
            .clamp(inner.x, (inner.x + inner.width).saturating_sub(label_len));
        let y = chart.y + chart.height;
        if y >= inner.y + inner.height - 1 {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    for i in 0..y_ticks {
        let u = i as f64 / (y_ticks as f64 - 1.0);
        let y_val = y0 + u * (y1 - y0);
        let y = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * u).round() as u16;
        let label = format!("{y_val:.0}");
        let label_len = label.len() as u16;
        let x = inner.x + insets.left.saturating_sub(1);
        let start = x.saturating_sub(label_len);
        if start < inner.x {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    let x_label = Paragraph::new(X_TITLE)
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Gray));
    let x_rect = Rect {
        x: chart.x,
        y: chart.y + chart.height + 1,
        width: chart.width,
        height: 1,
    };
    if x_rect.y < inner.y + inner.height {
        frame.render_widget(x_label, x_rect);
    }

    let y_label = Paragraph::new(Y_TITLE)
        .style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD));
    let y_rect = Rect {
        x: chart.x,
        y: inner.y,
        width: chart.width,
        height: 1,
    };
    frame.render_widget(y_label, y_rect);
}
