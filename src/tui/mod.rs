//! Ratatui-based terminal UI.
//!
//! The TUI provides a settings panel for choosing a scenario, fit window,
//! projection horizon, weighting, and as-of date, then renders the projected
//! curve against the observed cumulative counts.

use std::io;
use std::time::Duration;

use chrono::{Local, NaiveDate};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
    Terminal,
};

use crate::app::pipeline::{self, RunOutput};
use crate::cli::FitArgs;
use crate::config::ScenarioConfig;
use crate::domain::{RunConfig, Scenario, WeightMode};
use crate::error::AppError;

mod plotters_chart;

use plotters_chart::TrendChart;

/// Start the TUI.
///
/// The scenario is resolved from `args` before the terminal enters raw mode,
/// so configuration errors print as normal CLI errors.
pub fn run(args: FitArgs) -> Result<(), AppError> {
    let config = crate::app::run_config_from_args(&args)?;

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(config);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
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

/// Selectable settings rows, top to bottom.
const FIELD_SCENARIO: usize = 0;
const FIELD_FROM_DAY: usize = 1;
const FIELD_TO_DAY: usize = 2;
const FIELD_END_DAY: usize = 3;
const FIELD_WEIGHTS: usize = 4;
const FIELD_AS_OF: usize = 5;

struct App {
    config: RunConfig,
    date_input: String,
    selected_field: usize,
    editing_date: bool,
    status: String,
    run: Option<RunOutput>,
}

impl App {
    fn new(config: RunConfig) -> Self {
        let mut app = Self {
            status: format!("scenario: {}", config.scenario.name),
            config,
            date_input: String::new(),
            selected_field: 0,
            editing_date: false,
            run: None,
        };
        app.refit();
        app
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))? {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
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

    /// Returns `true` when the app should quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.editing_date {
            self.handle_date_edit(code);
            return false;
        }

        match code {
            KeyCode::Char('q') => return true,
            KeyCode::Up => {
                if self.selected_field > 0 {
                    self.selected_field -= 1;
                }
            }
            KeyCode::Down => {
                if self.selected_field < FIELD_AS_OF {
                    self.selected_field += 1;
                }
            }
            KeyCode::Left => self.adjust_field(-1),
            KeyCode::Right => self.adjust_field(1),
            KeyCode::Enter => {
                if self.selected_field == FIELD_AS_OF {
                    self.editing_date = true;
                    self.date_input = self.config.as_of.to_string();
                    self.status =
                        "Editing as-of date (YYYY-MM-DD). Enter to apply, Esc to cancel.".to_string();
                }
            }
            KeyCode::Char('s') => self.cycle_scenario(1),
            KeyCode::Char('w') => self.toggle_weights(),
            KeyCode::Char('l') => {
                let chart = &mut self.config.scenario.chart;
                chart.log_scale = !chart.log_scale;
                self.status = format!(
                    "y axis: {}",
                    if chart.log_scale { "log10" } else { "linear" }
                );
            }
            KeyCode::Char('d') => self.write_debug_bundle(),
            _ => {}
        }

        false
    }

    fn handle_date_edit(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.editing_date = false;
                self.status = "Date edit canceled.".to_string();
            }
            KeyCode::Enter => {
                self.editing_date = false;
                self.apply_date_input();
            }
            KeyCode::Backspace => {
                self.date_input.pop();
            }
            KeyCode::Char(c) => {
                if c.is_ascii_digit() || c == '-' {
                    self.date_input.push(c);
                }
            }
            _ => {}
        }
    }

    /// Adjust the selected field by one step, keeping the window and horizon
    /// in a fittable state: `from_day < to_day <= last observed day` and
    /// `end_day >= to_day`.
    fn adjust_field(&mut self, delta: i32) {
        match self.selected_field {
            FIELD_SCENARIO => self.cycle_scenario(delta),
            FIELD_FROM_DAY => {
                let window = &mut self.config.scenario.window;
                if delta >= 0 {
                    window.from_day = (window.from_day + 1).min(window.to_day.saturating_sub(1));
                } else {
                    window.from_day = window.from_day.saturating_sub(1);
                }
                let window = self.config.scenario.window;
                self.status = format!("window: [{}, {}]", window.from_day, window.to_day);
                self.refit();
            }
            FIELD_TO_DAY => {
                let last_day = self.config.scenario.series.len() - 1;
                let scenario = &mut self.config.scenario;
                if delta >= 0 {
                    scenario.window.to_day = (scenario.window.to_day + 1).min(last_day);
                } else {
                    scenario.window.to_day = scenario
                        .window
                        .to_day
                        .saturating_sub(1)
                        .max(scenario.window.from_day + 1);
                }
                // The projection must still cover the window.
                scenario.end_day = scenario.end_day.max(scenario.window.to_day);
                self.status = format!(
                    "window: [{}, {}]",
                    scenario.window.from_day, scenario.window.to_day
                );
                self.refit();
            }
            FIELD_END_DAY => {
                let scenario = &mut self.config.scenario;
                if delta >= 0 {
                    scenario.end_day += 1;
                } else {
                    scenario.end_day =
                        scenario.end_day.saturating_sub(1).max(scenario.window.to_day);
                }
                self.status = format!("horizon: day {}", scenario.end_day);
                self.refit();
            }
            FIELD_WEIGHTS => self.toggle_weights(),
            _ => {}
        }
    }

    fn toggle_weights(&mut self) {
        let scenario = &mut self.config.scenario;
        scenario.weight_mode = match scenario.weight_mode {
            WeightMode::Uniform => WeightMode::Sqrt,
            WeightMode::Sqrt => WeightMode::Uniform,
        };
        self.status = format!("weights: {}", scenario.weight_mode.display_name());
        self.refit();
    }

    fn cycle_scenario(&mut self, delta: i32) {
        let presets = ScenarioConfig::PRESETS;
        let next = match presets.iter().position(|&p| p == self.config.scenario.name) {
            Some(i) if delta >= 0 => (i + 1) % presets.len(),
            Some(i) => (i + presets.len() - 1) % presets.len(),
            // A custom TOML scenario cycles into the first preset.
            None => 0,
        };

        let resolved = ScenarioConfig::from_preset(presets[next])
            .map_err(AppError::from)
            .and_then(|preset| preset.resolve());
        match resolved {
            Ok(scenario) => {
                self.config.scenario = scenario;
                self.status = format!("scenario: {}", presets[next]);
                self.refit();
            }
            Err(err) => self.status = format!("Preset failed: {err}"),
        }
    }

    fn apply_date_input(&mut self) {
        let trimmed = self.date_input.trim();
        if trimmed.is_empty() {
            self.config.as_of = Local::now().date_naive();
        } else {
            match NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
                Ok(date) => self.config.as_of = date,
                Err(e) => {
                    self.status = format!("Invalid date '{trimmed}': {e}");
                    return;
                }
            }
        }
        self.status = format!("as-of: {}", self.config.as_of);
        self.refit();
    }

    /// Re-run the pipeline for the current settings. On failure the previous
    /// run stays on screen and the error lands in the status line.
    fn refit(&mut self) {
        match pipeline::run_fit(&self.config) {
            Ok(run) => self.run = Some(run),
            Err(err) => self.status = format!("Fit failed: {err}"),
        }
    }

    fn write_debug_bundle(&mut self) {
        let Some(run) = &self.run else {
            self.status = "No fit to dump.".to_string();
            return;
        };
        match crate::debug::write_debug_bundle(
            &self.config,
            &run.fit,
            &run.quality,
            &run.cumulative,
            &run.projected,
            &run.markers,
        ) {
            Ok(path) => self.status = format!("Wrote debug bundle: {}", path.display()),
            Err(err) => self.status = format!("Debug write failed: {err}"),
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let scenario = &self.config.scenario;

        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("epi", Style::default().fg(Color::Cyan)),
            Span::raw(" - exponential case trend"),
        ]));

        let n = self.run.as_ref().map(|r| r.stats.n_days).unwrap_or(0);
        lines.push(Line::from(Span::styled(
            format!(
                "scenario: {} | window: [{}, {}] | weights: {} | horizon: day {} | as-of: {} | n={n}",
                scenario.name,
                scenario.window.from_day,
                scenario.window.to_day,
                scenario.weight_mode.display_name(),
                scenario.end_day,
                self.config.as_of,
            ),
            Style::default().fg(Color::Gray),
        )));

        if let Some(run) = &self.run {
            let growth = match run.fit.doubling_time_days() {
                Some(days) => format!(
                    "x{:.4}/day, doubling every {days:.1} days",
                    run.fit.daily_growth_factor()
                ),
                None => "not growing".to_string(),
            };
            lines.push(Line::from(Span::styled(
                format!(
                    "slope={:.6} | growth {growth} | rmse(log)={:.4}",
                    run.fit.slope, run.quality.rmse,
                ),
                Style::default().fg(Color::Gray),
            )));
        }

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(9)])
            .split(area);

        self.draw_chart(frame, chunks[0]);
        self.draw_settings(frame, chunks[1]);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chart_opts = &self.config.scenario.chart;
        let block = Block::default()
            .title(chart_opts.title.clone())
            .borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(run) = &self.run else {
            let msg = Paragraph::new("No fit available.")
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default());
            frame.render_widget(msg, inner);
            return;
        };

        let (projection, observed, markers, x_bounds, y_bounds) =
            chart_series(run, &self.config.scenario);

        let y_axis_label = if chart_opts.log_scale {
            format!("{} (log)", chart_opts.y_label)
        } else {
            chart_opts.y_label.clone()
        };
        let fmt_y: fn(f64) -> String = if chart_opts.log_scale {
            fmt_axis_y_log
        } else {
            fmt_axis_y_linear
        };

        let (chart_rect, insets) = chart_layout(inner);
        let widget = TrendChart {
            projection: &projection,
            observed: &observed,
            markers: &markers,
            x_bounds,
            y_bounds,
            x_label: &chart_opts.x_label,
            y_label: y_axis_label.clone(),
            fmt_x: fmt_axis_x,
            fmt_y,
        };

        frame.render_widget(widget, chart_rect);
        if let Some(insets) = insets {
            draw_axis_ticks(
                frame,
                inner,
                chart_rect,
                insets,
                x_bounds,
                y_bounds,
                AxisLabels {
                    x_label: &chart_opts.x_label,
                    y_label: &y_axis_label,
                    fmt_y,
                },
            );
        }
    }

    fn draw_settings(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let scenario = &self.config.scenario;
        let date_label = if self.editing_date {
            format!("{}_", self.date_input)
        } else {
            self.config.as_of.to_string()
        };

        let mut items = Vec::new();
        items.push(ListItem::new(format!("Scenario: {}", scenario.name)));
        items.push(ListItem::new(format!(
            "Window from: day {}",
            scenario.window.from_day
        )));
        items.push(ListItem::new(format!(
            "Window to: day {}",
            scenario.window.to_day
        )));
        items.push(ListItem::new(format!("Horizon: day {}", scenario.end_day)));
        items.push(ListItem::new(format!(
            "Weights: {}",
            scenario.weight_mode.display_name()
        )));
        items.push(ListItem::new(format!("As-of: {date_label}")));
        items.push(ListItem::new(format!(
            "Scale: {}",
            if scenario.chart.log_scale { "log10" } else { "linear" }
        )));

        let list = List::new(items)
            .block(Block::default().title("Settings").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ratatui::widgets::ListState::default();
        state.select(Some(self.selected_field));
        frame.render_stateful_widget(list, area, &mut state);

        if self.editing_date {
            let hint = Paragraph::new("Editing as-of date…")
                .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
            let rect = Rect {
                x: area.x + 2,
                y: area.y + area.height.saturating_sub(2),
                width: area.width.saturating_sub(4),
                height: 1,
            };
            frame.render_widget(hint, rect);
        }
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  ←/→ adjust  Enter edit date  s scenario  w weights  l scale  d debug  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Build chart series for Plotters.
///
/// On a log axis all y values are log10-transformed here so the widget stays
/// linear; counts are floored at 1 case to keep the transform finite.
fn chart_series(
    run: &RunOutput,
    scenario: &Scenario,
) -> (
    Vec<(f64, f64)>,
    Vec<(f64, f64)>,
    Vec<(f64, f64)>,
    [f64; 2],
    [f64; 2],
) {
    let log_scale = scenario.chart.log_scale;
    let to_y = |v: f64| if log_scale { v.max(1.0).log10() } else { v };

    let x_bounds = [0.0, scenario.end_day.max(1) as f64];

    let display_from = scenario.display_from_day.min(run.projected.len());
    let projection = run
        .projected
        .iter()
        .enumerate()
        .skip(display_from)
        .map(|(day, &value)| (day as f64, to_y(value)))
        .collect::<Vec<_>>();

    let observed = run
        .cumulative
        .iter()
        .enumerate()
        .map(|(day, &count)| (day as f64, to_y(count as f64)))
        .collect::<Vec<_>>();

    let markers = run
        .markers
        .iter()
        .map(|m| (m.day as f64, to_y(m.y)))
        .collect::<Vec<_>>();

    let y_bounds = if log_scale {
        // Fixed axis range matching the original charts: [1, y_axis_upper].
        [0.0, scenario.chart.y_axis_upper.log10()]
    } else {
        let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
        for &(_, y) in projection.iter().chain(&observed).chain(&markers) {
            y_min = y_min.min(y);
            y_max = y_max.max(y);
        }
        if !y_min.is_finite() || !y_max.is_finite() || y_max <= y_min {
            y_min = 0.0;
            y_max = 1.0;
        }
        let pad = ((y_max - y_min).abs() * 0.05).max(1e-12);
        [y_min - pad, y_max + pad]
    };

    (projection, observed, markers, x_bounds, y_bounds)
}

fn fmt_axis_x(v: f64) -> String {
    format!("{v:.0}")
}

fn fmt_axis_y_linear(v: f64) -> String {
    format!("{v:.0}")
}

/// Tick values arrive in log10 space; show the case count they stand for.
fn fmt_axis_y_log(v: f64) -> String {
    format!("{:.0}", 10f64.powf(v))
}

#[derive(Debug, Clone, Copy)]
struct AxisInsets {
    left: u16,
    right: u16,
    top: u16,
    bottom: u16,
}

#[derive(Clone, Copy)]
struct AxisLabels<'a> {
    x_label: &'a str,
    y_label: &'a str,
    fmt_y: fn(f64) -> String,
}

fn chart_layout(inner: Rect) -> (Rect, Option<AxisInsets>) {
    let insets = AxisInsets {
        left: 8,
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
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
    labels: AxisLabels<'_>,
) {
    let ticks = 5usize;
    let style = Style::default().fg(Color::Gray);

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let x_val = x_bounds[0] + u * (x_bounds[1] - x_bounds[0]);
        let x = chart.x + ((chart.width - 1) as f64 * u).round() as u16;
        let label = format!("{x_val:.0}");
        let label_len = label.len() as u16;
        let start = x.saturating_sub((label.len() / 2) as u16);
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

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let y_val = y_bounds[0] + u * (y_bounds[1] - y_bounds[0]);
        let y = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * u).round() as u16;
        let label = (labels.fmt_y)(y_val);
        let label_len = label.len() as u16;
        let x = inner.x + insets.left.saturating_sub(1);
        let start = x.saturating_sub(label.len() as u16);
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

    let x_label = Paragraph::new(labels.x_label)
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

    let y_label = Paragraph::new(labels.y_label)
        .style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD));
    let y_rect = Rect {
        x: inner.x,
        y: inner.y,
        width: insets.left.saturating_sub(1),
        height: 1,
    };
    frame.render_widget(y_label, y_rect);
}
