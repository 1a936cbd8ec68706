use std::{
    collections::VecDeque,
    fs::{self, File},
    io::{self, Stdout},
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use antsim_core::{Role, TickEvents, WorldState};
use antsim_render::{Camera, CameraConfig, Viewport};
use anyhow::{Context, Result};
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyModifiers,
        MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Sparkline},
};
use serde::Serialize;
use supports_color::{ColorLevel, Stream, on_cached};
use tracing::info;

use crate::renderer::{Renderer, RendererContext};

const TARGET_SIM_HZ: f32 = 60.0;
const MAX_STEPS_PER_FRAME: usize = 240;
const UI_TICK_MILLIS: u64 = 100;
const DEFAULT_HEADLESS_FRAMES: usize = 12;
const MAX_HEADLESS_FRAMES: usize = 360;
const EVENT_LOG_CAPACITY: usize = 16;
const KEY_PAN_STRIDE: f32 = 40.0;

pub struct TerminalRenderer {
    tick_interval: Duration,
    draw_interval: Duration,
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs_f32(1.0 / TARGET_SIM_HZ),
            draw_interval: Duration::from_millis(UI_TICK_MILLIS),
        }
    }
}

impl Renderer for TerminalRenderer {
    fn name(&self) -> &'static str {
        "terminal"
    }

    fn run(&self, ctx: RendererContext) -> Result<()> {
        if std::env::var_os("ANTSIM_TERMINAL_HEADLESS").is_some() {
            let report = self.run_headless(ctx)?;
            info!(
                target = "antsim::terminal",
                frames = report.summary.frame_count,
                ticks_simulated = report.summary.ticks_simulated,
                final_tick = report.summary.final_tick,
                final_colony_size = report.summary.final_colony_size,
                food_collected = report.summary.final_food_collected,
                total_pickups = report.summary.total_pickups,
                total_deliveries = report.summary.total_deliveries,
                "Terminal headless run completed"
            );
            return Ok(());
        }

        let mut stdout = io::stdout();
        enable_raw_mode().context("failed to enable raw mode")?;
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
            .context("failed to enter alternate screen")?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to build terminal backend")?;
        terminal.hide_cursor().ok();

        let result = run_event_loop(self, &mut terminal, ctx);

        terminal.show_cursor().ok();
        if let Err(err) = disable_raw_mode() {
            tracing::error!(?err, "failed to disable raw mode");
        }
        if let Err(err) = execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        ) {
            tracing::error!(?err, "failed to leave alternate screen");
        }

        result
    }
}

fn run_event_loop(
    renderer: &TerminalRenderer,
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    ctx: RendererContext,
) -> Result<()> {
    let mut app = TerminalApp::new(renderer, ctx);

    loop {
        let now = Instant::now();
        app.maybe_step_simulation(now);

        if now.duration_since(app.last_draw) >= app.draw_interval {
            terminal.draw(|frame| app.draw(frame))?;
            app.last_draw = now;
        }

        let timeout = renderer
            .draw_interval
            .saturating_sub(now.duration_since(app.last_event_check));
        let event_ready = event::poll(timeout).unwrap_or(false);
        if event_ready {
            match event::read()? {
                Event::Key(key) => {
                    if app.handle_key(key) {
                        break;
                    }
                }
                Event::Mouse(mouse) => app.handle_mouse(mouse),
                _ => {}
            }
            app.last_event_check = Instant::now();
        }
    }

    Ok(())
}

impl TerminalRenderer {
    fn run_headless(&self, ctx: RendererContext) -> Result<HeadlessReport> {
        let backend = ratatui::backend::TestBackend::new(80, 36);
        let mut terminal = Terminal::new(backend).context("failed to build test backend")?;
        let mut app = TerminalApp::new(self, ctx);
        let mut report =
            HeadlessReport::new(FrameStats::capture(&app.world, TickEvents::default()));
        let frames = self.headless_frame_budget();

        for _ in 0..frames {
            let events = app.step_once();
            report.record(FrameStats::capture(&app.world, events));
            terminal.draw(|frame| app.draw(frame))?;
        }

        report.finalize();

        if let Some(path) = report_file_path_from_env() {
            report.write_json(&path).with_context(|| {
                format!("failed to write headless report to {}", path.display())
            })?;
        }

        Ok(report)
    }

    fn headless_frame_budget(&self) -> usize {
        std::env::var("ANTSIM_TERMINAL_HEADLESS_FRAMES")
            .ok()
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .filter(|value| *value > 0)
            .map(|value| value.min(MAX_HEADLESS_FRAMES))
            .unwrap_or(DEFAULT_HEADLESS_FRAMES)
    }
}

struct TerminalApp {
    world: WorldState,
    camera: Camera,
    tick_interval: Duration,
    draw_interval: Duration,
    speed_multiplier: f32,
    paused: bool,
    help_visible: bool,
    sim_accumulator: f32,
    last_tick: Instant,
    last_draw: Instant,
    last_event_check: Instant,
    palette: Palette,
    map_inner: Rect,
    event_log: VecDeque<EventEntry>,
}

impl TerminalApp {
    fn new(renderer: &TerminalRenderer, ctx: RendererContext) -> Self {
        let world = ctx.world;
        let palette = Palette::detect();
        let camera_config = CameraConfig {
            map_size: (
                world.config().map_width as f32,
                world.config().map_height as f32,
            ),
            ..CameraConfig::default()
        };
        let mut camera = Camera::new(camera_config);
        camera.center_on(world.nest());
        Self {
            world,
            camera,
            tick_interval: renderer.tick_interval,
            draw_interval: renderer.draw_interval,
            speed_multiplier: 1.0,
            paused: false,
            help_visible: false,
            sim_accumulator: 0.0,
            last_tick: Instant::now(),
            last_draw: Instant::now(),
            last_event_check: Instant::now(),
            palette,
            map_inner: Rect::default(),
            event_log: VecDeque::with_capacity(EVENT_LOG_CAPACITY),
        }
    }

    fn maybe_step_simulation(&mut self, now: Instant) {
        let delta = now - self.last_tick;
        self.last_tick = now;

        let mut steps = 0usize;

        let effective_speed = if self.paused {
            0.0
        } else {
            self.speed_multiplier.max(0.0)
        };

        let step_interval = self.tick_interval.as_secs_f32();
        if effective_speed > f32::EPSILON && step_interval > f32::EPSILON {
            self.sim_accumulator += delta.as_secs_f32() * effective_speed;
            let max_accumulator = step_interval * MAX_STEPS_PER_FRAME as f32;
            if self.sim_accumulator > max_accumulator {
                self.sim_accumulator = max_accumulator;
            }
            steps = (self.sim_accumulator / step_interval).floor() as usize;
            if steps > MAX_STEPS_PER_FRAME {
                steps = MAX_STEPS_PER_FRAME;
            }
            if steps > 0 {
                self.sim_accumulator -= step_interval * steps as f32;
            }
        }

        for _ in 0..steps {
            let events = self.world.step();
            self.ingest_events(&events);
        }
    }

    fn step_once(&mut self) -> TickEvents {
        let events = self.world.step();
        self.ingest_events(&events);
        events
    }

    fn draw(&mut self, frame: &mut Frame<'_>) {
        let outer = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(frame.area());

        self.draw_header(frame, outer[0]);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
            .split(outer[1]);

        self.draw_map(frame, body[0]);

        let sidebar = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(6),
                Constraint::Length(7),
                Constraint::Min(3),
            ])
            .split(body[1]);

        self.draw_stats(frame, sidebar[0]);
        self.draw_trends(frame, sidebar[1]);
        self.draw_events(frame, sidebar[2]);

        if self.help_visible {
            self.draw_help(frame);
        }
    }

    fn draw_header(&self, frame: &mut Frame<'_>, area: Rect) {
        let live_sources = self
            .world
            .food()
            .iter()
            .filter(|source| !source.is_depleted())
            .count();
        let status = format!(
            "Tick {:>6}  Colony {:>4}  Food Collected {:>5}  Sources {}/{}",
            self.world.tick().0,
            self.world.colony_size(),
            self.world.total_food_collected(),
            live_sources,
            self.world.food().len(),
        );

        let paused_flag = if self.paused {
            Span::styled(" PAUSED ", self.palette.paused_style())
        } else {
            Span::styled(" RUNNING ", self.palette.running_style())
        };

        let mode_span = Span::styled(
            format!(
                " x{:.1} ",
                if self.paused {
                    0.0
                } else {
                    self.speed_multiplier
                }
            ),
            self.palette.speed_style(self.speed_multiplier),
        );

        let mut line = Line::from(vec![Span::styled(status, self.palette.header_style())]);
        line.spans.push(Span::raw("  "));
        line.spans.push(paused_flag);
        line.spans.push(mode_span);

        let paragraph = Paragraph::new(line).block(
            Block::default()
                .title(self.palette.title("Ant Colony Terminal HUD"))
                .borders(Borders::ALL),
        );
        frame.render_widget(paragraph, area);
    }

    fn draw_stats(&self, frame: &mut Frame<'_>, area: Rect) {
        let mut queens = 0usize;
        let mut soldiers = 0usize;
        let mut workers = 0usize;
        let mut carrying = 0usize;
        for ant in self.world.ants() {
            match ant.role {
                Role::Queen => queens += 1,
                Role::Soldier => soldiers += 1,
                Role::Worker => workers += 1,
            }
            if ant.carrying_food {
                carrying += 1;
            }
        }
        let field_food: u32 = self.world.food().iter().map(|source| source.amount()).sum();

        let mut lines = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("Colony Size: ", self.palette.header_style()),
            Span::raw(format!("{:>4}", self.world.colony_size())),
            Span::raw("   "),
            Span::styled("Q:", self.palette.role_style(Role::Queen)),
            Span::raw(format!("{queens}")),
            Span::raw("  "),
            Span::styled("S:", self.palette.role_style(Role::Soldier)),
            Span::raw(format!("{soldiers}")),
            Span::raw("  "),
            Span::styled("W:", self.palette.role_style(Role::Worker)),
            Span::raw(format!("{workers}")),
        ]));
        lines.push(Line::from(vec![
            Span::styled("Food Collected: ", self.palette.header_style()),
            Span::raw(format!("{:>5}", self.world.total_food_collected())),
            Span::raw("   "),
            Span::styled("Carrying ", self.palette.carrying_style()),
            Span::raw(format!("{carrying:>3}")),
        ]));
        lines.push(Line::from(vec![
            Span::styled("Field Food ", self.palette.header_style()),
            Span::raw(format!("{field_food:>5}")),
        ]));
        lines.push(Line::from(vec![
            Span::styled("Camera ", self.palette.header_style()),
            Span::raw(format!(
                "({:>6.1}, {:>6.1})",
                self.camera.offset().0,
                self.camera.offset().1
            )),
        ]));

        let paragraph = Paragraph::new(Text::from(lines)).block(
            Block::default()
                .title(self.palette.title("Vital Stats"))
                .borders(Borders::ALL),
        );
        frame.render_widget(paragraph, area);
    }

    fn draw_trends(&self, frame: &mut Frame<'_>, area: Rect) {
        let block = Block::default()
            .title(self.palette.title("Colony & Food Trends"))
            .borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if inner.height == 0 {
            return;
        }

        let trend_layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(inner);

        let colony_data: Vec<u64> = self
            .world
            .stats()
            .colony_sizes()
            .map(|value| value as u64)
            .collect();
        let food_data: Vec<u64> = self.world.stats().food_totals().collect();

        if !colony_data.is_empty() {
            let spark = Sparkline::default()
                .style(self.palette.colony_spark_style())
                .data(&colony_data);
            frame.render_widget(spark, trend_layout[0]);
        }
        if !food_data.is_empty() {
            let spark = Sparkline::default()
                .style(self.palette.food_spark_style())
                .data(&food_data);
            frame.render_widget(spark, trend_layout[1]);
        }

        let mut trend_lines = Vec::new();
        if let Some(latest) = self.world.stats().latest() {
            trend_lines.push(Line::from(vec![
                Span::styled("Latest ", self.palette.header_style()),
                Span::raw(format!(
                    "t{:>6} colony {:>4} food {:>5}",
                    latest.tick.0, latest.colony_size, latest.food_collected
                )),
            ]));
        }
        if let (Some(oldest), Some(latest)) = (
            self.world.stats().samples().next(),
            self.world.stats().latest(),
        ) {
            trend_lines.push(Line::from(vec![
                Span::styled("Window ", self.palette.header_style()),
                Span::raw(format!(
                    "t{:>6}→t{:>6} colony {:>4}→{:>4}",
                    oldest.tick.0, latest.tick.0, oldest.colony_size, latest.colony_size
                )),
            ]));
        }
        if trend_lines.is_empty() {
            trend_lines.push(Line::from(vec![Span::raw("Waiting for samples...")]));
        }
        let trend_text = Paragraph::new(trend_lines).block(Block::default());
        frame.render_widget(trend_text, trend_layout[2]);
    }

    fn draw_map(&mut self, frame: &mut Frame<'_>, area: Rect) {
        let config = self.world.config();
        let title = format!("Colony Map {}×{}", config.map_width, config.map_height);
        let min_radius = config.food_min_radius;
        let radius_scale = config.food_radius_scale;

        let block = Block::default()
            .title(self.palette.title(title))
            .borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        self.map_inner = inner;

        if inner.width < 2 || inner.height < 2 {
            return;
        }

        let width = inner.width as usize;
        let height = inner.height as usize;
        let mut grid = vec![CellGlyph::default(); width * height];

        let viewport = Viewport::new(&self.camera, inner.width, inner.height);

        // Food first, then the nest, then ants, so ants overdraw what they
        // stand on.
        for source in self.world.food() {
            if let Some((column, row)) = viewport.project(source.position()) {
                let radius = source.display_radius(min_radius, radius_scale);
                let (glyph, style) = self.palette.food_symbol(source.amount(), radius);
                grid[row as usize * width + column as usize] = CellGlyph { ch: glyph, style };
            }
        }

        if let Some((column, row)) = viewport.project(self.world.nest()) {
            grid[row as usize * width + column as usize] = CellGlyph {
                ch: '◉',
                style: self.palette.nest_style(),
            };
        }

        for ant in self.world.ants() {
            if let Some((column, row)) = viewport.project(ant.position) {
                let (glyph, style) = self.palette.ant_symbol(ant.role, ant.carrying_food);
                grid[row as usize * width + column as usize] = CellGlyph { ch: glyph, style };
            }
        }

        let mut lines = Vec::with_capacity(height);
        for y in 0..height {
            let mut spans = Vec::with_capacity(width);
            for x in 0..width {
                let cell = &grid[y * width + x];
                spans.push(Span::styled(cell.ch.to_string(), cell.style));
            }
            lines.push(Line::from(spans));
        }

        let paragraph = Paragraph::new(Text::from(lines));
        frame.render_widget(paragraph, inner);
    }

    fn draw_events(&self, frame: &mut Frame<'_>, area: Rect) {
        let events: Vec<ListItem> = self
            .event_log
            .iter()
            .rev()
            .map(|entry| {
                let style = self.palette.event_style(entry.kind);
                let text = format!("[t{:>6}] {}", entry.tick, entry.message);
                ListItem::new(Span::styled(text, style))
            })
            .collect();
        let block = Block::default()
            .title(self.palette.title("Recent Events"))
            .borders(Borders::ALL);
        frame.render_widget(List::new(events).block(block), area);
    }

    fn draw_help(&self, frame: &mut Frame<'_>) {
        let size = frame.area();
        let help_width = (size.width as f32 * 0.6).round() as u16;
        let help_height = 10;
        let help_x = size.x + size.width.saturating_sub(help_width) / 2;
        let help_y = size.y + size.height.saturating_sub(help_height) / 2;
        let area = Rect::new(help_x, help_y, help_width, help_height);

        let help_lines = vec![
            Line::from(vec![Span::styled(
                "Controls",
                self.palette.header_style().add_modifier(Modifier::BOLD),
            )]),
            Line::raw(" q / Esc   Quit"),
            Line::raw(" space     Toggle pause"),
            Line::raw(" + / -     Adjust speed"),
            Line::raw(" n         Single step"),
            Line::raw(" arrows    Pan the camera"),
            Line::raw(" drag      Pan with the mouse"),
            Line::raw(" ?         Toggle this help"),
        ];

        let paragraph = Paragraph::new(help_lines).block(
            Block::default()
                .title(self.palette.title("Help"))
                .borders(Borders::ALL)
                .style(Style::default().bg(Color::Black).fg(Color::White)),
        );
        frame.render_widget(paragraph, area);
    }

    fn handle_key(&mut self, key: KeyEvent) -> bool {
        match (key.code, key.modifiers) {
            (KeyCode::Esc, _)
            | (KeyCode::Char('q'), _)
            | (KeyCode::Char('Q'), _)
            | (KeyCode::Char('c'), KeyModifiers::CONTROL) => {
                return true;
            }
            (KeyCode::Char(' '), _) => {
                self.paused = !self.paused;
                if self.paused {
                    self.speed_multiplier = 0.0;
                } else if self.speed_multiplier <= 0.0 {
                    self.speed_multiplier = 1.0;
                }
            }
            (KeyCode::Char('+') | KeyCode::Char('='), _) => {
                self.speed_multiplier = (self.speed_multiplier + 0.5).clamp(0.5, 8.0);
                if self.speed_multiplier > 0.0 {
                    self.paused = false;
                }
                self.push_event(
                    self.world.tick().0,
                    EventKind::Info,
                    format!("Speed x{:.1}", self.speed_multiplier),
                );
            }
            (KeyCode::Char('-') | KeyCode::Char('_'), _) => {
                self.speed_multiplier = (self.speed_multiplier - 0.5).max(0.0);
                if self.speed_multiplier <= 0.0 {
                    self.paused = true;
                }
                let message = if self.paused {
                    "Simulation paused".to_string()
                } else {
                    format!("Speed x{:.1}", self.speed_multiplier)
                };
                self.push_event(self.world.tick().0, EventKind::Info, message);
            }
            (KeyCode::Char('n'), _) => {
                let events = self.step_once();
                self.paused = true;
                self.speed_multiplier = 0.0;
                self.push_event(events.tick.0, EventKind::Info, "Single-step executed");
            }
            (KeyCode::Left, _) => self.camera.pan(-KEY_PAN_STRIDE, 0.0),
            (KeyCode::Right, _) => self.camera.pan(KEY_PAN_STRIDE, 0.0),
            (KeyCode::Up, _) => self.camera.pan(0.0, -KEY_PAN_STRIDE),
            (KeyCode::Down, _) => self.camera.pan(0.0, KEY_PAN_STRIDE),
            (KeyCode::Char('?') | KeyCode::Char('h'), _) => {
                self.help_visible = !self.help_visible;
            }
            _ => {}
        }

        false
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(cursor) = self.mouse_to_world(mouse.column, mouse.row) {
                    self.camera.start_pan(cursor);
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if let Some(cursor) = self.mouse_to_world(mouse.column, mouse.row) {
                    self.camera.update_pan(cursor);
                }
            }
            MouseEventKind::Up(MouseButton::Left) => self.camera.end_pan(),
            _ => {}
        }
    }

    /// Converts a terminal cell under the map widget into world units
    /// relative to the viewport origin.
    fn mouse_to_world(&self, column: u16, row: u16) -> Option<(f32, f32)> {
        let area = self.map_inner;
        if area.width == 0 || area.height == 0 {
            return None;
        }
        if column < area.x
            || row < area.y
            || column >= area.x + area.width
            || row >= area.y + area.height
        {
            return None;
        }
        let (view_width, view_height) = self.camera.config().viewport_size;
        let x = f32::from(column - area.x) / f32::from(area.width) * view_width;
        let y = f32::from(row - area.y) / f32::from(area.height) * view_height;
        Some((x, y))
    }

    fn ingest_events(&mut self, events: &TickEvents) {
        if events.deliveries > 0 {
            let noun = if events.deliveries == 1 {
                "delivery"
            } else {
                "deliveries"
            };
            self.push_event(
                events.tick.0,
                EventKind::Delivery,
                format!("{} {}", events.deliveries, noun),
            );
        }
        if events.pickups > 0 {
            let plural = if events.pickups == 1 { "" } else { "s" };
            self.push_event(
                events.tick.0,
                EventKind::Pickup,
                format!("{} pickup{}", events.pickups, plural),
            );
        }
        if events.worker_spawned {
            self.push_event(
                events.tick.0,
                EventKind::Spawn,
                format!("Worker hatched (colony {})", self.world.colony_size()),
            );
        }
    }

    fn push_event(&mut self, tick: u64, kind: EventKind, message: impl Into<String>) {
        if self.event_log.len() >= EVENT_LOG_CAPACITY {
            self.event_log.pop_front();
        }
        self.event_log.push_back(EventEntry {
            tick,
            kind,
            message: message.into(),
        });
    }
}

#[derive(Clone, Debug)]
struct EventEntry {
    tick: u64,
    message: String,
    kind: EventKind,
}

#[derive(Clone, Copy, Debug)]
enum EventKind {
    Pickup,
    Delivery,
    Spawn,
    Info,
}

#[derive(Clone, Debug)]
struct CellGlyph {
    ch: char,
    style: Style,
}

impl Default for CellGlyph {
    fn default() -> Self {
        Self {
            ch: ' ',
            style: Style::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct HeadlessReport {
    initial: FrameStats,
    frames: Vec<FrameStats>,
    summary: ReportSummary,
}

impl HeadlessReport {
    fn new(initial: FrameStats) -> Self {
        Self {
            initial,
            frames: Vec::new(),
            summary: ReportSummary::default(),
        }
    }

    fn record(&mut self, stats: FrameStats) {
        self.frames.push(stats);
    }

    fn finalize(&mut self) {
        self.summary = ReportSummary::from(&self.initial, &self.frames);
    }

    fn write_json(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self).context("failed to serialize headless report")?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
struct FrameStats {
    tick: u64,
    colony_size: usize,
    food_collected: u64,
    pickups: u32,
    deliveries: u32,
}

impl FrameStats {
    fn capture(world: &WorldState, events: TickEvents) -> Self {
        Self {
            tick: world.tick().0,
            colony_size: world.colony_size(),
            food_collected: world.total_food_collected(),
            pickups: events.pickups,
            deliveries: events.deliveries,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
struct ReportSummary {
    frame_count: usize,
    ticks_simulated: u64,
    final_tick: u64,
    final_colony_size: usize,
    final_food_collected: u64,
    total_pickups: u64,
    total_deliveries: u64,
}

impl ReportSummary {
    fn from(initial: &FrameStats, frames: &[FrameStats]) -> Self {
        let Some(final_stats) = frames.last() else {
            return Self {
                frame_count: 0,
                ticks_simulated: 0,
                final_tick: initial.tick,
                final_colony_size: initial.colony_size,
                final_food_collected: initial.food_collected,
                total_pickups: 0,
                total_deliveries: 0,
            };
        };

        Self {
            frame_count: frames.len(),
            ticks_simulated: final_stats.tick.saturating_sub(initial.tick),
            final_tick: final_stats.tick,
            final_colony_size: final_stats.colony_size,
            final_food_collected: final_stats.food_collected,
            total_pickups: frames.iter().map(|frame| u64::from(frame.pickups)).sum(),
            total_deliveries: frames
                .iter()
                .map(|frame| u64::from(frame.deliveries))
                .sum(),
        }
    }
}

fn report_file_path_from_env() -> Option<PathBuf> {
    std::env::var_os("ANTSIM_TERMINAL_HEADLESS_REPORT").and_then(|raw| {
        if raw.is_empty() {
            None
        } else {
            Some(PathBuf::from(raw))
        }
    })
}

struct Palette {
    level: Option<ColorLevel>,
}

impl Palette {
    fn detect() -> Self {
        Self {
            level: on_cached(Stream::Stdout),
        }
    }

    fn header_style(&self) -> Style {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    }

    fn paused_style(&self) -> Style {
        Style::default()
            .fg(Color::Black)
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD)
    }

    fn running_style(&self) -> Style {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Green)
            .add_modifier(Modifier::BOLD)
    }

    fn speed_style(&self, speed: f32) -> Style {
        let color = if speed > 1.0 {
            Color::Yellow
        } else if speed <= 0.0 {
            Color::DarkGray
        } else {
            Color::LightCyan
        };
        Style::default().fg(color)
    }

    fn title<T: Into<String>>(&self, title: T) -> Span<'static> {
        Span::styled(title.into(), self.header_style())
    }

    fn role_style(&self, role: Role) -> Style {
        Style::default().fg(self.role_color(role))
    }

    fn role_color(&self, role: Role) -> Color {
        match role {
            Role::Queen => Color::Yellow,
            Role::Soldier => Color::Blue,
            Role::Worker => Color::White,
        }
    }

    fn carrying_style(&self) -> Style {
        Style::default().fg(Color::Red)
    }

    fn colony_spark_style(&self) -> Style {
        Style::default().fg(Color::Green)
    }

    fn food_spark_style(&self) -> Style {
        Style::default().fg(Color::Yellow)
    }

    fn event_style(&self, kind: EventKind) -> Style {
        let color = match kind {
            EventKind::Pickup => Color::Green,
            EventKind::Delivery => Color::Yellow,
            EventKind::Spawn => Color::Magenta,
            EventKind::Info => Color::Cyan,
        };
        Style::default().fg(color)
    }

    fn nest_style(&self) -> Style {
        let rich_color = self
            .level
            .is_some_and(|level| level.has_16m || level.has_256);
        let mut style = Style::default()
            .fg(Color::LightYellow)
            .add_modifier(Modifier::BOLD);
        if rich_color {
            style = style.bg(Color::Rgb(92, 64, 24));
        }
        style
    }

    fn food_symbol(&self, amount: u32, radius: f32) -> (char, Style) {
        if amount == 0 {
            return (
                '·',
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::DIM),
            );
        }
        let glyph = if radius >= 8.0 {
            '●'
        } else if radius >= 5.0 {
            'o'
        } else {
            '.'
        };
        let mut style = Style::default().fg(Color::Green);
        if radius >= 8.0 {
            style = style.add_modifier(Modifier::BOLD);
        }
        (glyph, style)
    }

    fn ant_symbol(&self, role: Role, carrying: bool) -> (char, Style) {
        match role {
            Role::Queen => (
                'Q',
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            Role::Soldier => ('s', Style::default().fg(Color::Blue)),
            Role::Worker if carrying => (
                'a',
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Role::Worker => ('a', Style::default().fg(Color::White)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use antsim_core::{ColonyConfig, Tick};

    fn quiet_config() -> ColonyConfig {
        ColonyConfig {
            rng_seed: Some(11),
            food_source_count: 0,
            ant_speed: 0.0,
            heading_jitter: 0.0,
            growth_interval: 0,
            stats_interval: 0,
            ..ColonyConfig::default()
        }
    }

    fn test_app(config: ColonyConfig) -> TerminalApp {
        let mut world = WorldState::new(config).expect("world");
        world.spawn_initial_population();
        let renderer = TerminalRenderer::default();
        TerminalApp::new(&renderer, RendererContext { world })
    }

    #[test]
    fn camera_starts_centered_on_nest() {
        let app = test_app(quiet_config());
        let offset = app.camera.offset();
        assert!((offset.0 - 400.0).abs() < 1e-4);
        assert!((offset.1 - 300.0).abs() < 1e-4);
    }

    #[test]
    fn quit_keys_end_the_session() {
        let mut app = test_app(quiet_config());
        assert!(app.handle_key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE)));
        assert!(app.handle_key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)));
        assert!(app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(!app.handle_key(KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE)));
    }

    #[test]
    fn space_toggles_pause_and_restores_speed() {
        let mut app = test_app(quiet_config());
        app.handle_key(KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE));
        assert!(app.paused);
        assert_eq!(app.speed_multiplier, 0.0);
        app.handle_key(KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE));
        assert!(!app.paused);
        assert_eq!(app.speed_multiplier, 1.0);
    }

    #[test]
    fn speed_keys_clamp_into_range() {
        let mut app = test_app(quiet_config());
        for _ in 0..32 {
            app.handle_key(KeyEvent::new(KeyCode::Char('+'), KeyModifiers::NONE));
        }
        assert_eq!(app.speed_multiplier, 8.0);
        for _ in 0..32 {
            app.handle_key(KeyEvent::new(KeyCode::Char('-'), KeyModifiers::NONE));
        }
        assert_eq!(app.speed_multiplier, 0.0);
        assert!(app.paused);
    }

    #[test]
    fn single_step_advances_and_pauses() {
        let mut app = test_app(quiet_config());
        assert!(!app.handle_key(KeyEvent::new(KeyCode::Char('n'), KeyModifiers::NONE)));
        assert_eq!(app.world.tick().0, 1);
        assert!(app.paused);
        assert_eq!(app.speed_multiplier, 0.0);
        assert!(!app.event_log.is_empty());
    }

    #[test]
    fn arrow_keys_pan_by_fixed_stride() {
        let mut app = test_app(quiet_config());
        app.handle_key(KeyEvent::new(KeyCode::Right, KeyModifiers::NONE));
        app.handle_key(KeyEvent::new(KeyCode::Down, KeyModifiers::NONE));
        let offset = app.camera.offset();
        assert!((offset.0 - 440.0).abs() < 1e-4);
        assert!((offset.1 - 340.0).abs() < 1e-4);
    }

    #[test]
    fn mouse_drag_pans_against_the_cursor() {
        let mut app = test_app(quiet_config());
        app.map_inner = Rect::new(1, 1, 80, 24);
        app.handle_mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 11,
            row: 10,
            modifiers: KeyModifiers::NONE,
        });
        app.handle_mouse(MouseEvent {
            kind: MouseEventKind::Drag(MouseButton::Left),
            column: 6,
            row: 10,
            modifiers: KeyModifiers::NONE,
        });
        app.handle_mouse(MouseEvent {
            kind: MouseEventKind::Up(MouseButton::Left),
            column: 6,
            row: 10,
            modifiers: KeyModifiers::NONE,
        });
        let offset = app.camera.offset();
        assert!((offset.0 - 450.0).abs() < 1e-4);
        assert!((offset.1 - 300.0).abs() < 1e-4);
        assert!(!app.camera.is_panning());
    }

    #[test]
    fn mouse_events_outside_the_map_are_ignored() {
        let mut app = test_app(quiet_config());
        app.map_inner = Rect::new(1, 1, 80, 24);
        app.handle_mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 0,
            row: 30,
            modifiers: KeyModifiers::NONE,
        });
        assert!(!app.camera.is_panning());
    }

    #[test]
    fn tick_events_feed_the_event_log() {
        let mut app = test_app(quiet_config());
        let events = TickEvents {
            tick: Tick(42),
            pickups: 2,
            deliveries: 1,
            worker_spawned: true,
            stats_sampled: false,
        };
        app.ingest_events(&events);
        assert_eq!(app.event_log.len(), 3);
        let messages: Vec<&str> = app
            .event_log
            .iter()
            .map(|entry| entry.message.as_str())
            .collect();
        assert!(messages.iter().any(|message| message.contains("delivery")));
        assert!(messages.iter().any(|message| message.contains("pickup")));
        assert!(messages.iter().any(|message| message.contains("hatched")));
    }

    #[test]
    fn event_log_stays_bounded() {
        let mut app = test_app(quiet_config());
        for tick in 0..(EVENT_LOG_CAPACITY as u64 + 8) {
            app.push_event(tick, EventKind::Info, "entry");
        }
        assert_eq!(app.event_log.len(), EVENT_LOG_CAPACITY);
        assert_eq!(app.event_log.front().map(|entry| entry.tick), Some(8));
    }

    #[test]
    fn report_summary_aggregates_frames() {
        let initial = FrameStats {
            tick: 0,
            colony_size: 50,
            food_collected: 0,
            pickups: 0,
            deliveries: 0,
        };
        let frames = vec![
            FrameStats {
                tick: 1,
                colony_size: 50,
                food_collected: 1,
                pickups: 2,
                deliveries: 1,
            },
            FrameStats {
                tick: 2,
                colony_size: 51,
                food_collected: 3,
                pickups: 1,
                deliveries: 2,
            },
        ];
        let summary = ReportSummary::from(&initial, &frames);
        assert_eq!(summary.frame_count, 2);
        assert_eq!(summary.ticks_simulated, 2);
        assert_eq!(summary.final_tick, 2);
        assert_eq!(summary.final_colony_size, 51);
        assert_eq!(summary.final_food_collected, 3);
        assert_eq!(summary.total_pickups, 3);
        assert_eq!(summary.total_deliveries, 3);
    }

    #[test]
    fn empty_report_falls_back_to_initial_frame() {
        let initial = FrameStats {
            tick: 7,
            colony_size: 50,
            food_collected: 4,
            pickups: 0,
            deliveries: 0,
        };
        let summary = ReportSummary::from(&initial, &[]);
        assert_eq!(summary.frame_count, 0);
        assert_eq!(summary.ticks_simulated, 0);
        assert_eq!(summary.final_tick, 7);
        assert_eq!(summary.final_food_collected, 4);
    }

    #[test]
    fn draw_renders_into_test_backend() {
        let mut app = test_app(quiet_config());
        let backend = ratatui::backend::TestBackend::new(80, 36);
        let mut terminal = Terminal::new(backend).expect("terminal");
        terminal.draw(|frame| app.draw(frame)).expect("draw");
        assert!(app.map_inner.width > 0);
        assert!(app.map_inner.height > 0);
    }
}
