// SPDX-License-Identifier: GPL-3.0-only

//! Terminal user interface
//!
//! Two screens: a landing page and the scanner. The scanner renders the
//! latest frame with Unicode half-block characters for improved vertical
//! resolution, samples frames for QR detection, and hosts the dialogs raised
//! by the scan session.
//!
//! All UI state lives on one async loop. Key presses, dialog requests,
//! permission answers, and detection results arrive over channels and are
//! handled in turn.

use crate::app::actions::ActionRegistry;
use crate::app::converters::{BoolToScanTextConverter, ValueConverter};
use crate::app::frame_processor::QrDetector;
use crate::app::navigation::{Navigator, Screen};
use crate::app::presenter::{DialogPresenter, DialogRequest};
use crate::backends::camera::types::CameraFrame;
use crate::backends::camera::{
    self, CaptureLoopController, FrameReceiver, FrameSource, LoopAction, v4l2_utils,
};
use crate::config::Config;
use crate::constants::{actions, devices, routes, timing};
use crate::errors::AppResult;
use crate::fl;
use crate::permissions::PlatformPermission;
use crate::scan::{
    DetectionEvent, DetectionOutcome, ScanSessionController, ScanState, SessionOptions,
};

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    buffer::Buffer,
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    style::{Color, Style, Stylize},
    text::Line,
    widgets::{Block, Clear, Paragraph, Widget, Wrap},
};
use std::collections::VecDeque;
use std::io::{self, stdout};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, watch};
use tokio::task::AbortHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

type Controller = ScanSessionController<PlatformPermission, DialogPresenter>;

/// Run the terminal scanner
pub fn run(config: Config, source: Option<FrameSource>) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("qrreader-worker")
        .build()?;

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = runtime.block_on(run_app(&mut terminal, config, source));

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// Pick the frame source: explicit images, explicit device, the last used
/// device, then the first video node found.
pub fn resolve_source(
    images: Vec<PathBuf>,
    device: Option<String>,
    config: &Config,
) -> Option<FrameSource> {
    if !images.is_empty() {
        return Some(FrameSource::Images(images));
    }
    if let Some(device) = device.or_else(|| config.last_camera_path.clone()) {
        return Some(FrameSource::Device(device));
    }
    v4l2_utils::enumerate_video_nodes(Path::new(devices::DEV_DIR))
        .into_iter()
        .next()
        .map(|node| FrameSource::Device(node.to_string_lossy().into_owned()))
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    config: Config,
    source: Option<FrameSource>,
) -> Result<(), Box<dyn std::error::Error>> {
    let (presenter, mut dialog_requests) = DialogPresenter::channel();
    let (events_tx, mut events) = mpsc::unbounded_channel();
    let (keys_tx, mut keys) = mpsc::unbounded_channel();

    let _input = start_input_thread(keys_tx);
    let registry = action_registry();

    let mut app = App::new(config, source, Arc::new(presenter), events_tx);

    let mut tick = tokio::time::interval(timing::UI_TICK);
    tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        app.refresh();
        terminal.draw(|f| app.draw(f))?;

        if app.quit {
            break;
        }

        tokio::select! {
            Some(key) = keys.recv() => app.handle_key(key, &registry),
            Some(request) = dialog_requests.recv() => {
                debug!(title = %request.title, "Showing dialog");
                app.dialogs.push_back(request);
            }
            Some(event) = events.recv() => app.handle_event(event),
            _ = tick.tick() => {}
        }
    }

    info!("Leaving terminal UI");
    Ok(())
}

/// Reads key presses on a loop thread and forwards them to the UI loop
fn start_input_thread(keys: mpsc::UnboundedSender<KeyEvent>) -> CaptureLoopController {
    CaptureLoopController::start("terminal-input", move || {
        match event::poll(timing::INPUT_POLL) {
            Ok(true) => match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    if keys.send(key).is_err() {
                        return LoopAction::Stop;
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    error!(error = %e, "Failed to read terminal event");
                    return LoopAction::Stop;
                }
            },
            Ok(false) => {
                if keys.is_closed() {
                    return LoopAction::Stop;
                }
            }
            Err(e) => {
                error!(error = %e, "Failed to poll terminal events");
                return LoopAction::Stop;
            }
        }
        LoopAction::Continue
    })
}

fn action_registry() -> ActionRegistry<App> {
    ActionRegistry::new()
        .with(actions::NAVIGATE_TO_SCANNER, App::navigate_to_scanner)
        .with(actions::TOGGLE_SCANNING, App::toggle_scanning)
        .with(actions::GO_BACK, App::go_back)
        .with(actions::CHECK_PERMISSIONS, App::check_permissions)
        .with(actions::QUIT, App::quit)
}

/// Key bindings per screen
fn action_for_key(screen: Screen, key: &KeyEvent) -> Option<&'static str> {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Some(actions::QUIT);
    }

    match (screen, key.code) {
        (_, KeyCode::Char('q')) => Some(actions::QUIT),
        (Screen::Main, KeyCode::Enter | KeyCode::Char('s')) => Some(actions::NAVIGATE_TO_SCANNER),
        (Screen::Main, KeyCode::Esc) => Some(actions::QUIT),
        (Screen::QrScanner, KeyCode::Char(' ') | KeyCode::Char('p')) => {
            Some(actions::TOGGLE_SCANNING)
        }
        (Screen::QrScanner, KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('b')) => {
            Some(actions::GO_BACK)
        }
        (Screen::QrScanner, KeyCode::Char('r')) => Some(actions::CHECK_PERMISSIONS),
        _ => None,
    }
}

fn dismisses_dialog(key: &KeyEvent) -> bool {
    matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' '))
}

/// Results of background work, tagged with the session that started it
#[derive(Debug)]
enum AppEvent {
    Permission { session: u64, granted: bool },
    Detection { session: u64, event: DetectionEvent },
}

/// State of one visit to the scanner screen
struct ScannerSession {
    id: u64,
    controller: Arc<Controller>,
    state: watch::Receiver<ScanState>,
    permission_task: Option<AbortHandle>,
    capture: Option<CaptureLoopController>,
    frames: Option<FrameReceiver>,
    detecting: bool,
    last_detection: Option<Instant>,
}

impl Drop for ScannerSession {
    fn drop(&mut self) {
        if let Some(task) = self.permission_task.take() {
            task.abort();
        }
        self.controller.close();
        debug!(session = self.id, "Scanner session closed");
    }
}

struct App {
    config: Config,
    source: Option<FrameSource>,
    navigator: Navigator,
    presenter: Arc<DialogPresenter>,
    events: mpsc::UnboundedSender<AppEvent>,
    detector: QrDetector,
    session: Option<ScannerSession>,
    next_session_id: u64,
    dialogs: VecDeque<DialogRequest>,
    viewfinder: FrameWidget,
    notice: Option<String>,
    quit: bool,
}

impl App {
    fn new(
        config: Config,
        source: Option<FrameSource>,
        presenter: Arc<DialogPresenter>,
        events: mpsc::UnboundedSender<AppEvent>,
    ) -> Self {
        let detector = QrDetector::with_max_dimension(config.max_dimension);
        let viewfinder = FrameWidget::new(config.mirror_preview);
        Self {
            config,
            source,
            navigator: Navigator::default(),
            presenter,
            events,
            detector,
            session: None,
            next_session_id: 0,
            dialogs: VecDeque::new(),
            viewfinder,
            notice: None,
            quit: false,
        }
    }

    fn navigate_to_scanner(&mut self) -> AppResult<()> {
        if self.navigator.current() == Screen::QrScanner {
            return Ok(());
        }
        self.navigator.go_to(routes::QR_SCANNER)?;

        self.next_session_id += 1;
        let controller = Arc::new(ScanSessionController::new(
            PlatformPermission::from_kind(self.config.permission_backend),
            Arc::clone(&self.presenter),
            SessionOptions {
                presentation_timeout: self.config.presentation_timeout(),
            },
        ));
        let state = controller.subscribe();
        self.session = Some(ScannerSession {
            id: self.next_session_id,
            controller,
            state,
            permission_task: None,
            capture: None,
            frames: None,
            detecting: false,
            last_detection: None,
        });
        self.notice = None;

        self.check_permissions()
    }

    fn check_permissions(&mut self) -> AppResult<()> {
        let Some(session) = self.session.as_mut() else {
            return Ok(());
        };
        if session
            .permission_task
            .as_ref()
            .is_some_and(|task| !task.is_finished())
        {
            return Ok(());
        }

        let controller = Arc::clone(&session.controller);
        let events = self.events.clone();
        let id = session.id;
        let task = tokio::spawn(async move {
            let granted = controller.request_permission().await;
            let _ = events.send(AppEvent::Permission {
                session: id,
                granted,
            });
        });
        session.permission_task = Some(task.abort_handle());
        Ok(())
    }

    fn toggle_scanning(&mut self) -> AppResult<()> {
        if let Some(session) = &self.session {
            session.controller.toggle_scanning();
        }
        Ok(())
    }

    fn go_back(&mut self) -> AppResult<()> {
        if self.navigator.current() == Screen::QrScanner {
            self.session = None;
            self.viewfinder.clear();
            self.notice = None;
        }
        self.navigator.go_to(routes::BACK)?;
        Ok(())
    }

    fn quit(&mut self) -> AppResult<()> {
        self.quit = true;
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent, registry: &ActionRegistry<App>) {
        let screen = self.navigator.current();
        let action = action_for_key(screen, &key);

        // Dialogs are modal; only quitting gets past them
        if !self.dialogs.is_empty() && action != Some(actions::QUIT) {
            if dismisses_dialog(&key)
                && let Some(dialog) = self.dialogs.pop_front()
            {
                dialog.dismiss();
            }
            return;
        }

        if let Some(name) = action
            && let Err(e) = registry.invoke(name, self)
        {
            warn!(action = name, error = %e, "Action failed");
            self.notice = Some(e.to_string());
        }
    }

    fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Permission { session, granted } => {
                let Some(current) = self.session.as_mut().filter(|s| s.id == session) else {
                    return;
                };
                current.permission_task = None;
                if granted && current.capture.is_none() {
                    self.start_capture();
                }
            }
            AppEvent::Detection { session, event } => {
                let Some(current) = self.session.as_mut().filter(|s| s.id == session) else {
                    return;
                };
                current.detecting = false;
                if current.controller.on_detection(&event) == DetectionOutcome::Presented {
                    debug!(session, "Presenting scan result");
                }
            }
        }
    }

    fn start_capture(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let Some(source) = &self.source else {
            warn!("No frame source available");
            self.notice = Some(fl!("no-cameras"));
            return;
        };

        match camera::start_source(source) {
            Ok((capture, frames)) => {
                info!(?source, "Frame source started");
                session.capture = Some(capture);
                session.frames = Some(frames);

                if let FrameSource::Device(path) = source
                    && self.config.last_camera_path.as_deref() != Some(path.as_str())
                {
                    self.config.last_camera_path = Some(path.clone());
                    if let Err(e) = self.config.save() {
                        warn!(error = %e, "Failed to remember camera");
                    }
                }
            }
            Err(e) => {
                error!(error = %e, "Failed to start frame source");
                self.notice = Some(e.to_string());
            }
        }
    }

    /// Per-iteration housekeeping before drawing
    fn refresh(&mut self) {
        // Presentations that timed out or were cancelled
        self.dialogs.retain(|dialog| !dialog.is_abandoned());

        if let Some(frames) = self.session.as_mut().and_then(|s| s.frames.as_mut())
            && frames.has_changed().unwrap_or(false)
        {
            let frame = frames.borrow_and_update().clone();
            self.viewfinder.frame = frame;
        }

        self.maybe_detect();
    }

    /// Start a detection if none is in flight and the session wants one
    fn maybe_detect(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.detecting {
            return;
        }

        {
            let state = session.state.borrow();
            if !state.is_scanning || state.presenting || state.has_permission != Some(true) {
                return;
            }
        }

        if session
            .last_detection
            .is_some_and(|at| at.elapsed() < self.config.detection_interval())
        {
            return;
        }

        let Some(frame) = session.frames.as_ref().and_then(|rx| rx.borrow().clone()) else {
            return;
        };

        session.detecting = true;
        session.last_detection = Some(Instant::now());

        let detector = self.detector;
        let events = self.events.clone();
        let id = session.id;
        tokio::spawn(async move {
            let event = detector.detect(frame).await;
            let _ = events.send(AppEvent::Detection { session: id, event });
        });
    }

    fn draw(&self, f: &mut Frame) {
        let [title_area, body_area, status_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .areas(f.area());

        let screen = self.navigator.current();
        f.render_widget(
            Paragraph::new(Line::from(screen.title()).bold()).alignment(Alignment::Center),
            title_area,
        );

        match screen {
            Screen::Main => draw_landing(f, body_area),
            Screen::QrScanner => f.render_widget(&self.viewfinder, body_area),
        }

        let message = self.status_message();
        f.render_widget(StatusBar { message: &message }, status_area);

        if let Some(dialog) = self.dialogs.front() {
            draw_dialog(f, dialog);
        }
    }

    fn status_message(&self) -> String {
        let Some(session) = self
            .session
            .as_ref()
            .filter(|_| self.navigator.current() == Screen::QrScanner)
        else {
            return format!("[enter] {} | [q] {}", fl!("go-to-scanner"), fl!("quit"));
        };

        let state = session.state.borrow().clone();
        let toggle = BoolToScanTextConverter.convert(state.has_permission.map(|_| state.is_scanning));

        let detail = match (&self.notice, state.has_permission) {
            (Some(notice), _) => notice.clone(),
            (None, None) => fl!("checking-permission"),
            (None, Some(false)) => fl!("camera-unavailable"),
            (None, Some(true)) if !state.last_result.is_empty() => {
                fl!("last-result", content = state.last_result)
            }
            (None, Some(true)) => String::new(),
        };

        format!(
            "[space] {} | [esc] {} | [q] {} | {}",
            toggle,
            fl!("go-back"),
            fl!("quit"),
            detail
        )
    }
}

fn draw_landing(f: &mut Frame, area: Rect) {
    let text = vec![
        Line::from(fl!("go-to-scanner")).bold(),
        Line::from(""),
        Line::from(fl!("landing-hint")).dim(),
    ];
    let [center] = Layout::vertical([Constraint::Length(text.len() as u16)])
        .flex(Flex::Center)
        .areas(area);
    f.render_widget(Paragraph::new(text).alignment(Alignment::Center), center);
}

fn draw_dialog(f: &mut Frame, dialog: &DialogRequest) {
    let area = centered(f.area(), 60, 8);
    f.render_widget(Clear, area);

    let block = Block::bordered()
        .title(Line::from(dialog.title.as_str()).bold())
        .title_bottom(Line::from(format!("[enter] {}", dialog.dismiss_label)).right_aligned());
    f.render_widget(
        Paragraph::new(dialog.body.as_str())
            .wrap(Wrap { trim: true })
            .block(block),
        area,
    );
}

/// `width` x `height` rectangle centered in `area`, shrunk to fit
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [cell] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(row);
    cell
}

/// Widget that renders a camera frame using half-block characters
struct FrameWidget {
    frame: Option<Arc<CameraFrame>>,
    mirror: bool,
}

impl FrameWidget {
    fn new(mirror: bool) -> Self {
        Self {
            frame: None,
            mirror,
        }
    }

    fn clear(&mut self) {
        self.frame = None;
    }
}

impl Widget for &FrameWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let Some(frame) = &self.frame else {
            // No frame yet - show placeholder
            let msg = fl!("waiting-for-camera");
            let msg_width = msg.chars().count() as u16;
            let x = area.x + (area.width.saturating_sub(msg_width)) / 2;
            let y = area.y + area.height / 2;
            if y < area.y + area.height && x < area.x + area.width {
                buf.set_stringn(x, y, &msg, area.width as usize, Style::default());
            }
            return;
        };

        // Each terminal cell displays 2 vertical pixels using half-block characters
        let frame_aspect = frame.width as f64 / frame.height as f64;
        let term_width = area.width as f64;
        let term_height = (area.height * 2) as f64;

        let (display_width, display_height) = if term_width / term_height > frame_aspect {
            // Terminal is wider - fit to height
            let h = term_height;
            let w = h * frame_aspect;
            (w as u16, (h / 2.0) as u16)
        } else {
            // Terminal is taller - fit to width
            let w = term_width;
            let h = w / frame_aspect;
            (w as u16, (h / 2.0) as u16)
        };

        if display_width == 0 || display_height == 0 {
            return;
        }

        // Center the image
        let x_offset = area.x + (area.width.saturating_sub(display_width)) / 2;
        let y_offset = area.y + (area.height.saturating_sub(display_height)) / 2;

        let x_scale = frame.width as f64 / display_width as f64;
        let y_scale = frame.height as f64 / (display_height * 2) as f64;

        // Upper half (▀) colored with fg, lower half with bg
        for ty in 0..display_height {
            for tx in 0..display_width {
                let term_x = x_offset + tx;
                let term_y = y_offset + ty;

                if term_x >= area.x + area.width || term_y >= area.y + area.height {
                    continue;
                }

                let mut src_x = (tx as f64 * x_scale) as u32;
                if self.mirror {
                    src_x = frame.width.saturating_sub(1).saturating_sub(src_x);
                }
                let src_y_top = (ty as f64 * 2.0 * y_scale) as u32;
                let src_y_bottom = ((ty as f64 * 2.0 + 1.0) * y_scale) as u32;

                let (r, g, b) = frame.rgb_at(src_x, src_y_top);
                let top_color = Color::Rgb(r, g, b);
                let (r, g, b) = frame.rgb_at(src_x, src_y_bottom);
                let bottom_color = Color::Rgb(r, g, b);

                if let Some(cell) = buf.cell_mut((term_x, term_y)) {
                    cell.set_char('▀');
                    cell.set_fg(top_color);
                    cell.set_bg(bottom_color);
                }
            }
        }
    }
}

/// Status bar widget
struct StatusBar<'a> {
    message: &'a str,
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Fill background
        for x in area.x..area.x + area.width {
            if let Some(cell) = buf.cell_mut((x, area.y)) {
                cell.set_char(' ');
                cell.set_bg(Color::DarkGray);
            }
        }

        buf.set_stringn(
            area.x,
            area.y,
            self.message,
            area.width as usize,
            Style::default().fg(Color::White).bg(Color::DarkGray),
        );
    }
}
