use std::collections::HashSet;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc::{self, UnboundedSender};

use crate::api::Gateway;
use crate::model::ClientConfig;
use crate::sync::actions::{self, Action, ActionOutcome, Sent};
use crate::sync::forms::FormId;
use crate::sync::reconcile::{self, DetailLoad, DetailRequest};
use crate::sync::refresh::{
    self, CollectionKind, CollectionRefresher, FetchedCollections, ListRow, TickOutcome, TickStart,
};
use crate::sync::status::StatusScope;
use crate::sync::{AppState, EntityKind};

use super::input;
use super::render;
use super::surface::FormSurface;
use super::theme::Theme;

/// Which collection is on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Runs,
    Ideas,
    Literature,
    Reviews,
}

impl View {
    pub const ALL: [View; 4] = [View::Runs, View::Ideas, View::Literature, View::Reviews];

    pub fn index(self) -> usize {
        match self {
            View::Runs => 0,
            View::Ideas => 1,
            View::Literature => 2,
            View::Reviews => 3,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            View::Runs => "Runs",
            View::Ideas => "Ideas",
            View::Literature => "Literature",
            View::Reviews => "Reviews",
        }
    }

    pub fn next(self) -> View {
        View::ALL[(self.index() + 1) % View::ALL.len()]
    }

    pub fn prev(self) -> View {
        View::ALL[(self.index() + View::ALL.len() - 1) % View::ALL.len()]
    }

    pub fn collection(self) -> CollectionKind {
        match self {
            View::Runs => CollectionKind::Runs,
            View::Ideas => CollectionKind::Ideas,
            View::Literature => CollectionKind::LiteratureQueries,
            View::Reviews => CollectionKind::Reviews,
        }
    }

    /// Entity opened by selecting a row, if rows are selectable
    pub fn entity(self) -> Option<EntityKind> {
        match self {
            View::Runs => None,
            View::Ideas => Some(EntityKind::Idea),
            View::Literature => Some(EntityKind::Literature),
            View::Reviews => Some(EntityKind::Review),
        }
    }

    /// Forms shown under the list. `e` edits the first, `E` the second.
    pub fn forms(self) -> &'static [FormId] {
        match self {
            View::Runs => &[FormId::RunCreate],
            View::Ideas => &[],
            View::Literature => &[FormId::LiteratureQuery],
            View::Reviews => &[FormId::ReviewRun, FormId::ReviewCreate],
        }
    }
}

/// Which side of the screen navigation keys drive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    List,
    Detail,
}

/// A destructive action waiting for y/n
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingConfirm {
    pub prompt: String,
    pub action: Action,
}

/// Work requested by a key press, run by the event loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Load(DetailRequest),
    Perform(Action),
    Refresh,
    Quit,
}

/// Main application state
pub struct App {
    pub state: AppState,
    pub surface: FormSurface,
    pub theme: Theme,
    pub view: View,
    pub focus: Focus,
    /// List cursor per view
    pub cursors: [usize; 4],
    pub gate_cursor: usize,
    pub dossier_cursor: usize,
    pub work_cursor: usize,
    /// Local PDF offered for the next attach
    pub pdf_choice: usize,
    pub confirm: Option<PendingConfirm>,
    pub show_help: bool,
    pub should_quit: bool,
    /// Base URL shown in the tab bar
    pub endpoint: String,
}

impl App {
    pub fn new(state: AppState, theme: Theme, endpoint: impl Into<String>) -> Self {
        let surface = FormSurface::build(&state.forms);
        App {
            state,
            surface,
            theme,
            view: View::Ideas,
            focus: Focus::List,
            cursors: [0; 4],
            gate_cursor: 0,
            dossier_cursor: 0,
            work_cursor: 0,
            pdf_choice: 0,
            confirm: None,
            show_help: false,
            should_quit: false,
            endpoint: endpoint.into(),
        }
    }

    pub fn rows(&self) -> &[ListRow] {
        self.state.lists.get(self.view.collection())
    }

    pub fn cursor(&self) -> usize {
        self.cursors[self.view.index()]
    }

    pub fn cursor_row(&self) -> Option<&ListRow> {
        self.rows().get(self.cursor())
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let len = self.rows().len();
        let slot = &mut self.cursors[self.view.index()];
        *slot = step(*slot, delta, len);
    }

    /// Keep every cursor inside its list after a refresh or apply
    pub fn clamp_cursors(&mut self) {
        for view in View::ALL {
            let len = self.state.lists.get(view.collection()).len();
            let slot = &mut self.cursors[view.index()];
            *slot = (*slot).min(len.saturating_sub(1));
        }
        if let Some(idea) = self.state.idea.ready() {
            self.gate_cursor = self.gate_cursor.min(idea.gates.len().saturating_sub(1));
            self.dossier_cursor = self.dossier_cursor.min(idea.dossier.len().saturating_sub(1));
        }
        if let Some(lit) = self.state.literature.ready() {
            self.work_cursor = self.work_cursor.min(lit.works.len().saturating_sub(1));
            self.pdf_choice = self.pdf_choice.min(lit.local_pdfs.len().saturating_sub(1));
        }
    }
}

/// Move `cur` by `delta` within `0..len`
pub fn step(cur: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let next = cur as isize + delta;
    next.clamp(0, len as isize - 1) as usize
}

/// Run the TUI application
pub fn run(
    gateway: Arc<dyn Gateway>,
    state: AppState,
    config: &ClientConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let mut app = App::new(state, Theme::from_config(&config.ui), config.api.base_url.clone());
    let refresher = CollectionRefresher::new(config.refresh.interval());

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Install panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let result = runtime.block_on(run_event_loop(&mut terminal, &mut app, gateway, refresher));

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// Blocking crossterm reader feeding the async loop. Exits once the loop
/// drops its receiver.
fn spawn_input_thread(tx: UnboundedSender<Event>) {
    std::thread::spawn(move || {
        loop {
            match event::poll(Duration::from_millis(250)) {
                Ok(true) => match event::read() {
                    Ok(ev) => {
                        if tx.send(ev).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "terminal read failed");
                        break;
                    }
                },
                Ok(false) => {
                    if tx.is_closed() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "terminal poll failed");
                    break;
                }
            }
        }
    });
}

/// Channels and in-flight bookkeeping shared by the loop's branches
struct Dispatcher {
    gateway: Arc<dyn Gateway>,
    detail_tx: UnboundedSender<DetailLoad>,
    tick_tx: UnboundedSender<FetchedCollections>,
    action_tx: UnboundedSender<Sent>,
    pending_tick: Option<TickStart>,
    /// Scopes with an action in flight; a second submit waits for the first
    busy: HashSet<StatusScope>,
}

impl Dispatcher {
    fn load(&self, request: DetailRequest) {
        let gateway = Arc::clone(&self.gateway);
        let tx = self.detail_tx.clone();
        tokio::spawn(async move {
            let load = reconcile::fetch_detail(gateway.as_ref(), request).await;
            let _ = tx.send(load);
        });
    }

    fn start_tick(&mut self, app: &mut App) {
        if self.pending_tick.is_some() {
            return;
        }
        let Some(start) = refresh::begin_tick(&mut app.state, &app.surface) else {
            return;
        };
        self.pending_tick = Some(start);
        let gateway = Arc::clone(&self.gateway);
        let tx = self.tick_tx.clone();
        tokio::spawn(async move {
            let fetched = refresh::fetch_collections(gateway.as_ref()).await;
            let _ = tx.send(fetched);
        });
    }

    fn finish_tick(&mut self, app: &mut App, fetched: FetchedCollections) {
        let Some(start) = self.pending_tick.take() else {
            return;
        };
        let outcome = refresh::finish_tick(&mut app.state, &mut app.surface, start, fetched);
        app.clamp_cursors();
        if let TickOutcome::Completed { detail_loads, .. } = outcome {
            for ticket in detail_loads {
                self.load(DetailRequest::Entity(ticket));
            }
        }
    }

    /// Validate on the loop, then send on a task. The answer comes back
    /// through `action_tx` and is applied by [`Dispatcher::finish_action`].
    fn perform(&mut self, app: &mut App, action: Action) {
        let scope = action.scope();
        if self.busy.contains(&scope) {
            app.state.status.info(scope, "Still working on the previous request");
            return;
        }
        let prepared = match actions::prepare(&mut app.state, &action) {
            Ok(prepared) => prepared,
            Err(error) => {
                actions::reject(&mut app.state, scope, error);
                return;
            }
        };
        self.busy.insert(scope);
        app.state.status.info(scope, "Working...");
        let gateway = Arc::clone(&self.gateway);
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let sent = prepared.send(gateway.as_ref()).await;
            let _ = tx.send(sent);
        });
    }

    fn finish_action(&mut self, app: &mut App, sent: Sent) {
        self.busy.remove(&sent.scope());
        let refresh_after = sent.changes_collections();
        if let ActionOutcome::Done { reload } = actions::finish(&mut app.state, sent) {
            if let Some(request) = reload {
                self.load(request);
            }
            if refresh_after {
                self.start_tick(app);
            }
        }
        app.clamp_cursors();
    }

    fn run_effect(&mut self, app: &mut App, effect: Effect) {
        match effect {
            Effect::Quit => app.should_quit = true,
            Effect::Refresh => self.start_tick(app),
            Effect::Load(request) => self.load(request),
            Effect::Perform(action) => self.perform(app, action),
        }
    }
}

async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    gateway: Arc<dyn Gateway>,
    refresher: CollectionRefresher,
) -> Result<(), Box<dyn std::error::Error>> {
    match gateway.providers().await {
        Ok(providers) => app.state.providers = providers,
        Err(e) => tracing::warn!(error = %e, "could not load provider list"),
    }

    let (input_tx, mut input_rx) = mpsc::unbounded_channel();
    spawn_input_thread(input_tx);
    let (detail_tx, mut detail_rx) = mpsc::unbounded_channel();
    let (tick_tx, mut tick_rx) = mpsc::unbounded_channel();
    let (action_tx, mut action_rx) = mpsc::unbounded_channel();
    let mut dispatcher = Dispatcher {
        gateway,
        detail_tx,
        tick_tx,
        action_tx,
        pending_tick: None,
        busy: HashSet::new(),
    };
    let mut ticker = refresher.interval();

    loop {
        terminal.draw(|frame| render::render(frame, app))?;

        tokio::select! {
            event = input_rx.recv() => {
                let Some(event) = event else { break };
                let effects = match event {
                    Event::Key(key) if key.kind == KeyEventKind::Press => input::handle_key(app, key),
                    Event::Paste(text) => {
                        input::handle_paste(app, &text);
                        Vec::new()
                    }
                    _ => Vec::new(),
                };
                for effect in effects {
                    dispatcher.run_effect(app, effect);
                }
            }
            _ = ticker.tick() => dispatcher.start_tick(app),
            Some(fetched) = tick_rx.recv() => dispatcher.finish_tick(app, fetched),
            Some(sent) = action_rx.recv() => dispatcher.finish_action(app, sent),
            Some(load) = detail_rx.recv() => {
                reconcile::apply_detail(&mut app.state, load);
                app.clamp_cursors();
            }
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
