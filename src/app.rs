use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use chrono::Local;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{backend::Backend, Terminal};
use tracing::{debug, info};

use crate::clock::{Ticker, TICK_INTERVAL};
use crate::geo::Locator;
use crate::owm::WeatherClient;
use crate::state::{AppState, Command, Msg};
use crate::ui;

/// Upper bound on how long a finished request waits to be shown.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// What the loop should do with a key press.
#[derive(Debug, PartialEq)]
pub enum Input {
    Msg(Msg),
    Quit,
}

pub fn map_key(key: KeyEvent) -> Option<Input> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => Some(Input::Quit),
        KeyCode::Char('c') if ctrl => Some(Input::Quit),
        KeyCode::Char('l') if ctrl => Some(Input::Msg(Msg::Relocate)),
        KeyCode::Char('u') if ctrl => Some(Input::Msg(Msg::SearchClear)),
        KeyCode::Char(_) if ctrl => None,
        KeyCode::Char(c) => Some(Input::Msg(Msg::SearchInput(c))),
        KeyCode::Backspace => Some(Input::Msg(Msg::SearchBackspace)),
        KeyCode::Enter => Some(Input::Msg(Msg::SearchSubmit)),
        _ => None,
    }
}

/// Runs commands off the UI thread and reports back over a channel.
#[derive(Debug, Clone)]
pub struct Services {
    pub locator: Arc<dyn Locator>,
    pub weather: Arc<WeatherClient>,
}

impl Services {
    pub fn spawn(&self, command: Command, tx: &Sender<Msg>) {
        let tx = tx.clone();
        match command {
            Command::Locate { seq } => {
                let locator = Arc::clone(&self.locator);
                thread::spawn(move || {
                    let result = locator.acquire();
                    // receiver is gone once the app quits
                    let _ = tx.send(Msg::LocateDone { seq, result });
                });
            }
            Command::Fetch { seq, query } => {
                let weather = Arc::clone(&self.weather);
                thread::spawn(move || {
                    let result = weather.fetch(&query);
                    let _ = tx.send(Msg::FetchDone { seq, result });
                });
            }
        }
    }
}

fn dispatch(state: &mut AppState, msg: Msg, services: &Services, tx: &Sender<Msg>) {
    if let Some(command) = state.update(msg) {
        debug!(?command, "spawning");
        services.spawn(command, tx);
    }
}

fn drain(state: &mut AppState, rx: &Receiver<Msg>, services: &Services, tx: &Sender<Msg>) {
    while let Ok(msg) = rx.try_recv() {
        dispatch(state, msg, services, tx);
    }
}

pub fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    mut state: AppState,
    services: Services,
) -> io::Result<()> {
    let (tx, rx) = mpsc::channel();
    let mut ticker = Ticker::new(TICK_INTERVAL, Instant::now());

    state.update(Msg::Tick(Local::now()));
    dispatch(&mut state, Msg::Started, &services, &tx);

    loop {
        terminal.draw(|f| ui::draw(f, &state))?;

        let timeout = ticker.timeout(Instant::now()).min(POLL_INTERVAL);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                match map_key(key) {
                    Some(Input::Quit) => {
                        info!("quit");
                        return Ok(());
                    }
                    Some(Input::Msg(msg)) => dispatch(&mut state, msg, &services, &tx),
                    None => {}
                }
            }
        }

        drain(&mut state, &rx, &services, &tx);

        if ticker.poll(Instant::now()) {
            state.update(Msg::Tick(Local::now()));
        }
    }
}
