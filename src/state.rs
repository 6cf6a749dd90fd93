//! Application state and the rules that move it.
//!
//! All mutation goes through [`AppState::update`]. Anything slow (locating,
//! fetching) is handed back to the caller as a [`Command`]; its outcome comes
//! back in as a [`Msg`] tagged with the sequence number the command carried.

use chrono::{DateTime, Local};
use tracing::{debug, info};

use crate::clock::format_clock;
use crate::geo::LocationError;
use crate::owm::{select_query, FetchError, Query};
use crate::weather::{Coordinates, WeatherRecord};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    Started,
    Relocate,
    LocateDone {
        seq: u64,
        result: Result<Coordinates, LocationError>,
    },
    FetchDone {
        seq: u64,
        result: Result<WeatherRecord, FetchError>,
    },
    SearchInput(char),
    SearchBackspace,
    SearchClear,
    SearchSubmit,
    Tick(DateTime<Local>),
}

/// Work the runtime must carry out on the state's behalf.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Locate { seq: u64 },
    Fetch { seq: u64, query: Query },
}

/// Which panel the UI shows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum View<'a> {
    Loading,
    Error(&'a str),
    Ready(&'a WeatherRecord),
    Idle,
}

#[derive(Debug, Default)]
pub struct AppState {
    pub coordinates: Option<Coordinates>,
    pub error: Option<String>,
    pub search: String,
    pub weather: Option<WeatherRecord>,
    pub clock: String,

    next_seq: u64,
    pending_locate: Option<u64>,
    pending_fetch: Option<u64>,
}

impl AppState {
    pub fn new(search: Option<String>) -> Self {
        Self {
            search: search.unwrap_or_default(),
            ..Self::default()
        }
    }

    /// True while an operation whose result will be honored is in flight.
    pub fn is_loading(&self) -> bool {
        self.pending_locate.is_some() || self.pending_fetch.is_some()
    }

    pub fn view(&self) -> View<'_> {
        if self.is_loading() {
            View::Loading
        } else if let Some(error) = self.error.as_deref() {
            View::Error(error)
        } else if let Some(weather) = self
            .weather
            .as_ref()
            .filter(|w| w.coordinates().is_some())
        {
            View::Ready(weather)
        } else {
            View::Idle
        }
    }

    pub fn update(&mut self, msg: Msg) -> Option<Command> {
        match msg {
            Msg::Started => {
                if select_query(&self.search, None).is_some() {
                    self.fetch()
                } else {
                    self.locate()
                }
            }

            Msg::Relocate => self.locate(),

            Msg::LocateDone { seq, result } => {
                if self.pending_locate != Some(seq) {
                    debug!(seq, "discarding stale location result");
                    return None;
                }
                self.pending_locate = None;
                match result {
                    Ok(coordinates) => {
                        info!(?coordinates, "located");
                        self.coordinates = Some(coordinates);
                        self.error = None;
                        self.fetch()
                    }
                    Err(e) => {
                        info!(error = %e, "location unavailable");
                        self.coordinates = None;
                        self.error = Some(e.to_string());
                        None
                    }
                }
            }

            Msg::FetchDone { seq, result } => {
                if self.pending_fetch != Some(seq) {
                    debug!(seq, "discarding stale weather result");
                    return None;
                }
                self.pending_fetch = None;
                match result {
                    Ok(record) => {
                        self.weather = Some(record);
                        self.error = None;
                    }
                    Err(e) => {
                        self.error = Some(e.to_string());
                    }
                }
                None
            }

            Msg::SearchInput(c) => {
                self.search.push(c);
                None
            }

            Msg::SearchBackspace => {
                self.search.pop();
                None
            }

            Msg::SearchClear => {
                self.search.clear();
                None
            }

            Msg::SearchSubmit => self.fetch(),

            Msg::Tick(now) => {
                self.clock = format_clock(&now);
                None
            }
        }
    }

    fn locate(&mut self) -> Option<Command> {
        let seq = self.bump();
        self.pending_locate = Some(seq);
        Some(Command::Locate { seq })
    }

    /// Starts a fetch for whatever the search text or position points at.
    /// Supersedes any fetch already in flight.
    fn fetch(&mut self) -> Option<Command> {
        let Some(query) = select_query(&self.search, self.coordinates) else {
            debug!("nothing to fetch weather for");
            return None;
        };
        let seq = self.bump();
        self.pending_fetch = Some(seq);
        Some(Command::Fetch { seq, query })
    }

    fn bump(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }
}
