extern crate chrono;

use std::time::Instant;

use crate::result::FetchError;
use crate::scheduler::RefreshScheduler;
use crate::search::{NavDirection, StationSearch};
use crate::structs::{ArrivalEntry, ConnectionStatus, DisplayState, Station};
use crate::config::Config;

// A fetch the host has to run. Hand the result back to complete_fetch()
// together with the sequence number.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub seq: u64,
    pub station_id: String,
}

pub struct Dashboard {
    search: StationSearch,
    scheduler: RefreshScheduler,
    selected: Option<Station>,
    display_state: DisplayState,
    arrivals: Vec<ArrivalEntry>,
    last_error: Option<FetchError>,
    connection: ConnectionStatus,
    last_updated: chrono::DateTime<chrono::Utc>,
    latest_seq: u64,
}

impl Dashboard {
    pub fn new(config: &Config, now: Instant, wall: chrono::DateTime<chrono::Utc>) -> Dashboard {
        let mut scheduler = RefreshScheduler::new(config.refresh_interval());
        scheduler.start(now);

        return Dashboard {
            search: StationSearch::new(config.stations.clone(), config.blur_grace()),
            scheduler: scheduler,
            selected: None,
            display_state: DisplayState::Loading,
            arrivals: vec![],
            last_error: None,
            connection: ConnectionStatus::Online,
            last_updated: wall,
            latest_seq: 0,
        };
    }

    // Search/select

    pub fn search(&mut self, query: &str) {
        self.search.search(query);
    }

    pub fn navigate(&mut self, direction: NavDirection) {
        self.search.navigate(direction);
    }

    pub fn dismiss(&mut self) {
        self.search.dismiss();
    }

    pub fn focus(&mut self) {
        self.search.focus();
    }

    pub fn blur(&mut self, now: Instant) {
        self.search.blur(now);
    }

    pub fn confirm_selection(&mut self) -> Option<FetchRequest> {
        let station = self.search.confirm_selection()?;
        return Some(self.commit(station));
    }

    pub fn select_station(&mut self, id: &str, name: &str) -> FetchRequest {
        let station = Station::new(id, name);
        self.search.commit(&station);
        return self.commit(station);
    }

    fn commit(&mut self, station: Station) -> FetchRequest {
        info!("Selected station {} ({})", station.name, station.id);
        self.selected = Some(station);
        return self.start_fetch();
    }

    // Fetching

    fn start_fetch(&mut self) -> FetchRequest {
        self.latest_seq += 1;
        self.display_state = self.display_state.on_fetch_start();

        let station_id = self.selected.as_ref().map(|s| s.id.clone()).unwrap_or_default();
        debug!("Starting fetch #{} for station {}", self.latest_seq, station_id);
        return FetchRequest {
            seq: self.latest_seq,
            station_id: station_id,
        };
    }

    // Applies a finished fetch. Returns false when a newer fetch has been
    // started since, in which case the result is dropped.
    pub fn complete_fetch(&mut self, seq: u64, result: Result<Vec<ArrivalEntry>, FetchError>, wall: chrono::DateTime<chrono::Utc>) -> bool {
        if seq != self.latest_seq {
            debug!("Dropping stale fetch #{} (latest is #{})", seq, self.latest_seq);
            return false;
        }

        match result {
            Ok(entries) => {
                info!("Loaded {} arrivals", entries.len());
                self.display_state = self.display_state.on_fetch_success(&entries);
                self.arrivals = entries;
                self.last_error = None;
                self.connection = ConnectionStatus::Online;
                self.last_updated = wall;
            },
            Err(err) => {
                warn!("Error loading arrivals: {}", err);
                self.display_state = self.display_state.on_fetch_failure();
                self.arrivals.clear();
                self.last_error = Some(err);
                self.connection = ConnectionStatus::Offline;
            },
        }
        return true;
    }

    pub fn refresh(&mut self, wall: chrono::DateTime<chrono::Utc>) -> Option<FetchRequest> {
        if self.selected.is_none() {
            self.last_updated = wall;
            return None;
        }
        return Some(self.start_fetch());
    }

    pub fn retry(&mut self, wall: chrono::DateTime<chrono::Utc>) -> Option<FetchRequest> {
        return self.refresh(wall);
    }

    // Scheduling

    pub fn on_tick(&mut self, wall: chrono::DateTime<chrono::Utc>) -> Option<FetchRequest> {
        return self.refresh(wall);
    }

    // Advances the blur timer and the refresh timer. Returns the fetch to run
    // if a tick came due.
    pub fn poll(&mut self, now: Instant, wall: chrono::DateTime<chrono::Utc>) -> Option<FetchRequest> {
        self.search.poll(now);
        if self.scheduler.poll(now) {
            return self.on_tick(wall);
        }
        return None;
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        return match (self.scheduler.next_deadline(), self.search.next_deadline()) {
            (Some(a), Some(b)) => Some(std::cmp::min(a, b)),
            (a, b) => a.or(b),
        };
    }

    pub fn suspend(&mut self) {
        self.scheduler.suspend();
    }

    pub fn resume(&mut self, now: Instant) {
        self.scheduler.resume(now);
    }

    pub fn on_network_online(&mut self, wall: chrono::DateTime<chrono::Utc>) -> Option<FetchRequest> {
        info!("Network online");
        self.connection = ConnectionStatus::Online;
        return self.refresh(wall);
    }

    pub fn on_network_offline(&mut self) {
        info!("Network offline");
        self.connection = ConnectionStatus::Offline;
    }

    pub fn shutdown(&mut self) {
        self.scheduler.shutdown();
    }

    // Accessors

    pub fn station_search(&self) -> &StationSearch {
        return &self.search;
    }

    pub fn selected(&self) -> Option<&Station> {
        return self.selected.as_ref();
    }

    pub fn display_state(&self) -> DisplayState {
        return self.display_state;
    }

    pub fn arrivals(&self) -> &[ArrivalEntry] {
        return &self.arrivals;
    }

    pub fn last_error(&self) -> Option<&FetchError> {
        return self.last_error.as_ref();
    }

    pub fn connection(&self) -> ConnectionStatus {
        return self.connection;
    }

    pub fn last_updated(&self) -> chrono::DateTime<chrono::Utc> {
        return self.last_updated;
    }

    pub fn scheduler(&self) -> &RefreshScheduler {
        return &self.scheduler;
    }
}
