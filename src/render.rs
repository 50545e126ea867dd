extern crate chrono;
extern crate chrono_tz;

use crate::dashboard::Dashboard;
use crate::structs::{ArrivalEntry, ConnectionStatus, DisplayState};

#[derive(Debug, Clone, PartialEq)]
pub struct ArrivalCard {
    pub line_number: i32,
    pub style_tag: String,
    pub countdown: String,
    pub direction: String,
    pub destination: String,
    pub vehicle_id: String,
}

// Only the region for the active display state carries data, so there is no
// way to describe two regions at once.
#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Loading,
    Error { message: String },
    NoData,
    Populated { cards: Vec<ArrivalCard> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub id: String,
    pub name: String,
    pub highlighted: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderModel {
    pub station_name: Option<String>,
    pub search_query: String,
    pub candidates: Vec<Candidate>,
    pub view: View,
    pub connection: ConnectionStatus,
    pub last_updated: String,
}

pub fn countdown_summary(minutes: u32) -> String {
    return format!("{} min", minutes);
}

fn card(entry: &ArrivalEntry) -> ArrivalCard {
    return ArrivalCard {
        line_number: entry.line_number,
        style_tag: entry.line_style_tag.clone(),
        countdown: countdown_summary(entry.minutes_until_arrival),
        direction: entry.direction.label().to_string(),
        destination: entry.destination.clone(),
        vehicle_id: entry.vehicle_id.clone(),
    };
}

pub fn render(dashboard: &Dashboard, tz: &chrono_tz::Tz) -> RenderModel {
    let view = match dashboard.display_state() {
        DisplayState::Loading => View::Loading,
        DisplayState::Error => View::Error {
            message: dashboard.last_error()
                .map(|e| e.to_string())
                .unwrap_or_else(|| "Unable to load arrivals".to_string()),
        },
        DisplayState::NoData => View::NoData,
        DisplayState::Populated => View::Populated {
            cards: dashboard.arrivals().iter().map(card).collect(),
        },
    };

    let search = dashboard.station_search();
    let highlighted = search.highlighted_index();
    let mut candidates = vec![];
    if search.is_open() {
        candidates = search.visible().iter()
            .enumerate()
            .map(|(i, s)| Candidate {
                id: s.id.clone(),
                name: s.name.clone(),
                highlighted: highlighted == Some(i),
            })
            .collect();
    }

    return RenderModel {
        station_name: dashboard.selected().map(|s| s.name.clone()),
        search_query: search.query().to_string(),
        candidates: candidates,
        view: view,
        connection: dashboard.connection(),
        last_updated: dashboard.last_updated().with_timezone(tz).format("%H:%M").to_string(),
    };
}

#[cfg(test)]
mod tests {
    use super::View;
    use crate::config::Config;
    use crate::dashboard::Dashboard;
    use crate::search::NavDirection;
    use crate::structs::ConnectionStatus;
    use std::time::Instant;

    fn wall(secs: i64) -> chrono::DateTime<chrono::Utc> {
        use chrono::TimeZone;
        // 2024-05-01 12:00:00 UTC, 08:00 in Toronto.
        return chrono::Utc.timestamp_opt(1714564800 + secs, 0).unwrap();
    }

    fn fixture(name: &str) -> String {
        return std::fs::read_to_string(format!("testdata/{}", name)).expect("error reading fixture");
    }

    #[test]
    fn render_populated() {
        let mut dashboard = Dashboard::new(&Config::default(), Instant::now(), wall(0));
        let request = dashboard.select_station("1", "St. George Station");
        dashboard.complete_fetch(
            request.seq, crate::arrivals::parse_response(&fixture("eta_stop.json")), wall(17 * 60));

        let model = super::render(&dashboard, &chrono_tz::America::Toronto);
        assert_eq!(Some("St. George Station".to_string()), model.station_name);
        assert_eq!("08:17", model.last_updated);
        assert_eq!(ConnectionStatus::Online, model.connection);
        assert!(model.candidates.is_empty());

        match model.view {
            View::Populated { cards } => {
                assert_eq!(
                    vec!["2 min", "7 min", "9 min"],
                    cards.iter().map(|c| c.countdown.as_str()).collect::<Vec<&str>>());
                assert_eq!("Eastbound", cards[0].direction);
                assert_eq!("line-2", cards[0].style_tag);
            },
            other => panic!("Expected populated view, got {:?}", other),
        }
    }

    #[test]
    fn render_error() {
        let mut dashboard = Dashboard::new(&Config::default(), Instant::now(), wall(0));
        let request = dashboard.select_station("1", "St. George Station");
        dashboard.complete_fetch(
            request.seq, crate::arrivals::parse_response(&fixture("eta_error.json")), wall(60));

        let model = super::render(&dashboard, &chrono_tz::America::Toronto);
        assert_eq!(View::Error { message: "API error: station not found".to_string() }, model.view);
        assert_eq!(ConnectionStatus::Offline, model.connection);
        assert_eq!("08:00", model.last_updated);
    }

    #[test]
    fn render_candidates() {
        let mut dashboard = Dashboard::new(&Config::default(), Instant::now(), wall(0));
        dashboard.search("station");
        dashboard.navigate(NavDirection::Down);
        dashboard.navigate(NavDirection::Down);

        let model = super::render(&dashboard, &chrono_tz::America::Toronto);
        assert_eq!(View::Loading, model.view);
        assert_eq!("station", model.search_query);
        assert_eq!(9, model.candidates.len());
        assert_eq!(
            vec!["Bloor-Yonge Station"],
            model.candidates.iter().filter(|c| c.highlighted).map(|c| c.name.as_str()).collect::<Vec<&str>>());

        dashboard.dismiss();
        let model = super::render(&dashboard, &chrono_tz::America::Toronto);
        assert!(model.candidates.is_empty());
        assert_eq!("station", model.search_query);
    }
}
