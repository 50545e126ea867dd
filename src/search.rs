use std::time::{Duration, Instant};

use crate::structs::Station;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavDirection {
    Up,
    Down,
}

// Autocomplete over the static station directory. Owns the candidate list
// (which stations match, whether the list is open, which one is highlighted)
// but not the selected station; committing hands a station back to the
// caller.
pub struct StationSearch {
    stations: Vec<Station>,
    query: String,
    matches: Vec<usize>,
    open: bool,
    highlighted: Option<usize>,
    close_deadline: Option<Instant>,
    blur_grace: Duration,
}

impl StationSearch {
    pub fn new(stations: Vec<Station>, blur_grace: Duration) -> StationSearch {
        return StationSearch {
            stations: stations,
            query: String::new(),
            matches: vec![],
            open: false,
            highlighted: None,
            close_deadline: None,
            blur_grace: blur_grace,
        };
    }

    pub fn search(&mut self, query: &str) {
        self.query = query.to_string();
        self.close_deadline = None;

        if query.trim().is_empty() {
            self.matches.clear();
            self.close();
            return;
        }

        let needle = query.to_lowercase();
        self.matches = self.stations.iter()
            .enumerate()
            .filter(|(_, s)| s.name.to_lowercase().contains(&needle))
            .map(|(i, _)| i)
            .collect();
        self.highlighted = None;
        self.open = !self.matches.is_empty();
    }

    pub fn navigate(&mut self, direction: NavDirection) {
        if !self.open || self.matches.is_empty() {
            return;
        }

        let count = self.matches.len();
        self.highlighted = Some(match (direction, self.highlighted) {
            (NavDirection::Down, None) => 0,
            (NavDirection::Down, Some(i)) => (i + 1) % count,
            (NavDirection::Up, None) | (NavDirection::Up, Some(0)) => count - 1,
            (NavDirection::Up, Some(i)) => i - 1,
        });
    }

    // Returns the highlighted station, if any, and commits it.
    pub fn confirm_selection(&mut self) -> Option<Station> {
        let station = self.highlighted_station()?.clone();
        self.commit(&station);
        return Some(station);
    }

    pub fn commit(&mut self, station: &Station) {
        self.query = station.name.clone();
        self.close_deadline = None;
        self.close();
    }

    pub fn dismiss(&mut self) {
        self.close_deadline = None;
        self.close();
    }

    pub fn focus(&mut self) {
        self.close_deadline = None;
        if !self.query.trim().is_empty() && !self.matches.is_empty() {
            self.open = true;
        }
    }

    // Losing focus doesn't close the list right away: a click on a candidate
    // arrives after the blur and has to find the list still there.
    pub fn blur(&mut self, now: Instant) {
        if self.open {
            self.close_deadline = Some(now + self.blur_grace);
        }
    }

    pub fn poll(&mut self, now: Instant) {
        match self.close_deadline {
            Some(deadline) if now >= deadline => {
                self.close_deadline = None;
                self.close();
            },
            _ => {},
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        return self.close_deadline;
    }

    fn close(&mut self) {
        self.open = false;
        self.highlighted = None;
    }

    pub fn is_open(&self) -> bool {
        return self.open;
    }

    pub fn query(&self) -> &str {
        return &self.query;
    }

    pub fn visible(&self) -> Vec<&Station> {
        if !self.open {
            return vec![];
        }
        return self.matches.iter().map(|&i| &self.stations[i]).collect();
    }

    pub fn highlighted_index(&self) -> Option<usize> {
        return self.highlighted;
    }

    pub fn highlighted_station(&self) -> Option<&Station> {
        if !self.open {
            return None;
        }
        let i = self.highlighted?;
        return self.matches.get(i).map(|&idx| &self.stations[idx]);
    }

    pub fn station(&self, id: &str) -> Option<&Station> {
        return self.stations.iter().find(|s| s.id == id);
    }
}

#[cfg(test)]
mod tests {
    use super::{NavDirection, StationSearch};
    use crate::structs::Station;
    use std::time::{Duration, Instant};

    fn toronto() -> StationSearch {
        return StationSearch::new(
            vec![
                Station::new("1", "St. George Station"),
                Station::new("14", "Yonge Station"),
                Station::new("3", "Union Station"),
            ],
            Duration::from_millis(200));
    }

    fn names(search: &StationSearch) -> Vec<&str> {
        return search.visible().iter().map(|s| s.name.as_str()).collect();
    }

    #[test]
    fn search_matches_case_insensitively() {
        let mut search = toronto();

        search.search("yonge");
        assert!(search.is_open());
        assert_eq!(vec!["Yonge Station"], names(&search));

        search.search("STATION");
        assert_eq!(vec!["St. George Station", "Yonge Station", "Union Station"], names(&search));

        search.search("o");
        assert_eq!(vec!["St. George Station", "Yonge Station", "Union Station"], names(&search));

        search.search("e s");
        assert_eq!(vec!["St. George Station", "Yonge Station"], names(&search));
    }

    #[test]
    fn empty_or_unmatched_query_hides_list() {
        let mut search = toronto();

        search.search("union");
        assert!(search.is_open());

        search.search("");
        assert!(!search.is_open());
        assert!(search.visible().is_empty());

        search.search("   ");
        assert!(!search.is_open());

        search.search("kipling");
        assert!(!search.is_open());
        assert!(search.visible().is_empty());
    }

    #[test]
    fn navigate_wraps_around() {
        let mut search = toronto();
        search.search("station");

        search.navigate(NavDirection::Down);
        assert_eq!(Some(0), search.highlighted_index());

        let start = search.highlighted_index();
        for _ in 0..search.visible().len() {
            search.navigate(NavDirection::Down);
        }
        assert_eq!(start, search.highlighted_index());

        search.navigate(NavDirection::Up);
        assert_eq!(Some(2), search.highlighted_index());
        search.navigate(NavDirection::Up);
        assert_eq!(Some(1), search.highlighted_index());
    }

    #[test]
    fn navigate_up_from_nothing_goes_to_last() {
        let mut search = toronto();
        search.search("station");
        search.navigate(NavDirection::Up);
        assert_eq!("Union Station", search.highlighted_station().expect("highlight").name);
    }

    #[test]
    fn navigate_without_matches_is_noop() {
        let mut search = toronto();
        search.navigate(NavDirection::Down);
        assert_eq!(None, search.highlighted_index());

        search.search("kipling");
        search.navigate(NavDirection::Down);
        assert_eq!(None, search.highlighted_index());
    }

    #[test]
    fn confirm_commits_highlighted() {
        let mut search = toronto();
        search.search("station");
        assert_eq!(None, search.confirm_selection());
        assert!(search.is_open());

        search.navigate(NavDirection::Down);
        search.navigate(NavDirection::Down);
        let station = search.confirm_selection().expect("confirm_selection");

        assert_eq!(Station::new("14", "Yonge Station"), station);
        assert!(!search.is_open());
        assert_eq!("Yonge Station", search.query());
        assert_eq!(None, search.highlighted_index());
    }

    #[test]
    fn blur_closes_after_grace() {
        let mut search = toronto();
        let now = Instant::now();
        search.search("union");
        search.blur(now);

        search.poll(now + Duration::from_millis(199));
        assert!(search.is_open());

        search.poll(now + Duration::from_millis(200));
        assert!(!search.is_open());
        assert_eq!(None, search.next_deadline());
    }

    #[test]
    fn focus_cancels_blur_and_reopens() {
        let mut search = toronto();
        let now = Instant::now();
        search.search("union");
        search.blur(now);
        search.focus();
        search.poll(now + Duration::from_secs(1));
        assert!(search.is_open());

        search.dismiss();
        assert!(!search.is_open());
        search.focus();
        assert_eq!(vec!["Union Station"], names(&search));
    }
}
