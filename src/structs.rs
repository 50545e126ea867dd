#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Station {
    pub id: String,
    pub name: String,
}

impl Station {
    pub fn new(id: &str, name: &str) -> Station {
        return Station {
            id: id.to_string(),
            name: name.to_string(),
        };
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    N,
    S,
    E,
    W,
}

impl Direction {
    // Picks the first compass word out of a direction title such as
    // "North - 1 Yonge-University towards Finch" or "Westbound".
    pub fn from_title(title: &str) -> Option<Direction> {
        for word in title.split(|c: char| !c.is_ascii_alphabetic()) {
            let word = word.to_ascii_lowercase();
            if word.is_empty() {
                continue;
            }
            match word.as_str() {
                "n" | "north" | "northbound" => return Some(Direction::N),
                "s" | "south" | "southbound" => return Some(Direction::S),
                "e" | "east" | "eastbound" => return Some(Direction::E),
                "w" | "west" | "westbound" => return Some(Direction::W),
                _ => {},
            }
        }
        return None;
    }

    pub fn label(&self) -> &'static str {
        match *self {
            Direction::N => "Northbound",
            Direction::S => "Southbound",
            Direction::E => "Eastbound",
            Direction::W => "Westbound",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrivalEntry {
    pub line_number: i32,
    pub line_style_tag: String,
    pub direction: Direction,
    pub destination: String,
    pub minutes_until_arrival: u32,
    pub vehicle_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayState {
    Loading,
    Error,
    NoData,
    Populated,
}

impl DisplayState {
    pub fn on_fetch_start(self) -> DisplayState {
        return DisplayState::Loading;
    }

    pub fn on_fetch_success(self, entries: &[ArrivalEntry]) -> DisplayState {
        if entries.is_empty() {
            return DisplayState::NoData;
        }
        return DisplayState::Populated;
    }

    pub fn on_fetch_failure(self) -> DisplayState {
        return DisplayState::Error;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Online,
    Offline,
}

impl ConnectionStatus {
    pub fn label(&self) -> &'static str {
        match *self {
            ConnectionStatus::Online => "Online",
            ConnectionStatus::Offline => "Offline",
        }
    }
}
