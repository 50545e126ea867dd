use std::io::Write;

use crate::render::{RenderModel, View};
use crate::search::NavDirection;

// Input lines coming from the terminal. Anything that isn't a slash command
// is treated as text typed into the station search box.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Search(String),
    Navigate(NavDirection),
    Enter,
    Escape,
    Focus,
    Blur,
    Select(String),
    Refresh,
    Retry,
    Hide,
    Show,
    Online,
    Offline,
    Quit,
}

pub fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim_end_matches(|c: char| c == '\r' || c == '\n');
    if !line.starts_with('/') {
        return Some(Command::Search(line.to_string()));
    }

    let mut parts = line[1..].splitn(2, ' ');
    let name = parts.next().unwrap_or("");
    let arg = parts.next().map(|a| a.trim()).unwrap_or("");

    return match name {
        "search" => Some(Command::Search(arg.to_string())),
        "up" => Some(Command::Navigate(NavDirection::Up)),
        "down" => Some(Command::Navigate(NavDirection::Down)),
        "enter" => Some(Command::Enter),
        "esc" => Some(Command::Escape),
        "focus" => Some(Command::Focus),
        "blur" => Some(Command::Blur),
        "select" if !arg.is_empty() => Some(Command::Select(arg.to_string())),
        "refresh" => Some(Command::Refresh),
        "retry" => Some(Command::Retry),
        "hide" => Some(Command::Hide),
        "show" => Some(Command::Show),
        "online" => Some(Command::Online),
        "offline" => Some(Command::Offline),
        "quit" | "exit" => Some(Command::Quit),
        _ => None,
    };
}

pub fn write_model<W: Write>(out: &mut W, model: &RenderModel) -> std::io::Result<()> {
    writeln!(out, "== {} ==", model.station_name.as_ref().map(String::as_str).unwrap_or("No station selected"))?;
    writeln!(out, "[{}] last updated {}", model.connection.label(), model.last_updated)?;

    if !model.candidates.is_empty() {
        writeln!(out, "search: {}", model.search_query)?;
        for candidate in &model.candidates {
            let marker = if candidate.highlighted { ">" } else { " " };
            writeln!(out, " {} {} ({})", marker, candidate.name, candidate.id)?;
        }
    }

    match model.view {
        View::Loading => writeln!(out, "Loading arrivals...")?,
        View::Error { ref message } => {
            writeln!(out, "Unable to load arrivals: {}", message)?;
            writeln!(out, "Type /retry to try again.")?;
        },
        View::NoData => writeln!(out, "No upcoming arrivals.")?,
        View::Populated { ref cards } => {
            for card in cards {
                writeln!(out, "{:>4}  {:>7}  {:<10}  {}  #{}  [{}]",
                         card.line_number, card.countdown, card.direction,
                         card.destination, card.vehicle_id, card.style_tag)?;
            }
        },
    }

    return out.flush();
}

#[cfg(test)]
mod tests {
    use super::{Command, parse_command};
    use crate::render::{ArrivalCard, Candidate, RenderModel, View};
    use crate::search::NavDirection;
    use crate::structs::ConnectionStatus;

    #[test]
    fn parse_commands() {
        assert_eq!(Some(Command::Search("yonge".to_string())), parse_command("yonge\n"));
        assert_eq!(Some(Command::Search("".to_string())), parse_command(""));
        assert_eq!(Some(Command::Search("st george".to_string())), parse_command("/search st george"));
        assert_eq!(Some(Command::Navigate(NavDirection::Down)), parse_command("/down"));
        assert_eq!(Some(Command::Navigate(NavDirection::Up)), parse_command("/up"));
        assert_eq!(Some(Command::Select("14".to_string())), parse_command("/select 14"));
        assert_eq!(None, parse_command("/select"));
        assert_eq!(Some(Command::Hide), parse_command("/hide"));
        assert_eq!(Some(Command::Quit), parse_command("/quit\r\n"));
        assert_eq!(None, parse_command("/teleport"));
    }

    fn model(view: View) -> RenderModel {
        return RenderModel {
            station_name: Some("Union Station".to_string()),
            search_query: "un".to_string(),
            candidates: vec![],
            view: view,
            connection: ConnectionStatus::Online,
            last_updated: "08:17".to_string(),
        };
    }

    fn written(model: &RenderModel) -> String {
        let mut out = vec![];
        super::write_model(&mut out, model).expect("write_model");
        return String::from_utf8(out).expect("utf8");
    }

    #[test]
    fn write_populated() {
        let text = written(&model(View::Populated {
            cards: vec![ArrivalCard {
                line_number: 1,
                style_tag: "line-1".to_string(),
                countdown: "2 min".to_string(),
                direction: "Northbound".to_string(),
                destination: "Finch".to_string(),
                vehicle_id: "5512".to_string(),
            }],
        }));

        assert!(text.starts_with("== Union Station ==\n[Online] last updated 08:17\n"));
        assert!(text.contains("2 min  Northbound  Finch  #5512  [line-1]"));
    }

    #[test]
    fn write_error_offers_retry() {
        let text = written(&model(View::Error { message: "HTTP error: status 503".to_string() }));
        assert!(text.contains("Unable to load arrivals: HTTP error: status 503"));
        assert!(text.contains("/retry"));
        assert!(!written(&model(View::NoData)).contains("/retry"));
    }

    #[test]
    fn write_candidates() {
        let mut m = model(View::Loading);
        m.candidates = vec![
            Candidate { id: "3".to_string(), name: "Union Station".to_string(), highlighted: true },
            Candidate { id: "1".to_string(), name: "St. George Station".to_string(), highlighted: false },
        ];
        let text = written(&m);
        assert!(text.contains(" > Union Station (3)\n"));
        assert!(text.contains("   St. George Station (1)\n"));
    }
}
