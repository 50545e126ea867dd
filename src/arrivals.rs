extern crate reqwest;
extern crate serde;
extern crate serde_json;
extern crate serde_with;

use crate::result::FetchError;
use crate::structs::{ArrivalEntry, Direction};
use serde_with::{DefaultOnError, DisplayFromStr, PickFirst, serde_as};

const FETCH_TIMEOUT_SECS: u64 = 20;

pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

pub type FetchFn = fn(&str) -> Result<HttpResponse, FetchError>;

// The ETA service answers either with a bare list of predictions, with the
// list wrapped in an object, or with {"error": "..."}.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum EtaResponse {
    Failure { error: String },
    Wrapped { arrivals: Vec<EtaPrediction> },
    Bare(Vec<EtaPrediction>),
}

#[serde_as]
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct EtaPrediction {
    #[serde_as(as = "DefaultOnError<Option<PickFirst<(_, DisplayFromStr)>>>")]
    #[serde(default)]
    route_tag: Option<i32>,

    #[serde(default)]
    vehicle: Option<String>,

    // Fractional countdowns are rounded to the nearest minute.
    #[serde_as(as = "DefaultOnError<Option<PickFirst<(_, DisplayFromStr)>>>")]
    #[serde(default)]
    minutes: Option<f64>,

    #[serde(default)]
    direction: Option<String>,

    #[serde(default)]
    destination: Option<String>,
}

pub fn eta_url(api_base_url: &str, station_id: &str) -> String {
    return format!("{}/eta/{}", api_base_url.trim_end_matches('/'), station_id);
}

pub fn fetch_arrivals(api_base_url: &str, station_id: &str) -> Result<Vec<ArrivalEntry>, FetchError> {
    return fetch_arrivals_ext(api_base_url, station_id, real_fetch_fn);
}

pub fn fetch_arrivals_ext(api_base_url: &str, station_id: &str, fetch_fn: FetchFn) -> Result<Vec<ArrivalEntry>, FetchError> {
    let url = eta_url(api_base_url, station_id);
    debug!("Fetching {}", url);

    let response = fetch_fn(&url)?;
    if response.status < 200 || response.status >= 300 {
        return Err(FetchError::Http { status: Some(response.status) });
    }

    return parse_response(&response.body);
}

fn real_fetch_fn(url: &str) -> Result<HttpResponse, FetchError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(FETCH_TIMEOUT_SECS))
        .build()
        .map_err(|err| {
            warn!("Couldn't build HTTP client: {}", err);
            FetchError::Http { status: None }
        })?;

    let response = client.get(url)
        .header(reqwest::header::USER_AGENT, "ttcdash")
        .send()
        .map_err(|err| {
            warn!("Request to {} failed: {}", url, err);
            FetchError::Http { status: err.status().map(|s| s.as_u16()) }
        })?;

    let status = response.status().as_u16();
    let body = response.text().map_err(|err| {
        warn!("Couldn't read body from {}: {}", url, err);
        FetchError::Http { status: Some(status) }
    })?;

    return Ok(HttpResponse { status: status, body: body });
}

pub fn parse_response(body: &str) -> Result<Vec<ArrivalEntry>, FetchError> {
    let response: EtaResponse = serde_json::from_str(body)
        .map_err(|err| FetchError::Decode { message: err.to_string() })?;

    let predictions = match response {
        EtaResponse::Failure { error } => return Err(FetchError::Api { message: error }),
        EtaResponse::Wrapped { arrivals } => arrivals,
        EtaResponse::Bare(arrivals) => arrivals,
    };

    let mut entries: Vec<ArrivalEntry> = predictions.iter()
        .filter_map(|p| {
            let entry = to_entry(p);
            if entry.is_none() {
                debug!("Skipping incomplete prediction {:?}", p);
            }
            return entry;
        })
        .collect();

    // sort_by_key is stable, so equal countdowns keep response order.
    entries.sort_by_key(|e| e.minutes_until_arrival);
    return Ok(entries);
}

fn to_entry(prediction: &EtaPrediction) -> Option<ArrivalEntry> {
    let line_number = prediction.route_tag?;
    let minutes = countdown_minutes(prediction.minutes?)?;
    let title = prediction.direction.as_ref()?;
    let direction = Direction::from_title(title)?;

    return Some(ArrivalEntry {
        line_number: line_number,
        line_style_tag: format!("line-{}", line_number),
        direction: direction,
        destination: destination(prediction.destination.as_ref(), title),
        minutes_until_arrival: minutes,
        vehicle_id: prediction.vehicle.clone().unwrap_or_default(),
    });
}

// Negative countdowns clamp to 0 and huge ones saturate, so the entry still
// sorts where it belongs.
fn countdown_minutes(minutes: f64) -> Option<u32> {
    if !minutes.is_finite() {
        return None;
    }
    let rounded = minutes.round();
    if rounded <= 0.0 {
        return Some(0);
    }
    if rounded >= u32::MAX as f64 {
        return Some(u32::MAX);
    }
    return Some(rounded as u32);
}

fn destination(explicit: Option<&String>, title: &str) -> String {
    if let Some(explicit) = explicit {
        return explicit.clone();
    }
    return match title.find(" towards ") {
        Some(idx) => title[idx + " towards ".len()..].trim().to_string(),
        None => title.trim().to_string(),
    };
}
