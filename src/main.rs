extern crate anyhow;
extern crate chrono;
extern crate chrono_tz;
extern crate flexi_logger;
extern crate getopts;
#[macro_use]
extern crate log;
extern crate reqwest;
#[macro_use]
extern crate serde_derive;

mod arrivals;
mod config;
mod console;
mod dashboard;
mod render;
mod result;
mod scheduler;
mod search;
mod structs;

use std::sync::mpsc;
use std::time::{Duration, Instant};

use anyhow::Context;

const DEFAULT_CONFIG_FILE: &str = "ttcdash.json";
const IDLE_WAIT: Duration = Duration::from_secs(3600);

enum Event {
    Input(console::Command),
    Fetched(u64, Result<Vec<structs::ArrivalEntry>, result::FetchError>),
    InputClosed,
}

fn load_config(matches: &getopts::Matches) -> result::DashResult<config::Config> {
    let mut config = match matches.opt_str("config") {
        Some(path) => config::config_from_file(&path)?,
        None => {
            if std::path::Path::new(DEFAULT_CONFIG_FILE).exists() {
                config::config_from_file(DEFAULT_CONFIG_FILE)?
            } else {
                config::Config::default()
            }
        }
    };

    if let Some(api_base) = matches.opt_str("api-base") {
        config.api_base_url = api_base;
    }
    if let Some(interval) = matches.opt_str("interval-ms") {
        config.refresh_interval_ms = interval.parse::<u64>()
            .with_context(|| format!("Invalid --interval-ms '{}'", interval))?;
    }

    config.validate()?;
    return Ok(config);
}

fn init_logging(log_dir: &str) -> result::DashResult<flexi_logger::LoggerHandle> {
    let handle = flexi_logger::Logger::try_with_env_or_str("info")?
        .log_to_file(flexi_logger::FileSpec::default().directory(log_dir))
        .rotate(
            flexi_logger::Criterion::Size(1_000_000),
            flexi_logger::Naming::Numbers,
            flexi_logger::Cleanup::KeepLogFiles(5))
        .duplicate_to_stderr(flexi_logger::Duplicate::Warn)
        .start()?;
    return Ok(handle);
}

fn spawn_fetch(api_base_url: &str, request: dashboard::FetchRequest, tx: &mpsc::Sender<Event>) {
    let api_base_url = api_base_url.to_string();
    let tx = tx.clone();
    std::thread::spawn(move || {
        let result = arrivals::fetch_arrivals(&api_base_url, &request.station_id);
        if tx.send(Event::Fetched(request.seq, result)).is_err() {
            debug!("Dropping fetch #{}: event loop is gone", request.seq);
        }
    });
}

fn spawn_input_reader(tx: mpsc::Sender<Event>) {
    std::thread::spawn(move || {
        use std::io::BufRead;

        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    warn!("Error reading input: {}", err);
                    break;
                }
            };
            match console::parse_command(&line) {
                Some(command) => {
                    if tx.send(Event::Input(command)).is_err() {
                        return;
                    }
                },
                None => println!("Unknown command: {}", line),
            }
        }
        let _ = tx.send(Event::InputClosed);
    });
}

struct TTCDash {
    config: config::Config,
    tz: chrono_tz::Tz,
    dashboard: dashboard::Dashboard,
    prev_model: Option<render::RenderModel>,
}

impl TTCDash {
    fn new(config: config::Config) -> result::DashResult<TTCDash> {
        let tz = config.tz()?;
        let dashboard = dashboard::Dashboard::new(&config, Instant::now(), chrono::Utc::now());
        return Ok(TTCDash {
            config: config,
            tz: tz,
            dashboard: dashboard,
            prev_model: None,
        });
    }

    fn select_by_id(&mut self, id: &str) -> dashboard::FetchRequest {
        let name = self.dashboard.station_search().station(id)
            .map(|s| s.name.clone())
            .unwrap_or_else(|| id.to_string());
        return self.dashboard.select_station(id, &name);
    }

    // Returns false once the user asked to quit.
    fn handle_command(&mut self, command: console::Command, tx: &mpsc::Sender<Event>) -> bool {
        let wall = chrono::Utc::now();
        let request = match command {
            console::Command::Search(query) => { self.dashboard.search(&query); None },
            console::Command::Navigate(direction) => { self.dashboard.navigate(direction); None },
            console::Command::Enter => self.dashboard.confirm_selection(),
            console::Command::Escape => { self.dashboard.dismiss(); None },
            console::Command::Focus => { self.dashboard.focus(); None },
            console::Command::Blur => { self.dashboard.blur(Instant::now()); None },
            console::Command::Select(id) => Some(self.select_by_id(&id)),
            console::Command::Refresh => self.dashboard.refresh(wall),
            console::Command::Retry => self.dashboard.retry(wall),
            console::Command::Hide => { self.dashboard.suspend(); None },
            console::Command::Show => { self.dashboard.resume(Instant::now()); None },
            console::Command::Online => self.dashboard.on_network_online(wall),
            console::Command::Offline => { self.dashboard.on_network_offline(); None },
            console::Command::Quit => return false,
        };

        if let Some(request) = request {
            spawn_fetch(&self.config.api_base_url, request, tx);
        }
        return true;
    }

    fn render(&mut self) -> result::DashResult<()> {
        let model = render::render(&self.dashboard, &self.tz);
        if self.prev_model.as_ref() == Some(&model) {
            return Ok(());
        }

        let stdout = std::io::stdout();
        console::write_model(&mut stdout.lock(), &model)?;
        self.prev_model = Some(model);
        return Ok(());
    }

    fn one_shot(&mut self, station_id: &str) -> result::DashResult<()> {
        let request = self.select_by_id(station_id);
        let result = arrivals::fetch_arrivals(&self.config.api_base_url, &request.station_id);
        self.dashboard.complete_fetch(request.seq, result, chrono::Utc::now());
        self.render()?;
        self.dashboard.shutdown();
        return Ok(());
    }

    fn run(&mut self, initial_station: Option<String>) -> result::DashResult<()> {
        let (tx, rx) = mpsc::channel();
        spawn_input_reader(tx.clone());
        info!("Refreshing every {:?}", self.dashboard.scheduler().interval());

        if let Some(id) = initial_station {
            let request = self.select_by_id(&id);
            spawn_fetch(&self.config.api_base_url, request, &tx);
        }
        self.render()?;

        loop {
            let timeout = self.dashboard.next_deadline()
                .map(|deadline| deadline.saturating_duration_since(Instant::now()))
                .unwrap_or(IDLE_WAIT);

            match rx.recv_timeout(timeout) {
                Ok(Event::Input(command)) => {
                    if !self.handle_command(command, &tx) {
                        break;
                    }
                },
                Ok(Event::Fetched(seq, result)) => {
                    self.dashboard.complete_fetch(seq, result, chrono::Utc::now());
                },
                Ok(Event::InputClosed) => {
                    info!("Input closed, continuing to refresh");
                },
                Err(mpsc::RecvTimeoutError::Timeout) => {},
                Err(mpsc::RecvTimeoutError::Disconnected) => break,
            }

            if let Some(request) = self.dashboard.poll(Instant::now(), chrono::Utc::now()) {
                spawn_fetch(&self.config.api_base_url, request, &tx);
            }

            if let Err(err) = self.render() {
                error!("Error rendering: {}", err);
            }
        }

        info!("Shutting down");
        self.dashboard.shutdown();
        return Ok(());
    }
}

fn print_usage(program: &str, opts: &getopts::Options) {
    let brief = format!("Usage: {} [options]", program);
    print!("{}", opts.usage(&brief));
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let mut opts = getopts::Options::new();
    opts.optopt("c", "config", "JSON config file", "FILENAME");
    opts.optopt("a", "api-base", "Base URL of the ETA service", "URL");
    opts.optopt("i", "interval-ms", "Refresh interval in milliseconds", "MS");
    opts.optopt("s", "station", "Station id to show at startup", "ID");
    opts.optflag("o", "one-shot", "Fetch once, print and exit");
    opts.optopt("l", "log-dir", "Where to write log files", "DIR");
    opts.optflag("h", "help", "Print this help");

    let matches = match opts.parse(&args[1..]) {
        Ok(matches) => matches,
        Err(err) => {
            eprintln!("{}", err);
            print_usage(&args[0], &opts);
            std::process::exit(2);
        }
    };

    if matches.opt_present("help") {
        print_usage(&args[0], &opts);
        return;
    }

    let log_dir = matches.opt_str("log-dir").unwrap_or("./".to_string());
    let _logger = match init_logging(&log_dir) {
        Ok(handle) => handle,
        Err(err) => {
            eprintln!("Error setting up logging: {:?}", err);
            std::process::exit(1);
        }
    };

    if let Err(err) = run(&matches) {
        error!("{:?}", err);
        eprintln!("Error: {:?}", err);
        std::process::exit(1);
    }
}

fn run(matches: &getopts::Matches) -> result::DashResult<()> {
    let config = load_config(matches)?;
    let one_shot = matches.opt_present("one-shot");
    let station = matches.opt_str("station");

    info!("Running. api={} interval={}ms one-shot={}",
          config.api_base_url, config.refresh_interval_ms, one_shot);

    let mut ttcdash = TTCDash::new(config)?;
    if one_shot {
        let station = station.ok_or(result::make_error("--one-shot needs --station"))?;
        return ttcdash.one_shot(&station);
    }
    return ttcdash.run(station);
}
