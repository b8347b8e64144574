#![windows_subsystem = "windows"]

use std::{error::Error, path::PathBuf, process, str::FromStr};

use iced::{Settings, Size};
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

use turnstile_gui::{
    config::{self, Config, ConfigError},
    dir::AppDirectory,
    gui::Gui,
    logger::setup_logger,
    VERSION,
};

#[derive(Debug, PartialEq)]
enum Arg {
    DatadirPath(AppDirectory),
    ApiUrl(String),
}

fn parse_args(args: Vec<String>) -> Result<Vec<Arg>, Box<dyn Error>> {
    let mut res = Vec::new();

    if args.len() > 1 && (args[1] == "--version" || args[1] == "-v") {
        eprintln!("{}", VERSION);
        process::exit(1);
    }

    if args.len() > 1 && (args[1] == "--help" || args[1] == "-h") {
        eprintln!(
            r#"
Usage: turnstile-gui [OPTIONS]

Options:
    --datadir <PATH>    Path of turnstile datadir
    --api-url <URL>     Base address of the authentication service
    -v, --version       Display turnstile-gui version
    -h, --help          Print help
        "#
        );
        process::exit(1);
    }

    let mut skip = false;
    for (i, arg) in args.iter().enumerate() {
        if skip {
            skip = false;
            continue;
        }
        if arg == "--datadir" {
            if let Some(a) = args.get(i + 1) {
                res.push(Arg::DatadirPath(AppDirectory::new(PathBuf::from(a))));
                skip = true;
            } else {
                return Err("missing arg to --datadir".into());
            }
        } else if arg == "--api-url" {
            if let Some(a) = args.get(i + 1) {
                res.push(Arg::ApiUrl(a.clone()));
                skip = true;
            } else {
                return Err("missing arg to --api-url".into());
            }
        } else if arg.contains("--") {
            return Err(format!("unknown arg: {}", arg).into());
        }
    }

    Ok(res)
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = parse_args(std::env::args().collect())?;

    let mut datadir = None;
    let mut api_url = None;
    for arg in args {
        match arg {
            Arg::DatadirPath(path) => datadir = Some(path),
            Arg::ApiUrl(url) => api_url = Some(url),
        }
    }

    let datadir = match datadir {
        Some(datadir) => datadir,
        None => AppDirectory::new_default()?,
    };
    if !datadir.exists() {
        datadir.init()?;
    }

    let config_path = datadir.path().join(config::DEFAULT_FILE_NAME);
    let mut config = match Config::from_file(&config_path) {
        Ok(config) => config,
        Err(ConfigError::NotFound) => Config::default(),
        Err(e) => return Err(format!("Failed to read configuration file: {}", e).into()),
    };
    if let Some(url) = api_url {
        config.api_url = Some(url);
    }

    let log_level = if let Ok(l) = std::env::var("LOG_LEVEL") {
        LevelFilter::from_str(&l)?
    } else {
        config.log_level()?
    };
    if let Err(e) = setup_logger(log_level, &datadir) {
        eprintln!("Failed to setup logger: {}", e);
    }

    let settings = Settings {
        id: Some("Turnstile".to_string()),
        antialiasing: false,
        ..Settings::default()
    };

    let window_settings = iced::window::Settings {
        size: Size {
            width: 700.0,
            height: 900.0,
        },
        min_size: Some(Size {
            width: 500.0,
            height: 600.0,
        }),
        position: iced::window::Position::Default,
        ..Default::default()
    };

    if let Err(e) = iced::application(Gui::title, Gui::update, Gui::view)
        .theme(|_| iced::Theme::Dark)
        .settings(settings)
        .window(window_settings)
        .run_with(move || Gui::new((config, datadir)))
    {
        error!("{}", e);
        Err(format!("Failed to launch UI: {}", e).into())
    } else {
        Ok(())
    }
}
