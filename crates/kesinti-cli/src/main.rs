use std::fmt::Display;
use std::process;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, ValueEnum};
use kesinti::config::{DEFAULT_COUNTRY_CODE, DEFAULT_PAGE_URL};
use kesinti::{Config, SmsNotifier, TwilioConfig, WebScraper};
use log::LevelFilter;

#[derive(Debug, Parser)]
#[command(name = "kesinti")]
#[command(
    about = "Texts the İSKİ water interruptions announced for an Istanbul region",
    long_about = None
)]
struct Cli {
    #[arg(help = "Region (ilçe) to look up, e.g. Kadıköy")]
    region: String,

    #[arg(help = "10 digit number to receive the message")]
    number: String,

    #[arg(
        short = 'l',
        long = "log-level",
        value_enum,
        default_value = "info",
        help = "Set the logging level"
    )]
    log_level: LogLevel,

    #[arg(long, default_value = DEFAULT_PAGE_URL, help = "Interruption page to scrape")]
    page_url: String,

    #[arg(
        long,
        default_value = DEFAULT_COUNTRY_CODE,
        help = "Country code prefixed to the number"
    )]
    country_code: String,

    #[arg(long, help = "Print the message instead of sending it")]
    dry_run: bool,

    #[arg(
        short = 'o',
        long = "output",
        value_enum,
        default_value = "text",
        help = "Output format"
    )]
    format: OutputFormat,

    #[arg(
        long,
        env = "TWILIO_SID",
        hide_env_values = true,
        help = "Twilio account SID"
    )]
    twilio_sid: Option<String>,

    #[arg(
        long,
        env = "TWILIO_AUTH",
        hide_env_values = true,
        help = "Twilio auth token"
    )]
    twilio_auth: Option<String>,

    #[arg(
        long,
        env = "TWILIO_NUMBER",
        help = "Twilio number the message is sent from"
    )]
    twilio_number: Option<String>,
}

#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn usage_error(kind: ErrorKind, error: impl Display) -> ! {
    Cli::command().error(kind, error).exit()
}

fn not_found_output(format: &OutputFormat) -> &'static str {
    match format {
        OutputFormat::Json => "null",
        OutputFormat::Text => "No water interruption for the given region!",
    }
}

fn serialize_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            log::error!("Error serializing to JSON: {}", e);
            process::exit(1);
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level.clone().into())
        .init();

    let config = Config {
        page_url: cli.page_url,
        country_code: cli.country_code,
    };

    let recipient = config
        .recipient(&cli.number)
        .unwrap_or_else(|e| usage_error(ErrorKind::ValueValidation, e));

    let notifier = if cli.dry_run {
        None
    } else {
        let twilio =
            TwilioConfig::from_parts(cli.twilio_sid, cli.twilio_auth, cli.twilio_number)
                .unwrap_or_else(|e| usage_error(ErrorKind::MissingRequiredArgument, e));
        Some(SmsNotifier::new(twilio).unwrap_or_else(|e| {
            log::error!("Error creating notifier: {}", e);
            process::exit(1);
        }))
    };

    let scraper = WebScraper::new(&config.page_url).unwrap_or_else(|e| {
        log::error!("Error creating scraper: {}", e);
        process::exit(1);
    });

    let outages = scraper.fetch_outages().await.unwrap_or_else(|e| {
        log::error!("Error fetching water interruptions: {}", e);
        process::exit(1);
    });

    let Some(notice) = outages.find(&cli.region) else {
        println!("{}", not_found_output(&cli.format));
        return;
    };

    let Some(notifier) = notifier else {
        match cli.format {
            OutputFormat::Json => serialize_json(&notice),
            OutputFormat::Text => println!("{}", notice),
        }
        return;
    };

    match notifier.send(&notice.message(), &recipient).await {
        Ok(sent) => match cli.format {
            OutputFormat::Json => serialize_json(&sent),
            OutputFormat::Text => println!("Message sent to {}", recipient),
        },
        Err(e) => {
            log::debug!("Message sending failed: {}", e);
            log::error!("An error occurred during message sending operation!");
            process::exit(1);
        }
    }
}
