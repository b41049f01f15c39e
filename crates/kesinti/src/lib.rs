pub mod config;
pub mod notifier;
mod parser;
pub mod scraper;
pub mod types;

pub use config::{Config, PhoneNumber, TwilioConfig};
pub use notifier::{NotifyError, SentMessage, SmsNotifier};
pub use parser::parse_outage_table;
pub use scraper::{ScraperError, WebScraper};
pub use types::{OutageNotice, OutageTable};
