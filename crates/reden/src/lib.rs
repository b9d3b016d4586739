pub mod config;
pub mod crawl;
pub mod date;
pub mod detail_page;
pub mod fetcher;
mod html;
pub mod links;
pub mod list_page;
pub mod output;

pub use config::CrawlConfig;
pub use crawl::Crawler;
pub use date::normalize_date;
pub use detail_page::{extract_detail_page, parse_detail_page};
pub use fetcher::{HttpFetcher, PageFetcher};
pub use list_page::{extract_list_page, parse_list_page, ListPage};
pub use output::{write_csv, OutputFormat, SpeechWriter};
pub use politikdokumente_core::{Speech, FIELD_NAMES};
