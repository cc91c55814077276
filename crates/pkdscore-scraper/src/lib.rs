//! HTTP collectors for the registry, statistics and market data sources,
//! plus the on-disk artifacts they produce (CEIDG CSV exports and the
//! ticker cache).

pub mod bankier;
pub mod ceidg;
pub mod error;
pub mod gus;
pub mod pacer;
pub mod tickers;
pub mod yahoo;

mod http;

pub use bankier::BankierClient;
pub use ceidg::{CeidgClient, FirmDetail, FirmRecord, FirmSearchPage};
pub use error::ScraperError;
pub use gus::{GusClient, GusVariable};
pub use pacer::Pacer;
pub use tickers::TickerCache;
pub use yahoo::YahooClient;
