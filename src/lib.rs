pub mod analysis;
pub mod config;
pub mod error;
pub mod fetch;
pub mod output;
pub mod soda;
pub mod summary;
pub mod table;

pub use error::{FetchError, Result};
pub use soda::{Dataset, FilterSet, SodaClient};
pub use summary::{SummaryRequest, SummaryStatistics, summarize};
pub use table::{Record, Table};
