pub mod aligner;
pub mod cache;
pub mod engine;
pub mod export;
pub mod holdings;
pub mod rating;
pub mod relative;
pub mod zscore;

pub use aligner::{align, realign};
pub use cache::Cache;
pub use engine::ZScoreEngine;
pub use export::{csv_filename, to_csv, to_csv_all};
pub use holdings::{EtfHoldings, Preset};
pub use rating::{cum_prob, rating};
pub use relative::relative_strength;
pub use zscore::{rolling_zscore, zscore, zscore_with_window};
