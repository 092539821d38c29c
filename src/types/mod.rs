pub mod series;
pub mod ticker;
pub mod zscore;

pub use series::*;
pub use ticker::*;
pub use zscore::*;
