pub mod config;
pub mod error;
pub mod region;
pub mod types;

pub use config::AppConfig;
pub use error::{AdsError, AdsResult};
pub use region::Region;
