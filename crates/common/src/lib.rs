pub mod config;
pub mod error;
pub mod sink;
pub mod source;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use sink::AlertSink;
pub use source::CandleSource;
pub use types::*;
