pub mod coordinator;
pub mod discovery;
pub mod watchlist;

pub use coordinator::ScanCoordinator;
pub use discovery::{discover, ValuationBand};
pub use watchlist::{WatchEntry, WatchlistFile};
