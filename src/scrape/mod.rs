mod directory;
mod fetcher;
mod pipeline;
mod progress;
mod roster;
mod season;

pub use fetcher::PageFetcher;
pub use pipeline::{run_scrape, RunSummary, ScrapeSettings};
pub use progress::ProgressLog;
pub use roster::ColumnMode;
