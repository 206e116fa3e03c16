mod page_scraper;
mod room_resolver;

pub use page_scraper::*;
pub use room_resolver::*;
