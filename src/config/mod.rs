//! Configuration module

mod site;

pub use site::HighlightConfig;
pub use site::IndexMode;
pub use site::ListingConfig;
pub use site::ListingOrder;
pub use site::MarkdownConfig;
pub use site::ServerConfig;
pub use site::SiteConfig;
