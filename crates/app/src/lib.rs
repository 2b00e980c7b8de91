pub mod config;
pub mod error;
pub mod feed;
pub mod services;

pub use config::{AppConfig, CostSourceKind};
pub use error::{ApiError, AppError, Result};
pub use feed::{FeedState, FeedView, LogFeed};
pub use services::AppServices;
