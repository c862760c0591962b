pub mod catalog;
pub mod config;
pub mod error;
pub mod format;

pub use catalog::{build_category_tree, Category, CategoryId, CategoryNode};
pub use config::Config;
pub use error::*;
pub use format::{format_brl, format_phone};
