pub mod config;
pub mod error;
pub mod filetype;
pub mod models;
pub mod store;

pub use config::Config;
pub use error::{NavaniError, Result};
pub use filetype::FileKind;
pub use models::{Metadata, Snippet};
