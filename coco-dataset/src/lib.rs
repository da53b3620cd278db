//! Loading COCO-style annotation files into per-image detection records.
//!
//! The entry points are [load_dataset], which turns a [DatasetSource] into a
//! [Dataset], and [filter_dataset], which drops whole images afterwards. The
//! [DatasetConfig] ties both together for configuration files.

pub mod category;
pub mod common;
pub mod config;
pub mod error;
pub mod filter;
pub mod loader;
pub mod record;
pub mod source;
pub mod vocabulary;

pub use category::*;
pub use config::*;
pub use error::*;
pub use filter::*;
pub use loader::*;
pub use record::*;
pub use source::*;
pub use vocabulary::*;
