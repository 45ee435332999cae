//! dict/mod.rs
//! Dictionary handles and dictionary building.

pub mod handle;
pub mod train;

pub use handle::{DictKind, DictionaryRef, ZstdDict};
pub use train::{finalize_dict, train_dict};
