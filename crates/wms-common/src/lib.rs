//! Common types shared by the map viewer crates.

pub mod error;
pub mod layer;
pub mod menu;

pub use error::{ViewerError, ViewerResult};
pub use layer::{LayerRecord, NOT_AVAILABLE, NO_DATA_URL};
pub use menu::{menu_path, MenuNode, MenuPlacement, MENU_KEYWORD_PREFIX, ROOT_NODE};
