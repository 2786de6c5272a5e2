//! HTML rendering for the map viewer.
//!
//! Produces:
//! - Nested accordion menus from a `MenuNode` tree
//! - The WFS download card
//! - The layer information card
//! - The page shell

pub mod escape;
pub mod icons;
pub mod info;
pub mod menu;
pub mod page;
pub mod panel;

pub use escape::{escape_html, make_valid_id};
pub use info::{render_layer_info, LayerInfoView};
pub use menu::{MenuRenderer, MAX_MENU_DEPTH};
pub use page::{render_page, PageSettings};
pub use panel::{render_download_panel, DownloadPanelView};
