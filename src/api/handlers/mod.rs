// src/api/handlers/mod.rs
mod health;
mod page;
mod actions;
mod download;
mod levels;
mod assets;
pub mod ws;

pub use health::health_check;
pub use page::{index, get_state};
pub use actions::{switch_tab, classify, upload, fill_example};
pub use download::download_report;
pub use levels::get_levels;
pub use assets::static_asset;
pub use ws::{ws_handler, WsBroker};
