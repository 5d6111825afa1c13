//! File I/O for the history store.
//!
//! - Loading treats a missing file as an empty store
//! - Saving uses atomic writes (temp file, `sync_all`, rename)

mod load;
mod save;

pub use load::load_store;
pub use save::save_store;
