//! Browser adapters for the portal capability traits.

mod chromium;

pub use chromium::{ChromiumPage, ChromiumPortal};
