// Library crate for booknav
// This file exposes modules for use in integration tests and the wasm build

pub mod chapter_links;
pub mod config;
pub mod header_tree;
pub mod navigation;
pub mod render;
pub mod resolver;
pub mod sidebar_scroll;
pub mod simulation;
pub mod suppression;
pub mod threshold;
pub mod types;

#[cfg(not(target_arch = "wasm32"))]
pub mod panic_handler;
#[cfg(not(target_arch = "wasm32"))]
pub mod parsing;

#[cfg(target_arch = "wasm32")]
pub mod web;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::NavConfig;
pub use navigation::NavigationState;
pub use types::{Heading, HeadingRect, ScrollMetrics};
