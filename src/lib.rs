//! hexplore
//!
//! TUI hex explorer for very large binary files. Bytes are fetched page by
//! page from a blob store as the viewport moves, and user annotations are
//! overlaid on inclusive byte ranges.
//!
//! Layout follows a Pure Core / Impure Shell split: `model`, `store`,
//! `state` and `view_state` are deterministic and clock-injected, while
//! `source` (backends) and `view` (terminal) own threads and I/O.

pub mod config;
pub mod logging;
pub mod model;
pub mod source;
pub mod state;
pub mod store;
pub mod view;
pub mod view_state;
