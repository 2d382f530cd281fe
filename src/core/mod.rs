// src/core/mod.rs

pub mod extract;
pub mod links;
pub mod net;
pub mod sanitize;

pub use net::{FetchSession, FileSource, PageSource, RawPage};
