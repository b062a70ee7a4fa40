//! Ebook narration: a server that lists ebooks, extracts their text and
//! narrates sections through Piper, plus a terminal reader that plays them.

pub mod app;
pub mod audio;
pub mod cache;
pub mod cancellation;
pub mod catalog;
pub mod client;
pub mod config;
pub mod extract;
pub mod process;
pub mod protocol;
pub mod sections;
pub mod server;
pub mod tts;
pub mod watcher;
