// src/lib.rs  —  morse-trainer library root
pub mod app;
pub mod audio;
pub mod config;
pub mod exercise;
pub mod i18n;
pub mod lesson;
pub mod morse;
pub mod playback;
pub mod tui;
