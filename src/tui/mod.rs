// src/tui/mod.rs  —  ratatui terminal interface
#[cfg(feature = "tui")]
mod inner;
#[cfg(feature = "tui")]
pub use inner::Tui;

#[cfg(not(feature = "tui"))]
pub struct Tui;
#[cfg(not(feature = "tui"))]
impl Tui {
    pub fn new(_lang: &str) -> anyhow::Result<Self> {
        anyhow::bail!("built without the `tui` feature; use --play or --list-lessons")
    }
    pub fn draw(&mut self, _state: &crate::app::AppState) -> anyhow::Result<()> { Ok(()) }
    pub fn cleanup(&mut self) {}
}
