// src/exercise/mod.rs  —  Practice drills and scoring
pub mod groups;
pub mod recognition;

pub use groups::{format_groups, generate_exercise_text, score_copy, CopyScore};
pub use recognition::{RecognitionDrill, Verdict};
