// src/morse/mod.rs  —  Code table, sequencing, timing
pub mod code_table;
pub mod sequence;
pub mod timing;

pub use code_table::{CodeEntry, CodeTable, CodeTableError, MorseSymbol};
pub use sequence::{sequence, Gap, Step};
pub use timing::TimingProfile;
