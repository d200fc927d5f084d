// src/morse/code_table.rs  —  Character → Morse symbols (+ mnemonic)
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

/// Character document shipped with the binary
pub const DEFAULT_CHARACTERS_JSON: &str = include_str!("../../assets/characters.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MorseSymbol {
    Dot,
    Dash,
}

impl MorseSymbol {
    pub fn from_marker(c: char) -> Option<Self> {
        match c {
            '.' => Some(Self::Dot),
            '-' => Some(Self::Dash),
            _   => None,
        }
    }

    pub fn marker(self) -> char {
        match self {
            Self::Dot  => '.',
            Self::Dash => '-',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeEntry {
    pub symbols:  Vec<MorseSymbol>,
    pub mnemonic: String,
}

impl CodeEntry {
    /// Dot/dash rendering, e.g. `".-"` for A
    pub fn code(&self) -> String {
        self.symbols.iter().map(|s| s.marker()).collect()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CodeTableError {
    #[error("Invalid character table document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Reading character table {path}: {source}")]
    Io { path: String, source: std::io::Error },

    #[error("Table key {0:?} must be exactly one character")]
    BadKey(String),

    #[error("Code {code:?} for {ch:?} must be a non-empty run of '.' and '-'")]
    BadCode { ch: char, code: String },

    #[error("Character {0:?} is defined more than once")]
    Duplicate(char),
}

#[derive(Deserialize)]
struct RawEntry {
    code:     String,
    #[serde(default)]
    mnemonic: String,
}

/// Immutable character table. Built once, then shared (usually behind `Arc`).
#[derive(Debug, Clone, Default)]
pub struct CodeTable {
    entries: BTreeMap<char, CodeEntry>,
}

impl CodeTable {
    /// ITU letters, digits and common punctuation, without mnemonics
    pub fn itu() -> Self {
        const ITU: &[(char, &str)] = &[
            ('A', ".-"),    ('B', "-..."),  ('C', "-.-."),  ('D', "-.."),
            ('E', "."),     ('F', "..-."),  ('G', "--."),   ('H', "...."),
            ('I', ".."),    ('J', ".---"),  ('K', "-.-"),   ('L', ".-.."),
            ('M', "--"),    ('N', "-."),    ('O', "---"),   ('P', ".--."),
            ('Q', "--.-"),  ('R', ".-."),   ('S', "..."),   ('T', "-"),
            ('U', "..-"),   ('V', "...-"),  ('W', ".--"),   ('X', "-..-"),
            ('Y', "-.--"),  ('Z', "--.."),
            ('0', "-----"), ('1', ".----"), ('2', "..---"), ('3', "...--"),
            ('4', "....-"), ('5', "....."), ('6', "-...."), ('7', "--..."),
            ('8', "---.."), ('9', "----."),
            ('.', ".-.-.-"),(',', "--..--"),('?', "..--.."),('/', "-..-."),
            ('+', ".-.-."), ('=', "-...-"), ('-', "-....-"),('@', ".--.-."),
            ('(', "-.--."), (')', "-.--.-"),('\'', ".----."),
        ];
        let entries = ITU.iter()
            .map(|&(ch, code)| {
                let symbols = code.chars().filter_map(MorseSymbol::from_marker).collect();
                (ch, CodeEntry { symbols, mnemonic: String::new() })
            })
            .collect();
        Self { entries }
    }

    /// The embedded character document (letters, digits, signs with mnemonics)
    pub fn builtin() -> Self {
        // The embedded document is covered by tests; fall back to the plain
        // ITU table rather than abort if it ever stops parsing.
        Self::from_json(DEFAULT_CHARACTERS_JSON).unwrap_or_else(|e| {
            log::error!("Embedded character table is invalid: {e}");
            Self::itu()
        })
    }

    /// Parse `{group: {char: {code, mnemonic}}}` and merge the groups.
    /// A character may appear only once in the whole document, counting
    /// `a` and `A` as the same key.
    pub fn from_json(raw: &str) -> Result<Self, CodeTableError> {
        let doc: BTreeMap<String, BTreeMap<String, RawEntry>> = serde_json::from_str(raw)?;
        let mut entries = BTreeMap::new();
        for (group, chars) in doc {
            log::debug!("[code-table] group {group:?}: {} entries", chars.len());
            for (key, raw) in chars {
                let ch = single_char(&key)?;
                if entries.insert(ch, parse_entry(ch, raw)?).is_some() {
                    return Err(CodeTableError::Duplicate(ch));
                }
            }
        }
        Ok(Self { entries })
    }

    pub fn load(path: &Path) -> Result<Self, CodeTableError> {
        let raw = std::fs::read_to_string(path).map_err(|source| CodeTableError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn get(&self, ch: char) -> Option<&CodeEntry> {
        let mut upper = ch.to_uppercase();
        let key = match (upper.next(), upper.next()) {
            (Some(u), None) => u,
            _               => ch,
        };
        self.entries.get(&key)
    }

    pub fn len(&self) -> usize { self.entries.len() }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = (char, &CodeEntry)> {
        self.entries.iter().map(|(c, e)| (*c, e))
    }

    pub fn into_shared(self) -> Arc<Self> { Arc::new(self) }
}

fn single_char(key: &str) -> Result<char, CodeTableError> {
    let mut it = key.chars();
    match (it.next(), it.next()) {
        (Some(c), None) => {
            let mut upper = c.to_uppercase();
            Ok(match (upper.next(), upper.next()) {
                (Some(u), None) => u,
                _               => c,
            })
        }
        _ => Err(CodeTableError::BadKey(key.to_string())),
    }
}

fn parse_entry(ch: char, raw: RawEntry) -> Result<CodeEntry, CodeTableError> {
    let bad = || CodeTableError::BadCode { ch, code: raw.code.clone() };
    if raw.code.is_empty() {
        return Err(bad());
    }
    let symbols = raw.code.chars()
        .map(|c| MorseSymbol::from_marker(c).ok_or_else(bad))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(CodeEntry { symbols, mnemonic: raw.mnemonic })
}
