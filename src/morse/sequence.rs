// src/morse/sequence.rs  —  Text → ordered tone/silence steps
use super::code_table::{CodeTable, MorseSymbol};
use super::timing::TimingProfile;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gap {
    /// After every element, inside or at the end of a character
    Element,
    /// Tops the trailing element gap up to a full character gap
    Char,
    /// Emitted for a space; tops the character gap up to a word gap
    Word,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Tone(MorseSymbol),
    Gap(Gap),
}

impl Step {
    /// Resolved at emission time, so a speed change applies to the very
    /// next step rather than to the whole text.
    pub fn duration(&self, t: &TimingProfile) -> Duration {
        match self {
            Step::Tone(MorseSymbol::Dot)  => t.dot,
            Step::Tone(MorseSymbol::Dash) => t.dash,
            Step::Gap(Gap::Element)       => t.elem_gap,
            Step::Gap(Gap::Char)          => t.char_extra(),
            Step::Gap(Gap::Word)          => t.word_extra(),
        }
    }

    pub fn is_tone(&self) -> bool { matches!(self, Step::Tone(_)) }
}

/// Expand `text` left to right. Characters missing from `table` produce
/// nothing at all; a space produces a single word gap.
pub fn sequence(text: &str, table: &CodeTable) -> Vec<Step> {
    let mut steps = Vec::new();
    for ch in text.chars() {
        if ch == ' ' {
            steps.push(Step::Gap(Gap::Word));
            continue;
        }
        let Some(entry) = table.get(ch) else {
            log::debug!("[sequence] no code for {ch:?}, skipped");
            continue;
        };
        for &sym in &entry.symbols {
            steps.push(Step::Tone(sym));
            steps.push(Step::Gap(Gap::Element));
        }
        steps.push(Step::Gap(Gap::Char));
    }
    steps
}

/// Wall-clock length of a step list under one profile
pub fn total_duration(steps: &[Step], t: &TimingProfile) -> Duration {
    steps.iter().map(|s| s.duration(t)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use MorseSymbol::{Dash, Dot};

    fn count(steps: &[Step], wanted: Step) -> usize {
        steps.iter().filter(|s| **s == wanted).count()
    }

    #[test]
    fn sos_expands_to_nine_tones() {
        let steps = sequence("SOS", &CodeTable::itu());
        assert_eq!(count(&steps, Step::Tone(Dot)), 6);
        assert_eq!(count(&steps, Step::Tone(Dash)), 3);
        assert_eq!(count(&steps, Step::Gap(Gap::Element)), 9);
        assert_eq!(count(&steps, Step::Gap(Gap::Char)), 3);
        assert_eq!(steps.len(), 21);
        assert_eq!(&steps[..2], &[Step::Tone(Dot), Step::Gap(Gap::Element)]);
        assert_eq!(steps[6], Step::Gap(Gap::Char));
        assert_eq!(steps[7], Step::Tone(Dash));
    }

    #[test]
    fn character_gap_adds_up_to_three_dots() {
        let t = TimingProfile::from_wpm(20);
        let steps = sequence("E", &CodeTable::itu());
        assert_eq!(steps, vec![
            Step::Tone(Dot), Step::Gap(Gap::Element), Step::Gap(Gap::Char),
        ]);
        let silence: Duration = steps[1..].iter().map(|s| s.duration(&t)).sum();
        assert_eq!(silence, t.char_gap);
    }

    #[test]
    fn word_gap_adds_up_to_seven_dots() {
        let t = TimingProfile::from_wpm(20);
        let steps = sequence("E E", &CodeTable::itu());
        let gap: Duration = steps[1..5].iter().map(|s| s.duration(&t)).sum();
        assert_eq!(steps[4], Step::Tone(Dot));
        assert_eq!(steps[3], Step::Gap(Gap::Word));
        assert_eq!(gap - t.dot, t.word_gap);
    }

    #[test]
    fn unknown_characters_emit_nothing() {
        let table = CodeTable::itu();
        assert!(sequence("😀", &table).is_empty());
        assert_eq!(sequence("e😀t", &table), sequence("ET", &table));
    }

    #[test]
    fn paris_is_fifty_units() {
        let t = TimingProfile::from_wpm(20);
        let steps = sequence("PARIS ", &CodeTable::itu());
        assert_eq!(total_duration(&steps, &t), t.dot * 50);
    }
}
