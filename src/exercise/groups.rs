// src/exercise/groups.rs  —  Random groups for reception practice + copy scoring
use rand::seq::SliceRandom;
use rand::Rng;

/// `num_groups` groups of `group_size` characters, each drawn from `chars`
/// with replacement, joined by single spaces.
pub fn generate_exercise_text<R: Rng + ?Sized>(
    chars: &[char],
    num_groups: usize,
    group_size: usize,
    rng: &mut R,
) -> String {
    if chars.is_empty() || group_size == 0 {
        return String::new();
    }
    let mut groups = Vec::with_capacity(num_groups);
    for _ in 0..num_groups {
        let group: String = (0..group_size)
            .filter_map(|_| chars.choose(&mut *rng).copied())
            .collect();
        groups.push(group);
    }
    groups.join(" ")
}

/// Break a transmitted text into lines of `per_line` groups.
pub fn format_groups(text: &str, per_line: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    words.chunks(per_line.max(1))
        .map(|chunk| chunk.join(" "))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CopyScore {
    pub correct: usize,
    pub total:   usize,
}

impl CopyScore {
    /// Percentage of sent characters copied correctly
    pub fn accuracy(&self) -> f32 {
        if self.total == 0 {
            return 0.0;
        }
        self.correct as f32 * 100.0 / self.total as f32
    }
}

/// Compare what was copied against what was sent, group by group and
/// position by position. Missing groups or characters count as errors;
/// extra ones are ignored.
pub fn score_copy(sent: &str, copied: &str) -> CopyScore {
    let mut copied_groups = copied.split_whitespace();
    let mut score = CopyScore::default();
    for group in sent.split_whitespace() {
        let got: Vec<char> = copied_groups.next()
            .map(|g| g.chars().map(|c| c.to_ascii_uppercase()).collect())
            .unwrap_or_default();
        for (i, want) in group.chars().enumerate() {
            score.total += 1;
            if got.get(i) == Some(&want.to_ascii_uppercase()) {
                score.correct += 1;
            }
        }
    }
    score
}
