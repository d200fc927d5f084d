// src/exercise/recognition.rs  —  Single-character recognition rounds
use rand::seq::SliceRandom;
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Right answer, more rounds to go
    Correct { remaining: u32 },
    /// Right answer on the last round
    Finished,
    /// Wrong answer; the round is not consumed
    Wrong { expected: char },
    /// Character is not part of this drill's pool
    Inactive,
    /// No character is waiting for an answer
    NoRound,
}

#[derive(Debug, Clone, Default)]
pub struct RecognitionDrill {
    pool:        Vec<char>,
    rounds_left: u32,
    current:     Option<char>,
    pub correct: u32,
    pub wrong:   u32,
}

impl RecognitionDrill {
    pub fn new(pool: Vec<char>) -> Self {
        Self { pool, ..Self::default() }
    }

    /// Reset the tally and arm `rounds` rounds
    pub fn begin(&mut self, rounds: u32) {
        self.rounds_left = rounds;
        self.current = None;
        self.correct = 0;
        self.wrong = 0;
    }

    /// Pick the character for the next round; `None` once rounds run out
    /// or when the pool is empty.
    pub fn next_round<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<char> {
        if self.rounds_left == 0 {
            self.current = None;
            return None;
        }
        self.current = self.pool.choose(rng).copied();
        self.current
    }

    pub fn answer(&mut self, ch: char) -> Verdict {
        let ch = ch.to_ascii_uppercase();
        if !self.pool.contains(&ch) {
            return Verdict::Inactive;
        }
        let Some(expected) = self.current else {
            return Verdict::NoRound;
        };
        if ch != expected {
            self.wrong += 1;
            self.current = None;
            return Verdict::Wrong { expected };
        }
        self.correct += 1;
        self.current = None;
        self.rounds_left = self.rounds_left.saturating_sub(1);
        if self.rounds_left == 0 {
            Verdict::Finished
        } else {
            Verdict::Correct { remaining: self.rounds_left }
        }
    }

    pub fn current(&self) -> Option<char> { self.current }
    pub fn rounds_left(&self) -> u32 { self.rounds_left }
    pub fn pool(&self) -> &[char] { &self.pool }
}
