// src/morse/timing.rs  —  WPM → element durations (PARIS standard)
use std::time::Duration;

/// One PARIS dot at 1 WPM, in nanoseconds (1.2 s)
const DOT_NS_AT_1_WPM: u64 = 1_200_000_000;

/// All timing derived from a single dot length.
///
/// The profile is a plain `Copy` value: callers replace it as a whole, so the
/// five durations can never disagree about which WPM they belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingProfile {
    pub dot:        Duration,  // 1 unit
    pub dash:       Duration,  // 3 units
    pub elem_gap:   Duration,  // 1 unit  (between dits/dahs in same char)
    pub char_gap:   Duration,  // 3 units (between characters)
    pub word_gap:   Duration,  // 7 units (between words)
}

impl TimingProfile {
    /// PARIS standard: dot = 1.2 s / wpm
    pub fn from_wpm(wpm: u32) -> Self {
        let dot = Duration::from_nanos(DOT_NS_AT_1_WPM / u64::from(wpm.max(1)));
        Self {
            dot,
            dash:     dot * 3,
            elem_gap: dot,
            char_gap: dot * 3,
            word_gap: dot * 7,
        }
    }

    /// Farnsworth: characters at `char_wpm`, spacing at `eff_wpm`.
    ///
    /// Gaps are only ever stretched; an effective speed at or above the
    /// character speed (or `eff_wpm == 0`) yields the plain profile.
    pub fn farnsworth(char_wpm: u32, eff_wpm: u32) -> Self {
        let base = Self::from_wpm(char_wpm);
        if eff_wpm == 0 {
            return base;
        }
        let eff = Self::from_wpm(eff_wpm);
        Self {
            char_gap: base.char_gap.max(eff.char_gap),
            word_gap: base.word_gap.max(eff.word_gap),
            ..base
        }
    }

    /// Silence still owed after a character once its last element gap ran.
    pub fn char_extra(&self) -> Duration {
        self.char_gap.saturating_sub(self.elem_gap)
    }

    /// Silence a space adds on top of the preceding character gap.
    pub fn word_extra(&self) -> Duration {
        self.word_gap.saturating_sub(self.char_gap)
    }
}

impl Default for TimingProfile {
    fn default() -> Self { Self::from_wpm(20) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn twenty_wpm_matches_paris_reference() {
        let t = TimingProfile::from_wpm(20);
        assert_eq!(t.dot,      Duration::from_millis(60));
        assert_eq!(t.dash,     Duration::from_millis(180));
        assert_eq!(t.elem_gap, Duration::from_millis(60));
        assert_eq!(t.char_gap, Duration::from_millis(180));
        assert_eq!(t.word_gap, Duration::from_millis(420));
    }

    #[test]
    fn ratios_hold_across_practical_speeds() {
        for wpm in 5..=40 {
            let t = TimingProfile::from_wpm(wpm);
            assert_eq!(t.dash, t.dot * 3, "dash at {wpm} wpm");
            assert_eq!(t.word_gap, t.dot * 7, "word gap at {wpm} wpm");
            assert_eq!(t.elem_gap, t.dot);
            assert_eq!(t.char_gap, t.dot * 3);
        }
    }

    #[test]
    fn durations_shrink_as_speed_rises() {
        for wpm in 5..40 {
            let slow = TimingProfile::from_wpm(wpm);
            let fast = TimingProfile::from_wpm(wpm + 1);
            assert!(fast.dot < slow.dot);
            assert!(fast.dash < slow.dash);
            assert!(fast.elem_gap < slow.elem_gap);
            assert!(fast.char_gap < slow.char_gap);
            assert!(fast.word_gap < slow.word_gap);
        }
    }

    #[test]
    fn zero_wpm_is_treated_as_one() {
        assert_eq!(TimingProfile::from_wpm(0), TimingProfile::from_wpm(1));
    }

    #[test]
    fn farnsworth_stretches_gaps_only() {
        let t = TimingProfile::farnsworth(20, 10);
        let plain = TimingProfile::from_wpm(20);
        assert_eq!(t.dot, plain.dot);
        assert_eq!(t.dash, plain.dash);
        assert_eq!(t.char_gap, Duration::from_millis(360));
        assert_eq!(t.word_gap, Duration::from_millis(840));

        assert_eq!(TimingProfile::farnsworth(20, 0), plain);
        assert_eq!(TimingProfile::farnsworth(20, 30), plain);
    }

    #[test]
    fn extras_complete_the_standard_gaps() {
        let t = TimingProfile::from_wpm(20);
        assert_eq!(t.elem_gap + t.char_extra(), t.char_gap);
        assert_eq!(t.char_gap + t.word_extra(), t.word_gap);
    }
}
