// src/i18n/mod.rs  —  Multi-language string tables
use std::collections::HashMap;

/// All user-visible strings referenced by key
pub trait Lang: Send + Sync {
    fn get<'a>(&self, key: &'a str) -> &'a str;
    fn name(&self) -> &str;
}

/// Central i18n registry
pub struct I18n {
    inner: Box<dyn Lang>,
}

impl I18n {
    pub fn new(lang: &str) -> Self {
        let inner: Box<dyn Lang> = match lang {
            "de" => Box::new(De::new()),
            "ru" => Box::new(Ru::new()),
            _    => Box::new(En::new()),
        };
        Self { inner }
    }
    pub fn t<'a>(&self, key: &'a str) -> &'a str { self.inner.get(key) }
    pub fn lang_name(&self) -> &str    { self.inner.name() }
}

impl Default for I18n {
    fn default() -> Self { Self::new("en") }
}

// ── Helper macro ──────────────────────────────────────────────────────────────
macro_rules! lang_map {
    ($name:ident, $display:literal, [ $( $k:literal => $v:literal ),* $(,)? ]) => {
        pub struct $name(HashMap<&'static str, &'static str>);
        impl $name {
            pub fn new() -> Self {
                let mut m = HashMap::new();
                $( m.insert($k, $v); )*
                Self(m)
            }
        }
        impl Lang for $name {
            fn get<'a>(&self, key: &'a str) -> &'a str {
                self.0.get(key).copied().unwrap_or(key)
            }
            fn name(&self) -> &str { $display }
        }
    };
}
// ── English ───────────────────────────────────────────────────────────────────
lang_map!(En, "English", [
    "app.title"          => "Morse Trainer",
    "label.lesson"       => "Lesson",
    "label.exercise"     => "Exercise",
    "label.pool"         => "Characters",
    "label.playing"      => "PLAYING",
    "panel.study"        => "Study",
    "panel.recognition"  => "Recognition",
    "panel.groups"       => "Group reception",
    "panel.empty"        => "No exercise",
    "study.hint"         => "Type a character to hear it",
    "study.code"         => "Code",
    "study.mnemonic"     => "Sounds like",
    "rec.hint"           => "Enter = start, then type the character you hear",
    "rec.listen"         => "Listen… rounds left:",
    "rec.correct"        => "Correct!",
    "rec.wrong"          => "Wrong! The character was",
    "rec.done"           => "Exercise complete!",
    "rec.inactive"       => "Not part of this exercise:",
    "rec.no_round"       => "No character to guess — press Enter",
    "rec.score"          => "Right / wrong:",
    "groups.hint"        => "Enter = start, type what you copy (Space between groups)",
    "groups.receiving"   => "Receiving…",
    "groups.sent"        => "Sent",
    "groups.copy"        => "Your copy",
    "groups.score"       => "Score:",
    "status.ready"       => "Ready",
    "status.stopped"     => "Playback stopped",
    "status.audio_error" => "Audio device failed",
    "status.empty_pool"  => "This exercise has no characters",
    "status.no_lessons"  => "No lessons loaded",
    "footer.keys"        => " Enter start  F9 stop  F2/F3 WPM  F4/F5 tone  F6/F7 volume  F8 wave  PgUp/PgDn lesson  Tab exercise  Esc quit",
]);

// ── German ────────────────────────────────────────────────────────────────────
lang_map!(De, "Deutsch", [
    "app.title"          => "Morse-Trainer",
    "label.lesson"       => "Lektion",
    "label.exercise"     => "Übung",
    "label.pool"         => "Zeichen",
    "label.playing"      => "SPIELT",
    "panel.study"        => "Lernen",
    "panel.recognition"  => "Erkennen",
    "panel.groups"       => "Gruppenempfang",
    "panel.empty"        => "Keine Übung",
    "study.hint"         => "Zeichen tippen, um es zu hören",
    "study.code"         => "Code",
    "study.mnemonic"     => "Klingt wie",
    "rec.hint"           => "Enter = Start, dann das gehörte Zeichen tippen",
    "rec.listen"         => "Hör zu… verbleibende Runden:",
    "rec.correct"        => "Richtig!",
    "rec.wrong"          => "Falsch! Das Zeichen war",
    "rec.done"           => "Übung beendet!",
    "rec.inactive"       => "Nicht Teil dieser Übung:",
    "rec.no_round"       => "Kein Zeichen offen — Enter drücken",
    "rec.score"          => "Richtig / falsch:",
    "groups.hint"        => "Enter = Start, Mitschrift tippen (Leertaste zwischen Gruppen)",
    "groups.receiving"   => "Empfang…",
    "groups.sent"        => "Gesendet",
    "groups.copy"        => "Deine Mitschrift",
    "groups.score"       => "Ergebnis:",
    "status.ready"       => "Bereit",
    "status.stopped"     => "Wiedergabe gestoppt",
    "status.audio_error" => "Audiogerät ausgefallen",
    "status.empty_pool"  => "Diese Übung hat keine Zeichen",
    "status.no_lessons"  => "Keine Lektionen geladen",
    "footer.keys"        => " Enter Start  F9 Stopp  F2/F3 WPM  F4/F5 Ton  F6/F7 Lautst.  F8 Welle  Bild↑/↓ Lektion  Tab Übung  Esc Ende",
]);

// ── Russian ───────────────────────────────────────────────────────────────────
lang_map!(Ru, "Русский", [
    "app.title"          => "Тренажёр Морзе",
    "label.lesson"       => "Урок",
    "label.exercise"     => "Упражнение",
    "label.pool"         => "Знаки",
    "label.playing"      => "ИГРАЕТ",
    "panel.study"        => "Изучение",
    "panel.recognition"  => "Распознавание",
    "panel.groups"       => "Приём групп",
    "panel.empty"        => "Нет упражнения",
    "study.hint"         => "Нажмите знак, чтобы услышать его",
    "study.code"         => "Код",
    "study.mnemonic"     => "Напев",
    "rec.hint"           => "Enter = старт, затем введите услышанный знак",
    "rec.listen"         => "Приём… осталось раундов:",
    "rec.correct"        => "Правильно!",
    "rec.wrong"          => "Ошибка! Правильный знак:",
    "rec.done"           => "Упражнение завершено!",
    "rec.inactive"       => "Не входит в упражнение:",
    "rec.no_round"       => "Нет знака для угадывания — нажмите Enter",
    "rec.score"          => "Верно / ошибки:",
    "groups.hint"        => "Enter = старт, вводите принятое (пробел между группами)",
    "groups.receiving"   => "Приём…",
    "groups.sent"        => "Передано",
    "groups.copy"        => "Ваш приём",
    "groups.score"       => "Результат:",
    "status.ready"       => "Готов",
    "status.stopped"     => "Воспроизведение остановлено",
    "status.audio_error" => "Сбой аудиоустройства",
    "status.empty_pool"  => "В упражнении нет знаков",
    "status.no_lessons"  => "Уроки не загружены",
    "footer.keys"        => " Enter старт  F9 стоп  F2/F3 WPM  F4/F5 тон  F6/F7 громк.  F8 волна  PgUp/PgDn урок  Tab упр.  Esc выход",
]);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_language_falls_back_to_english() {
        assert_eq!(I18n::new("xx").lang_name(), "English");
        assert_eq!(I18n::new("ru").t("label.lesson"), "Урок");
    }

    #[test]
    fn unknown_key_echoes_itself() {
        assert_eq!(I18n::new("de").t("no.such.key"), "no.such.key");
    }
}
