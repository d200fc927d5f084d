// src/lesson/mod.rs  —  Lesson course + exercise catalogue (JSON)
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Course document shipped with the binary
pub const DEFAULT_LESSONS_JSON: &str = include_str!("../../assets/lessons.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseKind {
    /// Browse the lesson's new characters and hear them on demand
    Study,
    /// Single characters from the current lesson only
    SingleCharRecognitionLesson,
    /// Single characters from every lesson so far
    SingleCharRecognitionCumulative,
    /// Random five-character style groups, copied then compared
    GroupReception,
    #[serde(other)]
    Unknown,
}

impl ExerciseKind {
    pub fn is_recognition(self) -> bool {
        matches!(self, Self::SingleCharRecognitionLesson | Self::SingleCharRecognitionCumulative)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Lesson {
    pub lesson_id:    u32,
    pub name:         String,
    #[serde(default)]
    pub new_chars:    Vec<char>,
    #[serde(default)]
    pub exercise_ids: Vec<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExerciseType {
    #[serde(rename = "type")]
    pub kind:        ExerciseKind,
    pub description: String,
}

#[derive(Debug, thiserror::Error)]
pub enum CourseError {
    #[error("Invalid lessons document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Reading lessons {path}: {source}")]
    Io { path: String, source: std::io::Error },
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Course {
    #[serde(default)]
    course:         Vec<Lesson>,
    #[serde(default)]
    exercise_types: HashMap<String, ExerciseType>,
}

impl Course {
    pub fn builtin() -> Self {
        Self::from_json(DEFAULT_LESSONS_JSON).unwrap_or_else(|e| {
            log::error!("Embedded lessons document is invalid: {e}");
            Self::default()
        })
    }

    pub fn from_json(raw: &str) -> Result<Self, CourseError> {
        let mut course: Course = serde_json::from_str(raw)?;
        for lesson in &mut course.course {
            for c in &mut lesson.new_chars {
                *c = c.to_ascii_uppercase();
            }
        }
        Ok(course)
    }

    pub fn load(path: &Path) -> Result<Self, CourseError> {
        let raw = std::fs::read_to_string(path).map_err(|source| CourseError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn lessons(&self) -> &[Lesson] { &self.course }

    pub fn lesson(&self, lesson_id: u32) -> Option<&Lesson> {
        self.course.iter().find(|l| l.lesson_id == lesson_id)
    }

    /// `(exercise_id, description)` for every exercise the lesson lists
    pub fn exercises_for(&self, lesson_id: u32) -> Vec<(u32, &str)> {
        let Some(lesson) = self.lesson(lesson_id) else { return Vec::new() };
        lesson.exercise_ids.iter()
            .map(|&id| {
                let desc = self.exercise(id).map_or("Unknown exercise", |e| e.description.as_str());
                (id, desc)
            })
            .collect()
    }

    pub fn exercise(&self, exercise_id: u32) -> Option<&ExerciseType> {
        self.exercise_types.get(&exercise_id.to_string())
    }

    /// Characters an exercise of `kind` draws from in `lesson_id`
    pub fn character_pool(&self, lesson_id: u32, kind: ExerciseKind) -> Vec<char> {
        match kind {
            ExerciseKind::Study | ExerciseKind::SingleCharRecognitionLesson => {
                self.lesson(lesson_id).map(|l| l.new_chars.clone()).unwrap_or_default()
            }
            ExerciseKind::SingleCharRecognitionCumulative | ExerciseKind::GroupReception => {
                let mut pool: Vec<char> = Vec::new();
                for c in self.course.iter()
                    .filter(|l| l.lesson_id <= lesson_id)
                    .flat_map(|l| l.new_chars.iter().copied())
                {
                    if !pool.contains(&c) { pool.push(c); }
                }
                pool
            }
            ExerciseKind::Unknown => Vec::new(),
        }
    }
}
