//! Per-muscle statistics over exercise records.

use crate::ExerciseData;

fn muscles(target: &str) -> impl Iterator<Item = &str> {
    target
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|m| !m.is_empty())
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Distinct muscles named by `exercises`, capitalized, in first-seen order
pub fn muscles_targeted(exercises: &[ExerciseData]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for exercise in exercises {
        for muscle in muscles(&exercise.muscle_target) {
            let muscle = capitalize(muscle);
            if !seen.contains(&muscle) {
                seen.push(muscle);
            }
        }
    }
    seen
}

/// Exercises whose muscle target names `muscle`, ignoring case
pub fn exercises_targeting<'a>(exercises: &'a [ExerciseData], muscle: &str) -> Vec<&'a ExerciseData> {
    let wanted = muscle.to_lowercase();
    exercises
        .iter()
        .filter(|exercise| muscles(&exercise.muscle_target).any(|m| m.to_lowercase() == wanted))
        .collect()
}
