//! Static fallback questions, one per quiz position.
//!
//! Served whenever generation fails or returns an invalid shape. Positions past
//! the end of the bank reuse the last entry.

use crate::models::quiz::{Question, MULTIPLE_CHOICE};

const FALLBACK_BANK: &[(&str, [&str; 4])] = &[
    (
        "What subject interests you the most?",
        ["Mathematics", "Science", "Arts", "Commerce"],
    ),
    (
        "What type of work environment do you prefer?",
        ["Office", "Outdoors", "Laboratory", "Creative Studio"],
    ),
    (
        "How do you prefer to solve a difficult problem?",
        [
            "Break it into logical steps",
            "Experiment until something works",
            "Discuss it with others",
            "Look for a creative workaround",
        ],
    ),
    (
        "Which school activity do you enjoy most?",
        [
            "Science fair projects",
            "Debates and elocution",
            "Drawing or music",
            "Organising events",
        ],
    ),
    (
        "What would you most like to be known for in your career?",
        [
            "Inventing or building things",
            "Healing and helping people",
            "Running a successful business",
            "Creating art or stories",
        ],
    ),
    (
        "How comfortable are you with long hours of study for entrance exams?",
        [
            "Very comfortable",
            "Comfortable with a clear plan",
            "Prefer shorter focused sessions",
            "Prefer practical learning over exams",
        ],
    ),
    (
        "Which of these would you pick as a weekend project?",
        [
            "Coding a small app or game",
            "Caring for plants or animals",
            "Writing a blog or making videos",
            "Selling something you made",
        ],
    ),
    (
        "How do you feel about studying away from your home town?",
        [
            "Happy to move anywhere in India",
            "Fine within my state",
            "Prefer staying in my city",
            "Open to studying abroad",
        ],
    ),
    (
        "Which statement describes you best?",
        [
            "I enjoy numbers and patterns",
            "I am curious about how living things work",
            "I like understanding people and society",
            "I like designing how things look",
        ],
    ),
    (
        "What matters most to you when choosing a career?",
        [
            "High salary",
            "Job security",
            "Passion for the work",
            "Helping society",
        ],
    ),
];

/// The fallback question for a 1-based quiz position.
pub fn fallback_question(position: u32) -> Question {
    let index = (position.max(1) as usize - 1).min(FALLBACK_BANK.len() - 1);
    let (text, options) = FALLBACK_BANK[index];
    Question {
        id: format!("q{position}"),
        kind: MULTIPLE_CHOICE.to_string(),
        text: text.to_string(),
        options: options.iter().map(|o| o.to_string()).collect(),
        language: "English".to_string(),
    }
}
