//! Field Mapper: pure rule tables from free-text streams/courses to college fields.
//!
//! Lookup order per input: exact (case-insensitive) table match, then keyword
//! heuristics, then (courses only) whole-term containment of a table key.
//! Every input set maps to a non-empty `FieldSet`.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A canonical academic/professional domain. One dataset file per field.
///
/// Declared in alphabetical order so `FieldSet` iterates by field name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldTag {
    Agriculture,
    Architecture,
    Dental,
    Engineering,
    Law,
    Management,
    Medical,
    Pharmacy,
}

pub type FieldSet = BTreeSet<FieldTag>;

/// Returned when no rule matches any input.
pub const DEFAULT_FIELDS: [FieldTag; 3] = [
    FieldTag::Engineering,
    FieldTag::Medical,
    FieldTag::Management,
];

impl FieldTag {
    pub const ALL: [FieldTag; 8] = [
        FieldTag::Agriculture,
        FieldTag::Architecture,
        FieldTag::Dental,
        FieldTag::Engineering,
        FieldTag::Law,
        FieldTag::Management,
        FieldTag::Medical,
        FieldTag::Pharmacy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldTag::Agriculture => "agriculture",
            FieldTag::Architecture => "architecture",
            FieldTag::Dental => "dental",
            FieldTag::Engineering => "engineering",
            FieldTag::Law => "law",
            FieldTag::Management => "management",
            FieldTag::Medical => "medical",
            FieldTag::Pharmacy => "pharmacy",
        }
    }
}

impl fmt::Display for FieldTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        FieldTag::ALL
            .into_iter()
            .find(|f| f.as_str() == wanted)
            .ok_or_else(|| format!("unknown field '{s}'"))
    }
}

const STREAM_TABLE: &[(&str, &[FieldTag])] = &[
    ("Science (PCM)", &[FieldTag::Engineering]),
    ("Science (PCB)", &[FieldTag::Medical]),
    ("Science with Computer Science", &[FieldTag::Engineering]),
    ("Commerce with Mathematics", &[FieldTag::Management]),
    ("Commerce with Business Studies", &[FieldTag::Management]),
    ("Commerce", &[FieldTag::Management]),
    ("Arts with Fine Arts", &[FieldTag::Architecture]),
    ("Arts with Languages/Mass Comm", &[FieldTag::Law]),
    ("Arts/Humanities", &[FieldTag::Law]),
    (
        "Vocational/Skill-based courses",
        &[FieldTag::Engineering, FieldTag::Medical, FieldTag::Management],
    ),
];

const COURSE_TABLE: &[(&str, &[FieldTag])] = &[
    ("B.Tech", &[FieldTag::Engineering]),
    ("B.Tech CSE", &[FieldTag::Engineering]),
    ("MBBS", &[FieldTag::Medical]),
    ("B.Pharmacy", &[FieldTag::Pharmacy]),
    ("B.Sc Nursing", &[FieldTag::Medical]),
    ("B.Com", &[FieldTag::Management]),
    ("BBA", &[FieldTag::Management]),
    ("CA Foundation", &[FieldTag::Management]),
    ("Banking & Insurance", &[FieldTag::Management]),
    ("BA", &[FieldTag::Law]),
    ("B.Ed", &[FieldTag::Law]),
    ("Law", &[FieldTag::Law]),
    ("B.Arch", &[FieldTag::Architecture]),
    ("BA Fine Arts", &[FieldTag::Architecture]),
    ("Design", &[FieldTag::Architecture]),
    ("Mass Communication", &[FieldTag::Law]),
    ("Journalism", &[FieldTag::Law]),
    ("Diploma", &[FieldTag::Engineering]),
    ("ITI", &[FieldTag::Engineering]),
    ("Paramedical", &[FieldTag::Medical]),
    ("Hospitality", &[FieldTag::Management]),
    ("Hotel Management", &[FieldTag::Management]),
];

/// Course keyword groups, first matching group wins.
const COURSE_KEYWORDS: &[(&[&str], FieldTag)] = &[
    (
        &["tech", "engineer", "computer", "mechanical", "civil", "electrical"],
        FieldTag::Engineering,
    ),
    (
        &["medical", "mbbs", "doctor", "nurse", "pharmacy", "dental"],
        FieldTag::Medical,
    ),
    (
        &["commerce", "management", "business", "finance", "economics", "mba"],
        FieldTag::Management,
    ),
    (&["architecture", "design", "fine arts"], FieldTag::Architecture),
    (&["law", "legal", "arts", "humanities", "social"], FieldTag::Law),
];

pub fn map_streams<S: AsRef<str>>(streams: &[S]) -> FieldSet {
    let mut fields = FieldSet::new();
    for stream in streams {
        let stream = stream.as_ref();
        if let Some(mapped) = table_lookup(STREAM_TABLE, stream) {
            fields.extend(mapped.iter().copied());
        } else {
            fields.extend(stream_heuristics(stream));
        }
    }
    or_default(fields)
}

pub fn map_courses<S: AsRef<str>>(courses: &[S]) -> FieldSet {
    let mut fields = FieldSet::new();
    for course in courses {
        let course = course.as_ref();
        if let Some(mapped) = table_lookup(COURSE_TABLE, course) {
            fields.extend(mapped.iter().copied());
        } else if let Some(field) = course_heuristics(course) {
            fields.insert(field);
        } else if let Some(mapped) = table_term_match(COURSE_TABLE, course) {
            fields.extend(mapped.iter().copied());
        }
    }
    or_default(fields)
}

fn or_default(fields: FieldSet) -> FieldSet {
    if fields.is_empty() {
        DEFAULT_FIELDS.into_iter().collect()
    } else {
        fields
    }
}

fn table_lookup(
    table: &[(&str, &'static [FieldTag])],
    input: &str,
) -> Option<&'static [FieldTag]> {
    let input = input.trim();
    table
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(input))
        .map(|(_, fields)| *fields)
}

fn stream_heuristics(stream: &str) -> Vec<FieldTag> {
    let s = stream.to_lowercase();
    if s.contains("science") {
        if s.contains("pcm") || s.contains("physics") {
            vec![FieldTag::Engineering]
        } else if s.contains("pcb") || s.contains("biology") {
            vec![FieldTag::Medical]
        } else {
            vec![FieldTag::Engineering, FieldTag::Medical]
        }
    } else if s.contains("commerce") {
        vec![FieldTag::Management]
    } else if s.contains("arts") || s.contains("humanities") {
        vec![FieldTag::Law]
    } else {
        Vec::new()
    }
}

fn course_heuristics(course: &str) -> Option<FieldTag> {
    let c = course.to_lowercase();
    COURSE_KEYWORDS
        .iter()
        .find(|(words, _)| words.iter().any(|w| c.contains(w)))
        .map(|(_, field)| *field)
}

/// Longest table key that appears in the input as a whole term.
/// "B.Com (Hons)" hits "B.Com"; "MBA" does not hit "BA".
fn table_term_match(
    table: &[(&str, &'static [FieldTag])],
    input: &str,
) -> Option<&'static [FieldTag]> {
    let haystack = input.to_lowercase();
    table
        .iter()
        .filter(|(key, _)| contains_term(&haystack, &key.to_lowercase()))
        .max_by_key(|(key, _)| key.len())
        .map(|(_, fields)| *fields)
}

fn contains_term(haystack: &str, needle: &str) -> bool {
    haystack.match_indices(needle).any(|(start, _)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + needle.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}
