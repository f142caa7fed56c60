//! Milestone templates keyed on class level, plus entrance-exam milestones
//! injected by keyword on the recommended streams or courses.
//!
//! Each milestone keeps its display `date` text and a canonical `starts_on`
//! date. Ordering uses `starts_on`; the display text is never compared.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::colleges::aggregator::RankedCollege;

/// Colleges named on the class 12 application milestone.
const TARGET_COLLEGE_LIMIT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MilestoneKind {
    Academic,
    Decision,
    Admission,
    Preparation,
    Exam,
    Registration,
    Application,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: MilestoneKind,
    /// Display text, e.g. "April-May 2027".
    pub date: String,
    pub starts_on: NaiveDate,
    pub priority: Priority,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_streams: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_courses: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_colleges: Option<Vec<String>>,
}

/// Who the milestones relate to: class 9–10 streams or class 11–12 courses.
#[derive(Debug, Clone, Copy)]
enum Related<'a> {
    Streams(&'a [String]),
    Courses(&'a [String]),
}

struct Calendar {
    today: NaiveDate,
    year: i32,
}

impl Calendar {
    fn new(today: NaiveDate) -> Self {
        Self {
            today,
            year: today.year(),
        }
    }

    /// First day of `month` in the current year plus `offset`.
    fn month(&self, month: u32, offset: i32) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year + offset, month, 1).unwrap_or(self.today)
    }

    fn label(&self, text: &str, offset: i32) -> String {
        format!("{text} {}", self.year + offset)
    }
}

fn milestone(
    title: &str,
    kind: MilestoneKind,
    date: String,
    starts_on: NaiveDate,
    priority: Priority,
    description: impl Into<String>,
    related: Related<'_>,
) -> Milestone {
    let (related_streams, related_courses) = match related {
        Related::Streams(s) => (Some(s.to_vec()), None),
        Related::Courses(c) => (None, Some(c.to_vec())),
    };
    Milestone {
        title: title.to_string(),
        kind,
        date,
        starts_on,
        priority,
        description: description.into(),
        related_streams,
        related_courses,
        target_colleges: None,
    }
}

fn class_9(cal: &Calendar, streams: &[String]) -> Vec<Milestone> {
    let related = Related::Streams(streams);
    vec![
        milestone(
            "Complete Class 9",
            MilestoneKind::Academic,
            cal.label("March", 1),
            cal.month(3, 1),
            Priority::High,
            "Focus on building strong fundamentals in chosen streams",
            related,
        ),
        milestone(
            "Stream Selection for Class 11",
            MilestoneKind::Decision,
            cal.label("April-May", 1),
            cal.month(4, 1),
            Priority::Critical,
            format!("Finalize stream selection: {}", streams.join(", ")),
            related,
        ),
        milestone(
            "Class 11 Admission",
            MilestoneKind::Admission,
            cal.label("June", 1),
            cal.month(6, 1),
            Priority::High,
            "Secure admission in chosen stream",
            related,
        ),
        milestone(
            "Entrance Exam Preparation Begins",
            MilestoneKind::Preparation,
            cal.label("July", 1),
            cal.month(7, 1),
            Priority::Medium,
            "Start early preparation for relevant entrance exams",
            related,
        ),
    ]
}

fn class_10(cal: &Calendar, streams: &[String]) -> Vec<Milestone> {
    let related = Related::Streams(streams);
    vec![
        milestone(
            "Class 10 Board Exams",
            MilestoneKind::Exam,
            cal.label("February-March", 1),
            cal.month(2, 1),
            Priority::Critical,
            "Achieve good marks for stream eligibility",
            related,
        ),
        milestone(
            "Stream Selection",
            MilestoneKind::Decision,
            cal.label("April", 1),
            cal.month(4, 1),
            Priority::Critical,
            format!("Choose from recommended streams: {}", streams.join(", ")),
            related,
        ),
        milestone(
            "Class 11 Admission",
            MilestoneKind::Admission,
            cal.label("May-June", 1),
            cal.month(5, 1),
            Priority::High,
            "Secure admission in preferred schools",
            related,
        ),
    ]
}

fn class_11(cal: &Calendar, courses: &[String]) -> Vec<Milestone> {
    let related = Related::Courses(courses);
    vec![
        milestone(
            "Focus on Class 11 Foundation",
            MilestoneKind::Academic,
            format!("Current - {}", cal.label("March", 1)),
            cal.today,
            Priority::High,
            "Build strong foundation for entrance exam preparation",
            related,
        ),
        milestone(
            "Entrance Exam Registration",
            MilestoneKind::Registration,
            format!("{} - {}", cal.label("September", 1), cal.label("February", 2)),
            cal.month(9, 1),
            Priority::Critical,
            "Register for relevant entrance exams",
            related,
        ),
        milestone(
            "Intensive Preparation Phase",
            MilestoneKind::Preparation,
            format!("{} - {}", cal.label("April", 1), cal.label("January", 2)),
            cal.month(4, 1),
            Priority::High,
            "Intensive preparation for entrance exams",
            related,
        ),
    ]
}

fn class_12(cal: &Calendar, courses: &[String], top_colleges: &[RankedCollege]) -> Vec<Milestone> {
    let related = Related::Courses(courses);
    let mut applications = milestone(
        "College Applications",
        MilestoneKind::Application,
        cal.label("May-July", 1),
        cal.month(5, 1),
        Priority::High,
        "Apply to recommended colleges from system analysis",
        related,
    );
    applications.target_colleges = Some(
        top_colleges
            .iter()
            .take(TARGET_COLLEGE_LIMIT)
            .map(|c| c.name.clone())
            .collect(),
    );

    vec![
        milestone(
            "Class 12 Board Exams",
            MilestoneKind::Exam,
            cal.label("February-March", 1),
            cal.month(2, 1),
            Priority::Critical,
            "Achieve required percentage for course eligibility",
            related,
        ),
        milestone(
            "Entrance Exams",
            MilestoneKind::Exam,
            cal.label("April-June", 1),
            cal.month(4, 1),
            Priority::Critical,
            "Appear for relevant entrance examinations",
            related,
        ),
        applications,
        milestone(
            "Counseling & Admission",
            MilestoneKind::Admission,
            cal.label("June-August", 1),
            cal.month(6, 1),
            Priority::Critical,
            "Participate in counseling and secure admission",
            related,
        ),
    ]
}

/// Entrance milestone for one recommended name, first keyword group wins.
fn exam_milestone(cal: &Calendar, name: &str, streams: bool) -> Option<Milestone> {
    let lower = name.to_lowercase();
    let single = [name.to_string()];
    let related = if streams {
        Related::Streams(&single)
    } else {
        Related::Courses(&single)
    };

    if lower.contains("engineering") || lower.contains("b.tech") {
        Some(milestone(
            "JEE Main/Advanced",
            MilestoneKind::Exam,
            cal.label("April-May", 1),
            cal.month(4, 1),
            Priority::Critical,
            "Engineering entrance examinations",
            related,
        ))
    } else if lower.contains("medical") || lower.contains("mbbs") {
        Some(milestone(
            "NEET Examination",
            MilestoneKind::Exam,
            cal.label("May", 1),
            cal.month(5, 1),
            Priority::Critical,
            "Medical entrance examination",
            related,
        ))
    } else if lower.contains("management") || lower.contains("mba") {
        Some(milestone(
            "CAT/MAT Preparation",
            MilestoneKind::Preparation,
            format!("{} - {}", cal.label("June", 0), cal.label("November", 0)),
            cal.month(6, 0),
            Priority::High,
            "Management entrance exam preparation",
            related,
        ))
    } else {
        None
    }
}

/// Milestones for a class level, ordered by `starts_on`. Ties keep template order.
pub fn build_milestones(
    class_level: u8,
    names: &[String],
    top_colleges: &[RankedCollege],
    today: NaiveDate,
) -> Vec<Milestone> {
    let cal = Calendar::new(today);
    let streams = matches!(class_level, 9 | 10);

    let mut milestones = match class_level {
        9 => class_9(&cal, names),
        10 => class_10(&cal, names),
        11 => class_11(&cal, names),
        12 => class_12(&cal, names, top_colleges),
        _ => Vec::new(),
    };
    milestones.extend(names.iter().filter_map(|name| exam_milestone(&cal, name, streams)));
    milestones.sort_by_key(|m| m.starts_on);
    milestones
}
