//! Static tables attached to generated recommendations: per-stream courses and
//! careers, and per-course resource suggestions.

use serde::{Deserialize, Serialize};

const STREAM_COURSES: &[(&str, &[&str])] = &[
    ("Science (PCM)", &["B.Tech", "B.Sc Mathematics/Physics", "BCA", "B.Arch"]),
    ("Science (PCB)", &["MBBS", "B.Sc Biology", "B.Pharmacy", "B.Sc Nursing"]),
    (
        "Science with Computer Science",
        &["B.Tech CSE", "BCA", "B.Sc IT", "B.Sc Computer Science"],
    ),
    (
        "Commerce with Mathematics",
        &["B.Com", "BBA", "CA Foundation", "Actuarial Science"],
    ),
    (
        "Commerce with Business Studies",
        &["B.Com", "BBA", "Hotel Management", "Retail Management"],
    ),
    ("Commerce", &["B.Com", "BBA", "Banking & Insurance", "Office Management"]),
    ("Arts with Fine Arts", &["BA Fine Arts", "Design", "Animation", "Visual Arts"]),
    (
        "Arts with Languages/Mass Comm",
        &["BA in Languages", "Mass Communication", "Journalism", "Content Creation"],
    ),
    ("Arts/Humanities", &["BA", "B.Ed", "Law", "Social Work"]),
    (
        "Vocational/Skill-based courses",
        &["Diploma", "ITI", "Paramedical", "Hospitality"],
    ),
];

const DEFAULT_COURSES: &[&str] = &["Undergraduate Degree", "Diploma", "Certificate Course"];

const STREAM_CAREERS: &[(&str, &[&str])] = &[
    ("Science (PCM)", &["Engineer", "Scientist", "IT Professional", "Professor"]),
    (
        "Science (PCB)",
        &["Doctor", "Pharmacist", "Biologist", "Healthcare Professional"],
    ),
    (
        "Science with Computer Science",
        &["Software Developer", "Data Scientist", "System Analyst", "AI/ML Engineer"],
    ),
    (
        "Commerce with Mathematics",
        &["Chartered Accountant", "Investment Banker", "Actuary", "Financial Analyst"],
    ),
    (
        "Commerce with Business Studies",
        &["Business Manager", "Marketing Executive", "Entrepreneur", "Consultant"],
    ),
    (
        "Commerce",
        &["Accountant", "Bank Professional", "Administrator", "Tax Consultant"],
    ),
    (
        "Arts with Fine Arts",
        &["Graphic Designer", "Artist", "Art Director", "UI/UX Designer"],
    ),
    (
        "Arts with Languages/Mass Comm",
        &["Journalist", "Content Writer", "Translator", "Public Relations"],
    ),
    (
        "Arts/Humanities",
        &["Teacher", "Civil Services", "Social Worker", "Content Developer"],
    ),
    (
        "Vocational/Skill-based courses",
        &["Technician", "Skilled Professional", "Self-employed", "Service Provider"],
    ),
];

const DEFAULT_CAREERS: &[&str] = &["Professional", "Entrepreneur", "Government Sector"];

/// At most this many career-path resources per course.
const MAX_CAREER_RESOURCES: usize = 2;

fn lookup(
    table: &[(&str, &'static [&'static str])],
    key: &str,
    default: &'static [&'static str],
) -> Vec<String> {
    table
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, values)| *values)
        .unwrap_or(default)
        .iter()
        .map(|v| v.to_string())
        .collect()
}

/// Courses reachable from a stream. Unknown streams get a generic list.
pub fn stream_courses(stream: &str) -> Vec<String> {
    lookup(STREAM_COURSES, stream, DEFAULT_COURSES)
}

/// Example careers for a stream. Unknown streams get a generic list.
pub fn stream_careers(stream: &str) -> Vec<String> {
    lookup(STREAM_CAREERS, stream, DEFAULT_CAREERS)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    CourseInfo,
    Scholarship,
    Exam,
    CareerPath,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(rename = "type")]
    pub kind: ResourceKind,
    pub title: String,
    pub description: String,
}

impl Resource {
    fn new(kind: ResourceKind, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            description: description.into(),
        }
    }
}

fn offers_scholarship(course: &str) -> bool {
    course.contains("Government")
        || ["B.Sc", "B.A", "B.Com"]
            .iter()
            .any(|prefix| course.starts_with(prefix))
}

fn exam_resource(course: &str) -> Option<Resource> {
    if course.contains("B.Tech") || course.contains("Engineering") {
        Some(Resource::new(
            ResourceKind::Exam,
            "JEE and State Engineering Entrance Exams",
            "Information about engineering entrance examinations",
        ))
    } else if course.contains("MBBS") || course.contains("Medical") {
        Some(Resource::new(
            ResourceKind::Exam,
            "NEET Examination",
            "Information about medical entrance examination",
        ))
    } else {
        None
    }
}

fn career_resource(career: &str) -> Option<Resource> {
    if career.contains("Engineer") || career.contains("Developer") {
        Some(Resource::new(
            ResourceKind::CareerPath,
            format!("{career} Career Path"),
            format!("Skills, certifications, and growth opportunities in {career}"),
        ))
    } else if career.contains("Doctor") || career.contains("Medical") {
        Some(Resource::new(
            ResourceKind::CareerPath,
            "Medical Career Specializations",
            "Options for specialization and career growth in medicine",
        ))
    } else {
        None
    }
}

/// Resource list for one course: course info first, then scholarship and exam
/// notes by course name, then up to two career paths.
pub fn course_resources(course: &str, careers: &[String]) -> Vec<Resource> {
    let mut resources = vec![Resource::new(
        ResourceKind::CourseInfo,
        format!("About {course}"),
        "Degree details, duration, and eligibility",
    )];

    if offers_scholarship(course) {
        resources.push(Resource::new(
            ResourceKind::Scholarship,
            "Government Scholarships",
            "Scholarships for eligible students in government colleges",
        ));
    }

    resources.extend(exam_resource(course));
    resources.extend(
        careers
            .iter()
            .filter_map(|career| career_resource(career))
            .take(MAX_CAREER_RESOURCES),
    );
    resources
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(resources: &[Resource]) -> Vec<ResourceKind> {
        resources.iter().map(|r| r.kind).collect()
    }

    #[test]
    fn test_known_stream_tables() {
        assert_eq!(stream_courses("Science (PCM)")[0], "B.Tech");
        assert_eq!(stream_careers("Science (PCB)")[0], "Doctor");
    }

    #[test]
    fn test_unknown_stream_gets_defaults() {
        assert_eq!(stream_courses("Astrology").len(), 3);
        assert_eq!(stream_careers("Astrology")[2], "Government Sector");
    }

    #[test]
    fn test_btech_resources() {
        let careers = vec![
            "Software Engineer".to_string(),
            "Backend Developer".to_string(),
            "ML Engineer".to_string(),
        ];
        let resources = course_resources("B.Tech Computer Science", &careers);
        assert_eq!(
            kinds(&resources),
            vec![
                ResourceKind::CourseInfo,
                ResourceKind::Exam,
                ResourceKind::CareerPath,
                ResourceKind::CareerPath,
            ]
        );
        assert_eq!(resources[0].title, "About B.Tech Computer Science");
        assert_eq!(resources[1].title, "JEE and State Engineering Entrance Exams");
        assert_eq!(resources[2].title, "Software Engineer Career Path");
    }

    #[test]
    fn test_mbbs_resources() {
        let careers = vec!["Doctor".to_string(), "Surgeon".to_string()];
        let resources = course_resources("MBBS", &careers);
        assert_eq!(resources[1].title, "NEET Examination");
        assert_eq!(resources[2].title, "Medical Career Specializations");
        assert_eq!(resources.len(), 3);
    }

    #[test]
    fn test_bsc_gets_scholarship_without_exam() {
        let resources = course_resources("B.Sc Physics", &["Researcher".to_string()]);
        assert_eq!(
            kinds(&resources),
            vec![ResourceKind::CourseInfo, ResourceKind::Scholarship]
        );
    }

    #[test]
    fn test_scholarship_prefix_is_literal() {
        assert!(offers_scholarship("B.Arch"));
        assert!(offers_scholarship("Government Polytechnic Diploma"));
        assert!(!offers_scholarship("BBA"));
    }

    #[test]
    fn test_resource_kind_serializes_as_type() {
        let value = serde_json::to_value(course_resources("BBA", &[])).unwrap();
        assert_eq!(value[0]["type"], "course_info");
    }
}
