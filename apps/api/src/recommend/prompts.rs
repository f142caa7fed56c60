// All LLM prompt constants for the Recommendation module.

/// Stream recommendation prompt for class 9 and 10.
/// Replace: {persona}, {class_level}, {profile_block}, {quiz_responses}
pub const STREAM_PROMPT_TEMPLATE: &str = r#"{persona} You need to recommend academic streams for a Class {class_level} student.

{profile_block}

QUIZ RESPONSES:
{quiz_responses}

Based on this information, recommend the top 3 academic streams (Science (PCM), Science (PCB), Commerce with Mathematics, Commerce, Arts/Humanities, etc.)
that would be best suited for this student. Also provide detailed reasons for each recommendation.

Return the response as a valid JSON object with the following structure:
{
  "streams": ["Stream 1", "Stream 2", "Stream 3"],
  "reasons": {
    "Stream 1": "Detailed reason for Stream 1 recommendation",
    "Stream 2": "Detailed reason for Stream 2 recommendation",
    "Stream 3": "Detailed reason for Stream 3 recommendation"
  },
  "message": "A personalized message about these recommendations"
}"#;

/// Course and career recommendation prompt for class 11 and 12.
/// Replace: {persona}, {class_level}, {stream}, {profile_block}, {quiz_responses}
pub const COURSE_PROMPT_TEMPLATE: &str = r#"{persona} You need to recommend specific courses and careers for a Class {class_level} student with stream {stream}.

{profile_block}

QUIZ RESPONSES:
{quiz_responses}

Based on this information, recommend the top 3 specific courses and related careers that would be best suited for this student.
Also provide detailed reasons for each recommendation.

Return the response as a valid JSON object with the following structure:
{
  "courses": ["Course 1", "Course 2", "Course 3"],
  "careers": {
    "Course 1": ["Career 1", "Career 2", "Career 3"],
    "Course 2": ["Career 1", "Career 2", "Career 3"],
    "Course 3": ["Career 1", "Career 2", "Career 3"]
  },
  "reasons": {
    "Course 1": "Detailed reason for Course 1 recommendation",
    "Course 2": "Detailed reason for Course 2 recommendation",
    "Course 3": "Detailed reason for Course 3 recommendation"
  },
  "message": "A personalized message about these recommendations"
}"#;
