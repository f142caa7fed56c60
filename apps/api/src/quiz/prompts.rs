// All LLM prompt constants for the Quiz module.

/// System prompt for question generation: enforces JSON-only output.
pub const QUESTION_SYSTEM: &str = "You are a career guidance expert for Indian students \
    running an adaptive aptitude and interest quiz. \
    You MUST respond with valid JSON only: a single question object. \
    Do NOT include any text outside the JSON object. \
    Do NOT include explanations or apologies.";

/// Question generation prompt template.
/// Replace: {profile_json}, {transcript}, {language}, {position}
pub const QUESTION_PROMPT_TEMPLATE: &str = r#"Generate exactly ONE personalized question in JSON format.

Student Context: {profile_json}
{transcript}

Requirements:
- Generate a single question that is VERY SPECIFIC and PERSONALIZED based on the student's profile and previous answers
- Make it like Akinator - each question should narrow down interests/aptitudes significantly
- Use {language} language
- Return ONLY valid JSON in this exact format:

{
  "id": "q{position}",
  "type": "mcq",
  "text": "your personalized question here",
  "options": ["option1", "option2", "option3", "option4"],
  "language": "{language}"
}

The question should be:
- Highly specific to their profile (class, location, budget, etc.)
- Different from generic career questions
- Focused on discovering unique interests/skills
- Progressive based on previous answers
- Exactly 4 options, never more, never fewer"#;

/// Transcript line used when no question has been answered yet.
pub const FIRST_QUESTION_NOTE: &str = "This is the first question";
