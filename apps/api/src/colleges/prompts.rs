// All LLM prompt constants for the College module.

/// College ranking prompt.
/// Replace: {profile_block}, {quiz_responses}, {recommendations}, {college_data}
pub const RANKING_PROMPT_TEMPLATE: &str = r#"You are an expert college counselor for Indian students. Based on the student's comprehensive profile, quiz responses, career recommendations, and available colleges, provide intelligent and personalized college recommendations.

{profile_block}

QUIZ RESPONSES & PERSONALITY:
{quiz_responses}

CAREER GUIDANCE RESULTS:
{recommendations}

AVAILABLE COLLEGES BY FIELD:
{college_data}

INSTRUCTIONS:
1. Prioritize colleges that match the student's recommended streams/courses from career guidance
2. Consider budget constraints and suggest appropriate options within their range
3. Factor in location preferences and mobility limitations from profile
4. Account for reservation category benefits if applicable
5. Provide realistic admission chances based on their current class level
6. Focus on colleges that align with their personality traits from quiz responses

Provide specific, actionable recommendations based strictly on their profile and recommendations:
{
  "top_colleges": [
    {
      "name": "College Name",
      "field": "engineering/medical/management/etc",
      "location": "City, State",
      "rank": "NIRF rank if available",
      "reason": "Why this college specifically fits their profile, stream/course recommendations, and quiz responses",
      "fit_score": 0.85,
      "estimated_fees": "Annual fee range matching their budget",
      "admission_requirements": "Specific requirements considering their class level and stream",
      "considerations": ["Important factor considering their profile"]
    }
  ],
  "budget_strategy": "Financial planning advice tailored to their specific budget range and reservation category",
  "location_advice": "Location guidance based on their mobility preferences and current location",
  "admission_timeline": {
    "immediate": "Actions based on their current class level",
    "short_term": "3-6 months preparation aligned with their stream/courses",
    "application_period": "Timeline considering their academic year and recommended fields"
  },
  "next_steps": [
    "Action item 1 based on their recommended stream/course",
    "Action item 2 considering their profile constraints",
    "Action item 3 aligned with their career guidance"
  ]
}"#;
