use crate::errors::AppError;
use crate::models::profile::ProfileInput;

pub const CLASS_LEVELS: std::ops::RangeInclusive<u8> = 9..=12;
pub const AGE_RANGE: std::ops::RangeInclusive<u8> = 5..=30;

/// Rejects a profile the guidance pipeline cannot work with.
///
/// Collects every problem rather than stopping at the first, so the client can
/// fix the form in one round trip.
pub fn validate_profile(input: &ProfileInput) -> Result<(), AppError> {
    let mut problems = Vec::new();

    if !CLASS_LEVELS.contains(&input.class_level) {
        problems.push(format!(
            "class_level must be between 9 and 12, got {}",
            input.class_level
        ));
    }
    if !AGE_RANGE.contains(&input.age) {
        problems.push(format!("age must be between 5 and 30, got {}", input.age));
    }

    let required = [
        ("name", input.name.as_str()),
        ("location.state", input.location.state.as_str()),
        ("language_preference", input.language_preference.as_str()),
        ("budget_range", input.budget_range.as_str()),
        ("reservation_category", input.reservation_category.as_str()),
        ("mobility", input.mobility.as_str()),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            problems.push(format!("{field} cannot be empty"));
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(problems.join("; ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::profile::Location;

    fn input() -> ProfileInput {
        ProfileInput {
            name: "Ravi".to_string(),
            age: 16,
            gender: "male".to_string(),
            class_level: 11,
            stream: Some("Commerce".to_string()),
            location: Location {
                state: "Maharashtra".to_string(),
                city: "Pune".to_string(),
            },
            language_preference: "Hindi".to_string(),
            budget_range: "under 1 lakh".to_string(),
            reservation_category: "OBC".to_string(),
            mobility: "anywhere".to_string(),
        }
    }

    #[test]
    fn test_complete_profile_passes() {
        assert!(validate_profile(&input()).is_ok());
    }

    #[test]
    fn test_class_outside_range_rejected() {
        let mut bad = input();
        bad.class_level = 8;
        let err = validate_profile(&bad).unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("class_level")));
    }

    #[test]
    fn test_age_bounds_inclusive() {
        let mut edge = input();
        edge.age = 5;
        assert!(validate_profile(&edge).is_ok());
        edge.age = 30;
        assert!(validate_profile(&edge).is_ok());
        edge.age = 31;
        assert!(validate_profile(&edge).is_err());
    }

    #[test]
    fn test_blank_fields_all_reported() {
        let mut bad = input();
        bad.name = "  ".to_string();
        bad.mobility = String::new();
        let err = validate_profile(&bad).unwrap_err();
        match err {
            AppError::Validation(msg) => {
                assert!(msg.contains("name"));
                assert!(msg.contains("mobility"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_city_may_be_blank() {
        let mut partial = input();
        partial.location.city = String::new();
        assert!(validate_profile(&partial).is_ok());
    }
}
