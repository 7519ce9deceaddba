use crate::config::FilterRules;
use crate::models::Entity;

/// Decide whether a roster member takes part in the analysis.
///
/// - logins in the exclusion set are always excluded;
/// - with a non-empty suffix filter, a known email must end with it;
/// - a member without email (absent or empty) is not excluded by the
///   suffix rule. The email is compared as given, without trimming.
pub fn should_include(login: &str, email: Option<&str>, rules: &FilterRules) -> bool {
    if rules.exclusion_set.contains(login) {
        return false;
    }

    let suffix = rules.email_suffix_filter.as_str();
    match email.filter(|e| !e.is_empty()) {
        Some(email) if !suffix.is_empty() => email.ends_with(suffix),
        _ => true,
    }
}

/// Same rules applied to a stored entity.
pub fn should_include_entity(entity: &Entity, rules: &FilterRules) -> bool {
    should_include(&entity.login, entity.email.as_deref(), rules)
}
