//! Name generation for objects created with `generateName`

use rand::Rng;

/// Maximum length of a generated name (DNS-1123 label length)
pub const MAX_NAME_LENGTH: usize = 63;

/// Length of the random suffix appended to the base
pub const RANDOM_LENGTH: usize = 5;

/// Longest base kept before the random suffix
pub const MAX_GENERATED_NAME_LENGTH: usize = MAX_NAME_LENGTH - RANDOM_LENGTH;

// No vowels, no 0/1/3
const ALPHANUMS: &[u8] = b"bcdfghjklmnpqrstvwxz2456789";

/// Generates a name from a `generateName` base
pub trait NameGenerator: Send + Sync {
    fn generate_name(&self, base: &str) -> String;
}

/// Appends a short random suffix to the (possibly truncated) base
#[derive(Debug, Default, Clone, Copy)]
pub struct SimpleNameGenerator;

impl NameGenerator for SimpleNameGenerator {
    fn generate_name(&self, base: &str) -> String {
        let base = truncate(base, MAX_GENERATED_NAME_LENGTH);
        let mut rng = rand::rng();
        let suffix: String = (0..RANDOM_LENGTH)
            .map(|_| ALPHANUMS[rng.random_range(0..ALPHANUMS.len())] as char)
            .collect();
        format!("{base}{suffix}")
    }
}

fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_name_appends_suffix() {
        let name = SimpleNameGenerator.generate_name("web-");
        assert!(name.starts_with("web-"));
        assert_eq!(name.len(), 4 + RANDOM_LENGTH);
        assert!(name[4..].bytes().all(|b| ALPHANUMS.contains(&b)));
    }

    #[test]
    fn test_generate_name_truncates_long_base() {
        let base = "x".repeat(100);
        let name = SimpleNameGenerator.generate_name(&base);
        assert_eq!(name.len(), MAX_NAME_LENGTH);
        assert!(name.starts_with(&"x".repeat(MAX_GENERATED_NAME_LENGTH)));
    }

    #[test]
    fn test_generate_name_differs_between_calls() {
        let names: std::collections::HashSet<String> =
            (0..20).map(|_| SimpleNameGenerator.generate_name("a-")).collect();
        assert!(names.len() > 1);
    }
}
