//! Password fixtures shared by the integration, compatibility and stress tests.

/// Well below the default minimum length of 8
pub const SHORT_PASSWORD: &str = "short";

/// 16 characters, all four character classes
pub const STRONG_PASSWORD: &str = "Tr0ub4dor&3Xk!9q";

/// `STRONG_PASSWORD` minus its last character
pub const STRONG_PASSWORD_15: &str = "Tr0ub4dor&3Xk!9";

/// Reads the same in both directions, long enough and mixed-class
pub const PALINDROME_PASSWORD: &str = "Az9!kWWk!9zA";

/// Passwords accepted with default settings
pub const ACCEPTED_PASSWORDS: &[&str] = &["Thosdjkesd", "Thosdjkesd%", "Thosdjkesd%p~i l230-9"];

/// Passwords rejected with default settings
pub const REJECTED_PASSWORDS: &[&str] = &["Thos", "supercalifragilic", "pa's a s'ap"];

/// Mixed corpus for cross-binding comparisons
pub fn comparison_corpus() -> Vec<&'static str> {
    let mut corpus = vec![
        "",
        SHORT_PASSWORD,
        STRONG_PASSWORD,
        STRONG_PASSWORD_15,
        PALINDROME_PASSWORD,
        "aaaaaaaaaaaa",
        "password",
        "12345678",
        "correct horse battery staple",
    ];
    corpus.extend_from_slice(ACCEPTED_PASSWORDS);
    corpus.extend_from_slice(REJECTED_PASSWORDS);
    corpus
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_lengths() {
        assert_eq!(STRONG_PASSWORD.len(), 16);
        assert_eq!(STRONG_PASSWORD_15.len(), 15);
        assert!(STRONG_PASSWORD.starts_with(STRONG_PASSWORD_15));
        let reversed: String = PALINDROME_PASSWORD.chars().rev().collect();
        assert_eq!(reversed, PALINDROME_PASSWORD);
    }

    #[test]
    fn test_corpus_contains_fixtures() {
        let corpus = comparison_corpus();
        assert!(corpus.contains(&SHORT_PASSWORD));
        assert!(corpus.iter().any(|p| p.is_empty()));
        assert_eq!(
            corpus.len(),
            9 + ACCEPTED_PASSWORDS.len() + REJECTED_PASSWORDS.len()
        );
    }
}
