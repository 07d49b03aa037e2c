//! Filename sanitizing

/// Placeholder for messages without a subject
pub const NO_SUBJECT: &str = "Kein_Betreff";

/// Placeholder for attachments without a name
pub const UNNAMED: &str = "Unbenannt";

/// Characters rejected in file names on at least one supported platform
const RESERVED: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Longest sanitized component; keeps composed archive names within
/// filesystem path limits
const MAX_COMPONENT_LEN: usize = 50;

/// Turn an arbitrary string into a non-empty, filesystem-safe path
/// component: reserved and control characters become underscores,
/// underscore runs collapse to one, surrounding whitespace is trimmed
/// and the result is capped at 50 characters. Empty input (or input
/// that sanitizes away entirely) yields `placeholder`.
pub fn sanitize_filename(input: &str, placeholder: &str) -> String {
    let mut out = String::with_capacity(input.len().min(MAX_COMPONENT_LEN));
    let mut last_was_underscore = false;

    for c in input.trim().chars() {
        let mapped = if RESERVED.contains(&c) || c.is_control() {
            '_'
        } else {
            c
        };
        if mapped == '_' {
            if last_was_underscore {
                continue;
            }
            last_was_underscore = true;
        } else {
            last_was_underscore = false;
        }
        out.push(mapped);
        if out.chars().count() == MAX_COMPONENT_LEN {
            break;
        }
    }

    let trimmed = out.trim();
    if trimmed.is_empty() {
        placeholder.to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_characters_become_underscores() {
        assert_eq!(
            sanitize_filename("Meeting: Q3 Review?!", NO_SUBJECT),
            "Meeting_ Q3 Review_!"
        );
        assert_eq!(sanitize_filename("a/b\\c|d", NO_SUBJECT), "a_b_c_d");
    }

    #[test]
    fn test_underscore_runs_collapse() {
        assert_eq!(sanitize_filename("Re: <wichtig>", NO_SUBJECT), "Re_ _wichtig_");
        assert_eq!(sanitize_filename("a??*b", NO_SUBJECT), "a_b");
    }

    #[test]
    fn test_empty_input_yields_placeholder() {
        assert_eq!(sanitize_filename("", NO_SUBJECT), NO_SUBJECT);
        assert_eq!(sanitize_filename("   ", UNNAMED), UNNAMED);
    }

    #[test]
    fn test_length_cap_respects_char_boundaries() {
        let long = "ä".repeat(80);
        let sanitized = sanitize_filename(&long, NO_SUBJECT);
        assert_eq!(sanitized.chars().count(), 50);
    }

    #[test]
    fn test_output_never_contains_reserved_or_double_underscore() {
        for input in ["<<>>::??", "a\nb\tc", "  x  ", "___", "normal name.pdf"] {
            let out = sanitize_filename(input, UNNAMED);
            assert!(!out.is_empty());
            assert!(!out.contains("__"), "double underscore in {out:?}");
            assert!(
                out.chars().all(|c| !RESERVED.contains(&c) && !c.is_control()),
                "reserved char survived in {out:?}"
            );
        }
    }
}
