//! Column name resolution.
//!
//! Unlike most `snake_case` helpers, this transform is one-shot per
//! uppercase letter: every `A..=Z` becomes `_` followed by its lowercase
//! form, with no attempt to group runs of capitals. `HTTPHeader` therefore
//! resolves to `_h_t_t_p_header`, not `http_header`.

/// Resolve a declared Rust identifier to its default column name.
#[must_use]
pub fn resolve_name(identifier: &str) -> String {
    let mut out = String::with_capacity(identifier.len() + 4);
    for c in identifier.chars() {
        if c.is_ascii_uppercase() {
            out.push('_');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_camel_case() {
        assert_eq!(resolve_name("testId"), "test_id");
    }

    #[test]
    fn leading_run_of_capitals_is_one_shot() {
        assert_eq!(resolve_name("HTTPHeader"), "_h_t_t_p_header");
    }

    #[test]
    fn already_lower_is_unchanged() {
        assert_eq!(resolve_name("name"), "name");
    }

    #[test]
    fn single_leading_capital() {
        assert_eq!(resolve_name("Test"), "_test");
    }
}
