//! Naming convention for data attributes.
//!
//! Attributes are registered and written in markup in dashed form
//! (`tag-name`), and exposed to Rust code and plugins in camel form
//! (`tagName`). A dash followed by a lowercase letter becomes that letter
//! uppercased; any other dash is kept. The mapping round-trips for names
//! whose dashes are all followed by a letter.

/// Characters that cannot appear in an HTML attribute name.
const FORBIDDEN: &[char] = &['"', '\'', '>', '<', '/', '='];

/// Returns true if `data-<name>` is a usable HTML attribute name.
pub fn is_valid_attribute_name(name: &str) -> bool {
    !name.is_empty()
        && !name
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || FORBIDDEN.contains(&c))
}

/// Converts `class-name` to `className`.
pub fn dashed_to_camel(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut chars = name.chars().peekable();
    while let Some(c) = chars.next() {
        match chars.peek() {
            Some(next) if c == '-' && next.is_ascii_lowercase() => {
                out.push(next.to_ascii_uppercase());
                chars.next();
            }
            _ => out.push(c),
        }
    }
    out
}

/// Converts `className` to `class-name`.
pub fn camel_to_dashed(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
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
    fn converts_defaults() {
        assert_eq!(dashed_to_camel("tag-name"), "tagName");
        assert_eq!(dashed_to_camel("class-name"), "className");
        assert_eq!(dashed_to_camel("id"), "id");
        assert_eq!(dashed_to_camel("attributes"), "attributes");
    }

    #[test]
    fn converts_back() {
        assert_eq!(camel_to_dashed("tagName"), "tag-name");
        assert_eq!(camel_to_dashed("fooBarBaz"), "foo-bar-baz");
        assert_eq!(camel_to_dashed("id"), "id");
    }

    #[test]
    fn round_trips_letter_led_segments() {
        for name in ["tag-name", "a", "x1-y2", "foo-bar-baz", "h1", "2col-layout"] {
            assert_eq!(camel_to_dashed(&dashed_to_camel(name)), name);
        }
    }

    #[test]
    fn keeps_dashes_not_followed_by_a_letter() {
        assert_eq!(dashed_to_camel("a-1"), "a-1");
        assert_eq!(dashed_to_camel("a--b"), "a-B");
        assert_eq!(dashed_to_camel("trailing-"), "trailing-");
    }

    #[test]
    fn accepts_any_html_attribute_name() {
        for name in ["a-1", "myattr", "x_y", "ns:item", "v.2", "ü"] {
            assert!(is_valid_attribute_name(name), "{name} should be valid");
        }
        for name in ["", "a b", "a=b", "a\"b", "a/b", "a>b", "a\tb"] {
            assert!(!is_valid_attribute_name(name), "{name:?} should be invalid");
        }
    }
}
