use std::path::Path;

/// Convert snake_case or kebab-case to PascalCase.
///
/// Normalizes words separated by `_`, `-`, or `.`. If the input is already
/// PascalCase (starts uppercase, no separators), it is returned unchanged.
///
/// # Examples
/// ```
/// use strata_core::utils::to_pascal_case;
/// assert_eq!(to_pascal_case("foo_bar"), "FooBar");
/// assert_eq!(to_pascal_case("FooBar"), "FooBar");
/// ```
pub fn to_pascal_case(s: &str) -> String {
    fn is_separator(c: char) -> bool {
        matches!(c, '_' | '-' | '.')
    }

    let has_separator = s.chars().any(is_separator);
    let starts_uppercase = s.chars().next().is_some_and(|c| c.is_ascii_uppercase());

    if starts_uppercase && !has_separator {
        return s.to_string();
    }

    let mut result = String::with_capacity(s.len());
    let mut capitalize_next = true;
    for c in s.chars() {
        if is_separator(c) {
            capitalize_next = true;
            continue;
        }
        if capitalize_next {
            result.push(c.to_ascii_uppercase());
            capitalize_next = false;
        } else {
            result.push(c);
        }
    }
    result
}

/// Uppercase the first character, leaving the rest untouched.
///
/// Used for GraphQL-derived type names where the tail is already camelCase
/// (`artists` → `Artists`, `userName` → `UserName`).
pub fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

/// Derive the module name a source file exposes its GraphQL tags under.
///
/// - all extensions are dropped: `Foo.react.js` → `Foo`
/// - `index` files take their directory name: `button/index.js` → `button`
/// - runs of non-alphanumeric characters camel-case the next character:
///   `foo-bar` → `fooBar`
///
/// # Examples
/// ```
/// use std::path::Path;
/// use strata_core::utils::module_name;
/// assert_eq!(module_name(Path::new("src/FindGraphQLTags.js")), "FindGraphQLTags");
/// assert_eq!(module_name(Path::new("src/button/index.js")), "button");
/// ```
pub fn module_name(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = file_name.split('.').next().unwrap_or_default();

    let base = if stem == "index" {
        path.parent()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| stem.to_string())
    } else {
        stem.to_string()
    };

    let mut result = String::with_capacity(base.len());
    let mut upper_next = false;
    for c in base.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            if upper_next {
                result.push(c.to_ascii_uppercase());
                upper_next = false;
            } else {
                result.push(c);
            }
        } else {
            upper_next = true;
        }
    }
    result
}
