use crate::error::TlError;

pub fn quote(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| format!("\"{}\"", text))
}

pub fn error(file: &str, msg: &str, line: usize, column: usize) -> TlError {
    TlError::ParseError {
        file:   file.to_string(),
        msg:    msg.to_string(),
        line,
        column,
    }
}

/// Uppercases the first character and leaves the rest untouched.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().to_string() + chars.as_str(),
    }
}

/// Converts a schema name to a class or property name: every
/// underscore-delimited segment is capitalized and the segments are joined.
/// The rest of each segment keeps its casing, so `chatPhoto` becomes
/// `ChatPhoto` and `is_outgoing` becomes `IsOutgoing`.
pub fn to_pascal_case(s: &str) -> String {
    s.split('_')
     .filter(|word| !word.is_empty())
     .map(capitalize)
     .collect::<String>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_pascal_case() {
        assert_eq!(to_pascal_case("id"), "Id");
        assert_eq!(to_pascal_case("is_outgoing"), "IsOutgoing");
        assert_eq!(to_pascal_case("chatPhoto"), "ChatPhoto");
        assert_eq!(to_pascal_case("can_be_deleted_only_for_self"), "CanBeDeletedOnlyForSelf");
        assert_eq!(to_pascal_case("_leading"), "Leading");
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("photoMessage"), "PhotoMessage");
        assert_eq!(capitalize("user_full_info"), "User_full_info");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote("a\"b"), "\"a\\\"b\"");
    }
}
