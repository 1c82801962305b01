use regex::Regex;
use lazy_static::lazy_static;
use crate::utils::{quote, error};
use crate::error::TlError;

lazy_static! {
    pub static ref TOKEN_REGEX:    Regex = Regex::new(r"([=;:]|[A-Za-z_][A-Za-z0-9_<>]*|\s+)").unwrap();
    pub static ref WHITESPACE_RX:  Regex = Regex::new(r"^\s+$").unwrap();
}

#[derive(Debug, PartialEq)]
pub struct Token {
    pub text:   String,
    pub line:   usize,
    pub column: usize,
}

/// Splits one declaration line into tokens. `line` is the 1-based line number
/// in `file`, used for diagnostics. An empty EOF token is always appended.
pub fn tokenize_line(file: &str, text: &str, line: usize) -> Result<Vec<Token>, TlError> {
    let mut tokens = Vec::new();
    let mut last_end = 0;

    for mat in TOKEN_REGEX.find_iter(text) {
        let start = mat.start();
        let part  = mat.as_str();

        if start > last_end {
            let unexpected = &text[last_end..start];
            return Err(error(
                file,
                &format!("Syntax error: {}", quote(unexpected)),
                line,
                last_end + 1,
            ));
        }

        if !WHITESPACE_RX.is_match(part) {
            tokens.push(Token {
                text:   part.to_string(),
                line,
                column: start + 1,
            });
        }

        last_end = mat.end();
    }

    if last_end != text.len() {
        let unexpected = &text[last_end..];
        return Err(error(
            file,
            &format!("Syntax error: {}", quote(unexpected)),
            line,
            last_end + 1,
        ));
    }

    tokens.push(Token {
        text:   "".to_string(),
        line,
        column: text.len() + 1,
    });
    Ok(tokens)
}
