use std::collections::HashMap;

use crate::{
    tokenizer::{tokenize_line, Token},
    utils::{error, quote},
    error::TlError,
};
use lazy_static::lazy_static;
use regex::Regex;
use tlgen_schema::{Builtin, BYTES_ALIAS, BYTES_EXPANSION};
use tracing::{debug, warn};

lazy_static! {
    static ref IDENTIFIER: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
    static ref TYPE_NAME:  Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_<>]*$").unwrap();
    static ref EQUALS:     Regex = Regex::new(r"^=$").unwrap();
    static ref COLON:      Regex = Regex::new(r"^:$").unwrap();
    static ref SEMICOLON:  Regex = Regex::new(r"^;$").unwrap();
    static ref EOF:        Regex = Regex::new(r"^$").unwrap();
    static ref DOC_TAG:    Regex = Regex::new(r"(@[a-zA-Z_]+)[ ]+([^@]+)").unwrap();
    static ref BYTES_FIELD: Regex = Regex::new(r":bytes\b").unwrap();
}

/// A run of consecutive non-blank lines, each paired with its 1-based line
/// number.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub lines: Vec<(usize, String)>,
}

/// Documentation tags of one block, keyed by lowercased tag name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Docs {
    tags: HashMap<String, String>,
}

impl Docs {
    pub fn get(&self, tag: &str) -> Option<&str> {
        self.tags.get(&tag.to_lowercase()).map(String::as_str)
    }

    pub fn description(&self) -> Option<&str> {
        self.get("description")
    }

    /// `@param_<name>` takes precedence so that a field called `description`
    /// does not pick up the declaration's own description.
    pub fn field(&self, name: &str) -> Option<&str> {
        let name = name.to_lowercase();
        self.get(&format!("param_{}", name)).or_else(|| self.get(&name))
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    pub name:   String,
    pub type_:  String,
    pub column: usize,
}

/// `name field:type ... = Result;`
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub name:   String,
    pub fields: Vec<FieldDecl>,
    pub result: String,
    pub line:   usize,
    pub docs:   Docs,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Declaration(Declaration),
    /// A comment-only block documenting a union: `//@class Name @description ...`.
    ClassDoc {
        name:        String,
        description: Option<String>,
        line:        usize,
    },
}

/// Rewrites `bytes` field types to the generic they stand for.
pub fn preprocess_line(line: &str) -> String {
    BYTES_FIELD
        .replace_all(line, format!(":{}", BYTES_EXPANSION).as_str())
        .into_owned()
}

pub fn is_comment(line: &str) -> bool {
    let line = line.trim_start();
    line.starts_with("//") || line.starts_with("---")
}

/// Groups the lines of `text` into blank-line-delimited blocks.
pub fn split_blocks(text: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut current = Vec::new();

    for (i, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(Block { lines: std::mem::take(&mut current) });
            }
        } else {
            current.push((i + 1, preprocess_line(line)));
        }
    }
    if !current.is_empty() {
        blocks.push(Block { lines: current });
    }

    blocks
}

/// Collects every `@tag text` pair of a block. Later tags win; a `//-` line
/// continues the most recent tag.
pub fn extract_docs(block: &Block) -> Docs {
    let mut docs = Docs::default();
    let mut last: Option<String> = None;

    for (_, line) in &block.lines {
        let trimmed = line.trim_start();
        if let Some(rest) = trimmed.strip_prefix("//-") {
            if let Some(tag) = &last {
                let rest = rest.trim();
                if let Some(value) = docs.tags.get_mut(tag) {
                    if !rest.is_empty() {
                        value.push(' ');
                        value.push_str(rest);
                    }
                }
            }
            continue;
        }

        for caps in DOC_TAG.captures_iter(line) {
            let key = caps[1][1..].to_lowercase();
            let value = caps[2].trim();
            if value.is_empty() {
                continue;
            }
            docs.tags.insert(key.clone(), value.to_string());
            last = Some(key);
        }
    }

    docs
}

/// Lines that declare the builtins themselves, e.g. `double ? = Double;` or
/// `vector {t:Type} # [ t ] = Vector t;`.
fn is_prelude_line(line: &str) -> bool {
    match line.split_whitespace().next() {
        Some(first) => {
            first == BYTES_ALIAS || first == "vector" || Builtin::from_token(first).is_some()
        }
        None => false,
    }
}

/// Parses one declaration line.
pub fn parse_declaration(file: &str, text: &str, line: usize) -> Result<Declaration, TlError> {
    let tokens = tokenize_line(file, text, line)?;
    let mut index = 0;

    fn current_token(tokens: &[Token], index: usize) -> &Token {
        &tokens[index.min(tokens.len() - 1)]
    }

    fn eat(tokens: &[Token], index: &mut usize, test: &Regex) -> bool {
        if test.is_match(&current_token(tokens, *index).text) {
            *index += 1;
            true
        } else {
            false
        }
    }

    fn expect<'a>(
        file: &str,
        tokens: &'a [Token],
        index: &mut usize,
        test: &Regex,
        expected: &str,
    ) -> Result<&'a Token, TlError> {
        let tok = current_token(tokens, *index);
        if !eat(tokens, index, test) {
            let found = if tok.text.is_empty() { "end of line".to_string() } else { quote(&tok.text) };
            return Err(error(
                file,
                &format!("Expected {} but found {}", expected, found),
                tok.line,
                tok.column,
            ));
        }
        Ok(tok)
    }

    fn check_brackets(file: &str, tok: &Token) -> Result<(), TlError> {
        let mut depth: i32 = 0;
        for c in tok.text.chars() {
            match c {
                '<' => depth += 1,
                '>' => depth -= 1,
                _ => {}
            }
            if depth < 0 {
                break;
            }
        }
        let closes_last = !tok.text.contains('<') || tok.text.ends_with('>');
        if depth != 0 || !closes_last {
            return Err(error(
                file,
                &format!("Unbalanced angle brackets in {}", quote(&tok.text)),
                tok.line,
                tok.column,
            ));
        }
        Ok(())
    }

    let name = expect(file, &tokens, &mut index, &IDENTIFIER, "declaration name")?;

    let mut fields = Vec::new();
    while !eat(&tokens, &mut index, &EQUALS) {
        let field = expect(file, &tokens, &mut index, &IDENTIFIER, "field name or \"=\"")?;
        expect(file, &tokens, &mut index, &COLON, "\":\"")?;
        let type_ = expect(file, &tokens, &mut index, &TYPE_NAME, "field type")?;
        check_brackets(file, type_)?;

        fields.push(FieldDecl {
            name:   field.text.clone(),
            type_:  type_.text.clone(),
            column: field.column,
        });
    }

    let result = expect(file, &tokens, &mut index, &TYPE_NAME, "result type")?;
    check_brackets(file, result)?;
    expect(file, &tokens, &mut index, &SEMICOLON, "\";\"")?;
    expect(file, &tokens, &mut index, &EOF, "end of line")?;

    Ok(Declaration {
        name:   name.text.clone(),
        fields,
        result: result.text.clone(),
        line,
        docs:   Docs::default(),
    })
}

/// Parses one block. Comment-only blocks and prelude declarations yield
/// `None`; anything else that is not a valid declaration is an error.
pub fn parse_block(file: &str, block: &Block) -> Result<Option<Item>, TlError> {
    let docs = extract_docs(block);
    let first_line = block.lines.first().map(|(n, _)| *n).unwrap_or_default();

    let declaration = block.lines.iter().find(|(_, line)| !is_comment(line));
    let (line_number, text) = match declaration {
        Some((n, text)) => (*n, text),
        None => {
            if let Some(class) = docs.get("class") {
                return Ok(Some(Item::ClassDoc {
                    name:        class.to_string(),
                    description: docs.description().map(str::to_string),
                    line:        first_line,
                }));
            }
            debug!("{}:{}: skipping comment-only block", file, first_line);
            return Ok(None);
        }
    };

    if is_prelude_line(text) {
        debug!("{}:{}: skipping builtin declaration {}", file, line_number, quote(text.trim()));
        return Ok(None);
    }

    let mut declaration = parse_declaration(file, text, line_number)?;
    declaration.docs = docs;
    Ok(Some(Item::Declaration(declaration)))
}

/// Parses a whole schema file. In lenient mode malformed blocks are skipped
/// with a warning instead of failing the run.
pub fn parse_schema(file: &str, text: &str, strict: bool) -> Result<Vec<Item>, TlError> {
    let mut items = Vec::new();

    for block in split_blocks(text) {
        match parse_block(file, &block) {
            Ok(Some(item)) => items.push(item),
            Ok(None) => {}
            Err(err) if !strict => warn!("skipping malformed block: {}", err),
            Err(err) => return Err(err),
        }
    }

    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(lines: &[&str]) -> Block {
        Block {
            lines: lines
                .iter()
                .enumerate()
                .map(|(i, l)| (i + 1, l.to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_split_blocks() {
        let input = "//@description A\na = A;\n\n\n//@description B\nb = B;\n\n";
        let blocks = split_blocks(input);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].lines, vec![(1, "//@description A".to_string()), (2, "a = A;".to_string())]);
        assert_eq!(blocks[1].lines[0].0, 5);
        assert_eq!(blocks[1].lines[1], (6, "b = B;".to_string()));
    }

    #[test]
    fn test_split_blocks_without_trailing_newline() {
        let blocks = split_blocks("a = A;\nb = B;");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].lines.len(), 2);
    }

    #[test]
    fn test_bytes_fields_are_rewritten() {
        assert_eq!(
            preprocess_line("file data:bytes name:string = File;"),
            "file data:vector<byte> name:string = File;"
        );
        assert_eq!(preprocess_line("f data:bytes = F;"), "f data:vector<byte> = F;");
        assert_eq!(preprocess_line("f data:bytesCount = F;"), "f data:bytesCount = F;");
    }

    #[test]
    fn test_extract_docs() {
        let docs = extract_docs(&block(&[
            "//@description Describes a message @id Message identifier",
            "//@TEXT Text of the message",
            "message id:int53 text:string = Message;",
        ]));
        assert_eq!(docs.description(), Some("Describes a message"));
        assert_eq!(docs.field("id"), Some("Message identifier"));
        assert_eq!(docs.field("Text"), Some("Text of the message"));
        assert_eq!(docs.field("photo"), None);
    }

    #[test]
    fn test_extract_docs_continuation_and_param_prefix() {
        let docs = extract_docs(&block(&[
            "//@description Describes a sticker set",
            "//-that spans two lines",
            "//@param_description Description of the set @title Set title",
            "stickerSet title:string description:string = StickerSet;",
        ]));
        assert_eq!(docs.description(), Some("Describes a sticker set that spans two lines"));
        assert_eq!(docs.field("description"), Some("Description of the set"));
        assert_eq!(docs.field("title"), Some("Set title"));
    }

    #[test]
    fn test_parse_declaration() {
        let decl = parse_declaration(
            "types.tl",
            "album id:int53 photos:vector<vector<photoSize>> = Album;",
            4,
        )
        .unwrap();
        assert_eq!(decl.name, "album");
        assert_eq!(decl.result, "Album");
        assert_eq!(decl.line, 4);
        assert_eq!(decl.fields.len(), 2);
        assert_eq!(decl.fields[0].name, "id");
        assert_eq!(decl.fields[0].type_, "int53");
        assert_eq!(decl.fields[1].name, "photos");
        assert_eq!(decl.fields[1].type_, "vector<vector<photoSize>>");
        assert_eq!(decl.fields[1].column, 16);
    }

    #[test]
    fn test_parse_declaration_without_fields() {
        let decl = parse_declaration("types.tl", "ok = Ok;", 1).unwrap();
        assert_eq!(decl.name, "ok");
        assert!(decl.fields.is_empty());
        assert_eq!(decl.result, "Ok");
    }

    #[test]
    fn test_parse_declaration_errors() {
        let cases = [
            ("message id:int53 = Message", "Expected \";\""),
            ("message id = Message;", "Expected \":\""),
            ("message id:int53 Message;", "Expected \":\""),
            ("message id:vector<int53 = Message;", "Unbalanced angle brackets"),
            ("message id:int53 = ;", "Expected result type"),
            ("= Message;", "Expected declaration name"),
            ("message = Message; extra", "Expected end of line"),
        ];
        for (input, expected) in cases {
            match parse_declaration("types.tl", input, 9) {
                Err(TlError::ParseError { msg, line, .. }) => {
                    assert_eq!(line, 9);
                    assert!(msg.starts_with(expected), "{}: unexpected message {}", input, msg);
                }
                other => panic!("{}: expected a ParseError but got {:?}", input, other),
            }
        }
    }

    #[test]
    fn test_comment_only_block_is_skipped() {
        let parsed = parse_block("types.tl", &block(&["// stray commentary", "// more"])).unwrap();
        assert_eq!(parsed, None);
    }

    #[test]
    fn test_class_doc_block() {
        let parsed = parse_block(
            "types.tl",
            &block(&["//@class MessageContent @description Contains the content of a message"]),
        )
        .unwrap();
        assert_eq!(
            parsed,
            Some(Item::ClassDoc {
                name:        "MessageContent".into(),
                description: Some("Contains the content of a message".into()),
                line:        1,
            })
        );
    }

    #[test]
    fn test_prelude_lines_are_skipped() {
        for line in [
            "double ? = Double;",
            "string ? = String;",
            "int32 = Int32;",
            "int53 = Int53;",
            "bytes = Bytes;",
            "vector {t:Type} # [ t ] = Vector t;",
        ] {
            assert_eq!(parse_block("types.tl", &block(&[line])).unwrap(), None, "{}", line);
        }
    }

    #[test]
    fn test_first_non_comment_line_is_the_declaration() {
        let parsed = parse_block(
            "types.tl",
            &block(&["//@description A user", "user id:int53 = User;", "//@id trailing tag"]),
        )
        .unwrap();
        match parsed {
            Some(Item::Declaration(decl)) => {
                assert_eq!(decl.name, "user");
                assert_eq!(decl.line, 2);
                assert_eq!(decl.docs.description(), Some("A user"));
                assert_eq!(decl.docs.field("id"), Some("trailing tag"));
            }
            other => panic!("expected a declaration but got {:?}", other),
        }
    }

    #[test]
    fn test_parse_schema_strict_and_lenient() {
        let input = "a x:int32 = A;\n\nbroken line here\n\nb = B;\n";
        let err = parse_schema("types.tl", input, true).unwrap_err();
        assert!(matches!(err, TlError::ParseError { line: 3, .. }), "got {:?}", err);

        let items = parse_schema("types.tl", input, false).unwrap();
        assert_eq!(items.len(), 2);
    }
}
