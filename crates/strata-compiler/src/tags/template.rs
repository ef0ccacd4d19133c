//! `graphql` tagged template literals in JavaScript and TypeScript.
//!
//! The module is tokenized just enough to skip comments and string literals,
//! so a `graphql` mention inside either is never mistaken for a tag.

use std::path::Path;

use logos::Logos;

use super::{ExtractedTag, TagExtractor};
use crate::source_map::LineCol;
use crate::{Error, Result};

const TAG_NAME: &str = "graphql";

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum JsToken {
    #[regex(r"//[^\n]*", allow_greedy = true)]
    LineComment,

    #[regex(r"/\*([^*]|\*+[^*/])*\*+/")]
    BlockComment,

    #[regex(r#""(?:[^"\\\n]|\\.)*""#)]
    #[regex(r"'(?:[^'\\\n]|\\.)*'")]
    String,

    #[regex(r"`(?:[^`\\]|\\(?:.|\n))*`")]
    Template,

    #[regex(r"[A-Za-z_$][A-Za-z0-9_$]*")]
    Ident,

    #[token(":")]
    Colon,

    #[regex(r"[ \t\r\n]+")]
    Whitespace,
}

/// Finds `` graphql`...` `` literals. A tag written as an object property
/// value (`user: graphql`...``) records the property name.
#[derive(Debug, Default, Clone, Copy)]
pub struct TemplateTagExtractor;

impl TagExtractor for TemplateTagExtractor {
    fn extract(&self, text: &str, path: &Path) -> Result<Vec<ExtractedTag>> {
        let mut tags = Vec::new();
        // Last two significant tokens, most recent last.
        let mut recent: [Option<(JsToken, &str)>; 2] = [None, None];
        let mut pending_tag = false;

        let mut lexer = JsToken::lexer(text);
        while let Some(token) = lexer.next() {
            let slice = lexer.slice();
            let span = lexer.span();
            let token = match token {
                Ok(JsToken::Whitespace | JsToken::LineComment | JsToken::BlockComment) => continue,
                Ok(token) => token,
                Err(()) => {
                    if pending_tag && slice.starts_with('`') {
                        return Err(extract_error(
                            path,
                            text,
                            span.start,
                            "unterminated graphql tag",
                        ));
                    }
                    pending_tag = false;
                    recent = [recent[1], None];
                    continue;
                }
            };

            if pending_tag && token == JsToken::Template {
                let body = &slice[1..slice.len() - 1];
                if body.contains("${") {
                    return Err(extract_error(
                        path,
                        text,
                        span.start,
                        "graphql tags cannot contain substitutions",
                    ));
                }
                tags.push(ExtractedTag {
                    text: body.to_string(),
                    start: line_col(text, span.start + 1),
                    prop: property_name(&recent),
                });
            }

            pending_tag = token == JsToken::Ident && slice == TAG_NAME;
            if !pending_tag {
                recent = [recent[1], Some((token, slice))];
            }
        }
        Ok(tags)
    }
}

/// `key` when the tokens before the tag read `key :`.
fn property_name(recent: &[Option<(JsToken, &str)>; 2]) -> Option<String> {
    match recent {
        [Some((JsToken::Ident, key)), Some((JsToken::Colon, _))] => Some(key.to_string()),
        _ => None,
    }
}

fn line_col(text: &str, offset: usize) -> LineCol {
    let before = &text[..offset];
    let line = before.matches('\n').count() as u32;
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    LineCol::new(line, before[line_start..].chars().count() as u32)
}

fn extract_error(path: &Path, text: &str, offset: usize, message: &str) -> Error {
    Error::Extract {
        path: path.to_path_buf(),
        message: format!("{}: {message}", line_col(text, offset)),
    }
}
