//! Discovers `require('...')` call sites in a JavaScript syntax tree.
//!
//! Only calls whose callee is the bare identifier `require` and whose single
//! argument is a plain string literal are dependency edges. Dynamic forms
//! (`require(name)`, template strings, extra arguments) are left untouched.

use std::ops::Range;

use tree_sitter::{Node, Tree};

use crate::parser::walk_preorder;

const REQUIRE: &str = "require";

/// A dependency-introducing call site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequireCall {
    /// Decoded value of the string literal
    pub request: String,
    /// Byte range of the literal, quotes included
    pub literal_range: Range<usize>,
    /// Quote character used by the literal
    pub quote: char,
    /// 1-based line of the call
    pub line: usize,
}

impl RequireCall {
    /// Literal text that replaces the original one, in the same quote style.
    pub fn rewritten_literal(&self, module_id: &str) -> String {
        let mut literal = String::with_capacity(module_id.len() + 2);
        literal.push(self.quote);
        for ch in module_id.chars() {
            if ch == '\\' || ch == self.quote {
                literal.push('\\');
            }
            literal.push(ch);
        }
        literal.push(self.quote);
        literal
    }
}

/// Collects [`RequireCall`]s in source order.
#[derive(Debug)]
pub struct RequireDiscoveryVisitor<'src> {
    source: &'src str,
    calls: Vec<RequireCall>,
}

impl<'src> RequireDiscoveryVisitor<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            calls: Vec::new(),
        }
    }

    pub fn discover(source: &'src str, tree: &Tree) -> Vec<RequireCall> {
        let mut visitor = Self::new(source);
        visitor.visit_tree(tree);
        visitor.into_calls()
    }

    pub fn visit_tree(&mut self, tree: &Tree) {
        let source = self.source;
        let calls = &mut self.calls;
        walk_preorder(tree.root_node(), |node| {
            if node.kind() == "call_expression" {
                if let Some(call) = require_call(source, node) {
                    calls.push(call);
                }
            }
            true
        });
    }

    pub fn into_calls(self) -> Vec<RequireCall> {
        self.calls
    }
}

fn require_call(source: &str, call: Node<'_>) -> Option<RequireCall> {
    let callee = call.child_by_field_name("function")?;
    if callee.kind() != "identifier" || node_text(source, callee) != REQUIRE {
        return None;
    }

    let arguments = call.child_by_field_name("arguments")?;
    if arguments.kind() != "arguments" {
        return None;
    }
    let mut cursor = arguments.walk();
    let mut values = arguments
        .named_children(&mut cursor)
        .filter(|node| node.kind() != "comment");
    let literal = values.next()?;
    if values.next().is_some() || literal.kind() != "string" {
        return None;
    }

    let raw = node_text(source, literal);
    let quote = raw.chars().next()?;
    let inner = raw.get(1..raw.len().checked_sub(1)?)?;
    Some(RequireCall {
        request: unescape(inner),
        literal_range: literal.byte_range(),
        quote,
        line: call.start_position().row + 1,
    })
}

fn node_text<'s>(source: &'s str, node: Node<'_>) -> &'s str {
    &source[node.byte_range()]
}

/// Decode the escape sequences of a JavaScript string literal body.
fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('v') => out.push('\u{b}'),
            Some('0') => out.push('\0'),
            Some('x') => {
                let hex: String = chars.by_ref().take(2).collect();
                push_code_point(&mut out, &hex);
            }
            Some('u') => {
                let hex: String = if chars.peek() == Some(&'{') {
                    chars.next();
                    chars.by_ref().take_while(|c| *c != '}').collect()
                } else {
                    chars.by_ref().take(4).collect()
                };
                push_code_point(&mut out, &hex);
            }
            // line continuation
            Some('\n') => {}
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

fn push_code_point(out: &mut String, hex: &str) {
    match u32::from_str_radix(hex, 16).ok().and_then(char::from_u32) {
        Some(ch) => out.push(ch),
        None => out.push_str(hex),
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::parser::JsParser;

    fn discover(source: &str) -> Vec<RequireCall> {
        let mut parser = JsParser::new().unwrap();
        let tree = parser.parse(Path::new("test.js"), source).unwrap();
        RequireDiscoveryVisitor::discover(source, &tree)
    }

    fn requests(source: &str) -> Vec<String> {
        discover(source).into_iter().map(|call| call.request).collect()
    }

    #[test]
    fn test_finds_requires_in_source_order() {
        let source = r#"
const a = require('./a');
function later() {
  return require("./b");
}
module.exports = { a, c: require('./c').value };
"#;
        assert_eq!(requests(source), ["./a", "./b", "./c"]);
    }

    #[test]
    fn test_ignores_dynamic_and_foreign_calls() {
        let source = r#"
const name = './x';
require(name);
require(`./template`);
require('./a', extra);
obj.require('./method');
notRequire('./other');
"#;
        assert!(requests(source).is_empty());
    }

    #[test]
    fn test_records_literal_range_and_quote() {
        let source = "var a = require(\"./a\");";
        let calls = discover(source);
        assert_eq!(calls.len(), 1);
        assert_eq!(&source[calls[0].literal_range.clone()], "\"./a\"");
        assert_eq!(calls[0].quote, '"');
        assert_eq!(calls[0].line, 1);
    }

    #[test]
    fn test_comments_inside_arguments_are_ignored() {
        let source = "require(/* shared */ './a');\nrequire('./b' // trailing\n);\n";
        let calls = discover(source);

        let found: Vec<_> = calls.iter().map(|call| call.request.as_str()).collect();
        assert_eq!(found, ["./a", "./b"]);
        assert_eq!(&source[calls[0].literal_range.clone()], "'./a'");
    }

    #[test]
    fn test_decodes_escapes() {
        assert_eq!(requests(r"require('.\/a\x2ejs');"), ["./a.js"]);
        assert_eq!(unescape(r"\u{41}B"), "AB");
    }

    #[test]
    fn test_rewritten_literal_keeps_quote_style() {
        let call = RequireCall {
            request: "./a".to_owned(),
            literal_range: 0..5,
            quote: '\'',
            line: 1,
        };
        assert_eq!(call.rewritten_literal("./src/a.js"), "'./src/a.js'");
        assert_eq!(call.rewritten_literal("./it's.js"), r"'./it\'s.js'");
    }
}
