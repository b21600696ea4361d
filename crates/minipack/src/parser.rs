//! JavaScript parsing on top of tree-sitter.

use std::{ops::Range, path::Path};

use tree_sitter::{Node, Parser, Tree};

use crate::error::{BundleError, Result};

/// Reusable JavaScript parser. One instance serves a whole build.
pub struct JsParser {
    parser: Parser,
}

impl std::fmt::Debug for JsParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsParser").finish_non_exhaustive()
    }
}

impl JsParser {
    pub fn new() -> Result<Self> {
        let language: tree_sitter::Language = tree_sitter_javascript::LANGUAGE.into();
        let mut parser = Parser::new();
        parser.set_language(&language)?;
        Ok(Self { parser })
    }

    /// Parse `source`, rejecting any tree that needed error recovery.
    pub fn parse(&mut self, path: &Path, source: &str) -> Result<Tree> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| BundleError::Parse {
                path: path.to_path_buf(),
                line: 1,
                column: 1,
                message: "parser produced no syntax tree".to_owned(),
            })?;

        let root = tree.root_node();
        if root.has_error() {
            let (node, message) = first_syntax_error(root, source);
            let position = node.start_position();
            return Err(BundleError::Parse {
                path: path.to_path_buf(),
                line: position.row + 1,
                column: position.column + 1,
                message,
            });
        }

        Ok(tree)
    }
}

/// Byte range of a leading `#!` line. It is only legal at the very start of
/// a script, so it cannot survive being wrapped in a module factory.
pub fn hash_bang_range(tree: &Tree) -> Option<Range<usize>> {
    tree.root_node()
        .named_child(0)
        .filter(|node| node.kind() == "hash_bang_line")
        .map(|node| node.byte_range())
}

/// Pre-order walk over `root` and its descendants.
///
/// `visit` returns whether the walk should descend into the node's children.
pub fn walk_preorder<'tree>(root: Node<'tree>, mut visit: impl FnMut(Node<'tree>) -> bool) {
    let mut cursor = root.walk();
    loop {
        if visit(cursor.node()) && cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return;
            }
        }
    }
}

fn first_syntax_error<'tree>(root: Node<'tree>, source: &str) -> (Node<'tree>, String) {
    let mut found: Option<Node<'tree>> = None;
    walk_preorder(root, |node| {
        if found.is_some() {
            return false;
        }
        if node.is_error() || node.is_missing() {
            found = Some(node);
            return false;
        }
        node.has_error()
    });

    match found {
        Some(node) if node.is_missing() => (node, format!("missing `{}`", node.kind())),
        Some(node) => {
            let snippet: String = node
                .utf8_text(source.as_bytes())
                .unwrap_or_default()
                .chars()
                .take(40)
                .collect();
            (node, format!("unexpected `{}`", snippet.trim()))
        }
        None => (root, "invalid syntax".to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_valid_module() {
        let mut parser = JsParser::new().unwrap();
        let tree = parser
            .parse(Path::new("a.js"), "const a = require('./a');\nmodule.exports = a;\n")
            .unwrap();
        assert_eq!(tree.root_node().kind(), "program");
    }

    #[test]
    fn test_reports_position_of_syntax_error() {
        let mut parser = JsParser::new().unwrap();
        let err = parser
            .parse(Path::new("bad.js"), "const ok = 1;\nconst = ;\n")
            .unwrap_err();
        match err {
            BundleError::Parse { path, line, .. } => {
                assert_eq!(path, Path::new("bad.js"));
                assert_eq!(line, 2);
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_hash_bang_range() {
        let mut parser = JsParser::new().unwrap();
        let source = "#!/usr/bin/env node\nmain();\n";
        let tree = parser.parse(Path::new("cli.js"), source).unwrap();
        let range = hash_bang_range(&tree).unwrap();
        assert_eq!(&source[range], "#!/usr/bin/env node");

        let tree = parser.parse(Path::new("lib.js"), "main();\n").unwrap();
        assert_eq!(hash_bang_range(&tree), None);
    }

    #[test]
    fn test_walk_preorder_visits_in_source_order() {
        let mut parser = JsParser::new().unwrap();
        let source = "a; b; c;";
        let tree = parser.parse(Path::new("x.js"), source).unwrap();

        let mut identifiers = Vec::new();
        walk_preorder(tree.root_node(), |node| {
            if node.kind() == "identifier" {
                identifiers.push(node.utf8_text(source.as_bytes()).unwrap().to_owned());
            }
            true
        });
        assert_eq!(identifiers, ["a", "b", "c"]);
    }
}
