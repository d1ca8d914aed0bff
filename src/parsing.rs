//! Source parsing via tree-sitter

use std::path::Path;

use tree_sitter::Tree;

use crate::error::{Result, TrackScanError};
use crate::lang::Lang;

/// Parse source code into a syntax tree.
///
/// Tree-sitter recovers from syntax errors instead of failing, so a tree
/// whose root contains error nodes is reported as a parse failure: the
/// walker treats that as a per-file, non-fatal outcome (warn and skip),
/// matching the behavior of a parser that throws.
///
/// # Errors
///
/// Returns `TrackScanError::ParseFailure` if the grammar cannot be loaded,
/// the parse produces no tree, or the tree contains syntax errors.
pub fn parse_source(file_path: &Path, source: &str, lang: Lang) -> Result<Tree> {
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(&lang.tree_sitter_language())
        .map_err(|e| TrackScanError::ParseFailure {
            message: format!(
                "Failed to set language for {}: {:?}",
                file_path.display(),
                e
            ),
        })?;

    let tree = parser
        .parse(source, None)
        .ok_or_else(|| TrackScanError::ParseFailure {
            message: format!("Failed to parse file: {}", file_path.display()),
        })?;

    if tree.root_node().has_error() {
        return Err(TrackScanError::ParseFailure {
            message: format!("Syntax errors in file: {}", file_path.display()),
        });
    }

    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_javascript() {
        let source = "analytics.track('signup', { plan: 'pro' });";
        let result = parse_source(Path::new("test.js"), source, Lang::JavaScript);
        assert!(result.is_ok());
    }

    #[test]
    fn test_parse_typescript() {
        let source = "const n: number = 1; mixpanel.track('evt', { n });";
        let result = parse_source(Path::new("test.ts"), source, Lang::TypeScript);
        assert!(result.is_ok());
    }

    #[test]
    fn test_parse_jsx() {
        let source = "export const App = () => <button onClick={() => gtag('event', 'click', {})} />;";
        let result = parse_source(Path::new("App.jsx"), source, Lang::Jsx);
        assert!(result.is_ok());
    }

    #[test]
    fn test_parse_empty_source() {
        let result = parse_source(Path::new("empty.js"), "// Empty file\n", Lang::JavaScript);
        assert!(result.is_ok());
    }

    #[test]
    fn test_parse_malformed_source() {
        let source = "function { this is not javascript (((";
        let result = parse_source(Path::new("broken.js"), source, Lang::JavaScript);
        assert!(matches!(
            result,
            Err(TrackScanError::ParseFailure { .. })
        ));
    }
}
