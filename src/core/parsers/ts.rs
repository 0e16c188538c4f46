use anyhow::{Result, anyhow};
use std::collections::HashMap;
use std::sync::Arc;
use swc_common::{
    BytePos, FileName, Globals, SourceMap,
    comments::{Comment, SingleThreadedComments},
};
use swc_ecma_ast::Module;
use swc_ecma_parser::{Parser, StringInput, Syntax, TsSyntax};

/// Map of byte positions to comments.
pub type CommentMap = HashMap<BytePos, Vec<Comment>>;

/// Leading comments extracted from SingleThreadedComments.
///
/// Only leading comments are kept: doc tags always precede the
/// declaration or property they annotate.
#[derive(Debug, Clone, Default)]
pub struct ExtractedComments {
    pub leading: CommentMap,
}

impl ExtractedComments {
    /// Extract comments from SingleThreadedComments.
    /// This must be called before SingleThreadedComments is dropped.
    pub fn from_swc(comments: &SingleThreadedComments) -> Self {
        let (leading, _trailing) = comments.borrow_all();
        Self {
            leading: leading.iter().map(|(k, v)| (*k, v.clone())).collect(),
        }
    }

    /// Comments leading the token that starts at `pos`.
    pub fn leading_at(&self, pos: BytePos) -> &[Comment] {
        self.leading.get(&pos).map(Vec::as_slice).unwrap_or(&[])
    }
}

pub struct ParsedSource {
    pub module: Module,
    pub source_map: Arc<SourceMap>,
    pub comments: ExtractedComments,
}

/// Parse TypeScript source code into an AST.
///
/// `.tsx` files are parsed with JSX enabled and `.d.ts` files as declaration
/// files; everything else is plain TypeScript (so `<T>expr` assertions parse).
pub fn parse_ts_source(
    code: String,
    file_path: &str,
    source_map: Arc<SourceMap>,
) -> Result<ParsedSource> {
    use swc_common::GLOBALS;

    GLOBALS.set(&Globals::new(), || {
        let source_file = source_map.new_source_file(FileName::Real(file_path.into()).into(), code);

        let syntax = Syntax::Typescript(TsSyntax {
            tsx: file_path.ends_with(".tsx"),
            dts: file_path.ends_with(".d.ts"),
            ..Default::default()
        });

        let comments = SingleThreadedComments::default();
        let mut parser = Parser::new(syntax, StringInput::from(&*source_file), Some(&comments));

        let module = parser
            .parse_module()
            .map_err(|e| anyhow!("Failed to parse '{}': {:?}", file_path, e))?;

        let extracted_comments = ExtractedComments::from_swc(&comments);

        Ok(ParsedSource {
            module,
            source_map,
            comments: extracted_comments,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(code: &str, path: &str) -> Result<ParsedSource> {
        parse_ts_source(code.to_string(), path, Arc::new(SourceMap::default()))
    }

    #[test]
    fn test_parse_interface_with_doc_comment() {
        let parsed = parse("/** @realm */\nexport interface A { id: string }", "models.ts").unwrap();
        assert_eq!(parsed.module.body.len(), 1);
        assert_eq!(parsed.comments.leading.len(), 1);
    }

    #[test]
    fn test_type_assertion_parses_in_ts_files() {
        assert!(parse("const x = <number>y;", "a.ts").is_ok());
    }

    #[test]
    fn test_jsx_parses_in_tsx_files() {
        assert!(parse("export const A = () => <div />;", "a.tsx").is_ok());
    }

    #[test]
    fn test_syntax_error_is_reported_with_path() {
        let err = parse("export interface {", "broken.ts").err().unwrap();
        assert!(err.to_string().contains("broken.ts"));
    }
}
