//! JSDoc tag extraction.
//!
//! Only block comments opening with `/**` count as documentation, matching
//! how TypeScript attaches JSDoc to declarations. A tag is an `@name` token at
//! the start of the comment or after whitespace, so e-mail addresses and
//! decorators in code samples are not mistaken for tags.

use std::{collections::BTreeSet, sync::LazyLock};

use regex::Regex;
use swc_common::comments::{Comment, CommentKind};

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\s)@([A-Za-z_$][\w$-]*)").expect("tag pattern is valid")
});

/// Tag names found in the doc comments leading a node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocTags(BTreeSet<String>);

impl DocTags {
    pub fn from_comments(comments: &[Comment]) -> Self {
        let tags = comments
            .iter()
            .filter(|c| c.kind == CommentKind::Block)
            .filter_map(|c| c.text.strip_prefix('*'))
            .flat_map(|body| {
                TAG_RE
                    .captures_iter(body)
                    .map(|cap| cap[1].to_string())
                    .collect::<Vec<_>>()
            })
            .collect();
        Self(tags)
    }

    pub fn has(&self, tag: &str) -> bool {
        self.0.contains(tag)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
