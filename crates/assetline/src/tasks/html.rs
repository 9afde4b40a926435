// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Markup task: pages are copied as-is unless whitespace collapsing is on.

use super::{read_text, Emitted, TaskContext};
use crate::error::Result;
use regex::Regex;
use std::path::PathBuf;
use std::sync::OnceLock;

fn between_tags() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r">\s+<").expect("valid regex"))
}

/// Collapses whitespace runs between tags, leaving `<pre>` and `<textarea>` pages untouched.
pub(crate) fn collapse_whitespace(html: &str) -> String {
    let lower = html.to_ascii_lowercase();
    if lower.contains("<pre") || lower.contains("<textarea") {
        return html.to_string();
    }
    between_tags().replace_all(html.trim(), "><").into_owned()
}

pub(crate) fn build(ctx: &TaskContext<'_>, sources: &[PathBuf]) -> Result<Vec<Emitted>> {
    let mut emitted = Vec::with_capacity(sources.len());
    for source in sources {
        let content = read_text(source)?;
        let content = if ctx.options.minify_html {
            collapse_whitespace(&content)
        } else {
            content
        };
        emitted.push(Emitted::new(ctx.dest_for(source, None), content));
    }
    Ok(emitted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_whitespace() {
        let html = "<ul>\n  <li>a</li>\n  <li>b</li>\n</ul>\n";
        assert_eq!(collapse_whitespace(html), "<ul><li>a</li><li>b</li></ul>");
    }

    #[test]
    fn test_collapse_keeps_preformatted_pages() {
        let html = "<pre>\n  x\n</pre>  <p>y</p>";
        assert_eq!(collapse_whitespace(html), html);
    }
}
