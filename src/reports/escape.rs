//! Escaping for text embedded in generated documents.
//!
//! BOM fields come from external sources and may contain markup of their
//! own. Everything user-controllable goes through one of these functions
//! before it is written into SPDX `<text>` blocks or Markdown.

/// Escape a string for an SPDX `<text>..</text>` block.
///
/// Follows HTML entity encoding:
/// - `&` -> `&amp;`
/// - `<` -> `&lt;`
/// - `>` -> `&gt;`
/// - `"` -> `&quot;`
/// - `'` -> `&#39;`
///
/// Latin-1 supplement characters (U+00A0 to U+00FF) become numeric
/// entities so the block stays ASCII-safe.
///
/// # Examples
///
/// ```
/// use bom_tools::reports::escape::escape_html;
///
/// assert_eq!(escape_html("Copyright <c> ACME & Co"), "Copyright &lt;c&gt; ACME &amp; Co");
/// assert_eq!(escape_html("© 2024"), "&#169; 2024");
/// ```
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            '\u{a0}'..='\u{ff}' => {
                result.push_str("&#");
                result.push_str(&u32::from(c).to_string());
                result.push(';');
            }
            _ => result.push(c),
        }
    }
    result
}

/// Escape a string for Markdown inline content.
///
/// # Examples
///
/// ```
/// use bom_tools::reports::escape::escape_markdown_inline;
///
/// assert_eq!(escape_markdown_inline("**bold**"), "\\*\\*bold\\*\\*");
/// assert_eq!(escape_markdown_inline("[link](url)"), "\\[link\\](url)");
/// ```
pub fn escape_markdown_inline(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '*' => result.push_str("\\*"),
            '_' => result.push_str("\\_"),
            '`' => result.push_str("\\`"),
            '[' => result.push_str("\\["),
            ']' => result.push_str("\\]"),
            '#' => result.push_str("\\#"),
            '!' => result.push_str("\\!"),
            '~' => result.push_str("\\~"),
            '|' => result.push_str("\\|"),
            '<' => result.push_str("\\<"),
            '>' => result.push_str("\\>"),
            '\n' => result.push(' '),
            '\r' => {}
            _ => result.push(c),
        }
    }
    result
}

/// Escape a string for a Markdown list item. Newlines become `; ` so the
/// item stays on one line.
pub fn escape_markdown_list(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '*' => result.push_str("\\*"),
            '_' => result.push_str("\\_"),
            '`' => result.push_str("\\`"),
            '[' => result.push_str("\\["),
            ']' => result.push_str("\\]"),
            '<' => result.push_str("\\<"),
            '>' => result.push_str("\\>"),
            '\n' => result.push_str("; "),
            '\r' => {}
            _ => result.push(c),
        }
    }
    result
}
