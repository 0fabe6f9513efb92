//! Label cleaning.
//!
//! Turns label markup into the plain text a node displays. The cleaner never
//! fails; anything it does not understand is dropped rather than reported.

use crate::scan::matching_close;

const SIZE_SWITCHES: [&str; 7] = [
    "small",
    "footnotesize",
    "scriptsize",
    "tiny",
    "large",
    "Large",
    "normalsize",
];

const ESCAPABLE: [char; 7] = ['&', '%', '_', '{', '}', '#', '$'];

fn is_size_switch(word: &str) -> bool {
    SIZE_SWITCHES.contains(&word)
}

/// Leading run of ASCII letters
fn letters(text: &str) -> &str {
    let end = text
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(text.len());
    &text[..end]
}

/// Number of leading spaces and tabs
fn spaces(text: &str) -> usize {
    text.len() - text.trim_start_matches([' ', '\t']).len()
}

/// Cleans label markup into display text.
///
/// - `\textbf{x}`, `\emph{x}` and any other `\cmd{x}` become `x`
/// - `\\`, `\newline` and size switches (`\small`, ...) become line breaks;
///   a size switch right after `\\` belongs to that break
/// - other bare commands are dropped
/// - `\&`, `\%`, `\_`, `\{`, `\}`, `\#`, `\$` keep their character
/// - grouping braces and stray backslashes are dropped
/// - every line is trimmed
///
/// # Examples
///
/// ```
/// # use tikzedit_parser::clean_label;
/// assert_eq!(clean_label(r"\textbf{AWS}\\small EC2 GPU"), "AWS\nEC2 GPU");
/// assert_eq!(clean_label(r"R\&D {\em 50\%}"), "R&D 50%");
/// ```
pub fn clean_label(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    clean_into(raw, &mut out);
    out.lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
        .trim_matches('\n')
        .to_string()
}

fn clean_into(text: &str, out: &mut String) {
    let mut idx = 0;
    while let Some(c) = text[idx..].chars().next() {
        idx += match c {
            '\\' => command(text, idx, out),
            '{' | '}' => 1,
            _ => {
                out.push(c);
                c.len_utf8()
            }
        };
    }
}

/// Handles the command starting at `start` (a backslash) and returns the
/// number of bytes consumed.
fn command(text: &str, start: usize, out: &mut String) -> usize {
    let rest = &text[start + 1..];
    let Some(next) = rest.chars().next() else {
        return 1;
    };

    if next == '\\' {
        out.push('\n');
        return 2 + absorbed_size_switch(&rest[1..]);
    }

    if ESCAPABLE.contains(&next) {
        out.push(next);
        return 2;
    }

    let name = letters(rest);
    if name.is_empty() {
        // Stray backslash; the following character is kept.
        return 1;
    }

    let after_name = start + 1 + name.len();
    if name == "newline" || is_size_switch(name) {
        out.push('\n');
        return after_name + spaces(&text[after_name..]) - start;
    }

    let arg_open = after_name + spaces(&text[after_name..]);
    if let Some(arg_close) = matching_close(text, arg_open, b'{', b'}') {
        clean_into(&text[arg_open + 1..arg_close], out);
        return arg_close + 1 - start;
    }

    after_name + spaces(&text[after_name..]) - start
}

/// Length of a size switch directly following a `\\` break, including the
/// spaces after it; 0 when there is none.
///
/// Both `\\small` and `\\ \small` forms are recognized.
fn absorbed_size_switch(after_break: &str) -> usize {
    let word = letters(after_break);
    if is_size_switch(word) {
        return word.len() + spaces(&after_break[word.len()..]);
    }

    let lead = spaces(after_break);
    let Some(command) = after_break[lead..].strip_prefix('\\') else {
        return 0;
    };
    let word = letters(command);
    if is_size_switch(word) {
        let consumed = lead + 1 + word.len();
        consumed + spaces(&after_break[consumed..])
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_plain_text_is_trimmed() {
        assert_eq!(clean_label("  Payments API  "), "Payments API");
    }

    #[test]
    fn test_decorations_keep_argument() {
        assert_eq!(clean_label(r"\textbf{Kubernetes}"), "Kubernetes");
        assert_eq!(clean_label(r"\textit{a} \texttt{b} \underline{c}"), "a b c");
        assert_eq!(clean_label(r"\textsc{x}\textrm{y}\textsf{z}\emph{w}"), "xyzw");
    }

    #[test]
    fn test_nested_arguments() {
        assert_eq!(clean_label(r"\textbf{\emph{Deep} Node}"), "Deep Node");
        assert_eq!(clean_label(r"\foo{a{b}c}"), "abc");
    }

    #[test]
    fn test_line_breaks() {
        assert_eq!(clean_label(r"Llama 3.1\\70B (vLLM)"), "Llama 3.1\n70B (vLLM)");
        assert_eq!(clean_label(r"a\newline b"), "a\nb");
        assert_eq!(clean_label(r"a \small b"), "a\nb");
    }

    #[test]
    fn test_size_switch_after_break_is_absorbed() {
        assert_eq!(clean_label(r"\textbf{GCP}\\small Compute"), "GCP\nCompute");
        assert_eq!(clean_label(r"GCP\\ \footnotesize Compute"), "GCP\nCompute");
        assert_eq!(clean_label(r"GCP\\\tiny Compute"), "GCP\nCompute");
    }

    #[test]
    fn test_word_after_break_that_is_not_a_switch() {
        assert_eq!(clean_label(r"A\\smallest"), "A\nsmallest");
    }

    #[test]
    fn test_bare_commands_removed() {
        assert_eq!(clean_label(r"\centering Gateway"), "Gateway");
        assert_eq!(clean_label(r"a \quad b"), "a b");
    }

    #[test]
    fn test_escapes() {
        assert_eq!(clean_label(r"\{x\} \#1 \$5 a\_b"), "{x} #1 $5 a_b");
    }

    #[test]
    fn test_braces_and_stray_backslashes() {
        assert_eq!(clean_label(r"{grouped} text\"), "grouped text");
        assert_eq!(clean_label(r"a\,b"), "a,b");
    }

    #[test]
    fn test_unbalanced_argument_does_not_panic() {
        assert_eq!(clean_label(r"\textbf{open"), "open");
    }

    #[test]
    fn test_unicode() {
        assert_eq!(clean_label(r"\textbf{阿里云}\\small Alibaba"), "阿里云\nAlibaba");
    }

    #[test]
    fn test_empty_lines_trimmed_at_edges() {
        assert_eq!(clean_label(r"\\ A \\"), "A");
    }

    proptest! {
        #[test]
        fn prop_clean_label_never_panics(raw in "\\PC{0,64}") {
            let _ = clean_label(&raw);
        }

        #[test]
        fn prop_clean_label_is_idempotent_on_plain_text(raw in "[a-zA-Z0-9 ]{0,40}") {
            let once = clean_label(&raw);
            prop_assert_eq!(clean_label(&once), once.clone());
        }
    }
}
