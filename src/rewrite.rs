//! Named-parameter rewriting: translates `:name` placeholders in caller-supplied SQL into
//! the driver's native positional form, while passing quoted string literals through
//! verbatim.

/// The driver-native placeholder form a rewritten query should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderStyle {
    /// Emit `$1`, `$2`, ... (PostgreSQL-style).
    Dollar,
    /// Emit a single `?` for every occurrence (ODBC/MySQL-style).
    QuestionMark,
    /// Do not rewrite at all; the driver understands `:name` natively (Oracle-style). The
    /// scanner still runs, to produce the captured name list, but the emitted text is
    /// byte-identical to the input.
    Native,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Normal,
    InsideQuote,
    InsideName,
}

/// Scans `sql` for `:name` placeholders and rewrites them to `style`'s positional form.
///
/// Returns the rewritten query text and the ordered list of captured parameter names (one
/// entry per placeholder occurrence; a name reused several times appears several times).
///
/// The scanner is a three-state machine: `Normal`, `InsideQuote`, `InsideName`. A colon
/// outside a quoted region opens `InsideName`; while inside a name, ASCII alphanumerics
/// and underscores accumulate into the name, and any other character closes it (without
/// being consumed twice -- the closing character is re-processed in `Normal` state). A
/// name that reaches end of input is accepted.
///
/// Quoted regions (delimited by `'`) are passed through verbatim, including any `:` they
/// contain. Note: a doubled single quote `''` inside a string literal is *not* treated as
/// an escape by this scanner -- the first `'` after entering `InsideQuote` always closes
/// the quoted region, exactly as observed in the system this core was modeled on. This is
/// documented behavior, not an oversight; see `DESIGN.md`.
pub fn rewrite_named_params(sql: &str, style: PlaceholderStyle) -> (String, Vec<String>) {
    let mut out = String::with_capacity(sql.len());
    let mut names = Vec::new();
    let mut state = ScanState::Normal;
    let mut current_name = String::new();

    let mut flush_name = |out: &mut String, names: &mut Vec<String>, name: String| {
        emit_placeholder(out, style, names.len() + 1, &name);
        names.push(name);
    };

    for c in sql.chars() {
        match state {
            ScanState::Normal => {
                if c == '\'' {
                    state = ScanState::InsideQuote;
                    out.push(c);
                } else if c == ':' {
                    state = ScanState::InsideName;
                    current_name.clear();
                } else {
                    out.push(c);
                }
            }
            ScanState::InsideQuote => {
                out.push(c);
                if c == '\'' {
                    state = ScanState::Normal;
                }
            }
            ScanState::InsideName => {
                if c.is_ascii_alphanumeric() || c == '_' {
                    current_name.push(c);
                } else {
                    flush_name(&mut out, &mut names, std::mem::take(&mut current_name));
                    state = ScanState::Normal;
                    // Re-process `c` in `Normal` state.
                    match c {
                        '\'' => {
                            state = ScanState::InsideQuote;
                            out.push(c);
                        }
                        ':' => {
                            state = ScanState::InsideName;
                        }
                        _ => out.push(c),
                    }
                }
            }
        }
    }
    if state == ScanState::InsideName {
        flush_name(&mut out, &mut names, current_name);
    }

    (out, names)
}

/// Convenience for [`PlaceholderStyle::Native`], since that style needs no explicit
/// `PlaceholderStyle` argument at call sites that always target an Oracle-style driver.
pub fn rewrite_named_params_native(sql: &str) -> (String, Vec<String>) {
    rewrite_named_params(sql, PlaceholderStyle::Native)
}

fn emit_placeholder(out: &mut String, style: PlaceholderStyle, position: usize, name: &str) {
    match style {
        PlaceholderStyle::Dollar => {
            out.push('$');
            out.push_str(&position.to_string());
        }
        PlaceholderStyle::QuestionMark => out.push('?'),
        PlaceholderStyle::Native => {
            out.push(':');
            out.push_str(name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(PlaceholderStyle::Dollar, "select a from t where n = $1 and m = $2"; "PostgreSQL-style dollar placeholders")]
    #[test_case(PlaceholderStyle::QuestionMark, "select a from t where n = ? and m = ?"; "ODBC-style question mark placeholders")]
    fn rewrite_by_driver_style(style: PlaceholderStyle, expected: &str) {
        let (rewritten, names) =
            rewrite_named_params("select a from t where n = :foo and m = :bar", style);
        assert_eq!(rewritten, expected);
        assert_eq!(names, vec!["foo".to_string(), "bar".to_string()]);
    }

    #[test]
    fn quoted_literal_passes_through_unchanged() {
        let (rewritten, names) =
            rewrite_named_params("select ':foo' from t where n = :foo", PlaceholderStyle::Dollar);
        assert_eq!(rewritten, "select ':foo' from t where n = $1");
        assert_eq!(names, vec!["foo".to_string()]);
    }

    #[test]
    fn name_reused_becomes_distinct_positions() {
        let (rewritten, names) =
            rewrite_named_params("where a = :x or b = :x", PlaceholderStyle::Dollar);
        assert_eq!(rewritten, "where a = $1 or b = $2");
        assert_eq!(names, vec!["x".to_string(), "x".to_string()]);
    }

    #[test]
    fn name_at_end_of_input_is_accepted() {
        let (rewritten, names) = rewrite_named_params("select :x", PlaceholderStyle::QuestionMark);
        assert_eq!(rewritten, "select ?");
        assert_eq!(names, vec!["x".to_string()]);
    }

    #[test]
    fn rewrite_is_idempotent_without_colons() {
        let (first, _) = rewrite_named_params("select a, b from t", PlaceholderStyle::Dollar);
        let (second, names) = rewrite_named_params(&first, PlaceholderStyle::Dollar);
        assert_eq!(first, second);
        assert!(names.is_empty());
    }

    #[test]
    fn doubled_single_quote_is_not_an_escape() {
        // The scanner closes the quoted region at the very first `'`, so `it''s` is read
        // as the literal `'it'` followed by a bare `'s'` that re-enters a new quoted
        // region (left unterminated here, which is a property of the input, not the
        // scanner: the caller is responsible for supplying a validly quoted SQL string).
        let (rewritten, names) = rewrite_named_params("select 'it''s :x'", PlaceholderStyle::Dollar);
        assert_eq!(rewritten, "select 'it''s :x'");
        assert!(names.is_empty());
    }

    #[test]
    fn native_style_leaves_text_untouched() {
        let sql = "select a from t where n = :foo and m = :bar";
        let (rewritten, names) = rewrite_native(sql);
        assert_eq!(rewritten, sql);
        assert_eq!(names, vec!["foo".to_string(), "bar".to_string()]);
    }

    fn rewrite_native(sql: &str) -> (String, Vec<String>) {
        super::rewrite_named_params_native(sql)
    }
}
