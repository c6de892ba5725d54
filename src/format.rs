//! Positional message formatting.
//!
//! Patterns use numbered placeholders (`{0}`, `{1,number}`,
//! `{2,number,integer}`) and single-quote escaping: text between single
//! quotes is literal, `''` is one apostrophe. Formatting never fails.
//! Malformed elements are emitted verbatim, a placeholder with no matching
//! argument renders as `{index}`, and non-numeric arguments under a
//! `number` hint fall back to their plain text form. Degrading beats
//! panicking inside message rendering.

use std::fmt;
use std::str::CharIndices;

/// One positional argument.
#[derive(Debug, Clone, PartialEq)]
pub enum FormatArg {
    Str(String),
    Int(i64),
    Float(f64),
}

impl fmt::Display for FormatArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatArg::Str(value) => f.write_str(value),
            FormatArg::Int(value) => write!(f, "{}", value),
            FormatArg::Float(value) => write!(f, "{}", value),
        }
    }
}

impl From<&str> for FormatArg {
    fn from(value: &str) -> FormatArg {
        FormatArg::Str(value.to_string())
    }
}

impl From<String> for FormatArg {
    fn from(value: String) -> FormatArg {
        FormatArg::Str(value)
    }
}

impl From<i32> for FormatArg {
    fn from(value: i32) -> FormatArg {
        FormatArg::Int(value.into())
    }
}

impl From<i64> for FormatArg {
    fn from(value: i64) -> FormatArg {
        FormatArg::Int(value)
    }
}

impl From<u32> for FormatArg {
    fn from(value: u32) -> FormatArg {
        FormatArg::Int(value.into())
    }
}

impl From<f32> for FormatArg {
    fn from(value: f32) -> FormatArg {
        FormatArg::Float(value.into())
    }
}

impl From<f64> for FormatArg {
    fn from(value: f64) -> FormatArg {
        FormatArg::Float(value)
    }
}

/// Substitute `args` into `pattern`.
pub fn format_pattern(pattern: &str, args: &[FormatArg]) -> String {
    let mut out = String::with_capacity(pattern.len() + 16);
    let mut iter = pattern.char_indices();

    while let Some((start, ch)) = iter.next() {
        match ch {
            '\'' => {
                if let Some((_, '\'')) = iter.clone().next() {
                    out.push('\'');
                    iter.next();
                } else {
                    consume_quoted_span(&mut out, &mut iter);
                }
            }
            '{' => {
                let body_start = start + 1;
                let mut depth = 1;
                let mut body_end = None;
                for (idx, inner) in iter.by_ref() {
                    match inner {
                        '{' => depth += 1,
                        '}' => {
                            depth -= 1;
                            if depth == 0 {
                                body_end = Some(idx);
                                break;
                            }
                        }
                        _ => {}
                    }
                }

                match body_end {
                    Some(end) => {
                        let body = &pattern[body_start..end];
                        match render_element(body, args) {
                            Some(rendered) => out.push_str(&rendered),
                            None => {
                                out.push('{');
                                out.push_str(body);
                                out.push('}');
                            }
                        }
                    }
                    None => {
                        // Unmatched brace, the rest of the pattern is literal.
                        out.push_str(&pattern[start..]);
                        break;
                    }
                }
            }
            _ => out.push(ch),
        }
    }

    out
}

/// Copy a quoted span verbatim. `''` inside the span is one apostrophe and
/// keeps the span open; an unterminated span runs to the end of the
/// pattern.
fn consume_quoted_span(out: &mut String, iter: &mut CharIndices) {
    while let Some((_, ch)) = iter.next() {
        if ch != '\'' {
            out.push(ch);
            continue;
        }
        if let Some((_, '\'')) = iter.clone().next() {
            out.push('\'');
            iter.next();
        } else {
            return;
        }
    }
}

/// Render one `index[,kind[,style]]` element. `None` means the element is
/// malformed and should be emitted verbatim.
fn render_element(body: &str, args: &[FormatArg]) -> Option<String> {
    let mut parts = body.splitn(3, ',');
    let index: usize = parts.next()?.parse().ok()?;
    let kind = parts.next().map(str::trim);
    let style = parts.next().map(str::trim);

    let arg = match args.get(index) {
        Some(arg) => arg,
        // No argument supplied for this index: keep the element visible.
        None => return Some(format!("{{{}}}", index)),
    };

    Some(match kind {
        Some("number") => format_number(arg, style),
        _ => arg.to_string(),
    })
}

fn format_number(arg: &FormatArg, style: Option<&str>) -> String {
    let integer_only = matches!(style, Some("integer"));

    match arg {
        FormatArg::Int(value) => group_signed(&value.to_string()),
        FormatArg::Float(value) => {
            if integer_only {
                group_signed(&(value.trunc() as i64).to_string())
            } else {
                // Round to at most three fraction digits, then drop
                // trailing zeros the way default decimal formatting does.
                let fixed = format!("{:.3}", value);
                let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
                match trimmed.split_once('.') {
                    Some((integer, fraction)) => {
                        format!("{}.{}", group_signed(integer), fraction)
                    }
                    None => group_signed(trimmed),
                }
            }
        }
        FormatArg::Str(value) => value.clone(),
    }
}

fn group_signed(value: &str) -> String {
    let (sign, digits) = match value.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", value),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return value.to_string();
    }
    format!("{}{}", sign, group_digits(digits))
}

fn group_digits(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    let len = digits.len();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn args(values: &[FormatArg]) -> Vec<FormatArg> {
        values.to_vec()
    }

    // ==================== Substitution Tests ====================

    #[test]
    fn test_plain_substitution() {
        let result = format_pattern("Hello, {0}!", &args(&["world".into()]));
        assert_eq!(result, "Hello, world!");
    }

    #[test]
    fn test_multiple_and_repeated_placeholders() {
        let result = format_pattern(
            "{0} and {1} and {0}",
            &args(&["a".into(), "b".into()]),
        );
        assert_eq!(result, "a and b and a");
    }

    #[test]
    fn test_missing_argument_keeps_element() {
        let result = format_pattern("value: {1}", &args(&["only".into()]));
        assert_eq!(result, "value: {1}");
    }

    #[test]
    fn test_missing_argument_drops_style() {
        let result = format_pattern("{2,number,integer}", &[]);
        assert_eq!(result, "{2}");
    }

    #[test]
    fn test_no_placeholders() {
        assert_eq!(format_pattern("static text", &[]), "static text");
    }

    #[test]
    fn test_empty_pattern() {
        assert_eq!(format_pattern("", &args(&["x".into()])), "");
    }

    // ==================== Number Formatting Tests ====================

    #[test]
    fn test_number_grouping() {
        let result = format_pattern("{0,number}", &args(&[1234567.into()]));
        assert_eq!(result, "1,234,567");
    }

    #[test]
    fn test_number_small_values_ungrouped() {
        assert_eq!(format_pattern("{0,number}", &args(&[3.into()])), "3");
        assert_eq!(format_pattern("{0,number}", &args(&[123.into()])), "123");
    }

    #[test]
    fn test_number_negative() {
        let result = format_pattern("{0,number}", &args(&[(-1234).into()]));
        assert_eq!(result, "-1,234");
    }

    #[test]
    fn test_number_float_rounds_to_three_digits() {
        let result = format_pattern("{0,number}", &args(&[1234.5678.into()]));
        assert_eq!(result, "1,234.568");
    }

    #[test]
    fn test_number_float_trims_trailing_zeros() {
        assert_eq!(format_pattern("{0,number}", &args(&[2.5.into()])), "2.5");
        assert_eq!(format_pattern("{0,number}", &args(&[2.0.into()])), "2");
    }

    #[test]
    fn test_integer_style_truncates() {
        assert_eq!(
            format_pattern("{0,number,integer}", &args(&[3.9.into()])),
            "3"
        );
        assert_eq!(
            format_pattern("{0,number,integer}", &args(&[(-3.9).into()])),
            "-3"
        );
    }

    #[test]
    fn test_number_with_text_argument_degrades() {
        let result = format_pattern("{0,number}", &args(&["abc".into()]));
        assert_eq!(result, "abc");
    }

    #[test]
    fn test_unknown_kind_degrades_to_plain() {
        let result = format_pattern("{0,date}", &args(&["today".into()]));
        assert_eq!(result, "today");
    }

    #[test]
    fn test_plain_placeholder_with_int() {
        // No format hint means plain text rendering, without grouping.
        let result = format_pattern("{0}", &args(&[1234567.into()]));
        assert_eq!(result, "1234567");
    }

    // ==================== Malformed Element Tests ====================

    #[test]
    fn test_non_numeric_index_is_verbatim() {
        assert_eq!(format_pattern("{x}", &args(&["a".into()])), "{x}");
        assert_eq!(format_pattern("{}", &args(&["a".into()])), "{}");
    }

    #[test]
    fn test_unmatched_brace_is_verbatim() {
        let result = format_pattern("tail {0", &args(&["a".into()]));
        assert_eq!(result, "tail {0");
    }

    // ==================== Quote Tests ====================

    #[test]
    fn test_doubled_quote_is_literal_apostrophe() {
        let result = format_pattern("it''s {0}", &args(&["fine".into()]));
        assert_eq!(result, "it's fine");
    }

    #[test]
    fn test_quoted_span_suppresses_placeholder() {
        let result = format_pattern("literal '{0}' here", &args(&["x".into()]));
        assert_eq!(result, "literal {0} here");
    }

    #[test]
    fn test_unterminated_span_runs_to_end() {
        let result = format_pattern("don't use {0} here", &args(&["x".into()]));
        assert_eq!(result, "dont use {0} here");
    }

    #[test]
    fn test_doubled_quote_inside_span() {
        let result = format_pattern("'don''t {0}'", &args(&["x".into()]));
        assert_eq!(result, "don't {0}");
    }

    #[test]
    fn test_substitution_resumes_after_span() {
        let result = format_pattern("'{skip}' then {0}", &args(&["go".into()]));
        assert_eq!(result, "{skip} then go");
    }

    // ==================== Property Tests ====================

    proptest! {
        #![proptest_config(ProptestConfig { cases: 256, .. ProptestConfig::default() })]

        #[test]
        fn format_never_panics(pattern in ".*", count in 0usize..4) {
            let supplied: Vec<FormatArg> =
                (0..count).map(|i| FormatArg::Int(i as i64)).collect();
            let _ = format_pattern(&pattern, &supplied);
        }

        #[test]
        fn text_without_markup_passes_through(text in "[a-zA-Z0-9 .,;:!-]*") {
            prop_assert_eq!(format_pattern(&text, &[]), text);
        }
    }
}
