use crate::error::CaptureError;
use crate::value::TypedValue;

/// Number of values a pattern consumes.
///
/// `%%` is a literal percent and never counts. Any other `%` counts once,
/// including one dangling at the end of the pattern. Pairing is greedy
/// left-to-right, so `%%%` is one escape followed by one placeholder.
pub fn count_placeholders(pattern: &str) -> usize {
    let bytes = pattern.as_bytes();
    let mut count = 0;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            if bytes.get(i + 1) == Some(&b'%') {
                i += 2;
            } else {
                count += 1;
                i += 1;
            }
        } else {
            i += 1;
        }
    }
    count
}

/// Substitutes `values` into `pattern` in capture order and returns the
/// rendered line, newline-terminated.
///
/// The arity check runs before any substitution: an over- or under-supplied
/// value list fails without producing partial output.
pub fn render(pattern: &str, values: &[TypedValue]) -> Result<String, CaptureError> {
    let expected = count_placeholders(pattern);
    if values.len() != expected {
        return Err(CaptureError::ArityMismatch {
            expected,
            got: values.len(),
        });
    }

    let bytes = pattern.as_bytes();
    let mut out = String::with_capacity(pattern.len() + 16);
    let mut next = values.iter();
    let mut i = 0;
    while i < bytes.len() {
        // `%` is ASCII, so these offsets always land on char boundaries.
        let Some(off) = pattern[i..].find('%') else {
            out.push_str(&pattern[i..]);
            break;
        };
        out.push_str(&pattern[i..i + off]);
        i += off;
        if bytes.get(i + 1) == Some(&b'%') {
            out.push('%');
            i += 2;
        } else {
            // arity was validated up front, so a value is always left
            if let Some(value) = next.next() {
                out.push_str(&value.to_string());
            }
            i += 1;
        }
    }
    out.push('\n');
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_single_placeholders() {
        assert_eq!(count_placeholders(""), 0);
        assert_eq!(count_placeholders("no placeholders"), 0);
        assert_eq!(count_placeholders("x=%"), 1);
        assert_eq!(count_placeholders("%, %, %"), 3);
    }

    #[test]
    fn escapes_never_count() {
        assert_eq!(count_placeholders("rate: 100%%"), 0);
        assert_eq!(count_placeholders("%%%%"), 0);
    }

    #[test]
    fn pairing_is_greedy_left_to_right() {
        // escaped pair first, then one trailing placeholder
        assert_eq!(count_placeholders("%%%"), 1);
        assert_eq!(count_placeholders("%%%%%"), 1);
    }

    #[test]
    fn dangling_percent_counts() {
        assert_eq!(count_placeholders("ends with %"), 1);
        assert_eq!(count_placeholders("%"), 1);
    }

    #[test]
    fn substitutes_in_capture_order() {
        let out = render(
            "count=%, ok=%",
            &[TypedValue::I32(5), TypedValue::Bool(true)],
        )
        .unwrap();
        assert_eq!(out, "count=5, ok=true\n");
    }

    #[test]
    fn escaped_percent_consumes_no_value() {
        assert_eq!(render("rate: 100%%", &[]).unwrap(), "rate: 100%\n");
        assert_eq!(render("%%%%", &[]).unwrap(), "%%\n");
        assert_eq!(
            render("%%%", &[TypedValue::I32(3)]).unwrap(),
            "%3\n"
        );
    }

    #[test]
    fn zero_placeholders_pass_the_pattern_through() {
        assert_eq!(
            render("no placeholders", &[]).unwrap(),
            "no placeholders\n"
        );
    }

    #[test]
    fn empty_pattern_renders_a_bare_newline() {
        assert_eq!(render("", &[]).unwrap(), "\n");
    }

    #[test]
    fn under_supplied_values_fail_before_substitution() {
        let err = render("x=%", &[]).unwrap_err();
        assert_eq!(
            err,
            CaptureError::ArityMismatch {
                expected: 1,
                got: 0
            }
        );
    }

    #[test]
    fn over_supplied_values_fail_before_substitution() {
        let err = render("no placeholders", &[TypedValue::I32(1)]).unwrap_err();
        assert_eq!(
            err,
            CaptureError::ArityMismatch {
                expected: 0,
                got: 1
            }
        );
    }

    #[test]
    fn unsigned_max_renders_unsigned() {
        let out = render("big=%", &[TypedValue::U64(u64::MAX)]).unwrap();
        assert_eq!(out, "big=18446744073709551615\n");
    }

    #[test]
    fn multibyte_literals_copy_through() {
        let out = render("héllo % wörld", &[TypedValue::I64(-42)]).unwrap();
        assert_eq!(out, "héllo -42 wörld\n");
    }

    #[test]
    fn dangling_placeholder_consumes_the_last_value() {
        let out = render("n=%", &[TypedValue::U32(7)]).unwrap();
        assert_eq!(out, "n=7\n");
    }
}
