#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use pretty_assertions::assert_eq;

/// Feed `text` and return how many bytes the scanner consumed.
fn consumed(text: &str) -> (usize, StringScanner) {
    let mut scanner = StringScanner::new();
    let mut len = 0;
    for c in text.chars() {
        match scanner.feed(c) {
            Feed::Accept => len += c.len_utf8(),
            Feed::Done => {
                len += c.len_utf8();
                break;
            }
            Feed::Stop => break,
        }
    }
    (len, scanner)
}

#[test]
fn single_line_styles() {
    let (len, scanner) = consumed("\"abc\" + 1");
    assert_eq!(len, 5);
    assert!(scanner.is_terminated());
    assert_eq!(scanner.style(), StringStyle::Double);

    let (len, scanner) = consumed("'it\\'s'");
    assert_eq!(len, 7);
    assert_eq!(scanner.style(), StringStyle::Single);
}

#[test]
fn empty_string_is_complete_without_consuming_next_char() {
    let (len, scanner) = consumed("\"\")");
    assert_eq!(len, 2);
    assert!(scanner.is_terminated());
}

#[test]
fn triple_quoted_spans_lines() {
    let text = "\"\"\"line one\nline \"two\"\n\"\"\" tail";
    let (len, scanner) = consumed(text);
    assert_eq!(&text[..len], "\"\"\"line one\nline \"two\"\n\"\"\"");
    assert!(scanner.is_multiline());
    assert_eq!(scanner.style(), StringStyle::TripleDouble);
}

#[test]
fn newline_ends_unterminated_single_line_string() {
    let (len, scanner) = consumed("\"open\nnext");
    assert_eq!(len, 5);
    assert!(!scanner.is_terminated());
}

#[test]
fn escaped_newline_continues_single_line_string() {
    let (len, scanner) = consumed("\"a\\\nb\"");
    assert_eq!(len, 6);
    assert!(scanner.is_terminated());
}

#[test]
fn prefixes() {
    let (_, scanner) = consumed("&\"name\"");
    assert_eq!(scanner.prefix(), StringPrefix::StringName);
    let (_, scanner) = consumed("^\"path/to\"");
    assert_eq!(scanner.prefix(), StringPrefix::NodePath);
    let (len, scanner) = consumed("&x");
    assert_eq!(len, 1);
    assert!(!scanner.is_terminated());
}

#[test]
fn values() {
    assert_eq!(string_value("\"a\\tb\\n\"").unwrap(), "a\tb\n");
    assert_eq!(string_value("'\\u00e9t\\u00e9'").unwrap(), "été");
    assert_eq!(string_value("\"\\U01F600\"").unwrap(), "\u{1F600}");
    assert_eq!(string_value("'''multi\nline'''").unwrap(), "multi\nline");
    assert_eq!(string_value("&\"sig\"").unwrap(), "sig");
    assert_eq!(string_value("\"joined \\\nline\"").unwrap(), "joined line");
    assert_eq!(string_value("\"\"").unwrap(), "");
}

#[test]
fn value_errors() {
    assert_eq!(
        string_value("\"open"),
        Err(LiteralError::UnterminatedString("\"open".into()))
    );
    assert_eq!(
        string_value("\"a\" extra"),
        Err(LiteralError::MalformedString("\"a\" extra".into()))
    );
    assert_eq!(string_value("\"\\q\""), Err(LiteralError::InvalidEscape('q')));
    assert!(matches!(
        string_value("\"\\u12\""),
        Err(LiteralError::InvalidUnicodeEscape(_))
    ));
}

#[test]
fn quoting_inverts_unescaping() {
    for (value, style) in [
        ("plain", StringStyle::Double),
        ("say \"hi\"\n", StringStyle::Double),
        ("it's", StringStyle::Single),
        ("back\\slash\r", StringStyle::TripleSingle),
        ("two\nlines", StringStyle::TripleDouble),
    ] {
        let text = quote_string(value, style, StringPrefix::None);
        assert_eq!(string_value(&text).unwrap(), value, "through {text:?}");
    }
    assert_eq!(
        quote_string("n", StringStyle::Double, StringPrefix::StringName),
        "&\"n\""
    );
}
