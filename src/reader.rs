// ABOUTME: Incremental reader turning Lisp source text into Values, one at a time

use nom::{
    branch::alt,
    bytes::complete::{escaped, tag, take_while1},
    character::complete::{char, digit1, multispace1, none_of, one_of},
    combinator::{opt, recognize, value},
    multi::many0,
    IResult, Parser,
};

use crate::error::EvalError;
use crate::value::Value;

fn parse_comment(input: &str) -> IResult<&str, ()> {
    let (input, _) = char(';')(input)?;
    let (input, _) = nom::bytes::complete::take_while(|c| c != '\n')(input)?;
    Ok((input, ()))
}

fn ws_and_comments(input: &str) -> IResult<&str, ()> {
    many0(alt((value((), multispace1), parse_comment)))
        .map(|_| ())
        .parse(input)
}

/// Integers and floats share a lexical grammar (digits, optional sign,
/// optional fractional part); the presence of a `.` decides which `Value`
/// variant comes out.
fn parse_number(input: &str) -> IResult<&str, Value> {
    let (rest, text) = recognize((
        opt(char('-')),
        alt((
            recognize((digit1, opt((char('.'), opt(digit1))))),
            recognize((char('.'), digit1)),
        )),
    ))
    .parse(input)?;

    if text.contains('.') {
        let n: f64 = text.parse().expect("validated float literal");
        Ok((rest, Value::Float(n)))
    } else {
        match text.parse::<i64>() {
            Ok(n) => Ok((rest, Value::Integer(n))),
            Err(_) => {
                let n: f64 = text.parse().expect("validated numeric literal");
                Ok((rest, Value::Float(n)))
            }
        }
    }
}

fn parse_bool(input: &str) -> IResult<&str, Value> {
    alt((
        value(Value::Boolean(true), tag("#t")),
        value(Value::Boolean(false), tag("#f")),
    ))
    .parse(input)
}

fn parse_symbol(input: &str) -> IResult<&str, Value> {
    let (input, first) =
        one_of("abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ+-*/%<>=!?")(input)?;
    let (input, rest) = take_while1::<_, _, nom::error::Error<_>>(|c: char| {
        c.is_alphanumeric() || "-_?!<>=+*/%".contains(c)
    })(input)
    .unwrap_or((input, ""));

    let mut name = String::new();
    name.push(first);
    name.push_str(rest);
    Ok((input, Value::symbol(&name)))
}

fn parse_string(input: &str) -> IResult<&str, Value> {
    let (input, _) = char('"')(input)?;
    if let Ok((input, _)) = char::<_, nom::error::Error<_>>('"')(input) {
        return Ok((input, Value::string("")));
    }

    let (input, content) = escaped(none_of("\"\\"), '\\', one_of("\"\\nt"))(input)?;
    let (input, _) = char('"')(input)?;

    let mut out = String::new();
    let mut chars = content.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('\\') => out.push('\\'),
                Some('"') => out.push('"'),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }

    Ok((input, Value::string(out)))
}

fn wrap(keyword_name: &str, expr: Value) -> Value {
    Value::list(vec![Value::symbol(keyword_name), expr])
}

fn parse_quote(input: &str) -> IResult<&str, Value> {
    let (input, _) = char('\'')(input)?;
    let (input, expr) = parse_expr(input)?;
    Ok((input, wrap("quote", expr)))
}

fn parse_quasiquote(input: &str) -> IResult<&str, Value> {
    let (input, _) = char('`')(input)?;
    let (input, expr) = parse_expr(input)?;
    Ok((input, wrap("quasiquote", expr)))
}

fn parse_unquote(input: &str) -> IResult<&str, Value> {
    let (input, _) = char(',')(input)?;
    if let Ok((input, _)) = char::<_, nom::error::Error<_>>('@')(input) {
        let (input, expr) = parse_expr(input)?;
        Ok((input, wrap("unquote-splicing", expr)))
    } else {
        let (input, expr) = parse_expr(input)?;
        Ok((input, wrap("unquote", expr)))
    }
}

fn parse_list(input: &str) -> IResult<&str, Value> {
    let (input, _) = char('(')(input)?;
    let (mut remaining, _) = ws_and_comments(input)?;

    let mut items = Vec::new();
    loop {
        if let Ok((rest, _)) = char::<_, nom::error::Error<_>>(')')(remaining) {
            return Ok((rest, Value::list(items)));
        }
        if remaining.is_empty() {
            return Err(nom::Err::Error(nom::error::Error::new(
                remaining,
                nom::error::ErrorKind::Eof,
            )));
        }
        let (rest, expr) = parse_expr(remaining)?;
        items.push(expr);
        let (rest, _) = ws_and_comments(rest)?;
        remaining = rest;
    }
}

fn parse_expr(input: &str) -> IResult<&str, Value> {
    let (input, _) = ws_and_comments(input)?;
    alt((
        parse_quote,
        parse_quasiquote,
        parse_unquote,
        parse_list,
        parse_bool,
        parse_number,
        parse_string,
        parse_symbol,
    ))
    .parse(input)
}

/// Reads one top-level form at a time out of a borrowed source buffer,
/// returning [`Value::EndOfInput`] once nothing but whitespace/comments
/// remains. Holding the whole source in memory keeps the combinator grammar
/// simple while still giving callers (the REPL, `Evaluate`) one-form-at-a-time
/// semantics instead of requiring every form up front.
pub struct Reader<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(source: &'a str) -> Reader<'a> {
        Reader { source, pos: 0 }
    }

    pub fn read(&mut self) -> Result<Value, EvalError> {
        let remaining = &self.source[self.pos..];
        let (after_ws, _) = ws_and_comments(remaining)
            .map_err(|e| EvalError::SyntaxError(format!("{e:?}")))?;
        if after_ws.is_empty() {
            self.pos = self.source.len();
            return Ok(Value::EndOfInput);
        }

        match parse_expr(remaining) {
            Ok((rest, value)) => {
                self.pos = self.source.len() - rest.len();
                Ok(value)
            }
            Err(e) => Err(EvalError::SyntaxError(format!("{e:?}"))),
        }
    }
}

/// Convenience for callers that just want the single value an entire
/// string boils down to (used by `Expand`'s macro-body re-reads are not
/// needed here; this is for tests and `define-macro` fixtures).
pub fn read_one(source: &str) -> Result<Value, EvalError> {
    let mut reader = Reader::new(source);
    match reader.read()? {
        Value::EndOfInput => Err(EvalError::SyntaxError("no expression to read".into())),
        value => Ok(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_integers_and_floats_as_distinct_variants() {
        assert!(matches!(read_one("42"), Ok(Value::Integer(42))));
        assert!(matches!(read_one("-42"), Ok(Value::Integer(-42))));
        assert!(matches!(read_one("2.5"), Ok(Value::Float(n)) if (n - 2.5).abs() < 1e-9));
        assert!(matches!(read_one("42."), Ok(Value::Float(n)) if (n - 42.0).abs() < 1e-9));
    }

    #[test]
    fn reads_booleans() {
        assert!(matches!(read_one("#t"), Ok(Value::Boolean(true))));
        assert!(matches!(read_one("#f"), Ok(Value::Boolean(false))));
    }

    #[test]
    fn reads_symbols() {
        match read_one("foo-bar?").unwrap() {
            Value::Symbol(s) => assert_eq!(&*s.name(), "foo-bar?"),
            other => panic!("expected symbol, got {other:?}"),
        }
    }

    #[test]
    fn reads_strings_with_escapes() {
        match read_one(r#""hello\nworld""#).unwrap() {
            Value::String(s) => assert_eq!(&*s, "hello\nworld"),
            other => panic!("expected string, got {other:?}"),
        }
    }

    #[test]
    fn empty_list_reads_as_empty_list_not_unit() {
        let v = read_one("()").unwrap();
        assert_eq!(v.as_list().unwrap().len(), 0);
        assert!(!matches!(v, Value::Unit));
    }

    #[test]
    fn reads_nested_lists() {
        let v = read_one("(1 (2 3) 4)").unwrap();
        assert_eq!(v.as_list().unwrap().len(), 3);
    }

    #[test]
    fn quote_family_rewrites_to_forms() {
        assert_eq!(format!("{}", read_one("'x").unwrap()), "(quote x)");
        assert_eq!(format!("{}", read_one("`x").unwrap()), "(quasiquote x)");
        assert_eq!(format!("{}", read_one(",x").unwrap()), "(unquote x)");
        assert_eq!(
            format!("{}", read_one(",@x").unwrap()),
            "(unquote-splicing x)"
        );
    }

    #[test]
    fn unterminated_list_is_a_syntax_error() {
        assert!(read_one("(1 2").is_err());
    }

    #[test]
    fn reader_yields_end_of_input_once_exhausted() {
        let mut reader = Reader::new("1 2");
        assert!(matches!(reader.read(), Ok(Value::Integer(1))));
        assert!(matches!(reader.read(), Ok(Value::Integer(2))));
        assert!(matches!(reader.read(), Ok(Value::EndOfInput)));
        assert!(matches!(reader.read(), Ok(Value::EndOfInput)));
    }

    #[test]
    fn reader_reads_multiple_top_level_forms_across_whitespace_and_comments() {
        let mut reader = Reader::new("(define x 1) ; comment\n(define y 2)");
        let first = reader.read().unwrap();
        assert_eq!(first.as_list().unwrap().len(), 3);
        let second = reader.read().unwrap();
        assert_eq!(second.as_list().unwrap().len(), 3);
        assert!(matches!(reader.read(), Ok(Value::EndOfInput)));
    }
}
