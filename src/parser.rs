// ABOUTME: Parser module — nom combinators turning Scheme source text into Expr trees
// ABOUTME: per spec §4.3's external parser contract (quote-family sugar, dotted pairs, typed literals)

use crate::value::Expr;
use nom::{
    branch::alt,
    bytes::complete::{escaped_transform, tag, take_while, take_while1},
    character::complete::{char, digit1, multispace1, none_of, one_of},
    combinator::{map, opt, recognize, value},
    multi::many0,
    IResult, Parser,
};

/// Skip whitespace and `;`-to-end-of-line comments.
fn ws(input: &str) -> IResult<&str, ()> {
    fn comment(input: &str) -> IResult<&str, ()> {
        let (input, _) = char(';')(input)?;
        let (input, _) = take_while(|c| c != '\n')(input)?;
        Ok((input, ()))
    }
    many0(alt((value((), multispace1), comment)))
        .map(|_| ())
        .parse(input)
}

fn parse_number(input: &str) -> IResult<&str, Expr> {
    let (rest, text) = recognize((
        opt(char('-')),
        alt((
            recognize((digit1, opt((char('.'), opt(digit1))))),
            recognize((char('.'), digit1)),
        )),
    ))
    .parse(input)?;

    if text.contains('.') {
        let n: f64 = text.parse().expect("nom recognized a valid float token");
        Ok((rest, Expr::Float(n)))
    } else {
        let n: i64 = text.parse().expect("nom recognized a valid integer token");
        Ok((rest, Expr::Integer(n)))
    }
}

fn parse_bool(input: &str) -> IResult<&str, Expr> {
    alt((
        value(Expr::Boolean(true), tag("#t")),
        value(Expr::Boolean(false), tag("#f")),
    ))
    .parse(input)
}

/// `#\a`, `#\space`, `#\newline`, `#\tab`.
fn parse_char(input: &str) -> IResult<&str, Expr> {
    let (input, _) = tag("#\\")(input)?;
    alt((
        value(Expr::Char(' '), tag("space")),
        value(Expr::Char('\n'), tag("newline")),
        value(Expr::Char('\t'), tag("tab")),
        map(nom::character::complete::anychar, Expr::Char),
    ))
    .parse(input)
}

const SYMBOL_CHARS: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789+-*/%<>=!?._:^&~$";

fn parse_symbol(input: &str) -> IResult<&str, Expr> {
    let (input, first) = one_of(
        "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ+-*/%<>=!?._:^&~$",
    )(input)?;
    let (input, rest) =
        take_while1::<_, _, nom::error::Error<_>>(|c: char| SYMBOL_CHARS.contains(c))(input)
            .unwrap_or((input, ""));

    let mut name = String::new();
    name.push(first);
    name.push_str(rest);
    Ok((input, Expr::symbol(name)))
}

fn parse_string(input: &str) -> IResult<&str, Expr> {
    let (input, _) = char('"')(input)?;
    if let Ok((input, _)) = char::<_, nom::error::Error<_>>('"')(input) {
        return Ok((input, Expr::string("")));
    }
    let (input, content) = opt(escaped_transform(
        none_of("\"\\"),
        '\\',
        alt((
            value('\\', char('\\')),
            value('"', char('"')),
            value('\n', char('n')),
            value('\t', char('t')),
        )),
    ))
    .parse(input)?;
    let (input, _) = char('"')(input)?;
    Ok((input, Expr::string(content.unwrap_or_default())))
}

fn quote_sugar(marker: &'static str, wrapper: &'static str) -> impl Fn(&str) -> IResult<&str, Expr> {
    move |input: &str| {
        let (input, _) = tag(marker)(input)?;
        let (input, expr) = parse_expr(input)?;
        Ok((input, Expr::new_proper_list(vec![Expr::symbol(wrapper), expr])))
    }
}

fn parse_unquote(input: &str) -> IResult<&str, Expr> {
    let (input, _) = char(',')(input)?;
    if let Ok((input, _)) = char::<_, nom::error::Error<_>>('@')(input) {
        let (input, expr) = parse_expr(input)?;
        return Ok((
            input,
            Expr::new_proper_list(vec![Expr::symbol("unquote-splicing"), expr]),
        ));
    }
    let (input, expr) = parse_expr(input)?;
    Ok((input, Expr::new_proper_list(vec![Expr::symbol("unquote"), expr])))
}

/// `(a b c)`, `(a b . c)`, and `()`.
fn parse_list(input: &str) -> IResult<&str, Expr> {
    let (input, _) = char('(')(input)?;
    let (mut input, _) = ws(input)?;

    let mut items = Vec::new();
    loop {
        if let Ok((rest, _)) = char::<_, nom::error::Error<_>>(')')(input) {
            return Ok((rest, Expr::new_proper_list(items)));
        }

        // A lone `.` token (dot followed by whitespace) marks a dotted tail;
        // `...` and other dot-leading symbols must not be mistaken for it.
        let starts_with_dot_token = input.starts_with('.')
            && input[1..]
                .chars()
                .next()
                .map_or(true, |c| c.is_whitespace() || c == '(');
        if starts_with_dot_token {
            let (rest, _) = char('.')(input)?;
            let (rest, _) = ws(rest)?;
            let (rest, tail) = parse_expr(rest)?;
            let (rest, _) = ws(rest)?;
            let (rest, _) = char(')')(rest)?;
            return Ok((rest, Expr::new_dotted_list(items, tail)));
        }

        let (rest, item) = parse_expr(input)?;
        items.push(item);
        let (rest, _) = ws(rest)?;
        input = rest;
    }
}

fn parse_expr(input: &str) -> IResult<&str, Expr> {
    let (input, _) = ws(input)?;
    alt((
        quote_sugar("'", "quote"),
        quote_sugar("`", "quasiquote"),
        parse_unquote,
        parse_list,
        parse_char,
        parse_bool,
        parse_number,
        parse_string,
        parse_symbol,
    ))
    .parse(input)
}

/// Parses exactly one top-level form, returning it and the unconsumed input.
pub fn parse_one(input: &str) -> Result<(Expr, &str), String> {
    let (rest, _) = ws(input).map_err(|e| format!("parse error: {e:?}"))?;
    if rest.is_empty() {
        return Err("no expression to parse".to_string());
    }
    parse_expr(rest)
        .map(|(rest, expr)| (expr, rest))
        .map_err(|e| format!("parse error: {e:?}"))
}

/// Parses every top-level form in `source`, in order (spec §4.3).
pub fn parse_all(source: &str) -> Result<Vec<Expr>, String> {
    let mut forms = Vec::new();
    let mut remaining = source;
    loop {
        let (rest, _) = ws(remaining).map_err(|e| format!("parse error: {e:?}"))?;
        if rest.is_empty() {
            return Ok(forms);
        }
        let (expr, rest) = parse_one(rest)?;
        forms.push(expr);
        remaining = rest;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Expr {
        let (expr, rest) = parse_one(input).unwrap();
        assert!(rest.trim().is_empty(), "unexpected trailing input: {rest:?}");
        expr
    }

    #[test]
    fn integers_and_floats_are_distinguished() {
        assert!(matches!(parse("42"), Expr::Integer(42)));
        assert!(matches!(parse("-42"), Expr::Integer(-42)));
        assert!(matches!(parse("3.14"), Expr::Float(n) if (n - 3.14).abs() < 1e-9));
        assert!(matches!(parse(".5"), Expr::Float(n) if n == 0.5));
    }

    #[test]
    fn booleans() {
        assert!(matches!(parse("#t"), Expr::Boolean(true)));
        assert!(matches!(parse("#f"), Expr::Boolean(false)));
    }

    #[test]
    fn char_literals() {
        assert!(matches!(parse("#\\a"), Expr::Char('a')));
        assert!(matches!(parse("#\\space"), Expr::Char(' ')));
        assert!(matches!(parse("#\\newline"), Expr::Char('\n')));
    }

    #[test]
    fn symbols_including_scheme_punctuation() {
        assert_eq!(parse("foo-bar?").as_symbol(), Some("foo-bar?"));
        assert_eq!(parse("set!").as_symbol(), Some("set!"));
        assert_eq!(parse("string->symbol").as_symbol(), Some("string->symbol"));
        assert_eq!(parse("+").as_symbol(), Some("+"));
        assert_eq!(parse("...").as_symbol(), Some("..."));
    }

    #[test]
    fn strings_with_escapes() {
        let s = parse(r#""hello\nworld""#);
        match s {
            Expr::Str(handle) => assert_eq!(&*handle.borrow(), "hello\nworld"),
            _ => panic!("expected string"),
        }
        assert!(matches!(parse(r#""""#), Expr::Str(h) if h.borrow().is_empty()));
    }

    #[test]
    fn empty_list_is_nil() {
        assert!(parse("()").is_nil());
    }

    #[test]
    fn proper_list() {
        let l = parse("(1 2 3)");
        let items = l.as_list_items().unwrap();
        assert_eq!(items.len(), 3);
        assert!(matches!(items[0], Expr::Integer(1)));
    }

    #[test]
    fn dotted_pair() {
        let l = parse("(1 . 2)");
        assert!(!l.is_proper_list());
        let items = l.as_list_items().unwrap();
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn dotted_rest_list() {
        let l = parse("(1 2 . 3)");
        assert!(!l.is_proper_list());
        let items = l.as_list_items().unwrap();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn quote_family_desugars_to_two_element_lists() {
        let q = parse("'x");
        let items = q.as_list_items().unwrap();
        assert_eq!(items[0].as_symbol(), Some("quote"));
        assert_eq!(items[1].as_symbol(), Some("x"));

        let qq = parse("`x");
        assert_eq!(qq.as_list_items().unwrap()[0].as_symbol(), Some("quasiquote"));

        let uq = parse(",x");
        assert_eq!(uq.as_list_items().unwrap()[0].as_symbol(), Some("unquote"));

        let sp = parse(",@xs");
        assert_eq!(sp.as_list_items().unwrap()[0].as_symbol(), Some("unquote-splicing"));
    }

    #[test]
    fn nested_lists_and_quote_inside_list() {
        let form = parse("(define (square x) (* x x))");
        let items = form.as_list_items().unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].as_symbol(), Some("define"));
    }

    #[test]
    fn comments_are_skipped() {
        let (expr, _) = parse_one("; a comment\n42").unwrap();
        assert!(matches!(expr, Expr::Integer(42)));
    }

    #[test]
    fn parse_all_returns_every_top_level_form() {
        let forms = parse_all("(define x 1) (define y 2) (+ x y)").unwrap();
        assert_eq!(forms.len(), 3);
    }

    #[test]
    fn parse_all_on_empty_or_comment_only_input_is_empty() {
        assert_eq!(parse_all("   ; just a comment\n").unwrap().len(), 0);
    }

    #[test]
    fn unclosed_list_is_an_error() {
        assert!(parse_all("(1 2").is_err());
    }
}
