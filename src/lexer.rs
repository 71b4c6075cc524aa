// ABOUTME: Lexer module turning source bytes into a token sequence using nom combinators

use crate::error::{LexError, Position};
use crate::token::{keyword, Token, TokenKind};
use nom::{
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{char, digit1, one_of},
    combinator::{opt, recognize},
    sequence::pair,
    IResult, Parser,
};
use num_bigint::BigInt;

/// Parses a float literal: `digits '.' digits`. No leading- or
/// trailing-dot shorthand — that's an explicit grammar restriction, not an
/// oversight, so `42.` lexes as an Integer followed by a Dot.
fn parse_float(input: &str) -> IResult<&str, f64> {
    recognize(pair(digit1, pair(char('.'), digit1)))
        .map(|text: &str| text.parse::<f64>().expect("validated by the combinator"))
        .parse(input)
}

fn parse_integer(input: &str) -> IResult<&str, BigInt> {
    digit1
        .map(|text: &str| text.parse::<BigInt>().expect("validated by the combinator"))
        .parse(input)
}

fn ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn parse_identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        one_of("abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ_"),
        take_while(ident_continue),
    ))
    .parse(input)
}

/// Consumes a string literal's contents up to (not including) the closing
/// quote, processing the minimal escape set `\\ \" \n \t \r`. Returns
/// `None` if the closing quote is never found (unterminated string).
fn scan_string_body(input: &str) -> (Vec<u8>, Option<&str>) {
    let mut bytes = Vec::new();
    let mut chars = input.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        match c {
            '"' => return (bytes, Some(&input[i + 1..])),
            '\\' => match chars.next() {
                Some((_, 'n')) => bytes.push(b'\n'),
                Some((_, 't')) => bytes.push(b'\t'),
                Some((_, 'r')) => bytes.push(b'\r'),
                Some((_, '\\')) => bytes.push(b'\\'),
                Some((_, '"')) => bytes.push(b'"'),
                Some((_, other)) => {
                    bytes.push(b'\\');
                    let mut buf = [0u8; 4];
                    bytes.extend_from_slice(other.encode_utf8(&mut buf).as_bytes());
                }
                None => return (bytes, None),
            },
            _ => {
                let mut buf = [0u8; 4];
                bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            }
        }
    }
    (bytes, None)
}

fn punctuation(input: &str) -> IResult<&str, TokenKind> {
    alt((
        tag("==").map(|_| TokenKind::EqualEqual),
        tag("!=").map(|_| TokenKind::BangEqual),
        tag("(").map(|_| TokenKind::LParen),
        tag(")").map(|_| TokenKind::RParen),
        tag("{").map(|_| TokenKind::LBrace),
        tag("}").map(|_| TokenKind::RBrace),
        tag("[").map(|_| TokenKind::LBracket),
        tag("]").map(|_| TokenKind::RBracket),
        tag(",").map(|_| TokenKind::Comma),
        tag(".").map(|_| TokenKind::Dot),
        tag(";").map(|_| TokenKind::Semicolon),
        tag(":").map(|_| TokenKind::Colon),
        tag("=").map(|_| TokenKind::Equal),
        tag("<").map(|_| TokenKind::Less),
        tag(">").map(|_| TokenKind::Greater),
        tag("+").map(|_| TokenKind::Plus),
        tag("-").map(|_| TokenKind::Minus),
        tag("*").map(|_| TokenKind::Star),
        tag("/").map(|_| TokenKind::Slash),
        tag("%").map(|_| TokenKind::Percent),
        tag("!").map(|_| TokenKind::Bang),
    ))
    .parse(input)
}

fn advance_position(line: &mut usize, column: &mut usize, consumed: &str) {
    for c in consumed.chars() {
        if c == '\n' {
            *line += 1;
            *column = 1;
        } else {
            *column += 1;
        }
    }
}

/// Skips whitespace and `//` line comments, returning the remaining input.
/// Updates `line`/`column` in place.
fn skip_trivia<'a>(mut input: &'a str, line: &mut usize, column: &mut usize) -> &'a str {
    loop {
        let start_len = input.len();

        let ws_len = input
            .char_indices()
            .take_while(|(_, c)| c.is_whitespace())
            .last()
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);
        if ws_len > 0 {
            advance_position(line, column, &input[..ws_len]);
            input = &input[ws_len..];
        }

        if let Some(rest) = input.strip_prefix("//") {
            let comment_len = rest.find('\n').unwrap_or(rest.len());
            let consumed = &input[..2 + comment_len];
            advance_position(line, column, consumed);
            input = &input[2 + comment_len..];
        }

        if input.len() == start_len {
            break;
        }
    }
    input
}

/// Lexes `source` into a token sequence (always terminated by `Eof`) plus
/// any diagnostics encountered along the way. Never aborts early: on an
/// unrecognised byte it records a diagnostic, skips one character, and
/// keeps going.
pub fn lex(source: &str) -> (Vec<Token>, Vec<LexError>) {
    let mut tokens = Vec::new();
    let mut errors = Vec::new();
    let mut line = 1usize;
    let mut column = 1usize;
    let mut rest = source;

    loop {
        rest = skip_trivia(rest, &mut line, &mut column);
        if rest.is_empty() {
            tokens.push(Token::new(TokenKind::Eof, Position::new(line, column)));
            break;
        }

        let token_start = Position::new(line, column);

        if let Ok((after, float)) = parse_float(rest) {
            let consumed = &rest[..rest.len() - after.len()];
            advance_position(&mut line, &mut column, consumed);
            tokens.push(Token::new(TokenKind::Float(float), token_start));
            rest = finish_number(after, &mut line, &mut column, token_start, &mut errors, &mut tokens);
            continue;
        }

        if let Ok((after, int)) = parse_integer(rest) {
            let consumed = &rest[..rest.len() - after.len()];
            advance_position(&mut line, &mut column, consumed);
            tokens.push(Token::new(TokenKind::Integer(int), token_start));
            rest = finish_number(after, &mut line, &mut column, token_start, &mut errors, &mut tokens);
            continue;
        }

        if rest.starts_with('"') {
            let (body, closing) = scan_string_body(&rest[1..]);
            match closing {
                Some(after) => {
                    let consumed_len = rest.len() - after.len();
                    let consumed = &rest[..consumed_len];
                    advance_position(&mut line, &mut column, consumed);
                    tokens.push(Token::new(TokenKind::Str(body), token_start));
                    rest = after;
                }
                None => {
                    // Unterminated: no closing quote anywhere in the rest
                    // of the input. Record the diagnostic at the opening
                    // quote and resynchronise at end of input.
                    errors.push(LexError::UnterminatedString {
                        position: token_start,
                    });
                    advance_position(&mut line, &mut column, rest);
                    rest = "";
                }
            }
            continue;
        }

        if let Ok((after, ident)) = parse_identifier(rest) {
            let consumed = &rest[..rest.len() - after.len()];
            advance_position(&mut line, &mut column, consumed);
            let kind = keyword(ident).unwrap_or_else(|| TokenKind::Identifier(ident.to_string()));
            tokens.push(Token::new(kind, token_start));
            rest = after;
            continue;
        }

        if let Ok((after, kind)) = punctuation(rest) {
            let consumed = &rest[..rest.len() - after.len()];
            advance_position(&mut line, &mut column, consumed);
            tokens.push(Token::new(kind, token_start));
            rest = after;
            continue;
        }

        // Unrecognised byte: record a diagnostic, skip one character, and
        // keep lexing. The lexer never aborts a run.
        let bad_char = rest.chars().next().expect("rest is non-empty here");
        let mut buf = [0u8; 4];
        let byte = bad_char.encode_utf8(&mut buf).as_bytes()[0];
        errors.push(LexError::UnexpectedByte {
            byte,
            position: token_start,
        });
        let width = bad_char.len_utf8();
        advance_position(&mut line, &mut column, &rest[..width]);
        rest = &rest[width..];
    }

    (tokens, errors)
}

/// After lexing a numeric literal, checks whether it is immediately
/// followed by an identifier character (e.g. `123abc`). If so, that is a
/// malformed numeric literal: consume the glued identifier run, replace
/// the just-pushed number token with a single `MalformedNumber`
/// diagnostic, and continue lexing after it.
fn finish_number<'a>(
    after: &'a str,
    line: &mut usize,
    column: &mut usize,
    start: Position,
    errors: &mut Vec<LexError>,
    tokens: &mut Vec<Token>,
) -> &'a str {
    if let Some(c) = after.chars().next() {
        if ident_continue(c) {
            let glued_len = after
                .char_indices()
                .take_while(|(_, c)| ident_continue(*c))
                .last()
                .map(|(i, c)| i + c.len_utf8())
                .unwrap_or(0);
            let consumed = &after[..glued_len];
            advance_position(line, column, consumed);
            tokens.pop();
            errors.push(LexError::MalformedNumber { position: start });
            return &after[glued_len..];
        }
    }
    after
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let (tokens, errors) = lex(source);
        assert!(errors.is_empty(), "unexpected lex errors: {:?}", errors);
        tokens.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn lexes_integer_and_float() {
        assert_eq!(
            kinds("42 3.14"),
            vec![
                TokenKind::Integer(BigInt::from(42)),
                TokenKind::Float(3.14),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn trailing_dot_is_integer_then_dot() {
        assert_eq!(
            kinds("42."),
            vec![TokenKind::Integer(BigInt::from(42)), TokenKind::Dot, TokenKind::Eof]
        );
    }

    #[test]
    fn lexes_keywords_vs_identifiers() {
        assert_eq!(
            kinds("var x if y"),
            vec![
                TokenKind::Var,
                TokenKind::Identifier("x".to_string()),
                TokenKind::If,
                TokenKind::Identifier("y".to_string()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lexes_string_with_escapes() {
        let (tokens, errors) = lex(r#""a\"b\nc""#);
        assert!(errors.is_empty());
        match &tokens[0].kind {
            TokenKind::Str(bytes) => assert_eq!(bytes, b"a\"b\nc"),
            other => panic!("expected Str, got {:?}", other),
        }
    }

    #[test]
    fn unterminated_string_is_reported() {
        let (_, errors) = lex(r#""abc"#);
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], LexError::UnterminatedString { .. }));
    }

    #[test]
    fn two_char_operators_prefer_longest_match() {
        assert_eq!(
            kinds("== != = !"),
            vec![
                TokenKind::EqualEqual,
                TokenKind::BangEqual,
                TokenKind::Equal,
                TokenKind::Bang,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(
            kinds("1 // comment\n2"),
            vec![
                TokenKind::Integer(BigInt::from(1)),
                TokenKind::Integer(BigInt::from(2)),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn unrecognised_byte_recovers_and_continues() {
        let (tokens, errors) = lex("1 @ 2");
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], LexError::UnexpectedByte { byte: b'@', .. }));
        assert_eq!(
            tokens.into_iter().map(|t| t.kind).collect::<Vec<_>>(),
            vec![
                TokenKind::Integer(BigInt::from(1)),
                TokenKind::Integer(BigInt::from(2)),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn glued_identifier_after_number_is_malformed() {
        let (tokens, errors) = lex("123abc 4");
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], LexError::MalformedNumber { .. }));
        assert_eq!(
            tokens.into_iter().map(|t| t.kind).collect::<Vec<_>>(),
            vec![TokenKind::Integer(BigInt::from(4)), TokenKind::Eof]
        );
    }

    #[test]
    fn positions_track_lines_and_columns() {
        let (tokens, _) = lex("1\n  2");
        assert_eq!(tokens[0].position, Position::new(1, 1));
        assert_eq!(tokens[1].position, Position::new(2, 3));
    }
}
