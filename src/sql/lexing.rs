//! Lexer
//!
//!     Turns SQL text into a flat sequence of `(TokenType, text)` tokens. The
//!     scanner keeps a cursor into a buffer and, at each position, tries the
//!     active dialect's rules in table order; the first accepted match is
//!     emitted and the cursor advances by exactly the matched length. Every
//!     character of the input ends up in exactly one token, which is what the
//!     round-trip guarantee of the whole pipeline rests on.
//!
//!     There is no fatal error state: a position no rule matches yields a
//!     single one-character `Error` token and scanning continues.
//!
//! Streaming
//!
//!     Input arrives as a `char` iterator; a plain `&str` is just the
//!     single-source case of the same path, so both forms produce identical
//!     sequences. The buffer grows in chunks and is drained behind the
//!     cursor. A match is only trusted once extending the buffer could not
//!     change the outcome: the scanner refills when the text after a match
//!     is whitespace optionally followed by a word run still touching the
//!     buffer end (the next word of a multi-word keyword, or the rest of a
//!     name or number run, may still be arriving), when an unterminated
//!     block comment, bracket name or quote could absorb the tentative
//!     match, and when nothing matches but the source has more to give.
//!
//! Context
//!
//!     Two classifications depend on lexical context rather than the pattern
//!     alone. A `-` directly gluing onto digits is a signed number only in
//!     prefix position (after an operator, an opening bracket, a comma, or at
//!     the start of input) and a subtraction operator everywhere else.
//!     Placeholder rules never fire directly after a word character. Both are
//!     rule guards checked by the scanner, see
//!     [dialects](crate::sql::lexing::dialects).

pub mod dialects;

use crate::sql::token::TokenType;
use dialects::{table_for, DialectTable, RuleAction};

pub use dialects::DialectError;

const REFILL_CHUNK: usize = 4096;

/// Tokenize a string. Returns a lazy iterator over `(TokenType, text)`.
///
/// `dialect` is an opaque caller-chosen name (`"TransactSQL"` selects the
/// T-SQL-like variant); unknown names fall back to the default dialect.
pub fn tokenize<'a>(sql: &'a str, dialect: Option<&str>) -> Tokenizer<std::str::Chars<'a>> {
    tokenize_chars(sql.chars(), dialect)
}

/// Tokenize an incremental character stream. Yields the same sequence the
/// string form would for the concatenated input. The stream is pulled only
/// as far as producing tokens requires; re-tokenizing means supplying a
/// fresh stream.
pub fn tokenize_chars<S>(source: S, dialect: Option<&str>) -> Tokenizer<S>
where
    S: Iterator<Item = char>,
{
    Tokenizer {
        source,
        table: table_for(dialect),
        buf: String::new(),
        pos: 0,
        exhausted: false,
        prefix_position: true,
        prev_char: None,
        chunk: REFILL_CHUNK,
    }
}

/// Pull-based lexer state, created by [tokenize] / [tokenize_chars].
pub struct Tokenizer<S> {
    source: S,
    table: &'static DialectTable,
    buf: String,
    pos: usize,
    exhausted: bool,
    /// True when a following `-<digits>` would be a signed literal.
    prefix_position: bool,
    /// Last character emitted, for the not-after-word rule guard.
    prev_char: Option<char>,
    chunk: usize,
}

impl<S: Iterator<Item = char>> Tokenizer<S> {
    #[cfg(test)]
    fn with_chunk(mut self, chunk: usize) -> Self {
        self.chunk = chunk;
        self
    }

    fn refill(&mut self) {
        for _ in 0..self.chunk {
            match self.source.next() {
                Some(c) => self.buf.push(c),
                None => {
                    self.exhausted = true;
                    break;
                }
            }
        }
    }

    /// First rule accepting a match at the cursor, with its resolved type.
    fn match_at_cursor(&self) -> Option<(TokenType, usize)> {
        let remaining = &self.buf[self.pos..];
        for rule in &self.table.rules {
            let m = match rule.re.find(remaining) {
                Some(m) => m,
                None => continue,
            };
            let text = m.as_str();
            if rule.signed_prefix && text.starts_with('-') && !self.prefix_position {
                continue;
            }
            if rule.not_after_word
                && self
                    .prev_char
                    .is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '$')
            {
                continue;
            }
            let ttype = match rule.action {
                RuleAction::Emit(t) => t,
                RuleAction::ClassifyWord => self.table.classify_word(text),
            };
            return Some((ttype, m.end()));
        }
        None
    }

    /// Constructs whose closing delimiter may still be in the unread source;
    /// matching anything before it arrives could misread them.
    fn pending_open_construct(&self) -> bool {
        let remaining = &self.buf[self.pos..];
        (remaining.starts_with("/*") && !remaining.contains("*/"))
            || (remaining.starts_with('[') && !remaining.contains(']'))
    }

    /// The text after a tentative match is whitespace optionally followed by
    /// a word run touching the buffer end; more input could still complete a
    /// longer match (the next word of a multi-word keyword, the rest of a
    /// name or number run). Trivially true when the match ends the buffer.
    fn tail_may_extend(&self, match_end: usize) -> bool {
        let rest = &self.buf[self.pos + match_end..];
        rest.chars()
            .skip_while(|c| c.is_whitespace())
            .all(|c| c.is_alphanumeric() || c == '_' || c == '$')
    }

    /// A quoted token whose closing quote is immediately followed by the same
    /// quote character was actually an escaped quote; more input may extend
    /// the real token.
    fn quote_may_continue(&self, match_end: usize) -> bool {
        let remaining = &self.buf[self.pos..];
        match remaining.chars().next() {
            Some(q @ ('\'' | '"' | '`')) => remaining[match_end..].starts_with(q),
            _ => false,
        }
    }

    fn advance(&mut self, len: usize) -> String {
        let text: String = self.buf[self.pos..self.pos + len].to_string();
        self.pos += len;
        self.prev_char = text.chars().next_back();
        if self.pos >= 2 * REFILL_CHUNK {
            self.buf.drain(..self.pos);
            self.pos = 0;
        }
        text
    }

    fn update_context(&mut self, ttype: TokenType, text: &str) {
        if ttype.is_insignificant() {
            return;
        }
        self.prefix_position = ttype.is_a(TokenType::OPERATOR)
            || ttype == TokenType::ASSIGNMENT
            || ttype == TokenType::WILDCARD
            || (ttype == TokenType::PUNCTUATION && matches!(text, "(" | "[" | ","));
    }
}

impl<S: Iterator<Item = char>> Iterator for Tokenizer<S> {
    type Item = (TokenType, String);

    fn next(&mut self) -> Option<(TokenType, String)> {
        loop {
            if self.pos >= self.buf.len() {
                if self.exhausted {
                    return None;
                }
                self.refill();
                continue;
            }
            if !self.exhausted && self.pending_open_construct() {
                self.refill();
                continue;
            }
            match self.match_at_cursor() {
                Some((ttype, len)) => {
                    if !self.exhausted {
                        let unstable =
                            self.tail_may_extend(len) || self.quote_may_continue(len);
                        if unstable {
                            self.refill();
                            continue;
                        }
                    }
                    let text = self.advance(len);
                    self.update_context(ttype, &text);
                    return Some((ttype, text));
                }
                None => {
                    if !self.exhausted {
                        self.refill();
                        continue;
                    }
                    // error recovery: exactly one character, then continue
                    let c = self.buf[self.pos..]
                        .chars()
                        .next()
                        .expect("cursor is inside the buffer");
                    let text = self.advance(c.len_utf8());
                    self.prefix_position = false;
                    return Some((TokenType::ERROR, text));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::testing::mk_tokens;

    fn lex(sql: &str) -> Vec<(TokenType, String)> {
        tokenize(sql, None).collect()
    }

    #[test]
    fn test_simple_statement() {
        assert_eq!(
            lex("select * from foo;"),
            mk_tokens(&[
                (TokenType::KEYWORD_DML, "select"),
                (TokenType::WHITESPACE, " "),
                (TokenType::WILDCARD, "*"),
                (TokenType::WHITESPACE, " "),
                (TokenType::KEYWORD, "from"),
                (TokenType::WHITESPACE, " "),
                (TokenType::NAME, "foo"),
                (TokenType::PUNCTUATION, ";"),
            ])
        );
    }

    #[test]
    fn test_keyword_requires_whole_word() {
        assert_eq!(lex("enddate"), mk_tokens(&[(TokenType::NAME, "enddate")]));
        assert_eq!(lex("join_col"), mk_tokens(&[(TokenType::NAME, "join_col")]));
        assert_eq!(
            lex("create created_foo"),
            mk_tokens(&[
                (TokenType::KEYWORD_DDL, "create"),
                (TokenType::WHITESPACE, " "),
                (TokenType::NAME, "created_foo"),
            ])
        );
    }

    #[test]
    fn test_multiword_keywords_match_greedily() {
        assert_eq!(
            lex("LEFT OUTER JOIN"),
            mk_tokens(&[(TokenType::KEYWORD, "LEFT OUTER JOIN")])
        );
        assert_eq!(
            lex("UNION ALL"),
            mk_tokens(&[(TokenType::KEYWORD, "UNION ALL")])
        );
        // internal whitespace is preserved verbatim, not canonicalized
        assert_eq!(
            lex("END\t\nIF"),
            mk_tokens(&[(TokenType::KEYWORD, "END\t\nIF")])
        );
    }

    #[test]
    fn test_multiword_stops_at_word_boundary() {
        // "LEFT" alone is an ordinary keyword, and a following identifier
        // starting with a keyword must not be absorbed
        assert_eq!(
            lex("left join_col"),
            mk_tokens(&[
                (TokenType::KEYWORD, "left"),
                (TokenType::WHITESPACE, " "),
                (TokenType::NAME, "join_col"),
            ])
        );
    }

    #[test]
    fn test_signed_number_in_prefix_position() {
        assert_eq!(
            lex("values(-1)"),
            mk_tokens(&[
                (TokenType::KEYWORD, "values"),
                (TokenType::PUNCTUATION, "("),
                (TokenType::NUMBER_INTEGER, "-1"),
                (TokenType::PUNCTUATION, ")"),
            ])
        );
        assert_eq!(
            lex("-1"),
            mk_tokens(&[(TokenType::NUMBER_INTEGER, "-1")])
        );
    }

    #[test]
    fn test_minus_after_operand_is_subtraction() {
        assert_eq!(
            lex("1-2"),
            mk_tokens(&[
                (TokenType::NUMBER_INTEGER, "1"),
                (TokenType::OPERATOR, "-"),
                (TokenType::NUMBER_INTEGER, "2"),
            ])
        );
        assert_eq!(
            lex("a= -1"),
            mk_tokens(&[
                (TokenType::NAME, "a"),
                (TokenType::OPERATOR_COMPARISON, "="),
                (TokenType::WHITESPACE, " "),
                (TokenType::NUMBER_INTEGER, "-1"),
            ])
        );
    }

    #[test]
    fn test_digit_run_glued_to_word() {
        // a maximal digit run lexes as one number, never as Error tokens
        assert_eq!(
            lex("123abc"),
            mk_tokens(&[
                (TokenType::NUMBER_INTEGER, "123"),
                (TokenType::NAME, "abc"),
            ])
        );
        assert_eq!(
            lex("0b1010"),
            mk_tokens(&[
                (TokenType::NUMBER_INTEGER, "0"),
                (TokenType::NAME, "b1010"),
            ])
        );
        assert_eq!(
            lex("3.5x"),
            mk_tokens(&[(TokenType::NUMBER_FLOAT, "3.5"), (TokenType::NAME, "x")])
        );
    }

    #[test]
    fn test_error_recovery_consumes_one_char() {
        assert_eq!(
            lex("FOOBAR{"),
            mk_tokens(&[(TokenType::NAME, "FOOBAR"), (TokenType::ERROR, "{")])
        );
    }

    #[test]
    fn test_line_endings_preserved_verbatim() {
        for s in ["foo\nbar\n", "foo\rbar\r", "foo\r\nbar\r\n", "foo\r\nbar\n"] {
            let joined: String = lex(s).into_iter().map(|(_, v)| v).collect();
            assert_eq!(joined, s);
        }
        assert_eq!(
            lex("foo\r\nbar"),
            mk_tokens(&[
                (TokenType::NAME, "foo"),
                (TokenType::NEWLINE, "\r\n"),
                (TokenType::NAME, "bar"),
            ])
        );
    }

    #[test]
    fn test_quoted_tokens_include_delimiters() {
        assert_eq!(
            lex("`foo`.`bar`"),
            mk_tokens(&[
                (TokenType::NAME, "`foo`"),
                (TokenType::PUNCTUATION, "."),
                (TokenType::NAME, "`bar`"),
            ])
        );
        assert_eq!(
            lex("'it''s'"),
            mk_tokens(&[(TokenType::STRING_SINGLE, "'it''s'")])
        );
        assert_eq!(
            lex(r#""a\"b""#),
            mk_tokens(&[(TokenType::STRING_SYMBOL, r#""a\"b""#)])
        );
    }

    #[test]
    fn test_comments_are_single_tokens() {
        assert_eq!(
            lex("1 -- rest of line\nfoo"),
            mk_tokens(&[
                (TokenType::NUMBER_INTEGER, "1"),
                (TokenType::WHITESPACE, " "),
                (TokenType::COMMENT_SINGLE, "-- rest of line\n"),
                (TokenType::NAME, "foo"),
            ])
        );
        assert_eq!(
            lex("a/* b\nc */d"),
            mk_tokens(&[
                (TokenType::NAME, "a"),
                (TokenType::COMMENT_MULTILINE, "/* b\nc */"),
                (TokenType::NAME, "d"),
            ])
        );
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(
            lex("= :name"),
            mk_tokens(&[
                (TokenType::OPERATOR_COMPARISON, "="),
                (TokenType::WHITESPACE, " "),
                (TokenType::NAME_PLACEHOLDER, ":name"),
            ])
        );
        assert_eq!(lex("?"), mk_tokens(&[(TokenType::NAME_PLACEHOLDER, "?")]));
        // a colon inside a word is punctuation, not a placeholder
        assert_eq!(
            lex("a:b"),
            mk_tokens(&[
                (TokenType::NAME, "a"),
                (TokenType::PUNCTUATION, ":"),
                (TokenType::NAME, "b"),
            ])
        );
    }

    #[test]
    fn test_dollar_identifier_stays_one_name() {
        assert_eq!(lex("v$name"), mk_tokens(&[(TokenType::NAME, "v$name")]));
    }

    #[test]
    fn test_bracket_quoted_name() {
        assert_eq!(
            lex("[dbo table]"),
            mk_tokens(&[(TokenType::NAME, "[dbo table]")])
        );
    }

    #[test]
    fn test_transact_sql_dialect() {
        let tokens: Vec<_> = tokenize("DECLARE @x", Some("TransactSQL")).collect();
        assert_eq!(
            tokens,
            mk_tokens(&[
                (TokenType::KEYWORD, "DECLARE"),
                (TokenType::WHITESPACE, " "),
                (TokenType::NAME, "@x"),
            ])
        );
        // base dialect treats DECLARE as a plain name
        assert_eq!(
            lex("DECLARE")[0],
            (TokenType::NAME, "DECLARE".to_string())
        );
        // TransactSQL closes END TRY as one keyword
        let tokens: Vec<_> = tokenize("END TRY", Some("TransactSQL")).collect();
        assert_eq!(tokens, mk_tokens(&[(TokenType::KEYWORD, "END TRY")]));
    }

    #[test]
    fn test_stream_matches_string_at_any_chunk_size() {
        let sql = "select /* x\ny */ 'a''b' , [col 1] from `t` where a >= -1 END\t\nIF; -- c";
        let from_str: Vec<_> = lex(sql);
        for chunk in [1, 2, 3, 7, 4096] {
            let streamed: Vec<_> = tokenize_chars(sql.chars(), None)
                .with_chunk(chunk)
                .collect();
            assert_eq!(streamed, from_str, "chunk size {}", chunk);
        }
    }

    #[test]
    fn test_unterminated_quote_recovers_per_char() {
        let tokens = lex("'abc");
        assert_eq!(tokens[0], (TokenType::ERROR, "'".to_string()));
        let joined: String = tokens.into_iter().map(|(_, v)| v).collect();
        assert_eq!(joined, "'abc");
    }
}
