//! Property-based tests for the pipeline guarantees.
//!
//! These pin the three contracts everything downstream relies on:
//! - parsing reproduces the input text exactly (round-trip)
//! - flattening a grouped tree yields the same leaf sequence the lexer made
//! - a character stream lexes identically to the equivalent string

use proptest::prelude::*;
use sqlfold::sql::{parse, tokenize, tokenize_chars, TokenType};

fn identifier_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z_][a-zA-Z0-9_]{0,8}",
        "`[a-z ]{1,8}`",
        "\"[a-z ]{1,8}\"",
    ]
}

fn literal_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "-?[0-9]{1,6}",
        "[0-9]{1,3}\\.[0-9]{1,3}",
        "'[a-z ]{0,10}'",
    ]
}

fn statement_strategy() -> impl Strategy<Value = String> {
    (
        identifier_strategy(),
        identifier_strategy(),
        identifier_strategy(),
        literal_strategy(),
    )
        .prop_map(|(a, b, t, v)| format!("select {a}, {b} from {t} where {a} = {v}"))
}

/// Well-formed scripts, malformed fragments, and arbitrary text alike: the
/// pipeline is total, so its guarantees must hold for all of them.
fn sql_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        statement_strategy(),
        proptest::collection::vec(statement_strategy(), 1..4).prop_map(|s| s.join("; ")),
        "[a-z0-9 \\t\\r\\n;(),.'`{}*=-]{0,60}",
        ".{0,40}",
    ]
}

mod proptest_tests {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        #[test]
        fn test_parse_round_trips_exactly(sql in sql_strategy()) {
            let joined: String = parse(&sql, None).iter().map(|s| s.value()).collect();
            prop_assert_eq!(joined, sql);
        }

        #[test]
        fn test_flatten_matches_tokenize(sql in sql_strategy()) {
            let lexed: Vec<(TokenType, String)> = tokenize(&sql, None).collect();
            let flattened: Vec<(TokenType, String)> = parse(&sql, None)
                .iter()
                .flat_map(|stmt| {
                    stmt.flatten()
                        .map(|leaf| (leaf.ttype().expect("leaves have a type"), leaf.value()))
                        .collect::<Vec<_>>()
                })
                .collect();
            prop_assert_eq!(flattened, lexed);
        }

        #[test]
        fn test_stream_and_string_lex_identically(sql in sql_strategy()) {
            let from_str: Vec<(TokenType, String)> = tokenize(&sql, None).collect();
            let from_chars: Vec<(TokenType, String)> = tokenize_chars(sql.chars(), None).collect();
            prop_assert_eq!(from_chars, from_str);
        }

        #[test]
        fn test_grouping_never_changes_token_count(sql in sql_strategy()) {
            let lexed = tokenize(&sql, None).count();
            let grouped: usize = parse(&sql, None).iter().map(|s| s.flatten().count()).sum();
            prop_assert_eq!(grouped, lexed);
        }
    }
}
