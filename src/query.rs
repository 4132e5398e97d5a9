//! Turning what a user types into something the scorer can evaluate.
//!
//! [`rewrite`] expands a raw query (logical connectives, unit spellings,
//! `like:<id>` references), [`preprocess_term`] normalizes both queries and
//! stored fields, and [`tokenize`] splits the normalized form into
//! [`Token`]s.

use std::sync::LazyLock;

use regex::{Captures, Regex};

static AND_CONNECTIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i) and ").expect("valid AND pattern"));

static OR_CONNECTIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i) or ").expect("valid OR pattern"));

static RESISTANCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)([0-9]+(?:\.[0-9]+)*[km]?)(\s*ohms?)")
        .expect("valid resistance pattern")
});

static SMALL_MICROFARAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(0?\.[0-9]+)u(\w*)").expect("valid capacitance pattern")
});

static LIKE_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)like:([0-9]+)").expect("valid like: pattern")
});

/// Category hint added to a bare resistance value.
const RESISTOR_CATEGORIES: &str = "(resistor|potentiometer|r-network)";

/// Expand a raw user query.
///
/// `component_terms` renders the searchable terms of a component id as an
/// OR expression (see
/// [`SearchIndex::to_query`](crate::search_index::SearchIndex::to_query));
/// it is consulted for `like:<id>` references.
///
/// # Examples
///
/// ```
/// use stuffstore::query::rewrite;
///
/// let none = |_: u64| String::new();
/// assert_eq!(rewrite("foo AND bar", none), "foo bar");
/// assert_eq!(rewrite("0.1uF", none), "(0.1uF | 100nF)");
/// ```
pub fn rewrite<F>(query: &str, component_terms: F) -> String
where
    F: Fn(u64) -> String,
{
    let term = AND_CONNECTIVE.replace_all(query, " ");
    let term = OR_CONNECTIVE.replace_all(&term, " | ");

    // Resistors are stored without the Ohm suffix: look for the literal
    // text or the bare number within a resistor-like category.
    let term = RESISTANCE.replace_all(&term, |caps: &Captures| {
        format!("({} | ({} {RESISTOR_CATEGORIES}))", &caps[0], &caps[1])
    });

    // Capacitors are normalized to nanofarad, but often asked for as
    // 0.something microfarad.
    let term = SMALL_MICROFARAD.replace_all(&term, |caps: &Captures| {
        let whole = &caps[0];
        let start = caps.get(0).map_or(0, |m| m.start());
        let after_digit = term[..start]
            .chars()
            .next_back()
            .is_some_and(|c| c.is_ascii_digit());
        match caps[1].parse::<f64>() {
            Ok(microfarad) if !after_digit => {
                format!("({whole} | {:.0}n{})", 1000.0 * microfarad, &caps[2])
            }
            _ => whole.to_string(),
        }
    });

    let term = LIKE_REFERENCE.replace_all(&term, |caps: &Captures| {
        match caps[1].parse::<u64>() {
            Ok(id) => format!("({})", component_terms(id)),
            Err(_) => caps[0].to_string(),
        }
    });

    term.into_owned()
}

/// Normalize text for matching: operators become standalone words, case is
/// folded, and dashes are dropped so `TO-220` and `TO220` compare equal.
pub fn preprocess_term(text: &str) -> String {
    let mut result = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '(' | ')' | '|' => {
                result.push(' ');
                result.push(c);
                result.push(' ');
            }
            '-' => {}
            c => result.extend(c.to_lowercase()),
        }
    }
    result
}

/// One element of a preprocessed query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    Open,
    Close,
    Or,
    Term(&'a str),
}

/// Split a preprocessed query on whitespace into tokens.
///
/// # Examples
///
/// ```
/// use stuffstore::query::{Token, preprocess_term, tokenize};
///
/// let query = preprocess_term("(Foo|bar)");
/// assert_eq!(
///     tokenize(&query),
///     vec![Token::Open, Token::Term("foo"), Token::Or, Token::Term("bar"), Token::Close]
/// );
/// ```
pub fn tokenize(preprocessed: &str) -> Vec<Token<'_>> {
    preprocessed
        .split_ascii_whitespace()
        .map(|word| match word {
            "(" => Token::Open,
            ")" => Token::Close,
            "|" => Token::Or,
            term => Token::Term(term),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expand(id: u64) -> String {
        format!("<component {id}>")
    }

    #[test]
    fn plain_text_is_untouched() {
        assert_eq!(rewrite("foo", expand), "foo");
        assert_eq!(rewrite("10k", expand), "10k");
        assert_eq!(rewrite("3.9k", expand), "3.9k");
    }

    #[test]
    fn logical_connectives() {
        assert_eq!(rewrite("foo AND bar", expand), "foo bar");
        assert_eq!(rewrite("foo and bar", expand), "foo bar");
        assert_eq!(rewrite("foo OR bar", expand), "foo | bar");
        assert_eq!(
            rewrite("(foo AND bar) OR (bar AND baz)", expand),
            "(foo bar) | (bar baz)"
        );
    }

    #[test]
    fn connectives_need_surrounding_spaces() {
        assert_eq!(rewrite("fooANDbar", expand), "fooANDbar");
        assert_eq!(rewrite("fooORbar", expand), "fooORbar");
        assert_eq!(rewrite("Android", expand), "Android");
    }

    #[test]
    fn ohm_values_search_resistors() {
        assert_eq!(
            rewrite("10kOhm", expand),
            "(10kOhm | (10k (resistor|potentiometer|r-network)))"
        );
        assert_eq!(
            rewrite("10k Ohm", expand),
            "(10k Ohm | (10k (resistor|potentiometer|r-network)))"
        );
        assert_eq!(
            rewrite("3.9kOhm", expand),
            "(3.9kOhm | (3.9k (resistor|potentiometer|r-network)))"
        );
        assert_eq!(
            rewrite("470 ohms", expand),
            "(470 ohms | (470 (resistor|potentiometer|r-network)))"
        );
        assert_eq!(
            rewrite("1M Ohm", expand),
            "(1M Ohm | (1M (resistor|potentiometer|r-network)))"
        );
    }

    #[test]
    fn malformed_number_is_not_a_resistance() {
        assert_eq!(rewrite("3.kOhm", expand), "3.kOhm");
    }

    #[test]
    fn small_microfarad_becomes_nanofarad() {
        assert_eq!(rewrite("0.1u", expand), "(0.1u | 100n)");
        assert_eq!(rewrite(".1u", expand), "(.1u | 100n)");
        assert_eq!(rewrite("0.1uF", expand), "(0.1uF | 100nF)");
        assert_eq!(rewrite("0.01u", expand), "(0.01u | 10n)");
        assert_eq!(rewrite("0.068u", expand), "(0.068u | 68n)");
    }

    #[test]
    fn each_capacitance_uses_its_own_value() {
        assert_eq!(
            rewrite("0.1uF | 0.47uF", expand),
            "(0.1uF | 100nF) | (0.47uF | 470nF)"
        );
    }

    #[test]
    fn larger_microfarad_is_untouched() {
        assert_eq!(rewrite("10.1uF", expand), "10.1uF");
        assert_eq!(rewrite("47uF", expand), "47uF");
    }

    #[test]
    fn like_expands_component() {
        assert_eq!(rewrite("like:42", expand), "(<component 42>)");
        assert_eq!(
            rewrite("like:7 smd", expand),
            "(<component 7>) smd"
        );
    }

    #[test]
    fn like_without_number_is_untouched() {
        assert_eq!(rewrite("like:foo", expand), "like:foo");
    }

    #[test]
    fn like_with_overflowing_number_is_untouched() {
        let query = "like:99999999999999999999999";
        assert_eq!(rewrite(query, expand), query);
    }

    #[test]
    fn preprocess_spaces_operators() {
        assert_eq!(preprocess_term("(a|b)"), " ( a | b ) ");
    }

    #[test]
    fn preprocess_folds_case_and_dashes() {
        assert_eq!(preprocess_term("TO-220"), "to220");
        assert_eq!(preprocess_term("Foo Bar"), "foo bar");
    }

    #[test]
    fn tokenize_recognizes_operators() {
        let query = preprocess_term("a (b|c)");
        assert_eq!(
            tokenize(&query),
            vec![
                Token::Term("a"),
                Token::Open,
                Token::Term("b"),
                Token::Or,
                Token::Term("c"),
                Token::Close,
            ]
        );
    }

    #[test]
    fn tokenize_empty_query() {
        assert!(tokenize("   ").is_empty());
    }
}
