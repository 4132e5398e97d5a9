//! Relevance scoring of a tokenized query against one component.
//!
//! Scores are real numbers rather than booleans, so the logical operators
//! are arithmetic:
//!
//! - Consecutive terms are AND-ed: their scores add up, which orders
//!   components that match all of them. If any of them matches nothing,
//!   the whole conjunction fails.
//! - `|` separates OR branches; the best branch wins. Taking the maximum
//!   rather than the sum keeps a component from scoring higher just
//!   because it matches several alternatives.
//! - Parentheses group; a group that does not match fails the conjunction
//!   it is part of.
//!
//! Like in real life, AND binds tighter than OR.

use crate::{
    component::Component,
    query::{Token, preprocess_term},
};

/// Value of a conjunction with a term that matched nothing. Negative, so no
/// OR branch built from it can win, but a sibling branch still can.
pub const NO_MATCH: f32 = -1000.0;

/// Boost for a match that starts a word.
const WORD_START_BOOST: f32 = 12.0;

/// Boost for a match that ends a word.
const WORD_END_BOOST: f32 = 5.0;

const CATEGORY_WEIGHT: f32 = 2.0;
const VALUE_WEIGHT: f32 = 3.0;
const DESCRIPTION_WEIGHT: f32 = 1.5;
const NOTES_WEIGHT: f32 = 1.2;
const FOOTPRINT_WEIGHT: f32 = 1.0;

/// The searchable fields of a component, run through
/// [`preprocess_term`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFields {
    pub category: String,
    pub value: String,
    pub description: String,
    pub notes: String,
    pub footprint: String,
}

impl SearchFields {
    pub fn new(component: &Component) -> Self {
        Self {
            category: preprocess_term(&component.category),
            value: preprocess_term(&component.value),
            description: preprocess_term(&component.description),
            notes: preprocess_term(&component.notes),
            footprint: preprocess_term(&component.footprint),
        }
    }

    /// Score of a single query term: the best weighted field score.
    ///
    /// Only the best field counts, so repeating a word across fields does
    /// not help.
    pub fn term_score(&self, term: &str) -> f32 {
        max_score([
            CATEGORY_WEIGHT * string_score(term, &self.category),
            VALUE_WEIGHT * string_score(term, &self.value),
            DESCRIPTION_WEIGHT * string_score(term, &self.description),
            NOTES_WEIGHT * string_score(term, &self.notes),
            FOOTPRINT_WEIGHT * string_score(term, &self.footprint),
        ])
    }

    /// Score of a whole tokenized query. Zero or less means no match.
    pub fn match_score(&self, tokens: &[Token<'_>]) -> f32 {
        Evaluator {
            tokens,
            fields: self,
        }
        .expression(0, false)
        .0
    }
}

fn is_separator(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'.' | b',' | b';')
}

/// How well `needle` matches within `haystack`: zero if it does not occur,
/// otherwise higher the earlier it occurs and if it lines up with word
/// boundaries.
///
/// # Examples
///
/// ```
/// use stuffstore::scoring::string_score;
///
/// assert_eq!(string_score("foo", "foo"), 10.0 + 12.0 + 5.0);
/// assert_eq!(string_score("foo", "barfoo"), 7.0 + 5.0);
/// assert_eq!(string_score("baz", "foo"), 0.0);
/// ```
pub fn string_score(needle: &str, haystack: &str) -> f32 {
    let Some(pos) = haystack.find(needle) else {
        return 0.0;
    };
    let bytes = haystack.as_bytes();
    let end = pos + needle.len();

    let mut boost = 0.0;
    if pos == 0 || is_separator(bytes[pos - 1]) {
        boost += WORD_START_BOOST;
    }
    if end == bytes.len() || is_separator(bytes[end]) {
        boost += WORD_END_BOOST;
    }

    let position_score = 10_usize.saturating_sub(pos).max(1);
    position_score as f32 + boost
}

/// Largest of the values, but never below zero.
fn max_score(values: impl IntoIterator<Item = f32>) -> f32 {
    values.into_iter().fold(0.0, f32::max)
}

/// Running AND of terms within one OR branch.
#[derive(Default)]
struct Conjunction {
    sum: f32,
    failed: bool,
}

impl Conjunction {
    fn add(&mut self, score: f32) {
        if score <= 0.0 {
            self.failed = true;
        } else {
            self.sum += score;
        }
    }

    fn score(&self) -> f32 {
        if self.failed { NO_MATCH } else { self.sum }
    }
}

/// Recursive-descent evaluation over a token slice.
struct Evaluator<'q, 'a> {
    tokens: &'q [Token<'a>],
    fields: &'q SearchFields,
}

impl Evaluator<'_, '_> {
    /// Evaluate from `start` to the end of the current group. Returns the
    /// score and the index of the first token after the group.
    ///
    /// Unbalanced parentheses are tolerated: a group missing its `)` ends
    /// with the query, and a stray `)` at top level is ignored.
    fn expression(&self, start: usize, nested: bool) -> (f32, usize) {
        let mut best_branch = 0.0_f32;
        let mut current = Conjunction::default();

        let mut i = start;
        while i < self.tokens.len() {
            match self.tokens[i] {
                Token::Open => {
                    if i + 1 < self.tokens.len() {
                        let (group_score, next) = self.expression(i + 1, true);
                        current.add(group_score);
                        i = next;
                        continue;
                    }
                }
                Token::Or => {
                    best_branch = best_branch.max(current.score());
                    current = Conjunction::default();
                }
                Token::Close => {
                    if nested {
                        return (max_score([best_branch, current.score()]), i + 1);
                    }
                }
                Token::Term(term) => current.add(self.fields.term_score(term)),
            }
            i += 1;
        }

        (max_score([best_branch, current.score()]), self.tokens.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::tokenize;

    fn fields() -> SearchFields {
        SearchFields {
            category: "resist".into(),
            value: "foo".into(),
            ..Default::default()
        }
    }

    fn matches(fields: &SearchFields, query: &str) -> bool {
        let query = preprocess_term(query);
        fields.match_score(&tokenize(&query)) > 0.0
    }

    #[test]
    fn single_terms() {
        let f = fields();
        assert!(matches(&f, "foo"));
        assert!(!matches(&f, "bar"));
    }

    #[test]
    fn and_requires_all_terms() {
        let f = fields();
        assert!(matches(&f, "foo foo"));
        assert!(!matches(&f, "foo bar"));
        assert!(!matches(&f, "bar foo"));
    }

    #[test]
    fn or_needs_one_branch() {
        let f = fields();
        assert!(matches(&f, "foo|bar"));
        assert!(matches(&f, "(foo|bar)"));
        assert!(!matches(&f, "bar|baz"));
    }

    #[test]
    fn unbalanced_parentheses_are_tolerated() {
        let f = fields();
        assert!(matches(&f, "(foo|bar"));
        assert!(matches(&f, "foo|bar)"));
        assert!(matches(&f, "foo ("));
        assert!(!matches(&f, "bar)"));
    }

    #[test]
    fn and_of_ors() {
        let f = fields();
        assert!(!matches(&f, "(foo|bar) (bar|baz)"));
        assert!(!matches(&f, "(bar|baz) (foo|baz)"));
        assert!(matches(&f, "(foo|baz) (foo|baz)"));
    }

    #[test]
    fn or_together_with_and() {
        let f = fields();
        assert!(matches(&f, "foo (foo|bar)"));
        assert!(matches(&f, "(foo|bar) foo"));
        assert!(!matches(&f, "baz (foo|bar)"));
        assert!(!matches(&f, "(foo|bar) baz"));
        assert!(!matches(&f, "((foo|bar) baz)"));
    }

    #[test]
    fn resistance_expansion_shapes() {
        let f = fields();
        assert!(matches(&f, "(bar | (foo (baz|resist)))"));
        assert!(!matches(&f, "(bar | (foo (baz|wrongcategory)))"));
        assert!(matches(&f, "(foo | (bar (baz|resist)))"));
        assert!(matches(&f, "(foo foo | (bar (baz|resist)))"));
        assert!(!matches(&f, "(bar | (bar (baz|resist)))"));
    }

    #[test]
    fn failed_conjunction_stays_failed() {
        // Many strong matches must not outweigh one missing term.
        let f = fields();
        let query = format!("bar {}", "foo ".repeat(40));
        assert!(!matches(&f, &query));
    }

    #[test]
    fn empty_query_matches_nothing() {
        assert!(!matches(&fields(), ""));
        assert!(!matches(&fields(), "()"));
    }

    #[test]
    fn string_score_prefers_early_and_whole_words() {
        assert_eq!(string_score("foo", "foo"), 27.0);
        assert_eq!(string_score("foo", "foobar"), 22.0);
        assert_eq!(string_score("foo", "a foo"), 8.0 + 17.0);
        assert_eq!(string_score("foo", "a,foo;b"), 8.0 + 17.0);
        // Far into the text the position score bottoms out at one.
        assert_eq!(string_score("foo", "abcdefghijklmnopfoo"), 1.0 + 5.0);
    }

    #[test]
    fn term_score_takes_best_field_only() {
        let only_value = SearchFields {
            value: "foo".into(),
            ..Default::default()
        };
        let everywhere = SearchFields {
            category: "foo".into(),
            value: "foo".into(),
            description: "foo".into(),
            notes: "foo".into(),
            footprint: "foo".into(),
        };
        assert_eq!(only_value.term_score("foo"), 81.0);
        assert_eq!(everywhere.term_score("foo"), 81.0);
    }

    #[test]
    fn value_outweighs_description() {
        let in_value = SearchFields {
            value: "foo".into(),
            ..Default::default()
        };
        let in_description = SearchFields {
            description: "foo".into(),
            ..Default::default()
        };
        assert!(in_value.term_score("foo") > in_description.term_score("foo"));
    }
}
