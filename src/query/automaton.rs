//! Term-matching automata driven over the term dictionary
//!
//! Both automata work on raw bytes, like the dictionary itself.

use fst::Automaton;
use regex::Regex;

use crate::error::SourError;
use crate::Result;

/// Whole-term regular expression match
///
/// The state is the bytes consumed so far. A known literal prefix lets
/// `can_match` reject terms early; the regex itself only runs once the
/// whole term is read.
#[derive(Clone, Debug)]
pub struct RegexAutomaton {
    regex: Regex,
    prefix: String,
}

impl RegexAutomaton {
    /// Compile `pattern`, anchored at both ends
    pub fn new(pattern: &str) -> Result<Self> {
        Self::with_prefix(pattern, regex_literal_prefix(pattern))
    }

    /// Compile `pattern` when every match is known to start with `prefix`
    pub fn with_prefix(pattern: &str, prefix: String) -> Result<Self> {
        let regex = Regex::new(&format!("^(?:{})$", pattern))
            .map_err(|e| SourError::InvalidQuery(format!("Invalid regex '{}': {}", pattern, e)))?;
        Ok(Self { regex, prefix })
    }

    /// Compile a wildcard pattern: `*` is any sequence, `?` any one character
    pub fn wildcard(pattern: &str) -> Result<Self> {
        Self::with_prefix(&wildcard_to_regex(pattern), wildcard_prefix(pattern))
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl Automaton for RegexAutomaton {
    type State = Vec<u8>;

    fn start(&self) -> Vec<u8> {
        Vec::new()
    }

    fn is_match(&self, state: &Vec<u8>) -> bool {
        std::str::from_utf8(state).map_or(false, |term| self.regex.is_match(term))
    }

    fn can_match(&self, state: &Vec<u8>) -> bool {
        let prefix = self.prefix.as_bytes();
        if state.len() <= prefix.len() {
            prefix.starts_with(state)
        } else {
            state.starts_with(prefix)
        }
    }

    fn accept(&self, state: &Vec<u8>, byte: u8) -> Vec<u8> {
        let mut next = Vec::with_capacity(state.len() + 1);
        next.extend_from_slice(state);
        next.push(byte);
        next
    }
}

/// Convert wildcard pattern to regex syntax
pub fn wildcard_to_regex(pattern: &str) -> String {
    let mut regex_pattern = String::with_capacity(pattern.len() * 2);
    let mut literal = [0u8; 4];
    for ch in pattern.chars() {
        match ch {
            '*' => regex_pattern.push_str(".*"),
            '?' => regex_pattern.push('.'),
            _ => regex_pattern.push_str(&regex::escape(ch.encode_utf8(&mut literal))),
        }
    }
    regex_pattern
}

/// Longest prefix before the first wildcard character
pub fn wildcard_prefix(pattern: &str) -> String {
    pattern.chars().take_while(|&ch| ch != '*' && ch != '?').collect()
}

/// Conservative literal prefix of a regex: plain characters up to the
/// first metacharacter, minus any character a quantifier makes optional
fn regex_literal_prefix(pattern: &str) -> String {
    if pattern.contains('|') {
        return String::new();
    }
    let mut prefix = String::new();
    let mut chars = pattern.chars().peekable();
    while let Some(ch) = chars.next() {
        if !(ch.is_alphanumeric() || ch == '_' || ch == '-') {
            break;
        }
        if matches!(chars.peek(), Some('*' | '?' | '{')) {
            break;
        }
        prefix.push(ch);
    }
    prefix
}

/// Terms within a bounded byte-level edit distance of a target
#[derive(Clone, Debug)]
pub struct LevenshteinAutomaton {
    target: Vec<u8>,
    max_distance: usize,
}

impl LevenshteinAutomaton {
    pub fn new(target: &str, max_distance: usize) -> Self {
        Self {
            target: target.as_bytes().to_vec(),
            max_distance,
        }
    }
}

impl Automaton for LevenshteinAutomaton {
    /// Distances from the input so far to every prefix of the target
    type State = Vec<usize>;

    fn start(&self) -> Vec<usize> {
        (0..=self.target.len()).collect()
    }

    fn is_match(&self, state: &Vec<usize>) -> bool {
        state.last().map_or(false, |&d| d <= self.max_distance)
    }

    fn can_match(&self, state: &Vec<usize>) -> bool {
        state.iter().min().map_or(false, |&d| d <= self.max_distance)
    }

    fn accept(&self, state: &Vec<usize>, byte: u8) -> Vec<usize> {
        let mut next = Vec::with_capacity(state.len());
        next.push(state[0] + 1);
        for (i, &target_byte) in self.target.iter().enumerate() {
            let cost = usize::from(target_byte != byte);
            let value = (state[i + 1] + 1).min(next[i] + 1).min(state[i] + cost);
            next.push(value);
        }
        next
    }
}

/// Edit distance between two strings, counted in characters
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b.len()).collect();
    for (i, ca) in a.chars().enumerate() {
        let mut prev = row[0];
        row[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let current = row[j + 1];
            row[j + 1] = (current + 1).min(row[j] + 1).min(prev + usize::from(ca != cb));
            prev = current;
        }
    }
    row[b.len()]
}
