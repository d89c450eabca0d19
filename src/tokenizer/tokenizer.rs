use rust_stemmers::{Algorithm, Stemmer};
use std::collections::HashSet;
use stop_words::{get, LANGUAGE};
use unicode_segmentation::UnicodeSegmentation;

use crate::config::TokenizerConfig;

/// A single analyzed token
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub term: String,
    /// Byte offset of the first byte of the source word
    pub start: usize,
    /// Byte offset one past the last byte of the source word
    pub end: usize,
    /// 1-based token position; filtered words still consume a position
    pub position: usize,
}

/// Text tokenizer with stemming and stopword removal
pub struct Tokenizer {
    config: TokenizerConfig,
    stemmer: Option<Stemmer>,
    stopwords: HashSet<String>,
}

impl Tokenizer {
    /// Create a new tokenizer from configuration
    pub fn new(config: &TokenizerConfig) -> Self {
        let (algorithm, language) = match config.language.to_lowercase().as_str() {
            "english" => (Algorithm::English, LANGUAGE::English),
            "french" => (Algorithm::French, LANGUAGE::French),
            "german" => (Algorithm::German, LANGUAGE::German),
            "spanish" => (Algorithm::Spanish, LANGUAGE::Spanish),
            "italian" => (Algorithm::Italian, LANGUAGE::Italian),
            "portuguese" => (Algorithm::Portuguese, LANGUAGE::Portuguese),
            "russian" => (Algorithm::Russian, LANGUAGE::Russian),
            other => {
                tracing::warn!(language = other, "unsupported tokenizer language, using english");
                (Algorithm::English, LANGUAGE::English)
            }
        };

        let stemmer = if config.stem {
            Some(Stemmer::create(algorithm))
        } else {
            None
        };

        let stopwords = if config.remove_stopwords {
            get(language)
                .into_iter()
                .map(|s| s.to_lowercase())
                .collect()
        } else {
            HashSet::new()
        };

        Self {
            config: config.clone(),
            stemmer,
            stopwords,
        }
    }

    /// Tokenize text into a vector of terms
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        self.tokens(text).into_iter().map(|token| token.term).collect()
    }

    /// Tokenize text keeping byte offsets and positions
    ///
    /// Words dropped by the length or stopword filters still advance the
    /// position counter, so phrase distances survive filtering.
    pub fn tokens(&self, text: &str) -> Vec<Token> {
        let mut results = Vec::new();
        let mut position = 0usize;

        for (start, word) in text.unicode_word_indices() {
            position += 1;

            let mut term = if self.config.lowercase {
                word.to_lowercase()
            } else {
                word.to_string()
            };

            let len = term.chars().count();
            if len < self.config.min_token_length || len > self.config.max_token_length {
                continue;
            }

            if self.stopwords.contains(&term) {
                continue;
            }

            if let Some(stemmer) = &self.stemmer {
                term = stemmer.stem(&term).into_owned();
            }

            results.push(Token {
                term,
                start,
                end: start + word.len(),
                position,
            });
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain_config() -> TokenizerConfig {
        TokenizerConfig {
            lowercase: true,
            remove_stopwords: false,
            stem: false,
            min_token_length: 2,
            max_token_length: 50,
            language: "english".to_string(),
        }
    }

    #[test]
    fn test_basic_tokenization() {
        let tokenizer = Tokenizer::new(&plain_config());
        let tokens = tokenizer.tokenize("Hello World! This is a test.");

        assert!(tokens.contains(&"hello".to_string()));
        assert!(tokens.contains(&"world".to_string()));
        assert!(tokens.contains(&"test".to_string()));
        assert!(!tokens.contains(&"a".to_string()));
    }

    #[test]
    fn test_stopword_removal() {
        let config = TokenizerConfig {
            remove_stopwords: true,
            ..plain_config()
        };

        let tokenizer = Tokenizer::new(&config);
        let tokens = tokenizer.tokenize("This is a document about the system");

        assert!(!tokens.contains(&"this".to_string()));
        assert!(!tokens.contains(&"is".to_string()));
        assert!(!tokens.contains(&"the".to_string()));
        assert!(tokens.contains(&"document".to_string()));
    }

    #[test]
    fn test_stemming() {
        let config = TokenizerConfig {
            stem: true,
            ..plain_config()
        };

        let tokenizer = Tokenizer::new(&config);
        let tokens = tokenizer.tokenize("running runs runner");

        assert!(tokens.iter().all(|t| t.starts_with("run")));
    }

    #[test]
    fn test_min_max_token_length() {
        let config = TokenizerConfig {
            min_token_length: 3,
            max_token_length: 5,
            ..plain_config()
        };

        let tokenizer = Tokenizer::new(&config);
        let tokens = tokenizer.tokenize("a ab abc abcd abcde abcdef");

        assert_eq!(tokens, vec!["abc", "abcd", "abcde"]);
    }

    #[test]
    fn test_tokens_offsets_and_positions() {
        let tokenizer = Tokenizer::new(&plain_config());
        let tokens = tokenizer.tokens("Software Developer");

        assert_eq!(
            tokens,
            vec![
                Token {
                    term: "software".to_string(),
                    start: 0,
                    end: 8,
                    position: 1,
                },
                Token {
                    term: "developer".to_string(),
                    start: 9,
                    end: 18,
                    position: 2,
                },
            ]
        );
    }

    #[test]
    fn test_filtered_words_keep_positions() {
        let config = TokenizerConfig {
            remove_stopwords: true,
            ..plain_config()
        };

        let tokenizer = Tokenizer::new(&config);
        let tokens = tokenizer.tokens("rust the programming");

        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].position, 1);
        assert_eq!(tokens[1].term, "programming");
        assert_eq!(tokens[1].position, 3);
    }

    #[test]
    fn test_unknown_language_falls_back() {
        let config = TokenizerConfig {
            stem: true,
            language: "klingon".to_string(),
            ..plain_config()
        };

        let tokenizer = Tokenizer::new(&config);
        assert_eq!(tokenizer.tokenize("running"), vec!["run"]);
    }
}
