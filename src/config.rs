use serde::{Deserialize, Serialize};

/// Adapter configuration
///
/// Every section falls back to its defaults, so hosts can deserialize a
/// partial document in whatever format they keep their settings in.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SourConfig {
    pub tokenizer: TokenizerConfig,
    pub similarity: Bm25Params,
}

impl SourConfig {
    pub fn with_tokenizer(mut self, tokenizer: TokenizerConfig) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    pub fn with_similarity(mut self, similarity: Bm25Params) -> Self {
        self.similarity = similarity;
        self
    }
}

/// Tokenizer configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenizerConfig {
    pub lowercase: bool,
    pub remove_stopwords: bool,
    pub stem: bool,
    pub min_token_length: usize,
    pub max_token_length: usize,
    pub language: String,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            lowercase: true,
            remove_stopwords: false,
            stem: false,
            min_token_length: 1,
            max_token_length: 255,
            language: "english".to_string(),
        }
    }
}

/// BM25 parameters
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bm25Params {
    /// Term frequency saturation parameter
    pub k1: f32,
    /// Length normalization parameter
    pub b: f32,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self { k1: 1.2, b: 0.75 }
    }
}
