use crate::analysis::token::Token;
use unicode_segmentation::UnicodeSegmentation;

/// External collaborator (§6): turns document content into an ordered
/// sequence of normalized term strings. The core treats its output as
/// opaque bytes — case folding, stemming, and language-aware splitting all
/// happen here, never downstream. Empty strings are skipped by the caller,
/// not by the tokenizer itself.
pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<Token>;

    fn name(&self) -> &str;
}

/// Lowercases and splits on Unicode word boundaries, optionally running an
/// English Snowball stemmer over each word. This is the one tokenizer the
/// core ships; richer pipelines (language detection, stopwording) are
/// explicitly out of scope per §1 and live in a collaborator, not here.
pub struct StandardTokenizer {
    pub lowercase: bool,
    pub stem: bool,
    stemmer: Option<rust_stemmers::Stemmer>,
}

impl StandardTokenizer {
    pub fn new(lowercase: bool, stem: bool) -> Self {
        let stemmer = if stem {
            Some(rust_stemmers::Stemmer::create(rust_stemmers::Algorithm::English))
        } else {
            None
        };
        StandardTokenizer { lowercase, stem, stemmer }
    }
}

impl Default for StandardTokenizer {
    fn default() -> Self {
        StandardTokenizer::new(true, false)
    }
}

impl Tokenizer for StandardTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        let folded = if self.lowercase { text.to_lowercase() } else { text.to_string() };

        let mut tokens = Vec::new();
        let mut position = 0u32;
        for word in folded.unicode_words() {
            if word.is_empty() {
                continue;
            }
            let normalized = match &self.stemmer {
                Some(stemmer) => stemmer.stem(word).into_owned(),
                None => word.to_string(),
            };
            tokens.push(Token::new(normalized, position));
            position += 1;
        }
        tokens
    }

    fn name(&self) -> &str {
        "standard"
    }
}
