//! Paragraph normalization and tokenization
//!
//! Segmentation works over an explicit token list: every word and every URL
//! is an atomic [`Token`]. Segment boundaries may only fall between tokens.

use crate::types::TokenKind;

/// Characters allowed to trail sentence-ending punctuation ("end." or end!")
const CLOSING: &[char] = &['"', '\'', ')', ']', '}', '”', '’', '»'];

const SENTENCE_END: &[char] = &['.', '!', '?', '…'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub text: &'a str,
    pub kind: TokenKind,
    /// Length in Unicode scalar values
    pub chars: usize,
}

impl<'a> Token<'a> {
    pub fn new(text: &'a str) -> Self {
        let kind = if is_url(text) {
            TokenKind::Url
        } else {
            TokenKind::Word
        };
        Self {
            text,
            kind,
            chars: text.chars().count(),
        }
    }

    /// Whether a sentence ends after this token.
    ///
    /// URLs never end a sentence, even when they contain or end in a dot.
    pub fn ends_sentence(&self) -> bool {
        if self.kind == TokenKind::Url {
            return false;
        }
        self.text
            .trim_end_matches(CLOSING)
            .ends_with(SENTENCE_END)
    }
}

/// Split content into whitespace-normalized paragraphs.
///
/// Paragraphs are separated by one or more blank (or whitespace-only) lines.
/// Inside a paragraph every whitespace run, single newlines included,
/// collapses to one space.
pub fn paragraphs(content: &str) -> Vec<String> {
    let normalized = content.replace("\r\n", "\n").replace('\r', "\n");
    let mut paragraphs = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in normalized.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                paragraphs.push(current.join(" "));
                current.clear();
            }
        } else {
            current.extend(line.split_whitespace());
        }
    }

    if !current.is_empty() {
        paragraphs.push(current.join(" "));
    }

    paragraphs
}

pub fn tokenize(paragraph: &str) -> Vec<Token<'_>> {
    paragraph.split_whitespace().map(Token::new).collect()
}

/// Group tokens into sentences. The last group may lack terminal punctuation.
pub fn sentences<'t, 'a>(tokens: &'t [Token<'a>]) -> Vec<&'t [Token<'a>]> {
    let mut sentences = Vec::new();
    let mut start = 0;

    for (i, token) in tokens.iter().enumerate() {
        if token.ends_sentence() {
            sentences.push(&tokens[start..=i]);
            start = i + 1;
        }
    }

    if start < tokens.len() {
        sentences.push(&tokens[start..]);
    }

    sentences
}

/// Length of tokens joined by single spaces
pub fn joined_len(tokens: &[Token<'_>]) -> usize {
    let chars: usize = tokens.iter().map(|t| t.chars).sum();
    chars + tokens.len().saturating_sub(1)
}

pub fn join(tokens: &[Token<'_>]) -> String {
    tokens
        .iter()
        .map(|t| t.text)
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_url(word: &str) -> bool {
    let lower = word.to_lowercase();
    let lower = lower.trim_start_matches(['(', '[', '<', '"', '\'']);
    lower.starts_with("http://")
        || lower.starts_with("https://")
        || lower.starts_with("www.")
        || lower.contains("://")
}
