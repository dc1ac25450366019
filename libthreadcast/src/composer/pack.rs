//! Greedy packing of tokens into budget-bounded segments

use super::tokens::{join, joined_len, sentences, Token};
use crate::types::TruncatedToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Separator {
    Paragraph,
    Space,
}

impl Separator {
    fn as_str(self) -> &'static str {
        match self {
            Separator::Paragraph => "\n\n",
            Separator::Space => " ",
        }
    }

    fn len(self) -> usize {
        match self {
            Separator::Paragraph => 2,
            Separator::Space => 1,
        }
    }
}

/// Output of [`pack`]: raw segment texts in order, before indicators
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Packed {
    pub segments: Vec<String>,
    pub truncated: Vec<TruncatedToken>,
}

struct Packer {
    budget: usize,
    segments: Vec<String>,
    current: String,
    current_len: usize,
    truncated: Vec<TruncatedToken>,
}

impl Packer {
    fn new(budget: usize) -> Self {
        Self {
            budget,
            segments: Vec::new(),
            current: String::new(),
            current_len: 0,
            truncated: Vec::new(),
        }
    }

    /// Append a piece that is known to fit the budget on its own.
    fn push(&mut self, piece: &str, len: usize, sep: Separator) {
        debug_assert!(len <= self.budget);

        if self.current.is_empty() {
            self.current.push_str(piece);
            self.current_len = len;
            return;
        }

        if self.current_len + sep.len() + len <= self.budget {
            self.current.push_str(sep.as_str());
            self.current.push_str(piece);
            self.current_len += sep.len() + len;
        } else {
            self.flush();
            self.current.push_str(piece);
            self.current_len = len;
        }
    }

    fn flush(&mut self) {
        if !self.current.is_empty() {
            self.segments.push(std::mem::take(&mut self.current));
            self.current_len = 0;
        }
    }

    /// Order of the segment currently being filled
    fn current_order(&self) -> usize {
        self.segments.len() + 1
    }

    fn push_tokens(&mut self, tokens: &[Token<'_>], sep: Separator) {
        for (i, token) in tokens.iter().enumerate() {
            let sep = if i == 0 { sep } else { Separator::Space };
            if token.chars <= self.budget {
                self.push(token.text, token.chars, sep);
            } else {
                self.force_split(token, sep);
            }
        }
    }

    /// Last resort for a single token longer than the budget: cut it on
    /// char boundaries into budget-sized pieces.
    fn force_split(&mut self, token: &Token<'_>, sep: Separator) {
        let chars: Vec<char> = token.text.chars().collect();
        let mut first_segment = None;
        let mut pieces = 0;

        for (i, chunk) in chars.chunks(self.budget).enumerate() {
            let piece: String = chunk.iter().collect();
            let sep = if i == 0 { sep } else { Separator::Space };
            self.push(&piece, chunk.len(), sep);
            if first_segment.is_none() {
                first_segment = Some(self.current_order());
            }
            pieces += 1;
        }

        self.truncated.push(TruncatedToken {
            kind: token.kind,
            char_count: token.chars,
            first_segment: first_segment.unwrap_or_else(|| self.current_order()),
            pieces,
        });
    }

    fn finish(mut self) -> Packed {
        self.flush();
        Packed {
            segments: self.segments,
            truncated: self.truncated,
        }
    }
}

/// Pack tokenized paragraphs into segments of at most `budget` characters.
///
/// Whole paragraphs are preferred; a paragraph over budget is packed
/// sentence by sentence, and a sentence over budget word by word.
pub fn pack(paragraphs: &[Vec<Token<'_>>], budget: usize) -> Packed {
    let mut packer = Packer::new(budget.max(1));

    for tokens in paragraphs.iter().filter(|p| !p.is_empty()) {
        let paragraph_len = joined_len(tokens);
        if paragraph_len <= packer.budget {
            packer.push(&join(tokens), paragraph_len, Separator::Paragraph);
            continue;
        }

        for (i, sentence) in sentences(tokens).into_iter().enumerate() {
            let sep = if i == 0 {
                Separator::Paragraph
            } else {
                Separator::Space
            };
            let sentence_len = joined_len(sentence);
            if sentence_len <= packer.budget {
                packer.push(&join(sentence), sentence_len, sep);
            } else {
                packer.push_tokens(sentence, sep);
            }
        }
    }

    packer.finish()
}
