/*
 * Input side of the decoder. The tagger output is a text stream where `# doc_id = <id>` lines
 * start a document, short lines end a sentence and every other line is a token with
 * tab-separated fields: word, span, mention id, ..., label.
*/
use crate::config::Encoding;
use crate::error::DecodeError;
use crate::label::{TokenLabel, OUTSIDE};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::io::BufRead;
use std::str::FromStr;
use tracing::warn;

pub const DOC_ID_MARKER: &str = "# doc_id = ";
/// Lines with at most this many characters (line break included) separate sentences.
const SENTENCE_BREAK_MAX_CHARS: usize = 2;
const SEP_COLUMN: char = '\t';
const SEP_SPAN: char = '-';
/// word, span, mention id and label.
const MIN_COLUMNS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
/// Character offsets of a token or mention.
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }
}

impl FromStr for Span {
    type Err = std::num::ParseIntError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) = s.split_once(SEP_SPAN).unwrap_or((s, ""));
        Ok(Span {
            start: start.trim().parse()?,
            end: end.trim().parse()?,
        })
    }
}

impl Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}{}", self.start, SEP_SPAN, self.end)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    /// Index of the token in its sentence.
    pub position: usize,
    pub text: String,
    pub span: Span,
    /// Gold mention identifier. `None` when the column holds the outside marker.
    pub mention_id: Option<String>,
    pub label: TokenLabel,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Sentence {
    pub tokens: Vec<Token>,
}

impl Sentence {
    pub fn len(&self) -> usize {
        self.tokens.len()
    }
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    pub id: String,
    pub sentences: Vec<Sentence>,
}

impl Document {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Document {
            id: id.into(),
            sentences: Vec::new(),
        }
    }
}

/// Reads every document of a stream. Only I/O errors are fatal. A document marker seen twice
/// resumes the document it names.
pub fn read_documents<R: BufRead>(
    reader: R,
    encoding: Encoding,
) -> Result<Vec<Document>, DecodeError> {
    let mut builder = DocumentsBuilder::new(encoding);
    for line in reader.lines() {
        builder.push_line(&line?);
    }
    Ok(builder.finish())
}

/// Same as `read_documents` for an in-memory input.
pub fn parse_documents(input: &str, encoding: Encoding) -> Vec<Document> {
    let mut builder = DocumentsBuilder::new(encoding);
    for line in input.lines() {
        builder.push_line(line);
    }
    builder.finish()
}

/// Line-driven state machine behind `read_documents`.
struct DocumentsBuilder {
    encoding: Encoding,
    documents: Vec<Document>,
    /// Index of the current document in `documents`.
    current: Option<usize>,
    tokens: Vec<Token>,
    line_number: usize,
}

impl DocumentsBuilder {
    fn new(encoding: Encoding) -> Self {
        DocumentsBuilder {
            encoding,
            documents: Vec::new(),
            current: None,
            tokens: Vec::new(),
            line_number: 0,
        }
    }

    fn push_line(&mut self, line: &str) {
        self.line_number += 1;
        let line = line.trim_end_matches(&['\n', '\r'][..]);
        // The line break is not part of `line` anymore.
        if line.chars().count() < SENTENCE_BREAK_MAX_CHARS {
            self.flush_sentence();
            return;
        }
        if let Some(id) = line.strip_prefix(DOC_ID_MARKER) {
            self.flush_sentence();
            self.open_document(id.trim());
            return;
        }
        match self.parse_token(line) {
            Some(token) => self.tokens.push(token),
            None => warn!(line = self.line_number, content = line, "Malformed token line skipped"),
        }
    }

    fn parse_token(&self, line: &str) -> Option<Token> {
        let columns: Vec<&str> = line.split(SEP_COLUMN).collect();
        if columns.len() < MIN_COLUMNS {
            return None;
        }
        let span = columns[1].parse::<Span>().ok()?;
        let mention_id = match columns[2] {
            OUTSIDE | "" => None,
            id => Some(id.to_string()),
        };
        let label = TokenLabel::parse(columns[columns.len() - 1], self.encoding);
        Some(Token {
            position: self.tokens.len(),
            text: columns[0].to_string(),
            span,
            mention_id,
            label,
        })
    }

    fn open_document(&mut self, id: &str) {
        let index = match self.documents.iter().position(|d| d.id == id) {
            Some(index) => index,
            None => {
                self.documents.push(Document::new(id));
                self.documents.len() - 1
            }
        };
        self.current = Some(index);
    }

    fn flush_sentence(&mut self) {
        if self.tokens.is_empty() {
            return;
        }
        let tokens = std::mem::take(&mut self.tokens);
        match self.current {
            Some(index) => self.documents[index].sentences.push(Sentence { tokens }),
            None => warn!(
                line = self.line_number,
                tokens = tokens.len(),
                "Tokens found before any document marker were skipped"
            ),
        }
    }

    fn finish(mut self) -> Vec<Document> {
        self.flush_sentence();
        self.documents
    }
}
