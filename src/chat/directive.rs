//! In-band photo directives: `[PHOTO:<description>]` tags embedded in message text.
//!
//! The scanner is a two-state machine. In `Text` it looks for the opening marker,
//! in `Description` it consumes everything up to the first `]`. Input that ends while
//! still inside a description does not produce a directive.

use std::ops::Range;

const TAG_OPEN: &str = "[PHOTO:";
const TAG_CLOSE: char = ']';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoDirective<'a> {
    /// Raw text between `[PHOTO:` and `]`, untrimmed.
    pub description: &'a str,
    /// Byte range of the whole tag inside the scanned content.
    pub span: Range<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedMessage {
    pub visible_text: String,
    pub photo: Option<String>,
}

impl ScannedMessage {
    pub fn has_photo(&self) -> bool {
        self.photo.is_some()
    }
}

#[derive(Debug, Clone, Copy)]
enum ScanState {
    Text,
    Description { tag_start: usize, body_start: usize },
}

pub struct Directives<'a> {
    content: &'a str,
    cursor: usize,
}

impl<'a> Iterator for Directives<'a> {
    type Item = PhotoDirective<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut state = ScanState::Text;
        while self.cursor < self.content.len() {
            let rest = &self.content[self.cursor..];
            match state {
                ScanState::Text => {
                    if rest.starts_with(TAG_OPEN) {
                        state = ScanState::Description {
                            tag_start: self.cursor,
                            body_start: self.cursor + TAG_OPEN.len(),
                        };
                        self.cursor += TAG_OPEN.len();
                        continue;
                    }
                }
                ScanState::Description {
                    tag_start,
                    body_start,
                } => {
                    if rest.starts_with(TAG_CLOSE) {
                        let body_end = self.cursor;
                        self.cursor += TAG_CLOSE.len_utf8();
                        return Some(PhotoDirective {
                            description: &self.content[body_start..body_end],
                            span: tag_start..self.cursor,
                        });
                    }
                }
            }
            self.cursor += rest.chars().next().map_or(1, char::len_utf8);
        }
        None
    }
}

/// Iterates over every well-formed directive in `content`, left to right.
pub fn directives(content: &str) -> Directives<'_> {
    Directives { content, cursor: 0 }
}

pub fn find_first(content: &str) -> Option<PhotoDirective<'_>> {
    directives(content).next()
}

/// Splits a message into the text to display and the first photo description.
///
/// All directive tags are stripped from the visible text, but only the first one
/// is reported.
pub fn scan(content: &str) -> ScannedMessage {
    let mut photo = None;
    let mut segments = Vec::new();
    let mut last = 0;

    for directive in directives(content) {
        if photo.is_none() {
            photo = Some(directive.description.to_string());
        }
        segments.push(&content[last..directive.span.start]);
        last = directive.span.end;
    }

    if photo.is_none() {
        return ScannedMessage {
            visible_text: content.to_string(),
            photo: None,
        };
    }

    segments.push(&content[last..]);
    let visible_text = segments
        .iter()
        .map(|segment| segment.trim())
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    ScannedMessage {
        visible_text,
        photo,
    }
}
