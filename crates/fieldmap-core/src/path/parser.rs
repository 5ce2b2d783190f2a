//! Path expression parser
//!
//! A small recursive descent parser for dotted/bracketed paths such as
//! `user.addresses[0].street`.
//!
//! Copyright (c) 2025 Fieldmap Team
//! Licensed under the Apache-2.0 license

use super::error::PathError;
use std::iter::Peekable;
use std::str::Chars;

/// A single step of a path expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Descend into a mapping by key
    Key(String),
    /// Index into a sequence
    Index(usize),
}

/// Path expression parser
pub struct Parser<'a> {
    /// Input string being parsed
    input: &'a str,
    /// Character iterator
    chars: Peekable<Chars<'a>>,
    /// Current position in input (characters consumed)
    position: usize,
}

impl<'a> Parser<'a> {
    /// Create a new parser for the given input
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.chars().peekable(),
            position: 0,
        }
    }

    /// Parse the expression into its segments
    pub fn parse(mut self) -> Result<Vec<Segment>, PathError> {
        self.skip_root();
        let mut segments = Vec::new();

        while let Some(ch) = self.current_char() {
            match ch {
                '.' => {
                    // empty segments are ignored
                    self.advance();
                }
                '[' => segments.push(self.parse_index()?),
                ']' => {
                    return Err(PathError::syntax("unexpected ']'", self.position, self.input));
                }
                _ => segments.push(Segment::Key(self.parse_key())),
            }
        }

        Ok(segments)
    }

    /// Skip a leading `/` or `$` root marker
    fn skip_root(&mut self) {
        match self.current_char() {
            Some('/') => self.advance(),
            Some('$') => {
                let mut lookahead = self.input.chars().skip(1);
                if matches!(lookahead.next(), None | Some('.') | Some('[')) {
                    self.advance();
                }
            }
            _ => {}
        }
    }

    /// Parse `[N]`
    fn parse_index(&mut self) -> Result<Segment, PathError> {
        let open = self.position;
        self.advance(); // consume '['

        let mut digits = String::new();
        loop {
            match self.current_char() {
                Some(']') => break,
                Some(ch) => {
                    digits.push(ch);
                    self.advance();
                }
                None => {
                    return Err(PathError::syntax("unterminated '['", open, self.input));
                }
            }
        }
        self.advance(); // consume ']'

        if digits.is_empty() {
            return Err(PathError::syntax("empty index '[]'", open, self.input));
        }
        if !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(PathError::invalid_index(digits, open + 1, self.input));
        }

        digits
            .parse::<usize>()
            .map(Segment::Index)
            .map_err(|_| PathError::invalid_index(digits.clone(), open + 1, self.input))
    }

    /// Parse a key up to the next separator
    fn parse_key(&mut self) -> String {
        let mut key = String::new();
        while let Some(ch) = self.current_char() {
            if matches!(ch, '.' | '[' | ']') {
                break;
            }
            key.push(ch);
            self.advance();
        }
        key
    }

    fn current_char(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn advance(&mut self) {
        if self.chars.next().is_some() {
            self.position += 1;
        }
    }
}
