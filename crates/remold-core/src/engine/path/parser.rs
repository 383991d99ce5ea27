//! Path expression parser
//!
//! Recursive descent over the dot/bracket grammar: an optional `$` root,
//! then `.`-separated segments that are either a field name or a field name
//! with a single bracketed index. A bare `[index]` segment is accepted so
//! that paths addressing an array root (`$[0].data`) still compile.
//!
//! Copyright (c) 2025 Remold Team
//! Licensed under the Apache-2.0 license

use super::ast::{CompiledPath, Segment};
use super::PathError;
use std::iter::Peekable;
use std::str::Chars;

/// Path expression parser
pub struct Parser<'a> {
    chars: Peekable<Chars<'a>>,
    position: usize,
}

impl<'a> Parser<'a> {
    /// Create a new parser for the given input
    pub fn new(input: &'a str) -> Result<Self, PathError> {
        if input.trim().is_empty() {
            return Err(PathError::EmptyPath);
        }
        Ok(Self {
            chars: input.chars().peekable(),
            position: 0,
        })
    }

    /// Parse the path expression into its compiled form
    pub fn parse(mut self) -> Result<CompiledPath, PathError> {
        if self.current() == Some('$') {
            self.advance();
            if self.current() == Some('.') {
                self.advance();
            }
        }

        let mut segments = Vec::new();
        loop {
            segments.push(self.parse_segment()?);
            match self.current() {
                None => break,
                Some('.') => {
                    self.advance();
                }
                Some(ch) => {
                    return Err(PathError::UnexpectedChar {
                        found: ch,
                        position: self.position,
                    })
                }
            }
        }

        Ok(CompiledPath::new(segments))
    }

    fn parse_segment(&mut self) -> Result<Segment, PathError> {
        if self.current() == Some('[') {
            let index = self.parse_bracket()?;
            return Ok(Segment::Index { field: None, index });
        }

        let name = self.parse_field_name()?;
        if self.current() == Some('[') {
            let index = self.parse_bracket()?;
            return Ok(Segment::Index {
                field: Some(name),
                index,
            });
        }
        Ok(Segment::Field(name))
    }

    fn parse_field_name(&mut self) -> Result<String, PathError> {
        let mut name = String::new();
        while let Some(ch) = self.current() {
            if ch == '.' || ch == '[' || ch == ']' {
                break;
            }
            name.push(ch);
            self.advance();
        }
        if name.is_empty() {
            return Err(PathError::EmptySegment {
                position: self.position,
            });
        }
        Ok(name)
    }

    fn parse_bracket(&mut self) -> Result<usize, PathError> {
        let start = self.position;
        self.advance(); // consume '['

        let mut digits = String::new();
        while let Some(ch) = self.current() {
            if ch == ']' {
                break;
            }
            digits.push(ch);
            self.advance();
        }
        if self.current() != Some(']') {
            return Err(PathError::UnterminatedBracket { position: start });
        }
        self.advance(); // consume ']'

        digits
            .trim()
            .parse::<usize>()
            .map_err(|_| PathError::InvalidIndex { text: digits })
    }

    fn current(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.chars.next();
        if let Some(c) = ch {
            self.position += c.len_utf8();
        }
        ch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Result<CompiledPath, PathError> {
        Parser::new(input)?.parse()
    }

    #[test]
    fn test_parse_simple_field() {
        let path = parse("name").unwrap();
        assert_eq!(path.segments(), &[Segment::Field("name".to_string())]);
    }

    #[test]
    fn test_parse_dotted_path() {
        let path = parse("a.b.c").unwrap();
        assert_eq!(path.segments().len(), 3);
    }

    #[test]
    fn test_parse_with_root_prefix() {
        let path = parse("$.a.b").unwrap();
        assert_eq!(path.to_string(), "a.b");
    }

    #[test]
    fn test_parse_array_index() {
        let path = parse("items[2].name").unwrap();
        assert_eq!(
            path.segments()[0],
            Segment::Index {
                field: Some("items".to_string()),
                index: 2,
            }
        );
    }

    #[test]
    fn test_parse_bare_index_after_root() {
        let path = parse("$[0].data").unwrap();
        assert_eq!(
            path.segments()[0],
            Segment::Index {
                field: None,
                index: 0,
            }
        );
    }

    #[test]
    fn test_parse_error_empty_input() {
        assert!(matches!(Parser::new(""), Err(PathError::EmptyPath)));
        assert!(matches!(Parser::new("   "), Err(PathError::EmptyPath)));
    }

    #[test]
    fn test_parse_error_trailing_dot() {
        assert!(matches!(
            parse("a."),
            Err(PathError::EmptySegment { .. })
        ));
    }

    #[test]
    fn test_parse_error_double_dot() {
        assert!(matches!(
            parse("a..b"),
            Err(PathError::EmptySegment { .. })
        ));
    }

    #[test]
    fn test_parse_error_unterminated_bracket() {
        assert!(matches!(
            parse("a[2"),
            Err(PathError::UnterminatedBracket { .. })
        ));
    }

    #[test]
    fn test_parse_error_negative_index() {
        assert!(matches!(
            parse("a[-1]"),
            Err(PathError::InvalidIndex { .. })
        ));
    }

    #[test]
    fn test_parse_error_multi_dimensional_index() {
        assert!(matches!(
            parse("a[0][1]"),
            Err(PathError::UnexpectedChar { found: '[', .. })
        ));
    }
}
