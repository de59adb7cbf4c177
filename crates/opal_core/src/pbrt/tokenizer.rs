//! Tokenizer for the PBRT statement language.
//!
//! Splits raw scene text into quoted strings, numbers, directive identifiers
//! and brackets, tracking the line each token starts on. `#` comments run to
//! the end of the line.

use thiserror::Error;

use crate::error::ImportError;

/// Errors that can occur while tokenizing or reading statements.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("unexpected end of file")]
    UnexpectedEof,

    #[error("invalid number at line {line}: {value}")]
    InvalidNumber { line: usize, value: String },

    #[error("unterminated string starting at line {0}")]
    UnterminatedString(usize),
}

impl From<ParseError> for ImportError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::Io(e) => ImportError::Io(e),
            ParseError::Parse { line, message } => ImportError::Parse { line, message },
            ParseError::UnexpectedEof => ImportError::Parse {
                line: 0,
                message: "unexpected end of file".to_string(),
            },
            ParseError::InvalidNumber { line, value } => ImportError::Parse {
                line,
                message: format!("invalid number: {}", value),
            },
            ParseError::UnterminatedString(line) => ImportError::Parse {
                line,
                message: "unterminated string".to_string(),
            },
        }
    }
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// A single lexical token.
#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    /// Bare identifier (directive names, `true`/`false`)
    Ident(String),

    /// Quoted string, quotes stripped
    Str(String),

    /// Numeric literal
    Number(f32),

    OpenBracket,
    CloseBracket,
}

impl Token {
    /// Short description for error messages.
    pub fn describe(&self) -> String {
        match self {
            Token::Ident(s) => format!("identifier `{}`", s),
            Token::Str(s) => format!("string \"{}\"", s),
            Token::Number(n) => format!("number {}", n),
            Token::OpenBracket => "`[`".to_string(),
            Token::CloseBracket => "`]`".to_string(),
        }
    }
}

/// Tokenize a whole document, pairing each token with its line number.
pub fn tokenize(content: &str) -> ParseResult<Vec<(Token, usize)>> {
    let mut tokens = Vec::new();
    let mut chars = content.char_indices().peekable();
    let mut line = 1usize;

    while let Some(&(start, c)) = chars.peek() {
        match c {
            '\n' => {
                line += 1;
                chars.next();
            }
            c if c.is_whitespace() => {
                chars.next();
            }
            '#' => {
                // Comment: skip to end of line
                while let Some(&(_, c)) = chars.peek() {
                    if c == '\n' {
                        break;
                    }
                    chars.next();
                }
            }
            '[' => {
                tokens.push((Token::OpenBracket, line));
                chars.next();
            }
            ']' => {
                tokens.push((Token::CloseBracket, line));
                chars.next();
            }
            '"' => {
                let start_line = line;
                chars.next();
                let mut s = String::new();
                let mut closed = false;
                while let Some((_, c)) = chars.next() {
                    match c {
                        '"' => {
                            closed = true;
                            break;
                        }
                        '\n' => {
                            // PBRT strings never span lines
                            return Err(ParseError::UnterminatedString(start_line));
                        }
                        _ => s.push(c),
                    }
                }
                if !closed {
                    return Err(ParseError::UnterminatedString(start_line));
                }
                tokens.push((Token::Str(s), start_line));
            }
            _ => {
                let mut end = start;
                while let Some(&(i, c)) = chars.peek() {
                    if c.is_whitespace() || c == '[' || c == ']' || c == '"' || c == '#' {
                        break;
                    }
                    end = i + c.len_utf8();
                    chars.next();
                }
                let word = &content[start..end];
                let first = word.chars().next().unwrap_or(' ');
                if first.is_ascii_digit() || first == '-' || first == '+' || first == '.' {
                    let value = word.parse::<f32>().map_err(|_| ParseError::InvalidNumber {
                        line,
                        value: word.to_string(),
                    })?;
                    tokens.push((Token::Number(value), line));
                } else {
                    tokens.push((Token::Ident(word.to_string()), line));
                }
            }
        }
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_basic() {
        let tokens = tokenize("Translate 1 -2 3.5").unwrap();
        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[0].0, Token::Ident("Translate".to_string()));
        assert_eq!(tokens[1].0, Token::Number(1.0));
        assert_eq!(tokens[2].0, Token::Number(-2.0));
        assert_eq!(tokens[3].0, Token::Number(3.5));
    }

    #[test]
    fn test_tokenize_strings_and_brackets() {
        let tokens = tokenize("Shape \"sphere\" \"float radius\" [ 2 ]").unwrap();
        assert_eq!(tokens[0].0, Token::Ident("Shape".to_string()));
        assert_eq!(tokens[1].0, Token::Str("sphere".to_string()));
        assert_eq!(tokens[2].0, Token::Str("float radius".to_string()));
        assert_eq!(tokens[3].0, Token::OpenBracket);
        assert_eq!(tokens[4].0, Token::Number(2.0));
        assert_eq!(tokens[5].0, Token::CloseBracket);
    }

    #[test]
    fn test_tokenize_comments_and_lines() {
        let src = "# header\nWorldBegin # trailing\n\nWorldEnd\n";
        let tokens = tokenize(src).unwrap();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0], (Token::Ident("WorldBegin".to_string()), 2));
        assert_eq!(tokens[1], (Token::Ident("WorldEnd".to_string()), 4));
    }

    #[test]
    fn test_tokenize_unterminated_string() {
        let err = tokenize("Shape \"sphere").unwrap_err();
        assert!(matches!(err, ParseError::UnterminatedString(1)));
    }

    #[test]
    fn test_tokenize_bad_number() {
        let err = tokenize("Translate 1 2 3x").unwrap_err();
        assert!(matches!(err, ParseError::InvalidNumber { line: 1, .. }));
    }
}
