use core::{iter::Peekable, str::Chars};

use cql_core::Token;

use crate::{
    command::Command,
    error::{LexError, Location},
};

/// Character-level scanner (pass 1).
///
/// Consumes a full chunk of command text and splits it on `;` into raw
/// commands, one token per lexeme. Whitespace is skipped, `--` comments
/// are skipped through the end of the line, alphabetic runs are
/// lowercased, and a string literal is emitted as an opening quote
/// token, one body token and a closing quote token; fusing those into a
/// single literal is deep partition's job.
pub struct Lexer<'a> {
    iter: Peekable<Chars<'a>>,
    location: Location,
}

impl<'a> Lexer<'a> {
    /// Creates a new scanner for the given input.
    pub fn new(input: &'a str) -> Self {
        Self {
            iter: input.chars().peekable(),
            location: Location::default(),
        }
    }

    /// Returns the current location scanned by the lexer.
    pub fn location(&self) -> Location {
        self.location
    }

    /// Scans the whole input into raw commands.
    ///
    /// Empty commands (e.g. `;;`) are kept here and dropped by the
    /// caller, so that `1;;2` still yields two non-empty commands.
    pub fn scan(&mut self) -> Result<Vec<Command>, LexError> {
        let mut commands = Vec::new();
        let mut current = Command::default();
        while let Some(&ch) = self.iter.peek() {
            match ch {
                ' ' | '\t' | '\n' | '\r' => {
                    self.next_char();
                }
                ';' => {
                    self.next_char();
                    commands.push(core::mem::take(&mut current));
                }
                '-' => {
                    self.next_char();
                    if self.next_if_is('-') {
                        // comment: scan until the end of the line
                        self.next_while(|&c| c != '\n');
                    } else {
                        current.tokens.push(Token::Minus);
                    }
                }
                '\'' => {
                    self.next_char();
                    let body = self.next_while(|&c| c != '\'');
                    if !self.next_if_is('\'') {
                        return Err(LexError::scan(
                            "unterminated string literal",
                            self.location,
                        ));
                    }
                    current.tokens.push(Token::Quote);
                    current.tokens.push(Token::Text(body));
                    current.tokens.push(Token::Quote);
                }
                c if c.is_ascii_alphabetic() => {
                    let word = self.next_while(|c| c.is_ascii_alphabetic());
                    current.tokens.push(Token::word(word.to_lowercase()));
                }
                c if c.is_ascii_digit() || c == '.' => {
                    let number = self.next_while(|&c| c.is_ascii_digit() || c == '.');
                    current.tokens.push(Token::Number(number));
                }
                _ => {
                    self.next_char();
                    current.tokens.push(symbol(ch));
                }
            }
        }
        if !current.is_empty() {
            commands.push(current);
        }
        Ok(commands)
    }

    /// Consumes the next character and records the current location.
    fn next_char(&mut self) -> Option<char> {
        let ch = self.iter.next()?;
        self.location.advance(ch);
        Some(ch)
    }

    /// Consumes the next character if it matches `ch`.
    #[inline]
    fn next_if_is(&mut self, ch: char) -> bool {
        if self.iter.next_if_eq(&ch).is_some() {
            self.location.advance(ch);
            true
        } else {
            false
        }
    }

    /// Grabs the next characters that match the predicate, as a string.
    fn next_while<F: Fn(&char) -> bool>(&mut self, predicate: F) -> String {
        let mut value = String::new();
        while let Some(ch) = self.iter.next_if(&predicate) {
            self.location.advance(ch);
            value.push(ch);
        }
        value
    }
}

fn symbol(ch: char) -> Token {
    match ch {
        ',' => Token::Comma,
        ':' => Token::Colon,
        '(' => Token::LeftParen,
        ')' => Token::RightParen,
        '{' => Token::LeftBrace,
        '}' => Token::RightBrace,
        '=' => Token::Equal,
        '<' => Token::LessThan,
        '>' => Token::GreaterThan,
        '+' => Token::Plus,
        '*' => Token::Asterisk,
        '/' => Token::Slash,
        '%' => Token::Percent,
        '^' => Token::Caret,
        '~' => Token::Tilde,
        '!' => Token::Exclamation,
        '#' => Token::Sharp,
        '@' => Token::At,
        other => Token::Other(other),
    }
}
