//! Hand-written SQL lexer: characters in, a flat token stream out — the
//! same shape as a line-oriented zone-file scanner, generalised to a
//! one-statement-at-a-time grammar instead of one-record-per-line.

use crate::error::TranslateError;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Ident(String),
    Number(String),
    Str(String),
    Param(ParamToken),
    /// Multi-character operators: `<=`, `>=`, `<>`, `!=`.
    Op(&'static str),
    Punct(char),
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParamToken {
    Positional,
    Named(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub position: usize,
}

pub struct Lexer<'a> {
    src: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    named_param_prefix: char,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str, named_param_prefix: char) -> Self {
        Lexer {
            src,
            chars: src.char_indices().peekable(),
            named_param_prefix,
        }
    }

    pub fn tokenize(mut self) -> Result<Vec<Spanned>, TranslateError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace();
            let Some(&(pos, c)) = self.chars.peek() else {
                tokens.push(Spanned {
                    token: Token::Eof,
                    position: self.src.len(),
                });
                return Ok(tokens);
            };
            let token = if c.is_ascii_alphabetic() || c == '_' {
                self.lex_ident()
            } else if c.is_ascii_digit() {
                self.lex_number()
            } else if c == '\'' {
                self.lex_quoted('\'')?
            } else if c == '"' {
                self.lex_quoted('"')?
            } else if c == '?' {
                self.chars.next();
                Token::Param(ParamToken::Positional)
            } else if c == self.named_param_prefix && self.named_param_prefix != ':' || c == ':' {
                self.lex_named_param()
            } else {
                self.lex_operator_or_punct(pos)?
            };
            tokens.push(Spanned { token, position: pos });
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(&(_, c)) = self.chars.peek() {
            if c.is_whitespace() {
                self.chars.next();
            } else {
                break;
            }
        }
    }

    fn lex_ident(&mut self) -> Token {
        let mut s = String::new();
        while let Some(&(_, c)) = self.chars.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                s.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        Token::Ident(s)
    }

    fn lex_number(&mut self) -> Token {
        let mut s = String::new();
        let mut seen_dot = false;
        while let Some(&(_, c)) = self.chars.peek() {
            if c.is_ascii_digit() {
                s.push(c);
                self.chars.next();
            } else if c == '.' && !seen_dot {
                seen_dot = true;
                s.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        Token::Number(s)
    }

    fn lex_quoted(&mut self, quote: char) -> Result<Token, TranslateError> {
        let start = self.chars.next().map(|(p, _)| p).unwrap_or(0);
        let mut s = String::new();
        loop {
            match self.chars.next() {
                Some((_, c)) if c == quote => return Ok(Token::Str(s)),
                Some((_, c)) => s.push(c),
                None => {
                    return Err(TranslateError::SyntaxError {
                        position: start,
                        message: "unterminated string literal".into(),
                    })
                }
            }
        }
    }

    fn lex_named_param(&mut self) -> Token {
        self.chars.next(); // the prefix character
        let mut s = String::new();
        while let Some(&(_, c)) = self.chars.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                s.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        Token::Param(ParamToken::Named(s))
    }

    fn lex_operator_or_punct(&mut self, pos: usize) -> Result<Token, TranslateError> {
        let (_, c) = self.chars.next().unwrap();
        match c {
            '<' => match self.chars.peek() {
                Some(&(_, '=')) => {
                    self.chars.next();
                    Ok(Token::Op("<="))
                }
                Some(&(_, '>')) => {
                    self.chars.next();
                    Ok(Token::Op("<>"))
                }
                _ => Ok(Token::Op("<")),
            },
            '>' => match self.chars.peek() {
                Some(&(_, '=')) => {
                    self.chars.next();
                    Ok(Token::Op(">="))
                }
                _ => Ok(Token::Op(">")),
            },
            '!' => match self.chars.peek() {
                Some(&(_, '=')) => {
                    self.chars.next();
                    Ok(Token::Op("!="))
                }
                _ => Err(TranslateError::SyntaxError {
                    position: pos,
                    message: "unexpected '!'".into(),
                }),
            },
            '=' | '(' | ')' | ',' | '.' | '*' | ';' => Ok(Token::Punct(c)),
            other => Err(TranslateError::SyntaxError {
                position: pos,
                message: format!("unexpected character '{other}'"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(src: &str) -> Vec<Token> {
        Lexer::new(src, ':')
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|s| s.token)
            .collect()
    }

    #[test]
    fn lexes_a_simple_select() {
        let tokens = toks("SELECT p.name FROM Person p");
        assert_eq!(
            tokens,
            vec![
                Token::Ident("SELECT".into()),
                Token::Ident("p".into()),
                Token::Punct('.'),
                Token::Ident("name".into()),
                Token::Ident("FROM".into()),
                Token::Ident("Person".into()),
                Token::Ident("p".into()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn lexes_positional_and_named_params() {
        let tokens = toks("? :name");
        assert_eq!(
            tokens,
            vec![
                Token::Param(ParamToken::Positional),
                Token::Param(ParamToken::Named("name".into())),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn unterminated_string_is_a_syntax_error() {
        assert!(Lexer::new("'abc", ':').tokenize().is_err());
    }
}
