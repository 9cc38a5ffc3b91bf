use crate::error::{LexError, LexErrorKind};
use crate::token::*;
use plex::lexer;
use util::Spanned;

pub type Result = std::result::Result<(usize, Token, usize), LexError>;

#[derive(Debug, Clone, PartialEq)]
enum LexToken {
    Tok(Token),
    Space,
    Error(LexErrorKind),
}

use LexToken::*;

lexer! {
    fn next_token(text: 'input) -> LexToken;

    r"[\t\r ]" => Space,
    r"#[^\n]*" => Space,
    r"\n" => Tok(Token::Newline),
    r"\(" => Tok(Token::LPar),
    r"\)" => Tok(Token::RPar),
    r"\{" => Tok(Token::LBrace),
    r"\}" => Tok(Token::RBrace),
    "method" => Tok(Token::Method),
    "locals" => Tok(Token::Locals),
    "indirect" => Tok(Token::Indirect),
    "clause" => Tok(Token::Clause),
    "in" => Tok(Token::In),
    "try" => Tok(Token::Try),
    "handler" => Tok(Token::Handler),
    r"\-?[0-9]+" => {
        if let Ok(i) = text.parse() {
            Tok(Token::Int(i))
        } else {
            Error(LexErrorKind::TooLargeInteger(text.to_owned()))
        }
    },
    r"\->" => Tok(Token::Arrow),
    "," => Tok(Token::Comma),
    ":" => Tok(Token::Colon),
    ";" => Tok(Token::SemiColon),
    "=" => Tok(Token::Equal),
    r"[A-Za-z_][0-9A-Za-z_\.]*" => Tok(Token::Ident(text.to_owned())),
    r"." => Error(LexErrorKind::UnrecognizedToken(text.to_owned()))
}

pub struct Lexer<'input> {
    original: &'input str,
    remaining: &'input str,
}

impl<'input> Lexer<'input> {
    #[inline]
    pub fn new(s: &'input str) -> Self {
        Lexer {
            original: s,
            remaining: s,
        }
    }
}

impl<'input> Iterator for Lexer<'input> {
    type Item = Result;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((tok, remaining)) = next_token(self.remaining) {
                let lo = self.original.len() - self.remaining.len();
                let hi = self.original.len() - remaining.len();
                self.remaining = remaining;

                match tok {
                    Space => continue,
                    Tok(tok) => return Some(Ok((lo, tok, hi))),
                    Error(e) => return Some(Err(Spanned::new(e, (lo, hi)))),
                }
            } else {
                // EOF
                return None;
            };
        }
    }
}
