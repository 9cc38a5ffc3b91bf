use thiserror::Error;
use lalrpop_util;

use util::Spanned;
use crate::token;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LexErrorKind {
    #[error("unrecognized token `{0}`")]
    UnrecognizedToken(String),
    #[error("integer constant `{0}` is too large")]
    TooLargeInteger(String),
}

pub type LexError = Spanned<LexErrorKind>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseErrorKind {
    #[error("parse error: unexpected end of file")]
    Eof,
    #[error("lexer error: {0}")]
    Lexical(LexErrorKind),
    #[error("parse error: found extra token `{0}`")]
    ExtraToken(token::Token),
    #[error("parse error: unrecognized token `{0}`, expected {1}")]
    UnrecognizedToken(token::Token, String),
    #[error("unknown opcode `{0}`")]
    UnknownOpcode(String),
    #[error("unknown clause kind `{0}`")]
    UnknownClauseKind(String),
    #[error("undeclared variable `{0}`")]
    UnknownVariable(String),
    #[error("variable `{0}` is declared twice")]
    DuplicateVariable(String),
    #[error("unknown block `{0}`")]
    UnknownBlock(String),
    #[error("block `{0}` is defined twice")]
    DuplicateBlock(String),
    #[error("clause {0} is not declared in order")]
    ClauseOrder(i64),
    #[error("`{0}` needs an integer operand")]
    MissingImmediate(String),
    #[error("unexpected integer operand `{0}`")]
    UnexpectedImmediate(i64),
    #[error("declarations must come before the first block")]
    MisplacedDeclaration,
    #[error("instruction outside of any block")]
    OutsideBlock,
    #[error("method `{0}` has no blocks")]
    EmptyMethod(String),
    #[error("malformed method: {0}")]
    Graph(#[from] ir::GraphError),
}

pub type ParseError = Spanned<ParseErrorKind>;

type LalrpopError = lalrpop_util::ParseError<usize, token::Token, LexError>;

pub fn from_lalrpop(err: LalrpopError) -> ParseError {
    match err {
        LalrpopError::InvalidToken { location } => Spanned::new(ParseErrorKind::Eof, (location, location)),
        LalrpopError::ExtraToken { token: (lo, tok, hi) } => Spanned::new(ParseErrorKind::ExtraToken(tok), (lo, hi)),
        LalrpopError::User { error } => error.map(ParseErrorKind::Lexical),
        LalrpopError::UnrecognizedToken {
            token: (lo, tok, hi),
            expected,
        } => {
            // report only the first candidate
            let expected = expected.first().cloned().unwrap_or_default();
            Spanned::new(ParseErrorKind::UnrecognizedToken(tok, expected), (lo, hi))
        }
        LalrpopError::UnrecognizedEOF { location, .. } => Spanned::new(ParseErrorKind::Eof, (location, location)),
    }
}
