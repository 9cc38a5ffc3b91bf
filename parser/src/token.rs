use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Method,
    Locals,
    Indirect,
    Clause,
    In,
    Try,
    Handler,
    Ident(String),
    Int(i64),
    LPar,
    RPar,
    LBrace,
    RBrace,
    Comma,
    Colon,
    SemiColon,
    Equal,
    Arrow,
    Newline,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use Token::*;
        match self {
            Method => write!(f, "method"),
            Locals => write!(f, "locals"),
            Indirect => write!(f, "indirect"),
            Clause => write!(f, "clause"),
            In => write!(f, "in"),
            Try => write!(f, "try"),
            Handler => write!(f, "handler"),
            Ident(x) => write!(f, "{x}"),
            Int(i) => write!(f, "{i}"),
            LPar => write!(f, "("),
            RPar => write!(f, ")"),
            LBrace => write!(f, "{{"),
            RBrace => write!(f, "}}"),
            Comma => write!(f, ","),
            Colon => write!(f, ":"),
            SemiColon => write!(f, ";"),
            Equal => write!(f, "="),
            Arrow => write!(f, "->"),
            Newline => write!(f, "newline"),
        }
    }
}
