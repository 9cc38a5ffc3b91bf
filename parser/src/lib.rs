pub mod error;
mod lexer;
mod resolve;
pub mod syntax;
mod token;

pub use error::ParseError as Error;
pub use error::ParseErrorKind as ErrorKind;

use ir::Function;

#[macro_use]
extern crate lalrpop_util;

lalrpop_mod!(grammar);

/// Parses every method of a textual CFG file.
#[inline]
pub fn parse(src: &str) -> Result<Vec<Function>, Error> {
    let parser = grammar::MethodsParser::new();
    let lex = lexer::Lexer::new(src);

    let methods = parser.parse(lex).map_err(error::from_lalrpop)?;
    methods.into_iter().map(resolve::method).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ir::{ClauseKind, Opcode, Region};

    const SRC: &str = "
# a diamond
method diamond(a0) {
    locals x, y
    indirect y
    clause 0 catch
    clause 1 finally in 0
entry:
    x = const 1
    branch a0 -> left, right
left try 0:
    y = add x, a0
    -> join
right handler 0:
    call x
    jump -> join
join:
    ret x
}
";

    #[test]
    fn parse_method() {
        let funcs = parse(SRC).unwrap();
        assert_eq!(funcs.len(), 1);
        let f = &funcs[0];
        assert_eq!(f.name, "diamond");
        assert_eq!(f.args.len(), 1);
        assert_eq!(f.num_vars(), 3);
        assert_eq!(f.clauses.len(), 2);
        assert_eq!(f.clauses[1].kind, ClauseKind::Finally);
        assert_eq!(f.clauses[1].parent, Some(0));

        let y = f.find_var("y").unwrap();
        assert!(f.vars[y].indirect);

        let entry = f.find_block("entry").unwrap();
        let left = f.find_block("left").unwrap();
        let right = f.find_block("right").unwrap();
        let join = f.find_block("join").unwrap();
        assert_eq!(f.entry, entry);
        assert_eq!(f.blocks[entry].succs, vec![left, right]);
        assert_eq!(f.blocks[join].preds.len(), 2);
        assert_eq!(f.blocks[left].region, Region::Try(0));
        assert_eq!(f.blocks[right].region, Region::Handler(0));
        assert_eq!(f.blocks[entry].insts[0].op, Opcode::Const(1));
        assert_eq!(f.blocks[left].insts[0].srcs.len(), 2);
    }

    #[test]
    fn several_methods() {
        let src = "method f() {\nb0:\n    ret\n}\n\n\nmethod g(a) {\nb0:\n    ret a\n}";
        let funcs = parse(src).unwrap();
        assert_eq!(funcs.len(), 2);
        assert_eq!(funcs[1].name, "g");
    }

    #[test]
    fn display_reparses() {
        let f = parse(SRC).unwrap().remove(0);
        let g = parse(&f.to_string()).unwrap().remove(0);
        assert_eq!(f.to_string(), g.to_string());
    }

    #[test]
    fn undeclared_variable() {
        let err = parse("method f() {\nb0:\n    x = const 1\n}").unwrap_err();
        assert_eq!(err.item, ErrorKind::UnknownVariable("x".to_string()));
    }

    #[test]
    fn unknown_block() {
        let err = parse("method f() {\nb0:\n    jump -> nowhere\n}").unwrap_err();
        assert_eq!(err.item, ErrorKind::UnknownBlock("nowhere".to_string()));
    }

    #[test]
    fn unknown_opcode_and_eof() {
        let err = parse("method f(a) {\nb0:\n    frob a\n}").unwrap_err();
        assert_eq!(err.item, ErrorKind::UnknownOpcode("frob".to_string()));

        let err = parse("method f(a) {\nb0:\n").unwrap_err();
        assert_eq!(err.item, ErrorKind::Eof);
    }

    #[test]
    fn immediates() {
        let err = parse("method f() {\n    locals x\nb0:\n    x = const\n}").unwrap_err();
        assert_eq!(err.item, ErrorKind::MissingImmediate("const".to_string()));

        let err = parse("method f(a) {\nb0:\n    ret 3\n}").unwrap_err();
        assert_eq!(err.item, ErrorKind::UnexpectedImmediate(3));
    }

    #[test]
    fn layout_errors() {
        let err = parse("method f() {\nb0:\n    locals x\n    ret\n}").unwrap_err();
        assert_eq!(err.item, ErrorKind::MisplacedDeclaration);

        let err = parse("method f() {\n    ret\n}").unwrap_err();
        assert_eq!(err.item, ErrorKind::OutsideBlock);

        let err = parse("method f() {\nb0 b1:\n}").unwrap_err();
        assert!(matches!(err.item, ErrorKind::UnrecognizedToken(..)));
    }

    #[test]
    fn empty_method() {
        let err = parse("method f() {\n}").unwrap_err();
        assert_eq!(err.item, ErrorKind::EmptyMethod("f".to_string()));
    }
}
