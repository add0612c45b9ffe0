//! Expression tree of the source grammar and its parser.
//!
//! `+` binds looser than `*`; `~` and `-` are prefix.

use crate::error::{ConfigError, Result};
use crate::parse::lexer::{Spanned, Token, tokenize};
use chumsky::{input::Stream, input::ValueInput, pratt::*, prelude::*};

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    /// Byte offset of the first token.
    pub pos: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// Dotted name: `process.a`, `True`, `inf`.
    Name(Vec<String>),
    Call { callee: Vec<String>, args: Vec<Arg> },
    Str(String),
    Int(i128),
    Float(f64),
    AlsoRun(Box<Expr>, Box<Expr>),
    AndThen(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
    /// Unary minus, as in `-inf`.
    Neg(Box<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Arg {
    /// Keyword, for `name = value` arguments.
    pub name: Option<String>,
    pub value: Expr,
}

impl Expr {
    pub fn describe(&self) -> String {
        match &self.kind {
            ExprKind::Name(path) => path.join("."),
            ExprKind::Call { callee, .. } => format!("{}(...)", callee.join(".")),
            ExprKind::Str(_) => "string".to_string(),
            ExprKind::Int(_) => "integer".to_string(),
            ExprKind::Float(_) => "number".to_string(),
            ExprKind::AlsoRun(..) => "'*' expression".to_string(),
            ExprKind::AndThen(..) => "'+' expression".to_string(),
            ExprKind::Not(_) => "'~' expression".to_string(),
            ExprKind::Neg(_) => "'-' expression".to_string(),
        }
    }
}

fn node(kind: ExprKind, span: SimpleSpan) -> Expr {
    Expr {
        kind,
        pos: span.start,
    }
}

fn expr_parser<'src, I>() -> impl Parser<'src, I, Expr, extra::Err<Rich<'src, Token>>>
where
    I: ValueInput<'src, Token = Token, Span = SimpleSpan>,
{
    recursive(|expr| {
        let ident = select! { Token::Ident(name) => name };
        let path = ident
            .clone()
            .separated_by(just(Token::Dot))
            .at_least(1)
            .collect::<Vec<_>>();

        let arg = ident
            .then_ignore(just(Token::Equals))
            .or_not()
            .then(expr.clone())
            .map(|(name, value)| Arg { name, value });
        let args = arg
            .separated_by(just(Token::Comma))
            .allow_trailing()
            .collect::<Vec<_>>()
            .delimited_by(just(Token::LParen), just(Token::RParen));

        let name_or_call = path.then(args.or_not()).map(|(path, args)| match args {
            Some(args) => ExprKind::Call { callee: path, args },
            None => ExprKind::Name(path),
        });
        let literal = select! {
            Token::Str(s) => ExprKind::Str(s),
            Token::Int(v) => ExprKind::Int(v),
            Token::Float(v) => ExprKind::Float(v),
        };

        let atom = choice((literal, name_or_call))
            .map_with(|kind, e| node(kind, e.span()))
            .or(expr.delimited_by(just(Token::LParen), just(Token::RParen)));

        atom.pratt((
            prefix(3, just(Token::Tilde), |_, rhs, e| {
                node(ExprKind::Not(Box::new(rhs)), e.span())
            }),
            prefix(3, just(Token::Minus), |_, rhs, e| {
                node(ExprKind::Neg(Box::new(rhs)), e.span())
            }),
            infix(left(2), just(Token::Star), |l, _, r, e| {
                node(ExprKind::AlsoRun(Box::new(l), Box::new(r)), e.span())
            }),
            infix(left(1), just(Token::Plus), |l, _, r, e| {
                node(ExprKind::AndThen(Box::new(l), Box::new(r)), e.span())
            }),
        ))
    })
}

/// Parse one complete expression; trailing tokens are an error.
pub fn parse_expr(text: &str) -> Result<Expr> {
    let tokens = tokenize(text)?;
    let eoi = SimpleSpan::from(text.len()..text.len());
    let input = Stream::from_iter(tokens).map(eoi, |Spanned { token, span }| {
        (token, SimpleSpan::from(span))
    });
    expr_parser()
        .then_ignore(end())
        .parse(input)
        .into_result()
        .map_err(|errors| match errors.first() {
            Some(e) => ConfigError::parse(
                e.span().start,
                match e.found() {
                    Some(token) => format!("unexpected {token}"),
                    None => "unexpected end of input".to_string(),
                },
            ),
            None => ConfigError::parse(0, "invalid expression"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn shape(expr: &Expr) -> String {
        match &expr.kind {
            ExprKind::Name(path) => path.last().cloned().unwrap_or_default(),
            ExprKind::AlsoRun(l, r) => format!("({}*{})", shape(l), shape(r)),
            ExprKind::AndThen(l, r) => format!("({}+{})", shape(l), shape(r)),
            ExprKind::Not(inner) => format!("~{}", shape(inner)),
            ExprKind::Neg(inner) => format!("-{}", shape(inner)),
            other => format!("{other:?}"),
        }
    }

    #[test]
    fn precedence_and_grouping() {
        assert_eq!(shape(&parse_expr("a+b*c").unwrap()), "(a+(b*c))");
        assert_eq!(shape(&parse_expr("(a+b)*c").unwrap()), "((a+b)*c)");
        assert_eq!(shape(&parse_expr("a*b+c+d").unwrap()), "(((a*b)+c)+d)");
        assert_eq!(shape(&parse_expr("~process.a*b").unwrap()), "(~a*b)");
        assert_eq!(shape(&parse_expr("-inf").unwrap()), "-inf");
    }

    #[test]
    fn positions_point_at_first_token() {
        let expr = parse_expr("  a + ~b").unwrap();
        assert_eq!(expr.pos, 2);
        let ExprKind::AndThen(_, rhs) = expr.kind else {
            panic!("expected '+'");
        };
        assert_eq!(rhs.pos, 6);
    }

    #[test]
    fn calls_with_keywords() {
        let expr = parse_expr("cms.EDProducer('T', a = cms.int32(1), b = 2,)").unwrap();
        let ExprKind::Call { callee, args } = expr.kind else {
            panic!("expected a call");
        };
        assert_eq!(callee, vec!["cms", "EDProducer"]);
        assert_eq!(args.len(), 3);
        assert_eq!(args[0].name, None);
        assert_eq!(args[1].name.as_deref(), Some("a"));
        assert_eq!(args[2].value.kind, ExprKind::Int(2));
    }

    #[test]
    fn special_names_as_keywords() {
        let expr = parse_expr("cms.PSet(inf = cms.int32(1), NaN = cms.double(-inf))").unwrap();
        let ExprKind::Call { args, .. } = expr.kind else {
            panic!("expected a call");
        };
        assert_eq!(args[0].name.as_deref(), Some("inf"));
        assert_eq!(args[1].name.as_deref(), Some("NaN"));
    }

    #[test]
    fn errors_name_the_position() {
        assert_eq!(
            parse_expr("a b").unwrap_err(),
            ConfigError::parse(2, "unexpected identifier b")
        );
        assert_eq!(
            parse_expr("f(1").unwrap_err(),
            ConfigError::parse(3, "unexpected end of input")
        );
        assert!(matches!(
            parse_expr("a*").unwrap_err(),
            ConfigError::Parse { .. }
        ));
    }
}
