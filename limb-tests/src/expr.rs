pub mod eval;
pub mod naive;

use limb::{FieldDecl, Shape};

/// Simple expression language with some operations on integers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
    Neg(Box<Expr>),
    LiteralInt(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExprTag {
    Add,
    Sub,
    Mul,
    Div,
    Neg,
    LiteralInt,
}

const BINARY: &[FieldDecl] = &[FieldDecl::child("lhs"), FieldDecl::child("rhs")];
const UNARY: &[FieldDecl] = &[FieldDecl::child("operand")];
const LITERAL: &[FieldDecl] = &[FieldDecl::label("value")];

impl Shape for Expr {
    type Tag = ExprTag;
    type Label = i64;

    fn fields(tag: ExprTag) -> &'static [FieldDecl] {
        match tag {
            ExprTag::Add | ExprTag::Sub | ExprTag::Mul | ExprTag::Div => BINARY,
            ExprTag::Neg => UNARY,
            ExprTag::LiteralInt => LITERAL,
        }
    }
}

impl Expr {
    pub fn literal(x: i64) -> Self {
        Expr::LiteralInt(x)
    }

    pub fn add(a: Expr, b: Expr) -> Self {
        Expr::Add(Box::new(a), Box::new(b))
    }

    pub fn sub(a: Expr, b: Expr) -> Self {
        Expr::Sub(Box::new(a), Box::new(b))
    }

    pub fn mul(a: Expr, b: Expr) -> Self {
        Expr::Mul(Box::new(a), Box::new(b))
    }

    pub fn div(a: Expr, b: Expr) -> Self {
        Expr::Div(Box::new(a), Box::new(b))
    }

    pub fn neg(a: Expr) -> Self {
        Expr::Neg(Box::new(a))
    }
}
