use crate::expr::{Expr, ExprTag};
use limb::{BoxError, Embed, Fields, Layer, LayerError, Project, Slot};
use proptest::prelude::*;

impl<'a> Project for &'a Expr {
    type Shape = Expr;

    #[inline(always)]
    fn tag(&self) -> ExprTag {
        expr_tag(self)
    }

    #[inline(always)]
    fn into_slots(self) -> Vec<Slot<i64, Self>> {
        match self {
            Expr::Add(a, b) | Expr::Sub(a, b) | Expr::Mul(a, b) | Expr::Div(a, b) => {
                vec![Slot::Child(a.as_ref()), Slot::Child(b.as_ref())]
            }
            Expr::Neg(a) => vec![Slot::Child(a.as_ref())],
            Expr::LiteralInt(x) => vec![Slot::Label(*x)],
        }
    }
}

impl Project for Expr {
    type Shape = Expr;

    #[inline(always)]
    fn tag(&self) -> ExprTag {
        expr_tag(self)
    }

    #[inline(always)]
    fn into_slots(self) -> Vec<Slot<i64, Self>> {
        match self {
            Expr::Add(a, b) | Expr::Sub(a, b) | Expr::Mul(a, b) | Expr::Div(a, b) => {
                vec![Slot::Child(*a), Slot::Child(*b)]
            }
            Expr::Neg(a) => vec![Slot::Child(*a)],
            Expr::LiteralInt(x) => vec![Slot::Label(x)],
        }
    }
}

impl Embed for Expr {
    type Shape = Expr;

    fn from_fields(tag: ExprTag, mut fields: Fields<i64, Self>) -> Result<Self, BoxError> {
        let expr = match tag {
            ExprTag::Add => Expr::add(fields.child()?, fields.child()?),
            ExprTag::Sub => Expr::sub(fields.child()?, fields.child()?),
            ExprTag::Mul => Expr::mul(fields.child()?, fields.child()?),
            ExprTag::Div => Expr::div(fields.child()?, fields.child()?),
            ExprTag::Neg => Expr::neg(fields.child()?),
            ExprTag::LiteralInt => Expr::LiteralInt(fields.label()?),
        };
        fields.finish()?;
        Ok(expr)
    }
}

fn expr_tag(expr: &Expr) -> ExprTag {
    match expr {
        Expr::Add(..) => ExprTag::Add,
        Expr::Sub(..) => ExprTag::Sub,
        Expr::Mul(..) => ExprTag::Mul,
        Expr::Div(..) => ExprTag::Div,
        Expr::Neg(_) => ExprTag::Neg,
        Expr::LiteralInt(_) => ExprTag::LiteralInt,
    }
}

/// A complete binary tree of additions `depth` levels deep, with a literal 1 at each leaf.
pub fn balanced(depth: usize) -> Result<Expr, LayerError> {
    Expr::try_ana(depth, |d| {
        if d > 0 {
            Layer::of(ExprTag::Add, vec![], vec![d - 1, d - 1])
        } else {
            Layer::of(ExprTag::LiteralInt, vec![1], vec![])
        }
    })
}

pub fn arb_expr() -> impl Strategy<Value = Expr> {
    let leaf = prop_oneof![any::<i8>().prop_map(|x| Expr::LiteralInt(x as i64)),];
    leaf.prop_recursive(
        8,   // 8 levels deep
        256, // Shoot for maximum size of 256 nodes
        10,  // We put up to 10 items per collection
        |inner| {
            prop_oneof![
                (inner.clone(), inner.clone()).prop_map(|(a, b)| Expr::add(a, b)),
                (inner.clone(), inner.clone()).prop_map(|(a, b)| Expr::sub(a, b)),
                (inner.clone(), inner.clone()).prop_map(|(a, b)| Expr::mul(a, b)),
                (inner.clone(), inner.clone()).prop_map(|(a, b)| Expr::div(a, b)),
                inner.prop_map(Expr::neg),
            ]
        },
    )
}
