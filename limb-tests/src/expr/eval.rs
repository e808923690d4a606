use crate::expr::{Expr, ExprTag};
use limb::{Layer, LayerError, Project};

#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    #[error("division by zero")]
    DivideByZero,
    #[error(transparent)]
    Layer(#[from] LayerError),
}

fn apply(tag: ExprTag, a: i64, b: i64) -> Result<i64, EvalError> {
    Ok(match tag {
        ExprTag::Add => a.wrapping_add(b),
        ExprTag::Sub => a.wrapping_sub(b),
        ExprTag::Mul => a.wrapping_mul(b),
        ExprTag::Div if b == 0 => return Err(EvalError::DivideByZero),
        ExprTag::Div => a.wrapping_div(b),
        ExprTag::Neg => a.wrapping_neg(),
        ExprTag::LiteralInt => a,
    })
}

#[inline(always)]
pub fn eval_layer(layer: Layer<Expr, i64>) -> Result<i64, EvalError> {
    match layer.tag() {
        ExprTag::LiteralInt => Ok(*layer.label("value")?),
        ExprTag::Neg => apply(ExprTag::Neg, *layer.child("operand")?, 0),
        op => apply(op, *layer.child("lhs")?, *layer.child("rhs")?),
    }
}

pub fn naive_eval(expr: &Expr) -> Result<i64, EvalError> {
    match expr {
        Expr::Add(a, b) => apply(ExprTag::Add, naive_eval(a)?, naive_eval(b)?),
        Expr::Sub(a, b) => apply(ExprTag::Sub, naive_eval(a)?, naive_eval(b)?),
        Expr::Mul(a, b) => apply(ExprTag::Mul, naive_eval(a)?, naive_eval(b)?),
        Expr::Div(a, b) => apply(ExprTag::Div, naive_eval(a)?, naive_eval(b)?),
        Expr::Neg(a) => apply(ExprTag::Neg, naive_eval(a)?, 0),
        Expr::LiteralInt(x) => Ok(*x),
    }
}

pub fn eval(expr: &Expr) -> Result<i64, EvalError> {
    expr.try_cata(eval_layer)
}

/// Renders fully parenthesized infix notation.
pub fn render(expr: &Expr) -> Result<String, LayerError> {
    expr.cata(|layer| match layer.tag() {
        ExprTag::LiteralInt => layer.labels().map(|(_, x)| x.to_string()).collect(),
        ExprTag::Neg => format!("-{}", layer.into_children().concat()),
        op => {
            let symbol = match op {
                ExprTag::Add => "+",
                ExprTag::Sub => "-",
                ExprTag::Mul => "*",
                _ => "/",
            };
            format!("({})", layer.into_children().join(format!(" {} ", symbol).as_str()))
        }
    })
}

/// Node count.
pub fn size(expr: &Expr) -> Result<usize, LayerError> {
    expr.cata(|layer| 1 + layer.into_children().into_iter().sum::<usize>())
}

/// Counts `Neg` nodes applied directly to a literal, which needs the original
/// subtree rather than its value.
pub fn negated_literals(expr: &Expr) -> Result<usize, LayerError> {
    expr.para(|layer: Layer<Expr, (&Expr, usize)>| {
        let here = match (layer.tag(), layer.child("operand")) {
            (ExprTag::Neg, Ok((Expr::LiteralInt(_), _))) => 1,
            _ => 0,
        };
        here + layer
            .into_children()
            .into_iter()
            .map(|(_, n)| n)
            .sum::<usize>()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::naive::arb_expr;
    use limb::Embed;
    use proptest::proptest;
    use rstest::rstest;

    #[rstest]
    #[case(Expr::literal(7), 7)]
    #[case(Expr::add(Expr::literal(1), Expr::mul(Expr::literal(2), Expr::literal(3))), 7)]
    #[case(Expr::sub(Expr::literal(1), Expr::neg(Expr::literal(4))), 5)]
    #[case(Expr::div(Expr::literal(9), Expr::literal(2)), 4)]
    fn evaluates(#[case] expr: Expr, #[case] expected: i64) {
        crate::init_tracing();
        assert_eq!(eval(&expr).unwrap(), expected);
    }

    #[test]
    fn division_by_zero_aborts_fold() {
        let expr = Expr::add(
            Expr::literal(1),
            Expr::div(Expr::literal(1), Expr::sub(Expr::literal(2), Expr::literal(2))),
        );
        assert!(matches!(eval(&expr), Err(EvalError::DivideByZero)));
    }

    #[test]
    fn renders_infix() {
        let expr = Expr::mul(Expr::neg(Expr::literal(2)), Expr::add(Expr::literal(3), Expr::literal(4)));
        assert_eq!(render(&expr).unwrap(), "(-2 * (3 + 4))");
    }

    #[test]
    fn counts_negated_literals() {
        let expr = Expr::add(
            Expr::neg(Expr::literal(2)),
            Expr::neg(Expr::add(Expr::neg(Expr::literal(1)), Expr::literal(3))),
        );
        assert_eq!(negated_literals(&expr).unwrap(), 2);
    }

    #[test]
    fn balanced_tree_unfolds_and_folds() {
        let expr = crate::expr::naive::balanced(6).unwrap();
        assert_eq!(size(&expr).unwrap(), 127);
        assert_eq!(eval(&expr).unwrap(), 64);
    }

    #[test]
    fn deep_chain_is_stack_safe() {
        let expr = Expr::ana(200_000usize, |n| {
            if n == 0 {
                Layer::of(ExprTag::LiteralInt, vec![1], vec![]).unwrap()
            } else {
                Layer::of(ExprTag::Neg, vec![], vec![n - 1]).unwrap()
            }
        })
        .unwrap();
        assert_eq!(eval(&expr).unwrap(), 1);
        assert_eq!(size(&expr).unwrap(), 200_001);
        // dropping a Box chain this deep recurses, so take it apart one layer at a time
        let mut next = Some(expr);
        while let Some(e) = next.take() {
            next = Layer::project(e).unwrap().into_children().pop();
        }
    }

    #[test]
    fn cata_rejects_malformed_layers_from_the_algebra() {
        let expr = Expr::add(Expr::literal(1), Expr::literal(2));
        // a lookup for a field that only exists on other variants
        let res = expr.try_cata(|layer: Layer<Expr, i64>| -> Result<i64, EvalError> {
            Ok(*layer.child("operand")? + 1)
        });
        assert!(matches!(
            res,
            Err(EvalError::Layer(LayerError::NotFound { .. }))
        ));
    }

    // generate a bunch of expression trees and evaluate them
    proptest! {
        #[test]
        fn expr_eval(expr in arb_expr()) {
            let simple = naive_eval(&expr).ok();
            let by_ref = eval(&expr).ok();
            let owned = expr.clone().try_cata(eval_layer).ok();
            let via_free_fn = limb::schemes::try_cata::<&Expr, _, _>(eval_layer)(&expr).ok();

            assert_eq!(simple, by_ref);
            assert_eq!(simple, owned);
            assert_eq!(simple, via_free_fn);
        }

        #[test]
        fn expr_eval_with_original_subtrees(expr in arb_expr()) {
            // each child carries its original subtree, so its folded value can be checked
            let res = (&expr).para(|layer: Layer<Expr, (&Expr, Option<i64>)>| {
                for (_, (original, folded)) in layer.children() {
                    assert_eq!(&naive_eval(original).ok(), folded);
                }
                let children: Vec<Option<i64>> = layer.children().map(|(_, (_, v))| *v).collect();
                match layer.tag() {
                    ExprTag::LiteralInt => layer.label("value").ok().copied(),
                    ExprTag::Neg => children[0].and_then(|a| apply(ExprTag::Neg, a, 0).ok()),
                    op => match (children[0], children[1]) {
                        (Some(a), Some(b)) => apply(op, a, b).ok(),
                        _ => None,
                    },
                }
            });
            assert_eq!(res.unwrap(), naive_eval(&expr).ok());
        }

        #[test]
        fn project_embed_round_trip(expr in arb_expr()) {
            let layer = Layer::project(expr.clone()).unwrap();
            assert_eq!(layer.embed().unwrap(), expr.clone());

            let rebuilt = expr.clone().try_cata(|layer: Layer<Expr, Expr>| layer.embed()).unwrap();
            assert_eq!(rebuilt, expr);
        }

    }
}
