use limb::{
    BoxError, Either, Embed, FieldDecl, Fields, Layer, LayerError, Project, Shape, Slot,
};

/// A singly linked list of integers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum List {
    Cons(i64, Box<List>),
    Nil,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListTag {
    Cons,
    Nil,
}

const CONS: &[FieldDecl] = &[FieldDecl::label("head"), FieldDecl::child("tail")];

impl Shape for List {
    type Tag = ListTag;
    type Label = i64;

    fn fields(tag: ListTag) -> &'static [FieldDecl] {
        match tag {
            ListTag::Cons => CONS,
            ListTag::Nil => &[],
        }
    }
}

impl<'a> Project for &'a List {
    type Shape = List;

    fn tag(&self) -> ListTag {
        match self {
            List::Cons(..) => ListTag::Cons,
            List::Nil => ListTag::Nil,
        }
    }

    fn into_slots(self) -> Vec<Slot<i64, Self>> {
        match self {
            List::Cons(head, tail) => vec![Slot::Label(*head), Slot::Child(tail.as_ref())],
            List::Nil => vec![],
        }
    }
}

impl Embed for List {
    type Shape = List;

    fn from_fields(tag: ListTag, mut fields: Fields<i64, Self>) -> Result<Self, BoxError> {
        let list = match tag {
            ListTag::Cons => List::Cons(fields.label()?, Box::new(fields.child()?)),
            ListTag::Nil => List::Nil,
        };
        fields.finish()?;
        Ok(list)
    }
}

/// One layer of a list built from a slice: `Nil` when empty, else head and the rest.
pub fn uncons(xs: &[i64]) -> Result<Layer<List, &[i64]>, LayerError> {
    match xs.split_first() {
        Some((head, rest)) => Layer::of(ListTag::Cons, vec![*head], vec![rest]),
        None => Layer::of(ListTag::Nil, vec![], vec![]),
    }
}

pub fn from_slice(xs: &[i64]) -> Result<List, LayerError> {
    List::try_ana(xs, uncons)
}

pub fn to_vec(list: &List) -> Result<Vec<i64>, LayerError> {
    list.cata(|layer| match layer.tag() {
        ListTag::Nil => Vec::new(),
        ListTag::Cons => {
            let mut out: Vec<i64> = layer.labels().map(|(_, x)| *x).collect();
            out.extend(layer.into_children().into_iter().flatten());
            out
        }
    })
}

/// `xs ++ ys`. Once `xs` runs out, `ys` is spliced in whole instead of being unfolded.
pub fn append(xs: &List, ys: List) -> Result<List, LayerError> {
    let mut ys = Some(ys);
    List::try_apo(xs, |seed| match seed {
        List::Cons(head, tail) => {
            Layer::of(ListTag::Cons, vec![*head], vec![tail.as_ref()]).map(Either::Left)
        }
        List::Nil => Ok(Either::Right(ys.take().unwrap_or(List::Nil))),
    })
}

/// Every head alongside the length of the tail that follows it, measured on the original tails.
pub fn heads_with_remaining(list: &List) -> Result<Vec<(i64, usize)>, LayerError> {
    list.try_para(|layer: Layer<List, (&List, Vec<(i64, usize)>)>| -> Result<_, LayerError> {
        if layer.tag() == ListTag::Nil {
            return Ok(Vec::new());
        }
        let head = *layer.label("head")?;
        let (tail, folded) = layer.child("tail")?;
        let mut out = vec![(head, to_vec(tail)?.len())];
        out.extend(folded.iter().copied());
        Ok(out)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(vec![])]
    #[case(vec![1])]
    #[case(vec![1, 2, 3])]
    #[case(vec![-4, 0, 4, 8, 15])]
    fn ana_then_cata_is_identity(#[case] xs: Vec<i64>) {
        crate::init_tracing();
        let list = from_slice(&xs).unwrap();
        assert_eq!(to_vec(&list).unwrap(), xs);
    }

    #[test]
    fn builds_a_three_element_chain() {
        let list = from_slice(&[1, 2, 3]).unwrap();
        let expected = List::Cons(
            1,
            Box::new(List::Cons(2, Box::new(List::Cons(3, Box::new(List::Nil))))),
        );
        assert_eq!(list, expected);

        let size = (&list)
            .cata(|layer| 1 + layer.into_children().into_iter().sum::<usize>())
            .unwrap();
        assert_eq!(size, 4);
    }

    #[test]
    fn cata_counts_a_three_node_chain() {
        let list = from_slice(&[1, 2, 3]).unwrap();
        let cons_cells = (&list)
            .cata(|layer| match layer.tag() {
                ListTag::Cons => 1 + layer.into_children().into_iter().sum::<usize>(),
                ListTag::Nil => 0,
            })
            .unwrap();
        assert_eq!(cons_cells, 3);
    }

    #[test]
    fn para_sees_original_tails() {
        let list = from_slice(&[7, 8, 9]).unwrap();
        assert_eq!(
            heads_with_remaining(&list).unwrap(),
            vec![(7, 2), (8, 1), (9, 0)]
        );
    }

    #[test]
    fn para_reports_unfolded_child_label_count() {
        let list = from_slice(&[5, 6]).unwrap();
        // returns (labels on the original child layer, folded child result)
        let res = (&list)
            .para(|layer: Layer<List, (&List, (usize, usize))>| {
                match layer.children().next() {
                    Some((_, (original, (_, folded)))) => {
                        let child_labels = Layer::project(*original).unwrap().labels().count();
                        (child_labels, folded + 10)
                    }
                    None => (0, 0),
                }
            })
            .unwrap();
        // the child of the head is Cons(6, Nil), which has one label
        assert_eq!(res, (1, 20));
    }

    #[test]
    fn apo_stops_at_short_circuit() {
        let mut calls = 0;
        let list = List::apo(0i64, |depth| {
            calls += 1;
            if depth == 1 {
                Either::Right(List::Cons(100, Box::new(List::Nil)))
            } else {
                Either::Left(Layer::of(ListTag::Cons, vec![depth], vec![depth + 1]).unwrap())
            }
        })
        .unwrap();

        assert_eq!(calls, 2);
        assert_eq!(to_vec(&list).unwrap(), vec![0, 100]);
    }

    #[test]
    fn append_splices_second_list() {
        let xs = from_slice(&[1, 2]).unwrap();
        let ys = from_slice(&[3, 4, 5]).unwrap();
        let joined = append(&xs, ys).unwrap();
        assert_eq!(to_vec(&joined).unwrap(), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn free_function_schemes_are_reusable() {
        let a = from_slice(&[1, 2, 3]).unwrap();
        let b = from_slice(&[10, 20]).unwrap();
        let nines = [9, 9];

        let mut sum = limb::schemes::cata::<&List, i64>(|layer| {
            let here: i64 = layer.labels().map(|(_, x)| *x).sum();
            here + layer.into_children().into_iter().sum::<i64>()
        });
        assert_eq!(sum(&a).unwrap(), 6);
        assert_eq!(sum(&b).unwrap(), 30);

        let mut build = limb::schemes::try_ana::<List, &[i64], LayerError>(uncons);
        assert_eq!(build(&nines[..]).unwrap(), from_slice(&nines).unwrap());
    }

    #[derive(Debug, thiserror::Error)]
    enum Rejected {
        #[error("negative head {0}")]
        Negative(i64),
        #[error(transparent)]
        Layer(#[from] LayerError),
    }

    #[test]
    fn para_errors_reach_the_caller() {
        let ok = from_slice(&[1, 2, 3]).unwrap();
        let bad = from_slice(&[1, -2, 3]).unwrap();

        let mut positive_suffixes = limb::schemes::try_para::<&List, usize, Rejected>(|layer| {
            match layer.label("head").ok().copied() {
                Some(head) if head < 0 => Err(Rejected::Negative(head)),
                Some(_) => Ok(1 + layer.into_children().into_iter().map(|(_, n)| n).sum::<usize>()),
                None => Ok(0),
            }
        });

        assert_eq!(positive_suffixes(&ok).unwrap(), 3);

        assert!(matches!(positive_suffixes(&bad), Err(Rejected::Negative(-2))));
    }
}
