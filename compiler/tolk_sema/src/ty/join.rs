//! Least upper bound of two types.

use super::Ty;

/// Type covering both `left` and `right`, as needed for `??`, `match` arms
/// and the return statements of a function without a declared return
/// type.
pub fn join_types(left: &Ty, right: &Ty) -> Ty {
    if left.equals(right) {
        return left.clone();
    }
    match (left, right) {
        (_, Ty::Unknown) => Ty::Unknown,
        (_, Ty::Never) => left.clone(),
        (Ty::Never, _) => right.clone(),
        (_, Ty::Null) => Ty::nullable(left.clone()),
        (Ty::Tensor(l), Ty::Tensor(r)) if l.len() == r.len() => {
            Ty::tensor(l.iter().zip(r.iter()).map(|(l, r)| join_types(l, r)))
        }
        (Ty::Tuple(l), Ty::Tuple(r)) if l.len() == r.len() => {
            Ty::tuple(l.iter().zip(r.iter()).map(|(l, r)| join_types(l, r)))
        }
        (Ty::Alias { inner, .. }, _) => join_types(inner, right),
        (_, Ty::Alias { inner, .. }) => join_types(left, inner),
        _ => Ty::union([left.clone(), right.clone()]),
    }
}
