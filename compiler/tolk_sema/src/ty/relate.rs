//! Type equality and assignability.

use super::{Ty, UnionTy};

fn all_equal(left: &[Ty], right: &[Ty]) -> bool {
    left.len() == right.len() && left.iter().zip(right).all(|(l, r)| l.equals(r))
}

fn all_assignable(left: &[Ty], right: &[Ty]) -> bool {
    left.len() == right.len()
        && left
            .iter()
            .zip(right)
            .all(|(l, r)| l.can_rhs_be_assigned(r))
}

impl Ty {
    /// Alias-transparent structural equality.
    ///
    /// Two aliases are equal when both name and body match; an alias and a
    /// non-alias compare the alias body. Named types compare by kind and
    /// name, unions as sets.
    pub fn equals(&self, other: &Ty) -> bool {
        match (self, other) {
            (
                Ty::Alias { nominal, inner },
                Ty::Alias {
                    nominal: other_nominal,
                    inner: other_inner,
                },
            ) => nominal.name == other_nominal.name && inner.equals(other_inner),
            (Ty::Alias { inner, .. }, _) => inner.equals(other),
            (_, Ty::Alias { inner, .. }) => self.equals(inner),

            (Ty::Int, Ty::Int)
            | (Ty::Coins, Ty::Coins)
            | (Ty::Bool, Ty::Bool)
            | (Ty::Null, Ty::Null)
            | (Ty::Void, Ty::Void)
            | (Ty::Never, Ty::Never)
            | (Ty::Unknown, Ty::Unknown) => true,
            (
                Ty::IntN { width, unsigned },
                Ty::IntN {
                    width: other_width,
                    unsigned: other_unsigned,
                },
            )
            | (
                Ty::VarIntN { width, unsigned },
                Ty::VarIntN {
                    width: other_width,
                    unsigned: other_unsigned,
                },
            ) => width == other_width && unsigned == other_unsigned,
            (Ty::BitsN(width), Ty::BitsN(other_width))
            | (Ty::BytesN(width), Ty::BytesN(other_width)) => width == other_width,

            (Ty::Builtin(nominal), Ty::Builtin(other_nominal))
            | (Ty::Struct { nominal, .. }, Ty::Struct { nominal: other_nominal, .. })
            | (Ty::Enum(nominal), Ty::Enum(other_nominal))
            | (Ty::TypeParam { nominal, .. }, Ty::TypeParam { nominal: other_nominal, .. }) => {
                nominal.name == other_nominal.name
            }

            (Ty::Tensor(elements), Ty::Tensor(other_elements))
            | (Ty::Tuple(elements), Ty::Tuple(other_elements)) => {
                all_equal(elements, other_elements)
            }
            (Ty::Union(union), Ty::Union(other_union)) => {
                union.len() == other_union.len()
                    && union.contains_all(other_union)
                    && other_union.contains_all(union)
            }
            (
                Ty::Function { params, ret },
                Ty::Function {
                    params: other_params,
                    ret: other_ret,
                },
            ) => all_equal(params, other_params) && ret.equals(other_ret),
            (
                Ty::Instantiation { inner, args },
                Ty::Instantiation {
                    inner: other_inner,
                    args: other_args,
                },
            ) => inner.equals(other_inner) && all_equal(args, other_args),
            _ => false,
        }
    }

    /// Whether a value of type `rhs` may be stored where `self` is
    /// expected.
    ///
    /// `never` fits everywhere, and so does `unknown`: an expression whose
    /// type could not be inferred never produces a mismatch.
    pub fn can_rhs_be_assigned(&self, rhs: &Ty) -> bool {
        if matches!(rhs, Ty::Never) || matches!(self, Ty::Unknown) {
            return true;
        }
        if let Ty::Alias { nominal, inner } = self {
            if rhs
                .nominal()
                .is_some_and(|other| other.name == nominal.name)
            {
                return true;
            }
            return inner.can_rhs_be_assigned(rhs);
        }
        if let Ty::Alias { inner, .. } = rhs {
            return self.can_rhs_be_assigned(inner);
        }
        if matches!(rhs, Ty::Unknown) {
            return true;
        }

        match (self, rhs) {
            (Ty::IntN { width, .. }, Ty::IntN { width: other_width, .. }) => width == other_width,
            (Ty::Int | Ty::IntN { .. } | Ty::VarIntN { .. } | Ty::Coins, _) => {
                rhs.is_int_family()
            }
            (Ty::Bool, Ty::Bool) | (Ty::Null, Ty::Null) | (Ty::Void, Ty::Void) => true,
            (Ty::BitsN(_) | Ty::BytesN(_), _) => self.equals(rhs),

            (Ty::Builtin(nominal), _) => {
                if &*nominal.name == "cell"
                    && matches!(rhs.base_type(), Ty::Struct { nominal: cell, .. } if &*cell.name == "Cell")
                {
                    return true;
                }
                match rhs {
                    Ty::TypeParam { .. } => true,
                    _ => rhs
                        .nominal()
                        .is_some_and(|other| other.name == nominal.name),
                }
            }
            (Ty::Struct { nominal, .. } | Ty::Enum(nominal), _) => rhs
                .nominal()
                .is_some_and(|other| other.name == nominal.name),
            (Ty::TypeParam { .. }, _) => rhs.nominal().is_some(),

            (Ty::Tensor(elements), Ty::Tensor(other_elements))
            | (Ty::Tuple(elements), Ty::Tuple(other_elements)) => {
                all_assignable(elements, other_elements)
            }
            (
                Ty::Function { params, ret },
                Ty::Function {
                    params: other_params,
                    ret: other_ret,
                },
            ) => {
                all_assignable(params, other_params)
                    && all_assignable(other_params, params)
                    && ret.can_rhs_be_assigned(other_ret)
                    && other_ret.can_rhs_be_assigned(ret)
            }

            (Ty::Instantiation { inner, args }, _) => {
                let body = inner.unwrap_alias();
                if let Ty::Union(_) = body {
                    return body.can_rhs_be_assigned(rhs);
                }
                match rhs {
                    Ty::Instantiation {
                        inner: other_inner,
                        args: other_args,
                    } => inner.can_rhs_be_assigned(other_inner) && all_assignable(args, other_args),
                    _ => false,
                }
            }

            (Ty::Union(union), _) => {
                union.exact_variant_to_fit(rhs).is_some()
                    || matches!(rhs, Ty::Union(other) if union.contains_all(other))
            }

            _ => false,
        }
    }
}

impl UnionTy {
    /// The variant a value of `rhs` would be stored as.
    ///
    /// A union rhs fits only between nullable unions over the same base
    /// (`int?` into `int8?`). Otherwise the first variant with the same
    /// base type wins, then the single variant that accepts `rhs`; two
    /// accepting variants make the assignment ambiguous.
    pub fn exact_variant_to_fit(&self, rhs: &Ty) -> Option<Ty> {
        let rhs_base = rhs.base_type();
        if let Ty::Union(rhs_union) = &rhs_base {
            let lhs_inner = self.as_nullable()?;
            let rhs_inner = rhs_union.as_nullable()?;
            return lhs_inner
                .base_type()
                .equals(&rhs_inner.base_type())
                .then(|| Ty::Union(self.clone()));
        }

        if let Some(variant) = self
            .variants()
            .iter()
            .find(|variant| variant.base_type().equals(&rhs_base))
        {
            return Some(variant.clone());
        }

        let mut covering = None;
        for variant in self.variants() {
            if variant.can_rhs_be_assigned(rhs) {
                if covering.is_some() {
                    return None;
                }
                covering = Some(variant);
            }
        }
        covering.cloned()
    }
}
