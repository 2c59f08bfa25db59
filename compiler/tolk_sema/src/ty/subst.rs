//! Type parameter substitution and generic argument deduction.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::Ty;

/// Mapping from type parameter names to types.
#[derive(Clone, Debug, Default)]
pub struct Substitution {
    mapping: FxHashMap<Arc<str>, Ty>,
}

impl Substitution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }

    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    pub fn get(&self, name: &str) -> Option<&Ty> {
        self.mapping.get(name)
    }

    pub fn insert(&mut self, name: impl Into<Arc<str>>, ty: Ty) {
        self.mapping.insert(name.into(), ty);
    }

    /// Pair type parameters with arguments positionally; extra entries on
    /// either side are ignored.
    pub fn from_params(params: &[Ty], args: &[Ty]) -> Self {
        let mut substitution = Substitution::new();
        for (param, arg) in params.iter().zip(args) {
            if let Some(nominal) = param.nominal() {
                substitution.insert(Arc::clone(&nominal.name), arg.clone());
            }
        }
        substitution
    }

    /// Learn type parameter bindings by matching the declared `param` type
    /// against the actual `arg` type. The first concrete binding for a
    /// name wins.
    pub fn deduce(&mut self, param: &Ty, arg: &Ty) {
        match param {
            Ty::Instantiation { args: params, .. } => {
                if let Ty::Instantiation { args, .. } = arg.unwrap_alias() {
                    self.deduce_all(params, &args);
                }
                if let Ty::Instantiation { args, .. } = arg {
                    self.deduce_all(params, args);
                }
            }
            Ty::Function { params, ret } => {
                if let Ty::Function {
                    params: arg_params,
                    ret: arg_ret,
                } = arg
                {
                    self.deduce_all(params, arg_params);
                    self.deduce(ret, arg_ret);
                }
            }
            Ty::Tensor(params) | Ty::Tuple(params) => match (param, arg) {
                (Ty::Tensor(_), Ty::Tensor(args)) | (Ty::Tuple(_), Ty::Tuple(args))
                    if params.len() == args.len() =>
                {
                    self.deduce_all(params, args);
                }
                _ => {}
            },
            Ty::Union(param_union) => {
                let Ty::Union(arg_union) = arg else {
                    // `int | Box<T>` given `Box<int>`.
                    for variant in param_union.variants() {
                        self.deduce(variant, arg);
                    }
                    return;
                };

                // Strip the concrete variants of the parameter from the
                // argument; what is left binds the generic variants.
                let mut rest: Vec<Ty> = arg_union.variants().to_vec();
                let mut generic = Vec::new();
                let mut consistent = true;
                for variant in param_union.variants() {
                    if variant.has_generics() {
                        generic.push(variant);
                    } else if rest.iter().any(|ty| ty.equals(variant)) {
                        rest.retain(|ty| !ty.equals(variant));
                    } else {
                        consistent = false;
                    }
                }
                if !consistent {
                    return;
                }
                if let [single] = generic.as_slice() {
                    if rest.len() > 1 {
                        self.deduce(single, &Ty::union(rest));
                        return;
                    }
                }
                if generic.len() == rest.len() {
                    for (variant, ty) in generic.into_iter().zip(&rest) {
                        self.deduce(variant, ty);
                    }
                }
            }
            Ty::TypeParam { nominal, default } => {
                if let Some(previous) = self.mapping.get(&nominal.name) {
                    if !matches!(previous, Ty::TypeParam { .. } | Ty::Never) {
                        return;
                    }
                }
                // `T` passed where `T` is expected: fall back to the default.
                let bound = match (arg, default) {
                    (Ty::TypeParam { nominal: arg_nominal, .. }, Some(default))
                        if arg_nominal.name == nominal.name =>
                    {
                        (**default).clone()
                    }
                    _ => arg.clone(),
                };
                self.mapping.insert(Arc::clone(&nominal.name), bound);
            }
            _ => {}
        }
    }

    fn deduce_all(&mut self, params: &[Ty], args: &[Ty]) {
        for (param, arg) in params.iter().zip(args) {
            self.deduce(param, arg);
        }
    }
}

impl Ty {
    /// Replace type parameters by their bindings. Types without type
    /// parameters come back unchanged.
    #[must_use]
    pub fn substitute(&self, substitution: &Substitution) -> Ty {
        if substitution.is_empty() {
            return self.clone();
        }
        let map = |types: &[Ty]| -> Arc<[Ty]> {
            types.iter().map(|ty| ty.substitute(substitution)).collect()
        };
        match self {
            Ty::TypeParam { nominal, .. } => substitution
                .get(&nominal.name)
                .cloned()
                .unwrap_or_else(|| self.clone()),
            Ty::Struct { nominal, fields } => Ty::Struct {
                nominal: nominal.clone(),
                fields: map(fields),
            },
            Ty::Alias { nominal, inner } => Ty::Alias {
                nominal: nominal.clone(),
                inner: Arc::new(inner.substitute(substitution)),
            },
            Ty::Tensor(elements) => Ty::Tensor(map(elements)),
            Ty::Tuple(elements) => Ty::Tuple(map(elements)),
            Ty::Union(union) => Ty::union(
                union
                    .variants()
                    .iter()
                    .map(|variant| variant.substitute(substitution)),
            ),
            Ty::Function { params, ret } => Ty::Function {
                params: map(params),
                ret: Arc::new(ret.substitute(substitution)),
            },
            Ty::Instantiation { inner, args } => Ty::Instantiation {
                inner: Arc::new(inner.substitute(substitution)),
                args: map(args),
            },
            _ => self.clone(),
        }
    }
}
