//! The Tolk type algebra.
//!
//! [`Ty`] is a closed set of immutable type values. Composite types share
//! their parts behind `Arc`, so cloning a type is cheap and every operation
//! returns a new value instead of mutating. Unions are only built through
//! [`Ty::union`], which keeps them flat, deduplicated and never a union of
//! one.
//!
//! Equality is alias-transparent ([`Ty::equals`], also `PartialEq`); there
//! is deliberately no `Hash` impl, since two equal types may differ
//! structurally.

mod join;
mod relate;
mod subst;

use std::fmt;
use std::sync::Arc;

use crate::decl::Decl;

pub use join::join_types;
pub use subst::Substitution;

/// Name of a named type plus the declaration it comes from, when known.
#[derive(Clone, Debug)]
pub struct Nominal {
    pub name: Arc<str>,
    pub anchor: Option<Decl>,
}

impl Nominal {
    pub fn new(name: impl Into<Arc<str>>, anchor: Option<Decl>) -> Self {
        Nominal {
            name: name.into(),
            anchor,
        }
    }
}

#[derive(Clone)]
pub enum Ty {
    Int,
    IntN { width: u32, unsigned: bool },
    VarIntN { width: u32, unsigned: bool },
    Coins,
    Bool,
    BitsN(u32),
    BytesN(u32),
    Null,
    Void,
    Never,
    Unknown,

    /// `type name = builtin` that is not a primitive (`cell`, `slice`, ...).
    Builtin(Nominal),
    Struct { nominal: Nominal, fields: Arc<[Ty]> },
    Enum(Nominal),
    Alias { nominal: Nominal, inner: Arc<Ty> },
    TypeParam { nominal: Nominal, default: Option<Arc<Ty>> },

    Tensor(Arc<[Ty]>),
    Tuple(Arc<[Ty]>),
    Union(UnionTy),
    Function { params: Arc<[Ty]>, ret: Arc<Ty> },
    /// A generic struct, alias or builtin applied to arguments.
    Instantiation { inner: Arc<Ty>, args: Arc<[Ty]> },
}

/// Variants of a union. Construct through [`Ty::union`].
#[derive(Clone)]
pub struct UnionTy {
    variants: Arc<[Ty]>,
}

impl UnionTy {
    pub fn variants(&self) -> &[Ty] {
        &self.variants
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    /// `T` for a two-variant union `T | null`.
    pub fn as_nullable(&self) -> Option<&Ty> {
        match &*self.variants {
            [Ty::Null, other] | [other, Ty::Null] => Some(other),
            _ => None,
        }
    }

    pub fn contains(&self, ty: &Ty) -> bool {
        self.variants.iter().any(|variant| variant.equals(ty))
    }

    pub fn contains_all(&self, other: &UnionTy) -> bool {
        other.variants.iter().all(|variant| self.contains(variant))
    }
}

impl Ty {
    /// Smart constructor for unions: flattens nested unions (seen through
    /// aliases and instantiations), drops duplicates and collapses a single
    /// variant. An empty input is `never`.
    pub fn union(types: impl IntoIterator<Item = Ty>) -> Ty {
        fn add_unique(variants: &mut Vec<Ty>, ty: Ty) {
            let unwrapped = ty.unwrap_alias();
            if !variants
                .iter()
                .any(|existing| existing.unwrap_alias().equals(&unwrapped))
            {
                variants.push(ty);
            }
        }

        let mut variants = Vec::new();
        for ty in types {
            match ty.base_type() {
                Ty::Union(union) => {
                    for variant in union.variants.iter() {
                        add_unique(&mut variants, variant.clone());
                    }
                }
                _ => add_unique(&mut variants, ty),
            }
        }

        match variants.len() {
            0 => Ty::Never,
            1 => variants.pop().unwrap_or(Ty::Never),
            _ => Ty::Union(UnionTy {
                variants: variants.into(),
            }),
        }
    }

    /// `T?`, that is `T | null`.
    pub fn nullable(inner: Ty) -> Ty {
        Ty::union([inner, Ty::Null])
    }

    pub fn tensor(elements: impl IntoIterator<Item = Ty>) -> Ty {
        Ty::Tensor(elements.into_iter().collect())
    }

    pub fn tuple(elements: impl IntoIterator<Item = Ty>) -> Ty {
        Ty::Tuple(elements.into_iter().collect())
    }

    pub fn function(params: impl IntoIterator<Item = Ty>, ret: Ty) -> Ty {
        Ty::Function {
            params: params.into_iter().collect(),
            ret: Arc::new(ret),
        }
    }

    pub fn instantiation(inner: Ty, args: impl IntoIterator<Item = Ty>) -> Ty {
        Ty::Instantiation {
            inner: Arc::new(inner),
            args: args.into_iter().collect(),
        }
    }

    /// Primitive spelled by `name`: `int`, `int32`, `uint8`, `varint16`,
    /// `bits256`, `bytes4`, `coins`, `bool`, `null`, `void`, `never`.
    pub fn from_name(name: &str) -> Option<Ty> {
        fn width(digits: &str) -> Option<u32> {
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            digits.parse().ok()
        }

        let primitive = match name {
            "int" => Ty::Int,
            "bool" => Ty::Bool,
            "coins" => Ty::Coins,
            "null" => Ty::Null,
            "void" => Ty::Void,
            "never" => Ty::Never,
            _ => {
                if let Some(rest) = name.strip_prefix("varuint") {
                    Ty::VarIntN { width: width(rest)?, unsigned: true }
                } else if let Some(rest) = name.strip_prefix("varint") {
                    Ty::VarIntN { width: width(rest)?, unsigned: false }
                } else if let Some(rest) = name.strip_prefix("uint") {
                    Ty::IntN { width: width(rest)?, unsigned: true }
                } else if let Some(rest) = name.strip_prefix("int") {
                    Ty::IntN { width: width(rest)?, unsigned: false }
                } else if let Some(rest) = name.strip_prefix("bits") {
                    Ty::BitsN(width(rest)?)
                } else if let Some(rest) = name.strip_prefix("bytes") {
                    Ty::BytesN(width(rest)?)
                } else {
                    return None;
                }
            }
        };
        Some(primitive)
    }

    /// Display name, as shown to users.
    pub fn name(&self) -> String {
        self.to_string()
    }

    pub fn nominal(&self) -> Option<&Nominal> {
        match self {
            Ty::Builtin(nominal)
            | Ty::Struct { nominal, .. }
            | Ty::Enum(nominal)
            | Ty::Alias { nominal, .. }
            | Ty::TypeParam { nominal, .. } => Some(nominal),
            _ => None,
        }
    }

    /// Declaration a named type points at.
    pub fn anchor(&self) -> Option<&Decl> {
        self.nominal().and_then(|nominal| nominal.anchor.as_ref())
    }

    /// `int`, `intN`, `varintN` or `coins`.
    pub fn is_int_family(&self) -> bool {
        matches!(
            self,
            Ty::Int | Ty::IntN { .. } | Ty::VarIntN { .. } | Ty::Coins
        )
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self.unwrap_alias(), Ty::Union(union) if union.as_nullable().is_some())
    }

    pub fn has_generics(&self) -> bool {
        match self {
            Ty::TypeParam { .. } => true,
            Ty::Alias { inner, .. } => inner.has_generics(),
            Ty::Tensor(elements) | Ty::Tuple(elements) => elements.iter().any(Ty::has_generics),
            Ty::Union(union) => union.variants.iter().any(Ty::has_generics),
            Ty::Function { params, ret } => {
                params.iter().any(Ty::has_generics) || ret.has_generics()
            }
            Ty::Instantiation { args, .. } => args.iter().any(Ty::has_generics),
            _ => false,
        }
    }

    /// Strip aliases and instantiations, recursively.
    #[must_use]
    pub fn base_type(&self) -> Ty {
        match self {
            Ty::Alias { inner, .. } | Ty::Instantiation { inner, .. } => inner.base_type(),
            _ => self.clone(),
        }
    }

    /// Strip aliases. An instantiated alias of a union is that union;
    /// other instantiated aliases keep their arguments around the unwrapped
    /// body.
    #[must_use]
    pub fn unwrap_alias(&self) -> Ty {
        match self {
            Ty::Alias { inner, .. } => inner.unwrap_alias(),
            Ty::Instantiation { inner, args } => match &**inner {
                Ty::Alias { inner: body, .. } => match &**body {
                    Ty::Union(_) => (**body).clone(),
                    _ => Ty::Instantiation {
                        inner: Arc::new(body.unwrap_alias()),
                        args: Arc::clone(args),
                    },
                },
                _ => self.clone(),
            },
            _ => self.clone(),
        }
    }

    #[must_use]
    pub fn unwrap_instantiation(&self) -> Ty {
        match self {
            Ty::Instantiation { inner, .. } => inner.unwrap_instantiation(),
            _ => self.clone(),
        }
    }

    /// `T` for `T?` (also behind aliases); anything else unchanged.
    #[must_use]
    pub fn unwrap_option(&self) -> Ty {
        match self.unwrap_alias() {
            Ty::Union(union) => match union.as_nullable() {
                Some(inner) => inner.clone(),
                None => self.clone(),
            },
            _ => self.clone(),
        }
    }

    /// Elements of a tensor or tuple, seen through aliases.
    pub fn elements(&self) -> Option<Arc<[Ty]>> {
        match self.unwrap_alias() {
            Ty::Tensor(elements) | Ty::Tuple(elements) => Some(elements),
            _ => None,
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, types: &[Ty]) -> fmt::Result {
    for (i, ty) in types.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{ty}")?;
    }
    Ok(())
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::Int => f.write_str("int"),
            Ty::IntN { width, unsigned } => {
                write!(f, "{}int{width}", if *unsigned { "u" } else { "" })
            }
            Ty::VarIntN { width, unsigned } => {
                write!(f, "var{}int{width}", if *unsigned { "u" } else { "" })
            }
            Ty::Coins => f.write_str("coins"),
            Ty::Bool => f.write_str("bool"),
            Ty::BitsN(width) => write!(f, "bits{width}"),
            Ty::BytesN(width) => write!(f, "bytes{width}"),
            Ty::Null => f.write_str("null"),
            Ty::Void => f.write_str("void"),
            Ty::Never => f.write_str("never"),
            Ty::Unknown => f.write_str("unknown"),
            Ty::Builtin(nominal)
            | Ty::Struct { nominal, .. }
            | Ty::Enum(nominal)
            | Ty::Alias { nominal, .. }
            | Ty::TypeParam { nominal, .. } => f.write_str(&nominal.name),
            Ty::Tensor(elements) => {
                f.write_str("(")?;
                write_list(f, elements)?;
                f.write_str(")")
            }
            Ty::Tuple(elements) => {
                f.write_str("[")?;
                write_list(f, elements)?;
                f.write_str("]")
            }
            Ty::Union(union) => {
                if let Some(inner) = union.as_nullable() {
                    return write!(f, "{inner}?");
                }
                for (i, variant) in union.variants.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" | ")?;
                    }
                    write!(f, "{variant}")?;
                }
                Ok(())
            }
            Ty::Function { params, ret } => {
                f.write_str("(")?;
                write_list(f, params)?;
                write!(f, ") -> {ret}")
            }
            Ty::Instantiation { inner, args } => {
                write!(f, "{inner}<")?;
                write_list(f, args)?;
                f.write_str(">")
            }
        }
    }
}

impl fmt::Debug for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Debug for UnionTy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.variants.iter()).finish()
    }
}

impl PartialEq for Ty {
    fn eq(&self, other: &Ty) -> bool {
        self.equals(other)
    }
}
