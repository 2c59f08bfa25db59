//! Serialized size estimation.
//!
//! Estimates how many bits and cell references a value of some type takes
//! when packed into a cell. Every estimate is a range; `max_bits` saturates
//! at [`SizeOf::MAX_BITS`], which doubles as "unbounded".

mod prefix;

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use tolk_ir::ensure_sufficient_stack;

use crate::decl::Decl;
use crate::ty::{Substitution, Ty};

pub use prefix::{auto_generate_opcodes, parse_pack_prefix, struct_pack_prefix, PackOpcode};

/// Bit and reference range of a serialized value.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SizeOf {
    pub valid: bool,
    pub min_bits: u32,
    pub max_bits: u32,
    pub min_refs: u32,
    pub max_refs: u32,
}

impl SizeOf {
    pub const MAX_BITS: u32 = 9999;

    /// Anything from nothing to a full cell with all references.
    pub const UNPREDICTABLE: SizeOf = SizeOf::new(0, Self::MAX_BITS, 0, 4);

    pub const INVALID: SizeOf = SizeOf {
        valid: false,
        min_bits: 0,
        max_bits: 0,
        min_refs: 0,
        max_refs: 0,
    };

    pub const fn new(min_bits: u32, max_bits: u32, min_refs: u32, max_refs: u32) -> Self {
        SizeOf {
            valid: true,
            min_bits,
            max_bits,
            min_refs,
            max_refs,
        }
    }

    /// Exactly `bits` bits, no references.
    pub const fn bits(bits: u32) -> Self {
        SizeOf::new(bits, bits, 0, 0)
    }

    /// Both parts one after another.
    #[must_use]
    pub fn sum(self, other: SizeOf) -> SizeOf {
        if !self.valid || !other.valid {
            return SizeOf::INVALID;
        }
        SizeOf::new(
            self.min_bits.saturating_add(other.min_bits).min(Self::MAX_BITS),
            self.max_bits.saturating_add(other.max_bits).min(Self::MAX_BITS),
            self.min_refs.saturating_add(other.min_refs),
            self.max_refs.saturating_add(other.max_refs),
        )
    }

    /// Envelope: either part.
    #[must_use]
    pub fn minmax(self, other: SizeOf) -> SizeOf {
        if !self.valid || !other.valid {
            return SizeOf::INVALID;
        }
        SizeOf::new(
            self.min_bits.min(other.min_bits),
            self.max_bits.max(other.max_bits),
            self.min_refs.min(other.min_refs),
            self.max_refs.max(other.max_refs),
        )
    }
}

fn format_range(f: &mut fmt::Formatter<'_>, first: u32, second: u32, unit: &str) -> fmt::Result {
    if first != second {
        write!(f, "{first}..{second} {unit}s")
    } else if first == 1 {
        write!(f, "{first} {unit}")
    } else {
        write!(f, "{first} {unit}s")
    }
}

impl fmt::Display for SizeOf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.valid {
            return f.write_str("unknown or invalid size");
        }
        if self.min_bits == self.max_bits && self.min_refs == self.max_refs {
            return if self.min_refs == 0 {
                write!(f, "{} bits", self.min_bits)
            } else {
                write!(f, "{} bits, {} refs", self.min_bits, self.min_refs)
            };
        }
        format_range(f, self.min_bits, self.max_bits, "bit")?;
        f.write_str(", ")?;
        format_range(f, self.min_refs, self.max_refs, "ref")
    }
}

/// Whether a struct's own pack prefix is counted.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PrefixMode {
    IncludeStructPrefix,
    /// The enclosing union already accounted for the prefix.
    AlreadyIncluded,
}

/// Estimate the serialized size of `ty`.
#[tracing::instrument(level = "trace", skip_all, fields(ty = %ty))]
pub fn estimate(ty: &Ty) -> SizeOf {
    SizeEstimator::default().estimate(ty, PrefixMode::IncludeStructPrefix)
}

/// Estimator with a per-call memo keyed by type name and prefix mode.
#[derive(Default)]
pub struct SizeEstimator {
    memo: FxHashMap<(String, PrefixMode), SizeOf>,
}

impl SizeEstimator {
    pub fn estimate(&mut self, ty: &Ty, mode: PrefixMode) -> SizeOf {
        let key = (ty.name(), mode);
        if let Some(size) = self.memo.get(&key) {
            return *size;
        }
        let size = ensure_sufficient_stack(|| self.calculate(ty, mode));
        self.memo.insert(key, size);
        size
    }

    fn sum_all(&mut self, types: &[Ty]) -> SizeOf {
        types.iter().fold(SizeOf::bits(0), |sum, ty| {
            sum.sum(self.estimate(ty, PrefixMode::IncludeStructPrefix))
        })
    }

    fn calculate(&mut self, ty: &Ty, mode: PrefixMode) -> SizeOf {
        match ty {
            Ty::IntN { width, .. } | Ty::BitsN(width) => SizeOf::bits(*width),
            Ty::BytesN(width) => SizeOf::bits(width.saturating_mul(8)),
            Ty::VarIntN { width: 32, .. } => SizeOf::new(5, 253, 0, 0),
            Ty::VarIntN { .. } | Ty::Coins => SizeOf::new(4, 124, 0, 0),
            Ty::Int => SizeOf::bits(257),
            Ty::Bool => SizeOf::bits(1),
            Ty::Null | Ty::Never => SizeOf::bits(0),
            Ty::Void | Ty::Unknown | Ty::Enum(_) => SizeOf::INVALID,

            Ty::Struct { fields, .. } => {
                let prefix = match mode {
                    PrefixMode::IncludeStructPrefix => struct_pack_prefix(ty)
                        .map_or(SizeOf::bits(0), |opcode| SizeOf::bits(opcode.prefix_len)),
                    PrefixMode::AlreadyIncluded => SizeOf::bits(0),
                };
                prefix.sum(self.sum_all(fields))
            }
            Ty::Alias { inner, .. } => self.estimate(inner, PrefixMode::IncludeStructPrefix),
            Ty::Tensor(elements) | Ty::Tuple(elements) => self.sum_all(elements),
            Ty::Union(union) => {
                if let Some(inner) = union.as_nullable() {
                    let inner = self.estimate(inner, PrefixMode::IncludeStructPrefix);
                    if !inner.valid {
                        return SizeOf::INVALID;
                    }
                    return SizeOf::bits(1).sum(SizeOf::new(
                        inner.min_bits,
                        inner.max_bits,
                        0,
                        inner.max_refs,
                    ));
                }

                let variants = union.variants();
                if let [left, right] = variants {
                    if !prefix::has_declared_prefix(left) && !prefix::has_declared_prefix(right) {
                        let left = self.estimate(left, PrefixMode::IncludeStructPrefix);
                        let right = self.estimate(right, PrefixMode::IncludeStructPrefix);
                        return SizeOf::bits(1).sum(left.minmax(right));
                    }
                }

                let Some(opcodes) = auto_generate_opcodes(union) else {
                    return SizeOf::INVALID;
                };
                let mut sizes = variants
                    .iter()
                    .map(|variant| self.estimate(variant, PrefixMode::AlreadyIncluded));
                let mut prefixes = opcodes.iter().map(|opcode| SizeOf::bits(opcode.prefix_len));
                let (Some(first_size), Some(first_prefix)) = (sizes.next(), prefixes.next())
                else {
                    return SizeOf::INVALID;
                };
                let variants_size = sizes.fold(first_size, SizeOf::minmax);
                let prefix_size = prefixes.fold(first_prefix, SizeOf::minmax);
                variants_size.sum(prefix_size)
            }
            Ty::Function { .. } | Ty::TypeParam { .. } => SizeOf::UNPREDICTABLE,
            Ty::Instantiation { inner, args } => self.instantiation(inner, args, mode),
            Ty::Builtin(nominal) => match &*nominal.name {
                "address" => SizeOf::new(2, 2 + 1 + 8 + 256, 0, 0),
                "cell" => SizeOf::new(0, 0, 1, 1),
                "builder" | "slice" => SizeOf::UNPREDICTABLE,
                _ => SizeOf::bits(0),
            },
        }
    }

    fn instantiation(&mut self, inner: &Arc<Ty>, args: &Arc<[Ty]>, mode: PrefixMode) -> SizeOf {
        let Some(nominal) = inner.nominal() else {
            return SizeOf::UNPREDICTABLE;
        };
        match &*nominal.name {
            "Cell" => return SizeOf::new(0, 0, 1, 1),
            "map" => return SizeOf::new(0, 1, 0, 1),
            _ => {}
        }
        if !matches!(&**inner, Ty::Struct { .. } | Ty::Alias { .. }) {
            return SizeOf::UNPREDICTABLE;
        }

        let params = nominal
            .anchor
            .as_ref()
            .map(Decl::type_parameter_names)
            .unwrap_or_default();
        let mut substitution = Substitution::new();
        for (name, arg) in params.into_iter().zip(args.iter()) {
            substitution.insert(name, arg.clone());
        }
        let body = inner.substitute(&substitution);
        ensure_sufficient_stack(|| self.calculate(&body, mode))
    }
}
