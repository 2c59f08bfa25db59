//! Tag prefixes of union variants.

use crate::ty::{Ty, UnionTy};

/// A tag written before a union variant: `prefix_len` low bits of
/// `prefix`. Prefixes wider than 128 bits keep their full length and the
/// low 128 bits of their value.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PackOpcode {
    pub prefix: u128,
    pub prefix_len: u32,
}

impl PackOpcode {
    pub const fn new(prefix: u128, prefix_len: u32) -> Self {
        PackOpcode { prefix, prefix_len }
    }
}

/// Parse a struct pack prefix literal. Hex prefixes are 4 bits per digit
/// and binary prefixes 1 bit per digit, leading zeros included; decimal
/// prefixes take the bit length of their value.
pub fn parse_pack_prefix(text: &str) -> Option<PackOpcode> {
    let cleaned: String = text.chars().filter(|&c| c != '_').collect();
    let (digits, radix) = if let Some(hex) = cleaned
        .strip_prefix("0x")
        .or_else(|| cleaned.strip_prefix("0X"))
    {
        (hex, 16)
    } else if let Some(bin) = cleaned
        .strip_prefix("0b")
        .or_else(|| cleaned.strip_prefix("0B"))
    {
        (bin, 2)
    } else {
        (cleaned.as_str(), 10)
    };
    let values = digits
        .chars()
        .map(|c| c.to_digit(radix))
        .collect::<Option<Vec<u32>>>()?;
    if values.is_empty() {
        return None;
    }
    let prefix = values.iter().fold(0u128, |acc, &digit| {
        acc.wrapping_mul(u128::from(radix))
            .wrapping_add(u128::from(digit))
    });
    let prefix_len = match radix {
        16 => u32::try_from(values.len() * 4).ok()?,
        2 => u32::try_from(values.len()).ok()?,
        _ => decimal_bit_length(values),
    };
    Some(PackOpcode::new(prefix, prefix_len))
}

/// Bit length of a decimal number given by its digits, at least 1.
fn decimal_bit_length(mut digits: Vec<u32>) -> u32 {
    let mut bits = 0;
    let mut start = 0;
    while let Some(first) = digits[start..].iter().position(|&digit| digit != 0) {
        start += first;
        let mut carry = 0;
        for digit in &mut digits[start..] {
            let current = carry * 10 + *digit;
            *digit = current / 2;
            carry = current % 2;
        }
        bits += 1;
    }
    bits.max(1)
}

/// Declared pack prefix of a struct type.
pub fn struct_pack_prefix(ty: &Ty) -> Option<PackOpcode> {
    declared_prefix_text(ty).and_then(|text| parse_pack_prefix(&text))
}

fn declared_prefix_text(ty: &Ty) -> Option<String> {
    let Ty::Struct { .. } = ty else {
        return None;
    };
    let prefix = ty.anchor()?.as_struct()?.pack_prefix()?;
    Some(prefix.text().to_owned())
}

/// Whether the type is a struct declared with a pack prefix.
pub(crate) fn has_declared_prefix(ty: &Ty) -> bool {
    declared_prefix_text(ty).is_some()
}

/// Tags for every variant of a union, in variant order.
///
/// When every variant is a struct with a declared prefix those prefixes
/// are used. When none is, tags are synthesized: `null` gets `0` over one
/// bit and the others `1` followed by their index, or just the index over
/// `ceil(log2 n)` bits when there is no `null`. Mixing declared and
/// synthesized tags is invalid and yields `None`.
pub fn auto_generate_opcodes(union: &UnionTy) -> Option<Vec<PackOpcode>> {
    let unwrapped: Vec<Ty> = union.variants().iter().map(Ty::unwrap_alias).collect();
    let with_prefix = unwrapped.iter().filter(|ty| has_declared_prefix(ty)).count();
    let has_null = unwrapped.iter().any(|ty| matches!(ty, Ty::Null));

    if with_prefix == unwrapped.len() {
        return Some(
            unwrapped
                .iter()
                .map(|ty| struct_pack_prefix(ty).unwrap_or(PackOpcode::new(0, 1)))
                .collect(),
        );
    }
    if with_prefix > 0 {
        return None;
    }

    let without_null = unwrapped.len() - usize::from(has_null);
    let prefix_len = ceil_log2(without_null);
    let mut next = 0u128;
    let opcodes = unwrapped
        .iter()
        .map(|ty| {
            if matches!(ty, Ty::Null) {
                PackOpcode::new(0, 1)
            } else {
                let index = next;
                next += 1;
                if has_null {
                    PackOpcode::new((1u128 << prefix_len) + index, prefix_len + 1)
                } else {
                    PackOpcode::new(index, prefix_len)
                }
            }
        })
        .collect();
    Some(opcodes)
}

fn ceil_log2(n: usize) -> u32 {
    if n <= 1 {
        0
    } else {
        usize::BITS - (n - 1).leading_zeros()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn prefix_literals() {
        assert_eq!(parse_pack_prefix("0x7362d09c"), Some(PackOpcode::new(0x7362_d09c, 32)));
        assert_eq!(parse_pack_prefix("0x01"), Some(PackOpcode::new(1, 8)));
        assert_eq!(parse_pack_prefix("0b0011"), Some(PackOpcode::new(3, 4)));
        assert_eq!(parse_pack_prefix("5"), Some(PackOpcode::new(5, 3)));
        assert_eq!(parse_pack_prefix("0"), Some(PackOpcode::new(0, 1)));
        assert_eq!(parse_pack_prefix("0x_ff"), Some(PackOpcode::new(0xff, 8)));
        assert_eq!(parse_pack_prefix("0xzz"), None);
        assert_eq!(parse_pack_prefix("0x"), None);
    }

    #[test]
    fn wide_prefixes_keep_their_length() {
        let hex = format!("0x{}", "0123456789abcdef".repeat(2) + "01");
        assert_eq!(parse_pack_prefix(&hex).map(|op| op.prefix_len), Some(136));
        let bin = format!("0b1{}", "0".repeat(199));
        assert_eq!(parse_pack_prefix(&bin).map(|op| op.prefix_len), Some(200));
        // 2^128 and 2^130 - 1
        let big = parse_pack_prefix("340282366920938463463374607431768211456");
        assert_eq!(big.map(|op| op.prefix_len), Some(129));
        let bigger = parse_pack_prefix("1361129467683753853853498429727072845823");
        assert_eq!(bigger.map(|op| op.prefix_len), Some(130));
    }

    #[test]
    fn decimal_bit_lengths() {
        assert_eq!(decimal_bit_length(vec![0]), 1);
        assert_eq!(decimal_bit_length(vec![1]), 1);
        assert_eq!(decimal_bit_length(vec![2, 5, 5]), 8);
        assert_eq!(decimal_bit_length(vec![2, 5, 6]), 9);
    }

    #[test]
    fn log2_rounds_up() {
        assert_eq!(ceil_log2(0), 0);
        assert_eq!(ceil_log2(1), 0);
        assert_eq!(ceil_log2(2), 1);
        assert_eq!(ceil_log2(3), 2);
        assert_eq!(ceil_log2(4), 2);
        assert_eq!(ceil_log2(5), 3);
    }
}
