// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A macro to define fixed-size flag sets.
//!
//! Used for the negotiated capability set, which is computed once and then only
//! queried, so the generated type is `Copy` and all queries are `const fn`.

#[macro_export]
#[doc(hidden)]
macro_rules! glint_bitflags {
    (
        $(#[$attr:meta])*
        $vis:vis struct $name:ident: $ty:ty {
            $(
                $(#[$flag_attr:meta])*
                const $flag_name:ident = $flag_value:expr;
            )*
        }
    ) => {
        $(#[$attr])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
        $vis struct $name {
            bits: $ty,
        }

        impl $name {
            /// An empty set of flags.
            pub const EMPTY: Self = Self { bits: 0 };

            $(
                $(#[$flag_attr])*
                pub const $flag_name: Self = Self { bits: $flag_value };
            )*

            /// Every named flag together with its name, in declaration order.
            const NAMED: &'static [(&'static str, $ty)] = &[
                $((stringify!($flag_name), $flag_value),)*
            ];

            /// Creates a set from raw bits. Unknown bits are kept.
            pub const fn from_bits_truncate(bits: $ty) -> Self {
                Self { bits }
            }

            /// Returns the raw value of the set.
            pub const fn bits(&self) -> $ty {
                self.bits
            }

            /// Returns `true` if no flag is set.
            pub const fn is_empty(&self) -> bool {
                self.bits == 0
            }

            /// Returns `true` if all flags in `other` are contained within `self`.
            pub const fn contains(&self, other: Self) -> bool {
                (self.bits & other.bits) == other.bits
            }

            /// Returns `true` if any flag in `other` is contained within `self`.
            pub const fn intersects(&self, other: Self) -> bool {
                (self.bits & other.bits) != 0
            }

            /// Inserts the flags in `other` into `self`.
            pub fn insert(&mut self, other: Self) {
                self.bits |= other.bits;
            }

            /// Inserts or removes `other` depending on `value`.
            pub fn set(&mut self, other: Self, value: bool) {
                if value {
                    self.bits |= other.bits;
                } else {
                    self.bits &= !other.bits;
                }
            }

            /// Removes the flags in `other` from `self`.
            pub fn remove(&mut self, other: Self) {
                self.bits &= !other.bits;
            }

            /// Returns a new set with `other` inserted.
            #[must_use]
            pub const fn with(mut self, other: Self) -> Self {
                self.bits |= other.bits;
                self
            }

            /// Returns a new set with `other` removed.
            #[must_use]
            pub const fn without(mut self, other: Self) -> Self {
                self.bits &= !other.bits;
                self
            }

            /// Iterates over the names of the single-bit flags present in the set.
            pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
                Self::NAMED.iter().filter_map(move |(name, value)| {
                    let single_bit = *value != 0 && (*value & (*value - 1)) == 0;
                    (single_bit && (self.bits & *value) == *value).then_some(*name)
                })
            }
        }

        impl core::ops::BitOr for $name {
            type Output = Self;
            fn bitor(self, other: Self) -> Self {
                Self { bits: self.bits | other.bits }
            }
        }

        impl core::ops::BitAnd for $name {
            type Output = Self;
            fn bitand(self, other: Self) -> Self {
                Self { bits: self.bits & other.bits }
            }
        }

        impl core::ops::BitOrAssign for $name {
            fn bitor_assign(&mut self, other: Self) {
                self.bits |= other.bits;
            }
        }

        impl core::ops::BitAndAssign for $name {
            fn bitand_assign(&mut self, other: Self) {
                self.bits &= other.bits;
            }
        }

        impl core::ops::Not for $name {
            type Output = Self;
            fn not(self) -> Self {
                Self { bits: !self.bits }
            }
        }

        impl core::fmt::Debug for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{} {{ ", stringify!($name))?;
                let mut known: $ty = 0;
                let mut first = true;
                for name in self.names() {
                    if !first {
                        write!(f, " | ")?;
                    }
                    write!(f, "{}", name)?;
                    first = false;
                }
                for (_, value) in Self::NAMED {
                    if (self.bits & *value) == *value {
                        known |= *value;
                    }
                }
                let unknown = self.bits & !known;
                if unknown != 0 {
                    if !first {
                        write!(f, " | ")?;
                    }
                    write!(f, "UNKNOWN({:#x})", unknown)?;
                    first = false;
                }
                if first {
                    write!(f, "EMPTY")?;
                }
                write!(f, " }}")
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::glint_bitflags;

    glint_bitflags! {
        /// Feature flags used to exercise the macro.
        pub struct Features: u64 {
            const FLOAT = 1 << 0;
            const ARRAY = 1 << 1;
            const SRGB = 1 << 2;
            const INSTANCING = 1 << 40;
            const FLOAT_AND_SRGB = Self::FLOAT.bits() | Self::SRGB.bits();
        }
    }

    #[test]
    fn empty_set_has_no_flags() {
        let set = Features::EMPTY;
        assert!(set.is_empty());
        assert!(set.contains(Features::EMPTY));
        assert!(!set.contains(Features::FLOAT));
        assert_eq!(Features::default(), Features::EMPTY);
        assert_eq!(format!("{:?}", set), "Features { EMPTY }");
    }

    #[test]
    fn contains_and_intersects() {
        let set = Features::FLOAT | Features::INSTANCING;
        assert!(set.contains(Features::FLOAT));
        assert!(set.contains(Features::INSTANCING));
        assert!(!set.contains(Features::FLOAT_AND_SRGB));
        assert!(set.intersects(Features::FLOAT_AND_SRGB));
        assert!(!set.intersects(Features::ARRAY));
    }

    #[test]
    fn set_and_remove() {
        let mut set = Features::EMPTY;
        set.set(Features::ARRAY, true);
        set.insert(Features::SRGB);
        assert_eq!(set, Features::ARRAY | Features::SRGB);
        set.set(Features::ARRAY, false);
        assert_eq!(set, Features::SRGB);
        set.remove(Features::SRGB);
        assert!(set.is_empty());
    }

    #[test]
    fn with_and_without_leave_the_original_untouched() {
        let base = Features::FLOAT;
        let more = base.with(Features::ARRAY);
        assert_eq!(more, Features::FLOAT | Features::ARRAY);
        assert_eq!(more.without(Features::FLOAT), Features::ARRAY);
        assert_eq!(base, Features::FLOAT);
    }

    #[test]
    fn names_skip_composite_flags() {
        let set = Features::FLOAT_AND_SRGB;
        let names: Vec<_> = set.names().collect();
        assert_eq!(names, vec!["FLOAT", "SRGB"]);
    }

    #[test]
    fn debug_lists_names_and_unknown_bits() {
        let set = Features::ARRAY | Features::from_bits_truncate(1 << 8);
        assert_eq!(format!("{:?}", set), "Features { ARRAY | UNKNOWN(0x100) }");
        assert_eq!(
            format!("{:?}", Features::INSTANCING),
            "Features { INSTANCING }"
        );
    }

    #[test]
    fn bit_and_assign_intersects() {
        let mut set = Features::FLOAT | Features::ARRAY | Features::SRGB;
        set &= Features::ARRAY | Features::INSTANCING;
        assert_eq!(set, Features::ARRAY);
    }
}
