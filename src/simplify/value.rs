//! The symbolic value lattice used during traversal.
//!
//! Three levels: a known constant, a known allocation shape, or [`SymbolicValue::Unknown`]
//! (top). The join of two differing values is `Unknown`; joining equal values is the
//! identity. The lattice has finite height per register, which is what makes the
//! driver's fixed point terminate. Deeper tracking (value ranges, array contents) would
//! slot in as additional variants here.

use std::sync::Arc;

/// A compile-time-known constant.
///
/// Floats compare bitwise so that the lattice is stable in the presence of NaN: a
/// register holding NaN joined with itself must stay constant, not oscillate.
#[derive(Debug, Clone)]
pub enum ConstValue {
    /// 32-bit integer (also booleans, bytes, chars and shorts).
    Int(i32),
    /// 64-bit integer.
    Long(i64),
    /// 32-bit float.
    Float(f32),
    /// 64-bit float.
    Double(f64),
    /// Interned string constant.
    String(Arc<str>),
    /// Resolved class constant (`const-class`).
    Class(Arc<str>),
    /// The null reference (`const` 0 used as a reference).
    Null,
}

impl PartialEq for ConstValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ConstValue::Int(a), ConstValue::Int(b)) => a == b,
            (ConstValue::Long(a), ConstValue::Long(b)) => a == b,
            (ConstValue::Float(a), ConstValue::Float(b)) => a.to_bits() == b.to_bits(),
            (ConstValue::Double(a), ConstValue::Double(b)) => a.to_bits() == b.to_bits(),
            (ConstValue::String(a), ConstValue::String(b)) => a == b,
            (ConstValue::Class(a), ConstValue::Class(b)) => a == b,
            (ConstValue::Null, ConstValue::Null) => true,
            _ => false,
        }
    }
}

impl Eq for ConstValue {}

impl ConstValue {
    /// The signed integer interpretation used by the `if-*` comparisons.
    ///
    /// Integers compare as themselves and `Null` compares as zero (Dalvik encodes null
    /// as the integer literal 0). Other constants have no branch-integer form.
    #[must_use]
    pub fn as_branch_int(&self) -> Option<i64> {
        match self {
            ConstValue::Int(v) => Some(i64::from(*v)),
            ConstValue::Null => Some(0),
            _ => None,
        }
    }

    /// The 32-bit integer payload, if this is an integer constant.
    #[must_use]
    pub fn as_int(&self) -> Option<i32> {
        match self {
            ConstValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// The 64-bit integer payload, if this is a long constant.
    #[must_use]
    pub fn as_long(&self) -> Option<i64> {
        match self {
            ConstValue::Long(v) => Some(*v),
            _ => None,
        }
    }

    /// Whether this constant occupies a register pair.
    #[must_use]
    pub fn is_wide(&self) -> bool {
        matches!(self, ConstValue::Long(_) | ConstValue::Double(_))
    }
}

/// One point of the symbolic lattice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolicValue {
    /// Nothing is known about the value. Top of the lattice; absorbing under join.
    Unknown,
    /// The value is a known constant.
    Const(ConstValue),
    /// The value is a reference to an allocation of known class, with unknown contents
    /// (`new-instance`, `new-array`).
    Object {
        /// The allocated type's descriptor
        class: Arc<str>,
    },
}

impl SymbolicValue {
    /// Shorthand for a known 32-bit integer.
    #[must_use]
    pub fn int(v: i32) -> Self {
        SymbolicValue::Const(ConstValue::Int(v))
    }

    /// Shorthand for a known 64-bit integer.
    #[must_use]
    pub fn long(v: i64) -> Self {
        SymbolicValue::Const(ConstValue::Long(v))
    }

    /// Whether nothing is known about the value.
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        matches!(self, SymbolicValue::Unknown)
    }

    /// The constant payload, if the value is known.
    #[must_use]
    pub fn as_const(&self) -> Option<&ConstValue> {
        match self {
            SymbolicValue::Const(c) => Some(c),
            _ => None,
        }
    }

    /// Joins two lattice points: equal values keep their knowledge, differing values
    /// degrade to [`SymbolicValue::Unknown`].
    #[must_use]
    pub fn join(&self, other: &SymbolicValue) -> SymbolicValue {
        if self == other {
            self.clone()
        } else {
            SymbolicValue::Unknown
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_equal_constants_keeps_constant() {
        let a = SymbolicValue::int(7);
        let b = SymbolicValue::int(7);
        assert_eq!(a.join(&b), SymbolicValue::int(7));
    }

    #[test]
    fn join_differing_constants_is_unknown() {
        let a = SymbolicValue::int(7);
        let b = SymbolicValue::int(8);
        assert_eq!(a.join(&b), SymbolicValue::Unknown);
    }

    #[test]
    fn unknown_absorbs() {
        let c = SymbolicValue::long(-1);
        assert_eq!(SymbolicValue::Unknown.join(&c), SymbolicValue::Unknown);
        assert_eq!(c.join(&SymbolicValue::Unknown), SymbolicValue::Unknown);
        assert_eq!(
            SymbolicValue::Unknown.join(&SymbolicValue::Unknown),
            SymbolicValue::Unknown
        );
    }

    #[test]
    fn join_is_commutative_and_idempotent() {
        let values = [
            SymbolicValue::Unknown,
            SymbolicValue::int(0),
            SymbolicValue::long(9),
            SymbolicValue::Const(ConstValue::Null),
            SymbolicValue::Object {
                class: "Ljava/lang/Object;".into(),
            },
        ];
        for a in &values {
            assert_eq!(a.join(a), *a);
            for b in &values {
                assert_eq!(a.join(b), b.join(a));
            }
        }
    }

    #[test]
    fn nan_is_a_stable_constant() {
        let nan = SymbolicValue::Const(ConstValue::Float(f32::NAN));
        assert_eq!(nan.join(&nan), nan);
    }

    #[test]
    fn null_branches_as_zero() {
        assert_eq!(ConstValue::Null.as_branch_int(), Some(0));
        assert_eq!(ConstValue::Int(-3).as_branch_int(), Some(-3));
        assert_eq!(ConstValue::String("s".into()).as_branch_int(), None);
    }
}
