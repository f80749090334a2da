use super::cnf::{Instance, Literal};
use super::error::{Error, Result};

/// Shift distance: a fixed integer, or a symbolic word (always rejected —
/// the encoding is structural and cannot route bits by a variable amount).
pub enum ShiftAmount<'a> {
    Fixed(usize),
    Variable(&'a Word),
}

impl From<usize> for ShiftAmount<'_> {
    fn from(n: usize) -> Self {
        ShiftAmount::Fixed(n)
    }
}

impl<'a> From<&'a Word> for ShiftAmount<'a> {
    fn from(w: &'a Word) -> Self {
        ShiftAmount::Variable(w)
    }
}

/// A fixed-width unsigned integer as a little-endian run of literals.
///
/// A word does not own its variables — the instance does. It is a cheap view
/// naming a semantic grouping of bits; operators are pure over their word
/// operands but append clauses and fresh variables to the instance they are
/// given. Width is between 1 and 64 so constants and decoded values travel
/// as `u64`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    owner: u64,
    bits: Vec<Literal>,
}

impl Word {
    /// Fresh unconstrained word of `size` bits.
    pub fn fresh(inst: &mut Instance, size: usize) -> Word {
        assert!((1..=64).contains(&size), "word size must be in 1..=64");
        let bits = (0..size).map(|_| inst.allocate_variable()).collect();
        Word {
            owner: inst.id(),
            bits,
        }
    }

    /// Fresh word pinned to `value` (low `size` bits of it).
    pub fn constant(inst: &mut Instance, size: usize, value: u64) -> Result<Word> {
        let w = Word::fresh(inst, size);
        w.must_be(inst, value)?;
        Ok(w)
    }

    pub fn size(&self) -> usize {
        self.bits.len()
    }

    pub fn bits(&self) -> &[Literal] {
        &self.bits
    }

    pub(crate) fn check_owner(&self, inst: &Instance) -> Result<()> {
        if self.owner != inst.id() {
            return Err(Error::ForeignWord);
        }
        Ok(())
    }

    /// Both operands owned by `inst` and of equal width. Runs before any
    /// clause is emitted so a failed operation has no side effects.
    fn check_operands(&self, inst: &Instance, other: &Word) -> Result<()> {
        self.check_owner(inst)?;
        other.check_owner(inst)?;
        if self.size() != other.size() {
            return Err(Error::SizeMismatch {
                left: self.size(),
                right: other.size(),
            });
        }
        Ok(())
    }

    /// Pin every bit with a unit clause: positive where the constant has a
    /// one, negated where it has a zero.
    pub fn must_be(&self, inst: &mut Instance, value: u64) -> Result<()> {
        self.check_owner(inst)?;
        for (i, &bit) in self.bits.iter().enumerate() {
            if (value >> i) & 1 == 1 {
                inst.add_or(&[bit])?;
            } else {
                inst.add_or(&[bit.negate()])?;
            }
        }
        Ok(())
    }

    /// Ripple-carry addition modulo 2^size. The final carry-out is dropped:
    /// there is no overflow signal, matching fixed-width unsigned semantics.
    pub fn add(&self, inst: &mut Instance, other: &Word) -> Result<Word> {
        self.check_operands(inst, other)?;
        let mut carry = inst.allocate_variable();
        inst.add_or(&[carry.negate()])?;
        let mut bits = Vec::with_capacity(self.size());
        for (&a, &b) in self.bits.iter().zip(&other.bits) {
            let (sum, carry_out) = full_adder(inst, a, b, carry)?;
            bits.push(sum);
            carry = carry_out;
        }
        Ok(Word {
            owner: self.owner,
            bits,
        })
    }

    /// Two's-complement arithmetic negation: `!self + 1`.
    pub fn negate(&self, inst: &mut Instance) -> Result<Word> {
        let inverted = self.bitwise_not(inst)?;
        let one = Word::constant(inst, self.size(), 1)?;
        inverted.add(inst, &one)
    }

    /// Subtraction modulo 2^size, as addition of the negation.
    pub fn sub(&self, inst: &mut Instance, other: &Word) -> Result<Word> {
        self.check_operands(inst, other)?;
        let neg = other.negate(inst)?;
        self.add(inst, &neg)
    }

    pub fn bitwise_and(&self, inst: &mut Instance, other: &Word) -> Result<Word> {
        self.check_operands(inst, other)?;
        let mut bits = Vec::with_capacity(self.size());
        for (&a, &b) in self.bits.iter().zip(&other.bits) {
            let out = inst.allocate_variable();
            inst.add_or(&[out.negate(), a])?;
            inst.add_or(&[out.negate(), b])?;
            inst.add_or(&[out, a.negate(), b.negate()])?;
            bits.push(out);
        }
        Ok(Word {
            owner: self.owner,
            bits,
        })
    }

    pub fn bitwise_or(&self, inst: &mut Instance, other: &Word) -> Result<Word> {
        self.check_operands(inst, other)?;
        let mut bits = Vec::with_capacity(self.size());
        for (&a, &b) in self.bits.iter().zip(&other.bits) {
            let out = inst.allocate_variable();
            inst.add_or(&[out, a.negate()])?;
            inst.add_or(&[out, b.negate()])?;
            inst.add_or(&[out.negate(), a, b])?;
            bits.push(out);
        }
        Ok(Word {
            owner: self.owner,
            bits,
        })
    }

    pub fn bitwise_not(&self, inst: &mut Instance) -> Result<Word> {
        self.check_owner(inst)?;
        let mut bits = Vec::with_capacity(self.size());
        for &a in &self.bits {
            let out = inst.allocate_variable();
            inst.add_or(&[a, out])?;
            inst.add_or(&[a.negate(), out.negate()])?;
            bits.push(out);
        }
        Ok(Word {
            owner: self.owner,
            bits,
        })
    }

    /// Per-bit XOR. On a parity-capable backend each output bit costs one
    /// XOR clause; otherwise the four-clause CNF table is emitted. The
    /// choice follows the backend the instance was built with, never the
    /// call site, since one serialized instance must stay within one
    /// dialect.
    pub fn bitwise_xor(&self, inst: &mut Instance, other: &Word) -> Result<Word> {
        self.check_operands(inst, other)?;
        let parity = inst.supports_xor();
        let mut bits = Vec::with_capacity(self.size());
        for (&a, &b) in self.bits.iter().zip(&other.bits) {
            let out = inst.allocate_variable();
            if parity {
                inst.add_xor(&[a, b, out.negate()])?;
            } else {
                inst.add_or(&[a.negate(), b.negate(), out.negate()])?;
                inst.add_or(&[a, b, out.negate()])?;
                inst.add_or(&[a, b.negate(), out])?;
                inst.add_or(&[a.negate(), b, out])?;
            }
            bits.push(out);
        }
        Ok(Word {
            owner: self.owner,
            bits,
        })
    }

    /// Structural left shift by a fixed amount, clamped to `[0, size]`.
    /// Drops the top bits and fills the bottom with zero-pinned literals; no
    /// bit of the result gets a new defining clause.
    pub fn shift_left<'a>(
        &self,
        inst: &mut Instance,
        amount: impl Into<ShiftAmount<'a>>,
    ) -> Result<Word> {
        self.check_owner(inst)?;
        let n = self.fixed_amount(amount.into())?;
        if n == 0 {
            return Ok(self.clone());
        }
        let zeros = Word::constant(inst, n, 0)?;
        let mut bits = zeros.bits;
        bits.extend_from_slice(&self.bits[..self.size() - n]);
        Ok(Word {
            owner: self.owner,
            bits,
        })
    }

    /// Structural right shift by a fixed amount, clamped to `[0, size]`.
    pub fn shift_right<'a>(
        &self,
        inst: &mut Instance,
        amount: impl Into<ShiftAmount<'a>>,
    ) -> Result<Word> {
        self.check_owner(inst)?;
        let n = self.fixed_amount(amount.into())?;
        if n == 0 {
            return Ok(self.clone());
        }
        let zeros = Word::constant(inst, n, 0)?;
        let mut bits = self.bits[n..].to_vec();
        bits.extend_from_slice(&zeros.bits);
        Ok(Word {
            owner: self.owner,
            bits,
        })
    }

    fn fixed_amount(&self, amount: ShiftAmount) -> Result<usize> {
        match amount {
            ShiftAmount::Fixed(n) => Ok(n.min(self.size())),
            ShiftAmount::Variable(_) => Err(Error::UnsupportedVariableShift),
        }
    }

    /// `self + constant`, the constant promoted to a word of this width.
    pub fn add_const(&self, inst: &mut Instance, value: u64) -> Result<Word> {
        self.check_owner(inst)?;
        let c = Word::constant(inst, self.size(), value)?;
        self.add(inst, &c)
    }

    /// `self & constant`, the constant promoted to a word of this width.
    pub fn and_const(&self, inst: &mut Instance, value: u64) -> Result<Word> {
        self.check_owner(inst)?;
        let c = Word::constant(inst, self.size(), value)?;
        self.bitwise_and(inst, &c)
    }

    /// `self | constant`, the constant promoted to a word of this width.
    pub fn or_const(&self, inst: &mut Instance, value: u64) -> Result<Word> {
        self.check_owner(inst)?;
        let c = Word::constant(inst, self.size(), value)?;
        self.bitwise_or(inst, &c)
    }

    /// `self ^ constant`, the constant promoted to a word of this width.
    pub fn xor_const(&self, inst: &mut Instance, value: u64) -> Result<Word> {
        self.check_owner(inst)?;
        let c = Word::constant(inst, self.size(), value)?;
        self.bitwise_xor(inst, &c)
    }

    /// Integer value under the instance's model.
    pub fn decode(&self, inst: &Instance) -> Result<u64> {
        self.check_owner(inst)?;
        let mut value = 0u64;
        for (i, &bit) in self.bits.iter().enumerate() {
            if inst.value_of(bit)? {
                value |= 1 << i;
            }
        }
        Ok(value)
    }
}

/// One full-adder stage over fresh sum and carry-out literals, axiomatized
/// by the complete 3-in/2-out truth table: eight clauses define the carry
/// (majority), eight the sum (parity).
fn full_adder(
    inst: &mut Instance,
    a: Literal,
    b: Literal,
    c: Literal,
) -> Result<(Literal, Literal)> {
    let sum = inst.allocate_variable();
    let carry = inst.allocate_variable();

    inst.add_or(&[carry, a, b.negate(), c.negate()])?;
    inst.add_or(&[carry, a.negate(), b, c.negate()])?;
    inst.add_or(&[carry, a.negate(), b.negate(), c])?;
    inst.add_or(&[carry, a.negate(), b.negate(), c.negate()])?;
    inst.add_or(&[carry.negate(), a, b, c])?;
    inst.add_or(&[carry.negate(), a, b, c.negate()])?;
    inst.add_or(&[carry.negate(), a, b.negate(), c])?;
    inst.add_or(&[carry.negate(), a.negate(), b, c])?;

    inst.add_or(&[sum, a, b, c.negate()])?;
    inst.add_or(&[sum, a, b.negate(), c])?;
    inst.add_or(&[sum, a.negate(), b, c])?;
    inst.add_or(&[sum, a.negate(), b.negate(), c.negate()])?;
    inst.add_or(&[sum.negate(), a, b, c])?;
    inst.add_or(&[sum.negate(), a, b.negate(), c.negate()])?;
    inst.add_or(&[sum.negate(), a.negate(), b, c.negate()])?;
    inst.add_or(&[sum.negate(), a.negate(), b.negate(), c])?;

    Ok((sum, carry))
}
