use super::cnf::Instance;
use super::error::{Error, Result};
use super::word::Word;

/// A finite partial key→value map compiled to guarded implications.
///
/// For every entry and every output bit one OR clause is emitted reading
/// "input differs from the key somewhere, or this output bit matches the
/// value" — `|entries| * value_width` clauses in total. Keys absent from the
/// table leave the output word unconstrained, so a lookup never makes an
/// instance unsatisfiable by itself.
#[derive(Debug, Clone)]
pub struct LookupTable {
    key_width: usize,
    value_width: usize,
    entries: Vec<(u64, u64)>,
}

impl LookupTable {
    pub fn new(key_width: usize, value_width: usize) -> Self {
        assert!((1..=64).contains(&key_width), "key width must be in 1..=64");
        assert!(
            (1..=64).contains(&value_width),
            "value width must be in 1..=64"
        );
        Self {
            key_width,
            value_width,
            entries: Vec::new(),
        }
    }

    pub fn key_width(&self) -> usize {
        self.key_width
    }

    pub fn value_width(&self) -> usize {
        self.value_width
    }

    pub fn entries(&self) -> &[(u64, u64)] {
        &self.entries
    }

    /// Record a key→value pair. Only the low `key_width`/`value_width` bits
    /// participate in the encoding.
    pub fn insert(&mut self, key: u64, value: u64) {
        self.entries.push((key, value));
    }

    pub fn from_entries(
        key_width: usize,
        value_width: usize,
        entries: impl IntoIterator<Item = (u64, u64)>,
    ) -> Self {
        let mut table = Self::new(key_width, value_width);
        for (k, v) in entries {
            table.insert(k, v);
        }
        table
    }

    /// Constrain a fresh output word to follow the table wherever `input`
    /// hits a key. Each clause holds, per input bit, the literal that is
    /// false exactly when that bit matches the key, plus the output bit in
    /// the value's polarity.
    pub fn apply(&self, inst: &mut Instance, input: &Word) -> Result<Word> {
        input.check_owner(inst)?;
        if input.size() != self.key_width {
            return Err(Error::SizeMismatch {
                left: input.size(),
                right: self.key_width,
            });
        }
        let output = Word::fresh(inst, self.value_width);
        for &(key, value) in &self.entries {
            for j in 0..self.value_width {
                let mut clause = Vec::with_capacity(self.key_width + 1);
                for (i, &bit) in input.bits().iter().enumerate() {
                    if (key >> i) & 1 == 1 {
                        clause.push(bit.negate());
                    } else {
                        clause.push(bit);
                    }
                }
                let out_bit = output.bits()[j];
                if (value >> j) & 1 == 1 {
                    clause.push(out_bit);
                } else {
                    clause.push(out_bit.negate());
                }
                inst.add_or(&clause)?;
            }
        }
        Ok(output)
    }
}
