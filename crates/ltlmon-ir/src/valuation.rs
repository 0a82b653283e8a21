//! Valuation encoder: truth assignments and transition guards as bit words.
//!
//! Bit `i` of a [`Valuation`] is the truth value of proposition `i` in the
//! [`PropositionTable`](crate::PropositionTable). Guards use the same layout.

use std::fmt;
use std::iter::FusedIterator;

use crate::propositions::PropositionId;

/// One truth assignment to every monitored atomic proposition.
pub type Valuation = u32;

/// Number of propositions a single valuation word can hold.
pub const MAX_PROPOSITIONS: usize = Valuation::BITS as usize;

/// Conjunction of literals guarding a transition.
///
/// Bits set in `pos` must hold, bits set in `neg` must not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Guard {
    pub pos: Valuation,
    pub neg: Valuation,
}

impl Guard {
    pub fn new(pos: Valuation, neg: Valuation) -> Self {
        Guard { pos, neg }
    }

    /// The guard with no literals, satisfied by every valuation.
    pub fn always() -> Self {
        Guard { pos: 0, neg: 0 }
    }

    pub fn with_pos(mut self, prop: PropositionId) -> Self {
        self.pos |= bit(prop);
        self
    }

    pub fn with_neg(mut self, prop: PropositionId) -> Self {
        self.neg |= bit(prop);
        self
    }

    pub fn is_always(&self) -> bool {
        self.pos == 0 && self.neg == 0
    }

    /// All propositions mentioned by the guard, positive or negative.
    pub fn support(&self) -> Valuation {
        self.pos | self.neg
    }

    /// `(pos & v) == pos && (neg & !v) == neg`
    pub fn is_satisfied(&self, valuation: Valuation) -> bool {
        (self.pos & valuation) == self.pos && (self.neg & !valuation) == self.neg
    }

    /// Literals in proposition order, `(prop, positive)`.
    ///
    /// A proposition set in both masks yields two literals, positive first.
    pub fn literals(&self) -> impl Iterator<Item = (PropositionId, bool)> + '_ {
        (0..MAX_PROPOSITIONS).flat_map(move |prop| {
            let pos = (self.pos & bit(prop) != 0).then_some((prop, true));
            let neg = (self.neg & bit(prop) != 0).then_some((prop, false));
            pos.into_iter().chain(neg)
        })
    }
}

impl fmt::Display for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_always() {
            return write!(f, "true");
        }
        for (i, (prop, positive)) in self.literals().enumerate() {
            if i > 0 {
                write!(f, " && ")?;
            }
            if positive {
                write!(f, "p{prop}")?;
            } else {
                write!(f, "!p{prop}")?;
            }
        }
        Ok(())
    }
}

/// Single-bit mask for a proposition.
///
/// # Panics
/// If `prop` does not fit in a valuation word. A wrapped shift would alias a
/// lower proposition, which `Automaton::validate` cannot detect.
pub fn bit(prop: PropositionId) -> Valuation {
    assert!(
        prop < MAX_PROPOSITIONS,
        "proposition index {prop} exceeds the {MAX_PROPOSITIONS}-proposition valuation word"
    );
    1 << prop
}

/// Truth value of `prop` under `valuation`.
pub fn holds(valuation: Valuation, prop: PropositionId) -> bool {
    valuation & bit(prop) != 0
}

/// Pack per-proposition truth values into a valuation (bit `i` = `values[i]`).
pub fn pack(values: &[bool]) -> Valuation {
    values
        .iter()
        .enumerate()
        .filter(|(_, v)| **v)
        .fold(0, |acc, (i, _)| acc | bit(i))
}

/// Iterator over the full valuation space `[0, 2^k)`.
#[derive(Debug, Clone)]
pub struct Valuations {
    next: u64,
    end: u64,
}

impl Valuations {
    pub(crate) fn new(count: u64) -> Self {
        Valuations { next: 0, end: count }
    }
}

impl Iterator for Valuations {
    type Item = Valuation;

    fn next(&mut self) -> Option<Valuation> {
        if self.next >= self.end {
            return None;
        }
        let v = self.next as Valuation;
        self.next += 1;
        Some(v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::try_from(self.end - self.next).unwrap_or(usize::MAX);
        (remaining, Some(remaining))
    }
}

impl FusedIterator for Valuations {}
