use indexmap::IndexSet;

use crate::errors::IrError;
use crate::valuation::{Valuation, Valuations, MAX_PROPOSITIONS};

/// Index of an atomic proposition; also its bit position in guards.
pub type PropositionId = usize;

/// Ordered symbol table of the monitored atomic propositions.
///
/// Construction enforces the one-word precondition: a table never holds more
/// than [`MAX_PROPOSITIONS`] names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialize",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "Vec<String>", into = "Vec<String>")
)]
pub struct PropositionTable {
    names: IndexSet<String>,
}

impl PropositionTable {
    pub fn new<I, S>(names: I) -> Result<Self, IrError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = IndexSet::new();
        for name in names {
            let name = name.into();
            if table.contains(&name) {
                return Err(IrError::DuplicateProposition(name));
            }
            table.insert(name);
        }
        if table.len() > MAX_PROPOSITIONS {
            return Err(IrError::TooManyPropositions {
                count: table.len(),
                max: MAX_PROPOSITIONS,
            });
        }
        Ok(PropositionTable { names: table })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn name(&self, id: PropositionId) -> Option<&str> {
        self.names.get_index(id).map(String::as_str)
    }

    pub fn position(&self, name: &str) -> Option<PropositionId> {
        self.names.get_index_of(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (PropositionId, &str)> {
        self.names.iter().map(String::as_str).enumerate()
    }

    /// Mask with one bit per declared proposition.
    pub fn mask(&self) -> Valuation {
        if self.len() == MAX_PROPOSITIONS {
            Valuation::MAX
        } else {
            (1 << self.len()) - 1
        }
    }

    /// Size of the valuation space, `2^k`.
    pub fn valuation_count(&self) -> u64 {
        1u64 << self.len()
    }

    /// Every valuation of the declared propositions, in increasing order.
    pub fn valuations(&self) -> Valuations {
        Valuations::new(self.valuation_count())
    }

    /// Names of the propositions whose bit is set in `mask`, in table order.
    pub fn names_in(&self, mask: Valuation) -> Vec<&str> {
        self.iter()
            .filter(|(id, _)| mask & (1 << *id) != 0)
            .map(|(_, name)| name)
            .collect()
    }
}

impl TryFrom<Vec<String>> for PropositionTable {
    type Error = IrError;

    fn try_from(names: Vec<String>) -> Result<Self, Self::Error> {
        PropositionTable::new(names)
    }
}

impl From<PropositionTable> for Vec<String> {
    fn from(table: PropositionTable) -> Self {
        table.names.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserves_declaration_order() {
        let table = PropositionTable::new(["req", "ack", "err"]).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.name(1), Some("ack"));
        assert_eq!(table.position("err"), Some(2));
        assert_eq!(table.name(3), None);
        assert_eq!(table.names_in(0b101), vec!["req", "err"]);
    }

    #[test]
    fn rejects_duplicates() {
        let err = PropositionTable::new(["p", "q", "p"]).unwrap_err();
        assert_eq!(err, IrError::DuplicateProposition("p".into()));
    }

    #[test]
    fn one_word_precondition() {
        let names: Vec<String> = (0..MAX_PROPOSITIONS).map(|i| format!("p{i}")).collect();
        let table = PropositionTable::new(names.clone()).unwrap();
        assert_eq!(table.mask(), Valuation::MAX);
        assert_eq!(table.valuation_count(), 1u64 << 32);

        let mut too_many = names;
        too_many.push("overflow".into());
        let err = PropositionTable::new(too_many).unwrap_err();
        assert_eq!(
            err,
            IrError::TooManyPropositions {
                count: MAX_PROPOSITIONS + 1,
                max: MAX_PROPOSITIONS
            }
        );
    }

    #[test]
    fn empty_table_has_one_valuation() {
        let table = PropositionTable::default();
        assert_eq!(table.mask(), 0);
        assert_eq!(table.valuations().collect::<Vec<_>>(), vec![0]);
    }
}
