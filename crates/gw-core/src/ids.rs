use core::fmt;
use core::num::NonZeroU32;

/// Slot of a node, line or generator in its owning arena.
///
/// Worker threads hand back ids, never references, and callers look the
/// entity up again in the grid. Ids are dense from 0 and never reused;
/// detached lines keep theirs.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Id(NonZeroU32);

impl Id {
    /// Id for arena slot `index`.
    pub fn from_index(index: u32) -> Self {
        Self(NonZeroU32::MIN.saturating_add(index))
    }

    pub fn index(self) -> u32 {
        self.0.get() - 1
    }

    /// The index as a `usize`, for arena lookups.
    pub fn slot(self) -> usize {
        self.index() as usize
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.index())
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

pub type NodeId = Id;
pub type EdgeId = Id;
pub type GenId = Id;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_survive_the_round_trip() {
        for i in [0_u32, 1, 41, 150_000] {
            let id = Id::from_index(i);
            assert_eq!(id.index(), i);
            assert_eq!(id.slot(), i as usize);
        }
        assert_eq!(
            core::mem::size_of::<NodeId>(),
            core::mem::size_of::<Option<NodeId>>()
        );
    }

    #[test]
    fn ids_order_by_slot() {
        let mut ids = vec![Id::from_index(3), Id::from_index(0), Id::from_index(7)];
        ids.sort();
        assert_eq!(ids, vec![Id::from_index(0), Id::from_index(3), Id::from_index(7)]);
        assert_eq!(format!("{:?} {}", ids[1], ids[2]), "#3 7");
    }
}
