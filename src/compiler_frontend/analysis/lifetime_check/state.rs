use crate::compiler_frontend::ir::ir_nodes::ValueId;
use crate::compiler_frontend::source_location::TextLocation;
use rustc_hash::FxHashMap;

/// What a tracked storage location may currently denote.
///
/// The derived ordering (`Invalid < NullPtr < Global < LocalValue`, then by value id)
/// only keeps pointer sets sorted. Analysis results never depend on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ValidityState {
    Invalid,
    NullPtr,

    /// Non-local storage. Nothing produces this yet, but it is never killed by scope exit.
    Global,
    LocalValue(ValueId),
}

/// The set of validity states one pointer may hold (a pset).
/// Kept sorted and deduplicated, it rarely grows past a handful of entries.
#[derive(Debug, Clone, PartialEq, Eq, Default, Hash)]
pub struct PointerSet {
    states: Vec<ValidityState>,
}

impl PointerSet {
    pub fn singleton(state: ValidityState) -> Self {
        Self {
            states: vec![state],
        }
    }

    pub fn invalid() -> Self {
        Self::singleton(ValidityState::Invalid)
    }

    pub fn null() -> Self {
        Self::singleton(ValidityState::NullPtr)
    }

    pub fn local(value: ValueId) -> Self {
        Self::singleton(ValidityState::LocalValue(value))
    }

    pub fn insert(&mut self, state: ValidityState) -> bool {
        match self.states.binary_search(&state) {
            Ok(_) => false,
            Err(index) => {
                self.states.insert(index, state);
                true
            }
        }
    }

    pub fn remove(&mut self, state: ValidityState) -> bool {
        match self.states.binary_search(&state) {
            Ok(index) => {
                self.states.remove(index);
                true
            }
            Err(_) => false,
        }
    }

    pub fn contains(&self, state: ValidityState) -> bool {
        self.states.binary_search(&state).is_ok()
    }

    pub fn has_invalid(&self) -> bool {
        self.contains(ValidityState::Invalid)
    }

    pub fn has_null(&self) -> bool {
        self.contains(ValidityState::NullPtr)
    }

    /// Swaps `from` for `to`. Returns false (and changes nothing) when `from` is absent.
    pub fn replace(&mut self, from: ValidityState, to: ValidityState) -> bool {
        if !self.remove(from) {
            return false;
        }

        self.insert(to);
        true
    }

    pub fn union_with(&mut self, other: &Self) {
        for state in &other.states {
            self.insert(*state);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = ValidityState> + '_ {
        self.states.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

impl FromIterator<ValidityState> for PointerSet {
    fn from_iter<I: IntoIterator<Item = ValidityState>>(iter: I) -> Self {
        let mut set = PointerSet::default();
        for state in iter {
            set.insert(state);
        }
        set
    }
}

/// Flow facts at one program point: every tracked storage location and its pset (a pmap).
///
/// A location missing from the map is untracked, which is different from `{Invalid}`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PointerMap {
    entries: FxHashMap<ValueId, PointerSet>,
}

impl PointerMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, location: ValueId, pset: PointerSet) {
        self.entries.insert(location, pset);
    }

    pub fn get(&self, location: ValueId) -> Option<&PointerSet> {
        self.entries.get(&location)
    }

    pub fn get_mut(&mut self, location: ValueId) -> Option<&mut PointerSet> {
        self.entries.get_mut(&location)
    }

    pub fn remove(&mut self, location: ValueId) -> Option<PointerSet> {
        self.entries.remove(&location)
    }

    pub fn contains(&self, location: ValueId) -> bool {
        self.entries.contains_key(&location)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ValueId, &PointerSet)> + '_ {
        self.entries.iter().map(|(location, pset)| (*location, pset))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (ValueId, &mut PointerSet)> + '_ {
        self.entries
            .iter_mut()
            .map(|(location, pset)| (*location, pset))
    }

    /// Merges the pmaps of mutually exclusive paths back into this (pre-fork) pmap.
    ///
    /// Every location tracked here becomes the union of its psets across `paths`.
    /// Locations that only exist on some path (declared inside an arm) are dropped.
    pub fn join_paths(&mut self, paths: &[PointerMap]) {
        for (location, pset) in self.entries.iter_mut() {
            let mut joined = PointerSet::default();
            for path in paths {
                if let Some(path_pset) = path.get(*location) {
                    joined.union_with(path_pset);
                }
            }

            *pset = joined;
        }
    }

    /// Entries ordered by location id, for stable output.
    pub fn sorted_entries(&self) -> Vec<(ValueId, &PointerSet)> {
        let mut entries = self.iter().collect::<Vec<_>>();
        entries.sort_by_key(|(location, _)| *location);
        entries
    }
}

/// Why a pointer last became invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct InvalidationRecord {
    pub(super) location: TextLocation,

    /// The local that went out of scope, or `None` for a pointer declared without a value.
    pub(super) pointee: Option<ValueId>,
}

/// Provenance side tables, only read when building diagnostic notes.
#[derive(Debug, Default)]
pub(super) struct PointerHistory {
    invalidated: FxHashMap<ValueId, InvalidationRecord>,
    nulled: FxHashMap<ValueId, TextLocation>,
}

impl PointerHistory {
    pub(super) fn record_uninitialized(&mut self, pointer: ValueId, location: TextLocation) {
        self.invalidated.insert(
            pointer,
            InvalidationRecord {
                location,
                pointee: None,
            },
        );
    }

    pub(super) fn record_killed(
        &mut self,
        pointer: ValueId,
        location: TextLocation,
        pointee: ValueId,
    ) {
        self.invalidated.insert(
            pointer,
            InvalidationRecord {
                location,
                pointee: Some(pointee),
            },
        );
    }

    pub(super) fn record_null(&mut self, pointer: ValueId, location: TextLocation) {
        self.nulled.insert(pointer, location);
    }

    pub(super) fn invalidation(&self, pointer: ValueId) -> Option<InvalidationRecord> {
        self.invalidated.get(&pointer).copied()
    }

    pub(super) fn null_assignment(&self, pointer: ValueId) -> Option<TextLocation> {
        self.nulled.get(&pointer).copied()
    }
}
