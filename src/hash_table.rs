use alloc::vec::Vec;
use core::fmt::Debug;
use core::marker::PhantomData;

use crate::policy::RebuildPolicy;

/// Slot value marking a cell no probe has passed through since the last
/// rebuild.
const EMPTY: usize = usize::MAX;

/// Slot value marking a removed entry. Probes continue past it.
const TOMBSTONE: usize = usize::MAX - 1;

/// A cell of the slot index: empty, tombstone, or the dense position of an
/// entry.
///
/// Dense positions are always `< TOMBSTONE` because a `Vec` cannot hold more
/// than `isize::MAX` elements.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(transparent)]
struct Slot(usize);

impl Slot {
    const EMPTY: Slot = Slot(EMPTY);
    const TOMBSTONE: Slot = Slot(TOMBSTONE);

    #[inline(always)]
    fn occupied(index: usize) -> Self {
        debug_assert!(index < TOMBSTONE);
        Slot(index)
    }

    #[inline(always)]
    fn is_empty(self) -> bool {
        self.0 == EMPTY
    }

    #[inline(always)]
    fn is_tombstone(self) -> bool {
        self.0 == TOMBSTONE
    }

    #[inline(always)]
    fn dense_index(self) -> Option<usize> {
        if self.0 >= TOMBSTONE {
            None
        } else {
            Some(self.0)
        }
    }
}

#[inline(always)]
fn home_slot(hash: u64, slot_count: usize) -> usize {
    (hash % slot_count as u64) as usize
}

/// Find the first empty slot on the probe sequence of `hash`.
///
/// Only valid when the caller knows the value being placed is not already
/// present, e.g. while repopulating a freshly cleared index.
#[inline]
fn probe_vacant(slots: &[Slot], hash: u64) -> usize {
    let mut index = home_slot(hash, slots.len());
    loop {
        if slots[index].is_empty() {
            return index;
        }
        index += 1;
        if index == slots.len() {
            index = 0;
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum RebuildCause {
    Grow,
    Shrink,
    Reserve,
    Compact,
    Clear,
}

#[derive(Clone)]
struct Bucket<V> {
    hash: u64,
    value: V,
}

/// Debug statistics for hash table analysis.
///
/// Available in tests and with the `stats` feature.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone)]
pub struct DebugStats {
    /// Number of elements currently in the table
    pub populated: usize,
    /// Number of insertions the table accepts before its next growth rebuild
    pub capacity: usize,
    /// Total number of slots in the index
    pub total_slots: usize,
    /// Number of slots referencing an entry
    pub occupied_slots: usize,
    /// Number of slots holding a tombstone
    pub tombstones: usize,
    /// Number of empty slots
    pub empty_slots: usize,
    /// Insertions counted against the growth trigger since the last rebuild
    pub inserted_since_rebuild: usize,
    /// Load factor (populated / total_slots)
    pub load_factor: f64,
    /// Tombstone ratio (tombstones / total_slots)
    pub tombstone_ratio: f64,
    /// Total memory in bytes used by the entry store, slot index and reverse
    /// map
    pub total_bytes: usize,
}

#[cfg(any(test, feature = "stats"))]
impl DebugStats {
    /// Pretty-print the debug statistics.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Hash Table Debug Statistics ===");
        println!(
            "Population: {}/{} slots ({:.2}% load factor)",
            self.populated,
            self.total_slots,
            self.load_factor * 100.0
        );
        println!(
            "Slots: {} occupied, {} tombstones ({:.2}%), {} empty",
            self.occupied_slots,
            self.tombstones,
            self.tombstone_ratio * 100.0,
            self.empty_slots
        );
        println!(
            "Growth budget: {} insertions since rebuild, capacity {}",
            self.inserted_since_rebuild, self.capacity
        );
        println!("Total Allocated: {} bytes", self.total_bytes);
    }
}

/// Distribution of probe lengths over the live entries of a table.
///
/// `counts()[d]` is the number of entries stored `d` slots past their home
/// slot.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeHistogram {
    counts: Vec<usize>,
}

#[cfg(any(test, feature = "stats"))]
impl ProbeHistogram {
    /// Returns the per-distance entry counts.
    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// Returns the longest probe distance of any entry, or `None` for an empty
    /// table.
    pub fn max_probe_length(&self) -> Option<usize> {
        self.counts.iter().rposition(|&count| count != 0)
    }

    /// Returns the mean probe distance over all entries.
    pub fn mean_probe_length(&self) -> f64 {
        let total: usize = self.counts.iter().sum();
        if total == 0 {
            return 0.0;
        }
        let weighted: usize = self
            .counts
            .iter()
            .enumerate()
            .map(|(distance, count)| distance * count)
            .sum();
        weighted as f64 / total as f64
    }

    /// Pretty-print the histogram.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        let total: usize = self.counts.iter().sum();
        println!("=== Probe Length Histogram ===");
        for (distance, &count) in self.counts.iter().enumerate() {
            if count == 0 {
                continue;
            }
            println!(
                "{:>4}: {:>8} ({:>6.2}%)",
                distance,
                count,
                count as f64 / total as f64 * 100.0
            );
        }
        println!("Mean probe length: {:.3}", self.mean_probe_length());
    }
}

/// A hash table using open addressing with linear probing over a dense entry
/// store.
///
/// `HashTable<V>` keeps its values contiguously in insertion order (modulo
/// swap-removal) and addresses them through a separate slot index. Like
/// [`hashbrown::HashTable`], it does not know how to hash or compare values:
/// every operation takes the value's hash and an equality predicate.
///
/// ## Layout
///
/// - **entries**: the dense store, positions `0..len`.
/// - **slots**: the slot index. Each cell is empty, a tombstone, or the dense
///   position of an entry. A value with hash `h` lives on the linear probe
///   sequence starting at `h % slot_count`.
/// - **reverse**: `reverse[i]` is the slot referencing `entries[i]`, which
///   makes relocating an entry during swap-removal O(1).
///
/// Removal leaves a tombstone. Tombstones are only cleared by a rebuild,
/// which is triggered according to the table's [`RebuildPolicy`].
///
/// ## Rebuilds and positions
///
/// A rebuild recomputes the slot index and reverse map but keeps the dense
/// store in place, so dense positions only change through removal.
///
/// ## Example
///
/// ```rust
/// # use core::hash::Hash;
/// # use core::hash::Hasher;
/// #
/// # use linear_probe::hash_table::Entry;
/// # use linear_probe::hash_table::HashTable;
/// # use siphasher::sip::SipHasher;
/// #
/// # fn hash_str(s: &str) -> u64 {
/// #     let mut hasher = SipHasher::new();
/// #     s.hash(&mut hasher);
/// #     hasher.finish()
/// # }
/// #
/// let mut table = HashTable::new();
/// let hash = hash_str("alice");
///
/// match table.entry(hash, |(name, _): &(&str, u32)| *name == "alice") {
///     Entry::Vacant(entry) => {
///         entry.insert(("alice", 30));
///     }
///     Entry::Occupied(_) => unreachable!(),
/// }
///
/// assert_eq!(table.find(hash, |(name, _)| *name == "alice"), Some(&("alice", 30)));
/// ```
///
/// [`hashbrown::HashTable`]: https://docs.rs/hashbrown/latest/hashbrown/struct.HashTable.html
pub struct HashTable<V> {
    entries: Vec<Bucket<V>>,
    slots: Vec<Slot>,
    reverse: Vec<usize>,

    inserted: usize,
    policy: RebuildPolicy,
}

impl<V> Debug for HashTable<V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        use alloc::format;
        use alloc::string::String;
        use alloc::string::ToString;

        f.debug_struct("HashTable")
            .field(
                "slots",
                &self
                    .slots
                    .chunks(16)
                    .map(|chunk| {
                        chunk
                            .iter()
                            .map(|slot| match slot.dense_index() {
                                Some(index) => format!("{index:>4}"),
                                None if slot.is_tombstone() => "  xx".to_string(),
                                None => "  ..".to_string(),
                            })
                            .collect::<Vec<_>>()
                            .join(",")
                    })
                    .collect::<Vec<String>>(),
            )
            .field("reverse", &self.reverse)
            .field("populated", &self.entries.len())
            .field("inserted_since_rebuild", &self.inserted)
            .field("density", &self.policy.density())
            .finish()
    }
}

impl<V> Clone for HashTable<V>
where
    V: Clone,
{
    /// Clones the table by re-inserting every value, in dense order, into a
    /// freshly built empty table with the same policy.
    fn clone(&self) -> Self {
        let mut table = Self::with_policy(self.policy);
        table.entries.reserve(self.entries.len());
        table.reverse.reserve(self.entries.len());

        for bucket in &self.entries {
            let slot = probe_vacant(&table.slots, bucket.hash);
            table.insert_at(slot, bucket.hash, bucket.value.clone());
        }

        debug_assert_eq!(table.entries.len(), self.entries.len());
        table
    }
}

impl<V> Default for HashTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> HashTable<V> {
    /// Creates an empty table with the default [`RebuildPolicy`].
    ///
    /// The slot index starts with a single empty slot.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use linear_probe::hash_table::HashTable;
    /// #
    /// let table: HashTable<u64> = HashTable::new();
    /// assert!(table.is_empty());
    /// assert_eq!(table.slot_count(), 1);
    /// ```
    pub fn new() -> Self {
        Self::with_policy(RebuildPolicy::default())
    }

    /// Creates an empty table with the given policy.
    pub fn with_policy(policy: RebuildPolicy) -> Self {
        Self::with_capacity_and_policy(0, policy)
    }

    /// Creates an empty table that accepts at least `capacity` insertions
    /// before its first rebuild.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use linear_probe::hash_table::HashTable;
    /// #
    /// let table: HashTable<String> = HashTable::with_capacity(100);
    /// assert!(table.capacity() >= 100);
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_policy(capacity, RebuildPolicy::default())
    }

    /// Creates an empty table with the given policy that accepts at least
    /// `capacity` insertions before its first rebuild.
    pub fn with_capacity_and_policy(capacity: usize, policy: RebuildPolicy) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            slots: alloc::vec![Slot::EMPTY; policy.rebuilt_slots(capacity)],
            reverse: Vec::with_capacity(capacity),
            inserted: 0,
            policy,
        }
    }

    /// Returns the policy governing rebuilds of this table.
    pub fn policy(&self) -> RebuildPolicy {
        self.policy
    }

    /// Returns `true` if the table contains no elements.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of elements in the table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns the number of cells in the slot index.
    ///
    /// This is `m` in the policy formulas: it is always at least one, and is
    /// only changed by a rebuild.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of elements the table can hold before an insertion
    /// triggers a growth rebuild.
    ///
    /// Tombstones left by removals consume this budget until the next rebuild,
    /// so the capacity can drop after a removal.
    pub fn capacity(&self) -> usize {
        let limit = self.policy.insertions_before_grow(self.slots.len());
        self.entries.len() + limit.saturating_sub(self.inserted + 1)
    }

    /// Returns an iterator over all values in dense order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use linear_probe::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// table.entry(1, |&v: &u64| v == 10).or_insert(10);
    /// table.entry(2, |&v: &u64| v == 20).or_insert(20);
    ///
    /// let values: Vec<u64> = table.iter().copied().collect();
    /// assert_eq!(values, vec![10, 20]);
    /// ```
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            inner: self.entries.iter(),
        }
    }

    /// Returns an iterator yielding mutable references to all values in dense
    /// order.
    ///
    /// Callers must not change the part of a value that its hash and equality
    /// predicate depend on.
    pub fn iter_mut(&mut self) -> IterMut<'_, V> {
        IterMut {
            inner: self.entries.iter_mut(),
        }
    }

    /// Removes all values from the table and returns them as an iterator, in
    /// dense order.
    ///
    /// The table is reset to its minimal size immediately, whether or not the
    /// iterator is consumed.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use linear_probe::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// table.entry(7, |&v: &u64| v == 7).or_insert(7);
    ///
    /// let values: Vec<u64> = table.drain().collect();
    /// assert!(table.is_empty());
    /// assert_eq!(values, vec![7]);
    /// ```
    pub fn drain(&mut self) -> Drain<'_, V> {
        let entries = core::mem::take(&mut self.entries);
        self.rebuild_for(0, RebuildCause::Clear);
        Drain {
            inner: entries.into_iter(),
            _marker: PhantomData,
        }
    }

    /// Removes all elements, releases their storage, and shrinks the slot
    /// index back to one slot.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use linear_probe::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// for v in 0..10u64 {
    ///     table.entry(v, |&x: &u64| x == v).or_insert(v);
    /// }
    /// assert!(table.slot_count() > 1);
    ///
    /// table.clear();
    /// assert!(table.is_empty());
    /// assert_eq!(table.slot_count(), 1);
    /// ```
    pub fn clear(&mut self) {
        log::debug!("Clearing table of {} entries", self.entries.len());
        self.entries = Vec::new();
        self.rebuild_for(0, RebuildCause::Clear);
    }

    /// Rebuilds the slot index for exactly the current number of elements,
    /// discarding every tombstone and releasing unused storage.
    pub fn shrink_to_fit(&mut self) {
        self.rebuild_for(self.entries.len(), RebuildCause::Compact);
        self.entries.shrink_to_fit();
        self.reverse.shrink_to_fit();
    }

    /// Reserves room for at least `additional` more insertions without a
    /// growth rebuild.
    ///
    /// Does nothing if the current slot index already has room. A removal may
    /// still shrink the index afterwards if the table becomes sparse enough.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use linear_probe::hash_table::HashTable;
    /// #
    /// let mut table: HashTable<u64> = HashTable::new();
    /// table.reserve(50);
    /// assert!(table.capacity() >= 50);
    ///
    /// let slots = table.slot_count();
    /// for v in 0..50u64 {
    ///     table.entry(v, |&x| x == v).or_insert(v);
    /// }
    /// assert_eq!(table.slot_count(), slots);
    /// ```
    pub fn reserve(&mut self, additional: usize) {
        let pending = self.inserted.saturating_add(additional);
        if self.policy.should_grow(pending, self.slots.len()) {
            let target = self.entries.len().saturating_add(additional);
            self.rebuild_for(target, RebuildCause::Reserve);
        }
        self.entries.reserve(additional);
        self.reverse.reserve(additional);
    }

    /// Returns a reference to the matching value, if any.
    ///
    /// # Arguments
    ///
    /// * `hash` - The hash value of the entry to find
    /// * `eq` - A predicate function that returns `true` for the value to find
    #[inline]
    pub fn find(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&V> {
        self.find_index(hash, eq)
            .map(|index| &self.entries[index].value)
    }

    /// Returns a mutable reference to the matching value, if any.
    #[inline]
    pub fn find_mut(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&mut V> {
        self.find_index(hash, eq)
            .map(|index| &mut self.entries[index].value)
    }

    /// Returns the dense position of the matching value, if any.
    ///
    /// Positions are valid until the next removal.
    #[inline]
    pub fn find_index(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<usize> {
        let slot = self.find_place(hash, eq);
        self.slots[slot].dense_index()
    }

    /// Returns the value at dense position `index`.
    pub fn get_index(&self, index: usize) -> Option<&V> {
        self.entries.get(index).map(|bucket| &bucket.value)
    }

    /// Returns a mutable reference to the value at dense position `index`.
    pub fn get_index_mut(&mut self, index: usize) -> Option<&mut V> {
        self.entries.get_mut(index).map(|bucket| &mut bucket.value)
    }

    /// Removes and returns the matching value.
    ///
    /// The last value in dense order is moved into the vacated position and
    /// the removed value's slot becomes a tombstone. Removing an absent value
    /// is a no-op.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use linear_probe::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// table.entry(42, |&n: &u64| n == 42).or_insert(42);
    ///
    /// assert_eq!(table.remove(42, |&n| n == 42), Some(42));
    /// assert!(table.is_empty());
    /// assert_eq!(table.remove(99, |&n| n == 99), None);
    /// ```
    pub fn remove(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<V> {
        let slot = self.find_place(hash, eq);
        if self.slots[slot].dense_index().is_none() {
            return None;
        }
        Some(self.remove_at(slot))
    }

    /// Retains only the values for which `f` returns `true`.
    ///
    /// Values are visited in dense order; each removal swaps the last value
    /// into the current position, which is then visited next.
    pub fn retain(&mut self, mut f: impl FnMut(&mut V) -> bool) {
        let mut index = 0;
        while index < self.entries.len() {
            if f(&mut self.entries[index].value) {
                index += 1;
            } else {
                let slot = self.reverse[index];
                self.remove_at(slot);
            }
        }
    }

    /// Gets an entry for the given hash and equality predicate.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use linear_probe::hash_table::Entry;
    /// # use linear_probe::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    ///
    /// match table.entry(5, |s: &String| s == "hello") {
    ///     Entry::Vacant(entry) => {
    ///         entry.insert("hello".to_string());
    ///     }
    ///     Entry::Occupied(mut entry) => {
    ///         *entry.get_mut() = "updated".to_string();
    ///     }
    /// }
    ///
    /// let value = table.entry(5, |s: &String| s == "hello").or_insert("other".to_string());
    /// assert_eq!(value, "hello");
    /// ```
    pub fn entry(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Entry<'_, V> {
        let slot = self.find_place(hash, eq);
        match self.slots[slot].dense_index() {
            Some(index) => Entry::Occupied(OccupiedEntry {
                table: self,
                slot,
                index,
            }),
            None => Entry::Vacant(VacantEntry {
                table: self,
                slot,
                hash,
            }),
        }
    }

    /// Resolve the slot for `hash`: either the slot referencing the matching
    /// value, or the first empty slot on its probe sequence.
    ///
    /// Tombstones are skipped. Termination relies on the growth trigger
    /// keeping at least one slot empty.
    #[inline]
    fn find_place(&self, hash: u64, eq: impl Fn(&V) -> bool) -> usize {
        let slot_count = self.slots.len();
        let mut index = home_slot(hash, slot_count);
        let mut probes = 0;
        loop {
            let slot = self.slots[index];
            if slot.is_empty() {
                return index;
            }
            if let Some(dense) = slot.dense_index() {
                let bucket = &self.entries[dense];
                if bucket.hash == hash && eq(&bucket.value) {
                    return index;
                }
            }

            probes += 1;
            debug_assert!(probes < slot_count, "slot index has no empty slot");
            index += 1;
            if index == slot_count {
                index = 0;
            }
        }
    }

    /// Place `value` at the empty `slot` and return its dense position.
    ///
    /// The returned position stays valid if the insertion triggers a rebuild.
    fn insert_at(&mut self, slot: usize, hash: u64, value: V) -> usize {
        debug_assert!(self.slots[slot].is_empty());

        let index = self.entries.len();
        self.entries.push(Bucket { hash, value });
        self.slots[slot] = Slot::occupied(index);
        self.reverse.push(slot);
        self.inserted += 1;

        if self.policy.should_grow(self.inserted, self.slots.len()) {
            self.rebuild_for(self.entries.len(), RebuildCause::Grow);
        }

        index
    }

    /// Swap-remove the value referenced by `slot`, leaving a tombstone.
    fn remove_at(&mut self, slot: usize) -> V {
        let Some(index) = self.slots[slot].dense_index() else {
            unreachable!("remove_at called on an unoccupied slot");
        };

        let bucket = self.entries.swap_remove(index);
        self.reverse.swap_remove(index);
        if index < self.entries.len() {
            let moved_slot = self.reverse[index];
            self.slots[moved_slot] = Slot::occupied(index);
        }
        self.slots[slot] = Slot::TOMBSTONE;

        if self.policy.should_shrink(self.entries.len(), self.slots.len()) {
            self.rebuild_for(self.entries.len(), RebuildCause::Shrink);
        }

        bucket.value
    }

    /// Replace the slot index with a fresh one sized for `target_len` entries
    /// and re-insert every entry in dense order.
    fn rebuild_for(&mut self, target_len: usize, cause: RebuildCause) {
        let target_len = target_len.max(self.entries.len());
        let slot_count = self.policy.rebuilt_slots(target_len);
        log::trace!(
            "Rebuilding slot index ({cause:?}): {} entries, {} -> {slot_count} slots",
            self.entries.len(),
            self.slots.len(),
        );

        // Fresh buffers so a shrinking rebuild hands memory back.
        self.slots = alloc::vec![Slot::EMPTY; slot_count];
        self.reverse = Vec::with_capacity(target_len);
        self.inserted = 0;

        for (index, bucket) in self.entries.iter().enumerate() {
            let slot = probe_vacant(&self.slots, bucket.hash);
            self.slots[slot] = Slot::occupied(index);
            self.reverse.push(slot);
            self.inserted += 1;
        }

        debug_assert!(!self.policy.should_grow(self.inserted, self.slots.len()));
    }

    /// Returns the distribution of probe distances of the live entries.
    #[cfg(any(test, feature = "stats"))]
    pub fn probe_histogram(&self) -> ProbeHistogram {
        let slot_count = self.slots.len();
        let mut counts = Vec::new();
        for (bucket, &slot) in self.entries.iter().zip(&self.reverse) {
            let home = home_slot(bucket.hash, slot_count);
            let distance = (slot + slot_count - home) % slot_count;
            if counts.len() <= distance {
                counts.resize(distance + 1, 0);
            }
            counts[distance] += 1;
        }
        ProbeHistogram { counts }
    }

    /// Returns a snapshot of the table's occupancy.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> DebugStats {
        let total_slots = self.slots.len();
        let tombstones = self.slots.iter().filter(|slot| slot.is_tombstone()).count();
        let empty_slots = self.slots.iter().filter(|slot| slot.is_empty()).count();
        let occupied_slots = total_slots - tombstones - empty_slots;

        DebugStats {
            populated: self.entries.len(),
            capacity: self.capacity(),
            total_slots,
            occupied_slots,
            tombstones,
            empty_slots,
            inserted_since_rebuild: self.inserted,
            load_factor: self.entries.len() as f64 / total_slots as f64,
            tombstone_ratio: tombstones as f64 / total_slots as f64,
            total_bytes: self.entries.capacity() * core::mem::size_of::<Bucket<V>>()
                + self.slots.capacity() * core::mem::size_of::<Slot>()
                + self.reverse.capacity() * core::mem::size_of::<usize>(),
        }
    }

    /// Panics unless every structural invariant holds.
    #[cfg(test)]
    pub(crate) fn assert_invariants(&self, eq: impl Fn(&V, &V) -> bool) {
        assert!(!self.slots.is_empty());
        assert_eq!(self.reverse.len(), self.entries.len());
        assert!(
            self.slots.iter().any(|slot| slot.is_empty()),
            "no empty slot: {self:#?}"
        );
        assert!(!self.policy.should_grow(self.inserted, self.slots.len()));

        let occupied = self
            .slots
            .iter()
            .filter(|slot| slot.dense_index().is_some())
            .count();
        assert_eq!(occupied, self.entries.len());

        for (slot_index, slot) in self.slots.iter().enumerate() {
            if let Some(index) = slot.dense_index() {
                assert_eq!(self.reverse[index], slot_index, "{self:#?}");
            }
        }

        for (index, bucket) in self.entries.iter().enumerate() {
            assert_eq!(self.slots[self.reverse[index]], Slot::occupied(index));
            assert_eq!(
                self.find_index(bucket.hash, |v| eq(v, &bucket.value)),
                Some(index),
                "{self:#?}"
            );
        }
    }
}

/// A view into a single entry in a table, which may either be vacant or
/// occupied.
///
/// This enum is constructed from the [`entry`] method on [`HashTable`].
///
/// [`entry`]: HashTable::entry
pub enum Entry<'a, V> {
    /// A vacant entry - no matching value is present in the table
    Vacant(VacantEntry<'a, V>),
    /// An occupied entry - a matching value is present in the table
    Occupied(OccupiedEntry<'a, V>),
}

impl<'a, V> Entry<'a, V> {
    /// Inserts `default` if the entry is vacant and returns a mutable
    /// reference to the value.
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Inserts the value returned by `default` if the entry is vacant and
    /// returns a mutable reference to the value.
    ///
    /// The closure is not called for an occupied entry.
    pub fn or_insert_with(self, default: impl FnOnce() -> V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }

    /// Applies `f` to the value of an occupied entry and returns it. Returns
    /// `None` without inserting anything for a vacant entry.
    pub fn and_modify(self, f: impl FnOnce(&mut V)) -> Option<&'a mut V> {
        match self {
            Entry::Occupied(entry) => {
                let value = entry.into_mut();
                f(value);
                Some(value)
            }
            Entry::Vacant(_) => None,
        }
    }

    /// Inserts `V::default()` if the entry is vacant and returns a mutable
    /// reference to the value.
    pub fn or_default(self) -> &'a mut V
    where
        V: Default,
    {
        self.or_insert_with(Default::default)
    }
}

/// A view into a vacant entry in the table.
///
/// Holds the empty slot found by the lookup. The table stays mutably borrowed,
/// so the slot cannot go stale before [`insert`](VacantEntry::insert).
pub struct VacantEntry<'a, V> {
    table: &'a mut HashTable<V>,
    slot: usize,
    hash: u64,
}

impl<'a, V> VacantEntry<'a, V> {
    /// Inserts the value and returns a mutable reference to it.
    ///
    /// The insertion may rebuild the slot index; the returned reference is
    /// resolved through the value's dense position, which a rebuild does not
    /// move.
    pub fn insert(self, value: V) -> &'a mut V {
        let table = self.table;
        let index = table.insert_at(self.slot, self.hash, value);
        &mut table.entries[index].value
    }

    /// Inserts the value and returns its dense position.
    pub fn insert_index(self, value: V) -> usize {
        self.table.insert_at(self.slot, self.hash, value)
    }
}

/// A view into an occupied entry in the table.
pub struct OccupiedEntry<'a, V> {
    table: &'a mut HashTable<V>,
    slot: usize,
    index: usize,
}

impl<'a, V> OccupiedEntry<'a, V> {
    /// Returns the dense position of the value.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Gets a reference to the value in the entry.
    pub fn get(&self) -> &V {
        &self.table.entries[self.index].value
    }

    /// Gets a mutable reference to the value in the entry.
    pub fn get_mut(&mut self) -> &mut V {
        &mut self.table.entries[self.index].value
    }

    /// Converts the entry into a mutable reference to the value with the
    /// lifetime of the table borrow.
    pub fn into_mut(self) -> &'a mut V {
        let table = self.table;
        &mut table.entries[self.index].value
    }

    /// Removes the value from the table and returns it.
    pub fn remove(self) -> V {
        self.table.remove_at(self.slot)
    }
}

/// An iterator over the values of a [`HashTable`], in dense order.
///
/// This struct is created by the [`iter`] method on [`HashTable`].
///
/// [`iter`]: HashTable::iter
pub struct Iter<'a, V> {
    inner: core::slice::Iter<'a, Bucket<V>>,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|bucket| &bucket.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}

/// A mutable iterator over the values of a [`HashTable`], in dense order.
pub struct IterMut<'a, V> {
    inner: core::slice::IterMut<'a, Bucket<V>>,
}

impl<'a, V> Iterator for IterMut<'a, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|bucket| &mut bucket.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> ExactSizeIterator for IterMut<'_, V> {}

/// A draining iterator over the values of a [`HashTable`].
///
/// This struct is created by the [`drain`] method on [`HashTable`].
///
/// [`drain`]: HashTable::drain
pub struct Drain<'a, V> {
    inner: alloc::vec::IntoIter<Bucket<V>>,
    _marker: PhantomData<&'a mut HashTable<V>>,
}

impl<V> Iterator for Drain<'_, V> {
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|bucket| bucket.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> ExactSizeIterator for Drain<'_, V> {}

/// An owning iterator over the values of a [`HashTable`], in dense order.
pub struct IntoIter<V> {
    inner: alloc::vec::IntoIter<Bucket<V>>,
}

impl<V> Iterator for IntoIter<V> {
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|bucket| bucket.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> ExactSizeIterator for IntoIter<V> {}

impl<V> IntoIterator for HashTable<V> {
    type Item = V;
    type IntoIter = IntoIter<V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.entries.into_iter(),
        }
    }
}

impl<'a, V> IntoIterator for &'a HashTable<V> {
    type Item = &'a V;
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
