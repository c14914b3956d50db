use core::borrow::Borrow;
use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;
use core::ops::Index;

use crate::error::Error;
use crate::error::Result;
use crate::hash_table::Entry as TableEntry;
use crate::hash_table::HashTable;
use crate::policy::RebuildPolicy;

cfg_if::cfg_if! {
    if #[cfg(feature = "foldhash")] {
        /// The hasher builder used when none is specified.
        ///
        /// With the `foldhash` feature this is `foldhash::fast::RandomState`.
        pub type DefaultHashBuilder = foldhash::fast::RandomState;
    } else if #[cfg(feature = "std")] {
        /// The hasher builder used when none is specified.
        ///
        /// Without the `foldhash` feature this is the standard library's
        /// `RandomState`.
        pub type DefaultHashBuilder = std::hash::RandomState;
    } else {
        /// Placeholder hasher builder for builds with neither `foldhash` nor
        /// `std`.
        ///
        /// It cannot be constructed: maps must be created with an explicit
        /// hasher through [`HashMap::with_hasher`] and friends.
        #[derive(Clone, Copy, Debug)]
        pub enum DefaultHashBuilder {}
    }
}

/// Equality predicate matching a stored pair against a borrowed key.
fn equivalent_key<K, Q, V>(key: &Q) -> impl Fn(&(K, V)) -> bool + '_
where
    K: Borrow<Q>,
    Q: Eq + ?Sized,
{
    move |(k, _)| key.eq(k.borrow())
}

/// A hash map built on the linear-probing [`HashTable`].
///
/// `HashMap<K, V, S>` stores key-value pairs where keys implement `Hash + Eq`
/// and uses a configurable hasher builder `S` to hash keys. Entries live in a
/// dense store, so iteration walks a contiguous array.
///
/// Unlike `std::collections::HashMap`, [`insert`](HashMap::insert) never
/// overwrites an existing value. Use [`get_mut`](HashMap::get_mut) or the
/// [`entry`](HashMap::entry) API to update in place.
///
/// # Performance Characteristics
///
/// - **Memory**: one `usize` slot per `density²` entries after a rebuild, one
///   `usize` reverse pointer and a `u64` cached hash per entry, plus the size
///   of `(K, V)`.
/// - **Rebuilds**: O(n), amortized over the O(n) insertions or removals that
///   trigger them.
#[derive(Clone)]
pub struct HashMap<K, V, S = DefaultHashBuilder> {
    table: HashTable<(K, V)>,
    hash_builder: S,
}

impl<K, V, S> Debug for HashMap<K, V, S>
where
    K: Debug,
    V: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, S> HashMap<K, V, S> {
    /// Returns the number of elements in the map.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use linear_probe::HashMap;
    /// #
    /// let mut map = HashMap::new();
    /// assert_eq!(map.len(), 0);
    /// map.insert(1, "a");
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the map contains no elements.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the number of elements the map can hold before an insertion
    /// triggers a growth rebuild.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Returns the number of cells in the slot index.
    pub fn slot_count(&self) -> usize {
        self.table.slot_count()
    }

    /// Returns the rebuild policy of the map.
    pub fn policy(&self) -> RebuildPolicy {
        self.table.policy()
    }

    /// Returns a reference to the map's hasher builder.
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }

    /// Removes all elements and shrinks the slot index to a single slot.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use linear_probe::HashMap;
    /// #
    /// let mut map = HashMap::new();
    /// map.insert(1, "a");
    /// map.clear();
    /// assert!(map.is_empty());
    /// assert_eq!(map.slot_count(), 1);
    /// ```
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Rebuilds the slot index for the current number of elements, dropping
    /// all tombstones.
    pub fn shrink_to_fit(&mut self) {
        self.table.shrink_to_fit();
    }

    /// Reserves room for at least `additional` more insertions without a
    /// growth rebuild.
    pub fn reserve(&mut self, additional: usize) {
        self.table.reserve(additional);
    }

    /// Returns the key-value pair at dense position `index`.
    ///
    /// Positions run `0..len()` and are stable until the next removal.
    pub fn get_index(&self, index: usize) -> Option<(&K, &V)> {
        self.table.get_index(index).map(|(k, v)| (k, v))
    }

    /// Returns the key and a mutable reference to the value at dense position
    /// `index`.
    pub fn get_index_mut(&mut self, index: usize) -> Option<(&K, &mut V)> {
        self.table.get_index_mut(index).map(|(k, v)| (&*k, v))
    }

    /// Retains only the elements for which `f` returns `true`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use linear_probe::HashMap;
    /// #
    /// let mut map: HashMap<i32, i32> = (0..8).map(|x| (x, x * 10)).collect();
    /// map.retain(|&k, _| k % 2 == 0);
    /// assert_eq!(map.len(), 4);
    /// ```
    pub fn retain(&mut self, mut f: impl FnMut(&K, &mut V) -> bool) {
        self.table.retain(|(k, v)| f(&*k, v));
    }

    /// Returns an iterator over the key-value pairs in dense order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use linear_probe::HashMap;
    /// #
    /// let mut map = HashMap::new();
    /// map.insert("a", 1);
    /// map.insert("b", 2);
    ///
    /// let sum: i32 = map.iter().map(|(_, v)| v).sum();
    /// assert_eq!(sum, 3);
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// Returns an iterator over the key-value pairs with mutable values.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            inner: self.table.iter_mut(),
        }
    }

    /// Returns an iterator over the keys.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Returns an iterator over the values.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Returns an iterator over mutable references to the values.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use linear_probe::HashMap;
    /// #
    /// let mut map = HashMap::new();
    /// map.insert("a", 1);
    /// for value in map.values_mut() {
    ///     *value *= 10;
    /// }
    /// assert_eq!(map["a"], 10);
    /// ```
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut {
            inner: self.iter_mut(),
        }
    }

    /// Removes all key-value pairs and returns them as an iterator.
    ///
    /// The map is empty once this returns, even if the iterator is dropped
    /// before it is exhausted.
    pub fn drain(&mut self) -> Drain<'_, K, V> {
        Drain {
            inner: self.table.drain(),
        }
    }

    /// Returns the probe length distribution of the stored keys.
    #[cfg(feature = "stats")]
    pub fn probe_histogram(&self) -> crate::hash_table::ProbeHistogram {
        self.table.probe_histogram()
    }

    /// Returns occupancy statistics for the underlying table.
    #[cfg(feature = "stats")]
    pub fn debug_stats(&self) -> crate::hash_table::DebugStats {
        self.table.debug_stats()
    }
}

impl<K, V, S> HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Creates a new hash map with the given hasher builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::BuildHasher;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # use linear_probe::HashMap;
    /// #
    /// # struct SimpleHasher;
    /// # impl BuildHasher for SimpleHasher {
    /// #     type Hasher = SipHasher;
    /// #
    /// #     fn build_hasher(&self) -> Self::Hasher {
    /// #         SipHasher::new()
    /// #     }
    /// # }
    /// #
    /// let map: HashMap<i32, String, _> = HashMap::with_hasher(SimpleHasher);
    /// assert!(map.is_empty());
    /// ```
    pub fn with_hasher(hash_builder: S) -> Self {
        Self::with_capacity_and_hasher(0, hash_builder)
    }

    /// Creates a new hash map with the specified capacity and hasher builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::BuildHasher;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # use linear_probe::HashMap;
    /// #
    /// # struct SimpleHasher;
    /// # impl BuildHasher for SimpleHasher {
    /// #     type Hasher = SipHasher;
    /// #
    /// #     fn build_hasher(&self) -> Self::Hasher {
    /// #         SipHasher::new()
    /// #     }
    /// # }
    /// #
    /// let map: HashMap<i32, String, _> = HashMap::with_capacity_and_hasher(100, SimpleHasher);
    /// assert!(map.capacity() >= 100);
    /// ```
    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Self {
        Self {
            table: HashTable::with_capacity(capacity),
            hash_builder,
        }
    }

    /// Creates a new hash map with the given rebuild policy and hasher builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use linear_probe::DefaultHashBuilder;
    /// # use linear_probe::HashMap;
    /// # use linear_probe::RebuildPolicy;
    /// #
    /// let policy = RebuildPolicy::new(4).unwrap();
    /// let map: HashMap<u32, u32> =
    ///     HashMap::with_policy_and_hasher(policy, DefaultHashBuilder::default());
    /// assert_eq!(map.policy().density(), 4);
    /// ```
    pub fn with_policy_and_hasher(policy: RebuildPolicy, hash_builder: S) -> Self {
        Self {
            table: HashTable::with_policy(policy),
            hash_builder,
        }
    }

    /// Creates a new hash map with room for `capacity` insertions under the
    /// given rebuild policy and hasher builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use linear_probe::DefaultHashBuilder;
    /// # use linear_probe::HashMap;
    /// # use linear_probe::RebuildPolicy;
    /// #
    /// let policy = RebuildPolicy::new(3).unwrap();
    /// let map: HashMap<u32, u32> = HashMap::with_capacity_policy_and_hasher(
    ///     10,
    ///     policy,
    ///     DefaultHashBuilder::default(),
    /// );
    /// assert_eq!(map.slot_count(), 90);
    /// assert!(map.capacity() >= 10);
    /// ```
    pub fn with_capacity_policy_and_hasher(
        capacity: usize,
        policy: RebuildPolicy,
        hash_builder: S,
    ) -> Self {
        Self {
            table: HashTable::with_capacity_and_policy(capacity, policy),
            hash_builder,
        }
    }

    /// Inserts a key-value pair if the key is not already present.
    ///
    /// Returns `true` if the pair was inserted. If the key is present, the
    /// existing value is left untouched and the new pair is dropped.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use linear_probe::HashMap;
    /// #
    /// let mut map = HashMap::new();
    /// assert!(map.insert("a", 1));
    /// assert!(!map.insert("a", 99));
    /// assert_eq!(map["a"], 1);
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> bool {
        self.try_insert(key, value).is_ok()
    }

    /// Inserts a key-value pair if the key is not already present, returning a
    /// mutable reference to the new value.
    ///
    /// # Errors
    ///
    /// If the key is already present the map is unchanged and the rejected
    /// pair is handed back.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use linear_probe::HashMap;
    /// #
    /// let mut map = HashMap::new();
    /// *map.try_insert("a", 1).unwrap() += 1;
    /// assert_eq!(map.try_insert("a", 7), Err(("a", 7)));
    /// assert_eq!(map["a"], 2);
    /// ```
    pub fn try_insert(&mut self, key: K, value: V) -> core::result::Result<&mut V, (K, V)> {
        let hash = self.hash_builder.hash_one(&key);
        match self.table.entry(hash, |(k, _)| *k == key) {
            TableEntry::Vacant(entry) => Ok(&mut entry.insert((key, value)).1),
            TableEntry::Occupied(_) => Err((key, value)),
        }
    }

    /// Returns a reference to the value corresponding to the key.
    ///
    /// The key may be any borrowed form of the map's key type.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use linear_probe::HashMap;
    /// #
    /// let mut map = HashMap::new();
    /// map.insert(String::from("key"), 42);
    /// assert_eq!(map.get("key"), Some(&42));
    /// assert_eq!(map.get("missing"), None);
    /// ```
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get_key_value(key).map(|(_, v)| v)
    }

    /// Returns the stored key and its value.
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hash_builder.hash_one(key);
        self.table
            .find(hash, equivalent_key(key))
            .map(|(k, v)| (k, v))
    }

    /// Returns a mutable reference to the value corresponding to the key.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hash_builder.hash_one(key);
        self.table
            .find_mut(hash, equivalent_key(key))
            .map(|(_, v)| v)
    }

    /// Returns the dense position of the key, usable with
    /// [`get_index`](HashMap::get_index).
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use linear_probe::HashMap;
    /// #
    /// let mut map = HashMap::new();
    /// map.insert("a", 1);
    /// map.insert("b", 2);
    ///
    /// let index = map.get_index_of("b").unwrap();
    /// assert_eq!(map.get_index(index), Some((&"b", &2)));
    /// ```
    pub fn get_index_of<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hash_builder.hash_one(key);
        self.table.find_index(hash, equivalent_key(key))
    }

    /// Returns `true` if the map contains the key.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get_index_of(key).is_some()
    }

    /// Returns the value corresponding to the key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyNotFound`] if the key is absent.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use linear_probe::Error;
    /// # use linear_probe::HashMap;
    /// #
    /// let mut map = HashMap::new();
    /// map.insert("a", 1);
    /// assert_eq!(map.at("a"), Ok(&1));
    /// assert_eq!(map.at("b"), Err(Error::KeyNotFound));
    /// ```
    pub fn at<Q>(&self, key: &Q) -> Result<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key).ok_or(Error::KeyNotFound)
    }

    /// Returns a mutable reference to the value for `key`, inserting
    /// `V::default()` first if the key is absent.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use linear_probe::HashMap;
    /// #
    /// let mut counts: HashMap<&str, u32> = HashMap::new();
    /// for word in ["a", "b", "a"] {
    ///     *counts.get_or_default(word) += 1;
    /// }
    /// assert_eq!(counts["a"], 2);
    /// assert_eq!(counts["b"], 1);
    /// ```
    pub fn get_or_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        self.entry(key).or_default()
    }

    /// Removes a key from the map, returning its value if it was present.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use linear_probe::HashMap;
    /// #
    /// let mut map = HashMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.remove(&1), Some("a"));
    /// assert_eq!(map.remove(&1), None);
    /// ```
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.remove_entry(key).map(|(_, v)| v)
    }

    /// Removes a key from the map, returning the stored key and value if the
    /// key was present.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hash_builder.hash_one(key);
        self.table.remove(hash, equivalent_key(key))
    }

    /// Gets the given key's corresponding entry in the map for in-place
    /// manipulation.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use linear_probe::HashMap;
    /// #
    /// let mut map = HashMap::new();
    /// map.entry("poneyland").or_insert(3);
    /// *map.entry("poneyland").or_insert(10) *= 2;
    /// assert_eq!(map["poneyland"], 6);
    /// ```
    pub fn entry(&mut self, key: K) -> Entry<'_, K, V> {
        let hash = self.hash_builder.hash_one(&key);
        match self.table.entry(hash, |(k, _)| *k == key) {
            TableEntry::Vacant(entry) => Entry::Vacant(VacantEntry { entry, key }),
            TableEntry::Occupied(entry) => Entry::Occupied(OccupiedEntry { entry }),
        }
    }
}

#[cfg(any(feature = "foldhash", feature = "std"))]
impl<K, V> HashMap<K, V, DefaultHashBuilder>
where
    K: Hash + Eq,
{
    /// Creates a new hash map using the [`DefaultHashBuilder`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use linear_probe::HashMap;
    /// #
    /// let map: HashMap<i32, String> = HashMap::new();
    /// assert!(map.is_empty());
    /// assert_eq!(map.slot_count(), 1);
    /// ```
    pub fn new() -> Self {
        Self::with_hasher(DefaultHashBuilder::default())
    }

    /// Creates a new hash map with the specified capacity using the
    /// [`DefaultHashBuilder`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use linear_probe::HashMap;
    /// #
    /// let map: HashMap<i32, String> = HashMap::with_capacity(100);
    /// assert!(map.capacity() >= 100);
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, DefaultHashBuilder::default())
    }

    /// Creates a new hash map with the given rebuild policy using the
    /// [`DefaultHashBuilder`].
    pub fn with_policy(policy: RebuildPolicy) -> Self {
        Self::with_policy_and_hasher(policy, DefaultHashBuilder::default())
    }
}

impl<K, V, S> Default for HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K, V, S> PartialEq for HashMap<K, V, S>
where
    K: Hash + Eq,
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(key, value)| other.get(key).is_some_and(|v| *value == *v))
    }
}

impl<K, V, S> Eq for HashMap<K, V, S>
where
    K: Hash + Eq,
    V: Eq,
    S: BuildHasher,
{
}

impl<K, Q, V, S> Index<&Q> for HashMap<K, V, S>
where
    K: Hash + Eq + Borrow<Q>,
    Q: Hash + Eq + ?Sized,
    S: BuildHasher,
{
    type Output = V;

    /// Returns a reference to the value corresponding to the key.
    ///
    /// # Panics
    ///
    /// Panics if the key is not present in the map.
    fn index(&self, key: &Q) -> &V {
        match self.get(key) {
            Some(value) => value,
            None => panic!("key not found in HashMap"),
        }
    }
}

impl<K, V, S> Extend<(K, V)> for HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Inserts every pair from the iterator. Pairs whose key is already
    /// present are dropped.
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.reserve(iter.size_hint().0);
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<'a, K, V, S> Extend<(&'a K, &'a V)> for HashMap<K, V, S>
where
    K: Hash + Eq + Copy,
    V: Copy,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (&'a K, &'a V)>>(&mut self, iter: I) {
        self.extend(iter.into_iter().map(|(&k, &v)| (k, v)));
    }
}

impl<K, V, S> FromIterator<(K, V)> for HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    /// Builds a map from the pairs in the iterator. For duplicate keys the
    /// first pair wins.
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::with_hasher(S::default());
        map.extend(iter);
        map
    }
}

impl<K, V, S, const N: usize> From<[(K, V); N]> for HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    /// # Examples
    ///
    /// ```rust
    /// # use linear_probe::HashMap;
    /// #
    /// let map: HashMap<&str, i32> = HashMap::from([("a", 1), ("b", 2), ("a", 3)]);
    /// assert_eq!(map.len(), 2);
    /// assert_eq!(map["a"], 1);
    /// ```
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl<K, V, S> IntoIterator for HashMap<K, V, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.table.into_iter(),
        }
    }
}

impl<'a, K, V, S> IntoIterator for &'a HashMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, S> IntoIterator for &'a mut HashMap<K, V, S> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

/// A view into a single entry in the map, which may either be vacant or
/// occupied.
///
/// This enum is constructed from the [`entry`] method on [`HashMap`].
///
/// [`entry`]: HashMap::entry
pub enum Entry<'a, K, V> {
    /// A vacant entry.
    Vacant(VacantEntry<'a, K, V>),
    /// An occupied entry.
    Occupied(OccupiedEntry<'a, K, V>),
}

impl<'a, K, V> Entry<'a, K, V> {
    /// Inserts a default value if the entry is vacant and returns a mutable
    /// reference.
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Inserts a value computed from a closure if the entry is vacant and
    /// returns a mutable reference.
    pub fn or_insert_with<F>(self, default: F) -> &'a mut V
    where
        F: FnOnce() -> V,
    {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }

    /// Like [`or_insert_with`](Entry::or_insert_with), but the closure
    /// receives the key.
    pub fn or_insert_with_key<F>(self, default: F) -> &'a mut V
    where
        F: FnOnce(&K) -> V,
    {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let value = default(entry.key());
                entry.insert(value)
            }
        }
    }

    /// Provides in-place mutable access to an occupied entry before any
    /// potential inserts.
    pub fn and_modify<F>(self, f: F) -> Self
    where
        F: FnOnce(&mut V),
    {
        match self {
            Entry::Occupied(mut entry) => {
                f(entry.get_mut());
                Entry::Occupied(entry)
            }
            Entry::Vacant(entry) => Entry::Vacant(entry),
        }
    }

    /// Returns a reference to this entry's key.
    pub fn key(&self) -> &K {
        match self {
            Entry::Occupied(entry) => entry.key(),
            Entry::Vacant(entry) => entry.key(),
        }
    }
}

impl<'a, K, V> Entry<'a, K, V>
where
    V: Default,
{
    /// Inserts the default value if the entry is vacant and returns a mutable
    /// reference.
    pub fn or_default(self) -> &'a mut V {
        self.or_insert_with(Default::default)
    }
}

/// A view into a vacant entry in the map.
pub struct VacantEntry<'a, K, V> {
    entry: crate::hash_table::VacantEntry<'a, (K, V)>,
    key: K,
}

impl<'a, K, V> VacantEntry<'a, K, V> {
    /// Gets a reference to the key that would be used when inserting a value.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Take ownership of the key.
    pub fn into_key(self) -> K {
        self.key
    }

    /// Inserts the value into the map and returns a mutable reference to it.
    ///
    /// The reference stays valid even if the insertion rebuilds the map.
    pub fn insert(self, value: V) -> &'a mut V {
        &mut self.entry.insert((self.key, value)).1
    }
}

/// A view into an occupied entry in the map.
pub struct OccupiedEntry<'a, K, V> {
    entry: crate::hash_table::OccupiedEntry<'a, (K, V)>,
}

impl<'a, K, V> OccupiedEntry<'a, K, V> {
    /// Gets a reference to the key in the entry.
    pub fn key(&self) -> &K {
        &self.entry.get().0
    }

    /// Returns the dense position of the entry.
    pub fn index(&self) -> usize {
        self.entry.index()
    }

    /// Gets a reference to the value in the entry.
    pub fn get(&self) -> &V {
        &self.entry.get().1
    }

    /// Gets a mutable reference to the value in the entry.
    pub fn get_mut(&mut self) -> &mut V {
        &mut self.entry.get_mut().1
    }

    /// Converts the entry into a mutable reference to the value.
    pub fn into_mut(self) -> &'a mut V {
        &mut self.entry.into_mut().1
    }

    /// Replaces the value in the entry and returns the old value.
    pub fn insert(&mut self, value: V) -> V {
        core::mem::replace(&mut self.entry.get_mut().1, value)
    }

    /// Removes the entry from the map and returns the value.
    pub fn remove(self) -> V {
        self.entry.remove().1
    }

    /// Removes the entry from the map and returns the key and value.
    pub fn remove_entry(self) -> (K, V) {
        self.entry.remove()
    }
}

/// An iterator over the key-value pairs of a `HashMap`.
pub struct Iter<'a, K, V> {
    inner: crate::hash_table::Iter<'a, (K, V)>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

/// A mutable iterator over the key-value pairs of a `HashMap`.
pub struct IterMut<'a, K, V> {
    inner: crate::hash_table::IterMut<'a, (K, V)>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (&*k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}

/// An iterator over the keys of a `HashMap`.
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

/// An iterator over the values of a `HashMap`.
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}

/// A mutable iterator over the values of a `HashMap`.
pub struct ValuesMut<'a, K, V> {
    inner: IterMut<'a, K, V>,
}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for ValuesMut<'_, K, V> {}

/// A draining iterator over the key-value pairs of a `HashMap`.
pub struct Drain<'a, K, V> {
    inner: crate::hash_table::Drain<'a, (K, V)>,
}

impl<K, V> Iterator for Drain<'_, K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Drain<'_, K, V> {}

/// An owning iterator over the key-value pairs of a `HashMap`.
pub struct IntoIter<K, V> {
    inner: crate::hash_table::IntoIter<(K, V)>,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}

#[cfg(test)]
mod tests {
    use alloc::format;
    use alloc::string::String;
    use alloc::string::ToString;
    use alloc::vec;
    use alloc::vec::Vec;
    use core::cell::Cell;
    use core::hash::BuildHasher;
    use core::hash::Hasher;

    use rand::TryRngCore;
    use rand::rngs::OsRng;
    use siphasher::sip::SipHasher;
    use test_log::test;

    use super::*;

    #[derive(Clone)]
    struct SipHashBuilder {
        k1: u64,
        k2: u64,
    }

    impl BuildHasher for SipHashBuilder {
        type Hasher = SipHasher;

        fn build_hasher(&self) -> Self::Hasher {
            SipHasher::new_with_keys(self.k1, self.k2)
        }
    }

    impl Default for SipHashBuilder {
        fn default() -> Self {
            let mut rng = OsRng;
            Self {
                k1: rng.try_next_u64().unwrap_or(0),
                k2: rng.try_next_u64().unwrap_or(0),
            }
        }
    }

    /// Sends every key to the same home slot.
    #[derive(Clone, Default)]
    struct ConstantHashBuilder;

    struct ConstantHasher;

    impl Hasher for ConstantHasher {
        fn finish(&self) -> u64 {
            0
        }

        fn write(&mut self, _bytes: &[u8]) {}
    }

    impl BuildHasher for ConstantHashBuilder {
        type Hasher = ConstantHasher;

        fn build_hasher(&self) -> Self::Hasher {
            ConstantHasher
        }
    }

    #[cfg(any(feature = "std", feature = "foldhash"))]
    #[test]
    fn test_new_and_with_hasher() {
        let map: HashMap<i32, String> = HashMap::new();
        assert!(map.is_empty());
        assert_eq!(map.len(), 0);
        assert_eq!(map.slot_count(), 1);

        let map2 = HashMap::<i32, String, _>::with_hasher(SipHashBuilder::default());
        assert!(map2.is_empty());
        assert_eq!(map2.len(), 0);
    }

    #[test]
    fn test_with_capacity_policy_and_hasher() {
        let policy = RebuildPolicy::new(4).unwrap();
        let mut map = HashMap::<u64, u64, _>::with_capacity_policy_and_hasher(
            50,
            policy,
            SipHashBuilder::default(),
        );
        assert_eq!(map.policy(), policy);
        assert_eq!(map.slot_count(), 800);
        assert!(map.capacity() >= 50);

        for i in 0..50 {
            assert!(map.insert(i, i * 2));
        }
        assert_eq!(map.slot_count(), 800);
        assert_eq!(map.get(&49), Some(&98));
    }

    #[cfg(any(feature = "std", feature = "foldhash"))]
    #[test]
    fn test_with_capacity() {
        let map: HashMap<i32, String> = HashMap::with_capacity(100);
        assert!(map.capacity() >= 100);
        assert!(map.is_empty());

        let map2 =
            HashMap::<i32, String, _>::with_capacity_and_hasher(200, SipHashBuilder::default());
        assert!(map2.capacity() >= 200);
        assert!(map2.is_empty());
    }

    #[test]
    fn test_with_policy() {
        let policy = RebuildPolicy::new(3).unwrap();
        let mut map: HashMap<u32, u32, _> =
            HashMap::with_policy_and_hasher(policy, SipHashBuilder::default());
        assert_eq!(map.policy(), policy);

        map.insert(1, 1);
        assert_eq!(map.slot_count(), 9);
    }

    #[test]
    fn test_insert_and_get() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());

        assert!(map.insert(1, "hello".to_string()));
        assert_eq!(map.len(), 1);
        assert!(!map.is_empty());

        assert_eq!(map.get(&1), Some(&"hello".to_string()));
        assert_eq!(map.get(&2), None);

        assert!(!map.insert(1, "world".to_string()));
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&1), Some(&"hello".to_string()));
    }

    #[test]
    fn test_try_insert() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());

        let value = map.try_insert(1, vec![1]).unwrap();
        value.push(2);

        assert_eq!(map.try_insert(1, vec![9]), Err((1, vec![9])));
        assert_eq!(map.get(&1), Some(&vec![1, 2]));
    }

    #[test]
    fn test_get_mut() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        map.insert(1, "hello".to_string());

        if let Some(value) = map.get_mut(&1) {
            value.push_str(" world");
        }

        assert_eq!(map.get(&1), Some(&"hello world".to_string()));
        assert_eq!(map.get_mut(&2), None);
    }

    #[test]
    fn test_get_key_value_and_borrowed_lookup() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        map.insert("alpha".to_string(), 1);

        let (key, value) = map.get_key_value("alpha").unwrap();
        assert_eq!(key, "alpha");
        assert_eq!(*value, 1);

        assert!(map.contains_key("alpha"));
        assert_eq!(map.remove("alpha"), Some(1));
        assert!(!map.contains_key("alpha"));
    }

    #[test]
    fn test_contains_key() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        assert!(!map.contains_key(&1));

        map.insert(1, "value".to_string());
        assert!(map.contains_key(&1));
        assert!(!map.contains_key(&2));
    }

    #[test]
    fn test_at() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        map.insert(1, 10);
        assert_eq!(map.at(&1), Ok(&10));
        assert_eq!(map.at(&2), Err(Error::KeyNotFound));
    }

    #[test]
    fn test_index() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        map.insert("a".to_string(), 1);
        assert_eq!(map["a"], 1);
    }

    #[test]
    #[should_panic(expected = "key not found")]
    fn test_index_missing_key_panics() {
        let map: HashMap<i32, i32, SipHashBuilder> = HashMap::default();
        let _ = map[&1];
    }

    #[test]
    fn test_remove() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        map.insert(1, "hello".to_string());
        map.insert(2, "world".to_string());

        assert_eq!(map.remove(&1), Some("hello".to_string()));
        assert_eq!(map.len(), 1);
        assert!(!map.contains_key(&1));
        assert!(map.contains_key(&2));

        assert_eq!(map.remove(&1), None);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_remove_entry() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        map.insert(1, "hello".to_string());

        assert_eq!(map.remove_entry(&1), Some((1, "hello".to_string())));
        assert!(map.is_empty());
        assert_eq!(map.remove_entry(&1), None);
    }

    #[test]
    fn test_clear() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        for i in 0..100 {
            map.insert(i, i);
        }
        assert!(map.slot_count() > 1);

        map.clear();
        assert!(map.is_empty());
        assert_eq!(map.slot_count(), 1);
        assert_eq!(map.get(&5), None);

        map.insert(5, 5);
        assert_eq!(map.get(&5), Some(&5));
    }

    #[test]
    fn test_reserve() {
        let mut map: HashMap<i32, i32, SipHashBuilder> = HashMap::default();
        map.reserve(100);
        assert!(map.capacity() >= 100);

        let slots = map.slot_count();
        for i in 0..100 {
            map.insert(i, i);
        }
        assert_eq!(map.slot_count(), slots);
    }

    #[test]
    fn test_shrink_to_fit() {
        let mut map: HashMap<i32, i32, _> = HashMap::with_policy_and_hasher(
            RebuildPolicy::new(2).unwrap(),
            SipHashBuilder::default(),
        );
        for i in 0..64 {
            map.insert(i, i);
        }
        for i in 0..40 {
            map.remove(&i);
        }

        map.shrink_to_fit();
        assert_eq!(map.slot_count(), 24 * 4);
        for i in 40..64 {
            assert_eq!(map[&i], i);
        }
    }

    #[test]
    fn test_entry_api() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());

        let value = map.entry(1).or_insert("default".to_string());
        assert_eq!(value, &"default".to_string());

        let value = map.entry(1).or_insert("other".to_string());
        assert_eq!(value, &"default".to_string());

        let value = map.entry(2).or_insert_with(|| "computed".to_string());
        assert_eq!(value, &"computed".to_string());

        let value = map.entry(3).or_insert_with_key(|k| format!("key {k}"));
        assert_eq!(value, &"key 3".to_string());

        map.entry(1).and_modify(|v| v.push_str("_modified"));
        assert_eq!(map.get(&1), Some(&"default_modified".to_string()));

        map.entry(4)
            .and_modify(|v| v.push_str("never"))
            .or_insert("inserted".to_string());
        assert_eq!(map.get(&4), Some(&"inserted".to_string()));
        assert_eq!(map.len(), 4);
    }

    #[test]
    fn test_entry_or_default() {
        let mut map: HashMap<i32, Vec<i32>, _> = HashMap::with_hasher(SipHashBuilder::default());

        map.entry(1).or_default().push(42);
        assert_eq!(map.get(&1), Some(&vec![42]));

        map.entry(1).or_default().push(43);
        assert_eq!(map.get(&1), Some(&vec![42, 43]));
    }

    #[test]
    fn test_get_or_default_across_rebuilds() {
        let mut map: HashMap<u64, u64, _> = HashMap::with_policy_and_hasher(
            RebuildPolicy::new(2).unwrap(),
            SipHashBuilder::default(),
        );

        // Every insertion that crosses the growth trigger rebuilds the index;
        // the returned reference must still point at the new entry.
        for i in 0..1000u64 {
            let slots = map.slot_count();
            *map.get_or_default(i) += i + 1;
            if map.slot_count() != slots {
                assert_eq!(map[&i], i + 1);
            }
        }
        for i in 0..1000u64 {
            assert_eq!(map[&i], i + 1);
        }
    }

    #[test]
    fn test_occupied_entry() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        map.insert(1, "hello".to_string());

        match map.entry(1) {
            Entry::Occupied(mut entry) => {
                assert_eq!(entry.key(), &1);
                assert_eq!(entry.index(), 0);
                assert_eq!(entry.get(), &"hello".to_string());

                entry.get_mut().push_str(" world");
                assert_eq!(entry.get(), &"hello world".to_string());

                let old_value = entry.insert("new value".to_string());
                assert_eq!(old_value, "hello world".to_string());
                assert_eq!(entry.get(), &"new value".to_string());
            }
            Entry::Vacant(_) => panic!("Expected occupied entry"),
        }

        match map.entry(1) {
            Entry::Occupied(entry) => {
                let (key, value) = entry.remove_entry();
                assert_eq!(key, 1);
                assert_eq!(value, "new value".to_string());
            }
            Entry::Vacant(_) => panic!("Expected occupied entry"),
        }

        assert!(map.is_empty());
    }

    #[test]
    fn test_vacant_entry() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());

        match map.entry(1) {
            Entry::Vacant(entry) => {
                assert_eq!(entry.key(), &1);

                let value = entry.insert("hello".to_string());
                assert_eq!(value, &"hello".to_string());
            }
            Entry::Occupied(_) => panic!("Expected vacant entry"),
        }

        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&1), Some(&"hello".to_string()));

        match map.entry(2) {
            Entry::Vacant(entry) => assert_eq!(entry.into_key(), 2),
            Entry::Occupied(_) => panic!("Expected vacant entry"),
        }
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_iterators() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        map.insert(1, "one".to_string());
        map.insert(2, "two".to_string());
        map.insert(3, "three".to_string());

        let pairs: Vec<(i32, String)> = map.iter().map(|(k, v)| (*k, v.clone())).collect();
        assert_eq!(
            pairs,
            vec![
                (1, "one".to_string()),
                (2, "two".to_string()),
                (3, "three".to_string())
            ]
        );
        assert_eq!(map.iter().len(), 3);

        let keys: Vec<i32> = map.keys().copied().collect();
        assert_eq!(keys, vec![1, 2, 3]);

        let values: Vec<&str> = map.values().map(String::as_str).collect();
        assert_eq!(values, vec!["one", "two", "three"]);

        for (_, value) in map.iter_mut() {
            value.push('!');
        }
        for value in map.values_mut() {
            value.push('?');
        }
        assert_eq!(map[&2], "two!?");

        for (key, value) in &mut map {
            if *key == 3 {
                value.clear();
            }
        }
        assert_eq!(map[&3], "");

        let count = (&map).into_iter().count();
        assert_eq!(count, 3);
    }

    #[test]
    fn test_iteration_follows_swap_remove() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        for i in 0..5 {
            map.insert(i, i * 10);
        }
        map.remove(&1);

        let keys: Vec<i32> = map.keys().copied().collect();
        assert_eq!(keys, vec![0, 4, 2, 3]);
        assert_eq!(map.get_index_of(&4), Some(1));
        assert_eq!(map.get_index(1), Some((&4, &40)));
        assert_eq!(map.get_index(4), None);

        if let Some((_, value)) = map.get_index_mut(0) {
            *value = -1;
        }
        assert_eq!(map[&0], -1);
    }

    #[test]
    fn test_drain() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        map.insert(1, "one".to_string());
        map.insert(2, "two".to_string());
        map.insert(3, "three".to_string());

        let drain = map.drain();
        assert_eq!(drain.len(), 3);
        let drained: Vec<(i32, String)> = drain.collect();
        assert_eq!(drained.len(), 3);
        assert!(map.is_empty());
        assert_eq!(map.slot_count(), 1);

        assert!(drained.contains(&(1, "one".to_string())));
        assert!(drained.contains(&(2, "two".to_string())));
        assert!(drained.contains(&(3, "three".to_string())));
    }

    #[test]
    fn test_into_iter() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        for i in 0..10 {
            map.insert(i, i * i);
        }

        let mut pairs: Vec<(i32, i32)> = map.into_iter().collect();
        pairs.sort();
        assert_eq!(pairs, (0..10).map(|i| (i, i * i)).collect::<Vec<_>>());
    }

    #[test]
    fn test_retain() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        for i in 0..100 {
            map.insert(i, i);
        }

        map.retain(|k, v| {
            *v += 1;
            k % 4 == 0
        });

        assert_eq!(map.len(), 25);
        for i in 0..100 {
            assert_eq!(map.get(&i).copied(), (i % 4 == 0).then_some(i + 1));
        }
    }

    #[test]
    fn test_multiple_insertions() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());

        for i in 0..100 {
            map.insert(i, format!("value_{}", i));
        }

        assert_eq!(map.len(), 100);

        for i in 0..100 {
            assert_eq!(map.get(&i), Some(&format!("value_{}", i)));
        }
    }

    #[test]
    fn test_collision_handling() {
        let mut map = HashMap::with_hasher(ConstantHashBuilder);

        for i in 0..200 {
            map.insert(i, i * 2);
        }

        assert_eq!(map.len(), 200);

        for i in 0..200 {
            assert_eq!(map.get(&i), Some(&(i * 2)));
        }

        for i in (0..200).step_by(2) {
            assert_eq!(map.remove(&i), Some(i * 2));
        }

        assert_eq!(map.len(), 100);

        for i in (1..200).step_by(2) {
            assert_eq!(map.get(&i), Some(&(i * 2)));
        }
        for i in (0..200).step_by(2) {
            assert_eq!(map.get(&i), None);
        }
    }

    #[test]
    fn test_string_keys() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());

        map.insert("hello".to_string(), 1);
        map.insert("world".to_string(), 2);
        map.insert("rust".to_string(), 3);

        assert_eq!(map.get("hello"), Some(&1));
        assert_eq!(map.get(&"world".to_string()), Some(&2));
        assert_eq!(map.get("rust"), Some(&3));
        assert_eq!(map.get("missing"), None);
    }

    #[test]
    fn test_default_trait() {
        let map: HashMap<i32, String, SipHashBuilder> = HashMap::default();
        assert!(map.is_empty());
        assert_eq!(map.len(), 0);
    }

    #[test]
    fn test_from_iter_and_array() {
        let map: HashMap<i32, &str, SipHashBuilder> =
            [(1, "a"), (2, "b"), (1, "c")].into_iter().collect();
        assert_eq!(map.len(), 2);
        assert_eq!(map[&1], "a");

        let from_array: HashMap<i32, &str, SipHashBuilder> = HashMap::from([(2, "b"), (1, "a")]);
        assert_eq!(map, from_array);
    }

    #[test]
    fn test_extend() {
        let mut map: HashMap<i32, i32, SipHashBuilder> = HashMap::default();
        map.extend((0..10).map(|i| (i, i)));
        map.extend([(&3, &30), (&10, &100)]);

        assert_eq!(map.len(), 11);
        assert_eq!(map[&3], 3);
        assert_eq!(map[&10], 100);
    }

    #[test]
    fn test_equality() {
        let hasher = SipHashBuilder::default();
        let mut a = HashMap::with_hasher(hasher.clone());
        let mut b = HashMap::with_hasher(hasher);
        for i in 0..10 {
            a.insert(i, i);
        }
        for i in (0..10).rev() {
            b.insert(i, i);
        }
        assert_eq!(a, b);

        *b.get_mut(&3).unwrap() = 33;
        assert_ne!(a, b);

        b.remove(&3);
        assert_ne!(a, b);
    }

    #[test]
    fn test_clone_is_independent() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        for i in 0..50 {
            map.insert(i, i.to_string());
        }
        for i in 0..20 {
            map.remove(&i);
        }

        let mut cloned = map.clone();
        assert_eq!(cloned, map);
        assert!(map.keys().eq(cloned.keys()));

        cloned.get_mut(&30).unwrap().push('x');
        cloned.insert(100, "new".to_string());
        assert_eq!(map[&30], "30");
        assert!(!map.contains_key(&100));
    }

    #[test]
    fn test_debug_format() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        map.insert(1, "a");
        map.insert(2, "b");
        assert_eq!(format!("{map:?}"), r#"{1: "a", 2: "b"}"#);
    }

    #[test]
    fn test_complex_values() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());

        let vec1 = vec![1, 2, 3];
        let vec2 = vec![4, 5, 6];

        map.insert("first".to_string(), vec1.clone());
        map.insert("second".to_string(), vec2.clone());

        assert_eq!(map.get("first"), Some(&vec1));
        assert_eq!(map.get("second"), Some(&vec2));

        if let Some(v) = map.get_mut("first") {
            v.push(4);
        }

        assert_eq!(map.get("first"), Some(&vec![1, 2, 3, 4]));
    }

    /// Counts calls to `hash`, to check that a duplicate insert hashes once and
    /// allocates nothing.
    #[derive(PartialEq, Eq)]
    struct CountingKey<'a> {
        id: u32,
        hashes: &'a Cell<usize>,
    }

    impl core::hash::Hash for CountingKey<'_> {
        fn hash<H: Hasher>(&self, state: &mut H) {
            self.hashes.set(self.hashes.get() + 1);
            self.id.hash(state);
        }
    }

    #[test]
    fn test_operations_hash_once() {
        let hashes = Cell::new(0);
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        for id in 0..64 {
            map.insert(CountingKey { id, hashes: &hashes }, id);
        }
        // Rebuilds reuse the cached hashes.
        assert_eq!(hashes.get(), 64);

        map.insert(CountingKey { id: 3, hashes: &hashes }, 0);
        assert_eq!(hashes.get(), 65);
        assert_eq!(map.len(), 64);
    }

    #[test]
    fn concrete_scenario() {
        let mut map: HashMap<String, i32, SipHashBuilder> = HashMap::default();

        assert!(map.insert("a".to_string(), 1));
        assert!(map.insert("b".to_string(), 2));
        assert!(!map.insert("a".to_string(), 99));
        assert_eq!(map.len(), 2);
        assert_eq!(map.at("a"), Ok(&1));

        *map.get_or_default("c".to_string()) += 5;
        assert_eq!(map.at("c"), Ok(&5));
        assert_eq!(map.len(), 3);

        assert_eq!(map.remove("a"), Some(1));
        assert_eq!(map.get("a"), None);
        assert_eq!(map.at("a"), Err(Error::KeyNotFound));
        assert_eq!(map.len(), 2);

        map.clear();
        assert_eq!(map.len(), 0);
        assert!(map.is_empty());
        assert_eq!(map.iter().next(), None);
    }
}
