use crate::error::Error;
use crate::error::Result;

cfg_if::cfg_if! {
    if #[cfg(feature = "density-four")] {
        const DEFAULT_DENSITY: usize = 4;
    } else if #[cfg(feature = "density-three")] {
        const DEFAULT_DENSITY: usize = 3;
    } else {
        const DEFAULT_DENSITY: usize = 2;
    }
}

/// Sizing policy for the slot index of a [`HashTable`].
///
/// All three thresholds derive from a single `density` value `d`:
///
/// - **grow**: after an insertion, rebuild once `inserted_since_rebuild * d >=
///   slots`. Tombstones count against this budget because every tombstone was
///   once an insertion.
/// - **shrink**: after a removal, rebuild once `slots > len * d³`.
/// - **rebuild size**: a rebuild allocates `max(1, len * d²)` slots, halfway
///   (geometrically) between the two triggers so neither fires again
///   immediately.
///
/// The compile-time default is 2, or 3/4 with the `density-three` /
/// `density-four` features.
///
/// [`HashTable`]: crate::HashTable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RebuildPolicy {
    density: usize,
}

impl RebuildPolicy {
    /// Smallest accepted density.
    ///
    /// With a density of 1 a rebuild would produce exactly `len` slots and
    /// leave no empty slot to terminate a probe.
    pub const MIN_DENSITY: usize = 2;

    /// Largest accepted density.
    ///
    /// A rebuild allocates `len * d²` slots, so larger densities spend memory
    /// on mostly empty indexes and overflow `usize` for moderate `len`.
    pub const MAX_DENSITY: usize = 16;

    /// Creates a policy with the given density.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDensity`] if `density` is outside
    /// [`MIN_DENSITY`](Self::MIN_DENSITY)`..=`[`MAX_DENSITY`](Self::MAX_DENSITY).
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use linear_probe::RebuildPolicy;
    /// #
    /// let policy = RebuildPolicy::new(3).unwrap();
    /// assert_eq!(policy.density(), 3);
    /// assert!(RebuildPolicy::new(1).is_err());
    /// assert!(RebuildPolicy::new(1 << 32).is_err());
    /// ```
    pub const fn new(density: usize) -> Result<Self> {
        if density < Self::MIN_DENSITY || density > Self::MAX_DENSITY {
            return Err(Error::InvalidDensity(density));
        }
        Ok(Self { density })
    }

    /// Returns the configured density.
    pub const fn density(&self) -> usize {
        self.density
    }

    #[inline]
    pub(crate) fn should_grow(&self, inserted_since_rebuild: usize, slots: usize) -> bool {
        inserted_since_rebuild.saturating_mul(self.density) >= slots
    }

    #[inline]
    pub(crate) fn should_shrink(&self, len: usize, slots: usize) -> bool {
        slots > len.saturating_mul(self.density_cubed())
    }

    #[inline]
    pub(crate) fn rebuilt_slots(&self, len: usize) -> usize {
        len.saturating_mul(self.density_squared()).max(1)
    }

    /// Number of insertions a freshly rebuilt index of `slots` slots accepts
    /// before the growth trigger fires.
    #[inline]
    pub(crate) fn insertions_before_grow(&self, slots: usize) -> usize {
        slots.div_ceil(self.density)
    }

    fn density_squared(&self) -> usize {
        self.density.saturating_mul(self.density)
    }

    fn density_cubed(&self) -> usize {
        self.density_squared().saturating_mul(self.density)
    }
}

impl Default for RebuildPolicy {
    fn default() -> Self {
        Self {
            density: DEFAULT_DENSITY,
        }
    }
}
