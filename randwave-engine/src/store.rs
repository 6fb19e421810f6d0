//! Owner of the current wavetable.
//!
//! At most one table lives here. `replace` moves the new table in and hands the old
//! one back, so the caller decides which thread pays for the deallocation.

use crate::wavetable::Wavetable;

#[derive(Debug, Default)]
pub struct WavetableStore {
    current: Option<Wavetable>,
}

impl WavetableStore {
    #[inline]
    pub fn new() -> Self {
        Self { current: None }
    }

    /// `None` until the first generate.
    #[inline]
    pub fn current(&self) -> Option<&Wavetable> {
        self.current.as_ref()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.current.is_none()
    }

    /// Swap in `next`; returns the retired table, if any.
    #[inline]
    pub fn replace(&mut self, next: Wavetable) -> Option<Wavetable> {
        self.current.replace(next)
    }

    /// Release the current table.
    #[inline]
    pub fn clear(&mut self) -> Option<Wavetable> {
        self.current.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::GenerateParams;
    use crate::source::RngSource;
    use randwave_core::cardinal::Reconstruction;

    fn table(size: usize, seed: u64) -> Wavetable {
        let mut src = RngSource::seeded(seed);
        let params = GenerateParams::new(size, 2).unwrap();
        Wavetable::generate(params, &mut src, Reconstruction::default()).unwrap()
    }

    #[test]
    fn starts_empty() {
        let store = WavetableStore::new();
        assert!(store.is_empty());
        assert!(store.current().is_none());
    }

    #[test]
    fn replace_hands_back_the_old_table() {
        let mut store = WavetableStore::new();
        assert!(store.replace(table(32, 1)).is_none());

        let old = store.replace(table(64, 2)).unwrap();
        assert_eq!(old.len(), 32);
        assert_eq!(store.current().map(Wavetable::len), Some(64));

        assert_eq!(store.clear().map(|t| t.len()), Some(64));
        assert!(store.is_empty());
    }
}
