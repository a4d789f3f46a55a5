use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::types::StyleModule;
use crate::updater::PartHandle;

/// One live, reference-counted DOM incarnation of a style module.
///
/// `refs` counts registrations across sequential update cycles, not distinct
/// callers; `handles` grows monotonically within the entry's lifetime and is
/// only torn down whole when `refs` reaches zero.
pub struct LiveModule {
    pub id: i32,
    pub refs: usize,
    pub handles: Vec<PartHandle>,
}

pub type LiveModuleRef = Rc<RefCell<LiveModule>>;

/// Live modules keyed by id, each id holding an ordered list of
/// (descriptor, entry) pairs.
///
/// The id value alone is not a unique key: distinct entries that happen to
/// share an id must coexist, and removing one of them must not disturb the
/// others. Lookups therefore scan the id's bucket by descriptor pointer
/// identity, with the bucket's first entry serving as the cross-consumer
/// dedup hit for descriptors seen for the first time. Cardinality per bucket
/// is tiny, so the linear scans are fine; collapsing this into a plain
/// id-keyed map would change observable behavior.
#[derive(Default)]
pub struct StyleRegistry {
    buckets: HashMap<i32, Vec<(Rc<StyleModule>, LiveModuleRef)>>,
}

impl StyleRegistry {
    /// Finds the entry for `descriptor`: the pair registered under this exact
    /// descriptor if there is one, otherwise the first entry carrying the
    /// same id (a dedup hit), otherwise nothing.
    pub fn lookup(&self, descriptor: &Rc<StyleModule>) -> Option<LiveModuleRef> {
        let bucket = self.buckets.get(&descriptor.id)?;
        bucket
            .iter()
            .find(|(handle, _)| Rc::ptr_eq(handle, descriptor))
            .or_else(|| bucket.first())
            .map(|(_, entry)| Rc::clone(entry))
    }

    /// Finds the entry registered under exactly `descriptor`, never falling
    /// back to an id match.
    pub fn lookup_exact(&self, descriptor: &Rc<StyleModule>) -> Option<LiveModuleRef> {
        self.buckets
            .get(&descriptor.id)?
            .iter()
            .find(|(handle, _)| Rc::ptr_eq(handle, descriptor))
            .map(|(_, entry)| Rc::clone(entry))
    }

    /// Records that `descriptor` resolves to `entry`. A refreshed entry is
    /// registered again under the refreshing descriptor, so the later staged
    /// decrement for that descriptor finds the same entry.
    pub fn register(&mut self, descriptor: Rc<StyleModule>, entry: LiveModuleRef) {
        self.buckets
            .entry(descriptor.id)
            .or_default()
            .push((descriptor, entry));
    }

    /// Drops the single pair registered under `descriptor`, leaving any other
    /// pairs that resolve to the same entry untouched.
    pub fn remove_pair(&mut self, descriptor: &Rc<StyleModule>) {
        if let Some(bucket) = self.buckets.get_mut(&descriptor.id) {
            bucket.retain(|(handle, _)| !Rc::ptr_eq(handle, descriptor));
            if bucket.is_empty() {
                self.buckets.remove(&descriptor.id);
            }
        }
    }

    /// Drops every pair resolving to `entry`.
    pub fn evict(&mut self, entry: &LiveModuleRef) {
        let id = entry.borrow().id;
        if let Some(bucket) = self.buckets.get_mut(&id) {
            bucket.retain(|(_, tracked)| !Rc::ptr_eq(tracked, entry));
            if bucket.is_empty() {
                self.buckets.remove(&id);
            }
        }
    }

    /// Number of distinct live entries across all ids.
    pub fn live_len(&self) -> usize {
        let mut seen: Vec<*const RefCell<LiveModule>> = Vec::new();
        for bucket in self.buckets.values() {
            for (_, entry) in bucket {
                let ptr = Rc::as_ptr(entry);
                if !seen.contains(&ptr) {
                    seen.push(ptr);
                }
            }
        }
        seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::list_to_modules;

    fn descriptor(id: i32) -> Rc<StyleModule> {
        let modules = list_to_modules(vec![(id, format!("s{}{{}}", id), String::new(), None)]);
        Rc::clone(&modules[0])
    }

    fn entry(id: i32, refs: usize) -> LiveModuleRef {
        Rc::new(RefCell::new(LiveModule {
            id,
            refs,
            handles: Vec::new(),
        }))
    }

    #[test]
    fn test_lookup_misses_on_unknown_id() {
        let registry = StyleRegistry::default();
        assert!(registry.lookup(&descriptor(1)).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_fresh_descriptor_with_matching_id_dedups() {
        let mut registry = StyleRegistry::default();
        let first = descriptor(1);
        let live = entry(1, 1);
        registry.register(Rc::clone(&first), Rc::clone(&live));

        // A different descriptor object carrying the same id hits the same
        // entry, while lookup_exact refuses the fallback.
        let second = descriptor(1);
        let hit = registry.lookup(&second).unwrap();
        assert!(Rc::ptr_eq(&hit, &live));
        assert!(registry.lookup_exact(&second).is_none());
        assert!(registry.lookup_exact(&first).is_some());
    }

    #[test]
    fn test_same_id_entries_do_not_cross_contaminate() {
        let mut registry = StyleRegistry::default();
        let (d1, d2) = (descriptor(1), descriptor(1));
        let (e1, e2) = (entry(1, 1), entry(1, 1));
        registry.register(Rc::clone(&d1), Rc::clone(&e1));
        registry.register(Rc::clone(&d2), Rc::clone(&e2));
        assert_eq!(registry.live_len(), 2);

        // Evicting one id-colliding entry leaves the other reachable.
        registry.evict(&e1);
        assert_eq!(registry.live_len(), 1);
        let survivor = registry.lookup_exact(&d2).unwrap();
        assert!(Rc::ptr_eq(&survivor, &e2));
        assert!(registry.lookup_exact(&d1).is_none());
    }

    #[test]
    fn test_remove_pair_keeps_other_pairs_for_same_entry() {
        let mut registry = StyleRegistry::default();
        let (d1, d2) = (descriptor(1), descriptor(1));
        let live = entry(1, 2);
        registry.register(Rc::clone(&d1), Rc::clone(&live));
        registry.register(Rc::clone(&d2), Rc::clone(&live));

        registry.remove_pair(&d1);
        assert!(registry.lookup_exact(&d1).is_none());
        assert!(registry.lookup_exact(&d2).is_some());
        assert_eq!(registry.live_len(), 1);

        registry.remove_pair(&d2);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_evict_drops_every_pair_for_the_entry() {
        let mut registry = StyleRegistry::default();
        let (d1, d2) = (descriptor(1), descriptor(1));
        let live = entry(1, 2);
        registry.register(d1, Rc::clone(&live));
        registry.register(d2, Rc::clone(&live));

        registry.evict(&live);
        assert!(registry.is_empty());
        assert_eq!(registry.live_len(), 0);
    }
}
