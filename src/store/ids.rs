use std::sync::atomic::{AtomicU64, Ordering};

use super::clock::Clock;
use super::options::IdStrategy;

/// Generates record ids for one store.
pub(crate) struct IdGenerator {
    strategy: IdStrategy,
    counter: AtomicU64,
}

impl IdGenerator {
    pub(crate) fn new(strategy: IdStrategy) -> Self {
        Self {
            strategy,
            counter: AtomicU64::new(0),
        }
    }

    pub(crate) fn set_strategy(&mut self, strategy: IdStrategy) {
        self.strategy = strategy;
    }

    pub(crate) fn next(&self, clock: &dyn Clock) -> String {
        match self.strategy {
            IdStrategy::Uuid => uuid::Uuid::new_v4().to_string(),
            IdStrategy::Sequential => {
                // The counter keeps same-millisecond ids apart
                let seq = self.counter.fetch_add(1, Ordering::Relaxed);
                format!("{}-{}", clock.now().timestamp_millis(), seq)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::clock::ManualClock;
    use std::collections::HashSet;

    #[test]
    fn sequential_ids_unique_within_same_tick() {
        let clock = ManualClock::default();
        let ids = IdGenerator::new(IdStrategy::Sequential);

        let generated: HashSet<String> = (0..100).map(|_| ids.next(&clock)).collect();
        assert_eq!(generated.len(), 100);
    }

    #[test]
    fn uuid_ids_are_unique() {
        let clock = ManualClock::default();
        let ids = IdGenerator::new(IdStrategy::Uuid);

        let generated: HashSet<String> = (0..100).map(|_| ids.next(&clock)).collect();
        assert_eq!(generated.len(), 100);
    }
}
