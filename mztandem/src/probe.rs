use std::iter::FusedIterator;

/// Counts up from 1 and yields `(counter, value)` for as long as the probe finds a value. The
/// first absent counter ends the iteration, counters after a gap are never probed.
pub(crate) struct ProbeUntilAbsent<F> {
    next: usize,
    probe: Option<F>,
}

impl<F> ProbeUntilAbsent<F> {
    pub(crate) const fn new(probe: F) -> Self {
        Self {
            next: 1,
            probe: Some(probe),
        }
    }
}

impl<T, F: FnMut(usize) -> Option<T>> Iterator for ProbeUntilAbsent<F> {
    type Item = (usize, T);

    fn next(&mut self) -> Option<Self::Item> {
        let probe = self.probe.as_mut()?;
        if let Some(value) = probe(self.next) {
            let counter = self.next;
            self.next += 1;
            Some((counter, value))
        } else {
            self.probe = None;
            None
        }
    }
}

impl<T, F: FnMut(usize) -> Option<T>> FusedIterator for ProbeUntilAbsent<F> {}
