//! last_good.rs: the only state kept across refreshes. Written after a
//! successful refresh, read only when a refresh fails.

use std::sync::RwLock;

use crate::headline::Headline;

#[derive(Debug, Default)]
pub struct LastGoodQueue {
    inner: RwLock<Option<Vec<Headline>>>,
}

impl LastGoodQueue {
    /// Starts empty.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self, queue: &[Headline]) {
        match self.inner.write() {
            Ok(mut g) => *g = Some(queue.to_vec()),
            Err(poison) => *poison.into_inner() = Some(queue.to_vec()),
        }
    }

    pub fn snapshot(&self) -> Option<Vec<Headline>> {
        match self.inner.read() {
            Ok(g) => g.clone(),
            Err(poison) => poison.into_inner().clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_none()
    }
}
