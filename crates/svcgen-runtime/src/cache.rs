//! Process-wide cache of generated client instances, keyed by pipeline.

use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::Lazy;

use crate::http::HttpPipeline;

/// Identity of a pipeline: the address of the shared allocation.
///
/// Two clones of the same `Arc` share an identity; two separately built
/// pipelines never do while both are alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PipelineId(usize);

impl PipelineId {
    pub fn of(pipeline: &Arc<dyn HttpPipeline>) -> Self {
        Self(Arc::as_ptr(pipeline) as *const () as usize)
    }
}

/// Lazily populated map from pipeline identity to one client instance.
///
/// Meant to be declared as a `static` in generated code. Entries are never
/// evicted; each cached instance holds its pipeline, which keeps the
/// identity from being reused by a later allocation.
pub struct InstanceCache<T> {
    instances: Lazy<DashMap<PipelineId, Arc<T>>>,
}

impl<T> InstanceCache<T> {
    pub const fn new() -> Self {
        Self {
            instances: Lazy::new(DashMap::new),
        }
    }

    /// Return the instance for `pipeline`, creating it with `init` on first use.
    ///
    /// The shard holding the key stays locked while `init` runs, so at most one
    /// instance is ever built per pipeline even under concurrent first calls.
    pub fn get_or_insert_with<F>(&self, pipeline: &Arc<dyn HttpPipeline>, init: F) -> Arc<T>
    where
        F: FnOnce() -> T,
    {
        let id = PipelineId::of(pipeline);
        if let Some(existing) = self.instances.get(&id) {
            return Arc::clone(existing.value());
        }
        let entry = self
            .instances
            .entry(id)
            .or_insert_with(|| {
                tracing::debug!(pipeline = ?id, "creating client instance");
                Arc::new(init())
            });
        Arc::clone(entry.value())
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

impl<T> Default for InstanceCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{HttpRequest, HttpResponse, PipelineError};
    use std::sync::Barrier;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    struct Client {
        pipeline: Arc<dyn HttpPipeline>,
    }

    fn pipeline() -> Arc<dyn HttpPipeline> {
        Arc::new(|_: HttpRequest| -> Result<HttpResponse, PipelineError> {
            Ok(HttpResponse::new(200))
        })
    }

    #[test]
    fn test_same_pipeline_same_instance() {
        let cache = InstanceCache::new();
        let p = pipeline();
        let a = cache.get_or_insert_with(&p, || Client { pipeline: p.clone() });
        let b = cache.get_or_insert_with(&p.clone(), || Client { pipeline: p.clone() });
        assert!(Arc::ptr_eq(&a, &b));
        assert!(Arc::ptr_eq(&a.pipeline, &p));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_distinct_pipelines_distinct_instances() {
        let cache = InstanceCache::new();
        let p1 = pipeline();
        let p2 = pipeline();
        let a = cache.get_or_insert_with(&p1, || Client { pipeline: p1.clone() });
        let b = cache.get_or_insert_with(&p2, || Client { pipeline: p2.clone() });
        assert!(!Arc::ptr_eq(&a, &b));
        assert_ne!(PipelineId::of(&p1), PipelineId::of(&p2));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_concurrent_first_calls_construct_once() {
        static CACHE: InstanceCache<Client> = InstanceCache::new();
        const THREADS: usize = 16;

        let constructed = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(Barrier::new(THREADS));
        let p = pipeline();

        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let constructed = Arc::clone(&constructed);
                let barrier = Arc::clone(&barrier);
                let p = p.clone();
                thread::spawn(move || {
                    barrier.wait();
                    CACHE.get_or_insert_with(&p, || {
                        constructed.fetch_add(1, Ordering::SeqCst);
                        Client { pipeline: p.clone() }
                    })
                })
            })
            .collect();

        let instances: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(constructed.load(Ordering::SeqCst), 1);
        assert!(instances.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }
}
