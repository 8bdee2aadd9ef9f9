use earnings_news_core::domain::report::Report;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, PoisonError, RwLock};
use uuid::Uuid;

/// Generated reports kept in memory for the results view and downloads.
///
/// Bounded: once `capacity` reports are held, the oldest is evicted.
#[derive(Debug)]
pub struct ReportStore {
    capacity: usize,
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    order: VecDeque<Uuid>,
    reports: HashMap<Uuid, Arc<Report>>,
}

impl ReportStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: RwLock::default(),
        }
    }

    pub fn insert(&self, report: Report) -> Arc<Report> {
        let report = Arc::new(report);
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);

        if inner.reports.insert(report.id, report.clone()).is_none() {
            inner.order.push_back(report.id);
        }
        while inner.order.len() > self.capacity {
            if let Some(evicted) = inner.order.pop_front() {
                inner.reports.remove(&evicted);
                tracing::debug!(report_id = %evicted, "evicted report from session store");
            }
        }
        report
    }

    pub fn get(&self, id: Uuid) -> Option<Arc<Report>> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .reports
            .get(&id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .reports
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
