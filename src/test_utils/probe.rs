use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::comm::Query;
use crate::comm::Update;
use crate::Discoverer;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeEvent {
    Start(String),
    End(String),
}

/// Discoverer that holds every call for `latency` and records when each
/// call starts and ends, plus the peak number of calls in flight.
#[derive(Debug, Default)]
pub struct ProbeDiscoverer {
    latency: Duration,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    timeline: Mutex<Vec<ProbeEvent>>,
}

impl ProbeDiscoverer {
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            ..Default::default()
        }
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn timeline(&self) -> Vec<ProbeEvent> {
        self.timeline.lock().clone()
    }

    pub fn completed(&self) -> usize {
        self.timeline
            .lock()
            .iter()
            .filter(|e| matches!(e, ProbeEvent::End(_)))
            .count()
    }

    pub fn started(&self) -> usize {
        self.timeline
            .lock()
            .iter()
            .filter(|e| matches!(e, ProbeEvent::Start(_)))
            .count()
    }

    /// Position of `event` in the timeline
    pub fn position(
        &self,
        event: &ProbeEvent,
    ) -> Option<usize> {
        self.timeline.lock().iter().position(|e| e == event)
    }

    async fn hold(
        &self,
        label: String,
    ) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        self.timeline.lock().push(ProbeEvent::Start(label.clone()));

        tokio::time::sleep(self.latency).await;

        self.timeline.lock().push(ProbeEvent::End(label));
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Discoverer for ProbeDiscoverer {
    async fn query(
        &self,
        query: &Query,
    ) -> Result<()> {
        self.hold(format!("{} {}", query.event(), query.entity_id())).await;
        Ok(())
    }

    async fn update(
        &self,
        update: &Update,
    ) -> Result<()> {
        self.hold(format!("update {}", update.service())).await;
        Ok(())
    }
}
