use crate::util::data_rate::DataRate;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

/// Shared handle to the latest published bandwidth estimate.
///
/// Written by the feedback handler, readable from any task (e.g. the pacer
/// or the encoder's rate-control loop).
#[derive(Clone)]
#[repr(transparent)]
pub struct BandwidthEstimate(Arc<AtomicU64>);

impl BandwidthEstimate {
    pub(crate) fn new(initial: DataRate) -> BandwidthEstimate {
        BandwidthEstimate(Arc::new(AtomicU64::new(initial.as_blob())))
    }

    pub(crate) fn set_estimate(&self, rate: DataRate) {
        self.0.store(rate.as_blob(), Ordering::Release);
    }

    pub fn get_estimate(&self) -> DataRate {
        DataRate::from_blob(self.0.load(Ordering::Acquire))
    }
}
