mod error;
mod estimator;
mod handler;
mod packet;
mod sync;
mod util;

pub use error::Error;
pub use estimator::SendSideBandwidthEstimator;
pub use handler::{FeedbackHandler, FeedbackReport};
pub use packet::{Ack, Ecn};
pub use sync::BandwidthEstimate;
pub use util::data_rate::DataRate;
pub use util::time::{TimeDelta, Timestamp};
