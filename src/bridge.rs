//! The analytics integration point. The third-party tracker is external to
//! this component; all we ever do is tell it whether tracking is granted.

use log::info;

/// The one operation the component consumes from the third-party tracking
/// snippet. Held as an optional capability (`Option<B>`): when the tracker's
/// script never loaded there is no bridge, and consent changes are no-ops.
pub trait AnalyticsBridge {
    /// Grants or denies storage-based analytics tracking.
    fn set_consent(&mut self, granted: bool);
}

/// A bridge that only logs the consent change. Backs `consentctl prompt`,
/// where there is no real tracker to drive.
pub struct LogBridge;

impl AnalyticsBridge for LogBridge {
    fn set_consent(&mut self, granted: bool) {
        info!(
            "analytics consent {}",
            match granted {
                true => "granted",
                false => "denied",
            }
        );
    }
}
