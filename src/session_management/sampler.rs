//! Per-session sampling gate.

pub struct SessionSampler;

impl SessionSampler {
    /// Decides whether events for a freshly generated session should be
    /// dispatched, given a sampling rate in [0, 1].
    ///
    /// Randomization law: a uniform draw in [0, 1) compared strictly below
    /// the rate. The boundaries are handled explicitly so that a rate of
    /// 1.0 always allows and 0.0 always denies regardless of the RNG.
    pub fn should_send_event_for_session(sampling_rate: f64) -> bool {
        if sampling_rate >= 1.0 {
            return true;
        }
        if sampling_rate <= 0.0 {
            return false;
        }
        rand::random::<f64>() < sampling_rate
    }
}
