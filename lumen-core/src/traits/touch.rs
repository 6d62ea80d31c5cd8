//! Touch input trait

/// One touch sample in panel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TouchPoint {
    pub x: u16,
    pub y: u16,
}

/// Touch digitizer
pub trait TouchInput {
    /// Current touch, or `None` when nothing touches the panel
    fn poll(&mut self) -> Option<TouchPoint>;
}
