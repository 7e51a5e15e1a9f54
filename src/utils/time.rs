use std::time::Duration;

/// Frame timer stepped by the host with [`advance`](Self::advance).
#[derive(Debug, Clone)]
pub struct Timer {
    /// Length of the last frame
    pub delta: Duration,
    /// Total elapsed time since creation
    pub elapsed: Duration,
    /// Frames advanced so far
    pub frame_count: u64,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            delta: Duration::ZERO,
            elapsed: Duration::ZERO,
            frame_count: 0,
        }
    }

    /// Advances by one frame of length `delta`.
    pub fn advance(&mut self, delta: Duration) {
        self.delta = delta;
        self.elapsed += delta;
        self.frame_count += 1;
    }

    /// Elapsed seconds, as passed to `SkinnedMesh::animate`.
    #[must_use]
    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }
}
