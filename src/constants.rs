//! Application Constants
//!
//! Centralized tunables. Values here are deliberate output-compatibility
//! constants; changing the extraction caps or bucket mapping changes the
//! digest contract.

/// Rate limiter defaults
pub mod rate_limit {
    /// Maximum generation calls per trailing window
    pub const DEFAULT_MAX_CALLS: u32 = 10;
    /// Trailing window duration in seconds
    pub const DEFAULT_WINDOW_SECS: u64 = 60;
    /// Safety margin added to the computed wait, in milliseconds
    pub const DEFAULT_SAFETY_MARGIN_MS: u64 = 500;
}

/// Content extraction caps
pub mod extraction {
    /// Maximum achievements returned by the keyword fallback
    pub const MAX_ACHIEVEMENTS: usize = 5;
    /// Maximum insights returned by the keyword fallback
    pub const MAX_INSIGHTS: usize = 3;
    /// Maximum learnings returned by the keyword fallback
    pub const MAX_LEARNINGS: usize = 3;
    /// Minimum length for a deduplicated item to survive ranking
    pub const MIN_ITEM_LEN: usize = 10;
    /// Maximum items kept after dedup and ranking
    pub const MAX_RANKED_ITEMS: usize = 10;
}

/// Highlight extraction
pub mod highlights {
    /// Maximum highlights in the summary
    pub const MAX_HIGHLIGHTS: usize = 3;
}

/// Comprehensive single-call digest prompt
pub mod comprehensive {
    /// Minimum achievements requested from the optimized path
    pub const MIN_ACHIEVEMENTS: usize = 5;
    /// Maximum achievements requested from the optimized path
    pub const MAX_ACHIEVEMENTS: usize = 12;
}

/// Network defaults
pub mod network {
    /// Default provider request timeout in seconds
    pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
    /// Maximum transient-error retries inside a provider
    pub const MAX_PROVIDER_RETRIES: usize = 2;
}
