//! Error types for the ccew-grid crate.

/// Error type for all fallible operations in the ccew-grid crate.
///
/// Covers shape disagreements between arrays and axes, axis validation
/// failures, and selection requests (levels, latitude bands, date ranges)
/// that the field cannot satisfy.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GridError {
    /// Returned when an array dimension disagrees with its coordinate axis.
    #[error("dimension '{name}' mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Name of the dimension.
        name: String,
        /// Expected size.
        expected: usize,
        /// Actual size.
        got: usize,
    },

    /// Returned when one or more validation checks fail.
    #[error("{count} validation error(s): {details}")]
    Validation {
        /// Number of accumulated validation failures.
        count: usize,
        /// Human-readable summary of the failures.
        details: String,
    },

    /// Returned when an exact pressure level is not present on the level axis.
    #[error("level {level} not found on the vertical axis")]
    LevelNotFound {
        /// Requested level value.
        level: f64,
    },

    /// Returned when a level index exceeds the number of levels.
    #[error("level index {index} out of range for {n_levels} level(s)")]
    LevelIndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of levels on the field.
        n_levels: usize,
    },

    /// Returned when a level is requested from a field without a vertical axis.
    #[error("field '{name}' has no vertical axis")]
    NoLevelAxis {
        /// Field name.
        name: String,
    },

    /// Returned when the data does not cover a requested date range.
    #[error("time range outside data: {reason}")]
    TimeRangeOutside {
        /// Description of the coverage problem.
        reason: String,
    },

    /// Returned when a latitude band has south > north or non-finite edges.
    #[error("invalid latitude band: south {south}, north {north}")]
    InvalidBand {
        /// Southern edge in degrees.
        south: f64,
        /// Northern edge in degrees.
        north: f64,
    },

    /// Returned when no latitude of the grid falls inside a band.
    #[error("no latitudes inside band {south}..{north}")]
    EmptyBand {
        /// Southern edge in degrees.
        south: f64,
        /// Northern edge in degrees.
        north: f64,
    },

    /// Returned when a latitude inside a band has no mirror across the equator.
    #[error("latitude {lat} has no mirror latitude {mirror} in the band")]
    AsymmetricLatitudes {
        /// Latitude without a mirror.
        lat: f64,
        /// The missing mirror latitude.
        mirror: f64,
    },

    /// Returned when a variable-name convention is not registered.
    #[error("unknown naming convention '{0}'")]
    UnknownConvention(String),

    /// Returned when two entries claim the same native name in one convention.
    #[error("native name '{native}' is mapped twice in convention '{convention}'")]
    DuplicateAlias {
        /// Convention name.
        convention: String,
        /// Native variable name.
        native: String,
    },
}
