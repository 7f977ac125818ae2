//! # Validation Error Hierarchy
//!
//! Structured validation errors for the business rules enforced at package
//! and account creation/update time, built with `thiserror`. Each variant
//! carries the offending value and the expected constraint so that callers
//! can produce actionable error responses without guesswork.

use thiserror::Error;

/// Weight ceiling for a single package, in kilograms.
pub const MAX_PACKAGE_WEIGHT: f64 = 1000.0;

/// Minimum length of a destination address.
pub const MIN_ADDRESS_LEN: usize = 10;

/// Maximum length of a destination address.
pub const MAX_ADDRESS_LEN: usize = 500;

/// Maximum length of handling instructions.
pub const MAX_INSTRUCTIONS_LEN: usize = 1000;

/// Inclusive temperature bound, in degrees Celsius, for refrigerated
/// packages. The valid range is `[-TEMPERATURE_BOUND, TEMPERATURE_BOUND]`.
pub const TEMPERATURE_BOUND: f64 = 30.0;

/// Business-rule validation failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Package weight must be positive and at most [`MAX_PACKAGE_WEIGHT`].
    #[error("invalid weight: {0} (must be positive and at most {MAX_PACKAGE_WEIGHT} kg)")]
    InvalidWeight(f64),

    /// Destination address length is outside the permitted range.
    #[error(
        "invalid destination address length: {0} \
         (must be between {MIN_ADDRESS_LEN} and {MAX_ADDRESS_LEN} characters)"
    )]
    InvalidAddressLength(usize),

    /// Fragile packages require non-blank handling instructions.
    #[error("fragile packages require handling instructions")]
    MissingHandlingInstructions,

    /// Handling instructions exceed [`MAX_INSTRUCTIONS_LEN`] characters.
    #[error("handling instructions too long: {0} characters (max {MAX_INSTRUCTIONS_LEN})")]
    InstructionsTooLong(usize),

    /// Refrigerated packages require both temperature bounds.
    #[error("refrigerated packages require both minimum and maximum temperature")]
    MissingTemperatureRange,

    /// A temperature bound falls outside `[-30, 30]` °C.
    #[error("temperature {0}°C out of range (must be within ±{TEMPERATURE_BOUND}°C)")]
    TemperatureOutOfBounds(f64),

    /// The minimum temperature must be strictly below the maximum.
    #[error("invalid temperature range: min {min}°C must be below max {max}°C")]
    InvalidTemperatureRange {
        /// The rejected minimum bound.
        min: f64,
        /// The rejected maximum bound.
        max: f64,
    },

    /// The package type cannot change once the package exists.
    #[error("package type cannot be changed after creation")]
    ImmutableType,

    /// Login does not meet length or character-set constraints.
    #[error(
        "invalid login: \"{0}\" \
         (expected 3-50 characters of letters, digits, and underscores)"
    )]
    InvalidLogin(String),

    /// Password length is outside the permitted range.
    #[error("invalid password length: {0} (must be between 5 and 100 characters)")]
    InvalidPasswordLength(usize),
}
