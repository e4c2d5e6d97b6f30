/// Router Module Index
///
/// Splits the HTTP surface by who may call it. Access control is applied at the
/// module level (layers and extractors) so no protected endpoint is exposed by
/// accident.

/// Routes open to anonymous visitors.
pub mod public;

/// Routes protected by the `Session` extractor middleware.
pub mod authenticated;

/// Routes restricted to administrators.
pub mod admin;
