//! Feature modules for Zonesnap.
//!
//! - [`zoning`] - Zone detection, window snapping and hover highlight

pub mod zoning;
