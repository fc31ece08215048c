//! Checkout planning and conflict detection
//!
//! Every conflict is detected before the working tree is touched.

pub mod conflict;
pub mod migration;
