//! Edit session tests
//!
//! The session controller driven the way a host drives it: user edits on a
//! clock, signals as JSON, and image uploads finishing out of order.

mod session;
mod uploads;
