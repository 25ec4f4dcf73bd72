//! Expose dashing's internal API for use in integration testing. It is not a
//! stable interface.
pub mod cli;
pub mod docset;
