//! Unified API Implementation Layer
//!
//! Front ends call these implementations and only translate arguments and
//! results.

pub mod connect;

pub use connect::ConnectApiImpl;
