//! Client for the cluster's administrative HTTP endpoint.
//!
//! Layered bottom-up: the parameter codec and authorization builder are
//! leaves; `Connection` combines them with the transport; the registry keys
//! connections by purpose; `CallQueue` sequences dependent calls.

pub mod auth;
pub mod codec;
pub mod connection;
pub mod queue;
pub mod registry;
pub mod timeout;

pub use codec::{ParamType, ParamValue};
pub use connection::{CallKind, Connection};
pub use queue::{CallDispatcher, CallQueue};
pub use registry::{ConnectionRegistry, ProcedureCommand};
pub use timeout::with_call_timeout;
