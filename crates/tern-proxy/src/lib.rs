//! Protocol adapter: the model wire contract served by an external agent.
//!
//! The proxy accepts the same JSON envelope the transport client sends
//! and fulfills it by invoking an already-authenticated external CLI
//! agent, reshaping its output into the expected response envelope. The
//! client has no knowledge it is talking to a proxy.
//!
//! Two fidelity levels:
//! - [`Fidelity::Simple`]: only the latest user message is forwarded.
//!   Tool-use semantics are lost; the external agent performs its own
//!   tool calls invisibly and only final text returns.
//! - [`Fidelity::Full`]: the entire conversation is flattened into one
//!   composite prompt; the agent output is parsed as a structured
//!   envelope when possible, with plain-text wrapping as the fallback.
//!   The flattening is lossy by construction; this is a documented
//!   degraded operating mode, not a defect to fix.

pub mod agent;
pub mod error;
pub mod flatten;
pub mod routes;

pub use agent::AgentInvoker;
pub use error::{ProxyError, ProxyResult};
pub use routes::{create_router, Fidelity, ProxyState};
