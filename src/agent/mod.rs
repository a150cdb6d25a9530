//! Agent invocation: one turn of text in, the assembled reply text out.

pub mod invoker;

pub use invoker::{AgentInvoker, Completion};
