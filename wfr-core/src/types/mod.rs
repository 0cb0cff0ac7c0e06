mod common;
mod log;
mod message;
mod query;
mod workflow;

pub use common::{AnyValue, Extensions};
pub use log::{LogEntry, LogLevel};
pub use message::{
    AuxiliaryGraph, Edge, KnowledgeGraph, Message, Node, QueryEdge, QueryGraph, QueryNode,
    QueryResult,
};
pub use query::{Query, Response};
pub use workflow::{Operation, OperationId, RunnerParameters};
