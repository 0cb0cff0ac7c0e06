#![forbid(unsafe_code)]

//! Core data model for the workflow runner: the message threaded between
//! workflow steps, the workflow itself, diagnostic log entries, and the merge
//! capability used to fold provider responses together.

pub mod error;
pub mod merge;
pub mod parser;
pub mod types;

pub use crate::error::ParseError;
pub use crate::merge::{KnowledgeGraphMerger, Merger};
pub use crate::parser::{drop_nulls, parse_query_str, DocumentFormat, ParsedQuery};
pub use crate::types::{
    Extensions, LogEntry, LogLevel, Message, Operation, OperationId, Query, Response,
    RunnerParameters,
};
