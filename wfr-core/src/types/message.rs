use std::collections::BTreeMap;

use crate::types::{AnyValue, Extensions};

/// The aggregate threaded through a workflow: a fixed query graph plus the result body
/// (knowledge graph, results, auxiliary graphs) that providers augment.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Message {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_graph: Option<QueryGraph>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub knowledge_graph: Option<KnowledgeGraph>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<QueryResult>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auxiliary_graphs: Option<BTreeMap<String, AuxiliaryGraph>>,

    #[serde(flatten, default)]
    pub extensions: Extensions,
}

impl Message {
    /// A message carrying only the given query graph and an empty result body.
    pub fn scoped_to(query_graph: Option<QueryGraph>) -> Self {
        Self {
            query_graph,
            ..Self::default()
        }
    }

    pub fn node_count(&self) -> usize {
        self.knowledge_graph.as_ref().map_or(0, |kg| kg.nodes.len())
    }

    pub fn edge_count(&self) -> usize {
        self.knowledge_graph.as_ref().map_or(0, |kg| kg.edges.len())
    }

    pub fn result_count(&self) -> usize {
        self.results.as_ref().map_or(0, Vec::len)
    }
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct QueryGraph {
    #[serde(default)]
    pub nodes: BTreeMap<String, QueryNode>,

    #[serde(default)]
    pub edges: BTreeMap<String, QueryEdge>,

    #[serde(flatten, default)]
    pub extensions: Extensions,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct QueryNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ids: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,

    #[serde(flatten, default)]
    pub extensions: Extensions,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct QueryEdge {
    pub subject: String,

    pub object: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicates: Option<Vec<String>>,

    #[serde(flatten, default)]
    pub extensions: Extensions,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct KnowledgeGraph {
    #[serde(default)]
    pub nodes: BTreeMap<String, Node>,

    #[serde(default)]
    pub edges: BTreeMap<String, Edge>,

    #[serde(flatten, default)]
    pub extensions: Extensions,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Node {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<AnyValue>,

    #[serde(flatten, default)]
    pub extensions: Extensions,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Edge {
    pub subject: String,

    pub predicate: String,

    pub object: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub qualifiers: Vec<AnyValue>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<AnyValue>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<AnyValue>,

    #[serde(flatten, default)]
    pub extensions: Extensions,
}

impl Edge {
    /// Two edges with the same key state the same fact and are semantic duplicates.
    pub fn semantic_key(&self) -> (String, String, String, String, String) {
        (
            self.subject.clone(),
            self.predicate.clone(),
            self.object.clone(),
            serde_json::to_string(&self.qualifiers).unwrap_or_default(),
            serde_json::to_string(&self.sources).unwrap_or_default(),
        )
    }
}

/// One answer to the query graph. Edge bindings live inside `analyses`.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct QueryResult {
    pub node_bindings: BTreeMap<String, Vec<AnyValue>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub analyses: Vec<AnyValue>,

    #[serde(flatten, default)]
    pub extensions: Extensions,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AuxiliaryGraph {
    #[serde(default)]
    pub edges: Vec<String>,

    #[serde(flatten, default)]
    pub extensions: Extensions,
}
