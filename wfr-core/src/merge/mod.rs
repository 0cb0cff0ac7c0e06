//! Folding partial results into a running aggregate.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap};

use crate::types::{AnyValue, Extensions, KnowledgeGraph, Message, Node};

/// Combines two messages that answer the same query graph.
///
/// Implementations must keep every node, edge, result, and auxiliary graph present in
/// either input, must not introduce semantic duplicates, and must leave the aggregate's
/// query graph untouched. Merging a message with itself must not grow it.
pub trait Merger: Send + Sync {
    fn merge(&self, aggregate: Message, partial: Message) -> Message;
}

/// Union merge keyed by node id, edge fact, and result node bindings.
#[derive(Debug, Clone, Copy, Default)]
pub struct KnowledgeGraphMerger;

impl Merger for KnowledgeGraphMerger {
    fn merge(&self, mut aggregate: Message, partial: Message) -> Message {
        let Message {
            query_graph: _,
            knowledge_graph,
            results,
            auxiliary_graphs,
            extensions,
        } = partial;

        // Incoming edge ids that now live under a different id in the aggregate.
        let mut renamed = BTreeMap::new();
        if let Some(kg) = knowledge_graph {
            let target = aggregate.knowledge_graph.get_or_insert_with(Default::default);
            renamed = merge_knowledge_graph(target, kg);
        }

        if let Some(graphs) = auxiliary_graphs {
            let target = aggregate.auxiliary_graphs.get_or_insert_with(Default::default);
            for (id, mut graph) in graphs {
                for edge in &mut graph.edges {
                    if let Some(new_id) = renamed.get(edge.as_str()) {
                        edge.clone_from(new_id);
                    }
                }
                match target.entry(id) {
                    Entry::Vacant(slot) => {
                        dedup_in_place(&mut graph.edges);
                        slot.insert(graph);
                    }
                    Entry::Occupied(mut slot) => {
                        let existing = slot.get_mut();
                        union_values(&mut existing.edges, graph.edges);
                        merge_extensions(&mut existing.extensions, graph.extensions);
                    }
                }
            }
        }

        if let Some(results) = results {
            let target = aggregate.results.get_or_insert_with(Vec::new);
            for mut result in results {
                if !renamed.is_empty() {
                    for analysis in &mut result.analyses {
                        rename_edge_bindings(analysis, &renamed);
                    }
                }
                match target
                    .iter_mut()
                    .find(|r| r.node_bindings == result.node_bindings)
                {
                    Some(existing) => {
                        union_values(&mut existing.analyses, result.analyses);
                        merge_extensions(&mut existing.extensions, result.extensions);
                    }
                    None => target.push(result),
                }
            }
        }

        merge_extensions(&mut aggregate.extensions, extensions);
        aggregate
    }
}

fn merge_knowledge_graph(
    target: &mut KnowledgeGraph,
    incoming: KnowledgeGraph,
) -> BTreeMap<String, String> {
    for (id, node) in incoming.nodes {
        match target.nodes.entry(id) {
            Entry::Vacant(slot) => {
                slot.insert(node);
            }
            Entry::Occupied(mut slot) => merge_node(slot.get_mut(), node),
        }
    }

    let mut by_fact: HashMap<_, String> = target
        .edges
        .iter()
        .map(|(id, edge)| (edge.semantic_key(), id.clone()))
        .collect();
    let mut renamed = BTreeMap::new();

    for (id, edge) in incoming.edges {
        let fact = edge.semantic_key();
        if let Some(existing_id) = by_fact.get(&fact).cloned() {
            if let Some(existing) = target.edges.get_mut(&existing_id) {
                union_values(&mut existing.attributes, edge.attributes);
                merge_extensions(&mut existing.extensions, edge.extensions);
            }
            if existing_id != id {
                renamed.insert(id, existing_id);
            }
            continue;
        }

        let final_id = if target.edges.contains_key(&id) {
            // Same id, different fact: keep both under distinct ids.
            let fresh = fresh_edge_id(target, &id);
            renamed.insert(id, fresh.clone());
            fresh
        } else {
            id
        };
        by_fact.insert(fact, final_id.clone());
        target.edges.insert(final_id, edge);
    }

    merge_extensions(&mut target.extensions, incoming.extensions);
    renamed
}

fn merge_node(existing: &mut Node, incoming: Node) {
    if existing.name.is_none() {
        existing.name = incoming.name;
    }
    union_values(&mut existing.categories, incoming.categories);
    union_values(&mut existing.attributes, incoming.attributes);
    merge_extensions(&mut existing.extensions, incoming.extensions);
}

fn fresh_edge_id(kg: &KnowledgeGraph, base: &str) -> String {
    let mut n = 1usize;
    loop {
        let candidate = format!("{base}_{n}");
        if !kg.edges.contains_key(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

fn rename_edge_bindings(analysis: &mut AnyValue, renamed: &BTreeMap<String, String>) {
    let Some(bindings) = analysis
        .get_mut("edge_bindings")
        .and_then(AnyValue::as_object_mut)
    else {
        return;
    };
    for binding_list in bindings.values_mut() {
        let Some(items) = binding_list.as_array_mut() else {
            continue;
        };
        for item in items {
            if let Some(id) = item.get_mut("id") {
                let replacement = id.as_str().and_then(|s| renamed.get(s)).cloned();
                if let Some(new_id) = replacement {
                    *id = AnyValue::String(new_id);
                }
            }
        }
    }
}

fn union_values<T: PartialEq>(target: &mut Vec<T>, incoming: Vec<T>) {
    for value in incoming {
        if !target.contains(&value) {
            target.push(value);
        }
    }
}

fn dedup_in_place<T: PartialEq>(values: &mut Vec<T>) {
    let mut seen: Vec<T> = Vec::with_capacity(values.len());
    for value in values.drain(..) {
        if !seen.contains(&value) {
            seen.push(value);
        }
    }
    *values = seen;
}

fn merge_extensions(target: &mut Extensions, incoming: Extensions) {
    for (key, value) in incoming {
        target.entry(key).or_insert(value);
    }
}
