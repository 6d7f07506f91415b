//! Process-step hierarchy helpers.
//!
//! Steps are stored flat with an optional `parent_id`; these functions
//! recover the tree when it matters (cascading deletes, display order).

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::model::ProcessStep;

/// A step with its nested children, ordered by `order_index`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessNode {
    #[serde(flatten)]
    pub step: ProcessStep,
    pub children: Vec<ProcessNode>,
}

/// Returns the ids of `root_id` and all of its descendants, depth first.
///
/// Empty when `root_id` is not among `steps`. A malformed `parent_id` cycle
/// is visited once.
pub fn collect_subtree(steps: &[ProcessStep], root_id: &str) -> Vec<String> {
    if !steps.iter().any(|step| step.id == root_id) {
        return Vec::new();
    }

    let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
    for step in steps {
        if let Some(parent) = step.parent_id.as_deref() {
            children.entry(parent).or_default().push(step.id.as_str());
        }
    }

    let mut visited: HashSet<&str> = HashSet::new();
    let mut ordered = Vec::new();
    let mut stack = vec![root_id];
    while let Some(id) = stack.pop() {
        if !visited.insert(id) {
            continue;
        }
        ordered.push(id.to_string());
        if let Some(kids) = children.get(id) {
            // Reverse so the first child is visited first.
            stack.extend(kids.iter().rev());
        }
    }
    ordered
}

/// Builds the step forest. Steps whose parent is missing are left out.
pub fn build_process_tree(steps: &[ProcessStep]) -> Vec<ProcessNode> {
    let known: HashSet<&str> = steps.iter().map(|step| step.id.as_str()).collect();
    let mut by_parent: HashMap<Option<&str>, Vec<&ProcessStep>> = HashMap::new();
    for step in steps {
        let parent = step.parent_id.as_deref();
        if parent.is_some_and(|p| !known.contains(p)) {
            log::debug!("Dropping orphaned step {} from process tree", step.id);
            continue;
        }
        by_parent.entry(parent).or_default().push(step);
    }

    let mut visited = HashSet::new();
    build_level(None, &by_parent, &mut visited)
}

fn build_level<'a>(
    parent: Option<&'a str>,
    by_parent: &HashMap<Option<&'a str>, Vec<&'a ProcessStep>>,
    visited: &mut HashSet<&'a str>,
) -> Vec<ProcessNode> {
    let Some(siblings) = by_parent.get(&parent) else {
        return Vec::new();
    };

    let mut ordered: Vec<&ProcessStep> = siblings.clone();
    ordered.sort_by_key(|step| step.order_index);

    let mut nodes = Vec::with_capacity(ordered.len());
    for step in ordered {
        if !visited.insert(step.id.as_str()) {
            continue;
        }
        nodes.push(ProcessNode {
            step: step.clone(),
            children: build_level(Some(step.id.as_str()), by_parent, visited),
        });
    }
    nodes
}

/// Sets each step's `level` to its depth below a root. A step whose parent
/// is missing counts as a root.
pub fn assign_levels(steps: &mut [ProcessStep]) {
    let parents: HashMap<String, Option<String>> = steps
        .iter()
        .map(|step| (step.id.clone(), step.parent_id.clone()))
        .collect();

    for step in steps.iter_mut() {
        let start = step.parent_id.clone();
        let mut cursor = start.as_deref();
        let mut seen: HashSet<&str> = HashSet::new();
        let mut level = 0;
        while let Some(parent) = cursor {
            let Some(grandparent) = parents.get(parent) else {
                break;
            };
            if !seen.insert(parent) {
                break;
            }
            level += 1;
            cursor = grandparent.as_deref();
        }
        step.level = level;
    }
}

/// Sum of `avg_time_minutes` over all steps; steps without a timing count as zero.
pub fn total_process_time(steps: &[ProcessStep]) -> f64 {
    steps.iter().filter_map(|step| step.avg_time_minutes).sum()
}
