//! CategoryTreeResolver: builds the category forest and resolves every node's
//! root-to-node path of display names.

use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;

use shopmig_core::ExportProfile;

use crate::error::ConvertError;
use crate::report::ReferenceWarning;
use crate::source::CategoryNode;

/// The resolved, read-only category forest.
#[derive(Debug, Default)]
pub struct CategoryTree {
    nodes: HashMap<String, CategoryNode>,
    parent_of: HashMap<String, String>,
    children_of: HashMap<String, Vec<String>>,
    roots: Vec<String>,
    paths: HashMap<String, Vec<String>>,
}

impl CategoryTree {
    /// Builds the forest and resolves all paths up front.
    ///
    /// Either every path resolves or nothing is returned; a broken hierarchy
    /// never yields a partial tree. Duplicate category ids keep the last row
    /// and are reported as warnings.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::DanglingReference`] if a parent id is not in
    /// the node set, or [`ConvertError::Cycle`] if a parent chain does not
    /// reach a root within the total node count.
    pub fn build(
        nodes: Vec<CategoryNode>,
        profile: &ExportProfile,
    ) -> Result<(Self, Vec<ReferenceWarning>), ConvertError> {
        let mut warnings = Vec::new();
        let mut order: Vec<String> = Vec::with_capacity(nodes.len());
        let mut by_id: HashMap<String, CategoryNode> = HashMap::with_capacity(nodes.len());

        for node in nodes {
            let id = node.category_id.clone();
            if by_id.insert(id.clone(), node).is_some() {
                warnings.push(ReferenceWarning::DuplicateCategory {
                    category_id: id.clone(),
                });
            } else {
                order.push(id);
            }
        }

        let mut parent_of = HashMap::new();
        let mut children_of: HashMap<String, Vec<String>> = HashMap::new();
        let mut roots = Vec::new();

        for id in &order {
            let node = &by_id[id];
            if profile.is_root_ref(&node.parent_ref) {
                roots.push(id.clone());
                continue;
            }
            let parent = node.parent_ref.trim().to_string();
            if !by_id.contains_key(&parent) {
                return Err(ConvertError::DanglingReference {
                    category_id: id.clone(),
                    parent_id: parent,
                });
            }
            children_of
                .entry(parent.clone())
                .or_default()
                .push(id.clone());
            parent_of.insert(id.clone(), parent);
        }

        let sort_key = |id: &String| {
            let order = by_id[id].sort_order.unwrap_or(i64::MAX);
            (order, id.clone())
        };
        roots.sort_by_key(sort_key);
        for siblings in children_of.values_mut() {
            siblings.sort_by_key(sort_key);
        }

        let paths = resolve_paths(&order, &by_id, &parent_of)?;

        tracing::debug!(
            categories = by_id.len(),
            roots = roots.len(),
            "category tree resolved"
        );

        Ok((
            Self {
                nodes: by_id,
                parent_of,
                children_of,
                roots,
                paths,
            },
            warnings,
        ))
    }

    /// Root-first display names ending with the category's own name.
    #[must_use]
    pub fn path(&self, category_id: &str) -> Option<&[String]> {
        self.paths.get(category_id).map(Vec::as_slice)
    }

    #[must_use]
    pub fn parent(&self, category_id: &str) -> Option<&str> {
        self.parent_of.get(category_id).map(String::as_str)
    }

    /// Children ordered by `sort_order`, then id.
    #[must_use]
    pub fn children(&self, category_id: &str) -> &[String] {
        self.children_of
            .get(category_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Roots ordered by `sort_order`, then id.
    #[must_use]
    pub fn roots(&self) -> &[String] {
        &self.roots
    }

    #[must_use]
    pub fn name(&self, category_id: &str) -> Option<&str> {
        self.nodes.get(category_id).map(|n| n.name.as_str())
    }

    /// Number of edges from the root; roots have depth 0.
    #[must_use]
    pub fn depth(&self, category_id: &str) -> Option<usize> {
        self.path(category_id).map(|p| p.len() - 1)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Indented outline of the forest, two spaces per level.
    #[must_use]
    pub fn render_outline(&self) -> String {
        let mut out = String::new();
        let mut stack: Vec<(&str, usize)> = self
            .roots
            .iter()
            .rev()
            .map(|id| (id.as_str(), 0))
            .collect();

        while let Some((id, depth)) = stack.pop() {
            let name = self.name(id).unwrap_or_default();
            let _ = writeln!(out, "{}{name} [{id}]", "  ".repeat(depth));
            for child in self.children(id).iter().rev() {
                stack.push((child.as_str(), depth + 1));
            }
        }
        out
    }
}

/// Resolves every node's path with a walk bounded by the node count.
fn resolve_paths(
    order: &[String],
    nodes: &HashMap<String, CategoryNode>,
    parent_of: &HashMap<String, String>,
) -> Result<HashMap<String, Vec<String>>, ConvertError> {
    let limit = nodes.len();
    let mut paths: HashMap<String, Vec<String>> = HashMap::with_capacity(limit);

    for start in order {
        if paths.contains_key(start) {
            continue;
        }

        // Walk upward until a root or an already-resolved ancestor.
        let mut chain: Vec<&str> = vec![start.as_str()];
        let mut base: Vec<String> = Vec::new();
        loop {
            let current = chain[chain.len() - 1];
            let Some(parent) = parent_of.get(current) else {
                break;
            };
            if let Some(resolved) = paths.get(parent) {
                base.clone_from(resolved);
                break;
            }
            chain.push(parent.as_str());
            if chain.len() > limit {
                return Err(cycle_error(start, &chain));
            }
        }

        // Fill in from the top of the chain down.
        let mut path = base;
        for id in chain.iter().rev() {
            path.push(nodes[*id].name.clone());
            paths.insert((*id).to_string(), path.clone());
        }
    }

    Ok(paths)
}

/// Cuts the walked chain down to the repeating part.
fn cycle_error(start: &str, chain: &[&str]) -> ConvertError {
    let mut seen = HashSet::new();
    let mut cycle: Vec<String> = chain.iter().map(ToString::to_string).collect();
    for (idx, id) in chain.iter().enumerate() {
        if !seen.insert(*id) {
            let first = chain.iter().position(|c| c == id).unwrap_or(0);
            cycle = chain[first..=idx].iter().map(ToString::to_string).collect();
            break;
        }
    }
    ConvertError::Cycle {
        category_id: start.to_string(),
        chain: cycle,
    }
}

#[cfg(test)]
#[path = "category_test.rs"]
mod tests;
