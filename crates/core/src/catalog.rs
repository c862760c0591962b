//! Product category hierarchy.
//!
//! Categories are stored flat with an optional `parent_id`. The menu and the
//! back-office product forms need them as a tree, ordered for display.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ChurrosError;

pub type CategoryId = Uuid;

/// A product category row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<CategoryId>,
    #[serde(default)]
    pub sort_order: i32,
}

/// A category with its ordered subcategories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryNode {
    pub category: Category,
    pub children: Vec<CategoryNode>,
}

impl CategoryNode {
    /// Number of categories in this subtree, including itself.
    pub fn len(&self) -> usize {
        1 + self.children.iter().map(CategoryNode::len).sum::<usize>()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

fn display_order(a: &&Category, b: &&Category) -> std::cmp::Ordering {
    a.sort_order
        .cmp(&b.sort_order)
        .then_with(|| a.name.cmp(&b.name))
}

/// Build the category forest from flat rows.
///
/// Roots are categories without a parent, or whose parent is not in `rows`.
/// Siblings are ordered by `sort_order`, then name. Every category appears
/// exactly once: members of a parent cycle are lifted to the root level.
pub fn build_category_tree(rows: &[Category]) -> Vec<CategoryNode> {
    let known: HashSet<CategoryId> = rows.iter().map(|c| c.id).collect();

    let mut children: HashMap<CategoryId, Vec<&Category>> = HashMap::new();
    let mut roots: Vec<&Category> = Vec::new();
    for row in rows {
        match row.parent_id {
            Some(parent) if known.contains(&parent) && parent != row.id => {
                children.entry(parent).or_default().push(row);
            }
            _ => roots.push(row),
        }
    }
    for list in children.values_mut() {
        list.sort_by(display_order);
    }
    roots.sort_by(display_order);

    let mut placed: HashSet<CategoryId> = HashSet::with_capacity(rows.len());
    let mut forest: Vec<CategoryNode> = roots
        .into_iter()
        .filter_map(|root| build_node(root, &children, &mut placed))
        .collect();

    // Anything left over sits on a cycle that no root reaches.
    let mut stranded: Vec<&Category> = rows.iter().filter(|c| !placed.contains(&c.id)).collect();
    stranded.sort_by(display_order);
    for row in stranded {
        if let Some(node) = build_node(row, &children, &mut placed) {
            tracing::warn!(category_id = %row.id, name = %row.name, "category parent cycle, lifted to root");
            forest.push(node);
        }
    }

    forest
}

fn build_node(
    category: &Category,
    children: &HashMap<CategoryId, Vec<&Category>>,
    placed: &mut HashSet<CategoryId>,
) -> Option<CategoryNode> {
    if !placed.insert(category.id) {
        return None;
    }
    let kids = children
        .get(&category.id)
        .map(|list| {
            list.iter()
                .filter_map(|child| build_node(child, children, placed))
                .collect()
        })
        .unwrap_or_default();
    Some(CategoryNode {
        category: category.clone(),
        children: kids,
    })
}

/// Depth-first listing with depth, for indented select boxes.
pub fn flatten_tree(forest: &[CategoryNode]) -> Vec<(usize, &Category)> {
    fn walk<'a>(nodes: &'a [CategoryNode], depth: usize, out: &mut Vec<(usize, &'a Category)>) {
        for node in nodes {
            out.push((depth, &node.category));
            walk(&node.children, depth + 1, out);
        }
    }
    let mut out = Vec::new();
    walk(forest, 0, &mut out);
    out
}

/// Find the subtree rooted at `id`.
pub fn find_subtree(
    forest: &[CategoryNode],
    id: CategoryId,
) -> Result<&CategoryNode, ChurrosError> {
    fn search(nodes: &[CategoryNode], id: CategoryId) -> Option<&CategoryNode> {
        nodes.iter().find_map(|n| {
            if n.category.id == id {
                Some(n)
            } else {
                search(&n.children, id)
            }
        })
    }
    search(forest, id).ok_or_else(|| ChurrosError::CategoryNotFound(id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cat(name: &str, parent: Option<CategoryId>, sort_order: i32) -> Category {
        Category {
            id: Uuid::new_v4(),
            name: name.to_string(),
            parent_id: parent,
            sort_order,
        }
    }

    #[test]
    fn builds_nested_tree_in_display_order() {
        let doces = cat("Doces", None, 1);
        let salgados = cat("Salgados", None, 0);
        let tradicional = cat("Tradicional", Some(doces.id), 2);
        let gourmet = cat("Gourmet", Some(doces.id), 1);
        let nutella = cat("Nutella", Some(gourmet.id), 0);

        let rows = vec![
            nutella.clone(),
            doces.clone(),
            tradicional.clone(),
            salgados.clone(),
            gourmet.clone(),
        ];
        let forest = build_category_tree(&rows);

        let names: Vec<&str> = forest.iter().map(|n| n.category.name.as_str()).collect();
        assert_eq!(names, vec!["Salgados", "Doces"]);

        let doces_node = &forest[1];
        let kids: Vec<&str> = doces_node
            .children
            .iter()
            .map(|n| n.category.name.as_str())
            .collect();
        assert_eq!(kids, vec!["Gourmet", "Tradicional"]);
        assert_eq!(doces_node.children[0].children[0].category.name, "Nutella");
        assert_eq!(doces_node.len(), 4);
    }

    #[test]
    fn ties_on_sort_order_break_by_name() {
        let b = cat("Bebidas", None, 0);
        let a = cat("Acompanhamentos", None, 0);
        let forest = build_category_tree(&[b, a]);
        assert_eq!(forest[0].category.name, "Acompanhamentos");
    }

    #[test]
    fn unknown_parent_becomes_root() {
        let orphan = cat("Sazonais", Some(Uuid::new_v4()), 0);
        let forest = build_category_tree(&[orphan.clone()]);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].category, orphan);
    }

    #[test]
    fn parent_cycle_places_each_category_once() {
        let mut a = cat("A", None, 0);
        let mut b = cat("B", None, 1);
        a.parent_id = Some(b.id);
        b.parent_id = Some(a.id);
        let root = cat("Root", None, 0);

        let forest = build_category_tree(&[a, b, root]);
        let total: usize = forest.iter().map(CategoryNode::len).sum();
        assert_eq!(total, 3);
    }

    #[test]
    fn self_parent_is_root() {
        let mut a = cat("Loop", None, 0);
        a.parent_id = Some(a.id);
        let forest = build_category_tree(&[a]);
        assert_eq!(forest.len(), 1);
        assert!(forest[0].is_leaf());
    }

    #[test]
    fn flatten_reports_depths() {
        let top = cat("Doces", None, 0);
        let mid = cat("Gourmet", Some(top.id), 0);
        let leaf = cat("Doce de leite", Some(mid.id), 0);
        let forest = build_category_tree(&[leaf, mid, top]);

        let flat: Vec<(usize, &str)> = flatten_tree(&forest)
            .into_iter()
            .map(|(d, c)| (d, c.name.as_str()))
            .collect();
        assert_eq!(flat, vec![(0, "Doces"), (1, "Gourmet"), (2, "Doce de leite")]);
    }

    #[test]
    fn find_subtree_missing_is_error() {
        let forest = build_category_tree(&[cat("Doces", None, 0)]);
        let missing = Uuid::new_v4();
        match find_subtree(&forest, missing) {
            Err(ChurrosError::CategoryNotFound(id)) => assert_eq!(id, missing.to_string()),
            other => panic!("expected CategoryNotFound, got {other:?}"),
        }
    }
}
