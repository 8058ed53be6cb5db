//! # Dependency Graph
//!
//! One node per file, one edge per resolved import, pointing from the
//! importing file to the file it depends on. Imports that resolve to a
//! file outside the validation set become leaf nodes.
//!
//! ## Queries
//!
//! - [`DependencyGraph::find_cycles`]: depth-first search with an explicit
//!   path stack. Every back edge yields one cycle; traversal continues so
//!   all distinct cycles are found.
//! - [`DependencyGraph::topological_order`]: Kahn's algorithm. Files with
//!   no outstanding dependency come first; ties keep insertion order.
//!   Fails when any cycle exists.
//! - [`DependencyGraph::transitive_dependencies`]: everything reachable
//!   from one root, independent of ordering.

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};

use indexmap::{IndexMap, IndexSet};
use thiserror::Error;

use lumos_core::{Diagnostic, DiagnosticCollector, DiagnosticKind, FileUnit, Namespace};

use crate::imports::ImportResolver;

/// Ordering failed because the graph is not acyclic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("dependency cycle among {} file(s)", .involved.len())]
pub struct CycleError {
    /// Files that could not be scheduled.
    pub involved: Vec<PathBuf>,
}

/// File-level "depends on" graph of one run.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// node -> (dependency -> line of the import that created the edge)
    edges: IndexMap<PathBuf, IndexMap<PathBuf, u32>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the graph for `files`, resolving each import with `resolver`.
    ///
    /// Unresolvable imports are reported as `ImportNotFound` and add no edge.
    pub fn build(
        files: &[FileUnit],
        resolver: &ImportResolver,
        out: &mut DiagnosticCollector,
    ) -> Self {
        let mut graph = Self::new();
        let mut by_location: HashMap<PathBuf, &Path> = HashMap::new();
        let mut by_namespace: HashMap<Namespace, &Path> = HashMap::new();

        for unit in files {
            graph.add_file(&unit.path);
            if let Ok(canonical) = std::fs::canonicalize(&unit.path) {
                by_location.entry(canonical).or_insert(&unit.path);
            }
            by_namespace.entry(unit.namespace()).or_insert(&unit.path);
        }

        for unit in files {
            for import in &unit.imports {
                let found = match resolver.resolve_import(&import.path, Some(unit.directory())) {
                    Ok(found) => found,
                    Err(miss) => {
                        out.push(
                            Diagnostic::new(DiagnosticKind::ImportNotFound, &unit.path, miss.to_string())
                                .at_line(import.line),
                        );
                        continue;
                    }
                };

                let target = std::fs::canonicalize(&found)
                    .ok()
                    .and_then(|c| by_location.get(&c).copied())
                    .or_else(|| by_namespace.get(&import.namespace()).copied())
                    .map(Path::to_path_buf);
                let target = match target {
                    Some(t) => t,
                    None => {
                        tracing::debug!(
                            import = %import.path,
                            path = %found.display(),
                            "import resolved outside the validation set"
                        );
                        found
                    }
                };
                graph.add_dependency(&unit.path, &target, import.line);
            }
        }

        tracing::info!(
            files = graph.len(),
            edges = graph.edge_count(),
            "dependency graph built"
        );
        graph
    }

    /// Add a node with no edges. Existing nodes are left untouched.
    pub fn add_file(&mut self, path: impl AsRef<Path>) {
        self.edges.entry(path.as_ref().to_path_buf()).or_default();
    }

    /// Record that `from` depends on `to`, both becoming nodes.
    pub fn add_dependency(&mut self, from: impl AsRef<Path>, to: impl AsRef<Path>, line: u32) {
        let to = to.as_ref().to_path_buf();
        self.add_file(&to);
        self.edges
            .entry(from.as_ref().to_path_buf())
            .or_default()
            .entry(to)
            .or_insert(line);
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(IndexMap::len).sum()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.edges.contains_key(path)
    }

    /// Nodes in insertion order.
    pub fn files(&self) -> impl Iterator<Item = &Path> {
        self.edges.keys().map(PathBuf::as_path)
    }

    /// Direct dependencies of `path`.
    pub fn dependencies(&self, path: &Path) -> impl Iterator<Item = &Path> {
        self.edges
            .get(path)
            .into_iter()
            .flat_map(|deps| deps.keys().map(PathBuf::as_path))
    }

    /// Files that directly depend on `path`.
    pub fn dependents<'a>(&'a self, path: &'a Path) -> impl Iterator<Item = &'a Path> + 'a {
        self.edges
            .iter()
            .filter(move |(_, deps)| deps.contains_key(path))
            .map(|(node, _)| node.as_path())
    }

    /// Every distinct cycle, each as the path from its entry node around
    /// to the node whose edge closes it.
    pub fn find_cycles(&self) -> Vec<Vec<PathBuf>> {
        let mut visited: HashSet<&PathBuf> = HashSet::new();
        let mut seen: HashSet<Vec<PathBuf>> = HashSet::new();
        let mut cycles = Vec::new();

        for start in self.edges.keys() {
            if !visited.insert(start) {
                continue;
            }
            let mut path: IndexSet<&PathBuf> = IndexSet::new();
            path.insert(start);
            let mut frames: Vec<(&PathBuf, usize)> = vec![(start, 0)];

            while let Some((node, cursor)) = frames.last_mut() {
                let next = self
                    .edges
                    .get(*node)
                    .and_then(|deps| deps.get_index(*cursor))
                    .map(|(dep, _)| dep);
                *cursor += 1;

                let Some(next) = next else {
                    frames.pop();
                    path.pop();
                    continue;
                };

                if let Some(pos) = path.get_index_of(next) {
                    let cycle: Vec<PathBuf> = path
                        .iter()
                        .skip(pos)
                        .map(|p| (*p).clone())
                        .collect();
                    if seen.insert(rotate_to_min(&cycle)) {
                        cycles.push(cycle);
                    }
                } else if visited.insert(next) {
                    path.insert(next);
                    frames.push((next, 0));
                }
            }
        }
        cycles
    }

    /// Report each cycle as one `CircularDependency` error. Returns the
    /// number of cycles found.
    pub fn check_cycles(&self, out: &mut DiagnosticCollector) -> usize {
        let cycles = self.find_cycles();
        for cycle in &cycles {
            let Some(first) = cycle.first() else {
                continue;
            };
            let closing = cycle.get(1).unwrap_or(first);
            let line = self
                .edges
                .get(first)
                .and_then(|deps| deps.get(closing))
                .copied()
                .unwrap_or(0);
            let chain: Vec<String> = cycle
                .iter()
                .chain(std::iter::once(first))
                .map(|p| p.display().to_string())
                .collect();
            out.push(
                Diagnostic::new(
                    DiagnosticKind::CircularDependency,
                    first,
                    format!("circular import: {}", chain.join(" -> ")),
                )
                .at_line(line),
            );
        }
        if !cycles.is_empty() {
            tracing::info!(cycles = cycles.len(), "dependency cycles found");
        }
        cycles.len()
    }

    /// Dependencies before dependents.
    pub fn topological_order(&self) -> Result<Vec<PathBuf>, CycleError> {
        let mut outstanding: IndexMap<&PathBuf, usize> = self
            .edges
            .iter()
            .map(|(node, deps)| (node, deps.len()))
            .collect();
        let mut dependents: HashMap<&PathBuf, Vec<&PathBuf>> = HashMap::new();
        for (node, deps) in &self.edges {
            for dep in deps.keys() {
                dependents.entry(dep).or_default().push(node);
            }
        }

        let mut ready: VecDeque<&PathBuf> = outstanding
            .iter()
            .filter(|(_, n)| **n == 0)
            .map(|(node, _)| *node)
            .collect();
        let mut order = Vec::with_capacity(self.edges.len());

        while let Some(node) = ready.pop_front() {
            order.push(node.clone());
            for dependent in dependents.get(node).into_iter().flatten() {
                if let Some(n) = outstanding.get_mut(dependent) {
                    *n -= 1;
                    if *n == 0 {
                        ready.push_back(*dependent);
                    }
                }
            }
        }

        if order.len() != self.edges.len() {
            return Err(CycleError {
                involved: outstanding
                    .into_iter()
                    .filter(|(_, n)| *n > 0)
                    .map(|(node, _)| node.clone())
                    .collect(),
            });
        }
        Ok(order)
    }

    /// Every file reachable from `root`, excluding `root` unless it lies on
    /// a cycle through itself.
    pub fn transitive_dependencies(&self, root: &Path) -> IndexSet<PathBuf> {
        let mut reached: IndexSet<PathBuf> = IndexSet::new();
        let mut stack: Vec<&Path> = self.dependencies(root).collect();
        stack.reverse();

        while let Some(node) = stack.pop() {
            if !reached.insert(node.to_path_buf()) {
                continue;
            }
            let mut next: Vec<&Path> = self.dependencies(node).collect();
            next.reverse();
            stack.extend(next);
        }
        reached
    }
}

/// Canonical rotation of a cycle, used to recognise one cycle found from
/// different entry points.
fn rotate_to_min(cycle: &[PathBuf]) -> Vec<PathBuf> {
    let Some(pos) = cycle
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.cmp(b.1))
        .map(|(i, _)| i)
    else {
        return Vec::new();
    };
    cycle[pos..].iter().chain(&cycle[..pos]).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> PathBuf {
        PathBuf::from(s)
    }

    fn graph(edges: &[(&str, &str)]) -> DependencyGraph {
        let mut g = DependencyGraph::new();
        for (i, (from, to)) in edges.iter().enumerate() {
            g.add_dependency(from, to, i as u32 + 1);
        }
        g
    }

    fn position(order: &[PathBuf], name: &str) -> usize {
        order.iter().position(|x| x == &p(name)).unwrap()
    }

    /// Whether `cycle` visits `expected` in this cyclic order.
    fn is_rotation(cycle: &[PathBuf], expected: &[&str]) -> bool {
        let expected: Vec<PathBuf> = expected.iter().map(|s| p(s)).collect();
        cycle.len() == expected.len()
            && (0..cycle.len()).any(|shift| {
                (0..cycle.len()).all(|i| cycle[(i + shift) % cycle.len()] == expected[i])
            })
    }

    #[test]
    fn three_node_cycle_is_found_and_blocks_ordering() {
        let g = graph(&[("a.msg", "b.msg"), ("b.msg", "c.msg"), ("c.msg", "a.msg")]);
        let cycles = g.find_cycles();
        assert_eq!(cycles.len(), 1);
        assert!(is_rotation(&cycles[0], &["a.msg", "b.msg", "c.msg"]));

        let err = g.topological_order().unwrap_err();
        assert_eq!(err.involved.len(), 3);
    }

    #[test]
    fn cycle_diagnostic_cites_chain_and_import_line() {
        let g = graph(&[("a.msg", "b.msg"), ("b.msg", "c.msg"), ("c.msg", "a.msg")]);
        let mut out = DiagnosticCollector::new();
        assert_eq!(g.check_cycles(&mut out), 1);
        let d = out.iter().next().unwrap();
        assert_eq!(d.kind, DiagnosticKind::CircularDependency);
        assert_eq!(d.file, p("a.msg"));
        assert_eq!(d.line, 1);
        assert_eq!(d.message, "circular import: a.msg -> b.msg -> c.msg -> a.msg");
    }

    #[test]
    fn diamond_orders_dependencies_first() {
        let g = graph(&[
            ("d.msg", "b.msg"),
            ("d.msg", "c.msg"),
            ("b.msg", "a.msg"),
            ("c.msg", "a.msg"),
        ]);
        assert!(g.find_cycles().is_empty());
        let order = g.topological_order().unwrap();
        assert_eq!(order.len(), 4);
        assert!(position(&order, "a.msg") < position(&order, "b.msg"));
        assert!(position(&order, "a.msg") < position(&order, "c.msg"));
        assert!(position(&order, "b.msg") < position(&order, "d.msg"));
        assert!(position(&order, "c.msg") < position(&order, "d.msg"));
    }

    #[test]
    fn all_distinct_cycles_are_reported() {
        let g = graph(&[
            ("a.msg", "b.msg"),
            ("b.msg", "a.msg"),
            ("b.msg", "c.msg"),
            ("c.msg", "b.msg"),
            ("x.msg", "y.msg"),
            ("y.msg", "x.msg"),
        ]);
        let cycles = g.find_cycles();
        assert_eq!(cycles.len(), 3);
        assert!(cycles.iter().any(|c| is_rotation(c, &["a.msg", "b.msg"])));
        assert!(cycles.iter().any(|c| is_rotation(c, &["b.msg", "c.msg"])));
        assert!(cycles.iter().any(|c| is_rotation(c, &["x.msg", "y.msg"])));
    }

    #[test]
    fn self_import_is_a_cycle() {
        let g = graph(&[("a.msg", "a.msg")]);
        let cycles = g.find_cycles();
        assert_eq!(cycles, vec![vec![p("a.msg")]]);
        assert!(g.topological_order().is_err());
    }

    #[test]
    fn cycle_failure_names_only_blocked_files() {
        let g = graph(&[("a.msg", "b.msg"), ("b.msg", "a.msg"), ("c.msg", "leaf.msg")]);
        let err = g.topological_order().unwrap_err();
        let mut involved = err.involved.clone();
        involved.sort();
        assert_eq!(involved, vec![p("a.msg"), p("b.msg")]);
    }

    #[test]
    fn independent_files_keep_insertion_order() {
        let mut g = DependencyGraph::new();
        g.add_file("z.msg");
        g.add_file("a.msg");
        g.add_file("m.msg");
        assert_eq!(
            g.topological_order().unwrap(),
            vec![p("z.msg"), p("a.msg"), p("m.msg")]
        );
    }

    #[test]
    fn transitive_dependencies_follow_all_paths() {
        let g = graph(&[
            ("d.msg", "b.msg"),
            ("d.msg", "c.msg"),
            ("b.msg", "a.msg"),
            ("c.msg", "a.msg"),
            ("e.msg", "d.msg"),
        ]);
        let deps = g.transitive_dependencies(Path::new("d.msg"));
        assert_eq!(deps.len(), 3);
        assert!(deps.contains(&p("a.msg")));
        assert!(!deps.contains(&p("d.msg")));
        assert!(!deps.contains(&p("e.msg")));
        assert!(g.transitive_dependencies(Path::new("a.msg")).is_empty());
    }

    #[test]
    fn transitive_dependencies_terminate_on_cycles() {
        let g = graph(&[("a.msg", "b.msg"), ("b.msg", "a.msg")]);
        let deps = g.transitive_dependencies(Path::new("a.msg"));
        assert_eq!(deps.len(), 2);
    }

    #[test]
    fn dependents_are_reverse_edges() {
        let g = graph(&[("b.msg", "a.msg"), ("c.msg", "a.msg")]);
        let mut users: Vec<&Path> = g.dependents(Path::new("a.msg")).collect();
        users.sort();
        assert_eq!(users, vec![Path::new("b.msg"), Path::new("c.msg")]);
        assert_eq!(g.edge_count(), 2);
        assert_eq!(g.len(), 3);
    }

    #[test]
    fn build_reports_missing_imports_and_links_resolved_ones() {
        let dir = tempfile::TempDir::new().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("common")).unwrap();
        std::fs::write(root.join("common/geometry.msg"), "").unwrap();
        std::fs::write(root.join("pose.msg"), "").unwrap();

        let geometry = FileUnit::new(root.join("common/geometry.msg")).with_namespace("common::geometry");
        let pose = FileUnit::new(root.join("pose.msg"))
            .with_namespace("pose")
            .with_import("common/geometry", 1)
            .with_import("missing/thing", 2);

        let resolver = ImportResolver::new(vec![root.to_path_buf()]);
        let mut out = DiagnosticCollector::new();
        let g = DependencyGraph::build(&[geometry.clone(), pose.clone()], &resolver, &mut out);

        assert_eq!(out.len(), 1);
        let d = out.iter().next().unwrap();
        assert_eq!(d.kind, DiagnosticKind::ImportNotFound);
        assert_eq!(d.line, 2);

        let deps: Vec<&Path> = g.dependencies(&pose.path).collect();
        assert_eq!(deps, vec![geometry.path.as_path()]);
        let order = g.topological_order().unwrap();
        assert_eq!(order, vec![geometry.path.clone(), pose.path.clone()]);
    }

    #[test]
    fn import_outside_the_run_becomes_a_leaf() {
        let dir = tempfile::TempDir::new().unwrap();
        let root = dir.path();
        std::fs::write(root.join("units.msg"), "").unwrap();
        std::fs::write(root.join("speed.msg"), "").unwrap();

        let speed = FileUnit::new(root.join("speed.msg"))
            .with_namespace("speed")
            .with_import("units", 3);
        let resolver = ImportResolver::new(vec![root.to_path_buf()]);
        let mut out = DiagnosticCollector::new();
        let g = DependencyGraph::build(&[speed.clone()], &resolver, &mut out);

        assert!(out.is_empty());
        assert_eq!(g.len(), 2);
        assert!(g.contains(&root.join("units.msg")));
        assert_eq!(g.dependencies(&root.join("units.msg")).count(), 0);
    }
}
