/// Directed "depends on" relation over named nodes, stored as index lists
#[derive(Debug, Clone)]
pub struct DependencyGraph<'a> {
    names: Vec<&'a str>,
    edges: Vec<Vec<usize>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    Unvisited,
    InProgress,
    Done,
}

impl<'a> DependencyGraph<'a> {
    pub fn new(names: Vec<&'a str>) -> Self {
        let edges = vec![Vec::new(); names.len()];
        Self { names, edges }
    }

    /// Record that `from` depends on `to`
    pub fn add_edge(&mut self, from: usize, to: usize) {
        if !self.edges[from].contains(&to) {
            self.edges[from].push(to);
        }
    }

    pub fn dependencies(&self, node: usize) -> &[usize] {
        &self.edges[node]
    }

    /// Dependencies before dependents. Fails with the first cycle found, listed as
    /// `[a, b, a]`.
    pub fn topological_order(&self) -> Result<Vec<usize>, Vec<String>> {
        let mut first_cycle = None;
        let order = self.traverse(&mut |cycle| {
            if first_cycle.is_none() {
                first_cycle = Some(cycle);
            }
        });
        match first_cycle {
            Some(cycle) => Err(cycle),
            None => Ok(order),
        }
    }

    /// Every cycle reachable through a back edge
    pub fn find_cycles(&self) -> Vec<Vec<String>> {
        let mut cycles = Vec::new();
        self.traverse(&mut |cycle| cycles.push(cycle));
        cycles
    }

    /// Three-colour depth-first search in declaration order. Returns the post-order.
    fn traverse(&self, on_cycle: &mut dyn FnMut(Vec<String>)) -> Vec<usize> {
        let mut colors = vec![Color::Unvisited; self.names.len()];
        let mut path = Vec::new();
        let mut order = Vec::with_capacity(self.names.len());

        for start in 0..self.names.len() {
            if colors[start] == Color::Unvisited {
                self.visit(start, &mut colors, &mut path, &mut order, on_cycle);
            }
        }
        order
    }

    fn visit(
        &self,
        node: usize,
        colors: &mut [Color],
        path: &mut Vec<usize>,
        order: &mut Vec<usize>,
        on_cycle: &mut dyn FnMut(Vec<String>),
    ) {
        colors[node] = Color::InProgress;
        path.push(node);

        for &dependency in &self.edges[node] {
            match colors[dependency] {
                Color::Unvisited => self.visit(dependency, colors, path, order, on_cycle),
                Color::InProgress => {
                    // back edge: the cycle is the path suffix starting at `dependency`
                    let start = path.iter().position(|&n| n == dependency).unwrap_or(0);
                    let mut cycle: Vec<String> =
                        path[start..].iter().map(|&n| self.names[n].to_string()).collect();
                    cycle.push(self.names[dependency].to_string());
                    on_cycle(cycle);
                }
                Color::Done => {}
            }
        }

        path.pop();
        colors[node] = Color::Done;
        order.push(node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_dependencies_come_first() {
        // c depends on b, b depends on a
        let mut graph = DependencyGraph::new(vec!["c", "b", "a"]);
        graph.add_edge(0, 1);
        graph.add_edge(1, 2);

        assert_eq!(graph.topological_order().unwrap(), vec![2, 1, 0]);
    }

    #[test]
    fn test_independent_nodes_keep_declaration_order() {
        let graph = DependencyGraph::new(vec!["a", "b", "c"]);
        assert_eq!(graph.topological_order().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn test_two_node_cycle() {
        let mut graph = DependencyGraph::new(vec!["A", "B"]);
        graph.add_edge(0, 1);
        graph.add_edge(1, 0);

        let cycle = graph.topological_order().unwrap_err();
        assert_eq!(cycle, vec!["A", "B", "A"]);
    }

    #[test]
    fn test_self_dependency() {
        let mut graph = DependencyGraph::new(vec!["solo"]);
        graph.add_edge(0, 0);
        assert_eq!(graph.find_cycles(), vec![vec!["solo".to_string(), "solo".to_string()]]);
    }

    #[test]
    fn test_diamond_is_not_a_cycle() {
        let mut graph = DependencyGraph::new(vec!["top", "left", "right", "bottom"]);
        graph.add_edge(0, 1);
        graph.add_edge(0, 2);
        graph.add_edge(1, 3);
        graph.add_edge(2, 3);

        assert!(graph.find_cycles().is_empty());
        assert_eq!(graph.topological_order().unwrap(), vec![3, 1, 2, 0]);
    }

    #[test]
    fn test_cycle_behind_prefix() {
        let mut graph = DependencyGraph::new(vec!["entry", "x", "y", "z"]);
        graph.add_edge(0, 1);
        graph.add_edge(1, 2);
        graph.add_edge(2, 3);
        graph.add_edge(3, 1);

        assert_eq!(graph.find_cycles(), vec![vec!["x", "y", "z", "x"]]);
    }
}
