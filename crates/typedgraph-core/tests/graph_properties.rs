//! Model-based property tests for the graph store.

use std::collections::{BTreeMap, BTreeSet};

use proptest::prelude::*;
use typedgraph_common::{AttrArray, Error, ScalarType, Value};
use typedgraph_core::{Graph, GraphSpec};

#[derive(Debug, Clone)]
enum Op {
    AddNode(u16),
    AddEdge(u16, u16),
    RemoveNode(u16),
    RemoveEdge(u16, u16),
}

fn arb_op() -> impl Strategy<Value = Op> {
    // A small key space so operations collide often.
    prop_oneof![
        3 => (0u16..24).prop_map(Op::AddNode),
        4 => (0u16..24, 0u16..24).prop_map(|(u, v)| Op::AddEdge(u, v)),
        1 => (0u16..24).prop_map(Op::RemoveNode),
        1 => (0u16..24, 0u16..24).prop_map(|(u, v)| Op::RemoveEdge(u, v)),
    ]
}

/// Reference model: node set plus edges keyed by (min, max) or (source, target).
#[derive(Default)]
struct Model {
    directed: bool,
    nodes: BTreeSet<u16>,
    edges: BTreeMap<(u16, u16), f32>,
}

impl Model {
    fn key(&self, u: u16, v: u16) -> (u16, u16) {
        if self.directed { (u, v) } else { (u.min(v), u.max(v)) }
    }

    fn out_degree(&self, n: u16) -> usize {
        self.edges
            .keys()
            .filter(|&&(u, v)| u == n || (!self.directed && v == n))
            .count()
    }

    fn in_degree(&self, n: u16) -> usize {
        self.edges.keys().filter(|&&(_, v)| v == n).count()
    }
}

fn spec(directed: bool) -> GraphSpec {
    GraphSpec::new(ScalarType::UInt16)
        .with_node_attr("position", "float32[2]")
        .unwrap()
        .with_edge_attr("weight", "float32")
        .unwrap()
        .directed(directed)
}

fn apply(graph: &mut Graph<u16>, model: &mut Model, op: &Op, counter: &mut f32) {
    match *op {
        Op::AddNode(n) => {
            let result = graph.add_node(n, &[]);
            if model.nodes.insert(n) {
                assert_eq!(result, Ok(()));
            } else {
                assert_eq!(result, Err(Error::DuplicateNode(n.to_string())));
            }
        }
        Op::AddEdge(u, v) => {
            *counter += 1.0;
            let result = graph.add_edge(u, v, &[Value::from(*counter)]);
            let key = model.key(u, v);
            if u == v {
                assert_eq!(result, Err(Error::SelfLoop(u.to_string())));
            } else if !model.nodes.contains(&u) || !model.nodes.contains(&v) {
                assert!(matches!(result, Err(Error::UnknownNode(_))));
            } else if model.edges.contains_key(&key) {
                assert!(matches!(result, Err(Error::DuplicateEdge(..))));
            } else {
                assert_eq!(result, Ok(()));
                model.edges.insert(key, *counter);
            }
        }
        Op::RemoveNode(n) => {
            let result = graph.remove_node(n);
            if model.nodes.remove(&n) {
                assert_eq!(result, Ok(()));
                model.edges.retain(|&(u, v), _| u != n && v != n);
            } else {
                assert_eq!(result, Err(Error::UnknownNode(n.to_string())));
            }
        }
        Op::RemoveEdge(u, v) => {
            let result = graph.remove_edge(u, v);
            if model.edges.remove(&model.key(u, v)).is_some() {
                assert_eq!(result, Ok(()));
            } else {
                assert!(result.is_err());
            }
        }
    }
}

fn check(graph: &Graph<u16>, model: &Model) {
    assert_eq!(graph.size(), model.nodes.len());
    assert_eq!(graph.num_edges(), model.edges.len());

    let nodes: BTreeSet<u16> = graph.nodes().collect();
    assert_eq!(nodes, model.nodes);

    // every edge exactly once
    let edges = graph.edge_pairs();
    assert_eq!(edges.len(), model.edges.len());
    let unique: BTreeSet<(u16, u16)> = edges.iter().copied().collect();
    assert_eq!(unique.len(), edges.len());
    if !model.directed {
        assert!(edges.iter().all(|&(u, v)| u < v));
    }
    assert!(unique.iter().eq(model.edges.keys()));

    // attributes travel with their edge
    let weights = graph.get_edges_attr("weight", None).unwrap();
    let weights = weights.as_slice::<f32>().unwrap();
    for (&(u, v), &w) in edges.iter().zip(weights) {
        assert_eq!(model.edges[&(u, v)], w);
        if !model.directed {
            assert!(graph.edge(v, u).is_ok());
        }
    }

    let keys: Vec<u16> = model.nodes.iter().copied().collect();
    let degrees = graph.neighbors_count(&keys).unwrap();
    for (&n, &degree) in keys.iter().zip(&degrees) {
        assert_eq!(degree, model.out_degree(n));
    }
    if model.directed {
        let in_degrees = graph.in_neighbors_count(&keys).unwrap();
        for (&n, &degree) in keys.iter().zip(&in_degrees) {
            assert_eq!(degree, model.in_degree(n));
        }
        assert_eq!(in_degrees.iter().sum::<usize>(), model.edges.len());
    } else {
        assert_eq!(degrees.iter().sum::<usize>(), 2 * model.edges.len());
    }
}

proptest! {
    #[test]
    fn prop_undirected_matches_model(ops in prop::collection::vec(arb_op(), 1..200)) {
        let mut graph = Graph::<u16>::new(&spec(false)).unwrap();
        let mut model = Model::default();
        let mut counter = 0.0;
        for op in &ops {
            apply(&mut graph, &mut model, op, &mut counter);
        }
        check(&graph, &model);
    }

    #[test]
    fn prop_directed_matches_model(ops in prop::collection::vec(arb_op(), 1..200)) {
        let mut graph = Graph::<u16>::new(&spec(true)).unwrap();
        let mut model = Model { directed: true, ..Model::default() };
        let mut counter = 0.0;
        for op in &ops {
            apply(&mut graph, &mut model, op, &mut counter);
        }
        check(&graph, &model);
    }

    #[test]
    fn prop_edge_set_ignores_insertion_direction(
        pairs in prop::collection::btree_set((0u16..16, 0u16..16), 0..40),
        flips in prop::collection::vec(any::<bool>(), 40),
    ) {
        let pairs: Vec<(u16, u16)> = pairs
            .into_iter()
            .filter(|&(u, v)| u < v)
            .collect();
        let keys: Vec<u16> = (0..16).collect();

        let mut forward = Graph::<u16>::new(&spec(false)).unwrap();
        forward.add_nodes(&keys, &[]).unwrap();
        forward.add_edges(&pairs, &[]).unwrap();

        let mixed: Vec<(u16, u16)> = pairs
            .iter()
            .zip(&flips)
            .map(|(&(u, v), &flip)| if flip { (v, u) } else { (u, v) })
            .collect();
        let mut reversed = Graph::<u16>::new(&spec(false)).unwrap();
        reversed.add_nodes(&keys, &[]).unwrap();
        reversed.add_edges(&mixed, &[]).unwrap();

        // neighbor iteration order is unspecified, so compare as sets
        let sorted = |mut v: Vec<(u16, u16)>| {
            v.sort_unstable();
            v
        };
        prop_assert_eq!(sorted(forward.edge_pairs()), pairs.clone());
        prop_assert_eq!(sorted(reversed.edge_pairs()), pairs.clone());
        prop_assert_eq!(
            sorted(forward.edges_by_nodes(&keys).unwrap()),
            sorted(reversed.edges_by_nodes(&keys).unwrap())
        );
    }

    #[test]
    fn prop_bulk_node_attrs_follow_keys(
        count in 1usize..64,
        seed in any::<u32>(),
    ) {
        let keys: Vec<u16> = (0..count as u16).rev().collect();
        let mut graph = Graph::<u16>::new(&spec(false)).unwrap();
        graph.add_nodes(&keys, &[]).unwrap();

        let flat: Vec<f32> = (0..count * 2).map(|i| (i as u32 ^ seed) as f32).collect();
        let positions = AttrArray::from_flat(flat.clone(), 2).unwrap();
        graph.set_nodes_attr("position", Some(&keys), &positions).unwrap();

        for (row, &key) in keys.iter().enumerate() {
            let stored = graph.node(key).unwrap().get_array::<f32, 2>("position").unwrap();
            prop_assert_eq!(stored, [flat[row * 2], flat[row * 2 + 1]]);
        }
        let read_back = graph.get_nodes_attr("position", Some(&keys)).unwrap();
        prop_assert_eq!(read_back, positions);
    }
}
