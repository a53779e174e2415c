use rand::rngs::StdRng;
use rand::SeedableRng;
use stepviz::{Edge, Graph, Point, StepError};
use test_case::test_case;

fn line_graph(n: usize) -> Graph {
    let mut graph = Graph::new();
    for i in 0..n {
        graph.add_node(Point::new(i as f32 * 40.0, 0.0));
    }
    for i in 1..n {
        graph.add_edge(i - 1, i).expect("nodes exist");
    }
    graph
}

#[test]
fn test_orientation_round_trip_keeps_edge_count() {
    let mut graph = line_graph(3);
    graph.set_directed(true);
    assert_eq!(graph.edge_count(), 2);
    graph.set_directed(false);
    assert_eq!(graph.edge_count(), 2);
    assert!(graph.edges().iter().all(|edge| !edge.directed && edge.u < edge.v));
    graph.set_directed(true);
    assert_eq!(graph.edge_count(), 2);
    assert!(graph.edges().iter().all(|edge| edge.directed));
}

#[test]
fn test_merging_to_undirected_keeps_first_pair() {
    let mut graph = Graph::with_orientation(true);
    for i in 0..3 {
        graph.add_node(Point::new(i as f32, 0.0));
    }
    graph.add_edge(1, 0).unwrap();
    graph.add_edge(0, 1).unwrap();
    graph.add_edge(1, 2).unwrap();
    assert_eq!(graph.edge_count(), 3);

    graph.set_directed(false);
    assert_eq!(graph.edges(), &[Edge::undirected(0, 1), Edge::undirected(1, 2)]);
}

#[test]
fn test_deleting_a_node_reindexes_edges() {
    let mut graph = line_graph(4);
    graph.remove_node(1).unwrap();

    assert_eq!(graph.node_count(), 3);
    let ids: Vec<usize> = graph.nodes().iter().map(|node| node.id).collect();
    assert_eq!(ids, vec![0, 1, 2]);
    assert_eq!(graph.edges(), &[Edge::undirected(1, 2)]);
    assert_eq!(graph.sorted_neighbors(0), Vec::<usize>::new());
    assert_eq!(graph.sorted_neighbors(2), vec![1]);
}

#[test_case(0, 0 ; "self loop")]
#[test_case(1, 0 ; "reversed duplicate")]
#[test_case(0, 1 ; "exact duplicate")]
fn test_rejected_edges_are_noops(u: usize, v: usize) {
    let mut graph = line_graph(2);
    let revision = graph.revision();
    assert_eq!(graph.add_edge(u, v), Ok(false));
    assert_eq!(graph.edge_count(), 1);
    assert_eq!(graph.revision(), revision);
}

#[test]
fn test_unknown_endpoints_are_errors() {
    let mut graph = line_graph(2);
    assert_eq!(graph.add_edge(0, 5), Err(StepError::UnknownNode(5)));
    assert_eq!(graph.remove_node(2), Err(StepError::UnknownNode(2)));
}

#[test]
fn test_seeded_orientation_is_reproducible() {
    let orient = |seed| {
        let mut graph = line_graph(8);
        graph.set_directed_with(true, &mut StdRng::seed_from_u64(seed));
        graph.edges().to_vec()
    };
    assert_eq!(orient(7), orient(7));
}

#[test]
fn test_adjacency_follows_edges() {
    let mut graph = line_graph(4);
    graph.add_edge(3, 0).unwrap();
    assert_eq!(graph.sorted_neighbors(0), vec![1, 3]);
    assert_eq!(graph.degree(3), 2);
    assert!(graph.remove_edge(0, 3));
    assert_eq!(graph.sorted_neighbors(0), vec![1]);
}
