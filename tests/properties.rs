use gexf_layout::config::{ForceConfig, LabelConfig, OverlapConfig, ShapeKind};
use gexf_layout::{
    ForceDirectedLayout, GraphStore, LabelAdjuster, LayoutParameters, NoProgress, Node, NodeId,
    OverlapResolver, Pipeline,
};
use proptest::prelude::*;

type RawGraph = (Vec<(f64, f64)>, Vec<(usize, usize)>);

fn raw_graph(max_nodes: usize) -> impl Strategy<Value = RawGraph> {
    (0..max_nodes).prop_flat_map(|n| {
        let points = prop::collection::vec((-100.0f64..100.0, -100.0f64..100.0), n);
        let edges = if n == 0 {
            Just(Vec::new()).boxed()
        } else {
            prop::collection::vec((0..n, 0..n), 0..(2 * n)).boxed()
        };
        (points, edges)
    })
}

fn build((points, edges): &RawGraph) -> GraphStore {
    let mut store = GraphStore::new();
    for (i, &(x, y)) in points.iter().enumerate() {
        store
            .add_node(Node::new(format!("n{i}")).with_label(format!("node {i}")), x, y)
            .unwrap();
    }
    for &(s, t) in edges {
        store
            .add_edge_by_id(NodeId(s as u32), NodeId(t as u32), 1.0)
            .unwrap();
    }
    store
}

fn quick_params() -> LayoutParameters {
    let mut params = LayoutParameters::default();
    params.force.max_iterations = 40;
    params.overlap.max_iterations = 10;
    params.labels.max_iterations = 10;
    params
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn force_layout_is_deterministic(graph in raw_graph(12)) {
        let layout = ForceDirectedLayout::new(ForceConfig {
            max_iterations: 40,
            ..ForceConfig::default()
        });
        let mut first = build(&graph);
        let mut second = build(&graph);
        let r1 = layout.run(&mut first, &mut NoProgress).unwrap();
        let r2 = layout.run(&mut second, &mut NoProgress).unwrap();

        prop_assert_eq!(r1, r2);
        prop_assert_eq!(first.positions_x(), second.positions_x());
        prop_assert_eq!(first.positions_y(), second.positions_y());
    }

    #[test]
    fn pipeline_preserves_topology(graph in raw_graph(10)) {
        let input = build(&graph);
        let keys: Vec<String> = input.nodes().map(|(_, n)| n.key.clone()).collect();
        let edges: Vec<(NodeId, NodeId)> = input.edges().map(|e| (e.source, e.target)).collect();

        let mut pipeline = Pipeline::new(input, quick_params());
        pipeline.run_stages(&mut NoProgress).unwrap();
        let output = pipeline.store();

        let out_keys: Vec<String> = output.nodes().map(|(_, n)| n.key.clone()).collect();
        let out_edges: Vec<(NodeId, NodeId)> = output.edges().map(|e| (e.source, e.target)).collect();
        prop_assert_eq!(keys, out_keys);
        prop_assert_eq!(edges, out_edges);
    }

    #[test]
    fn overlap_respects_cap_and_never_grows(
        graph in raw_graph(16),
        cap in 0u32..8,
        boxes in any::<bool>(),
    ) {
        let mut store = build(&graph);
        let resolver = OverlapResolver::new(OverlapConfig {
            max_iterations: cap,
            shape: if boxes { ShapeKind::Box } else { ShapeKind::Circle },
            ..OverlapConfig::default()
        });
        let report = resolver.run(&mut store, &mut NoProgress).unwrap();

        prop_assert!(report.iterations <= cap);
        prop_assert_eq!(report.area_history.len(), report.iterations as usize + 1);
        for pair in report.area_history.windows(2) {
            prop_assert!(pair[1] <= pair[0]);
        }
        prop_assert!(report.final_area <= report.initial_area);
    }

    #[test]
    fn label_adjust_respects_cap_and_never_grows(graph in raw_graph(16), cap in 0u32..8) {
        let mut store = build(&graph);
        let adjuster = LabelAdjuster::new(LabelConfig {
            max_iterations: cap,
            ..LabelConfig::default()
        });
        let report = adjuster.run(&mut store, &mut NoProgress).unwrap();

        prop_assert!(report.iterations <= cap);
        prop_assert_eq!(report.area_history.len(), report.iterations as usize + 1);
        for pair in report.area_history.windows(2) {
            prop_assert!(pair[1] <= pair[0]);
        }
        prop_assert!(report.final_area <= report.initial_area);
    }
}
