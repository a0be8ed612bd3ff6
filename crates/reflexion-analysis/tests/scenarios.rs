//! End-to-end reflexion scenarios.
//!
//! Each test builds small implementation, architecture, and mapping graphs,
//! runs the engine, and checks the resulting states, counters, and the
//! change events observers received.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;
use reflexion_analysis::{
    ChangeEvent, Reflexion, ReflexionConfig, ReflexionError, State, MAPS_TO_EDGE_TYPE,
    OPTIONAL_TOGGLE,
};
use reflexion_core::{Edge, EdgeId, Graph, Node, NodeId};

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

struct Fixture {
    implementation: Graph,
    architecture: Graph,
    mapping: Graph,
}

impl Fixture {
    fn new() -> Self {
        Fixture {
            implementation: Graph::new("implementation"),
            architecture: Graph::new("architecture"),
            mapping: Graph::new("mapping"),
        }
    }

    fn impl_node(&mut self, name: &str, parent: Option<&str>) -> NodeId {
        add(&mut self.implementation, name, "Class", parent)
    }

    fn arch_node(&mut self, name: &str, parent: Option<&str>) -> NodeId {
        add(&mut self.architecture, name, "Component", parent)
    }

    fn impl_edge(&mut self, source: &str, target: &str, edge_type: &str) -> EdgeId {
        connect(&mut self.implementation, source, target, edge_type)
    }

    fn spec_edge(&mut self, source: &str, target: &str, edge_type: &str) -> EdgeId {
        connect(&mut self.architecture, source, target, edge_type)
    }

    fn map(&mut self, from: &str, to: &str) {
        let source = proxy(&mut self.mapping, from);
        let target = proxy(&mut self.mapping, to);
        self.mapping
            .add_edge(source, target, Edge::new(MAPS_TO_EDGE_TYPE))
            .unwrap();
    }

    fn engine(self) -> Reflexion {
        self.engine_with(ReflexionConfig::default())
    }

    fn engine_with(self, config: ReflexionConfig) -> Reflexion {
        Reflexion::new(self.implementation, self.architecture, self.mapping, config).unwrap()
    }
}

fn add(graph: &mut Graph, name: &str, node_type: &str, parent: Option<&str>) -> NodeId {
    let id = graph.add_node(Node::new(name, node_type)).unwrap();
    if let Some(parent) = parent {
        let parent = graph.try_get_node(parent).unwrap();
        graph.add_child(parent, id).unwrap();
    }
    id
}

fn connect(graph: &mut Graph, source: &str, target: &str, edge_type: &str) -> EdgeId {
    let s = graph.try_get_node(source).unwrap();
    let t = graph.try_get_node(target).unwrap();
    graph.add_edge(s, t, Edge::new(edge_type)).unwrap()
}

fn proxy(graph: &mut Graph, name: &str) -> NodeId {
    match graph.try_get_node(name) {
        Some(id) => id,
        None => graph.add_node(Node::new(name, "Proxy")).unwrap(),
    }
}

fn record(engine: &mut Reflexion) -> Rc<RefCell<Vec<ChangeEvent>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = events.clone();
    engine.register(move |event: &ChangeEvent| sink.borrow_mut().push(event.clone()));
    events
}

fn rendered(events: &Rc<RefCell<Vec<ChangeEvent>>>) -> Vec<String> {
    events.borrow().iter().map(|e| e.to_string()).collect()
}

/// (state, counter) of the architecture edge with the given key and kind.
fn lookup(engine: &Reflexion, key: &str, specified: bool) -> Option<(State, i64)> {
    engine
        .report()
        .unwrap()
        .edges
        .into_iter()
        .find(|e| e.key == key && e.specified == specified)
        .map(|e| (e.state, e.counter))
}

/// Sorted (key, specified, state, counter) tuples of every architecture edge.
fn canonical(engine: &Reflexion) -> Vec<(String, bool, i64, i64)> {
    let mut edges: Vec<_> = engine
        .report()
        .unwrap()
        .edges
        .into_iter()
        .map(|e| (e.key, e.specified, e.state.as_int(), e.counter))
        .collect();
    edges.sort();
    edges
}

/// a, b mapped onto A, B; c is an unmapped child of a.
fn two_components(specified: bool) -> Fixture {
    let mut f = Fixture::new();
    f.impl_node("a", None);
    f.impl_node("b", None);
    f.impl_node("c", Some("a"));
    f.arch_node("A", None);
    f.arch_node("B", None);
    if specified {
        f.spec_edge("A", "B", "Call");
    }
    f.map("a", "A");
    f.map("b", "B");
    f
}

// ---------------------------------------------------------------------------
// Basic classification
// ---------------------------------------------------------------------------

#[test]
fn specified_and_implemented_is_convergent() {
    let mut f = two_components(true);
    f.impl_edge("a", "b", "Call");
    let mut engine = f.engine();
    let events = record(&mut engine);
    engine.run().unwrap();

    assert_eq!(lookup(&engine, "Call#A#B", true), Some((State::Convergent, 1)));
    assert_eq!(lookup(&engine, "Call#A#B", false), Some((State::Allowed, 1)));
    assert_eq!(
        rendered(&events),
        vec![
            "propagated edge added: Call#A#B",
            "state changed specified -> convergent: Call#A#B",
            "state changed undefined -> allowed: Call#A#B",
        ]
    );
}

#[test]
fn unspecified_dependency_is_divergent() {
    let mut f = two_components(false);
    f.impl_edge("a", "b", "Call");
    let mut engine = f.engine();
    engine.run().unwrap();

    assert_eq!(engine.architecture().edge_count(), 1);
    assert_eq!(lookup(&engine, "Call#A#B", false), Some((State::Divergent, 1)));
    let summary = engine.summary().unwrap();
    assert_eq!(summary.divergent, 1);
    assert!(!summary.is_consistent());
}

#[test]
fn unmapped_child_inherits_parent_mapping() {
    let mut direct = two_components(true);
    direct.impl_edge("a", "b", "Call");
    let mut direct = direct.engine();
    direct.run().unwrap();

    let mut via_child = two_components(true);
    via_child.impl_edge("c", "b", "Call");
    let mut via_child = via_child.engine();
    via_child.run().unwrap();

    let c = via_child.implementation().try_get_node("c").unwrap();
    let arch_a = via_child.architecture().try_get_node("A").unwrap();
    assert!(!via_child.is_explicitly_mapped(c));
    assert_eq!(via_child.explicit_target(c), None);
    assert_eq!(via_child.maps_to(c), Some(arch_a));
    assert_eq!(canonical(&via_child), canonical(&direct));
}

#[test]
fn unimplemented_specified_edge_is_absent() {
    let mut f = two_components(true);
    f.spec_edge("B", "A", "Call");
    let optional = f.spec_edge("A", "B", "Use");
    f.architecture
        .edge_mut(optional)
        .unwrap()
        .attributes
        .set_toggle(OPTIONAL_TOGGLE);
    let mut engine = f.engine();
    engine.run().unwrap();

    assert_eq!(lookup(&engine, "Call#A#B", true), Some((State::Absent, 0)));
    assert_eq!(lookup(&engine, "Call#B#A", true), Some((State::Absent, 0)));
    assert_eq!(lookup(&engine, "Use#A#B", true), Some((State::AllowedAbsent, 0)));
    assert_eq!(engine.summary().unwrap().absent, 2);
}

#[test]
fn counters_aggregate_contributing_dependencies() {
    let mut f = two_components(true);
    f.impl_edge("a", "b", "Call");
    f.impl_edge("c", "b", "Call");
    f.impl_edge("c", "b", "Use");
    let mut engine = f.engine();
    engine.run().unwrap();

    assert_eq!(lookup(&engine, "Call#A#B", true), Some((State::Convergent, 2)));
    assert_eq!(lookup(&engine, "Call#A#B", false), Some((State::Allowed, 2)));
    assert_eq!(lookup(&engine, "Use#A#B", false), Some((State::Divergent, 1)));
}

#[test]
fn self_use_is_implicitly_allowed() {
    let mut f = two_components(false);
    f.spec_edge("A", "A", "Call");
    f.impl_edge("c", "a", "Call");
    f.impl_edge("a", "c", "Use");
    let mut engine = f.engine();
    engine.run().unwrap();

    assert_eq!(lookup(&engine, "Call#A#A", false), Some((State::ImplicitlyAllowed, 1)));
    assert_eq!(lookup(&engine, "Use#A#A", false), Some((State::ImplicitlyAllowed, 1)));
    // The covering specified self-dependency is still counted.
    assert_eq!(lookup(&engine, "Call#A#A", true), Some((State::Convergent, 1)));
}

#[test]
fn dependency_onto_parent_depends_on_policy() {
    let build = || {
        let mut f = Fixture::new();
        f.arch_node("P", None);
        f.arch_node("C", Some("P"));
        f.impl_node("x", None);
        f.impl_node("y", None);
        f.impl_edge("x", "y", "Call");
        f.map("x", "C");
        f.map("y", "P");
        f
    };

    let mut allowed = build().engine();
    allowed.run().unwrap();
    assert_eq!(lookup(&allowed, "Call#C#P", false), Some((State::ImplicitlyAllowed, 1)));

    let config = ReflexionConfig {
        allow_dependencies_to_parents: false,
        ..ReflexionConfig::default()
    };
    let mut strict = build().engine_with(config);
    strict.run().unwrap();
    assert_eq!(lookup(&strict, "Call#C#P", false), Some((State::Divergent, 1)));
}

#[test]
fn lifting_finds_specified_edge_between_ancestors() {
    let mut f = Fixture::new();
    f.arch_node("P1", None);
    f.arch_node("C1", Some("P1"));
    f.arch_node("P2", None);
    f.arch_node("C2", Some("P2"));
    f.spec_edge("P1", "P2", "Call");
    f.impl_node("x", None);
    f.impl_node("y", None);
    f.impl_edge("x", "y", "Call");
    f.map("x", "C1");
    f.map("y", "C2");
    let mut engine = f.engine();
    engine.run().unwrap();

    assert_eq!(lookup(&engine, "Call#P1#P2", true), Some((State::Convergent, 1)));
    assert_eq!(lookup(&engine, "Call#C1#C2", false), Some((State::Allowed, 1)));
}

#[test]
fn specified_supertype_covers_subtype_dependency() {
    let build = || {
        let mut f = two_components(true);
        f.impl_edge("a", "b", "Dispatching_Call");
        f
    };

    let mut hierarchy = IndexMap::new();
    hierarchy.insert("Dispatching_Call".to_string(), "Call".to_string());
    let config = ReflexionConfig {
        edge_type_hierarchy: hierarchy,
        ..ReflexionConfig::default()
    };
    let mut typed = build().engine_with(config);
    typed.run().unwrap();
    assert_eq!(lookup(&typed, "Call#A#B", true), Some((State::Convergent, 1)));
    assert_eq!(lookup(&typed, "Dispatching_Call#A#B", false), Some((State::Allowed, 1)));

    let mut flat = build().engine();
    flat.run().unwrap();
    assert_eq!(lookup(&flat, "Call#A#B", true), Some((State::Absent, 0)));
    assert_eq!(lookup(&flat, "Dispatching_Call#A#B", false), Some((State::Divergent, 1)));
}

#[test]
fn irrelevant_nodes_are_skipped() {
    let mut f = two_components(true);
    f.impl_edge("c", "b", "Call");
    let c = f.implementation.try_get_node("c").unwrap();
    f.implementation
        .node_mut(c)
        .unwrap()
        .attributes
        .set_toggle("Is_Artificial");
    let config = ReflexionConfig {
        irrelevant_node_toggles: vec!["Is_Artificial".into()],
        ..ReflexionConfig::default()
    };
    let mut engine = f.engine_with(config);
    engine.run().unwrap();

    assert_eq!(engine.architecture().edge_count(), 1);
    assert_eq!(lookup(&engine, "Call#A#B", true), Some((State::Absent, 0)));
}

#[test]
fn unknown_mapping_endpoint_fails_the_run() {
    let mut f = two_components(true);
    f.map("ghost", "A");
    let mut engine = f.engine();
    assert_eq!(
        engine.run(),
        Err(ReflexionError::UnknownNode {
            graph: "implementation",
            link_name: "ghost".into()
        })
    );
}

// ---------------------------------------------------------------------------
// Re-running
// ---------------------------------------------------------------------------

#[test]
fn second_from_scratch_is_silent() {
    let mut f = two_components(true);
    f.impl_edge("a", "b", "Call");
    f.impl_edge("c", "a", "Call");
    f.impl_edge("b", "a", "Use");
    let mut engine = f.engine();
    engine.run().unwrap();
    let before = canonical(&engine);

    let events = record(&mut engine);
    engine.from_scratch().unwrap();
    assert!(events.borrow().is_empty());
    assert_eq!(canonical(&engine), before);

    engine.run().unwrap();
    assert!(events.borrow().is_empty());
    assert_eq!(canonical(&engine), before);
}

#[test]
fn removed_dependency_disappears_on_rerun() {
    let mut f = two_components(true);
    f.impl_edge("a", "b", "Call");
    let mut engine = f.engine();
    engine.run().unwrap();

    let (mut implementation, architecture, mapping) = engine.into_graphs();
    let edge = implementation.edges().next().unwrap();
    implementation.remove_edge(edge).unwrap();

    let mut engine =
        Reflexion::new(implementation, architecture, mapping, ReflexionConfig::default()).unwrap();
    let events = record(&mut engine);
    engine.run().unwrap();

    assert_eq!(engine.architecture().edge_count(), 1);
    assert_eq!(lookup(&engine, "Call#A#B", true), Some((State::Absent, 0)));
    let removals = events
        .borrow()
        .iter()
        .filter(|e| matches!(e, ChangeEvent::PropagatedEdgeRemoved { .. }))
        .count();
    assert_eq!(removals, 1);
    assert_eq!(
        rendered(&events),
        vec![
            "state changed convergent -> absent: Call#A#B",
            "propagated edge removed: Call#A#B",
        ]
    );
}

// ---------------------------------------------------------------------------
// Incremental edits
// ---------------------------------------------------------------------------

#[test]
fn deleting_a_dependency_matches_rerun() {
    let mut f = two_components(true);
    let edge = f.impl_edge("a", "b", "Call");
    let mut engine = f.engine();
    engine.run().unwrap();

    let events = record(&mut engine);
    engine.delete_from_dependencies(edge).unwrap();

    assert_eq!(engine.architecture().edge_count(), 1);
    assert_eq!(lookup(&engine, "Call#A#B", true), Some((State::Absent, 0)));
    assert_eq!(
        rendered(&events),
        vec![
            "implementation edge removed: Call#a#b",
            "propagated edge removed: Call#A#B",
            "state changed convergent -> absent: Call#A#B",
        ]
    );

    let mut fresh = two_components(true).engine();
    fresh.run().unwrap();
    assert_eq!(canonical(&engine), canonical(&fresh));
}

#[test]
fn adding_a_dependency_matches_rerun() {
    let mut engine = two_components(true).engine();
    engine.run().unwrap();
    engine.add_to_dependencies("c", "b", "Call").unwrap();
    engine.add_to_dependencies("b", "c", "Call").unwrap();

    let mut f = two_components(true);
    f.impl_edge("c", "b", "Call");
    f.impl_edge("b", "c", "Call");
    let mut fresh = f.engine();
    fresh.run().unwrap();

    assert_eq!(canonical(&engine), canonical(&fresh));
    assert_eq!(lookup(&engine, "Call#B#A", false), Some((State::Divergent, 1)));
}

#[test]
fn mapping_a_child_remaps_its_dependencies() {
    let build = |map_child: bool| {
        let mut f = two_components(true);
        f.arch_node("C", None);
        f.impl_edge("c", "b", "Call");
        if map_child {
            f.map("c", "C");
        }
        f
    };
    let mut engine = build(false).engine();
    engine.run().unwrap();
    let before = canonical(&engine);

    let events = record(&mut engine);
    engine.add_to_mapping("c", "C").unwrap();
    assert_eq!(rendered(&events)[0], "mapping added: Maps_To#c#C");
    assert_eq!(lookup(&engine, "Call#A#B", true), Some((State::Absent, 0)));
    assert_eq!(lookup(&engine, "Call#C#B", false), Some((State::Divergent, 1)));

    let c = engine.implementation().try_get_node("c").unwrap();
    let arch_c = engine.architecture().try_get_node("C").unwrap();
    assert_eq!(engine.explicit_target(c), Some(arch_c));

    let mut fresh = build(true).engine();
    fresh.run().unwrap();
    assert_eq!(canonical(&engine), canonical(&fresh));

    engine.delete_from_mapping("c").unwrap();
    let log = rendered(&events);
    assert!(log.contains(&"mapping removed: Maps_To#c#C".to_string()));
    assert!(log.contains(&"propagated edge removed: Call#C#B".to_string()));
    assert_eq!(log.last().map(String::as_str), Some("state changed undefined -> allowed: Call#A#B"));
    assert_eq!(canonical(&engine), before);
    assert!(!engine.is_explicitly_mapped(c));
}

#[test]
fn mapping_onto_the_inherited_target_moves_nothing() {
    let mut f = two_components(true);
    f.impl_edge("c", "b", "Call");
    let mut engine = f.engine();
    engine.run().unwrap();
    let before = canonical(&engine);

    let events = record(&mut engine);
    engine.add_to_mapping("c", "A").unwrap();
    assert_eq!(rendered(&events), vec!["mapping added: Maps_To#c#A"]);
    assert_eq!(canonical(&engine), before);
    let c = engine.implementation().try_get_node("c").unwrap();
    assert!(engine.is_explicitly_mapped(c));

    engine.delete_from_mapping("c").unwrap();
    assert_eq!(
        rendered(&events),
        vec!["mapping added: Maps_To#c#A", "mapping removed: Maps_To#c#A"]
    );
    assert_eq!(canonical(&engine), before);
    assert!(!engine.is_explicitly_mapped(c));
}

#[test]
fn unmapping_a_divergent_source_only_removes_its_edge() {
    let mut f = two_components(true);
    f.impl_edge("b", "a", "Call");
    let mut engine = f.engine();
    engine.run().unwrap();
    assert_eq!(lookup(&engine, "Call#B#A", false), Some((State::Divergent, 1)));

    let events = record(&mut engine);
    engine.delete_from_mapping("b").unwrap();
    assert_eq!(
        rendered(&events),
        vec!["mapping removed: Maps_To#b#B", "propagated edge removed: Call#B#A"]
    );
    assert_eq!(engine.architecture().edge_count(), 1);
}

#[test]
fn unmapping_a_root_unmaps_its_subtree() {
    let mut f = two_components(true);
    f.impl_edge("c", "b", "Call");
    let mut engine = f.engine();
    engine.run().unwrap();

    engine.delete_from_mapping("a").unwrap();
    let c = engine.implementation().try_get_node("c").unwrap();
    assert_eq!(engine.maps_to(c), None);
    assert_eq!(engine.architecture().edge_count(), 1);
    assert_eq!(lookup(&engine, "Call#A#B", true), Some((State::Absent, 0)));
}

#[test]
fn mapping_edit_errors() {
    let mut engine = two_components(true).engine();
    engine.run().unwrap();

    assert_eq!(
        engine.add_to_mapping("a", "B"),
        Err(ReflexionError::AlreadyMapped {
            link_name: "a".into(),
            target: "A".into()
        })
    );
    assert_eq!(
        engine.delete_from_mapping("c"),
        Err(ReflexionError::NotMapped {
            link_name: "c".into()
        })
    );
    assert!(matches!(
        engine.add_to_mapping("zz", "A"),
        Err(ReflexionError::UnknownNode { graph: "implementation", .. })
    ));
    assert!(matches!(
        engine.add_to_mapping("c", "ZZ"),
        Err(ReflexionError::UnknownNode { graph: "architecture", .. })
    ));
}

#[test]
fn structural_edits_are_unsupported() {
    let mut engine = two_components(true).engine();
    engine.run().unwrap();
    let unsupported = |result: Result<(), ReflexionError>| {
        assert!(matches!(result, Err(ReflexionError::Unsupported { .. })));
    };

    unsupported(engine.add_node_to_implementation(Node::new("n", "Class")).map(|_| ()));
    unsupported(engine.delete_node_from_implementation("a"));
    unsupported(engine.add_node_to_architecture(Node::new("N", "Component")).map(|_| ()));
    unsupported(engine.delete_node_from_architecture("A"));
    unsupported(engine.add_to_hierarchy("b", "a"));
    unsupported(engine.delete_from_hierarchy("c"));
}

// ---------------------------------------------------------------------------
// Architecture edits
// ---------------------------------------------------------------------------

/// a1 contains a'1, a2 contains a'2; i1 and i2 map onto the inner components
/// and the only specified edge runs between the outer ones.
fn nested_components() -> Fixture {
    let mut f = Fixture::new();
    f.impl_node("i1", None);
    f.impl_node("i2", None);
    f.arch_node("a1", None);
    f.arch_node("a'1", Some("a1"));
    f.arch_node("a2", None);
    f.arch_node("a'2", Some("a2"));
    f.spec_edge("a1", "a2", "Call");
    f.map("i1", "a'1");
    f.map("i2", "a'2");
    f
}

fn specified_edge(engine: &Reflexion, key: &str) -> EdgeId {
    engine
        .architecture()
        .edges()
        .find(|&e| {
            engine.architecture().edge_key(e).unwrap() == key && engine.state(e).unwrap().is_specified()
        })
        .unwrap()
}

#[test]
fn simple_architecture_edge_change() {
    let mut engine = nested_components().engine();
    engine.run().unwrap();
    assert_eq!(lookup(&engine, "Call#a1#a2", true), Some((State::Absent, 0)));
    let events = record(&mut engine);

    let edge = specified_edge(&engine, "Call#a1#a2");
    engine.delete_from_architecture(edge).unwrap();
    assert_eq!(rendered(&events), vec!["architecture edge removed: Call#a1#a2"]);
    events.borrow_mut().clear();

    engine.add_to_architecture("a1", "a2", "Call").unwrap();
    assert_eq!(
        rendered(&events),
        vec![
            "architecture edge added: Call#a1#a2",
            "state changed specified -> absent: Call#a1#a2",
        ]
    );
    events.borrow_mut().clear();

    engine.add_to_dependencies("i1", "i2", "Call").unwrap();
    assert_eq!(
        rendered(&events),
        vec![
            "implementation edge added: Call#i1#i2",
            "propagated edge added: Call#a'1#a'2",
            "state changed absent -> convergent: Call#a1#a2",
            "state changed undefined -> allowed: Call#a'1#a'2",
        ]
    );
    events.borrow_mut().clear();

    let edge = specified_edge(&engine, "Call#a1#a2");
    engine.delete_from_architecture(edge).unwrap();
    assert_eq!(
        rendered(&events),
        vec![
            "architecture edge removed: Call#a1#a2",
            "state changed allowed -> divergent: Call#a'1#a'2",
        ]
    );
    assert_eq!(lookup(&engine, "Call#a'1#a'2", false), Some((State::Divergent, 1)));
    events.borrow_mut().clear();

    engine.add_to_architecture("a1", "a2", "Call").unwrap();
    assert_eq!(
        rendered(&events),
        vec![
            "architecture edge added: Call#a1#a2",
            "state changed specified -> convergent: Call#a1#a2",
            "state changed divergent -> allowed: Call#a'1#a'2",
        ]
    );
    assert_eq!(lookup(&engine, "Call#a1#a2", true), Some((State::Convergent, 1)));

    let mut f = nested_components();
    f.impl_edge("i1", "i2", "Call");
    let mut fresh = f.engine();
    fresh.run().unwrap();
    assert_eq!(canonical(&engine), canonical(&fresh));
}

#[test]
fn inner_architecture_edge_takes_over_the_lift() {
    let mut f = nested_components();
    f.impl_edge("i1", "i2", "Call");
    let mut engine = f.engine();
    engine.run().unwrap();
    let events = record(&mut engine);

    let inner = engine.add_to_architecture("a'1", "a2", "Call").unwrap();
    assert_eq!(
        rendered(&events),
        vec![
            "architecture edge added: Call#a'1#a2",
            "state changed convergent -> absent: Call#a1#a2",
            "state changed specified -> convergent: Call#a'1#a2",
        ]
    );
    assert_eq!(lookup(&engine, "Call#a'1#a2", true), Some((State::Convergent, 1)));
    assert_eq!(lookup(&engine, "Call#a'1#a'2", false), Some((State::Allowed, 1)));

    let mut fresh = nested_components();
    fresh.impl_edge("i1", "i2", "Call");
    fresh.spec_edge("a'1", "a2", "Call");
    let mut fresh = fresh.engine();
    fresh.run().unwrap();
    assert_eq!(canonical(&engine), canonical(&fresh));

    events.borrow_mut().clear();
    engine.delete_from_architecture(inner).unwrap();
    assert_eq!(
        rendered(&events),
        vec![
            "architecture edge removed: Call#a'1#a2",
            "state changed absent -> convergent: Call#a1#a2",
        ]
    );
    assert_eq!(lookup(&engine, "Call#a1#a2", true), Some((State::Convergent, 1)));
}

#[test]
fn architecture_edges_added_before_a_run_are_classified_by_it() {
    let mut f = nested_components();
    f.impl_edge("i1", "i2", "Call");
    let mut engine = f.engine();
    let events = record(&mut engine);
    engine.add_to_architecture("a2", "a1", "Call").unwrap();
    assert_eq!(rendered(&events), vec!["architecture edge added: Call#a2#a1"]);

    engine.run().unwrap();
    assert_eq!(lookup(&engine, "Call#a2#a1", true), Some((State::Absent, 0)));
    assert_eq!(lookup(&engine, "Call#a1#a2", true), Some((State::Convergent, 1)));
}

#[test]
fn architecture_edit_errors() {
    let mut f = nested_components();
    f.impl_edge("i1", "i2", "Call");
    let mut engine = f.engine();
    engine.run().unwrap();

    let propagated = engine
        .architecture()
        .edges()
        .find(|&e| engine.state(e).unwrap().is_propagated())
        .unwrap();
    assert_eq!(
        engine.delete_from_architecture(propagated),
        Err(ReflexionError::NotSpecified {
            key: "Call#a'1#a'2".into()
        })
    );
    assert!(matches!(
        engine.add_to_architecture("a1", "zz", "Call"),
        Err(ReflexionError::UnknownNode { graph: "architecture", .. })
    ));
    assert!(matches!(
        engine.delete_from_architecture(EdgeId(99)),
        Err(ReflexionError::Core(_))
    ));
    assert_eq!(engine.architecture().edge_count(), 2);
}
