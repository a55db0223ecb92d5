//! Strongly-connected-component analysis of the message reference graph.
//!
//! The graph has an edge `A -> B` iff some non-map field of `A` has message
//! type `B` (groups count as messages; a map field's synthetic entry is not
//! an edge). Components are computed with an iterative single-pass Tarjan
//! walk using an explicit frame stack, then aggregate facts are folded up
//! from child components.
//!
//! Results are memoized: the first query walks everything reachable from the
//! queried descriptor, later queries are lookups. Iteration order everywhere
//! is tie-broken by `full_name` so results never depend on container order.

use std::collections::HashMap;

use itertools::Itertools;
use log::debug;

use crate::descriptor::{CppType, Descriptor};
use crate::proto::CType;

/// Aggregate facts for one component, folded over its children.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SccProps {
    /// The component has two or more members, or a member references its own
    /// component.
    pub is_recursive: bool,
    pub contains_required: bool,
    pub contains_extension: bool,
    pub contains_weak: bool,
    pub contains_cord: bool,
}

/// One strongly connected component. `descriptors` is sorted by full name;
/// the first entry is the representative.
pub struct Scc<'a> {
    pub descriptors: Vec<Descriptor<'a>>,
    pub children: Vec<SccId>,
    pub props: SccProps,
}

impl<'a> Scc<'a> {
    pub fn representative(&self) -> Descriptor<'a> {
        self.descriptors[0]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SccId(usize);

#[derive(Default)]
pub struct SccAnalyzer<'a> {
    sccs: Vec<Scc<'a>>,
    assignment: HashMap<Descriptor<'a>, SccId>,
}

struct Frame<'a> {
    node: Descriptor<'a>,
    edges: Vec<Descriptor<'a>>,
    next_edge: usize,
}

impl<'a> SccAnalyzer<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scc(&self, id: SccId) -> &Scc<'a> {
        &self.sccs[id.0]
    }

    /// Component of `descriptor`, computing (and caching) everything
    /// reachable from it on first use.
    pub fn get_scc(&mut self, descriptor: Descriptor<'a>) -> &Scc<'a> {
        let id = self.get_scc_id(descriptor);
        &self.sccs[id.0]
    }

    pub fn get_scc_id(&mut self, descriptor: Descriptor<'a>) -> SccId {
        if let Some(&id) = self.assignment.get(&descriptor) {
            return id;
        }
        self.run_tarjan(descriptor);
        self.assignment[&descriptor]
    }

    /// Message-type references of `node`, deduplicated and ordered by full
    /// name for determinism.
    fn edges(node: Descriptor<'a>) -> Vec<Descriptor<'a>> {
        node.fields()
            .filter(|f| !f.is_map() && f.cpp_type() == CppType::Message)
            .filter_map(|f| f.message_type())
            .sorted_by(|a, b| a.full_name().cmp(b.full_name()))
            .dedup_by(|a, b| a.full_name() == b.full_name())
            .collect()
    }

    fn run_tarjan(&mut self, root: Descriptor<'a>) {
        // Per-run Tarjan state. Nodes already assigned to a component from a
        // previous run cannot be in any new component (they would have been
        // discovered then), so they are treated as finished children.
        let mut order: HashMap<Descriptor<'a>, usize> = HashMap::new();
        let mut lowlink: HashMap<Descriptor<'a>, usize> = HashMap::new();
        let mut on_stack: HashMap<Descriptor<'a>, bool> = HashMap::new();
        let mut stack: Vec<Descriptor<'a>> = Vec::new();
        let mut frames: Vec<Frame<'a>> = Vec::new();
        let mut counter = 0usize;

        order.insert(root, counter);
        lowlink.insert(root, counter);
        counter += 1;
        stack.push(root);
        on_stack.insert(root, true);
        frames.push(Frame {
            node: root,
            edges: Self::edges(root),
            next_edge: 0,
        });

        while let Some(frame) = frames.last_mut() {
            let node = frame.node;
            if frame.next_edge < frame.edges.len() {
                let target = frame.edges[frame.next_edge];
                frame.next_edge += 1;
                if self.assignment.contains_key(&target) {
                    // Finished in an earlier run.
                    continue;
                }
                if let Some(&target_order) = order.get(&target) {
                    if on_stack.get(&target).copied().unwrap_or(false) {
                        let low = lowlink[&node].min(target_order);
                        lowlink.insert(node, low);
                    }
                    continue;
                }
                order.insert(target, counter);
                lowlink.insert(target, counter);
                counter += 1;
                stack.push(target);
                on_stack.insert(target, true);
                frames.push(Frame {
                    node: target,
                    edges: Self::edges(target),
                    next_edge: 0,
                });
                continue;
            }

            // All edges of `node` handled; close it out.
            let frame = frames.pop().expect("frame stack underflow");
            let node = frame.node;
            if let Some(parent) = frames.last() {
                let low = lowlink[&parent.node].min(lowlink[&node]);
                lowlink.insert(parent.node, low);
            }
            if lowlink[&node] == order[&node] {
                // `node` is the root of a completed component.
                let mut members = Vec::new();
                loop {
                    let member = stack.pop().expect("SCC stack underflow");
                    on_stack.insert(member, false);
                    members.push(member);
                    if member == node {
                        break;
                    }
                }
                self.finish_scc(members);
            }
        }
    }

    fn finish_scc(&mut self, mut members: Vec<Descriptor<'a>>) {
        assert!(!members.is_empty(), "empty SCC");
        members.sort_by(|a, b| a.full_name().cmp(b.full_name()));

        let id = SccId(self.sccs.len());
        for &member in &members {
            self.assignment.insert(member, id);
        }

        // Child components, in representative order, deduplicated.
        let children: Vec<SccId> = members
            .iter()
            .flat_map(|&m| Self::edges(m))
            .filter_map(|target| {
                let child = *self.assignment.get(&target)?;
                (child != id).then_some(child)
            })
            .sorted_by(|a, b| {
                let ra = self.sccs[a.0].representative().full_name();
                let rb = self.sccs[b.0].representative().full_name();
                ra.cmp(rb)
            })
            .dedup()
            .collect();

        let mut props = SccProps::default();
        props.is_recursive = members.len() >= 2
            || members.iter().any(|m| {
                Self::edges(*m)
                    .iter()
                    .any(|t| self.assignment.get(t) == Some(&id))
            });
        for &member in &members {
            for field in member.fields() {
                if field.is_required() {
                    props.contains_required = true;
                }
                if field.is_weak() {
                    props.contains_weak = true;
                }
                if matches!(field.cpp_type(), CppType::String | CppType::Bytes)
                    && field.ctype() == CType::Cord
                {
                    props.contains_cord = true;
                }
            }
            if member.is_extendable() {
                props.contains_extension = true;
            }
        }
        // Monotone fold over children.
        for &child in &children {
            let child_props = self.sccs[child.0].props;
            props.contains_required |= child_props.contains_required;
            props.contains_extension |= child_props.contains_extension;
            props.contains_weak |= child_props.contains_weak;
            props.contains_cord |= child_props.contains_cord;
        }

        debug!(
            "scc {}: {} member(s), {} child(ren), recursive={}",
            members[0].full_name(),
            members.len(),
            children.len(),
            props.is_recursive
        );

        self.sccs.push(Scc {
            descriptors: members,
            children,
            props,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::DescriptorPool;
    use crate::proto::*;

    fn message_field(name: &str, number: i32, type_name: &str) -> FieldDescriptorProto {
        FieldDescriptorProto {
            name: name.to_string(),
            number,
            r#type: Type::Message,
            type_name: type_name.to_string(),
            ..Default::default()
        }
    }

    fn file_with(messages: Vec<DescriptorProto>) -> FileDescriptorProto {
        FileDescriptorProto {
            name: "scc.proto".to_string(),
            package: "scc".to_string(),
            syntax: "proto2".to_string(),
            message_type: messages,
            ..Default::default()
        }
    }

    #[test]
    fn self_recursive_tree() {
        let file = file_with(vec![DescriptorProto {
            name: "Tree".to_string(),
            field: vec![
                message_field("left", 1, ".scc.Tree"),
                message_field("right", 2, ".scc.Tree"),
            ],
            ..Default::default()
        }]);
        let mut pool = DescriptorPool::new();
        pool.add_file(&file).unwrap();
        let tree = pool.message_by_name("scc.Tree").unwrap();

        let mut analyzer = SccAnalyzer::new();
        let scc = analyzer.get_scc(tree);
        assert!(scc.props.is_recursive);
        assert!(!scc.props.contains_required);
        assert_eq!(scc.descriptors.len(), 1);
    }

    #[test]
    fn mutual_recursion_collapses_to_one_component() {
        let file = file_with(vec![
            DescriptorProto {
                name: "A".to_string(),
                field: vec![message_field("b", 1, ".scc.B")],
                ..Default::default()
            },
            DescriptorProto {
                name: "B".to_string(),
                field: vec![message_field("a", 1, ".scc.A")],
                ..Default::default()
            },
        ]);
        let mut pool = DescriptorPool::new();
        pool.add_file(&file).unwrap();
        let a = pool.message_by_name("scc.A").unwrap();
        let b = pool.message_by_name("scc.B").unwrap();

        let mut analyzer = SccAnalyzer::new();
        let id_a = analyzer.get_scc_id(a);
        let id_b = analyzer.get_scc_id(b);
        assert_eq!(id_a, id_b);
        let scc = analyzer.scc(id_a);
        assert!(scc.props.is_recursive);
        assert_eq!(scc.representative().full_name(), "scc.A");
    }

    #[test]
    fn facts_fold_monotonically_from_children() {
        // Chain: Top -> Mid -> Leaf, with a required field and an extension
        // range only at the leaf.
        let file = file_with(vec![
            DescriptorProto {
                name: "Top".to_string(),
                field: vec![message_field("mid", 1, ".scc.Mid")],
                ..Default::default()
            },
            DescriptorProto {
                name: "Mid".to_string(),
                field: vec![message_field("leaf", 1, ".scc.Leaf")],
                ..Default::default()
            },
            DescriptorProto {
                name: "Leaf".to_string(),
                field: vec![FieldDescriptorProto {
                    name: "must".to_string(),
                    number: 1,
                    label: Label::Required,
                    r#type: Type::Int32,
                    ..Default::default()
                }],
                extension_range: vec![ExtensionRange { start: 100, end: 200 }],
                ..Default::default()
            },
        ]);
        let mut pool = DescriptorPool::new();
        pool.add_file(&file).unwrap();

        let mut analyzer = SccAnalyzer::new();
        let top = pool.message_by_name("scc.Top").unwrap();
        let top_scc = analyzer.get_scc(top);
        assert!(!top_scc.props.is_recursive);
        assert!(top_scc.props.contains_required, "fold from Leaf");
        assert!(top_scc.props.contains_extension, "fold from Leaf");

        // Facts(SCC) = selfFacts ∪ ⋃ Facts(child) for every child.
        let children = analyzer.get_scc(top).children.clone();
        for child in children {
            let child_props = analyzer.scc(child).props;
            let top_props = analyzer.get_scc(top).props;
            assert!(!child_props.contains_required || top_props.contains_required);
            assert!(!child_props.contains_extension || top_props.contains_extension);
            assert!(!child_props.contains_weak || top_props.contains_weak);
            assert!(!child_props.contains_cord || top_props.contains_cord);
        }
    }

    #[test]
    fn map_fields_do_not_create_edges() {
        let file = file_with(vec![DescriptorProto {
            name: "Holder".to_string(),
            field: vec![FieldDescriptorProto {
                name: "m".to_string(),
                number: 1,
                label: Label::Repeated,
                r#type: Type::Message,
                type_name: ".scc.Holder.MEntry".to_string(),
                ..Default::default()
            }],
            nested_type: vec![DescriptorProto {
                name: "MEntry".to_string(),
                options: Some(MessageOptions {
                    map_entry: true,
                    ..Default::default()
                }),
                field: vec![
                    FieldDescriptorProto {
                        name: "key".to_string(),
                        number: 1,
                        r#type: Type::String,
                        ..Default::default()
                    },
                    FieldDescriptorProto {
                        name: "value".to_string(),
                        number: 2,
                        r#type: Type::Message,
                        type_name: ".scc.Holder".to_string(),
                        ..Default::default()
                    },
                ],
                ..Default::default()
            }],
            ..Default::default()
        }]);
        let mut pool = DescriptorPool::new();
        pool.add_file(&file).unwrap();
        let holder = pool.message_by_name("scc.Holder").unwrap();

        let mut analyzer = SccAnalyzer::new();
        let scc = analyzer.get_scc(holder);
        assert!(
            !scc.props.is_recursive,
            "map edge must not make the holder recursive"
        );
    }

    #[test]
    fn queries_are_memoized() {
        let file = file_with(vec![DescriptorProto {
            name: "Solo".to_string(),
            field: vec![],
            ..Default::default()
        }]);
        let mut pool = DescriptorPool::new();
        pool.add_file(&file).unwrap();
        let solo = pool.message_by_name("scc.Solo").unwrap();

        let mut analyzer = SccAnalyzer::new();
        let first = analyzer.get_scc_id(solo);
        let second = analyzer.get_scc_id(solo);
        assert_eq!(first, second);
        assert_eq!(analyzer.sccs.len(), 1);
    }
}
