//! Property-based tests for the ripple-core scheduler.
//!
//! Generates chains and fan-in graphs of random shape, drives them with random
//! sequences of pull and push activations, and checks the invariants that must
//! hold after every activation: the ready queue is empty, every activation
//! delivers exactly one buffer to the sink, and no node runs more often than
//! the data flowing through it requires.

use proptest::prelude::*;
use ripple_core::{
    Direction, Graph, Mixer, NodeId, NodeIo, NodeProcessor, PortFlags, PortId, ProcessError,
    ProcessStatus, Sink, SinkProbe, Source,
};

/// Forwards the buffer on its single input to its single output.
struct Passthrough;

impl NodeProcessor for Passthrough {
    fn process_input(&mut self, io: &mut NodeIo<'_>) -> Result<ProcessStatus, ProcessError> {
        if io.output_ref(0).is_some_and(|out| out.has_data()) {
            return Ok(ProcessStatus::HaveOutput);
        }
        let Some(buffer) = io.input(0).and_then(|slot| slot.take()) else {
            return Ok(ProcessStatus::NeedMoreInput);
        };
        io.output(0).ok_or(ProcessError::Unlinked)?.provide(buffer);
        Ok(ProcessStatus::HaveOutput)
    }

    fn process_output(&mut self, io: &mut NodeIo<'_>) -> Result<ProcessStatus, ProcessError> {
        if io.output_ref(0).is_some_and(|out| out.has_data()) {
            return Ok(ProcessStatus::HaveOutput);
        }
        io.input(0).ok_or(ProcessError::Unlinked)?.request();
        Ok(ProcessStatus::NeedMoreInput)
    }
}

fn connect(graph: &mut Graph, from: NodeId, to: NodeId) -> PortId {
    let out = graph.add_port(from, Direction::Output, PortFlags::NONE).unwrap();
    let inp = graph.add_port(to, Direction::Input, PortFlags::NONE).unwrap();
    graph.link(out, inp).unwrap();
    inp
}

/// `source -> passthrough x len -> sink`, with the sink requesting data.
fn chain(len: usize, buffers: u32) -> (Graph, NodeId, Vec<NodeId>, NodeId, SinkProbe) {
    let mut graph = Graph::new();
    let src = graph.add_node(Box::new(Source::new(buffers)));
    let mids: Vec<NodeId> = (0..len)
        .map(|_| graph.add_node(Box::new(Passthrough)))
        .collect();
    let (sink_proc, probe) = Sink::with_probe();
    let sink = graph.add_node(Box::new(sink_proc));

    let mut prev = src;
    for &mid in &mids {
        connect(&mut graph, prev, mid);
        prev = mid;
    }
    let sink_in = connect(&mut graph, prev, sink);
    graph.slot_mut(sink_in).unwrap().request();
    (graph, src, mids, sink, probe)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// For any chain length and any interleaving of pulls from the sink and
    /// pushes from the source, each activation delivers exactly one buffer,
    /// every node in the chain processes it exactly once, and the ready queue
    /// is empty afterwards.
    #[test]
    fn chain_delivers_one_buffer_per_activation(
        len in 0usize..6,
        buffers in 1u32..4,
        ops in prop::collection::vec(any::<bool>(), 1..24),
    ) {
        let (mut graph, src, mids, sink, probe) = chain(len, buffers);

        for (round, &pull) in ops.iter().enumerate() {
            if pull {
                graph.pull(sink).unwrap();
            } else {
                graph.push(src).unwrap();
            }
            let delivered = round as u64 + 1;

            prop_assert_eq!(graph.queued_count(), 0);
            for id in graph.node_ids() {
                prop_assert!(!graph.is_queued(id));
            }
            prop_assert_eq!(probe.received(), delivered);
            prop_assert_eq!(graph.input_calls(sink), Some(delivered));
            for &mid in &mids {
                prop_assert_eq!(graph.input_calls(mid), Some(delivered));
            }
        }
    }

    /// For fan-in width `k` in 1..=3, the mixer runs `process_input` exactly
    /// once per pull and each source produces exactly once per pull.
    #[test]
    fn fan_in_mixes_once_per_pull(k in 1usize..=3, pulls in 1u64..8) {
        let mut graph = Graph::new();
        let sources: Vec<NodeId> = (0..k)
            .map(|_| graph.add_node(Box::new(Source::new(2))))
            .collect();
        let mixer = graph.add_node(Box::new(Mixer::new(2)));
        let (sink_proc, probe) = Sink::with_probe();
        let sink = graph.add_node(Box::new(sink_proc));
        for &src in &sources {
            connect(&mut graph, src, mixer);
        }
        let sink_in = connect(&mut graph, mixer, sink);
        graph.slot_mut(sink_in).unwrap().request();

        for round in 1..=pulls {
            graph.pull(sink).unwrap();
            prop_assert_eq!(graph.queued_count(), 0);
            prop_assert_eq!(probe.received(), round);
            prop_assert_eq!(graph.input_calls(mixer), Some(round));
            for &src in &sources {
                prop_assert_eq!(graph.output_calls(src), Some(round));
            }
        }
    }

    /// Dispatch counts stay linear in chain length: a pull through `len`
    /// passthrough nodes never needs more than a fixed number of dispatches
    /// per node.
    #[test]
    fn pull_dispatches_are_bounded(len in 0usize..12) {
        let (mut graph, _src, _mids, sink, _probe) = chain(len, 2);
        graph.pull(sink).unwrap();

        let stats = graph.last_activation();
        let nodes = len as u32 + 2;
        prop_assert!(stats.dispatches <= 4 * nodes, "{} dispatches for {} nodes", stats.dispatches, nodes);
        prop_assert_eq!(stats.input_calls, len as u32 + 1);
        prop_assert_eq!(stats.output_calls, len as u32 + 1);
    }
}
