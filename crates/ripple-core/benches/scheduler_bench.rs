//! Criterion benchmarks for the ripple-core scheduler.
//!
//! Measures dispatch overhead with trivial processors. Two axes:
//!
//! - **Pull**: one `pull()` from the sink of a linear chain or a fan-in
//! - **Push**: one `push()` from the source of a linear chain
//!
//! Run with: `cargo bench -p ripple-core -- scheduler/`
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use ripple_core::{
    Direction, Graph, Mixer, NodeId, NodeIo, NodeProcessor, PortFlags, ProcessError,
    ProcessStatus, Sink, Source,
};

const CHAIN_LENGTHS: &[usize] = &[1, 5, 20, 100];

// ---------------------------------------------------------------------------
// Passthrough node: scheduling cost only
// ---------------------------------------------------------------------------

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

// ---------------------------------------------------------------------------
// Graph constructors
// ---------------------------------------------------------------------------

fn connect(graph: &mut Graph, from: NodeId, to: NodeId) {
    let out = graph.add_port(from, Direction::Output, PortFlags::NONE).unwrap();
    let inp = graph.add_port(to, Direction::Input, PortFlags::NONE).unwrap();
    graph.link(out, inp).unwrap();
}

/// Returns `(graph, source, sink)` for `source -> passthrough x len -> sink`.
fn make_chain(len: usize) -> (Graph, NodeId, NodeId) {
    let mut graph = Graph::new();
    let src = graph.add_node(Box::new(Source::new(4)));
    let mut prev = src;
    for _ in 0..len {
        let node = graph.add_node(Box::new(Passthrough));
        connect(&mut graph, prev, node);
        prev = node;
    }
    let sink = graph.add_node(Box::new(Sink::new()));
    connect(&mut graph, prev, sink);
    let sink_in = graph.input_ports(sink).unwrap()[0];
    graph.slot_mut(sink_in).unwrap().request();
    (graph, src, sink)
}

/// Returns `(graph, sink)` for `k` sources into a mixer into a sink.
fn make_fan_in(k: usize) -> (Graph, NodeId) {
    let mut graph = Graph::new();
    let mixer = graph.add_node(Box::new(Mixer::new(4)));
    for _ in 0..k {
        let src = graph.add_node(Box::new(Source::new(4)));
        connect(&mut graph, src, mixer);
    }
    let sink = graph.add_node(Box::new(Sink::new()));
    connect(&mut graph, mixer, sink);
    let sink_in = graph.input_ports(sink).unwrap()[0];
    graph.slot_mut(sink_in).unwrap().request();
    (graph, sink)
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_pull(c: &mut Criterion) {
    let mut group = c.benchmark_group("scheduler/pull");

    for &len in CHAIN_LENGTHS {
        let (mut graph, _src, sink) = make_chain(len);
        group.bench_with_input(BenchmarkId::new("chain", len), &len, |b, _| {
            b.iter(|| graph.pull(black_box(sink)).unwrap());
        });
    }

    for k in [2, 8, 32] {
        let (mut graph, sink) = make_fan_in(k);
        group.bench_with_input(BenchmarkId::new("fan_in", k), &k, |b, _| {
            b.iter(|| graph.pull(black_box(sink)).unwrap());
        });
    }

    group.finish();
}

fn bench_push(c: &mut Criterion) {
    let mut group = c.benchmark_group("scheduler/push");

    for &len in CHAIN_LENGTHS {
        let (mut graph, src, _sink) = make_chain(len);
        group.bench_with_input(BenchmarkId::new("chain", len), &len, |b, _| {
            b.iter(|| graph.push(black_box(src)).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_pull, bench_push);
criterion_main!(benches);
