//! Pipeline Stages — Push-based stage wiring
//!
//! Every stage of the transmission chain follows the same two-step contract:
//! `receive` validates and stores the incoming sequence and triggers `emit`,
//! which pushes the stage's freshly computed output to every connected
//! downstream consumer. Delivery is synchronous and whole-sequence; there is
//! no streaming or partial delivery. Consumers register with `connect` and
//! leave with `disconnect`; probes and writers implement the same [`Sink`]
//! contract as transforming stages, so a stage treats them opaquely. A
//! chain's head is a [`SourceNode`], which generates instead of receiving;
//! one `emit` on the head drives the whole cascade.
//!
//! Each production builds a fresh sequence: a stage's received and emitted
//! buffers never alias, and nothing downstream can mutate what an upstream
//! stage holds.
//!
//! ## Example
//!
//! ```rust
//! use linesim_core::pipeline::{CollectSink, Node, Sink};
//! use linesim_core::repetition::{RepetitionCodec, RepetitionEncoder};
//!
//! let mut encoder = Node::new(RepetitionEncoder(RepetitionCodec::new()));
//! let collector = CollectSink::new();
//! let received = collector.handle();
//! encoder.connect(Box::new(collector));
//!
//! encoder.receive(&[true]).unwrap();
//! assert_eq!(*received.borrow(), vec![true, false, true]);
//! ```

use crate::error::ChainError;
use crate::source::BitSource;
use std::cell::RefCell;
use std::rc::Rc;

/// A downstream consumer of sequences of `T`.
pub trait Sink<T> {
    /// Accept a fully materialized sequence.
    fn receive(&mut self, input: &[T]) -> Result<(), ChainError>;
}

/// The computation a [`Node`] wraps: one whole-sequence transformation.
pub trait Transform {
    /// Element type of the incoming sequence.
    type In: Clone;
    /// Element type of the produced sequence.
    type Out: Clone;

    /// Transform a sequence, producing a freshly allocated output.
    fn apply(&mut self, input: &[Self::In]) -> Result<Vec<Self::Out>, ChainError>;
}

/// Handle returned by [`Node::connect`], used to disconnect later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkId(usize);

/// A pipeline stage: a transform plus its registered downstream consumers.
pub struct Node<T: Transform> {
    transform: T,
    received: Option<Vec<T::In>>,
    emitted: Option<Vec<T::Out>>,
    sinks: Vec<(SinkId, Box<dyn Sink<T::Out>>)>,
    next_id: usize,
}

impl<T: Transform> Node<T> {
    /// Wrap a transform into a stage with no consumers.
    pub fn new(transform: T) -> Self {
        Self {
            transform,
            received: None,
            emitted: None,
            sinks: Vec::new(),
            next_id: 0,
        }
    }

    /// The wrapped transform.
    pub fn transform(&self) -> &T {
        &self.transform
    }

    /// Register a downstream consumer; it sees every future emission.
    pub fn connect(&mut self, sink: Box<dyn Sink<T::Out>>) -> SinkId {
        let id = SinkId(self.next_id);
        self.next_id += 1;
        self.sinks.push((id, sink));
        id
    }

    /// Remove a consumer. Returns false when the id is not registered.
    pub fn disconnect(&mut self, id: SinkId) -> bool {
        let before = self.sinks.len();
        self.sinks.retain(|(sink_id, _)| *sink_id != id);
        self.sinks.len() != before
    }

    /// Number of connected consumers.
    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    /// Validate and store the input, compute the output, then [`emit`].
    ///
    /// [`emit`]: Node::emit
    pub fn receive(&mut self, input: &[T::In]) -> Result<(), ChainError> {
        if input.is_empty() {
            return Err(ChainError::InvalidSignal(
                "stage received an empty sequence".to_string(),
            ));
        }
        self.received = Some(input.to_vec());
        self.emitted = Some(self.transform.apply(input)?);
        self.emit()
    }

    /// Push the stored output to every connected consumer.
    ///
    /// Fails with [`ChainError::InvalidSignal`] when nothing has been
    /// produced yet.
    pub fn emit(&mut self) -> Result<(), ChainError> {
        let emitted = self.emitted.as_ref().ok_or_else(|| {
            ChainError::InvalidSignal("stage has no output to emit".to_string())
        })?;
        for (_, sink) in &mut self.sinks {
            sink.receive(emitted)?;
        }
        Ok(())
    }

    /// The last received sequence, if any.
    pub fn input(&self) -> Option<&[T::In]> {
        self.received.as_deref()
    }

    /// The last emitted sequence, if any.
    pub fn output(&self) -> Option<&[T::Out]> {
        self.emitted.as_deref()
    }
}

impl<T: Transform> Sink<T::In> for Node<T> {
    fn receive(&mut self, input: &[T::In]) -> Result<(), ChainError> {
        Node::receive(self, input)
    }
}

/// Head of a push chain: a [`BitSource`] plus its registered consumers.
///
/// `emit` generates a fresh message and pushes it downstream, driving the
/// whole cascade; a head has no upstream and therefore no `receive`.
pub struct SourceNode<S: BitSource> {
    source: S,
    emitted: Option<Vec<bool>>,
    sinks: Vec<(SinkId, Box<dyn Sink<bool>>)>,
    next_id: usize,
}

impl<S: BitSource> SourceNode<S> {
    /// Wrap a source into a head stage with no consumers.
    pub fn new(source: S) -> Self {
        Self {
            source,
            emitted: None,
            sinks: Vec::new(),
            next_id: 0,
        }
    }

    /// Register a downstream consumer; it sees every future emission.
    pub fn connect(&mut self, sink: Box<dyn Sink<bool>>) -> SinkId {
        let id = SinkId(self.next_id);
        self.next_id += 1;
        self.sinks.push((id, sink));
        id
    }

    /// Remove a consumer. Returns false when the id is not registered.
    pub fn disconnect(&mut self, id: SinkId) -> bool {
        let before = self.sinks.len();
        self.sinks.retain(|(sink_id, _)| *sink_id != id);
        self.sinks.len() != before
    }

    /// Number of connected consumers.
    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    /// Generate a message and push it to every connected consumer.
    pub fn emit(&mut self) -> Result<(), ChainError> {
        let bits = self.source.generate();
        for (_, sink) in &mut self.sinks {
            sink.receive(&bits)?;
        }
        self.emitted = Some(bits);
        Ok(())
    }

    /// The last emitted message, if any.
    pub fn output(&self) -> Option<&[bool]> {
        self.emitted.as_deref()
    }
}

/// Terminal consumer storing the last delivered sequence in a shared buffer.
///
/// The simulator reads the destination's sequence through the handle after
/// the push cascade has finished.
pub struct CollectSink<T> {
    buffer: Rc<RefCell<Vec<T>>>,
}

impl<T: Clone> CollectSink<T> {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self {
            buffer: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Shared handle onto the collected sequence.
    pub fn handle(&self) -> Rc<RefCell<Vec<T>>> {
        Rc::clone(&self.buffer)
    }
}

impl<T: Clone> Default for CollectSink<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Sink<T> for CollectSink<T> {
    fn receive(&mut self, input: &[T]) -> Result<(), ChainError> {
        *self.buffer.borrow_mut() = input.to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line_decoder::LineDecoder;
    use crate::line_encoder::LineEncoder;
    use crate::modulation::{ModulationParams, ModulationScheme};

    struct Negate;
    impl Transform for Negate {
        type In = f64;
        type Out = f64;
        fn apply(&mut self, input: &[f64]) -> Result<Vec<f64>, ChainError> {
            Ok(input.iter().map(|s| -s).collect())
        }
    }

    #[test]
    fn test_receive_stores_and_emits() {
        let mut node = Node::new(Negate);
        let collector = CollectSink::new();
        let handle = collector.handle();
        node.connect(Box::new(collector));

        node.receive(&[1.0, -2.0]).unwrap();
        assert_eq!(node.input().unwrap(), &[1.0, -2.0]);
        assert_eq!(node.output().unwrap(), &[-1.0, 2.0]);
        assert_eq!(*handle.borrow(), vec![-1.0, 2.0]);
    }

    #[test]
    fn test_receive_rejects_empty() {
        let mut node = Node::new(Negate);
        assert!(node.receive(&[]).is_err());
    }

    #[test]
    fn test_emit_before_receive_fails() {
        let mut node = Node::new(Negate);
        assert!(node.emit().is_err());
    }

    #[test]
    fn test_emit_reaches_every_sink() {
        let mut node = Node::new(Negate);
        let a = CollectSink::new();
        let b = CollectSink::new();
        let ha = a.handle();
        let hb = b.handle();
        node.connect(Box::new(a));
        node.connect(Box::new(b));

        node.receive(&[3.0]).unwrap();
        assert_eq!(*ha.borrow(), vec![-3.0]);
        assert_eq!(*hb.borrow(), vec![-3.0]);
    }

    #[test]
    fn test_disconnect_stops_delivery() {
        let mut node = Node::new(Negate);
        let sink = CollectSink::new();
        let handle = sink.handle();
        let id = node.connect(Box::new(sink));
        assert_eq!(node.sink_count(), 1);

        assert!(node.disconnect(id));
        assert_eq!(node.sink_count(), 0);
        assert!(!node.disconnect(id));

        node.receive(&[1.0]).unwrap();
        assert!(handle.borrow().is_empty());
    }

    #[test]
    fn test_re_emit_repeats_last_output() {
        let mut node = Node::new(Negate);
        node.receive(&[1.0]).unwrap();

        let late = CollectSink::new();
        let handle = late.handle();
        node.connect(Box::new(late));
        node.emit().unwrap();
        assert_eq!(*handle.borrow(), vec![-1.0]);
    }

    #[test]
    fn test_chained_nodes_push_end_to_end() {
        let params = ModulationParams::new(ModulationScheme::Nrz, 0.0, 1.0, 4).unwrap();
        let mut decoder = Node::new(LineDecoder::new(params));
        let destination = CollectSink::new();
        let received = destination.handle();
        decoder.connect(Box::new(destination));

        let mut encoder = Node::new(LineEncoder::new(params));
        encoder.connect(Box::new(decoder));

        let bits = vec![true, false, true, true];
        encoder.receive(&bits).unwrap();
        assert_eq!(*received.borrow(), bits);
    }

    #[test]
    fn test_source_node_drives_a_cascade() {
        use crate::source::FixedSource;

        let params = ModulationParams::new(ModulationScheme::Nrz, 0.0, 1.0, 4).unwrap();
        let mut decoder = Node::new(LineDecoder::new(params));
        let destination = CollectSink::new();
        let received = destination.handle();
        decoder.connect(Box::new(destination));

        let mut encoder = Node::new(LineEncoder::new(params));
        encoder.connect(Box::new(decoder));

        let mut head = SourceNode::new(FixedSource::new("1011").unwrap());
        head.connect(Box::new(encoder));
        head.emit().unwrap();

        assert_eq!(head.output().unwrap(), &[true, false, true, true]);
        assert_eq!(*received.borrow(), vec![true, false, true, true]);
    }

    #[test]
    fn test_source_node_disconnect_stops_delivery() {
        use crate::source::FixedSource;

        let mut head = SourceNode::new(FixedSource::new("10").unwrap());
        let sink = CollectSink::new();
        let handle = sink.handle();
        let id = head.connect(Box::new(sink));
        assert_eq!(head.sink_count(), 1);

        assert!(head.disconnect(id));
        assert!(!head.disconnect(id));
        head.emit().unwrap();
        assert!(handle.borrow().is_empty());
    }

    #[test]
    fn test_transform_error_propagates() {
        let params = ModulationParams::new(ModulationScheme::Nrz, 0.0, 1.0, 4).unwrap();
        let mut decoder: Node<LineDecoder> = Node::new(LineDecoder::with_policy(
            params,
            crate::line_decoder::TrailingPolicy::Strict,
        ));
        // 5 samples against a 4-sample bit period under the strict policy.
        let err = decoder.receive(&[1.0; 5]).unwrap_err();
        assert!(matches!(err, ChainError::InvalidSignal(_)));
    }
}
