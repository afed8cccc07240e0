//! Built-in node processors.
//!
//! Small adapters that follow the IO-slot discipline every processor must
//! obey: producers recycle the buffer id a consumer left behind before
//! providing the next one, and consumers `take()` what they read so the slot
//! flips to `NeedData`.
//!
//! | Adapter | Ports | Role |
//! |---------|-------|------|
//! | [`Source`] | 1 output | produces a buffer whenever asked |
//! | [`Sink`] | 1 input | consumes and counts buffers |
//! | [`Mixer`] | N inputs, 1 output | folds one buffer per input into one |

mod mixer;
mod pool;
mod sink;
mod source;

pub use mixer::Mixer;
pub use pool::MAX_POOL_BUFFERS;
pub use sink::{Sink, SinkProbe};
pub use source::Source;
