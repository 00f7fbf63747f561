//! # Switchyard: Probabilistic Trigger Sequencer Core
//!
//! `switchyard` is the processing core of a probabilistic finite-state
//! trigger sequencer for modular synthesis: a single active state that, on
//! an advance signal, transitions to one of N follower outputs chosen by
//! weighted random selection, emitting a gate pulse and a fading light on
//! the chosen output.
//!
//! ## Architecture
//!
//! The crate is organized in three layers:
//!
//! - **Port arena** ([`port`]) - host-owned ports, lights, and panel
//!   controls; the core holds typed keys, never owning references
//! - **Trigger primitives** ([`trigger`]) - edge detection with hysteresis,
//!   fixed-width gate pulses, fading light animation, rate division
//! - **Sequencer** ([`sequencer`]) - the state machine orchestrating
//!   activation, advance, reset, weighted random selection, and the gated
//!   signal pass-through
//!
//! Everything runs synchronously on the host's real-time audio thread, one
//! `process` call per sample frame. The processing path never allocates,
//! blocks, or returns errors; invalid conditions (unpatched cables, empty
//! weight sets) degrade to safe defaults.
//!
//! ## Quick Start
//!
//! ```rust
//! use switchyard::prelude::*;
//!
//! // The host module owns the arena; the sequencer holds keys into it
//! let mut io = ModuleIo::new();
//! let mut seq = Switchyard::new(SequencerConfig::default(), &mut io).unwrap();
//!
//! // Patch cables: a clock into advance, all five trigger outputs
//! io.input_mut(seq.advance_input()).set_connected(true);
//! for i in 0..seq.slot_count() {
//!     io.output_mut(seq.trigger_output(i)).set_connected(true);
//! }
//!
//! // Activate, then advance on a rising edge
//! io.param_mut(seq.activate_param()).set_value(1.0);
//! io.input_mut(seq.advance_input()).set_voltage(5.0, 0);
//!
//! let mut args = ProcessArgs::new(44100.0);
//! for _ in 0..8 {
//!     seq.process(&args, &mut io);
//!     args.advance();
//! }
//!
//! // Exactly one gate output is now firing
//! let firing = (0..seq.slot_count()).filter(|&i| seq.slot_is_armed(i)).count();
//! assert_eq!(firing, 1);
//! ```

pub mod port;
pub mod sequencer;
pub mod trigger;

/// Prelude module for convenient imports
pub mod prelude {
    // Port arena
    pub use crate::port::{
        InputId, Light, LightId, ModuleIo, OutputId, Param, ParamId, Port, ProcessArgs,
        SignalKind, MAX_CHANNELS,
    };

    // Trigger primitives
    pub use crate::trigger::{
        ButtonTrigger, EdgeDetector, FadingLight, FrameDivider, PulseTimer,
    };

    // Sequencer
    pub use crate::sequencer::{ConfigError, SequencerConfig, Switchyard, WeightRange};
}

// Re-export key types at crate root for convenience
pub use prelude::*;
