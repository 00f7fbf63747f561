//! Host Collaboration Surface
//!
//! The enclosing host module owns every port, light, and panel control; the
//! sequencer core only holds typed keys into a [`ModuleIo`] arena. This keeps
//! the one-writer-per-port relationship explicit without shared ownership: a
//! key cannot outlive the arena it was allocated from, and nothing is
//! allocated or freed while the module is processing.

use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};

/// Maximum number of polyphonic voltage lanes a port can carry.
pub const MAX_CHANNELS: usize = 16;

new_key_type! {
    /// Key for an input port in a [`ModuleIo`] arena.
    pub struct InputId;

    /// Key for an output port.
    pub struct OutputId;

    /// Key for a panel light.
    pub struct LightId;

    /// Key for a panel control (knob or momentary button).
    pub struct ParamId;
}

/// Semantic signal classification following hardware modular conventions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalKind {
    /// Audio signal, AC-coupled, typically ±5V peak
    Audio,

    /// Bipolar control voltage, ±5V (modulation, offsets)
    CvBipolar,

    /// Unipolar control voltage, 0–10V (weights, envelopes)
    CvUnipolar,

    /// Gate signal, binary state: 0V (low) or high while an event is active
    Gate,

    /// Trigger signal, a short pulse used for instantaneous events
    Trigger,
}

impl SignalKind {
    /// Returns the typical voltage range (min, max) for this signal type
    pub fn voltage_range(&self) -> (f64, f64) {
        match self {
            SignalKind::Audio => (-5.0, 5.0),
            SignalKind::CvBipolar => (-5.0, 5.0),
            SignalKind::CvUnipolar => (0.0, 10.0),
            SignalKind::Gate => (0.0, 10.0),
            SignalKind::Trigger => (0.0, 10.0),
        }
    }
}

/// A host-managed voltage line carrying up to [`MAX_CHANNELS`] polyphonic
/// lanes.
///
/// Connectedness is a host decision (whether a cable is patched); the core
/// treats a disconnected port as absent and degrades to a no-op rather than
/// reporting an error.
#[derive(Debug, Clone)]
pub struct Port {
    name: String,
    kind: SignalKind,
    connected: bool,
    channels: usize,
    voltages: [f64; MAX_CHANNELS],
}

impl Port {
    fn new(name: impl Into<String>, kind: SignalKind) -> Self {
        Self {
            name: name.into(),
            kind,
            connected: false,
            channels: 1,
            voltages: [0.0; MAX_CHANNELS],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> SignalKind {
        self.kind
    }

    /// Whether the host has a cable patched into this port
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }

    /// Read the voltage on a channel; out-of-range channels read as 0V
    pub fn voltage(&self, channel: usize) -> f64 {
        if channel < MAX_CHANNELS {
            self.voltages[channel]
        } else {
            0.0
        }
    }

    /// Drive a channel; writes past [`MAX_CHANNELS`] are discarded
    pub fn set_voltage(&mut self, volts: f64, channel: usize) {
        if channel < MAX_CHANNELS {
            self.voltages[channel] = volts;
        }
    }

    /// Number of active polyphonic channels (at least 1)
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Set the active channel count, clamped to 1..=[`MAX_CHANNELS`]
    pub fn set_channels(&mut self, channels: usize) {
        self.channels = channels.clamp(1, MAX_CHANNELS);
    }
}

/// A panel light driven by the core and rendered by the host.
///
/// Brightness is stored exactly as written, without clamping; hosts clamp to
/// their display range when rendering.
#[derive(Debug, Clone)]
pub struct Light {
    name: String,
    brightness: f64,
}

impl Light {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            brightness: 0.0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn brightness(&self) -> f64 {
        self.brightness
    }

    pub fn set_brightness(&mut self, brightness: f64) {
        self.brightness = brightness;
    }
}

/// A panel control: a continuous knob or a momentary button.
///
/// Values written by the host are clamped into the configured range.
#[derive(Debug, Clone)]
pub struct Param {
    name: String,
    value: f64,
    min: f64,
    max: f64,
    default: f64,
}

impl Param {
    fn new(name: impl Into<String>, min: f64, max: f64, default: f64) -> Self {
        Self {
            name: name.into(),
            value: default,
            min,
            max,
            default,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn set_value(&mut self, value: f64) {
        self.value = value.clamp(self.min, self.max);
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn default_value(&self) -> f64 {
        self.default
    }

    pub fn reset(&mut self) {
        self.value = self.default;
    }
}

/// Per-callback timing context supplied by the host.
#[derive(Debug, Clone, Copy)]
pub struct ProcessArgs {
    pub sample_rate: f64,
    pub sample_time: f64,
    pub frame: u64,
}

impl ProcessArgs {
    pub fn new(sample_rate: f64) -> Self {
        Self {
            sample_rate,
            sample_time: 1.0 / sample_rate,
            frame: 0,
        }
    }

    /// Advance to the next sample frame
    pub fn advance(&mut self) {
        self.frame += 1;
    }
}

/// Arena of ports, lights, and params owned by the enclosing module instance.
///
/// All entries are allocated during module construction and live for the
/// module's entire lifetime; keys are never removed, so indexing by key
/// cannot fail after construction.
#[derive(Debug, Default)]
pub struct ModuleIo {
    inputs: SlotMap<InputId, Port>,
    outputs: SlotMap<OutputId, Port>,
    lights: SlotMap<LightId, Light>,
    params: SlotMap<ParamId, Param>,
}

impl ModuleIo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_input(&mut self, name: impl Into<String>, kind: SignalKind) -> InputId {
        self.inputs.insert(Port::new(name, kind))
    }

    pub fn add_output(&mut self, name: impl Into<String>, kind: SignalKind) -> OutputId {
        self.outputs.insert(Port::new(name, kind))
    }

    pub fn add_light(&mut self, name: impl Into<String>) -> LightId {
        self.lights.insert(Light::new(name))
    }

    pub fn add_param(
        &mut self,
        name: impl Into<String>,
        min: f64,
        max: f64,
        default: f64,
    ) -> ParamId {
        self.params.insert(Param::new(name, min, max, default))
    }

    pub fn input(&self, id: InputId) -> &Port {
        &self.inputs[id]
    }

    pub fn input_mut(&mut self, id: InputId) -> &mut Port {
        &mut self.inputs[id]
    }

    pub fn output(&self, id: OutputId) -> &Port {
        &self.outputs[id]
    }

    pub fn output_mut(&mut self, id: OutputId) -> &mut Port {
        &mut self.outputs[id]
    }

    pub fn light(&self, id: LightId) -> &Light {
        &self.lights[id]
    }

    pub fn light_mut(&mut self, id: LightId) -> &mut Light {
        &mut self.lights[id]
    }

    pub fn param(&self, id: ParamId) -> &Param {
        &self.params[id]
    }

    pub fn param_mut(&mut self, id: ParamId) -> &mut Param {
        &mut self.params[id]
    }

    /// Convenience: read a param's current value
    pub fn param_value(&self, id: ParamId) -> f64 {
        self.params[id].value()
    }
}
