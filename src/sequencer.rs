//! The Switchyard Sequencer
//!
//! A probabilistic finite-state trigger sequencer: one active state that, on
//! an advance signal, hands off to one of N follower slots chosen by
//! weighted random selection, firing a gate pulse and a fading light on the
//! chosen output. Control edges are sampled at a divided rate, the signal
//! pass-through runs at full audio rate, and light refresh runs at a coarser
//! rate still.
//!
//! Nothing on the processing path returns an error or allocates: unbound and
//! disconnected ports degrade to safe defaults, because a fault raised
//! mid-callback would halt audio.

use crate::port::{InputId, LightId, ModuleIo, OutputId, ParamId, ProcessArgs, SignalKind};
use crate::trigger::{ButtonTrigger, EdgeDetector, FadingLight, FrameDivider, PulseTimer};
use serde::{Deserialize, Serialize};

/// Signal offset knob range, ±5V
pub const OFFSET_VOLTS: f64 = 5.0;

/// Range of the per-slot weight knobs.
///
/// Two panel revisions exist in the wild; the range is configuration rather
/// than a constant so patches built against either keep their meaning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightRange {
    pub min: f64,
    pub max: f64,
}

impl WeightRange {
    /// 1–100 weight knobs (the later panel; default)
    pub const COARSE: WeightRange = WeightRange {
        min: 1.0,
        max: 100.0,
    };

    /// 0–10 weight knobs (the earlier panel)
    pub const FINE: WeightRange = WeightRange { min: 0.0, max: 10.0 };
}

impl Default for WeightRange {
    fn default() -> Self {
        Self::COARSE
    }
}

/// Construction-time configuration for a [`Switchyard`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequencerConfig {
    /// Number of follower slots (outgoing transitions)
    pub slots: usize,

    /// Range of the per-slot weight knobs
    pub weight_range: WeightRange,

    /// Control logic (button/edge sampling) runs every this many samples
    pub control_division: u32,

    /// Light refresh runs every this many samples
    pub light_division: u32,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            slots: 5,
            weight_range: WeightRange::default(),
            control_division: 4,
            light_division: 64,
        }
    }
}

/// Error types for sequencer construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The configuration asked for zero output slots
    NoSlots,
    /// A rate division was zero
    ZeroDivision,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NoSlots => write!(f, "sequencer needs at least one output slot"),
            ConfigError::ZeroDivision => write!(f, "rate divisions must be at least 1"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// One outgoing transition: a gate output with its weight controls and fade
/// light.
struct Slot {
    pulse: PulseTimer,
    fade: FadingLight,
    button: ButtonTrigger,
    output: OutputId,
    light: LightId,
    weight_param: ParamId,
    weight_input: InputId,
    button_param: ParamId,
}

/// The sequencer core.
///
/// Owns the state machine and the trigger primitives; the enclosing host
/// module owns the [`ModuleIo`] arena the core's keys point into and must
/// keep it alive for the module's lifetime. All ports, params, and lights
/// are allocated once in [`new`](Self::new); `process` never allocates.
///
/// The machine has two states. `Inactive` is the initial state; an
/// activation edge or button enters `Active`. From `Active`, a reset leaves
/// to `Inactive`, and an advance (or a manual per-slot button) also leaves
/// to `Inactive` while firing the chosen slot's gate and light — the pulse
/// is what carries the "token" onward to whatever the output is patched
/// into.
pub struct Switchyard {
    config: SequencerConfig,
    active: bool,

    activate_edge: EdgeDetector,
    advance_edge: EdgeDetector,
    reset_edge: EdgeDetector,
    activate_button: ButtonTrigger,
    advance_button: ButtonTrigger,
    reset_button: ButtonTrigger,

    activate_input: InputId,
    advance_input: InputId,
    reset_input: InputId,
    activate_param: ParamId,
    advance_param: ParamId,
    reset_param: ParamId,

    signal_input: InputId,
    signal_output: OutputId,
    offset_param: ParamId,
    active_light: LightId,

    slots: Vec<Slot>,

    control_div: FrameDivider,
    light_div: FrameDivider,
}

impl Switchyard {
    /// Allocate the sequencer's ports, params, and lights in `io` and wire
    /// the trigger primitives to them.
    pub fn new(config: SequencerConfig, io: &mut ModuleIo) -> Result<Self, ConfigError> {
        if config.slots == 0 {
            return Err(ConfigError::NoSlots);
        }
        if config.control_division == 0 || config.light_division == 0 {
            return Err(ConfigError::ZeroDivision);
        }

        let activate_input = io.add_input("activate", SignalKind::Trigger);
        let advance_input = io.add_input("advance", SignalKind::Trigger);
        let reset_input = io.add_input("reset", SignalKind::Trigger);
        let activate_param = io.add_param("activate", 0.0, 1.0, 0.0);
        let advance_param = io.add_param("advance", 0.0, 1.0, 0.0);
        let reset_param = io.add_param("reset", 0.0, 1.0, 0.0);

        let signal_input = io.add_input("signal", SignalKind::Audio);
        let signal_output = io.add_output("signal", SignalKind::Audio);
        let offset_param = io.add_param("offset", -OFFSET_VOLTS, OFFSET_VOLTS, 0.0);
        let active_light = io.add_light("active");

        let range = config.weight_range;
        let slots = (0..config.slots)
            .map(|i| {
                let n = i + 1;
                let output = io.add_output(format!("trigger {}", n), SignalKind::Gate);
                let light = io.add_light(format!("fade {}", n));
                let button_param = io.add_param(format!("transition {}", n), 0.0, 1.0, 0.0);
                Slot {
                    pulse: PulseTimer::new(output),
                    fade: FadingLight::new(light),
                    button: ButtonTrigger::new(button_param),
                    output,
                    light,
                    weight_param: io.add_param(
                        format!("weight {}", n),
                        range.min,
                        range.max,
                        range.min,
                    ),
                    weight_input: io.add_input(format!("weight cv {}", n), SignalKind::CvUnipolar),
                    button_param,
                }
            })
            .collect::<Vec<_>>();

        Ok(Self {
            active: false,
            activate_edge: EdgeDetector::new(activate_input),
            advance_edge: EdgeDetector::new(advance_input),
            reset_edge: EdgeDetector::new(reset_input),
            activate_button: ButtonTrigger::new(activate_param),
            advance_button: ButtonTrigger::new(advance_param),
            reset_button: ButtonTrigger::new(reset_param),
            activate_input,
            advance_input,
            reset_input,
            activate_param,
            advance_param,
            reset_param,
            signal_input,
            signal_output,
            offset_param,
            active_light,
            slots,
            control_div: FrameDivider::new(config.control_division),
            light_div: FrameDivider::new(config.light_division),
            config,
        })
    }

    /// Process one sample frame. Invoked by the host once per sample on the
    /// audio thread.
    pub fn process(&mut self, args: &ProcessArgs, io: &mut ModuleIo) {
        if self.control_div.tick() {
            self.process_control(io);
        }

        self.process_signal(io);
        for slot in &mut self.slots {
            slot.pulse.process(args, io);
        }

        if self.light_div.tick() {
            self.process_lights(args, io);
        }
    }

    /// Force a transition to `slot`: fire its gate pulse, make its fade
    /// light the only lit one, and leave the active state. Out-of-range
    /// indices are ignored.
    pub fn advance_to(&mut self, slot: usize) {
        if slot >= self.slots.len() {
            return;
        }
        self.active = false;
        self.slots[slot].pulse.trigger();
        // Last transition wins visually: clear every fade, then start one
        for s in &mut self.slots {
            s.fade.reset();
        }
        self.slots[slot].fade.trigger();
    }

    /// Pick an outgoing slot by weighted random draw.
    ///
    /// Per-slot weight is the weight knob plus the weight CV when patched,
    /// floored at zero. The first slot whose cumulative weight exceeds the
    /// draw *and* whose output is patched wins; slot 0 is the fallback when
    /// nothing qualifies (including a zero total), patched or not.
    pub fn select_random_output(&self, io: &ModuleIo) -> usize {
        let total: f64 = self.slots.iter().map(|s| self.slot_weight(s, io)).sum();
        let draw = rand::random::<f64>() * total;

        let mut cumulative = 0.0;
        for (i, slot) in self.slots.iter().enumerate() {
            cumulative += self.slot_weight(slot, io);
            if cumulative > draw && io.output(slot.output).is_connected() {
                return i;
            }
        }
        0
    }

    fn slot_weight(&self, slot: &Slot, io: &ModuleIo) -> f64 {
        let mut weight = io.param_value(slot.weight_param);
        let cv = io.input(slot.weight_input);
        if cv.is_connected() {
            weight += cv.voltage(0);
        }
        weight.max(0.0)
    }

    fn process_control(&mut self, io: &ModuleIo) {
        // Every detector must advance every control tick, even when its
        // result goes unused, or its edge state goes stale.
        let reset = self.reset_button.process(io) | self.reset_edge.process(io);
        let activate = self.activate_button.process(io) | self.activate_edge.process(io);
        let advance = self.advance_button.process(io) | self.advance_edge.process(io);

        // Reset wins when both fire on the same tick
        if reset {
            self.active = false;
        } else if activate {
            self.active = true;
        }

        if advance && self.active {
            let slot = self.select_random_output(io);
            self.advance_to(slot);
        }

        for i in 0..self.slots.len() {
            let pressed = self.slots[i].button.process(io);
            if pressed && self.active {
                self.advance_to(i);
            }
        }
    }

    fn process_signal(&mut self, io: &mut ModuleIo) {
        // No cable on the output: skip the whole path
        if !io.output(self.signal_output).is_connected() {
            return;
        }
        let offset = io.param_value(self.offset_param);

        if !io.input(self.signal_input).is_connected() {
            // Unpatched input: the offset knob alone is the signal
            let volts = if self.active { offset } else { 0.0 };
            let out = io.output_mut(self.signal_output);
            out.set_channels(1);
            out.set_voltage(volts, 0);
            return;
        }

        let channels = io.input(self.signal_input).channels();
        for ch in 0..channels {
            let volts = if self.active {
                io.input(self.signal_input).voltage(ch) + offset
            } else {
                0.0
            };
            io.output_mut(self.signal_output).set_voltage(volts, ch);
        }
        io.output_mut(self.signal_output).set_channels(channels);
    }

    fn process_lights(&mut self, args: &ProcessArgs, io: &mut ModuleIo) {
        io.light_mut(self.active_light)
            .set_brightness(if self.active { 1.0 } else { 0.0 });

        let frames = self.light_div.period();
        for slot in &mut self.slots {
            slot.fade.process(args, io, frames);
        }
    }

    /// Whether the machine currently holds the token
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn config(&self) -> &SequencerConfig {
        &self.config
    }

    // Host wiring lookups

    pub fn activate_input(&self) -> InputId {
        self.activate_input
    }

    pub fn advance_input(&self) -> InputId {
        self.advance_input
    }

    pub fn reset_input(&self) -> InputId {
        self.reset_input
    }

    pub fn activate_param(&self) -> ParamId {
        self.activate_param
    }

    pub fn advance_param(&self) -> ParamId {
        self.advance_param
    }

    pub fn reset_param(&self) -> ParamId {
        self.reset_param
    }

    pub fn signal_input(&self) -> InputId {
        self.signal_input
    }

    pub fn signal_output(&self) -> OutputId {
        self.signal_output
    }

    pub fn offset_param(&self) -> ParamId {
        self.offset_param
    }

    pub fn active_light(&self) -> LightId {
        self.active_light
    }

    /// Gate output for `slot`. Panics if `slot >= slot_count()`.
    pub fn trigger_output(&self, slot: usize) -> OutputId {
        self.slots[slot].output
    }

    /// Weight knob for `slot`. Panics if `slot >= slot_count()`.
    pub fn weight_param(&self, slot: usize) -> ParamId {
        self.slots[slot].weight_param
    }

    /// Weight CV input for `slot`. Panics if `slot >= slot_count()`.
    pub fn weight_input(&self, slot: usize) -> InputId {
        self.slots[slot].weight_input
    }

    /// Manual transition button for `slot`. Panics if `slot >= slot_count()`.
    pub fn transition_param(&self, slot: usize) -> ParamId {
        self.slots[slot].button_param
    }

    /// Fade light for `slot`. Panics if `slot >= slot_count()`.
    pub fn fade_light(&self, slot: usize) -> LightId {
        self.slots[slot].light
    }

    /// Whether slot's gate pulse is currently running.
    /// Panics if `slot >= slot_count()`.
    pub fn slot_is_armed(&self, slot: usize) -> bool {
        self.slots[slot].pulse.is_armed()
    }

    /// Whether slot's fade light is non-idle.
    /// Panics if `slot >= slot_count()`.
    pub fn slot_is_lit(&self, slot: usize) -> bool {
        self.slots[slot].fade.is_lit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trigger::{GATE_SECONDS, GATE_VOLTS};
    use approx::assert_relative_eq;

    /// Single-sample control and light rates so every `process` call
    /// evaluates everything; FINE weights so a knob can actually be zero.
    fn test_config(slots: usize) -> SequencerConfig {
        SequencerConfig {
            slots,
            weight_range: WeightRange::FINE,
            control_division: 1,
            light_division: 1,
        }
    }

    fn rig(slots: usize) -> (Switchyard, ModuleIo, ProcessArgs) {
        let mut io = ModuleIo::new();
        let seq = Switchyard::new(test_config(slots), &mut io).unwrap();
        for i in 0..slots {
            io.output_mut(seq.trigger_output(i)).set_connected(true);
        }
        (seq, io, ProcessArgs::new(44100.0))
    }

    fn press(io: &mut ModuleIo, param: ParamId) {
        io.param_mut(param).set_value(1.0);
    }

    fn release(io: &mut ModuleIo, param: ParamId) {
        io.param_mut(param).set_value(0.0);
    }

    fn step(seq: &mut Switchyard, io: &mut ModuleIo, args: &mut ProcessArgs) {
        seq.process(args, io);
        args.advance();
    }

    #[test]
    fn test_config_validation() {
        let mut io = ModuleIo::new();
        let bad = SequencerConfig {
            slots: 0,
            ..Default::default()
        };
        assert_eq!(
            Switchyard::new(bad, &mut io).err(),
            Some(ConfigError::NoSlots)
        );

        let bad = SequencerConfig {
            control_division: 0,
            ..Default::default()
        };
        assert_eq!(
            Switchyard::new(bad, &mut io).err(),
            Some(ConfigError::ZeroDivision)
        );
    }

    #[test]
    fn test_default_config_shape() {
        let mut io = ModuleIo::new();
        let seq = Switchyard::new(SequencerConfig::default(), &mut io).unwrap();
        assert_eq!(seq.slot_count(), 5);
        assert_eq!(seq.config().weight_range, WeightRange::COARSE);
        // The coarse weight knob bottoms out at 1, never 0
        assert_eq!(io.param(seq.weight_param(0)).min(), 1.0);
        assert!(!seq.is_active());
    }

    #[test]
    fn test_activation_by_button() {
        let (mut seq, mut io, mut args) = rig(2);
        assert!(!seq.is_active());

        press(&mut io, seq.activate_param());
        step(&mut seq, &mut io, &mut args);
        assert!(seq.is_active());

        // Holding the button is not a second event
        step(&mut seq, &mut io, &mut args);
        assert!(seq.is_active());
    }

    #[test]
    fn test_activation_by_cv_edge() {
        let (mut seq, mut io, mut args) = rig(2);
        io.input_mut(seq.activate_input()).set_connected(true);
        io.input_mut(seq.activate_input()).set_voltage(5.0, 0);
        step(&mut seq, &mut io, &mut args);
        assert!(seq.is_active());
    }

    #[test]
    fn test_reset_deactivates() {
        let (mut seq, mut io, mut args) = rig(2);
        press(&mut io, seq.activate_param());
        step(&mut seq, &mut io, &mut args);
        assert!(seq.is_active());

        press(&mut io, seq.reset_param());
        step(&mut seq, &mut io, &mut args);
        assert!(!seq.is_active());
    }

    #[test]
    fn test_reset_wins_over_activate() {
        let (mut seq, mut io, mut args) = rig(2);

        // Both edges land on the same control tick
        press(&mut io, seq.activate_param());
        press(&mut io, seq.reset_param());
        step(&mut seq, &mut io, &mut args);
        assert!(!seq.is_active());
    }

    #[test]
    fn test_advance_requires_active() {
        let (mut seq, mut io, mut args) = rig(3);
        press(&mut io, seq.advance_param());
        step(&mut seq, &mut io, &mut args);
        for i in 0..3 {
            assert!(!seq.slot_is_armed(i));
            assert!(!seq.slot_is_lit(i));
        }
    }

    #[test]
    fn test_advance_fires_exactly_one_slot() {
        let (mut seq, mut io, mut args) = rig(5);
        // All probability mass on slot 0
        io.param_mut(seq.weight_param(0)).set_value(10.0);

        press(&mut io, seq.activate_param());
        step(&mut seq, &mut io, &mut args);
        press(&mut io, seq.advance_param());
        step(&mut seq, &mut io, &mut args);

        assert!(!seq.is_active());
        for i in 0..5 {
            assert_eq!(seq.slot_is_armed(i), i == 0);
            assert_eq!(seq.slot_is_lit(i), i == 0);
        }
        assert_eq!(io.output(seq.trigger_output(0)).voltage(0), GATE_VOLTS);
    }

    #[test]
    fn test_lit_exclusivity_holds_across_light_ticks() {
        let (mut seq, mut io, mut args) = rig(5);
        io.param_mut(seq.weight_param(2)).set_value(10.0);

        press(&mut io, seq.activate_param());
        step(&mut seq, &mut io, &mut args);
        press(&mut io, seq.advance_param());
        step(&mut seq, &mut io, &mut args);

        // Light refresh must not promote idle slots to lit
        for _ in 0..200 {
            step(&mut seq, &mut io, &mut args);
            for i in 0..5 {
                assert_eq!(seq.slot_is_lit(i), i == 2);
            }
        }
    }

    #[test]
    fn test_selection_all_mass_on_one_slot() {
        let (seq, mut io, _) = rig(5);
        io.param_mut(seq.weight_param(3)).set_value(10.0);
        for _ in 0..50 {
            assert_eq!(seq.select_random_output(&io), 3);
        }
    }

    #[test]
    fn test_selection_zero_weights_falls_back() {
        let (seq, io, _) = rig(5);
        // FINE knobs default to 0: total mass is zero
        for _ in 0..50 {
            assert_eq!(seq.select_random_output(&io), 0);
        }
    }

    #[test]
    fn test_selection_weight_cv_adds_in() {
        let (seq, mut io, _) = rig(5);
        io.input_mut(seq.weight_input(2)).set_connected(true);
        io.input_mut(seq.weight_input(2)).set_voltage(5.0, 0);
        for _ in 0..50 {
            assert_eq!(seq.select_random_output(&io), 2);
        }
    }

    #[test]
    fn test_selection_negative_weight_floors_at_zero() {
        let (seq, mut io, _) = rig(3);
        io.param_mut(seq.weight_param(1)).set_value(10.0);
        // CV can pull a slot's weight negative; it must clamp, not invert
        io.input_mut(seq.weight_input(0)).set_connected(true);
        io.input_mut(seq.weight_input(0)).set_voltage(-8.0, 0);
        for _ in 0..50 {
            assert_eq!(seq.select_random_output(&io), 1);
        }
    }

    #[test]
    fn test_selection_skips_disconnected_winner() {
        let (seq, mut io, _) = rig(3);
        io.param_mut(seq.weight_param(0)).set_value(10.0);
        io.output_mut(seq.trigger_output(0)).set_connected(false);
        // Slot 0 wins every draw but has no cable; slot 1 is the first
        // connected slot past it
        for _ in 0..50 {
            assert_eq!(seq.select_random_output(&io), 1);
        }
    }

    #[test]
    fn test_selection_fallback_even_when_disconnected() {
        let (seq, mut io, _) = rig(3);
        for i in 0..3 {
            io.output_mut(seq.trigger_output(i)).set_connected(false);
        }
        io.param_mut(seq.weight_param(2)).set_value(10.0);
        assert_eq!(seq.select_random_output(&io), 0);
    }

    #[test]
    fn test_manual_transition_button() {
        let (mut seq, mut io, mut args) = rig(5);
        press(&mut io, seq.activate_param());
        step(&mut seq, &mut io, &mut args);

        press(&mut io, seq.transition_param(3));
        step(&mut seq, &mut io, &mut args);

        assert!(!seq.is_active());
        for i in 0..5 {
            assert_eq!(seq.slot_is_armed(i), i == 3);
            assert_eq!(seq.slot_is_lit(i), i == 3);
        }
    }

    #[test]
    fn test_manual_transition_ignored_when_inactive() {
        let (mut seq, mut io, mut args) = rig(3);
        press(&mut io, seq.transition_param(1));
        step(&mut seq, &mut io, &mut args);
        assert!(!seq.slot_is_armed(1));
    }

    #[test]
    fn test_last_transition_wins_visually() {
        let (mut seq, mut io, mut args) = rig(4);

        press(&mut io, seq.activate_param());
        step(&mut seq, &mut io, &mut args);
        press(&mut io, seq.transition_param(1));
        step(&mut seq, &mut io, &mut args);
        release(&mut io, seq.transition_param(1));
        release(&mut io, seq.activate_param());
        // One tick with everything released so the button triggers re-arm
        step(&mut seq, &mut io, &mut args);

        // Re-activate and take a different transition; slot 1's light must
        // drop back to idle
        press(&mut io, seq.activate_param());
        step(&mut seq, &mut io, &mut args);
        press(&mut io, seq.transition_param(2));
        step(&mut seq, &mut io, &mut args);

        assert!(!seq.slot_is_lit(1));
        assert!(seq.slot_is_lit(2));
        // Both pulses may still be running; gates are 1.01s wide
        assert!(seq.slot_is_armed(1));
        assert!(seq.slot_is_armed(2));
    }

    #[test]
    fn test_signal_gated_off_when_inactive() {
        let (mut seq, mut io, mut args) = rig(2);
        io.output_mut(seq.signal_output()).set_connected(true);
        io.input_mut(seq.signal_input()).set_connected(true);
        io.input_mut(seq.signal_input()).set_channels(3);
        for ch in 0..3 {
            io.input_mut(seq.signal_input()).set_voltage(4.0, ch);
        }

        step(&mut seq, &mut io, &mut args);
        for ch in 0..3 {
            assert_eq!(io.output(seq.signal_output()).voltage(ch), 0.0);
        }
    }

    #[test]
    fn test_signal_passthrough_with_offset() {
        let (mut seq, mut io, mut args) = rig(2);
        io.output_mut(seq.signal_output()).set_connected(true);
        io.input_mut(seq.signal_input()).set_connected(true);
        io.input_mut(seq.signal_input()).set_channels(3);
        io.input_mut(seq.signal_input()).set_voltage(1.0, 0);
        io.input_mut(seq.signal_input()).set_voltage(2.0, 1);
        io.input_mut(seq.signal_input()).set_voltage(3.0, 2);
        io.param_mut(seq.offset_param()).set_value(2.0);

        press(&mut io, seq.activate_param());
        step(&mut seq, &mut io, &mut args);

        let out = io.output(seq.signal_output());
        assert_eq!(out.channels(), 3);
        assert_relative_eq!(out.voltage(0), 3.0);
        assert_relative_eq!(out.voltage(1), 4.0);
        assert_relative_eq!(out.voltage(2), 5.0);
    }

    #[test]
    fn test_signal_offset_alone_when_input_unpatched() {
        let (mut seq, mut io, mut args) = rig(2);
        io.output_mut(seq.signal_output()).set_connected(true);
        io.param_mut(seq.offset_param()).set_value(-1.5);

        // Inactive: output stays silent
        step(&mut seq, &mut io, &mut args);
        assert_eq!(io.output(seq.signal_output()).voltage(0), 0.0);

        press(&mut io, seq.activate_param());
        step(&mut seq, &mut io, &mut args);
        assert_eq!(io.output(seq.signal_output()).channels(), 1);
        assert_relative_eq!(io.output(seq.signal_output()).voltage(0), -1.5);
    }

    #[test]
    fn test_signal_skipped_when_output_unpatched() {
        let (mut seq, mut io, mut args) = rig(2);
        io.input_mut(seq.signal_input()).set_connected(true);
        io.input_mut(seq.signal_input()).set_voltage(4.0, 0);
        press(&mut io, seq.activate_param());
        step(&mut seq, &mut io, &mut args);
        // Never driven
        assert_eq!(io.output(seq.signal_output()).voltage(0), 0.0);
    }

    #[test]
    fn test_active_light_follows_state() {
        let (mut seq, mut io, mut args) = rig(2);

        step(&mut seq, &mut io, &mut args);
        assert_eq!(io.light(seq.active_light()).brightness(), 0.0);

        press(&mut io, seq.activate_param());
        step(&mut seq, &mut io, &mut args);
        assert_eq!(io.light(seq.active_light()).brightness(), 1.0);

        press(&mut io, seq.reset_param());
        step(&mut seq, &mut io, &mut args);
        assert_eq!(io.light(seq.active_light()).brightness(), 0.0);
    }

    #[test]
    fn test_control_rate_division() {
        let mut io = ModuleIo::new();
        let config = SequencerConfig {
            slots: 2,
            weight_range: WeightRange::FINE,
            control_division: 4,
            light_division: 64,
        };
        let mut seq = Switchyard::new(config, &mut io).unwrap();
        let mut args = ProcessArgs::new(44100.0);

        // Burn the first control tick (dividers fire on their first call)
        step(&mut seq, &mut io, &mut args);

        press(&mut io, seq.activate_param());
        // Samples 1..3 fall between control ticks
        for _ in 0..3 {
            step(&mut seq, &mut io, &mut args);
            assert!(!seq.is_active());
        }
        // Sample 4 is the next control tick
        step(&mut seq, &mut io, &mut args);
        assert!(seq.is_active());
    }

    #[test]
    fn test_gate_pulse_runs_at_audio_rate() {
        let (mut seq, mut io, mut args) = rig(2);
        io.param_mut(seq.weight_param(0)).set_value(10.0);

        press(&mut io, seq.activate_param());
        step(&mut seq, &mut io, &mut args);
        press(&mut io, seq.advance_param());
        step(&mut seq, &mut io, &mut args);
        assert!(seq.slot_is_armed(0));

        // A 1.01s gate at 44.1kHz spans ~44541 samples
        let samples = (GATE_SECONDS * args.sample_rate) as usize;
        for _ in 0..samples / 2 {
            step(&mut seq, &mut io, &mut args);
        }
        assert_eq!(io.output(seq.trigger_output(0)).voltage(0), GATE_VOLTS);

        for _ in 0..samples {
            step(&mut seq, &mut io, &mut args);
        }
        assert_eq!(io.output(seq.trigger_output(0)).voltage(0), 0.0);
        assert!(!seq.slot_is_armed(0));
    }

    #[test]
    fn test_advance_to_out_of_range_is_noop() {
        let (mut seq, mut io, mut args) = rig(2);
        press(&mut io, seq.activate_param());
        step(&mut seq, &mut io, &mut args);

        seq.advance_to(99);
        assert!(seq.is_active());
        assert!(!seq.slot_is_armed(0));
        assert!(!seq.slot_is_armed(1));
    }

    #[test]
    fn test_chained_cycle() {
        // Activate → advance → re-activate → advance, as a chained patch
        // of these modules would be driven
        let (mut seq, mut io, mut args) = rig(2);
        io.param_mut(seq.weight_param(1)).set_value(5.0);

        for _ in 0..3 {
            press(&mut io, seq.activate_param());
            step(&mut seq, &mut io, &mut args);
            assert!(seq.is_active());

            press(&mut io, seq.advance_param());
            step(&mut seq, &mut io, &mut args);
            assert!(!seq.is_active());
            assert!(seq.slot_is_lit(1));

            release(&mut io, seq.activate_param());
            release(&mut io, seq.advance_param());
            step(&mut seq, &mut io, &mut args);
        }
    }
}
