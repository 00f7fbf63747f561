//! Trigger Primitives
//!
//! Small per-sample building blocks the sequencer is assembled from: edge
//! detection over control voltages, fixed-width gate pulse generation, and
//! the fading panel-light animator. Each one holds a key into the host's
//! [`ModuleIo`] arena and degrades to a no-op when its target is unbound or
//! disconnected — on a real-time audio path a silently safe default beats a
//! reported fault.

use crate::port::{InputId, LightId, ModuleIo, OutputId, ParamId, ProcessArgs};

/// Voltage at which a rising edge fires.
pub const TRIGGER_HIGH_VOLTS: f64 = 1.0;

/// Voltage at which a fired detector re-arms. The 0.1–1.0V band rejects
/// chatter from noisy or slowly moving control voltages.
pub const TRIGGER_LOW_VOLTS: f64 = 0.1;

/// Gate-high level driven on trigger outputs.
pub const GATE_VOLTS: f64 = 10.0;

/// Gate pulse width. Slightly over one second so downstream trigger inputs
/// with minimum-width requirements detect the event even under host hitches.
pub const GATE_SECONDS: f64 = 1.01;

/// Fade pulse length for panel lights.
pub const FADE_SECONDS: f64 = 0.5;

/// Brightness floor a fade decays to.
pub const FADE_FLOOR: f64 = 0.3;

/// Press threshold for momentary 0..1 button params.
pub const BUTTON_THRESHOLD: f64 = 0.5;

/// Rising-edge detector with hysteresis over a CV input port.
///
/// `process` returns `true` exactly once per qualifying rising edge: it
/// fires when the voltage first reaches [`TRIGGER_HIGH_VOLTS`] and will not
/// fire again until the voltage has fallen back to [`TRIGGER_LOW_VOLTS`].
/// The rise check runs before the fall check within one call, so a pulse
/// crossing both thresholds inside a single evaluation window fires the
/// rise and re-arms on a later call.
#[derive(Debug, Clone, Default)]
pub struct EdgeDetector {
    input: Option<InputId>,
    active: bool,
}

impl EdgeDetector {
    pub fn new(input: InputId) -> Self {
        Self {
            input: Some(input),
            active: false,
        }
    }

    /// A detector with no input bound yet; `process` returns `false` until
    /// [`bind`](Self::bind) is called.
    pub fn unbound() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, input: InputId) {
        self.input = Some(input);
    }

    /// Whether the detector is currently above the firing threshold
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn process(&mut self, io: &ModuleIo) -> bool {
        let Some(input) = self.input else {
            return false;
        };
        let port = io.input(input);
        if !port.is_connected() {
            return false;
        }
        let volts = port.voltage(0);
        if !self.active && volts >= TRIGGER_HIGH_VOLTS {
            self.active = true;
            return true;
        }
        if self.active && volts <= TRIGGER_LOW_VOLTS {
            self.active = false;
        }
        false
    }
}

/// Fixed-width gate pulse emitter on an output port.
///
/// After [`trigger`](Self::trigger) the bound output is driven at
/// [`GATE_VOLTS`] for [`GATE_SECONDS`], then held at 0V. The countdown is
/// allowed to run negative; it self-corrects to idle on the next call.
#[derive(Debug, Clone)]
pub struct PulseTimer {
    output: Option<OutputId>,
    seconds_left: f64,
}

impl Default for PulseTimer {
    fn default() -> Self {
        Self {
            output: None,
            seconds_left: -1.0,
        }
    }
}

impl PulseTimer {
    pub fn new(output: OutputId) -> Self {
        Self {
            output: Some(output),
            seconds_left: -1.0,
        }
    }

    pub fn unbound() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, output: OutputId) {
        self.output = Some(output);
    }

    /// Arm the pulse for a full [`GATE_SECONDS`] width
    pub fn trigger(&mut self) {
        self.seconds_left = GATE_SECONDS;
    }

    /// Whether a pulse is currently running
    pub fn is_armed(&self) -> bool {
        self.seconds_left >= 0.0
    }

    pub fn process(&mut self, args: &ProcessArgs, io: &mut ModuleIo) {
        let Some(output) = self.output else {
            return;
        };
        if !io.output(output).is_connected() {
            return;
        }
        if self.seconds_left < 0.0 {
            io.output_mut(output).set_voltage(0.0, 0);
            return;
        }
        io.output_mut(output).set_voltage(GATE_VOLTS, 0);
        self.seconds_left -= args.sample_time;
    }
}

/// Linear-decay brightness animator for a panel light.
///
/// After [`trigger`](Self::trigger) the brightness starts at 1.0 and decays
/// linearly to [`FADE_FLOOR`] over [`FADE_SECONDS`]. The countdown clamps at
/// zero once exhausted, so a finished fade holds the floor glow rather than
/// going dark; only [`reset`](Self::reset) returns the light to idle. This
/// floor-holding idle is inherited behavior, kept deliberately.
///
/// Idle is tracked by a separate flag, not the countdown: the clamp parks an
/// exhausted countdown at zero, so the countdown alone cannot tell a spent
/// fade from one that was never started.
#[derive(Debug, Clone)]
pub struct FadingLight {
    light: Option<LightId>,
    seconds_left: f64,
    brightness: f64,
    idle: bool,
}

impl Default for FadingLight {
    fn default() -> Self {
        Self {
            light: None,
            seconds_left: -1.0,
            brightness: 0.0,
            idle: true,
        }
    }
}

impl FadingLight {
    pub fn new(light: LightId) -> Self {
        Self {
            light: Some(light),
            seconds_left: -1.0,
            brightness: 0.0,
            idle: true,
        }
    }

    pub fn unbound() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, light: LightId) {
        self.light = Some(light);
    }

    /// Start (or restart) the fade at full brightness
    pub fn trigger(&mut self) {
        self.seconds_left = FADE_SECONDS;
        self.idle = false;
    }

    /// Force the light back to idle, cancelling any running fade
    pub fn reset(&mut self) {
        self.seconds_left = -1.0;
        self.brightness = 0.0;
        self.idle = true;
    }

    /// Whether a fade has been triggered and not reset since
    pub fn is_lit(&self) -> bool {
        !self.idle
    }

    /// Last brightness written to the light
    pub fn brightness(&self) -> f64 {
        self.brightness
    }

    /// Advance the fade and drive the bound light.
    ///
    /// `frames` is the number of sample frames amortized into this call —
    /// light refresh runs at a divided rate, so one call accounts for a
    /// whole divider period of elapsed time.
    pub fn process(&mut self, args: &ProcessArgs, io: &mut ModuleIo, frames: u32) {
        let Some(light) = self.light else {
            return;
        };
        if self.seconds_left < 0.0 {
            self.brightness = 0.0;
        }
        // Lerp between the floor and full brightness by fraction remaining.
        // Overwrites the idle value above unconditionally (inherited).
        self.brightness = (self.seconds_left / FADE_SECONDS) * (1.0 - FADE_FLOOR) + FADE_FLOOR;
        io.light_mut(light).set_brightness(self.brightness);
        self.seconds_left -= args.sample_time * frames as f64;
        if self.seconds_left < 0.0 {
            self.seconds_left = 0.0;
        }
    }
}

/// Rising-edge detector over a momentary 0..1 button param.
///
/// Same one-shot semantics as [`EdgeDetector`], with a single
/// [`BUTTON_THRESHOLD`] instead of a hysteresis band.
#[derive(Debug, Clone, Default)]
pub struct ButtonTrigger {
    param: Option<ParamId>,
    pressed: bool,
}

impl ButtonTrigger {
    pub fn new(param: ParamId) -> Self {
        Self {
            param: Some(param),
            pressed: false,
        }
    }

    pub fn unbound() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, param: ParamId) {
        self.param = Some(param);
    }

    pub fn process(&mut self, io: &ModuleIo) -> bool {
        let Some(param) = self.param else {
            return false;
        };
        let value = io.param_value(param);
        if !self.pressed && value >= BUTTON_THRESHOLD {
            self.pressed = true;
            return true;
        }
        if self.pressed && value < BUTTON_THRESHOLD {
            self.pressed = false;
        }
        false
    }
}

/// Modulo rate divider: `tick` returns `true` on the first call and every
/// `period`-th call after. Control logic and light refresh run behind one of
/// these to trade responsiveness for CPU.
#[derive(Debug, Clone)]
pub struct FrameDivider {
    period: u32,
    counter: u32,
}

impl FrameDivider {
    /// A divider that fires every `period` calls; a period of 0 is treated
    /// as 1 (fire every call).
    pub fn new(period: u32) -> Self {
        Self {
            period: period.max(1),
            counter: 0,
        }
    }

    pub fn period(&self) -> u32 {
        self.period
    }

    pub fn tick(&mut self) -> bool {
        let fire = self.counter == 0;
        self.counter += 1;
        if self.counter >= self.period {
            self.counter = 0;
        }
        fire
    }
}
