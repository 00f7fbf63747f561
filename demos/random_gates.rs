//! Random Gates Demo
//!
//! Drives a 5-slot sequencer from a simulated 2 Hz clock on the advance
//! input, re-activating it before each pulse, and tallies which trigger
//! output fires each beat. With weights 1..5 the distribution should slope
//! toward the last slot.
//!
//! Run with: cargo run --example random_gates

use switchyard::prelude::*;

fn main() {
    let sample_rate = 44100.0;
    let mut io = ModuleIo::new();

    let config = SequencerConfig {
        weight_range: WeightRange::FINE,
        ..Default::default()
    };
    let mut seq = Switchyard::new(config, &mut io).unwrap();

    // Patch cables: clock into advance, all trigger outputs out
    io.input_mut(seq.advance_input()).set_connected(true);
    for i in 0..seq.slot_count() {
        io.output_mut(seq.trigger_output(i)).set_connected(true);
    }

    // Slope the odds: slot 5 is five times as likely as slot 1
    for i in 0..seq.slot_count() {
        io.param_mut(seq.weight_param(i)).set_value((i + 1) as f64);
    }

    let mut args = ProcessArgs::new(sample_rate);
    let mut fires = vec![0usize; seq.slot_count()];

    let beats = 200;
    let half_period = (sample_rate / 2.0 / 2.0) as usize; // 2 Hz clock

    for _ in 0..beats {
        // Clock high; the activate button is held so the machine re-arms
        // on the same control tick the advance edge lands
        io.param_mut(seq.activate_param()).set_value(1.0);
        io.input_mut(seq.advance_input()).set_voltage(5.0, 0);
        for _ in 0..half_period {
            seq.process(&args, &mut io);
            args.advance();
        }

        // Exactly one fade light is lit after a transition: that's the
        // slot this beat landed on
        if let Some(chosen) = (0..seq.slot_count()).find(|&i| seq.slot_is_lit(i)) {
            fires[chosen] += 1;
        }

        // Clock low, button released
        io.param_mut(seq.activate_param()).set_value(0.0);
        io.input_mut(seq.advance_input()).set_voltage(0.0, 0);
        for _ in 0..half_period {
            seq.process(&args, &mut io);
            args.advance();
        }
    }

    println!("{} beats across {} slots:", beats, seq.slot_count());
    let total_weight: f64 = (1..=seq.slot_count()).map(|w| w as f64).sum();
    for (i, count) in fires.iter().enumerate() {
        let expected = (i + 1) as f64 / total_weight * beats as f64;
        println!(
            "  slot {}: {:3} fires (expected ~{:.0})  {}",
            i + 1,
            count,
            expected,
            "#".repeat(*count / 2)
        );
    }
}
