//! Board information

use ymfbus_core::{GpioController, NativeSpi, SpiBus, Transport, TransportFeatures};

/// Print the configured chips, their wiring and the transport capabilities
pub fn print_info<B: SpiBus, G: GpioController>(ymf: &NativeSpi<B, G>) {
    let features = ymf.features();

    println!("Chips:       {}", ymf.available_chips());
    println!("Target:      {}", ymf.current_target());
    println!("Read:        {}", yes_no(features.contains(TransportFeatures::READ)));
    println!(
        "Reset:       {}",
        yes_no(features.contains(TransportFeatures::HARDWARE_RESET))
    );
    println!();

    println!("{:<6} {:>6} {:>6}", "Slot", "CS", "Reset");
    println!("{}", "-".repeat(20));
    for chip in ymf.available_chips().chips() {
        let Some(pins) = ymf.pin_config(chip) else {
            continue;
        };
        let reset = pins
            .reset_pin()
            .map_or_else(|| "-".to_string(), |pin| pin.to_string());
        println!(
            "{:<6} {:>6} {:>6}",
            chip.to_string(),
            pins.cs_pin().to_string(),
            reset
        );
    }

    let shared: Vec<String> = ymf.reset_pins().iter().map(|p| p.to_string()).collect();
    if !shared.is_empty() {
        println!();
        println!("Reset lines: {}", shared.join(", "));
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}
