//! List commands implementation

use crate::backends::{available_backends, BackendKind};

/// List all backends compiled into this binary
pub fn list_backends() {
    let backends = available_backends();

    if backends.is_empty() {
        println!("No backends available (recompile with backend features enabled)");
        return;
    }

    println!("Available backends:");
    println!();
    for b in &backends {
        let kind = match b.kind {
            BackendKind::Bus => "bus",
            BackendKind::Gpio => "gpio",
            BackendKind::Board => "bus+gpio",
        };
        println!("  {:12} {:9} - {}", b.name, kind, b.description);
        if !b.aliases.is_empty() {
            println!("  {:12} {:9}   aliases: {}", "", "", b.aliases.join(", "));
        }
    }
}
