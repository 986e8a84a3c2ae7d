use std::time::Duration;

use twinfresh::{ClientConfig, Controller, ProtocolVersion};

/// Reads the status of a controller, optionally applying one command first.
///
/// Usage: fan_status <host> [device-id] [password] [command [argument]]
/// Commands: on, off, speed <01-03>, direction <name|code>, sleep, party, humidity
/// Set TWINFRESH_V1=1 for controllers that speak the legacy protocol.
#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(host) = args.first() else {
        eprintln!("usage: fan_status <host> [device-id] [password] [command [argument]]");
        std::process::exit(2);
    };

    let mut config = ClientConfig::new(host.as_str()).with_timeout(Duration::from_secs(10));
    if let (Some(id), Some(password)) = (args.get(1), args.get(2)) {
        config = config.with_credentials(id.as_str(), password.as_str());
    }
    if std::env::var("TWINFRESH_V1").is_ok() {
        config = config.with_version(ProtocolVersion::V1);
    }

    let controller = match Controller::from_config(&config) {
        Ok(controller) => controller,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            std::process::exit(2);
        }
    };

    let command = args.get(3).map(String::as_str).unwrap_or("status");
    let argument = args.get(4).map(String::as_str).unwrap_or_default();

    if command == "humidity" {
        match controller.humidity().await {
            Ok(Some(h)) => println!("Humidity: {}%", h),
            Ok(None) => println!("Humidity: not reported"),
            Err(e) => eprintln!("Humidity read failed: {}", e),
        }
        return;
    }

    let result = match command {
        "on" => controller.power_on().await,
        "off" => controller.power_off().await,
        "speed" => controller.set_speed(argument).await,
        "direction" => controller.set_direction(argument).await,
        "sleep" => controller.sleep().await,
        "party" => controller.party().await,
        _ => controller.status().await,
    };

    match result {
        Ok(status) => {
            println!("Fan status:");
            println!("- Power: {}", if status.is_on { "on" } else { "off" });
            println!("- Speed: {}", status.speed);
            match status.direction {
                Some(direction) => println!("- Direction: {}", direction),
                None => println!("- Direction: unknown"),
            }
            println!("- Oscillating: {}", status.oscillating);
            println!("- Mode: {:?}", status.mode);
        }
        Err(e) => eprintln!("Command failed: {}", e),
    }
}
