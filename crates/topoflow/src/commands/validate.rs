use colored::Colorize;
use topoflow::{DeployError, interpret_services, read_request};

pub fn handle(request: &str) -> Result<(), DeployError> {
    let request = read_request(request)?;
    let services = interpret_services(&request)?;

    eprintln!("{}", "✓ Request is valid".green().bold());
    eprintln!();
    eprintln!("Services: {}", services.len());
    for service in &services {
        eprintln!(
            "  - {} ({}, port {}, tag {})",
            service.name.cyan(),
            service.slug(),
            service.port(),
            service.tag()
        );
    }

    Ok(())
}
