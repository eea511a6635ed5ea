//! Subnet calculator.

use clap::Args;

use toolbox_core::error::AppError;
use toolbox_service::network::{calculate, parse_ip, parse_prefix};

use crate::output::{self, OutputFormat};

/// Arguments for the ipcalc command
#[derive(Debug, Args)]
pub struct IpcalcArgs {
    /// IPv4 or IPv6 address
    pub ip: String,
    /// Prefix length (0-32 for IPv4, 0-128 for IPv6)
    pub prefix: String,
}

/// Execute the ipcalc command
pub fn execute(args: &IpcalcArgs, format: OutputFormat) -> Result<(), AppError> {
    let ip = parse_ip(&args.ip)?;
    let prefix = parse_prefix(&args.prefix)?;
    let info = calculate(ip, prefix)?;
    output::print_record(&info, format);
    Ok(())
}
