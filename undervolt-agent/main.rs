use clap::{Parser, Subcommand};

use undervolt::surface::{endpoint_name, ControlSurface};
use undervolt::{config, DevMsr, UndervoltError, VoltageController};
use undervolt_raw::PlaneIndex;

#[derive(Parser, Debug)]
#[command(name = "undervolt")]
#[command(about = "Per-plane voltage offset control for Intel CPUs")]
struct Args {
    #[command(subcommand)]
    command: Command,

    #[arg(
        long,
        default_value_t = 0,
        help = "CPU whose MSR device carries the requests (the voltage mailbox is package-scoped)"
    )]
    cpu: u32,

    #[arg(short, long, help = "Enable verbose logging (shows all MSR traffic)")]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Read the current offset of one plane, in millivolts
    Read {
        /// Plane endpoint: cpu, gpu, cache, system_agent, analog_io
        plane: String,
    },
    /// Program a new offset for one plane; must be zero or negative
    Write {
        /// Plane endpoint: cpu, gpu, cache, system_agent, analog_io
        plane: String,
        /// Offset in millivolts, e.g. -50 or -50.25
        #[arg(allow_hyphen_values = true)]
        millivolts: String,
    },
    /// Read the current offset of every plane
    Status,
}

fn check_permissions(cpu: u32) {
    let msr_path = format!("/dev/cpu/{cpu}/msr");
    if std::fs::metadata(&msr_path).is_err() {
        eprintln!("\n⚠️  ERROR: Cannot access {msr_path}\n\nThe MSR kernel module may not be loaded.\nRun: sudo modprobe msr\n");
        std::process::exit(1);
    }

    // Try to open MSR to check actual permissions
    if let Err(e) = std::fs::File::open(&msr_path) {
        if e.kind() == std::io::ErrorKind::PermissionDenied {
            eprintln!("\n⚠️  ERROR: Permission denied accessing {msr_path}\n\nVoltage control needs root or CAP_SYS_RAWIO.\n");
            std::process::exit(1);
        }
    }
}

/// Refuse to touch the voltage mailbox on non-Intel hardware
fn check_vendor() -> anyhow::Result<()> {
    let cpuinfo = std::fs::read_to_string("/proc/cpuinfo")
        .map_err(|e| anyhow::anyhow!("Failed to read /proc/cpuinfo: {e}"))?;

    let mut vendors = cpuinfo
        .lines()
        .filter(|line| line.starts_with("vendor_id"))
        .peekable();

    if vendors.peek().is_none() {
        anyhow::bail!("No vendor_id found in /proc/cpuinfo");
    }

    if vendors.any(|line| !line.contains("GenuineIntel")) {
        anyhow::bail!("This tool only works on Intel CPUs");
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Setup logging based on verbose flag
    let log_level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt().with_max_level(log_level).init();

    check_permissions(args.cpu);
    check_vendor()?;

    if !config::cpu_is_online(args.cpu) {
        anyhow::bail!("CPU {} is not online", args.cpu);
    }

    let controller = VoltageController::new(DevMsr::instance(), args.cpu);
    let surface = ControlSurface::new(controller);

    let result = match &args.command {
        Command::Read { plane } => surface.show(plane).map(|mv| println!("{mv}")),
        Command::Write { plane, millivolts } => surface.store(plane, millivolts),
        Command::Status => {
            for plane in PlaneIndex::ALL {
                let name = endpoint_name(plane);
                match surface.show(name) {
                    Ok(mv) => println!("{name}: {mv} mV"),
                    Err(e) => eprintln!("{name}: {e}"),
                }
            }
            Ok(())
        }
    };

    if let Err(err) = result {
        if let UndervoltError::InvalidArgument(msg) = &err {
            // Operator mistakes exit with EINVAL, matching the control
            // surface's invalid-argument signaling.
            eprintln!("undervolt: {msg}");
            std::process::exit(libc::EINVAL);
        }
        return Err(err.into());
    }

    Ok(())
}
