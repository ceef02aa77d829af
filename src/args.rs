use adb_vision::template_matching::ScreenCut;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    Devices,
    Screenshot { output: PathBuf },
    Find { template: PathBuf, click: bool },
}

#[derive(Debug)]
pub struct Args {
    pub mode: Mode,
    pub device: Option<String>,
    pub threshold: Option<f32>,
    /// `(cols, rows, index)` grid cell to restrict matching to
    pub cell: Option<(u32, u32, u32)>,
    pub debug_mode: bool,
}

impl Args {
    pub fn parse() -> Option<Self> {
        let args: Vec<String> = env::args().skip(1).collect();
        Self::parse_from(&args)
    }

    pub fn parse_from(args: &[String]) -> Option<Self> {
        let mut mode: Option<Mode> = None;
        let mut device = None;
        let mut threshold = None;
        let mut cell = None;
        let mut click = false;
        let mut debug_mode = false;

        for arg in args {
            if arg == "--help" || arg == "-h" {
                print_help();
                return None;
            } else if arg == "--version" || arg == "-v" {
                println!("adb-vision v{} ({})", env!("APP_VERSION_DISPLAY"), env!("APP_BUILD_YEAR"));
                return None;
            } else if arg == "--debug" {
                debug_mode = true;
            } else if arg == "--devices" || arg == "-l" {
                mode = Some(Mode::Devices);
            } else if arg == "--screenshot" || arg == "-s" {
                mode = Some(Mode::Screenshot {
                    output: PathBuf::from("cli-screenshot.png"),
                });
            } else if let Some(path) = arg.strip_prefix("--screenshot=") {
                mode = Some(Mode::Screenshot {
                    output: PathBuf::from(path),
                });
            } else if let Some(path) = arg.strip_prefix("--find=") {
                mode = Some(Mode::Find {
                    template: PathBuf::from(path),
                    click: false,
                });
            } else if arg == "--click" {
                click = true;
            } else if let Some(serial) = arg.strip_prefix("--device=") {
                device = Some(serial.to_string());
            } else if let Some(val) = arg.strip_prefix("--threshold=") {
                match val.parse::<f32>() {
                    Ok(t) if (-1.0..=1.0).contains(&t) => threshold = Some(t),
                    _ => {
                        eprintln!("❌ Invalid threshold value: {}", val);
                        return None;
                    }
                }
            } else if let Some(val) = arg.strip_prefix("--cell=") {
                match parse_cell(val) {
                    Some(c) => cell = Some(c),
                    None => {
                        eprintln!("❌ Invalid cell '{}', expected COLS,ROWS,INDEX", val);
                        return None;
                    }
                }
            } else {
                eprintln!("❌ Unknown argument: {}", arg);
                print_help();
                return None;
            }
        }

        let mode = match mode.unwrap_or(Mode::Devices) {
            Mode::Find { template, .. } => Mode::Find { template, click },
            other => other,
        };

        Some(Args {
            mode,
            device,
            threshold,
            cell,
            debug_mode,
        })
    }

    /// The `--cell` grid cell, counted row-major from 1 at the top-left.
    pub fn screen_cut(&self) -> Option<ScreenCut> {
        self.cell.map(|(cols, rows, index)| {
            let i = index - 1;
            ScreenCut::cell(cols, rows, i % cols, i / cols)
        })
    }
}

fn parse_cell(val: &str) -> Option<(u32, u32, u32)> {
    let parts: Vec<u32> = val
        .split(',')
        .map(|p| p.trim().parse::<u32>())
        .collect::<Result<_, _>>()
        .ok()?;
    let [cols, rows, index] = parts.as_slice() else {
        return None;
    };
    let cells = u64::from(*cols) * u64::from(*rows);
    (cells > 0 && *index > 0 && u64::from(*index) <= cells).then_some((*cols, *rows, *index))
}

fn print_help() {
    println!("🤖 adb-vision - Android automation over adb");
    println!();
    println!("USAGE:");
    println!("    adb-vision [FLAGS]");
    println!();
    println!("FLAGS:");
    println!("    (no flags)            List attached devices");
    println!("    --devices, -l         List attached devices");
    println!("    --screenshot[=PATH]   Save a screenshot (default cli-screenshot.png)");
    println!("    --find=TEMPLATE       Locate TEMPLATE (an image file) on screen");
    println!("    --click               With --find, tap the first match");
    println!("    --threshold=T         Match threshold (default 0.9)");
    println!("    --cell=C,R,I          Only search cell I (1 = top-left, row-major) of a C x R grid");
    println!("    --device=SERIAL       Use SERIAL instead of the first device");
    println!("    --debug               Enable debug logging");
    println!("    --help, -h            Show this help message");
    println!("    --version, -v         Show version information");
    println!();
    println!("ENVIRONMENT:");
    println!("    ADB_PATH, ADB_CONNECT_PORT (0 = no connect), ADB_MAX_WORKERS, RUST_LOG");
    println!();
    println!("EXAMPLES:");
    println!("    adb-vision --screenshot");
    println!("    adb-vision --find=assets/ok_button.png --click");
    println!("    adb-vision --find=icon.png --cell=3,3,5 --threshold=0.85");
}
