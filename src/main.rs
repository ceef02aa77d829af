mod args;

use adb_vision::adb::{AdbResult, BridgeConfig, CommandBridge, DefaultLocator, FindOptions};
use args::{Args, Mode};

fn main() {
    let Some(args) = Args::parse() else {
        return;
    };
    init_logging(args.debug_mode);

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("❌ Failed to start runtime: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = rt.block_on(run(args)) {
        eprintln!("❌ {e}");
        std::process::exit(1);
    }
}

fn init_logging(debug: bool) {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if debug {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();
}

async fn run(args: Args) -> AdbResult<()> {
    let config = BridgeConfig::from_env();
    let bridge = CommandBridge::bootstrap(&config, &DefaultLocator::new())?;
    let cut = args.screen_cut();

    match args.mode {
        Mode::Devices => {
            let devices = bridge.list_devices_async().await?;
            if devices.is_empty() {
                println!("❌ No devices found");
            }
            for d in devices {
                println!("📱 {}\t{}", d.serial, d.state);
            }
        }
        Mode::Screenshot { output } => {
            let session = bridge.open_device_async(args.device.as_deref()).await?;
            let screen = session.capture_async().await?;
            screen
                .save(&output)
                .map_err(|source| adb_vision::AdbError::Encode { source })?;
            println!(
                "✅ Screenshot {}x{} from {} saved to {}",
                screen.width(),
                screen.height(),
                session.serial(),
                output.display()
            );
        }
        Mode::Find { template, click } => {
            let mut session = bridge.open_device_async(args.device.as_deref()).await?;
            let mut options = FindOptions::default();
            if let Some(t) = args.threshold {
                options = options.threshold(t);
            }
            if let Some(cut) = cut {
                let size = session.screen_size()?;
                options = options.within(cut.cut_screen(size));
            }

            if click {
                let center = session.click_first_match_async(&template, options).await?;
                println!("👆 Tapped {} at ({}, {})", template.display(), center.x, center.y);
            } else {
                let result = session.find_matches_async(&template, options).await?;
                if !result.matched() {
                    println!("❌ {} not found", template.display());
                }
                for (b, c) in result.boxes().iter().zip(result.centers()) {
                    let r = b.range();
                    println!(
                        "🎯 [{},{}]-[{},{}] center ({}, {})",
                        r.x0, r.y0, r.x1, r.y1, c.x, c.y
                    );
                }
            }
        }
    }

    bridge.shutdown();
    Ok(())
}
