use std::env;
use std::process::Command;
use time::OffsetDateTime;

fn main() {
    println!("cargo:rerun-if-env-changed=SOURCE_DATE_EPOCH");

    let build_year = env::var("SOURCE_DATE_EPOCH")
        .ok()
        .and_then(|raw| raw.parse::<i64>().ok())
        .and_then(|epoch| OffsetDateTime::from_unix_timestamp(epoch).ok())
        .map(|dt| dt.year())
        .unwrap_or_else(|| OffsetDateTime::now_utc().year());
    println!("cargo:rustc-env=APP_BUILD_YEAR={build_year}");

    let version = env::var("CARGO_PKG_VERSION").unwrap_or_else(|_| "0.0.0".to_string());

    // Untagged debug builds are marked -dev; release builds skip git entirely
    let display = if env::var("PROFILE").as_deref() == Ok("release") {
        version
    } else {
        println!("cargo:rerun-if-changed=.git/HEAD");
        let tagged = Command::new("git")
            .args(["describe", "--tags", "--exact-match"])
            .output()
            .ok()
            .filter(|out| out.status.success())
            .and_then(|out| String::from_utf8(out.stdout).ok())
            .is_some_and(|tag| tag.trim() == format!("v{version}"));
        if tagged { version } else { format!("{version}-dev") }
    };
    println!("cargo:rustc-env=APP_VERSION_DISPLAY={display}");
}
