use super::config::BridgeConfig;
use super::error::{AdbError, AdbResult};
use super::locate::BridgeLocator;
use super::runner::{ProcessRunner, SystemRunner};
use super::session::DeviceSession;
use super::types::Device;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Runs adb invocations, synchronously or on the blocking pool.
///
/// Cloning is cheap; clones share the binary path, runner and limiter, so
/// one bridge can serve any number of [`DeviceSession`]s.
#[derive(Clone)]
pub struct CommandBridge {
    inner: Arc<BridgeInner>,
}

struct BridgeInner {
    adb_path: PathBuf,
    runner: Arc<dyn ProcessRunner>,
    limiter: Arc<Semaphore>,
    max_workers: usize,
}

impl CommandBridge {
    pub fn new(adb_path: impl Into<PathBuf>, config: &BridgeConfig) -> Self {
        Self::with_runner(
            adb_path,
            config.max_workers,
            Arc::new(SystemRunner::new(config.suppress_window)),
        )
    }

    pub fn with_runner(
        adb_path: impl Into<PathBuf>,
        max_workers: usize,
        runner: Arc<dyn ProcessRunner>,
    ) -> Self {
        let max_workers = max_workers.max(1);
        Self {
            inner: Arc::new(BridgeInner {
                adb_path: adb_path.into(),
                runner,
                limiter: Arc::new(Semaphore::new(max_workers)),
                max_workers,
            }),
        }
    }

    /// Resolve the binary (config first, then `locator`) and connect to the
    /// configured local port, if any.
    pub fn bootstrap(config: &BridgeConfig, locator: &dyn BridgeLocator) -> AdbResult<Self> {
        let adb_path = match &config.adb_path {
            Some(path) => path.clone(),
            None => locator.locate()?,
        };
        let bridge = Self::new(adb_path, config);
        if let Some(port) = config.connect_port {
            let out = bridge.connect(port)?;
            log::info!("adb connect 127.0.0.1:{port}: {}", out.trim());
        }
        Ok(bridge)
    }

    pub fn adb_path(&self) -> &Path {
        &self.inner.adb_path
    }

    pub fn max_workers(&self) -> usize {
        self.inner.max_workers
    }

    /// Stop accepting async work. Calls already holding a slot finish normally.
    pub fn shutdown(&self) {
        log::debug!("Shutting down command bridge");
        self.inner.limiter.close();
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.limiter.is_closed()
    }

    /// Run adb with `args` and no device selector.
    pub fn run(&self, args: &[&str]) -> AdbResult<Vec<u8>> {
        if self.is_shut_down() {
            return Err(AdbError::ShutDown);
        }
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        self.inner.runner.run(&self.inner.adb_path, &args)
    }

    pub fn connect(&self, port: u16) -> AdbResult<String> {
        let target = format!("127.0.0.1:{port}");
        let out = self.run(&["connect", target.as_str()])?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    /// `adb devices`, in listing order. Any failure is reported as
    /// [`AdbError::DeviceListing`].
    pub fn list_devices(&self) -> AdbResult<Vec<Device>> {
        let out = self.run(&["devices"]).map_err(|e| AdbError::DeviceListing {
            source: Box::new(e),
        })?;
        Ok(Self::parse_devices(&String::from_utf8_lossy(&out)))
    }

    pub async fn list_devices_async(&self) -> AdbResult<Vec<Device>> {
        self.spawn_limited(|bridge| bridge.list_devices()).await
    }

    /// Parse `adb devices` output: the header line is dropped, as is every
    /// line without a tab (blank lines, daemon start-up chatter).
    pub fn parse_devices(output: &str) -> Vec<Device> {
        output
            .lines()
            .skip(1)
            .filter_map(|line| {
                let (serial, state) = line.split_once('\t')?;
                let serial = serial.trim();
                if serial.is_empty() {
                    return None;
                }
                Some(Device {
                    serial: serial.to_string(),
                    state: state.trim().to_string(),
                })
            })
            .collect()
    }

    /// `adb -s <device> <args...>`, blocking the calling thread.
    pub fn execute(&self, device: &str, args: &[&str]) -> AdbResult<Vec<u8>> {
        if self.is_shut_down() {
            return Err(AdbError::ShutDown);
        }
        let argv = device_argv(device, args);
        self.inner.runner.run(&self.inner.adb_path, &argv)
    }

    /// Like [`execute`](Self::execute), but waits for a free slot and runs on
    /// the blocking pool.
    pub async fn execute_async(&self, device: &str, args: &[&str]) -> AdbResult<Vec<u8>> {
        let device = device.to_string();
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        self.spawn_limited(move |bridge| {
            let args: Vec<&str> = args.iter().map(String::as_str).collect();
            bridge.execute(&device, &args)
        })
        .await
    }

    /// Run blocking `job` on the worker pool once a limiter slot is free.
    ///
    /// The slot travels with the job, so it is held until the job returns
    /// even if the awaiting future is dropped first.
    pub async fn spawn_limited<T, F>(&self, job: F) -> AdbResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&CommandBridge) -> AdbResult<T> + Send + 'static,
    {
        let permit = Arc::clone(&self.inner.limiter)
            .acquire_owned()
            .await
            .map_err(|_| AdbError::ShutDown)?;
        let bridge = self.clone();
        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            job(&bridge)
        })
        .await?
    }

    /// Open a session on `serial`, or on the first listed device.
    pub fn open_device(&self, serial: Option<&str>) -> AdbResult<DeviceSession> {
        let serial = match serial {
            Some(s) => s.to_string(),
            None => self.first_device()?,
        };
        DeviceSession::open(self.clone(), serial)
    }

    pub async fn open_device_async(&self, serial: Option<&str>) -> AdbResult<DeviceSession> {
        let serial = serial.map(str::to_string);
        self.spawn_limited(move |bridge| bridge.open_device(serial.as_deref()))
            .await
    }

    fn first_device(&self) -> AdbResult<String> {
        self.list_devices()?
            .into_iter()
            .next()
            .map(|d| d.serial)
            .ok_or(AdbError::NoDevices)
    }
}

impl std::fmt::Debug for CommandBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandBridge")
            .field("adb_path", &self.inner.adb_path)
            .field("max_workers", &self.inner.max_workers)
            .field("shut_down", &self.is_shut_down())
            .finish()
    }
}

fn device_argv(device: &str, args: &[&str]) -> Vec<String> {
    let mut argv = Vec::with_capacity(args.len() + 2);
    argv.push("-s".to_string());
    argv.push(device.to_string());
    argv.extend(args.iter().map(|a| a.to_string()));
    argv
}
