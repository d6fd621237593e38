use cartpilot_engine::config::DriverConfig;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use serde_json::{Map, Value, json};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

/// Standard port for chromedriver
pub const DEFAULT_CHROMEDRIVER_PORT: u16 = 9515;

/// Common paths where chromedriver might be installed
const CHROMEDRIVER_PATHS: &[&str] = &[
    "/usr/bin/chromedriver",
    "/usr/local/bin/chromedriver",
    "/usr/lib/chromium/chromedriver",
    "/usr/lib/chromium-browser/chromedriver",
    "/snap/bin/chromium.chromedriver",
    "/opt/homebrew/bin/chromedriver",
];

/// Chrome switches applied to every session.
const BASE_ARGS: &[&str] = &[
    "--no-sandbox",
    "--disable-dev-shm-usage",
    "--disable-gpu",
    "--disable-extensions",
    "--disable-notifications",
    "--disable-popup-blocking",
    "--log-level=3",
    "--disable-logging",
    "--silent",
];

const READY_ATTEMPTS: u32 = 30;
const READY_INTERVAL: Duration = Duration::from_millis(200);

pub fn local_url(port: u16) -> String {
    format!("http://localhost:{}", port)
}

/// Find the chromedriver binary: explicit path, then PATH, then common locations.
pub fn find_chromedriver_binary(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return path.exists().then(|| path.to_path_buf());
    }

    if let Ok(output) = Command::new("which").arg("chromedriver").output()
        && output.status.success()
        && let Ok(path) = String::from_utf8(output.stdout)
    {
        let path = path.trim();
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    CHROMEDRIVER_PATHS
        .iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
}

/// Handle to a running chromedriver process.
pub struct ChromedriverProcess {
    child: Child,
    port: u16,
    released: bool,
}

impl ChromedriverProcess {
    pub fn webdriver_url(&self) -> String {
        local_url(self.port)
    }

    pub fn pid(&self) -> u32 {
        self.child.id()
    }

    /// Leave the process running after this handle is dropped.
    pub fn release(mut self) {
        info!("Leaving chromedriver (PID {}) running", self.child.id());
        self.released = true;
    }

    fn terminate(&mut self) {
        let pid = Pid::from_raw(self.child.id() as i32);
        if let Err(e) = signal::kill(pid, Signal::SIGTERM) {
            warn!("SIGTERM to chromedriver failed ({}), killing", e);
            let _ = self.child.kill();
        }
        let _ = self.child.wait();
    }
}

impl Drop for ChromedriverProcess {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        info!("Shutting down chromedriver...");
        self.terminate();
    }
}

/// Spawn chromedriver on `port` and wait for its `/status` endpoint.
pub async fn launch_chromedriver(binary: &Path, port: u16) -> Result<ChromedriverProcess, String> {
    info!("Launching chromedriver from: {}", binary.display());

    let child = Command::new(binary)
        .arg(format!("--port={}", port))
        .arg("--silent")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| format!("Failed to launch chromedriver: {}", e))?;

    info!("chromedriver launched with PID: {}", child.id());
    let mut process = ChromedriverProcess {
        child,
        port,
        released: false,
    };

    let url = format!("{}/status", process.webdriver_url());
    let client = reqwest::Client::new();

    for attempt in 1..=READY_ATTEMPTS {
        sleep(READY_INTERVAL).await;

        match client.get(&url).send().await {
            Ok(resp) if resp.status().is_success() => {
                info!("chromedriver ready after {} attempts", attempt);
                return Ok(process);
            }
            Ok(_) => warn!("chromedriver responded but not ready yet (attempt {})", attempt),
            Err(_) => {
                if attempt % 5 == 0 {
                    info!("Waiting for chromedriver... (attempt {})", attempt);
                }
            }
        }
    }

    process.terminate();
    process.released = true;
    Err(format!(
        "chromedriver did not become ready on port {} within {:?}",
        port,
        READY_INTERVAL * READY_ATTEMPTS
    ))
}

/// W3C capabilities for a Chrome session configured from `config`.
pub fn chrome_capabilities(config: &DriverConfig) -> Map<String, Value> {
    let mut args: Vec<String> = BASE_ARGS.iter().map(|a| a.to_string()).collect();
    args.push(format!("--user-agent={}", config.user_agent));
    if config.headless {
        args.push("--headless=new".to_string());
    } else {
        args.push("--start-maximized".to_string());
    }

    let mut chrome = Map::new();
    chrome.insert("args".to_string(), json!(args));
    chrome.insert("excludeSwitches".to_string(), json!(["enable-logging"]));
    chrome.insert("useAutomationExtension".to_string(), json!(false));
    if config.keep_browser_open {
        chrome.insert("detach".to_string(), json!(true));
    }

    let mut caps = Map::new();
    caps.insert("browserName".to_string(), json!("chrome"));
    caps.insert("goog:chromeOptions".to_string(), Value::Object(chrome));
    caps
}
