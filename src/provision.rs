//! Analyzer binary acquisition and caching.
//!
//! Resolves a platform-specific Slither binary name, downloads it from the
//! release location following redirects manually (GitHub release assets
//! redirect to a CDN), and installs it atomically into the cache directory.
//! A file present at the install path with the executable bit set is a
//! complete install; partial downloads only ever exist under a temp name.

use crate::error::{GateError, Result};
use reqwest::blocking::Client;
use reqwest::header::LOCATION;
use reqwest::Url;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

pub const DEFAULT_BASE_URL: &str = "https://github.com/Grimmins/Vigil-3/releases/download/main";

const MAX_REDIRECTS: usize = 5;

/// Immutable acquisition settings, passed in at construction.
#[derive(Debug, Clone)]
pub struct ProvisionConfig {
    pub base_url: String,
    pub cache_dir: PathBuf,
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        ProvisionConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            cache_dir: default_cache_dir(),
        }
    }
}

/// Per-user cache directory: `~/.solgate`.
pub fn default_cache_dir() -> PathBuf {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".solgate")
}

/// Map an OS identifier (as in `std::env::consts::OS`) to the release asset
/// name for that platform.
pub fn binary_name(platform: &str) -> Result<&'static str> {
    match platform {
        "linux" => Ok("slither-linux"),
        "macos" => Ok("slither-macos"),
        "windows" => Ok("slither-win.exe"),
        other => Err(GateError::UnsupportedPlatform(other.to_string())),
    }
}

/// Downloads and caches the analyzer binary for one platform.
pub struct Provisioner {
    config: ProvisionConfig,
    platform: String,
}

impl Provisioner {
    pub fn new(config: ProvisionConfig) -> Self {
        Provisioner::for_platform(config, std::env::consts::OS)
    }

    pub fn for_platform(config: ProvisionConfig, platform: &str) -> Self {
        Provisioner {
            config,
            platform: platform.to_string(),
        }
    }

    /// Final on-disk location for this platform's binary.
    pub fn install_path(&self) -> Result<PathBuf> {
        Ok(self.config.cache_dir.join(binary_name(&self.platform)?))
    }

    /// Return the cached binary path, downloading it first if needed.
    ///
    /// Idempotent: a valid cache entry short-circuits before any network
    /// access. Acquisition is serialized per platform key so concurrent
    /// callers share one download instead of racing writes to the same path.
    pub fn ensure_binary(&self) -> Result<PathBuf> {
        let install = self.install_path()?;
        if is_installed(&install) {
            return Ok(install);
        }

        let lock = platform_lock(&self.platform);
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());
        // Another caller may have finished the install while we waited.
        if is_installed(&install) {
            return Ok(install);
        }

        fs::create_dir_all(&self.config.cache_dir)?;
        let url = format!("{}/{}", self.config.base_url, binary_name(&self.platform)?);
        let tmp = self
            .config
            .cache_dir
            .join(format!(".{}.part-{}", binary_name(&self.platform)?, std::process::id()));

        let downloaded = download(&url, &tmp);
        if let Err(err) = downloaded {
            let _ = fs::remove_file(&tmp);
            return Err(err);
        }

        if let Err(err) = set_executable(&tmp) {
            let _ = fs::remove_file(&tmp);
            return Err(err);
        }
        // Promote only after the body and permissions are complete.
        if let Err(err) = fs::rename(&tmp, &install) {
            let _ = fs::remove_file(&tmp);
            return Err(err.into());
        }
        Ok(install)
    }

    /// Remove this platform's cached binary, if present.
    pub fn prune(&self) -> Result<bool> {
        let install = self.install_path()?;
        if install.exists() {
            fs::remove_file(&install)?;
            return Ok(true);
        }
        Ok(false)
    }
}

/// A file at the install path counts only when fully promoted, which
/// includes the executable bit.
fn is_installed(install: &Path) -> bool {
    install.is_file() && is_executable(install)
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path)
        .map(|m| m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(_path: &Path) -> bool {
    true
}

#[cfg(unix)]
fn set_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))?;
    Ok(())
}

#[cfg(not(unix))]
fn set_executable(_path: &Path) -> Result<()> {
    Ok(())
}

/// GET `url` into `dest`, following up to `MAX_REDIRECTS` Location hops
/// manually. Relative Location values are resolved against the current URL.
fn download(url: &str, dest: &Path) -> Result<()> {
    let client = Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()?;

    let mut current =
        Url::parse(url).map_err(|_| GateError::InvalidUrl(url.to_string()))?;
    let mut redirects = 0;
    loop {
        let mut resp = client.get(current.clone()).send()?;
        let status = resp.status();

        if status.is_redirection() {
            if redirects >= MAX_REDIRECTS {
                return Err(GateError::TooManyRedirects {
                    url: url.to_string(),
                    limit: MAX_REDIRECTS,
                });
            }
            let location = resp
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .ok_or_else(|| GateError::MissingRedirectLocation {
                    url: current.to_string(),
                })?;
            current = current
                .join(location)
                .map_err(|_| GateError::MissingRedirectLocation {
                    url: current.to_string(),
                })?;
            redirects += 1;
            continue;
        }

        if !status.is_success() {
            return Err(GateError::DownloadStatus {
                url: current.to_string(),
                status: status.as_u16(),
            });
        }

        let mut out = fs::File::create(dest)?;
        resp.copy_to(&mut out)?;
        return Ok(());
    }
}

/// Process-wide single-flight locks, one per platform key.
fn platform_lock(platform: &str) -> Arc<Mutex<()>> {
    static LOCKS: OnceLock<Mutex<HashMap<String, Arc<Mutex<()>>>>> = OnceLock::new();
    let map = LOCKS.get_or_init(|| Mutex::new(HashMap::new()));
    let mut map = map.lock().unwrap_or_else(|e| e.into_inner());
    map.entry(platform.to_string()).or_default().clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use tempfile::tempdir;

    /// Serve one canned response per connection, counting connections, with
    /// a delay before each response to widen concurrency windows.
    fn serve_counting(
        response: String,
        delay: std::time::Duration,
    ) -> (String, Arc<std::sync::atomic::AtomicUsize>) {
        use std::sync::atomic::{AtomicUsize, Ordering};
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let hits_srv = hits.clone();
        std::thread::spawn(move || loop {
            let (mut stream, _) = match listener.accept() {
                Ok(s) => s,
                Err(_) => return,
            };
            hits_srv.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(delay);
            let mut buf = [0u8; 2048];
            let _ = stream.read(&mut buf);
            let _ = stream.write_all(response.as_bytes());
        });
        (format!("http://{}", addr), hits)
    }

    /// Serve each canned response to one connection, in order, then stop.
    fn serve(responses: Vec<String>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            for resp in responses {
                let (mut stream, _) = match listener.accept() {
                    Ok(s) => s,
                    Err(_) => return,
                };
                let mut buf = [0u8; 2048];
                let _ = stream.read(&mut buf);
                let _ = stream.write_all(resp.as_bytes());
            }
        });
        format!("http://{}", addr)
    }

    fn redirect_to(path: &str) -> String {
        format!(
            "HTTP/1.1 302 Found\r\nLocation: {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            path
        )
    }

    fn ok_body(body: &str) -> String {
        format!(
            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        )
    }

    fn status_only(line: &str) -> String {
        format!("HTTP/1.1 {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n", line)
    }

    fn provisioner(base_url: &str, cache: &Path) -> Provisioner {
        Provisioner::for_platform(
            ProvisionConfig {
                base_url: base_url.to_string(),
                cache_dir: cache.to_path_buf(),
            },
            "linux",
        )
    }

    #[test]
    fn test_platform_map() {
        assert_eq!(binary_name("linux").unwrap(), "slither-linux");
        assert_eq!(binary_name("macos").unwrap(), "slither-macos");
        assert_eq!(binary_name("windows").unwrap(), "slither-win.exe");
        match binary_name("freebsd") {
            Err(GateError::UnsupportedPlatform(p)) => assert_eq!(p, "freebsd"),
            other => panic!("expected UnsupportedPlatform, got {:?}", other),
        }
    }

    #[test]
    fn test_cached_binary_short_circuits_network() {
        let tmp = tempdir().unwrap();
        let install = tmp.path().join("slither-linux");
        fs::write(&install, b"binary").unwrap();
        set_executable(&install).unwrap();
        // Unroutable base URL: any network attempt would fail the call.
        let prov = provisioner("http://127.0.0.1:1", tmp.path());
        assert_eq!(prov.ensure_binary().unwrap(), install);
    }

    #[cfg(unix)]
    #[test]
    fn test_missing_exec_bit_means_not_installed() {
        use std::os::unix::fs::PermissionsExt;
        let tmp = tempdir().unwrap();
        let install = tmp.path().join("slither-linux");
        fs::write(&install, b"half").unwrap();
        fs::set_permissions(&install, fs::Permissions::from_mode(0o644)).unwrap();
        let base = serve(vec![ok_body("fresh")]);
        let prov = provisioner(&base, tmp.path());
        let path = prov.ensure_binary().unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "fresh");
        assert!(is_executable(&path));
    }

    #[test]
    fn test_five_redirects_succeed() {
        let mut responses: Vec<String> =
            (0..5).map(|i| redirect_to(&format!("/hop{}", i))).collect();
        responses.push(ok_body("payload"));
        let base = serve(responses);
        let tmp = tempdir().unwrap();
        let prov = provisioner(&base, tmp.path());
        let path = prov.ensure_binary().unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "payload");
    }

    #[test]
    fn test_six_redirects_fail() {
        let responses: Vec<String> =
            (0..6).map(|i| redirect_to(&format!("/hop{}", i))).collect();
        let base = serve(responses);
        let tmp = tempdir().unwrap();
        let prov = provisioner(&base, tmp.path());
        match prov.ensure_binary() {
            Err(GateError::TooManyRedirects { limit, .. }) => assert_eq!(limit, MAX_REDIRECTS),
            other => panic!("expected TooManyRedirects, got {:?}", other),
        }
        assert!(!prov.install_path().unwrap().exists());
    }

    #[test]
    fn test_error_status_leaves_no_artifacts() {
        let base = serve(vec![status_only("404 Not Found")]);
        let tmp = tempdir().unwrap();
        let prov = provisioner(&base, tmp.path());
        match prov.ensure_binary() {
            Err(GateError::DownloadStatus { status, .. }) => assert_eq!(status, 404),
            other => panic!("expected DownloadStatus, got {:?}", other),
        }
        assert!(!prov.install_path().unwrap().exists());
        let leftovers: Vec<_> = fs::read_dir(tmp.path()).unwrap().collect();
        assert!(leftovers.is_empty(), "temp files left behind: {:?}", leftovers);
    }

    #[test]
    fn test_concurrent_callers_share_one_download() {
        use std::sync::atomic::Ordering;
        use std::sync::Barrier;
        let (base, hits) =
            serve_counting(ok_body("shared"), std::time::Duration::from_millis(300));
        let tmp = tempdir().unwrap();
        let prov = Arc::new(provisioner(&base, tmp.path()));
        let barrier = Arc::new(Barrier::new(2));
        let handles: Vec<_> = (0..2)
            .map(|_| {
                let prov = prov.clone();
                let barrier = barrier.clone();
                std::thread::spawn(move || {
                    barrier.wait();
                    prov.ensure_binary()
                })
            })
            .collect();
        for h in handles {
            let path = h.join().unwrap().unwrap();
            assert_eq!(fs::read_to_string(&path).unwrap(), "shared");
        }
        // The loser of the lock returns from the post-lock cache re-check
        // instead of issuing a second download.
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failed_promotion_cleans_up_temp_file() {
        let base = serve(vec![ok_body("payload")]);
        let tmp = tempdir().unwrap();
        // Occupy the install path with a directory so the rename cannot land.
        fs::create_dir(tmp.path().join("slither-linux")).unwrap();
        let prov = provisioner(&base, tmp.path());
        assert!(prov.ensure_binary().is_err());
        let leftovers: Vec<_> = fs::read_dir(tmp.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().contains(".part-"))
            .collect();
        assert!(leftovers.is_empty(), "temp files left behind: {:?}", leftovers);
    }

    #[test]
    fn test_prune_removes_cache_entry() {
        let tmp = tempdir().unwrap();
        let install = tmp.path().join("slither-linux");
        fs::write(&install, b"binary").unwrap();
        let prov = provisioner("http://127.0.0.1:1", tmp.path());
        assert!(prov.prune().unwrap());
        assert!(!install.exists());
        assert!(!prov.prune().unwrap());
    }
}
