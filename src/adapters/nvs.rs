//! NVS (Non-Volatile Storage) adapter.
//!
//! Implements [`ConfigPort`] for the Sentinela controller.  The whole
//! [`SystemConfig`] is one postcard blob under `sentinela/syscfg`.
//!
//! - Config validation: all fields are range-checked before persistence
//!   and again after loading, so a blob written by an older firmware with
//!   looser rules cannot sneak in.
//! - Secrets never go through here; see [`Credentials`](crate::config::Credentials).
//! - Atomic writes: ESP-IDF NVS commits are atomic per `nvs_commit()`.

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::SystemConfig;
use crate::drivers::watchdog::WATCHDOG_TIMEOUT_MS;
use log::{info, warn};

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

const CONFIG_NAMESPACE: &str = "sentinela";
#[cfg(target_os = "espidf")]
const CONFIG_KEY: &[u8] = b"syscfg\0";

#[cfg(target_os = "espidf")]
const MAX_BLOB_SIZE: usize = 512;

pub struct NvsAdapter {
    #[cfg(not(target_os = "espidf"))]
    blob: std::cell::RefCell<Option<Vec<u8>>>,
}

impl NvsAdapter {
    /// Create a new NvsAdapter and initialise NVS flash.
    ///
    /// Returns `Err(ConfigError::IoError)` if flash initialisation fails
    /// unrecoverably. On first boot or after a version mismatch the NVS
    /// partition is erased and re-initialised automatically.
    pub fn new() -> Result<Self, ConfigError> {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: nvs_flash_init / nvs_flash_erase are called from the
            // single main-task context before any concurrent NVS access.
            let ret = unsafe { nvs_flash_init() };
            if ret == ESP_ERR_NVS_NO_FREE_PAGES as esp_err_t
                || ret == ESP_ERR_NVS_NEW_VERSION_FOUND as esp_err_t
            {
                warn!("NVS: erasing and re-initialising flash partition");
                if unsafe { nvs_flash_erase() } != ESP_OK {
                    return Err(ConfigError::IoError);
                }
                if unsafe { nvs_flash_init() } != ESP_OK {
                    return Err(ConfigError::IoError);
                }
            } else if ret != ESP_OK {
                return Err(ConfigError::IoError);
            }
            info!("NvsAdapter: ESP-IDF NVS initialised");
        }

        #[cfg(not(target_os = "espidf"))]
        info!("NvsAdapter: simulation backend");

        Ok(Self {
            #[cfg(not(target_os = "espidf"))]
            blob: std::cell::RefCell::new(None),
        })
    }

    /// Open the config namespace, execute a closure with the handle, then close.
    #[cfg(target_os = "espidf")]
    fn with_nvs_handle<F, T>(write: bool, f: F) -> Result<T, esp_err_t>
    where
        F: FnOnce(nvs_handle_t) -> Result<T, esp_err_t>,
    {
        let mut ns_buf = [0u8; 16];
        let ns_bytes = CONFIG_NAMESPACE.as_bytes();
        let len = ns_bytes.len().min(15);
        ns_buf[..len].copy_from_slice(&ns_bytes[..len]);

        let mut handle: nvs_handle_t = 0;
        let mode = if write {
            nvs_open_mode_t_NVS_READWRITE
        } else {
            nvs_open_mode_t_NVS_READONLY
        };

        let ret = unsafe { nvs_open(ns_buf.as_ptr() as *const _, mode, &mut handle) };
        if ret != ESP_OK {
            return Err(ret);
        }

        let result = f(handle);
        unsafe {
            nvs_close(handle);
        }
        result
    }

    #[cfg(target_os = "espidf")]
    fn read_blob(&self) -> Result<Option<Vec<u8>>, ConfigError> {
        let result = Self::with_nvs_handle(false, |handle| {
            let mut size: usize = 0;

            // First call: get size
            let ret = unsafe {
                nvs_get_blob(
                    handle,
                    CONFIG_KEY.as_ptr() as *const _,
                    core::ptr::null_mut(),
                    &mut size,
                )
            };
            if ret != ESP_OK {
                return Err(ret);
            }
            if size == 0 || size > MAX_BLOB_SIZE {
                return Err(ESP_ERR_NVS_INVALID_LENGTH as esp_err_t);
            }

            let mut buf = vec![0u8; size];
            let ret = unsafe {
                nvs_get_blob(
                    handle,
                    CONFIG_KEY.as_ptr() as *const _,
                    buf.as_mut_ptr() as *mut _,
                    &mut size,
                )
            };
            if ret != ESP_OK {
                return Err(ret);
            }
            Ok(buf)
        });

        match result {
            Ok(bytes) => Ok(Some(bytes)),
            // A namespace that was never written cannot be opened read-only.
            Err(e) if e == ESP_ERR_NVS_NOT_FOUND as esp_err_t => Ok(None),
            Err(e) if e == ESP_ERR_NVS_INVALID_LENGTH as esp_err_t => Err(ConfigError::Corrupted),
            Err(e) => {
                warn!("NvsAdapter: NVS read error {}", e);
                Err(ConfigError::IoError)
            }
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_blob(&self) -> Result<Option<Vec<u8>>, ConfigError> {
        Ok(self.blob.borrow().clone())
    }

    #[cfg(target_os = "espidf")]
    fn write_blob(&self, bytes: &[u8]) -> Result<(), ConfigError> {
        let result = Self::with_nvs_handle(true, |handle| {
            let ret = unsafe {
                nvs_set_blob(
                    handle,
                    CONFIG_KEY.as_ptr() as *const _,
                    bytes.as_ptr() as *const _,
                    bytes.len(),
                )
            };
            if ret != ESP_OK {
                return Err(ret);
            }
            let ret = unsafe { nvs_commit(handle) };
            if ret != ESP_OK {
                return Err(ret);
            }
            Ok(())
        });
        result.map_err(|e| {
            warn!("NvsAdapter: NVS write error {}", e);
            ConfigError::IoError
        })
    }

    #[cfg(not(target_os = "espidf"))]
    fn write_blob(&self, bytes: &[u8]) -> Result<(), ConfigError> {
        *self.blob.borrow_mut() = Some(bytes.to_vec());
        Ok(())
    }

    /// Simulation: overwrite the stored blob with arbitrary bytes.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_store_raw(&self, bytes: &[u8]) {
        *self.blob.borrow_mut() = Some(bytes.to_vec());
    }
}

pub fn validate_config(cfg: &SystemConfig) -> Result<(), ConfigError> {
    if cfg.radio_arm_code == 0 || cfg.radio_disarm_code == 0 {
        return Err(ConfigError::ValidationFailed(
            "radio codes must be non-zero",
        ));
    }
    if cfg.radio_arm_code == cfg.radio_disarm_code {
        return Err(ConfigError::ValidationFailed(
            "radio_arm_code must differ from radio_disarm_code",
        ));
    }
    if !(10..=500).contains(&cfg.button_debounce_ms) {
        return Err(ConfigError::ValidationFailed(
            "button_debounce_ms must be 10–500",
        ));
    }
    if !(1_000..=60_000).contains(&cfg.remote_poll_interval_ms) {
        return Err(ConfigError::ValidationFailed(
            "remote_poll_interval_ms must be 1000–60000",
        ));
    }
    if !(1_000..=600_000).contains(&cfg.connectivity_check_interval_ms) {
        return Err(ConfigError::ValidationFailed(
            "connectivity_check_interval_ms must be 1000–600000",
        ));
    }
    if cfg.connect_timeout_ms < 1_000 || cfg.connect_timeout_ms >= WATCHDOG_TIMEOUT_MS {
        return Err(ConfigError::ValidationFailed(
            "connect_timeout_ms must be at least 1000 and below the watchdog timeout",
        ));
    }
    if !(1_000..=60_000).contains(&cfg.http_timeout_ms) {
        return Err(ConfigError::ValidationFailed(
            "http_timeout_ms must be 1000–60000",
        ));
    }
    // Longest stretch between two watchdog feeds: one reconnect followed
    // by the restore notice.
    if cfg.connect_timeout_ms.saturating_add(cfg.http_timeout_ms) >= WATCHDOG_TIMEOUT_MS {
        return Err(ConfigError::ValidationFailed(
            "connect_timeout_ms + http_timeout_ms must stay below the watchdog timeout",
        ));
    }
    if cfg.utc_offset_secs.unsigned_abs() >= 24 * 3600 {
        return Err(ConfigError::ValidationFailed(
            "utc_offset_secs must be within ±24 h",
        ));
    }
    if !(1970..=2100).contains(&cfg.time_sync_sentinel_year) {
        return Err(ConfigError::ValidationFailed(
            "time_sync_sentinel_year must be 1970–2100",
        ));
    }
    if !(1..=1_000).contains(&cfg.loop_idle_ms) {
        return Err(ConfigError::ValidationFailed(
            "loop_idle_ms must be 1–1000",
        ));
    }
    if !cfg.log_path.starts_with("/spiffs/") || cfg.log_path.len() <= "/spiffs/".len() {
        return Err(ConfigError::ValidationFailed(
            "log_path must name a file under /spiffs/",
        ));
    }
    Ok(())
}

impl ConfigPort for NvsAdapter {
    fn load(&self) -> Result<SystemConfig, ConfigError> {
        let Some(bytes) = self.read_blob()? else {
            info!("NvsAdapter: no stored config, using defaults");
            return Ok(SystemConfig::default());
        };
        let cfg: SystemConfig = postcard::from_bytes(&bytes).map_err(|_| ConfigError::Corrupted)?;
        validate_config(&cfg)?;
        info!("NvsAdapter: loaded config ({} bytes)", bytes.len());
        Ok(cfg)
    }

    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError> {
        validate_config(config)?;
        let bytes = postcard::to_allocvec(config).map_err(|_| ConfigError::IoError)?;
        self.write_blob(&bytes)?;
        info!("NvsAdapter: config saved ({} bytes)", bytes.len());
        Ok(())
    }
}
