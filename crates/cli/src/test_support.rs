use std::sync::{Mutex, OnceLock};

fn env_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

/// Every `UCONNECT_*` variable the CLI reads.
const UCONNECT_VARS: &[&str] = &[
    "UCONNECT_API_BASE_URL",
    "UCONNECT_BACKEND_URL",
    "UCONNECT_CALLBACK_PORT",
    "UCONNECT_TENANT_ID",
];

/// Runs `run` with the process environment locked and every `UCONNECT_*`
/// variable cleared; the previous values are restored afterwards.
pub(crate) fn with_locked_env<R>(run: impl FnOnce() -> R) -> R {
    let _guard = env_lock().lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let saved: Vec<(&str, Option<String>)> = UCONNECT_VARS
        .iter()
        .map(|key| (*key, std::env::var(key).ok()))
        .collect();
    for key in UCONNECT_VARS {
        remove_env_var(key);
    }

    let result = run();

    for (key, value) in saved {
        match value {
            Some(value) => set_env_var(key, &value),
            None => remove_env_var(key),
        }
    }
    result
}

/// Set an environment variable in test contexts.
///
/// Call sites should hold `with_locked_env` so parallel tests do not race.
pub(crate) fn set_env_var(key: &str, value: &str) {
    // SAFETY: only called while the env lock is held.
    unsafe {
        std::env::set_var(key, value);
    }
}

/// Remove an environment variable in test contexts.
pub(crate) fn remove_env_var(key: &str) {
    // SAFETY: only called while the env lock is held.
    unsafe {
        std::env::remove_var(key);
    }
}
