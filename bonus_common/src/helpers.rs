use std::{env, str::FromStr, time::Duration};

/// Reads a number from the environment variable `name`. Missing or unparseable values yield `None`; the caller decides
/// on (and logs) the fallback.
pub fn env_number<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|s| s.trim().parse::<T>().ok())
}

/// Reads a millisecond duration from the environment variable `name`, falling back to `default` if it is missing,
/// unparseable, or zero.
pub fn env_millis(name: &str, default: Duration) -> Duration {
    env_number::<u64>(name).filter(|ms| *ms > 0).map(Duration::from_millis).unwrap_or(default)
}
