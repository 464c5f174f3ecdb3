use std::path::PathBuf;

pub const DEFAULT_SERVER_PORT: u16 = 3000;
pub const DEFAULT_FIXTURE_DIR: &str = "fixtures";
pub const DEFAULT_STATIC_DIR: &str = "client/dist";

pub const MAP_CACHE_CONTROL: &str = "public, max-age=30";
pub const MAX_MAP_ID_LEN: usize = 64;

pub fn server_port() -> u16 {
    std::env::var("SERVER_PORT")
        .ok()
        .and_then(|value| value.trim().parse::<u16>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_SERVER_PORT)
}

/// Directory scanned for `*.json` map fixtures at startup.
pub fn fixture_dir() -> PathBuf {
    dir_from_env("FIXTURE_DIR", DEFAULT_FIXTURE_DIR)
}

/// Directory holding the built client bundle.
pub fn static_dir() -> PathBuf {
    dir_from_env("STATIC_DIR", DEFAULT_STATIC_DIR)
}

fn dir_from_env(key: &str, default: &str) -> PathBuf {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_port_defaults_when_unset_or_invalid() {
        temp_env::with_var_unset("SERVER_PORT", || {
            assert_eq!(server_port(), DEFAULT_SERVER_PORT);
        });
        temp_env::with_var("SERVER_PORT", Some("0"), || {
            assert_eq!(server_port(), DEFAULT_SERVER_PORT);
        });
        temp_env::with_var("SERVER_PORT", Some("not-a-port"), || {
            assert_eq!(server_port(), DEFAULT_SERVER_PORT);
        });
    }

    #[test]
    fn server_port_reads_env() {
        temp_env::with_var("SERVER_PORT", Some(" 8080 "), || {
            assert_eq!(server_port(), 8080);
        });
    }

    #[test]
    fn blank_directories_fall_back_to_defaults() {
        temp_env::with_vars(
            [("FIXTURE_DIR", Some("   ")), ("STATIC_DIR", None::<&str>)],
            || {
                assert_eq!(fixture_dir(), PathBuf::from(DEFAULT_FIXTURE_DIR));
                assert_eq!(static_dir(), PathBuf::from(DEFAULT_STATIC_DIR));
            },
        );
        temp_env::with_var("FIXTURE_DIR", Some("/srv/maps"), || {
            assert_eq!(fixture_dir(), PathBuf::from("/srv/maps"));
        });
    }
}
