use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::client::{ClientConfig, ENDPOINT};
use crate::error::{Error, Result};

#[derive(Debug, Default)]
struct RcConfig {
    url: Option<String>,
    token: Option<String>,
}

/// Resolves client configuration from (in order of precedence):
/// - explicit `url`/`token` arguments
/// - environment variables `CDO_API_URL` / `CDO_API_TOKEN`
/// - config file from `CDO_API_RC`, `./.cdorc`, or `~/.cdorc`
///
/// The URL falls back to the public CDO endpoint. A missing token is not an
/// error here: tokens may also be bound to an injected session or supplied
/// per call, and dispatch fails with `MissingToken` if none is found then.
pub(crate) fn load_config(url: Option<String>, token: Option<String>) -> Result<ClientConfig> {
    let mut url = url.or_else(|| std::env::var("CDO_API_URL").ok());
    let mut token = token.or_else(|| std::env::var("CDO_API_TOKEN").ok());

    if url.is_none() || token.is_none() {
        for rc_path in rc_candidates() {
            if rc_path.exists() {
                let cfg = read_rc(&rc_path).map_err(|e| {
                    Error::Config(format!(
                        "failed to read configuration file {}: {}",
                        rc_path.display(),
                        e
                    ))
                })?;

                if url.is_none() {
                    url = cfg.url;
                }
                if token.is_none() {
                    token = cfg.token;
                }
                break;
            }
        }
    }

    if token.is_none() {
        log::warn!(
            "no CDO API token found (set CDO_API_TOKEN or put `token:` in .cdorc); \
             requests will need a per-call token"
        );
    }

    Ok(ClientConfig {
        url: url.unwrap_or_else(|| ENDPOINT.to_string()),
        token,
    })
}

fn read_rc(path: &Path) -> std::io::Result<RcConfig> {
    let text = std::fs::read_to_string(path)?;
    Ok(parse_rc(&text))
}

fn parse_rc(text: &str) -> RcConfig {
    let entries = parse_entries(text);
    RcConfig {
        url: entries.get("url").map(|v| v.to_string()),
        token: entries.get("token").map(|v| v.to_string()),
    }
}

/// Parses `key: value` lines into a map. A key whose value is empty takes
/// its value from the next bare line, so `token:` followed by the token on
/// its own line works. Blank lines, `#` comments, and unknown keys are fine;
/// values may be single- or double-quoted.
fn parse_entries(text: &str) -> BTreeMap<&str, &str> {
    let mut entries = BTreeMap::new();
    let mut pending: Option<&str> = None;

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        match line.split_once(':') {
            Some((key, value)) => {
                let value = unquote(value);
                if value.is_empty() {
                    pending = Some(key.trim());
                } else {
                    entries.insert(key.trim(), value);
                    pending = None;
                }
            }
            None => {
                if let Some(key) = pending.take() {
                    entries.insert(key, unquote(line));
                }
            }
        }
    }

    entries
}

fn unquote(s: &str) -> &str {
    let s = s.trim();
    for quote in ['"', '\''] {
        if let Some(inner) = s.strip_prefix(quote).and_then(|r| r.strip_suffix(quote)) {
            return inner;
        }
    }
    s
}

fn rc_candidates() -> Vec<PathBuf> {
    // Search order:
    // 1) CDO_API_RC (explicit)
    // 2) ./.cdorc (current working directory)
    // 3) ~/.cdorc
    if let Ok(p) = std::env::var("CDO_API_RC") {
        return vec![PathBuf::from(p)];
    }

    let mut v = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        v.push(cwd.join(".cdorc"));
    }
    if let Some(home) = dirs::home_dir() {
        v.push(home.join(".cdorc"));
    }
    v
}
