pub(crate) fn urljoin(base: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    let base = base.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{}{}", base, path)
    } else {
        format!("{}/{}", base, path)
    }
}

/// Formats a multi-value id filter the way the CDO service expects:
/// a single value, or a chain separated by `&`
/// (e.g. `GHCND:USW00094728&GHCND:USC00042319`).
pub(crate) fn join_ids(ids: &[String]) -> String {
    ids.join("&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urljoin_handles_slashes() {
        assert_eq!(urljoin("https://a/api/", "/datasets"), "https://a/api/datasets");
        assert_eq!(urljoin("https://a/api", "datasets"), "https://a/api/datasets");
        assert_eq!(urljoin("https://a/api", "https://b/x"), "https://b/x");
    }

    #[test]
    fn join_ids_builds_ampersand_chains() {
        assert_eq!(join_ids(&["GHCND".to_string()]), "GHCND");
        assert_eq!(
            join_ids(&["FIPS:37".to_string(), "FIPS:48".to_string()]),
            "FIPS:37&FIPS:48"
        );
    }
}
