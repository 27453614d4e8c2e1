/// Normalizes a base URL by trimming trailing slashes.
pub(crate) fn normalize_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Constructs a request URL from a base URL, a path and query parameters.
///
/// The path gets a leading `/` if it lacks one. Query keys and values are
/// percent-encoded.
#[must_use]
pub(crate) fn construct_url(base_url: &str, path: &str, query: &[(&str, &str)]) -> String {
    let base = base_url.trim_end_matches('/');
    let separator = if path.starts_with('/') { "" } else { "/" };

    let query_string = if query.is_empty() {
        String::new()
    } else {
        let pairs: Vec<String> = query
            .iter()
            .map(|(key, value)| {
                format!(
                    "{}={}",
                    urlencoding::encode(key),
                    urlencoding::encode(value)
                )
            })
            .collect();
        format!("?{}", pairs.join("&"))
    };

    format!("{base}{separator}{path}{query_string}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construct_url_plain_path() {
        let url = construct_url("https://api.example.com/v2", "/pets", &[]);
        assert_eq!(url, "https://api.example.com/v2/pets");
    }

    #[test]
    fn test_construct_url_adds_missing_slash() {
        let url = construct_url("https://api.example.com", "pets/42", &[]);
        assert_eq!(url, "https://api.example.com/pets/42");
    }

    #[test]
    fn test_construct_url_trims_trailing_base_slash() {
        let url = construct_url("https://api.example.com/", "/pets", &[]);
        assert_eq!(url, "https://api.example.com/pets");
    }

    #[test]
    fn test_construct_url_query_params() {
        let url = construct_url(
            "https://api.example.com",
            "/pets",
            &[("limit", "10"), ("status", "available")],
        );
        assert_eq!(url, "https://api.example.com/pets?limit=10&status=available");
    }

    #[test]
    fn test_construct_url_encodes_special_chars() {
        let url = construct_url(
            "https://api.example.com",
            "/search",
            &[("q", "cats & dogs"), ("tag+x", "a=b")],
        );
        assert!(url.contains("q=cats%20%26%20dogs"));
        assert!(url.contains("tag%2Bx=a%3Db"));
    }

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(normalize_base_url("http://h/api///"), "http://h/api");
        assert_eq!(normalize_base_url("http://h"), "http://h");
    }
}
