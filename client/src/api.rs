use storemap_shared::MapSnapshot;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error("network error: {0}")]
    Network(String),
    #[error("server responded with HTTP {0}")]
    Status(u16),
    #[error("could not read map data: {0}")]
    Decode(String),
}

impl LoadError {
    /// Short message for the toast.
    pub fn user_message(&self) -> String {
        match self {
            Self::Status(404) => "This map does not exist.".to_string(),
            Self::Status(_) | Self::Network(_) => "Could not load the store map.".to_string(),
            Self::Decode(_) => "The store map data is malformed.".to_string(),
        }
    }
}

pub fn map_url(api_base: &str, map_id: &str) -> String {
    format!("{}/maps/{map_id}", api_base.trim_end_matches('/'))
}

/// Fetch the full snapshot (map, located cells, route) for one map.
pub async fn fetch_snapshot(api_base: &str, map_id: &str) -> Result<MapSnapshot, LoadError> {
    let url = map_url(api_base, map_id);
    let resp = gloo_net::http::Request::get(&url)
        .send()
        .await
        .map_err(|e| LoadError::Network(e.to_string()))?;

    if !resp.ok() {
        return Err(LoadError::Status(resp.status()));
    }

    resp.json::<MapSnapshot>()
        .await
        .map_err(|e| LoadError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_url_joins_without_double_slash() {
        assert_eq!(map_url("/api", "demo"), "/api/maps/demo");
        assert_eq!(map_url("/api/", "demo"), "/api/maps/demo");
        assert_eq!(
            map_url("http://localhost:3000/api", "corner-market"),
            "http://localhost:3000/api/maps/corner-market"
        );
    }

    #[test]
    fn missing_map_gets_its_own_message() {
        assert_eq!(
            LoadError::Status(404).user_message(),
            "This map does not exist."
        );
        assert_eq!(
            LoadError::Status(502).user_message(),
            "Could not load the store map."
        );
        assert_eq!(
            LoadError::Status(500).to_string(),
            "server responded with HTTP 500"
        );
    }
}
