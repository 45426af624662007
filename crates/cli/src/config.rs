use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

fn default_api_url() -> String {
    "http://127.0.0.1:3000".into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_url_defaults_to_local_server() {
        let config: Config = envy::from_iter(Vec::<(String, String)>::new()).unwrap();

        assert_eq!(config.api_url, "http://127.0.0.1:3000");
    }

    #[test]
    fn api_url_reads_from_env() {
        let config: Config = envy::from_iter([(
            "API_URL".to_string(),
            "https://links.example.com".to_string(),
        )])
        .unwrap();

        assert_eq!(config.api_url, "https://links.example.com");
    }
}
