//! OpenAI-compatible endpoint summary
//!
//! Text shown after a successful launch. Nothing here talks to the server.

use crate::types::config::LaunchConfig;

const DEFAULT_PORT: &str = "8033";

/// Connection details derived from a launch configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiInfo {
    pub host: String,
    pub port: String,
    pub model_name: String,
    pub api_key: Option<String>,
}

impl ApiInfo {
    pub fn from_config(config: &LaunchConfig) -> Self {
        let host = match config.value_token("host") {
            // Bound to all interfaces; clients still connect via loopback
            Some(h) if h == "0.0.0.0" => "localhost".to_string(),
            Some(h) => h,
            None => "localhost".to_string(),
        };
        Self {
            host,
            port: config
                .value_token("port")
                .unwrap_or_else(|| DEFAULT_PORT.to_string()),
            model_name: config
                .value_token("model_alias")
                .unwrap_or_else(|| "default".to_string()),
            api_key: config.value_token("api_key"),
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// Base URL clients should be configured with
    pub fn openai_base_url(&self) -> String {
        format!("{}/v1", self.base_url())
    }

    /// Named endpoints exposed by the server
    pub fn endpoints(&self) -> Vec<(&'static str, String)> {
        let base = self.base_url();
        vec![
            ("Chat Completions", format!("{base}/v1/chat/completions")),
            ("Text Completions", format!("{base}/v1/completions")),
            ("List Models", format!("{base}/v1/models")),
            ("Embeddings", format!("{base}/v1/embeddings")),
            ("Health Check", format!("{base}/health")),
        ]
    }

    /// Full text summary with a Python client example
    pub fn render(&self) -> String {
        let base = self.base_url();
        let mut out = format!("Server starting at: {base}\n\n=== OpenAI-Compatible API Endpoints ===\n\n");
        for (name, url) in self.endpoints() {
            out.push_str(&format!("- {:<18} {}\n", format!("{name}:"), url));
        }

        let key_line = match &self.api_key {
            Some(key) => format!("Required: {key}"),
            None => "Not required".to_string(),
        };
        let client_key = self.api_key.as_deref().unwrap_or("not-needed");

        out.push_str(&format!(
            r#"
=== Connection Settings ===

Base URL:    {base_url}
Model Name:  {model}
API Key:     {key_line}

=== Python Example ===

from openai import OpenAI

client = OpenAI(
    base_url="{base_url}",
    api_key="{client_key}"
)

response = client.chat.completions.create(
    model="{model}",
    messages=[{{"role": "user", "content": "Hello!"}}]
)
print(response.choices[0].message.content)
"#,
            base_url = self.openai_base_url(),
            model = self.model_name,
            key_line = key_line,
            client_key = client_key,
        ));
        out
    }
}
