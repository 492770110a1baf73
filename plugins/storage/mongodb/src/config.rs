// ════════════════════════════════════════════════════════════════
//  Configuration
// ════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, serde::Deserialize)]
pub struct MongoStoreConfig {
    #[serde(default = "default_uri")]
    pub uri: String,
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default = "default_collection")]
    pub collection: String,
    /// Reported to the server in the connection handshake.
    #[serde(default)]
    pub app_name: Option<String>,
    /// Driver connect timeout. `None` = driver default.
    #[serde(default)]
    pub connect_timeout_ms: Option<u64>,
    /// How long an operation waits for a usable server. `None` = driver default.
    #[serde(default)]
    pub server_selection_timeout_ms: Option<u64>,
}

fn default_uri() -> String {
    "mongodb://localhost:27017/".into()
}
fn default_database() -> String {
    "test_db".into()
}
fn default_collection() -> String {
    "test_collection".into()
}

impl Default for MongoStoreConfig {
    fn default() -> Self {
        Self {
            uri: default_uri(),
            database: default_database(),
            collection: default_collection(),
            app_name: None,
            connect_timeout_ms: None,
            server_selection_timeout_ms: None,
        }
    }
}
