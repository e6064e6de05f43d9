/// API service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// TCP port for the HTTP server (default 3111). Env var: `API_PORT`.
    pub api_port: u16,
    /// Externally reachable base URL, used to build payment callback URLs
    /// (e.g. "https://tikiti.example.com").
    pub public_base_url: String,
    /// HMAC secret for validating provider-issued bearer tokens.
    pub jwt_secret: String,
    /// Endpoint secret for the identity webhook ("whsec_..." form).
    pub identity_webhook_secret: String,
    /// Payment provider API base URL (default Daraja sandbox).
    pub mpesa_base_url: String,
    /// Payment provider OAuth consumer key.
    pub mpesa_consumer_key: String,
    /// Payment provider OAuth consumer secret.
    pub mpesa_consumer_secret: String,
    /// Business paybill shortcode.
    pub mpesa_shortcode: String,
    /// Passkey for deriving the STK push password.
    pub mpesa_passkey: String,
}

impl ApiConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL"),
            api_port: std::env::var("API_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3111),
            public_base_url: std::env::var("PUBLIC_BASE_URL").expect("PUBLIC_BASE_URL"),
            jwt_secret: std::env::var("JWT_SECRET").expect("JWT_SECRET"),
            identity_webhook_secret: std::env::var("IDENTITY_WEBHOOK_SECRET")
                .expect("IDENTITY_WEBHOOK_SECRET"),
            mpesa_base_url: std::env::var("MPESA_BASE_URL")
                .unwrap_or_else(|_| "https://sandbox.safaricom.co.ke".to_owned()),
            mpesa_consumer_key: std::env::var("MPESA_CONSUMER_KEY").expect("MPESA_CONSUMER_KEY"),
            mpesa_consumer_secret: std::env::var("MPESA_CONSUMER_SECRET")
                .expect("MPESA_CONSUMER_SECRET"),
            mpesa_shortcode: std::env::var("MPESA_SHORTCODE").expect("MPESA_SHORTCODE"),
            mpesa_passkey: std::env::var("MPESA_PASSKEY").expect("MPESA_PASSKEY"),
        }
    }
}
