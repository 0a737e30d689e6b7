use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub access_secret: String,
    pub refresh_secret: String,
    pub issuer: String,
    pub audience: String,
    pub access_ttl_minutes: i64,
    pub refresh_ttl_days: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaConfig {
    pub minio_endpoint: String,
    pub minio_bucket: String,
    pub minio_access_key: String,
    pub minio_secret_key: String,
    pub region: String,
    /// Base under which uploaded objects are publicly reachable,
    /// e.g. `https://cdn.example.com/streamhub`.
    pub public_base_url: String,
    /// Directory where multipart files are staged before ingestion.
    pub tmp_dir: std::path::PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub media: MediaConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            access_secret: std::env::var("ACCESS_TOKEN_SECRET")?,
            refresh_secret: std::env::var("REFRESH_TOKEN_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "streamhub".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "streamhub-users".into()),
            access_ttl_minutes: std::env::var("ACCESS_TOKEN_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(15),
            refresh_ttl_days: std::env::var("REFRESH_TOKEN_TTL_DAYS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(10),
        };
        let minio_endpoint = std::env::var("MINIO_ENDPOINT")?;
        let minio_bucket = std::env::var("MINIO_BUCKET")?;
        let media = MediaConfig {
            public_base_url: std::env::var("MEDIA_PUBLIC_URL")
                .unwrap_or_else(|_| format!("{}/{}", minio_endpoint, minio_bucket)),
            minio_endpoint,
            minio_bucket,
            minio_access_key: std::env::var("MINIO_ACCESS_KEY")?,
            minio_secret_key: std::env::var("MINIO_SECRET_KEY")?,
            region: std::env::var("MINIO_REGION").unwrap_or_else(|_| "us-east-1".into()),
            tmp_dir: std::env::var("UPLOAD_TMP_DIR")
                .map(Into::into)
                .unwrap_or_else(|_| std::env::temp_dir()),
        };
        Ok(Self {
            database_url,
            jwt,
            media,
        })
    }
}
