//! 访问令牌签发与校验
//! 令牌携带调用方提供的任意声明，使用 HS256 签名

use crate::{config::AppConfig, error::AppError};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 令牌声明
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// 调用方提供的声明，原样保留
    #[serde(flatten)]
    pub custom: Map<String, Value>,

    /// 签发时间
    pub iat: i64,

    /// 过期时间
    pub exp: i64,
}

impl Claims {
    /// `email` 声明，作为预约的所有权键
    pub fn email(&self) -> Option<&Value> {
        self.custom.get("email")
    }
}

/// `POST /jwt` 响应
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// 令牌服务
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_exp_secs: u64,
}

impl TokenService {
    /// 从配置创建令牌服务
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let secret = config.security.jwt_secret.expose_secret();

        if secret.len() < 32 {
            return Err(AppError::Config("JWT secret too short (min 32 chars)".to_string()));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_token_exp_secs: config.security.access_token_exp_secs,
        })
    }

    /// 签发令牌，有效期为 `access_token_exp_secs`
    pub fn issue(&self, claims: Map<String, Value>) -> Result<String, AppError> {
        self.issue_at(claims, Utc::now())
    }

    /// 以 `issued_at` 为签发时间签发令牌
    pub fn issue_at(
        &self,
        mut claims: Map<String, Value>,
        issued_at: DateTime<Utc>,
    ) -> Result<String, AppError> {
        // iat/exp 总是由服务端设置
        claims.remove("iat");
        claims.remove("exp");

        let expiration = issued_at + Duration::seconds(self.access_token_exp_secs as i64);
        let claims = Claims {
            custom: claims,
            iat: issued_at.timestamp(),
            exp: expiration.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to encode access token: {:?}", e);
            AppError::Internal(format!("Failed to encode access token: {}", e))
        })
    }

    /// 校验签名与过期时间，返回声明
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        // `aud` 可能只是调用方的普通声明
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp"]);

        Ok(decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| {
                tracing::debug!("Token validation failed: {:?}", e);
                AppError::Unauthorized
            })?
            .claims)
    }
}
