//! 认证模块
//! 令牌服务与 Bearer 访问守卫

pub mod jwt;
pub mod middleware;

pub use jwt::{Claims, TokenResponse, TokenService};
pub use middleware::{extract_token, jwt_auth_middleware, AuthContext};
