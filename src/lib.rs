//! 汽车保养预约后端
//! 服务项目查询、预约管理与访问令牌

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod query;
pub mod routes;
pub mod store;
pub mod telemetry;
