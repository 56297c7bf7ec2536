//! HTTP 处理器模块

pub mod auth;
pub mod booking;
pub mod health;
pub mod service;
