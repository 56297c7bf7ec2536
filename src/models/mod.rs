//! 数据模型模块
//! 服务项目与预约都是无模式文档，这里只保留请求校验

pub mod booking;

pub use booking::{validate_new_booking, BookingContact, UpdateBookingStatusRequest};
