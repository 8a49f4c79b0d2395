//! Topic names shared by publishers and consumers.

pub const ORDER_PLACED: &str = "order.placed";
pub const ORDER_UPDATED: &str = "order.updated";
pub const ORDER_STATUS_UPDATED: &str = "order.status.updated";
pub const ORDER_CANCELLED: &str = "order.cancelled";
pub const ORDER_FAILED: &str = "order.failed";
pub const RESTAURANT_DELETED: &str = "restaurant.deleted";
