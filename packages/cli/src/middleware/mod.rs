// ABOUTME: Request middleware for the server

pub mod quota;

pub use quota::quota_middleware;
