#![allow(dead_code)]

pub mod api_app;
pub mod gemini_mock;
pub mod stub_gateway;
