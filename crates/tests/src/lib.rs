//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 样例配置与标定文件的加载测试
//! - 节点行为测试（批次、滤波、时间戳、按需发布、解码容错、订阅生命周期）
//! - 模拟 e2e 测试（无需真实传感器）

#[cfg(test)]
mod support;

#[cfg(test)]
mod config_tests;

#[cfg(test)]
mod node_tests;

#[cfg(test)]
mod e2e_tests;
