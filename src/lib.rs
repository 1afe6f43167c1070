//! OBE Next - 成果导向教育（OBE）评估服务
//!
//! 基于 Actix Web 构建，管理课程、考核、学习成果（LO）与专业毕业要求（PO），
//! 并由成绩账本计算 LO 达成度、课程成绩、PO 得分与院系报表。
//!
//! # 架构
//! - `cache`: 缓存层（Moka）
//! - `config`: 配置管理
//! - `engine`: 计算引擎（权重、LO、课程成绩、PO、GPA）
//! - `entity`: SeaORM 数据库实体
//! - `errors`: 统一错误处理
//! - `models`: 数据模型定义
//! - `routes`: API 路由层
//! - `runtime`: 运行时生命周期管理
//! - `services`: 业务逻辑层
//! - `storage`: 数据存储层（SeaORM）
//! - `utils`: 工具函数

pub mod cache;
pub mod config;
pub mod engine;
pub mod entity;
pub mod errors;
pub mod models;
pub mod routes;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod utils;
