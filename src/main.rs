//! # pointsas - 点云模型的理论小角散射计算
//!
//! 由外部采样器生成的三维散射长度密度点云计算理论小角散射强度 I(q)：
//! 对比度加权的对距离分布 p(r)、Debye 变换得到的形状因子 P(q)、
//! 经解耦近似组合的结构因子 S_eff(q)，以及多分散与界面粗糙度修正。
//!
//! ## 子命令
//! - `simulate` - 计算 p(r)、S_eff(q)、I(q) 并导出/绘图
//! - `pr`       - 只计算 p(r) 与 Rg
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── parsers/   (点云与 q 值解析)
//!   │     ├── sas/       (散射计算核心、导出、绘图)
//!   │     ├── batch/     (批量并行处理)
//!   │     └── models/    (数据模型)
//!   ├── utils/      (终端输出与进度条)
//!   └── error.rs    (错误处理)
//! ```

mod batch;
mod cli;
mod commands;
mod error;
mod models;
mod parsers;
mod sas;
mod utils;

use clap::Parser;
use cli::Cli;

fn main() {
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    if let Err(e) = commands::run(cli.command) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
