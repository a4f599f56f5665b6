//! # simulate 子命令实现
//!
//! 由点云文件计算 p(r)、S_eff(q) 与 I(q) 并写出结果。
//!
//! ## 功能
//! - 支持单文件和批量目录处理
//! - 并行计算（rayon）
//! - 导出 DAT / CSV / PDB，绘制 p(r) 与 I(q)
//! - 终端汇总表格
//!
//! ## 依赖关系
//! - 使用 `cli/simulate.rs` 定义的 SimulateArgs
//! - 使用 `batch/` 模块进行批量处理
//! - 使用 `sas/` 模块进行计算
//! - 使用 `parsers/` 读取点云与 q 值

use crate::batch::{BatchRunner, FileCollector, ProcessResult};
use crate::cli::simulate::{SimulateArgs, StructureKind};
use crate::cli::PlotFormat;
use crate::commands::{ensure_output_dir, report_batch};
use crate::error::{Result, SasError};
use crate::models::{ModelSystem, SimulationParameters, TheoreticalScattering};
use crate::parsers::{self, qgrid};
use crate::sas::plot::{self, ImageFormat, PlotOptions};
use crate::sas::{export, QSampling, ScatteringCalculator, StructureFactor};
use crate::utils::{output, progress};

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tabled::{Table, Tabled};

/// 汇总表中的一行
#[derive(Debug, Clone, Tabled)]
struct SummaryRow {
    #[tabled(rename = "Model")]
    name: String,
    #[tabled(rename = "Points")]
    points: usize,
    #[tabled(rename = "Subunits")]
    subunits: usize,
    #[tabled(rename = "I(0)")]
    i0: String,
    #[tabled(rename = "Rg (Å)")]
    rg: String,
    #[tabled(rename = "r_max (Å)")]
    r_max: String,
}

/// 曲线预览表中的一行
#[derive(Debug, Clone, Tabled)]
struct CurveRow {
    #[tabled(rename = "q (Å⁻¹)")]
    q: String,
    #[tabled(rename = "P(q)")]
    pq: String,
    #[tabled(rename = "S_eff(q)")]
    s_eff: String,
    #[tabled(rename = "I(q)")]
    i: String,
}

/// 所有文件共用的计算配置
struct SimulationJob {
    output_dir: PathBuf,
    params: SimulationParameters,
    structure: StructureFactor,
    polydispersity: f64,
    conc: f64,
    sigma_r: f64,
    volume: Option<f64>,
    csv: bool,
    plot: PlotFormat,
    pdb: bool,
    overwrite: bool,
}

enum Outcome {
    Done(SummaryRow, TheoreticalScattering),
    Skipped(PathBuf),
}

/// 执行 simulate 命令
pub fn execute(args: SimulateArgs) -> Result<()> {
    output::print_header("Small-Angle Scattering Simulation");

    let job = build_job(&args)?;
    output::print_info(&format!(
        "q grid: {} points, {:.4} - {:.4} Å⁻¹",
        job.params.q.len(),
        job.params.q.iter().copied().fold(f64::INFINITY, f64::min),
        job.params.q.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    ));
    output::print_info(&format!("Structure factor: {}", job.structure));
    if job.polydispersity > 0.0 {
        output::print_info(&format!("Polydispersity: {}", job.polydispersity));
    }

    if args.input.input.is_file() {
        execute_single_file(&args, &job)
    } else if args.input.input.is_dir() {
        execute_batch(&args, job)
    } else {
        Err(SasError::FileNotFound {
            path: args.input.input.display().to_string(),
        })
    }
}

/// 单文件模式
fn execute_single_file(args: &SimulateArgs, job: &SimulationJob) -> Result<()> {
    let input = &args.input.input;
    output::print_info(&format!("Single file mode: '{}'", input.display()));
    ensure_output_dir(&job.output_dir)?;

    let spinner = progress::create_spinner("Computing pair distances and I(q)...");
    let outcome = process_file(input, job, args.name.as_deref());
    spinner.finish_and_clear();

    match outcome? {
        Outcome::Done(row, result) => {
            print_summary_table(&[row]);
            print_curve_preview(&result, 8);
            output::print_done(&format!(
                "Results written to '{}'",
                job.output_dir.display()
            ));
        }
        Outcome::Skipped(path) => {
            output::print_warning(&format!(
                "Output exists, skipping: {} (use --overwrite)",
                path.display()
            ));
        }
    }
    Ok(())
}

/// 批量处理模式
fn execute_batch(args: &SimulateArgs, job: SimulationJob) -> Result<()> {
    let input = &args.input;
    output::print_info(&format!("Batch mode: directory '{}'", input.input.display()));
    if args.name.is_some() {
        output::print_warning("--name is ignored in batch mode; file stems are used");
    }

    let files = FileCollector::new(input.input.clone())
        .with_pattern(&input.pattern)?
        .recursive(input.recursive)
        .collect();

    if files.is_empty() {
        output::print_warning(&format!(
            "No matching files found with pattern '{}'",
            input.pattern
        ));
        return Ok(());
    }
    output::print_info(&format!("Found {} model files", files.len()));
    ensure_output_dir(&job.output_dir)?;

    let rows: Mutex<Vec<SummaryRow>> = Mutex::new(Vec::new());
    let runner = BatchRunner::new(input.jobs);
    let result = runner.run(files, |file| match process_file(file, &job, None) {
        Ok(Outcome::Done(row, _)) => {
            let msg = format!("{} -> I(0) = {}", file.display(), row.i0);
            if let Ok(mut rows) = rows.lock() {
                rows.push(row);
            }
            ProcessResult::Success(msg)
        }
        Ok(Outcome::Skipped(path)) => {
            ProcessResult::Skipped(format!("Output exists, skipping: {}", path.display()))
        }
        Err(e) => ProcessResult::Failed(file.display().to_string(), e.to_string()),
    });

    let mut rows = rows.into_inner().unwrap_or_default();
    rows.sort_by(|a, b| a.name.cmp(&b.name));
    if !rows.is_empty() {
        print_summary_table(&rows);
    }

    report_batch(&result);
    Ok(())
}

/// 由命令行参数构造计算配置
fn build_job(args: &SimulateArgs) -> Result<SimulationJob> {
    let sampling = if let Some(list) = &args.q_values {
        QSampling::User(qgrid::parse_q_list(list)?)
    } else if let Some(path) = &args.q_file {
        QSampling::User(qgrid::parse_q_file(path)?)
    } else {
        QSampling::Uniform {
            qmin: args.qmin,
            qmax: args.qmax,
            nq: args.qpoints,
        }
    };

    let structure = build_structure(args)?;

    if let Some(v) = args.input.volume {
        if !v.is_finite() || v < 0.0 {
            return Err(SasError::InvalidArgument(format!(
                "--volume must be >= 0, got {}",
                v
            )));
        }
    }

    Ok(SimulationJob {
        output_dir: args.input.output.clone(),
        params: SimulationParameters {
            q: sampling.build()?,
            pr_points: args.pr.pr_points,
        },
        structure,
        polydispersity: args.pr.polydispersity,
        conc: args.conc,
        sigma_r: args.sigma_r,
        volume: args.input.volume,
        csv: args.csv,
        plot: args.plot,
        pdb: args.pdb,
        overwrite: args.input.overwrite,
    })
}

/// 参数按 `StructureFactor::from_name` 的顺序传入，构造时一并校验
fn build_structure(args: &SimulateArgs) -> Result<StructureFactor> {
    let params = match args.structure {
        StructureKind::None => vec![],
        StructureKind::Hs => vec![args.conc, args.r_hs],
        StructureKind::Aggregation => vec![args.r_eff, args.n_aggr as f64, args.frac],
    };
    StructureFactor::from_name(&args.structure.to_string(), &params)
}

/// 处理单个点云文件：读取、计算、写出
fn process_file(input: &Path, job: &SimulationJob, name: Option<&str>) -> Result<Outcome> {
    let mut cloud = parsers::parse_point_cloud_file(input, job.volume)?;
    if let Some(name) = name {
        cloud.name = name.to_string();
    }

    let iq_path = export::dat_path(&job.output_dir, "Iq", &cloud.name);
    if iq_path.exists() && !job.overwrite {
        return Ok(Outcome::Skipped(iq_path));
    }

    let system = ModelSystem::new(cloud)
        .with_structure(job.structure)
        .with_polydispersity(job.polydispersity)
        .with_conc(job.conc)
        .with_sigma_r(job.sigma_r);

    let calculator = ScatteringCalculator::new(job.params.clone());
    let result = calculator.calculate(&system)?;

    write_outputs(&system, &result, job)?;

    let dr = match result.r.as_slice() {
        [a, b, ..] => b - a,
        _ => 0.0,
    };
    let row = SummaryRow {
        name: system.points.name.clone(),
        points: system.points.n_points(),
        subunits: system.points.subunits.len(),
        i0: format!("{:.4e}", result.i0),
        rg: format_rg(result.rg),
        r_max: format!("{:.2}", result.r.last().map(|r| r + dr / 2.0).unwrap_or(0.0)),
    };
    Ok(Outcome::Done(row, result))
}

fn format_rg(rg: Option<f64>) -> String {
    rg.map(|v| format!("{:.2}", v))
        .unwrap_or_else(|| "n/a".to_string())
}

/// 写出全部结果文件
fn write_outputs(
    system: &ModelSystem,
    result: &TheoreticalScattering,
    job: &SimulationJob,
) -> Result<()> {
    let dir = &job.output_dir;
    let name = &system.points.name;

    export::save_pr(&result.r, &result.pr, dir, name)?;
    export::save_sq(&result.q, &result.s_eff, dir, name)?;
    export::save_iq(&result.q, &result.i, dir, name)?;

    if job.csv {
        export::to_csv(result, &dir.join(format!("{}.csv", name)))?;
    }
    if job.pdb {
        export::to_pdb(&system.points, &dir.join(format!("model_{}.pdb", name)))?;
    }

    let format = match job.plot {
        PlotFormat::None => return Ok(()),
        PlotFormat::Png => ImageFormat::Png,
        PlotFormat::Svg => ImageFormat::Svg,
    };
    let ext = format.extension();
    plot::generate_pr_plot(
        &result.r,
        &result.pr_norm,
        &dir.join(format!("pr_{}.{}", name, ext)),
        &PlotOptions::new(format!("p(r): {}", name), format),
    )?;
    plot::generate_iq_plot(
        result,
        &dir.join(format!("Iq_{}.{}", name, ext)),
        &PlotOptions::new(format!("I(q): {}", name), format),
    )?;

    Ok(())
}

fn print_summary_table(rows: &[SummaryRow]) {
    output::print_header("Simulation Summary");
    println!("{}", Table::new(rows));
}

/// 打印曲线前若干个 q 点
fn print_curve_preview(result: &TheoreticalScattering, count: usize) {
    let rows: Vec<CurveRow> = (0..result.q.len().min(count))
        .map(|k| CurveRow {
            q: format!("{:.5}", result.q[k]),
            pq: format!("{:.5}", result.pq[k]),
            s_eff: format!("{:.5}", result.s_eff[k]),
            i: format!("{:.5e}", result.i[k]),
        })
        .collect();

    if !rows.is_empty() {
        output::print_header(&format!("First {} q points", rows.len()));
        println!("{}", Table::new(&rows));
    }
}
