//! # pr 子命令实现
//!
//! 只计算对距离分布 p(r) 与回转半径，写出 `pr_<name>.dat`。
//! `--self-terms` 时改为包含自距离项的诊断直方图 h(r)。
//!
//! ## 依赖关系
//! - 使用 `cli/pr.rs` 定义的 PrArgs
//! - 使用 `sas/pair_distribution.rs`, `sas/export.rs`, `sas/plot.rs`
//! - 使用 `batch/` 模块进行批量处理

use crate::batch::{BatchRunner, FileCollector, ProcessResult};
use crate::cli::pr::PrArgs;
use crate::cli::PlotFormat;
use crate::commands::{ensure_output_dir, report_batch};
use crate::error::{Result, SasError};
use crate::parsers;
use crate::sas::plot::{self, ImageFormat, PlotOptions};
use crate::sas::{export, WeightedPairDistribution};
use crate::utils::{output, progress};

use std::path::{Path, PathBuf};

/// 单个文件的 p(r) 结果摘要
struct PrSummary {
    name: String,
    points: usize,
    rg: Option<f64>,
    path: PathBuf,
}

impl PrSummary {
    fn rg_label(&self) -> String {
        self.rg
            .map(|v| format!("{:.2} Å", v))
            .unwrap_or_else(|| "n/a".to_string())
    }
}

/// 执行 pr 命令
pub fn execute(args: PrArgs) -> Result<()> {
    output::print_header("Pair Distance Distribution");

    let input = &args.input.input;
    if input.is_file() {
        output::print_info(&format!("Single file mode: '{}'", input.display()));
        ensure_output_dir(&args.input.output)?;

        let spinner = progress::create_spinner("Computing pair distances...");
        let summary = process_file(input, &args);
        spinner.finish_and_clear();

        match summary? {
            Some(s) => {
                output::print_success(&format!(
                    "{}: {} points, Rg = {}",
                    s.name,
                    s.points,
                    s.rg_label()
                ));
                output::print_done(&format!("p(r) saved to '{}'", s.path.display()));
            }
            None => output::print_warning("Output exists, skipping (use --overwrite)"),
        }
        Ok(())
    } else if input.is_dir() {
        execute_batch(&args)
    } else {
        Err(SasError::FileNotFound {
            path: input.display().to_string(),
        })
    }
}

fn execute_batch(args: &PrArgs) -> Result<()> {
    let input = &args.input;
    output::print_info(&format!("Batch mode: directory '{}'", input.input.display()));

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
    ensure_output_dir(&input.output)?;

    let runner = BatchRunner::new(input.jobs);
    let result = runner.run(files, |file| match process_file(file, args) {
        Ok(Some(s)) => ProcessResult::Success(format!("{}: Rg = {}", s.name, s.rg_label())),
        Ok(None) => ProcessResult::Skipped(file.display().to_string()),
        Err(e) => ProcessResult::Failed(file.display().to_string(), e.to_string()),
    });

    report_batch(&result);
    Ok(())
}

/// 计算并写出一个文件的 p(r)，输出已存在时返回 None
fn process_file(input: &Path, args: &PrArgs) -> Result<Option<PrSummary>> {
    let cloud = parsers::parse_point_cloud_file(input, args.input.volume)?;
    let out_dir = &args.input.output;

    let prefix = if args.self_terms { "hr" } else { "pr" };
    let path = export::dat_path(out_dir, prefix, &cloud.name);
    if path.exists() && !args.input.overwrite {
        return Ok(None);
    }

    let points = cloud.merged();
    let wpd = WeightedPairDistribution::new(&points);
    let (r, values, rg) = if args.self_terms {
        let hist = wpd.calc_hr_with_self_terms(args.pr.pr_points, args.pr.polydispersity)?;
        let rg = WeightedPairDistribution::calc_rg(&hist.r, &hist.values).ok();
        (hist.r, hist.values, rg)
    } else {
        let pr = wpd.calc_pr(args.pr.pr_points, args.pr.polydispersity)?;
        let rg = WeightedPairDistribution::calc_rg(&pr.r, &pr.pr).ok();
        (pr.r, pr.pr, rg)
    };

    let header = if args.self_terms { "# r   h(r)" } else { "# r   p(r)" };
    export::write_columns(&path, header, &r, &values)?;

    let format = match args.plot {
        PlotFormat::None => None,
        PlotFormat::Png => Some(ImageFormat::Png),
        PlotFormat::Svg => Some(ImageFormat::Svg),
    };
    if let Some(format) = format {
        let peak = values.iter().copied().fold(0.0_f64, f64::max);
        let norm: Vec<f64> = if peak > 0.0 {
            values.iter().map(|v| v / peak).collect()
        } else {
            values.clone()
        };
        plot::generate_pr_plot(
            &r,
            &norm,
            &out_dir.join(format!("{}_{}.{}", prefix, cloud.name, format.extension())),
            &PlotOptions::new(format!("{}(r): {}", &prefix[..1], cloud.name), format),
        )?;
    }

    Ok(Some(PrSummary {
        name: cloud.name.clone(),
        points: points.len(),
        rg,
        path,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use std::fs;

    fn parse_args(extra: &[&str]) -> PrArgs {
        let mut argv = vec!["pointsas", "pr"];
        argv.extend_from_slice(extra);
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Pr(args) => args,
            _ => panic!("expected pr"),
        }
    }

    fn write_line(path: &Path) {
        let content: String = (0..10).map(|i| format!("{} 0 0 1\n", i)).collect();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_pr_file_written() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("rod.dat");
        write_line(&input);
        let out = dir.path().join("out");

        let args = parse_args(&[
            input.to_str().unwrap(),
            "-o",
            out.to_str().unwrap(),
            "--volume",
            "10",
            "--pr-points",
            "20",
        ]);
        execute(args).unwrap();

        let content = fs::read_to_string(out.join("pr_rod.dat")).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "# r   p(r)");
        assert_eq!(lines.len(), 21);
    }

    #[test]
    fn test_self_terms_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("rod.dat");
        write_line(&input);
        let out = dir.path().join("out");
        fs::create_dir(&out).unwrap();

        let args = parse_args(&[
            input.to_str().unwrap(),
            "-o",
            out.to_str().unwrap(),
            "--volume",
            "10",
            "--self-terms",
        ]);
        let summary = process_file(&input, &args).unwrap().unwrap();
        assert_eq!(summary.points, 10);
        assert!(summary.rg.is_some());

        let content = fs::read_to_string(out.join("hr_rod.dat")).unwrap();
        assert!(content.starts_with("# r   h(r)\n"));
        let first: Vec<f64> = content
            .lines()
            .nth(1)
            .unwrap()
            .split_whitespace()
            .map(|v| v.parse().unwrap())
            .collect();
        // 自距离项全部落在第一个 bin
        assert!(first[1] >= 10.0);
    }

    #[test]
    fn test_zero_sum_pr_still_written() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("mixed.dat");
        fs::write(
            &input,
            "0 0 0 1\n1 0 0 1\n0.5 0.8660254 0 1\n0 0 10 -1\n",
        )
        .unwrap();
        let out = dir.path().join("out");
        fs::create_dir(&out).unwrap();

        let args = parse_args(&[
            input.to_str().unwrap(),
            "-o",
            out.to_str().unwrap(),
            "--volume",
            "100",
        ]);
        let summary = process_file(&input, &args).unwrap().unwrap();
        assert!(summary.rg.is_none());
        assert_eq!(summary.rg_label(), "n/a");
        assert!(out.join("pr_mixed.dat").exists());
    }

    #[test]
    fn test_missing_volume_fails() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("rod.dat");
        write_line(&input);
        let args = parse_args(&[input.to_str().unwrap()]);
        assert!(matches!(
            process_file(&input, &args),
            Err(SasError::InvalidArgument(_))
        ));
    }
}
