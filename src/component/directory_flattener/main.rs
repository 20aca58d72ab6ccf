//! 目錄扁平化主模組

use super::flatten_planner::{FlattenPlan, FlattenResult, execute, plan};
use crate::config::Config;
use crate::tools::prompt_directory;
use anyhow::Result;
use console::style;
use dialoguer::Confirm;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

pub struct DirectoryFlattener<'a> {
    config: &'a mut Config,
    shutdown_signal: Arc<AtomicBool>,
}

impl<'a> DirectoryFlattener<'a> {
    pub fn new(config: &'a mut Config, shutdown_signal: Arc<AtomicBool>) -> Self {
        Self {
            config,
            shutdown_signal,
        }
    }

    pub fn run(&mut self) -> Result<()> {
        println!("{}", style("=== 目錄扁平化 ===").cyan().bold());

        let Some(root) = prompt_directory(&mut self.config.settings, "請選擇要扁平化的根目錄")?
        else {
            return Ok(());
        };

        let output_dir_name = self.config.settings.flatten.output_dir_name.clone();
        println!("{}", style("掃描目錄中...").dim());
        let plan = plan(&root, &output_dir_name)?;

        for warning in &plan.warnings {
            println!("{}", style(warning).yellow());
        }

        if plan.is_empty() {
            println!("{}", style("在指定目錄下沒有找到任何檔案").yellow());
            return Ok(());
        }

        self.display_preview(&plan);

        let confirmed = Confirm::new()
            .with_prompt(format!(
                "確定要移動 {} 個檔案嗎？檔案會從原位置移走，操作無法復原",
                plan.entries.len()
            ))
            .default(false)
            .interact()?;

        if !confirmed || self.shutdown_signal.load(Ordering::SeqCst) {
            println!("{}", style("操作已取消").yellow());
            return Ok(());
        }

        let result = execute(&plan)?;
        Self::display_summary(&result);
        Ok(())
    }

    fn display_preview(&self, plan: &FlattenPlan) {
        println!();
        println!(
            "{}",
            style(format!(
                "總計 {} 個檔案將被移動到 '{}'",
                plan.entries.len(),
                plan.output_dir.display()
            ))
            .cyan()
        );
        println!("{}", style("=".repeat(60)).dim());

        for entry in &plan.entries {
            println!("  源: {}", style(entry.source.display()).dim());
            println!("  → 新: {}", style(plan.destination_of(entry).display()).green());
        }
        println!();
    }

    fn display_summary(result: &FlattenResult) {
        println!();
        println!("{}", style("=== 扁平化完成 ===").cyan().bold());
        println!("  成功移動: {}", style(result.success_count).green());

        if !result.errors.is_empty() {
            println!("  錯誤: {}", style(result.errors.len()).red());
            for error in &result.errors {
                println!("    {}", style(error).red());
            }
        }
    }
}
