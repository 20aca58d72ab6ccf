//! 批次重新命名主模組
//!
//! 管理檔案清單、命名規則，預覽後執行

use super::file_list::FileList;
use super::rename_executor::{RenameResult, execute, preview};
use super::rename_settings::{NUMBER_WIDTH_RANGE, START_NUMBER_RANGE, STEP_RANGE, compile};
use crate::config::save::save_settings;
use crate::config::{Config, RenameSettings};
use crate::tools::{prompt_directory, prompt_file};
use anyhow::Result;
use console::style;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, MultiSelect, Select};
use log::{info, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// 清單顯示上限，超過時只顯示前面部分
const LIST_DISPLAY_LIMIT: usize = 30;

pub struct BatchRenamer<'a> {
    config: &'a mut Config,
    shutdown_signal: Arc<AtomicBool>,
    files: FileList,
}

impl<'a> BatchRenamer<'a> {
    pub fn new(config: &'a mut Config, shutdown_signal: Arc<AtomicBool>) -> Self {
        Self {
            config,
            shutdown_signal,
            files: FileList::new(),
        }
    }

    pub fn run(&mut self) -> Result<()> {
        loop {
            if self.shutdown_signal.load(Ordering::SeqCst) {
                println!("{}", style("操作已取消").yellow());
                return Ok(());
            }

            println!();
            println!("{}", style("=== 批次重新命名 ===").cyan().bold());
            self.display_files();

            let options = [
                "加入資料夾內的檔案",
                "加入單一檔案",
                "移除檔案",
                "移動檔案位置",
                "依名稱排序",
                "依修改時間排序",
                "編輯命名規則",
                "預覽",
                "執行重新命名",
                "清空清單",
                "返回",
            ];

            let selection = Select::with_theme(&ColorfulTheme::default())
                .with_prompt("請選擇操作")
                .items(&options)
                .default(0)
                .interact_opt()?;

            match selection {
                Some(0) => self.add_directory()?,
                Some(1) => self.add_file()?,
                Some(2) => self.remove_files()?,
                Some(3) => self.move_file()?,
                Some(4) => {
                    let ascending = self.files.sort_by_name();
                    println!("{}", style(format!("已依名稱排序（{}）", direction(ascending))).green());
                }
                Some(5) => {
                    let ascending = self.files.sort_by_mtime();
                    println!(
                        "{}",
                        style(format!("已依修改時間排序（{}）", direction(ascending))).green()
                    );
                }
                Some(6) => self.edit_settings()?,
                Some(7) => self.show_preview()?,
                Some(8) => self.perform_rename()?,
                Some(9) => {
                    self.files.clear();
                    println!("{}", style("檔案清單已清空").green());
                }
                Some(10) | None => return Ok(()),
                _ => unreachable!(),
            }
        }
    }

    fn display_files(&self) {
        if self.files.is_empty() {
            println!("{}", style("（清單為空）").dim());
            return;
        }

        println!("{}", style(format!("共 {} 個檔案：", self.files.len())).dim());
        for (i, record) in self.files.records().iter().take(LIST_DISPLAY_LIMIT).enumerate() {
            println!("  {:>3}. {}", i + 1, record.name);
        }
        if self.files.len() > LIST_DISPLAY_LIMIT {
            println!(
                "{}",
                style(format!("  ...另有 {} 個檔案", self.files.len() - LIST_DISPLAY_LIMIT)).dim()
            );
        }
    }

    fn add_directory(&mut self) -> Result<()> {
        let Some(directory) = prompt_directory(&mut self.config.settings, "請輸入資料夾路徑")? else {
            return Ok(());
        };

        let added = self.files.add_directory(&directory)?;
        info!("從 {} 加入 {added} 個檔案", directory.display());
        println!("{}", style(format!("已加入 {added} 個檔案")).green());
        Ok(())
    }

    fn add_file(&mut self) -> Result<()> {
        let Some(path) = prompt_file("請輸入檔案路徑", true)? else {
            return Ok(());
        };

        if !path.is_file() {
            println!("{}", style(format!("找不到檔案: {}", path.display())).yellow());
            return Ok(());
        }

        let added = self.files.add_paths([path]);
        println!("{}", style(format!("已加入 {added} 個檔案")).green());
        Ok(())
    }

    fn remove_files(&mut self) -> Result<()> {
        if self.files.is_empty() {
            println!("{}", style("請先加入檔案").yellow());
            return Ok(());
        }

        let names: Vec<&str> = self.files.records().iter().map(|r| r.name.as_str()).collect();
        let selected = MultiSelect::with_theme(&ColorfulTheme::default())
            .with_prompt("選擇要移除的檔案（空白鍵選取，Enter 確認）")
            .items(&names)
            .interact_opt()?;

        let Some(selected) = selected else {
            return Ok(());
        };
        if selected.is_empty() {
            println!("{}", style("未選擇任何檔案").yellow());
            return Ok(());
        }

        let removed = self.files.remove(&selected);
        println!("{}", style(format!("已移除 {removed} 個檔案")).green());
        Ok(())
    }

    fn move_file(&mut self) -> Result<()> {
        if self.files.len() < 2 {
            println!("{}", style("至少需要兩個檔案才能調整順序").yellow());
            return Ok(());
        }

        let names: Vec<&str> = self.files.records().iter().map(|r| r.name.as_str()).collect();
        let Some(source) = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("選擇要移動的檔案")
            .items(&names)
            .default(0)
            .interact_opt()?
        else {
            return Ok(());
        };

        let len = self.files.len();
        let position: usize = Input::new()
            .with_prompt(format!("移到第幾個位置 (1-{len})"))
            .validate_with(|input: &usize| -> Result<(), String> {
                if (1..=len).contains(input) {
                    Ok(())
                } else {
                    Err(format!("請輸入 1 到 {len} 之間的數字"))
                }
            })
            .interact_text()?;

        // 放下位置以移動前的索引表示，往後移時要放在目標項目之後
        let target = position - 1;
        let drop_index = if target > source { target + 1 } else { target };
        self.files.move_item(source, drop_index);
        Ok(())
    }

    fn edit_settings(&mut self) -> Result<()> {
        let current = self.config.settings.rename.clone();
        println!("{}", style("直接按 Enter 保留目前設定").dim());

        let prefix: String = Input::new()
            .with_prompt("前綴")
            .with_initial_text(&current.prefix)
            .allow_empty(true)
            .interact_text()?;
        let suffix: String = Input::new()
            .with_prompt("後綴")
            .with_initial_text(&current.suffix)
            .allow_empty(true)
            .interact_text()?;
        let remove_chars: String = Input::new()
            .with_prompt("要刪除的字元")
            .with_initial_text(&current.remove_chars)
            .allow_empty(true)
            .interact_text()?;
        let regex_pattern: String = Input::new()
            .with_prompt("正則表達式（留空不使用）")
            .with_initial_text(&current.regex_pattern)
            .allow_empty(true)
            .interact_text()?;

        let (regex_replacement, regex_case_sensitive) = if regex_pattern.is_empty() {
            (current.regex_replacement.clone(), current.regex_case_sensitive)
        } else {
            let replacement: String = Input::new()
                .with_prompt("替換為（可用 \\1 或 \\g<name> 參照群組）")
                .with_initial_text(&current.regex_replacement)
                .allow_empty(true)
                .interact_text()?;
            let case_sensitive = Confirm::new()
                .with_prompt("區分大小寫？")
                .default(current.regex_case_sensitive)
                .interact()?;
            (replacement, case_sensitive)
        };

        let number_placeholder: char = Input::new()
            .with_prompt("序號佔位字元")
            .default(current.number_placeholder)
            .interact_text()?;
        let number_width: usize = Input::new()
            .with_prompt(format!(
                "序號長度 ({}-{})",
                NUMBER_WIDTH_RANGE.start(),
                NUMBER_WIDTH_RANGE.end()
            ))
            .default(current.number_width)
            .interact_text()?;
        let start_number: u64 = Input::new()
            .with_prompt(format!(
                "起始序號 ({}-{})",
                START_NUMBER_RANGE.start(),
                START_NUMBER_RANGE.end()
            ))
            .default(current.start_number)
            .interact_text()?;
        let step: u64 = Input::new()
            .with_prompt(format!("序號間隔 ({}-{})", STEP_RANGE.start(), STEP_RANGE.end()))
            .default(current.step)
            .interact_text()?;
        let keep_extension = Confirm::new()
            .with_prompt("保留副檔名？")
            .default(current.keep_extension)
            .interact()?;

        let settings = RenameSettings {
            prefix,
            suffix,
            remove_chars,
            regex_pattern,
            regex_replacement,
            regex_case_sensitive,
            number_placeholder,
            number_width,
            start_number,
            step,
            keep_extension,
        };

        if let Err(e) = compile(&settings) {
            println!("{} {e:#}", style("設定無效:").red());
            return Ok(());
        }

        if settings != self.config.settings.rename {
            self.config.settings.rename = settings;
            if let Err(e) = save_settings(&self.config.settings) {
                warn!("無法儲存命名規則: {e}");
            }
        }
        println!("{}", style("命名規則已更新").green());
        Ok(())
    }

    fn show_preview(&self) -> Result<()> {
        if self.files.is_empty() {
            println!("{}", style("檔案清單為空").yellow());
            return Ok(());
        }

        let settings = compile(&self.config.settings.rename)?;
        let previews = preview(&self.files, &settings);

        println!();
        println!("{}", style("預覽重新命名結果：").cyan());
        for item in &previews {
            if item.is_unchanged() {
                println!("  {} {}", style("=").dim(), style(&item.old_name).dim());
            } else {
                println!(
                    "  {} {} {}",
                    item.old_name,
                    style("->").cyan(),
                    style(&item.new_name).green()
                );
            }
        }
        Ok(())
    }

    fn perform_rename(&mut self) -> Result<()> {
        if self.files.is_empty() {
            println!("{}", style("檔案清單為空").yellow());
            return Ok(());
        }

        let settings = compile(&self.config.settings.rename)?;
        self.show_preview()?;

        let confirmed = Confirm::new()
            .with_prompt("確定要執行重新命名嗎？此操作無法復原")
            .default(false)
            .interact()?;
        if !confirmed {
            println!("{}", style("操作已取消").yellow());
            return Ok(());
        }

        let result = execute(&mut self.files, &settings);
        self.display_summary(&result);
        Ok(())
    }

    fn display_summary(&self, result: &RenameResult) {
        println!();
        println!("{}", style("=== 重新命名完成 ===").cyan().bold());
        println!("  成功: {}", style(result.renamed).green());
        println!("  未變更: {}", style(result.unchanged).dim());

        if !result.errors.is_empty() {
            println!("  錯誤: {}", style(result.errors.len()).red());
            for error in &result.errors {
                println!("    {}", style(error).red());
            }
        }
    }
}

const fn direction(ascending: bool) -> &'static str {
    if ascending { "正序" } else { "逆序" }
}
