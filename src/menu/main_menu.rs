use crate::config::save::save_settings;
use crate::config::types::{Config, Language};
use crate::menu::handlers::{
    run_batch_renamer, run_directory_flattener, run_markdown_converter, run_media_cropper,
    run_media_merger, run_nfo_generator,
};
use anyhow::Result;
use console::{Term, style};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Password, Select};
use rust_i18n::t;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

pub fn show_main_menu(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &mut Config,
) -> Result<bool> {
    term.clear_screen()?;

    println!("{}", style(t!("main_menu.title")).cyan().bold());
    println!("{}", style(t!("common.esc_hint")).dim());

    let options = vec![
        t!("main_menu.opt_renamer"),
        t!("main_menu.opt_flatten"),
        t!("main_menu.opt_nfo"),
        t!("main_menu.opt_merger"),
        t!("main_menu.opt_cropper"),
        t!("main_menu.opt_markdown"),
        t!("main_menu.opt_settings"),
        t!("main_menu.exit"),
    ];

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("main_menu.prompt"))
        .items(&options)
        .default(0)
        .interact_on_opt(term)?;

    match selection {
        Some(0) => run_batch_renamer(term, shutdown_signal, config)?,
        Some(1) => run_directory_flattener(term, shutdown_signal, config)?,
        Some(2) => run_nfo_generator(term, shutdown_signal, config)?,
        Some(3) => run_media_merger(term, shutdown_signal, config)?,
        Some(4) => run_media_cropper(term, shutdown_signal, config)?,
        Some(5) => run_markdown_converter(term, shutdown_signal, config)?,
        Some(6) => show_settings_menu(term, config)?,
        Some(7) | None => return Ok(false), // ESC pressed - exit
        _ => unreachable!(),
    }

    Ok(true)
}

/// 設定選單
fn show_settings_menu(term: &Term, config: &mut Config) -> Result<()> {
    loop {
        term.clear_screen()?;

        println!("{}", style(t!("settings.title")).cyan().bold());
        println!("{}", style(t!("common.esc_hint")).dim());

        let options = vec![
            t!("settings.opt_language"),
            t!("settings.opt_ai"),
            t!("settings.opt_flatten"),
            t!("settings.opt_markdown"),
            t!("settings.back"),
        ];

        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(t!("settings.prompt"))
            .items(&options)
            .default(0)
            .interact_on_opt(term)?;

        match selection {
            Some(0) => show_language_menu(term, config)?,
            Some(1) => show_ai_settings_menu(term, config)?,
            Some(2) => show_flatten_settings_menu(term, config)?,
            Some(3) => show_markdown_settings_menu(term, config)?,
            Some(4) | None => break, // ESC or back
            _ => unreachable!(),
        }
    }

    Ok(())
}

fn announce_saved(detail: &str) {
    println!("\n{} {detail}", style(t!("settings.saved")).green());
    std::thread::sleep(std::time::Duration::from_secs(1));
}

/// 語言設定選單
fn show_language_menu(term: &Term, config: &mut Config) -> Result<()> {
    term.clear_screen()?;

    println!("{}", style(t!("settings.language.title")).cyan().bold());
    println!("{}", style(t!("common.esc_hint")).dim());

    let languages = [Language::EnUs, Language::ZhTw, Language::ZhCn];
    let items: Vec<String> = languages.iter().map(ToString::to_string).collect();

    let default_index = languages
        .iter()
        .position(|&l| l == config.settings.language)
        .unwrap_or(0);

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("settings.language.prompt"))
        .items(&items)
        .default(default_index)
        .interact_on_opt(term)?;

    // ESC pressed - return without saving
    let Some(selection) = selection else {
        return Ok(());
    };

    let selected_lang = languages[selection];
    if selected_lang != config.settings.language {
        config.settings.language = selected_lang;
        rust_i18n::set_locale(selected_lang.as_str());
        save_settings(&config.settings)?;
        announce_saved(&selected_lang.to_string());
    }

    Ok(())
}

/// AI 簡介設定選單
fn show_ai_settings_menu(term: &Term, config: &mut Config) -> Result<()> {
    term.clear_screen()?;

    println!("{}", style(t!("settings.ai.title")).cyan().bold());
    let current = config.settings.ai.clone();
    let key_status = if current.resolve_api_key().is_some() {
        t!("settings.ai.key_present")
    } else {
        t!("settings.ai.key_missing")
    };
    println!("{}", style(key_status).dim());
    println!();

    let base_url: String = Input::new()
        .with_prompt(t!("settings.ai.base_url"))
        .default(current.base_url.clone())
        .interact_text()?;
    let model: String = Input::new()
        .with_prompt(t!("settings.ai.model"))
        .default(current.model.clone())
        .interact_text()?;
    let api_key_env: String = Input::new()
        .with_prompt(t!("settings.ai.api_key_env"))
        .default(current.api_key_env.clone())
        .interact_text()?;
    let temperature: f32 = Input::new()
        .with_prompt(t!("settings.ai.temperature"))
        .default(current.temperature)
        .validate_with(|value: &f32| -> Result<(), &'static str> {
            if (0.0..=2.0).contains(value) {
                Ok(())
            } else {
                Err("0.0 - 2.0")
            }
        })
        .interact_text()?;
    let api_key = Password::new()
        .with_prompt(t!("settings.ai.api_key"))
        .allow_empty_password(true)
        .interact()?;

    let mut updated = current.clone();
    updated.base_url = base_url.trim().trim_end_matches('/').to_string();
    updated.model = model.trim().to_string();
    updated.api_key_env = api_key_env.trim().to_string();
    updated.temperature = temperature;
    if !api_key.trim().is_empty() {
        updated.api_key = Some(api_key.trim().to_string());
    }

    if updated != current {
        config.settings.ai = updated;
        save_settings(&config.settings)?;
        announce_saved(&config.settings.ai.model);
    }

    Ok(())
}

/// 扁平化輸出資料夾設定
fn show_flatten_settings_menu(term: &Term, config: &mut Config) -> Result<()> {
    term.clear_screen()?;

    println!("{}", style(t!("settings.flatten.title")).cyan().bold());

    let current = config.settings.flatten.output_dir_name.clone();
    let name: String = Input::new()
        .with_prompt(t!("settings.flatten.output_dir_name"))
        .default(current.clone())
        .validate_with(|value: &String| -> Result<(), &'static str> {
            let value = value.trim();
            if value.is_empty() || value.contains(['/', '\\']) || value == "." || value == ".." {
                Err("invalid directory name")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    let name = name.trim().to_string();
    if name != current {
        config.settings.flatten.output_dir_name = name;
        save_settings(&config.settings)?;
        announce_saved(&config.settings.flatten.output_dir_name);
    }

    Ok(())
}

/// Markdown 轉換設定：PDF 字型與索引頁
fn show_markdown_settings_menu(term: &Term, config: &mut Config) -> Result<()> {
    term.clear_screen()?;

    println!("{}", style(t!("settings.markdown.title")).cyan().bold());

    let current = config.settings.markdown.clone();
    let mut updated = current.clone();

    updated.cjk_main_font = Input::new()
        .with_prompt(t!("settings.markdown.cjk_main_font"))
        .default(current.cjk_main_font.clone())
        .interact_text()?;
    updated.main_font = Input::new()
        .with_prompt(t!("settings.markdown.main_font"))
        .default(current.main_font.clone())
        .interact_text()?;
    updated.mono_font = Input::new()
        .with_prompt(t!("settings.markdown.mono_font"))
        .default(current.mono_font.clone())
        .interact_text()?;
    updated.index_prefix = Input::new()
        .with_prompt(t!("settings.markdown.index_prefix"))
        .default(current.index_prefix.clone())
        .allow_empty(true)
        .interact_text()?;
    updated.index_exclude = Input::new()
        .with_prompt(t!("settings.markdown.index_exclude"))
        .default(current.index_exclude.clone())
        .allow_empty(true)
        .interact_text()?;
    updated.index_title = Input::new()
        .with_prompt(t!("settings.markdown.index_title"))
        .default(current.index_title.clone())
        .interact_text()?;
    updated.index_file_name = Input::new()
        .with_prompt(t!("settings.markdown.index_file_name"))
        .default(current.index_file_name.clone())
        .interact_text()?;

    if updated != current {
        config.settings.markdown = updated;
        save_settings(&config.settings)?;
        announce_saved("");
    }

    Ok(())
}
