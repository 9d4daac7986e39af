//! Prompt theme and banner for guided mode.

use console::{style, Style};
use dialoguer::theme::ColorfulTheme;

/// `ColorfulTheme` with a cyan `?` prompt and green `✓` success marks.
pub fn pixsieve_theme() -> ColorfulTheme {
    ColorfulTheme {
        prompt_prefix: style("?".to_string()).for_stderr().cyan(),
        prompt_style: Style::new().for_stderr().bold(),
        prompt_suffix: style("›".to_string()).for_stderr().bright().black(),
        success_prefix: style("✓".to_string()).for_stderr().green(),
        error_prefix: style("✗".to_string()).for_stderr().red(),
        values_style: Style::new().for_stderr().green(),
        ..ColorfulTheme::default()
    }
}

/// Print the version banner to stderr.
pub fn print_banner() {
    let title = format!("Pixsieve v{}", pixsieve_core::VERSION);
    let tagline = "Duplicates are moved, never deleted";
    let width = tagline.len() + 4;
    let cyan = Style::new().for_stderr().cyan();

    eprintln!();
    eprintln!("{}", cyan.apply_to(format!("  ┌{:─<width$}┐", "")));
    eprintln!("{}", cyan.apply_to(format!("  │{title:^width$}│")));
    eprintln!("{}", cyan.apply_to(format!("  │{tagline:^width$}│")));
    eprintln!("{}", cyan.apply_to(format!("  └{:─<width$}┘", "")));
    eprintln!();
}
