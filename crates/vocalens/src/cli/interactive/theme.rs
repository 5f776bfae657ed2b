//! Dialoguer theme and banner for interactive mode.

use console::{style, Style};
use dialoguer::theme::ColorfulTheme;

/// `ColorfulTheme` with a cyan `?` prompt and `▸` cursor.
pub fn vocalens_theme() -> ColorfulTheme {
    ColorfulTheme {
        prompt_prefix: style("?".to_string()).for_stderr().cyan(),
        prompt_style: Style::new().for_stderr().bold(),
        prompt_suffix: style("›".to_string()).for_stderr().bright().black(),
        active_item_prefix: style("▸".to_string()).for_stderr().cyan(),
        active_item_style: Style::new().for_stderr().cyan(),
        success_prefix: style("✓".to_string()).for_stderr().green(),
        success_suffix: style("·".to_string()).for_stderr().bright().black(),
        error_prefix: style("✗".to_string()).for_stderr().red(),
        error_style: Style::new().for_stderr().red(),
        values_style: Style::new().for_stderr().green(),
        ..ColorfulTheme::default()
    }
}

/// Prints the version banner to stderr so stdout only carries descriptions.
pub fn print_banner() {
    let version_line = format!("Vocalens v{}", vocalens_core::VERSION);
    let tagline = "Image descriptions, read aloud";

    let inner_width = tagline.chars().count() + 4;

    let top = format!("  ╭{:─<width$}╮", "", width = inner_width);
    let mid1 = format!("  │{:^width$}│", version_line, width = inner_width);
    let mid2 = format!("  │{:^width$}│", tagline, width = inner_width);
    let bot = format!("  ╰{:─<width$}╯", "", width = inner_width);

    let cyan = Style::new().for_stderr().cyan();

    eprintln!();
    for line in [top, mid1, mid2, bot] {
        eprintln!("{}", cyan.apply_to(line));
    }
    eprintln!();
}
