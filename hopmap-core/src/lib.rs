pub mod map;
pub mod pipeline;
pub mod report;

use colored::Colorize;

pub fn print_banner() {
    let banner = r#"
  _
 | |__   ___  _ __  _ __ ___   __ _ _ __
 | '_ \ / _ \| '_ \| '_ ` _ \ / _` | '_ \
 | | | | (_) | |_) | | | | | | (_| | |_) |
 |_| |_|\___/| .__/|_| |_| |_|\__,_| .__/
             |_|                   |_|
"#;
    println!("{}", banner.bright_cyan());
    println!(
        "{}",
        "  plot your traceroute hops on a world map".bright_white()
    );
    println!();
}
