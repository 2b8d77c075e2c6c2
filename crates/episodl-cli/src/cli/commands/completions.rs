//! `episodl completions <shell>` – print shell completions.

use clap::Command;
use clap_complete::{generate, Shell};

pub fn run_completions(shell: Shell, cmd: &mut Command) {
    let name = cmd.get_name().to_string();
    generate(shell, cmd, name, &mut std::io::stdout());
}
