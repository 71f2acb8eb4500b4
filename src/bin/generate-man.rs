// renders man pages from the clap definition: filterexpr.1 plus one
// filterexpr-<command>.1 per subcommand, into the directory given as the
// first argument (default: man/)

use std::path::{Path, PathBuf};

use clap::{Command, CommandFactory};
use clap_mangen::Man;
use filterexpr::cli::Cli;

fn main() -> std::io::Result<()> {
    let out_dir = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("man"));
    std::fs::create_dir_all(&out_dir)?;

    let cmd = Cli::command();
    let root = cmd.get_name().to_string();

    render(cmd.clone(), &out_dir.join(format!("{}.1", root)))?;
    for sub in cmd.get_subcommands() {
        let name = format!("{}-{}", root, sub.get_name());
        render(sub.clone().name(name.clone()), &out_dir.join(format!("{}.1", name)))?;
    }

    println!("Generated man pages in {}", out_dir.display());
    Ok(())
}

fn render(cmd: Command, path: &Path) -> std::io::Result<()> {
    let mut buffer = Vec::new();
    Man::new(cmd).render(&mut buffer)?;
    std::fs::write(path, buffer)
}
