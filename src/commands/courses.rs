use anyhow::Result;
use coursesync_core::SyncConfig;
use owo_colors::OwoColorize;

pub fn run(config: &SyncConfig) -> Result<()> {
    println!("{}", "Courses".bold());

    if config.courses.is_empty() {
        println!("  {}", "No courses configured".dimmed());
    }
    for (code, project) in config.courses.iter() {
        println!("  {:<12} {}", code.to_string(), project.dimmed());
    }

    let ignored = config.courses.ignored();
    if !ignored.is_empty() {
        println!("\n{}", "Ignored".bold());
        for entry in ignored {
            println!("  {}", entry.dimmed());
        }
    }

    Ok(())
}
