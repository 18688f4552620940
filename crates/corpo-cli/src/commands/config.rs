use crate::ConfigAction;
use anyhow::Result;
use colored::Colorize;
use corpo_infrastructure::ConfigService;

pub fn run(service: &ConfigService, action: &ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = service.load()?;
            println!("config file:  {}", service.config_path()?.display());
            println!("api_base_url: {}", config.api_base_url);
            println!("storage_dir:  {}", service.storage_dir(&config)?.display());
            println!("log_level:    {}", config.log_level);
        }
        ConfigAction::Init { force } => {
            let (path, written) = service.init_default(*force)?;
            if written {
                println!("{} Wrote {}", "✓".green(), path.display());
            } else {
                println!(
                    "{} {} already exists (use --force to overwrite)",
                    "!".yellow(),
                    path.display()
                );
            }
        }
    }
    Ok(())
}
