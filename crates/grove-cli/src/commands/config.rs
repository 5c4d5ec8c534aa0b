use clap::Subcommand;
use grove_core::Settings;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print current settings as JSON
    Show,
    /// Print the settings file location
    Path,
    /// Write default settings to disk
    Reset,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Show => {
            let settings = Settings::load()?;
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
        ConfigAction::Path => {
            println!("{}", Settings::path()?.display());
        }
        ConfigAction::Reset => {
            Settings::default().save()?;
            println!("settings reset to defaults");
        }
    }
    Ok(())
}
