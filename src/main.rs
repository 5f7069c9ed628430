use clap::{value_parser, Arg, ArgAction, Command};
use steamlib::configuration::{create_config, ConfigFolder};
use steamlib::startup::{run, Action};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Command::new("steamlib")
        .about("🎮 Browse, cache artwork for and launch your Steam library 🎮")
        .subcommand(
            Command::new("sync")
                .about("🔄 Fetch the games you own and cache their artwork")
                .arg(
                    Arg::new("no-art")
                        .long("no-art")
                        .action(ArgAction::SetTrue)
                        .help("Skip artwork download"),
                )
                .arg(
                    Arg::new("refresh-art")
                        .long("refresh-art")
                        .action(ArgAction::SetTrue)
                        .help("Download artwork again even when cached"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print the library as JSON"),
                ),
        )
        .subcommand(Command::new("installed").about("📂 List the app ids of installed games"))
        .subcommand(
            Command::new("launch").about("🚀 Launch a game through Steam").arg(
                Arg::new("appid")
                    .required(true)
                    .value_parser(value_parser!(u32))
                    .help("Steam app id of the game"),
            ),
        )
        .subcommand(Command::new("start").about("♨️ Start Steam in the background"))
        .subcommand(
            Command::new("config").about("🛠️ Create or update configuration file for steamlib"),
        )
        .get_matches();

    let cfg_folder = ConfigFolder::new()?;

    let action = match args.subcommand() {
        Some(("sync", sub)) => Action::Sync {
            skip_artwork: sub.get_flag("no-art"),
            refresh_artwork: sub.get_flag("refresh-art"),
            json: sub.get_flag("json"),
        },
        Some(("installed", _)) => Action::Installed,
        Some(("launch", sub)) => match sub.get_one::<u32>("appid") {
            Some(app_id) => Action::Launch(*app_id),
            None => {
                print_usage();
                return Ok(());
            }
        },
        Some(("start", _)) => Action::Start,
        Some(("config", _)) => {
            println!("\x1b[1m\x1b[34mConfiguring steamlib...\x1b[0m");
            return create_config(cfg_folder);
        }
        _ => {
            print_usage();
            return Ok(());
        }
    };

    Ok(run(cfg_folder, action).await?)
}

fn print_usage() {
    println!("\x1b[1m\x1b[31mInvalid command!\x1b[0m\n");
    println!("📖 Available Commands:");
    println!("  \x1b[1m\x1b[32msteamlib sync\x1b[0m           - 🔄 Fetch owned games and artwork");
    println!("  \x1b[1m\x1b[32msteamlib installed\x1b[0m      - 📂 List installed games");
    println!("  \x1b[1m\x1b[32msteamlib launch <APPID>\x1b[0m - 🚀 Launch a game");
    println!("  \x1b[1m\x1b[32msteamlib start\x1b[0m          - ♨️  Start Steam in the background");
    println!("  \x1b[1m\x1b[32msteamlib config\x1b[0m         - 🛠️  Create or update configuration file");
    println!("\x1b[33mUse these commands to manage your Steam library from the terminal!\x1b[0m\n");
}
