use std::io::Write;
use std::path::PathBuf;
use std::process;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use toolchain_files::{
    load_toolchain_config, FileLocation, LoadSettings, LoadedToolchainConfig, NetworkProfile,
    SecretsLoad, ToolchainManifestFile, MANIFEST_FILE_NAME, SECRETS_FILE_NAME,
};
use tracing::Level;

/// Toolchain-config loads the networks, the wallet credential and the compiler
/// pin a smart contract toolchain runs with.
#[derive(Parser, PartialEq, Clone, Debug)]
#[clap(
    version = env!("CARGO_PKG_VERSION"),
    name = "toolchain-config",
    bin_name = "toolchain-config"
)]
struct Opts {
    /// Project directory holding toolchain.toml and secrets.json (default: current directory)
    #[clap(long = "project", short = 'p', global = true)]
    project: Option<PathBuf>,
    /// Path to the secrets file (default: <project>/secrets.json)
    #[clap(long = "secrets", global = true)]
    secrets: Option<PathBuf>,
    /// Display debug logs
    #[clap(long = "verbose", short = 'v', global = true)]
    verbose: bool,
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, PartialEq, Clone, Debug)]
enum Command {
    /// Display the resolved configuration
    #[clap(name = "show", bin_name = "show")]
    Show(Show),
    /// Subcommands for inspecting networks
    #[clap(subcommand, name = "networks", aliases = &["network"])]
    Networks(Networks),
    /// Display the compiler version pin
    #[clap(name = "compilers", bin_name = "compilers", aliases = &["compiler"])]
    Compilers,
    /// Check that the secrets file and the project manifest load
    #[clap(name = "check", bin_name = "check")]
    Check,
    /// Write a toolchain.toml holding the built-in declarations
    #[clap(name = "init", bin_name = "init")]
    Init(Init),
    /// Generate shell completions scripts
    #[clap(name = "completions", bin_name = "completions", aliases = &["completion"])]
    Completions(Completions),
}

#[derive(Subcommand, PartialEq, Clone, Debug)]
enum Networks {
    /// List declared networks
    #[clap(name = "list", bin_name = "list", aliases = &["ls"])]
    List,
    /// Display a network profile
    #[clap(name = "show", bin_name = "show")]
    Show(ShowNetwork),
}

#[derive(Parser, PartialEq, Clone, Debug)]
struct Show {
    /// Output the configuration object as json
    #[clap(long = "json")]
    json: bool,
}

#[derive(Parser, PartialEq, Clone, Debug)]
struct ShowNetwork {
    /// Network name
    name: String,
}

#[derive(Parser, PartialEq, Clone, Debug)]
struct Init {
    /// Overwrite an existing toolchain.toml
    #[clap(long = "force")]
    force: bool,
}

#[derive(Parser, PartialEq, Clone, Debug)]
struct Completions {
    /// Specify which shell to generation completions script for
    #[clap(ignore_case = true)]
    shell: Shell,
}

pub fn main() {
    let opts: Opts = match Opts::try_parse() {
        Ok(opts) => opts,
        Err(e) => {
            // handle --version, --help, etc
            let _ = e.print();
            let _ = std::io::stdout().lock().flush();
            let _ = std::io::stderr().lock().flush();
            process::exit(e.exit_code());
        }
    };

    setup_logger(opts.verbose);
    let settings = get_load_settings(&opts);

    match opts.command {
        Command::Show(cmd) => {
            let loaded = load_config_or_exit(&settings);
            if cmd.json {
                print_json_or_exit(&loaded.config);
            } else {
                display_config(&loaded);
            }
        }
        Command::Networks(Networks::List) => {
            let loaded = load_config_or_exit(&settings);
            for (name, profile) in loaded.config.networks.iter() {
                println!("{:<16}{}", name, profile.endpoint());
            }
        }
        Command::Networks(Networks::Show(cmd)) => {
            let loaded = load_config_or_exit(&settings);
            let Some(profile) = loaded.config.networks.get(&cmd.name) else {
                eprintln!(
                    "{}",
                    format_err!(
                        "network {} not found (available networks: {})",
                        cmd.name,
                        loaded.config.networks.names().join(", ")
                    )
                );
                process::exit(1);
            };
            print_json_or_exit(profile);
        }
        Command::Compilers => {
            let loaded = load_config_or_exit(&settings);
            println!("solc {}", loaded.config.compilers.solc.version);
        }
        Command::Check => {
            let loaded = load_config_or_exit(&settings);
            let credential_networks: Vec<&str> = loaded
                .config
                .networks
                .iter()
                .filter(|(_, profile)| profile.requires_credentials())
                .map(|(name, _)| name)
                .collect();
            if let SecretsLoad::Defaulted {
                expected_location, ..
            } = &loaded.secrets
            {
                if !credential_networks.is_empty() {
                    eprintln!(
                        "{}",
                        format_warn!(
                            "{} not found, {} use the example mnemonic",
                            expected_location,
                            credential_networks.join(", ")
                        )
                    );
                }
            }
            println!(
                "{} {} and solc {} successfully loaded",
                green!("✔"),
                pluralize(loaded.config.networks.len(), "network"),
                loaded.config.compilers.solc.version
            );
        }
        Command::Init(cmd) => {
            let manifest_location = settings.get_manifest_location();
            if manifest_location.exists() && !cmd.force {
                eprintln!(
                    "{}",
                    format_err!(
                        "{} already exists, use --force to overwrite it",
                        manifest_location
                    )
                );
                process::exit(1);
            }
            let content = match ToolchainManifestFile::default_manifest().to_toml_string() {
                Ok(content) => content,
                Err(message) => {
                    eprintln!("{}", format_err!("{}", message));
                    process::exit(1);
                }
            };
            if let Err(message) = manifest_location.write_content(content.as_bytes()) {
                eprintln!("{}", format_err!("{}", message));
                process::exit(1);
            }
            println!("{} {}", green!("Created file"), manifest_location);
            if !settings.get_secrets_location().exists() {
                println!(
                    "{}",
                    format_note!(
                        "add a {} file holding {{\"mnemonic\": \"...\"}} before using networks requiring credentials, and keep it out of version control",
                        SECRETS_FILE_NAME
                    )
                );
            }
        }
        Command::Completions(cmd) => {
            let mut app = Opts::command();
            clap_complete::generate(
                cmd.shell,
                &mut app,
                "toolchain-config",
                &mut std::io::stdout(),
            );
        }
    }
}

fn setup_logger(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_ansi(atty::is(atty::Stream::Stderr))
        .with_writer(std::io::stderr)
        .init();
}

fn get_load_settings(opts: &Opts) -> LoadSettings {
    let project_root = match &opts.project {
        Some(path) => path.clone(),
        None => std::env::current_dir().unwrap_or_else(|e| {
            eprintln!("{}", format_err!("unable to get current directory: {}", e));
            process::exit(1);
        }),
    };
    let mut settings = LoadSettings::from_project_root(FileLocation::from_path(project_root));
    settings.secrets_location = opts.secrets.clone().map(FileLocation::from_path);
    settings
}

fn load_config_or_exit(settings: &LoadSettings) -> LoadedToolchainConfig {
    match load_toolchain_config(settings) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("{}", format_err!("{}", e));
            if settings.get_manifest_location().exists() {
                eprintln!(
                    "{}",
                    format_note!("declarations are read from {}", MANIFEST_FILE_NAME)
                );
            }
            process::exit(1);
        }
    }
}

fn print_json_or_exit<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("{}", format_err!("unable to serialize configuration: {}", e));
            process::exit(1);
        }
    }
}

fn display_config(loaded: &LoadedToolchainConfig) {
    println!("{}", green!("Networks"));
    for (name, profile) in loaded.config.networks.iter() {
        let credentials = match profile {
            NetworkProfile::Provider(network) if network.provider.mnemonic.is_placeholder() => {
                format!(" {}", yellow!("(example mnemonic)"))
            }
            NetworkProfile::Provider(network) => format!(" ({})", network.provider.mnemonic),
            NetworkProfile::Host(_) => String::new(),
        };
        println!(
            "  {:<16}{} network_id={}{}",
            name,
            profile.endpoint(),
            profile.network_id(),
            credentials
        );
        let transactions = profile.transactions();
        if let Some(gas) = transactions.gas {
            println!("  {:<16}gas={}", "", gas);
        }
        if let Some(gas_price) = transactions.gas_price {
            println!("  {:<16}gasPrice={}", "", gas_price);
        }
        if let Some(from) = &transactions.from {
            println!("  {:<16}from={}", "", from);
        }
    }
    println!("{}", green!("Compilers"));
    println!("  {:<16}{}", "solc", loaded.config.compilers.solc.version);
}

fn pluralize(value: usize, word: &str) -> String {
    if value == 1 {
        format!("{} {}", value, word)
    } else {
        format!("{} {}s", value, word)
    }
}
