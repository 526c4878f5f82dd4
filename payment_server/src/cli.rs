use std::{env, env::VarError};

/// There's no real CLI for the server, so just do quick 'n dirty
pub fn handle_command_line_args() -> bool {
    let has_cli_args = env::args().count() > 1;
    if has_cli_args {
        // We don't expect any CLI args, so always print the help
        display_readme();
        display_envs();
    }
    has_cli_args
}

fn display_readme() {
    const README: &str = include_str!("./cli-help.txt");
    println!("\n{README}\n");
}

fn display_envs() {
    // Be explicit about which envars to print, so as to avoid accidentally exposing secrets
    const DISPLAY_ENVS: [&str; 13] = [
        "RUST_LOG",
        "PGV_HOST",
        "PGV_PORT",
        "PGV_DATABASE_URL",
        "PGV_USE_X_FORWARDED_FOR",
        "PGV_USE_FORWARDED",
        "PGV_PAYHERE_MERCHANT_ID",
        "PGV_PAYHERE_APP_ID",
        "PGV_PAYHERE_SANDBOX",
        "PGV_PAYHERE_REQUEST_TIMEOUT",
        "PGV_PAYHERE_RETURN_URL",
        "PGV_PAYHERE_CANCEL_URL",
        "PGV_PAYHERE_NOTIFY_URL",
    ];

    println!("Current environment values (EXCLUDING variables that contain secrets):");
    DISPLAY_ENVS.iter().for_each(|&name| {
        let val = match env::var(name) {
            Ok(s) => s,
            Err(VarError::NotPresent) => "Not set".into(),
            Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
        };
        println!("  {name:<35} {val:<15}");
    })
}
